// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The reason codes that a kalihim can record for a member during a session.
///
/// The codes are labeled `a` to `n` on the paper forms. Their order is significant:
/// it is the order of the columns in the printed report.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Code {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
}

impl Code {
    pub const COUNT: usize = 14;

    /// All the codes, in report order.
    pub const ALL: [Code; Code::COUNT] = [
        Code::A,
        Code::B,
        Code::C,
        Code::D,
        Code::E,
        Code::F,
        Code::G,
        Code::H,
        Code::I,
        Code::J,
        Code::K,
        Code::L,
        Code::M,
        Code::N,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        const LABELS: [&str; Code::COUNT] = [
            "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n",
        ];
        LABELS[self.index()]
    }
}

/// One of the two weekly sessions of a reporting period.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Session {
    /// The early-week session.
    First,
    /// The late-week session.
    Second,
}

impl Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Session::First => write!(f, "first session"),
            Session::Second => write!(f, "second session"),
        }
    }
}

/// The raw counters of one group for one session, as tapped by the user.
///
/// Only raw inputs live here. The totals and the percentage are derived in
/// [`SessionStats`].
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash)]
pub struct RawTally {
    pub codes: [u32; Code::COUNT],
    pub r107: u32,
    /// Members added to the group during the session (joins, transfers in).
    pub joined: u32,
    /// Members removed from the group during the session.
    pub transferred_out: u32,
}

impl RawTally {
    pub const EMPTY: RawTally = RawTally {
        codes: [0; Code::COUNT],
        r107: 0,
        joined: 0,
        transferred_out: 0,
    };

    pub fn get(&self, code: Code) -> u32 {
        self.codes[code.index()]
    }

    pub fn set(&mut self, code: Code, count: u32) {
        self.codes[code.index()] = count;
    }

    /// Convenience for building tallies in a chain.
    pub fn with(mut self, code: Code, count: u32) -> RawTally {
        self.set(code, count);
        self
    }

    pub fn with_r107(mut self, count: u32) -> RawTally {
        self.r107 = count;
        self
    }

    pub fn with_movement(mut self, joined: u32, transferred_out: u32) -> RawTally {
        self.joined = joined;
        self.transferred_out = transferred_out;
        self
    }

    /// The sum of the 14 lettered codes. `r107` is not part of it.
    pub fn total_coded(&self) -> u64 {
        self.codes.iter().map(|c| *c as u64).sum()
    }

    /// The net change in membership over this session.
    pub fn net_movement(&self) -> i64 {
        self.joined as i64 - self.transferred_out as i64
    }
}

impl RawTally {
    /// Field-wise sum. `None` if one of the counters overflows.
    pub fn checked_add(&self, rhs: &RawTally) -> Option<RawTally> {
        let mut res = *self;
        for (lhs, r) in res.codes.iter_mut().zip(rhs.codes.iter()) {
            *lhs = lhs.checked_add(*r)?;
        }
        res.r107 = res.r107.checked_add(rhs.r107)?;
        res.joined = res.joined.checked_add(rhs.joined)?;
        res.transferred_out = res.transferred_out.checked_add(rhs.transferred_out)?;
        Some(res)
    }
}

/// The counters of one group, for both sessions of the period.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct GroupTally {
    /// 1-based group number.
    pub group: u32,
    pub first_session: RawTally,
    pub second_session: RawTally,
}

/// The known membership of a group at the start of a period.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash)]
pub struct StartingCount {
    pub count: u32,
}

/// A group with its counters and its starting membership, joined by group number.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct GroupInput {
    pub group: u32,
    pub starting_count: u32,
    pub first_session: RawTally,
    pub second_session: RawTally,
}

/// Header information printed on top of the report.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PeriodInfo {
    pub district_name: Option<String>,
    pub district_code: Option<String>,
    pub local_name: Option<String>,
    pub local_code: Option<String>,
    pub purok: Option<String>,
    pub week: Option<u32>,
    pub month: Option<u32>,
}

// ******** Output data structures *********

/// A percentage with exactly two decimals, stored as hundredths of a percent.
///
/// `Percent::from_hundredths(3334)` is 33.34%.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash, Ord, PartialOrd)]
pub struct Percent(i64);

impl Percent {
    pub const ZERO: Percent = Percent(0);

    pub fn from_hundredths(hundredths: i64) -> Percent {
        Percent(hundredths)
    }

    pub fn hundredths(self) -> i64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

/// A session tally with its derived totals.
///
/// The derived values can only be produced from the raw tally and the membership
/// of the session, they cannot be edited.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct SessionStats {
    tally: RawTally,
    total_coded: u64,
    total_dalaw: u64,
    percent: Percent,
}

impl SessionStats {
    pub(crate) fn new(tally: RawTally, percent: Percent) -> SessionStats {
        let total_coded = tally.total_coded();
        SessionStats {
            tally,
            total_coded,
            total_dalaw: total_coded + tally.r107 as u64,
            percent,
        }
    }

    pub fn tally(&self) -> &RawTally {
        &self.tally
    }

    pub fn total_coded(&self) -> u64 {
        self.total_coded
    }

    /// `total_coded` plus the `r107` count.
    pub fn total_dalaw(&self) -> u64 {
        self.total_dalaw
    }

    pub fn percent(&self) -> Percent {
        self.percent
    }
}

/// The statistics for one group over the period.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct GroupResult {
    pub group: u32,
    /// The starting count as entered.
    pub starting_count: u32,
    /// The membership after the movements of the first session.
    pub first_membership: i64,
    /// The membership after the movements of both sessions, chained from the first one.
    pub second_membership: i64,
    pub first_session: SessionStats,
    pub second_session: SessionStats,
    /// The starting count for the next period.
    pub new_count: u32,
}

/// The outcome of the aggregation of a reporting period.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PeriodResult {
    pub groups: Vec<GroupResult>,
    pub first_session_total: SessionStats,
    pub second_session_total: SessionStats,
    /// The sum of the starting counts, as entered.
    pub total_starting_count: i64,
    pub first_membership: i64,
    pub second_membership: i64,
    pub overall_percentage: Percent,
    /// The starting counts for the next period, in group order.
    pub new_counts: Vec<StartingCount>,
}

/// Errors that prevent the computation of a period.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AttendanceErrors {
    EmptyPeriod,
    MismatchedLengths {
        groups: usize,
        starting_counts: usize,
    },
    GroupOutOfOrder {
        position: usize,
        group: u32,
    },
    UnknownGroup(u32),
    /// The membership used as denominator is zero or negative.
    /// Group 0 refers to the grand total.
    NonPositiveMembership {
        group: u32,
        session: Session,
        membership: i64,
    },
    NegativeCarryForward {
        group: u32,
        count: i64,
    },
    TooManyGroups {
        groups: usize,
        capacity: usize,
    },
    /// A counter does not fit in 32 bits. Group 0 refers to the grand total.
    CounterOverflow {
        group: u32,
        session: Session,
    },
}

impl Error for AttendanceErrors {}

impl Display for AttendanceErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceErrors::EmptyPeriod => write!(f, "the period has no groups"),
            AttendanceErrors::MismatchedLengths {
                groups,
                starting_counts,
            } => write!(
                f,
                "{} groups but {} starting counts were provided",
                groups, starting_counts
            ),
            AttendanceErrors::GroupOutOfOrder { position, group } => write!(
                f,
                "group {} found at position {}, expected group {}",
                group,
                position,
                position + 1
            ),
            AttendanceErrors::UnknownGroup(group) => write!(f, "unknown group {}", group),
            AttendanceErrors::NonPositiveMembership {
                group: 0,
                session,
                membership,
            } => write!(
                f,
                "total membership for the {} is {}, cannot compute a percentage",
                session, membership
            ),
            AttendanceErrors::NonPositiveMembership {
                group,
                session,
                membership,
            } => write!(
                f,
                "membership of group {} for the {} is {}, cannot compute a percentage",
                group, session, membership
            ),
            AttendanceErrors::NegativeCarryForward { group, count } => write!(
                f,
                "group {} would start the next period with {} members",
                group, count
            ),
            AttendanceErrors::TooManyGroups { groups, capacity } => write!(
                f,
                "{} groups do not fit in a report with room for {} groups",
                groups, capacity
            ),
            AttendanceErrors::CounterOverflow { group: 0, session } => {
                write!(f, "the totals of the {} are too large", session)
            }
            AttendanceErrors::CounterOverflow { group, session } => write!(
                f,
                "a counter of group {} for the {} is too large",
                group, session
            ),
        }
    }
}
