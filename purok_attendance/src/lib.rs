/*!
Attendance aggregation for purok reports.

A reporting period has two sessions (early week and late week). For every group of the
purok, the kalihim records how many members fell under each reason code, and how many
members joined or left the group. This crate turns these counters into attendance
percentages, totals for the whole purok and the starting membership for the next period.
It can then lay the results out onto the cells of the printed report.

```
use purok_attendance::*;

let groups = vec![GroupTally {
    group: 1,
    first_session: RawTally::EMPTY.with(Code::A, 4).with_movement(2, 1),
    second_session: RawTally::EMPTY.with(Code::B, 3).with_movement(0, 3),
}];
let res = compute(&groups, &[StartingCount { count: 10 }])?;
assert_eq!(res.groups[0].first_membership, 11);
assert_eq!(res.groups[0].second_membership, 8);
assert_eq!(res.new_counts[0].count, 8);

let cells = project(&res, None, &SheetLayout::REFERENCE)?;
assert_eq!(cells.get(&CellAddress::new("C", 6)), Some(&CellValue::Count(4)));
# Ok::<(), AttendanceErrors>(())
```
*/
mod config;
use log::{debug, info, warn};

pub mod builder;
pub mod layout;
pub mod manual;
pub mod rounding;

pub use crate::config::*;
pub use crate::layout::{project, CellAddress, CellMap, CellValue, SessionField, SheetLayout};
use crate::rounding::{percentage, round_mean};

/// Joins the counters of each group with its starting count.
///
/// The two lists are aligned by position: the starting count at index `i` belongs to
/// the group at index `i`, which must be group number `i + 1`.
pub fn join_groups(
    groups: &[GroupTally],
    starting: &[StartingCount],
) -> Result<Vec<GroupInput>, AttendanceErrors> {
    if groups.len() != starting.len() {
        return Err(AttendanceErrors::MismatchedLengths {
            groups: groups.len(),
            starting_counts: starting.len(),
        });
    }
    let mut res: Vec<GroupInput> = Vec::with_capacity(groups.len());
    for (idx, (g, s)) in groups.iter().zip(starting.iter()).enumerate() {
        if g.group as usize != idx + 1 {
            return Err(AttendanceErrors::GroupOutOfOrder {
                position: idx,
                group: g.group,
            });
        }
        res.push(GroupInput {
            group: g.group,
            starting_count: s.count,
            first_session: g.first_session,
            second_session: g.second_session,
        });
    }
    Ok(res)
}

/// Computes the statistics of a period from the counters of each group and the
/// starting counts, given as two lists aligned by position.
///
/// See [`compute_period`] for the details.
pub fn compute(
    groups: &[GroupTally],
    starting: &[StartingCount],
) -> Result<PeriodResult, AttendanceErrors> {
    let joined = join_groups(groups, starting)?;
    compute_period(&joined)
}

/// Computes the statistics of a period.
///
/// For each group:
/// * a starting count of zero is replaced by 1 before computing the memberships
/// * the membership of the first session is the starting count adjusted by the movements
///   of the first session
/// * the membership of the second session is the membership of the first session
///   adjusted by the movements of the second session
/// * the percentage of a session is the total of the lettered codes over the membership
///   of that session
/// * the starting count for the next period is the entered starting count adjusted by the
///   net movements of both sessions
///
/// The totals follow the same rules with the sum of the counters and the sum of the
/// entered starting counts. The overall percentage is the mean of the two session
/// percentages of the totals.
pub fn compute_period(groups: &[GroupInput]) -> Result<PeriodResult, AttendanceErrors> {
    info!("compute_period: processing {} groups", groups.len());
    if groups.is_empty() {
        return Err(AttendanceErrors::EmptyPeriod);
    }

    let mut group_results: Vec<GroupResult> = Vec::with_capacity(groups.len());
    for g in groups.iter() {
        let gr = compute_group(g)?;
        debug!(
            "compute_period: group {}: memberships {} -> {} -> {}, percents {} / {}",
            gr.group,
            gr.starting_count,
            gr.first_membership,
            gr.second_membership,
            gr.first_session.percent(),
            gr.second_session.percent()
        );
        group_results.push(gr);
    }

    // The totals are recomputed from the raw counters.
    let first_tally = sum_tallies(groups.iter().map(|g| g.first_session), Session::First)?;
    let second_tally = sum_tallies(groups.iter().map(|g| g.second_session), Session::Second)?;

    let total_starting_count: i64 = groups.iter().map(|g| g.starting_count as i64).sum();
    let first_membership = total_starting_count + first_tally.net_movement();
    let second_membership = first_membership + second_tally.net_movement();

    let first_session_total = derive_session(first_tally, first_membership, 0, Session::First)?;
    let second_session_total =
        derive_session(second_tally, second_membership, 0, Session::Second)?;

    let overall_percentage = round_mean(&[
        first_session_total.percent(),
        second_session_total.percent(),
    ]);

    info!(
        "compute_period: totals: {} / {} overall {}",
        first_session_total.percent(),
        second_session_total.percent(),
        overall_percentage
    );

    let new_counts = group_results
        .iter()
        .map(|gr| StartingCount {
            count: gr.new_count,
        })
        .collect();

    Ok(PeriodResult {
        groups: group_results,
        first_session_total,
        second_session_total,
        total_starting_count,
        first_membership,
        second_membership,
        overall_percentage,
        new_counts,
    })
}

fn compute_group(g: &GroupInput) -> Result<GroupResult, AttendanceErrors> {
    let base: i64 = if g.starting_count == 0 {
        warn!(
            "compute_group: group {} has no starting count, using 1 instead",
            g.group
        );
        1
    } else {
        g.starting_count as i64
    };

    let first_membership = base + g.first_session.net_movement();
    let second_membership = first_membership + g.second_session.net_movement();

    let first_session = derive_session(g.first_session, first_membership, g.group, Session::First)?;
    let second_session =
        derive_session(g.second_session, second_membership, g.group, Session::Second)?;

    // Applied once to the entered count, not chained through the memberships above.
    let new_count = g.starting_count as i64
        + g.first_session.net_movement()
        + g.second_session.net_movement();
    let new_count = u32::try_from(new_count).map_err(|_| AttendanceErrors::NegativeCarryForward {
        group: g.group,
        count: new_count,
    })?;

    Ok(GroupResult {
        group: g.group,
        starting_count: g.starting_count,
        first_membership,
        second_membership,
        first_session,
        second_session,
        new_count,
    })
}

fn sum_tallies<I: Iterator<Item = RawTally>>(
    mut tallies: I,
    session: Session,
) -> Result<RawTally, AttendanceErrors> {
    tallies.try_fold(RawTally::EMPTY, |acc, t| {
        acc.checked_add(&t)
            .ok_or(AttendanceErrors::CounterOverflow { group: 0, session })
    })
}

fn derive_session(
    tally: RawTally,
    membership: i64,
    group: u32,
    session: Session,
) -> Result<SessionStats, AttendanceErrors> {
    if membership <= 0 {
        return Err(AttendanceErrors::NonPositiveMembership {
            group,
            session,
            membership,
        });
    }
    let percent = percentage(tally.total_coded(), membership);
    Ok(SessionStats::new(tally, percent))
}

impl GroupResult {
    /// The mean of the percentages of both sessions for this group.
    pub fn overall_percentage(&self) -> Percent {
        round_mean(&[self.first_session.percent(), self.second_session.percent()])
    }
}
