pub use crate::config::*;

/// A builder for the counters of a period.
///
/// This is the structure that the user mutates while tapping on counters. Once done, the
/// builder hands out a snapshot of the groups to the computation.
///
/// ```
/// pub use purok_attendance::builder::PeriodBuilder;
/// pub use purok_attendance::{Code, Session};
/// # use purok_attendance::AttendanceErrors;
///
/// let mut builder = PeriodBuilder::new(2);
/// builder.set_starting_count(1, 12)?;
/// builder.set_starting_count(2, 8)?;
/// builder.tap(1, Session::First, Code::A)?;
/// builder.tap(2, Session::Second, Code::D)?;
///
/// let res = builder.compute()?;
/// // The counts for the next period
/// let next = PeriodBuilder::seeded(&res.new_counts);
/// assert_eq!(next.num_groups(), 2);
///
/// # Ok::<(), AttendanceErrors>(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PeriodBuilder {
    groups: Vec<GroupInput>,
}

impl PeriodBuilder {
    /// A period with `num_groups` groups, all counters and starting counts at zero.
    pub fn new(num_groups: u32) -> PeriodBuilder {
        PeriodBuilder {
            groups: (1..=num_groups)
                .map(|group| GroupInput {
                    group,
                    ..GroupInput::default()
                })
                .collect(),
        }
    }

    /// A period starting from the counts carried over from the previous period.
    /// There is one group per count.
    pub fn seeded(counts: &[StartingCount]) -> PeriodBuilder {
        PeriodBuilder {
            groups: counts
                .iter()
                .enumerate()
                .map(|(idx, sc)| GroupInput {
                    group: idx as u32 + 1,
                    starting_count: sc.count,
                    ..GroupInput::default()
                })
                .collect(),
        }
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn set_starting_count(&mut self, group: u32, count: u32) -> Result<(), AttendanceErrors> {
        self.group_mut(group)?.starting_count = count;
        Ok(())
    }

    /// Adds one to a code.
    pub fn tap(
        &mut self,
        group: u32,
        session: Session,
        code: Code,
    ) -> Result<(), AttendanceErrors> {
        let t = self.tally_mut(group, session)?;
        let count = add_count(t.get(code), 1, group, session)?;
        t.set(code, count);
        Ok(())
    }

    /// Removes one from a code. A code at zero stays at zero.
    pub fn untap(
        &mut self,
        group: u32,
        session: Session,
        code: Code,
    ) -> Result<(), AttendanceErrors> {
        let t = self.tally_mut(group, session)?;
        t.set(code, t.get(code).saturating_sub(1));
        Ok(())
    }

    pub fn tap_r107(&mut self, group: u32, session: Session) -> Result<(), AttendanceErrors> {
        let t = self.tally_mut(group, session)?;
        t.r107 = add_count(t.r107, 1, group, session)?;
        Ok(())
    }

    pub fn add_joined(
        &mut self,
        group: u32,
        session: Session,
        count: u32,
    ) -> Result<(), AttendanceErrors> {
        let t = self.tally_mut(group, session)?;
        t.joined = add_count(t.joined, count, group, session)?;
        Ok(())
    }

    pub fn add_transferred_out(
        &mut self,
        group: u32,
        session: Session,
        count: u32,
    ) -> Result<(), AttendanceErrors> {
        let t = self.tally_mut(group, session)?;
        t.transferred_out = add_count(t.transferred_out, count, group, session)?;
        Ok(())
    }

    /// Replaces the whole tally of a session.
    pub fn set_tally(
        &mut self,
        group: u32,
        session: Session,
        tally: RawTally,
    ) -> Result<(), AttendanceErrors> {
        *self.tally_mut(group, session)? = tally;
        Ok(())
    }

    /// A copy of the current state of the groups. Later taps do not affect it.
    pub fn snapshot(&self) -> Vec<GroupInput> {
        self.groups.clone()
    }

    pub fn compute(&self) -> Result<PeriodResult, AttendanceErrors> {
        crate::compute_period(&self.snapshot())
    }

    fn group_mut(&mut self, group: u32) -> Result<&mut GroupInput, AttendanceErrors> {
        self.groups
            .iter_mut()
            .find(|g| g.group == group)
            .ok_or(AttendanceErrors::UnknownGroup(group))
    }

    fn tally_mut(
        &mut self,
        group: u32,
        session: Session,
    ) -> Result<&mut RawTally, AttendanceErrors> {
        let g = self.group_mut(group)?;
        Ok(match session {
            Session::First => &mut g.first_session,
            Session::Second => &mut g.second_session,
        })
    }
}

fn add_count(
    current: u32,
    count: u32,
    group: u32,
    session: Session,
) -> Result<u32, AttendanceErrors> {
    current
        .checked_add(count)
        .ok_or(AttendanceErrors::CounterOverflow { group, session })
}
