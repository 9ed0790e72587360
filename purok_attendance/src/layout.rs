//! Placement of the results of a period onto the cells of the printed report.
//!
//! The report is a fixed spreadsheet template. The placement is described by a
//! [`SheetLayout`]: a table from the fields of the results to the columns of the template.
//! [`SheetLayout::REFERENCE`] is the template used by the district.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Display;

use log::debug;

use crate::config::*;

/// A field of a session, as printed in one column of the report.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum SessionField {
    Code(Code),
    TotalCoded,
    Percent,
    R107,
    TotalDalaw,
}

/// The membership columns of a group row, from the starting count to the count carried
/// to the next period.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum MembershipField {
    Starting,
    FirstJoined,
    FirstTransferredOut,
    FirstMembership,
    /// Same value as `FirstMembership`, printed again as the start of the second session.
    SecondStarting,
    SecondJoined,
    SecondTransferredOut,
    NewCount,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum HeaderField {
    DistrictName,
    DistrictCode,
    LocalName,
    LocalCode,
    Purok,
    Week,
    Month,
}

/// The address of a cell, such as `C6`.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct CellAddress {
    column: &'static str,
    row: u32,
}

impl CellAddress {
    /// The column is given in letters, the row starts at 1.
    pub const fn new(column: &'static str, row: u32) -> CellAddress {
        CellAddress { column, row }
    }

    pub fn column(&self) -> &'static str {
        self.column
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    /// The 0-based index of the column: `A` is 0, `Z` is 25, `AA` is 26.
    pub fn column_index(&self) -> Option<u32> {
        column_letters_to_index(self.column)
    }
}

impl Ord for CellAddress {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.row, self.column_index(), self.column).cmp(&(
            other.row,
            other.column_index(),
            other.column,
        ))
    }
}

impl PartialOrd for CellAddress {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for CellAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

fn column_letters_to_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_uppercase() {
            return None;
        }
        col = col.checked_mul(26)?.checked_add(c as u32 - 'A' as u32 + 1)?;
    }
    Some(col - 1)
}

/// The content of a cell.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CellValue {
    Count(i64),
    Percent(Percent),
    Text(String),
}

pub type CellMap = BTreeMap<CellAddress, CellValue>;

/// The geometry of the report template.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SheetLayout {
    /// The row of the first group. Each following group is on the next row.
    pub first_group_row: u32,
    /// The row of the totals. It also bounds the number of groups.
    pub totals_row: u32,
    pub first_session_columns: &'static [(SessionField, &'static str)],
    pub second_session_columns: &'static [(SessionField, &'static str)],
    /// Fields always printed as 0, whatever their value.
    pub zeroed_fields: &'static [SessionField],
    /// The mean of the two session percentages of a group (or of the totals).
    pub group_percent_column: &'static str,
    pub membership_columns: &'static [(MembershipField, &'static str)],
    /// The membership fields printed on the totals row.
    pub totals_membership_fields: &'static [MembershipField],
    pub header_cells: &'static [(HeaderField, CellAddress)],
}

const REFERENCE_FIRST_SESSION: [(SessionField, &str); 18] = [
    (SessionField::Code(Code::A), "C"),
    (SessionField::Code(Code::B), "D"),
    (SessionField::Code(Code::C), "E"),
    (SessionField::Code(Code::D), "F"),
    (SessionField::Code(Code::E), "G"),
    (SessionField::Code(Code::F), "H"),
    (SessionField::Code(Code::G), "I"),
    (SessionField::Code(Code::H), "J"),
    (SessionField::Code(Code::I), "K"),
    (SessionField::Code(Code::J), "L"),
    (SessionField::Code(Code::K), "M"),
    (SessionField::Code(Code::L), "N"),
    (SessionField::Code(Code::M), "O"),
    (SessionField::Code(Code::N), "P"),
    (SessionField::TotalCoded, "Q"),
    (SessionField::Percent, "R"),
    (SessionField::R107, "S"),
    (SessionField::TotalDalaw, "T"),
];

const REFERENCE_SECOND_SESSION: [(SessionField, &str); 18] = [
    (SessionField::Code(Code::A), "W"),
    (SessionField::Code(Code::B), "X"),
    (SessionField::Code(Code::C), "Y"),
    (SessionField::Code(Code::D), "Z"),
    (SessionField::Code(Code::E), "AA"),
    (SessionField::Code(Code::F), "AB"),
    (SessionField::Code(Code::G), "AC"),
    (SessionField::Code(Code::H), "AD"),
    (SessionField::Code(Code::I), "AE"),
    (SessionField::Code(Code::J), "AF"),
    (SessionField::Code(Code::K), "AG"),
    (SessionField::Code(Code::L), "AH"),
    (SessionField::Code(Code::M), "AI"),
    (SessionField::Code(Code::N), "AJ"),
    (SessionField::TotalCoded, "AK"),
    (SessionField::Percent, "AL"),
    (SessionField::R107, "AM"),
    (SessionField::TotalDalaw, "AN"),
];

const REFERENCE_MEMBERSHIP: [(MembershipField, &str); 8] = [
    (MembershipField::Starting, "AR"),
    (MembershipField::FirstJoined, "AS"),
    (MembershipField::FirstTransferredOut, "AT"),
    (MembershipField::FirstMembership, "AU"),
    (MembershipField::SecondStarting, "AV"),
    (MembershipField::SecondJoined, "AW"),
    (MembershipField::SecondTransferredOut, "AX"),
    (MembershipField::NewCount, "AY"),
];

const REFERENCE_HEADER: [(HeaderField, CellAddress); 7] = [
    (HeaderField::DistrictName, CellAddress::new("D", 2)),
    (HeaderField::DistrictCode, CellAddress::new("K", 2)),
    (HeaderField::LocalName, CellAddress::new("D", 3)),
    (HeaderField::LocalCode, CellAddress::new("K", 3)),
    (HeaderField::Purok, CellAddress::new("Z", 2)),
    (HeaderField::Week, CellAddress::new("Z", 3)),
    (HeaderField::Month, CellAddress::new("AF", 3)),
];

impl SheetLayout {
    /// The district template: groups on rows 6 to 25, totals on row 26.
    ///
    /// Code `m` is tallied and counted in the totals, but the template expects 0 in its
    /// columns.
    pub const REFERENCE: SheetLayout = SheetLayout {
        first_group_row: 6,
        totals_row: 26,
        first_session_columns: &REFERENCE_FIRST_SESSION,
        second_session_columns: &REFERENCE_SECOND_SESSION,
        zeroed_fields: &[SessionField::Code(Code::M)],
        group_percent_column: "AP",
        membership_columns: &REFERENCE_MEMBERSHIP,
        totals_membership_fields: &[MembershipField::Starting, MembershipField::NewCount],
        header_cells: &REFERENCE_HEADER,
    };

    /// The maximum number of groups that fit between the first group row and the totals.
    pub fn group_capacity(&self) -> usize {
        self.totals_row.saturating_sub(self.first_group_row) as usize
    }
}

/// Places the results of a period onto the cells of the report.
///
/// The header is only filled if some period information is provided, and only with
/// the fields that are present.
///
/// Fails if there are more groups than rows in the template.
pub fn project(
    result: &PeriodResult,
    info: Option<&PeriodInfo>,
    layout: &SheetLayout,
) -> Result<CellMap, AttendanceErrors> {
    let capacity = layout.group_capacity();
    if result.groups.len() > capacity {
        return Err(AttendanceErrors::TooManyGroups {
            groups: result.groups.len(),
            capacity,
        });
    }

    let mut cells = CellMap::new();

    if let Some(info) = info {
        for (field, address) in layout.header_cells.iter() {
            if let Some(value) = header_value(info, *field) {
                cells.insert(*address, value);
            }
        }
    }

    for (idx, gr) in result.groups.iter().enumerate() {
        let row = layout.first_group_row + idx as u32;
        debug!("project: group {} on row {}", gr.group, row);
        project_sessions(&mut cells, &gr.first_session, &gr.second_session, layout, row);
        cells.insert(
            CellAddress::new(layout.group_percent_column, row),
            CellValue::Percent(gr.overall_percentage()),
        );
        for (field, column) in layout.membership_columns.iter() {
            cells.insert(
                CellAddress::new(*column, row),
                CellValue::Count(group_membership_value(gr, *field)),
            );
        }
    }

    let row = layout.totals_row;
    project_sessions(
        &mut cells,
        &result.first_session_total,
        &result.second_session_total,
        layout,
        row,
    );
    cells.insert(
        CellAddress::new(layout.group_percent_column, row),
        CellValue::Percent(result.overall_percentage),
    );
    for (field, column) in layout.membership_columns.iter() {
        if layout.totals_membership_fields.contains(field) {
            cells.insert(
                CellAddress::new(*column, row),
                CellValue::Count(total_membership_value(result, *field)),
            );
        }
    }

    debug!("project: {} cells", cells.len());
    Ok(cells)
}

fn project_sessions(
    cells: &mut CellMap,
    first: &SessionStats,
    second: &SessionStats,
    layout: &SheetLayout,
    row: u32,
) {
    let sessions = [
        (first, layout.first_session_columns),
        (second, layout.second_session_columns),
    ];
    for (stats, columns) in sessions {
        for (field, column) in columns.iter() {
            let value = if layout.zeroed_fields.contains(field) {
                CellValue::Count(0)
            } else {
                session_value(stats, *field)
            };
            cells.insert(CellAddress::new(*column, row), value);
        }
    }
}

fn session_value(stats: &SessionStats, field: SessionField) -> CellValue {
    match field {
        SessionField::Code(code) => CellValue::Count(stats.tally().get(code) as i64),
        SessionField::TotalCoded => CellValue::Count(stats.total_coded() as i64),
        SessionField::Percent => CellValue::Percent(stats.percent()),
        SessionField::R107 => CellValue::Count(stats.tally().r107 as i64),
        SessionField::TotalDalaw => CellValue::Count(stats.total_dalaw() as i64),
    }
}

fn group_membership_value(gr: &GroupResult, field: MembershipField) -> i64 {
    let first = gr.first_session.tally();
    let second = gr.second_session.tally();
    match field {
        MembershipField::Starting => gr.starting_count as i64,
        MembershipField::FirstJoined => first.joined as i64,
        MembershipField::FirstTransferredOut => first.transferred_out as i64,
        MembershipField::FirstMembership | MembershipField::SecondStarting => gr.first_membership,
        MembershipField::SecondJoined => second.joined as i64,
        MembershipField::SecondTransferredOut => second.transferred_out as i64,
        MembershipField::NewCount => gr.new_count as i64,
    }
}

fn total_membership_value(result: &PeriodResult, field: MembershipField) -> i64 {
    let first = result.first_session_total.tally();
    let second = result.second_session_total.tally();
    match field {
        MembershipField::Starting => result.total_starting_count,
        MembershipField::FirstJoined => first.joined as i64,
        MembershipField::FirstTransferredOut => first.transferred_out as i64,
        MembershipField::FirstMembership | MembershipField::SecondStarting => {
            result.first_membership
        }
        MembershipField::SecondJoined => second.joined as i64,
        MembershipField::SecondTransferredOut => second.transferred_out as i64,
        MembershipField::NewCount => result.new_counts.iter().map(|c| c.count as i64).sum(),
    }
}

fn header_value(info: &PeriodInfo, field: HeaderField) -> Option<CellValue> {
    match field {
        HeaderField::DistrictName => info.district_name.clone().map(CellValue::Text),
        HeaderField::DistrictCode => info.district_code.clone().map(CellValue::Text),
        HeaderField::LocalName => info.local_name.clone().map(CellValue::Text),
        HeaderField::LocalCode => info.local_code.clone().map(CellValue::Text),
        HeaderField::Purok => info.purok.clone().map(CellValue::Text),
        HeaderField::Week => info.week.map(|w| CellValue::Count(w as i64)),
        HeaderField::Month => info.month.map(|m| CellValue::Count(m as i64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute;

    fn sample_result() -> PeriodResult {
        let groups = vec![
            GroupTally {
                group: 1,
                first_session: RawTally::EMPTY
                    .with(Code::A, 2)
                    .with(Code::M, 3)
                    .with_r107(1)
                    .with_movement(2, 1),
                second_session: RawTally::EMPTY.with(Code::N, 4).with_movement(0, 3),
            },
            GroupTally {
                group: 2,
                first_session: RawTally::EMPTY.with(Code::B, 5),
                second_session: RawTally::EMPTY.with(Code::M, 1).with(Code::C, 1),
            },
        ];
        let starting = vec![StartingCount { count: 10 }, StartingCount { count: 20 }];
        compute(&groups, &starting).unwrap()
    }

    fn cell<'a>(cells: &'a CellMap, column: &'static str, row: u32) -> Option<&'a CellValue> {
        cells.get(&CellAddress::new(column, row))
    }

    #[test]
    fn reference_columns_are_twenty_apart() {
        let layout = SheetLayout::REFERENCE;
        assert_eq!(layout.first_session_columns.len(), 18);
        assert_eq!(layout.second_session_columns.len(), 18);
        for ((f1, c1), (f2, c2)) in layout
            .first_session_columns
            .iter()
            .zip(layout.second_session_columns.iter())
        {
            assert_eq!(f1, f2);
            let i1 = CellAddress::new(*c1, 1).column_index().unwrap();
            let i2 = CellAddress::new(*c2, 1).column_index().unwrap();
            assert_eq!(i2, i1 + 20);
        }
        // Contiguous run starting at C
        for (idx, (_, c)) in layout.first_session_columns.iter().enumerate() {
            assert_eq!(CellAddress::new(*c, 1).column_index(), Some(2 + idx as u32));
        }
        assert_eq!(layout.group_capacity(), 20);
    }

    #[test]
    fn column_letters() {
        assert_eq!(CellAddress::new("A", 1).column_index(), Some(0));
        assert_eq!(CellAddress::new("Z", 1).column_index(), Some(25));
        assert_eq!(CellAddress::new("AA", 1).column_index(), Some(26));
        assert_eq!(CellAddress::new("AY", 1).column_index(), Some(50));
        assert_eq!(CellAddress::new("a", 1).column_index(), None);
        assert_eq!(CellAddress::new("", 1).column_index(), None);
        let a = CellAddress::new("AF", 3);
        assert_eq!(a.to_string(), "AF3");
        assert_eq!((a.column(), a.row()), ("AF", 3));
    }

    #[test]
    fn group_rows() {
        let cells = project(&sample_result(), None, &SheetLayout::REFERENCE).unwrap();
        // Group 1, first session: a=2, m=3 (printed as 0), 5 coded out of 11
        assert_eq!(cell(&cells, "C", 6), Some(&CellValue::Count(2)));
        assert_eq!(cell(&cells, "Q", 6), Some(&CellValue::Count(5)));
        assert_eq!(
            cell(&cells, "R", 6),
            Some(&CellValue::Percent(Percent::from_hundredths(4545)))
        );
        assert_eq!(cell(&cells, "S", 6), Some(&CellValue::Count(1)));
        assert_eq!(cell(&cells, "T", 6), Some(&CellValue::Count(6)));
        // Group 1, second session: n=4 out of 8
        assert_eq!(cell(&cells, "AJ", 6), Some(&CellValue::Count(4)));
        assert_eq!(
            cell(&cells, "AL", 6),
            Some(&CellValue::Percent(Percent::from_hundredths(5000)))
        );
        // (45.45 + 50) / 2 = 47.725
        assert_eq!(
            cell(&cells, "AP", 6),
            Some(&CellValue::Percent(Percent::from_hundredths(4773)))
        );
        // Group 2 is on the next row
        assert_eq!(cell(&cells, "D", 7), Some(&CellValue::Count(5)));
        assert_eq!(cell(&cells, "Y", 7), Some(&CellValue::Count(1)));
        assert_eq!(cell(&cells, "C", 8), None);
    }

    #[test]
    fn code_m_is_always_zero() {
        let res = sample_result();
        assert_eq!(res.groups[0].first_session.tally().get(Code::M), 3);
        let cells = project(&res, None, &SheetLayout::REFERENCE).unwrap();
        assert_eq!(cell(&cells, "O", 6), Some(&CellValue::Count(0)));
        assert_eq!(cell(&cells, "AI", 7), Some(&CellValue::Count(0)));
        assert_eq!(cell(&cells, "O", 26), Some(&CellValue::Count(0)));
        assert_eq!(cell(&cells, "AI", 26), Some(&CellValue::Count(0)));
        // The total still counts it
        assert_eq!(cell(&cells, "AK", 7), Some(&CellValue::Count(2)));
    }

    #[test]
    fn membership_columns() {
        let cells = project(&sample_result(), None, &SheetLayout::REFERENCE).unwrap();
        let row: Vec<Option<&CellValue>> = ["AR", "AS", "AT", "AU", "AV", "AW", "AX", "AY"]
            .iter()
            .map(|c| cell(&cells, *c, 6))
            .collect();
        let expected: Vec<CellValue> = [10, 2, 1, 11, 11, 0, 3, 8]
            .iter()
            .map(|v| CellValue::Count(*v))
            .collect();
        assert_eq!(row, expected.iter().map(Some).collect::<Vec<_>>());
        // Totals: only the starting and final counts
        assert_eq!(cell(&cells, "AR", 26), Some(&CellValue::Count(30)));
        assert_eq!(cell(&cells, "AY", 26), Some(&CellValue::Count(28)));
        assert_eq!(cell(&cells, "AS", 26), None);
    }

    #[test]
    fn totals_row() {
        let res = sample_result();
        let cells = project(&res, None, &SheetLayout::REFERENCE).unwrap();
        // 5 + 5 coded out of 30 + 2 - 1 = 31
        assert_eq!(cell(&cells, "Q", 26), Some(&CellValue::Count(10)));
        assert_eq!(
            cell(&cells, "R", 26),
            Some(&CellValue::Percent(Percent::from_hundredths(3226)))
        );
        assert_eq!(
            cell(&cells, "AP", 26),
            Some(&CellValue::Percent(res.overall_percentage))
        );
    }

    #[test]
    fn header_only_when_provided() {
        let res = sample_result();
        let cells = project(&res, None, &SheetLayout::REFERENCE).unwrap();
        assert_eq!(cell(&cells, "D", 2), None);
        assert_eq!(cell(&cells, "Z", 3), None);

        let info = PeriodInfo {
            district_name: Some("Pampanga East".to_string()),
            purok: Some("3".to_string()),
            week: Some(2),
            ..PeriodInfo::default()
        };
        let cells = project(&res, Some(&info), &SheetLayout::REFERENCE).unwrap();
        assert_eq!(
            cell(&cells, "D", 2),
            Some(&CellValue::Text("Pampanga East".to_string()))
        );
        assert_eq!(cell(&cells, "Z", 2), Some(&CellValue::Text("3".to_string())));
        assert_eq!(cell(&cells, "Z", 3), Some(&CellValue::Count(2)));
        assert_eq!(cell(&cells, "K", 2), None);
        assert_eq!(cell(&cells, "AF", 3), None);
    }

    #[test]
    fn too_many_groups() {
        let groups: Vec<GroupTally> = (1..=21)
            .map(|i| GroupTally {
                group: i,
                ..GroupTally::default()
            })
            .collect();
        let starting = vec![StartingCount { count: 5 }; 21];
        let res = compute(&groups, &starting).unwrap();
        assert_eq!(
            project(&res, None, &SheetLayout::REFERENCE),
            Err(AttendanceErrors::TooManyGroups {
                groups: 21,
                capacity: 20
            })
        );
        let res = compute(&groups[..20], &starting[..20]).unwrap();
        let cells = project(&res, None, &SheetLayout::REFERENCE).unwrap();
        assert_eq!(cell(&cells, "C", 25), Some(&CellValue::Count(0)));
    }

    #[test]
    fn deterministic() {
        let res = sample_result();
        let c1 = project(&res, None, &SheetLayout::REFERENCE).unwrap();
        let c2 = project(&res, None, &SheetLayout::REFERENCE).unwrap();
        assert_eq!(c1, c2);
        // 18 + 18 + 1 + 8 per group, 18 + 18 + 1 + 2 for the totals
        assert_eq!(c1.len(), 2 * 45 + 39);
    }
}
