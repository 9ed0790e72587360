// Primitives for reading the counters of a period from CSV files.

use std::fs::File;

use crate::report::{
    io_common::{parse_count, simplify_file_name},
    *,
};

/// group, start, then 17 columns per session.
const SESSION_COLUMNS: usize = Code::COUNT + 3;
const NUM_COLUMNS: usize = 2 + 2 * SESSION_COLUMNS;

/// Reads the counters of each group and the starting counts.
///
/// The first line is a header. Each following line is a group:
/// `group,start,a..n,r107,in,out` for the first session then `a..n,r107,in,out`
/// for the second session. Empty cells count as 0.
pub fn read_csv_tallies(
    path: &str,
) -> ReportResult<(Vec<GroupTally>, Option<Vec<StartingCount>>)> {
    let records = get_records(path)?;

    let mut groups: Vec<GroupTally> = Vec::new();
    let mut starting: Vec<StartingCount> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_tallies: {:?} {:?}", lineno, line);
        if line.iter().all(|s| s.trim().is_empty()) {
            continue;
        }
        ensure!(
            line.len() >= NUM_COLUMNS,
            CsvLineTooShortSnafu {
                lineno,
                found: line.len(),
                expected: NUM_COLUMNS
            }
        );

        let counts: Vec<u32> = line
            .iter()
            .take(NUM_COLUMNS)
            .enumerate()
            .map(|(column, s)| {
                parse_count(s).context(CsvNumberSnafu {
                    lineno,
                    column: column + 1,
                    content: s,
                })
            })
            .collect::<ReportResult<Vec<u32>>>()?;

        groups.push(GroupTally {
            group: counts[0],
            first_session: read_session(&counts[2..2 + SESSION_COLUMNS]),
            second_session: read_session(&counts[2 + SESSION_COLUMNS..]),
        });
        starting.push(StartingCount { count: counts[1] });
    }
    info!(
        "read_csv_tallies: {}: {} groups",
        simplify_file_name(path),
        groups.len()
    );
    Ok((groups, Some(starting)))
}

fn read_session(counts: &[u32]) -> RawTally {
    let mut tally = RawTally::EMPTY;
    for code in Code::ALL {
        tally.set(code, counts[code.index()]);
    }
    tally.r107 = counts[Code::COUNT];
    tally.joined = counts[Code::COUNT + 1];
    tally.transferred_out = counts[Code::COUNT + 2];
    tally
}

fn get_records(path: &str) -> ReportResult<csv::StringRecordsIntoIter<File>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    Ok(rdr.into_records())
}
