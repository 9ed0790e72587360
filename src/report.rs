use log::{debug, info, warn};

use purok_attendance::*;
use snafu::{prelude::*, Snafu};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::report::config_reader::*;
use crate::report::io_common::write_output;
use crate::report::seed_store::SeedStore;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;
pub mod seed_store;

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing JSON output"))]
    WritingJson { source: serde_json::Error },
    #[snafu(display("Field {field} should be a number"))]
    ParsingJsonNumber { field: String },

    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("CSV line {lineno} has {found} columns, expected {expected}"))]
    CsvLineTooShort {
        lineno: usize,
        found: usize,
        expected: usize,
    },
    #[snafu(display("CSV line {lineno}, column {column}: {content:?} is not a count"))]
    CsvNumber {
        lineno: usize,
        column: usize,
        content: String,
    },

    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Excel file {path} has no worksheet to use"))]
    EmptyExcel { path: String },
    #[snafu(display("Excel file {path} has several worksheets, the worksheet name must be provided"))]
    AmbiguousWorksheet { path: String },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Error writing Excel file {path}"))]
    WritingXlsx {
        source: rust_xlsxwriter::XlsxError,
        path: String,
    },

    #[snafu(display("Cannot compute the period: {source}"))]
    Attendance { source: AttendanceErrors },
    #[snafu(display("No starting counts: provide them in the period file or use a seed store"))]
    MissingStartingCounts {},
    #[snafu(display("No starting counts for purok {purok} in the seed store {path}"))]
    MissingStoredCounts { purok: String, path: String },
    #[snafu(display("No input: use --config or --input"))]
    MissingInput {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

/// The counters and settings of a period, as read from the inputs.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PeriodData {
    pub info: Option<PeriodInfo>,
    pub groups: Vec<GroupTally>,
    pub starting: Option<Vec<StartingCount>>,
}

fn session_to_json(stats: &SessionStats) -> JSValue {
    let tally = stats.tally();
    let mut m: JSMap<String, JSValue> = JSMap::new();
    for code in Code::ALL {
        m.insert(code.label().to_string(), json!(tally.get(code)));
    }
    m.insert("r107".to_string(), json!(tally.r107));
    m.insert("in".to_string(), json!(tally.joined));
    m.insert("out".to_string(), json!(tally.transferred_out));
    m.insert("totalCoded".to_string(), json!(stats.total_coded()));
    m.insert("totalDalaw".to_string(), json!(stats.total_dalaw()));
    m.insert("percent".to_string(), json!(stats.percent().as_f64()));
    JSValue::Object(m)
}

fn info_to_json(info: &PeriodInfo) -> JSValue {
    json!({
        "districtName": info.district_name,
        "districtCode": info.district_code,
        "localName": info.local_name,
        "localCode": info.local_code,
        "purok": info.purok,
        "week": info.week,
        "month": info.month,
    })
}

/// The statistics of the period, in the JSON shape used by the mobile application.
pub fn build_summary_js(info: Option<&PeriodInfo>, res: &PeriodResult) -> JSValue {
    let groups: Vec<JSValue> = res
        .groups
        .iter()
        .map(|gr| {
            json!({
                "group": gr.group,
                "firstSession": session_to_json(&gr.first_session),
                "secondSession": session_to_json(&gr.second_session),
                "firstSessionSNumber": gr.first_membership,
                "secondSessionSNumber": gr.second_membership,
            })
        })
        .collect();
    let starting: Vec<JSValue> = res
        .groups
        .iter()
        .map(|gr| json!({ "count": gr.starting_count }))
        .collect();
    let new_counts: Vec<JSValue> = res
        .new_counts
        .iter()
        .map(|sc| json!({ "count": sc.count }))
        .collect();
    json!({
        "period": info.map(info_to_json),
        "groupValues": groups,
        "sNumber": starting,
        "firstSessionCodeTotal": session_to_json(&res.first_session_total),
        "secondSessionCodeTotal": session_to_json(&res.second_session_total),
        "overAllPercentage": res.overall_percentage.as_f64(),
        "newSNumber": new_counts,
    })
}

/// The cells of the report, keyed by address (`C6`).
pub fn cells_to_json(cells: &CellMap) -> JSValue {
    let mut m: JSMap<String, JSValue> = JSMap::new();
    for (address, value) in cells.iter() {
        let v = match value {
            CellValue::Count(c) => json!(c),
            CellValue::Percent(p) => json!(p.as_f64()),
            CellValue::Text(s) => json!(s),
        };
        m.insert(address.to_string(), v);
    }
    JSValue::Object(m)
}

fn read_period_data(args: &Args) -> ReportResult<PeriodData> {
    let mut data = PeriodData::default();
    if let Some(config_path) = args.config.as_deref() {
        let config = read_period_config(config_path)?;
        data = config.to_period_data()?;
    }

    if let Some(input_path) = args.input.as_deref() {
        let input_type = args.input_type.clone().unwrap_or_else(|| "csv".to_string());
        info!("Attempting to read {} file {:?}", input_type, input_path);
        let (groups, starting) = match input_type.as_str() {
            "csv" => io_csv::read_csv_tallies(input_path)?,
            "json" => {
                let input = read_period_config(input_path)?.to_period_data()?;
                if data.info.is_none() {
                    data.info = input.info;
                }
                (input.groups, input.starting)
            }
            x => whatever!("Input type not implemented {:?}", x),
        };
        data.groups = groups;
        // Counts from the input take precedence over the ones from the config.
        if starting.is_some() {
            data.starting = starting;
        }
    }

    if args.config.is_none() && args.input.is_none() {
        return MissingInputSnafu {}.fail();
    }
    Ok(data)
}

fn store_purok(args: &Args, info: Option<&PeriodInfo>) -> Option<String> {
    args.purok
        .clone()
        .or_else(|| info.and_then(|i| i.purok.clone()))
}

pub fn run_period(args: &Args) -> ReportResult<()> {
    let data = read_period_data(args)?;
    debug!("run_period: data: {:?}", data);

    let seed_store = args.seed_store.as_deref().map(SeedStore::new);
    let purok = store_purok(args, data.info.as_ref());

    let starting: Vec<StartingCount> = match (data.starting.clone(), &seed_store, &purok) {
        (Some(s), _, _) => s,
        (None, Some(store), Some(p)) => match store.load(p)? {
            Some(s) => {
                info!("Using the starting counts of purok {} from the seed store", p);
                s
            }
            None => {
                return MissingStoredCountsSnafu {
                    purok: p,
                    path: args.seed_store.clone().unwrap_or_default(),
                }
                .fail()
            }
        },
        _ => return MissingStartingCountsSnafu {}.fail(),
    };

    let result = compute(&data.groups, &starting).context(AttendanceSnafu {})?;
    info!(
        "Period computed: {} groups, overall percentage {}",
        result.groups.len(),
        result.overall_percentage
    );

    let cells = project(&result, data.info.as_ref(), &SheetLayout::REFERENCE)
        .context(AttendanceSnafu {})?;
    let cells_js = cells_to_json(&cells);
    let pretty_cells = serde_json::to_string_pretty(&cells_js).context(WritingJsonSnafu {})?;

    if let Some(summary_target) = args.summary.as_deref() {
        let summary_js = build_summary_js(data.info.as_ref(), &result);
        let pretty_summary =
            serde_json::to_string_pretty(&summary_js).context(WritingJsonSnafu {})?;
        write_output(summary_target, &pretty_summary)?;
    }

    match args.out.as_deref() {
        Some(out) => write_output(out, &pretty_cells)?,
        None if args.summary.is_none() && args.xlsx.is_none() => {
            write_output("stdout", &pretty_cells)?
        }
        None => {}
    }

    if let Some(xlsx_path) = args.xlsx.as_deref() {
        let template = match args.template.as_deref() {
            Some(t) => Some(io_xlsx::read_template(t, args.worksheet.as_deref())?),
            None => None,
        };
        io_xlsx::write_report(xlsx_path, template.as_ref(), &cells)?;
    }

    if let (Some(store), Some(p)) = (&seed_store, &purok) {
        store.store(p, &result.new_counts)?;
    }

    // The reference cells, if provided for comparison
    if let Some(reference_p) = args.reference.as_deref() {
        let reference = read_json(reference_p)?;
        let pretty_reference =
            serde_json::to_string_pretty(&reference).context(WritingJsonSnafu {})?;
        if pretty_reference != pretty_cells {
            warn!("Found differences with the reference cells");
            print_diff(pretty_reference.as_str(), pretty_cells.as_str(), "\n");
            whatever!("Difference detected between computed cells and reference cells")
        }
        info!("The computed cells match the reference {}", reference_p);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    const PERIOD: &str = r#"{
        "period": {
            "districtName": "Pampanga East",
            "districtCode": "PE-07",
            "localName": "San Isidro",
            "purok": "3",
            "week": 2,
            "month": "5"
        },
        "groupValues": [
            {
                "group": 1,
                "firstSession": { "a": 2, "m": 3, "r107": 1, "in": 2, "out": 1 },
                "secondSession": { "n": 4, "out": 3 }
            },
            {
                "group": 2,
                "firstSession": { "b": 5, "totalCoded": 99, "percent": 12.5 },
                "secondSession": { "c": 1, "m": 1 }
            }
        ],
        "sNumber": [ { "count": 10 }, { "count": 20 } ]
    }"#;

    const STARTING_COUNTS: &str = r#""sNumber": [ { "count": 10 }, { "count": 20 } ]"#;

    fn path_str(p: &Path) -> String {
        p.display().to_string()
    }

    fn write_period(dir: &Path, contents: &str) -> String {
        let p = dir.join("period.json");
        fs::write(&p, contents).unwrap();
        path_str(&p)
    }

    #[test]
    fn full_run_writes_cells_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("cells.json");
        let summary = dir.path().join("summary.json");
        let args = Args {
            config: Some(write_period(dir.path(), PERIOD)),
            out: Some(path_str(&out)),
            summary: Some(path_str(&summary)),
            ..Args::default()
        };
        run_period(&args).unwrap();

        let cells: JSValue = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(cells["C6"], json!(2));
        assert_eq!(cells["O6"], json!(0));
        assert_eq!(cells["R6"], json!(45.45));
        assert_eq!(cells["D2"], json!("Pampanga East"));
        assert_eq!(cells["AF3"], json!(5));
        assert_eq!(cells["AY26"], json!(28));

        let summary: JSValue =
            serde_json::from_str(&fs::read_to_string(&summary).unwrap()).unwrap();
        assert_eq!(summary["groupValues"][0]["firstSession"]["m"], json!(3));
        assert_eq!(summary["groupValues"][0]["firstSession"]["totalCoded"], json!(5));
        // Derived values from the input are ignored.
        assert_eq!(summary["groupValues"][1]["firstSession"]["totalCoded"], json!(5));
        assert_eq!(summary["groupValues"][1]["firstSession"]["percent"], json!(25.0));
        assert_eq!(summary["firstSessionCodeTotal"]["percent"], json!(32.26));
        assert_eq!(summary["newSNumber"], json!([{ "count": 8 }, { "count": 20 }]));
    }

    #[test]
    fn reference_comparison() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_period(dir.path(), PERIOD);
        let out = dir.path().join("cells.json");
        run_period(&Args {
            config: Some(config.clone()),
            out: Some(path_str(&out)),
            ..Args::default()
        })
        .unwrap();

        // The output of a run is a valid reference for the same input.
        let args = Args {
            config: Some(config.clone()),
            out: Some(path_str(&dir.path().join("cells2.json"))),
            reference: Some(path_str(&out)),
            ..Args::default()
        };
        assert!(run_period(&args).is_ok());

        let mut reference: JSValue =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        reference["C6"] = json!(3);
        let bad = dir.path().join("bad.json");
        fs::write(&bad, reference.to_string()).unwrap();
        let args = Args {
            reference: Some(path_str(&bad)),
            ..args
        };
        assert!(run_period(&args).is_err());
    }

    #[test]
    fn seed_store_carries_counts() {
        let dir = tempfile::tempdir().unwrap();
        let store = path_str(&dir.path().join("seeds.json"));
        run_period(&Args {
            config: Some(write_period(dir.path(), PERIOD)),
            out: Some(path_str(&dir.path().join("cells.json"))),
            seed_store: Some(store.clone()),
            ..Args::default()
        })
        .unwrap();

        // Next period, without starting counts.
        let next = PERIOD.replace(STARTING_COUNTS, r#""sNumber": null"#);
        let summary = dir.path().join("summary.json");
        run_period(&Args {
            config: Some(write_period(dir.path(), &next)),
            summary: Some(path_str(&summary)),
            seed_store: Some(store.clone()),
            ..Args::default()
        })
        .unwrap();
        let summary: JSValue =
            serde_json::from_str(&fs::read_to_string(&summary).unwrap()).unwrap();
        assert_eq!(summary["sNumber"], json!([{ "count": 8 }, { "count": 20 }]));
        assert_eq!(summary["newSNumber"], json!([{ "count": 6 }, { "count": 20 }]));
    }

    #[test]
    fn missing_starting_counts() {
        let dir = tempfile::tempdir().unwrap();
        let next = PERIOD.replace(STARTING_COUNTS, r#""sNumber": null"#);
        let res = run_period(&Args {
            config: Some(write_period(dir.path(), &next)),
            out: Some(path_str(&dir.path().join("cells.json"))),
            ..Args::default()
        });
        assert!(matches!(res, Err(ReportError::MissingStartingCounts {})));
    }

    #[test]
    fn purok_missing_from_seed_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = path_str(&dir.path().join("seeds.json"));
        let next = PERIOD
            .replace(STARTING_COUNTS, r#""sNumber": null"#)
            .replace(r#""purok": "3""#, r#""purok": "9""#);
        let res = run_period(&Args {
            config: Some(write_period(dir.path(), &next)),
            out: Some(path_str(&dir.path().join("cells.json"))),
            seed_store: Some(store.clone()),
            ..Args::default()
        });
        match res {
            Err(ReportError::MissingStoredCounts { purok, path }) => {
                assert_eq!(purok, "9");
                assert_eq!(path, store);
            }
            x => panic!("unexpected result {:?}", x),
        }
        // Nothing was stored for the failed period.
        assert!(!dir.path().join("seeds.json").exists());
    }

    #[test]
    fn missing_input() {
        let res = run_period(&Args::default());
        assert!(matches!(res, Err(ReportError::MissingInput {})));
    }

    #[test]
    fn attendance_errors_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mismatched =
            PERIOD.replace(STARTING_COUNTS, r#""sNumber": [ { "count": 10 } ]"#);
        let res = run_period(&Args {
            config: Some(write_period(dir.path(), &mismatched)),
            out: Some(path_str(&dir.path().join("cells.json"))),
            ..Args::default()
        });
        assert!(matches!(
            res,
            Err(ReportError::Attendance {
                source: AttendanceErrors::MismatchedLengths { .. }
            })
        ));
    }
}
