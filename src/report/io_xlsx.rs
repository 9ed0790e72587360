// Reading the blank report and writing the filled report as Excel files.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use rust_xlsxwriter::Workbook;

use crate::report::{io_common::simplify_file_name, *};

const DEFAULT_WORKSHEET_NAME: &str = "Report";

#[derive(PartialEq, Debug, Clone)]
pub enum TemplateValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

/// A cell of the template, with 0-based coordinates.
#[derive(PartialEq, Debug, Clone)]
pub struct TemplateCell {
    pub row: u32,
    pub col: u16,
    pub value: TemplateValue,
}

/// The content of the blank report.
#[derive(PartialEq, Debug, Clone)]
pub struct TemplateSheet {
    pub name: String,
    pub cells: Vec<TemplateCell>,
}

/// Reads the values of the blank report.
///
/// If no worksheet name is given, the workbook must have exactly one worksheet.
/// Only the values are read: numbers, text and booleans.
pub fn read_template(path: &str, worksheet_name_o: Option<&str>) -> ReportResult<TemplateSheet> {
    debug!(
        "read_template: path: {:?} worksheet: {:?}",
        path, worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    let (name, wrange) = if let Some(worksheet_name) = worksheet_name_o {
        // A worksheet name was provided, use it.
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name,
                path,
            })?
            .context(OpeningExcelSnafu { path })?;
        (worksheet_name.to_string(), wrange)
    } else {
        let mut all_worksheets = workbook.worksheets();
        match all_worksheets.len() {
            0 => return EmptyExcelSnafu { path }.fail(),
            1 => all_worksheets.remove(0),
            _ => return AmbiguousWorksheetSnafu { path }.fail(),
        }
    };

    let (start_row, start_col) = wrange.start().unwrap_or((0, 0));
    let mut cells: Vec<TemplateCell> = Vec::new();
    for (row_idx, row) in wrange.rows().enumerate() {
        for (col_idx, dt) in row.iter().enumerate() {
            let value = match dt {
                DataType::Float(f) => TemplateValue::Number(*f),
                DataType::Int(i) => TemplateValue::Number(*i as f64),
                DataType::String(s) => TemplateValue::Text(s.clone()),
                DataType::Bool(b) => TemplateValue::Bool(*b),
                DataType::Empty => continue,
                _ => {
                    debug!("read_template: skipping cell {:?}", dt);
                    continue;
                }
            };
            let col = start_col as usize + col_idx;
            let col = match u16::try_from(col) {
                Ok(c) => c,
                Err(_) => whatever!("read_template: column {} out of range", col),
            };
            cells.push(TemplateCell {
                row: start_row + row_idx as u32,
                col,
                value,
            });
        }
    }
    info!(
        "read_template: {}: worksheet {:?}, {} cells",
        simplify_file_name(path),
        name,
        cells.len()
    );
    Ok(TemplateSheet { name, cells })
}

/// Writes the report: the content of the template if any, then the cells of the report.
pub fn write_report(
    path: &str,
    template: Option<&TemplateSheet>,
    cells: &CellMap,
) -> ReportResult<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let name = template
        .map(|t| t.name.as_str())
        .unwrap_or(DEFAULT_WORKSHEET_NAME);
    worksheet
        .set_name(name)
        .context(WritingXlsxSnafu { path })?;

    if let Some(t) = template {
        for tc in t.cells.iter() {
            match &tc.value {
                TemplateValue::Number(f) => worksheet.write_number(tc.row, tc.col, *f),
                TemplateValue::Text(s) => worksheet.write_string(tc.row, tc.col, s),
                TemplateValue::Bool(b) => worksheet.write_boolean(tc.row, tc.col, *b),
            }
            .context(WritingXlsxSnafu { path })?;
        }
    }

    for (address, value) in cells.iter() {
        let (row, col) = cell_position(address)?;
        match value {
            CellValue::Count(c) => worksheet.write_number(row, col, *c as f64),
            CellValue::Percent(p) => worksheet.write_number(row, col, p.as_f64()),
            CellValue::Text(s) => worksheet.write_string(row, col, s),
        }
        .context(WritingXlsxSnafu { path })?;
    }

    info!("write_report: writing {} cells to {}", cells.len(), path);
    workbook.save(path).context(WritingXlsxSnafu { path })?;
    Ok(())
}

// 0-based row and column
fn cell_position(address: &CellAddress) -> ReportResult<(u32, u16)> {
    let col = address.column_index().and_then(|c| u16::try_from(c).ok());
    match (address.row().checked_sub(1), col) {
        (Some(row), Some(col)) => Ok((row, col)),
        _ => whatever!("Invalid cell address {}", address),
    }
}
