use std::fs;
use std::path::Path;

use crate::report::*;

/// Writes some text to a file, or to the standard output if the target is `stdout`.
pub fn write_output(target: &str, contents: &str) -> ReportResult<()> {
    if target == "stdout" {
        println!("{}", contents);
        return Ok(());
    }
    info!("Writing {}", target);
    fs::write(target, contents).context(WritingFileSnafu { path: target })
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Parses a count in a text cell. Empty cells are zero.
pub fn parse_count(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() {
        Some(0)
    } else {
        s.parse::<u32>().ok()
    }
}
