//! The counts carried from one period to the next.
//!
//! The store is a JSON file mapping a purok identifier to the list of counts of its groups,
//! in group order:
//!
//! ```json
//! { "3": [8, 20, 14] }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::report::*;

type SeedMap = BTreeMap<String, Vec<u32>>;

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SeedStore {
    path: PathBuf,
}

impl SeedStore {
    pub fn new(path: &str) -> SeedStore {
        SeedStore {
            path: PathBuf::from(path),
        }
    }

    fn path_str(&self) -> String {
        self.path.display().to_string()
    }

    fn read_all(&self) -> ReportResult<SeedMap> {
        if !self.path.exists() {
            debug!("SeedStore: {} does not exist yet", self.path_str());
            return Ok(SeedMap::new());
        }
        let path = self.path_str();
        let contents =
            fs::read_to_string(&self.path).context(OpeningFileSnafu { path: &path })?;
        serde_json::from_str(&contents).context(ParsingJsonSnafu { path })
    }

    /// The counts saved for a purok, if any.
    pub fn load(&self, purok: &str) -> ReportResult<Option<Vec<StartingCount>>> {
        let all = self.read_all()?;
        let res = all.get(purok).map(|counts| {
            counts
                .iter()
                .map(|c| StartingCount { count: *c })
                .collect()
        });
        debug!("SeedStore: load {}: {:?}", purok, res);
        Ok(res)
    }

    /// Saves the counts of a purok. The counts of the other puroks are kept.
    pub fn store(&self, purok: &str, counts: &[StartingCount]) -> ReportResult<()> {
        let mut all = self.read_all()?;
        all.insert(purok.to_string(), counts.iter().map(|c| c.count).collect());
        let contents = serde_json::to_string_pretty(&all).context(WritingJsonSnafu {})?;
        info!("SeedStore: saving {} counts for purok {}", counts.len(), purok);
        fs::write(&self.path, contents).context(WritingFileSnafu {
            path: self.path_str(),
        })
    }
}
