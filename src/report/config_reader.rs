use crate::report::*;

use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

/// The counters of one session, as stored by the mobile application.
///
/// The derived fields (`totalCoded`, `totalDalaw`, `percent`) may be present in the files,
/// they are ignored and always recomputed.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionCounters {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub d: u32,
    pub e: u32,
    pub f: u32,
    pub g: u32,
    pub h: u32,
    pub i: u32,
    pub j: u32,
    pub k: u32,
    pub l: u32,
    pub m: u32,
    pub n: u32,
    pub r107: u32,
    #[serde(rename = "in")]
    pub joined: u32,
    #[serde(rename = "out")]
    pub transferred_out: u32,
}

impl SessionCounters {
    pub fn to_tally(&self) -> RawTally {
        RawTally {
            codes: [
                self.a, self.b, self.c, self.d, self.e, self.f, self.g, self.h, self.i, self.j,
                self.k, self.l, self.m, self.n,
            ],
            r107: self.r107,
            joined: self.joined,
            transferred_out: self.transferred_out,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct GroupValues {
    pub group: u32,
    #[serde(rename = "firstSession", default)]
    pub first_session: SessionCounters,
    #[serde(rename = "secondSession", default)]
    pub second_session: SessionCounters,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SNumber {
    #[serde(default)]
    pub count: u32,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeriodSettings {
    #[serde(rename = "districtName")]
    pub district_name: Option<String>,
    #[serde(rename = "districtCode")]
    pub district_code: Option<String>,
    #[serde(rename = "localName")]
    pub local_name: Option<String>,
    #[serde(rename = "localCode")]
    pub local_code: Option<String>,
    // Numbers or strings
    pub purok: Option<JSValue>,
    pub week: Option<JSValue>,
    pub month: Option<JSValue>,
}

impl PeriodSettings {
    pub fn to_period_info(&self) -> ReportResult<PeriodInfo> {
        Ok(PeriodInfo {
            district_name: self.district_name.clone(),
            district_code: self.district_code.clone(),
            local_name: self.local_name.clone(),
            local_code: self.local_code.clone(),
            purok: read_js_label(&self.purok),
            week: read_js_int(&self.week, "week")?,
            month: read_js_int(&self.month, "month")?,
        })
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PeriodConfig {
    pub period: Option<PeriodSettings>,
    #[serde(rename = "groupValues")]
    pub group_values: Vec<GroupValues>,
    #[serde(rename = "sNumber")]
    pub s_number: Option<Vec<SNumber>>,
}

impl PeriodConfig {
    pub fn to_period_data(&self) -> ReportResult<PeriodData> {
        let info = match &self.period {
            Some(p) => Some(p.to_period_info()?),
            None => None,
        };
        let groups = self
            .group_values
            .iter()
            .map(|gv| GroupTally {
                group: gv.group,
                first_session: gv.first_session.to_tally(),
                second_session: gv.second_session.to_tally(),
            })
            .collect();
        let starting = self.s_number.as_ref().map(|l| {
            l.iter()
                .map(|s| StartingCount { count: s.count })
                .collect()
        });
        Ok(PeriodData {
            info,
            groups,
            starting,
        })
    }
}

pub fn read_json(path: &str) -> ReportResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    debug!("read content: {:?}", contents);
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

pub fn read_period_config(path: &str) -> ReportResult<PeriodConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: PeriodConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    info!(
        "read_period_config: {}: {} groups, starting counts: {}",
        path,
        config.group_values.len(),
        config.s_number.is_some()
    );
    Ok(config)
}

fn read_js_int(x: &Option<JSValue>, field: &str) -> ReportResult<Option<u32>> {
    match x {
        None | Some(JSValue::Null) => Ok(None),
        Some(JSValue::Number(n)) => n
            .as_u64()
            .and_then(|x| u32::try_from(x).ok())
            .map(Some)
            .context(ParsingJsonNumberSnafu { field }),
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<u32>()
            .ok()
            .map(Some)
            .context(ParsingJsonNumberSnafu { field }),
        _ => None.context(ParsingJsonNumberSnafu { field }),
    }
}

fn read_js_label(x: &Option<JSValue>) -> Option<String> {
    match x {
        Some(JSValue::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(JSValue::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_counters_are_zero() {
        let gv: GroupValues = serde_json::from_value(json!({
            "group": 4,
            "firstSession": { "b": 2, "in": 1, "totalDalaw": 17 }
        }))
        .unwrap();
        assert_eq!(gv.group, 4);
        let t = gv.first_session.to_tally();
        assert_eq!(t.get(Code::B), 2);
        assert_eq!(t.get(Code::A), 0);
        assert_eq!(t.joined, 1);
        assert_eq!(t.total_coded(), 2);
        assert_eq!(gv.second_session.to_tally(), RawTally::EMPTY);
    }

    #[test]
    fn counters_follow_code_order() {
        let sc: SessionCounters = serde_json::from_value(json!({
            "a": 1, "b": 2, "c": 3, "d": 4, "e": 5, "f": 6, "g": 7,
            "h": 8, "i": 9, "j": 10, "k": 11, "l": 12, "m": 13, "n": 14,
            "r107": 15, "out": 16
        }))
        .unwrap();
        let t = sc.to_tally();
        for (idx, code) in Code::ALL.iter().enumerate() {
            assert_eq!(t.get(*code), idx as u32 + 1);
        }
        assert_eq!(t.r107, 15);
        assert_eq!(t.transferred_out, 16);
    }

    #[test]
    fn period_settings_numbers_or_strings() {
        let p: PeriodSettings = serde_json::from_value(json!({
            "districtName": "Pampanga East",
            "purok": 3,
            "week": "2",
            "month": 11
        }))
        .unwrap();
        let info = p.to_period_info().unwrap();
        assert_eq!(info.purok, Some("3".to_string()));
        assert_eq!(info.week, Some(2));
        assert_eq!(info.month, Some(11));
        assert_eq!(info.local_name, None);

        let p: PeriodSettings = serde_json::from_value(json!({ "week": "second" })).unwrap();
        assert!(matches!(
            p.to_period_info(),
            Err(ReportError::ParsingJsonNumber { .. })
        ));
    }

    #[test]
    fn config_without_counts() {
        let c: PeriodConfig = serde_json::from_value(json!({
            "groupValues": [ { "group": 1 }, { "group": 2 } ]
        }))
        .unwrap();
        let data = c.to_period_data().unwrap();
        assert_eq!(data.groups.len(), 2);
        assert_eq!(data.starting, None);
        assert_eq!(data.info, None);
    }
}
