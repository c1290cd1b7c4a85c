use chrono::{DateTime, Datelike, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar month encoded as `YYYYMM`, the key reports are published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MonthKey(u32);

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return None;
        }
        Some(Self(year as u32 * 100 + month))
    }

    pub fn from_date<D: Datelike>(date: &D) -> Self {
        Self(date.year() as u32 * 100 + date.month())
    }

    pub fn report_file_name(&self) -> String {
        format!("report_{}.json", self.0)
    }
}

impl From<u32> for MonthKey {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != 6 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("Invalid month: {s}. Use YYYYMM"));
        }
        let value: u32 = trimmed
            .parse()
            .map_err(|_| format!("Invalid month: {s}. Use YYYYMM"))?;
        Self::new((value / 100) as i32, value % 100)
            .ok_or_else(|| format!("Invalid month: {s}. Use YYYYMM"))
    }
}

/// Point totals for every core over one month, produced by the points generator.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub month: MonthKey,
    pub generated_at: DateTime<FixedOffset>,
    pub cores: Vec<CoreSummary>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoreSummary {
    pub core_id: u64,
    pub total_points: u64,
    pub miner_total: u64,
    pub witness_total: u64,
    pub days: u32,
    #[serde(default)]
    pub details: Vec<DailyRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    /// Business date as `YYYYMMDD`.
    pub date: u32,
    pub miner_liveness: bool,
    pub witness_liveness: bool,
    pub miner_points: u64,
    pub witness_points: u64,
    pub total_points: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_month_key_parsing() {
        assert_eq!("202402".parse::<MonthKey>(), Ok(MonthKey::from(202402)));
        assert!("202413".parse::<MonthKey>().is_err());
        assert!("2024-02".parse::<MonthKey>().is_err());
        assert!("".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_month_key_from_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(MonthKey::from_date(&date), MonthKey::from(202403));
        assert_eq!(MonthKey::new(2024, 12), Some(MonthKey::from(202412)));
        assert_eq!(MonthKey::new(2024, 0), None);
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            MonthKey::from(202401).report_file_name(),
            "report_202401.json"
        );
    }

    #[test]
    fn test_deserialize_monthly_report() {
        let content = r#"{
            "month": 202402,
            "generatedAt": "2024-03-01T00:10:02.512345+08:00",
            "cores": [
                {"coreId": 7, "totalPoints": 210, "minerTotal": 200, "witnessTotal": 10, "days": 2,
                 "details": [
                    {"date": 20240201, "minerLiveness": true, "witnessLiveness": false,
                     "minerPoints": 100, "witnessPoints": 0, "totalPoints": 100},
                    {"date": 20240202, "minerLiveness": true, "witnessLiveness": true,
                     "minerPoints": 100, "witnessPoints": 10, "totalPoints": 110}
                 ]},
                {"coreId": 12, "totalPoints": 0, "minerTotal": 0, "witnessTotal": 0, "days": 0, "details": []}
            ]
        }"#;

        let report: MonthlyReport = serde_json::from_str(content).unwrap();
        assert_eq!(report.month, MonthKey::from(202402));
        assert_eq!(report.cores.len(), 2);
        assert_eq!(report.cores[0].details[1].total_points, 110);
        assert!(!report.cores[0].details[0].witness_liveness);
        assert_eq!(report.generated_at.offset().local_minus_utc(), 8 * 3600);
    }
}
