use crate::source::{ReportSource, ResourceName, SourceError};
use log::warn;
use serde::de::DeserializeOwned;
use shared::models::{MonthKey, MonthlyReport};

fn parse<T: DeserializeOwned>(resource: ResourceName, body: &[u8]) -> Result<T, SourceError> {
    serde_json::from_slice(body).map_err(|source| SourceError::Parse { resource, source })
}

async fn fetch_json<T: DeserializeOwned>(
    source: &dyn ReportSource,
    resource: ResourceName,
) -> Result<T, SourceError> {
    let body = source.fetch(resource).await?;
    parse(resource, &body)
}

/// The current month when published, else the most recent published month.
pub fn resolve_default_month(available: &[MonthKey], current: MonthKey) -> Option<MonthKey> {
    if available.contains(&current) {
        Some(current)
    } else {
        available.last().copied()
    }
}

/// An explicitly requested month wins over the default.
pub fn select_month(
    requested: Option<MonthKey>,
    available: &[MonthKey],
    current: MonthKey,
) -> Option<MonthKey> {
    requested.or_else(|| resolve_default_month(available, current))
}

/// Published months in listing order. An unreachable or malformed listing reads as empty.
pub async fn load_months(source: &dyn ReportSource) -> Vec<MonthKey> {
    match fetch_json(source, ResourceName::Months).await {
        Ok(months) => months,
        Err(e) => {
            warn!("Month listing unavailable: {e}");
            Vec::new()
        }
    }
}

/// Loads the month's report, falling back once to `report.json`.
pub async fn load_report(
    source: &dyn ReportSource,
    month: Option<MonthKey>,
) -> Result<MonthlyReport, SourceError> {
    if let Some(month) = month {
        match fetch_json(source, ResourceName::MonthReport(month)).await {
            Ok(report) => return Ok(report),
            Err(e) => warn!("Falling back to {}: {e}", ResourceName::LatestReport),
        }
    }
    fetch_json(source, ResourceName::LatestReport).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockReportSource;

    fn months(values: &[u32]) -> Vec<MonthKey> {
        values.iter().copied().map(MonthKey::from).collect()
    }

    fn report_json(month: u32) -> String {
        format!(
            r#"{{"month": {month}, "generatedAt": "2024-02-03T01:00:00+08:00", "cores": [
                {{"coreId": 7, "totalPoints": 30, "minerTotal": 20, "witnessTotal": 10, "days": 2, "details": []}}
            ]}}"#
        )
    }

    #[test]
    fn test_default_month_prefers_current() {
        let available = months(&[202401, 202402]);
        assert_eq!(
            resolve_default_month(&available, MonthKey::from(202402)),
            Some(MonthKey::from(202402))
        );
        assert_eq!(
            resolve_default_month(&available, MonthKey::from(202403)),
            Some(MonthKey::from(202402))
        );
        assert_eq!(
            resolve_default_month(&months(&[202402, 202401]), MonthKey::from(202403)),
            Some(MonthKey::from(202401))
        );
        assert_eq!(resolve_default_month(&[], MonthKey::from(202403)), None);
    }

    #[test]
    fn test_requested_month_overrides_default() {
        let available = months(&[202401, 202402]);
        assert_eq!(
            select_month(Some(MonthKey::from(202312)), &available, MonthKey::from(202402)),
            Some(MonthKey::from(202312))
        );
        assert_eq!(
            select_month(None, &available, MonthKey::from(202402)),
            Some(MonthKey::from(202402))
        );
    }

    #[tokio::test]
    async fn test_load_months_tolerates_failures() {
        let source = MockReportSource::new().with(ResourceName::Months, "[202401, 202402]");
        assert_eq!(load_months(&source).await, months(&[202401, 202402]));

        let malformed = MockReportSource::new().with(ResourceName::Months, "{\"months\": 1}");
        assert!(load_months(&malformed).await.is_empty());
        assert!(load_months(&MockReportSource::new()).await.is_empty());
    }

    #[tokio::test]
    async fn test_load_report_for_month() {
        let month = MonthKey::from(202401);
        let source = MockReportSource::new()
            .with(ResourceName::MonthReport(month), report_json(202401))
            .with(ResourceName::LatestReport, report_json(202402));

        let report = load_report(&source, Some(month)).await.unwrap();
        assert_eq!(report.month, month);
        assert_eq!(report.cores[0].total_points, 30);
    }

    #[tokio::test]
    async fn test_load_report_falls_back_to_latest() {
        let source = MockReportSource::new()
            .with(ResourceName::MonthReport(MonthKey::from(202401)), "not json")
            .with(ResourceName::LatestReport, report_json(202402));

        let fallback = load_report(&source, Some(MonthKey::from(202401))).await.unwrap();
        assert_eq!(fallback.month, MonthKey::from(202402));

        let missing = load_report(&source, Some(MonthKey::from(202312))).await.unwrap();
        assert_eq!(missing.month, MonthKey::from(202402));

        let unresolved = load_report(&source, None).await.unwrap();
        assert_eq!(unresolved.month, MonthKey::from(202402));
    }

    #[tokio::test]
    async fn test_load_report_propagates_second_failure() {
        let result = load_report(&MockReportSource::new(), Some(MonthKey::from(202401))).await;
        assert!(matches!(
            result,
            Err(SourceError::NotFound(ResourceName::LatestReport))
        ));
    }
}
