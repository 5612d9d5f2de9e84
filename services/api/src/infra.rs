use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// UTC instant `hours` into the given calendar day.
pub(crate) fn at_hour(day: NaiveDate, hours: i64) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc() + chrono::Duration::hours(hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn parse_date_trims_and_reports_bad_input() {
        assert_eq!(
            parse_date(" 2025-11-03 "),
            Ok(NaiveDate::from_ymd_opt(2025, 11, 3).expect("valid date"))
        );
        let err = parse_date("03-11-2025").expect_err("wrong order");
        assert!(err.contains("YYYY-MM-DD"));
    }

    #[test]
    fn at_hour_offsets_from_midnight_utc() {
        let day = NaiveDate::from_ymd_opt(2025, 11, 3).expect("valid date");
        let instant = at_hour(day, 8);
        assert_eq!(instant, Utc.with_ymd_and_hms(2025, 11, 3, 8, 0, 0).unwrap());
        assert_eq!(instant.hour(), 8);
    }
}
