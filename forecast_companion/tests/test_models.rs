mod common;

use common::{monthly_series, ymd};
use forecast_companion::data::{Horizon, Series};
use forecast_companion::models::{EngineKind, ForecastEngine, HoltEngine, LinearTrendEngine};
use forecast_companion::utils::{future_dates, infer_cadence, Cadence};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::io::Read;
use tempfile::NamedTempFile;

#[rstest]
#[case(EngineKind::Holt, 1)]
#[case(EngineKind::Holt, 6)]
#[case(EngineKind::LinearTrend, 2)]
#[case(EngineKind::LinearTrend, 24)]
fn test_forecast_length_is_history_plus_horizon(#[case] kind: EngineKind, #[case] periods: usize) {
    let series = monthly_series();
    let horizon = Horizon::new(periods, 24).unwrap();

    let forecast = kind.build(0.8).forecast(&series, horizon).unwrap();

    assert_eq!(forecast.len(), series.len() + periods);
    assert_eq!(forecast.boundary(), series.len());
    assert_eq!(forecast.history().len(), series.len());
    assert_eq!(forecast.future().len(), periods);
}

#[test]
fn test_history_dates_reproduce_the_input() {
    let series = monthly_series();
    let forecast = HoltEngine::new(0.8)
        .forecast(&series, Horizon::new(2, 24).unwrap())
        .unwrap();

    let history: Vec<_> = forecast.history().iter().map(|p| p.date).collect();
    assert_eq!(history, series.dates());
    let future: Vec<_> = forecast.future().iter().map(|p| p.date).collect();
    assert_eq!(future, vec![ymd(2024, 5, 1), ymd(2024, 6, 1)]);
}

#[test]
fn test_future_interval_widens() {
    let series = monthly_series();
    let forecast = LinearTrendEngine::new(0.8)
        .forecast(&series, Horizon::new(3, 24).unwrap())
        .unwrap();

    let widths: Vec<f64> = forecast.future().iter().map(|p| p.upper - p.lower).collect();
    assert!(widths[0] > 0.0);
    assert!(widths[1] > widths[0]);
    assert!(widths[2] > widths[1]);
    for point in forecast.points() {
        assert!(point.lower <= point.value && point.value <= point.upper);
    }
}

#[test]
fn test_month_end_series_stays_on_month_end() {
    let series = Series::from_pairs(&[
        (ymd(2023, 11, 30), 1.0),
        (ymd(2023, 12, 31), 2.0),
        (ymd(2024, 1, 31), 3.0),
    ])
    .unwrap();

    let forecast = LinearTrendEngine::new(0.8)
        .forecast(&series, Horizon::new(2, 24).unwrap())
        .unwrap();

    let future: Vec<_> = forecast.future().iter().map(|p| p.date).collect();
    assert_eq!(future, vec![ymd(2024, 2, 29), ymd(2024, 3, 31)]);
}

#[test]
fn test_weekly_cadence() {
    let dates = vec![ymd(2024, 1, 1), ymd(2024, 1, 8), ymd(2024, 1, 15), ymd(2024, 1, 29)];
    assert_eq!(infer_cadence(&dates).unwrap(), Cadence::Days(7));
    assert_eq!(
        future_dates(ymd(2024, 1, 29), Cadence::Days(7), 2).unwrap(),
        vec![ymd(2024, 2, 5), ymd(2024, 2, 12)]
    );
}

#[test]
fn test_quarterly_cadence() {
    let dates = vec![ymd(2023, 1, 1), ymd(2023, 4, 1), ymd(2023, 7, 1)];
    assert_eq!(
        infer_cadence(&dates).unwrap(),
        Cadence::Months {
            step: 3,
            month_end: false
        }
    );
}

#[test]
fn test_two_observations_are_enough() {
    let series = Series::from_pairs(&[(ymd(2024, 1, 1), 5.0), (ymd(2024, 1, 2), 7.0)]).unwrap();
    for kind in [EngineKind::Holt, EngineKind::LinearTrend] {
        let forecast = kind.build(0.8).forecast(&series, Horizon::new(1, 24).unwrap()).unwrap();
        assert_eq!(forecast.len(), 3);
        assert_eq!(forecast.points()[2].date, ymd(2024, 1, 3));
    }
}

#[test]
fn test_write_csv() {
    let forecast = HoltEngine::new(0.8)
        .forecast(&monthly_series(), Horizon::new(2, 24).unwrap())
        .unwrap();

    let mut file = NamedTempFile::new().unwrap();
    forecast.write_csv(file.as_file_mut()).unwrap();

    let mut text = String::new();
    file.reopen().unwrap().read_to_string(&mut text).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "ds,yhat,yhat_lower,yhat_upper");
    assert_eq!(lines.len(), 7);
    assert!(lines[1].starts_with("2024-01-01,"));
    assert!(lines[6].starts_with("2024-06-01,"));
}
