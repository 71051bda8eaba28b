mod common;

use common::{monthly_series, ymd};
use forecast_companion::data::Horizon;
use forecast_companion::models::{Forecast, ForecastEngine, ForecastPoint, HoltEngine};
use forecast_companion::prompt::{build_prompt, PromptBuilder};
use pretty_assertions::assert_eq;

fn forecast() -> Forecast {
    HoltEngine::new(0.8)
        .forecast(&monthly_series(), Horizon::new(2, 24).unwrap())
        .unwrap()
}

#[test]
fn test_equal_forecasts_give_identical_prompts() {
    let a = build_prompt(&forecast(), 8);
    let b = build_prompt(&forecast(), 8);
    assert_eq!(a.as_str().as_bytes(), b.as_str().as_bytes());
}

#[test]
fn test_exact_prompt_text() {
    let points = vec![
        ForecastPoint {
            date: ymd(2024, 1, 1),
            value: 10.0,
            lower: 9.0,
            upper: 11.0,
        },
        ForecastPoint {
            date: ymd(2024, 2, 1),
            value: 12.5,
            lower: 11.0,
            upper: 14.0,
        },
        ForecastPoint {
            date: ymd(2024, 3, 1),
            value: 13.75,
            lower: 12.0,
            upper: 15.5,
        },
    ];
    let forecast = Forecast::new(points, Horizon::new(1, 24).unwrap()).unwrap();

    let prompt = PromptBuilder::new(2, 3).build(&forecast);

    assert_eq!(
        prompt.as_str(),
        "Here are dates & values:\nds yhat\n2024-02-01 12.50\n2024-03-01 13.75\n\
         Provide 3 concise bullet-point insights highlighting trends and anomalies."
    );
}

#[test]
fn test_default_window_covers_the_forecast_tail() {
    let prompt = PromptBuilder::default().build(&forecast());
    let text = prompt.into_string();

    // 6 rows fit inside the default window of 8
    assert!(text.contains("2024-01-01 "));
    assert!(text.contains("2024-06-01 "));
    assert!(text.contains("Provide 5 concise"));
}

#[test]
fn test_prompt_changes_with_the_forecast() {
    let base = forecast();
    let mut points = base.points().to_vec();
    points[5].value += 1.0;
    let changed = Forecast::new(points, Horizon::new(2, 24).unwrap()).unwrap();

    assert_ne!(build_prompt(&base, 8), build_prompt(&changed, 8));
}
