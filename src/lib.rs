//! # Forecast Companion Workspace
//!
//! Umbrella crate for the workspace. It re-exports the pipeline crate and the
//! numeric kernels so downstream code can depend on a single package.
//!
//! ## Example
//!
//! ```
//! use forecast_companion_workspace::companion::{build_prompt, Horizon};
//! use forecast_companion_workspace::companion::models::{ForecastEngine, HoltEngine};
//! use forecast_companion_workspace::companion::Series;
//! use chrono::NaiveDate;
//!
//! let series = Series::from_pairs(&[
//!     (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 10.0),
//!     (NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(), 12.0),
//!     (NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 11.0),
//! ])
//! .unwrap();
//!
//! let forecast = HoltEngine::new(0.8)
//!     .forecast(&series, Horizon::new(2, 24).unwrap())
//!     .unwrap();
//! assert_eq!(forecast.len(), 5);
//!
//! let prompt = build_prompt(&forecast, 8);
//! assert!(prompt.as_str().starts_with("Here are dates & values:"));
//! ```

pub use forecast_companion as companion;
pub use series_math as math;

/// Version of the pipeline crate this workspace ships
pub fn companion_version() -> &'static str {
    companion::VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports() {
        assert_eq!(companion_version(), env!("CARGO_PKG_VERSION"));
        assert!(math::interval_multiplier(0.8).is_ok());
    }
}
