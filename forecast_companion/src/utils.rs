//! Calendar helpers for extending a series into the future

use crate::error::EngineError;
use chrono::{Datelike, Duration, Months, NaiveDate};

/// Spacing between consecutive observations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Fixed number of days
    Days(i64),
    /// Whole calendar months; `month_end` keeps dates on the last day
    Months { step: u32, month_end: bool },
}

fn is_month_end(date: NaiveDate) -> bool {
    date.succ_opt()
        .map(|next| next.month() != date.month())
        .unwrap_or(true)
}

fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to.year() as i64 - from.year() as i64) * 12 + to.month() as i64 - from.month() as i64
}

/// Infer the cadence of strictly increasing `dates`
pub fn infer_cadence(dates: &[NaiveDate]) -> Result<Cadence, EngineError> {
    if dates.len() < 2 {
        return Err(EngineError::InsufficientData(
            "Need at least 2 dates to infer a cadence".to_string(),
        ));
    }

    let all_month_end = dates.iter().all(|d| is_month_end(*d));
    let same_day = dates.iter().all(|d| d.day() == dates[0].day()) && dates[0].day() <= 28;

    if all_month_end || same_day {
        let gaps: Vec<i64> = dates
            .windows(2)
            .map(|pair| months_between(pair[0], pair[1]))
            .collect();
        if gaps[0] > 0 && gaps.iter().all(|g| *g == gaps[0]) {
            return Ok(Cadence::Months {
                step: gaps[0] as u32,
                month_end: all_month_end && !same_day,
            });
        }
    }

    let mut day_gaps: Vec<i64> = dates
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_days())
        .collect();
    day_gaps.sort_unstable();
    let median = day_gaps[(day_gaps.len() - 1) / 2];

    if median <= 0 {
        return Err(EngineError::Degenerate(
            "Dates are not strictly increasing".to_string(),
        ));
    }

    Ok(Cadence::Days(median))
}

/// Create `horizon` dates following `last` at the given cadence
pub fn future_dates(
    last: NaiveDate,
    cadence: Cadence,
    horizon: usize,
) -> Result<Vec<NaiveDate>, EngineError> {
    let overflow = || EngineError::Degenerate("Future dates overflow the calendar".to_string());
    let mut dates = Vec::with_capacity(horizon);

    for step in 1..=horizon {
        let next = match cadence {
            Cadence::Days(days) => last.checked_add_signed(Duration::days(days * step as i64)),
            Cadence::Months {
                step: months,
                month_end: false,
            } => last.checked_add_months(Months::new(months * step as u32)),
            Cadence::Months {
                step: months,
                month_end: true,
            } => last
                .with_day(1)
                .and_then(|first| first.checked_add_months(Months::new(months * step as u32 + 1)))
                .and_then(|first_of_following| first_of_following.pred_opt()),
        };
        dates.push(next.ok_or_else(overflow)?);
    }

    Ok(dates)
}
