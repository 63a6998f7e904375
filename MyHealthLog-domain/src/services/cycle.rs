//! Menstrual cycle prediction
//!
//! A moving average over the recorded history: the next start is the last
//! start plus the average cycle length, ovulation is fourteen days before
//! that, and the fertile window runs from five days before ovulation to the
//! day after.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

/// Shown when fewer than two cycles are recorded
pub const INSUFFICIENT_HISTORY: &str = "历史记录不足，暂时无法预测。请至少记录两个完整的周期。";

/// Assumed period length when no record has an end date
pub const DEFAULT_PERIOD_LENGTH: i64 = 5;

const LUTEAL_PHASE_DAYS: i64 = 14;
const FERTILE_DAYS_BEFORE_OVULATION: i64 = 5;
const FERTILE_DAYS_AFTER_OVULATION: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct FertileWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Prediction returned by `GET /api/periods/predict`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CyclePrediction {
    pub average_cycle_length: i64,
    pub average_period_length: i64,
    pub next_period_start_date: Option<NaiveDate>,
    pub ovulation_date: Option<NaiveDate>,
    pub fertile_window: Option<FertileWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CyclePrediction {
    fn insufficient() -> Self {
        Self {
            average_cycle_length: 0,
            average_period_length: 0,
            next_period_start_date: None,
            ovulation_date: None,
            fertile_window: None,
            message: Some(INSUFFICIENT_HISTORY.to_string()),
        }
    }
}

/// Mean of non-negative day counts, rounded half up
fn rounded_mean(values: &[i64]) -> Option<i64> {
    if values.is_empty() {
        return None;
    }
    let count = values.len() as i64;
    let sum: i64 = values.iter().sum();
    Some((2 * sum + count) / (2 * count))
}

/// Predict the next cycle from `(start, end)` pairs in any order
pub fn predict_cycle(records: &[(NaiveDate, Option<NaiveDate>)]) -> CyclePrediction {
    let mut records = records.to_vec();
    records.sort_by_key(|(start, _)| *start);

    let cycle_lengths: Vec<i64> = records
        .windows(2)
        .map(|pair| (pair[1].0 - pair[0].0).num_days().abs())
        .collect();
    let Some(average_cycle_length) = rounded_mean(&cycle_lengths) else {
        return CyclePrediction::insufficient();
    };

    let period_lengths: Vec<i64> = records
        .iter()
        .filter_map(|(start, end)| end.map(|end| (end - *start).num_days().abs() + 1))
        .collect();
    let average_period_length = rounded_mean(&period_lengths).unwrap_or(DEFAULT_PERIOD_LENGTH);

    let Some((last_start, _)) = records.last() else {
        return CyclePrediction::insufficient();
    };
    let next_start = *last_start + Duration::days(average_cycle_length);
    let ovulation = next_start - Duration::days(LUTEAL_PHASE_DAYS);

    CyclePrediction {
        average_cycle_length,
        average_period_length,
        next_period_start_date: Some(next_start),
        ovulation_date: Some(ovulation),
        fertile_window: Some(FertileWindow {
            start: ovulation - Duration::days(FERTILE_DAYS_BEFORE_OVULATION),
            end: ovulation + Duration::days(FERTILE_DAYS_AFTER_OVULATION),
        }),
        message: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_fewer_than_two_records_is_insufficient() {
        let prediction = predict_cycle(&[(d(2024, 1, 1), Some(d(2024, 1, 5)))]);
        assert_eq!(prediction.average_cycle_length, 0);
        assert_eq!(prediction.next_period_start_date, None);
        assert_eq!(prediction.message.as_deref(), Some(INSUFFICIENT_HISTORY));
        assert_eq!(predict_cycle(&[]), prediction);
    }

    #[test]
    fn test_prediction_from_two_cycles() {
        let prediction = predict_cycle(&[
            (d(2024, 2, 1), None),
            (d(2024, 1, 1), Some(d(2024, 1, 5))),
        ]);
        assert_eq!(prediction.average_cycle_length, 31);
        assert_eq!(prediction.average_period_length, 5);
        assert_eq!(prediction.next_period_start_date, Some(d(2024, 3, 3)));
        assert_eq!(prediction.ovulation_date, Some(d(2024, 2, 18)));
        assert_eq!(
            prediction.fertile_window,
            Some(FertileWindow {
                start: d(2024, 2, 13),
                end: d(2024, 2, 19),
            })
        );
        assert_eq!(prediction.message, None);
    }

    #[test]
    fn test_averages_round_half_up() {
        // cycles of 28 and 29 days average to 28.5
        let prediction = predict_cycle(&[
            (d(2024, 1, 1), Some(d(2024, 1, 4))),
            (d(2024, 1, 29), Some(d(2024, 2, 2))),
            (d(2024, 2, 27), None),
        ]);
        assert_eq!(prediction.average_cycle_length, 29);
        // periods of 4 and 5 days average to 4.5
        assert_eq!(prediction.average_period_length, 5);
    }

    #[test]
    fn test_default_period_length_without_end_dates() {
        let prediction = predict_cycle(&[(d(2024, 1, 1), None), (d(2024, 1, 29), None)]);
        assert_eq!(prediction.average_period_length, DEFAULT_PERIOD_LENGTH);
    }

    #[test]
    fn test_serializes_camel_case_dates() {
        let prediction = predict_cycle(&[(d(2024, 1, 1), None), (d(2024, 1, 29), None)]);
        let value = serde_json::to_value(&prediction).unwrap();
        assert_eq!(value["averageCycleLength"], json!(28));
        assert_eq!(value["nextPeriodStartDate"], json!("2024-02-26"));
        assert_eq!(value["fertileWindow"]["start"], json!("2024-02-07"));
        assert!(value.get("message").is_none());

        let empty = serde_json::to_value(predict_cycle(&[])).unwrap();
        assert!(empty["fertileWindow"].is_null());
        assert_eq!(empty["message"], json!(INSUFFICIENT_HISTORY));
    }
}
