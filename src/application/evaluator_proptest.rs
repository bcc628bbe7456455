//! Property-based tests for threshold classification.
//!
//! These tests check the alerting rules over the whole input range using
//! property-based testing with proptest.

use proptest::prelude::*;

use super::evaluator::{VitalsEvaluator, HEART_RATE_WARNING_ABOVE};
use crate::adapters::vitals_file::{export_patient, parse_document};
use crate::domain::{AlertLevel, Metric, VitalReading};

/// Strategy for readings in physiologically plausible ranges.
fn reading_strategy() -> impl Strategy<Value = VitalReading> {
    (
        30.0f64..45.0,
        20i64..250,
        0.0f64..=100.0,
        (60u32..250, 30u32..150),
        4i64..60,
    )
        .prop_map(|(temperature_c, heart_rate_bpm, spo2_percent, (sys, dia), respiratory_rate)| {
            VitalReading {
                temperature_c,
                heart_rate_bpm,
                spo2_percent,
                blood_pressure: format!("{sys}/{dia}"),
                respiratory_rate,
            }
        })
}

fn alerts_for(reading: &VitalReading, metric: Metric) -> Vec<AlertLevel> {
    VitalsEvaluator::new()
        .evaluate(reading)
        .expect("Generated readings are valid")
        .into_iter()
        .filter(|a| a.metric == metric)
        .map(|a| a.level)
        .collect()
}

proptest! {
    /// Property: SpO₂ below 92 is Critical, otherwise no SpO₂ alert.
    #[test]
    fn prop_spo2_alert_iff_below_threshold(reading in reading_strategy()) {
        let levels = alerts_for(&reading, Metric::Spo2);
        if reading.spo2_percent < 92.0 {
            prop_assert_eq!(levels, vec![AlertLevel::Critical]);
        } else {
            prop_assert!(levels.is_empty());
        }
    }

    /// Property: heart rate above 100 yields exactly one Warning.
    #[test]
    fn prop_heart_rate_alert_iff_above_threshold(reading in reading_strategy()) {
        let levels = alerts_for(&reading, Metric::HeartRate);
        if reading.heart_rate_bpm > HEART_RATE_WARNING_ABOVE {
            prop_assert_eq!(levels, vec![AlertLevel::Warning]);
        } else {
            prop_assert!(levels.is_empty());
        }
    }

    /// Property: temperature above 38.0 yields a Warning.
    #[test]
    fn prop_temperature_alert_iff_above_threshold(reading in reading_strategy()) {
        let levels = alerts_for(&reading, Metric::Temperature);
        if reading.temperature_c > 38.0 {
            prop_assert_eq!(levels, vec![AlertLevel::Warning]);
        } else {
            prop_assert!(levels.is_empty());
        }
    }

    /// Property: recommendations are empty exactly when alerts are.
    #[test]
    fn prop_recommendations_empty_iff_alerts_empty(reading in reading_strategy()) {
        let evaluator = VitalsEvaluator::new();
        let alerts = evaluator.evaluate(&reading).expect("Generated readings are valid");
        let recommendations = evaluator.recommendations(&alerts);
        prop_assert_eq!(alerts.is_empty(), recommendations.is_empty());
        prop_assert_eq!(alerts.len(), recommendations.len());
    }

    /// Property: alerts never repeat a metric and keep the fixed order.
    #[test]
    fn prop_alerts_ordered_and_unique(reading in reading_strategy()) {
        let alerts = VitalsEvaluator::new()
            .evaluate(&reading)
            .expect("Generated readings are valid");
        let metrics: Vec<Metric> = alerts.iter().map(|a| a.metric).collect();
        let mut sorted = metrics.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(metrics, sorted);
    }

    /// Property: exporting a reading and parsing it back is lossless.
    #[test]
    fn prop_export_roundtrip(reading in reading_strategy(), id in "[A-Z][0-9]{3}") {
        let exported = export_patient(&id, &reading).expect("Should export");
        let document = parse_document(&exported).expect("Should parse export");
        prop_assert_eq!(document.get(&id), Some(&reading));
    }
}
