//! Vitals evaluation: threshold classification, alerts and recommendations.
//!
//! Thresholds:
//!
//! | Metric           | Rule        | Level    | Message                |
//! |------------------|-------------|----------|------------------------|
//! | SpO₂             | `< 92`      | Critical | "Low oxygen!"          |
//! | Heart Rate       | `> 100`     | Warning  | "Possible tachycardia" |
//! | Temperature      | `> 38.0`    | Warning  | "Fever detected"       |
//! | Blood Pressure   | none        | Normal   |                        |
//! | Respiratory Rate | none        | Normal   |                        |
//!
//! SpO₂ has no Warning tier and the other two have no Critical tier. The
//! asymmetry is kept as is; do not add tiers here without clinical sign-off.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::domain::{Alert, AlertLevel, Metric, ValidationError, VitalReading};

pub const SPO2_CRITICAL_BELOW: f64 = 92.0;
pub const HEART_RATE_WARNING_ABOVE: i64 = 100;
pub const TEMPERATURE_WARNING_ABOVE: f64 = 38.0;

const MSG_LOW_OXYGEN: &str = "Low oxygen!";
const MSG_TACHYCARDIA: &str = "Possible tachycardia";
const MSG_FEVER: &str = "Fever detected";

const REC_OXYGEN: &str = "Provide oxygen or ensure fresh air.";
const REC_REST: &str = "Advise rest and hydration.";
const REC_FEVER: &str = "Monitor fever; consider paracetamol.";

/// Level per metric.
pub type Classification = BTreeMap<Metric, AlertLevel>;

/// Everything the dashboard shows for one reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub reading: VitalReading,
    pub levels: Classification,
    pub alerts: Vec<Alert>,
    pub recommendations: Vec<String>,
}

impl Assessment {
    /// Highest level across all metrics.
    #[must_use]
    pub fn worst_level(&self) -> AlertLevel {
        self.levels
            .values()
            .copied()
            .max()
            .unwrap_or(AlertLevel::Normal)
    }
}

/// Stateless vitals evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct VitalsEvaluator;

impl VitalsEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Level for every metric of `reading`.
    ///
    /// # Errors
    /// Returns `ValidationError` for non-finite values or SpO₂ outside 0-100.
    /// A NaN would otherwise compare as in range and hide an alert.
    pub fn classify(&self, reading: &VitalReading) -> Result<Classification, ValidationError> {
        reading.validate()?;
        Ok(Self::levels(reading))
    }

    fn levels(reading: &VitalReading) -> Classification {
        let spo2 = if reading.spo2_percent < SPO2_CRITICAL_BELOW {
            AlertLevel::Critical
        } else {
            AlertLevel::Normal
        };
        let heart_rate = if reading.heart_rate_bpm > HEART_RATE_WARNING_ABOVE {
            AlertLevel::Warning
        } else {
            AlertLevel::Normal
        };
        let temperature = if reading.temperature_c > TEMPERATURE_WARNING_ABOVE {
            AlertLevel::Warning
        } else {
            AlertLevel::Normal
        };

        BTreeMap::from([
            (Metric::Spo2, spo2),
            (Metric::HeartRate, heart_rate),
            (Metric::Temperature, temperature),
            (Metric::BloodPressure, AlertLevel::Normal),
            (Metric::RespiratoryRate, AlertLevel::Normal),
        ])
    }

    /// Alerts for every non-normal metric, ordered SpO₂, Heart Rate, Temperature.
    ///
    /// # Errors
    /// Returns `ValidationError` if the reading is invalid; no partial alerts.
    pub fn evaluate(&self, reading: &VitalReading) -> Result<Vec<Alert>, ValidationError> {
        Ok(Self::alerts(&self.classify(reading)?))
    }

    fn alerts(levels: &Classification) -> Vec<Alert> {
        levels
            .iter()
            .map(|(metric, level)| (*metric, *level))
            .filter(|(_, level)| !level.is_normal())
            .filter_map(|(metric, level)| {
                let message = match (metric, level) {
                    (Metric::Spo2, AlertLevel::Critical) => MSG_LOW_OXYGEN,
                    (Metric::HeartRate, AlertLevel::Warning) => MSG_TACHYCARDIA,
                    (Metric::Temperature, AlertLevel::Warning) => MSG_FEVER,
                    _ => return None,
                };
                Some(Alert::new(metric, level, message))
            })
            .collect()
    }

    /// Static advice keyed on which metrics alerted, regardless of level.
    #[must_use]
    pub fn recommendations(&self, alerts: &[Alert]) -> Vec<String> {
        let alerted = |metric: Metric| alerts.iter().any(|a| a.metric == metric);

        [
            (Metric::Spo2, REC_OXYGEN),
            (Metric::HeartRate, REC_REST),
            (Metric::Temperature, REC_FEVER),
        ]
        .into_iter()
        .filter(|(metric, _)| alerted(*metric))
        .map(|(_, text)| text.to_string())
        .collect()
    }

    /// Validate `reading`, then classify, alert and recommend.
    ///
    /// # Errors
    /// Returns `ValidationError` if the reading violates its numeric invariants.
    pub fn assess(&self, reading: &VitalReading) -> Result<Assessment, ValidationError> {
        let levels = self.classify(reading)?;
        let alerts = Self::alerts(&levels);
        let recommendations = self.recommendations(&alerts);

        if !alerts.is_empty() {
            tracing::debug!(
                alerts = alerts.len(),
                "Reading outside thresholds: {}",
                alerts
                    .iter()
                    .map(|a| a.metric.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        Ok(Assessment {
            reading: reading.clone(),
            levels,
            alerts,
            recommendations,
        })
    }

    /// Parse one per-patient JSON object and assess it.
    ///
    /// # Errors
    /// Returns `ValidationError` naming every missing or malformed field.
    pub fn assess_value(&self, value: &Value) -> Result<Assessment, ValidationError> {
        let reading = VitalReading::from_value(value)?;
        self.assess(&reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reading(temperature: f64, heart_rate: i64, spo2: f64) -> VitalReading {
        VitalReading {
            temperature_c: temperature,
            heart_rate_bpm: heart_rate,
            spo2_percent: spo2,
            blood_pressure: "120/80".into(),
            respiratory_rate: 16,
        }
    }

    #[test]
    fn test_all_three_alerts_in_order() {
        let evaluator = VitalsEvaluator::new();
        let r = VitalReading {
            temperature_c: 39.2,
            heart_rate_bpm: 110,
            spo2_percent: 90.0,
            blood_pressure: "130/85".into(),
            respiratory_rate: 18,
        };

        let alerts = evaluator.evaluate(&r).expect("Valid reading");
        assert_eq!(
            alerts,
            vec![
                Alert::new(Metric::Spo2, AlertLevel::Critical, "Low oxygen!"),
                Alert::new(Metric::HeartRate, AlertLevel::Warning, "Possible tachycardia"),
                Alert::new(Metric::Temperature, AlertLevel::Warning, "Fever detected"),
            ]
        );
        assert_eq!(alerts[0].metric.name(), "SpO₂");

        assert_eq!(
            evaluator.recommendations(&alerts),
            vec![
                "Provide oxygen or ensure fresh air.",
                "Advise rest and hydration.",
                "Monitor fever; consider paracetamol.",
            ]
        );
    }

    #[test]
    fn test_normal_reading_has_no_alerts() {
        let evaluator = VitalsEvaluator::new();
        let r = reading(36.8, 78, 97.0);

        let alerts = evaluator.evaluate(&r).expect("Valid reading");
        assert!(alerts.is_empty());
        assert!(evaluator.recommendations(&alerts).is_empty());
        assert!(evaluator.classify(&r).expect("Valid reading").values().all(AlertLevel::is_normal));
    }

    #[test]
    fn test_boundaries_are_normal() {
        let evaluator = VitalsEvaluator::new();
        let levels = evaluator
            .classify(&reading(38.0, 100, 92.0))
            .expect("Valid reading");
        assert_eq!(levels[&Metric::Temperature], AlertLevel::Normal);
        assert_eq!(levels[&Metric::HeartRate], AlertLevel::Normal);
        assert_eq!(levels[&Metric::Spo2], AlertLevel::Normal);

        let levels = evaluator
            .classify(&reading(38.01, 101, 91.9))
            .expect("Valid reading");
        assert_eq!(levels[&Metric::Temperature], AlertLevel::Warning);
        assert_eq!(levels[&Metric::HeartRate], AlertLevel::Warning);
        assert_eq!(levels[&Metric::Spo2], AlertLevel::Critical);
    }

    #[test]
    fn test_display_only_metrics_stay_normal() {
        let evaluator = VitalsEvaluator::new();
        let mut r = reading(36.5, 70, 98.0);
        r.blood_pressure = "220/140".into();
        r.respiratory_rate = 45;

        let levels = evaluator.classify(&r).expect("Valid reading");
        assert_eq!(levels.len(), 5);
        assert_eq!(levels[&Metric::BloodPressure], AlertLevel::Normal);
        assert_eq!(levels[&Metric::RespiratoryRate], AlertLevel::Normal);
        assert!(evaluator.evaluate(&r).expect("Valid reading").is_empty());
    }

    #[test]
    fn test_recommendations_follow_metric_not_order() {
        let evaluator = VitalsEvaluator::new();
        let alerts = vec![
            Alert::new(Metric::Temperature, AlertLevel::Critical, "custom"),
            Alert::new(Metric::Spo2, AlertLevel::Warning, "custom"),
        ];
        assert_eq!(
            evaluator.recommendations(&alerts),
            vec!["Provide oxygen or ensure fresh air.", "Monitor fever; consider paracetamol."]
        );
    }

    #[test]
    fn test_assess_bundles_everything() {
        let evaluator = VitalsEvaluator::new();
        let assessment = evaluator
            .assess(&reading(37.0, 120, 95.0))
            .expect("Should assess");

        assert_eq!(assessment.alerts.len(), 1);
        assert_eq!(assessment.recommendations, vec!["Advise rest and hydration."]);
        assert_eq!(assessment.worst_level(), AlertLevel::Warning);
    }

    #[test]
    fn test_assess_rejects_non_finite() {
        let evaluator = VitalsEvaluator::new();
        let err = evaluator
            .assess(&reading(f64::INFINITY, 80, 97.0))
            .expect_err("Should reject");
        assert_eq!(err.fields(), vec!["temperature"]);
    }

    #[test]
    fn test_non_finite_readings_never_classify() {
        let evaluator = VitalsEvaluator::new();

        let err = evaluator
            .evaluate(&reading(36.8, 78, f64::NAN))
            .expect_err("NaN SpO₂ must not pass as normal");
        assert_eq!(err.fields(), vec!["spo2"]);

        let err = evaluator
            .evaluate(&reading(f64::NEG_INFINITY, 78, f64::INFINITY))
            .expect_err("Should reject");
        assert_eq!(err.fields(), vec!["temperature", "spo2"]);

        assert!(evaluator.classify(&reading(f64::NAN, 78, 97.0)).is_err());
        assert!(evaluator.classify(&reading(36.8, 78, 101.0)).is_err());
    }

    #[test]
    fn test_assess_value_fails_without_partial_result() {
        let evaluator = VitalsEvaluator::new();
        let err = evaluator
            .assess_value(&json!({"temperature": 39.5, "bp": "120/80"}))
            .expect_err("Should reject");
        assert_eq!(err.fields(), vec!["heart_rate", "spo2", "respiratory_rate"]);

        let ok = evaluator
            .assess_value(&json!({
                "temperature": 39.2, "heart_rate": 110, "spo2": 90,
                "bp": "130/85", "respiratory_rate": 18
            }))
            .expect("Should assess");
        assert_eq!(ok.worst_level(), AlertLevel::Critical);
        assert_eq!(ok.recommendations.len(), 3);
    }
}
