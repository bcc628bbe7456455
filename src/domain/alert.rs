//! Alert types produced by threshold classification.

use serde::{Deserialize, Serialize};

/// A monitored vital sign.
///
/// Declaration order is the dashboard order and the alert order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "SpO₂")]
    Spo2,
    #[serde(rename = "Heart Rate")]
    HeartRate,
    #[serde(rename = "Temperature")]
    Temperature,
    #[serde(rename = "Blood Pressure")]
    BloodPressure,
    #[serde(rename = "Respiratory Rate")]
    RespiratoryRate,
}

impl Metric {
    /// All metrics in display order.
    pub const ALL: [Metric; 5] = [
        Self::Spo2,
        Self::HeartRate,
        Self::Temperature,
        Self::BloodPressure,
        Self::RespiratoryRate,
    ];

    /// Human-readable metric name used in alerts.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Spo2 => "SpO₂",
            Self::HeartRate => "Heart Rate",
            Self::Temperature => "Temperature",
            Self::BloodPressure => "Blood Pressure",
            Self::RespiratoryRate => "Respiratory Rate",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Severity of a single metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertLevel {
    /// Within thresholds
    Normal,
    /// Outside thresholds, follow-up advised
    Warning,
    /// Outside thresholds, act now
    Critical,
}

impl AlertLevel {
    /// Get the associated color for threshold coloring (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Normal => (16, 185, 129),   // Emerald (#10B981)
            Self::Warning => (251, 191, 36),  // Amber (#FBBF24)
            Self::Critical => (244, 63, 94),  // Rose (#F43F5E)
        }
    }

    #[must_use]
    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A flagged out-of-range metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub metric: Metric,
    pub level: AlertLevel,
    pub message: String,
}

impl Alert {
    #[must_use]
    pub fn new(metric: Metric, level: AlertLevel, message: impl Into<String>) -> Self {
        Self {
            metric,
            level,
            message: message.into(),
        }
    }
}
