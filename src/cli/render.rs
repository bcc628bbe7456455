//! Plain-text rendering of the dashboard.
//!
//! Output is line oriented so it reads the same in a terminal, a pipe or a
//! log file. Threshold coloring uses 24-bit ANSI escapes from
//! `AlertLevel::color` and is off unless the caller asks for it.

use std::fmt::Write as _;

use crate::application::Assessment;
use crate::domain::AlertLevel;

use super::session::CurrentUser;

const RULE: &str = "────────────────────────────────────────";

/// Rendering options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub color: bool,
}

fn paint(text: &str, level: AlertLevel, opts: RenderOptions) -> String {
    if !opts.color {
        return text.to_string();
    }
    let (r, g, b) = level.color();
    format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m")
}

/// One patient's block: metric lines with level tags, alerts, recommendations.
pub fn render_assessment(patient_id: &str, assessment: &Assessment, opts: RenderOptions) -> String {
    let mut out = String::new();
    let worst = assessment.worst_level();
    let _ = writeln!(
        out,
        "Patient {patient_id}  [{}]",
        paint(&worst.to_string(), worst, opts)
    );
    let _ = writeln!(out, "{RULE}");

    for (label, value) in assessment.reading.display_lines() {
        let level = assessment
            .levels
            .iter()
            .find(|(metric, _)| metric.name() == label)
            .map_or(AlertLevel::Normal, |(_, level)| *level);
        let _ = writeln!(
            out,
            "  {label:<17} {value:<12} {}",
            paint(&format!("[{level}]"), level, opts)
        );
    }

    if assessment.alerts.is_empty() {
        let _ = writeln!(out, "  All vitals within normal range.");
        return out;
    }

    let _ = writeln!(out, "  Alerts:");
    for alert in &assessment.alerts {
        let _ = writeln!(
            out,
            "    {} {}: {}",
            paint(&format!("[{}]", alert.level), alert.level, opts),
            alert.metric,
            alert.message
        );
    }
    let _ = writeln!(out, "  Recommendations:");
    for recommendation in &assessment.recommendations {
        let _ = writeln!(out, "    - {recommendation}");
    }
    out
}

/// Full dashboard for a signed-in user.
pub fn render_dashboard<'a, I>(user: &CurrentUser, patients: I, opts: RenderOptions) -> String
where
    I: IntoIterator<Item = (&'a str, &'a Assessment)>,
{
    let mut out = String::new();
    let _ = writeln!(out, "Vitals dashboard  ({} · {})", user.username, user.role);
    let _ = writeln!(out);

    let mut shown = 0usize;
    for (patient_id, assessment) in patients {
        out.push_str(&render_assessment(patient_id, assessment, opts));
        out.push('\n');
        shown += 1;
    }
    if shown == 0 {
        let _ = writeln!(out, "No patients.");
    }
    out
}

/// One line per patient: ID, worst level, alert count.
pub fn render_patient_list<'a, I>(patients: I, opts: RenderOptions) -> String
where
    I: IntoIterator<Item = (&'a str, &'a Assessment)>,
{
    let mut out = String::new();
    for (patient_id, assessment) in patients {
        let worst = assessment.worst_level();
        let _ = writeln!(
            out,
            "{patient_id:<12} {:<10} {} alert(s)",
            paint(&worst.to_string(), worst, opts),
            assessment.alerts.len()
        );
    }
    out
}
