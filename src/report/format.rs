//! Formatted terminal output.
//!
//! We keep formatting code in one place so the predictor stays free of
//! presentation concerns and output changes are localized.

use crate::domain::CutTrace;
use crate::io::{BatchOutcome, RowError};
use crate::predict::Calibration;
use crate::report::maps_url;
use crate::topology::SegmentSelection;

/// Format a single prediction with its intermediate quantities.
pub fn format_prediction(
    selection: &SegmentSelection,
    calibration: &Calibration,
    slack_ratio: f64,
    trace: &CutTrace,
) -> String {
    let mut out = String::new();

    out.push_str("=== cutloc - OTDR cut prediction ===\n");
    out.push_str(&format!(
        "Segment: {} (OLT {}, {})\n",
        selection.segment_id, selection.olt, selection.city
    ));
    out.push_str(&format!(
        "Calibration: overread x{:.3}, slack {:.1} m every {:.0} m, ratio {:.2}\n",
        calibration.overread_factor, calibration.slack_loop_m, calibration.slack_span_m, slack_ratio
    ));
    out.push_str(&format!("OTDR distance: {:.2} m\n", trace.distance_otdr_m));
    out.push_str(&format!("Adjusted OTDR distance: {:.2} m\n", trace.adjusted_distance_m));
    out.push_str(&format!("Cable slack adjustment: {:.2} m\n", trace.slack_adjustment_m));
    out.push_str(&format!("Effective distance: {:.2} m\n", trace.effective_distance_m));

    match &trace.end_pole {
        Some(end) => out.push_str(&format!(
            "Span #{}: {} -> {}, {:.2} m past {}\n",
            trace.span_index + 1,
            trace.start_pole,
            end,
            trace.distance_within_span_m,
            trace.start_pole
        )),
        None => out.push_str(&format!(
            "Span #{}: end of segment at {}\n",
            trace.span_index + 1,
            trace.start_pole
        )),
    }

    out.push_str(&format!(
        "Predicted cut location: Latitude={:.6}, Longitude={:.6}\n",
        trace.location.latitude, trace.location.longitude
    ));
    out.push_str(&format!("Map: {}\n", maps_url(trace.location)));
    out
}

/// One-line-per-reading summary of a batch run.
pub fn format_batch_summary(outcomes: &[BatchOutcome]) -> String {
    let ok = outcomes.iter().filter(|o| o.result.is_ok()).count();
    let mut out = format!(
        "=== cutloc - batch: {ok}/{} readings located ===\n",
        outcomes.len()
    );
    out.push_str(&format!(
        "{:>5}  {:<12} {:>10}  {}\n",
        "line", "segment", "otdr (m)", "result"
    ));
    for o in outcomes {
        let result = match &o.result {
            Ok(trace) => format!("{} ({})", trace.location, trace.start_pole),
            Err(message) => format!("error: {message}"),
        };
        out.push_str(&format!(
            "{:>5}  {:<12} {:>10.2}  {}\n",
            o.line, o.segment_id, o.distance_m, result
        ));
    }
    out
}

/// Numbered listing used by `cutloc list` and the interactive picker.
pub fn format_listing(title: &str, items: &[String]) -> String {
    let mut out = format!("{title} ({}):\n", items.len());
    for (idx, item) in items.iter().enumerate() {
        out.push_str(&format!("{:>3}) {item}\n", idx + 1));
    }
    out
}

/// Summarize skipped ingest rows, showing at most `max` of them.
pub fn format_row_errors(errors: &[RowError], max: usize) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    let mut out = format!("Skipped {} invalid row(s):\n", errors.len());
    for e in errors.iter().take(max) {
        out.push_str(&format!("  - {e}\n"));
    }
    if errors.len() > max {
        out.push_str(&format!("  ... and {} more\n", errors.len() - max));
    }
    Some(out)
}
