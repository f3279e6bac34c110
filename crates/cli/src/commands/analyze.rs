use behuman_core::distress::should_trigger_recommendation;
use behuman_core::{analyze_distress, classify_situation};
use serde_json::json;

use crate::commands::CommandResult;

/// Grades distress in a transcript without touching the database.
pub fn run(transcript: &str) -> CommandResult {
    if transcript.trim().is_empty() {
        return CommandResult::failure("analyze", "invalid_input", "--transcript must not be blank", 7);
    }

    let analysis = analyze_distress(transcript);
    let situation = classify_situation(transcript);
    let message = format!(
        "severity `{}` with {} trigger phrases",
        format!("{:?}", analysis.severity).to_lowercase(),
        analysis.trigger_phrases.len()
    );

    let data = json!({
        "analysis": analysis,
        "situation": situation,
        "alertPriority": analysis.alert_priority(),
        "shouldAlert": analysis.warrants_alert(),
        "shouldTriggerRecommendation": should_trigger_recommendation(transcript),
        "reviewerNote": analysis.reviewer_note(),
    });

    CommandResult::success_with_data("analyze", message, Some(data))
}
