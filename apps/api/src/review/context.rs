// Renders the shared agent context: BASELINE, TOOL DATA and the documents.
// Baseline scoring must have finished before this is called: prompts embed it.

use std::fmt::Write as _;

use crate::scoring::BaselineScore;
use crate::tools::{JobMatchToolData, ResumeToolData};

pub fn render_baseline(baseline: &BaselineScore, variance: u8) -> String {
    let low = baseline.score.saturating_sub(variance);
    let high = baseline.score.saturating_add(variance).min(100);

    let mut out = format!(
        "BASELINE (deterministic): {}/100. Allowed finalScore range: [{low}, {high}] (±{variance}).\n",
        baseline.score
    );
    for c in baseline.breakdown.criteria() {
        let _ = writeln!(out, "- {}: {}/{}", c.name, c.points, c.max);
    }
    out
}

pub fn resume_context(
    tool_data: &ResumeToolData,
    baseline: &BaselineScore,
    variance: u8,
    resume_text: &str,
) -> String {
    format!(
        "{}\n{}\nRESUME:\n{resume_text}",
        render_baseline(baseline, variance),
        tool_data.render_for_prompt()
    )
}

pub fn job_match_context(
    tool_data: &JobMatchToolData,
    baseline: &BaselineScore,
    variance: u8,
    resume_text: &str,
    job_text: &str,
) -> String {
    format!(
        "{}\n{}\nJOB DESCRIPTION:\n{job_text}\n\nRESUME:\n{resume_text}",
        render_baseline(baseline, variance),
        tool_data.render_for_prompt()
    )
}
