use tracing::warn;

use crate::scoring::ReviewDomain;

/// Allowed ± deviation of the agent's score from the baseline.
///
/// Widest in the ambiguous middle, tightest at the extremes where counted
/// signals already settle the question.
pub fn calculate_allowed_variance(baseline: u8, domain: ReviewDomain) -> u8 {
    match baseline {
        40..=60 => match domain {
            ReviewDomain::Resume => 12,
            ReviewDomain::JobMatch => 15,
        },
        30..=39 | 61..=80 => 10,
        _ => 7,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreValidation {
    pub score: u8,
    /// Set when the proposed score had to be moved into the band.
    pub warning: Option<String>,
}

impl ScoreValidation {
    pub fn was_clamped(&self) -> bool {
        self.warning.is_some()
    }
}

/// Clamps `proposed` into `[baseline - variance, baseline + variance] ∩ [0, 100]`.
pub fn validate_score(proposed: f64, baseline: u8, variance: u8) -> ScoreValidation {
    let low = baseline.saturating_sub(variance);
    let high = baseline.saturating_add(variance).min(100);

    // NaN from a sloppy model collapses to the baseline.
    let rounded = if proposed.is_finite() {
        proposed.round()
    } else {
        f64::from(baseline)
    };
    let score = rounded.clamp(f64::from(low), f64::from(high)) as u8;

    if rounded == f64::from(score) && proposed.is_finite() {
        return ScoreValidation {
            score,
            warning: None,
        };
    }

    let message = format!(
        "Agent proposed score {proposed} outside allowed range [{low}, {high}] \
         (baseline {baseline} ± {variance}); adjusted to {score}"
    );
    warn!(proposed, baseline, variance, adjusted = score, "agent score clamped");
    ScoreValidation {
        score,
        warning: Some(message),
    }
}
