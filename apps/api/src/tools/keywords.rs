// Deterministic keyword overlap between job terms and resume text.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordOverlap {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    /// 0–100, one decimal.
    pub overlap_percent: f64,
}

/// Case-insensitive whole-term match of each job term against the resume.
///
/// Terms are deduplicated case-insensitively; original spelling is kept.
pub fn compute_keyword_overlap(job_terms: &[String], resume_text: &str) -> KeywordOverlap {
    let haystack = resume_text.to_lowercase();
    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    let mut missing = Vec::new();

    for term in job_terms.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        let needle = term.to_lowercase();
        if !seen.insert(needle.clone()) {
            continue;
        }
        if contains_term(&haystack, &needle) {
            matched.push(term.to_string());
        } else {
            missing.push(term.to_string());
        }
    }

    let total = matched.len() + missing.len();
    let overlap_percent = if total == 0 {
        0.0
    } else {
        (matched.len() as f64 / total as f64 * 1000.0).round() / 10.0
    };

    KeywordOverlap {
        matched,
        missing,
        overlap_percent,
    }
}

/// `needle` occurs in `haystack` with no alphanumeric character on either side.
/// Works for terms like `c++` and `node.js` where `\b` does not.
pub(crate) fn contains_term(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
