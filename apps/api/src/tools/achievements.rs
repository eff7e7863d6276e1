// Quantified-achievement counter.
//
// Several overlapping patterns can fire on one phrase ("reduced costs by 40%" hits
// both the "reduced by" and the percentage pattern). Matches are merged into spans
// first, then deduplicated, so each phrase counts once.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const MAX_EXAMPLES: usize = 5;

static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // 40%, 12.5 %
        r"\b\d+(?:\.\d+)?\s?%",
        // $120k, €2.5 million
        r"(?i)[$€£]\s?\d[\d,]*(?:\.\d+)?\s?(?:k|m|b|million|billion|thousand)?\b",
        // 3 weeks, 18 months
        r"(?i)\b\d+(?:\.\d+)?\s?(?:hours?|hrs?|days?|weeks?|months?|minutes?|mins?)\b",
        // increased revenue by 30
        r"(?i)\b(?:increased|decreased|reduced|improved|grew|boosted|cut|raised|lowered|accelerated)\b[^.\n]{0,40}?\bby\s+\d+(?:\.\d+)?",
        // 3x faster, 10x
        r"(?i)\b\d+(?:\.\d+)?\s?x\b(?:\s+(?:faster|more|improvement|increase|reduction))?",
        // team of 6
        r"(?i)\bteam\s+of\s+\d+",
        // 15 clients, 200+ users
        r"(?i)\b\d[\d,]*\+?\s+(?:clients|customers|projects|users|engineers|people|stakeholders|countries|products|services|markets)\b",
    ]
    .into_iter()
    .map(|p| Regex::new(p).unwrap_or_else(|err| panic!("invalid achievement regex {p}: {err}")))
    .collect()
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementReport {
    /// Unique quantified phrases.
    pub count: u32,
    /// Up to five of them, in document order.
    pub examples: Vec<String>,
}

pub fn count_quantified_achievements(text: &str) -> AchievementReport {
    let mut spans: Vec<(usize, usize)> = PATTERNS
        .iter()
        .flat_map(|re| re.find_iter(text).map(|m| (m.start(), m.end())))
        .collect();
    spans.sort_unstable();

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let mut seen = HashSet::new();
    let mut examples = Vec::new();
    let mut count = 0u32;
    for (start, end) in merged {
        let phrase = text[start..end].trim();
        if seen.insert(phrase.to_lowercase()) {
            count += 1;
            if examples.len() < MAX_EXAMPLES {
                examples.push(phrase.to_string());
            }
        }
    }

    AchievementReport { count, examples }
}
