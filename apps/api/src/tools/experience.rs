// Years-of-experience heuristics for the job-match baseline.

use std::sync::LazyLock;

use chrono::{Datelike, Utc};
use regex::Regex;

/// Upper bound on any single year figure; bigger numbers are not experience.
const MAX_PLAUSIBLE_YEARS: u32 = 50;

/// "5+ years", "3-5 years", "2 to 4 yrs": captures the lower figure.
static REQUIRED_YEARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:\s*(?:-|–|to)\s*\d{1,2})?\s*\+?\s*(?:years?|yrs?)\b")
        .unwrap_or_else(|err| panic!("invalid REQUIRED_YEARS regex: {err}"))
});

/// "6 years of experience", "10+ yrs professional experience".
static STATED_EXPERIENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})\+?\s*(?:years?|yrs?)\s+(?:of\s+)?(?:professional\s+|industry\s+|relevant\s+|hands-on\s+)?experience",
    )
    .unwrap_or_else(|err| panic!("invalid STATED_EXPERIENCE regex: {err}"))
});

/// "2017 - 2019", "2019 – Present".
static YEAR_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b((?:19|20)\d{2})\s*(?:-|–|—|to)\s*((?:19|20)\d{2}|present|current|now|today)\b")
        .unwrap_or_else(|err| panic!("invalid YEAR_RANGE regex: {err}"))
});

/// Largest year requirement stated in a job description; 0 when none is stated.
pub fn extract_required_years(job_text: &str) -> f64 {
    REQUIRED_YEARS
        .captures_iter(job_text)
        .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
        .filter(|&y| y > 0 && y <= MAX_PLAUSIBLE_YEARS)
        .max()
        .map(f64::from)
        .unwrap_or(0.0)
}

pub fn estimate_experience_years(resume_text: &str) -> f64 {
    estimate_experience_years_at(resume_text, Utc::now().year())
}

/// A stated "N years of experience" wins; otherwise employment year ranges are
/// merged (overlaps counted once) and summed. "Present" means `current_year`.
pub fn estimate_experience_years_at(resume_text: &str, current_year: i32) -> f64 {
    let stated = STATED_EXPERIENCE
        .captures_iter(resume_text)
        .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
        .filter(|&y| y <= MAX_PLAUSIBLE_YEARS)
        .max();
    if let Some(years) = stated {
        return f64::from(years);
    }

    let mut ranges: Vec<(i32, i32)> = YEAR_RANGE
        .captures_iter(resume_text)
        .filter_map(|c| {
            let start = c.get(1)?.as_str().parse::<i32>().ok()?;
            let end_raw = c.get(2)?.as_str();
            let end = end_raw.parse::<i32>().unwrap_or(current_year);
            (start <= end && end <= current_year).then_some((start, end))
        })
        .collect();
    ranges.sort_unstable();

    let mut total = 0;
    let mut current: Option<(i32, i32)> = None;
    for (start, end) in ranges {
        current = match current {
            Some((s, e)) if start <= e => Some((s, e.max(end))),
            Some((s, e)) => {
                total += e - s;
                Some((start, end))
            }
            None => Some((start, end)),
        };
    }
    if let Some((s, e)) = current {
        total += e - s;
    }

    f64::from(total)
}
