// Formatting analyzer: bullet usage and section count over normalized text.

use serde::{Deserialize, Serialize};

use crate::preprocess::{is_caps_heading, BULLET};

/// Section titles recognized even when not written in capitals.
const KNOWN_SECTIONS: &[&str] = &[
    "summary",
    "professional summary",
    "profile",
    "objective",
    "experience",
    "work experience",
    "professional experience",
    "employment history",
    "education",
    "skills",
    "technical skills",
    "projects",
    "certifications",
    "awards",
    "publications",
    "languages",
    "volunteer experience",
    "interests",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattingReport {
    pub has_bullet_points: bool,
    pub bullet_count: u32,
    pub section_count: u32,
    pub sections: Vec<String>,
}

pub fn analyze_formatting(text: &str) -> FormattingReport {
    let mut bullet_count = 0u32;
    let mut sections = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.starts_with(BULLET.trim_end()) {
            bullet_count += 1;
        } else if is_section_heading(line) {
            sections.push(line.trim_end_matches(':').to_string());
        }
    }

    FormattingReport {
        has_bullet_points: bullet_count > 0,
        bullet_count,
        section_count: sections.len() as u32,
        sections,
    }
}

fn is_section_heading(line: &str) -> bool {
    if line.is_empty() {
        return false;
    }
    let title = line.trim_end_matches(':').trim().to_lowercase();
    is_caps_heading(line) || KNOWN_SECTIONS.contains(&title.as_str())
}
