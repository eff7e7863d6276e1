//! Text preprocessing: raw resume / job text → normalized text + metadata.
//!
//! Normalization runs in a fixed order (markup, line endings, whitespace, bullets,
//! headings, blank-line collapse). Validation failures are values, never panics,
//! so the caller can show a precise message before any network call is made.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical bullet every bullet glyph is rewritten to.
pub const BULLET: &str = "• ";

const RESUME_MIN_WORDS: usize = 50;
const RESUME_MIN_CHARS: usize = 200;
const RESUME_MAX_WORDS: usize = 10_000;
const JOB_MIN_CHARS: usize = 200;
const JOB_MAX_CHARS: usize = 50_000;

static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*(?:br|/p|/div|/li|/h[1-6]|/tr|/ul|/ol)\s*/?\s*>")
        .unwrap_or_else(|err| panic!("invalid BLOCK_TAG regex: {err}"))
});

static LIST_ITEM_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*li(?:\s[^>]*)?>").unwrap_or_else(|err| panic!("invalid LIST_ITEM_TAG regex: {err}"))
});

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[^>]*>").unwrap_or_else(|err| panic!("invalid ANY_TAG regex: {err}"))
});

static HORIZONTAL_WS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ \t\x{00A0}\x{2000}-\x{200B}\x{3000}]+")
        .unwrap_or_else(|err| panic!("invalid HORIZONTAL_WS regex: {err}"))
});

static BULLET_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:[•●○◦▪▫■□‣⁃∙·➢➤►▶✓✔]|[\-\*–—](?:[ \t]|$))[ \t]*")
        .unwrap_or_else(|err| panic!("invalid BULLET_PREFIX regex: {err}"))
});

static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n{3,}").unwrap_or_else(|err| panic!("invalid EXCESS_NEWLINES regex: {err}"))
});

/// 21+ consecutive characters that are neither letters, digits nor whitespace.
static CORRUPTION_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\p{L}\p{N}\s]{21,}").unwrap_or_else(|err| panic!("invalid CORRUPTION_RUN regex: {err}"))
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}")
        .unwrap_or_else(|err| panic!("invalid EMAIL regex: {err}"))
});

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[\s.\-]?)?\(?\d{3}\)?[\s.\-]?\d{3}[\s.\-]?\d{4}")
        .unwrap_or_else(|err| panic!("invalid PHONE regex: {err}"))
});

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    Job,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentKind::Resume => "resume",
            DocumentKind::Job => "job description",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMetadata {
    pub char_count: usize,
    pub word_count: usize,
    pub line_count: usize,
    pub has_email: bool,
    pub has_phone: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedText {
    pub normalized_text: String,
    pub metadata: TextMetadata,
}

/// Why a document was rejected. `Display` is the user-facing sentence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreprocessingError {
    #[error("The document is empty. Paste or upload its text and try again.")]
    NoContent,

    #[error("The {kind} is too short: it needs at least {requirement}.")]
    TooShort {
        kind: DocumentKind,
        requirement: &'static str,
    },

    #[error("The {kind} is too long: the limit is {limit}. Trim it and try again.")]
    TooLong {
        kind: DocumentKind,
        limit: &'static str,
    },

    #[error(
        "The document looks garbled, probably from a bad encoding or PDF export. \
         Re-export it as plain text and try again."
    )]
    Corrupted,
}

impl PreprocessingError {
    /// Stable wire code.
    pub fn code(&self) -> &'static str {
        match self {
            PreprocessingError::NoContent => "NO_CONTENT",
            PreprocessingError::TooShort { .. } => "TOO_SHORT",
            PreprocessingError::TooLong { .. } => "TOO_LONG",
            PreprocessingError::Corrupted => "CORRUPTED",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entry points
// ────────────────────────────────────────────────────────────────────────────

pub fn preprocess_resume(raw: &str) -> Result<PreprocessedText, PreprocessingError> {
    preprocess(raw, DocumentKind::Resume)
}

pub fn preprocess_job(raw: &str) -> Result<PreprocessedText, PreprocessingError> {
    preprocess(raw, DocumentKind::Job)
}

/// Normalizes `raw`, then validates it for `kind`.
pub fn preprocess(raw: &str, kind: DocumentKind) -> Result<PreprocessedText, PreprocessingError> {
    if raw.trim().is_empty() {
        return Err(PreprocessingError::NoContent);
    }

    let normalized_text = normalize(raw);
    if normalized_text.is_empty() {
        return Err(PreprocessingError::NoContent);
    }

    let metadata = metadata(&normalized_text);
    validate_size(kind, &metadata)?;

    if CORRUPTION_RUN.is_match(&normalized_text) {
        return Err(PreprocessingError::Corrupted);
    }

    Ok(PreprocessedText {
        normalized_text,
        metadata,
    })
}

fn validate_size(kind: DocumentKind, meta: &TextMetadata) -> Result<(), PreprocessingError> {
    match kind {
        DocumentKind::Resume => {
            if meta.word_count < RESUME_MIN_WORDS || meta.char_count < RESUME_MIN_CHARS {
                return Err(PreprocessingError::TooShort {
                    kind,
                    requirement: "50 words and 200 characters",
                });
            }
            if meta.word_count > RESUME_MAX_WORDS {
                return Err(PreprocessingError::TooLong {
                    kind,
                    limit: "10,000 words",
                });
            }
        }
        DocumentKind::Job => {
            if meta.char_count < JOB_MIN_CHARS {
                return Err(PreprocessingError::TooShort {
                    kind,
                    requirement: "200 characters",
                });
            }
            if meta.char_count > JOB_MAX_CHARS {
                return Err(PreprocessingError::TooLong {
                    kind,
                    limit: "50,000 characters",
                });
            }
        }
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Normalization
// ────────────────────────────────────────────────────────────────────────────

pub fn normalize(raw: &str) -> String {
    let text = strip_markup(raw);
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    let text = text
        .lines()
        .map(|line| HORIZONTAL_WS.replace_all(line, " ").trim().to_string())
        .collect::<Vec<_>>()
        .join("\n");

    let text = BULLET_PREFIX.replace_all(&text, BULLET);
    let text = separate_headings(&text);
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");

    text.trim().to_string()
}

fn strip_markup(raw: &str) -> String {
    let text = BLOCK_TAG.replace_all(raw, "\n");
    let text = LIST_ITEM_TAG.replace_all(&text, "\n• ");
    let text = ANY_TAG.replace_all(&text, "");
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Surrounds ALL-CAPS heading lines with blank lines.
fn separate_headings(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for line in text.lines() {
        if is_caps_heading(line) {
            out.push('\n');
            out.push_str(line);
            out.push_str("\n\n");
        } else {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// A short line whose letters are all uppercase, e.g. `WORK EXPERIENCE`.
pub(crate) fn is_caps_heading(line: &str) -> bool {
    let trimmed = line.trim().trim_end_matches(':');
    if trimmed.starts_with(BULLET.trim_end()) || trimmed.chars().count() > 40 {
        return false;
    }
    let letters: Vec<char> = trimmed.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 4 && letters.iter().all(|c| c.is_uppercase())
}

fn metadata(text: &str) -> TextMetadata {
    TextMetadata {
        char_count: text.chars().count(),
        word_count: text.split_whitespace().count(),
        line_count: text.lines().count(),
        has_email: EMAIL.is_match(text),
        has_phone: PHONE.is_match(text),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    /// A resume comfortably above every minimum.
    pub const SAMPLE_RESUME: &str = "\
Jane Doe
jane.doe@example.com | (555) 123-4567

SUMMARY
Backend engineer with 6 years of experience building Rust and Go services.

EXPERIENCE
Senior Engineer, Acme Corp (2019 - Present)
- Led a team of 6 engineers delivering a payments platform
- Reduced p99 latency by 40% through caching and query tuning
- Increased throughput 3x by migrating batch jobs to async workers
- Saved $120k per year by consolidating cloud accounts

Engineer, Initech (2017 - 2019)
- Built REST APIs in Rust used by 15 clients
- Implemented CI pipelines with Docker and Kubernetes

SKILLS
Rust, Go, PostgreSQL, Redis, Docker, Kubernetes, AWS, Terraform

EDUCATION
B.Sc. Computer Science, State University";

    pub const SAMPLE_JOB: &str = "\
Senior Backend Engineer

We are looking for a backend engineer with 5+ years of experience building \
distributed systems. You will design and operate services in Rust, work with \
PostgreSQL and Kafka, and deploy on Kubernetes in AWS.

Requirements:
- 5+ years of professional software engineering
- Strong Rust or Go experience
- Experience with PostgreSQL, Kafka and Kubernetes
- Familiarity with Terraform and CI/CD";
}

#[cfg(test)]
mod tests {
    use super::testing::{SAMPLE_JOB, SAMPLE_RESUME};
    use super::*;

    #[test]
    fn test_valid_resume_passes_with_metadata() {
        let out = preprocess_resume(SAMPLE_RESUME).unwrap();
        assert!(out.metadata.word_count >= 50);
        assert!(out.metadata.has_email);
        assert!(out.metadata.has_phone);
        assert!(out.normalized_text.contains("• Led a team of 6 engineers"));
    }

    #[test]
    fn test_empty_and_blank_inputs_are_no_content() {
        assert_eq!(preprocess_resume(""), Err(PreprocessingError::NoContent));
        assert_eq!(preprocess_job("  \n\t "), Err(PreprocessingError::NoContent));
        assert_eq!(preprocess_job("<p></p><br/>"), Err(PreprocessingError::NoContent));
    }

    #[test]
    fn test_short_resume_is_too_short() {
        let err = preprocess_resume("Rust engineer. Built things.").unwrap_err();
        assert_eq!(err.code(), "TOO_SHORT");
    }

    #[test]
    fn test_many_long_words_under_fifty_is_still_too_short() {
        let text = "supercalifragilistic ".repeat(30);
        assert_eq!(preprocess_resume(&text).unwrap_err().code(), "TOO_SHORT");
    }

    #[test]
    fn test_resume_word_limit() {
        let text = "word ".repeat(10_001);
        assert_eq!(preprocess_resume(&text).unwrap_err().code(), "TOO_LONG");
    }

    #[test]
    fn test_job_char_limits() {
        assert!(preprocess_job(SAMPLE_JOB).is_ok());
        assert_eq!(preprocess_job("Short job ad").unwrap_err().code(), "TOO_SHORT");
        let huge = "engineer ".repeat(6_000);
        assert_eq!(preprocess_job(&huge).unwrap_err().code(), "TOO_LONG");
    }

    #[test]
    fn test_garbled_text_is_corrupted() {
        let text = format!("{SAMPLE_JOB}\n{}", "�".repeat(25));
        assert_eq!(preprocess_job(&text).unwrap_err(), PreprocessingError::Corrupted);
    }

    #[test]
    fn test_twenty_symbols_is_not_corrupted() {
        let text = format!("{SAMPLE_JOB}\n{}", "#".repeat(20));
        assert!(preprocess_job(&text).is_ok());
    }

    #[test]
    fn test_markup_and_entities_are_stripped() {
        let out = normalize("<ul><li>Rust &amp; Go</li><li>AWS</li></ul><p>Fast&nbsp;learner</p>");
        assert!(!out.contains('<'));
        assert!(out.contains("• Rust & Go"));
        assert!(out.contains("• AWS"));
        assert!(out.contains("Fast learner"));
    }

    #[test]
    fn test_bullets_are_canonical() {
        let out = normalize("▪ one\n* two\n- three\n● four");
        assert_eq!(out, "• one\n• two\n• three\n• four");
    }

    #[test]
    fn test_whitespace_and_newlines_collapse() {
        let out = normalize("a\r\n\r\n\r\n\r\nb\t\t  c");
        assert_eq!(out, "a\n\nb c");
    }

    #[test]
    fn test_caps_headings_are_separated() {
        let out = normalize("Intro line\nWORK EXPERIENCE\nEngineer at Acme");
        assert_eq!(out, "Intro line\n\nWORK EXPERIENCE\n\nEngineer at Acme");
    }

    #[test]
    fn test_heading_detection() {
        assert!(is_caps_heading("SKILLS:"));
        assert!(is_caps_heading("WORK EXPERIENCE"));
        assert!(!is_caps_heading("Skills"));
        assert!(!is_caps_heading("AWS"));
        assert!(!is_caps_heading("• AWS, GCP"));
    }

    #[test]
    fn test_error_messages_are_user_facing() {
        let err = PreprocessingError::TooShort {
            kind: DocumentKind::Job,
            requirement: "200 characters",
        };
        assert_eq!(err.to_string(), "The job description is too short: it needs at least 200 characters.");
    }
}
