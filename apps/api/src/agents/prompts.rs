// Prompt constants for the Analysis and Feedback agents.
// Placeholders: {grounding}, {domain_task}, {context}.

pub const ANALYSIS_ROLE: &str = "You are the Analysis Agent of a resume review system. \
    You propose a final score that stays close to the deterministic baseline and \
    assess keyword / ATS coverage.";

pub const FEEDBACK_ROLE: &str = "You are the Feedback Agent of a resume review system. \
    You write specific, evidence-backed strengths, weaknesses and improvement suggestions.";

pub const LOCAL_ANALYSIS_ROLE: &str = "You score resumes. Stay near the baseline score.";

pub const LOCAL_FEEDBACK_ROLE: &str = "You give short resume feedback.";

pub const ANALYSIS_SCHEMA: &str = r#"{
  "finalScore": 72,
  "scoreRationale": "Why the score differs from (or matches) the baseline, citing criteria",
  "dataInsights": ["Restate the tool-data facts you relied on"],
  "atsAssessment": {
    "compatibility": "high | medium | low",
    "matchedKeywords": ["keyword"],
    "missingCritical": ["keyword the document must add"]
  }
}"#;

pub const LOCAL_ANALYSIS_SCHEMA: &str = r#"{"score": 72, "missing": ["keyword"], "notes": "one sentence"}"#;

pub const FEEDBACK_SCHEMA: &str = r#"{
  "strengths": ["Specific strength with evidence"],
  "weaknesses": ["Specific weakness with evidence"],
  "suggestions": [
    {"category": "Achievements | Keywords | Formatting | Summary | Experience | Skills | Grammar", "suggestion": "Concrete action", "priority": "high | medium | low"}
  ],
  "synthesisNotes": "Two or three sentence overall summary"
}"#;

pub const LOCAL_FEEDBACK_SCHEMA: &str =
    r#"{"strengths": ["..."], "weaknesses": ["..."], "suggestions": ["..."], "summary": "..."}"#;

pub const RESUME_ANALYSIS_TASK: &str = "\
Review the resume below. The baseline already scores keywords, achievements, action verbs \
and formatting from counted signals. Your adjustment room is the subjective criteria: \
professional summary, experience clarity, skills section and grammar. \
Propose finalScore within the allowed variance stated in BASELINE.";

pub const JOB_MATCH_ANALYSIS_TASK: &str = "\
Assess how well the resume fits the job description below. The baseline already scores \
skills match, experience and keyword overlap from counted signals. Your adjustment room is \
qualifications and industry fit. Propose finalScore within the allowed variance stated in BASELINE. \
List in missingCritical only requirements the job explicitly needs and the resume lacks.";

pub const RESUME_FEEDBACK_TASK: &str = "\
Write feedback for the resume below. Tie every strength and weakness to concrete text or \
tool-data counts. Suggestions must be actionable edits, ordered by impact.";

pub const JOB_MATCH_FEEDBACK_TASK: &str = "\
Write feedback on how the candidate should tailor the resume to the job below. Reference \
matched and missing skills from TOOL DATA. Suggestions must be actionable edits, ordered by impact.";

pub const AGENT_PROMPT_TEMPLATE: &str = "{grounding}

{domain_task}

{context}";

pub const LOCAL_AGENT_PROMPT_TEMPLATE: &str = "{grounding}
{domain_task}

{context}";
