// Prompt constants for the semantic extractors.
// Placeholders: {document_kind}, {text}, {resume}, {job}.

pub const KEYWORD_ROLE: &str =
    "You extract skills and keywords from resumes and job descriptions for ATS matching.";

pub const LOCAL_KEYWORD_ROLE: &str = "You list skills found in text.";

pub const KEYWORD_SCHEMA: &str = r#"{
  "technicalSkills": ["Rust", "PostgreSQL"],
  "softSkills": ["Mentoring"],
  "tools": ["Docker"],
  "certifications": ["AWS Solutions Architect"]
}"#;

pub const LOCAL_KEYWORD_SCHEMA: &str = r#"{"keywords": ["Rust", "Docker"]}"#;

pub const KEYWORD_PROMPT: &str = "\
Extract every skill, technology, tool and certification named in the {document_kind} below. \
Use the exact spelling from the text. Do not infer skills that are not written.

{document_kind}:
{text}";

pub const LOCAL_KEYWORD_PROMPT: &str = "List the skills and tools in this {document_kind}:\n{text}";

pub const VERB_ROLE: &str =
    "You are a resume writing coach who evaluates the action verbs that open achievement bullets.";

pub const LOCAL_VERB_ROLE: &str = "You rate resume action verbs.";

pub const VERB_SCHEMA: &str = r#"{
  "strongVerbs": ["Led", "Reduced"],
  "weakVerbs": ["Helped", "Worked on"],
  "verbScore": 7,
  "suggestions": [{"weak": "Helped", "stronger": "Enabled"}]
}"#;

pub const LOCAL_VERB_SCHEMA: &str = r#"{"strong": ["Led"], "weak": ["Helped"], "score": 7}"#;

pub const VERB_PROMPT: &str = "\
Classify the verbs that start each bullet or sentence of the resume below as strong \
(specific, ownership, impact) or weak (vague, passive, duty-oriented). \
Score overall verb strength from 0 to 10 and suggest a stronger verb for each weak one.

RESUME:
{text}";

pub const LOCAL_VERB_PROMPT: &str = "Sort the action verbs in this resume into strong and weak, score 0-10:\n{text}";

pub const SKILL_MATCH_ROLE: &str =
    "You are a technical recruiter matching a candidate's resume against a job's required skills.";

pub const LOCAL_SKILL_MATCH_ROLE: &str = "You compare resume skills with job skills.";

pub const SKILL_MATCH_SCHEMA: &str = r#"{
  "exactMatches": [{"skill": "Rust", "evidence": "quote from the resume"}],
  "relatedMatches": [{"required": "Kafka", "candidateHas": "RabbitMQ", "explanation": "both are message brokers"}],
  "missingSkills": [{"skill": "Terraform", "importance": "critical | important | nice_to_have", "learnability": "quick | moderate | significant"}]
}"#;

pub const LOCAL_SKILL_MATCH_SCHEMA: &str =
    r#"{"matched": ["Rust"], "related": ["Kafka"], "missing": ["Terraform"]}"#;

pub const SKILL_MATCH_PROMPT: &str = "\
For every skill the job requires, decide whether the resume shows it exactly (quote the evidence), \
shows a related or transferable skill, or lacks it. Tag each missing skill with how important it is \
to the job and how quickly it can be learned.

JOB DESCRIPTION:
{job}

RESUME:
{resume}";

pub const LOCAL_SKILL_MATCH_PROMPT: &str = "Which job skills does the resume have, partly have, or miss?\n\nJOB:\n{job}\n\nRESUME:\n{resume}";

pub const SIMILARITY_ROLE: &str =
    "You assess how closely a candidate's background fits a job, beyond literal keyword matches.";

pub const LOCAL_SIMILARITY_ROLE: &str = "You rate how well a resume fits a job.";

pub const SIMILARITY_SCHEMA: &str = r#"{
  "score": 65,
  "explanation": "Two sentences on the overall fit",
  "transferableSkills": ["Distributed systems design"],
  "recommendation": "One sentence on what the candidate should emphasize"
}"#;

pub const LOCAL_SIMILARITY_SCHEMA: &str = r#"{"score": 65, "reason": "one sentence"}"#;

pub const SIMILARITY_PROMPT: &str = "\
Rate the semantic similarity between the resume and the job from 0 to 100, considering \
responsibilities, domain and seniority as well as skills.

JOB DESCRIPTION:
{job}

RESUME:
{resume}";

pub const LOCAL_SIMILARITY_PROMPT: &str = "Rate 0-100 how well this resume fits this job.\n\nJOB:\n{job}\n\nRESUME:\n{resume}";
