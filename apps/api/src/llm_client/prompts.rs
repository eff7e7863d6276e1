// Shared prompt fragments used by every structured call.
// Each module that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Reminder that pre-computed tool data is ground truth.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: The TOOL DATA and BASELINE sections below were computed deterministically. \
    Treat every count in them as fact. Do NOT recount, contradict, or invent numbers. \
    Cite concrete evidence from the document for every claim.";

/// Shortened grounding note for local models with small context windows.
pub const LOCAL_GROUNDING_INSTRUCTION: &str =
    "Use the numbers in TOOL DATA as facts. Keep answers short.";

/// Joins a role-specific system prompt with the JSON-only rule.
pub fn system_prompt(role: &str) -> String {
    format!("{role} {JSON_ONLY_SYSTEM}")
}

/// Fills `{name}` placeholders in a single pass.
///
/// Substituted text is never rescanned, so a document that happens to contain
/// `{resume}` or `{job}` stays literal.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(key, _)| tail.starts_with(*key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
