//! Default prompt templates and placeholder substitution.
//!
//! Templates are plain instruction strings with `{{KEY}}` placeholders. A
//! deployment may override any template by name through
//! `AppState.prompts`; the override wins over the built-in default for
//! that name only.

use std::collections::HashMap;

use crate::error::LlmError;

// Template names. Overrides are keyed by these.
pub const TEAM_REPORT: &str = "team_report";
pub const MEETING_SUMMARY: &str = "meeting_summary";
pub const WEEKLY_EMAIL: &str = "weekly_email";
pub const MANAGEMENT_INSIGHT: &str = "management_insight";
pub const RISK_ASSESSMENT: &str = "risk_assessment";
pub const NOTE_SUMMARY: &str = "note_summary";
pub const DOC_SYNTHESIS: &str = "doc_synthesis";

/// All template names, in the order the settings surface lists them.
pub const TEMPLATE_NAMES: &[&str] = &[
    TEAM_REPORT,
    MEETING_SUMMARY,
    WEEKLY_EMAIL,
    MANAGEMENT_INSIGHT,
    RISK_ASSESSMENT,
    NOTE_SUMMARY,
    DOC_SYNTHESIS,
];

const TEAM_REPORT_PROMPT: &str = "\
You are an expert project-management assistant. Write a concise, professional status report based on this data.
DATA:
{{DATA}}
EXPECTED FORMAT:
1. **Executive Summary**: overall team health in 2 sentences.
2. **Points of Attention**: blockers and critical risks.
3. **Action Plan**: 3 recommended actions.
Be factual and direct.
";

const MEETING_SUMMARY_PROMPT: &str = "\
Write professional meeting minutes ready to be sent by email.
DATA:
{{DATA}}
FORMAT:
Subject: [Minutes] {{TITLE}}
1. **Summary**: main discussions.
2. **Key Decisions**.
3. **Actions**: who does what, and by when.
";

const WEEKLY_EMAIL_PROMPT: &str = "\
Help an employee write their weekly report for management.
DATA:
{{DATA}}
FORMAT:
Subject: Weekly Report - {{NAME}} - {{WEEK}}
Short introduction, notable successes, challenges met, and outlook.
Professional and positive.
";

const MANAGEMENT_INSIGHT_PROMPT: &str = "\
You are a management consultant. Analyze this data and provide a global strategic view.
DATA:
{{DATA}}
Structure the answer with emojis and clear headings. Identify schedule slips and team successes.
";

const RISK_ASSESSMENT_PROMPT: &str = "\
Analyze the critical risks based on the project data and team reports.
DATA:
{{DATA}}
Identify \"Red\" projects, staff overload, and critical dependencies.
";

const NOTE_SUMMARY_PROMPT: &str = "\
Synthesize this note or working canvas.
CONTENT:
{{DATA}}
Identify the key ideas, open questions, and next steps.
";

const DOC_SYNTHESIS_PROMPT: &str = "\
Analyze this document or excerpt.
CONTENT:
{{DATA}}
Provide an executive summary, the 3 key points, and potential alerts.
";

/// Built-in template for a name, if the name is known.
pub fn default_prompt(name: &str) -> Option<&'static str> {
    match name {
        TEAM_REPORT => Some(TEAM_REPORT_PROMPT),
        MEETING_SUMMARY => Some(MEETING_SUMMARY_PROMPT),
        WEEKLY_EMAIL => Some(WEEKLY_EMAIL_PROMPT),
        MANAGEMENT_INSIGHT => Some(MANAGEMENT_INSIGHT_PROMPT),
        RISK_ASSESSMENT => Some(RISK_ASSESSMENT_PROMPT),
        NOTE_SUMMARY => Some(NOTE_SUMMARY_PROMPT),
        DOC_SYNTHESIS => Some(DOC_SYNTHESIS_PROMPT),
        _ => None,
    }
}

/// Resolve a template name against the deployment overrides: the override
/// wins when present, otherwise the built-in default.
pub fn resolve_template(
    name: &str,
    overrides: &HashMap<String, String>,
) -> Result<String, LlmError> {
    if let Some(custom) = overrides.get(name) {
        return Ok(custom.clone());
    }
    default_prompt(name)
        .map(String::from)
        .ok_or_else(|| LlmError::UnknownTemplate(name.to_string()))
}

/// Replace every literal `{{KEY}}` occurrence for each replacement key.
///
/// The substitution is purely textual: no escaping, no recursion, no
/// missing-placeholder detection. A value containing `{{...}}` text is not
/// re-expanded for its own key, and a placeholder with no replacement
/// passes through verbatim into the outbound prompt.
pub fn fill_template(template: &str, replacements: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in replacements {
        let token = format!("{{{{{}}}}}", key);
        result = result.replace(&token, value);
    }
    result
}
