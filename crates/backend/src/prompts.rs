//! Prompt templates sent to the backend.

/// Wrap a user request with the output-format contract the edit parser expects
#[must_use]
pub fn change_mode_prompt(user_prompt: &str) -> String {
    format!(
        r"[CHANGEMODE INSTRUCTIONS]
You are generating code modifications that will be processed by an automated system. The output format is critical.

OUTPUT FORMAT (follow exactly):
**FILE: [filename]:[line_number]**
```
OLD:
[exact code to be replaced - must match file content precisely]
NEW:
[new code to insert - complete and functional]
```

IMPORTANT: The OLD section must be an EXACT copy from the file.

USER REQUEST:
{}",
        user_prompt.trim()
    )
}

/// Brainstorming framework selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Methodology {
    Divergent,
    Convergent,
    Scamper,
    DesignThinking,
    Lateral,
    Auto,
}

impl Methodology {
    /// Parse a methodology name; unknown names yield `None`
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "divergent" => Some(Self::Divergent),
            "convergent" => Some(Self::Convergent),
            "scamper" => Some(Self::Scamper),
            "design-thinking" => Some(Self::DesignThinking),
            "lateral" => Some(Self::Lateral),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }

    #[must_use]
    pub const fn framework(self) -> &'static str {
        match self {
            Self::Divergent => "Generate many ideas, suspend judgment, combine wild concepts.",
            Self::Convergent => "Refine and prioritize, focus on feasibility and impact.",
            Self::Scamper => "SCAMPER: Substitute, Combine, Adapt, Modify, Put to other use, Eliminate, Reverse.",
            Self::DesignThinking => "Empathize, Define, Ideate, Prototype mindset, user-centered.",
            Self::Lateral => "Break assumptions, use analogies, random connections.",
            Self::Auto => "Blend divergent + SCAMPER + human-centered; pick best approach automatically.",
        }
    }
}

pub const DEFAULT_IDEA_COUNT: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrainstormOptions {
    pub challenge: String,
    /// Raw methodology name as supplied by the caller
    pub methodology: String,
    pub domain: Option<String>,
    pub constraints: Option<String>,
    pub existing_context: Option<String>,
    pub idea_count: u32,
    pub include_analysis: bool,
}

impl BrainstormOptions {
    pub fn new(challenge: impl Into<String>) -> Self {
        Self {
            challenge: challenge.into(),
            methodology: "auto".to_string(),
            domain: None,
            constraints: None,
            existing_context: None,
            idea_count: DEFAULT_IDEA_COUNT,
            include_analysis: true,
        }
    }
}

#[must_use]
pub fn brainstorm_prompt(options: &BrainstormOptions) -> String {
    let framework = Methodology::parse(&options.methodology)
        .map_or("auto strategy.", Methodology::framework);
    let or_default = |value: &Option<String>, default: &'static str| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
            .to_string()
    };
    let (analysis, scores) = if options.include_analysis {
        (
            "\nFor each idea, add Feasibility/Impact/Innovation (1-5) and one-line assessment.",
            "Scores: Feasibility/Impact/Innovation | Assessment",
        )
    } else {
        ("", "")
    };

    format!(
        "# BRAINSTORM
Challenge: {challenge}
Methodology: {framework}
Domain: {domain}
Constraints: {constraints}
Context: {context}
Need {count} distinct, actionable ideas.{analysis}
Format:
### Idea N: Name
Description: ...
{scores}
Ensure ideas are non-duplicative and respect constraints.
",
        challenge = options.challenge,
        domain = or_default(&options.domain, "general"),
        constraints = or_default(&options.constraints, "none listed"),
        context = or_default(&options.existing_context, "n/a"),
        count = options.idea_count,
    )
}
