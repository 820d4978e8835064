use rmcp::schemars;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct BrainstormRequest {
    /// The challenge to brainstorm on
    #[schemars(description = "Brainstorming challenge or question")]
    #[serde(default)]
    pub prompt: String,

    #[schemars(description = "Fallback model used when the preview model fails")]
    pub model: Option<String>,

    #[schemars(
        description = "Framework: divergent, convergent, scamper, design-thinking, lateral or auto (default)"
    )]
    pub methodology: Option<String>,

    #[schemars(description = "Domain the ideas should fit (default: general)")]
    pub domain: Option<String>,

    #[schemars(description = "Constraints the ideas must respect")]
    pub constraints: Option<String>,

    #[schemars(description = "Background the model should take into account")]
    pub existing_context: Option<String>,

    #[schemars(description = "Number of ideas to generate (default: 12)")]
    pub idea_count: Option<u32>,

    #[schemars(
        description = "Score each idea for feasibility, impact and innovation (default: true)"
    )]
    pub include_analysis: Option<bool>,
}
