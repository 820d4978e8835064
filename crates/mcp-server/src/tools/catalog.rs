#[derive(Clone, Copy, Debug)]
pub(crate) struct ToolDescriptor {
    pub(crate) name: &'static str,
    pub(crate) summary: &'static str,
}

pub(crate) const TOOL_CATALOG: &[ToolDescriptor] = &[
    ToolDescriptor {
        name: "ask_gemini",
        summary: "Ask Gemini; changeMode=true returns structured OLD/NEW edits in pageable chunks.",
    },
    ToolDescriptor {
        name: "fetch_chunk",
        summary: "Page through a cached change-mode result by cacheKey + chunkIndex.",
    },
    ToolDescriptor {
        name: "brainstorm",
        summary: "Generate scored ideas with a chosen methodology.",
    },
    ToolDescriptor {
        name: "help",
        summary: "Gemini CLI usage text.",
    },
    ToolDescriptor {
        name: "ping",
        summary: "Echo a message (connectivity check).",
    },
    ToolDescriptor {
        name: "timeout_test",
        summary: "Sleep for a duration and report progress (client timeout check).",
    },
];

pub(crate) fn tool_instructions() -> String {
    let mut lines = vec![
        "Gemini CLI bridge for AI agents.".to_string(),
        "Large change-mode results are split into chunks; the first reply carries a CacheKey, fetch the rest with fetch_chunk before the cache entry expires."
            .to_string(),
        "Tools:".to_string(),
    ];
    for tool in TOOL_CATALOG {
        lines.push(format!("- {}: {}", tool.name, tool.summary));
    }
    lines.join("\n")
}
