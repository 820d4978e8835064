use rmcp::schemars;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FetchChunkRequest {
    #[schemars(description = "Cache key printed with the first chunk of a change-mode result")]
    pub cache_key: String,

    #[schemars(description = "1-based index of the chunk to return")]
    pub chunk_index: usize,
}
