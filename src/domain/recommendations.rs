use serde::{Deserialize, Serialize};

/// Canonical recommendation payload extracted from an episode transcript.
///
/// Missing top-level fields are a deserialization error on purpose: the
/// extractor must never accept (or persist) a partially shaped reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub summary: String,
    pub books: Vec<RecommendedItem>,
    pub media: Vec<RecommendedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Quote or paraphrase of where in the episode the item came up.
    #[serde(default)]
    pub context: String,
}
