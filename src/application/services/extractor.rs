use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

use crate::application::ports::{CompletionClient, CompletionError};
use crate::domain::Recommendations;

/// Extracts a structured recommendation payload from an episode transcript
/// via the completion provider.
///
/// A malformed or incomplete reply is always a terminal error; an empty
/// default payload is never substituted, so a failed extraction can never be
/// mistaken for a cached result later.
pub struct RecommendationExtractor {
    completion: Arc<dyn CompletionClient>,
    max_transcript_chars: usize,
    max_completion_tokens: u32,
    cache_ttl: Duration,
    cache: Mutex<HashMap<String, CachedExtraction>>,
}

struct CachedExtraction {
    stored_at: Instant,
    payload: Recommendations,
}

impl RecommendationExtractor {
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        max_transcript_chars: usize,
        max_completion_tokens: u32,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            completion,
            max_transcript_chars,
            max_completion_tokens,
            cache_ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    #[tracing::instrument(skip(self, transcript))]
    pub async fn extract(
        &self,
        transcript: &str,
        episode_title: &str,
    ) -> Result<Recommendations, ExtractionError> {
        let excerpt = truncate_to_char_boundary(transcript, self.max_transcript_chars);
        let cache_key = content_key(excerpt, episode_title);

        if let Some(payload) = self.cached(&cache_key) {
            tracing::debug!(episode_title, "Extraction cache hit");
            return Ok(payload);
        }

        let prompt = build_prompt(episode_title, excerpt);
        let reply = self
            .completion
            .complete(&prompt, self.max_completion_tokens)
            .await?;

        if reply.trim().is_empty() {
            return Err(ExtractionError::EmptyCompletion);
        }

        let body = strip_code_fences(&reply);
        let payload: Recommendations = serde_json::from_str(body)
            .map_err(|e| ExtractionError::MalformedReply(e.to_string()))?;

        tracing::info!(
            episode_title,
            books = payload.books.len(),
            media = payload.media.len(),
            "Recommendations extracted"
        );

        self.store(cache_key, &payload);
        Ok(payload)
    }

    fn cached(&self, key: &str) -> Option<Recommendations> {
        let mut cache = self.cache.lock().ok()?;
        match cache.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.cache_ttl => {
                Some(entry.payload.clone())
            }
            Some(_) => {
                cache.remove(key);
                None
            }
            None => None,
        }
    }

    fn store(&self, key: String, payload: &Recommendations) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(
                key,
                CachedExtraction {
                    stored_at: Instant::now(),
                    payload: payload.clone(),
                },
            );
        }
    }
}

fn build_prompt(episode_title: &str, transcript: &str) -> String {
    format!(
        r#"You are analyzing a podcast episode transcript. Episode title: "{episode_title}".

Reply with a single JSON object, no prose, with exactly these fields:
- "summary": a concise summary of the episode's content, excluding any advertising or sponsor reads
- "books": every book mentioned, each as {{"title": ..., "description": ..., "context": ...}}
- "media": every film, series, podcast or other media work mentioned, each as {{"title": ..., "description": ..., "context": ...}}

"context" is a short note on where in the conversation the item came up. Use empty arrays when nothing was mentioned.

Transcript:
{transcript}"#
    )
}

/// Strips a markdown code fence (with or without a language tag) wrapped
/// around the reply. Returns the input unchanged when it is not fenced.
fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the language tag line, e.g. "json".
    match rest.split_once('\n') {
        Some((first_line, body))
            if first_line.trim().chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            body.trim()
        }
        _ => rest.trim(),
    }
}

fn truncate_to_char_boundary(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

fn content_key(transcript: &str, episode_title: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(episode_title.as_bytes());
    hasher.update(b"\n");
    hasher.update(transcript.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("completion: {0}")]
    Completion(#[from] CompletionError),
    #[error("completion reply was empty")]
    EmptyCompletion,
    #[error("malformed completion reply: {0}")]
    MalformedReply(String),
}
