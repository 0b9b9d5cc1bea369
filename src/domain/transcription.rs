use std::fmt;

/// Quality tier requested from the transcription provider. `Fast` is the
/// default; `Accurate` is the slower, costlier fallback tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranscriptTier {
    Fast,
    Accurate,
}

impl TranscriptTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptTier::Fast => "fast",
            TranscriptTier::Accurate => "accurate",
        }
    }
}

impl fmt::Display for TranscriptTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provider-assigned identifier for a submitted transcription job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranscriptionJobId(String);

impl TranscriptionJobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TranscriptionJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Remote state of a transcription job as reported by a status poll.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptionJobState {
    Queued,
    Processing,
    Completed { text: String },
    Failed { message: String },
}
