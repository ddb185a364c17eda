//! Data types for the publication flow.

use std::time::Duration;

use uuid::Uuid;

use crate::error::Step;
use crate::naming::{OCTET_STREAM, sniff_content_type};

/// An image plus the metadata to publish with it.
///
/// Immutable once built; the display name is stored trimmed.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    data: Vec<u8>,
    name: String,
    artist: String,
    spoiler: bool,
    homepage_feature: bool,
    content_type: String,
}

impl UploadRequest {
    /// Creates a request; the content type is sniffed from `data`.
    pub fn new(data: impl Into<Vec<u8>>, name: &str) -> Self {
        let data = data.into();
        let content_type = sniff_content_type(&data).unwrap_or(OCTET_STREAM).to_string();
        Self {
            data,
            name: name.trim().to_string(),
            artist: String::new(),
            spoiler: false,
            homepage_feature: false,
            content_type,
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    pub fn with_spoiler(mut self, spoiler: bool) -> Self {
        self.spoiler = spoiler;
        self
    }

    pub fn with_homepage_feature(mut self, featured: bool) -> Self {
        self.homepage_feature = featured;
        self
    }

    /// Overrides the sniffed content type (e.g. from an HTTP header).
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn spoiler(&self) -> bool {
        self.spoiler
    }

    pub fn homepage_feature(&self) -> bool {
        self.homepage_feature
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

/// How long to wait for asset processing.
///
/// The default is 15 polls one second apart with no backoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    /// Total fetches before giving up (at least one is always made).
    pub attempts: u32,
    /// Delay after the first unprocessed poll.
    pub interval: Duration,
    /// Multiplier applied to the delay after each unprocessed poll.
    pub backoff: f64,
    /// Upper bound for any single delay.
    pub max_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: 15,
            interval: Duration::from_secs(1),
            backoff: 1.0,
            max_interval: Duration::from_secs(10),
        }
    }
}

impl PollPolicy {
    /// Delay to wait after unprocessed poll number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let cap = self.max_interval.max(self.interval);
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let factor = self.backoff.max(1.0).powi(exponent);
        // Saturates instead of overflowing for huge intervals or factors.
        let nanos = self.interval.as_nanos() as f64 * factor;
        let delay = if nanos >= u64::MAX as f64 {
            Duration::MAX
        } else {
            Duration::from_nanos(nanos as u64)
        };
        delay.min(cap)
    }
}

/// Progress event emitted during publication.
#[derive(Debug, Clone)]
pub enum PublishEvent {
    /// Progress update.
    Progress {
        run_id: Uuid,
        step: Step,
        progress: f64,
        status: String,
    },
    /// The entry was published.
    Completed { run_id: Uuid, entry_id: String },
    /// The run stopped at `step`.
    Failed {
        run_id: Uuid,
        step: Step,
        error: String,
    },
}

/// Identifiers of a fully published image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub asset_id: String,
    pub entry_id: String,
    /// Display name the image was published under.
    pub name: String,
}
