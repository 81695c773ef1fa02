//! Spoken rendering of answers

mod store;
mod tts;

pub use store::{AudioStore, AUDIO_ROUTE};
pub use tts::{split_for_tts, GoogleTranslateTts};

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{SpeechBackend, SpeechConfig};
use crate::error::Result;

/// Trait for turning answer text into audio bytes
///
/// Implementations:
/// - `GoogleTranslateTts`: mp3 from the translate TTS endpoint
#[async_trait]
pub trait SpeechRenderer: Send + Sync {
    /// Synthesize `text` spoken in `language` (ISO 639-1, e.g. "en")
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>>;

    /// Get renderer name for logging
    fn name(&self) -> &str;
}

/// Build the speech renderer selected by configuration, if any
pub fn build_renderer(config: &SpeechConfig) -> Result<Option<Arc<dyn SpeechRenderer>>> {
    match config.provider {
        SpeechBackend::GoogleTranslate => Ok(Some(Arc::new(GoogleTranslateTts::new(config)?))),
        SpeechBackend::Disabled => Ok(None),
    }
}
