//! Speech synthesis through the Google Translate TTS endpoint

use async_trait::async_trait;
use reqwest::Client;

use crate::config::SpeechConfig;
use crate::error::{Error, Result};

use super::SpeechRenderer;

/// Longest text the endpoint accepts per request
const MAX_PIECE_CHARS: usize = 100;

/// Renders mp3 speech the way gTTS does: one request per short piece,
/// frames concatenated in order
pub struct GoogleTranslateTts {
    client: Client,
    base_url: String,
}

impl GoogleTranslateTts {
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64)")
            .build()
            .map_err(|e| Error::Config(format!("Failed to create TTS client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_piece(
        &self,
        piece: &str,
        language: &str,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>> {
        let url = format!("{}/translate_tts", self.base_url);
        let idx = idx.to_string();
        let total = total.to_string();
        let textlen = piece.chars().count().to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language),
                ("q", piece),
                ("idx", idx.as_str()),
                ("total", total.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::render(format!("TTS request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::render(format!(
                "TTS endpoint returned HTTP {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::render(format!("Failed to read TTS audio: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechRenderer for GoogleTranslateTts {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let pieces = split_for_tts(text, MAX_PIECE_CHARS);
        if pieces.is_empty() {
            return Err(Error::render("nothing to speak"));
        }

        let total = pieces.len();
        let mut audio = Vec::new();
        for (idx, piece) in pieces.iter().enumerate() {
            audio.extend(self.fetch_piece(piece, language, idx, total).await?);
        }

        if audio.is_empty() {
            return Err(Error::render("TTS endpoint returned no audio"));
        }
        Ok(audio)
    }

    fn name(&self) -> &str {
        "google-translate"
    }
}

/// Split text into pieces of at most `max_chars`, on word boundaries where possible
pub fn split_for_tts(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        // A single overlong word is cut hard
        if word_len > max_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for part in chars.chunks(max_chars) {
                pieces.push(part.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            pieces.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_piece() {
        assert_eq!(split_for_tts("Paris.", 100), vec!["Paris.".to_string()]);
        assert!(split_for_tts("   ", 100).is_empty());
    }

    #[test]
    fn test_pieces_respect_limit_and_words() {
        let text = "The capital of France is Paris and the river that runs through it is the Seine.";
        let pieces = split_for_tts(text, 20);
        assert!(pieces.iter().all(|p| p.chars().count() <= 20));
        assert_eq!(pieces.join(" "), text);
    }

    #[test]
    fn test_overlong_word_is_cut() {
        let pieces = split_for_tts("abcdefghij xy", 4);
        assert_eq!(pieces, vec!["abcd", "efgh", "ij", "xy"]);
    }
}
