//! On-disk storage for rendered answer audio

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// URL prefix the server mounts the audio directory under
pub const AUDIO_ROUTE: &str = "/audio";

/// Writes `<root>/<session_id>/<turn_id>.mp3` and hands back its URL
#[derive(Debug, Clone)]
pub struct AudioStore {
    root: PathBuf,
}

impl AudioStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ids become path segments, so only allow plain identifier characters
    fn check_segment(value: &str) -> Result<()> {
        let valid = !value.is_empty()
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(())
        } else {
            Err(Error::render(format!("invalid audio path segment '{}'", value)))
        }
    }

    /// Persist one answer's audio
    pub async fn save(&self, session_id: &str, turn_id: &str, audio: &[u8]) -> Result<String> {
        Self::check_segment(session_id)?;
        Self::check_segment(turn_id)?;

        let dir = self.root.join(session_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::render(format!("cannot create {}: {}", dir.display(), e)))?;

        let file_name = format!("{}.mp3", turn_id);
        let path = dir.join(&file_name);
        tokio::fs::write(&path, audio)
            .await
            .map_err(|e| Error::render(format!("cannot write {}: {}", path.display(), e)))?;

        tracing::debug!("Wrote {} bytes of audio to {}", audio.len(), path.display());
        Ok(format!("{}/{}/{}", AUDIO_ROUTE, session_id, file_name))
    }

    /// Delete every audio file of a session
    pub async fn remove_session(&self, session_id: &str) -> Result<()> {
        Self::check_segment(session_id)?;
        let dir = self.root.join(session_id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}
