// src/conversation/voice_clip.rs
// Speech backend that uploads a recorded clip to /api/voice-to-text

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::client::{BackendClient, ClientError};
use crate::voice::transcribe::AudioClip;
use crate::voice::{RecognitionFailure, SpeechBackend, VoiceOutcome};

/// Reads the clip the host recorder last wrote and sends it for transcription.
pub struct ClipUploadBackend {
    client: BackendClient,
    clip_path: PathBuf,
}

impl ClipUploadBackend {
    pub fn new(client: BackendClient, clip_path: impl Into<PathBuf>) -> Self {
        Self {
            client,
            clip_path: clip_path.into(),
        }
    }

    async fn read_clip(&self) -> Result<AudioClip, RecognitionFailure> {
        let bytes = tokio::fs::read(&self.clip_path).await.map_err(|e| {
            debug!(path = %self.clip_path.display(), error = %e, "Cannot read voice clip");
            match e.kind() {
                ErrorKind::NotFound => RecognitionFailure::NoMicrophone,
                ErrorKind::PermissionDenied => RecognitionFailure::PermissionDenied,
                _ => RecognitionFailure::Unknown,
            }
        })?;
        if bytes.is_empty() {
            return Err(RecognitionFailure::NoSpeechDetected);
        }

        let file_name = self
            .clip_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "recording.webm".to_string());
        let mut clip = AudioClip {
            file_name,
            content_type: None,
            bytes,
        };
        clip.content_type = Some(clip.mime());
        Ok(clip)
    }

    async fn transcribe(&self) -> VoiceOutcome {
        let clip = match self.read_clip().await {
            Ok(clip) => clip,
            Err(reason) => return VoiceOutcome::Failed(reason),
        };

        match self.client.voice_to_text(clip).await {
            Ok(result) if result.text.trim().is_empty() => {
                VoiceOutcome::Failed(RecognitionFailure::NoSpeechDetected)
            }
            Ok(result) => VoiceOutcome::Recognized(result.text.trim().to_string()),
            Err(ClientError::Unreachable(_)) => VoiceOutcome::Failed(RecognitionFailure::NetworkError),
            Err(e) => {
                debug!(error = %e, "Transcription request failed");
                VoiceOutcome::Failed(RecognitionFailure::Unknown)
            }
        }
    }
}

#[async_trait]
impl SpeechBackend for ClipUploadBackend {
    fn is_supported(&self) -> bool {
        true
    }

    async fn recognize(&self, cancel: CancellationToken) -> VoiceOutcome {
        tokio::select! {
            _ = cancel.cancelled() => VoiceOutcome::Cancelled,
            outcome = self.transcribe() => outcome,
        }
    }
}
