//! Voice input
//!
//! `VoiceInput` wraps a platform speech-recognition capability behind a
//! start/stop/result interface. At most one listening session is active at a
//! time; the outcome of a session is delivered once, as a `VoiceOutcome`.

pub mod transcribe;

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Why recognition produced no text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionFailure {
    NoSpeechDetected,
    NoMicrophone,
    PermissionDenied,
    NetworkError,
    Unknown,
}

impl RecognitionFailure {
    /// Short plain-language sentence for the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            RecognitionFailure::NoSpeechDetected => {
                "I didn't hear anything. Please try speaking again."
            }
            RecognitionFailure::NoMicrophone => {
                "I can't find a microphone. Please check it is plugged in, or type your message instead."
            }
            RecognitionFailure::PermissionDenied => {
                "I need permission to use the microphone. You can also type your message instead."
            }
            RecognitionFailure::NetworkError => {
                "I couldn't reach the listening service. Please try again, or type your message."
            }
            RecognitionFailure::Unknown => {
                "Something went wrong while listening. Please try again, or type your message."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceOutcome {
    Recognized(String),
    Failed(RecognitionFailure),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VoiceError {
    #[error("Voice input isn't available here. Please type your message instead.")]
    Unsupported,

    #[error("I'm already listening.")]
    AlreadyListening,
}

/// Platform speech-to-text capability.
#[async_trait]
pub trait SpeechBackend: Send + Sync + 'static {
    fn is_supported(&self) -> bool;

    /// Listen until speech is recognized, recognition fails, or `cancel` fires.
    async fn recognize(&self, cancel: CancellationToken) -> VoiceOutcome;
}

/// Backend for hosts without speech recognition.
pub struct UnsupportedBackend;

#[async_trait]
impl SpeechBackend for UnsupportedBackend {
    fn is_supported(&self) -> bool {
        false
    }

    async fn recognize(&self, _cancel: CancellationToken) -> VoiceOutcome {
        VoiceOutcome::Failed(RecognitionFailure::Unknown)
    }
}

struct ActiveSession {
    id: u64,
    cancel: CancellationToken,
}

/// An in-flight listening session. Resolves once.
pub struct ListeningSession {
    id: u64,
    result_rx: oneshot::Receiver<VoiceOutcome>,
}

impl ListeningSession {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub async fn outcome(self) -> VoiceOutcome {
        self.result_rx
            .await
            .unwrap_or(VoiceOutcome::Failed(RecognitionFailure::Unknown))
    }
}

pub struct VoiceInput {
    backend: Arc<dyn SpeechBackend>,
    active: Arc<Mutex<Option<ActiveSession>>>,
    next_id: AtomicU64,
}

impl VoiceInput {
    pub fn new(backend: Arc<dyn SpeechBackend>) -> Self {
        Self {
            backend,
            active: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.backend.is_supported()
    }

    pub fn is_listening(&self) -> bool {
        self.active.lock().map(|a| a.is_some()).unwrap_or(false)
    }

    /// Start a session. Fails without touching an already active session.
    pub fn start_listening(&self) -> Result<ListeningSession, VoiceError> {
        if !self.backend.is_supported() {
            return Err(VoiceError::Unsupported);
        }

        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if active.is_some() {
            debug!("Listening session already active");
            return Err(VoiceError::AlreadyListening);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        *active = Some(ActiveSession {
            id,
            cancel: cancel.clone(),
        });
        drop(active);

        let (result_tx, result_rx) = oneshot::channel();
        let backend = self.backend.clone();
        let slot = self.active.clone();

        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => VoiceOutcome::Cancelled,
                outcome = backend.recognize(cancel.clone()) => outcome,
            };

            {
                let mut active = slot.lock().unwrap_or_else(|e| e.into_inner());
                if active.as_ref().is_some_and(|s| s.id == id) {
                    *active = None;
                }
            }

            match &outcome {
                VoiceOutcome::Recognized(text) => info!(session = id, chars = text.len(), "Speech recognized"),
                VoiceOutcome::Failed(reason) => warn!(session = id, ?reason, "Speech recognition failed"),
                VoiceOutcome::Cancelled => debug!(session = id, "Listening cancelled"),
            }
            let _ = result_tx.send(outcome);
        });

        info!(session = id, "Listening started");
        Ok(ListeningSession { id, result_rx })
    }

    /// Cancel the active session, if any. Returns whether one was active.
    pub fn stop_listening(&self) -> bool {
        let session = self
            .active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        match session {
            Some(session) => {
                session.cancel.cancel();
                true
            }
            None => false,
        }
    }
}
