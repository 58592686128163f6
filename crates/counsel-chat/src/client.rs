//! Response client: remote assistant over HTTP, degrading to the local
//! canned responder on any transport failure.
//!
//! The HTTP seam is the [`ChatBackend`] trait so tests can substitute a
//! failing or scripted backend for the real server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use counsel_core::config::BackendConfig;
use counsel_core::error::CounselError;

use crate::fallback::{local_reply, local_voice_reply};

/// Wire request for the chat endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub language: String,
    pub is_voice: bool,
}

/// Wire response from the chat endpoint.
///
/// A non-empty `error` field is treated as a failure even on a 2xx status.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Wire request for the simpler `/generate` web deployment.
#[derive(Clone, Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

/// Wire response from the `/stt` transcription endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
struct SttResponse {
    #[serde(default)]
    transcript: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Where a reply came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplySource {
    /// The remote assistant service answered.
    Remote,
    /// The remote call failed; the canned local responder answered.
    Fallback,
}

/// An assistant reply. The source is informational (logging/telemetry);
/// behavior never branches on it.
#[derive(Clone, Debug)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
}

/// Transport seam for the remote assistant.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send a chat request and return the reply text.
    async fn send_chat(&self, request: &ChatRequest) -> Result<String, CounselError>;

    /// Transcribe an audio blob and return the transcript text.
    async fn transcribe(&self, audio: Vec<u8>, mime: &str) -> Result<String, CounselError>;
}

/// reqwest-based backend speaking the JustlyAI wire format.
pub struct HttpBackend {
    http: reqwest::Client,
    chat_url: String,
    stt_url: String,
}

impl HttpBackend {
    /// Build a backend from configuration.
    ///
    /// The timeout applies to the whole request; a slow server is
    /// indistinguishable from an unreachable one at this seam.
    pub fn new(config: &BackendConfig) -> Result<Self, CounselError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CounselError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        let base = config.base_url.trim_end_matches('/');
        Ok(Self {
            http,
            chat_url: format!("{}{}", base, config.chat_endpoint),
            stt_url: format!("{}{}", base, config.stt_endpoint),
        })
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send_chat(&self, request: &ChatRequest) -> Result<String, CounselError> {
        // The simpler web deployment serves /generate and expects {prompt}.
        let builder = if self.chat_url.ends_with("/generate") {
            self.http.post(&self.chat_url).json(&GenerateRequest {
                prompt: &request.message,
            })
        } else {
            self.http.post(&self.chat_url).json(request)
        };

        let response = builder
            .send()
            .await
            .map_err(|e| CounselError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CounselError::Transport(format!(
                "Chat endpoint returned {}",
                status
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| CounselError::Transport(format!("Malformed chat response: {}", e)))?;

        if let Some(error) = body.error.filter(|e| !e.is_empty()) {
            return Err(CounselError::Transport(format!(
                "Chat endpoint reported: {}",
                error
            )));
        }

        match body.response.filter(|r| !r.is_empty()) {
            Some(reply) => Ok(reply),
            None => Err(CounselError::Transport(
                "Chat response body missing reply text".to_string(),
            )),
        }
    }

    async fn transcribe(&self, audio: Vec<u8>, mime: &str) -> Result<String, CounselError> {
        let part = reqwest::multipart::Part::bytes(audio)
            .file_name("audio")
            .mime_str(mime)
            .map_err(|e| CounselError::Transcription(format!("Invalid audio mime: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("audio", part);

        let response = self
            .http
            .post(&self.stt_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CounselError::Transcription(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CounselError::Transcription(format!(
                "STT endpoint returned {}",
                status
            )));
        }

        let body: SttResponse = response
            .json()
            .await
            .map_err(|e| CounselError::Transcription(format!("Malformed STT response: {}", e)))?;

        if let Some(error) = body.error.filter(|e| !e.is_empty()) {
            return Err(CounselError::Transcription(error));
        }

        body.transcript
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CounselError::Transcription("Empty transcript".to_string()))
    }
}

/// Client that always produces a reply: remote when reachable, canned
/// local fallback otherwise. Transport errors never cross this boundary.
pub struct ResponseClient {
    backend: Arc<dyn ChatBackend>,
    language: String,
}

impl ResponseClient {
    pub fn new(backend: Arc<dyn ChatBackend>, language: impl Into<String>) -> Self {
        Self {
            backend,
            language: language.into(),
        }
    }

    /// Build a client over the real HTTP backend.
    pub fn http(config: &BackendConfig) -> Result<Self, CounselError> {
        let backend = HttpBackend::new(config)?;
        Ok(Self::new(Arc::new(backend), config.language.clone()))
    }

    /// Ask the assistant. Never fails: any transport problem degrades to
    /// the deterministic local fallback.
    pub async fn ask(&self, text: &str, is_voice: bool) -> Reply {
        let request = ChatRequest {
            message: text.to_string(),
            language: self.language.clone(),
            is_voice,
        };

        match self.backend.send_chat(&request).await {
            Ok(text) => {
                debug!(is_voice, "Remote assistant replied");
                Reply {
                    text,
                    source: ReplySource::Remote,
                }
            }
            Err(e) => {
                warn!(error = %e, is_voice, "Remote assistant unreachable, using local fallback");
                let text = if is_voice {
                    local_voice_reply(text)
                } else {
                    local_reply(text)
                };
                Reply {
                    text,
                    source: ReplySource::Fallback,
                }
            }
        }
    }

    /// Transcribe recorded audio via the remote STT endpoint.
    ///
    /// Unlike [`ask`](Self::ask) this propagates failure: there is no
    /// local speech recognizer to fall back on.
    pub async fn transcribe(&self, audio: Vec<u8>, mime: &str) -> Result<String, CounselError> {
        self.backend.transcribe(audio, mime).await
    }
}

// =============================================================================
// Tests
// =============================================================================
