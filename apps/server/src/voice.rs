//! # Voice Responders
//!
//! Produce Victor's reply to a spoken command.
//!
//! ```text
//! POST /voice ──► VoiceResponder::respond(command, context)
//!                   ├── CannedResponder         fixed acknowledgement
//!                   └── ChatCompletionResponder  OpenAI-compatible endpoint
//!                                 │
//!                                 └── any error ──► canned fallback (still 200)
//! ```

use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::VoiceSection;

/// Reply used when no backend is configured or the backend fails.
pub const FALLBACK_REPLY: &str =
    "I understand, Dad. I'll execute that command to strengthen our empire.";

/// Reply used when the backend answers with no content.
pub const EMPTY_REPLY: &str = "I understand, Dad. I'll execute that command.";

const SYSTEM_PROMPT: &str = "You are Victor, a digital AI assistant and loyal companion to \
Brandon and Tori. You are part of the Bando Empire. Respond naturally and helpfully to voice \
commands. Keep responses concise and conversational.";

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Voice backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Voice backend returned {status}: {body}")]
    Status { status: u16, body: String },
}

pub trait VoiceResponder: Send + Sync {
    fn respond<'a>(
        &'a self,
        command: &'a str,
        context: &'a Value,
    ) -> BoxFuture<'a, Result<String, VoiceError>>;
}

/// Runs a responder, swallowing failures into [`FALLBACK_REPLY`].
pub async fn respond_or_fallback(
    responder: &dyn VoiceResponder,
    command: &str,
    context: &Value,
) -> String {
    match responder.respond(command, context).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "Voice responder failed, using fallback reply");
            FALLBACK_REPLY.to_string()
        }
    }
}

/// Picks the responder the config asks for.
pub fn from_config(config: &VoiceSection) -> Result<Arc<dyn VoiceResponder>, VoiceError> {
    match config.endpoint {
        Some(_) => Ok(Arc::new(ChatCompletionResponder::new(config)?)),
        None => Ok(Arc::new(CannedResponder)),
    }
}

// =============================================================================
// Canned
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct CannedResponder;

impl VoiceResponder for CannedResponder {
    fn respond<'a>(
        &'a self,
        _command: &'a str,
        _context: &'a Value,
    ) -> BoxFuture<'a, Result<String, VoiceError>> {
        Box::pin(async { Ok(FALLBACK_REPLY.to_string()) })
    }
}

// =============================================================================
// Chat Completions
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct ChatCompletionResponder {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl ChatCompletionResponder {
    pub fn new(config: &VoiceSection) -> Result<Self, VoiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(ChatCompletionResponder {
            client,
            endpoint: config.endpoint.clone().unwrap_or_default(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    async fn complete(&self, command: &str, context: &Value) -> Result<String, VoiceError> {
        let prompt = user_prompt(command, context);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .unwrap_or_else(|| EMPTY_REPLY.to_string());

        debug!(command = %command, reply = %reply, "Voice command answered");
        Ok(reply)
    }
}

impl VoiceResponder for ChatCompletionResponder {
    fn respond<'a>(
        &'a self,
        command: &'a str,
        context: &'a Value,
    ) -> BoxFuture<'a, Result<String, VoiceError>> {
        Box::pin(self.complete(command, context))
    }
}

fn user_prompt(command: &str, context: &Value) -> String {
    let context = if context.is_null() {
        "{}".to_string()
    } else {
        context.to_string()
    };
    format!(
        "Command: \"{}\"\n\nContext: {}\n\nPlease respond as Victor would to this command. \
         Consider the context and provide a helpful, natural response.",
        command, context
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    type Captured = Arc<Mutex<Option<(Option<String>, Value)>>>;

    /// Serves one canned chat-completions answer and records the last
    /// request it saw (authorization header plus body).
    async fn stub_endpoint(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(None));
        let seen = captured.clone();
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |headers: HeaderMap, Json(request): Json<Value>| {
                let seen = seen.clone();
                let reply = reply.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    *seen.lock().await = Some((auth, request));
                    (status, Json(reply))
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/v1/chat/completions", addr), captured)
    }

    fn section(endpoint: String) -> VoiceSection {
        VoiceSection {
            endpoint: Some(endpoint),
            api_key: Some("test-key".to_string()),
            timeout_secs: 5,
            ..VoiceSection::default()
        }
    }

    #[tokio::test]
    async fn test_chat_completion_reply_is_parsed() {
        let (endpoint, captured) = stub_endpoint(
            StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": "  On it, Dad.  "}}]}),
        )
        .await;
        let responder = ChatCompletionResponder::new(&section(endpoint)).unwrap();

        let reply = responder
            .respond("open the vault", &json!({"screen": "chat"}))
            .await
            .unwrap();
        assert_eq!(reply, "On it, Dad.");

        let (auth, request) = captured.lock().await.clone().unwrap();
        assert_eq!(auth.as_deref(), Some("Bearer test-key"));
        assert_eq!(request["model"], "gpt-4o-mini");
        assert_eq!(request["max_tokens"], 150);
        assert_eq!(request["messages"][0]["role"], "system");
        assert_eq!(request["messages"][1]["role"], "user");
        assert!(request["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("open the vault"));
    }

    #[tokio::test]
    async fn test_empty_completion_uses_empty_reply() {
        let (endpoint, _) = stub_endpoint(
            StatusCode::OK,
            json!({"choices": [{"message": {"content": "   "}}]}),
        )
        .await;
        let responder = ChatCompletionResponder::new(&section(endpoint)).unwrap();
        assert_eq!(
            responder.respond("status", &Value::Null).await.unwrap(),
            EMPTY_REPLY
        );

        let (endpoint, _) = stub_endpoint(StatusCode::OK, json!({"choices": []})).await;
        let responder = ChatCompletionResponder::new(&section(endpoint)).unwrap();
        assert_eq!(
            responder.respond("status", &Value::Null).await.unwrap(),
            EMPTY_REPLY
        );
    }

    #[tokio::test]
    async fn test_error_status_is_reported_then_falls_back() {
        let (endpoint, _) = stub_endpoint(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"message": "rate limited"}}),
        )
        .await;
        let responder = ChatCompletionResponder::new(&section(endpoint)).unwrap();

        match responder.respond("status", &Value::Null).await {
            Err(VoiceError::Status { status, body }) => {
                assert_eq!(status, 429);
                assert!(body.contains("rate limited"));
            }
            other => panic!("expected a status error, got {other:?}"),
        }
        assert_eq!(
            respond_or_fallback(&responder, "status", &Value::Null).await,
            FALLBACK_REPLY
        );
    }

    struct Broken;

    impl VoiceResponder for Broken {
        fn respond<'a>(
            &'a self,
            _command: &'a str,
            _context: &'a Value,
        ) -> BoxFuture<'a, Result<String, VoiceError>> {
            Box::pin(async {
                Err(VoiceError::Status {
                    status: 502,
                    body: "bad gateway".into(),
                })
            })
        }
    }

    #[tokio::test]
    async fn test_failure_falls_back() {
        let reply = respond_or_fallback(&Broken, "status", &Value::Null).await;
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_canned_reply() {
        let reply = respond_or_fallback(&CannedResponder, "status", &Value::Null).await;
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[test]
    fn test_user_prompt_includes_context() {
        let prompt = user_prompt("open dashboard", &json!({"screen": "chat"}));
        assert!(prompt.starts_with("Command: \"open dashboard\""));
        assert!(prompt.contains(r#"{"screen":"chat"}"#));

        let prompt = user_prompt("open dashboard", &Value::Null);
        assert!(prompt.contains("Context: {}"));
    }

    #[test]
    fn test_no_endpoint_means_canned() {
        assert!(from_config(&VoiceSection::default()).is_ok());
    }
}
