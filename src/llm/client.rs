//! Model gateway: one chat-completion request per call against the local
//! bridge endpoint.
//!
//! The wire contract is the OpenAI-compatible shape most local bridges
//! (Ollama, LocalAI, llama.cpp server) expose: POST `{model, messages,
//! temperature}`, read `choices[0].message.content`. Exactly one request
//! per call: no retry, no timeout enforcement, no streaming. A second
//! invocation before the first resolves is simply a second independent
//! request.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::types::{ChatMessage, LlmConfig, DEFAULT_CHAT_ENDPOINT, DEFAULT_MODEL};

/// How many trailing history turns a chat continuation carries.
pub const CHAT_HISTORY_TURNS: usize = 5;

/// Returned when a 2xx response has no `choices[0].message.content` path.
/// Tolerated rather than treated as an error.
pub const NO_RESPONSE_PLACEHOLDER: &str = "No response from the model endpoint.";

const TEMPERATURE: f64 = 0.7;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<OutboundMessage>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct OutboundMessage {
    role: &'static str,
    content: MessageContent,
}

/// Plain string for text-only prompts; a part list when images ride along.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// ============================================================================
// Request assembly
// ============================================================================

fn build_request(prompt: &str, config: &LlmConfig, images: &[Vec<u8>]) -> ChatRequest {
    let model = if config.model.is_empty() {
        DEFAULT_MODEL.to_string()
    } else {
        config.model.clone()
    };

    let content = if images.is_empty() {
        MessageContent::Text(prompt.to_string())
    } else {
        let mut parts = vec![ContentPart::Text {
            text: prompt.to_string(),
        }];
        for image in images {
            parts.push(ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: format!("data:image/jpeg;base64,{}", BASE64.encode(image)),
                },
            });
        }
        MessageContent::Parts(parts)
    };

    ChatRequest {
        model,
        messages: vec![OutboundMessage {
            role: "user",
            content,
        }],
        temperature: TEMPERATURE,
    }
}

fn extract_content(response: ChatResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
}

// ============================================================================
// Gateway calls
// ============================================================================

/// Send one chat-completion request and return the first completion's text.
///
/// Non-success statuses fail with [`LlmError::Api`] carrying the status
/// text; a success response without the expected content path yields
/// [`NO_RESPONSE_PLACEHOLDER`] instead of failing.
pub async fn call_model(
    prompt: &str,
    config: &LlmConfig,
    images: &[Vec<u8>],
) -> Result<String, LlmError> {
    let url = config.base_url.as_deref().unwrap_or(DEFAULT_CHAT_ENDPOINT);
    log::debug!("model call to {} ({} image(s))", url, images.len());

    let client = reqwest::Client::new();
    let mut request = client.post(url).json(&build_request(prompt, config, images));
    if let Some(key) = config.api_key.as_deref() {
        if !key.is_empty() {
            request = request.bearer_auth(key);
        }
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LlmError::Api {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string(),
        });
    }

    let body: ChatResponse = response.json().await?;
    Ok(extract_content(body).unwrap_or_else(|| NO_RESPONSE_PLACEHOLDER.to_string()))
}

/// Chat continuation: flatten the last [`CHAT_HISTORY_TURNS`] turns plus
/// attachment descriptors into a single context block prepended to the new
/// input, then delegate to [`call_model`]. No server-side session exists
/// between calls.
pub async fn send_chat_message(
    history: &[ChatMessage],
    input: &str,
    config: &LlmConfig,
    images: &[Vec<u8>],
) -> Result<String, LlmError> {
    let start = history.len().saturating_sub(CHAT_HISTORY_TURNS);
    let mut lines = Vec::new();
    for message in &history[start..] {
        lines.push(format!("{}: {}", message.role.as_tag(), message.content));
        for attachment in &message.attachments {
            lines.push(format!(
                "[attachment: {} ({})]",
                attachment.name, attachment.kind
            ));
        }
    }

    let prompt = format!(
        "Conversation context:\n{}\n\nUser: {}\nAssistant:",
        lines.join("\n"),
        input
    );
    call_model(&prompt, config, images).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChatAttachment, ChatRole};
    use chrono::Utc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    /// One-shot HTTP endpoint: accepts a single connection, drains the
    /// request (headers + declared body), answers with the canned
    /// response, and closes.
    async fn mock_endpoint(status_line: &'static str, body: &'static str) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 64 * 1024];
            let mut read = 0usize;
            loop {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                if n == 0 {
                    break;
                }
                read += n;
                if let Some(end) = find_subslice(&buf[..read], b"\r\n\r\n") {
                    let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                    let content_length = headers
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if read >= end + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        addr
    }

    fn config_for(addr: std::net::SocketAddr) -> LlmConfig {
        LlmConfig {
            base_url: Some(format!("http://{}/v1/chat/completions", addr)),
            ..LlmConfig::default()
        }
    }

    #[tokio::test]
    async fn test_call_model_returns_first_choice_content() {
        let addr = mock_endpoint(
            "200 OK",
            r#"{"choices":[{"message":{"content":"X"}}]}"#,
        )
        .await;
        let out = call_model("hello", &config_for(addr), &[]).await.unwrap();
        assert_eq!(out, "X");
    }

    #[tokio::test]
    async fn test_call_model_non_success_carries_status_text() {
        let addr = mock_endpoint("503 Service Unavailable", "{}").await;
        let err = call_model("hello", &config_for(addr), &[]).await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "Service Unavailable");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_call_model_missing_choices_yields_placeholder() {
        let addr = mock_endpoint("200 OK", "{}").await;
        let out = call_model("hello", &config_for(addr), &[]).await.unwrap();
        assert_eq!(out, NO_RESPONSE_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_call_model_unreachable_endpoint_is_http_error() {
        let config = LlmConfig {
            // Nothing listens here; the connect itself rejects.
            base_url: Some("http://127.0.0.1:9/v1/chat/completions".to_string()),
            ..LlmConfig::default()
        };
        assert!(matches!(
            call_model("hello", &config, &[]).await,
            Err(LlmError::Http(_))
        ));
    }

    #[test]
    fn test_build_request_text_only() {
        let config = LlmConfig::default();
        let value = serde_json::to_value(build_request("summarize this", &config, &[])).unwrap();
        assert_eq!(value["model"], "llama3");
        assert_eq!(value["temperature"], 0.7);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "summarize this");
    }

    #[test]
    fn test_build_request_with_images_is_multipart() {
        let config = LlmConfig::default();
        let value =
            serde_json::to_value(build_request("look", &config, &[vec![1, 2, 3]])).unwrap();
        let content = &value["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "look");
        assert_eq!(content[1]["type"], "image_url");
        let url = content[1]["image_url"]["url"].as_str().unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
        assert!(url.ends_with(&BASE64.encode([1u8, 2, 3])));
    }

    #[test]
    fn test_build_request_empty_model_falls_back() {
        let config = LlmConfig {
            model: String::new(),
            ..LlmConfig::default()
        };
        let value = serde_json::to_value(build_request("p", &config, &[])).unwrap();
        assert_eq!(value["model"], DEFAULT_MODEL);
    }

    #[test]
    fn test_extract_content_tolerates_sparse_shapes() {
        let full: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"ok"}}]}"#).unwrap();
        assert_eq!(extract_content(full).as_deref(), Some("ok"));

        let no_content: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{}}]}"#).unwrap();
        assert_eq!(extract_content(no_content), None);

        let no_choices: ChatResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(extract_content(no_choices), None);
    }

    #[tokio::test]
    async fn test_send_chat_message_flattens_trailing_history() {
        let addr = mock_endpoint(
            "200 OK",
            r#"{"choices":[{"message":{"content":"noted"}}]}"#,
        )
        .await;
        let message = |role, content: &str| ChatMessage {
            id: "m".into(),
            role,
            content: content.into(),
            attachments: vec![],
            timestamp: Utc::now(),
        };
        let mut history: Vec<ChatMessage> = (0..8)
            .map(|i| message(ChatRole::User, &format!("turn {}", i)))
            .collect();
        history[7].attachments.push(ChatAttachment {
            name: "specs.pdf".into(),
            kind: "application/pdf".into(),
            data: None,
        });
        let out = send_chat_message(&history, "and now?", &config_for(addr), &[])
            .await
            .unwrap();
        assert_eq!(out, "noted");
    }
}
