use crate::config::GatewayConfig;
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::stream::BoxStream;
use futures_util::{future, StreamExt};
use phosphor_core::{Role, Turn};
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;

/// Reply text in the order the model produced it.
pub type TextStream = BoxStream<'static, Result<String, UpstreamError>>;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream rejected the account (status {0})")]
    Quota(u16),
    #[error("upstream is rate limiting")]
    RateLimited,
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream stream broke: {0}")]
    Stream(String),
}

/// Anything that can answer a message given the conversation so far.
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn reply(&self, history: &[Turn], message: &str) -> Result<TextStream, UpstreamError>;
}

/// OpenAI-compatible chat completions endpoint, streamed.
pub struct OpenAiUpstream {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    persona: String,
}

impl OpenAiUpstream {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        persona: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            persona: persona.into(),
        }
    }

    pub fn from_config(config: &GatewayConfig) -> anyhow::Result<Self> {
        Ok(Self::new(
            config.upstream_url.clone(),
            config.api_key.clone(),
            config.model.clone(),
            config.persona_prompt()?,
        ))
    }
}

fn build_messages(persona: &str, history: &[Turn], message: &str) -> Vec<Value> {
    let mut out = Vec::with_capacity(history.len() + 2);
    out.push(json!({ "role": "system", "content": persona }));
    for turn in history {
        let role = match turn.role {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        };
        out.push(json!({ "role": role, "content": turn.content }));
    }
    out.push(json!({ "role": "user", "content": message }));
    out
}

/// Text of one `data:` payload, if it carries any.
fn delta_text(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    let text = v["choices"][0]["delta"]["content"].as_str()?;
    (!text.is_empty()).then(|| text.to_string())
}

#[async_trait]
impl Assistant for OpenAiUpstream {
    async fn reply(&self, history: &[Turn], message: &str) -> Result<TextStream, UpstreamError> {
        let body = json!({
            "model": self.model,
            "messages": build_messages(&self.persona, history, message),
            "stream": true,
        });
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        match status {
            400 | 401 | 402 | 403 => return Err(UpstreamError::Quota(status)),
            429 => return Err(UpstreamError::RateLimited),
            s if !(200..300).contains(&s) => return Err(UpstreamError::Status(s)),
            _ => {}
        }

        let stream = resp
            .bytes_stream()
            .eventsource()
            .take_while(|ev| future::ready(!matches!(ev, Ok(e) if e.data.trim() == "[DONE]")))
            .filter_map(|ev| async move {
                match ev {
                    Ok(e) => delta_text(&e.data).map(Ok),
                    Err(e) => Some(Err(UpstreamError::Stream(e.to_string()))),
                }
            })
            .boxed();
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use http_body_util::{BodyExt, Full};
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper::{Request, Response};
    use hyper_util::rt::TokioIo;
    use std::convert::Infallible;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    async fn serve_once<F, Fut>(handler: F) -> SocketAddr
    where
        F: Fn(Request<hyper::body::Incoming>) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<Response<Full<Bytes>>, Infallible>>
            + Send
            + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service_fn(handler))
                .await
                .ok();
        });
        addr
    }

    fn upstream(addr: SocketAddr) -> OpenAiUpstream {
        OpenAiUpstream::new(format!("http://{addr}/v1/"), "sk-test", "test-model", "be brief")
    }

    async fn collect(mut stream: TextStream) -> String {
        let mut out = String::new();
        while let Some(chunk) = stream.next().await {
            out.push_str(&chunk.unwrap());
        }
        out
    }

    fn sse(chunks: &[&str]) -> String {
        let mut body = String::new();
        for c in chunks {
            let event = json!({ "choices": [{ "delta": { "content": c } }] });
            body.push_str(&format!("data: {event}\n\n"));
        }
        body.push_str("data: [DONE]\n\n");
        body
    }

    #[test]
    fn messages_are_persona_history_then_user() {
        let history = vec![
            Turn::user("hi"),
            Turn {
                role: Role::Assistant,
                content: "hello".into(),
            },
            Turn {
                role: Role::System,
                content: "The user exited the piano.".into(),
            },
        ];
        let msgs = build_messages("persona", &history, "again");
        let roles: Vec<&str> = msgs.iter().map(|m| m["role"].as_str().unwrap()).collect();
        assert_eq!(roles, ["system", "user", "assistant", "system", "user"]);
        assert_eq!(msgs[0]["content"], "persona");
        assert_eq!(msgs[4]["content"], "again");
    }

    #[test]
    fn delta_text_skips_role_only_chunks() {
        assert_eq!(delta_text(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#), None);
        assert_eq!(delta_text(r#"{"choices":[{"delta":{"content":""}}]}"#), None);
        assert_eq!(
            delta_text(r#"{"choices":[{"delta":{"content":"hey"}}]}"#),
            Some("hey".into())
        );
        assert_eq!(delta_text("not json"), None);
    }

    #[tokio::test]
    async fn streams_deltas_until_done() {
        let addr = serve_once(|req| async move {
            assert_eq!(req.uri().path(), "/v1/chat/completions");
            assert_eq!(req.headers()["authorization"], "Bearer sk-test");
            let body = req.collect().await.unwrap().to_bytes();
            let parsed: Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(parsed["stream"], true);
            assert_eq!(parsed["model"], "test-model");
            let mut text = sse(&["Hel", "lo", " there"]);
            text.push_str("data: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n\n");
            Ok::<_, Infallible>(
                Response::builder()
                    .header("content-type", "text/event-stream")
                    .body(Full::new(Bytes::from(text)))
                    .unwrap(),
            )
        })
        .await;

        let stream = upstream(addr).reply(&[], "hi").await.unwrap();
        assert_eq!(collect(stream).await, "Hello there");
    }

    #[tokio::test]
    async fn status_codes_map_to_errors() {
        fn kind(e: &UpstreamError) -> String {
            match e {
                UpstreamError::Quota(s) => format!("quota {s}"),
                UpstreamError::RateLimited => "rate limited".into(),
                UpstreamError::Status(s) => format!("status {s}"),
                other => format!("{other:?}"),
            }
        }

        for (code, expected) in [
            (401u16, "quota 401"),
            (402, "quota 402"),
            (429, "rate limited"),
            (503, "status 503"),
        ] {
            let addr = serve_once(move |_req| async move {
                Ok::<_, Infallible>(
                    Response::builder()
                        .status(code)
                        .body(Full::new(Bytes::from("nope")))
                        .unwrap(),
                )
            })
            .await;
            let err = match upstream(addr).reply(&[], "hi").await {
                Ok(_) => panic!("status {code} should fail"),
                Err(e) => e,
            };
            assert_eq!(kind(&err), expected);
        }
    }

    #[tokio::test]
    async fn unreachable_upstream_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = match upstream(addr).reply(&[], "hi").await {
            Ok(_) => panic!("should not connect"),
            Err(e) => e,
        };
        assert!(matches!(err, UpstreamError::Transport(_)));
    }
}
