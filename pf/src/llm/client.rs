//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent
///
/// Structured guidance and free-text answers both go through [`complete`]:
/// a request with a `response_schema` asks for JSON, one without asks for
/// plain text. Implementations do not retry; a failed call is reported once.
///
/// [`complete`]: LlmClient::complete
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request and wait for the full response
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Provider name for logging
    fn provider(&self) -> &str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::llm::StopReason;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tracing::debug;

    /// One scripted reply
    #[derive(Debug, Clone)]
    pub enum MockReply {
        /// Respond with this content
        Content(String),
        /// Respond with no content at all
        Empty,
        /// Respond with this content, withheld by the provider
        Blocked(String),
        /// Fail with an API error
        Fail,
        /// Fail with a 429 carrying this retry delay
        RateLimited(Duration),
        /// Panic inside the call
        Panic,
        /// Wait, then apply the inner reply
        Delayed(Duration, Box<MockReply>),
    }

    /// Mock LLM client for unit tests
    pub struct MockLlmClient {
        replies: Vec<MockReply>,
        call_count: AtomicUsize,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockLlmClient {
        pub fn new(replies: Vec<MockReply>) -> Self {
            debug!(reply_count = %replies.len(), "MockLlmClient::new: called");
            Self {
                replies,
                call_count: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// Requests received so far, in call order
        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().map(|r| r.clone()).unwrap_or_default()
        }
    }

    async fn play(reply: MockReply) -> Result<CompletionResponse, LlmError> {
        let mut reply = reply;
        loop {
            match reply {
                MockReply::Content(text) => return Ok(CompletionResponse::text(text)),
                MockReply::Empty => return Ok(CompletionResponse::default()),
                MockReply::Blocked(text) => {
                    return Ok(CompletionResponse {
                        stop_reason: StopReason::Blocked,
                        ..CompletionResponse::text(text)
                    });
                }
                MockReply::Fail => {
                    return Err(LlmError::ApiError {
                        status: 503,
                        message: "mock failure".to_string(),
                    });
                }
                MockReply::RateLimited(retry_after) => return Err(LlmError::RateLimited { retry_after }),
                MockReply::Panic => panic!("mock client panicked"),
                MockReply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            debug!("MockLlmClient::complete: called");
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request);
            }
            let reply = self.replies.get(idx).cloned().ok_or_else(|| {
                debug!("MockLlmClient::complete: no more mock replies");
                LlmError::InvalidResponse("No more mock responses".to_string())
            })?;
            play(reply).await
        }

        fn provider(&self) -> &str {
            "mock"
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_client_returns_replies_in_order() {
            let client = MockLlmClient::new(vec![
                MockReply::Content("Response 1".to_string()),
                MockReply::Empty,
                MockReply::Fail,
            ]);
            let req = CompletionRequest::text("Test", "Hello", 100);

            let resp1 = client.complete(req.clone()).await.unwrap();
            assert_eq!(resp1.content, Some("Response 1".to_string()));

            let resp2 = client.complete(req.clone()).await.unwrap();
            assert_eq!(resp2.content, None);

            assert!(client.complete(req.clone()).await.is_err());
            assert_eq!(client.call_count(), 3);
            assert_eq!(client.requests().len(), 3);
        }

        #[tokio::test]
        async fn test_mock_client_blocked_and_rate_limited() {
            let client = MockLlmClient::new(vec![
                MockReply::Blocked("withheld".to_string()),
                MockReply::RateLimited(Duration::from_secs(30)),
            ]);
            let req = CompletionRequest::text("Test", "Hello", 100);

            let resp = client.complete(req.clone()).await.unwrap();
            assert_eq!(resp.stop_reason, StopReason::Blocked);
            assert_eq!(resp.content.as_deref(), Some("withheld"));

            let err = client.complete(req).await.unwrap_err();
            assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
        }

        #[tokio::test]
        async fn test_mock_client_errors_when_exhausted() {
            let client = MockLlmClient::new(vec![]);
            let result = client.complete(CompletionRequest::text("Test", "Hello", 100)).await;
            assert!(result.is_err());
        }
    }
}
