//! Integration tests for the HTTP executor with a mock completion API

#[cfg(test)]
mod tests {
    use crate::config::proxy::ProxySettings;
    use crate::error::TransportFailure;
    use crate::llm::executor::{HttpExecutor, RemoteCallExecutor};
    use crate::llm::messages::ConversationTurn;
    use crate::llm::payload::{ChatCompletionRequest, CompletionResponse, ModelParameters};
    use crate::recovery::{RetryConfig, RetryController};
    use crate::session::Credential;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// A port nothing listens on; connections are refused immediately
    const DEAD_PROXY: &str = "http://127.0.0.1:1";

    fn create_test_executor(server: &MockServer) -> HttpExecutor {
        HttpExecutor::new(
            format!("{}/chat/completions", server.uri()),
            Duration::from_secs(5),
        )
        .expect("Failed to create executor")
    }

    fn request() -> ChatCompletionRequest {
        ChatCompletionRequest::new(
            &ModelParameters::default(),
            vec![ConversationTurn::user("What is the capital of France?")],
        )
    }

    fn credential() -> Credential {
        Credential::new("sk-test-0123456789").unwrap()
    }

    fn mock_completion(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-test123",
            "object": "chat.completion",
            "model": "deepseek-chat",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        })
    }

    #[tokio::test]
    async fn test_execute_success_sends_bearer_and_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test-0123456789"))
            .and(body_partial_json(json!({
                "model": "deepseek-chat",
                "temperature": 0.7,
                "max_tokens": 4000,
                "stream": false,
                "messages": [{"role": "user", "content": "What is the capital of France?"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion("Paris")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let executor = create_test_executor(&mock_server);
        let response = executor
            .execute(&request(), &credential(), &ProxySettings::disabled())
            .await
            .expect("call should succeed");

        assert_eq!(response.answer, "Paris");
        assert_eq!(response.raw["id"], "chatcmpl-test123");
    }

    #[tokio::test]
    async fn test_non_success_status_is_classified() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&mock_server)
            .await;

        let executor = create_test_executor(&mock_server);
        let failure = executor
            .execute(&request(), &credential(), &ProxySettings::disabled())
            .await
            .unwrap_err();

        assert_eq!(
            failure,
            TransportFailure::HttpStatus {
                status: 401,
                body: "invalid api key".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_success_without_answer_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&mock_server)
            .await;

        let executor = create_test_executor(&mock_server);
        let failure = executor
            .execute(&request(), &credential(), &ProxySettings::disabled())
            .await
            .unwrap_err();

        assert!(matches!(failure, TransportFailure::MalformedResponse { .. }));
        assert!(!failure.is_retryable());
    }

    #[tokio::test]
    async fn test_non_json_success_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&mock_server)
            .await;

        let executor = create_test_executor(&mock_server);
        let failure = executor
            .execute(&request(), &credential(), &ProxySettings::disabled())
            .await
            .unwrap_err();

        assert!(matches!(failure, TransportFailure::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(mock_completion("late"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let executor = HttpExecutor::new(
            format!("{}/chat/completions", mock_server.uri()),
            Duration::from_millis(200),
        )
        .unwrap();

        let failure = executor
            .execute(&request(), &credential(), &ProxySettings::disabled())
            .await
            .unwrap_err();

        assert!(matches!(failure, TransportFailure::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_connection_failure() {
        let executor =
            HttpExecutor::new("http://127.0.0.1:1/chat/completions", Duration::from_secs(5))
                .unwrap();

        let failure = executor
            .execute(&request(), &credential(), &ProxySettings::disabled())
            .await
            .unwrap_err();

        assert!(matches!(failure, TransportFailure::Connection { .. }));
    }

    #[tokio::test]
    async fn test_dead_proxy_falls_back_to_direct_once() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion("direct")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let executor = create_test_executor(&mock_server);
        let proxy = ProxySettings::enabled(Some(DEAD_PROXY.to_string()), None);

        let response = executor
            .execute(&request(), &credential(), &proxy)
            .await
            .expect("direct fallback should succeed");

        assert_eq!(response.answer, "direct");
    }

    #[tokio::test]
    async fn test_fallback_failure_is_reported_as_direct_failure() {
        let executor =
            HttpExecutor::new("http://127.0.0.1:1/chat/completions", Duration::from_secs(5))
                .unwrap();
        let proxy = ProxySettings::enabled(Some(DEAD_PROXY.to_string()), None);

        let failure = executor
            .execute(&request(), &credential(), &proxy)
            .await
            .unwrap_err();

        assert!(matches!(failure, TransportFailure::Connection { .. }));
    }

    #[tokio::test]
    async fn test_disabled_proxy_is_never_used() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion("ok")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let executor = create_test_executor(&mock_server);
        let proxy = ProxySettings {
            use_proxy: false,
            http_proxy: Some(DEAD_PROXY.to_string()),
            https_proxy: Some(DEAD_PROXY.to_string()),
        };

        let response = executor
            .execute(&request(), &credential(), &proxy)
            .await
            .unwrap();
        assert_eq!(response.answer, "ok");
    }

    /// Counts how often the retry loop invokes the wrapped executor
    struct CountingExecutor {
        inner: HttpExecutor,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl RemoteCallExecutor for CountingExecutor {
        async fn execute(
            &self,
            payload: &ChatCompletionRequest,
            credential: &Credential,
            proxy: &ProxySettings,
        ) -> Result<CompletionResponse, TransportFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.execute(payload, credential, proxy).await
        }
    }

    #[tokio::test]
    async fn test_proxy_fallback_counts_as_one_retry_attempt() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion("via fallback")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let calls = Arc::new(AtomicU32::new(0));
        let executor = CountingExecutor {
            inner: create_test_executor(&mock_server),
            calls: calls.clone(),
        };
        let controller = RetryController::new(Arc::new(executor), RetryConfig::default());
        let proxy = ProxySettings::enabled(Some(DEAD_PROXY.to_string()), None);

        let response = controller
            .call(&request(), &credential(), &proxy)
            .await
            .expect("fallback succeeds within the first attempt");

        assert_eq!(response.answer, "via fallback");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
