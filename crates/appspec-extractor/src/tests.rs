//! Integration tests for the Extractor

#[cfg(test)]
mod tests {
    use crate::{Extractor, ExtractorConfig, ExtractorError, ExtractorMode, FailureLogSink};
    use appspec_domain::{ErrorSource, FailureRecord};
    use appspec_llm::{ChatRequest, LlmError, LlmProvider, MockProvider};
    use appspec_store::{FailureLog, SqliteFailureLog, StoreError};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    const TASK_APP: &str = "I want to build a task management app for teams";

    fn task_reply() -> Value {
        json!({
            "appName": "TeamTasks",
            "entities": [
                {"name": "Task", "attributes": ["title", "status", "assignee"]},
                {"name": "Team", "attributes": ["name", "members"]}
            ],
            "userRoles": [
                {"name": "Team Lead", "description": "Creates and assigns tasks"},
                {"name": "Member", "description": "Completes tasks"}
            ],
            "features": [
                {"name": "Task Board", "description": "Kanban view of tasks"}
            ]
        })
    }

    fn live_extractor(provider: MockProvider) -> (Extractor, Arc<SqliteFailureLog>) {
        let store = Arc::new(SqliteFailureLog::in_memory().unwrap());
        let extractor = Extractor::new(
            Some(Arc::new(provider)),
            FailureLogSink::new(store.clone()),
            ExtractorConfig::default(),
        );
        (extractor, store)
    }

    /// Provider that never answers within the test timeout
    struct SlowProvider;

    #[async_trait]
    impl LlmProvider for SlowProvider {
        async fn complete(&self, _request: &ChatRequest) -> Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("{}".to_string())
        }

        fn model_name(&self) -> &str {
            "slow"
        }
    }

    /// Failure log whose insert takes a while
    #[derive(Default)]
    struct SlowLog {
        inserted: AtomicBool,
    }

    impl FailureLog for SlowLog {
        fn is_ready(&self) -> bool {
            true
        }

        fn insert(&self, _record: &FailureRecord) -> Result<(), StoreError> {
            std::thread::sleep(Duration::from_secs(2));
            self.inserted.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn recent(
            &self,
            _limit: usize,
            _source: Option<ErrorSource>,
        ) -> Result<Vec<FailureRecord>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_valid_reply_is_returned_unchanged() {
        let provider = MockProvider::new(task_reply().to_string());
        let (extractor, store) = live_extractor(provider.clone());

        let result = extractor.generate(TASK_APP).await.unwrap();
        extractor.sink().flush().await;

        assert_eq!(serde_json::to_value(&result).unwrap(), task_reply());
        assert_eq!(provider.call_count(), 1);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_provider_receives_trimmed_text_and_fixed_prompt() {
        let provider = MockProvider::new(task_reply().to_string());
        let (extractor, _store) = live_extractor(provider.clone());

        extractor
            .generate(&format!("  \n{}\t ", TASK_APP))
            .await
            .unwrap();

        let request = provider.last_request().unwrap();
        assert_eq!(request.user_message, TASK_APP);
        assert_eq!(request.system_prompt, crate::SYSTEM_PROMPT);
        assert_eq!(request.temperature, ExtractorConfig::default().temperature);
        assert_eq!(request.max_tokens, ExtractorConfig::default().max_tokens);
    }

    #[tokio::test]
    async fn test_validation_failure_skips_provider_and_log() {
        let provider = MockProvider::new(task_reply().to_string());
        let (extractor, store) = live_extractor(provider.clone());

        let err = extractor.generate("   ").await.unwrap_err();
        extractor.sink().flush().await;

        assert!(matches!(err, ExtractorError::Validation(ref m) if m == "Text input cannot be empty"));
        assert_eq!(err.status_code(), 400);
        assert_eq!(provider.call_count(), 0);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_length_boundary() {
        let provider = MockProvider::new(task_reply().to_string());
        let (extractor, _store) = live_extractor(provider.clone());

        assert!(extractor.generate(&"a".repeat(10_000)).await.is_ok());

        let err = extractor.generate(&"a".repeat(10_001)).await.unwrap_err();
        assert_eq!(err.to_string(), "Text input exceeds maximum length of 10000 characters");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_fields_report_app_name() {
        let reply = json!({"appName": "", "entities": [], "userRoles": [], "features": []});
        let (extractor, store) = live_extractor(MockProvider::new(reply.to_string()));

        let err = extractor.generate(TASK_APP).await.unwrap_err();
        extractor.sink().flush().await;

        assert_eq!(err.to_string(), "Invalid appName in LLM response");
        assert_eq!(err.status_code(), 500);

        let records = store.recent(10, None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].error_source, ErrorSource::Unknown);
        assert_eq!(records[0].raw_response.as_deref(), Some(reply.to_string().as_str()));
    }

    #[tokio::test]
    async fn test_network_failure_is_logged_and_surfaced() {
        let provider = MockProvider::failing(LlmError::Network("connection refused".into()));
        let (extractor, store) = live_extractor(provider);

        let err = extractor.generate(TASK_APP).await.unwrap_err();
        extractor.sink().flush().await;

        assert!(matches!(err, ExtractorError::Provider(LlmError::Network(_))));
        assert_eq!(err.status_code(), 500);

        let records = store.recent(10, None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].error_source, ErrorSource::Network);
        assert_eq!(records[0].user_input, TASK_APP);
        assert!(records[0].raw_response.is_none());
    }

    #[tokio::test]
    async fn test_network_failure_without_ready_store() {
        let store = Arc::new(SqliteFailureLog::in_memory().unwrap());
        store.shut_down();
        let extractor = Extractor::new(
            Some(Arc::new(MockProvider::failing(LlmError::Network("down".into())))),
            FailureLogSink::new(store.clone()),
            ExtractorConfig::default(),
        );

        let err = extractor.generate(TASK_APP).await.unwrap_err();
        extractor.sink().flush().await;

        assert!(matches!(err, ExtractorError::Provider(LlmError::Network(_))));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_non_json_reply_is_parsing_error() {
        let (extractor, store) =
            live_extractor(MockProvider::new("Here is your app: TeamTasks!"));

        let err = extractor.generate(TASK_APP).await.unwrap_err();
        extractor.sink().flush().await;

        assert!(matches!(err, ExtractorError::Parsing(_)));
        let record = &store.recent(1, None).unwrap()[0];
        assert_eq!(record.error_source, ErrorSource::Parsing);
        assert_eq!(record.raw_response.as_deref(), Some("Here is your app: TeamTasks!"));
    }

    #[tokio::test]
    async fn test_empty_reply() {
        let (extractor, store) = live_extractor(MockProvider::new("   "));

        let err = extractor.generate(TASK_APP).await.unwrap_err();
        extractor.sink().flush().await;

        assert!(matches!(err, ExtractorError::EmptyResponse));
        assert_eq!(store.recent(1, None).unwrap()[0].error_source, ErrorSource::LlmApi);
    }

    #[tokio::test]
    async fn test_fenced_reply_is_accepted() {
        let reply = format!("```json\n{}\n```", task_reply());
        let (extractor, _store) = live_extractor(MockProvider::new(reply));

        let result = extractor.generate(TASK_APP).await.unwrap();
        assert_eq!(result.app_name, "TeamTasks");
    }

    #[tokio::test]
    async fn test_provider_rejection() {
        let provider = MockProvider::failing(LlmError::Api {
            status: 401,
            message: "Incorrect API key provided".into(),
        });
        let (extractor, store) = live_extractor(provider);

        let err = extractor.generate(TASK_APP).await.unwrap_err();
        extractor.sink().flush().await;

        assert_eq!(err.status_code(), 500);
        assert_eq!(store.recent(1, None).unwrap()[0].error_source, ErrorSource::LlmApi);
    }

    #[tokio::test]
    async fn test_provider_gateway_timeout_is_classified_as_timeout() {
        let provider = MockProvider::failing(LlmError::Api {
            status: 504,
            message: "Gateway Timeout".into(),
        });
        let (extractor, store) = live_extractor(provider);

        let err = extractor.generate(TASK_APP).await.unwrap_err();
        extractor.sink().flush().await;

        assert_eq!(err.status_code(), 500);
        assert_eq!(store.recent(1, None).unwrap()[0].error_source, ErrorSource::Timeout);
    }

    #[tokio::test]
    async fn test_failure_is_returned_before_log_write_finishes() {
        let log = Arc::new(SlowLog::default());
        let extractor = Extractor::new(
            Some(Arc::new(MockProvider::failing(LlmError::Network("down".into())))),
            FailureLogSink::new(log.clone()),
            ExtractorConfig::default(),
        );

        let started = Instant::now();
        let err = extractor.generate(TASK_APP).await.unwrap_err();

        assert!(matches!(err, ExtractorError::Provider(LlmError::Network(_))));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!log.inserted.load(Ordering::SeqCst));

        extractor.sink().flush().await;
        assert!(log.inserted.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let store = Arc::new(SqliteFailureLog::in_memory().unwrap());
        let config = ExtractorConfig {
            request_timeout_secs: 1,
            ..Default::default()
        };
        let extractor = Extractor::new(
            Some(Arc::new(SlowProvider)),
            FailureLogSink::new(store.clone()),
            config,
        );

        let err = extractor.generate(TASK_APP).await.unwrap_err();
        extractor.sink().flush().await;

        assert!(matches!(err, ExtractorError::Provider(LlmError::Timeout(1))));
        assert_eq!(err.status_code(), 504);
        assert_eq!(store.recent(1, None).unwrap()[0].error_source, ErrorSource::Timeout);
    }

    #[tokio::test]
    async fn test_template_mode() {
        let extractor =
            Extractor::new(None, FailureLogSink::disabled(), ExtractorConfig::default());

        assert_eq!(extractor.mode(), ExtractorMode::Template);
        let tasks = extractor.generate(TASK_APP).await.unwrap();
        assert_eq!(tasks.app_name, "TaskFlow");

        let shop = extractor.generate("An online store for vinyl").await.unwrap();
        assert_eq!(shop.app_name, "ShopEase");

        let other = extractor.generate("A recipe sharing platform").await.unwrap();
        assert_eq!(other.app_name, "MyApp");
    }

    #[tokio::test]
    async fn test_template_mode_still_validates_input() {
        let extractor =
            Extractor::new(None, FailureLogSink::disabled(), ExtractorConfig::default());

        let err = extractor.generate("").await.unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_live_mode() {
        let (extractor, _store) = live_extractor(MockProvider::default());
        assert_eq!(extractor.mode(), ExtractorMode::Live);
        assert_eq!(extractor.mode().as_str(), "live");
        assert!(extractor.sink().is_ready());
    }
}
