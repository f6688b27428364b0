//! Best-effort persistence of classified failures

use crate::classifier::ClassifiedError;
use appspec_domain::FailureRecord;
use appspec_store::FailureLog;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// Writes failure records when a ready failure log is available
///
/// Writes are detached from the caller: [`FailureLogSink::record`] returns as
/// soon as the insert is queued on the blocking pool. Nothing here ever
/// returns an error; a missing, unready or failing store is reported through
/// `tracing` and otherwise ignored.
#[derive(Clone, Default)]
pub struct FailureLogSink {
    log: Option<Arc<dyn FailureLog>>,
    pending: Arc<Mutex<JoinSet<()>>>,
}

impl FailureLogSink {
    /// Sink writing to `log`
    pub fn new(log: Arc<dyn FailureLog>) -> Self {
        Self {
            log: Some(log),
            pending: Arc::default(),
        }
    }

    /// Sink with no backing store; every record is skipped
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Whether a record written now would be attempted
    pub fn is_ready(&self) -> bool {
        self.log.as_ref().is_some_and(|log| log.is_ready())
    }

    /// The backing store, if any
    pub fn log(&self) -> Option<&Arc<dyn FailureLog>> {
        self.log.as_ref()
    }

    /// Queue one failure for persistence and return immediately
    ///
    /// Must be called from within a tokio runtime. Long fields are truncated
    /// by [`FailureRecord::new`].
    pub fn record(
        &self,
        user_input: &str,
        failure: &ClassifiedError<'_>,
        raw_response: Option<&str>,
    ) {
        let log = match &self.log {
            Some(log) if log.is_ready() => Arc::clone(log),
            _ => {
                warn!(
                    "Failure log not ready, skipping {} failure record",
                    failure.source
                );
                return;
            }
        };

        let record = FailureRecord::new(
            user_input,
            failure.source,
            &failure.error.to_string(),
            raw_response.map(str::to_string),
        );

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        reap_finished(&mut pending);
        pending.spawn_blocking(move || write_record(log.as_ref(), &record));
    }

    /// Wait for every queued write to finish
    ///
    /// Used on shutdown so queued records are not lost.
    pub async fn flush(&self) {
        let mut pending = std::mem::take(
            &mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner),
        );
        while let Some(result) = pending.join_next().await {
            if let Err(e) = result {
                error!("Failure log task did not complete: {}", e);
            }
        }
    }
}

fn write_record(log: &dyn FailureLog, record: &FailureRecord) {
    match log.insert(record) {
        Ok(()) => debug!("Recorded failure {} ({})", record.id, record.error_source),
        Err(e) => error!("Failed to record failure {}: {}", record.id, e),
    }
}

/// Collect writes that have already finished
fn reap_finished(pending: &mut JoinSet<()>) {
    while let Some(result) = pending.try_join_next() {
        if let Err(e) = result {
            error!("Failure log task did not complete: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractorError;
    use appspec_domain::{ErrorSource, MAX_ERROR_MESSAGE_CHARS, MAX_USER_INPUT_CHARS};
    use appspec_llm::LlmError;
    use appspec_store::{SqliteFailureLog, StoreError};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::{Duration, Instant};

    /// Store that is ready but refuses every insert
    struct BrokenLog;

    impl FailureLog for BrokenLog {
        fn is_ready(&self) -> bool {
            true
        }
        fn insert(&self, _record: &FailureRecord) -> Result<(), StoreError> {
            Err(StoreError::InvalidData("disk on fire".into()))
        }
        fn recent(
            &self,
            _limit: usize,
            _source: Option<ErrorSource>,
        ) -> Result<Vec<FailureRecord>, StoreError> {
            Ok(Vec::new())
        }
    }

    /// Store whose insert panics
    struct PanickingLog;

    impl FailureLog for PanickingLog {
        fn is_ready(&self) -> bool {
            true
        }
        fn insert(&self, _record: &FailureRecord) -> Result<(), StoreError> {
            panic!("driver bug");
        }
        fn recent(
            &self,
            _limit: usize,
            _source: Option<ErrorSource>,
        ) -> Result<Vec<FailureRecord>, StoreError> {
            Ok(Vec::new())
        }
    }

    /// Store whose insert takes a while
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
    async fn test_record_does_not_wait_for_insert() {
        let log = Arc::new(SlowLog::default());
        let sink = FailureLogSink::new(log.clone());
        let error = ExtractorError::from(LlmError::Network("down".into()));

        let started = Instant::now();
        sink.record("text", &ClassifiedError::new(&error), None);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!log.inserted.load(Ordering::SeqCst));

        sink.flush().await;
        assert!(log.inserted.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_clones_share_pending_writes() {
        let store = Arc::new(SqliteFailureLog::in_memory().unwrap());
        let sink = FailureLogSink::new(store.clone());
        let error = ExtractorError::EmptyResponse;

        sink.clone().record("first", &ClassifiedError::new(&error), None);
        sink.clone().record("second", &ClassifiedError::new(&error), None);
        sink.flush().await;

        assert_eq!(store.count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_records_when_ready() {
        let store = Arc::new(SqliteFailureLog::in_memory().unwrap());
        let sink = FailureLogSink::new(store.clone());
        let error = ExtractorError::from(LlmError::Network("connection refused".into()));

        sink.record("my app idea", &ClassifiedError::new(&error), None);
        sink.flush().await;

        let records = store.recent(10, None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].error_source, ErrorSource::Network);
        assert_eq!(records[0].user_input, "my app idea");
        assert_eq!(records[0].error_message, "network error: connection refused");
    }

    #[tokio::test]
    async fn test_keeps_raw_response() {
        let store = Arc::new(SqliteFailureLog::in_memory().unwrap());
        let sink = FailureLogSink::new(store.clone());
        let error = ExtractorError::Parsing("expected value".into());

        sink.record("text", &ClassifiedError::new(&error), Some("oops"));
        sink.flush().await;

        let record = &store.recent(1, None).unwrap()[0];
        assert_eq!(record.error_source, ErrorSource::Parsing);
        assert_eq!(record.raw_response.as_deref(), Some("oops"));
    }

    #[tokio::test]
    async fn test_truncates_long_fields() {
        let store = Arc::new(SqliteFailureLog::in_memory().unwrap());
        let sink = FailureLogSink::new(store.clone());
        let error = ExtractorError::Structure("x".repeat(5_000));
        let input = "y".repeat(20_000);

        sink.record(&input, &ClassifiedError::new(&error), None);
        sink.flush().await;

        let record = &store.recent(1, None).unwrap()[0];
        assert_eq!(record.user_input.chars().count(), MAX_USER_INPUT_CHARS);
        assert_eq!(record.error_message.chars().count(), MAX_ERROR_MESSAGE_CHARS);
    }

    #[tokio::test]
    async fn test_skips_when_not_ready() {
        let store = Arc::new(SqliteFailureLog::in_memory().unwrap());
        store.shut_down();
        let sink = FailureLogSink::new(store.clone());
        let error = ExtractorError::EmptyResponse;

        assert!(!sink.is_ready());
        sink.record("text", &ClassifiedError::new(&error), None);
        sink.flush().await;

        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_disabled_sink_is_noop() {
        let sink = FailureLogSink::disabled();
        let error = ExtractorError::EmptyResponse;

        assert!(!sink.is_ready());
        assert!(sink.log().is_none());
        sink.record("text", &ClassifiedError::new(&error), None);
        sink.flush().await;
    }

    #[tokio::test]
    async fn test_insert_failure_is_swallowed() {
        let sink = FailureLogSink::new(Arc::new(BrokenLog));
        let error = ExtractorError::EmptyResponse;
        sink.record("text", &ClassifiedError::new(&error), None);
        sink.flush().await;
    }

    #[tokio::test]
    async fn test_insert_panic_is_swallowed() {
        let sink = FailureLogSink::new(Arc::new(PanickingLog));
        let error = ExtractorError::EmptyResponse;
        sink.record("text", &ClassifiedError::new(&error), None);
        sink.flush().await;
    }
}
