use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;

use crate::api::{BackendClient, SummarizeResponse};
use crate::error::{AppError, Result};
use crate::models::{RequestStatus, SummarizationRequest, SummaryMode};
use crate::services::Clipboard;

pub const NO_SUMMARY_MESSAGE: &str = "⚠️ No summary returned.";
pub const FAILURE_MESSAGE: &str = "💥 Backend unreachable or failed. Check logs.";
pub const COPIED_WINDOW: Duration = Duration::from_secs(2);

// Response or error message
type Outcome = std::result::Result<SummarizeResponse, String>;

struct PendingRequest {
    rx: oneshot::Receiver<Outcome>,
    handle: JoinHandle<()>,
}

/// Owns the current [`SummarizationRequest`] and runs at most one backend
/// round trip at a time.
///
/// Network failures never escape as errors: they settle the request as
/// `Failed` with a fallback message in place of the summary. The only
/// `Err`s are rejected submits, which leave the state untouched.
pub struct SummaryController {
    state: SummarizationRequest,
    backend: Arc<BackendClient>,
    clipboard: Box<dyn Clipboard>,
    pending: Option<PendingRequest>,
    copied_at: Option<Instant>,
}

impl SummaryController {
    pub fn new(backend: Arc<BackendClient>, clipboard: Box<dyn Clipboard>) -> Self {
        Self {
            state: SummarizationRequest::default(),
            backend,
            clipboard,
            pending: None,
            copied_at: None,
        }
    }

    pub fn state(&self) -> &SummarizationRequest {
        &self.state
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.is_in_flight()
    }

    pub fn submit_primary(&mut self, url: &str) -> Result<()> {
        self.begin(url, SummaryMode::Primary, None)
    }

    /// Re-summarize with the hosted model. Without explicit text, the text
    /// scraped by the last Primary response for the same URL is sent.
    pub fn submit_secondary(&mut self, url: &str, scraped_text: Option<String>) -> Result<()> {
        self.begin(url, SummaryMode::Secondary, scraped_text)
    }

    /// Whether a Hugging Face re-summary makes sense for the displayed result.
    /// The controller does not enforce this; callers gate on it.
    pub fn can_submit_secondary(&self) -> bool {
        !self.state.is_in_flight()
            && !self.state.source_url.is_empty()
            && !self.state.used_secondary_model
    }

    fn begin(&mut self, url: &str, mode: SummaryMode, text: Option<String>) -> Result<()> {
        if url.trim().is_empty() {
            tracing::warn!("Ignoring {} request with empty input", mode.label());
            return Err(AppError::EmptyInput);
        }
        if self.state.is_in_flight() {
            tracing::warn!("Ignoring {} request while another is in flight", mode.label());
            return Err(AppError::RequestInFlight);
        }

        let text = match mode {
            SummaryMode::Primary => {
                self.state.scraped_text = None;
                None
            }
            SummaryMode::Secondary => text.or_else(|| {
                if self.state.source_url == url {
                    self.state.scraped_text.clone()
                } else {
                    None
                }
            }),
        };

        self.state.source_url = url.to_string();
        self.state.mode = mode;
        self.state.status = RequestStatus::InFlight;
        self.state.summary_text = None;
        self.state.preview_image_url = None;
        self.state.used_secondary_model = false;
        self.state.settled_at = None;
        self.copied_at = None;

        let (tx, rx) = oneshot::channel();
        let backend = Arc::clone(&self.backend);
        let url = url.to_string();

        let handle = tokio::spawn(async move {
            let result = backend
                .summarize(&url, mode, text.as_deref())
                .await
                .map_err(|e| e.to_string());

            let _ = tx.send(result);
        });

        self.pending = Some(PendingRequest { rx, handle });
        Ok(())
    }

    /// Apply a finished request, if any (non-blocking). Returns true when the
    /// request settled during this call.
    pub fn poll(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };

        let outcome = match pending.rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Closed) => Err("request task ended without a result".to_string()),
        };

        self.pending = None;
        self.apply(outcome);
        true
    }

    /// Wait for the in-flight request, if any, and return the settled status.
    pub async fn settle(&mut self) -> RequestStatus {
        if let Some(PendingRequest { rx, handle: _ }) = self.pending.take() {
            let outcome = rx
                .await
                .unwrap_or_else(|_| Err("request task ended without a result".to_string()));
            self.apply(outcome);
        }
        self.state.status
    }

    fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Ok(response) => {
                self.state.summary_text = Some(
                    non_empty(response.summary).unwrap_or_else(|| NO_SUMMARY_MESSAGE.to_string()),
                );
                self.state.preview_image_url = non_empty(response.og_image);

                match self.state.mode {
                    SummaryMode::Primary => {
                        if let Some(text) = non_empty(response.scraped_text) {
                            self.state.scraped_text = Some(text);
                        }
                    }
                    SummaryMode::Secondary => {
                        self.state.used_secondary_model =
                            response.used_huggingface.unwrap_or(false);
                    }
                }

                self.state.status = RequestStatus::Succeeded;
                tracing::info!(
                    "{} summary ready for {}",
                    self.state.mode.label(),
                    self.state.source_url
                );
            }
            Err(e) => {
                tracing::error!("Failed to summarize {}: {}", self.state.source_url, e);
                self.state.summary_text = Some(FAILURE_MESSAGE.to_string());
                self.state.status = RequestStatus::Failed;
            }
        }
        self.state.settled_at = Some(chrono::Utc::now());
    }

    /// Copy the displayed summary. Returns false (and touches nothing) when
    /// there is no summary to copy.
    pub fn copy_current_summary(&mut self) -> Result<bool> {
        let summary = self.state.summary();
        if summary.is_empty() {
            return Ok(false);
        }

        let summary = summary.to_string();
        self.clipboard.write_text(&summary)?;
        self.copied_at = Some(Instant::now());
        Ok(true)
    }

    pub fn is_copied(&self) -> bool {
        self.copied_at.is_some()
    }

    /// Expire the copied indicator once its window has passed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(copied_at) = self.copied_at {
            if now.saturating_duration_since(copied_at) >= COPIED_WINDOW {
                self.copied_at = None;
            }
        }
    }
}

impl Drop for SummaryController {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serde_json::json;
    use tokio_test::assert_ok;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Clone, Default)]
    struct RecordingClipboard {
        writes: Arc<Mutex<Vec<String>>>,
    }

    impl Clipboard for RecordingClipboard {
        fn write_text(&mut self, text: &str) -> Result<()> {
            self.writes.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn controller_for(base_url: &str) -> (SummaryController, RecordingClipboard) {
        let backend = BackendClient::new(base_url, Duration::from_secs(5)).unwrap();
        let clipboard = RecordingClipboard::default();
        let controller = SummaryController::new(Arc::new(backend), Box::new(clipboard.clone()));
        (controller, clipboard)
    }

    async fn mock_reply(server: &MockServer, route: &str, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn primary_success_populates_summary_and_preview() {
        let server = MockServer::start().await;
        mock_reply(
            &server,
            "/summarize",
            json!({
                "summary": "A site about examples.",
                "og_image": "https://example.com/og.png"
            }),
        )
        .await;

        let (mut controller, _) = controller_for(&server.uri());
        assert_eq!(controller.state().status, RequestStatus::Idle);

        assert_ok!(controller.submit_primary("https://example.com"));
        assert_eq!(controller.state().status, RequestStatus::InFlight);
        assert_eq!(controller.settle().await, RequestStatus::Succeeded);

        let state = controller.state();
        assert_eq!(state.summary_text.as_deref(), Some("A site about examples."));
        assert_eq!(
            state.preview_image_url.as_deref(),
            Some("https://example.com/og.png")
        );
        assert!(!state.used_secondary_model);
        assert!(state.settled_at.is_some());
    }

    #[tokio::test]
    async fn empty_response_succeeds_with_fallback_message() {
        let server = MockServer::start().await;
        mock_reply(&server, "/summarize", json!({})).await;

        let (mut controller, _) = controller_for(&server.uri());
        assert_ok!(controller.submit_primary("https://example.com"));

        assert_eq!(controller.settle().await, RequestStatus::Succeeded);
        assert_eq!(controller.state().summary(), NO_SUMMARY_MESSAGE);
        assert!(controller.state().preview_image_url.is_none());
    }

    #[tokio::test]
    async fn empty_summary_string_counts_as_absent() {
        let server = MockServer::start().await;
        mock_reply(&server, "/summarize", json!({ "summary": "", "og_image": "" })).await;

        let (mut controller, _) = controller_for(&server.uri());
        assert_ok!(controller.submit_primary("https://example.com"));

        assert_eq!(controller.settle().await, RequestStatus::Succeeded);
        assert_eq!(controller.state().summary(), NO_SUMMARY_MESSAGE);
        assert!(controller.state().preview_image_url.is_none());
    }

    #[tokio::test]
    async fn unreachable_backend_fails_without_preview() {
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };

        let (mut controller, _) = controller_for(&uri);
        assert_ok!(controller.submit_primary("https://example.com"));

        assert_eq!(controller.settle().await, RequestStatus::Failed);
        assert_eq!(controller.state().summary(), FAILURE_MESSAGE);
        assert!(controller.state().preview_image_url.is_none());
        assert!(!controller.is_in_flight());
    }

    #[tokio::test]
    async fn server_error_fails_and_allows_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/summarize"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        mock_reply(&server, "/summarize", json!({ "summary": "Second time lucky." })).await;

        let (mut controller, _) = controller_for(&server.uri());
        assert_ok!(controller.submit_primary("https://example.com"));
        assert_eq!(controller.settle().await, RequestStatus::Failed);

        assert_ok!(controller.submit_primary("https://example.com"));
        assert_eq!(controller.settle().await, RequestStatus::Succeeded);
        assert_eq!(controller.state().summary(), "Second time lucky.");
    }

    #[tokio::test]
    async fn new_submit_clears_previous_result_before_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/summarize/hf"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "summary": "Model summary.",
                "og_image": "https://example.com/og.png",
                "used_huggingface": true
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/summarize"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "summary": "Fresh." }))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let (mut controller, _) = controller_for(&server.uri());
        assert_ok!(controller.submit_secondary("https://example.com", None));
        controller.settle().await;
        assert!(controller.state().used_secondary_model);
        assert!(controller.state().preview_image_url.is_some());

        assert_ok!(controller.submit_primary("https://example.com"));
        let state = controller.state();
        assert_eq!(state.status, RequestStatus::InFlight);
        assert!(state.summary_text.is_none());
        assert!(state.preview_image_url.is_none());
        assert!(!state.used_secondary_model);
        assert!(state.settled_at.is_none());

        // Still waiting on the delayed reply
        assert!(!controller.poll());
        assert_eq!(controller.settle().await, RequestStatus::Succeeded);
        assert_eq!(controller.state().summary(), "Fresh.");
    }

    #[tokio::test]
    async fn poll_applies_result_once_available() {
        let server = MockServer::start().await;
        mock_reply(&server, "/summarize", json!({ "summary": "Polled." })).await;

        let (mut controller, _) = controller_for(&server.uri());
        assert!(!controller.poll());
        assert_ok!(controller.submit_primary("https://example.com"));

        let mut settled = false;
        for _ in 0..100 {
            if controller.poll() {
                settled = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert!(settled);
        assert_eq!(controller.state().status, RequestStatus::Succeeded);
        assert_eq!(controller.state().summary(), "Polled.");
    }

    async fn slow_backend(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/summarize"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "summary": "Too late." }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn aborted_task_settles_as_failed_on_poll() {
        let server = MockServer::start().await;
        slow_backend(&server).await;

        let (mut controller, _) = controller_for(&server.uri());
        assert_ok!(controller.submit_primary("https://example.com"));
        controller.pending.as_ref().unwrap().handle.abort();

        let mut settled = false;
        for _ in 0..100 {
            if controller.poll() {
                settled = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(settled);
        assert_eq!(controller.state().status, RequestStatus::Failed);
        assert_eq!(controller.state().summary(), FAILURE_MESSAGE);
        assert!(controller.pending.is_none());
    }

    #[tokio::test]
    async fn aborted_task_settles_as_failed_on_settle() {
        let server = MockServer::start().await;
        slow_backend(&server).await;

        let (mut controller, _) = controller_for(&server.uri());
        assert_ok!(controller.submit_primary("https://example.com"));
        controller.pending.as_ref().unwrap().handle.abort();

        assert_eq!(controller.settle().await, RequestStatus::Failed);
        assert_eq!(controller.state().summary(), FAILURE_MESSAGE);
        assert!(!controller.is_in_flight());
    }

    #[tokio::test]
    async fn dropping_controller_aborts_request() {
        let server = MockServer::start().await;
        slow_backend(&server).await;

        let (mut controller, _) = controller_for(&server.uri());
        assert_ok!(controller.submit_primary("https://example.com"));
        let task = controller.pending.as_ref().unwrap().handle.abort_handle();
        drop(controller);

        for _ in 0..100 {
            if task.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(task.is_finished());
        let received = server.received_requests().await.unwrap();
        assert!(received.is_empty());
    }

    #[tokio::test]
    async fn primary_ignores_secondary_model_flag() {
        let server = MockServer::start().await;
        mock_reply(
            &server,
            "/summarize",
            json!({ "summary": "From the model.", "used_huggingface": true }),
        )
        .await;

        let (mut controller, _) = controller_for(&server.uri());
        assert_ok!(controller.submit_primary("https://example.com"));
        controller.settle().await;

        assert!(!controller.state().used_secondary_model);
        assert!(controller.can_submit_secondary());
    }

    #[tokio::test]
    async fn secondary_reuses_scraped_text_from_primary() {
        let server = MockServer::start().await;
        mock_reply(
            &server,
            "/summarize",
            json!({ "summary": "Meta description.", "scraped_text": "full page text" }),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/summarize/hf"))
            .and(body_json(json!({
                "url": "https://example.com",
                "text": "full page text"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "summary": "Model summary.",
                "used_huggingface": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (mut controller, _) = controller_for(&server.uri());
        assert_ok!(controller.submit_primary("https://example.com"));
        controller.settle().await;
        assert_eq!(
            controller.state().scraped_text.as_deref(),
            Some("full page text")
        );

        assert_ok!(controller.submit_secondary("https://example.com", None));
        assert_eq!(controller.settle().await, RequestStatus::Succeeded);

        let state = controller.state();
        assert_eq!(state.mode, SummaryMode::Secondary);
        assert_eq!(state.summary(), "Model summary.");
        assert!(state.used_secondary_model);
        assert!(!controller.can_submit_secondary());
        // Secondary responses never overwrite the retained text
        assert_eq!(state.scraped_text.as_deref(), Some("full page text"));
    }

    #[tokio::test]
    async fn secondary_without_scraped_text_omits_text_field() {
        let server = MockServer::start().await;
        mock_reply(&server, "/summarize", json!({ "summary": "No body text." })).await;
        Mock::given(method("POST"))
            .and(path("/summarize/hf"))
            .and(body_json(json!({ "url": "https://example.com" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "summary": "Model summary.",
                "used_huggingface": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (mut controller, _) = controller_for(&server.uri());
        assert_ok!(controller.submit_primary("https://example.com"));
        controller.settle().await;

        assert_ok!(controller.submit_secondary("https://example.com", None));
        assert_eq!(controller.settle().await, RequestStatus::Succeeded);
    }

    #[tokio::test]
    async fn secondary_does_not_borrow_text_scraped_for_another_url() {
        let server = MockServer::start().await;
        mock_reply(
            &server,
            "/summarize",
            json!({ "summary": "First.", "scraped_text": "first page" }),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/summarize/hf"))
            .and(body_json(json!({ "url": "https://other.example.com" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "summary": "Other." })))
            .expect(1)
            .mount(&server)
            .await;

        let (mut controller, _) = controller_for(&server.uri());
        assert_ok!(controller.submit_primary("https://example.com"));
        controller.settle().await;

        assert_ok!(controller.submit_secondary("https://other.example.com", None));
        assert_eq!(controller.settle().await, RequestStatus::Succeeded);
        assert!(!controller.state().used_secondary_model);
    }

    #[tokio::test]
    async fn submit_rejected_while_in_flight() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/summarize"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "summary": "Slow." }))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (mut controller, _) = controller_for(&server.uri());
        assert_ok!(controller.submit_primary("https://example.com"));

        let before = controller.state().clone();
        assert!(matches!(
            controller.submit_primary("https://other.example.com"),
            Err(AppError::RequestInFlight)
        ));
        assert!(matches!(
            controller.submit_secondary("https://example.com", None),
            Err(AppError::RequestInFlight)
        ));
        assert_eq!(controller.state(), &before);
        assert!(!controller.can_submit_secondary());

        assert_eq!(controller.settle().await, RequestStatus::Succeeded);
        assert_eq!(controller.state().source_url, "https://example.com");
    }

    #[tokio::test]
    async fn blank_input_is_rejected() {
        let (mut controller, _) = controller_for("http://localhost:8000");
        assert!(matches!(
            controller.submit_primary("   "),
            Err(AppError::EmptyInput)
        ));
        assert_eq!(controller.state().status, RequestStatus::Idle);
    }

    #[tokio::test]
    async fn copy_with_no_summary_is_a_no_op() {
        let (mut controller, clipboard) = controller_for("http://localhost:8000");

        assert!(!controller.copy_current_summary().unwrap());
        assert!(!controller.is_copied());
        assert!(clipboard.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn copy_writes_summary_and_indicator_expires() {
        let server = MockServer::start().await;
        mock_reply(&server, "/summarize", json!({ "summary": "Copy me." })).await;

        let (mut controller, clipboard) = controller_for(&server.uri());
        assert_ok!(controller.submit_primary("https://example.com"));
        controller.settle().await;

        assert!(controller.copy_current_summary().unwrap());
        assert!(controller.is_copied());
        assert_eq!(*clipboard.writes.lock().unwrap(), vec!["Copy me.".to_string()]);

        controller.tick(Instant::now());
        assert!(controller.is_copied());

        controller.tick(Instant::now() + COPIED_WINDOW);
        assert!(!controller.is_copied());
    }
}
