use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{oneshot, watch};

use crate::api::BackendClient;
use crate::config::Config;
use crate::controller::SummaryController;
use crate::error::Result;
use crate::models::{RequestStatus, SOCIAL_LINKS};
use crate::services::{Clipboard, Theme, ThemeStore};
use crate::tui::AppAction;

const NOTICE_TTL: Duration = Duration::from_secs(3);
const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    About,
}

impl Page {
    pub fn toggled(self) -> Self {
        match self {
            Page::Home => Page::About,
            Page::About => Page::Home,
        }
    }
}

struct Notice {
    text: String,
    expires_at: Instant,
}

pub struct App {
    // UI State
    pub page: Page,
    pub input: String,
    pub input_active: bool,
    pub show_help: bool,
    pub selected_link: usize,
    pub backend_status: Option<String>,
    spinner_frame: usize,
    notice: Option<Notice>,

    // Async state
    health_rx: Option<oneshot::Receiver<String>>,
    theme_rx: watch::Receiver<Theme>,

    // Services
    pub theme: ThemeStore,
    pub controller: SummaryController,
    backend: Arc<BackendClient>,
}

impl App {
    pub fn new(config: &Config, clipboard: Box<dyn Clipboard>) -> Result<Self> {
        let base_url = config.backend_base_url()?;
        let backend = Arc::new(BackendClient::new(
            base_url,
            Duration::from_secs(config.request_timeout_secs),
        )?);
        tracing::debug!("Using backend {}", backend.base_url());

        let theme = ThemeStore::new(config.initial_theme());
        let theme_rx = theme.subscribe();

        Ok(Self {
            page: Page::Home,
            input: String::new(),
            input_active: true,
            show_help: false,
            selected_link: 0,
            backend_status: None,
            spinner_frame: 0,
            notice: None,
            health_rx: None,
            theme_rx,
            theme,
            controller: SummaryController::new(Arc::clone(&backend), clipboard),
            backend,
        })
    }

    pub fn handle_action(&mut self, action: AppAction) -> Result<bool> {
        match action {
            AppAction::Quit => return Ok(true),

            AppAction::InputStart => {
                self.page = Page::Home;
                self.input_active = true;
            }

            AppAction::InputStop => {
                self.input_active = false;
            }

            AppAction::InputChar(c) => {
                self.input.push(c);
            }

            AppAction::InputBackspace => {
                self.input.pop();
            }

            AppAction::Summarize => {
                self.summarize();
            }

            AppAction::SummarizeWithHuggingFace => {
                self.summarize_with_huggingface();
            }

            AppAction::CopySummary => {
                if let Err(e) = self.controller.copy_current_summary() {
                    tracing::warn!("Copy failed: {}", e);
                    self.show_notice(format!("Copy failed: {e}"));
                }
            }

            AppAction::OpenPreview => {
                if let Some(url) = &self.controller.state().preview_image_url {
                    let _ = open::that(url);
                }
            }

            AppAction::ToggleTheme => {
                self.theme.toggle();
            }

            AppAction::SwitchPage => {
                self.page = self.page.toggled();
                self.input_active = false;
            }

            AppAction::MoveUp => {
                if self.selected_link > 0 {
                    self.selected_link -= 1;
                }
            }

            AppAction::MoveDown => {
                if self.selected_link + 1 < SOCIAL_LINKS.len() {
                    self.selected_link += 1;
                }
            }

            AppAction::OpenLink => {
                if let Some(link) = SOCIAL_LINKS.get(self.selected_link) {
                    let _ = open::that(link.url);
                }
            }

            AppAction::ShowHelp => {
                self.show_help = true;
            }

            AppAction::HideHelp => {
                self.show_help = false;
            }
        }

        Ok(false)
    }

    fn summarize(&mut self) {
        // The Summarize action is disabled while a request is running
        if self.controller.is_in_flight() {
            return;
        }

        let url = self.input.clone();
        match self.controller.submit_primary(&url) {
            Ok(()) => self.input_active = false,
            Err(e) => self.show_notice(e.to_string()),
        }
    }

    fn summarize_with_huggingface(&mut self) {
        if self.controller.is_in_flight() {
            return;
        }

        if self.controller.state().used_secondary_model {
            self.show_notice("Already summarized with Hugging Face");
            return;
        }
        if !self.controller.can_submit_secondary() {
            self.show_notice("Summarize a link first");
            return;
        }

        // The re-summary belongs to the displayed result, not an edited link
        let url = self.controller.state().source_url.clone();
        if !self.input.trim().is_empty() && self.input != url {
            self.show_notice("Link changed, press Enter to summarize it first");
            return;
        }

        if let Err(e) = self.controller.submit_secondary(&url, None) {
            self.show_notice(e.to_string());
        }
    }

    pub fn is_loading(&self) -> bool {
        self.controller.state().status == RequestStatus::InFlight
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    pub fn tick_spinner(&mut self) {
        if self.is_loading() {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }

    pub fn show_notice(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            expires_at: Instant::now() + NOTICE_TTL,
        });
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|n| n.text.as_str())
    }

    /// Expire the copied indicator and any transient notice.
    pub fn check_timers(&mut self, now: Instant) {
        self.controller.tick(now);

        if self.notice.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.notice = None;
        }
    }

    /// Poll for a settled summary request (non-blocking)
    pub fn poll_summary_result(&mut self) {
        if self.controller.poll() {
            let state = self.controller.state();
            tracing::debug!("Request for {} settled as {:?}", state.source_url, state.status);
        }
    }

    pub fn poll_theme_change(&mut self) {
        if self.theme_rx.has_changed().unwrap_or(false) {
            let theme = *self.theme_rx.borrow_and_update();
            tracing::debug!("Theme switched to {}", theme.label());
        }
    }

    pub async fn check_health(&self) -> Result<String> {
        Ok(self.backend.health().await?.message)
    }

    /// Fire a best-effort liveness probe; the result lands in the status line.
    pub fn start_health_check(&mut self) {
        let (tx, rx) = oneshot::channel();
        let backend = Arc::clone(&self.backend);

        tokio::spawn(async move {
            let status = match backend.health().await {
                Ok(health) => health.message,
                Err(e) => {
                    tracing::warn!("Backend health check failed: {}", e);
                    "Backend unreachable".to_string()
                }
            };
            let _ = tx.send(status);
        });

        self.health_rx = Some(rx);
    }

    pub fn poll_health_result(&mut self) {
        if let Some(rx) = self.health_rx.as_mut() {
            match rx.try_recv() {
                Ok(status) => {
                    self.backend_status = Some(status);
                    self.health_rx = None;
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => self.health_rx = None,
            }
        }
    }
}
