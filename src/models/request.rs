use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryMode {
    /// Metadata-derived summary from the default endpoint.
    #[default]
    Primary,
    /// Model-backed re-summary from the Hugging Face endpoint.
    Secondary,
}

impl SummaryMode {
    pub fn path_suffix(self) -> &'static str {
        match self {
            SummaryMode::Primary => "",
            SummaryMode::Secondary => "/hf",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SummaryMode::Primary => "Summarize",
            SummaryMode::Secondary => "Hugging Face",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

/// The single request the client is tracking. Superseded by the next submit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummarizationRequest {
    pub source_url: String,
    pub mode: SummaryMode,
    pub status: RequestStatus,
    pub summary_text: Option<String>,
    pub preview_image_url: Option<String>,
    pub scraped_text: Option<String>,
    pub used_secondary_model: bool,
    pub settled_at: Option<DateTime<Utc>>,
}

impl SummarizationRequest {
    pub fn is_in_flight(&self) -> bool {
        self.status == RequestStatus::InFlight
    }

    pub fn summary(&self) -> &str {
        self.summary_text.as_deref().unwrap_or("")
    }
}
