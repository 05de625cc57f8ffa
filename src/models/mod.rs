mod links;
mod request;

pub use links::SOCIAL_LINKS;
pub use request::{RequestStatus, SummarizationRequest, SummaryMode};
