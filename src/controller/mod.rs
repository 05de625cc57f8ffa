mod summary;

pub use summary::SummaryController;
