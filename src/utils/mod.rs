/// Utility functions shared across the crate
pub mod document;
pub mod retry;

pub use document::GenericDocument;
pub use retry::retry;
