pub mod client;
pub mod prompt;

// Re-export commonly used types
pub use client::{PlanClient, PlanError};
pub use prompt::{CleaningPlan, QuoteInput};
