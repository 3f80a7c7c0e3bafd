pub mod job_record;

// Re-export commonly used types
pub use job_record::{AdminStage, Job, JobPatch, NewJob, UrgencyTag};
