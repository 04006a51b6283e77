//! Application services and ports.

#![forbid(unsafe_code)]

mod directory_service;
mod dry_run_reporter;
mod erasure_service;
mod homeserver_ports;
mod retention_run_service;

#[cfg(test)]
mod fakes;

pub use directory_service::{AccountDirectoryService, DirectoryListing};
pub use dry_run_reporter::{DryRunReporter, PreviewEntry, preview_entries};
pub use erasure_service::{ErasureOutcome, ErasureService, ErasureSummary, StepStatus};
pub use homeserver_ports::{AccountDirectory, AccountEraser, AccountPage};
pub use retention_run_service::{RetentionRunService, RunOutcome, RunReport};
