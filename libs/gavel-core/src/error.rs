use crate::checker::CheckError;
use std::io;
use thiserror::Error;

/// Run-level error taxonomy
///
/// Only these propagate out of a run. Per-case outcomes - wrong answers,
/// sandbox failures, timeouts - are tally entries, never errors.
#[derive(Debug, Error)]
pub enum JudgeError {
    /// Configuration error, raised before any resource is acquired
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Resource error while provisioning or using the job workspace
    #[error("job workspace failure")]
    Workspace(#[source] io::Error),

    /// Resource error while releasing the job workspace; reported in
    /// preference to any earlier fault from the same run
    #[error("failed to release job workspace")]
    WorkspaceCleanup(#[source] io::Error),

    /// Test-data error: a defect in the expected answer itself, fatal for
    /// the whole job
    #[error("malformed test data: {0}")]
    TestData(#[from] CheckError),
}
