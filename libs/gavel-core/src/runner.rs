/// Job Runner - Per-Case Orchestration and Tally
///
/// **Core Responsibility:**
/// Drive the sandbox once per test case, feed each produced output through
/// the Output Checker, and fold the verdicts into a Results tally.
///
/// **Critical Properties:**
/// - Knows nothing about Docker; the executor sits behind a trait
/// - Sandbox failures become Errored entries, never run-level errors
/// - Checker hard errors abort the remaining job: they mean the test data
///   itself is defective
/// - The workspace is released on every exit path, and a release failure
///   outranks the fault that preceded it
use crate::checker::check;
use crate::error::JudgeError;
use crate::profiles::{ProfileRegistry, SandboxProfile};
use crate::sandbox::SandboxExecutor;
use crate::token::classify;
use crate::workspace::JobWorkspace;
use gavel_common::types::{Job, Results, Verdict};
use std::io::{BufReader, Seek, SeekFrom};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Run one job to completion and return its tally.
///
/// Test cases run sequentially, in declared order. The language gate fires
/// before any resource is acquired.
pub async fn run_job<E: SandboxExecutor>(
    job: &Job,
    engine: &E,
    profiles: &ProfileRegistry,
    timeout: Duration,
) -> Result<Results, JudgeError> {
    let profile = profiles
        .get(&job.language)
        .ok_or_else(|| JudgeError::UnsupportedLanguage(job.language.clone()))?;

    let workspace = JobWorkspace::provision(&job.source_code)?;

    let outcome = judge_cases(job, engine, profile, &workspace, timeout).await;

    // Release unconditionally; a cleanup failure is what the caller sees
    // even when an earlier fault already occurred.
    match outcome {
        Ok(results) => {
            workspace.release()?;
            Ok(results)
        }
        Err(judge_error) => match workspace.release() {
            Ok(()) => Err(judge_error),
            Err(cleanup_error) => Err(cleanup_error),
        },
    }
}

async fn judge_cases<E: SandboxExecutor>(
    job: &Job,
    engine: &E,
    profile: &SandboxProfile,
    workspace: &JobWorkspace,
    timeout: Duration,
) -> Result<Results, JudgeError> {
    let mut results = Results::default();

    info!(
        job_id = %job.id,
        language = %job.language,
        test_cases = job.test_cases.len(),
        "running job"
    );

    for (index, test_case) in job.test_cases.iter().enumerate() {
        let mut sink = workspace.case_output(index)?;

        let run = engine
            .execute(
                workspace.source_path(),
                &test_case.input,
                &mut sink,
                timeout,
                profile,
            )
            .await;

        if let Err(exec_error) = run {
            // Timeouts, crashes, and setup failures all land here: the
            // candidate never produced an output worth checking.
            warn!(job_id = %job.id, case = index, error = %exec_error, "sandbox execution failed");
            results.record(Verdict::Errored);
            continue;
        }

        let kinds = classify(&test_case.types);

        sink.seek(SeekFrom::Start(0)).map_err(JudgeError::Workspace)?;

        let matched = check(
            test_case.expected_output.as_bytes(),
            BufReader::new(&sink),
            &kinds,
        )?;

        let verdict = if matched {
            Verdict::Passed
        } else {
            Verdict::Failed
        };
        debug!(job_id = %job.id, case = index, verdict = %verdict, "case judged");
        results.record(verdict);
    }

    info!(
        job_id = %job.id,
        passed = results.passed,
        failed = results.failed,
        errored = results.errored,
        "job complete"
    );

    Ok(results)
}
