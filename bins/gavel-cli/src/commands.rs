// CLI commands for judging jobs and inspecting checker behavior
use anyhow::{Context, Result};
use gavel_common::types::{Job, Results};
use gavel_core::{check, classify, run_job, DockerEngine, EchoEngine, ProfileRegistry};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// Judge a job file, with Docker or the echo engine
pub async fn run(file: &str, echo: bool, timeout_ms: u64, languages: Option<&str>) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read job file {}", file))?;
    let job: Job = serde_json::from_str(&content).context("failed to parse job file")?;

    let profiles = load_profiles(languages)?;
    let timeout = Duration::from_millis(timeout_ms);

    println!("→ Judging {} test cases ({})", job.test_cases.len(), job.language);
    println!();

    let results = if echo {
        run_job(&job, &EchoEngine, &profiles, timeout).await?
    } else {
        let engine = DockerEngine::connect().context("failed to connect to Docker daemon")?;
        run_job(&job, &engine, &profiles, timeout).await?
    };

    print_results(&results);
    Ok(())
}

/// Compare two local files the way the judge would
pub fn check_files(answer: &str, output: &str, types: &str) -> Result<()> {
    let kinds = classify(types);

    let answer_reader = BufReader::new(
        File::open(answer).with_context(|| format!("failed to open answer file {}", answer))?,
    );
    let output_reader = BufReader::new(
        File::open(output).with_context(|| format!("failed to open output file {}", output))?,
    );

    let matched = check(answer_reader, output_reader, &kinds)?;

    if matched {
        println!("✓ Output matches");
    } else {
        println!("✗ Output does not match");
        std::process::exit(1);
    }

    Ok(())
}

/// List the sandbox languages this judge accepts
pub fn list_languages(languages: Option<&str>) -> Result<()> {
    let profiles = load_profiles(languages)?;

    for name in profiles.supported() {
        if let Some(profile) = profiles.get(&name) {
            println!(
                "{}  image={}  memory={}MB  cpu={}",
                profile.name, profile.image, profile.memory_limit_mb, profile.cpu_limit
            );
        }
    }

    Ok(())
}

fn load_profiles(languages: Option<&str>) -> Result<ProfileRegistry> {
    match languages {
        Some(path) => ProfileRegistry::load(Path::new(path))
            .with_context(|| format!("failed to load language profiles from {}", path)),
        None => Ok(ProfileRegistry::builtin()),
    }
}

fn print_results(results: &Results) {
    println!();
    println!("═══════════════════════════════════════════");
    println!("JUDGING RESULT");
    println!("═══════════════════════════════════════════");
    println!("Tests:   {}", results.num_tests);
    println!("Passed:  {}", results.passed);
    println!("Failed:  {}", results.failed);
    println!("Errored: {}", results.errored);
    println!("═══════════════════════════════════════════");
}
