/// Sandboxed Executor - Abstraction for Isolated Code Execution
///
/// **Core Responsibility:**
/// Run a source artifact against one test input under a time budget and
/// write the captured stdout into the caller's sink.
///
/// **Critical Architectural Boundary:**
/// - The executor knows HOW to isolate (Docker here)
/// - The executor does NOT compare outputs
/// - The executor does NOT keep a tally
/// - Every failure mode it reports is folded into a single Errored verdict
///   upstream
use crate::profiles::SandboxProfile;
use base64::{engine::general_purpose, Engine as _};
use bollard::container::{
    Config, CreateContainerOptions, KillContainerOptions, LogOutput, LogsOptions,
    RemoveContainerOptions, StartContainerOptions, WaitContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::Docker;
use futures_util::stream::StreamExt;
use std::fs::File;
use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Safety limits to prevent pathological inputs from reaching the backend
const MAX_SOURCE_CODE_BYTES: u64 = 1024 * 1024; // 1MB
const MAX_TEST_INPUT_BYTES: usize = 10 * 1024 * 1024; // 10MB

/// Why a sandbox run produced no usable output
///
/// The runner records every variant uniformly as Errored; the variant only
/// feeds logs.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("execution timed out after {0:?}")]
    Timeout(Duration),

    #[error("process exited with status {0}")]
    Runtime(i64),

    #[error("input rejected: {0}")]
    Oversized(&'static str),

    #[error("container backend error")]
    Backend(#[from] bollard::errors::Error),

    #[error("i/o failure around sandbox execution")]
    Io(#[from] std::io::Error),
}

/// Sandboxed executor seam
///
/// Any implementation must guarantee:
/// 1. Execute the source artifact with the given input
/// 2. Write captured stdout into `sink`
/// 3. Respect `timeout`
/// 4. Report every failure, timeout included, as an `ExecError`
pub trait SandboxExecutor {
    fn execute(
        &self,
        source: &Path,
        input: &str,
        sink: &mut File,
        timeout: Duration,
        profile: &SandboxProfile,
    ) -> impl Future<Output = Result<(), ExecError>> + Send;
}

/// Echo engine for tests and dry runs
///
/// **Echo Rules:**
/// 1. Source artifact is ignored
/// 2. stdout = input, trimmed
/// 3. Never times out, never fails
pub struct EchoEngine;

impl SandboxExecutor for EchoEngine {
    async fn execute(
        &self,
        _source: &Path,
        input: &str,
        sink: &mut File,
        _timeout: Duration,
        _profile: &SandboxProfile,
    ) -> Result<(), ExecError> {
        sink.write_all(input.trim().as_bytes())?;
        Ok(())
    }
}

/// Container cleanup guard - guarantees container removal on drop
///
/// Covers panic and cancellation paths. Drop cannot be async, so removal is
/// spawned best-effort and logged when it fails.
struct ContainerGuard {
    docker: Docker,
    container_id: String,
}

impl ContainerGuard {
    fn new(docker: &Docker, container_id: String) -> Self {
        Self {
            docker: docker.clone(),
            container_id,
        }
    }
}

impl Drop for ContainerGuard {
    fn drop(&mut self) {
        let docker = self.docker.clone();
        let container_id = self.container_id.clone();

        tokio::spawn(async move {
            let remove_options = RemoveContainerOptions {
                force: true,
                ..Default::default()
            };

            if let Err(e) = docker.remove_container(&container_id, Some(remove_options)).await {
                warn!(container_id = %container_id, error = %e, "failed to clean up container");
            }
        });
    }
}

/// Docker-based sandbox engine
///
/// **Execution Rules:**
/// 1. Pulls the profile's image if not present
/// 2. Creates the container with network disabled and the profile's
///    memory/CPU limits
/// 3. Injects source and test input as base64 env vars for the profile's
///    command to decode
/// 4. Captures stdout into the caller's sink
/// 5. Kills the container on timeout; removal is guaranteed via Drop guard
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    pub fn connect() -> Result<Self, ExecError> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }

    /// Verify the image exists locally, pulling it when missing
    async fn ensure_image(&self, image: &str) -> Result<(), ExecError> {
        if self.docker.inspect_image(image).await.is_ok() {
            debug!(image = %image, "image cache hit");
            return Ok(());
        }

        warn!(image = %image, "image cache miss, pulling");

        let options = Some(CreateImageOptions {
            from_image: image,
            ..Default::default()
        });

        let mut stream = self.docker.create_image(options, None, None);
        while let Some(result) = stream.next().await {
            result?;
        }

        info!(image = %image, "image pulled");
        Ok(())
    }
}

impl SandboxExecutor for DockerEngine {
    async fn execute(
        &self,
        source: &Path,
        input: &str,
        sink: &mut File,
        timeout: Duration,
        profile: &SandboxProfile,
    ) -> Result<(), ExecError> {
        if tokio::fs::metadata(source).await?.len() > MAX_SOURCE_CODE_BYTES {
            return Err(ExecError::Oversized("source code exceeds 1MB"));
        }
        if input.len() > MAX_TEST_INPUT_BYTES {
            return Err(ExecError::Oversized("test input exceeds 10MB"));
        }

        let source_code = tokio::fs::read_to_string(source).await?;

        self.ensure_image(&profile.image).await?;

        let container_name = format!("gavel-{}", uuid::Uuid::new_v4());

        let env = vec![
            format!("SOURCE_CODE={}", general_purpose::STANDARD.encode(&source_code)),
            format!("TEST_INPUT={}", general_purpose::STANDARD.encode(input)),
            format!("LANGUAGE={}", profile.name),
        ];

        let config = Config {
            image: Some(profile.image.clone()),
            cmd: Some(profile.command.clone()),
            env: Some(env),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            network_disabled: Some(true), // submissions get no network
            host_config: Some(bollard::models::HostConfig {
                memory: Some(profile.memory_bytes()),
                nano_cpus: Some(profile.nano_cpus()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let create_options = CreateContainerOptions {
            name: container_name.as_str(),
            platform: None,
        };

        let container = self.docker.create_container(Some(create_options), config).await?;
        let container_id = container.id.clone();

        // Cleanup guard goes up immediately after creation, before anything
        // that can fail or be cancelled.
        let _guard = ContainerGuard::new(&self.docker, container_id.clone());

        let start_time = Instant::now();

        self.docker
            .start_container(&container_id, None::<StartContainerOptions<String>>)
            .await?;

        let run = async {
            let mut stdout = String::new();

            let logs_options = Some(LogsOptions::<String> {
                stdout: true,
                stderr: false,
                follow: true,
                ..Default::default()
            });

            let mut logs = self.docker.logs(&container_id, logs_options);
            while let Some(chunk) = logs.next().await {
                match chunk {
                    Ok(LogOutput::StdOut { message }) => {
                        stdout.push_str(&String::from_utf8_lossy(&message));
                    }
                    Ok(_) => {}
                    Err(e) => return Err(ExecError::Backend(e)),
                }
            }

            let wait_options = WaitContainerOptions {
                condition: "not-running",
            };

            let mut exit_code = 0i64;
            let mut wait = self.docker.wait_container(&container_id, Some(wait_options));
            match wait.next().await {
                Some(Ok(response)) => exit_code = response.status_code,
                Some(Err(e)) => return Err(ExecError::Backend(e)),
                None => {}
            }

            Ok::<(String, i64), ExecError>((stdout, exit_code))
        };

        match tokio::time::timeout(timeout, run).await {
            Ok(Ok((stdout, 0))) => {
                sink.write_all(stdout.as_bytes())?;
                debug!(
                    container_id = %container_id,
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "container run complete"
                );
                Ok(())
            }
            Ok(Ok((_, code))) => Err(ExecError::Runtime(code)),
            Ok(Err(e)) => Err(e),
            Err(_) => {
                // Kill immediately so the container does not outlive its budget.
                if let Err(e) = self
                    .docker
                    .kill_container(&container_id, None::<KillContainerOptions<String>>)
                    .await
                {
                    warn!(container_id = %container_id, error = %e, "failed to kill timed-out container");
                }
                Err(ExecError::Timeout(timeout))
            }
        }
    }
}
