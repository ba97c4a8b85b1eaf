/// Scoped Working Area for One Job Run
///
/// Holds the source artifact and per-case output sinks for exactly one job.
/// Never shared across concurrent runs. The directory is removed on every
/// exit path: `release` surfaces removal failures explicitly, and the
/// underlying temp dir still cleans up best-effort if the run unwinds
/// before release is reached.
use crate::error::JudgeError;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

pub struct JobWorkspace {
    dir: TempDir,
    source_path: PathBuf,
}

impl JobWorkspace {
    /// Create the working area and place the source artifact in it.
    ///
    /// The source file is made read-only so nothing executed later in the
    /// run can alter the submission between test cases.
    pub fn provision(source_code: &str) -> Result<Self, JudgeError> {
        let dir = tempfile::Builder::new()
            .prefix("gavel-job-")
            .tempdir()
            .map_err(JudgeError::Workspace)?;

        let source_path = dir.path().join("source");
        fs::write(&source_path, source_code).map_err(JudgeError::Workspace)?;

        let mut permissions = fs::metadata(&source_path)
            .map_err(JudgeError::Workspace)?
            .permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&source_path, permissions).map_err(JudgeError::Workspace)?;

        debug!(path = %dir.path().display(), "provisioned job workspace");

        Ok(Self { dir, source_path })
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Create a fresh output sink for one test case.
    ///
    /// Opened read+write: the executor writes it, the checker rewinds it
    /// and reads it back.
    pub fn case_output(&self, index: usize) -> Result<File, JudgeError> {
        let path = self.dir.path().join(format!("case-{index}"));
        OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(path)
            .map_err(JudgeError::Workspace)
    }

    /// Remove the working area and everything in it.
    ///
    /// Exists alongside the drop guard so removal failures reach the
    /// caller instead of being swallowed.
    pub fn release(self) -> Result<(), JudgeError> {
        let path = self.dir.path().to_path_buf();
        let result = self.dir.close().map_err(JudgeError::WorkspaceCleanup);
        debug!(path = %path.display(), ok = result.is_ok(), "released job workspace");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek, SeekFrom, Write};

    #[test]
    fn test_provision_writes_read_only_source() {
        let workspace = JobWorkspace::provision("print('hi')").unwrap();

        let contents = fs::read_to_string(workspace.source_path()).unwrap();
        assert_eq!(contents, "print('hi')");

        let permissions = fs::metadata(workspace.source_path()).unwrap().permissions();
        assert!(permissions.readonly());

        workspace.release().unwrap();
    }

    #[test]
    fn test_case_outputs_are_distinct_and_rewindable() {
        let workspace = JobWorkspace::provision("").unwrap();

        let mut first = workspace.case_output(0).unwrap();
        let mut second = workspace.case_output(1).unwrap();

        first.write_all(b"alpha").unwrap();
        second.write_all(b"beta").unwrap();

        first.seek(SeekFrom::Start(0)).unwrap();
        let mut contents = String::new();
        first.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "alpha");

        workspace.release().unwrap();
    }

    #[test]
    fn test_duplicate_case_index_is_an_error() {
        let workspace = JobWorkspace::provision("").unwrap();

        workspace.case_output(0).unwrap();
        assert!(workspace.case_output(0).is_err());

        workspace.release().unwrap();
    }

    #[test]
    fn test_release_removes_directory() {
        let workspace = JobWorkspace::provision("source").unwrap();
        let dir_path = workspace.source_path().parent().unwrap().to_path_buf();
        assert!(dir_path.exists());

        workspace.release().unwrap();

        assert!(!dir_path.exists());
    }
}
