// Sandbox profile management: which languages this judge can run, and how
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Execution profile for one supported language
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxProfile {
    pub name: String,
    pub image: String,
    pub command: Vec<String>,
    pub file_extension: String,
    pub memory_limit_mb: u32,
    pub cpu_limit: f32,
}

impl SandboxProfile {
    pub fn memory_bytes(&self) -> i64 {
        i64::from(self.memory_limit_mb) * 1024 * 1024
    }

    pub fn nano_cpus(&self) -> i64 {
        (f64::from(self.cpu_limit) * 1_000_000_000.0) as i64
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LanguagesJson {
    languages: Vec<SandboxProfile>,
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("language config file not found: {0}")]
    NotFound(String),

    #[error("failed to read language config")]
    Read(#[from] io::Error),

    #[error("failed to parse language config")]
    Parse(#[from] serde_json::Error),
}

/// Registry of sandbox profiles
///
/// The source of truth for the supported-language gate: a job whose
/// language has no profile here is rejected before any resource is used.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: HashMap<String, SandboxProfile>,
}

impl ProfileRegistry {
    /// Load profiles from a languages.json file
    pub fn load(config_path: &Path) -> Result<Self, ProfileError> {
        if !config_path.exists() {
            return Err(ProfileError::NotFound(config_path.display().to_string()));
        }

        let content = std::fs::read_to_string(config_path)?;
        let languages_json: LanguagesJson = serde_json::from_str(&content)?;

        let mut profiles = HashMap::new();
        for profile in languages_json.languages {
            profiles.insert(profile.name.clone(), profile);
        }

        Ok(Self { profiles })
    }

    /// Load from file, falling back to the builtin set when the file is
    /// missing or unreadable
    pub fn load_or_builtin(config_path: &Path) -> Self {
        match Self::load(config_path) {
            Ok(registry) => registry,
            Err(e) => {
                warn!(path = %config_path.display(), error = %e, "using builtin language profiles");
                Self::builtin()
            }
        }
    }

    /// The builtin profile set: python only
    pub fn builtin() -> Self {
        let python = SandboxProfile {
            name: "python".to_string(),
            image: "python:3.12-slim".to_string(),
            command: vec![
                "/bin/sh".to_string(),
                "-c".to_string(),
                "echo \"$SOURCE_CODE\" | base64 -d > /tmp/source.py && \
                 echo \"$TEST_INPUT\" | base64 -d | python /tmp/source.py"
                    .to_string(),
            ],
            file_extension: "py".to_string(),
            memory_limit_mb: 256,
            cpu_limit: 0.5,
        };

        let mut profiles = HashMap::new();
        profiles.insert(python.name.clone(), python);
        Self { profiles }
    }

    pub fn get(&self, language: &str) -> Option<&SandboxProfile> {
        self.profiles.get(language)
    }

    /// List supported language names, sorted for stable display
    pub fn supported(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_supports_python_only() {
        let registry = ProfileRegistry::builtin();
        assert_eq!(registry.supported(), vec!["python".to_string()]);
        assert!(registry.get("python").is_some());
        assert!(registry.get("cobol").is_none());
    }

    #[test]
    fn test_resource_limit_conversions() {
        let profile = ProfileRegistry::builtin().get("python").unwrap().clone();
        assert_eq!(profile.memory_bytes(), 256 * 1024 * 1024);
        assert_eq!(profile.nano_cpus(), 500_000_000);
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let result = ProfileRegistry::load(Path::new("/nonexistent/languages.json"));
        assert!(matches!(result, Err(ProfileError::NotFound(_))));
    }

    #[test]
    fn test_load_parses_languages_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("languages.json");
        std::fs::write(
            &path,
            r#"{
                "languages": [
                    {
                        "name": "python",
                        "image": "python:3.12-slim",
                        "command": ["python", "/tmp/source.py"],
                        "file_extension": "py",
                        "memory_limit_mb": 128,
                        "cpu_limit": 1.0
                    },
                    {
                        "name": "lua",
                        "image": "lua:5.4",
                        "command": ["lua", "/tmp/source.lua"],
                        "file_extension": "lua",
                        "memory_limit_mb": 64,
                        "cpu_limit": 0.25
                    }
                ]
            }"#,
        )
        .unwrap();

        let registry = ProfileRegistry::load(&path).unwrap();
        assert_eq!(registry.supported(), vec!["lua".to_string(), "python".to_string()]);
        assert_eq!(registry.get("python").unwrap().memory_limit_mb, 128);
    }

    #[test]
    fn test_load_or_builtin_falls_back() {
        let registry = ProfileRegistry::load_or_builtin(Path::new("/nonexistent/languages.json"));
        assert_eq!(registry.supported(), vec!["python".to_string()]);
    }
}
