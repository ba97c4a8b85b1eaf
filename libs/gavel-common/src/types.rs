use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Test Case Definition (Immutable Input)
/// Test cases are immutable - the runner must not mutate them
/// Ordering matters - execution is sequential
///
/// `types` is a space-separated descriptor of the token layout of every
/// expected-output line, e.g. "int float string"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    #[serde(rename = "output")]
    pub expected_output: String,
    pub types: String,
}

/// Job Input (Immutable)
/// A job is write-once - never mutate input fields
///
/// ## Test Case Execution Semantics:
/// - Test cases execute **sequentially** in order
/// - Timeout applies per test case
/// - Test cases are mandatory (empty vec = instant completion)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub language: String,
    pub source_code: String,
    pub test_cases: Vec<TestCase>,
}

/// Per-Test Verdict
/// Distinguishes "ran but wrong" from "never produced output"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Passed,
    Failed,
    Errored,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Passed => write!(f, "passed"),
            Verdict::Failed => write!(f, "failed"),
            Verdict::Errored => write!(f, "errored"),
        }
    }
}

/// Job Output
/// Written by the runner, returned to the caller of one synchronous run
///
/// ## Tally Semantics:
/// - Every test case lands in exactly one bucket
/// - passed + failed + errored == num_tests always holds
/// - Errored means the sandbox never produced output; correctness was
///   not evaluated for that case
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Results {
    pub num_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
}

impl Results {
    /// Record one verdict into the matching bucket
    pub fn record(&mut self, verdict: Verdict) {
        self.num_tests += 1;
        match verdict {
            Verdict::Passed => self.passed += 1,
            Verdict::Failed => self.failed += 1,
            Verdict::Errored => self.errored += 1,
        }
    }

    /// The partition invariant: the three buckets sum to num_tests
    pub fn is_consistent(&self) -> bool {
        self.passed + self.failed + self.errored == self.num_tests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_serialization() {
        let verdict = Verdict::Passed;
        let json = serde_json::to_string(&verdict).unwrap();
        assert_eq!(json, "\"passed\"");

        let deserialized: Verdict = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, Verdict::Passed);
    }

    #[test]
    fn test_job_deserialization_wire_format() {
        // the submission format: expected output travels as "output"
        let json = r#"{
            "language": "python",
            "source_code": "print(input())",
            "test_cases": [
                {"input": "5\n", "output": "5\n", "types": "int"},
                {"input": "1 2\n", "output": "3\n", "types": "int"}
            ]
        }"#;

        let job: Job = serde_json::from_str(json).unwrap();

        assert_eq!(job.language, "python");
        assert_eq!(job.test_cases.len(), 2);
        assert_eq!(job.test_cases[0].expected_output, "5\n");
        assert_eq!(job.test_cases[1].types, "int");
    }

    #[test]
    fn test_job_id_generated_when_absent() {
        let json = r#"{"language": "python", "source_code": "", "test_cases": []}"#;
        let a: Job = serde_json::from_str(json).unwrap();
        let b: Job = serde_json::from_str(json).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_results_serialization() {
        let results = Results {
            num_tests: 3,
            passed: 1,
            failed: 1,
            errored: 1,
        };

        let json = serde_json::to_string(&results).unwrap();
        assert!(json.contains("\"num_tests\":3"));

        let deserialized: Results = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, results);
    }

    #[test]
    fn test_results_record_partitions() {
        let mut results = Results::default();
        results.record(Verdict::Passed);
        results.record(Verdict::Passed);
        results.record(Verdict::Failed);
        results.record(Verdict::Errored);

        assert_eq!(results.num_tests, 4);
        assert_eq!(results.passed, 2);
        assert_eq!(results.failed, 1);
        assert_eq!(results.errored, 1);
        assert!(results.is_consistent());
    }

    #[test]
    fn test_test_case_immutability() {
        let test_case = TestCase {
            input: "input".to_string(),
            expected_output: "output".to_string(),
            types: "string".to_string(),
        };

        // Test case can be cloned but original is immutable
        let cloned = test_case.clone();
        assert_eq!(cloned.input, test_case.input);
        assert_eq!(cloned.types, "string");
    }
}
