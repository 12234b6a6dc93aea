//! Job state for one end-to-end pipeline run

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::JobId;
use super::document::{DocumentationSet, FetchFailure};

/// Caller-visible result of a job
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    /// Every eligible file was fetched and documented
    Success,
    /// The job completed but some files were dropped or marked failed
    PartialFailure,
    /// Job-level error, or no usable documentation
    Failure,
}

impl JobOutcome {
    /// Status string for the entry-point report
    pub fn as_status(&self) -> &'static str {
        match self {
            JobOutcome::Success => "success",
            JobOutcome::PartialFailure => "partial",
            JobOutcome::Failure => "error",
        }
    }
}

impl std::fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobOutcome::Success => write!(f, "success"),
            JobOutcome::PartialFailure => write!(f, "partial failure"),
            JobOutcome::Failure => write!(f, "failure"),
        }
    }
}

/// One pipeline invocation for one repository.
///
/// Source file contents are not retained here: they are handed to the
/// generator and dropped once the corresponding entry exists.
pub struct Job {
    pub id: JobId,
    pub owner: String,
    pub repo: String,
    /// Access token; never serialized or logged
    pub credential: Option<SecretString>,
    /// Eligible paths in discovery order
    pub eligible: Vec<String>,
    pub documentation: DocumentationSet,
    pub fetch_failures: Vec<FetchFailure>,
    pub outcome: Option<JobOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("credential", &self.credential.as_ref().map(|_| "[REDACTED]"))
            .field("eligible", &self.eligible.len())
            .field("documentation", &self.documentation.len())
            .field("fetch_failures", &self.fetch_failures.len())
            .field("outcome", &self.outcome)
            .finish()
    }
}

impl Job {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        credential: Option<SecretString>,
    ) -> Self {
        Self {
            id: JobId::generate(),
            owner: owner.into(),
            repo: repo.into(),
            credential,
            eligible: Vec::new(),
            documentation: DocumentationSet::new(),
            fetch_failures: Vec::new(),
            outcome: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Compute and record the outcome.
    ///
    /// `fatal` is set when a job-level stage (discovery, persist, publish)
    /// failed. `interrupted` is set when the job was cancelled or timed out;
    /// whatever was documented before that still counts.
    pub fn finish(&mut self, fatal: bool, interrupted: bool) -> JobOutcome {
        let outcome = if fatal {
            JobOutcome::Failure
        } else if self.eligible.is_empty() && !interrupted {
            JobOutcome::Success
        } else if self.documentation.success_count() == 0 {
            JobOutcome::Failure
        } else if interrupted
            || !self.fetch_failures.is_empty()
            || self.documentation.failed_count() > 0
            || self.documentation.len() < self.eligible.len()
        {
            JobOutcome::PartialFailure
        } else {
            JobOutcome::Success
        };

        self.outcome = Some(outcome);
        self.finished_at = Some(Utc::now());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DocumentationEntry, SourceFile};

    fn job_with(paths: &[&str]) -> Job {
        let mut job = Job::new("octo", "demo", None);
        job.eligible = paths.iter().map(|p| p.to_string()).collect();
        job
    }

    fn ok(path: &str) -> DocumentationEntry {
        DocumentationEntry::success(&SourceFile::new(path, "x"), "doc")
    }

    fn failed(path: &str) -> DocumentationEntry {
        DocumentationEntry::failed(&SourceFile::new(path, "x"), "boom")
    }

    #[test]
    fn test_all_documented_is_success() {
        let mut job = job_with(&["a.py", "b.py"]);
        job.documentation.insert(ok("a.py"));
        job.documentation.insert(ok("b.py"));
        assert_eq!(job.finish(false, false), JobOutcome::Success);
        assert!(job.finished_at.is_some());
    }

    #[test]
    fn test_fetch_failure_is_partial() {
        let mut job = job_with(&["a.py", "b.py"]);
        job.documentation.insert(ok("a.py"));
        job.fetch_failures.push(FetchFailure {
            path: "b.py".into(),
            reason: "HTTP 404".into(),
        });
        assert_eq!(job.finish(false, false), JobOutcome::PartialFailure);
    }

    #[test]
    fn test_failed_entry_is_partial() {
        let mut job = job_with(&["a.py", "b.py"]);
        job.documentation.insert(ok("a.py"));
        job.documentation.insert(failed("b.py"));
        assert_eq!(job.finish(false, false), JobOutcome::PartialFailure);
    }

    #[test]
    fn test_nothing_usable_is_failure() {
        let mut job = job_with(&["a.py"]);
        job.documentation.insert(failed("a.py"));
        assert_eq!(job.finish(false, false), JobOutcome::Failure);
    }

    #[test]
    fn test_empty_repository_is_success() {
        let mut job = job_with(&[]);
        assert_eq!(job.finish(false, false), JobOutcome::Success);
    }

    #[test]
    fn test_fatal_overrides_documentation() {
        let mut job = job_with(&["a.py"]);
        job.documentation.insert(ok("a.py"));
        assert_eq!(job.finish(true, false), JobOutcome::Failure);
    }

    #[test]
    fn test_interrupted_with_output_is_partial() {
        let mut job = job_with(&["a.py", "b.py"]);
        job.documentation.insert(ok("a.py"));
        assert_eq!(job.finish(false, true), JobOutcome::PartialFailure);
    }

    #[test]
    fn test_debug_redacts_credential() {
        let job = Job::new("octo", "demo", Some(SecretString::from("ghp_secret")));
        let rendered = format!("{:?}", job);
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("ghp_secret"));
    }
}
