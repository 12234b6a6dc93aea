use console::style;

use crate::output::PublishReceipt;
use crate::pipeline::JobReport;
use crate::types::{EntryStatus, JobOutcome};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        println!("  {:<12} {}", style(format!("{}:", label)).dim(), value);
    }

    /// Summary of a finished job: counts, problem files, output locations
    pub fn report(&self, report: &JobReport) {
        let docs = &report.documentation;

        self.section("Documentation");
        self.field("Job", &report.job_id);
        self.field("Documented", docs.success_count());
        self.field("Failed", docs.failed_count());
        self.field("Not fetched", report.fetch_failures.len());

        let failed: Vec<_> = docs
            .iter()
            .filter(|e| e.status == EntryStatus::Failed)
            .collect();
        if !failed.is_empty() || !report.fetch_failures.is_empty() {
            self.section("Problems");
            for entry in failed {
                self.warning(&format!("{}: {}", entry.path, entry.body));
            }
            for failure in &report.fetch_failures {
                self.warning(&format!("{}: {}", failure.path, failure.reason));
            }
        }

        if let Some(dir) = &report.output_dir {
            self.field("Output", dir.display());
        }
        if let Some(receipt) = &report.publish {
            self.publish(receipt);
        }

        println!();
        match report.outcome {
            JobOutcome::Success => self.success(&report.message),
            JobOutcome::PartialFailure => self.warning(&report.message),
            JobOutcome::Failure => self.error(&report.message),
        }
    }

    fn publish(&self, receipt: &PublishReceipt) {
        if !receipt.published {
            return;
        }
        if let Some(branch) = &receipt.branch {
            self.field("Branch", branch);
        }
        if let Some(url) = &receipt.pull_request_url {
            self.field("Pull request", url);
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
