//! Report generation for conformance results.

use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::diff;
use crate::error::HarnessError;
use crate::verify::VerificationSummary;

/// A conformance report over one or more fixture files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    pub title: String,
    /// Timestamp (UTC).
    pub timestamp: String,
    /// SHA-256 over the fixture files, in path order.
    pub fixture_digest: String,
    pub summary: VerificationSummary,
}

impl ConformanceReport {
    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {}\n", self.title);
        let _ = writeln!(out, "- Timestamp: {}", self.timestamp);
        let _ = writeln!(out, "- Fixture digest: `{}`", self.fixture_digest);
        let _ = writeln!(out, "- Total: {}", self.summary.total);
        let _ = writeln!(out, "- Passed: {}", self.summary.passed);
        let _ = writeln!(out, "- Failed: {}\n", self.summary.failed);

        out.push_str("| Case | Section | Stream | Status |\n");
        out.push_str("|------|---------|--------|--------|\n");
        for r in &self.summary.results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} |",
                r.case_name, r.section, r.stream, status
            );
        }

        let failed: Vec<_> = self.summary.results.iter().filter(|r| !r.passed).collect();
        if !failed.is_empty() {
            out.push_str("\n## Failures\n");
            for r in failed {
                let _ = writeln!(out, "\n### {}\n", r.case_name);
                let body = r
                    .diff
                    .clone()
                    .unwrap_or_else(|| diff::render_diff(&r.expected, &r.actual));
                let _ = writeln!(out, "```\n{body}```");
            }
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

fn hex_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// SHA-256 over the contents of `paths`, fed in the given order.
pub fn digest_files(paths: &[impl AsRef<Path>]) -> Result<String, HarnessError> {
    let mut hasher = Sha256::new();
    for path in paths {
        hasher.update(std::fs::read(path.as_ref())?);
    }
    Ok(hex_lower(&hasher.finalize()))
}

/// SHA-256 of `bytes` as lowercase hex.
#[must_use]
pub fn digest_bytes(bytes: &[u8]) -> String {
    hex_lower(&Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::VerificationResult;

    fn result(name: &str, passed: bool) -> VerificationResult {
        VerificationResult {
            case_name: name.to_string(),
            section: String::from("cursor/flush"),
            stream: String::from("owned"),
            passed,
            expected: String::from("ab"),
            actual: String::from(if passed { "ab" } else { "abc" }),
            expected_error: None,
            actual_error: None,
            bytes_written: 2,
            diff: None,
        }
    }

    fn report() -> ConformanceReport {
        ConformanceReport {
            title: String::from("textstream Conformance Report"),
            timestamp: String::from("2026-10-16T00:00:00.000Z"),
            fixture_digest: digest_bytes(b""),
            summary: VerificationSummary::from_results(vec![result("a", true), result("b", false)]),
        }
    }

    #[test]
    fn empty_digest_is_well_known() {
        assert_eq!(
            digest_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn markdown_lists_cases_and_failures() {
        let md = report().to_markdown();
        assert!(md.starts_with("# textstream Conformance Report"));
        assert!(md.contains("| a | cursor/flush | owned | PASS |"));
        assert!(md.contains("| b | cursor/flush | owned | FAIL |"));
        assert!(md.contains("### b"));
        assert!(md.contains("+abc"));
    }

    #[test]
    fn json_roundtrips() {
        let json = report().to_json();
        let back: ConformanceReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.summary.failed, 1);
        assert_eq!(back.fixture_digest, digest_bytes(b""));
    }
}
