//! Pre-staging checks: file count, per-file size and accepted types.
//!
//! Runs before anything reaches the [`StagingStore`](super::store::StagingStore);
//! the store itself never validates.

use std::path::Path;

/// Default maximum number of files per session.
pub const DEFAULT_MAX_FILES: usize = 10;
/// Default maximum size of one file in megabytes.
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 5;
/// Default accept list: any image plus common document formats.
pub const DEFAULT_ACCEPTED: &[&str] = &["image/*", ".pdf", ".doc", ".docx"];

/// A file the user asked to stage, described before its bytes are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub size_bytes: u64,
    pub mime: String,
}

/// Limits applied to incoming files.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    pub max_files: usize,
    pub max_file_size_mb: u64,
    pub accepted: Vec<String>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            accepted: DEFAULT_ACCEPTED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Outcome of validating one batch.
#[derive(Debug, Default)]
pub struct ValidationReport<T> {
    pub accepted: Vec<T>,
    pub errors: Vec<String>,
}

impl ValidationRules {
    fn max_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    /// Whether `candidate` matches one of the accept patterns.
    ///
    /// `type/*` matches a mime prefix, `.ext` matches the file extension and
    /// anything else must equal the mime type exactly. An empty accept list
    /// accepts everything.
    pub fn accepts(&self, candidate: &Candidate) -> bool {
        if self.accepted.is_empty() {
            return true;
        }
        let ext = Path::new(&candidate.name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());
        self.accepted.iter().any(|pattern| {
            if let Some(prefix) = pattern.strip_suffix("/*") {
                candidate
                    .mime
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
            } else if let Some(want) = pattern.strip_prefix('.') {
                ext.as_deref() == Some(want.to_lowercase().as_str())
            } else {
                candidate.mime == *pattern
            }
        })
    }

    /// Filter a batch against the session's current size.
    ///
    /// A batch that would overflow `max_files` is cut down to the remaining
    /// capacity; survivors are then checked for type and size individually.
    pub fn validate<T>(
        &self,
        already_staged: usize,
        batch: Vec<T>,
        describe: impl Fn(&T) -> &Candidate,
    ) -> ValidationReport<T> {
        let mut report = ValidationReport {
            accepted: Vec::new(),
            errors: Vec::new(),
        };

        let capacity = self.max_files.saturating_sub(already_staged);
        let mut batch = batch;
        if batch.len() > capacity {
            report
                .errors
                .push(format!("Maximum {} files allowed", self.max_files));
            batch.truncate(capacity);
        }

        for entry in batch {
            let candidate = describe(&entry);
            if !self.accepts(candidate) {
                report
                    .errors
                    .push(format!("{} is not a supported file type", candidate.name));
                continue;
            }
            if candidate.size_bytes > self.max_bytes() {
                report.errors.push(format!(
                    "{} is too large (max {}MB)",
                    candidate.name, self.max_file_size_mb
                ));
                continue;
            }
            report.accepted.push(entry);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, mime: &str, size: u64) -> Candidate {
        Candidate {
            name: name.into(),
            size_bytes: size,
            mime: mime.into(),
        }
    }

    fn run(rules: &ValidationRules, staged: usize, batch: Vec<Candidate>) -> ValidationReport<Candidate> {
        rules.validate(staged, batch, |c| c)
    }

    #[test]
    fn accepts_images_and_documents() {
        let rules = ValidationRules::default();
        assert!(rules.accepts(&candidate("a.png", "image/png", 1)));
        assert!(rules.accepts(&candidate("b.PDF", "application/pdf", 1)));
        assert!(rules.accepts(&candidate("c.docx", "application/octet-stream", 1)));
        assert!(!rules.accepts(&candidate("d.exe", "application/x-msdownload", 1)));
    }

    #[test]
    fn mime_wildcard_needs_full_segment() {
        let rules = ValidationRules {
            accepted: vec!["image/*".into()],
            ..Default::default()
        };
        assert!(!rules.accepts(&candidate("x", "imagery/png", 1)));
    }

    #[test]
    fn empty_accept_list_accepts_anything() {
        let rules = ValidationRules {
            accepted: Vec::new(),
            ..Default::default()
        };
        assert!(rules.accepts(&candidate("x.bin", "application/octet-stream", 1)));
    }

    #[test]
    fn oversize_file_is_dropped_with_message() {
        let rules = ValidationRules::default();
        let report = run(
            &rules,
            0,
            vec![
                candidate("small.png", "image/png", 1024),
                candidate("huge.png", "image/png", 6 * 1024 * 1024),
            ],
        );
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.accepted[0].name, "small.png");
        assert_eq!(report.errors.last().map(String::as_str), Some("huge.png is too large (max 5MB)"));
    }

    #[test]
    fn exactly_max_size_is_allowed() {
        let rules = ValidationRules::default();
        let report = run(&rules, 0, vec![candidate("edge.png", "image/png", 5 * 1024 * 1024)]);
        assert_eq!(report.accepted.len(), 1);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn batch_is_truncated_to_remaining_capacity() {
        let rules = ValidationRules::default();
        let batch: Vec<Candidate> = (0..5)
            .map(|i| candidate(&format!("{}.png", i), "image/png", 10))
            .collect();
        let report = run(&rules, 8, batch);
        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.accepted[1].name, "1.png");
        assert_eq!(report.errors, vec!["Maximum 10 files allowed".to_string()]);
    }

    #[test]
    fn full_session_accepts_nothing() {
        let rules = ValidationRules::default();
        let report = run(&rules, 10, vec![candidate("a.png", "image/png", 1)]);
        assert!(report.accepted.is_empty());
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn unsupported_type_reported() {
        let rules = ValidationRules::default();
        let report = run(&rules, 0, vec![candidate("run.sh", "application/x-sh", 1)]);
        assert!(report.accepted.is_empty());
        assert_eq!(report.errors.last().map(String::as_str), Some("run.sh is not a supported file type"));
    }

    #[test]
    fn huge_size_limit_saturates() {
        let rules = ValidationRules {
            max_file_size_mb: u64::MAX,
            ..Default::default()
        };
        let report = run(&rules, 0, vec![candidate("big.png", "image/png", u64::MAX)]);
        assert_eq!(report.accepted.len(), 1);
        assert!(report.errors.is_empty());
    }
}
