use crate::error::ReportError;
use chrono::{DateTime, Utc};
use core_types::{CurrencyPair, ReportPeriod};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Provenance of a generated report, stored next to it as `{artifact}.manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub period: ReportPeriod,
    pub pairs: [CurrencyPair; 2],
    pub rows: usize,
    pub sha256: String,
    pub generated_at: DateTime<Utc>,
}

/// What is on disk for a report, judged against the job that wants it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactState {
    /// No report file exists.
    Missing,
    /// The report file matches its manifest and the requested job.
    Current(Manifest),
    /// A report file exists but cannot be trusted; the reason is for the logs.
    Stale(String),
}

/// The spreadsheet for one month plus its manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    path: PathBuf,
    manifest_path: PathBuf,
}

impl ReportArtifact {
    pub fn new(reports_dir: &Path, period: &ReportPeriod) -> Self {
        let name = period.artifact_name();
        Self {
            path: reports_dir.join(&name),
            manifest_path: reports_dir.join(format!("{name}.manifest.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Decides whether the report on disk can be reused for `period` and `pairs`.
    ///
    /// Only a file whose bytes hash to the value in a matching manifest counts as
    /// current. A file of the right name alone is never enough.
    pub fn inspect(
        &self,
        period: &ReportPeriod,
        pairs: &[CurrencyPair; 2],
    ) -> Result<ArtifactState, ReportError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ArtifactState::Missing),
            Err(e) => return Err(e.into()),
        };

        let manifest_json = match fs::read_to_string(&self.manifest_path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(ArtifactState::Stale("manifest is missing".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let manifest: Manifest = match serde_json::from_str(&manifest_json) {
            Ok(manifest) => manifest,
            Err(e) => return Ok(ArtifactState::Stale(format!("manifest is unreadable: {e}"))),
        };

        if manifest.period != *period {
            return Ok(ArtifactState::Stale(format!(
                "manifest is for period {}, expected {period}",
                manifest.period
            )));
        }
        if manifest.pairs != *pairs {
            return Ok(ArtifactState::Stale(format!(
                "manifest is for {} and {}, expected {} and {}",
                manifest.pairs[0], manifest.pairs[1], pairs[0], pairs[1]
            )));
        }
        let actual = sha256_hex(&bytes);
        if manifest.sha256 != actual {
            return Ok(ArtifactState::Stale(format!(
                "content hash {actual} does not match manifest hash {}",
                manifest.sha256
            )));
        }

        Ok(ArtifactState::Current(manifest))
    }

    /// Writes the report and then its manifest, each as a full atomic replacement.
    ///
    /// The old manifest is removed first, so an interrupted store is always
    /// detected as stale on the next run.
    pub fn store(
        &self,
        period: &ReportPeriod,
        pairs: &[CurrencyPair; 2],
        rows: usize,
        bytes: &[u8],
    ) -> Result<Manifest, ReportError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        match fs::remove_file(&self.manifest_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        write_atomically(&self.path, bytes)?;

        let manifest = Manifest {
            period: *period,
            pairs: pairs.clone(),
            rows,
            sha256: sha256_hex(bytes),
            generated_at: Utc::now(),
        };
        write_atomically(&self.manifest_path, serde_json::to_string_pretty(&manifest)?.as_bytes())?;

        Ok(manifest)
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), ReportError> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, bytes)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pairs() -> [CurrencyPair; 2] {
        ["USD/RUB".parse().unwrap(), "JPY/RUB".parse().unwrap()]
    }

    fn period() -> ReportPeriod {
        ReportPeriod::for_month(2026, 9).unwrap()
    }

    #[test]
    fn artifact_is_named_after_the_month() {
        let artifact = ReportArtifact::new(Path::new("reports"), &period());
        assert_eq!(artifact.path(), Path::new("reports/Report_2026-9.xlsx"));
        assert_eq!(
            artifact.manifest_path(),
            Path::new("reports/Report_2026-9.xlsx.manifest.json")
        );
    }

    #[test]
    fn freshly_stored_artifact_is_current() {
        let dir = TempDir::new().unwrap();
        let artifact = ReportArtifact::new(dir.path(), &period());
        assert_eq!(artifact.inspect(&period(), &pairs()).unwrap(), ArtifactState::Missing);

        let stored = artifact.store(&period(), &pairs(), 3, b"workbook bytes").unwrap();
        assert_eq!(stored.rows, 3);
        assert_eq!(stored.sha256, sha256_hex(b"workbook bytes"));
        assert_eq!(
            artifact.inspect(&period(), &pairs()).unwrap(),
            ArtifactState::Current(stored)
        );
        assert!(!dir.path().join("Report_2026-9.xlsx.tmp").exists());
    }

    #[test]
    fn file_without_manifest_is_stale() {
        let dir = TempDir::new().unwrap();
        let artifact = ReportArtifact::new(dir.path(), &period());
        fs::write(artifact.path(), b"left over from an older run").unwrap();

        assert!(matches!(
            artifact.inspect(&period(), &pairs()).unwrap(),
            ArtifactState::Stale(_)
        ));
    }

    #[test]
    fn modified_file_is_stale() {
        let dir = TempDir::new().unwrap();
        let artifact = ReportArtifact::new(dir.path(), &period());
        artifact.store(&period(), &pairs(), 3, b"original").unwrap();
        fs::write(artifact.path(), b"truncated").unwrap();

        let state = artifact.inspect(&period(), &pairs()).unwrap();
        assert!(matches!(state, ArtifactState::Stale(reason) if reason.contains("hash")));
    }

    #[test]
    fn manifest_for_other_pairs_is_stale() {
        let dir = TempDir::new().unwrap();
        let artifact = ReportArtifact::new(dir.path(), &period());
        artifact.store(&period(), &pairs(), 3, b"original").unwrap();

        let other: [CurrencyPair; 2] = ["EUR/RUB".parse().unwrap(), "JPY/RUB".parse().unwrap()];
        assert!(matches!(
            artifact.inspect(&period(), &other).unwrap(),
            ArtifactState::Stale(_)
        ));
    }

    #[test]
    fn corrupt_manifest_is_stale() {
        let dir = TempDir::new().unwrap();
        let artifact = ReportArtifact::new(dir.path(), &period());
        artifact.store(&period(), &pairs(), 3, b"original").unwrap();
        fs::write(artifact.manifest_path(), b"{ not json").unwrap();

        assert!(matches!(
            artifact.inspect(&period(), &pairs()).unwrap(),
            ArtifactState::Stale(_)
        ));
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        // A directory under the final name makes the rename fail.
        let target = dir.path().join("Report_2026-9.xlsx");
        fs::create_dir(&target).unwrap();

        let result = write_atomically(&target, b"workbook bytes");

        assert!(matches!(result, Err(ReportError::Persistence(_))));
        assert!(!dir.path().join("Report_2026-9.xlsx.tmp").exists());
        assert!(target.is_dir());
    }
}
