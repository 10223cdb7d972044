//! Persisting schemas and comparison reports as YAML.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write a value as YAML, creating parent directories as needed.
pub fn save_yaml<T: Serialize>(value: &T, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }

    let yaml = serde_yaml::to_string(value).context("failed to serialize report")?;
    std::fs::write(path, yaml)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    debug!(path = %path.display(), "wrote report");
    Ok(())
}

/// Timestamped file name for a periodic report inside `dir`.
pub fn periodic_report_path(dir: &Path, timestamp: DateTime<Utc>) -> PathBuf {
    dir.join(format!(
        "periodic_report_{}.yaml",
        timestamp.format("%Y%m%d_%H%M%S")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use diff_core::ComparisonResult;
    use std::collections::BTreeMap;

    fn result() -> ComparisonResult {
        ComparisonResult {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
            records_processed: 10,
            source1_records: 5,
            source2_records: 5,
            matching_keys: 4,
            identical_rows: 3,
            keys_only_in_source1: vec!["7".to_string()],
            keys_only_in_source2: Vec::new(),
            value_diffs: BTreeMap::new(),
            is_periodic_report: false,
        }
    }

    #[test]
    fn saves_into_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/final/final_report.yaml");

        save_yaml(&result(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("records_processed: 10"));
        assert!(contents.contains("keys_only_in_source1"));
        // Empty collections are omitted from the report.
        assert!(!contents.contains("keys_only_in_source2"));
    }

    #[test]
    fn periodic_names_embed_the_timestamp() {
        let timestamp = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        let path = periodic_report_path(Path::new("periodic_reports"), timestamp);
        assert_eq!(
            path,
            Path::new("periodic_reports/periodic_report_20260314_092653.yaml")
        );
    }
}
