//! Pricing file discovery in a drop directory

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// A candidate pricing file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingFile {
    /// Stable identifier used for ingestion state; the file name
    pub file_id: String,
    pub file_name: String,
    pub path: PathBuf,
}

/// Regular files in `dir` named `{prefix}*{suffix}`, sorted by name
pub async fn discover_files(dir: &Path, prefix: &str, suffix: &str) -> Result<Vec<PricingFile>> {
    let mut files = Vec::new();

    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }

        // Non UTF-8 names can never match
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };

        if name.starts_with(prefix) && name.ends_with(suffix) {
            files.push(PricingFile {
                file_id: name.clone(),
                file_name: name,
                path: entry.path(),
            });
        }
    }

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(files)
}

/// Lowercase hex SHA-256 of `data`
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_discover_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in [
            "pricing_by_plant_2026-04-01.csv",
            "pricing_by_plant_2026-03-01.csv",
            "pricing_by_plant_2026-03-01.csv.bak",
            "other.csv",
        ] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        std::fs::create_dir(dir.path().join("pricing_by_plant_dir.csv")).unwrap();

        let files = discover_files(dir.path(), "pricing_by_plant_", ".csv").await.unwrap();
        let names: Vec<_> = files.iter().map(|f| f.file_name.as_str()).collect();

        assert_eq!(
            names,
            vec!["pricing_by_plant_2026-03-01.csv", "pricing_by_plant_2026-04-01.csv"]
        );
        assert_eq!(files[0].file_id, files[0].file_name);
        assert_eq!(files[0].path, dir.path().join("pricing_by_plant_2026-03-01.csv"));
    }

    #[tokio::test]
    async fn test_missing_directory_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(discover_files(&dir.path().join("absent"), "p", ".csv")
            .await
            .is_err());
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"test content"),
            "6ae8a75555209fd6c44157c0aed8016e763ff435a19cf186f76863140143ff72"
        );
    }
}
