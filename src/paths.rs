//! Canonical settings file enumeration.

use std::path::{Path, PathBuf};

/// Enumerates the candidate settings files under `root` for `environment`,
/// in merge order: the three shared files, then their `.local` counterparts.
///
/// The `.local` variants are omitted for the `test` environment so test runs
/// stay reproducible across machines. This ordering is a compatibility
/// contract; do not reorder.
pub fn setting_files(root: impl AsRef<Path>, environment: &str) -> Vec<PathBuf> {
    let root = root.as_ref();
    let mut files = vec![
        root.join("settings.yml"),
        root.join("settings").join(format!("{environment}.yml")),
        root.join("environments").join(format!("{environment}.yml")),
    ];
    if environment != "test" {
        files.push(root.join("settings.local.yml"));
        files.push(root.join("settings").join(format!("{environment}.local.yml")));
        files.push(
            root.join("environments")
                .join(format!("{environment}.local.yml")),
        );
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_includes_all_six_in_order() {
        let files = setting_files("root/config", "staging");
        let expected: Vec<PathBuf> = [
            "root/config/settings.yml",
            "root/config/settings/staging.yml",
            "root/config/environments/staging.yml",
            "root/config/settings.local.yml",
            "root/config/settings/staging.local.yml",
            "root/config/environments/staging.local.yml",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(files, expected);
    }

    #[test]
    fn test_test_environment_excludes_local_variants() {
        let files = setting_files("root/config", "test");
        assert_eq!(files.len(), 3);
        assert!(files
            .iter()
            .all(|f| !f.to_string_lossy().contains(".local.")));
    }
}
