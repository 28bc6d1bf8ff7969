use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Platform-specific config and data locations for an application name
///
/// Follows XDG on Linux, `~/Library/Application Support` on macOS and
/// `%APPDATA%` on Windows, as resolved by `directories`.
pub struct ProjectPaths {
    dirs: ProjectDirs,
}

impl ProjectPaths {
    /// Returns None when no home directory can be determined
    pub fn new(name: &str) -> Option<Self> {
        ProjectDirs::from("", "", name).map(|dirs| ProjectPaths { dirs })
    }

    pub fn config_dir(&self) -> &Path {
        self.dirs.config_dir()
    }

    pub fn data_dir(&self) -> &Path {
        self.dirs.data_dir()
    }

    /// Directory log files are written to
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_contain_name() {
        if let Some(paths) = ProjectPaths::new("mcjs") {
            assert!(paths.config_dir().to_string_lossy().contains("mcjs"));
            assert!(paths.data_dir().to_string_lossy().contains("mcjs"));
            assert!(paths.log_dir().ends_with("logs"));
        }
    }
}
