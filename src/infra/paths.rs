// src/infra/paths.rs — Config file location
//
// SCRIBE_HOME overrides the config directory. When unset, config lives in
// ~/.scribe/. Prompt, context and log paths come from the config itself and
// are resolved relative to the working directory.

use std::path::PathBuf;

/// Returns the SCRIBE_HOME override, if set.
fn scribe_home() -> Option<PathBuf> {
    std::env::var_os("SCRIBE_HOME").map(PathBuf::from)
}

/// Home directory, or `.` when it cannot be determined.
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Configuration directory: $SCRIBE_HOME/ or ~/.scribe/
pub fn config_dir() -> PathBuf {
    if let Some(home) = scribe_home() {
        return home;
    }
    dirs_home().join(".scribe")
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_is_toml_in_config_dir() {
        let path = config_file_path();
        assert_eq!(path.file_name().unwrap(), "config.toml");
        assert_eq!(path.parent().unwrap(), config_dir());
    }
}
