//! File handling for wylmo.
//!
//! This module reads the settings file and persists the raw output of every
//! probe attempt into the per-test log directory.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::debug;

use crate::config::Settings;
use crate::error::{Error, Result};

/// Timestamp format for log file names; no colons so the names are portable.
const LOG_FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

fn get_settings_reader(config_path: &str) -> Result<Option<File>> {
    if !Path::exists(Path::new(config_path)) {
        return Ok(None);
    }

    match File::open(config_path) {
        Ok(f) => Ok(Some(f)),
        Err(e) => Err(Error::file_error(
            "settings".to_string(),
            config_path.to_string(),
            e,
        )),
    }
}

/// Reads the settings file, falling back to defaults when it does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - The file exists but cannot be read
/// - The file contains invalid YAML
/// - The settings fail validation
pub fn get_settings(config_path: &str) -> Result<Settings> {
    let Some(reader) = get_settings_reader(config_path)? else {
        debug!("No settings file at `{config_path}`, using defaults");
        return Ok(Settings::default());
    };

    let settings: Settings = serde_yaml::from_reader(reader).map_err(|e| {
        Error::yaml_error(
            "reading".to_string(),
            "settings".to_string(),
            config_path.to_string(),
            e,
        )
    })?;

    settings.validate()?;
    Ok(settings)
}

/// Creates `<log_root>/<directory_name>`, accepting an existing directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_log_directory(log_root: &Path, directory_name: &str) -> Result<PathBuf> {
    let directory = log_root.join(directory_name);

    fs::create_dir_all(&directory).map_err(|e| {
        Error::file_error(
            "log directory".to_string(),
            directory.display().to_string(),
            e,
        )
    })?;

    Ok(directory)
}

/// Log file name for an attempt started at `time`.
#[must_use]
pub fn log_file_name(time: &DateTime<Local>) -> String {
    format!("{}.log", time.format(LOG_FILE_TIMESTAMP_FORMAT))
}

/// Writes the output of one attempt into `directory`, returning the file path.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_probe_log(directory: &Path, time: &DateTime<Local>, output: &[u8]) -> Result<PathBuf> {
    let path = directory.join(log_file_name(time));

    fs::write(&path, output).map_err(|e| {
        Error::file_error("probe log".to_string(), path.display().to_string(), e)
    })?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_file_name_has_no_colons() {
        let time = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let name = log_file_name(&time);
        assert_eq!(name, "2024-03-05T14-07-09.000.log");
        assert!(!name.contains(':'));
    }

    #[test]
    fn test_missing_settings_file_gives_defaults() {
        let settings = get_settings("/definitely/not/here/config.yml").unwrap();
        assert_eq!(settings, Settings::default());
    }
}
