//! Optional file-based configuration, applied beneath explicit CLI flags.

use std::path::{Path, PathBuf};

use clap::ArgMatches;
use clap::parser::ValueSource;
use serde::Deserialize;

use crate::args::MonitorArgs;
use crate::error::{AppError, AppResult, ConfigError};

/// Default config filenames checked when `--config` is not given.
const DEFAULT_CONFIG_FILES: [&str; 2] = ["httpmon.toml", "httpmon.json"];

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub concurrency: Option<i64>,
    pub timeout: Option<f64>,
    pub thinktime: Option<f64>,
    pub interval: Option<f64>,
    pub open: Option<bool>,
    pub count: Option<i64>,
}

/// Loads a configuration file from the provided path or default locations.
///
/// # Errors
///
/// Returns an error when the config file cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> AppResult<Option<ConfigFile>> {
    if let Some(path) = path {
        let path = PathBuf::from(path);
        return Ok(Some(load_config_file(&path)?));
    }

    for candidate in DEFAULT_CONFIG_FILES {
        let candidate = PathBuf::from(candidate);
        if candidate.exists() {
            return Ok(Some(load_config_file(&candidate)?));
        }
    }

    Ok(None)
}

pub(crate) fn load_config_file(path: &Path) -> AppResult<ConfigFile> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        AppError::config(ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseToml {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some("json") => serde_json::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseJson {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some(ext) => Err(AppError::config(ConfigError::UnsupportedExtension {
            ext: ext.to_owned(),
        })),
        None => Err(AppError::config(ConfigError::MissingExtension)),
    }
}

/// Backfills args from the config file. A flag given on the command line
/// always wins over the file.
pub fn apply_config(args: &mut MonitorArgs, matches: &ArgMatches, config: &ConfigFile) {
    if args.url.is_none() {
        args.url.clone_from(&config.url);
    }
    if !set_on_cli(matches, "concurrency")
        && let Some(concurrency) = config.concurrency
    {
        args.concurrency = concurrency;
    }
    if !set_on_cli(matches, "timeout")
        && let Some(timeout) = config.timeout
    {
        args.timeout = timeout;
    }
    if !set_on_cli(matches, "thinktime")
        && let Some(thinktime) = config.thinktime
    {
        args.thinktime = thinktime;
    }
    if !set_on_cli(matches, "interval")
        && let Some(interval) = config.interval
    {
        args.interval = interval;
    }
    if !set_on_cli(matches, "open")
        && let Some(open) = config.open
    {
        args.open = open;
    }
    if args.count.is_none() {
        args.count = config.count;
    }
}

fn set_on_cli(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches};
    use std::io::Write;

    fn parse_with_matches(cli: &[&str]) -> Result<(MonitorArgs, ArgMatches), String> {
        let mut full = vec!["httpmon"];
        full.extend_from_slice(cli);
        let matches = MonitorArgs::command()
            .try_get_matches_from(full)
            .map_err(|err| err.to_string())?;
        let args = MonitorArgs::from_arg_matches(&matches).map_err(|err| err.to_string())?;
        Ok((args, matches))
    }

    fn write_config(dir: &tempfile::TempDir, name: &str, content: &str) -> Result<PathBuf, String> {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).map_err(|err| err.to_string())?;
        file.write_all(content.as_bytes())
            .map_err(|err| err.to_string())?;
        Ok(path)
    }

    #[test]
    fn toml_config_backfills_unset_flags() -> Result<(), String> {
        let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
        let path = write_config(
            &dir,
            "httpmon.toml",
            "url = \"http://localhost:8080/\"\nconcurrency = 7\nthinktime = 0.2\nopen = true\n",
        )?;
        let config = load_config_file(&path).map_err(|err| err.to_string())?;

        let (mut args, matches) = parse_with_matches(&[])?;
        apply_config(&mut args, &matches, &config);

        assert_eq!(args.url.as_deref(), Some("http://localhost:8080/"));
        assert_eq!(args.concurrency, 7);
        assert_eq!(args.thinktime, 0.2);
        assert!(args.open);
        // Untouched fields keep their CLI defaults.
        assert_eq!(args.interval, 1.0);
        Ok(())
    }

    #[test]
    fn explicit_cli_flags_win_over_the_config_file() -> Result<(), String> {
        let config = ConfigFile {
            concurrency: Some(9),
            interval: Some(5.0),
            ..ConfigFile::default()
        };
        let (mut args, matches) = parse_with_matches(&["--concurrency", "3"])?;
        apply_config(&mut args, &matches, &config);

        assert_eq!(args.concurrency, 3);
        assert_eq!(args.interval, 5.0);
        Ok(())
    }

    #[test]
    fn json_config_parses() -> Result<(), String> {
        let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
        let path = write_config(&dir, "httpmon.json", "{\"count\": 500, \"timeout\": 2.0}")?;
        let config = load_config_file(&path).map_err(|err| err.to_string())?;
        assert_eq!(config.count, Some(500));
        assert_eq!(config.timeout, Some(2.0));
        Ok(())
    }

    #[test]
    fn unsupported_extension_is_an_error() -> Result<(), String> {
        let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
        let path = write_config(&dir, "httpmon.yaml", "url: nope\n")?;
        assert!(load_config_file(&path).is_err());
        Ok(())
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        assert!(load_config(Some("/nonexistent/httpmon.toml")).is_err());
    }
}
