//! Runtime settings read from the environment.

use std::{env, path::PathBuf, time::Duration};

use crate::{Error, Result, store::DATA_FILE};

/// Settings shared by the `scrape` and `serve` binaries.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Where the filename record is kept (`PICTURE_DATA_FILE`).
    pub data_file: PathBuf,
    /// Directory downloaded images are written to (`PICTURE_OUTPUT_DIR`).
    pub output_dir: PathBuf,
    /// Port the web surface listens on (`PICTURE_PORT`).
    pub port: u16,
    /// Period of the unattended re-scrape (`PICTURE_SCRAPE_INTERVAL_SECS`).
    pub scrape_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DATA_FILE),
            output_dir: PathBuf::from("."),
            port: 8080,
            scrape_interval: Duration::from_secs(60 * 60),
        }
    }
}

impl Config {
    /// Reads the process environment, falling back to defaults for unset keys.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = lookup("PICTURE_DATA_FILE") {
            config.data_file = PathBuf::from(path);
        }
        if let Some(dir) = lookup("PICTURE_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(port) = lookup("PICTURE_PORT") {
            config.port = port
                .parse()
                .map_err(|_| Error::Config(format!("PICTURE_PORT is not a port: {port}")))?;
        }
        if let Some(secs) = lookup("PICTURE_SCRAPE_INTERVAL_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                Error::Config(format!("PICTURE_SCRAPE_INTERVAL_SECS is not a number: {secs}"))
            })?;
            if secs == 0 {
                return Err(Error::Config(
                    "PICTURE_SCRAPE_INTERVAL_SECS must be positive".to_string(),
                ));
            }
            config.scrape_interval = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.data_file, PathBuf::from("image_data.json"));
        assert_eq!(config.scrape_interval, Duration::from_secs(3600));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PICTURE_DATA_FILE", "/tmp/record.json"),
            ("PICTURE_OUTPUT_DIR", "downloads"),
            ("PICTURE_PORT", "3000"),
            ("PICTURE_SCRAPE_INTERVAL_SECS", "90"),
        ]))
        .unwrap();
        assert_eq!(config.data_file, PathBuf::from("/tmp/record.json"));
        assert_eq!(config.output_dir, PathBuf::from("downloads"));
        assert_eq!(config.port, 3000);
        assert_eq!(config.scrape_interval, Duration::from_secs(90));
    }

    #[test]
    fn test_bad_port() {
        let result = Config::from_lookup(lookup(&[("PICTURE_PORT", "eighty")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = Config::from_lookup(lookup(&[("PICTURE_SCRAPE_INTERVAL_SECS", "0")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
