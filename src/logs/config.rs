use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig, PathSet};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_name")]
    pub name: LogName,

    #[serde(default = "LogConfig::default_level")]
    pub level: LogLevel,

    /// Only used when `name` is `file`. Default: {data_path}/server.log
    #[serde(default = "LogConfig::default_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub enum LogName {
    #[serde(rename = "stdout")]
    Stdout,
    #[serde(rename = "stderr")]
    Stderr,
    #[serde(rename = "file")]
    File,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub enum LogLevel {
    #[serde(rename = "debug")]
    Debug,
    #[serde(rename = "info")]
    Info,
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "warning", alias = "warn")]
    Warning,
}

impl CommonConfig for LogConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            level: Self::default_level(),
            path: Self::default_path(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        if !matches!(self.name, LogName::File) {
            return Ok(());
        }

        self.path = expandenv("path", &self.path)?;
        if self.path.is_empty() {
            let path = ps.data_path.join("server.log");
            self.path = format!("{}", path.display());
        }
        if self.path.ends_with('/') {
            bail!("log path '{}' should be a file, not a directory", self.path);
        }

        Ok(())
    }
}

impl LogConfig {
    pub fn default_name() -> LogName {
        LogName::Stdout
    }

    pub fn default_level() -> LogLevel {
        LogLevel::Info
    }

    pub fn default_path() -> String {
        String::new()
    }
}
