use std::path::{Path, PathBuf};
use std::{env, fs, io};

use anyhow::{Context, Result};
use clap::Args;
use log::{info, warn};
use serde::de::DeserializeOwned;
use toml::Value;

/// Directories and deployment environment used to locate config files and
/// runtime data.
pub struct PathSet {
    pub config_path: PathBuf,
    pub data_path: PathBuf,

    /// Deployment environment, either `dev` or `prod`. Selects the overlay
    /// file `{name}.{environment}.toml`.
    pub environment: String,
}

impl PathSet {
    const CONFIG_ENV: &'static str = "TODO_SERVICE_CONFIG";
    const DATA_ENV: &'static str = "TODO_SERVICE_DATA";
    const ENVIRONMENT_ENV: &'static str = "APP_ENVIRONMENT";

    pub fn new(config_path: Option<PathBuf>, data_path: Option<PathBuf>) -> Result<Self> {
        let config_path = if let Some(path) = config_path {
            path
        } else if let Ok(path) = env::var(Self::CONFIG_ENV) {
            PathBuf::from(path)
        } else {
            PathBuf::from("config")
        };

        let data_path = if let Some(path) = data_path {
            path
        } else if let Ok(path) = env::var(Self::DATA_ENV) {
            PathBuf::from(path)
        } else {
            PathBuf::from("data")
        };

        fs::create_dir_all(&data_path)
            .with_context(|| format!("ensure data directory: {}", data_path.display()))?;

        let environment = Self::parse_environment(env::var(Self::ENVIRONMENT_ENV).ok());

        Ok(Self {
            config_path,
            data_path,
            environment,
        })
    }

    /// Load `{name}.toml` from the config directory, merge the environment
    /// overlay on top of it, and complete the result.
    ///
    /// This runs before the logger exists, so nothing is logged here. The
    /// returned [`ConfigSource`] is reported once logging is up.
    pub fn load_config<T, F>(&self, name: &str, default_func: F) -> Result<(T, ConfigSource)>
    where
        T: CommonConfig + DeserializeOwned,
        F: FnOnce() -> T,
    {
        let base_path = self.config_path.join(format!("{name}.toml"));
        let overlay_path = self
            .config_path
            .join(format!("{name}.{}.toml", self.environment));
        let base = Self::read_toml(&base_path)?;
        let overlay = Self::read_toml(&overlay_path)?;

        let mut source = ConfigSource {
            name: String::from(name),
            environment: self.environment.clone(),
            files: Vec::new(),
        };
        let mut cfg: T = match (base, overlay) {
            (None, None) => default_func(),
            (base, overlay) => {
                let mut value = match base {
                    Some(base) => {
                        source.files.push(base_path);
                        base
                    }
                    None => Value::Table(Default::default()),
                };
                if let Some(overlay) = overlay {
                    source.files.push(overlay_path);
                    merge_toml(&mut value, overlay);
                }
                value.try_into().context("parse config toml")?
            }
        };

        cfg.complete(self).context("validate config")?;
        Ok((cfg, source))
    }

    fn read_toml(path: &Path) -> Result<Option<Value>> {
        match fs::read_to_string(path) {
            Ok(s) => {
                let value: Value = toml::from_str(&s)
                    .with_context(|| format!("parse config toml: {}", path.display()))?;
                Ok(Some(value))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).context(format!("read config file: {}", path.display())),
        }
    }

    fn parse_environment(value: Option<String>) -> String {
        match value.as_deref() {
            Some("prod") => String::from("prod"),
            Some("dev") | None => String::from("dev"),
            Some(_) => String::from("dev"),
        }
    }
}

/// Command line arguments shared by every entry point that loads config.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// The config directory. Default is `$TODO_SERVICE_CONFIG` or `./config`.
    #[arg(long)]
    pub config_path: Option<String>,

    /// The data directory. Default is `$TODO_SERVICE_DATA` or `./data`.
    #[arg(long)]
    pub data_path: Option<String>,
}

impl ConfigArgs {
    pub fn build_path_set(&self) -> Result<PathSet> {
        PathSet::new(
            self.config_path.as_ref().map(PathBuf::from),
            self.data_path.as_ref().map(PathBuf::from),
        )
    }

    pub fn load<T>(&self, name: &str) -> Result<(T, ConfigSource)>
    where
        T: CommonConfig + DeserializeOwned,
    {
        let ps = self.build_path_set()?;
        ps.load_config(name, T::default)
    }
}

/// Files a config was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSource {
    pub name: String,
    pub environment: String,

    /// Base file first, then the environment overlay. Empty when defaults
    /// were used.
    pub files: Vec<PathBuf>,
}

impl ConfigSource {
    pub fn report(&self) {
        let requested = env::var(PathSet::ENVIRONMENT_ENV).unwrap_or_default();
        if !requested.is_empty() && requested != self.environment {
            warn!(
                "Unknown environment '{requested}', falling back to '{}'",
                self.environment
            );
        }

        if self.files.is_empty() {
            warn!("Config file for {} not found, using defaults", self.name);
            return;
        }
        for file in self.files.iter() {
            info!("Loaded {} config from {}", self.name, file.display());
        }
    }
}

pub trait CommonConfig {
    fn default() -> Self;
    fn complete(&mut self, ps: &PathSet) -> Result<()>;
}

/// See: [`shellexpand::full`].
pub fn expandenv(name: &str, s: impl AsRef<str>) -> Result<String> {
    let s =
        shellexpand::full(s.as_ref()).with_context(|| format!("expand env value for '{name}'"))?;
    Ok(s.to_string())
}

/// Recursively merge `overlay` into `base`. Tables are merged key by key,
/// every other value in the overlay replaces the base value.
pub fn merge_toml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base), Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
