//! Layered configuration.
//!
//! Built-in defaults, then an optional TOML file, then `INSTRUMENT_DASH_*`
//! environment variables (`__` between nested keys, e.g.
//! `INSTRUMENT_DASH_STORE__URL`), then command line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File, FileFormat};
use instrument_types::SampleType;
use serde::Deserialize;

use crate::controller::{window_from_text, ViewSettings};

pub const DEFAULT_STORE_URL: &str = "http://localhost:8020";
pub const DEFAULT_NAMESPACE: &str = "/network/interface/stats";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashConfig {
    pub store: StoreConfig,
    pub view: ViewConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ViewConfig {
    pub namespace: String,
    pub window: String,
    pub transform: String,
    pub metric: Option<String>,
    pub host: Option<String>,
    pub interface: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
    pub level: String,
}

/// Values given on the command line; `None` leaves the layer below alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub store_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl DashConfig {
    /// Load every layer. A file passed explicitly must exist.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("store.url", DEFAULT_STORE_URL)?
            .set_default("store.timeout_secs", 10_u64)?
            .set_default("view.namespace", DEFAULT_NAMESPACE)?
            .set_default("view.window", "12h")?
            .set_default("view.transform", SampleType::default().name())?
            .set_default("log.level", "info")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("INSTRUMENT_DASH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("store.url", overrides.store_url.clone())?
            .set_override_option("store.timeout_secs", overrides.timeout_secs)?
            .set_override_option(
                "log.file",
                overrides
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string()),
            )?
            .build()
            .context("failed to read configuration")?;

        config
            .try_deserialize()
            .context("invalid configuration")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.store.timeout_secs)
    }

    /// Initial view, with the window and transform checked.
    pub fn view_settings(&self) -> Result<ViewSettings> {
        let window_secs = window_from_text(&self.view.window).map_err(|e| anyhow!("view.window: {}", e))?;
        let transform: SampleType = self
            .view
            .transform
            .parse()
            .map_err(|_| anyhow!("view.transform: unknown transform {:?}", self.view.transform))?;

        Ok(ViewSettings {
            namespace: self.view.namespace.clone(),
            metric: self.view.metric.clone(),
            host: self.view.host.clone(),
            interface: self.view.interface.clone(),
            window_secs,
            transform,
        })
    }
}
