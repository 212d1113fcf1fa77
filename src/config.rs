use std::fs;
use std::path::{Path,PathBuf};

use serde::Deserialize;
use chrono::naive::NaiveDate;
use tracing::info;

use super::error::Result;
use super::metrics::Settings;


#[derive(Clone,Debug,PartialEq,Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: PathBuf,
    pub home: String,
    /// Report date to show; the latest one when unset.
    pub as_of: Option<NaiveDate>,
    pub days_to_show: usize,
    pub chart_dir: PathBuf,
    pub metrics: Settings,
    pub notifications: Notifications,
}

#[derive(Clone,Debug,PartialEq,Deserialize)]
#[serde(default)]
pub struct Notifications {
    pub welcome_ms: u64,
    pub copy_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
	Self {
	    database: PathBuf::from("data/reports.json"),
	    home: "ukr".to_string(),
	    as_of: None,
	    days_to_show: 14,
	    chart_dir: PathBuf::from("charts"),
	    metrics: Settings::default(),
	    notifications: Notifications::default(),
	}
    }
}

impl Default for Notifications {
    fn default() -> Self {
	Self { welcome_ms: 15000, copy_ms: 3000 }
    }
}


impl Config {

    pub fn load(path: &Path) -> Result<Self> {
	let config = Self::from_str(&fs::read_to_string(path)?)?;
	info!("Loaded configuration from {}", path.display());
	Ok(config)
    }

    pub fn from_str(text: &str) -> Result<Self> {
	Ok(toml::from_str(text)?)
    }

}
