pub mod resolve;

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::graph::family::FamilyLayout;
use crate::graph::focal::FocalLayout;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),
    #[error("invalid config root: {0}")]
    InvalidRoot(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config at {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KinfolkConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub layout: FamilyLayout,
    #[serde(default)]
    pub focal: FocalLayout,
    #[serde(default)]
    pub labels: LabelsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub jobs: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelsConfig {
    #[serde(default)]
    pub template: Option<String>,
}
