use std::env;
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, KinfolkConfig};

pub const CONFIG_DIR: &str = ".kinfolk";
pub const CONFIG_FILE: &str = "config.toml";

/// A loaded configuration together with the directory snapshot sources are
/// relative to.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub root: PathBuf,
    pub config_path: Option<PathBuf>,
    pub config: KinfolkConfig,
}

/// Resolution order: explicit path, `KINFOLK_CONFIG`, then the nearest
/// `.kinfolk/config.toml` above `start`. Falls back to defaults rooted at
/// `start` when nothing is found.
pub fn resolve_config_with_overrides(
    start: impl AsRef<Path>,
    config_path: Option<PathBuf>,
) -> Result<ResolvedConfig, ConfigError> {
    let start = start.as_ref();
    let mut resolved = if let Some(path) = config_path {
        load_explicit(absolutize(start, path))?
    } else if let Ok(path) = env::var("KINFOLK_CONFIG") {
        load_explicit(absolutize(start, PathBuf::from(path)))?
    } else if let Some(path) = find_config_from(start) {
        load_explicit(path)?
    } else {
        tracing::debug!(start = %start.display(), "no config file found, using defaults");
        ResolvedConfig {
            root: start.to_path_buf(),
            config_path: None,
            config: KinfolkConfig::default(),
        }
    };

    apply_env_overrides(&mut resolved.config);
    Ok(resolved)
}

pub fn load_config(path: &Path) -> Result<KinfolkConfig, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

fn load_explicit(path: PathBuf) -> Result<ResolvedConfig, ConfigError> {
    let config = load_config(&path)?;
    let root = infer_root_from_config(&path).ok_or_else(|| ConfigError::InvalidRoot(path.clone()))?;
    tracing::debug!(config = %path.display(), root = %root.display(), "loaded config");
    Ok(ResolvedConfig {
        root,
        config_path: Some(path),
        config,
    })
}

fn apply_env_overrides(config: &mut KinfolkConfig) {
    if let Some(value) = env::var_os("KINFOLK_DATA") {
        let sources: Vec<String> = env::split_paths(&value)
            .map(|path| path.to_string_lossy().to_string())
            .filter(|path| !path.is_empty())
            .collect();
        if !sources.is_empty() {
            config.data.sources = sources;
        }
    }
}

fn absolutize(start: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        start.join(path)
    }
}

fn infer_root_from_config(config_path: &Path) -> Option<PathBuf> {
    let parent = config_path.parent()?;
    if parent.file_name()? == CONFIG_DIR {
        return parent.parent().map(|p| p.to_path_buf());
    }

    Some(parent.to_path_buf())
}

fn find_config_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|ancestor| ancestor.join(CONFIG_DIR).join(CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}
