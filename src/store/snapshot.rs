use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::member::Member;
use crate::store::traits::MemberRepository;
use crate::store::{Result, StoreError};
use crate::util::parallel::run_in_parallel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
    Toml,
}

impl SnapshotFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(SnapshotFormat::Json),
            "yaml" | "yml" => Some(SnapshotFormat::Yaml),
            "toml" => Some(SnapshotFormat::Toml),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    List(Vec<Member>),
    Wrapped { members: Vec<Member> },
}

impl SnapshotDocument {
    fn into_members(self) -> Vec<Member> {
        match self {
            SnapshotDocument::List(members) => members,
            SnapshotDocument::Wrapped { members } => members,
        }
    }
}

#[derive(Deserialize)]
struct TomlSnapshot {
    #[serde(default)]
    members: Vec<Member>,
}

pub fn parse_snapshot(path: &Path, content: &str) -> Result<Vec<Member>> {
    let format = SnapshotFormat::from_path(path)
        .ok_or_else(|| StoreError::UnsupportedFormat(path.to_path_buf()))?;
    let members = match format {
        SnapshotFormat::Json => serde_json::from_str::<SnapshotDocument>(content)
            .map_err(|source| StoreError::Json {
                path: path.to_path_buf(),
                source,
            })?
            .into_members(),
        SnapshotFormat::Yaml => serde_yaml::from_str::<SnapshotDocument>(content)
            .map_err(|source| StoreError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
            .into_members(),
        SnapshotFormat::Toml => {
            toml::from_str::<TomlSnapshot>(content)
                .map_err(|source| StoreError::Toml {
                    path: path.to_path_buf(),
                    source,
                })?
                .members
        }
    };
    Ok(members)
}

pub fn read_snapshot(path: &Path) -> Result<Vec<Member>> {
    let content = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let members = parse_snapshot(path, &content)?;
    tracing::debug!(path = %path.display(), members = members.len(), "read snapshot");
    Ok(members)
}

/// Member snapshots stored as files. Sources are glob patterns relative to
/// `root`; matching files are concatenated in sorted path order.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
    sources: Vec<String>,
    jobs: Option<usize>,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>, sources: Vec<String>) -> Self {
        Self {
            root: root.into(),
            sources,
            jobs: None,
        }
    }

    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn files(&self) -> Result<Vec<PathBuf>> {
        if self.sources.is_empty() {
            return Err(StoreError::NoSources);
        }

        let mut files = Vec::new();
        for source in &self.sources {
            let pattern = if Path::new(source).is_absolute() {
                source.clone()
            } else {
                self.root.join(source).to_string_lossy().to_string()
            };
            let paths = glob::glob(&pattern).map_err(|err| StoreError::Pattern {
                pattern: source.clone(),
                source: err,
            })?;
            let mut matched: Vec<PathBuf> = paths
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(err) => {
                        tracing::warn!(error = %err, "skipping unreadable snapshot path");
                        None
                    }
                })
                .filter(|path| path.is_file())
                .collect();
            if matched.is_empty() {
                return Err(StoreError::NoMatch(source.clone()));
            }
            matched.sort();
            for path in matched {
                if !files.contains(&path) {
                    files.push(path);
                }
            }
        }
        Ok(files)
    }
}

impl MemberRepository for SnapshotStore {
    fn members(&self) -> Result<Vec<Member>> {
        let files = self.files()?;
        let results = run_in_parallel(files, self.jobs, |path| read_snapshot(&path));
        let mut members = Vec::new();
        for result in results {
            members.extend(result?);
        }
        Ok(members)
    }
}
