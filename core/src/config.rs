use crate::{clock::PortalClock, seed::RecordStore, session::Directory};
use serde::{Deserialize, Serialize};

/// Which data service answers portal calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// In-memory records and the keyword query interpreter.
    Mock,
    /// SQLite executor seeded with the same records.
    Sqlite,
}

impl std::str::FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "mock" => Ok(Backend::Mock),
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(anyhow::anyhow!("Unknown backend '{other}' (expected mock or sqlite)")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub backend:        Backend,
    /// SQLite path for the sqlite backend; `:memory:` for a throwaway db.
    pub database:       String,
    /// Flat simulated latency for every mock call, in milliseconds.
    /// `None` keeps the per-operation defaults.
    pub latency_ms:     Option<u64>,
    /// Optional JSON dataset replacing the compiled-in records.
    pub seed_file:      Option<String>,
    /// Optional JSON login directory replacing the demo logins.
    pub directory_file: Option<String>,
    pub clock:          PortalClock,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            backend:        Backend::Mock,
            database:       ":memory:".into(),
            latency_ms:     None,
            seed_file:      None,
            directory_file: None,
            clock:          PortalClock::System,
        }
    }
}

impl PortalConfig {
    /// Load from a JSON config file. Absent keys keep their defaults.
    /// In tests, use PortalConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: PortalConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        log::debug!("loaded config from {path}: {config:?}");
        Ok(config)
    }

    /// Mock backend, no latency, clock frozen at the seed data's era.
    pub fn default_test() -> Self {
        Self {
            latency_ms: Some(0),
            clock: PortalClock::parse_fixed("2025-03-01 00:00:00").unwrap_or_default(),
            ..Self::default()
        }
    }

    /// The dataset this config points at.
    pub fn records(&self) -> anyhow::Result<RecordStore> {
        match &self.seed_file {
            Some(path) => RecordStore::load_json(path),
            None => Ok(RecordStore::seeded()),
        }
    }

    pub fn directory(&self) -> anyhow::Result<Directory> {
        match &self.directory_file {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
                serde_json::from_str(&content)
                    .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))
            }
            None => Ok(Directory::demo()),
        }
    }
}
