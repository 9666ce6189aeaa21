use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_DATABASE: &str = "leaderboard_db";
pub const DEFAULT_CATEGORY: &str = "yeetcode";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set when STORE_BACKEND=mongo")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend: StoreBackend,
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,
    pub top_n: usize,
    pub default_category: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            backend: StoreBackend::Memory,
            mongodb_uri: None,
            mongodb_database: DEFAULT_DATABASE.to_string(),
            top_n: DEFAULT_TOP_N,
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let top_n = parse_or("LEADERBOARD_TOP_N", lookup("LEADERBOARD_TOP_N"), DEFAULT_TOP_N)?;
        if top_n == 0 {
            return Err(ConfigError::Invalid { name: "LEADERBOARD_TOP_N", value: "0".to_string() });
        }

        let backend = match lookup("STORE_BACKEND") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "STORE_BACKEND", value: raw })?,
            None => StoreBackend::Mongo,
        };

        let mongodb_uri = lookup("MONGODB_URI").filter(|uri| !uri.is_empty());
        if backend == StoreBackend::Mongo && mongodb_uri.is_none() {
            return Err(ConfigError::Missing("MONGODB_URI"));
        }

        Ok(Config {
            port,
            backend,
            mongodb_uri,
            mongodb_database: lookup("MONGODB_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            top_n,
            default_category: lookup("DEFAULT_CATEGORY")
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        })
    }
}

fn parse_or<T: std::str::FromStr>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
