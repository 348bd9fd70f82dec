//! Error types for the interest finder.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Remote URL missing, unresolvable, or unsupported; bad interests file.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote query command could not be run or exited non-zero.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Parse error on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
