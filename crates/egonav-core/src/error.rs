//! Load-time errors.
//!
//! The exploration engine itself never fails: a transition that references an
//! unknown id is a no-op. Errors only arise while reading a dataset or a
//! config file, before a session exists.

use std::fmt;
use std::path::PathBuf;

/// Stable identifiers for load failures, shared by the CLI's text and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    DatasetNotFound,
    DatasetParseError,
    DatasetEmpty,
    ConfigReadError,
    ConfigParseError,
    ConfigInvalid,
    NodeNotFound,
}

impl ErrorCode {
    /// `E1xxx` dataset, `E2xxx` config, `E3xxx` lookup.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::DatasetNotFound => "E1001",
            Self::DatasetParseError => "E1002",
            Self::DatasetEmpty => "E1003",
            Self::ConfigReadError => "E2001",
            Self::ConfigParseError => "E2002",
            Self::ConfigInvalid => "E2003",
            Self::NodeNotFound => "E3001",
        }
    }

    /// One-line summary.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::DatasetNotFound => "Dataset file not found",
            Self::DatasetParseError => "Dataset parse error",
            Self::DatasetEmpty => "Dataset has no nodes",
            Self::ConfigReadError => "Config file could not be read",
            Self::ConfigParseError => "Config file parse error",
            Self::ConfigInvalid => "Config value out of range",
            Self::NodeNotFound => "Node not found",
        }
    }

    /// What the user can do about it.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::DatasetNotFound => Some("Pass the path of a graph JSON export."),
            Self::DatasetParseError => {
                Some("The dataset must be a JSON object with `nodes` and `links` (or `edges`).")
            }
            Self::DatasetEmpty => Some("Export the graph again; it contains no entities."),
            Self::ConfigReadError => Some("Check the path and permissions of the config file."),
            Self::ConfigParseError => Some("Fix syntax in egonav.toml and retry."),
            Self::ConfigInvalid => {
                Some("Caps must be at least 1 and opacities must lie within [0, 1].")
            }
            Self::NodeNotFound => Some("Use `egonav stats` to list entity types, or search by name."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failure to read or decode a graph dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("dataset contains no nodes")]
    Empty,
}

impl DatasetError {
    /// Map to the stable [`ErrorCode`].
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::DatasetNotFound,
            Self::Parse(_) => ErrorCode::DatasetParseError,
            Self::Empty => ErrorCode::DatasetEmpty,
        }
    }
}

/// Failure to read, decode or validate an explorer config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    /// Map to the stable [`ErrorCode`].
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::ConfigReadError,
            Self::Parse { .. } => ErrorCode::ConfigParseError,
            Self::Invalid { .. } => ErrorCode::ConfigInvalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::DatasetNotFound,
            ErrorCode::DatasetParseError,
            ErrorCode::DatasetEmpty,
            ErrorCode::ConfigReadError,
            ErrorCode::ConfigParseError,
            ErrorCode::ConfigInvalid,
            ErrorCode::NodeNotFound,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::ConfigInvalid.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn dataset_errors_map_to_codes() {
        assert_eq!(DatasetError::Empty.code(), ErrorCode::DatasetEmpty);
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(DatasetError::from(parse).code(), ErrorCode::DatasetParseError);
    }
}
