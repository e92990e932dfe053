use std::path::PathBuf;
use thiserror::Error;

#[cfg(feature = "rich-errors")]
use miette::Diagnostic;

/// Failures surfaced by validation and the policy layer.
#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(Diagnostic))]
pub enum EnforceError {
    /// Required variables could not be resolved or converted. Carries every
    /// affected bound key, in field declaration order.
    #[error("{}", missing_message(.0))]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(
            code(enforcevars::missing_variables),
            help("set the listed keys in the configuration source before starting")
        )
    )]
    MissingVariables(Vec<String>),

    /// The declared type cannot be instantiated. Raised before any key lookup.
    #[error("{type_name} is not a valid configuration type: {reason}")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(code(enforcevars::invalid_target_type))
    )]
    InvalidTargetType { type_name: String, reason: String },

    /// A type was requested from the registry but never registered.
    #[error("No instance of {0} is registered")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(
            code(enforcevars::not_registered),
            help("the type was skipped at startup because required variables were missing")
        )
    )]
    NotRegistered(String),
}

fn missing_message(missing: &[String]) -> String {
    if missing.is_empty() {
        "Required variables are missing.".to_string()
    } else {
        format!("The following variables are missing: {}", missing.join(", "))
    }
}

/// Failures while building one of the bundled configuration sources.
#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(Diagnostic))]
pub enum SourceError {
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
