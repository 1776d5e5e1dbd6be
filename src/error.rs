use thiserror::Error;

/// Startup-time configuration errors. These are fatal: the process exits
/// non-zero and the outside supervisor decides whether to restart.
///
/// Store and transport failures never surface here — they are handled per
/// cycle (backoff) or per row (folded into the row's outcome) by design.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = RelayError::Config("downstream_target must be set".into());
        assert_eq!(err.to_string(), "Config error: downstream_target must be set");
    }

    #[test]
    fn toml_error_converts() {
        let parse_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: RelayError = parse_err.into();
        assert!(matches!(err, RelayError::Toml(_)));
    }
}
