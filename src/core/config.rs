//! Configuration errors and environment parsing shared by every config
//! struct in the crate.

use std::str::FromStr;
use thiserror::Error;

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A constant is out of its allowed range.
    #[error("invalid {field} = {value}: {reason}")]
    InvalidValue {
        /// Field name
        field: &'static str,
        /// Rejected value
        value: f32,
        /// Allowed range
        reason: &'static str,
    },

    /// An environment variable could not be parsed.
    #[error("cannot parse {key}={value:?}")]
    InvalidEnv {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
    },

    /// Malformed JSON document.
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Overwrite `target` with `key` if the variable is set.
///
/// An unset variable leaves `target` alone. A set but unparsable one is an
/// error, never a silent fallback.
pub fn env_override<T: FromStr>(key: &'static str, target: &mut T) -> Result<(), ConfigError> {
    if let Ok(raw) = std::env::var(key) {
        *target = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            key,
            value: raw.clone(),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_override_unset_keeps_value() {
        let mut value = 7usize;
        env_override("TTT_GRAPH_TEST_UNSET_KEY", &mut value).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_env_override_parses_and_rejects() {
        let key = "TTT_GRAPH_TEST_OVERRIDE_KEY";
        let mut value = 7usize;

        std::env::set_var(key, " 12 ");
        env_override(key, &mut value).unwrap();
        assert_eq!(value, 12);

        std::env::set_var(key, "twelve");
        let err = env_override(key, &mut value).unwrap_err();
        std::env::remove_var(key);

        match err {
            ConfigError::InvalidEnv { key: k, value: raw } => {
                assert_eq!(k, key);
                assert_eq!(raw, "twelve");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(value, 12);
    }
}
