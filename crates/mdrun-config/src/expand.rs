//! `${VAR}` and `${VAR:-default}` expansion in configuration strings.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// `${VAR}` fails if VAR is unset; `${VAR:-default}` falls back to the
/// default. Bare `$VAR` is left as written.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |name| -> Result<Option<String>, UnsetVar> {
        std::env::var(name).map(Some).map_err(|_| UnsetVar(name.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_set_var() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("MDRUN_EXPAND_SET", "agent/1.0");
        }
        let result = expand_env("${MDRUN_EXPAND_SET}", "images.user_agent").unwrap();
        assert_eq!(result, "agent/1.0");
        unsafe {
            std::env::remove_var("MDRUN_EXPAND_SET");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("MDRUN_EXPAND_UNSET");
        }
        let result = expand_env("${MDRUN_EXPAND_UNSET:-/tmp/images}", "images.cache_dir").unwrap();
        assert_eq!(result, "/tmp/images");
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("MDRUN_EXPAND_HOME", "/home/docs");
        }
        let result = expand_env("${MDRUN_EXPAND_HOME}/.cache/mdrun", "images.cache_dir").unwrap();
        assert_eq!(result, "/home/docs/.cache/mdrun");
        unsafe {
            std::env::remove_var("MDRUN_EXPAND_HOME");
        }
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("MDRUN_EXPAND_MISSING");
        }
        let err = expand_env("${MDRUN_EXPAND_MISSING}", "images.user_agent").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let message = err.to_string();
        assert!(message.contains("MDRUN_EXPAND_MISSING"));
        assert!(message.contains("images.user_agent"));
    }

    #[test]
    fn test_literal_and_bare_dollar_unchanged() {
        assert_eq!(expand_env("mdrun", "f").unwrap(), "mdrun");
        assert_eq!(expand_env("$HOME/cache", "f").unwrap(), "$HOME/cache");
    }
}
