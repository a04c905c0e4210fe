//! Settings for the interactive session, read from the environment

use std::path::PathBuf;

pub const PROMPT_VAR: &str = "ENSEMBLE_PROMPT";
pub const HISTORY_VAR: &str = "ENSEMBLE_HISTORY";
pub const NO_BANNER_VAR: &str = "ENSEMBLE_NO_BANNER";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplConfig {
    pub prompt: String,
    /// Line history is loaded from and saved to this file when set
    pub history_file: Option<PathBuf>,
    /// Print the host language line on startup
    pub banner: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        ReplConfig {
            prompt: String::from("user> "),
            history_file: None,
            banner: true,
        }
    }
}

impl ReplConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source, starting from the defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ReplConfig::default();
        ReplConfig {
            prompt: lookup(PROMPT_VAR).unwrap_or(defaults.prompt),
            history_file: lookup(HISTORY_VAR)
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
            banner: lookup(NO_BANNER_VAR).is_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_in(vars: &[(&str, &str)]) -> ReplConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ReplConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        assert_eq!(lookup_in(&[]), ReplConfig::default());
    }

    #[test]
    fn variables_override_defaults() {
        let config = lookup_in(&[
            (PROMPT_VAR, "> "),
            (HISTORY_VAR, "/tmp/history.txt"),
            (NO_BANNER_VAR, "1"),
        ]);
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.history_file, Some(PathBuf::from("/tmp/history.txt")));
        assert!(!config.banner);
    }

    #[test]
    fn empty_history_path_is_ignored() {
        assert_eq!(lookup_in(&[(HISTORY_VAR, "")]).history_file, None);
    }
}
