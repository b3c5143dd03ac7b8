use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Default standin data directory: ~/.standin
pub fn data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".standin"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.standin/config.toml (highest)
    let home_config = data_dir()?.join("config.toml");

    // Priority 2: ./standin.toml (current directory)
    let local_config = Path::new("standin.toml");

    let mut cfg: AppConfig = if home_config.exists() {
        let s = std::fs::read_to_string(&home_config)?;
        toml::from_str::<AppConfig>(&s)?
    } else if local_config.exists() {
        let s = std::fs::read_to_string(local_config)?;
        toml::from_str::<AppConfig>(&s)?
    } else {
        AppConfig::default()
    };

    // Environment variable overrides (Priority 0: highest)
    if let Some(v) = bool_env("STANDIN_IGNORE_NEWLINE") {
        cfg.switch.ignore_leading_newline = v;
    }
    if let Some(v) = bool_env("STANDIN_SWITCH_BY_TERMINAL") {
        cfg.switch.by_terminal = v;
    }

    Ok(cfg)
}

fn bool_env(key: &str) -> Option<bool> {
    match std::env::var(key).ok()?.trim() {
        "1" | "true" | "TRUE" | "True" => Some(true),
        "0" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_the_switch_permissive() {
        let cfg = AppConfig::default();
        assert!(cfg.switch.ignore_leading_newline);
        assert!(cfg.switch.by_terminal);
        assert!(cfg.logging.enabled);
        assert!(!cfg.logging.file);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [switch]
            by_terminal = false
            "#,
        )
        .unwrap();
        assert!(!cfg.switch.by_terminal);
        assert!(cfg.switch.ignore_leading_newline);
        assert_eq!(cfg.logging.level, "warn");
    }

    #[test]
    fn bool_env_parses_common_spellings() {
        std::env::set_var("STANDIN_TEST_BOOL_ENV", "false");
        assert_eq!(bool_env("STANDIN_TEST_BOOL_ENV"), Some(false));
        std::env::set_var("STANDIN_TEST_BOOL_ENV", "1");
        assert_eq!(bool_env("STANDIN_TEST_BOOL_ENV"), Some(true));
        std::env::set_var("STANDIN_TEST_BOOL_ENV", "maybe");
        assert_eq!(bool_env("STANDIN_TEST_BOOL_ENV"), None);
        std::env::remove_var("STANDIN_TEST_BOOL_ENV");
    }
}
