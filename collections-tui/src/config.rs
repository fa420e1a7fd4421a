//! Backend address resolution.
//!
//! The base URL is never hardcoded: it comes from the `--base-url` flag, the
//! `BACKEND_URL` environment variable (a `.env` file is honored via dotenvy)
//! or `~/.config/collections-tui/config.toml`, in that order.

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
}

impl Config {
    pub fn load(flag: Option<String>) -> Result<Self> {
        let env = std::env::var("BACKEND_URL").ok();
        let file = read_file_config()?;
        let base_url = resolve_base_url(flag, env, file.base_url).context(
            "no backend URL configured; pass --base-url, set BACKEND_URL, \
             or add base_url to ~/.config/collections-tui/config.toml",
        )?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

fn read_file_config() -> Result<FileConfig> {
    let Some(dir) = dirs::config_dir() else {
        return Ok(FileConfig::default());
    };
    let path = dir.join("collections-tui").join("config.toml");
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("invalid config at {}", path.display()))
}

/// Flag beats environment beats config file; blank values are skipped.
fn resolve_base_url(
    flag: Option<String>,
    env: Option<String>,
    file: Option<String>,
) -> Option<String> {
    [flag, env, file]
        .into_iter()
        .flatten()
        .find(|url| !url.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins_over_env_and_file() {
        let url = resolve_base_url(
            Some("http://flag".into()),
            Some("http://env".into()),
            Some("http://file".into()),
        );
        assert_eq!(url.as_deref(), Some("http://flag"));
    }

    #[test]
    fn test_env_wins_over_file() {
        let url = resolve_base_url(None, Some("http://env".into()), Some("http://file".into()));
        assert_eq!(url.as_deref(), Some("http://env"));
    }

    #[test]
    fn test_blank_values_are_skipped() {
        let url = resolve_base_url(Some("  ".into()), None, Some("http://file".into()));
        assert_eq!(url.as_deref(), Some("http://file"));
    }

    #[test]
    fn test_nothing_configured_is_none() {
        assert_eq!(resolve_base_url(None, None, None), None);
    }
}
