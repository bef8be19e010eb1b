use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const SETTINGS_FILE: &str = "search.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub geography_url: String,
    pub ranking_url: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // The ranking host has no `/cities` route; set GEOGRAPHY_URL to a
            // geography service that does.
            geography_url: "https://rankeduc-backend.onrender.com".into(),
            ranking_url: "https://rankeduc-backend.onrender.com".into(),
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn geography_base(&self) -> anyhow::Result<Url> {
        parse_base_url(&self.geography_url).context("invalid geography_url")
    }

    pub fn ranking_base(&self) -> anyhow::Result<Url> {
        parse_base_url(&self.ranking_url).context("invalid ranking_url")
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub fn load_settings_from(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    let mut settings = Settings::default();
    apply_file(&mut settings, &raw);
    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) else {
        return;
    };

    if let Some(v) = file_cfg.get("geography_url").and_then(toml::Value::as_str) {
        settings.geography_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("ranking_url").and_then(toml::Value::as_str) {
        settings.ranking_url = v.to_string();
    }
    if let Some(v) = file_cfg
        .get("request_timeout_secs")
        .and_then(toml::Value::as_integer)
    {
        if let Ok(secs) = u64::try_from(v) {
            if secs > 0 {
                settings.request_timeout_secs = secs;
            }
        }
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("GEOGRAPHY_URL") {
        settings.geography_url = v;
    }
    if let Some(v) = lookup("APP__GEOGRAPHY_URL") {
        settings.geography_url = v;
    }

    if let Some(v) = lookup("RANKING_URL") {
        settings.ranking_url = v;
    }
    if let Some(v) = lookup("APP__RANKING_URL") {
        settings.ranking_url = v;
    }
}

pub fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    let raw = raw.trim();
    let url = Url::parse(raw).with_context(|| format!("failed to parse url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("base url must start with http:// or https://: {raw}");
    }
    if url.cannot_be_a_base() {
        bail!("url cannot be used as a base: {raw}");
    }
    Ok(url)
}
