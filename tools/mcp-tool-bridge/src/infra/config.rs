use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::{error::BridgeError, server::ToolServerConfig};

const CONFIG_DIR_ENV: &str = "APP_CONFIG_DIR";
const CONFIG_PROFILE_ENV: &str = "APP_CONFIG_PROFILE";
const DEFAULT_CONFIG_DIR: &str = "config";
const DEFAULT_PROFILE: &str = "default";
const DEFAULT_HANDSHAKE_TIMEOUT_MS: u64 = 15_000;

/// Runtime settings for the bridge host, layered from `config/*.toml` files
/// and environment overrides.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub agent_profile: Option<String>,
    pub strict_schemas: Option<bool>,
    pub cache_tools_list: Option<bool>,
    pub handshake_timeout_ms: Option<u64>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let base_dir = env::var(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR));
        Self::load_from_dir(&base_dir)
    }

    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut config = AppConfig::default();
        let mut overlays = Vec::new();

        if dir.exists() {
            let mut profiles = vec![DEFAULT_PROFILE.to_string()];
            if let Ok(active_profile) = env::var(CONFIG_PROFILE_ENV) {
                if !active_profile.trim().is_empty() && active_profile != DEFAULT_PROFILE {
                    profiles.push(active_profile);
                }
            }
            profiles.push("local".to_string());

            for profile in profiles {
                let candidate = dir.join(format!("{profile}.toml"));
                if let Some(overlay) = ConfigOverlay::from_file(&candidate)? {
                    overlays.push(overlay);
                }
            }
        }

        overlays.push(ConfigOverlay::from_env());

        for overlay in overlays {
            config.apply_overlay(overlay);
        }

        Ok(config)
    }

    pub fn strict_schemas(&self) -> bool {
        self.strict_schemas.unwrap_or(true)
    }

    pub fn cache_tools_list(&self) -> bool {
        self.cache_tools_list.unwrap_or(true)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(
            self.handshake_timeout_ms
                .unwrap_or(DEFAULT_HANDSHAKE_TIMEOUT_MS),
        )
    }

    pub fn agent_profile_path(&self) -> Option<PathBuf> {
        self.agent_profile.as_deref().map(PathBuf::from)
    }

    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        if let Some(value) = overlay.agent_profile {
            self.agent_profile = Some(value);
        }
        if let Some(value) = overlay.strict_schemas {
            self.strict_schemas = Some(value);
        }
        if let Some(value) = overlay.cache_tools_list {
            self.cache_tools_list = Some(value);
        }
        if let Some(value) = overlay.handshake_timeout_ms {
            self.handshake_timeout_ms = Some(value);
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigOverlay {
    agent_profile: Option<String>,
    strict_schemas: Option<bool>,
    cache_tools_list: Option<bool>,
    handshake_timeout_ms: Option<u64>,
}

impl ConfigOverlay {
    fn from_file(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let overlay: Self = toml::from_str(&contents)
            .with_context(|| format!("parse config file {}", path.display()))?;
        Ok(Some(overlay))
    }

    fn from_env() -> Self {
        Self {
            agent_profile: env::var("BRIDGE_AGENT_PROFILE").ok(),
            strict_schemas: env_bool("BRIDGE_STRICT_SCHEMAS"),
            cache_tools_list: env_bool("BRIDGE_CACHE_TOOLS_LIST"),
            handshake_timeout_ms: env::var("BRIDGE_HANDSHAKE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok()),
        }
    }
}

fn env_bool(key: &str) -> Option<bool> {
    env::var(key)
        .ok()
        .and_then(|v| match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

/// Agent document handed over by the hosting application. Only the server
/// list and the secrets used to fill argument placeholders are read here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentProfile {
    #[serde(default)]
    pub mcp_servers: Vec<ToolServerConfig>,
    #[serde(default)]
    pub secrets: BTreeMap<String, String>,
}

impl AgentProfile {
    pub fn from_json_str(raw: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(raw)
            .map_err(|err| BridgeError::Configuration(format!("agent profile: {err}")))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read agent profile {}", path.display()))?;
        let profile = Self::from_json_str(&raw)
            .with_context(|| format!("load agent profile {}", path.display()))?;
        Ok(profile)
    }

    /// Validated server configs with `$NAME` / `${NAME}` placeholders in
    /// `args` replaced from `secrets`. Unknown placeholders stay verbatim.
    pub fn server_configs(&self) -> Result<Vec<ToolServerConfig>, BridgeError> {
        self.mcp_servers
            .iter()
            .map(|server| {
                server.validate()?;
                let args = server
                    .args
                    .iter()
                    .map(|arg| self.expand_secrets(arg))
                    .collect();
                Ok(ToolServerConfig::new(
                    server.command.clone(),
                    args,
                    server.name.clone(),
                ))
            })
            .collect()
    }

    fn expand_secrets(&self, arg: &str) -> String {
        shellexpand::env_with_context_no_errors(arg, |name: &str| self.secret(name)).into_owned()
    }

    /// Secret stored under `name`, or under its camelCase form
    /// (`ACI_API_KEY` -> `aciApiKey`) as desktop hosts write them.
    fn secret(&self, name: &str) -> Option<&String> {
        self.secrets
            .get(name)
            .or_else(|| self.secrets.get(&camel_case(name)))
    }
}

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (index, word) in name.split('_').filter(|w| !w.is_empty()).enumerate() {
        let lower = word.to_ascii_lowercase();
        if index == 0 {
            out.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
