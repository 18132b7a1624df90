use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod validator;

use crate::cli::Cli;
use crate::domain::registry::DOMAIN_SLUGS;

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub content: ContentSettings,
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub deploy: DeploySettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Where the session loads its content documents from, and which domains
/// exist (in site order)
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ContentSettings {
    #[serde(default = "default_content_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_domains")]
    pub domains: Vec<String>,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            dir: default_content_dir(),
            domains: default_domains(),
        }
    }
}

/// The hosted repository the site content is published to
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RepositorySettings {
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Write-capable access token; prefer `token_env` over putting the value
    /// in the config file
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Directory the per-domain JSON documents live under in the repository
    #[serde(default = "default_content_base_path")]
    pub content_base_path: String,
    /// Repository directory the published site's public asset root maps to
    #[serde(default = "default_asset_base_path")]
    pub asset_base_path: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            owner: None,
            name: None,
            token: None,
            token_env: default_token_env(),
            branch: default_branch(),
            base_url: default_base_url(),
            content_base_path: default_content_base_path(),
            asset_base_path: default_asset_base_path(),
        }
    }
}

impl RepositorySettings {
    /// Inline token when set, otherwise the named environment variable
    pub fn resolve_token(&self) -> Option<String> {
        self.token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| std::env::var(&self.token_env).ok())
            .filter(|t| !t.trim().is_empty())
    }

    /// Whether publishing can be attempted at all
    pub fn is_configured(&self) -> bool {
        self.owner.as_deref().is_some_and(|o| !o.trim().is_empty())
            && self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
            && self.resolve_token().is_some()
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct DeploySettings {
    /// Optional hook POSTed after a fully successful save, to trigger a
    /// site rebuild
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_url: Option<String>,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content/json")
}

fn default_domains() -> Vec<String> {
    DOMAIN_SLUGS.iter().map(|s| s.to_string()).collect()
}

fn default_token_env() -> String {
    "COPYDESK_REPO_TOKEN".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_content_base_path() -> String {
    "app/_lib/content/json".to_string()
}

fn default_asset_base_path() -> String {
    "public".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_file(&PathBuf::from("copydesk.toml"))
    }

    /// Create settings from CLI arguments (config file plus CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::from_file(&cli.config)?;
        settings.apply_cli_overrides(cli);
        settings.validate()?;
        Ok(settings)
    }

    fn from_file(path: &PathBuf) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::from(path.clone()).required(false))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 4000)?
            .build()?;
        Ok(s.try_deserialize()?)
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }

    /// Apply CLI argument overrides to settings (CLI > env vars > config file)
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(dir) = &cli.content_dir {
            self.content.dir = dir.clone();
        }
        if let Some(owner) = &cli.repo_owner {
            self.repository.owner = Some(owner.clone());
        }
        if let Some(name) = &cli.repo_name {
            self.repository.name = Some(name.clone());
        }
        if let Some(branch) = &cli.repo_branch {
            self.repository.branch = branch.clone();
        }
        if let Some(url) = &cli.deploy_hook_url {
            self.deploy.hook_url = Some(url.clone());
        }
    }
}
