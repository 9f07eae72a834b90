//! Configuration management for tmop.
//!
//! The configuration holds the connection settings of both services: the
//! OpenProject instance URL and API token, the Tmetric API token, the id of the
//! Tmetric client whose entries are billed, and the id of the Tmetric project
//! used for dummy time entries.
//!
//! ## Sources
//!
//! Values are merged from, in increasing priority:
//!
//! 1. `config.json` in the application data directory (or the file passed
//!    with `--config`)
//! 2. a `.env` file in the working directory (loaded by `main`)
//! 3. `TMOP_*` environment variables
//!
//! ## Validation
//!
//! Reading never fails because a key is missing. Commands ask for the section
//! they need through [`Config::openproject`] and [`Config::tmetric`], which
//! return [`Error::ConfigMissing`] naming the first empty key.
//!
//! ```rust,no_run
//! use tmop::libs::config::Config;
//!
//! let config = Config::load(None)?;
//! let tmetric = config.tmetric()?;
//! println!("billing client: {}", tmetric.client_id);
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use super::error::{Error, Result};
use crate::libs::messages::Message;
use crate::msg_print;
use dialoguer::{theme::ColorfulTheme, Input, Password};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Configuration file name inside the application data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_TMETRIC_API_URL: &str = "https://app.tmetric.com/api/";
pub const DEFAULT_TMETRIC_API_V3_URL: &str = "https://app.tmetric.com/api/v3/";
pub const DEFAULT_TRANSFERRED_TAG: &str = "transferred-to-openproject";

/// Tmetric only recognises the OpenProject integration for this host, so
/// external task links are always created against it.
pub const DEFAULT_EXTERNAL_TASK_LINK: &str = "https://community.openproject.org/";

/// Connection settings of the OpenProject instance.
#[derive(Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct OpenProjectConfig {
    /// Base URL of the instance, e.g. `https://community.openproject.org`.
    #[serde(default)]
    pub url: String,
    /// API key of the user, sent as the basic-auth password.
    #[serde(default)]
    pub token: String,
}

impl fmt::Debug for OpenProjectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenProjectConfig")
            .field("url", &self.url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Connection settings of the Tmetric account.
#[derive(Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TmetricConfig {
    #[serde(default)]
    pub token: String,

    /// Only entries of projects belonging to this client are processed.
    #[serde(default)]
    pub client_id: u64,

    /// Project that receives the short-lived dummy entries used to create
    /// external task links.
    #[serde(default)]
    pub dummy_project_id: u64,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_api_v3_url")]
    pub api_v3_url: String,

    /// Tag that marks entries already copied to OpenProject.
    #[serde(default = "default_transferred_tag")]
    pub transferred_tag: String,

    #[serde(default = "default_external_task_link")]
    pub external_task_link: String,
}

fn default_api_url() -> String {
    DEFAULT_TMETRIC_API_URL.to_string()
}

fn default_api_v3_url() -> String {
    DEFAULT_TMETRIC_API_V3_URL.to_string()
}

fn default_transferred_tag() -> String {
    DEFAULT_TRANSFERRED_TAG.to_string()
}

fn default_external_task_link() -> String {
    DEFAULT_EXTERNAL_TASK_LINK.to_string()
}

impl Default for TmetricConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            client_id: 0,
            dummy_project_id: 0,
            api_url: default_api_url(),
            api_v3_url: default_api_v3_url(),
            transferred_tag: default_transferred_tag(),
            external_task_link: default_external_task_link(),
        }
    }
}

impl fmt::Debug for TmetricConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmetricConfig")
            .field("token", &"[REDACTED]")
            .field("client_id", &self.client_id)
            .field("dummy_project_id", &self.dummy_project_id)
            .field("api_url", &self.api_url)
            .field("api_v3_url", &self.api_v3_url)
            .field("transferred_tag", &self.transferred_tag)
            .field("external_task_link", &self.external_task_link)
            .finish()
    }
}

/// Root configuration object as stored on disk.
///
/// Both sections are optional so that a partially configured installation
/// can still be loaded and completed by the `init` wizard.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openproject: Option<OpenProjectConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmetric: Option<TmetricConfig>,
}

impl Config {
    /// Path of the default configuration file.
    pub fn default_path() -> Result<PathBuf> {
        Ok(DataStorage::new().get_path(CONFIG_FILE_NAME)?)
    }

    /// Reads the default configuration file, falling back to an empty
    /// configuration when it does not exist yet.
    pub fn read() -> Result<Config> {
        Self::read_from(&Self::default_path()?)
    }

    /// Reads a configuration file. A missing file yields the default value.
    pub fn read_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(path)?;
        serde_json::from_str(&config_str).map_err(|source| Error::Decode {
            context: format!("could not parse configuration file '{}'", path.display()),
            source,
        })
    }

    /// Reads the file (default location unless `path` is given) and applies
    /// the `TMOP_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let mut config = match path {
            Some(path) => Self::read_from(path)?,
            None => Self::read()?,
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        tracing::debug!(?config, "loaded configuration");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let config_file = File::create(path)?;
        serde_json::to_writer_pretty(&config_file, &self).map_err(|source| Error::Decode {
            context: format!("could not write configuration file '{}'", path.display()),
            source,
        })
    }

    /// Overrides values with environment variables.
    ///
    /// `lookup` abstracts `std::env::var` so the mapping can be exercised
    /// without touching the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = non_empty("TMOP_OPENPROJECT_URL") {
            self.openproject.get_or_insert_with(Default::default).url = url;
        }
        if let Some(token) = non_empty("TMOP_OPENPROJECT_TOKEN") {
            self.openproject.get_or_insert_with(Default::default).token = token;
        }
        if let Some(token) = non_empty("TMOP_TMETRIC_TOKEN") {
            self.tmetric.get_or_insert_with(Default::default).token = token;
        }
        if let Some(client_id) = non_empty("TMOP_TMETRIC_CLIENT_ID") {
            self.tmetric.get_or_insert_with(Default::default).client_id = parse_id("TMOP_TMETRIC_CLIENT_ID", &client_id)?;
        }
        if let Some(project_id) = non_empty("TMOP_TMETRIC_DUMMY_PROJECT_ID") {
            self.tmetric.get_or_insert_with(Default::default).dummy_project_id =
                parse_id("TMOP_TMETRIC_DUMMY_PROJECT_ID", &project_id)?;
        }
        Ok(())
    }

    /// Returns the OpenProject section if every required key is set.
    pub fn openproject(&self) -> Result<&OpenProjectConfig> {
        let openproject = self.openproject.as_ref().ok_or(Error::ConfigMissing("openproject.url"))?;
        if openproject.url.trim().is_empty() {
            return Err(Error::ConfigMissing("openproject.url"));
        }
        if openproject.token.trim().is_empty() {
            return Err(Error::ConfigMissing("openproject.token"));
        }
        Ok(openproject)
    }

    /// Returns the Tmetric section if every required key is set.
    pub fn tmetric(&self) -> Result<&TmetricConfig> {
        let tmetric = self.tmetric.as_ref().ok_or(Error::ConfigMissing("tmetric.token"))?;
        if tmetric.token.trim().is_empty() {
            return Err(Error::ConfigMissing("tmetric.token"));
        }
        if tmetric.client_id == 0 {
            return Err(Error::ConfigMissing("tmetric.clientId"));
        }
        if tmetric.dummy_project_id == 0 {
            return Err(Error::ConfigMissing("tmetric.dummyProjectId"));
        }
        Ok(tmetric)
    }

    /// Runs the interactive setup wizard, pre-filled with the current values.
    ///
    /// Leaving a token prompt empty keeps the stored token.
    pub fn init(&self) -> Result<Self> {
        let theme = ColorfulTheme::default();
        let openproject = self.openproject.clone().unwrap_or_default();
        let tmetric = self.tmetric.clone().unwrap_or_default();

        msg_print!(Message::ConfigModuleOpenProject);
        let url: String = Input::with_theme(&theme)
            .with_prompt(Message::PromptOpenProjectUrl.to_string())
            .default(openproject.url.clone())
            .interact_text()?;
        let token = Password::with_theme(&theme)
            .with_prompt(Message::PromptOpenProjectToken.to_string())
            .allow_empty_password(!openproject.token.is_empty())
            .interact()?;

        msg_print!(Message::ConfigModuleTmetric);
        let tmetric_token = Password::with_theme(&theme)
            .with_prompt(Message::PromptTmetricToken.to_string())
            .allow_empty_password(!tmetric.token.is_empty())
            .interact()?;
        let client_id: u64 = Input::with_theme(&theme)
            .with_prompt(Message::PromptTmetricClientId.to_string())
            .default(tmetric.client_id)
            .interact_text()?;
        let dummy_project_id: u64 = Input::with_theme(&theme)
            .with_prompt(Message::PromptTmetricDummyProjectId.to_string())
            .default(tmetric.dummy_project_id)
            .interact_text()?;

        Ok(Self {
            openproject: Some(OpenProjectConfig {
                url,
                token: keep_if_empty(token, openproject.token),
            }),
            tmetric: Some(TmetricConfig {
                token: keep_if_empty(tmetric_token, tmetric.token.clone()),
                client_id,
                dummy_project_id,
                ..tmetric
            }),
        })
    }
}

fn parse_id(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::validation(format!("{key} must be a positive number, got '{value}'")))
}

fn keep_if_empty(new: String, old: String) -> String {
    if new.is_empty() {
        old
    } else {
        new
    }
}
