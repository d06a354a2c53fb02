//! Library configuration.
//!
//! Loaded with the `config` crate from environment variables prefixed with
//! `MTG_LIBRARY`, nested with `__`:
//!
//! ```text
//! MTG_LIBRARY__MAX_GROUP_DEPTH=3
//! MTG_LIBRARY__UI__GRID_SIZE=lg
//! MTG_LIBRARY__UI__HIDE_IN_DECKS=true
//! ```

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::saved::{SessionState, UiPreferences};

pub const ENV_PREFIX: &str = "MTG_LIBRARY";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Group-by keys beyond this depth are ignored by the view engine.
    pub max_group_depth: usize,
    /// Preferences a session starts with before any view is activated.
    pub ui: UiPreferences,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            max_group_depth: 2,
            ui: UiPreferences::default(),
        }
    }
}

impl LibraryConfig {
    /// Defaults overridden by `MTG_LIBRARY__*` environment variables.
    ///
    /// ## Errors
    /// Returns an error if a variable holds a value of the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Self::environment())
            .build()?
            .try_deserialize()
    }

    /// Defaults overridden by a JSON document.
    ///
    /// ## Errors
    /// Returns an error if the JSON is malformed or a value has the wrong type.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(json, FileFormat::Json))
            .build()?
            .try_deserialize()
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .ignore_empty(true)
            .try_parsing(true)
    }

    /// A fresh session starting from the configured preferences.
    pub fn new_session(&self) -> SessionState {
        SessionState::with_preferences(self.ui)
    }
}
