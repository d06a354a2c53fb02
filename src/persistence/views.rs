//! Saved-view persistence on top of any [`DocumentStore`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::saved::{SavedView, UiPreferences};
use crate::Document;

use super::{DocumentStore, PersistenceError, Versioned};

/// Per-owner settings document. Its id is the owner id.
///
/// Only the active-view pointer and UI preferences are interpreted here;
/// anything else other clients stored in the document is carried in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Document)]
#[document(collection = "settings")]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub active_view_id: Option<String>,
    #[serde(default)]
    pub ui_preferences: Option<UiPreferences>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Fields to merge into [`UserSettings`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    /// `Some(None)` clears the pointer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_view_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui_preferences: Option<UiPreferences>,
}

impl SettingsPatch {
    pub fn active_view(active_view_id: Option<&str>) -> Self {
        Self {
            active_view_id: Some(active_view_id.map(str::to_string)),
            ui_preferences: None,
        }
    }

    pub fn with_preferences(mut self, preferences: UiPreferences) -> Self {
        self.ui_preferences = Some(preferences);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.active_view_id.is_none() && self.ui_preferences.is_none()
    }
}

/// What the saved-view store needs from storage.
pub trait ViewPersistence {
    /// The owner's settings, or defaults when none were ever written.
    fn get_user_settings(&self, owner: &str) -> Result<UserSettings, PersistenceError>;

    /// Merge-write settings. Fields not named in the patch are preserved.
    fn put_user_settings(&self, owner: &str, patch: &SettingsPatch)
        -> Result<(), PersistenceError>;

    fn list_views(&self, owner: &str) -> Result<Vec<Versioned<SavedView>>, PersistenceError>;

    /// Write a view; see [`DocumentStore::put`] for `expected_version`.
    fn put_view(
        &self,
        owner: &str,
        view: &SavedView,
        expected_version: Option<u64>,
    ) -> Result<u64, PersistenceError>;

    fn delete_view(&self, owner: &str, view_id: &str) -> Result<bool, PersistenceError>;
}

impl<S: DocumentStore> ViewPersistence for S {
    fn get_user_settings(&self, owner: &str) -> Result<UserSettings, PersistenceError> {
        let mut settings = self
            .get::<UserSettings>(owner, owner)?
            .map(|stored| stored.data)
            .unwrap_or_default();
        settings.id = owner.to_string();
        Ok(settings)
    }

    fn put_user_settings(
        &self,
        owner: &str,
        patch: &SettingsPatch,
    ) -> Result<(), PersistenceError> {
        let patch =
            serde_json::to_value(patch).map_err(|e| PersistenceError::Serde(e.to_string()))?;
        self.merge::<UserSettings>(owner, owner, &patch)?;
        Ok(())
    }

    fn list_views(&self, owner: &str) -> Result<Vec<Versioned<SavedView>>, PersistenceError> {
        self.list::<SavedView>(owner)
    }

    fn put_view(
        &self,
        owner: &str,
        view: &SavedView,
        expected_version: Option<u64>,
    ) -> Result<u64, PersistenceError> {
        self.put(owner, view, expected_version)
    }

    fn delete_view(&self, owner: &str, view_id: &str) -> Result<bool, PersistenceError> {
        self.delete::<SavedView>(owner, view_id)
    }
}
