//! Per-user session state: the loaded views, the active-view pointer and the
//! current display preferences.

use crate::persistence::{SettingsPatch, Versioned};
use crate::view::RuleSet;

use super::{SavedView, UiPreferences};

#[derive(Debug, Clone, PartialEq)]
struct TrackedView {
    view: SavedView,
    /// Last version seen in storage. 0 until first written.
    version: u64,
    /// Local changes not yet written.
    dirty: bool,
}

/// Result of changing the active view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveViewChange {
    pub active_view_id: Option<String>,
    /// The activated view's display preferences, for the caller to apply.
    /// `None` when the pointer was cleared or does not resolve.
    pub preferences: Option<UiPreferences>,
}

/// State owned by one signed-in user.
///
/// Created empty, filled by [`SavedViewStore::load`](super::SavedViewStore::load)
/// and reset by [`sign_out`](Self::sign_out). Views keep their load/insertion
/// order.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    owner: Option<String>,
    views: Vec<TrackedView>,
    active_view_id: Option<String>,
    preferences: UiPreferences,
    initial_preferences: UiPreferences,
    pending_deletes: Vec<String>,
    settings_dirty: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session whose preferences start (and reset to) `preferences`.
    pub fn with_preferences(preferences: UiPreferences) -> Self {
        Self {
            preferences,
            initial_preferences: preferences,
            ..Self::default()
        }
    }

    /// Start a fresh session for `owner`, dropping any previous user's state.
    pub fn sign_in(&mut self, owner: impl Into<String>) {
        self.sign_out();
        self.owner = Some(owner.into());
    }

    pub fn sign_out(&mut self) {
        *self = Self::with_preferences(self.initial_preferences);
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn views(&self) -> impl Iterator<Item = &SavedView> {
        self.views.iter().map(|tracked| &tracked.view)
    }

    pub fn view(&self, view_id: &str) -> Option<&SavedView> {
        self.tracked(view_id).map(|tracked| &tracked.view)
    }

    pub fn default_view(&self) -> Option<&SavedView> {
        self.views().find(|view| view.is_default)
    }

    /// The raw pointer, which may name a view that no longer exists.
    pub fn active_view_id(&self) -> Option<&str> {
        self.active_view_id.as_deref()
    }

    /// The active view, if the pointer resolves.
    pub fn active_view(&self) -> Option<&SavedView> {
        self.active_view_id.as_deref().and_then(|id| self.view(id))
    }

    pub fn preferences(&self) -> UiPreferences {
        self.preferences
    }

    /// Rules of the active view; the empty rule set when there is no active
    /// view or the pointer dangles.
    pub fn resolve_active_filter_set(&self) -> RuleSet {
        self.active_view()
            .map(SavedView::rule_set)
            .unwrap_or_else(RuleSet::empty)
    }

    /// True while some local change has not reached storage.
    pub fn has_pending_writes(&self) -> bool {
        self.settings_dirty
            || !self.pending_deletes.is_empty()
            || self.views.iter().any(|tracked| tracked.dirty)
    }

    fn tracked(&self, view_id: &str) -> Option<&TrackedView> {
        self.views.iter().find(|tracked| tracked.view.id == view_id)
    }

    fn tracked_mut(&mut self, view_id: &str) -> Option<&mut TrackedView> {
        self.views.iter_mut().find(|tracked| tracked.view.id == view_id)
    }

    pub(crate) fn replace_views(&mut self, views: Vec<Versioned<SavedView>>) {
        self.views = views
            .into_iter()
            .map(|stored| TrackedView {
                view: stored.data,
                version: stored.version,
                dirty: false,
            })
            .collect();
        self.pending_deletes.clear();
    }

    pub(crate) fn set_preferences(&mut self, preferences: UiPreferences) {
        self.preferences = preferences;
    }

    /// Insert or replace a view and mark it for writing.
    pub(crate) fn upsert(&mut self, view: SavedView) {
        self.pending_deletes.retain(|id| *id != view.id);
        match self.tracked_mut(&view.id) {
            Some(tracked) => {
                tracked.view = view;
                tracked.dirty = true;
            }
            None => self.views.push(TrackedView {
                view,
                version: 0,
                dirty: true,
            }),
        }
    }

    /// Take a stored copy of a view when the session has no local edits to it.
    ///
    /// Views queued for deletion are left alone.
    pub(crate) fn adopt_stored(&mut self, stored: Versioned<SavedView>) {
        if self.pending_deletes.iter().any(|id| *id == stored.data.id) {
            return;
        }
        match self.tracked_mut(&stored.data.id) {
            Some(tracked) if tracked.dirty => {}
            Some(tracked) => {
                tracked.view = stored.data;
                tracked.version = stored.version;
            }
            None => self.views.push(TrackedView {
                view: stored.data,
                version: stored.version,
                dirty: false,
            }),
        }
    }

    /// Unset `is_default` on every view but `keep`. Returns the changed ids.
    pub(crate) fn clear_default_except(&mut self, keep: &str) -> Vec<String> {
        let mut cleared = Vec::new();
        for tracked in &mut self.views {
            if tracked.view.is_default && tracked.view.id != keep {
                tracked.view.is_default = false;
                tracked.dirty = true;
                cleared.push(tracked.view.id.clone());
            }
        }
        cleared
    }

    /// Remove a view, queueing its deletion. Clears the pointer if it was active.
    pub(crate) fn remove(&mut self, view_id: &str) -> Option<SavedView> {
        let index = self.views.iter().position(|tracked| tracked.view.id == view_id);
        let removed = index.map(|i| self.views.remove(i).view);

        if !self.pending_deletes.iter().any(|id| id == view_id) {
            self.pending_deletes.push(view_id.to_string());
        }
        if self.active_view_id.as_deref() == Some(view_id) {
            self.active_view_id = None;
            self.settings_dirty = true;
        }
        removed
    }

    /// Point at a view and take on its preferences when it exists.
    pub(crate) fn activate(&mut self, view_id: Option<&str>) -> ActiveViewChange {
        self.active_view_id = view_id.map(str::to_string);
        let preferences = self.active_view().map(SavedView::preferences);
        if let Some(preferences) = preferences {
            self.preferences = preferences;
        }
        ActiveViewChange {
            active_view_id: self.active_view_id.clone(),
            preferences,
        }
    }

    /// Ids of views with unwritten changes. The default view comes last.
    pub(crate) fn dirty_view_ids(&self) -> Vec<String> {
        let mut dirty: Vec<&TrackedView> =
            self.views.iter().filter(|tracked| tracked.dirty).collect();
        dirty.sort_by_key(|tracked| tracked.view.is_default);
        dirty.into_iter().map(|tracked| tracked.view.id.clone()).collect()
    }

    pub(crate) fn dirty_default_id(&self) -> Option<String> {
        self.views
            .iter()
            .find(|tracked| tracked.dirty && tracked.view.is_default)
            .map(|tracked| tracked.view.id.clone())
    }

    /// A tracked view with the version to write it against.
    pub(crate) fn write_target(&self, view_id: &str) -> Option<(SavedView, u64)> {
        self.tracked(view_id)
            .map(|tracked| (tracked.view.clone(), tracked.version))
    }

    pub(crate) fn view_written(&mut self, view_id: &str, version: u64) {
        if let Some(tracked) = self.tracked_mut(view_id) {
            tracked.version = version;
            tracked.dirty = false;
        }
    }

    pub(crate) fn pending_deletes(&self) -> Vec<String> {
        self.pending_deletes.clone()
    }

    pub(crate) fn delete_written(&mut self, view_id: &str) {
        self.pending_deletes.retain(|id| id != view_id);
    }

    pub(crate) fn mark_settings_dirty(&mut self) {
        self.settings_dirty = true;
    }

    pub(crate) fn settings_dirty(&self) -> bool {
        self.settings_dirty
    }

    pub(crate) fn settings_patch(&self) -> SettingsPatch {
        SettingsPatch::active_view(self.active_view_id.as_deref())
            .with_preferences(self.preferences)
    }

    pub(crate) fn settings_written(&mut self) {
        self.settings_dirty = false;
    }
}
