//! SavedViewStore - CRUD and active-view handling for a user's saved views.
//!
//! Every mutation is applied to the [`SessionState`] first and then written
//! through [`ViewPersistence`]. A failed write is reported but not rolled
//! back; the session keeps the change marked as pending and
//! [`SavedViewStore::persist`] retries it.

use uuid::Uuid;

use crate::persistence::{PersistenceError, Versioned, ViewPersistence};
use crate::view::RuleSet;

use super::{ActiveViewChange, SavedView, SessionState};

#[derive(Debug, thiserror::Error)]
pub enum ViewStoreError {
    /// The operation needs a signed-in user.
    #[error("no signed-in user")]
    NotAuthenticated,

    #[error("failed to {operation}")]
    Persistence {
        operation: &'static str,
        #[source]
        source: PersistenceError,
    },

    #[error("a saved view with id `{0}` already exists")]
    DuplicateView(String),
}

impl ViewStoreError {
    fn persistence(operation: &'static str) -> impl FnOnce(PersistenceError) -> Self {
        move |source| ViewStoreError::Persistence { operation, source }
    }
}

/// Saved-view operations for the session's owner.
pub struct SavedViewStore<'a, P: ViewPersistence + ?Sized> {
    persistence: &'a P,
    session: &'a mut SessionState,
}

impl<'a, P: ViewPersistence + ?Sized> SavedViewStore<'a, P> {
    pub fn new(persistence: &'a P, session: &'a mut SessionState) -> Self {
        Self {
            persistence,
            session,
        }
    }

    pub fn session(&self) -> &SessionState {
        self.session
    }

    fn owner(&self) -> Result<String, ViewStoreError> {
        self.session
            .owner()
            .map(str::to_string)
            .ok_or(ViewStoreError::NotAuthenticated)
    }

    /// Read the owner's views and settings into the session.
    ///
    /// The default view becomes active if there is one; otherwise the stored
    /// pointer is kept when it still names a view. Nothing is written.
    pub fn load(&mut self) -> Result<ActiveViewChange, ViewStoreError> {
        let owner = self.owner()?;

        let views = self
            .persistence
            .list_views(&owner)
            .map_err(ViewStoreError::persistence("list saved views"))?;
        let settings = self
            .persistence
            .get_user_settings(&owner)
            .map_err(ViewStoreError::persistence("read user settings"))?;

        self.session.replace_views(views);
        if let Some(preferences) = settings.ui_preferences {
            self.session.set_preferences(preferences);
        }

        let active = match self.session.default_view() {
            Some(view) => Some(view.id.clone()),
            None => settings
                .active_view_id
                .filter(|id| self.session.view(id).is_some()),
        };
        let change = self.session.activate(active.as_deref());

        tracing::debug!(
            owner = %owner,
            views = self.session.views().count(),
            active = ?change.active_view_id,
            "saved views loaded"
        );
        Ok(change)
    }

    /// Add a new view. An empty id is replaced with a fresh one.
    ///
    /// A default view takes the default flag from every other view of the
    /// owner, including stored views this session has not loaded, and
    /// becomes active.
    pub fn create(&mut self, mut view: SavedView) -> Result<SavedView, ViewStoreError> {
        let owner = self.owner()?;
        if view.id.trim().is_empty() {
            view.id = Uuid::new_v4().to_string();
        }
        if self.session.view(&view.id).is_some() {
            return Err(ViewStoreError::DuplicateView(view.id));
        }

        tracing::debug!(owner = %owner, view_id = %view.id, "creating saved view");
        self.save(&owner, view)
    }

    /// Replace a view by id, inserting it if the session does not know it.
    pub fn update(&mut self, mut view: SavedView) -> Result<SavedView, ViewStoreError> {
        let owner = self.owner()?;
        if view.id.trim().is_empty() {
            view.id = Uuid::new_v4().to_string();
        }

        tracing::debug!(owner = %owner, view_id = %view.id, "updating saved view");
        self.save(&owner, view)
    }

    fn save(&mut self, owner: &str, view: SavedView) -> Result<SavedView, ViewStoreError> {
        // Stored views are read back first so defaults this session never saw,
        // or saw at an older version, are cleared too.
        let listed = if view.is_default {
            self.stored_views_except(owner, &view.id)
                .map(|stored| stored.into_iter().for_each(|s| self.session.adopt_stored(s)))
        } else {
            Ok(())
        };

        self.session.upsert(view.clone());
        let mut writes = Vec::new();
        if view.is_default {
            writes = self.session.clear_default_except(&view.id);
            self.session.activate(Some(view.id.as_str()));
            self.session.mark_settings_dirty();
        }
        listed?;

        // Old defaults are cleared in storage before the new one is written.
        writes.push(view.id.clone());
        for view_id in &writes {
            self.write_view(owner, view_id)?;
        }
        if view.is_default {
            self.write_settings(owner)?;
        }
        Ok(view)
    }

    /// The owner's stored views other than `keep`.
    fn stored_views_except(
        &self,
        owner: &str,
        keep: &str,
    ) -> Result<Vec<Versioned<SavedView>>, ViewStoreError> {
        let views = self.persistence.list_views(owner).map_err(|err| {
            tracing::warn!(owner, error = %err, "reading stored views failed");
            ViewStoreError::persistence("list saved views")(err)
        })?;
        Ok(views
            .into_iter()
            .filter(|stored| stored.data.id != keep)
            .collect())
    }

    /// Remove a view. Returns false if it existed neither locally nor in
    /// storage.
    pub fn delete(&mut self, view_id: &str) -> Result<bool, ViewStoreError> {
        let owner = self.owner()?;
        let was_active = self.session.active_view_id() == Some(view_id);
        let removed = self.session.remove(view_id).is_some();

        tracing::debug!(owner = %owner, view_id, was_active, "deleting saved view");

        let existed = self.write_delete(&owner, view_id)?;
        if was_active {
            self.write_settings(&owner)?;
        }
        Ok(removed || existed)
    }

    /// Point the session at a view, or clear the pointer with `None`.
    ///
    /// An id that names no view is stored as is and resolves to the empty
    /// rule set.
    pub fn set_active(
        &mut self,
        view_id: Option<&str>,
    ) -> Result<ActiveViewChange, ViewStoreError> {
        let owner = self.owner()?;
        let change = self.session.activate(view_id);
        self.session.mark_settings_dirty();

        tracing::debug!(owner = %owner, active = ?change.active_view_id, "active view changed");
        self.write_settings(&owner)?;
        Ok(change)
    }

    /// Rules of the active view, or the empty rule set.
    pub fn resolve_active_filter_set(&self) -> RuleSet {
        self.session.resolve_active_filter_set()
    }

    /// Write everything still pending: deletions, changed views, settings.
    ///
    /// A pending default view first clears the default flag on every stored
    /// view, as in [`create`](Self::create).
    pub fn persist(&mut self) -> Result<(), ViewStoreError> {
        let owner = self.owner()?;

        if let Some(default_id) = self.session.dirty_default_id() {
            for stored in self.stored_views_except(&owner, &default_id)? {
                self.session.adopt_stored(stored);
            }
            self.session.clear_default_except(&default_id);
        }
        for view_id in self.session.pending_deletes() {
            self.write_delete(&owner, &view_id)?;
        }
        for view_id in self.session.dirty_view_ids() {
            self.write_view(&owner, &view_id)?;
        }
        if self.session.settings_dirty() {
            self.write_settings(&owner)?;
        }
        Ok(())
    }

    fn write_view(&mut self, owner: &str, view_id: &str) -> Result<(), ViewStoreError> {
        let Some((view, version)) = self.session.write_target(view_id) else {
            return Ok(());
        };
        match self.persistence.put_view(owner, &view, Some(version)) {
            Ok(version) => {
                self.session.view_written(view_id, version);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(owner, view_id, error = %err, "saved view write failed");
                Err(ViewStoreError::persistence("write saved view")(err))
            }
        }
    }

    fn write_delete(&mut self, owner: &str, view_id: &str) -> Result<bool, ViewStoreError> {
        match self.persistence.delete_view(owner, view_id) {
            Ok(existed) => {
                self.session.delete_written(view_id);
                Ok(existed)
            }
            Err(err) => {
                tracing::warn!(owner, view_id, error = %err, "saved view delete failed");
                Err(ViewStoreError::persistence("delete saved view")(err))
            }
        }
    }

    fn write_settings(&mut self, owner: &str) -> Result<(), ViewStoreError> {
        let patch = self.session.settings_patch();
        match self.persistence.put_user_settings(owner, &patch) {
            Ok(()) => {
                self.session.settings_written();
                Ok(())
            }
            Err(err) => {
                tracing::warn!(owner, error = %err, "user settings write failed");
                Err(ViewStoreError::persistence("write user settings")(err))
            }
        }
    }
}
