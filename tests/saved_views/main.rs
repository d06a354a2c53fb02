//! Integration tests for saved views (SavedViewStore + ViewPersistence).

mod support;

use mtg_library::{
    Document, DocumentStore, FilterRule, GridSize, InMemoryDocumentStore, PersistenceError,
    RuleSet, SavedView, SavedViewStore, SessionState, SortRule, UiPreferences, UserSettings,
    ViewMode, ViewPersistence, ViewStoreError,
};
use serde_json::json;
use support::{signed_in, FlakyStore};

fn defaults(store: &impl ViewPersistence, owner: &str) -> Vec<String> {
    store
        .list_views(owner)
        .unwrap()
        .into_iter()
        .filter(|v| v.data.is_default)
        .map(|v| v.data.id)
        .collect()
}

fn rares() -> SavedView {
    SavedView::new("", "Rares")
        .with_rules(RuleSet::empty().filter(FilterRule::new("rarity", "equals", "rare")))
}

#[test]
fn default_switches_to_updated_view() {
    let store = InMemoryDocumentStore::new();
    let mut session = signed_in("alice");
    let mut views = SavedViewStore::new(&store, &mut session);

    let x = views.create(SavedView::new("x", "X").with_default(true)).unwrap();
    let y = views.create(SavedView::new("y", "Y")).unwrap();
    assert_eq!(views.session().active_view_id(), Some("x"));

    views.update(y.clone().with_default(true)).unwrap();

    let session = views.session();
    assert!(!session.view(&x.id).unwrap().is_default);
    assert!(session.view(&y.id).unwrap().is_default);
    assert_eq!(session.active_view_id(), Some("y"));
    assert_eq!(defaults(&store, "alice"), vec!["y".to_string()]);
    assert_eq!(
        store.get_user_settings("alice").unwrap().active_view_id.as_deref(),
        Some("y")
    );
}

#[test]
fn exactly_one_default_after_default_writes() {
    let store = InMemoryDocumentStore::new();
    let mut session = signed_in("alice");
    let mut views = SavedViewStore::new(&store, &mut session);

    let ids: Vec<String> = (0..4)
        .map(|i| views.create(SavedView::new(format!("v{i}"), format!("View {i}"))).unwrap().id)
        .collect();

    for id in ids.iter().rev().chain(ids.iter()) {
        let view = views.session().view(id).unwrap().clone();
        views.update(view.with_default(true)).unwrap();

        let local: Vec<_> = views.session().views().filter(|v| v.is_default).collect();
        assert_eq!(local.len(), 1);
        assert_eq!(&local[0].id, id);
        assert_eq!(defaults(&store, "alice"), vec![id.clone()]);
    }

    views
        .create(SavedView::new("fresh", "Fresh").with_default(true))
        .unwrap();
    assert_eq!(defaults(&store, "alice"), vec!["fresh".to_string()]);
}

#[test]
fn deleting_active_view_leaves_empty_rule_set() {
    let store = InMemoryDocumentStore::new();
    let mut session = signed_in("alice");
    let mut views = SavedViewStore::new(&store, &mut session);

    let view = views.create(rares()).unwrap();
    views.set_active(Some(view.id.as_str())).unwrap();
    assert_eq!(views.resolve_active_filter_set().filters.len(), 1);

    assert!(views.delete(&view.id).unwrap());

    assert_eq!(views.session().active_view_id(), None);
    assert_eq!(views.resolve_active_filter_set(), RuleSet::empty());
    assert_eq!(store.get_user_settings("alice").unwrap().active_view_id, None);
}

#[test]
fn pointer_to_unknown_view_resolves_empty() {
    let store = InMemoryDocumentStore::new();
    let mut session = signed_in("alice");
    let mut views = SavedViewStore::new(&store, &mut session);

    let change = views.set_active(Some("never-existed")).unwrap();

    assert_eq!(change.preferences, None);
    assert_eq!(views.resolve_active_filter_set(), RuleSet::empty());
}

#[test]
fn not_authenticated_is_not_the_same_as_no_views() {
    let store = InMemoryDocumentStore::new();

    let mut session = SessionState::new();
    let err = SavedViewStore::new(&store, &mut session).load().unwrap_err();
    assert!(matches!(err, ViewStoreError::NotAuthenticated));

    let mut session = signed_in("alice");
    let change = SavedViewStore::new(&store, &mut session).load().unwrap();
    assert_eq!(change.active_view_id, None);
    assert_eq!(session.views().count(), 0);
}

#[test_log::test]
fn failed_write_keeps_local_change_until_persisted() {
    let store = FlakyStore::new();
    let mut session = signed_in("alice");
    let mut views = SavedViewStore::new(&store, &mut session);

    store.set_offline(true);
    let err = views.create(rares().with_default(true)).unwrap_err();
    match err {
        ViewStoreError::Persistence { source, .. } => {
            assert_eq!(source, PersistenceError::Storage("offline".into()));
        }
        other => panic!("expected a persistence error, got {other:?}"),
    }

    // Not rolled back.
    let view = views.session().views().next().unwrap().clone();
    assert_eq!(views.session().active_view_id(), Some(view.id.as_str()));
    assert!(views.session().has_pending_writes());
    assert!(store.inner().is_empty());

    store.set_offline(false);
    views.persist().unwrap();

    assert!(!views.session().has_pending_writes());
    assert_eq!(store.list_views("alice").unwrap()[0].data, view);
    assert_eq!(
        store.get_user_settings("alice").unwrap().active_view_id,
        Some(view.id.clone())
    );
}

#[test_log::test]
fn failed_delete_is_retried() {
    let store = FlakyStore::new();
    let mut session = signed_in("alice");
    let mut views = SavedViewStore::new(&store, &mut session);
    let view = views.create(rares()).unwrap();

    store.set_offline(true);
    assert!(views.delete(&view.id).is_err());
    assert!(views.session().view(&view.id).is_none());
    assert_eq!(store.inner().list_views("alice").unwrap().len(), 1);

    store.set_offline(false);
    views.persist().unwrap();
    assert!(store.list_views("alice").unwrap().is_empty());
}

#[test]
fn settings_writes_keep_unrelated_fields() {
    let store = InMemoryDocumentStore::new();
    store
        .merge::<UserSettings>(
            "alice",
            "alice",
            &json!({"modalVisibility": {"count": true, "price": false}, "theme": "dark"}),
        )
        .unwrap();

    let mut session = signed_in("alice");
    let mut views = SavedViewStore::new(&store, &mut session);
    let view = views
        .create(rares().with_preferences(UiPreferences {
            grid_size: GridSize::Lg,
            view_mode: ViewMode::Table,
            hide_in_decks: true,
        }))
        .unwrap();
    views.set_active(Some(view.id.as_str())).unwrap();

    let settings = store.get_user_settings("alice").unwrap();
    assert_eq!(settings.active_view_id, Some(view.id));
    assert_eq!(settings.ui_preferences.map(|p| p.grid_size), Some(GridSize::Lg));
    assert_eq!(settings.extra["theme"], json!("dark"));
    assert_eq!(
        settings.extra["modalVisibility"],
        json!({"count": true, "price": false})
    );
}

#[test]
fn set_active_returns_view_preferences() {
    let store = InMemoryDocumentStore::new();
    let mut session = signed_in("alice");
    let mut views = SavedViewStore::new(&store, &mut session);

    let prefs = UiPreferences {
        grid_size: GridSize::Sm,
        view_mode: ViewMode::Table,
        hide_in_decks: true,
    };
    let view = views.create(rares().with_preferences(prefs)).unwrap();

    let change = views.set_active(Some(view.id.as_str())).unwrap();
    assert_eq!(change.preferences, Some(prefs));
    assert_eq!(views.session().preferences(), prefs);
    assert!(views.resolve_active_filter_set().hide_in_decks);

    let cleared = views.set_active(None).unwrap();
    assert_eq!(cleared.active_view_id, None);
    assert_eq!(cleared.preferences, None);
}

#[test]
fn load_prefers_default_view_over_stored_pointer() {
    let store = InMemoryDocumentStore::new();
    {
        let mut session = signed_in("alice");
        let mut views = SavedViewStore::new(&store, &mut session);
        views.create(SavedView::new("a", "A")).unwrap();
        views.create(SavedView::new("b", "B").with_default(true)).unwrap();
        views.set_active(Some("a")).unwrap();
    }

    let mut session = signed_in("alice");
    let change = SavedViewStore::new(&store, &mut session).load().unwrap();

    assert_eq!(change.active_view_id.as_deref(), Some("b"));
    assert_eq!(session.views().map(|v| v.id.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
    assert!(!session.has_pending_writes());
}

#[test]
fn load_restores_pointer_only_when_it_resolves() {
    let store = InMemoryDocumentStore::new();
    {
        let mut session = signed_in("alice");
        let mut views = SavedViewStore::new(&store, &mut session);
        views
            .create(SavedView::new("a", "A").with_rules(
                RuleSet::empty().sort(SortRule::desc("price")),
            ))
            .unwrap();
        views.set_active(Some("a")).unwrap();
    }

    let mut session = signed_in("alice");
    SavedViewStore::new(&store, &mut session).load().unwrap();
    assert_eq!(session.active_view_id(), Some("a"));
    assert_eq!(session.resolve_active_filter_set().sorts, vec![SortRule::desc("price")]);

    store.delete_view("alice", "a").unwrap();
    let mut session = signed_in("alice");
    let change = SavedViewStore::new(&store, &mut session).load().unwrap();
    assert_eq!(change.active_view_id, None);
}

#[test]
fn stale_session_write_conflicts() {
    let store = InMemoryDocumentStore::new();
    let mut first = signed_in("alice");
    let mut second = signed_in("alice");

    SavedViewStore::new(&store, &mut first)
        .create(SavedView::new("v1", "Original"))
        .unwrap();
    SavedViewStore::new(&store, &mut second).load().unwrap();

    let mut views = SavedViewStore::new(&store, &mut first);
    views.update(SavedView::new("v1", "First edit")).unwrap();

    let err = SavedViewStore::new(&store, &mut second)
        .update(SavedView::new("v1", "Second edit"))
        .unwrap_err();
    assert!(matches!(
        err,
        ViewStoreError::Persistence {
            source: PersistenceError::Conflict { expected: 1, actual: 2, .. },
            ..
        }
    ));
    assert_eq!(store.list_views("alice").unwrap()[0].data.name, "First edit");
}

#[test]
fn views_are_scoped_to_their_owner() {
    let store = InMemoryDocumentStore::new();
    let mut session = signed_in("alice");
    SavedViewStore::new(&store, &mut session).create(rares()).unwrap();

    session.sign_in("bob");
    SavedViewStore::new(&store, &mut session).load().unwrap();
    assert_eq!(session.views().count(), 0);

    assert_eq!(<SavedView as Document>::COLLECTION, "views");
    assert_eq!(store.list::<SavedView>("alice").unwrap().len(), 1);
}

#[test]
fn default_in_unloaded_session_clears_stored_default() {
    let store = InMemoryDocumentStore::new();
    let mut first = signed_in("alice");
    SavedViewStore::new(&store, &mut first)
        .create(SavedView::new("x", "X").with_default(true))
        .unwrap();

    let mut second = signed_in("alice");
    SavedViewStore::new(&store, &mut second)
        .create(SavedView::new("y", "Y").with_default(true))
        .unwrap();

    assert_eq!(defaults(&store, "alice"), vec!["y".to_string()]);
    assert!(!second.view("x").unwrap().is_default);
    assert!(!second.has_pending_writes());
}

#[test]
fn default_from_stale_session_clears_newer_default() {
    let store = InMemoryDocumentStore::new();
    let mut first = signed_in("alice");
    let mut second = signed_in("alice");
    SavedViewStore::new(&store, &mut first)
        .create(SavedView::new("x", "X").with_default(true))
        .unwrap();
    SavedViewStore::new(&store, &mut first).load().unwrap();
    SavedViewStore::new(&store, &mut second).load().unwrap();

    // The first session moves the default twice; the second never reloads.
    let mut views = SavedViewStore::new(&store, &mut first);
    views.create(SavedView::new("z", "Z").with_default(true)).unwrap();
    views.update(SavedView::new("x", "X").with_default(true)).unwrap();
    views.update(SavedView::new("z", "Z").with_default(true)).unwrap();

    SavedViewStore::new(&store, &mut second)
        .create(SavedView::new("w", "W").with_default(true))
        .unwrap();

    assert_eq!(defaults(&store, "alice"), vec!["w".to_string()]);
    assert_eq!(second.active_view_id(), Some("w"));
}

#[test_log::test]
fn default_write_after_failed_read_is_reconciled_on_persist() {
    let store = FlakyStore::new();
    let mut first = signed_in("alice");
    SavedViewStore::new(&store, &mut first)
        .create(SavedView::new("x", "X").with_default(true))
        .unwrap();

    let mut second = signed_in("alice");
    let mut views = SavedViewStore::new(&store, &mut second);
    store.set_offline(true);
    let err = views
        .create(SavedView::new("y", "Y").with_default(true))
        .unwrap_err();
    assert!(matches!(
        err,
        ViewStoreError::Persistence { operation: "list saved views", .. }
    ));
    assert_eq!(views.session().active_view_id(), Some("y"));

    store.set_offline(false);
    views.persist().unwrap();
    assert_eq!(defaults(&store, "alice"), vec!["y".to_string()]);
}
