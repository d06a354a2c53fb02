//! Integration tests for the view engine (filter, sort, group, materialize).


use fixtures::{elf_deck_index, library, llanowar_elves, names, shock};
use mtg_library::view::{partition, OTHER_GROUP};
use mtg_library::{
    CardRecord, FilterRule, GroupCounts, GroupTree, LibraryConfig, NoDecks, RuleSet, SavedView,
    SortRule, ViewEngine,
};
use serde_json::json;

#[test]
fn filter_by_main_type_keeps_matching_cards() {
    let cards = vec![shock(), llanowar_elves()];
    let rules =
        RuleSet::empty().filter(FilterRule::new("typeLineMainType", "equals", "instant"));

    let tree = ViewEngine::new(&NoDecks).materialize(&cards, &rules);

    assert_eq!(names(tree.as_leaf().unwrap()), vec!["Shock"]);
}

#[test]
fn group_counts_per_main_type() {
    let cards = vec![
        CardRecord::new("a", "Plains").with_type_line("Land").with_count(4),
        CardRecord::new("b", "Urza's Mine").with_type_line("Land — Urza's Mine").with_count(1),
        CardRecord::new("c", "Llanowar Elves").with_type_line("Creature — Elf").with_count(2),
    ];

    let tree = partition(cards, &["typeLineMainType"], &NoDecks);

    assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["Creature", "Land"]);
    assert!(tree.get("Land").unwrap().is_leaf());
    assert_eq!(
        tree.get("Land").unwrap().counts(),
        GroupCounts { unique_count: 2, copy_count: 5 }
    );
    assert_eq!(
        tree.get("Creature").unwrap().counts(),
        GroupCounts { unique_count: 1, copy_count: 2 }
    );
}

#[test]
fn missing_price_sorts_as_zero() {
    let cards = vec![
        CardRecord::new("a", "A"),
        CardRecord::new("b", "B").with_price(5.0),
    ];
    let rules = RuleSet::empty().sort(SortRule::desc("price"));

    let tree = ViewEngine::new(&NoDecks).materialize(&cards, &rules);

    assert_eq!(names(tree.as_leaf().unwrap()), vec!["B", "A"]);
}

#[test]
fn ungrouped_view_is_one_sorted_list() {
    let cards = library();
    let rules = RuleSet::empty()
        .sort(SortRule::asc("manaValue"))
        .sort(SortRule::desc("name"));

    let tree = ViewEngine::new(&NoDecks).materialize(&cards, &rules);

    assert_eq!(
        names(tree.as_leaf().unwrap()),
        vec!["Wastes", "Forest", "Sol Ring", "Ezuri, Renegade Leader", "Jace, the Mind Sculptor"]
    );
}

#[test]
fn group_by_deck_name() {
    let cards = library();
    let decks = elf_deck_index(&cards);
    let rules = RuleSet::empty().group("deckName").sort(SortRule::asc("name"));

    let tree = ViewEngine::new(&decks).materialize(&cards, &rules);

    assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["Elfball", "Not in a Deck"]);
    assert_eq!(
        names(tree.get("Elfball").unwrap().as_leaf().unwrap()),
        vec!["Ezuri, Renegade Leader", "Sol Ring"]
    );
    assert_eq!(tree.get("Not in a Deck").unwrap().counts().unique_count, 3);
}

#[test]
fn hide_in_decks_and_deleted_records() {
    let cards = library();
    let decks = elf_deck_index(&cards);

    let tree = ViewEngine::new(&decks).materialize(&cards, &RuleSet::empty().hide_in_decks(true));

    assert_eq!(
        names(tree.as_leaf().unwrap()),
        vec!["Forest", "Wastes", "Jace, the Mind Sculptor"]
    );
}

#[test]
fn raw_attributes_filter_and_group() {
    let cards = library();
    let engine = ViewEngine::new(&NoDecks);

    let filtered = engine.filter(&cards, &[FilterRule::new("set", "equals", "DOM")]);
    assert_eq!(names(&filtered), vec!["Forest"]);

    let tree = engine.materialize(&cards, &RuleSet::empty().group("set"));
    assert_eq!(tree.keys().collect::<Vec<_>>(), vec![OTHER_GROUP, "c21", "dom", "som"]);
    assert_eq!(
        names(tree.get(OTHER_GROUP).unwrap().as_leaf().unwrap()),
        vec!["Wastes", "Jace, the Mind Sculptor"]
    );
}

#[test]
fn two_level_grouping_sorts_each_leaf() {
    let cards = library();
    let rules = RuleSet::empty()
        .group("colorIdentityString")
        .group("rarity")
        .sort(SortRule::desc("count"));

    let tree = ViewEngine::new(&NoDecks).materialize(&cards, &rules);

    assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["Colorless", "G", "U"]);
    let colorless = tree.get("Colorless").unwrap();
    assert_eq!(colorless.keys().collect::<Vec<_>>(), vec!["common", "uncommon"]);
    assert_eq!(
        names(colorless.get("common").unwrap().as_leaf().unwrap()),
        vec!["Forest", "Wastes"]
    );
    assert_eq!(tree.counts(), GroupCounts { unique_count: 5, copy_count: 10 });
}

#[test]
fn extra_group_keys_beyond_depth_are_ignored() {
    let cards = library();
    let rules = RuleSet::empty().group("rarity").group("finish").group("name");

    let tree = ViewEngine::new(&NoDecks).materialize(&cards, &rules);
    let common = tree.get("common").unwrap();
    assert!(matches!(common.get("nonfoil"), Some(GroupTree::Leaf(_))));

    let deeper = LibraryConfig {
        max_group_depth: 3,
        ..LibraryConfig::default()
    };
    let tree = ViewEngine::with_config(&NoDecks, &deeper).materialize(&cards, &rules);
    let common = tree.get("common").unwrap();
    assert!(common.get("nonfoil").unwrap().get("Forest").is_some());
}

#[test]
fn saved_view_rules_decode_legacy_shape() {
    let view: SavedView = serde_json::from_value(json!({
        "id": "v1",
        "name": "Cheap commons",
        "filters": [
            {"column": "rarity", "op": "equals", "value": "common"},
            {"column": "price", "op": "lt", "value": "1"}
        ],
        "sorts": [{"column": "count", "direction": "DESC"}]
    }))
    .unwrap();

    let cards = library();
    let tree = ViewEngine::new(&NoDecks).materialize(&cards, &view.rule_set());

    assert_eq!(names(tree.as_leaf().unwrap()), vec!["Forest", "Wastes"]);
}

#[test]
fn unknown_operator_is_ignored() {
    let cards = library();
    let rules = RuleSet::empty().filter(FilterRule::new("name", "regex", "^Z"));

    let tree = ViewEngine::new(&NoDecks).materialize(&cards, &rules);

    assert_eq!(tree.counts().unique_count, 5);
}

#[test]
fn summary_of_selected_cards() {
    let cards = library();
    let engine = ViewEngine::new(&NoDecks);

    let all = engine.summarize(&cards, &RuleSet::empty());
    assert_eq!(all.unique, 5);
    assert_eq!(all.copies, 10);
    assert!((all.total_value - 86.25).abs() < 1e-9);

    let legendary = engine.summarize(&cards, &RuleSet::empty().search("legendary"));
    assert_eq!(legendary.unique, 2);
}

#[test]
fn absent_rarity_groups_under_other() {
    let cards: Vec<CardRecord> = serde_json::from_value(json!([
        {"id": "a", "name": "A"},
        {"id": "b", "name": "B", "rarity": "rare"}
    ]))
    .unwrap();

    let tree = ViewEngine::new(&NoDecks).materialize(&cards, &RuleSet::empty().group("rarity"));

    assert_eq!(tree.keys().collect::<Vec<_>>(), vec![OTHER_GROUP, "rare"]);
    assert_eq!(names(tree.get(OTHER_GROUP).unwrap().as_leaf().unwrap()), vec!["A"]);
}
