//! Reducer flow tests driven through EffectStore.

use tui_dispatch::testing::*;
use tui_dispatch::{EffectStore, NumericComponentId, assert_emitted, assert_not_emitted};

use mortydex::{
    action::Action,
    components::{CharacterList, CharacterListProps, Component},
    effect::Effect,
    reducer::reducer,
    state::{
        AppState, Character, CharacterGender, CharacterStatus, FilterTab, LocationRef, PageInfo,
    },
};

fn character(id: u32, name: &str) -> Character {
    Character {
        id,
        name: name.to_string(),
        status: CharacterStatus::Alive,
        species: "Human".into(),
        kind: String::new(),
        gender: CharacterGender::Male,
        origin: LocationRef::default(),
        location: LocationRef::default(),
        image: String::new(),
        episode: vec![format!("https://rickandmortyapi.com/api/episode/{id}")],
    }
}

fn did_load(seq: u64, page: u32, append: bool, count: u32, next: bool, names: &[&str]) -> Action {
    Action::CharactersDidLoad {
        seq,
        page,
        append,
        info: PageInfo {
            count,
            pages: count.div_ceil(20),
            next: next.then(|| "next-url".to_string()),
            prev: None,
        },
        characters: names
            .iter()
            .enumerate()
            .map(|(i, name)| character(page * 100 + i as u32, name))
            .collect(),
    }
}

#[test]
fn test_init_fetches_first_page() {
    let mut store = EffectStore::new(AppState::default(), reducer);

    let result = store.dispatch(Action::Init);
    assert!(result.changed, "State should change");
    assert!(store.state().list_loading);
    assert_emitted!(result.effects, Effect::LoadFavorites);
    assert_emitted!(
        result.effects,
        Effect::LoadCharacters {
            page: 1,
            append: false,
            ..
        }
    );
}

#[test]
fn test_pagination_follows_next_cursor() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(Action::Init);

    // 100 matches, a next page exists.
    let seq = store.state().request_seq;
    store.dispatch(did_load(seq, 1, false, 100, true, &["Rick", "Morty"]));
    assert_eq!(store.state().total_count, 100);
    assert!(store.state().has_more);
    assert!(!store.state().list_loading);

    let result = store.dispatch(Action::LoadMore);
    assert_emitted!(
        result.effects,
        Effect::LoadCharacters {
            page: 2,
            append: true,
            ..
        }
    );

    let seq = store.state().request_seq;
    store.dispatch(did_load(seq, 2, true, 100, false, &["Summer"]));
    assert_eq!(store.state().characters.len(), 3);
    assert_eq!(store.state().current_page, 2);
    assert!(!store.state().has_more);

    // Exhausted list: LoadMore is a no-op.
    let result = store.dispatch(Action::LoadMore);
    assert!(!result.changed);
    assert_not_emitted!(result.effects, Effect::LoadCharacters { .. });
}

#[test]
fn test_superseded_fetch_is_discarded() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(Action::Init);
    let first_seq = store.state().request_seq;

    // A refresh supersedes the in-flight fetch.
    store.dispatch(Action::Refresh);
    let second_seq = store.state().request_seq;
    assert!(second_seq > first_seq);

    // The superseded result arrives late and is dropped.
    let result = store.dispatch(did_load(first_seq, 1, false, 1, false, &["Rick"]));
    assert!(!result.changed);
    assert!(store.state().characters.is_empty());
    assert!(store.state().list_loading);

    // The current result lands.
    store.dispatch(did_load(second_seq, 1, false, 1, false, &["Morty"]));
    assert_eq!(store.state().characters[0].name, "Morty");
}

#[test]
fn test_search_submit_replaces_list() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(Action::Init);
    let seq = store.state().request_seq;
    store.dispatch(did_load(seq, 1, false, 40, true, &["Rick", "Morty"]));

    store.dispatch(Action::SearchOpen);
    assert!(store.state().search_active);

    let result = store.dispatch(Action::SearchQuerySubmit("rick".into()));
    assert!(!store.state().search_active);
    assert_emitted!(
        result.effects,
        Effect::LoadCharacters {
            page: 1,
            append: false,
            ..
        }
    );
    match &result.effects[0] {
        Effect::LoadCharacters { filters, .. } => {
            assert_eq!(filters.name.as_deref(), Some("rick"));
        }
        other => panic!("unexpected effect: {other:?}"),
    }

    let seq = store.state().request_seq;
    store.dispatch(did_load(seq, 1, false, 1, false, &["Rick Sanchez"]));
    assert_eq!(store.state().characters.len(), 1);
    assert_eq!(store.state().selected_index, 0);
}

#[test]
fn test_search_keystrokes_emit_debounced_effect() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(Action::SearchOpen);

    let result = store.dispatch(Action::SearchQueryChange("r".into()));
    assert_emitted!(result.effects, Effect::SearchCharacters { .. });
    let result = store.dispatch(Action::SearchQueryChange("ri".into()));
    assert_emitted!(result.effects, Effect::SearchCharacters { .. });

    // Each keystroke bumps the generation; only the latest survives.
    match &result.effects[0] {
        Effect::SearchCharacters { seq, filters } => {
            assert_eq!(*seq, store.state().request_seq);
            assert_eq!(filters.name.as_deref(), Some("ri"));
        }
        other => panic!("unexpected effect: {other:?}"),
    }
}

#[test]
fn test_favorites_tab_roundtrip() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(Action::Init);
    let seq = store.state().request_seq;
    store.dispatch(did_load(seq, 1, false, 2, false, &["Rick", "Morty"]));
    store.dispatch(Action::FavoritesDidLoad(vec![100]));

    let result = store.dispatch(Action::TabToggle);
    assert_eq!(store.state().filters.current_tab, FilterTab::Favorites);
    assert_emitted!(result.effects, Effect::LoadFavoriteCharacters { .. });

    store.dispatch(Action::FavoriteCharactersDidLoad {
        seq: store.state().request_seq,
        characters: vec![character(100, "Rick")],
    });
    assert_eq!(store.state().characters.len(), 1);
    assert!(!store.state().has_more);

    // Back to All reloads page 1.
    let result = store.dispatch(Action::TabToggle);
    assert_eq!(store.state().filters.current_tab, FilterTab::All);
    assert_emitted!(result.effects, Effect::LoadCharacters { page: 1, .. });
}

#[test]
fn test_favorites_tab_with_no_favorites() {
    let mut store = EffectStore::new(AppState::default(), reducer);

    let result = store.dispatch(Action::TabToggle);
    match &result.effects[0] {
        Effect::LoadFavoriteCharacters { ids, .. } => assert!(ids.is_empty()),
        other => panic!("unexpected effect: {other:?}"),
    }

    store.dispatch(Action::FavoriteCharactersDidLoad {
        seq: store.state().request_seq,
        characters: Vec::new(),
    });
    assert!(store.state().characters.is_empty());
    assert_eq!(store.state().total_count, 0);
}

#[test]
fn test_toggle_favorite_persists() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(Action::Init);
    let seq = store.state().request_seq;
    store.dispatch(did_load(seq, 1, false, 2, false, &["Rick", "Morty"]));

    let result = store.dispatch(Action::ToggleFavorite);
    let id = store.state().characters[0].id;
    assert!(store.state().favorites.is_favorite(id));
    match &result.effects[0] {
        Effect::SaveFavorites { ids } => assert_eq!(ids, &vec![id]),
        other => panic!("unexpected effect: {other:?}"),
    }

    // Toggling again removes and persists the empty set.
    let result = store.dispatch(Action::ToggleFavorite);
    assert!(!store.state().favorites.is_favorite(id));
    match &result.effects[0] {
        Effect::SaveFavorites { ids } => assert!(ids.is_empty()),
        other => panic!("unexpected effect: {other:?}"),
    }
}

#[test]
fn test_reset_cancels_inflight_fetch() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(Action::Init);
    let stale_seq = store.state().request_seq;

    let result = store.dispatch(Action::CharactersReset);
    assert_emitted!(result.effects, Effect::CancelFetch);
    assert!(store.state().characters.is_empty());
    assert_eq!(store.state().current_page, 1);

    // The cancelled fetch's result must not land.
    let result = store.dispatch(did_load(stale_seq, 1, false, 1, false, &["Rick"]));
    assert!(!result.changed);
}

#[test]
fn test_component_keyboard_events() {
    let mut harness = TestHarness::<AppState, Action>::default();
    let mut component = CharacterList::new();

    let actions = harness.send_keys::<NumericComponentId, _, _>("/", |state, event| {
        component
            .handle_event(
                &event.kind,
                CharacterListProps {
                    state,
                    is_focused: true,
                },
            )
            .into_iter()
            .collect::<Vec<_>>()
    });

    actions.assert_count(1);
    actions.assert_first(Action::SearchOpen);
}

#[test]
fn test_component_ignores_when_unfocused() {
    let mut harness = TestHarness::<AppState, Action>::default();
    let mut component = CharacterList::new();

    let actions = harness.send_keys::<NumericComponentId, _, _>("/ f t", |state, event| {
        component
            .handle_event(
                &event.kind,
                CharacterListProps {
                    state,
                    is_focused: false,
                },
            )
            .into_iter()
            .collect::<Vec<_>>()
    });

    actions.assert_empty();
}

#[test]
fn test_action_categories() {
    let loaded = did_load(1, 1, false, 1, false, &["Rick"]);
    let resize = Action::UiTerminalResize(80, 24);

    assert_eq!(loaded.category(), Some("characters_did"));
    assert!(resize.is_ui());
    assert_eq!(Action::Quit.category(), None);
}
