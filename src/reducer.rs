//! Reducer - pure function: (state, action) -> DispatchResult

use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::effect::Effect;
use crate::state::{
    AppState, Character, CharacterGender, CharacterStatus, FilterKey, FilterTab, SPECIES_OPTIONS,
};

/// The reducer handles all state transitions
pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            let fetch = start_fetch(state, 1, false);
            DispatchResult::changed_with_many(vec![Effect::LoadFavorites, fetch])
        }

        // ===== Character list =====
        Action::CharactersDidLoad {
            seq,
            page,
            append,
            info,
            characters,
        } => {
            if seq != state.request_seq {
                return DispatchResult::unchanged();
            }
            if append {
                state.characters.extend(characters.iter().cloned());
            } else {
                state.characters = characters.clone();
                state.selected_index = 0;
            }
            state.has_more = info.next.is_some();
            state.total_count = info.count;
            state.current_page = page;
            state.list_loading = false;
            state.list_error = None;
            state.filters.is_filtering = false;
            let effects = episode_name_effects(state, &characters);
            DispatchResult::changed_with_many(effects)
        }

        Action::CharactersDidError { seq, error } => {
            if seq != state.request_seq {
                return DispatchResult::unchanged();
            }
            // Already-loaded items stay visible alongside the error.
            state.list_loading = false;
            state.filters.is_filtering = false;
            state.list_error = Some(error);
            DispatchResult::changed()
        }

        Action::LoadMore => {
            if !state.has_more
                || state.list_loading
                || state.filters.current_tab == FilterTab::Favorites
            {
                return DispatchResult::unchanged();
            }
            let next_page = state.current_page + 1;
            let fetch = start_fetch(state, next_page, true);
            DispatchResult::changed_with(fetch)
        }

        Action::Refresh => {
            let fetch = reload_current_tab(state);
            DispatchResult::changed_with(fetch)
        }

        Action::CharactersReset => {
            state.request_seq += 1;
            state.reset_list();
            state.filters.is_filtering = false;
            DispatchResult::changed_with(Effect::CancelFetch)
        }

        // ===== Search =====
        Action::SearchOpen => {
            state.search_active = true;
            DispatchResult::changed()
        }

        Action::SearchClose => {
            state.search_active = false;
            DispatchResult::changed()
        }

        Action::SearchQueryChange(term) => {
            state.filters.search_term = term;
            state.filters.current_tab = FilterTab::All;
            state.request_seq += 1;
            state.list_loading = true;
            state.list_error = None;
            state.filters.is_filtering = true;
            DispatchResult::changed_with(Effect::SearchCharacters {
                seq: state.request_seq,
                filters: state.filters.combined_filters(),
            })
        }

        Action::SearchQuerySubmit(term) => {
            state.filters.search_term = term.trim().to_string();
            state.filters.current_tab = FilterTab::All;
            state.search_active = false;
            let fetch = start_fetch(state, 1, false);
            DispatchResult::changed_with(fetch)
        }

        // ===== Filters =====
        Action::FilterCycleStatus => {
            let next = cycle_option(
                state.filters.active.status.map(|status| status.as_str()),
                &CharacterStatus::ALL.map(|status| status.as_str()),
            );
            apply_filter(state, FilterKey::Status, next)
        }

        Action::FilterCycleGender => {
            let next = cycle_option(
                state.filters.active.gender.map(|gender| gender.as_str()),
                &CharacterGender::ALL.map(|gender| gender.as_str()),
            );
            apply_filter(state, FilterKey::Gender, next)
        }

        Action::FilterCycleSpecies => {
            let next = cycle_option(
                state.filters.active.species.as_deref(),
                &SPECIES_OPTIONS,
            );
            apply_filter(state, FilterKey::Species, next)
        }

        Action::FiltersClear => {
            state.filters.clear_all_filters();
            let fetch = start_fetch(state, 1, false);
            DispatchResult::changed_with(fetch)
        }

        Action::TabToggle => {
            state.filters.current_tab = state.filters.current_tab.toggle();
            let fetch = reload_current_tab(state);
            DispatchResult::changed_with(fetch)
        }

        // ===== Selection and detail =====
        Action::SelectionMove(delta) => {
            let target = clamp_index(state.selected_index, delta, state.characters.len());
            if state.set_selected_index(target) {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::CharacterSelect(index) => {
            if state.set_selected_index(index) {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::DetailOpen => {
            let Some(character) = state.selected_character().cloned() else {
                return DispatchResult::unchanged();
            };
            state.detail_open = true;
            let effects = episode_name_effects(state, std::slice::from_ref(&character));
            DispatchResult::changed_with_many(effects)
        }

        Action::DetailClose => {
            if state.detail_open {
                state.detail_open = false;
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        // ===== Favorites =====
        Action::ToggleFavorite => {
            let Some(character) = state.selected_character() else {
                return DispatchResult::unchanged();
            };
            let id = character.id;
            state.favorites.toggle(id);
            if state.filters.current_tab == FilterTab::Favorites {
                // Unfavoriting on the Favorites tab removes the row.
                let favorites = state.favorites.clone();
                state.characters.retain(|c| favorites.is_favorite(c.id));
                state.total_count = state.characters.len() as u32;
                if state.characters.is_empty() {
                    state.selected_index = 0;
                    state.detail_open = false;
                } else if state.selected_index >= state.characters.len() {
                    state.selected_index = state.characters.len() - 1;
                }
            }
            DispatchResult::changed_with(Effect::SaveFavorites {
                ids: state.favorites.list(),
            })
        }

        Action::FavoritesDidLoad(ids) => {
            state.favorites = crate::state::Favorites::from_ids(ids);
            DispatchResult::changed()
        }

        Action::FavoritesDidError(error) => {
            state.message = Some(format!("Failed to load favorites: {error}"));
            DispatchResult::changed()
        }

        Action::FavoritesDidSave => DispatchResult::unchanged(),

        Action::FavoritesSaveDidError(error) => {
            state.message = Some(format!("Failed to save favorites: {error}"));
            DispatchResult::changed()
        }

        Action::FavoriteCharactersDidLoad { seq, characters } => {
            if seq != state.request_seq {
                return DispatchResult::unchanged();
            }
            state.total_count = characters.len() as u32;
            state.characters = characters.clone();
            state.selected_index = 0;
            state.has_more = false;
            state.current_page = 1;
            state.list_loading = false;
            state.list_error = None;
            let effects = episode_name_effects(state, &characters);
            DispatchResult::changed_with_many(effects)
        }

        // ===== Episode names =====
        Action::EpisodeNameDidLoad { url, name } => {
            state.episode_pending.remove(&url);
            state.episode_names.insert(url, name);
            DispatchResult::changed()
        }

        // ===== UI =====
        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Render => DispatchResult::changed(),

        Action::Quit => DispatchResult::unchanged(),
    }
}

/// Bump the request generation and issue a list fetch. Results carrying an
/// older seq are discarded by the `DidLoad`/`DidError` handlers.
fn start_fetch(state: &mut AppState, page: u32, append: bool) -> Effect {
    state.request_seq += 1;
    state.list_loading = true;
    state.list_error = None;
    Effect::LoadCharacters {
        seq: state.request_seq,
        filters: state.filters.combined_filters(),
        page,
        append,
    }
}

/// Fetch appropriate to the current tab: page 1 of the filtered list, or
/// the favorites batch.
fn reload_current_tab(state: &mut AppState) -> Effect {
    match state.filters.current_tab {
        FilterTab::All => start_fetch(state, 1, false),
        FilterTab::Favorites => {
            state.request_seq += 1;
            state.list_loading = true;
            state.list_error = None;
            Effect::LoadFavoriteCharacters {
                seq: state.request_seq,
                ids: state.favorites.list(),
            }
        }
    }
}

fn apply_filter(state: &mut AppState, key: FilterKey, value: Option<&str>) -> DispatchResult<Effect> {
    match value {
        Some(value) => state.filters.update_filter(key, value),
        None => state.filters.remove_filter(key),
    }
    if state.filters.current_tab == FilterTab::Favorites {
        // Favorites are client-side; server filters only apply on All.
        return DispatchResult::changed();
    }
    let fetch = start_fetch(state, 1, false);
    DispatchResult::changed_with(fetch)
}

/// Advance through `options`, wrapping back to unset after the last one.
fn cycle_option<'a>(current: Option<&str>, options: &[&'a str]) -> Option<&'a str> {
    match current {
        None => options.first().copied(),
        Some(current) => {
            let position = options.iter().position(|option| *option == current)?;
            options.get(position + 1).copied()
        }
    }
}

fn clamp_index(current: usize, delta: i16, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let target = current as i64 + delta as i64;
    target.clamp(0, len as i64 - 1) as usize
}

/// Episode lookups for characters whose first appearance is not yet
/// resolved or in flight. Marks them pending so duplicates are not issued.
fn episode_name_effects(state: &mut AppState, characters: &[Character]) -> Vec<Effect> {
    let mut effects = Vec::new();
    for character in characters {
        let Some(url) = character.first_episode_url() else {
            continue;
        };
        if state.episode_names.contains_key(url) || state.episode_pending.contains(url) {
            continue;
        }
        state.episode_pending.insert(url.clone());
        effects.push(Effect::LoadEpisodeName { url: url.clone() });
    }
    effects
}
