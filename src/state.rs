use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

/// Life status as reported by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterStatus {
    Alive,
    Dead,
    #[serde(rename = "unknown")]
    Unknown,
}

impl CharacterStatus {
    pub const ALL: [CharacterStatus; 3] = [
        CharacterStatus::Alive,
        CharacterStatus::Dead,
        CharacterStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterStatus::Alive => "Alive",
            CharacterStatus::Dead => "Dead",
            CharacterStatus::Unknown => "unknown",
        }
    }

    pub fn parse(value: &str) -> Option<CharacterStatus> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterGender {
    Female,
    Male,
    Genderless,
    #[serde(rename = "unknown")]
    Unknown,
}

impl CharacterGender {
    pub const ALL: [CharacterGender; 4] = [
        CharacterGender::Female,
        CharacterGender::Male,
        CharacterGender::Genderless,
        CharacterGender::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterGender::Female => "Female",
            CharacterGender::Male => "Male",
            CharacterGender::Genderless => "Genderless",
            CharacterGender::Unknown => "unknown",
        }
    }

    pub fn parse(value: &str) -> Option<CharacterGender> {
        Self::ALL
            .into_iter()
            .find(|gender| gender.as_str().eq_ignore_ascii_case(value))
    }
}

/// Named back-reference to another API resource (origin, last location).
/// The url is only ever used for follow-up lookups, never for identity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationRef {
    pub name: String,
    pub url: String,
}

/// Character view model. Episode order matters: index 0 is the first
/// appearance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: u32,
    pub name: String,
    pub status: CharacterStatus,
    pub species: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub gender: CharacterGender,
    pub origin: LocationRef,
    pub location: LocationRef,
    pub image: String,
    pub episode: Vec<String>,
}

impl Character {
    pub fn first_episode_url(&self) -> Option<&String> {
        self.episode.first()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: u32,
    pub name: String,
    pub air_date: String,
    /// Episode code in "S##E##" format.
    pub code: String,
}

/// Pagination cursor block returned alongside every character page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub count: u32,
    pub pages: u32,
    pub next: Option<String>,
    pub prev: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharacterPage {
    pub info: PageInfo,
    pub characters: Vec<Character>,
}

/// Server-side character filters. One value per dimension; the query
/// builder skips unset dimensions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterFilters {
    pub name: Option<String>,
    pub status: Option<CharacterStatus>,
    pub species: Option<String>,
    pub kind: Option<String>,
    pub gender: Option<CharacterGender>,
}

impl CharacterFilters {
    /// Query parameters for a page fetch, in wire order. Unset dimensions
    /// stay in the list as `None` so the query builder can skip them.
    pub fn query_pairs(&self, page: u32) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("name", self.name.clone()),
            ("status", self.status.map(|status| status.as_str().to_string())),
            ("species", self.species.clone()),
            ("type", self.kind.clone()),
            ("gender", self.gender.map(|gender| gender.as_str().to_string())),
            ("page", Some(page.to_string())),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.status.is_none()
            && self.species.is_none()
            && self.kind.is_none()
            && self.gender.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterKey {
    Status,
    Species,
    Gender,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterTab {
    #[default]
    All,
    Favorites,
}

impl FilterTab {
    pub fn toggle(&self) -> Self {
        match self {
            FilterTab::All => FilterTab::Favorites,
            FilterTab::Favorites => FilterTab::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterTab::All => "All",
            FilterTab::Favorites => "Favorites",
        }
    }
}

/// Species options offered by the filter cycle.
pub const SPECIES_OPTIONS: [&str; 7] = [
    "Human",
    "Alien",
    "Humanoid",
    "Poopybutthole",
    "Mythological Creature",
    "Animal",
    "Robot",
];

/// Search term, advanced filters, and tab selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterPanel {
    pub search_term: String,
    pub active: CharacterFilters,
    pub current_tab: FilterTab,
    pub is_filtering: bool,
}

impl FilterPanel {
    pub fn update_filter(&mut self, key: FilterKey, value: &str) {
        match key {
            FilterKey::Status => self.active.status = CharacterStatus::parse(value),
            FilterKey::Species => self.active.species = Some(value.to_string()),
            FilterKey::Gender => self.active.gender = CharacterGender::parse(value),
        }
    }

    pub fn remove_filter(&mut self, key: FilterKey) {
        match key {
            FilterKey::Status => self.active.status = None,
            FilterKey::Species => self.active.species = None,
            FilterKey::Gender => self.active.gender = None,
        }
    }

    /// Resets search, filters, and tab to defaults. Leaves `is_filtering`
    /// alone; it tracks an in-progress apply, not the selection.
    pub fn clear_all_filters(&mut self) {
        self.search_term.clear();
        self.active = CharacterFilters::default();
        self.current_tab = FilterTab::All;
    }

    /// Advanced filters with the trimmed search term merged under `name`.
    pub fn combined_filters(&self) -> CharacterFilters {
        let mut filters = self.active.clone();
        let term = self.search_term.trim();
        if !term.is_empty() {
            filters.name = Some(term.to_string());
        }
        filters
    }

    pub fn has_active_filters(&self) -> bool {
        !self.search_term.trim().is_empty() || !self.active.is_empty()
    }
}

/// Favorited character IDs. Membership operations are idempotent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Favorites {
    ids: HashSet<u32>,
}

impl Favorites {
    pub fn from_ids(ids: Vec<u32>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn add(&mut self, id: u32) {
        self.ids.insert(id);
    }

    pub fn remove(&mut self, id: u32) {
        self.ids.remove(&id);
    }

    pub fn toggle(&mut self, id: u32) {
        if self.ids.contains(&id) {
            self.ids.remove(&id);
        } else {
            self.ids.insert(id);
        }
    }

    pub fn is_favorite(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    /// Sorted so the persisted form is stable across saves.
    pub fn list(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub terminal_size: (u16, u16),

    // --- Character list ---
    pub characters: Vec<Character>,
    pub list_loading: bool,
    pub list_error: Option<String>,
    pub has_more: bool,
    pub total_count: u32,
    pub current_page: u32,
    /// Issue counter for list fetches. Results carry the seq they were
    /// issued under; the reducer discards anything stale.
    pub request_seq: u64,
    pub selected_index: usize,
    pub detail_open: bool,

    // --- Search / filters / favorites ---
    pub search_active: bool,
    pub filters: FilterPanel,
    pub favorites: Favorites,

    // --- Episode names for "first seen in" display ---
    pub episode_names: HashMap<String, String>,
    pub episode_pending: HashSet<String>,

    pub message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            terminal_size: (80, 24),
            characters: Vec::new(),
            list_loading: false,
            list_error: None,
            has_more: true,
            total_count: 0,
            current_page: 1,
            request_seq: 0,
            selected_index: 0,
            detail_open: false,
            search_active: false,
            filters: FilterPanel::default(),
            favorites: Favorites::default(),
            episode_names: HashMap::new(),
            episode_pending: HashSet::new(),
            message: None,
        }
    }
}

impl AppState {
    pub fn selected_character(&self) -> Option<&Character> {
        self.characters.get(self.selected_index)
    }

    pub fn set_selected_index(&mut self, index: usize) -> bool {
        if self.characters.is_empty() {
            self.selected_index = 0;
            return false;
        }
        let bounded = index.min(self.characters.len() - 1);
        if bounded != self.selected_index {
            self.selected_index = bounded;
            return true;
        }
        false
    }

    /// Restore the list state machine to its initial values.
    pub fn reset_list(&mut self) {
        self.characters.clear();
        self.list_loading = false;
        self.list_error = None;
        self.has_more = true;
        self.total_count = 0;
        self.current_page = 1;
        self.selected_index = 0;
        self.detail_open = false;
    }

    pub fn episode_name_for(&self, character: &Character) -> Option<&str> {
        let url = character.first_episode_url()?;
        self.episode_names.get(url).map(String::as_str)
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("List")
                .entry("items", ron_string(&self.characters.len()))
                .entry("total", ron_string(&self.total_count))
                .entry("page", ron_string(&self.current_page))
                .entry("has_more", ron_string(&self.has_more))
                .entry("seq", ron_string(&self.request_seq))
                .entry("selected", ron_string(&self.selected_index)),
            DebugSection::new("Filters")
                .entry("search", ron_string(&self.filters.search_term))
                .entry("search_active", ron_string(&self.search_active))
                .entry("status", ron_string(&self.filters.active.status))
                .entry("species", ron_string(&self.filters.active.species))
                .entry("gender", ron_string(&self.filters.active.gender))
                .entry("tab", ron_string(&self.filters.current_tab))
                .entry("favorites", ron_string(&self.favorites.count())),
            DebugSection::new("Status")
                .entry("loading", ron_string(&self.list_loading))
                .entry("error", ron_string(&self.list_error))
                .entry("episode_names", ron_string(&self.episode_names.len()))
                .entry("episode_pending", ron_string(&self.episode_pending.len()))
                .entry("message", ron_string(&self.message)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favorites_toggle_is_idempotent() {
        let mut favorites = Favorites::default();

        favorites.toggle(7);
        assert!(favorites.is_favorite(7));
        favorites.toggle(7);
        assert!(!favorites.is_favorite(7));

        favorites.add(3);
        favorites.add(3);
        assert_eq!(favorites.count(), 1);

        favorites.remove(99);
        assert_eq!(favorites.count(), 1);
    }

    #[test]
    fn test_favorites_list_is_sorted() {
        let favorites = Favorites::from_ids(vec![9, 1, 5]);
        assert_eq!(favorites.list(), vec![1, 5, 9]);
    }

    #[test]
    fn test_combined_filters_merges_trimmed_term() {
        let mut panel = FilterPanel::default();
        panel.search_term = "  Rick  ".into();
        panel.update_filter(FilterKey::Status, "Alive");

        let combined = panel.combined_filters();
        assert_eq!(combined.name.as_deref(), Some("Rick"));
        assert_eq!(combined.status, Some(CharacterStatus::Alive));

        panel.search_term = "   ".into();
        assert_eq!(panel.combined_filters().name, None);
    }

    #[test]
    fn test_clear_all_filters_keeps_is_filtering() {
        let mut panel = FilterPanel {
            search_term: "morty".into(),
            current_tab: FilterTab::Favorites,
            is_filtering: true,
            ..Default::default()
        };
        panel.update_filter(FilterKey::Gender, "Female");
        assert!(panel.has_active_filters());

        panel.clear_all_filters();
        assert!(!panel.has_active_filters());
        assert_eq!(panel.current_tab, FilterTab::All);
        assert!(panel.is_filtering);
    }

    #[test]
    fn test_update_and_remove_filter() {
        let mut panel = FilterPanel::default();
        panel.update_filter(FilterKey::Species, "Alien");
        panel.update_filter(FilterKey::Gender, "Genderless");
        assert_eq!(panel.active.species.as_deref(), Some("Alien"));
        assert_eq!(panel.active.gender, Some(CharacterGender::Genderless));

        panel.remove_filter(FilterKey::Species);
        assert_eq!(panel.active.species, None);
        assert!(panel.has_active_filters());
        panel.remove_filter(FilterKey::Gender);
        assert!(!panel.has_active_filters());
    }

    #[test]
    fn test_set_selected_index_bounds() {
        let mut state = AppState::default();
        assert!(!state.set_selected_index(3));
        assert_eq!(state.selected_index, 0);
    }
}
