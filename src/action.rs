use serde::{Deserialize, Serialize};

use crate::state::{Character, PageInfo};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,

    CharactersDidLoad {
        seq: u64,
        page: u32,
        append: bool,
        info: PageInfo,
        characters: Vec<Character>,
    },
    CharactersDidError { seq: u64, error: String },
    LoadMore,
    Refresh,
    CharactersReset,

    SearchOpen,
    SearchClose,
    SearchQueryChange(String),
    SearchQuerySubmit(String),

    FilterCycleStatus,
    FilterCycleGender,
    FilterCycleSpecies,
    FiltersClear,
    TabToggle,

    SelectionMove(i16),
    CharacterSelect(usize),
    DetailOpen,
    DetailClose,

    ToggleFavorite,
    FavoritesDidLoad(Vec<u32>),
    FavoritesDidError(String),
    FavoritesDidSave,
    FavoritesSaveDidError(String),
    FavoriteCharactersDidLoad { seq: u64, characters: Vec<Character> },

    EpisodeNameDidLoad { url: String, name: String },

    #[action(category = "ui")]
    UiTerminalResize(u16, u16),
    Render,
    Quit,
}
