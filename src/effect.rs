//! Effects - side effects declared by the reducer

use crate::state::CharacterFilters;

/// Side effects that can be triggered by actions
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Fetch a page of the character list
    LoadCharacters {
        seq: u64,
        filters: CharacterFilters,
        page: u32,
        append: bool,
    },
    /// Debounced page-1 fetch driven by search keystrokes
    SearchCharacters { seq: u64, filters: CharacterFilters },
    /// Batch-fetch the favorited characters
    LoadFavoriteCharacters { seq: u64, ids: Vec<u32> },
    /// Abort the in-flight list fetch, if any
    CancelFetch,
    /// Resolve an episode reference URL to its name
    LoadEpisodeName { url: String },
    /// Read persisted favorites from disk
    LoadFavorites,
    /// Persist the favorites set to disk
    SaveFavorites { ids: Vec<u32> },
}
