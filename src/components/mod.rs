pub mod character_detail;
pub mod character_list;
pub mod search_overlay;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use character_detail::{CharacterDetail, CharacterDetailProps};
pub use character_list::{CharacterList, CharacterListProps};
pub use search_overlay::{SearchOverlay, SearchOverlayProps};
