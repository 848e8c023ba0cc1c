//! Favorites persistence.
//!
//! The on-disk file wraps the payload in a versioned envelope:
//! `{"state":{"favorites":[...]},"version":1}`. A missing file means no
//! favorites yet; a corrupt file is an error so the caller can surface it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const FAVORITES_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct FavoritesFile {
    state: FavoritesPayload,
    version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct FavoritesPayload {
    favorites: Vec<u32>,
}

pub fn default_favorites_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("mortydex")
        .join("favorites.json")
}

pub async fn load_favorites(path: &Path) -> Result<Vec<u32>, String> {
    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(format!("Failed to read favorites file: {}", e)),
    };
    let file: FavoritesFile =
        serde_json::from_str(&json).map_err(|e| format!("Favorites file corrupted: {}", e))?;
    Ok(file.state.favorites)
}

pub async fn save_favorites(path: &Path, ids: &[u32]) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("Failed to create favorites directory: {}", e))?;
    }
    let file = FavoritesFile {
        state: FavoritesPayload {
            favorites: ids.to_vec(),
        },
        version: FAVORITES_VERSION,
    };
    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| format!("Failed to serialize favorites: {}", e))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| format!("Failed to write favorites file: {}", e))
}
