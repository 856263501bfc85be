use crate::error::{Result, WardrobeError};
use crate::model::Outfit;
use crate::storage::{KvHost, Storage};
use chrono::Utc;
use serde::{Deserialize, Serialize};

pub const STORAGE_KEY: &str = "outfit-store";

/// Fields of an outfit that [`OutfitStore::update`] can patch.
#[derive(Debug, Clone, Default)]
pub struct OutfitUpdate {
    pub name: Option<String>,
    pub clothing_ids: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OutfitSnapshot {
    items: Vec<Outfit>,
    selected_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct OutfitStore {
    items: Vec<Outfit>,
    pub selected_id: Option<String>,
    is_loading: bool,
}

impl OutfitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Outfit] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Outfit> {
        self.items.iter().find(|o| o.id == id)
    }

    pub fn replace_all(&mut self, items: Vec<Outfit>) {
        self.items = items;
    }

    pub fn add(&mut self, outfit: Outfit) {
        self.items.push(outfit);
    }

    /// Merge `update` into the first outfit matching `id`, stamping a
    /// fresh update timestamp. `false` when no outfit matches.
    pub fn update(&mut self, id: &str, update: OutfitUpdate) -> bool {
        let Some(outfit) = self.items.iter_mut().find(|o| o.id == id) else {
            return false;
        };
        if let Some(name) = update.name {
            outfit.name = name;
        }
        if let Some(clothing_ids) = update.clothing_ids {
            outfit.clothing_ids = clothing_ids;
        }
        if let Some(images) = update.images {
            outfit.images = images;
        }
        outfit.updated_at = Utc::now();
        true
    }

    pub fn delete(&mut self, id: &str) -> bool {
        match self.items.iter().position(|o| o.id == id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn load<H: KvHost>(&mut self, storage: &Storage<H>) {
        self.is_loading = true;
        match storage.get::<OutfitSnapshot>(STORAGE_KEY) {
            Ok(snapshot) => {
                self.items = snapshot.items;
                self.selected_id = snapshot.selected_id;
            }
            Err(WardrobeError::NotFound(_)) => {}
            Err(e) => tracing::warn!(error = %e, "failed to load outfits from storage"),
        }
        self.is_loading = false;
    }

    pub fn save<H: KvHost>(&self, storage: &Storage<H>) -> Result<()> {
        storage.set(
            STORAGE_KEY,
            &OutfitSnapshot {
                items: self.items.clone(),
                selected_id: self.selected_id.clone(),
            },
        )
    }
}
