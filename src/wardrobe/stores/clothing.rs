use crate::error::{Result, WardrobeError};
use crate::model::{ClothingItem, ClothingStatus};
use crate::storage::{KvHost, Storage};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const STORAGE_KEY: &str = "clothing-store";

/// Fields of a clothing item that [`ClothingStore::update`] can patch.
/// `None` leaves the current value untouched.
#[derive(Debug, Clone, Default)]
pub struct ClothingUpdate {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub price: Option<f64>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub status: Option<ClothingStatus>,
}

/// The whitelisted subset of store state that gets persisted.
/// The loading flag never is.
#[derive(Debug, Serialize, Deserialize)]
struct ClothingSnapshot {
    items: Vec<ClothingItem>,
    selected_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct ClothingStore {
    items: Vec<ClothingItem>,
    pub selected_id: Option<String>,
    is_loading: bool,
}

impl ClothingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ClothingItem] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    /// Items not archived, in insertion order.
    pub fn active(&self) -> Vec<&ClothingItem> {
        self.items
            .iter()
            .filter(|c| c.status != ClothingStatus::Archived)
            .collect()
    }

    /// First item with the given id, `None` when absent.
    pub fn get_by_id(&self, id: &str) -> Option<&ClothingItem> {
        self.items.iter().find(|c| c.id == id)
    }

    pub fn replace_all(&mut self, items: Vec<ClothingItem>) {
        self.items = items;
    }

    pub fn add(&mut self, item: ClothingItem) {
        self.items.push(item);
    }

    /// Merge `update` into the first item matching `id`, stamping a fresh
    /// update timestamp. Returns `false` (list untouched) when no item
    /// matches.
    pub fn update(&mut self, id: &str, update: ClothingUpdate) -> bool {
        let Some(item) = self.items.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        if let Some(name) = update.name {
            item.name = name;
        }
        if let Some(brand) = update.brand {
            item.brand = brand;
        }
        if let Some(category) = update.category {
            item.category = category;
        }
        if let Some(color) = update.color {
            item.color = color;
        }
        if let Some(size) = update.size {
            item.size = size;
        }
        if let Some(purchase_date) = update.purchase_date {
            item.purchase_date = Some(purchase_date);
        }
        if let Some(price) = update.price {
            item.price = Some(price);
        }
        if let Some(images) = update.images {
            item.images = images;
        }
        if let Some(tags) = update.tags {
            item.tags = tags;
        }
        if let Some(status) = update.status {
            item.status = status;
        }
        item.updated_at = Utc::now();
        true
    }

    /// Remove the first item matching `id`, `false` when absent.
    pub fn delete(&mut self, id: &str) -> bool {
        match self.items.iter().position(|c| c.id == id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Bootstrap from storage. A missing snapshot leaves the current list
    /// in place; any host error is logged and swallowed. The loading flag
    /// is reset on every path.
    pub fn load<H: KvHost>(&mut self, storage: &Storage<H>) {
        self.is_loading = true;
        match storage.get::<ClothingSnapshot>(STORAGE_KEY) {
            Ok(snapshot) => {
                self.items = snapshot.items;
                self.selected_id = snapshot.selected_id;
            }
            Err(WardrobeError::NotFound(_)) => {}
            Err(e) => tracing::warn!(error = %e, "failed to load clothing list from storage"),
        }
        self.is_loading = false;
    }

    pub fn save<H: KvHost>(&self, storage: &Storage<H>) -> Result<()> {
        storage.set(
            STORAGE_KEY,
            &ClothingSnapshot {
                items: self.items.clone(),
                selected_id: self.selected_id.clone(),
            },
        )
    }
}
