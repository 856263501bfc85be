//! Settings store: user-defined categories and tags layered over the
//! built-in sets, plus manual backup/restore of that overlay.
//!
//! The merge rule for both lists: start from the built-ins; a custom
//! entry whose name matches an existing entry replaces it in place,
//! anything else appends; the merged list is then sorted by `order`
//! ascending.

use crate::error::{Result, WardrobeError};
use crate::model::{Category, SettingsSnapshot, Tag};
use crate::storage::{KvHost, Storage};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub const STORAGE_KEY: &str = "settings-store";

/// Color assigned to tags whose name resolves to no known tag.
pub const DEFAULT_TAG_COLOR: &str = "#007aff";

/// Palette cycled through when a new tag is added without an explicit
/// color, indexed by the current custom-tag count.
pub const TAG_COLORS: [&str; 10] = [
    "#007aff", "#5856d6", "#ff9500", "#ff2d55", "#34c759", "#ffcc00", "#ff3b30", "#8e8e93",
    "#00c7be", "#af52de",
];

pub static DEFAULT_CATEGORIES: Lazy<Vec<Category>> = Lazy::new(|| {
    [(1, "Tops"), (2, "Bottoms"), (3, "Shoes"), (4, "Accessories")]
        .into_iter()
        .map(|(order, name)| Category {
            id: format!("cat-{order}"),
            name: name.to_string(),
            icon: None,
            order,
        })
        .collect()
});

pub static DEFAULT_TAGS: Lazy<Vec<Tag>> = Lazy::new(|| {
    [
        (1, "Daily", "#007aff"),
        (2, "Work", "#5856d6"),
        (3, "Sport", "#ff9500"),
        (4, "Formal", "#ff2d55"),
        (5, "Casual", "#34c759"),
    ]
    .into_iter()
    .map(|(order, name, color)| Tag {
        id: format!("tag-{order}"),
        name: name.to_string(),
        color: color.to_string(),
        order,
    })
    .collect()
});

/// Host toast/notification primitive.
pub trait Notifier {
    fn toast(&self, message: &str);
}

/// Fields of a custom category that [`SettingsStore::update_category`]
/// can patch.
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub order: Option<u32>,
}

/// Fields of a custom tag that [`SettingsStore::update_tag`] can patch.
#[derive(Debug, Clone, Default)]
pub struct TagUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub order: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SettingsStoreSnapshot {
    custom_categories: Vec<Category>,
    custom_tags: Vec<Tag>,
    last_backup_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct SettingsStore {
    custom_categories: Vec<Category>,
    custom_tags: Vec<Tag>,
    last_backup_time: Option<DateTime<Utc>>,
    is_loading: bool,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn custom_categories(&self) -> &[Category] {
        &self.custom_categories
    }

    pub fn custom_tags(&self) -> &[Tag] {
        &self.custom_tags
    }

    pub fn last_backup_time(&self) -> Option<DateTime<Utc>> {
        self.last_backup_time
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Built-in categories with the custom overlay merged in.
    pub fn all_categories(&self) -> Vec<Category> {
        merge_overlay(
            DEFAULT_CATEGORIES.as_slice(),
            &self.custom_categories,
            |c| &c.name,
            |c| c.order,
        )
    }

    /// Built-in tags with the custom overlay merged in.
    pub fn all_tags(&self) -> Vec<Tag> {
        merge_overlay(DEFAULT_TAGS.as_slice(), &self.custom_tags, |t| &t.name, |t| t.order)
    }

    pub fn category_names(&self) -> Vec<String> {
        self.all_categories().into_iter().map(|c| c.name).collect()
    }

    pub fn tag_names(&self) -> Vec<String> {
        self.all_tags().into_iter().map(|t| t.name).collect()
    }

    /// Color of the merged tag named `name`, or the default color.
    pub fn tag_color(&self, name: &str) -> String {
        self.all_tags()
            .into_iter()
            .find(|t| t.name == name)
            .map(|t| t.color)
            .unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string())
    }

    /// Append a custom category. The fresh id is derived from the current
    /// time and `order` places it after every existing entry.
    pub fn add_category(&mut self, name: impl Into<String>) -> Category {
        let category = Category {
            id: format!("cat-{}", Utc::now().timestamp_millis()),
            name: name.into(),
            icon: None,
            order: (self.custom_categories.len() + DEFAULT_CATEGORIES.len() + 1) as u32,
        };
        self.custom_categories.push(category.clone());
        category
    }

    pub fn update_category(&mut self, id: &str, update: CategoryUpdate) -> bool {
        let Some(category) = self.custom_categories.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        if let Some(name) = update.name {
            category.name = name;
        }
        if let Some(icon) = update.icon {
            category.icon = Some(icon);
        }
        if let Some(order) = update.order {
            category.order = order;
        }
        true
    }

    pub fn delete_category(&mut self, id: &str) -> bool {
        match self.custom_categories.iter().position(|c| c.id == id) {
            Some(index) => {
                self.custom_categories.remove(index);
                true
            }
            None => false,
        }
    }

    /// Move the custom category at `from` to position `to`, then renumber
    /// every entry's `order` to its new position + 1.
    pub fn move_category(&mut self, from: usize, to: usize) {
        move_and_renumber(&mut self.custom_categories, from, to, |c, order| {
            c.order = order
        });
    }

    /// Append a custom tag. Without an explicit color, one is picked from
    /// the palette by the current custom-tag count.
    pub fn add_tag(&mut self, name: impl Into<String>, color: Option<String>) -> Tag {
        let color =
            color.unwrap_or_else(|| TAG_COLORS[self.custom_tags.len() % TAG_COLORS.len()].to_string());
        let tag = Tag {
            id: format!("tag-{}", Utc::now().timestamp_millis()),
            name: name.into(),
            color,
            order: (self.custom_tags.len() + DEFAULT_TAGS.len() + 1) as u32,
        };
        self.custom_tags.push(tag.clone());
        tag
    }

    pub fn update_tag(&mut self, id: &str, update: TagUpdate) -> bool {
        let Some(tag) = self.custom_tags.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if let Some(name) = update.name {
            tag.name = name;
        }
        if let Some(color) = update.color {
            tag.color = color;
        }
        if let Some(order) = update.order {
            tag.order = order;
        }
        true
    }

    pub fn delete_tag(&mut self, id: &str) -> bool {
        match self.custom_tags.iter().position(|t| t.id == id) {
            Some(index) => {
                self.custom_tags.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn move_tag(&mut self, from: usize, to: usize) {
        move_and_renumber(&mut self.custom_tags, from, to, |t, order| t.order = order);
    }

    /// Wipe the entire host storage namespace (every store's key, not
    /// just this one's) and reset the overlay state.
    pub fn clear_cache<H: KvHost>(&mut self, storage: &Storage<H>) -> Result<()> {
        storage.clear()?;
        self.last_backup_time = None;
        self.custom_categories.clear();
        self.custom_tags.clear();
        Ok(())
    }

    /// The full settings bundle for external backup.
    pub fn export_data(&self) -> SettingsSnapshot {
        SettingsSnapshot {
            categories: self.custom_categories.clone(),
            default_categories: DEFAULT_CATEGORIES.clone(),
            tags: self.custom_tags.clone(),
            default_tags: DEFAULT_TAGS.clone(),
            last_backup_time: self.last_backup_time,
        }
    }

    /// Serialize the settings bundle. The cause of any failure is logged
    /// and replaced by a generic error in the returned result.
    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string(&self.export_data()).map_err(|e| {
            tracing::error!(error = %e, "failed to export data");
            WardrobeError::Export
        })
    }

    /// Overwrite the custom overlay and last-backup time from `snapshot`
    /// and notify the user via the host toast.
    pub fn import_data(&mut self, snapshot: SettingsSnapshot, notifier: &dyn Notifier) {
        self.custom_categories = snapshot.categories;
        self.custom_tags = snapshot.tags;
        if let Some(time) = snapshot.last_backup_time {
            self.last_backup_time = Some(time);
        }
        notifier.toast("Data imported");
    }

    /// Parse and import a previously exported bundle. The parse failure
    /// cause is logged and replaced by a generic error.
    pub fn import_json(&mut self, json: &str, notifier: &dyn Notifier) -> Result<()> {
        let snapshot: SettingsSnapshot = serde_json::from_str(json).map_err(|e| {
            tracing::error!(error = %e, "failed to import data");
            WardrobeError::Import
        })?;
        self.import_data(snapshot, notifier);
        Ok(())
    }

    pub fn load<H: KvHost>(&mut self, storage: &Storage<H>) {
        self.is_loading = true;
        match storage.get::<SettingsStoreSnapshot>(STORAGE_KEY) {
            Ok(snapshot) => {
                self.custom_categories = snapshot.custom_categories;
                self.custom_tags = snapshot.custom_tags;
                self.last_backup_time = snapshot.last_backup_time;
            }
            Err(WardrobeError::NotFound(_)) => {}
            Err(e) => tracing::warn!(error = %e, "failed to load settings from storage"),
        }
        self.is_loading = false;
    }

    pub fn save<H: KvHost>(&self, storage: &Storage<H>) -> Result<()> {
        storage.set(
            STORAGE_KEY,
            &SettingsStoreSnapshot {
                custom_categories: self.custom_categories.clone(),
                custom_tags: self.custom_tags.clone(),
                last_backup_time: self.last_backup_time,
            },
        )
    }

    pub fn mark_backed_up(&mut self, time: DateTime<Utc>) {
        self.last_backup_time = Some(time);
    }
}

fn merge_overlay<T: Clone>(
    builtin: &[T],
    custom: &[T],
    name: impl Fn(&T) -> &str,
    order: impl Fn(&T) -> u32,
) -> Vec<T> {
    let mut combined = builtin.to_vec();
    for entry in custom {
        match combined.iter().position(|e| name(e) == name(entry)) {
            Some(index) => combined[index] = entry.clone(),
            None => combined.push(entry.clone()),
        }
    }
    // Stable sort keeps replaced entries at their built-in position
    // within equal orders.
    combined.sort_by_key(|e| order(e));
    combined
}

fn move_and_renumber<T>(items: &mut Vec<T>, from: usize, to: usize, set_order: impl Fn(&mut T, u32)) {
    if from >= items.len() {
        return;
    }
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
    for (index, item) in items.iter_mut().enumerate() {
        set_order(item, (index + 1) as u32);
    }
}
