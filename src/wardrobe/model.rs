use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a clothing item. Archived items stay in storage
/// but drop out of the active views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClothingStatus {
    #[default]
    Active,
    Archived,
}

/// One garment in the wardrobe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothingItem {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub color: String,
    pub size: String,
    pub purchase_date: Option<NaiveDate>,
    pub price: Option<f64>,
    /// Cloud storage image URLs.
    pub images: Vec<String>,
    /// Tag names, resolved against the settings store.
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: ClothingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClothingItem {
    pub fn new(
        name: impl Into<String>,
        brand: impl Into<String>,
        category: impl Into<String>,
        color: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            brand: brand.into(),
            category: category.into(),
            color: color.into(),
            size: size.into(),
            purchase_date: None,
            price: None,
            images: Vec::new(),
            tags: Vec::new(),
            status: ClothingStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A named combination of clothing items.
///
/// `clothing_ids` are loose references: a deleted item leaves a dangling
/// id here, which callers tolerate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outfit {
    pub id: String,
    pub name: String,
    pub clothing_ids: Vec<String>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Outfit {
    pub fn new(name: impl Into<String>, clothing_ids: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            clothing_ids,
            images: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// What was worn on one calendar day. Multiple records may share a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WearRecord {
    pub id: String,
    pub date: NaiveDate,
    pub outfit_id: Option<String>,
    pub clothing_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl WearRecord {
    pub fn new(date: NaiveDate, clothing_ids: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date,
            outfit_id: None,
            clothing_ids,
            created_at: Utc::now(),
        }
    }

    pub fn with_outfit(mut self, outfit_id: impl Into<String>) -> Self {
        self.outfit_id = Some(outfit_id.into());
        self
    }
}

/// A clothing category, built-in or user-defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    /// Ascending sort position within the merged list.
    pub order: u32,
}

/// A clothing tag, built-in or user-defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
    pub order: u32,
}

/// The exported/imported settings bundle, used for manual backup and
/// restore rather than automatic sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    pub categories: Vec<Category>,
    pub default_categories: Vec<Category>,
    pub tags: Vec<Tag>,
    pub default_tags: Vec<Tag>,
    pub last_backup_time: Option<DateTime<Utc>>,
}
