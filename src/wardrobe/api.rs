//! # The Wardrobe Facade
//!
//! [`Wardrobe`] bundles the four collection stores with one storage
//! wrapper so a host app can bootstrap and snapshot everything in one
//! place. It is a thin layer: all behavior lives in the stores, and the
//! stores stay directly reachable as public fields.
//!
//! Generic over [`KvHost`] so tests run against
//! [`MemoryHost`](crate::storage::memory::MemoryHost) while production
//! wires the platform store.

use crate::error::Result;
use crate::storage::{KvHost, Storage};
use crate::stores::calendar::CalendarStore;
use crate::stores::clothing::ClothingStore;
use crate::stores::outfit::OutfitStore;
use crate::stores::settings::SettingsStore;

pub struct Wardrobe<H: KvHost> {
    storage: Storage<H>,
    pub clothing: ClothingStore,
    pub outfits: OutfitStore,
    pub calendar: CalendarStore,
    pub settings: SettingsStore,
}

impl<H: KvHost> Wardrobe<H> {
    pub fn new(host: H) -> Self {
        Self {
            storage: Storage::new(host),
            clothing: ClothingStore::new(),
            outfits: OutfitStore::new(),
            calendar: CalendarStore::new(),
            settings: SettingsStore::new(),
        }
    }

    pub fn storage(&self) -> &Storage<H> {
        &self.storage
    }

    /// Bootstrap every store from storage. Missing snapshots leave the
    /// in-memory state untouched; errors are logged and swallowed per
    /// store, so one bad snapshot cannot block the rest.
    pub fn load_all(&mut self) {
        self.clothing.load(&self.storage);
        self.outfits.load(&self.storage);
        self.calendar.load(&self.storage);
        self.settings.load(&self.storage);
    }

    /// Persist every store's whitelisted snapshot. Stops at the first
    /// storage failure.
    pub fn save_all(&self) -> Result<()> {
        self.clothing.save(&self.storage)?;
        self.outfits.save(&self.storage)?;
        self.calendar.save(&self.storage)?;
        self.settings.save(&self.storage)?;
        Ok(())
    }

    /// Wipe the whole storage namespace and reset the settings overlay.
    /// In-memory collections are left alone; the caller decides whether
    /// to also clear them.
    pub fn clear_cache(&mut self) -> Result<()> {
        self.settings.clear_cache(&self.storage)
    }
}
