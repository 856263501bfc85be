//! # Collection Stores
//!
//! Each store owns one ordered in-memory list plus a loading flag, and
//! follows the same shape:
//!
//! - `replace_all` overwrites the list wholesale (import / storage load)
//! - `add` appends; the caller guarantees id uniqueness
//! - `update(id, partial)` merges fields into the first match, reporting
//!   `false` (list untouched) for an unmatched id
//! - `delete(id)` removes the first match, `false` when absent
//! - `load` reads the store's snapshot key, leaving the current list in
//!   place when nothing is persisted and swallowing (but logging) host
//!   errors; the loading flag is always reset
//! - `save` writes the whitelisted snapshot back
//!
//! Derived views are pure functions over the current list, recomputed on
//! demand. Cross-store references (outfit → clothing ids, wear record →
//! outfit/clothing ids) are loose foreign keys: never enforced, never
//! cascaded on delete.

pub mod calendar;
pub mod clothing;
pub mod outfit;
pub mod settings;
