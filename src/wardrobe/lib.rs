//! # Wardrobe Architecture
//!
//! Wardrobe is a **UI-agnostic state-management library** for a wardrobe
//! tracker. The UI layer (pages, components, rendering) lives elsewhere;
//! this crate owns the in-memory collections, their persistence to a
//! host key-value store, and the cloud image helpers.
//!
//! ## The Three Seams
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  UI Layer (excluded from this crate)                        │
//! │  - Calls store actions, reads derived views                 │
//! │  - Invokes the cloud helpers directly                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Stores (stores/*, wired by api.rs)                         │
//! │  - Plain ordered lists + CRUD mutations                     │
//! │  - Derived views as pure functions over the current list    │
//! │  - Explicit load/save against the storage wrapper           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Host Seams (storage::KvHost, cloud::host::UploadHost,      │
//! │  stores::settings::Notifier)                                │
//! │  - Traits over the platform primitives                      │
//! │  - MemoryHost / mock impls for tests                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Results, Never Panics
//!
//! Every host interaction is caught at the boundary, logged via `tracing`,
//! and converted into a [`WardrobeError`](error::WardrobeError). Nothing
//! propagates as a panic to the UI layer. Collection mutations on an
//! unmatched id are silent no-ops that report `false` rather than errors.
//!
//! ## Concurrency Model
//!
//! Storage is synchronous. The only async surface is the cloud helper,
//! where "concurrency" means fan-out over concurrent host uploads: each
//! upload races a 30 second timeout, and multi-file uploads settle in any
//! order while the result list is assembled by input index.
//!
//! ## Module Overview
//!
//! - [`api`]: The [`Wardrobe`](api::Wardrobe) facade bundling the stores
//! - [`stores`]: Collection stores (clothing, outfit, calendar, settings)
//! - [`storage`]: Key-value host seam and typed wrapper
//! - [`cloud`]: Cloud path extraction, upload and delete helpers
//! - [`model`]: Core data types
//! - [`dates`]: Calendar date helpers
//! - [`error`]: Error types

pub mod api;
pub mod cloud;
pub mod dates;
pub mod error;
pub mod model;
pub mod storage;
pub mod stores;
