//! # Storage Layer
//!
//! The host platform exposes a synchronous key-value store. This module
//! defines that seam as the [`KvHost`] trait and wraps it in [`Storage`],
//! which adds typed (de)serialization and a uniform error shape.
//!
//! ## The Empty Sentinel
//!
//! The host signals "key not present" by returning an empty string value
//! rather than a distinct not-found error. [`Storage::get`] normalizes
//! that sentinel into [`WardrobeError::NotFound`], so callers never see
//! it. A host-thrown error becomes [`WardrobeError::Storage`].
//!
//! ## Implementations
//!
//! - [`memory::MemoryHost`]: in-memory host for tests and development
//!
//! All operations are synchronous and visible immediately; there is no
//! batching and no transaction layer.

use crate::error::{Result, WardrobeError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub mod memory;

/// Error reported by a host storage primitive.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HostError(pub String);

/// The host key-value primitive.
///
/// Implementations report an absent key from [`read`](Self::read) as an
/// empty string value, matching the host convention.
pub trait KvHost {
    fn read(&self, key: &str) -> std::result::Result<Value, HostError>;
    fn write(&self, key: &str, value: Value) -> std::result::Result<(), HostError>;
    fn remove(&self, key: &str) -> std::result::Result<(), HostError>;
    fn clear(&self) -> std::result::Result<(), HostError>;
}

impl<H: KvHost + ?Sized> KvHost for Arc<H> {
    fn read(&self, key: &str) -> std::result::Result<Value, HostError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: Value) -> std::result::Result<(), HostError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> std::result::Result<(), HostError> {
        (**self).remove(key)
    }

    fn clear(&self) -> std::result::Result<(), HostError> {
        (**self).clear()
    }
}

/// Typed wrapper over a [`KvHost`].
pub struct Storage<H: KvHost> {
    host: H,
}

impl<H: KvHost> Storage<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Read and deserialize the value stored under `key`.
    ///
    /// Fails with [`WardrobeError::NotFound`] when the host reports the
    /// empty sentinel, and with [`WardrobeError::Storage`] when the host
    /// itself errors.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self.host.read(key).map_err(|e| {
            tracing::error!(key, error = %e, "storage read failed");
            WardrobeError::Storage(e.to_string())
        })?;
        if is_absent(&value) {
            return Err(WardrobeError::NotFound(key.to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Serialize `value` and store it under `key`.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.host.write(key, value).map_err(|e| {
            tracing::error!(key, error = %e, "storage write failed");
            WardrobeError::Storage(e.to_string())
        })
    }

    /// Remove `key`. Succeeds even when the key is absent.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.host.remove(key).map_err(|e| {
            tracing::error!(key, error = %e, "storage remove failed");
            WardrobeError::Storage(e.to_string())
        })
    }

    /// Wipe every key in the host store.
    pub fn clear(&self) -> Result<()> {
        self.host.clear().map_err(|e| {
            tracing::error!(error = %e, "storage clear failed");
            WardrobeError::Storage(e.to_string())
        })
    }
}

fn is_absent(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty())
}
