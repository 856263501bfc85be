use super::{HostError, KvHost};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory host for testing and development.
/// Does NOT persist data across process restarts.
#[derive(Default)]
pub struct MemoryHost {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KvHost for MemoryHost {
    fn read(&self, key: &str) -> Result<Value, HostError> {
        // Absent keys surface as the host's empty-string sentinel.
        Ok(self
            .lock()
            .get(key)
            .cloned()
            .unwrap_or_else(|| Value::String(String::new())))
    }

    fn write(&self, key: &str, value: Value) -> Result<(), HostError> {
        self.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), HostError> {
        self.lock().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), HostError> {
        self.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_key_reads_as_empty_sentinel() {
        let host = MemoryHost::new();
        assert_eq!(host.read("nope").unwrap(), Value::String(String::new()));
    }

    #[test]
    fn write_read_remove() {
        let host = MemoryHost::new();
        host.write("k", Value::from(7)).unwrap();
        assert_eq!(host.read("k").unwrap(), Value::from(7));
        host.remove("k").unwrap();
        assert_eq!(host.read("k").unwrap(), Value::String(String::new()));
    }

    #[test]
    fn clear_empties_the_store() {
        let host = MemoryHost::new();
        host.write("a", Value::from(1)).unwrap();
        host.write("b", Value::from(2)).unwrap();
        host.clear().unwrap();
        assert!(host.is_empty());
    }
}
