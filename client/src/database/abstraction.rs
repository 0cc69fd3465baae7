use crate::Result;

pub mod file;
pub mod memory;

/// A flat slot store: whole values are read and replaced, never patched.
///
/// There is no optimistic-concurrency check, two writers to the same key
/// simply overwrite each other.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}
