//! Service clients used by the storefront handlers.

pub mod settings;
pub mod storage;

pub use settings::SettingsCache;
pub use storage::{ObjectStore, StorageError, StoredObject};
