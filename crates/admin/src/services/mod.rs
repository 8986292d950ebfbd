//! Service clients used by the admin handlers.

pub mod email;
pub mod settings;
pub mod storage;

pub use email::{EmailError, EmailService, QuoteEmail};
pub use settings::SettingsCache;
pub use storage::{ObjectStore, StorageError, StoredObject};
