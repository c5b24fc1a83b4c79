use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult};

/// Site-wide configuration: one named record, not a magic fixed row.
///
/// Loaded once at process start and refreshed on explicit admin update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub store_name: String,
    pub currency: String,
    pub support_email: Option<String>,
    pub orders_enabled: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            store_name: "Storefront".to_string(),
            currency: "USD".to_string(),
            support_email: None,
            orders_enabled: true,
        }
    }
}

/// Configuration store with get-or-create-default semantics.
pub trait SettingsStore: Send + Sync {
    /// Load the settings record, creating the default one if none exists yet.
    fn load(&self) -> DomainResult<SiteSettings>;

    /// Replace the settings record (admin update).
    fn update(&self, settings: SiteSettings) -> DomainResult<()>;
}

/// In-memory settings store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    record: RwLock<Option<SiteSettings>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn load(&self) -> DomainResult<SiteSettings> {
        let mut record = self
            .record
            .write()
            .map_err(|_| DomainError::storage("settings lock poisoned"))?;
        Ok(record.get_or_insert_with(SiteSettings::default).clone())
    }

    fn update(&self, settings: SiteSettings) -> DomainResult<()> {
        let mut record = self
            .record
            .write()
            .map_err(|_| DomainError::storage("settings lock poisoned"))?;
        *record = Some(settings);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_load_creates_the_default_record() {
        let store = InMemorySettingsStore::new();
        let settings = store.load().unwrap();
        assert_eq!(settings, SiteSettings::default());
        // Subsequent loads see the same record.
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn update_replaces_the_record() {
        let store = InMemorySettingsStore::new();
        let mut settings = store.load().unwrap();
        settings.store_name = "Shirts R Us".to_string();
        settings.support_email = Some("help@shirts.example".to_string());
        store.update(settings.clone()).unwrap();
        assert_eq!(store.load().unwrap(), settings);
    }
}
