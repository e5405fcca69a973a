use crate::ports::StorePort;
use custos_domain::{AppSetting, DomainError, SettingKey};
use std::sync::Arc;

pub struct GetSettingsUseCase {
    store: Arc<dyn StorePort>,
}

impl GetSettingsUseCase {
    pub fn new(store: Arc<dyn StorePort>) -> Self {
        Self { store }
    }

    pub async fn execute(&self) -> Result<Vec<AppSetting>, DomainError> {
        self.store.get_all_settings().await
    }
}

pub struct UpdateSettingUseCase {
    store: Arc<dyn StorePort>,
}

impl UpdateSettingUseCase {
    pub fn new(store: Arc<dyn StorePort>) -> Self {
        Self { store }
    }

    /// Persists `key = value`. The caller (the control API / CLI wiring
    /// layer, which owns both the store and the decision engine/SOCKS5
    /// server) is responsible for mirroring `protection_enabled`,
    /// `adblock_enabled`, and `proxy_port` into the live runtime flags —
    /// this use case never reaches across layers to do it itself.
    pub async fn execute(&self, key: &str, value: &str) -> Result<(), DomainError> {
        if SettingKey::from_str(key).is_none() {
            return Err(DomainError::ConfigInvalid(format!(
                "unrecognized setting key: {key}"
            )));
        }
        self.store.set_setting(key, value).await
    }
}
