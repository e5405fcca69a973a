use crate::ports::StorePort;
use custos_domain::{AdblockFilter, DomainError};
use std::sync::Arc;

pub struct GetAdblockFiltersUseCase {
    store: Arc<dyn StorePort>,
}

impl GetAdblockFiltersUseCase {
    pub fn new(store: Arc<dyn StorePort>) -> Self {
        Self { store }
    }

    pub async fn execute(&self) -> Result<Vec<AdblockFilter>, DomainError> {
        self.store.get_adblock_filters().await
    }
}

pub struct AddAdblockFilterUseCase {
    store: Arc<dyn StorePort>,
}

impl AddAdblockFilterUseCase {
    pub fn new(store: Arc<dyn StorePort>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, filter: AdblockFilter) -> Result<i64, DomainError> {
        self.store.add_adblock_filter(filter).await
    }
}

pub struct DeleteAdblockFilterUseCase {
    store: Arc<dyn StorePort>,
}

impl DeleteAdblockFilterUseCase {
    pub fn new(store: Arc<dyn StorePort>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, id: i64) -> Result<(), DomainError> {
        self.store.delete_adblock_filter(id).await
    }
}
