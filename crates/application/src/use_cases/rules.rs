use crate::ports::StorePort;
use custos_domain::{DomainError, PaginatedRules, Rule};
use std::sync::Arc;

const MAX_PAGE_SIZE: u32 = 200;

pub struct GetRulesUseCase {
    store: Arc<dyn StorePort>,
}

impl GetRulesUseCase {
    pub fn new(store: Arc<dyn StorePort>) -> Self {
        Self { store }
    }

    pub async fn execute(&self) -> Result<Vec<Rule>, DomainError> {
        self.store.get_rules().await
    }

    pub async fn execute_paginated(
        &self,
        page: u32,
        page_size: u32,
        search: &str,
    ) -> Result<PaginatedRules, DomainError> {
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self.store.get_rules_paginated(page, page_size, search).await
    }
}

pub struct CreateRuleUseCase {
    store: Arc<dyn StorePort>,
}

impl CreateRuleUseCase {
    pub fn new(store: Arc<dyn StorePort>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, rule: Rule) -> Result<i64, DomainError> {
        if rule.pattern.trim().is_empty() {
            return Err(DomainError::InvalidPattern(
                "pattern must not be empty".to_string(),
            ));
        }
        self.store.add_rule(rule).await
    }
}

pub struct UpdateRuleUseCase {
    store: Arc<dyn StorePort>,
}

impl UpdateRuleUseCase {
    pub fn new(store: Arc<dyn StorePort>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, rule: Rule) -> Result<(), DomainError> {
        self.store.update_rule(rule).await
    }
}

pub struct DeleteRuleUseCase {
    store: Arc<dyn StorePort>,
}

impl DeleteRuleUseCase {
    pub fn new(store: Arc<dyn StorePort>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, id: i64) -> Result<(), DomainError> {
        self.store.delete_rule(id).await
    }
}
