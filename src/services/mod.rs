//! Business logic services

pub mod auth;
pub mod ledger;
pub mod members;

use crate::{config::LoansConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub ledger: ledger::LedgerService,
    pub members: members::MembersService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, loans_config: LoansConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone()),
            ledger: ledger::LedgerService::new(repository.clone(), loans_config),
            members: members::MembersService::new(repository.clone()),
            repository,
        }
    }

    /// Whether the backing store currently answers queries
    pub async fn store_reachable(&self) -> bool {
        self.repository.ping().await.is_ok()
    }
}
