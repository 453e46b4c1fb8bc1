//! Outbound ports
//!
//! Store, directory and catalog interfaces that infrastructure must implement.
//! All of them are read-only.

use async_trait::async_trait;
use helpdesk_common::RepoResult;

use crate::domain::actor::Actor;
use crate::domain::predicate::Predicate;
use crate::domain::ticket::TicketRecord;
use crate::domain::value_objects::{CategoryId, ServiceId, SortSpec, UserId};

/// Identity directory
#[async_trait]
pub trait ActorDirectory: Send + Sync {
    /// Load an actor; `RepositoryError::NotFound` if the id does not resolve
    async fn get_actor(&self, id: &UserId) -> RepoResult<Actor>;
}

/// Ticket store, queried through the predicate tree
#[async_trait]
pub trait TicketQueryExecutor: Send + Sync {
    /// One page of matching records in `sort` order
    async fn query(
        &self,
        predicate: &Predicate,
        sort: &SortSpec,
        skip: u64,
        take: u32,
    ) -> RepoResult<Vec<TicketRecord>>;

    /// Number of matching records
    async fn count(&self, predicate: &Predicate) -> RepoResult<u64>;

    /// Page and total, issued concurrently
    async fn query_with_count(
        &self,
        predicate: &Predicate,
        sort: &SortSpec,
        skip: u64,
        take: u32,
    ) -> RepoResult<(Vec<TicketRecord>, u64)> {
        tokio::try_join!(self.query(predicate, sort, skip, take), self.count(predicate))
    }
}

/// Category taxonomies
#[async_trait]
pub trait CategoryCatalog: Send + Sync {
    /// Display name of a current-taxonomy category; `None` if unknown
    async fn category_name(&self, id: &CategoryId) -> RepoResult<Option<String>>;

    /// Active legacy service category with exactly this name
    async fn legacy_category_by_name(&self, name: &str) -> RepoResult<Option<CategoryId>>;
}

/// Service approval configuration, the only source for the approval gate
#[async_trait]
pub trait ApprovalCatalog: Send + Sync {
    /// Services whose tickets need an approval before work starts
    async fn approval_required_services(&self) -> RepoResult<Vec<ServiceId>>;
}
