//! In-memory collaborators
//!
//! Used by tests and local tooling. The ticket store evaluates predicates
//! with [`Predicate::evaluate`], the reference semantics every real store
//! adapter must agree with.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use dashmap::DashMap;
use helpdesk_common::{RepoResult, RepositoryError};
use parking_lot::RwLock;

use crate::domain::actor::Actor;
use crate::domain::predicate::Predicate;
use crate::domain::ticket::TicketRecord;
use crate::domain::value_objects::{
    CategoryId, ServiceId, SortDirection, SortKey, SortSpec, TicketPriority, UserId,
};
use crate::ports::outbound::{ActorDirectory, ApprovalCatalog, CategoryCatalog, TicketQueryExecutor};

/// In-memory identity directory
#[derive(Default)]
pub struct InMemoryActorDirectory {
    actors: DashMap<UserId, Actor>,
    unavailable: AtomicBool,
}

impl InMemoryActorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, actor: Actor) {
        self.actors.insert(actor.id.clone(), actor);
    }

    /// Make every lookup fail with `Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }
}

#[async_trait]
impl ActorDirectory for InMemoryActorDirectory {
    async fn get_actor(&self, id: &UserId) -> RepoResult<Actor> {
        if self.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(RepositoryError::Unavailable("actor directory".into()));
        }
        self.actors
            .get(id)
            .map(|a| a.value().clone())
            .ok_or_else(|| RepositoryError::NotFound(format!("actor {}", id)))
    }
}

/// In-memory ticket store
#[derive(Default)]
pub struct InMemoryTicketStore {
    tickets: RwLock<Vec<TicketRecord>>,
    failure: RwLock<Option<RepositoryError>>,
    queries: AtomicUsize,
    counts: AtomicUsize,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, ticket: TicketRecord) {
        self.tickets.write().push(ticket);
    }

    /// Fail every subsequent call with `failure`; `None` restores service
    pub fn fail_with(&self, failure: Option<RepositoryError>) {
        *self.failure.write() = failure;
    }

    /// `query` calls served so far
    pub fn query_calls(&self) -> usize {
        self.queries.load(AtomicOrdering::SeqCst)
    }

    /// `count` calls served so far
    pub fn count_calls(&self) -> usize {
        self.counts.load(AtomicOrdering::SeqCst)
    }

    fn check(&self) -> RepoResult<()> {
        match &*self.failure.read() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn priority_rank(priority: TicketPriority) -> usize {
    TicketPriority::ALL
        .iter()
        .position(|p| *p == priority)
        .unwrap_or(0)
}

fn compare(a: &TicketRecord, b: &TicketRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortKey::Priority => priority_rank(a.priority).cmp(&priority_rank(b.priority)),
        SortKey::Status => a.status.code().cmp(b.status.code()),
        SortKey::TicketNumber => a.ticket_number.cmp(&b.ticket_number),
        SortKey::Title => a.title.cmp(&b.title),
    }
}

#[async_trait]
impl TicketQueryExecutor for InMemoryTicketStore {
    async fn query(
        &self,
        predicate: &Predicate,
        sort: &SortSpec,
        skip: u64,
        take: u32,
    ) -> RepoResult<Vec<TicketRecord>> {
        self.queries.fetch_add(1, AtomicOrdering::SeqCst);
        self.check()?;

        let mut matched: Vec<TicketRecord> = self
            .tickets
            .read()
            .iter()
            .filter(|t| predicate.evaluate(*t))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let ord = compare(a, b, sort.key).then_with(|| a.id.cmp(&b.id));
            match sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });

        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        Ok(matched.into_iter().skip(skip).take(take as usize).collect())
    }

    async fn count(&self, predicate: &Predicate) -> RepoResult<u64> {
        self.counts.fetch_add(1, AtomicOrdering::SeqCst);
        self.check()?;
        Ok(self.tickets.read().iter().filter(|t| predicate.evaluate(*t)).count() as u64)
    }
}

struct LegacyCategory {
    id: CategoryId,
    name: String,
    active: bool,
}

/// In-memory category taxonomies
#[derive(Default)]
pub struct InMemoryCategoryCatalog {
    categories: DashMap<CategoryId, String>,
    legacy: RwLock<Vec<LegacyCategory>>,
    failing: AtomicBool,
}

impl InMemoryCategoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a current-taxonomy category
    pub fn add_category(&self, id: CategoryId, name: &str) {
        self.categories.insert(id, name.to_string());
    }

    /// Register a legacy service category
    pub fn add_legacy(&self, id: CategoryId, name: &str, active: bool) {
        self.legacy.write().push(LegacyCategory {
            id,
            name: name.to_string(),
            active,
        });
    }

    /// Make every lookup fail
    pub fn fail_lookups(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    fn check(&self) -> RepoResult<()> {
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(RepositoryError::Unavailable("category catalog".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryCatalog for InMemoryCategoryCatalog {
    async fn category_name(&self, id: &CategoryId) -> RepoResult<Option<String>> {
        self.check()?;
        Ok(self.categories.get(id).map(|n| n.value().clone()))
    }

    async fn legacy_category_by_name(&self, name: &str) -> RepoResult<Option<CategoryId>> {
        self.check()?;
        Ok(self
            .legacy
            .read()
            .iter()
            .find(|c| c.active && c.name == name)
            .map(|c| c.id.clone()))
    }
}

/// In-memory approval configuration
#[derive(Default)]
pub struct InMemoryApprovalCatalog {
    services: RwLock<Vec<ServiceId>>,
    lookups: AtomicUsize,
    failing: AtomicBool,
}

impl InMemoryApprovalCatalog {
    pub fn new(services: Vec<ServiceId>) -> Self {
        Self {
            services: RwLock::new(services),
            lookups: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Lookups served so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(AtomicOrdering::SeqCst)
    }

    /// Make every lookup fail
    pub fn fail_lookups(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }
}

#[async_trait]
impl ApprovalCatalog for InMemoryApprovalCatalog {
    async fn approval_required_services(&self) -> RepoResult<Vec<ServiceId>> {
        self.lookups.fetch_add(1, AtomicOrdering::SeqCst);
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(RepositoryError::Unavailable("approval catalog".into()));
        }
        Ok(self.services.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::predicate::{Field, Value};
    use crate::testing::*;

    fn store() -> InMemoryTicketStore {
        let store = InMemoryTicketStore::new();
        for (id, priority, minutes) in [
            ("a", TicketPriority::Low, 30),
            ("b", TicketPriority::Critical, 10),
            ("c", TicketPriority::Medium, 20),
        ] {
            let mut t = ticket(id);
            t.priority = priority;
            t.created_at = base_time() + chrono::Duration::minutes(minutes);
            store.insert(t);
        }
        store
    }

    fn ids(tickets: &[TicketRecord]) -> Vec<&str> {
        tickets.iter().map(|t| t.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_query_sorts_and_pages() {
        let store = store();
        let all = Predicate::always_true();

        let newest_first = store.query(&all, &SortSpec::default(), 0, 10).await.unwrap();
        assert_eq!(ids(&newest_first), vec!["a", "c", "b"]);

        let by_priority = SortSpec { key: SortKey::Priority, direction: SortDirection::Asc };
        let page = store.query(&all, &by_priority, 1, 1).await.unwrap();
        assert_eq!(ids(&page), vec!["c"]);
    }

    #[tokio::test]
    async fn test_query_with_count_runs_both() {
        let store = store();
        let only_b = Predicate::eq(Field::TicketId, Value::text("b"));

        let (records, total) = store
            .query_with_count(&only_b, &SortSpec::default(), 0, 10)
            .await
            .unwrap();
        assert_eq!(ids(&records), vec!["b"]);
        assert_eq!(total, 1);
        assert_eq!(store.query_calls(), 1);
        assert_eq!(store.count_calls(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = store();
        store.fail_with(Some(RepositoryError::Unavailable("db down".into())));
        assert!(store.count(&Predicate::always_true()).await.is_err());

        store.fail_with(None);
        assert_eq!(store.count(&Predicate::always_true()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_legacy_lookup_skips_inactive() {
        let catalog = InMemoryCategoryCatalog::new();
        catalog.add_legacy(category("old"), "Printers", false);
        catalog.add_legacy(category("new"), "Printers", true);
        assert_eq!(
            catalog.legacy_category_by_name("Printers").await.unwrap(),
            Some(category("new"))
        );
        assert_eq!(catalog.legacy_category_by_name("Scanners").await.unwrap(), None);
    }
}
