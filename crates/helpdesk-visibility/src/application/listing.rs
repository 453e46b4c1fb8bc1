//! Ticket listing service
//!
//! Orchestrates the read path: resolve the actor, validate and authorize
//! the filter, build the role grant, resolve the category, merge, execute,
//! then classify SLA state on what came back.
//!
//! Without an SLA filter the store paginates. With one, the whole matching
//! set is scanned in batches and classified, and pagination happens here,
//! so `total` and `page_count` count real SLA matches.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use helpdesk_common::{ConfigError, EngineConfig, RepositoryError, VisibilityError, VisibilityResult};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::actor::ActorResolver;
use super::dto::{FilterRequest, ListOutcome, ListedTicket, TicketPage, TicketStats};
use crate::domain::actor::Actor;
use crate::domain::filter::ValidatedFilter;
use crate::domain::predicate::Predicate;
use crate::domain::services::{
    CategoryEquivalenceResolver, FilterMerger, SlaClassifier, VisibilityContext, VisibilityPolicy,
};
use crate::domain::ticket::TicketRecord;
use crate::domain::value_objects::{SlaBucket, SortSpec, UserId};
use crate::ports::inbound::TicketListing;
use crate::ports::outbound::{ActorDirectory, ApprovalCatalog, CategoryCatalog, TicketQueryExecutor};

/// Ticket listing service
pub struct TicketListingService {
    config: EngineConfig,
    actors: ActorResolver,
    tickets: Arc<dyn TicketQueryExecutor>,
    approvals: Arc<dyn ApprovalCatalog>,
    categories: CategoryEquivalenceResolver,
    policy: VisibilityPolicy,
    merger: FilterMerger,
    sla: SlaClassifier,
}

fn store_error(err: RepositoryError) -> VisibilityError {
    error!(error = %err, "ticket store failed");
    err.into()
}

impl TicketListingService {
    /// Wire the service. Fails if `config` is inconsistent.
    pub fn new(
        config: EngineConfig,
        actors: Arc<dyn ActorDirectory>,
        tickets: Arc<dyn TicketQueryExecutor>,
        categories: Arc<dyn CategoryCatalog>,
        approvals: Arc<dyn ApprovalCatalog>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let policy = VisibilityPolicy::new(&config.well_known_categories)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(Self {
            merger: FilterMerger::new(&config),
            sla: SlaClassifier::new(config.sla_at_risk_ratio),
            actors: ActorResolver::new(actors),
            categories: CategoryEquivalenceResolver::new(categories),
            tickets,
            approvals,
            policy,
            config,
        })
    }

    /// The merged predicate `actor` would query with for `filter`
    pub async fn build_predicate(
        &self,
        actor: &Actor,
        filter: &ValidatedFilter,
    ) -> VisibilityResult<Predicate> {
        let mut ctx = VisibilityContext {
            workbench: filter.workbench,
            approval_required_services: Vec::new(),
        };
        if self.policy.needs_approval_gate(actor, filter.workbench) {
            ctx.approval_required_services =
                self.approvals.approval_required_services().await.map_err(|e| {
                    error!(error = %e, "approval catalog lookup failed");
                    VisibilityError::from(e)
                })?;
        }

        let grant = self.policy.build(actor, &ctx);
        let grant = self.merger.apply_workbench(actor, grant, filter.workbench);

        let category = match &filter.category_id {
            Some(id) => self.categories.resolve(id, &grant).await?.into_clause(),
            None => None,
        };

        Ok(self.merger.merge(actor, &grant, filter, category))
    }

    /// [`TicketListing::list_tickets`] with an explicit clock
    pub async fn list_tickets_at(
        &self,
        actor_id: &UserId,
        request: FilterRequest,
        now: DateTime<Utc>,
    ) -> VisibilityResult<ListOutcome> {
        let span = info_span!("list_tickets", request_id = %Uuid::new_v4(), actor_id = %actor_id);
        self.list(actor_id, request, now).instrument(span).await
    }

    async fn list(
        &self,
        actor_id: &UserId,
        request: FilterRequest,
        now: DateTime<Utc>,
    ) -> VisibilityResult<ListOutcome> {
        let actor = self.actors.resolve(actor_id).await?;

        let filter = request.validate(&self.config).map_err(|e| {
            warn!(error = %e, "filter rejected");
            e
        })?;
        if let Err(e) = filter.authorize(&actor.role) {
            warn!(role = %actor.role, error = %e, "filter denied");
            return Err(e);
        }

        let predicate = self.build_predicate(&actor, &filter).await?;
        debug!(predicate = %predicate, "merged predicate");

        if filter.stats {
            let stats = self.stats(&predicate, &filter, now).await?;
            info!(total = stats.total, "ticket stats computed");
            return Ok(ListOutcome::Stats(stats));
        }

        let page = match filter.sla_status {
            Some(bucket) => self.page_by_sla(&predicate, &filter, bucket, now).await?,
            None => self.page(&predicate, &filter, now).await?,
        };
        info!(total = page.total, returned = page.tickets.len(), "tickets listed");
        Ok(ListOutcome::Page(page))
    }

    async fn page(
        &self,
        predicate: &Predicate,
        filter: &ValidatedFilter,
        now: DateTime<Utc>,
    ) -> VisibilityResult<TicketPage> {
        let (records, total) = self
            .tickets
            .query_with_count(predicate, &filter.sort, filter.skip(), filter.page_size)
            .await
            .map_err(store_error)?;

        let tickets = records
            .into_iter()
            .map(|ticket| ListedTicket {
                sla_bucket: self.sla.classify(&ticket, now),
                ticket,
            })
            .collect();

        Ok(TicketPage {
            tickets,
            total,
            page: filter.page,
            page_size: filter.page_size,
            page_count: TicketPage::page_count(total, filter.page_size),
        })
    }

    async fn page_by_sla(
        &self,
        predicate: &Predicate,
        filter: &ValidatedFilter,
        wanted: SlaBucket,
        now: DateTime<Utc>,
    ) -> VisibilityResult<TicketPage> {
        let mut matched = Vec::new();
        self.scan(predicate, &filter.sort, |ticket| {
            let bucket = self.sla.classify(&ticket, now);
            if bucket == wanted {
                matched.push(ListedTicket { ticket, sla_bucket: bucket });
            }
        })
        .await?;

        let total = matched.len() as u64;
        let skip = usize::try_from(filter.skip()).unwrap_or(usize::MAX);
        let tickets = matched
            .into_iter()
            .skip(skip)
            .take(filter.page_size as usize)
            .collect();

        Ok(TicketPage {
            tickets,
            total,
            page: filter.page,
            page_size: filter.page_size,
            page_count: TicketPage::page_count(total, filter.page_size),
        })
    }

    async fn stats(
        &self,
        predicate: &Predicate,
        filter: &ValidatedFilter,
        now: DateTime<Utc>,
    ) -> VisibilityResult<TicketStats> {
        let mut stats = TicketStats::default();
        self.scan(predicate, &SortSpec::default(), |ticket| {
            let bucket = self.sla.classify(&ticket, now);
            if filter.sla_status.map_or(true, |wanted| wanted == bucket) {
                stats.record(&ticket, bucket);
            }
        })
        .await?;
        Ok(stats)
    }

    /// Visit every matching record, `sla_scan_batch_size` at a time
    async fn scan(
        &self,
        predicate: &Predicate,
        sort: &SortSpec,
        mut visit: impl FnMut(TicketRecord) + Send,
    ) -> VisibilityResult<()> {
        let batch = self.config.sla_scan_batch_size;
        let mut skip = 0u64;
        loop {
            let records = self
                .tickets
                .query(predicate, sort, skip, batch)
                .await
                .map_err(store_error)?;
            let fetched = records.len();
            records.into_iter().for_each(&mut visit);

            if fetched < batch as usize {
                return Ok(());
            }
            skip += fetched as u64;
        }
    }
}

#[async_trait]
impl TicketListing for TicketListingService {
    async fn list_tickets(
        &self,
        actor_id: &UserId,
        request: FilterRequest,
    ) -> VisibilityResult<ListOutcome> {
        self.list_tickets_at(actor_id, request, Utc::now()).await
    }
}
