//! Filter Merger
//!
//! Narrows a [`VisibilityGrant`] with the caller's validated filter. Every
//! clause is combined through [`Predicate::merge_and`], so a caller filter
//! can only narrow what the role grant allows. The two workbench overrides
//! in [`FilterMerger::apply_workbench`] are the only places where the role
//! predicate is replaced instead of narrowed.

use helpdesk_common::EngineConfig;
use tracing::debug;

use super::visibility::{confidentiality_clause, VisibilityGrant};
use crate::domain::actor::Actor;
use crate::domain::filter::{AssignmentFilter, DateRange, StatusFilter, ValidatedFilter};
use crate::domain::predicate::{Field, Predicate, Value};
use crate::domain::value_objects::{Role, TicketStatus, WorkbenchFilter};

/// Fields matched by free-text search
const SEARCH_FIELDS: [Field; 9] = [
    Field::Title,
    Field::Description,
    Field::TicketNumber,
    Field::ServiceName,
    Field::BranchName,
    Field::BranchCode,
    Field::CreatorName,
    Field::CreatorEmail,
    Field::AssigneeName,
];

/// Combines role visibility with caller filters
#[derive(Debug, Clone)]
pub struct FilterMerger {
    atm_claim_marker: String,
    claim_keywords: Vec<String>,
}

impl FilterMerger {
    /// Create from engine configuration
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            atm_claim_marker: config.atm_claim_marker.clone(),
            claim_keywords: config.claim_service_keywords.clone(),
        }
    }

    /// Apply the workbench overrides for technicians.
    ///
    /// "my-tickets" replaces the grant for technicians outside the claims
    /// desks. "available-tickets" replaces it for claims-desk technicians.
    /// Every other combination keeps the grant, so a workbench tag never
    /// broadens visibility.
    pub fn apply_workbench(
        &self,
        actor: &Actor,
        grant: VisibilityGrant,
        workbench: WorkbenchFilter,
    ) -> VisibilityGrant {
        if workbench == WorkbenchFilter::None {
            return grant;
        }
        if actor.role != Role::Technician {
            debug!(role = %actor.role, ?workbench, "workbench filter ignored for role");
            return grant;
        }

        let conf = confidentiality_clause(&actor.role);
        match (workbench, actor.is_claims_desk()) {
            (WorkbenchFilter::MyTickets, false) => {
                debug!("my-tickets replaces role visibility");
                grant.replaced_by(assigned_to(actor).merge_and(conf))
            }
            (WorkbenchFilter::AvailableTickets, true) => {
                debug!("available claims replace role visibility");
                let claims = Predicate::any_of(
                    self.claim_keywords
                        .iter()
                        .map(|kw| Predicate::contains(Field::ServiceName, kw.as_str())),
                );
                grant.replaced_by(Predicate::all_of([
                    Predicate::eq(Field::Status, TicketStatus::Open),
                    Predicate::is_null(Field::AssigneeId),
                    claims,
                    conf,
                ]))
            }
            _ => grant,
        }
    }

    /// Narrow `grant` by every populated field of `filter`.
    ///
    /// `category` is the resolved category restriction, or `None` when no
    /// category was requested or the grant already covers it.
    pub fn merge(
        &self,
        actor: &Actor,
        grant: &VisibilityGrant,
        filter: &ValidatedFilter,
        category: Option<Predicate>,
    ) -> Predicate {
        let mut predicate = grant.predicate.clone();

        predicate = predicate.merge_and(status_clause(&filter.statuses));

        if !filter.priorities.is_empty() {
            predicate = predicate.merge_and(Predicate::one_of(
                Field::Priority,
                filter.priorities.iter().copied(),
            ));
        }

        predicate = predicate.merge_and(assignment_clause(actor, &filter.assignment));

        if let Some(branch) = &filter.branch_id {
            predicate = predicate.merge_and(Predicate::eq(Field::BranchId, Value::text(branch.as_str())));
        }

        if let Some(category) = category {
            predicate = predicate.merge_and(category);
        }

        if let Some(classification) = &filter.security_classification {
            predicate = predicate.merge_and(Predicate::eq(
                Field::SecurityClassification,
                Value::text(classification.as_str()),
            ));
        }

        if let Some(confidential) = filter.confidential {
            predicate = predicate.merge_and(Predicate::eq(Field::IsConfidential, confidential));
        }

        predicate = predicate
            .merge_and(range_clause(Field::CreatedAt, &filter.created))
            .merge_and(range_clause(Field::UpdatedAt, &filter.updated));

        if let Some(term) = &filter.search {
            predicate = predicate.merge_and(search_clause(term));
        }

        if !actor.is_claims_desk() {
            predicate = predicate.merge_and(Predicate::negate(Predicate::contains(
                Field::ServiceName,
                self.atm_claim_marker.as_str(),
            )));
        }

        predicate
    }
}

fn assigned_to(actor: &Actor) -> Predicate {
    Predicate::eq(Field::AssigneeId, Value::text(actor.id.as_str()))
}

fn status_clause(statuses: &StatusFilter) -> Predicate {
    match statuses {
        StatusFilter::Default => {
            Predicate::negate(Predicate::eq(Field::Status, TicketStatus::Rejected))
        }
        StatusFilter::All => Predicate::always_true(),
        StatusFilter::Only(set) => Predicate::one_of(Field::Status, set.iter().copied()),
    }
}

fn assignment_clause(actor: &Actor, assignment: &AssignmentFilter) -> Predicate {
    match assignment {
        AssignmentFilter::Any => Predicate::always_true(),
        AssignmentFilter::Assigned => Predicate::is_not_null(Field::AssigneeId),
        AssignmentFilter::Unassigned => Predicate::is_null(Field::AssigneeId),
        AssignmentFilter::Me => assigned_to(actor),
        AssignmentFilter::Technicians { ids, include_unassigned } => {
            let mut options = Vec::new();
            if !ids.is_empty() {
                options.push(Predicate::one_of(
                    Field::AssigneeId,
                    ids.iter().map(|id| Value::text(id.as_str())),
                ));
            }
            if *include_unassigned {
                options.push(Predicate::is_null(Field::AssigneeId));
            }
            Predicate::any_of(options)
        }
        AssignmentFilter::Assignee(id) => {
            Predicate::eq(Field::AssigneeId, Value::text(id.as_str()))
        }
    }
}

fn range_clause(field: Field, range: &DateRange) -> Predicate {
    let mut clause = Predicate::always_true();
    if range.is_open() {
        return clause;
    }
    if let Some(after) = range.after {
        clause = clause.merge_and(Predicate::at_least(field, after));
    }
    if let Some(before) = range.before {
        clause = clause.merge_and(Predicate::at_most(field, before));
    }
    clause
}

/// Case-insensitive substring match across the searchable fields
pub fn search_clause(term: &str) -> Predicate {
    Predicate::any_of(SEARCH_FIELDS.iter().map(|f| Predicate::contains(*f, term)))
}
