//! Visibility Predicate Builder
//!
//! Maps an actor to the predicate describing which tickets the actor's role
//! may see before any caller filter is applied. Pure and total: every role
//! produces a predicate, and roles the engine does not recognize produce
//! [`Predicate::always_false`].

use helpdesk_common::WellKnownCategories;

use crate::domain::actor::Actor;
use crate::domain::predicate::{Field, Predicate, Value};
use crate::domain::value_objects::{
    CategoryId, DomainError, Role, ServiceId, SupportGroupCode, TicketStatus, WorkbenchFilter,
};

/// Per-request inputs besides the actor
#[derive(Debug, Clone, Default)]
pub struct VisibilityContext {
    /// Workbench intent
    pub workbench: WorkbenchFilter,
    /// Services whose tickets need an approval before work starts
    pub approval_required_services: Vec<ServiceId>,
}

/// Role-derived visibility
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityGrant {
    /// What the actor may see
    pub predicate: Predicate,
    /// Categories the role already grants in full
    pub full_category_access: Vec<CategoryId>,
    /// A workbench override replaced the role predicate
    pub overridden: bool,
}

impl VisibilityGrant {
    fn new(predicate: Predicate) -> Self {
        Self {
            predicate,
            full_category_access: Vec::new(),
            overridden: false,
        }
    }

    fn granting(mut self, categories: &[&CategoryId]) -> Self {
        self.full_category_access = categories.iter().map(|c| (*c).clone()).collect();
        self
    }

    /// Replace the role predicate with a narrower workbench intent.
    /// Category grants no longer hold once the role predicate is gone.
    pub fn replaced_by(self, predicate: Predicate) -> Self {
        Self {
            predicate,
            full_category_access: Vec::new(),
            overridden: true,
        }
    }

    /// Whether the role grant already covers every ticket of `category`
    pub fn covers_category(&self, category: &CategoryId) -> bool {
        self.full_category_access.contains(category)
    }
}

/// `isConfidential == false` unless the role is allow-listed
pub fn confidentiality_clause(role: &Role) -> Predicate {
    if role.can_access_confidential() {
        Predicate::always_true()
    } else {
        Predicate::eq(Field::IsConfidential, false)
    }
}

/// Service needs no approval, or it does and an approval was granted
pub fn approval_gate(approval_required: &[ServiceId]) -> Predicate {
    let requires = Predicate::one_of(
        Field::ServiceId,
        approval_required.iter().map(|s| Value::text(s.as_str())),
    );
    Predicate::any_of([
        Predicate::negate(requires.clone()),
        Predicate::all_of([requires, Predicate::eq(Field::HasApprovedApproval, true)]),
    ])
}

/// Visibility policy
#[derive(Debug, Clone)]
pub struct VisibilityPolicy {
    transaction_claims: CategoryId,
    atm_services: CategoryId,
}

impl VisibilityPolicy {
    /// Create with the deployment's well-known category ids
    pub fn new(categories: &WellKnownCategories) -> Result<Self, DomainError> {
        Ok(Self {
            transaction_claims: CategoryId::new(categories.transaction_claims.as_str())?,
            atm_services: CategoryId::new(categories.atm_services.as_str())?,
        })
    }

    /// Whether [`build`](Self::build) needs the approval-required service
    /// set for this actor and workbench
    pub fn needs_approval_gate(&self, actor: &Actor, workbench: WorkbenchFilter) -> bool {
        actor.role == Role::Technician
            && workbench == WorkbenchFilter::AvailableTickets
            && matches!(actor.group_code(), None | Some(SupportGroupCode::Other(_)))
    }

    /// Build the visibility grant for `actor`
    pub fn build(&self, actor: &Actor, ctx: &VisibilityContext) -> VisibilityGrant {
        let grant = match &actor.role {
            Role::SecurityAnalyst => VisibilityGrant::new(self.security_analyst(actor)),
            Role::Technician => self.technician(actor, ctx),
            Role::Manager => VisibilityGrant::new(self.manager(actor)),
            Role::ItManager | Role::Admin | Role::SuperAdmin => {
                VisibilityGrant::new(Predicate::always_true())
            }
            Role::EndUser => self.end_user(actor),
            Role::Unrecognized(_) => VisibilityGrant::new(Predicate::always_false()),
        };

        VisibilityGrant {
            predicate: grant.predicate.merge_and(confidentiality_clause(&actor.role)),
            ..grant
        }
    }

    fn security_analyst(&self, actor: &Actor) -> Predicate {
        if actor.support_group.is_some() {
            Predicate::any_of([assigned_to_me(actor), created_by_me(actor), group_scope(actor)])
        } else {
            Predicate::any_of([created_by_me(actor), assigned_to_me(actor)])
        }
    }

    fn technician(&self, actor: &Actor, ctx: &VisibilityContext) -> VisibilityGrant {
        match actor.group_code() {
            Some(SupportGroupCode::CallCenter) => VisibilityGrant::new(Predicate::any_of([
                created_by_me(actor),
                in_category(&self.transaction_claims),
            ]))
            .granting(&[&self.transaction_claims]),

            Some(SupportGroupCode::TransactionClaimsSupport) => {
                VisibilityGrant::new(Predicate::any_of([
                    in_category(&self.transaction_claims),
                    in_category(&self.atm_services),
                ]))
                .granting(&[&self.transaction_claims, &self.atm_services])
            }

            Some(SupportGroupCode::ItHelpdesk) => VisibilityGrant::new(Predicate::any_of([
                created_by_me(actor),
                assigned_to_me(actor),
                group_scope(actor),
            ])),

            Some(SupportGroupCode::Other(_)) | None => {
                VisibilityGrant::new(self.generic_technician(actor, ctx))
            }
        }
    }

    fn generic_technician(&self, actor: &Actor, ctx: &VisibilityContext) -> Predicate {
        if ctx.workbench == WorkbenchFilter::AvailableTickets {
            let mut available = Predicate::all_of([
                Predicate::is_null(Field::AssigneeId),
                Predicate::eq(Field::Status, TicketStatus::Open),
            ]);
            if actor.support_group.is_some() {
                available = available.merge_and(group_scope(actor));
            }
            return available.merge_and(approval_gate(&ctx.approval_required_services));
        }

        let mut visible = vec![created_by_me(actor), assigned_to_me(actor)];
        match actor.support_group {
            Some(_) => visible.push(group_scope(actor)),
            // Group-less technicians pick up the unassigned queue.
            None => visible.push(unassigned_queue()),
        }
        Predicate::any_of(visible)
    }

    fn manager(&self, actor: &Actor) -> Predicate {
        let Some(branch) = &actor.branch_id else {
            return Predicate::always_false();
        };
        Predicate::all_of([
            Predicate::eq(Field::BranchId, Value::text(branch.as_str())),
            Predicate::eq(Field::CreatorBranchId, Value::text(branch.as_str())),
            Predicate::negate(Predicate::eq(Field::CreatorRole, &Role::SecurityAnalyst)),
        ])
    }

    fn end_user(&self, actor: &Actor) -> VisibilityGrant {
        if actor.group_code() == Some(&SupportGroupCode::CallCenter) {
            return VisibilityGrant::new(Predicate::any_of([
                created_by_me(actor),
                in_category(&self.transaction_claims),
            ]))
            .granting(&[&self.transaction_claims]);
        }

        match &actor.branch_id {
            Some(branch) => VisibilityGrant::new(Predicate::eq(
                Field::BranchId,
                Value::text(branch.as_str()),
            )),
            None => VisibilityGrant::new(created_by_me(actor)),
        }
    }
}

fn created_by_me(actor: &Actor) -> Predicate {
    Predicate::eq(Field::CreatorId, Value::text(actor.id.as_str()))
}

fn assigned_to_me(actor: &Actor) -> Predicate {
    Predicate::eq(Field::AssigneeId, Value::text(actor.id.as_str()))
}

/// Service or ticket routed to the actor's group. Always false without a group.
fn group_scope(actor: &Actor) -> Predicate {
    match actor.group_id() {
        Some(group) => Predicate::any_of([
            Predicate::eq(Field::ServiceSupportGroupId, Value::text(group.as_str())),
            Predicate::eq(Field::SupportGroupId, Value::text(group.as_str())),
        ]),
        None => Predicate::always_false(),
    }
}

/// Ticket category or service tier-1 category equals `id`
fn in_category(id: &CategoryId) -> Predicate {
    Predicate::any_of([
        Predicate::eq(Field::CategoryId, Value::text(id.as_str())),
        Predicate::eq(Field::ServiceTier1CategoryId, Value::text(id.as_str())),
    ])
}

/// Unassigned and still workable
pub(crate) fn unassigned_queue() -> Predicate {
    Predicate::all_of([
        Predicate::is_null(Field::AssigneeId),
        Predicate::one_of(Field::Status, [TicketStatus::Open, TicketStatus::InProgress]),
    ])
}
