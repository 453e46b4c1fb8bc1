//! Ticket read model
//!
//! Projection of a ticket with just the attributes the visibility engine
//! filters, sorts and classifies on. Mutation lives elsewhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::predicate::{Field, FieldSource, Value};
use super::value_objects::{
    ApprovalStatus, BranchId, CategoryId, Role, ServiceId, SupportGroupId, TicketId,
    TicketPriority, TicketStatus, UserId,
};

/// Ticket creator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreatorRef {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub branch_id: Option<BranchId>,
    pub role: Role,
}

/// Assigned technician
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssigneeRef {
    pub id: UserId,
    pub name: String,
}

/// Owning branch
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BranchRef {
    pub id: BranchId,
    pub name: String,
    pub code: String,
}

/// Catalog service the ticket was raised against
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceRef {
    pub id: ServiceId,
    pub name: String,
    pub support_group_id: Option<SupportGroupId>,
    /// Legacy service-category taxonomy
    pub category_id: Option<CategoryId>,
    /// Current flat taxonomy
    pub tier1_category_id: Option<CategoryId>,
    pub sla_hours: Option<u32>,
}

impl ServiceRef {
    /// Service with no routing, categories or SLA
    pub fn new(id: ServiceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            support_group_id: None,
            category_id: None,
            tier1_category_id: None,
            sla_hours: None,
        }
    }
}

/// One step of the approval chain
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub status: ApprovalStatus,
    pub decided_at: Option<DateTime<Utc>>,
}

/// Ticket projection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub id: TicketId,
    pub ticket_number: String,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created_by: CreatorRef,
    pub assigned_to: Option<AssigneeRef>,
    pub branch: Option<BranchRef>,
    /// Directly routed support group
    pub support_group_id: Option<SupportGroupId>,
    pub category_id: Option<CategoryId>,
    pub service: ServiceRef,
    pub is_confidential: bool,
    pub security_classification: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Ordered approval chain
    pub approvals: Vec<ApprovalRecord>,
}

impl TicketRecord {
    /// Any approval step approved
    pub fn has_approved_approval(&self) -> bool {
        self.approvals
            .iter()
            .any(|a| a.status == ApprovalStatus::Approved)
    }
}

fn text(s: &str) -> Option<Value> {
    Some(Value::text(s))
}

impl FieldSource for TicketRecord {
    fn field(&self, field: Field) -> Option<Value> {
        match field {
            Field::TicketId => text(self.id.as_str()),
            Field::TicketNumber => text(&self.ticket_number),
            Field::Title => text(&self.title),
            Field::Description => text(&self.description),
            Field::Status => Some(self.status.into()),
            Field::Priority => Some(self.priority.into()),
            Field::CreatorId => text(self.created_by.id.as_str()),
            Field::CreatorName => text(&self.created_by.name),
            Field::CreatorEmail => text(&self.created_by.email),
            Field::CreatorBranchId => self.created_by.branch_id.as_ref().and_then(|b| text(b.as_str())),
            Field::CreatorRole => Some((&self.created_by.role).into()),
            Field::AssigneeId => self.assigned_to.as_ref().and_then(|a| text(a.id.as_str())),
            Field::AssigneeName => self.assigned_to.as_ref().and_then(|a| text(&a.name)),
            Field::BranchId => self.branch.as_ref().and_then(|b| text(b.id.as_str())),
            Field::BranchName => self.branch.as_ref().and_then(|b| text(&b.name)),
            Field::BranchCode => self.branch.as_ref().and_then(|b| text(&b.code)),
            Field::SupportGroupId => self.support_group_id.as_ref().and_then(|g| text(g.as_str())),
            Field::CategoryId => self.category_id.as_ref().and_then(|c| text(c.as_str())),
            Field::ServiceId => text(self.service.id.as_str()),
            Field::ServiceName => text(&self.service.name),
            Field::ServiceSupportGroupId => self
                .service
                .support_group_id
                .as_ref()
                .and_then(|g| text(g.as_str())),
            Field::ServiceCategoryId => self.service.category_id.as_ref().and_then(|c| text(c.as_str())),
            Field::ServiceTier1CategoryId => self
                .service
                .tier1_category_id
                .as_ref()
                .and_then(|c| text(c.as_str())),
            Field::IsConfidential => Some(self.is_confidential.into()),
            Field::SecurityClassification => self.security_classification.as_deref().and_then(text),
            Field::CreatedAt => Some(self.created_at.into()),
            Field::UpdatedAt => Some(self.updated_at.into()),
            Field::HasApprovedApproval => Some(self.has_approved_approval().into()),
        }
    }
}
