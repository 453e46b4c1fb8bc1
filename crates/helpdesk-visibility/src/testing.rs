//! Fixtures shared by unit tests

use chrono::{DateTime, TimeZone, Utc};
use helpdesk_common::WellKnownCategories;

use crate::domain::actor::{Actor, SupportGroup};
use crate::domain::services::visibility::VisibilityPolicy;
use crate::domain::ticket::{BranchRef, CreatorRef, ServiceRef, TicketRecord};
use crate::domain::value_objects::{
    BranchId, CategoryId, Role, ServiceId, SupportGroupCode, SupportGroupId, TicketId,
    TicketPriority, TicketStatus, UserId,
};

pub(crate) fn uid(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

pub(crate) fn branch_id(id: &str) -> BranchId {
    BranchId::new(id).unwrap()
}

pub(crate) fn branch(id: &str) -> BranchRef {
    BranchRef {
        id: branch_id(id),
        name: format!("Branch {}", id),
        code: id.to_string(),
    }
}

pub(crate) fn category(id: &str) -> CategoryId {
    CategoryId::new(id).unwrap()
}

pub(crate) fn service_id(id: &str) -> ServiceId {
    ServiceId::new(id).unwrap()
}

/// Group with id `sg-<lowercased code>`
pub(crate) fn group(code: &str) -> SupportGroup {
    SupportGroup {
        id: SupportGroupId::new(format!("sg-{}", code.to_lowercase())).unwrap(),
        code: SupportGroupCode::parse(code),
        name: code.to_string(),
    }
}

pub(crate) fn actor(id: &str, role: Role) -> Actor {
    Actor::new(uid(id), role)
}

pub(crate) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
}

/// Open, unassigned, non-confidential ticket in branch B1 raised by an end
/// user of B1 against a service with no routing or SLA
pub(crate) fn ticket(id: &str) -> TicketRecord {
    TicketRecord {
        id: TicketId::new(id).unwrap(),
        ticket_number: format!("TKT-{}", id.to_uppercase()),
        title: format!("Ticket {}", id),
        description: String::new(),
        status: TicketStatus::Open,
        priority: TicketPriority::Medium,
        created_by: CreatorRef {
            id: uid("creator"),
            name: "Rina Creator".into(),
            email: "rina@branch.example".into(),
            branch_id: Some(branch_id("B1")),
            role: Role::EndUser,
        },
        assigned_to: None,
        branch: Some(branch("B1")),
        support_group_id: None,
        category_id: None,
        service: ServiceRef::new(service_id("svc-general"), "General Request"),
        is_confidential: false,
        security_classification: None,
        created_at: base_time(),
        updated_at: base_time(),
        approvals: Vec::new(),
    }
}

pub(crate) fn policy() -> VisibilityPolicy {
    VisibilityPolicy::new(&WellKnownCategories::default()).unwrap()
}
