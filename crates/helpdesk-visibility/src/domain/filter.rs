//! Validated caller filter
//!
//! The typed form of a listing request after parsing and normalization.
//! Everything here is trusted input for the merger; the raw, untrusted
//! request lives in the application layer.

use chrono::{DateTime, Utc};
use helpdesk_common::{VisibilityError, VisibilityResult};

use super::value_objects::{
    BranchId, CategoryId, Role, SlaBucket, SortSpec, TicketPriority, TicketStatus, UserId,
    WorkbenchFilter,
};

/// Status restriction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Nothing requested: exclude rejected tickets
    #[default]
    Default,
    /// `ALL` sentinel: no restriction
    All,
    /// Restrict to the given set
    Only(Vec<TicketStatus>),
}

/// Assignment restriction, after precedence is resolved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AssignmentFilter {
    /// No restriction
    #[default]
    Any,
    /// Has an assignee
    Assigned,
    /// No assignee
    Unassigned,
    /// Assigned to the actor
    Me,
    /// Assigned to one of the listed technicians
    Technicians {
        /// Technician ids
        ids: Vec<UserId>,
        /// Unassigned tickets also match
        include_unassigned: bool,
    },
    /// Legacy single-assignee parameter
    Assignee(UserId),
}

/// Inclusive time window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Lower bound
    pub after: Option<DateTime<Utc>>,
    /// Upper bound, already extended to the end of the named day
    pub before: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Neither bound set
    pub fn is_open(&self) -> bool {
        self.after.is_none() && self.before.is_none()
    }
}

/// Fully parsed listing request
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFilter {
    pub statuses: StatusFilter,
    pub priorities: Vec<TicketPriority>,
    pub assignment: AssignmentFilter,
    pub branch_id: Option<BranchId>,
    pub category_id: Option<CategoryId>,
    pub security_classification: Option<String>,
    pub confidential: Option<bool>,
    pub created: DateRange,
    pub updated: DateRange,
    /// Trimmed, never empty
    pub search: Option<String>,
    pub sla_status: Option<SlaBucket>,
    pub workbench: WorkbenchFilter,
    pub sort: SortSpec,
    /// 1-based
    pub page: u32,
    /// Already clamped to the configured maximum
    pub page_size: u32,
    pub stats: bool,
}

impl Default for ValidatedFilter {
    fn default() -> Self {
        Self {
            statuses: StatusFilter::Default,
            priorities: Vec::new(),
            assignment: AssignmentFilter::Any,
            branch_id: None,
            category_id: None,
            security_classification: None,
            confidential: None,
            created: DateRange::default(),
            updated: DateRange::default(),
            search: None,
            sla_status: None,
            workbench: WorkbenchFilter::None,
            sort: SortSpec::default(),
            page: 1,
            page_size: 10,
            stats: false,
        }
    }
}

impl ValidatedFilter {
    /// Reject filters the role may not use. Runs before any query.
    pub fn authorize(&self, role: &Role) -> VisibilityResult<()> {
        if self.confidential == Some(true) && !role.can_access_confidential() {
            return Err(VisibilityError::Forbidden(format!(
                "role {} may not list confidential tickets",
                role
            )));
        }
        if self.security_classification.is_some() && !role.can_filter_security_classification() {
            return Err(VisibilityError::Forbidden(format!(
                "role {} may not filter by security classification",
                role
            )));
        }
        Ok(())
    }

    /// Records to skip for the requested page
    pub fn skip(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidential_request_requires_allow_listed_role() {
        let filter = ValidatedFilter {
            confidential: Some(true),
            ..Default::default()
        };
        assert!(matches!(filter.authorize(&Role::Technician), Err(VisibilityError::Forbidden(_))));
        assert!(matches!(filter.authorize(&Role::ItManager), Err(VisibilityError::Forbidden(_))));
        assert!(filter.authorize(&Role::SecurityAnalyst).is_ok());

        // Asking for non-confidential tickets only narrows.
        let filter = ValidatedFilter {
            confidential: Some(false),
            ..Default::default()
        };
        assert!(filter.authorize(&Role::EndUser).is_ok());
    }

    #[test]
    fn test_security_classification_allow_list() {
        let filter = ValidatedFilter {
            security_classification: Some("SECRET".into()),
            ..Default::default()
        };
        assert!(filter.authorize(&Role::Manager).is_ok());
        assert!(filter.authorize(&Role::ItManager).is_ok());
        assert!(filter.authorize(&Role::Technician).is_err());
        assert!(filter.authorize(&Role::EndUser).is_err());
    }

    #[test]
    fn test_skip() {
        let filter = ValidatedFilter {
            page: 3,
            page_size: 25,
            ..Default::default()
        };
        assert_eq!(filter.skip(), 50);
        assert_eq!(ValidatedFilter::default().skip(), 0);
    }
}
