//! Value Objects - Immutable, self-validating domain primitives
//!
//! Everything that arrives from the outside as a string (role names,
//! support-group codes, statuses) is parsed into a closed enum here, so the
//! policy code branches on types rather than on string comparisons.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Value object validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Identifier was empty or whitespace
    #[error("{0} cannot be empty")]
    EmptyId(&'static str),

    /// Enumeration value not recognized
    #[error("unknown {kind}: {value}")]
    UnknownValue {
        /// Which enumeration
        kind: &'static str,
        /// Offending input
        value: String,
    },
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Create with validation
            pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(DomainError::EmptyId($label));
                }
                Ok(Self(id))
            }

            /// Get inner value
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Authenticated user identifier
    UserId, "user id"
);
string_id!(
    /// Branch identifier
    BranchId, "branch id"
);
string_id!(
    /// Support group identifier
    SupportGroupId, "support group id"
);
string_id!(
    /// Category identifier (either taxonomy)
    CategoryId, "category id"
);
string_id!(
    /// Service catalog identifier
    ServiceId, "service id"
);
string_id!(
    /// Ticket identifier
    TicketId, "ticket id"
);

/// Normalize `in-progress`, `In Progress`, `in_progress` to `IN_PROGRESS`
fn normalize_code(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c.to_ascii_uppercase() })
        .collect()
}

/// Actor role
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Branch staff submitting requests
    EndUser,
    /// Support technician
    Technician,
    /// Security operations analyst
    SecurityAnalyst,
    /// Branch manager
    Manager,
    /// IT manager
    ItManager,
    /// Administrator
    Admin,
    /// Super administrator
    SuperAdmin,
    /// Role string the engine does not know; always denied
    Unrecognized(String),
}

impl Role {
    /// Parse a role code as stored by the identity provider
    pub fn parse(raw: &str) -> Self {
        match normalize_code(raw).as_str() {
            "USER" | "END_USER" => Self::EndUser,
            "TECHNICIAN" => Self::Technician,
            "SECURITY_ANALYST" => Self::SecurityAnalyst,
            "MANAGER" => Self::Manager,
            "MANAGER_IT" | "IT_MANAGER" => Self::ItManager,
            "ADMIN" => Self::Admin,
            "SUPER_ADMIN" => Self::SuperAdmin,
            _ => Self::Unrecognized(raw.to_string()),
        }
    }

    /// Canonical code
    pub fn code(&self) -> &str {
        match self {
            Self::EndUser => "USER",
            Self::Technician => "TECHNICIAN",
            Self::SecurityAnalyst => "SECURITY_ANALYST",
            Self::Manager => "MANAGER",
            Self::ItManager => "MANAGER_IT",
            Self::Admin => "ADMIN",
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Roles allowed to see confidential tickets
    pub fn can_access_confidential(&self) -> bool {
        matches!(self, Self::SecurityAnalyst | Self::Admin | Self::SuperAdmin)
    }

    /// Roles allowed to filter by security classification
    pub fn can_filter_security_classification(&self) -> bool {
        matches!(
            self,
            Self::Admin | Self::SuperAdmin | Self::SecurityAnalyst | Self::Manager | Self::ItManager
        )
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Stable support-group code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportGroupCode {
    /// Call center agents
    CallCenter,
    /// Back office handling transaction claims
    TransactionClaimsSupport,
    /// IT helpdesk
    ItHelpdesk,
    /// Any other group
    Other(String),
}

impl SupportGroupCode {
    /// Parse a stored group code
    pub fn parse(raw: &str) -> Self {
        match normalize_code(raw).as_str() {
            "CALL_CENTER" => Self::CallCenter,
            "TRANSACTION_CLAIMS_SUPPORT" => Self::TransactionClaimsSupport,
            "IT_HELPDESK" => Self::ItHelpdesk,
            _ => Self::Other(raw.to_string()),
        }
    }

    /// Groups that work claims through a dedicated view
    pub fn is_claims_desk(&self) -> bool {
        matches!(self, Self::CallCenter | Self::TransactionClaimsSupport)
    }
}

macro_rules! code_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $code:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[allow(missing_docs)]
                $variant,
            )+
        }

        impl $name {
            /// Every value, in declaration order
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            /// Canonical storage code
            pub fn code(&self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            /// Parse a code, tolerant of case and separators
            pub fn parse(raw: &str) -> Result<Self, DomainError> {
                match normalize_code(raw).as_str() {
                    $($code => Ok(Self::$variant),)+
                    _ => Err(DomainError::UnknownValue { kind: $kind, value: raw.to_string() }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.code())
            }
        }
    };
}

code_enum!(
    /// Ticket lifecycle status
    TicketStatus, "status" {
        Open => "OPEN",
        InProgress => "IN_PROGRESS",
        PendingApproval => "PENDING_APPROVAL",
        Approved => "APPROVED",
        PendingVendor => "PENDING_VENDOR",
        Resolved => "RESOLVED",
        Closed => "CLOSED",
        Rejected => "REJECTED",
        Cancelled => "CANCELLED",
    }
);

impl TicketStatus {
    /// Terminal for SLA purposes
    pub fn stops_sla_clock(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

code_enum!(
    /// Ticket priority
    TicketPriority, "priority" {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Critical => "CRITICAL",
        Emergency => "EMERGENCY",
    }
);

code_enum!(
    /// Approval record status
    ApprovalStatus, "approval status" {
        Pending => "PENDING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
);

/// Named workbench intent for technician-class roles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkbenchFilter {
    /// Plain listing
    #[default]
    None,
    /// Tickets assigned to me
    MyTickets,
    /// Work I could pick up
    AvailableTickets,
}

impl WorkbenchFilter {
    /// Parse the `filter` request tag
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "all" | "none" => Ok(Self::None),
            "my-tickets" | "my_tickets" => Ok(Self::MyTickets),
            "available-tickets" | "available_tickets" => Ok(Self::AvailableTickets),
            _ => Err(DomainError::UnknownValue { kind: "workbench filter", value: raw.to_string() }),
        }
    }
}

/// Derived SLA classification, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlaBucket {
    /// Comfortably inside the SLA
    Within,
    /// Inside the SLA with little time left
    AtRisk,
    /// Past the deadline
    Breached,
}

impl SlaBucket {
    /// Parse the `slaStatus` request value
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        match normalize_code(raw).as_str() {
            "WITHIN" | "WITHIN_SLA" | "ON_TRACK" => Ok(Self::Within),
            "AT_RISK" => Ok(Self::AtRisk),
            "BREACHED" => Ok(Self::Breached),
            _ => Err(DomainError::UnknownValue { kind: "sla status", value: raw.to_string() }),
        }
    }
}

/// Sortable ticket attribute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    /// Creation time
    #[default]
    CreatedAt,
    /// Last update time
    UpdatedAt,
    /// Priority rank
    Priority,
    /// Status code
    Status,
    /// Ticket number
    TicketNumber,
    /// Title
    Title,
}

impl SortKey {
    /// Parse a sort key; `None` for unknown keys
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().replace('_', "").to_ascii_lowercase().as_str() {
            "createdat" => Some(Self::CreatedAt),
            "updatedat" => Some(Self::UpdatedAt),
            "priority" => Some(Self::Priority),
            "status" => Some(Self::Status),
            "ticketnumber" => Some(Self::TicketNumber),
            "title" => Some(Self::Title),
            _ => None,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending
    Asc,
    /// Descending
    #[default]
    Desc,
}

impl SortDirection {
    /// Parse a direction; `None` for unknown input
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Sort order handed to the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Attribute
    pub key: SortKey,
    /// Direction
    pub direction: SortDirection,
}
