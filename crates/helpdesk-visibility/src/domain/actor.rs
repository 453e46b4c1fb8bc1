//! Actor - the authenticated caller, loaded once per request

use serde::{Deserialize, Serialize};

use super::value_objects::{BranchId, Role, SupportGroupCode, SupportGroupId, UserId};

/// Support group membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportGroup {
    /// Group id
    pub id: SupportGroupId,
    /// Stable code selecting special policies
    pub code: SupportGroupCode,
    /// Display name
    pub name: String,
}

/// Who is asking. Immutable for the lifetime of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User id
    pub id: UserId,
    /// Role
    pub role: Role,
    /// Home branch
    pub branch_id: Option<BranchId>,
    /// Support group membership
    pub support_group: Option<SupportGroup>,
}

impl Actor {
    /// Actor without branch or group
    pub fn new(id: UserId, role: Role) -> Self {
        Self {
            id,
            role,
            branch_id: None,
            support_group: None,
        }
    }

    /// Set home branch
    pub fn with_branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    /// Set support group
    pub fn with_group(mut self, group: SupportGroup) -> Self {
        self.support_group = Some(group);
        self
    }

    /// Support group code, if any
    pub fn group_code(&self) -> Option<&SupportGroupCode> {
        self.support_group.as_ref().map(|g| &g.code)
    }

    /// Support group id, if any
    pub fn group_id(&self) -> Option<&SupportGroupId> {
        self.support_group.as_ref().map(|g| &g.id)
    }

    /// Member of Call-Center or Transaction-Claims-Support
    pub fn is_claims_desk(&self) -> bool {
        self.group_code().map(SupportGroupCode::is_claims_desk).unwrap_or(false)
    }
}
