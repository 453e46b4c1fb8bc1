//! Inbound ports (Use case traits)

use async_trait::async_trait;
use helpdesk_common::VisibilityResult;

use crate::application::dto::{FilterRequest, ListOutcome};
use crate::domain::value_objects::UserId;

/// Ticket listing use case
#[async_trait]
pub trait TicketListing: Send + Sync {
    /// List the tickets `actor_id` may see, narrowed by `request`.
    ///
    /// Returns a page, or aggregate counts when `request.stats` is set.
    async fn list_tickets(
        &self,
        actor_id: &UserId,
        request: FilterRequest,
    ) -> VisibilityResult<ListOutcome>;
}
