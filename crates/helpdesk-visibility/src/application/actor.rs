//! Actor Context Resolver

use std::sync::Arc;

use helpdesk_common::{RepositoryError, VisibilityError, VisibilityResult};
use tracing::{error, warn};

use crate::domain::actor::Actor;
use crate::domain::value_objects::UserId;
use crate::ports::outbound::ActorDirectory;

/// Loads the calling actor. No decision logic.
pub struct ActorResolver {
    directory: Arc<dyn ActorDirectory>,
}

impl ActorResolver {
    pub fn new(directory: Arc<dyn ActorDirectory>) -> Self {
        Self { directory }
    }

    /// Missing identity is `Unauthorized`; a directory failure is `Internal`
    pub async fn resolve(&self, id: &UserId) -> VisibilityResult<Actor> {
        match self.directory.get_actor(id).await {
            Ok(actor) => Ok(actor),
            Err(RepositoryError::NotFound(_)) => {
                warn!(actor_id = %id, "actor not found");
                Err(VisibilityError::Unauthorized(format!("unknown actor {}", id)))
            }
            Err(e) => {
                error!(actor_id = %id, error = %e, "actor lookup failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Role;
    use crate::infrastructure::memory::InMemoryActorDirectory;
    use crate::testing::*;

    #[tokio::test]
    async fn test_resolves_known_actor() {
        let directory = InMemoryActorDirectory::new();
        directory.insert(actor("u1", Role::EndUser).with_branch(branch_id("B1")));
        let resolver = ActorResolver::new(Arc::new(directory));

        let actor = resolver.resolve(&uid("u1")).await.unwrap();
        assert_eq!(actor.role, Role::EndUser);
        assert_eq!(actor.branch_id, Some(branch_id("B1")));
    }

    #[tokio::test]
    async fn test_unknown_actor_is_unauthorized() {
        let resolver = ActorResolver::new(Arc::new(InMemoryActorDirectory::new()));
        let err = resolver.resolve(&uid("ghost")).await.unwrap_err();
        assert!(matches!(err, VisibilityError::Unauthorized(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_directory_failure_is_internal() {
        let directory = InMemoryActorDirectory::new();
        directory.set_unavailable(true);
        let resolver = ActorResolver::new(Arc::new(directory));

        let err = resolver.resolve(&uid("u1")).await.unwrap_err();
        assert!(matches!(err, VisibilityError::Internal(_)));
    }
}
