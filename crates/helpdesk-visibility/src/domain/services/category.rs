//! Category Equivalence Resolver
//!
//! Two category taxonomies coexist: the current flat table and the legacy
//! service-category table, which shares names but not ids. A category
//! filter matches a ticket through either.

use std::sync::Arc;

use helpdesk_common::{VisibilityError, VisibilityResult};
use tracing::{debug, error};

use super::visibility::VisibilityGrant;
use crate::domain::predicate::{Field, Predicate, Value};
use crate::domain::value_objects::CategoryId;
use crate::ports::outbound::CategoryCatalog;

/// What a category filter contributes to the merged predicate
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryResolution {
    /// The role grant already covers the whole category; adding it would
    /// only narrow a complete grant
    Suppressed {
        /// Covered category
        category: CategoryId,
    },
    /// AND this restriction in
    Restrict(Predicate),
}

impl CategoryResolution {
    /// Restriction to merge, if any
    pub fn into_clause(self) -> Option<Predicate> {
        match self {
            Self::Suppressed { .. } => None,
            Self::Restrict(p) => Some(p),
        }
    }
}

/// Resolves a category id across both taxonomies
pub struct CategoryEquivalenceResolver {
    catalog: Arc<dyn CategoryCatalog>,
}

impl CategoryEquivalenceResolver {
    pub fn new(catalog: Arc<dyn CategoryCatalog>) -> Self {
        Self { catalog }
    }

    /// Resolve `id` for an actor holding `grant`
    pub async fn resolve(
        &self,
        id: &CategoryId,
        grant: &VisibilityGrant,
    ) -> VisibilityResult<CategoryResolution> {
        if grant.covers_category(id) {
            debug!(category = %id, "category filter suppressed, role grant covers it");
            return Ok(CategoryResolution::Suppressed { category: id.clone() });
        }

        let mut options = vec![
            Predicate::eq(Field::CategoryId, Value::text(id.as_str())),
            Predicate::eq(Field::ServiceTier1CategoryId, Value::text(id.as_str())),
            Predicate::eq(Field::ServiceCategoryId, Value::text(id.as_str())),
        ];

        if let Some(legacy) = self.legacy_equivalent(id).await? {
            debug!(category = %id, legacy = %legacy, "legacy category equivalent found");
            options.push(Predicate::eq(Field::ServiceCategoryId, Value::text(legacy.as_str())));
        }

        Ok(CategoryResolution::Restrict(Predicate::any_of(options)))
    }

    async fn legacy_equivalent(&self, id: &CategoryId) -> VisibilityResult<Option<CategoryId>> {
        let name = self.catalog.category_name(id).await.map_err(|e| {
            error!(category = %id, error = %e, "category name lookup failed");
            VisibilityError::Internal(format!("category lookup for {}: {}", id, e))
        })?;

        let Some(name) = name else {
            return Ok(None);
        };

        self.catalog
            .legacy_category_by_name(&name)
            .await
            .map_err(|e| {
                error!(category = %id, error = %e, "legacy category lookup failed");
                VisibilityError::Internal(format!("legacy category lookup for {}: {}", name, e))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::Actor;
    use crate::domain::services::visibility::VisibilityContext;
    use crate::domain::value_objects::Role;
    use crate::infrastructure::memory::InMemoryCategoryCatalog;
    use crate::testing::*;

    fn catalog() -> Arc<InMemoryCategoryCatalog> {
        let catalog = InMemoryCategoryCatalog::new();
        catalog.add_category(category("HW"), "Hardware");
        catalog.add_legacy(category("svc-cat-7"), "Hardware", true);
        catalog.add_category(category("TRANSACTION_CLAIMS"), "Transaction Claims");
        Arc::new(catalog)
    }

    fn grant(actor: &Actor) -> VisibilityGrant {
        policy().build(actor, &VisibilityContext::default())
    }

    #[tokio::test]
    async fn test_resolves_across_taxonomies() {
        let resolver = CategoryEquivalenceResolver::new(catalog());
        let admin = actor("a1", Role::Admin);

        let resolution = resolver.resolve(&category("HW"), &grant(&admin)).await.unwrap();
        let CategoryResolution::Restrict(clause) = resolution else {
            panic!("expected a restriction");
        };

        let mut legacy = ticket("legacy");
        legacy.service.category_id = Some(category("svc-cat-7"));
        assert!(clause.evaluate(&legacy));

        let mut tier1 = ticket("tier1");
        tier1.service.tier1_category_id = Some(category("HW"));
        assert!(clause.evaluate(&tier1));
        assert!(!clause.evaluate(&ticket("plain")));
    }

    #[tokio::test]
    async fn test_inactive_legacy_record_ignored() {
        let catalog = InMemoryCategoryCatalog::new();
        catalog.add_category(category("NET"), "Network");
        catalog.add_legacy(category("old-net"), "Network", false);
        let resolver = CategoryEquivalenceResolver::new(Arc::new(catalog));

        let clause = resolver
            .resolve(&category("NET"), &grant(&actor("a1", Role::Admin)))
            .await
            .unwrap()
            .into_clause()
            .unwrap();
        assert!(!clause.mentions(&Predicate::eq(Field::ServiceCategoryId, Value::text("old-net"))));
    }

    #[tokio::test]
    async fn test_unknown_category_still_restricts_by_id() {
        let resolver = CategoryEquivalenceResolver::new(catalog());
        let clause = resolver
            .resolve(&category("NOPE"), &grant(&actor("a1", Role::Admin)))
            .await
            .unwrap()
            .into_clause()
            .unwrap();
        assert!(clause.mentions(&Predicate::eq(Field::CategoryId, Value::text("NOPE"))));
    }

    #[tokio::test]
    async fn test_suppressed_when_role_covers_category() {
        let resolver = CategoryEquivalenceResolver::new(catalog());
        let cc = actor("cc1", Role::Technician).with_group(group("CALL_CENTER"));

        let resolution = resolver
            .resolve(&category("TRANSACTION_CLAIMS"), &grant(&cc))
            .await
            .unwrap();
        assert_eq!(
            resolution,
            CategoryResolution::Suppressed { category: category("TRANSACTION_CLAIMS") }
        );
    }

    #[tokio::test]
    async fn test_lookup_failure_is_internal() {
        let catalog = catalog();
        catalog.fail_lookups(true);
        let resolver = CategoryEquivalenceResolver::new(catalog);

        let err = resolver
            .resolve(&category("HW"), &grant(&actor("a1", Role::Admin)))
            .await
            .unwrap_err();
        assert!(matches!(err, VisibilityError::Internal(_)));
    }
}
