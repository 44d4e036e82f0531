// lib/src/resolver.rs
// Maps an identity-provider user id to the patient or doctor record id.

use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};
use uuid::Uuid;

use models::errors::StoreResult;
use models::medical::Role;

use crate::config::ResolverConfig;
use crate::storage_engine::HospitalStore;

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// `Ok(None)` when the user has no record for `role`. A blank id never
    /// resolves.
    async fn resolve(&self, role: Role, user_id: &str) -> StoreResult<Option<Uuid>>;

    /// Records a mapping that is known to exist.
    async fn remember(&self, role: Role, user_id: &str, record_id: Uuid);

    async fn patient_id(&self, user_id: &str) -> StoreResult<Option<Uuid>> {
        self.resolve(Role::Patient, user_id).await
    }

    async fn doctor_id(&self, user_id: &str) -> StoreResult<Option<Uuid>> {
        self.resolve(Role::Doctor, user_id).await
    }
}

/// Store lookups fronted by a moka cache of positive hits. A user's record
/// id never changes once created, so hits are never invalidated.
pub struct CachedIdentityResolver {
    store: Arc<dyn HospitalStore>,
    cache: Cache<(Role, String), Uuid>,
}

impl CachedIdentityResolver {
    pub fn new(store: Arc<dyn HospitalStore>, config: &ResolverConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(Duration::from_secs(config.cache_ttl_secs))
            .build();
        CachedIdentityResolver { store, cache }
    }

    async fn lookup(&self, role: Role, user_id: &str) -> StoreResult<Option<Uuid>> {
        Ok(match role {
            Role::Patient => self.store.find_patient_by_user(user_id).await?.map(|p| p.id),
            Role::Doctor => self.store.find_doctor_by_user(user_id).await?.map(|d| d.id),
        })
    }
}

#[async_trait]
impl IdentityResolver for CachedIdentityResolver {
    async fn resolve(&self, role: Role, user_id: &str) -> StoreResult<Option<Uuid>> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Ok(None);
        }
        let key = (role, user_id.to_string());
        if let Some(hit) = self.cache.get(&key).await {
            trace!(%role, user_id, "resolver cache hit");
            return Ok(Some(hit));
        }
        let found = self.lookup(role, user_id).await?;
        match found {
            Some(record_id) => self.cache.insert(key, record_id).await,
            None => debug!(%role, user_id, "user has no record for role"),
        }
        Ok(found)
    }

    async fn remember(&self, role: Role, user_id: &str, record_id: Uuid) {
        self.cache.insert((role, user_id.to_string()), record_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage_engine::MockHospitalStore;
    use models::medical::Patient;

    fn resolver(store: MockHospitalStore) -> CachedIdentityResolver {
        CachedIdentityResolver::new(Arc::new(store), &ResolverConfig::default())
    }

    #[tokio::test]
    async fn hits_are_served_from_cache() {
        let patient = Patient::new("user-1", None, None);
        let expected = patient.id;
        let mut store = MockHospitalStore::new();
        store
            .expect_find_patient_by_user()
            .withf(|user_id| user_id.trim() == "user-1")
            .times(1)
            .returning(move |_| Ok(Some(patient.clone())));

        let resolver = resolver(store);
        assert_eq!(resolver.patient_id("user-1").await.unwrap(), Some(expected));
        assert_eq!(resolver.patient_id(" user-1 ").await.unwrap(), Some(expected));
    }

    #[tokio::test]
    async fn misses_are_not_cached() {
        let mut store = MockHospitalStore::new();
        store.expect_find_doctor_by_user().times(2).returning(|_| Ok(None));

        let resolver = resolver(store);
        assert_eq!(resolver.doctor_id("ghost").await.unwrap(), None);
        assert_eq!(resolver.doctor_id("ghost").await.unwrap(), None);
    }

    #[tokio::test]
    async fn blank_ids_never_reach_the_store() {
        let resolver = resolver(MockHospitalStore::new());
        assert_eq!(resolver.patient_id("   ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn remembered_mappings_skip_the_store() {
        let resolver = resolver(MockHospitalStore::new());
        let id = Uuid::new_v4();
        resolver.remember(Role::Doctor, "doc-9", id).await;
        assert_eq!(resolver.doctor_id("doc-9").await.unwrap(), Some(id));
    }
}
