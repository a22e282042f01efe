//! # Package Repository
//!
//! In-memory home of every package. Two levels of locking:
//!
//! - The indexes (by id, by kind + origin id, by folio) sit behind one
//!   `parking_lot::RwLock`. It is never held across an `.await`.
//! - Each package sits behind its own `tokio::sync::Mutex`, held for the
//!   whole of a reception so that completion is observed exactly once.
//!
//! A package is inserted only once fully built, so no reader can see a
//! package whose declared files are still being created.

use std::collections::HashMap;
use std::sync::Arc;

use exh_core::{Folio, OriginId, PackageId};
use exh_state::PackageKind;
use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::error::ExchangeError;
use crate::model::Package;

/// Shared, lockable handle to one package.
pub type PackageHandle = Arc<Mutex<Package>>;

#[derive(Debug, Default)]
struct Indexes {
    by_id: HashMap<PackageId, PackageHandle>,
    by_origin: HashMap<(PackageKind, OriginId), PackageId>,
    by_folio: HashMap<Folio, PackageId>,
}

/// Thread-safe, cloneable package store. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct PackageRepository {
    inner: Arc<RwLock<Indexes>>,
}

impl PackageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a package of `kind` already uses `origin_id`.
    pub fn contains_origin(&self, kind: PackageKind, origin_id: &OriginId) -> bool {
        self.inner
            .read()
            .by_origin
            .contains_key(&(kind, origin_id.clone()))
    }

    /// Insert a fully built package.
    ///
    /// The duplicate check and the insert happen under one write lock, so
    /// of two concurrent creations with the same kind and origin id exactly
    /// one succeeds.
    pub fn insert_new(&self, package: Package) -> Result<PackageHandle, ExchangeError> {
        let mut idx = self.inner.write();
        let origin_key = (package.kind, package.origin_id.clone());
        if idx.by_origin.contains_key(&origin_key) {
            return Err(ExchangeError::Duplicate {
                kind: package.kind,
                origin_id: package.origin_id.to_string(),
            });
        }
        if let Some(folio) = &package.folio {
            if idx.by_folio.contains_key(folio) {
                return Err(ExchangeError::Internal(format!("folio {folio} already assigned")));
            }
            idx.by_folio.insert(folio.clone(), package.id);
        }
        let id = package.id;
        let handle = Arc::new(Mutex::new(package));
        idx.by_origin.insert(origin_key, id);
        idx.by_id.insert(id, Arc::clone(&handle));
        Ok(handle)
    }

    /// Index a folio minted on completion. Called while the package's own
    /// mutex is held.
    pub fn assign_folio(&self, folio: &Folio, id: PackageId) -> Result<(), ExchangeError> {
        let mut idx = self.inner.write();
        match idx.by_folio.get(folio) {
            Some(existing) if *existing != id => Err(ExchangeError::Internal(format!(
                "folio {folio} already assigned"
            ))),
            _ => {
                idx.by_folio.insert(folio.clone(), id);
                Ok(())
            }
        }
    }

    /// Drop a folio reserved for `id` whose completion did not happen.
    pub fn release_folio(&self, folio: &Folio, id: PackageId) {
        let mut idx = self.inner.write();
        if idx.by_folio.get(folio) == Some(&id) {
            idx.by_folio.remove(folio);
        }
    }

    pub fn get(&self, id: &PackageId) -> Option<PackageHandle> {
        self.inner.read().by_id.get(id).cloned()
    }

    pub fn find_by_origin(&self, kind: PackageKind, origin_id: &OriginId) -> Option<PackageHandle> {
        let idx = self.inner.read();
        idx.by_origin
            .get(&(kind, origin_id.clone()))
            .and_then(|id| idx.by_id.get(id))
            .cloned()
    }

    pub fn find_by_folio(&self, folio: &Folio) -> Option<PackageHandle> {
        let idx = self.inner.read();
        idx.by_folio
            .get(folio)
            .and_then(|id| idx.by_id.get(id))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PackageBody, PromocionBody};
    use chrono::Utc;
    use exh_state::PackageState;

    fn promocion(origin: &str) -> Package {
        let now = Utc::now();
        Package {
            id: PackageId::new(),
            kind: PackageKind::Promocion,
            origin_id: OriginId::new(origin).unwrap(),
            folio: None,
            state: PackageState::PendingFiles,
            created_at: now,
            updated_at: now,
            parent: None,
            files: Vec::new(),
            remaining: 0,
            transition_log: Vec::new(),
            acuse: None,
            body: PackageBody::Promocion(PromocionBody {
                folio_seguimiento: Folio::generate(),
                promoventes: Vec::new(),
                fojas: 1,
                fecha_origen: None,
                observaciones: None,
            }),
        }
    }

    #[tokio::test]
    async fn duplicate_origin_is_rejected_and_first_untouched() {
        let repo = PackageRepository::new();
        let first = promocion("P-1");
        let first_id = first.id;
        repo.insert_new(first).unwrap();

        let err = repo.insert_new(promocion("P-1")).unwrap_err();
        assert!(matches!(err, ExchangeError::Duplicate { .. }));
        assert_eq!(repo.len(), 1);

        let found = repo
            .find_by_origin(PackageKind::Promocion, &OriginId::new("P-1").unwrap())
            .unwrap();
        assert_eq!(found.lock().await.id, first_id);
    }

    #[test]
    fn origin_ids_are_scoped_by_kind() {
        let repo = PackageRepository::new();
        repo.insert_new(promocion("X-1")).unwrap();
        let id = OriginId::new("X-1").unwrap();
        assert!(repo.contains_origin(PackageKind::Promocion, &id));
        assert!(!repo.contains_origin(PackageKind::Exhorto, &id));
    }

    #[tokio::test]
    async fn folio_index_follows_assignment() {
        let repo = PackageRepository::new();
        let p = promocion("P-2");
        let id = p.id;
        repo.insert_new(p).unwrap();
        let folio = Folio::generate();
        assert!(repo.find_by_folio(&folio).is_none());
        repo.assign_folio(&folio, id).unwrap();
        assert_eq!(repo.find_by_folio(&folio).unwrap().lock().await.id, id);
        assert!(repo.assign_folio(&folio, PackageId::new()).is_err());
    }

    #[test]
    fn released_folio_is_forgotten_only_for_its_owner() {
        let repo = PackageRepository::new();
        let p = promocion("P-3");
        let id = p.id;
        repo.insert_new(p).unwrap();
        let folio = Folio::generate();
        repo.assign_folio(&folio, id).unwrap();

        repo.release_folio(&folio, PackageId::new());
        assert!(repo.find_by_folio(&folio).is_some());
        repo.release_folio(&folio, id);
        assert!(repo.find_by_folio(&folio).is_none());
    }
}
