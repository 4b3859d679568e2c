//! The in-memory order store.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use souk_core::{OrderId, OrderPublicId};

use crate::order::OrderRecord;

/// Thread-safe, cloneable store of orders, indexed by internal id with a
/// public-id lookup table.
///
/// Mutation happens through [`OrderStore::try_update_by_public`], which runs
/// the caller's closure under the write lock so that precondition checks and
/// the resulting write commit as one unit. Readers get clones, never
/// references into the map.
#[derive(Debug, Default)]
pub struct OrderStore {
    inner: Arc<RwLock<Orders>>,
}

#[derive(Debug, Default)]
struct Orders {
    by_id: HashMap<OrderId, OrderRecord>,
    public_index: HashMap<OrderPublicId, OrderId>,
}

impl Clone for OrderStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl OrderStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an order. Returns `false` (and leaves the store untouched) if
    /// either id is already taken.
    pub fn insert(&self, order: OrderRecord) -> bool {
        let mut inner = self.inner.write();
        if inner.by_id.contains_key(&order.id) || inner.public_index.contains_key(&order.public_id)
        {
            return false;
        }
        inner.public_index.insert(order.public_id, order.id);
        inner.by_id.insert(order.id, order);
        true
    }

    /// Look up an order by internal id.
    pub fn get(&self, id: &OrderId) -> Option<OrderRecord> {
        self.inner.read().by_id.get(id).cloned()
    }

    /// Look up an order by its public id.
    pub fn get_by_public(&self, public_id: &OrderPublicId) -> Option<OrderRecord> {
        let inner = self.inner.read();
        let id = inner.public_index.get(public_id)?;
        inner.by_id.get(id).cloned()
    }

    /// Resolve a public id to the internal id, if the order exists.
    pub fn resolve_public(&self, public_id: &OrderPublicId) -> Option<OrderId> {
        self.inner.read().public_index.get(public_id).copied()
    }

    /// Snapshot of all orders, in no particular order.
    pub fn list(&self) -> Vec<OrderRecord> {
        self.inner.read().by_id.values().cloned().collect()
    }

    /// Atomically update the order with the given public id.
    ///
    /// The closure runs under the write lock: it sees the current record,
    /// may check preconditions and perform the operation's side-effects, and
    /// either returns the new record to commit or an error to leave the
    /// stored record untouched. No other writer can interleave between the
    /// check and the commit.
    pub fn try_update_by_public<E>(
        &self,
        public_id: &OrderPublicId,
        f: impl FnOnce(&OrderRecord) -> Result<OrderRecord, E>,
    ) -> Result<Option<OrderRecord>, E> {
        let mut inner = self.inner.write();
        let Some(id) = inner.public_index.get(public_id).copied() else {
            return Ok(None);
        };
        // The index only ever points at live records.
        let current = inner.by_id[&id].clone();
        let updated = f(&current)?;
        inner.by_id.insert(id, updated.clone());
        Ok(Some(updated))
    }

    /// Number of stored orders.
    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::EscrowStatus;
    use souk_core::{Money, PaymentIntentRef, UserId};

    fn order() -> OrderRecord {
        OrderRecord::held(
            UserId::new(),
            UserId::new(),
            Money::from_parts(2500, "USD").unwrap(),
            PaymentIntentRef::new("pi_test"),
        )
    }

    #[test]
    fn insert_and_lookup_both_ids() {
        let store = OrderStore::new();
        let record = order();
        assert!(store.insert(record.clone()));
        assert_eq!(store.get(&record.id), Some(record.clone()));
        assert_eq!(store.get_by_public(&record.public_id), Some(record.clone()));
        assert_eq!(store.resolve_public(&record.public_id), Some(record.id));
    }

    #[test]
    fn duplicate_public_id_is_rejected() {
        let store = OrderStore::new();
        let first = order();
        let mut second = order();
        second.public_id = first.public_id;
        assert!(store.insert(first));
        assert!(!store.insert(second));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn try_update_commits_on_ok() {
        let store = OrderStore::new();
        let record = order();
        store.insert(record.clone());

        let updated: Result<_, ()> = store.try_update_by_public(&record.public_id, |current| {
            let mut next = current.clone();
            next.escrow_status = EscrowStatus::Released;
            Ok(next)
        });
        assert_eq!(
            updated.unwrap().unwrap().escrow_status,
            EscrowStatus::Released
        );
        assert_eq!(
            store.get(&record.id).unwrap().escrow_status,
            EscrowStatus::Released
        );
    }

    #[test]
    fn try_update_leaves_record_on_err() {
        let store = OrderStore::new();
        let record = order();
        store.insert(record.clone());

        let result: Result<Option<OrderRecord>, &str> =
            store.try_update_by_public(&record.public_id, |_| Err("nope"));
        assert_eq!(result, Err("nope"));
        assert_eq!(
            store.get(&record.id).unwrap().escrow_status,
            EscrowStatus::Held
        );
    }

    #[test]
    fn try_update_unknown_public_id_is_none() {
        let store = OrderStore::new();
        let result: Result<Option<OrderRecord>, ()> =
            store.try_update_by_public(&OrderPublicId::new(), |current| Ok(current.clone()));
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn clone_shares_state() {
        let store = OrderStore::new();
        let clone = store.clone();
        clone.insert(order());
        assert_eq!(store.len(), 1);
    }
}
