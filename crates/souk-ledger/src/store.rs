//! The append-only ledger store.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use souk_core::{Currency, Money, PaymentIntentRef, UserId};

use crate::entry::{EntryType, LedgerEntry, LedgerEntryId};

/// Thread-safe, cloneable append-only ledger.
///
/// Entries are only ever appended; there is no update or delete surface.
/// Balances are computed by summation on every read, never cached — the
/// entries alone are the source of truth, which makes crash recovery and
/// audit reconstruction trivial.
///
/// The lock is `parking_lot`, not `tokio::sync`, because it is never held
/// across an `.await` point and a panicking writer must not poison the books.
#[derive(Debug, Default)]
pub struct LedgerStore {
    entries: Arc<RwLock<Vec<LedgerEntry>>>,
}

impl Clone for LedgerStore {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl LedgerStore {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a movement and return the written entry.
    ///
    /// Appends are safe under concurrent writers: ordering between two
    /// concurrent appends is whichever takes the write lock first, and
    /// balance correctness does not depend on it.
    pub fn append(
        &self,
        account: UserId,
        amount: Money,
        entry_type: EntryType,
        cause_ref: PaymentIntentRef,
    ) -> LedgerEntry {
        let entry = LedgerEntry {
            id: LedgerEntryId::new(),
            account,
            currency: amount.currency,
            amount_minor: amount.amount_minor,
            entry_type,
            cause_ref,
            created_at: Utc::now(),
        };
        self.entries.write().push(entry.clone());
        entry
    }

    /// The balance for an account and currency: the sum of all matching
    /// entries, in minor units.
    pub fn balance(&self, account: &UserId, currency: &Currency) -> i64 {
        self.entries
            .read()
            .iter()
            .filter(|e| &e.account == account && &e.currency == currency)
            .map(|e| e.amount_minor)
            .sum()
    }

    /// All entries for an account, in append order.
    pub fn entries_for(&self, account: &UserId) -> Vec<LedgerEntry> {
        self.entries
            .read()
            .iter()
            .filter(|e| &e.account == account)
            .cloned()
            .collect()
    }

    /// All entries, in append order.
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.entries.read().clone()
    }

    /// Seed a previously persisted entry (startup hydration).
    pub fn restore(&self, entry: LedgerEntry) {
        self.entries.write().push(entry);
    }

    /// Number of entries in the ledger.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the ledger has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn usd(amount: i64) -> Money {
        Money::from_parts(amount, "USD").unwrap()
    }

    fn credit(store: &LedgerStore, account: UserId, amount: i64) -> LedgerEntry {
        store.append(
            account,
            usd(amount),
            EntryType::WalletCredit,
            PaymentIntentRef::new(format!("pi_{amount}")),
        )
    }

    #[test]
    fn empty_ledger_has_zero_balance() {
        let store = LedgerStore::new();
        let account = UserId::new();
        assert_eq!(store.balance(&account, &Currency::new("USD").unwrap()), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn balance_is_sum_of_entries() {
        let store = LedgerStore::new();
        let account = UserId::new();
        credit(&store, account, 100);
        credit(&store, account, 250);
        credit(&store, account, -30);
        assert_eq!(store.balance(&account, &Currency::new("USD").unwrap()), 320);
    }

    #[test]
    fn balances_are_per_account() {
        let store = LedgerStore::new();
        let a = UserId::new();
        let b = UserId::new();
        credit(&store, a, 100);
        credit(&store, b, 7);
        let usd = Currency::new("USD").unwrap();
        assert_eq!(store.balance(&a, &usd), 100);
        assert_eq!(store.balance(&b, &usd), 7);
    }

    #[test]
    fn balances_are_per_currency() {
        let store = LedgerStore::new();
        let account = UserId::new();
        store.append(
            account,
            Money::from_parts(100, "USD").unwrap(),
            EntryType::WalletCredit,
            PaymentIntentRef::new("pi_usd"),
        );
        store.append(
            account,
            Money::from_parts(555, "EUR").unwrap(),
            EntryType::WalletCredit,
            PaymentIntentRef::new("pi_eur"),
        );
        assert_eq!(store.balance(&account, &Currency::new("USD").unwrap()), 100);
        assert_eq!(store.balance(&account, &Currency::new("EUR").unwrap()), 555);
        assert_eq!(store.balance(&account, &Currency::new("GBP").unwrap()), 0);
    }

    #[test]
    fn entries_for_preserves_append_order() {
        let store = LedgerStore::new();
        let account = UserId::new();
        let first = credit(&store, account, 1);
        let second = credit(&store, account, 2);
        let entries = store.entries_for(&account);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, first.id);
        assert_eq!(entries[1].id, second.id);
    }

    #[test]
    fn clone_shares_underlying_entries() {
        let store = LedgerStore::new();
        let clone = store.clone();
        let account = UserId::new();
        credit(&clone, account, 40);
        assert_eq!(store.len(), 1);
        assert_eq!(store.balance(&account, &Currency::new("USD").unwrap()), 40);
    }

    proptest! {
        /// Balance derivability: for any sequence of credits a1..aN, the
        /// balance equals their sum regardless of ordering.
        #[test]
        fn balance_equals_sum_of_credits(amounts in proptest::collection::vec(1i64..1_000_000, 0..40)) {
            let store = LedgerStore::new();
            let account = UserId::new();
            for amount in &amounts {
                credit(&store, account, *amount);
            }
            let expected: i64 = amounts.iter().sum();
            prop_assert_eq!(store.balance(&account, &Currency::new("USD").unwrap()), expected);
        }
    }
}
