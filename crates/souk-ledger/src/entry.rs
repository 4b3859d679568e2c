//! The immutable ledger record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use souk_core::{Currency, PaymentIntentRef, UserId};
use uuid::Uuid;

/// Unique identifier of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerEntryId(Uuid);

impl LedgerEntryId {
    /// Create a new random entry identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an entry identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for LedgerEntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LedgerEntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification of a monetary movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    /// Funds added to a wallet by the account holder.
    WalletCredit,
    /// Funds spent from a wallet at checkout.
    PurchaseDebit,
    /// Escrowed funds released to the seller.
    EscrowRelease,
    /// Escrowed funds refunded to the buyer.
    EscrowRefund,
}

impl EntryType {
    /// The canonical string name of this entry type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WalletCredit => "WALLET_CREDIT",
            Self::PurchaseDebit => "PURCHASE_DEBIT",
            Self::EscrowRelease => "ESCROW_RELEASE",
            Self::EscrowRefund => "ESCROW_REFUND",
        }
    }

    /// Parse a canonical entry type name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "WALLET_CREDIT" => Some(Self::WalletCredit),
            "PURCHASE_DEBIT" => Some(Self::PurchaseDebit),
            "ESCROW_RELEASE" => Some(Self::EscrowRelease),
            "ESCROW_REFUND" => Some(Self::EscrowRefund),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single monetary movement. Immutable once written: entries are never
/// edited or deleted, and they are retained forever as the financial record.
///
/// The balance invariant: for any account and currency,
/// `balance == sum(entry.amount_minor for matching entries)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique entry identifier.
    pub id: LedgerEntryId,
    /// The account this movement belongs to.
    pub account: UserId,
    /// Currency of the movement.
    pub currency: Currency,
    /// Signed amount in minor units. Credits positive, debits negative.
    pub amount_minor: i64,
    /// What kind of movement this is.
    pub entry_type: EntryType,
    /// The processor payment intent / transaction that caused this entry.
    pub cause_ref: PaymentIntentRef,
    /// When the entry was written (UTC).
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_type_as_str_all_variants() {
        assert_eq!(EntryType::WalletCredit.as_str(), "WALLET_CREDIT");
        assert_eq!(EntryType::PurchaseDebit.as_str(), "PURCHASE_DEBIT");
        assert_eq!(EntryType::EscrowRelease.as_str(), "ESCROW_RELEASE");
        assert_eq!(EntryType::EscrowRefund.as_str(), "ESCROW_REFUND");
    }

    #[test]
    fn entry_type_serializes_screaming_case() {
        assert_eq!(
            serde_json::to_string(&EntryType::WalletCredit).unwrap(),
            "\"WALLET_CREDIT\""
        );
    }

    #[test]
    fn entry_serialization_roundtrip() {
        let entry = LedgerEntry {
            id: LedgerEntryId::new(),
            account: UserId::new(),
            currency: Currency::new("USD").unwrap(),
            amount_minor: 1250,
            entry_type: EntryType::WalletCredit,
            cause_ref: PaymentIntentRef::new("pi_test"),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: LedgerEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, entry.id);
        assert_eq!(back.amount_minor, 1250);
    }
}
