//! # souk-ledger — Append-Only Ledger & Wallet Service
//!
//! Money in the souk back office is a derived quantity: every movement is an
//! immutable [`LedgerEntry`], and a balance is the sum of entries for an
//! account and currency. Nothing stores a mutable balance, so the books can
//! always be rebuilt from the entries alone.
//!
//! - **Entry** ([`entry`]): the immutable ledger record and its entry types.
//!
//! - **Store** ([`store`]): the append-only [`LedgerStore`] with summation
//!   balances.
//!
//! - **Wallet** ([`wallet`]): the funding service. Each funding call is a new
//!   monetary event — deliberately not idempotent (see [`wallet`] docs).
//!
//! - **Processor** ([`processor`]): the boundary to the external payment
//!   processor, shared with the escrow controller.

pub mod entry;
pub mod error;
pub mod processor;
pub mod store;
pub mod wallet;

pub use entry::{EntryType, LedgerEntry, LedgerEntryId};
pub use error::LedgerError;
pub use processor::{InMemoryProcessor, PaymentProcessor, ProcessorError, RESOURCE_MISSING};
pub use store::LedgerStore;
pub use wallet::WalletService;
