//! Case-opening engine.
//!
//! Chains boost resolution, cost calculation, the funds check, weighted
//! prize selection, the ledger debit, and the history write inside one
//! database transaction.

pub mod case_opening;

pub use case_opening::{CaseOpeningEngine, OddsPreview, OpenCaseError, OpeningOutcome, PrizeOdds};
