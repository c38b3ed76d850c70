//! Repository structs, one per table family. All methods are associated
//! functions taking a pool, executor, or open transaction.

pub mod boost_repo;
pub mod case_opening_repo;
pub mod case_repo;
pub mod ledger_repo;
pub mod user_repo;

pub use boost_repo::BoostRepo;
pub use case_opening_repo::CaseOpeningRepo;
pub use case_repo::CaseRepo;
pub use ledger_repo::{LedgerError, LedgerRepo};
pub use user_repo::UserRepo;
