pub mod balance_transaction;
pub mod boost;
pub mod case;
pub mod case_opening;
pub mod page;
pub mod status;
pub mod user;
