//! Total charge for a case opening and the funds check against a balance.

use crate::boost::ResolvedBoosts;
use crate::types::Money;

/// The user's balance does not cover the total cost.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Insufficient funds: balance {balance}, required {required}")]
pub struct InsufficientFunds {
    pub balance: Money,
    pub required: Money,
}

/// `base_price + additional boost cost`.
pub fn total_cost(base_price: Money, boosts: &ResolvedBoosts) -> Money {
    base_price + boosts.additional_cost
}

/// Succeeds when `balance >= required`.
pub fn ensure_funds(balance: Money, required: Money) -> Result<(), InsufficientFunds> {
    if balance < required {
        return Err(InsufficientFunds { balance, required });
    }
    Ok(())
}
