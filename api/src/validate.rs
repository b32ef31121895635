use crate::consts::*;
use crate::error::{EarnError, Result};

fn validate_amount(amount: f64, minimum: f64, available: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(EarnError::InvalidAmount(amount));
    }
    if amount < minimum {
        return Err(EarnError::AmountBelowMinimum { amount, minimum });
    }
    if amount > available {
        return Err(EarnError::InsufficientBalance { amount, available });
    }
    Ok(())
}

/// Checks a deposit against the minimum and the connected wallet's balance.
pub fn validate_deposit(amount: f64, wallet_balance: f64) -> Result<()> {
    validate_amount(amount, MIN_DEPOSIT, wallet_balance)
}

/// Checks a withdrawal against the minimum and the staked balance.
pub fn validate_withdrawal(amount: f64, staked_balance: f64) -> Result<()> {
    validate_amount(amount, MIN_WITHDRAWAL, staked_balance)
}

pub fn validate_claim(earnings: f64, cooldown_until: Option<i64>, now: i64) -> Result<()> {
    if let Some(until) = cooldown_until {
        if now < until {
            return Err(EarnError::ClaimCooldown { until });
        }
    }
    if earnings.is_nan() || earnings <= 0.0 {
        return Err(EarnError::NothingToClaim);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_limits() {
        assert!(validate_deposit(5.0, 10.0).is_ok());
        assert!(validate_deposit(10.0, 10.0).is_ok());
        assert!(matches!(
            validate_deposit(0.5, 10.0),
            Err(EarnError::AmountBelowMinimum { .. })
        ));
        assert!(matches!(
            validate_deposit(11.0, 10.0),
            Err(EarnError::InsufficientBalance { .. })
        ));
        assert!(matches!(
            validate_deposit(-1.0, 10.0),
            Err(EarnError::InvalidAmount(_))
        ));
        assert!(matches!(
            validate_deposit(f64::INFINITY, f64::INFINITY),
            Err(EarnError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_withdrawal_limits() {
        assert!(validate_withdrawal(1.0, 1.0).is_ok());
        assert!(matches!(
            validate_withdrawal(2.0, 1.5),
            Err(EarnError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn test_claim_rules() {
        assert!(validate_claim(0.1, None, 0).is_ok());
        assert!(validate_claim(0.1, Some(100), 100).is_ok());
        assert!(matches!(
            validate_claim(0.0, None, 0),
            Err(EarnError::NothingToClaim)
        ));
        assert!(matches!(
            validate_claim(5.0, Some(100), 99),
            Err(EarnError::ClaimCooldown { until: 100 })
        ));
    }
}
