use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::notify::InlineAlert;

/// Smallest payout the backend accepts.
pub const MIN_WITHDRAWAL: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub balance: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub pending: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutMethod {
    Bank,
    MobileMoney,
}

impl PayoutMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "bank" => Some(PayoutMethod::Bank),
            "mobile_money" | "momo" => Some(PayoutMethod::MobileMoney),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithdrawalRequest {
    pub amount: f64,
    pub method: PayoutMethod,
    pub account: String,
}

impl WithdrawalRequest {
    /// Checks that can be made locally before bothering the server.
    pub fn validate(&self, wallet: &Wallet) -> Result<(), InlineAlert> {
        if !self.amount.is_finite() || self.amount < MIN_WITHDRAWAL {
            return Err(InlineAlert::BelowMinimum {
                minimum: MIN_WITHDRAWAL,
            });
        }
        if self.amount > wallet.balance {
            return Err(InlineAlert::InsufficientBalance {
                balance: wallet.balance,
                requested: self.amount,
            });
        }
        if self.account.trim().is_empty() {
            return Err(InlineAlert::validation("account", "is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Paid,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: i64,
    pub amount: f64,
    pub method: PayoutMethod,
    pub status: WithdrawalStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(balance: f64) -> Wallet {
        Wallet {
            balance,
            currency: None,
            pending: 0.0,
        }
    }

    fn request(amount: f64) -> WithdrawalRequest {
        WithdrawalRequest {
            amount,
            method: PayoutMethod::MobileMoney,
            account: "0240000000".to_string(),
        }
    }

    #[test]
    fn test_insufficient_balance() {
        assert_eq!(
            request(50.0).validate(&wallet(20.0)),
            Err(InlineAlert::InsufficientBalance {
                balance: 20.0,
                requested: 50.0
            })
        );
    }

    #[test]
    fn test_below_minimum() {
        assert!(matches!(
            request(5.0).validate(&wallet(100.0)),
            Err(InlineAlert::BelowMinimum { .. })
        ));
    }

    #[test]
    fn test_valid_request() {
        assert_eq!(request(20.0).validate(&wallet(20.0)), Ok(()));
    }

    #[test]
    fn test_payout_method_parse() {
        assert_eq!(PayoutMethod::parse("momo"), Some(PayoutMethod::MobileMoney));
        assert_eq!(PayoutMethod::parse("mobile-money"), Some(PayoutMethod::MobileMoney));
        assert_eq!(PayoutMethod::parse("cash"), None);
    }
}
