use tracing::info;

use super::Marketplace;
use crate::api::{ApiError, ApiRequest, ItemEnvelope, ListEnvelope};
use crate::models::{Wallet, Withdrawal, WithdrawalRequest};
use crate::notify::ActionError;

impl Marketplace {
    pub async fn wallet(&self) -> Result<Wallet, ApiError> {
        let envelope: ItemEnvelope<Wallet> = self.callers.standard.send_json(ApiRequest::get("/wallet")).await?;
        Ok(envelope.into_inner())
    }

    pub async fn withdrawals(&self) -> Result<Vec<Withdrawal>, ApiError> {
        let envelope: ListEnvelope<Withdrawal> =
            self.callers.standard.send_json(ApiRequest::get("/wallet/withdrawals")).await?;
        Ok(envelope.into_page(0).items)
    }

    /// Checked against `wallet` first; a request that cannot succeed is
    /// refused with an inline alert and never sent.
    pub async fn request_withdrawal(&self, wallet: &Wallet, request: &WithdrawalRequest) -> Result<Withdrawal, ActionError> {
        request.validate(wallet)?;
        let api_request = ApiRequest::post("/wallet/withdrawals").json(request)?;
        let envelope: ItemEnvelope<Withdrawal> = self.callers.standard.send_json(api_request).await?;
        let withdrawal = envelope.into_inner();
        info!(id = withdrawal.id, amount = withdrawal.amount, "Withdrawal requested");
        Ok(withdrawal)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::models::{PayoutMethod, Wallet, WithdrawalRequest, WithdrawalStatus};
    use crate::notify::InlineAlert;
    use crate::testing::MarketHarness;

    fn wallet(balance: f64) -> Wallet {
        Wallet {
            balance,
            currency: Some("GHS".to_string()),
            pending: 0.0,
        }
    }

    fn request(amount: f64) -> WithdrawalRequest {
        WithdrawalRequest {
            amount,
            method: PayoutMethod::MobileMoney,
            account: "0241234567".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insufficient_balance_is_inline_and_offline() {
        let h = MarketHarness::new();

        let err = h.market.request_withdrawal(&wallet(20.0), &request(50.0)).await.unwrap_err();

        assert_eq!(
            err.alert(),
            Some(&InlineAlert::InsufficientBalance {
                balance: 20.0,
                requested: 50.0
            })
        );
        assert_eq!(h.transport.calls(), 0);
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_below_minimum_is_refused() {
        let h = MarketHarness::new();
        let err = h.market.request_withdrawal(&wallet(100.0), &request(5.0)).await.unwrap_err();
        assert!(matches!(err.alert(), Some(InlineAlert::BelowMinimum { .. })));
    }

    #[tokio::test]
    async fn test_valid_withdrawal_is_posted() {
        let h = MarketHarness::new();
        h.transport.push_json(json!({ "id": 8, "amount": 40.0, "method": "mobile_money", "status": "pending" }));

        let withdrawal = h
            .market
            .request_withdrawal(&wallet(100.0), &request(40.0))
            .await
            .expect("requested");

        assert_eq!(withdrawal.status, WithdrawalStatus::Pending);
        let sent = &h.transport.requests()[0];
        assert_eq!(sent.path, "/wallet/withdrawals");
        assert_eq!(
            sent.body,
            crate::api::RequestBody::Json(json!({ "amount": 40.0, "method": "mobile_money", "account": "0241234567" }))
        );
    }

    #[tokio::test]
    async fn test_wallet_unwraps_data() {
        let h = MarketHarness::new();
        h.transport.push_json(json!({ "data": { "balance": 12.5, "currency": "GHS" } }));

        assert_eq!(h.market.wallet().await.expect("wallet").balance, 12.5);
    }
}
