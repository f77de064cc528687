// src/services/payment.rs

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    models::payment::{PaymentDetails, PaymentReceipt},
};

/// A porta de pagamentos. O Bravo só é gravado depois de uma cobrança aprovada.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn charge(&self, amount: Decimal, details: &PaymentDetails) -> Result<PaymentReceipt, AppError>;
}

// Modo demonstração: só confere se os campos do cartão foram preenchidos
pub struct DemoPaymentProvider;

#[async_trait]
impl PaymentProvider for DemoPaymentProvider {
    async fn charge(&self, amount: Decimal, details: &PaymentDetails) -> Result<PaymentReceipt, AppError> {
        let missing = [
            ("card holder name", &details.card_holder_name),
            ("card number", &details.card_number),
            ("expiry", &details.expiry),
            ("CVC", &details.cvc),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        if let Some((field, _)) = missing {
            return Err(AppError::PaymentDeclined(format!("Missing {field}.")));
        }

        tracing::info!("💳 [demo] Cobrança de ${:.2} no cartão final {}", amount, details.last4());
        Ok(PaymentReceipt {
            reference: format!("demo_{}", uuid::Uuid::new_v4().simple()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demo_provider_requires_card_fields() {
        let details = PaymentDetails {
            card_holder_name: "Jane".into(),
            card_number: "4242424242424242".into(),
            expiry: "01/30".into(),
            cvc: "".into(),
            zip: "".into(),
        };
        let err = DemoPaymentProvider.charge(Decimal::TEN, &details).await.unwrap_err();
        assert!(matches!(err, AppError::PaymentDeclined(msg) if msg.contains("CVC")));

        let ok = PaymentDetails { cvc: "123".into(), ..details };
        let receipt = DemoPaymentProvider.charge(Decimal::TEN, &ok).await.unwrap();
        assert!(receipt.reference.starts_with("demo_"));
    }
}
