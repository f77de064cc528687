// src/models/payment.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Dados do cartão (modo demonstração: nunca são persistidos)
#[derive(Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    #[serde(default)]
    pub card_holder_name: String,
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    #[schema(example = "01/25")]
    pub expiry: String,
    #[serde(default)]
    pub cvc: String,
    #[serde(default)]
    pub zip: String,
}

impl PaymentDetails {
    pub fn last4(&self) -> String {
        let digits: Vec<char> = self.card_number.chars().filter(|c| c.is_ascii_digit()).collect();
        digits[digits.len().saturating_sub(4)..].iter().collect()
    }
}

// Nunca imprimir número do cartão / CVC nos logs
impl fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentDetails")
            .field("card_holder_name", &self.card_holder_name)
            .field("card_number", &format_args!("**** {}", self.last4()))
            .field("expiry", &self.expiry)
            .field("cvc", &"***")
            .field("zip", &self.zip)
            .finish()
    }
}

// Conta de repasse (associados e empresas)
#[derive(Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoutDetails {
    #[serde(default)]
    pub account_holder_name: String,
    #[serde(default)]
    pub routing_number: String,
    #[serde(default)]
    pub account_number: String,
}

impl fmt::Debug for PayoutDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayoutDetails")
            .field("account_holder_name", &self.account_holder_name)
            .field("routing_number", &"***")
            .field("account_number", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub reference: String,
}
