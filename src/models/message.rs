// src/models/message.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Mensagem trocada sobre um Bravo. Imutável depois de criada.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub tip_id: String,
    // [fromId, toId], para a consulta "array-contains"
    pub participant_ids: Vec<String>,
    pub from_id: String,
    pub to_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub tip_id: String,
    participant_ids: Vec<String>,
    pub from_id: String,
    pub to_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl NewMessage {
    /// Única forma de montar uma mensagem: os participantes saem sempre de (from, to).
    pub fn between(tip_id: &str, from_id: &str, to_id: &str, text: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            tip_id: tip_id.to_string(),
            participant_ids: vec![from_id.to_string(), to_id.to_string()],
            from_id: from_id.to_string(),
            to_id: to_id.to_string(),
            text: text.to_string(),
            timestamp,
        }
    }

    pub fn into_message(self, id: String) -> Message {
        Message {
            id,
            tip_id: self.tip_id,
            participant_ids: self.participant_ids,
            from_id: self.from_id,
            to_id: self.to_id,
            text: self.text,
            timestamp: self.timestamp,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    #[validate(length(min = 1, message = "Message cannot be empty."))]
    pub text: String,
}
