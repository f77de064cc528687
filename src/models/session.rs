// src/models/session.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{
    associate::Associate, corporation::CorporateEntity, join_request::JoinRequest,
    message::Message, tip::Tip, user::CurrentUser,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Toast {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ToastKind,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self { message: message.into(), kind: ToastKind::Success }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { message: message.into(), kind: ToastKind::Error }
    }
}

// ---
// O estado que cada cliente conectado enxerga (publicado via SSE)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientState {
    pub associates: Vec<Associate>,
    pub tips: Vec<Tip>,
    pub corporations: Vec<CorporateEntity>,
    pub messages: Vec<Message>,
    pub join_requests: Vec<JoinRequest>,
    pub current_user: Option<CurrentUser>,
    pub loading: bool,
    pub toast: Option<Toast>,

    // Incrementado a cada transição de autenticação
    #[serde(skip)]
    pub epoch: u64,
    #[serde(skip)]
    pub toast_seq: u64,
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            associates: Vec::new(),
            tips: Vec::new(),
            corporations: Vec::new(),
            messages: Vec::new(),
            join_requests: Vec::new(),
            current_user: None,
            loading: true,
            toast: None,
            epoch: 0,
            toast_seq: 0,
        }
    }
}
