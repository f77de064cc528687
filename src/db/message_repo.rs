// src/db/message_repo.rs

use crate::{
    common::error::AppError,
    db::documents::{decode_all, encode, Collection, Filter, SharedDocumentStore},
    models::message::{Message, NewMessage},
};

const COLLECTION: Collection = Collection::Messages;

#[derive(Clone)]
pub struct MessageRepository {
    store: SharedDocumentStore,
}

impl MessageRepository {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, message: NewMessage) -> Result<Message, AppError> {
        let id = self.store.insert(COLLECTION, encode(&message, &["timestamp"])?).await?;
        Ok(message.into_message(id))
    }

    /// Mensagens em que o usuário participa, em ordem cronológica.
    pub async fn find_for_participant(&self, auth_uid: &str) -> Result<Vec<Message>, AppError> {
        let docs = self
            .store
            .query(COLLECTION, &[Filter::array_contains("participantIds", auth_uid)])
            .await?;
        let mut messages: Vec<Message> = decode_all(COLLECTION, docs);
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    pub async fn find_by_tip(&self, tip_id: &str, auth_uid: &str) -> Result<Vec<Message>, AppError> {
        let docs = self
            .store
            .query(
                COLLECTION,
                &[
                    Filter::eq("tipId", tip_id),
                    Filter::array_contains("participantIds", auth_uid),
                ],
            )
            .await?;
        let mut messages: Vec<Message> = decode_all(COLLECTION, docs);
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }
}
