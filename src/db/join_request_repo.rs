// src/db/join_request_repo.rs

use serde_json::json;

use crate::{
    common::error::AppError,
    db::documents::{decode, decode_all, encode, Collection, Filter, SharedDocumentStore},
    models::join_request::{JoinRequest, JoinRequestStatus, NewJoinRequest},
};

const COLLECTION: Collection = Collection::JoinRequests;

#[derive(Clone)]
pub struct JoinRequestRepository {
    store: SharedDocumentStore,
}

impl JoinRequestRepository {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: NewJoinRequest) -> Result<JoinRequest, AppError> {
        let id = self.store.insert(COLLECTION, encode(&request, &["timestamp"])?).await?;
        Ok(request.into_join_request(id))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<JoinRequest>, AppError> {
        self.store.get(COLLECTION, id).await?.map(decode).transpose()
    }

    /// Pedidos pendentes de uma corporação, do mais antigo para o mais novo.
    pub async fn pending_for_corporation(&self, corporate_id: &str) -> Result<Vec<JoinRequest>, AppError> {
        let docs = self
            .store
            .query(
                COLLECTION,
                &[
                    Filter::eq("corporateId", corporate_id),
                    Filter::eq("status", JoinRequestStatus::Pending.as_str()),
                ],
            )
            .await?;
        let mut requests: Vec<JoinRequest> = decode_all(COLLECTION, docs);
        requests.sort_by_key(|r| r.timestamp);
        Ok(requests)
    }

    pub async fn set_status(&self, id: &str, status: JoinRequestStatus) -> Result<(), AppError> {
        self.store
            .update(COLLECTION, id, json!({ "status": status.as_str() }))
            .await
    }
}
