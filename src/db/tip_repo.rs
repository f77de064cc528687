// src/db/tip_repo.rs

use serde_json::json;

use crate::{
    common::error::AppError,
    db::documents::{decode, decode_all, encode, Collection, Filter, SharedDocumentStore},
    models::tip::{NewTip, Tip},
};

const COLLECTION: Collection = Collection::Tips;
const TIMESTAMPS: &[&str] = &["timestamp"];

#[derive(Clone)]
pub struct TipRepository {
    store: SharedDocumentStore,
}

impl TipRepository {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self { store }
    }

    pub async fn list_all(&self) -> Result<Vec<Tip>, AppError> {
        let docs = self.store.query(COLLECTION, &[]).await?;
        Ok(decode_all(COLLECTION, docs))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Tip>, AppError> {
        self.store.get(COLLECTION, id).await?.map(decode).transpose()
    }

    pub async fn find_by_associate(&self, associate_id: &str) -> Result<Vec<Tip>, AppError> {
        let docs = self
            .store
            .query(COLLECTION, &[Filter::eq("associateId", associate_id)])
            .await?;
        Ok(decode_all(COLLECTION, docs))
    }

    pub async fn find_by_corporation(&self, corporate_id: &str) -> Result<Vec<Tip>, AppError> {
        let docs = self
            .store
            .query(COLLECTION, &[Filter::eq("corporateId", corporate_id)])
            .await?;
        Ok(decode_all(COLLECTION, docs))
    }

    pub async fn find_by_customer(&self, customer_auth_uid: &str) -> Result<Vec<Tip>, AppError> {
        let docs = self
            .store
            .query(COLLECTION, &[Filter::eq("customerAuthUid", customer_auth_uid)])
            .await?;
        Ok(decode_all(COLLECTION, docs))
    }

    pub async fn create(&self, tip: NewTip) -> Result<Tip, AppError> {
        let id = self.store.insert(COLLECTION, encode(&tip, TIMESTAMPS)?).await?;
        Ok(tip.into_tip(id))
    }

    /// Atribui o cliente ao Bravo. Nunca sobrescreve um cliente já vinculado.
    pub async fn claim(&self, id: &str, customer_auth_uid: &str) -> Result<bool, AppError> {
        self.store
            .update_where(
                COLLECTION,
                id,
                &[Filter::Missing("customerAuthUid")],
                json!({ "customerAuthUid": customer_auth_uid }),
            )
            .await
    }

    // Distribuição: remoção em grupo, numa única operação. Devolve os Bravos
    // efetivamente removidos e quantos documentos saíram.
    pub async fn delete_for_associate(&self, associate_id: &str) -> Result<(Vec<Tip>, u64), AppError> {
        self.delete_matching(Filter::eq("associateId", associate_id)).await
    }

    pub async fn delete_for_corporation(&self, corporate_id: &str) -> Result<(Vec<Tip>, u64), AppError> {
        self.delete_matching(Filter::eq("corporateId", corporate_id)).await
    }

    async fn delete_matching(&self, filter: Filter) -> Result<(Vec<Tip>, u64), AppError> {
        let removed = self.store.delete_many(COLLECTION, &[filter]).await?;
        let cleared = removed.len() as u64;
        Ok((decode_all(COLLECTION, removed), cleared))
    }
}
