// src/db/corporation_repo.rs

use crate::{
    common::error::AppError,
    db::documents::{decode, decode_all, encode, Collection, SharedDocumentStore},
    models::corporation::{CorporateEntity, CorporateSettings, NewCorporation},
};

const COLLECTION: Collection = Collection::Corporations;

#[derive(Clone)]
pub struct CorporationRepository {
    store: SharedDocumentStore,
}

impl CorporationRepository {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self { store }
    }

    pub async fn list_all(&self) -> Result<Vec<CorporateEntity>, AppError> {
        let docs = self.store.query(COLLECTION, &[]).await?;
        Ok(decode_all(COLLECTION, docs))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<CorporateEntity>, AppError> {
        self.store.get(COLLECTION, id).await?.map(decode).transpose()
    }

    pub async fn create(&self, corporation: NewCorporation) -> Result<CorporateEntity, AppError> {
        let id = self.store.insert(COLLECTION, encode(&corporation, &[])?).await?;
        Ok(CorporateEntity {
            id,
            name: corporation.name,
            allow_tips: corporation.allow_tips,
            logo_url: corporation.logo_url,
        })
    }

    pub async fn update_settings(&self, id: &str, settings: &CorporateSettings) -> Result<(), AppError> {
        self.store.update(COLLECTION, id, encode(settings, &[])?).await
    }
}
