// src/db/associate_repo.rs

use serde_json::json;

use crate::{
    common::error::AppError,
    db::documents::{decode, decode_all, encode, Collection, Filter, SharedDocumentStore},
    models::associate::{Associate, AssociateSettings, NewAssociate},
};

const COLLECTION: Collection = Collection::Associates;

#[derive(Clone)]
pub struct AssociateRepository {
    store: SharedDocumentStore,
}

impl AssociateRepository {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self { store }
    }

    pub async fn list_all(&self) -> Result<Vec<Associate>, AppError> {
        let docs = self.store.query(COLLECTION, &[]).await?;
        Ok(decode_all(COLLECTION, docs))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Associate>, AppError> {
        self.store.get(COLLECTION, id).await?.map(decode).transpose()
    }

    pub async fn find_by_corporation(&self, corporate_id: &str) -> Result<Vec<Associate>, AppError> {
        let docs = self
            .store
            .query(COLLECTION, &[Filter::eq("corporateId", corporate_id)])
            .await?;
        Ok(decode_all(COLLECTION, docs))
    }

    // Usado na verificação do funcionário (etapa "Verify") e no import em lote
    pub async fn find_by_corporation_and_email(
        &self,
        corporate_id: &str,
        email: &str,
    ) -> Result<Option<Associate>, AppError> {
        let docs = self
            .store
            .query(
                COLLECTION,
                &[Filter::eq("corporateId", corporate_id), Filter::eq("email", email)],
            )
            .await?;
        Ok(decode_all(COLLECTION, docs).into_iter().next())
    }

    pub async fn create(&self, associate: NewAssociate) -> Result<Associate, AppError> {
        let id = self.store.insert(COLLECTION, encode(&associate, &[])?).await?;
        Ok(associate.into_associate(id))
    }

    pub async fn update_settings(&self, id: &str, settings: &AssociateSettings) -> Result<(), AppError> {
        self.store.update(COLLECTION, id, encode(settings, &[])?).await
    }

    /// Vincula o authUid ao associado, desde que ninguém o tenha reivindicado antes.
    pub async fn claim(
        &self,
        id: &str,
        auth_uid: &str,
        name: &str,
        about_me: &str,
    ) -> Result<bool, AppError> {
        self.store
            .update_where(
                COLLECTION,
                id,
                &[Filter::Missing("authUid")],
                json!({ "authUid": auth_uid, "name": name, "aboutMe": about_me }),
            )
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        self.store.delete(COLLECTION, id).await
    }
}
