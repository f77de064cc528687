// src/services/associate_service.rs

use crate::{
    common::error::AppError,
    db::{AssociateRepository, UserRepository},
    models::{
        associate::{Associate, AssociateSettings, ProfileUpdatePayload},
        user::CurrentUser,
    },
};

#[derive(Clone)]
pub struct AssociateService {
    associates: AssociateRepository,
    users: UserRepository,
}

impl AssociateService {
    pub fn new(associates: AssociateRepository, users: UserRepository) -> Self {
        Self { associates, users }
    }

    pub async fn get(&self, associate_id: &str) -> Result<Associate, AppError> {
        self.associates
            .find_by_id(associate_id)
            .await?
            .ok_or_else(|| AppError::AssociateNotFound(associate_id.to_string()))
    }

    /// Atualiza nome, bio e avatar. O avatar também vai para `users/{authUid}`.
    pub async fn update_profile(
        &self,
        user: &CurrentUser,
        payload: ProfileUpdatePayload,
    ) -> Result<Associate, AppError> {
        let associate = self.get(&user.id).await?;
        let settings = AssociateSettings::from(payload);
        if settings.is_empty() {
            return Ok(associate);
        }

        self.associates.update_settings(&associate.id, &settings).await?;

        if let (Some(avatar_url), Some(auth_uid)) = (&settings.avatar_url, &associate.auth_uid) {
            self.users.update_avatar(auth_uid, avatar_url).await?;
        }

        tracing::info!("✅ Perfil do associado {} atualizado", associate.id);
        Ok(Associate {
            name: settings.name.unwrap_or(associate.name),
            about_me: settings.about_me.unwrap_or(associate.about_me),
            avatar_url: settings.avatar_url.unwrap_or(associate.avatar_url),
            ..associate
        })
    }
}
