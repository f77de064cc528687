// src/services/profile_service.rs

use crate::{
    common::error::AppError,
    db::{AssociateRepository, CorporationRepository, UserRepository},
    models::user::{CurrentUser, UserType},
};

/// Resolve `users/{authUid}` + documento do papel em um `CurrentUser`.
#[derive(Clone)]
pub struct ProfileService {
    users: UserRepository,
    associates: AssociateRepository,
    corporations: CorporationRepository,
}

impl ProfileService {
    pub fn new(
        users: UserRepository,
        associates: AssociateRepository,
        corporations: CorporationRepository,
    ) -> Self {
        Self { users, associates, corporations }
    }

    /// `Ok(None)` quando o perfil não existe (cadastro incompleto, não é erro).
    pub async fn resolve_current_user(&self, auth_uid: &str) -> Result<Option<CurrentUser>, AppError> {
        let Some(profile) = self.users.find_profile(auth_uid).await? else {
            return Ok(None);
        };

        let mut id = auth_uid.to_string();
        let mut fallback_avatar = None;

        match profile.user_type {
            UserType::Associate => {
                if let Some(associate_id) = &profile.associate_id {
                    if let Some(associate) = self.associates.find_by_id(associate_id).await? {
                        fallback_avatar = Some(associate.avatar_url);
                    }
                    id = associate_id.clone();
                }
            }
            UserType::Corporate => {
                if let Some(corporate_id) = &profile.corporate_id {
                    if let Some(corporation) = self.corporations.find_by_id(corporate_id).await? {
                        fallback_avatar = corporation.logo_url;
                    }
                    id = corporate_id.clone();
                }
            }
            UserType::Customer => {}
        }

        Ok(Some(CurrentUser {
            auth_uid: auth_uid.to_string(),
            id,
            user_type: profile.user_type,
            avatar_url: profile.avatar_url.or(fallback_avatar),
        }))
    }

    pub async fn require_current_user(&self, auth_uid: &str) -> Result<CurrentUser, AppError> {
        self.resolve_current_user(auth_uid)
            .await?
            .ok_or(AppError::ProfileNotFound)
    }

    pub async fn update_avatar(&self, user: &CurrentUser, avatar_url: &str) -> Result<(), AppError> {
        self.users.update_avatar(&user.auth_uid, avatar_url).await
    }
}
