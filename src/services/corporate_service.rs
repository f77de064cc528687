// src/services/corporate_service.rs

use std::collections::HashSet;

use crate::{
    common::error::AppError,
    db::{AssociateRepository, CorporationRepository, JoinRequestRepository},
    models::{
        associate::{AddAssociatePayload, Associate, AssociateSettings, BulkImportResult, NewAssociate},
        corporation::{CorporateEntity, CorporateSettings},
        join_request::{JoinRequest, JoinRequestStatus},
    },
    services::storage::placeholder_image_url,
};

pub const REQUIRED_CSV_HEADERS: [&str; 4] = ["email", "name", "role", "aboutMe"];
const DEFAULT_IMPORT_ROLE: &str = "Team Member";
const DEFAULT_IMPORT_ABOUT_ME: &str = "Proud member of the team.";
const APPROVED_ROLE: &str = "New Member";
const APPROVED_ABOUT_ME: &str = "Welcome to the team!";

// Uma linha válida do CSV (email e nome presentes)
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub email: String,
    pub name: String,
    pub role: String,
    pub about_me: String,
}

// Divide uma linha respeitando campos entre aspas ("Silva, Ana")
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields.into_iter().map(|f| f.trim().to_string()).collect()
}

/// Lê o CSV de associados. O cabeçalho precisa conter `email,name,role,aboutMe`.
pub fn parse_associates_csv(csv: &str) -> Result<Vec<ImportRow>, AppError> {
    let mut lines = csv.lines();
    let headers = lines.next().map(split_csv_line).unwrap_or_default();

    if !REQUIRED_CSV_HEADERS.iter().all(|h| headers.iter().any(|header| header == h)) {
        return Err(AppError::InvalidInput(format!(
            "CSV must contain headers: {}",
            REQUIRED_CSV_HEADERS.join(", ")
        )));
    }
    let column = |name: &str| headers.iter().position(|h| h == name);
    let (email_col, name_col, role_col, about_col) =
        (column("email"), column("name"), column("role"), column("aboutMe"));

    let rows = lines
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let fields = split_csv_line(line);
            let get = |col: Option<usize>| {
                col.and_then(|i| fields.get(i)).cloned().unwrap_or_default()
            };
            let (email, name) = (get(email_col), get(name_col));
            if email.is_empty() || name.is_empty() {
                return None;
            }
            let role = get(role_col);
            let about_me = get(about_col);
            Some(ImportRow {
                email,
                name,
                role: if role.is_empty() { DEFAULT_IMPORT_ROLE.into() } else { role },
                about_me: if about_me.is_empty() { DEFAULT_IMPORT_ABOUT_ME.into() } else { about_me },
            })
        })
        .collect();
    Ok(rows)
}

#[derive(Clone)]
pub struct CorporateService {
    associates: AssociateRepository,
    corporations: CorporationRepository,
    join_requests: JoinRequestRepository,
}

impl CorporateService {
    pub fn new(
        associates: AssociateRepository,
        corporations: CorporationRepository,
        join_requests: JoinRequestRepository,
    ) -> Self {
        Self { associates, corporations, join_requests }
    }

    pub async fn corporation(&self, corporate_id: &str) -> Result<CorporateEntity, AppError> {
        self.corporations
            .find_by_id(corporate_id)
            .await?
            .ok_or_else(|| AppError::CorporationNotFound(corporate_id.to_string()))
    }

    pub async fn team(&self, corporate_id: &str) -> Result<Vec<Associate>, AppError> {
        self.associates.find_by_corporation(corporate_id).await
    }

    async fn member(&self, corporate_id: &str, associate_id: &str) -> Result<Associate, AppError> {
        let associate = self
            .associates
            .find_by_id(associate_id)
            .await?
            .ok_or_else(|| AppError::AssociateNotFound(associate_id.to_string()))?;
        if !associate.belongs_to(corporate_id) {
            return Err(AppError::Forbidden);
        }
        Ok(associate)
    }

    pub async fn add_associate(
        &self,
        corporate_id: &str,
        payload: AddAssociatePayload,
    ) -> Result<Associate, AppError> {
        let avatar_url = placeholder_image_url(&payload.name);
        let associate = self
            .associates
            .create(
                NewAssociate::corporate(
                    corporate_id,
                    payload.email.trim(),
                    payload.name.trim(),
                    payload.role.trim(),
                    payload.about_me.trim(),
                    &avatar_url,
                )
                .with_allow_tips(payload.allow_tips),
            )
            .await?;
        tracing::info!("✅ Associado {} adicionado à corporação {}", associate.id, corporate_id);
        Ok(associate)
    }

    /// Importa associados do CSV, pulando e-mails que já existem na corporação.
    pub async fn bulk_import(&self, corporate_id: &str, csv: &str) -> Result<BulkImportResult, AppError> {
        let rows = parse_associates_csv(csv)?;
        if rows.is_empty() {
            return Err(AppError::InvalidInput(
                "No valid associates found in the file to import.".into(),
            ));
        }

        let mut known: HashSet<String> = self
            .associates
            .find_by_corporation(corporate_id)
            .await?
            .into_iter()
            .map(|a| a.email)
            .collect();

        let mut result = BulkImportResult { imported: 0, skipped: 0 };
        for row in rows {
            if !known.insert(row.email.clone()) {
                result.skipped += 1;
                continue;
            }
            let avatar_url = placeholder_image_url(&row.name);
            self.associates
                .create(NewAssociate::corporate(
                    corporate_id,
                    &row.email,
                    &row.name,
                    &row.role,
                    &row.about_me,
                    &avatar_url,
                ))
                .await?;
            result.imported += 1;
        }

        tracing::info!(
            "📥 Import na corporação {}: {} importados, {} duplicados",
            corporate_id,
            result.imported,
            result.skipped
        );
        Ok(result)
    }

    pub async fn remove_associate(&self, corporate_id: &str, associate_id: &str) -> Result<(), AppError> {
        self.member(corporate_id, associate_id).await?;
        self.associates.delete(associate_id).await?;
        tracing::info!("🗑️ Associado {} removido da corporação {}", associate_id, corporate_id);
        Ok(())
    }

    pub async fn update_settings(
        &self,
        corporate_id: &str,
        settings: CorporateSettings,
    ) -> Result<CorporateEntity, AppError> {
        let corporation = self.corporation(corporate_id).await?;
        if settings.allow_tips.is_none() && settings.logo_url.is_none() {
            return Ok(corporation);
        }
        self.corporations.update_settings(corporate_id, &settings).await?;
        Ok(CorporateEntity {
            allow_tips: settings.allow_tips.unwrap_or(corporation.allow_tips),
            logo_url: settings.logo_url.or(corporation.logo_url),
            ..corporation
        })
    }

    pub async fn set_associate_tips(
        &self,
        corporate_id: &str,
        associate_id: &str,
        allow_tips: bool,
    ) -> Result<Associate, AppError> {
        let associate = self.member(corporate_id, associate_id).await?;
        self.associates
            .update_settings(
                associate_id,
                &AssociateSettings { allow_tips: Some(allow_tips), ..Default::default() },
            )
            .await?;
        Ok(Associate { allow_tips, ..associate })
    }

    pub async fn pending_requests(&self, corporate_id: &str) -> Result<Vec<JoinRequest>, AppError> {
        self.join_requests.pending_for_corporation(corporate_id).await
    }

    async fn pending_request(&self, corporate_id: &str, request_id: &str) -> Result<JoinRequest, AppError> {
        let request = self
            .join_requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::JoinRequestNotFound(request_id.to_string()))?;
        if request.corporate_id != corporate_id {
            return Err(AppError::Forbidden);
        }
        if request.status != JoinRequestStatus::Pending {
            return Err(AppError::InvalidInput("This request has already been handled.".into()));
        }
        Ok(request)
    }

    /// Aprova: cria o associado com os padrões de boas-vindas e marca o pedido.
    pub async fn approve_request(&self, corporate_id: &str, request_id: &str) -> Result<Associate, AppError> {
        let request = self.pending_request(corporate_id, request_id).await?;
        let associate = self
            .associates
            .create(NewAssociate::corporate(
                &request.corporate_id,
                &request.email,
                &request.name,
                APPROVED_ROLE,
                APPROVED_ABOUT_ME,
                &request.avatar_url,
            ))
            .await?;
        self.join_requests
            .set_status(request_id, JoinRequestStatus::Approved)
            .await?;
        tracing::info!("✅ Pedido {} aprovado (associado {})", request_id, associate.id);
        Ok(associate)
    }

    pub async fn deny_request(&self, corporate_id: &str, request_id: &str) -> Result<(), AppError> {
        self.pending_request(corporate_id, request_id).await?;
        self.join_requests
            .set_status(request_id, JoinRequestStatus::Denied)
            .await?;
        tracing::info!("🚫 Pedido {} negado", request_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::Repositories,
        models::{corporation::NewCorporation, join_request::NewJoinRequest},
        test_support::memory_repositories,
    };
    use chrono::Utc;

    fn service(repos: &Repositories) -> CorporateService {
        CorporateService::new(
            repos.associates.clone(),
            repos.corporations.clone(),
            repos.join_requests.clone(),
        )
    }

    async fn corporation(repos: &Repositories) -> String {
        repos
            .corporations
            .create(NewCorporation { name: "Grand".into(), allow_tips: true, logo_url: None })
            .await
            .unwrap()
            .id
    }

    #[test]
    fn csv_rows_get_defaults_and_quoted_fields() {
        let csv = "name,email,role,aboutMe\n\"Silva, Ana\",ana@g.com,,\nBia,,Chef,Cooks\n\nCai,cai@g.com,Chef,\"Says \"\"hi\"\"\"";
        let rows = parse_associates_csv(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Silva, Ana");
        assert_eq!(rows[0].role, "Team Member");
        assert_eq!(rows[0].about_me, "Proud member of the team.");
        assert_eq!(rows[1].about_me, "Says \"hi\"");
    }

    #[test]
    fn csv_without_required_headers_is_rejected() {
        let err = parse_associates_csv("email,name\na@b.com,A").unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(m) if m == "CSV must contain headers: email, name, role, aboutMe"));
    }

    #[tokio::test]
    async fn bulk_import_skips_existing_and_repeated_emails() {
        let repos = memory_repositories();
        let corp_id = corporation(&repos).await;
        let service = service(&repos);
        repos
            .associates
            .create(NewAssociate::corporate(&corp_id, "ana@g.com", "Ana", "Chef", "", "u"))
            .await
            .unwrap();

        let csv = "email,name,role,aboutMe\nana@g.com,Ana,Chef,x\nbia@g.com,Bia Lima,,\nbia@g.com,Bia,,";
        let result = service.bulk_import(&corp_id, csv).await.unwrap();
        assert_eq!(result.imported, 1);
        assert_eq!(result.skipped, 2);

        let bia = repos
            .associates
            .find_by_corporation_and_email(&corp_id, "bia@g.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bia.avatar_url, "https://picsum.photos/seed/bia-lima/200");
    }

    #[tokio::test]
    async fn approving_a_request_creates_a_welcome_member() {
        let repos = memory_repositories();
        let corp_id = corporation(&repos).await;
        let service = service(&repos);
        let request = repos
            .join_requests
            .create(NewJoinRequest::pending(&corp_id, "new@g.com", "Nina", "avatar", Utc::now()))
            .await
            .unwrap();

        let associate = service.approve_request(&corp_id, &request.id).await.unwrap();
        assert_eq!(associate.role, "New Member");
        assert_eq!(associate.about_me, "Welcome to the team!");
        assert_eq!(associate.avatar_url, "avatar");
        assert!(service.pending_requests(&corp_id).await.unwrap().is_empty());

        let again = service.deny_request(&corp_id, &request.id).await.unwrap_err();
        assert!(matches!(again, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn other_corporations_cannot_touch_members() {
        let repos = memory_repositories();
        let corp_id = corporation(&repos).await;
        let service = service(&repos);
        let member = repos
            .associates
            .create(NewAssociate::corporate(&corp_id, "a@g.com", "Ana", "Chef", "", "u"))
            .await
            .unwrap();

        let err = service.remove_associate("other", &member.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let updated = service.set_associate_tips(&corp_id, &member.id, false).await.unwrap();
        assert!(!updated.allow_tips);
        service.remove_associate(&corp_id, &member.id).await.unwrap();
        assert!(service.team(&corp_id).await.unwrap().is_empty());
    }
}
