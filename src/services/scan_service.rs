// src/services/scan_service.rs

use reqwest::Url;

use crate::{
    common::error::AppError,
    db::{AssociateRepository, CorporationRepository},
    models::scan::ScanResult,
};

/// Extrai o ID do associado de um QR do Bravos (`.../#/customer/<id>`).
pub fn parse_scanned_id(data: &str) -> Result<String, AppError> {
    let url = Url::parse(data.trim()).map_err(|_| AppError::InvalidScanPayload)?;
    let fragment = url.fragment().ok_or(AppError::InvalidScanPayload)?;

    let parts: Vec<&str> = fragment.split("/customer/").collect();
    let [_, rest] = parts.as_slice() else {
        return Err(AppError::InvalidScanPayload);
    };

    let id = rest.split(['/', '?']).next().unwrap_or_default();
    if id.is_empty() {
        return Err(AppError::InvalidScanPayload);
    }
    Ok(id.to_string())
}

pub fn customer_url(public_base_url: &str, associate_id: &str) -> String {
    format!("{}/#/customer/{}", public_base_url.trim_end_matches('/'), associate_id)
}

#[derive(Clone)]
pub struct ScanService {
    associates: AssociateRepository,
    corporations: CorporationRepository,
}

impl ScanService {
    pub fn new(associates: AssociateRepository, corporations: CorporationRepository) -> Self {
        Self { associates, corporations }
    }

    /// Decide para onde o cliente vai depois de ler o código.
    pub async fn route(&self, data: &str) -> Result<ScanResult, AppError> {
        let id = parse_scanned_id(data)?;
        let associate = self
            .associates
            .find_by_id(&id)
            .await?
            .ok_or(AppError::ScannedAssociateNotFound)?;

        match associate.corporate_id.clone().filter(|_| associate.is_corporate) {
            Some(corporate_id) => {
                let corporation_name = self
                    .corporations
                    .find_by_id(&corporate_id)
                    .await?
                    .map(|corp| corp.name);
                let teammates = self.associates.find_by_corporation(&corporate_id).await?;
                Ok(ScanResult {
                    redirect_to: format!("/customer?scanned={}", associate.id),
                    associate,
                    corporation_name,
                    teammates,
                })
            }
            None => Ok(ScanResult {
                redirect_to: format!("/customer/{}", associate.id),
                associate,
                corporation_name: None,
                teammates: Vec::new(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{associate::NewAssociate, corporation::NewCorporation},
        test_support::memory_repositories,
    };

    #[test]
    fn id_is_taken_up_to_the_next_slash_or_query() {
        assert_eq!(parse_scanned_id("https://x.app/#/customer/abc").unwrap(), "abc");
        assert_eq!(parse_scanned_id("https://x.app/index.html#/customer/abc/extra").unwrap(), "abc");
        assert_eq!(parse_scanned_id("https://x.app/#/customer/abc?ref=qr").unwrap(), "abc");
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        for data in ["not a url", "https://x.app/customer/abc", "https://x.app/#/team/abc", "https://x.app/#/customer/"] {
            assert!(
                matches!(parse_scanned_id(data), Err(AppError::InvalidScanPayload)),
                "aceitou: {data}"
            );
        }
    }

    #[tokio::test]
    async fn corporate_associates_route_to_team_selection() {
        let repos = memory_repositories();
        let corp = repos
            .corporations
            .create(NewCorporation { name: "Grand Hotel".into(), allow_tips: true, logo_url: None })
            .await
            .unwrap();
        let ana = repos
            .associates
            .create(NewAssociate::corporate(&corp.id, "ana@h.com", "Ana", "Concierge", "", "u"))
            .await
            .unwrap();
        repos
            .associates
            .create(NewAssociate::corporate(&corp.id, "bia@h.com", "Bia", "Bellhop", "", "u"))
            .await
            .unwrap();

        let scan = ScanService::new(repos.associates.clone(), repos.corporations.clone());
        let result = scan.route(&customer_url("https://x.app", &ana.id)).await.unwrap();
        assert_eq!(result.redirect_to, format!("/customer?scanned={}", ana.id));
        assert_eq!(result.teammates.len(), 2);
        assert_eq!(result.corporation_name.as_deref(), Some("Grand Hotel"));
    }

    #[tokio::test]
    async fn independent_associates_route_to_tip_form_and_unknown_ids_fail() {
        let repos = memory_repositories();
        let solo = repos
            .associates
            .create(NewAssociate::independent("s@x.com", "Sol", "Musician", "", "u"))
            .await
            .unwrap();
        let scan = ScanService::new(repos.associates.clone(), repos.corporations.clone());

        let result = scan.route(&customer_url("https://x.app/", &solo.id)).await.unwrap();
        assert_eq!(result.redirect_to, format!("/customer/{}", solo.id));
        assert!(result.teammates.is_empty());

        let err = scan.route("https://x.app/#/customer/missing").await.unwrap_err();
        assert!(matches!(err, AppError::ScannedAssociateNotFound));
    }
}
