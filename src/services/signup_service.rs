// src/services/signup_service.rs

use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::Utc;
use tokio::{
    sync::{Mutex, RwLock},
    task::JoinHandle,
    time::Instant,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Repositories,
    models::{
        associate::NewAssociate,
        auth::AuthResponse,
        corporation::NewCorporation,
        join_request::NewJoinRequest,
        signup::{AccountType, EmployeeStatus, SignupForm, SignupOutcome, SignupSession, WizardView},
        user::{UserProfile, UserType},
    },
    services::{
        auth::AuthService,
        profile_service::ProfileService,
        storage::{placeholder_image_url, BlobStorage},
    },
};

const ALREADY_CLAIMED_NOTICE: &str = "This account has already been claimed. Please log in.";
const VERIFY_FAILED_NOTICE: &str = "Could not verify employee. Please check the Employer ID.";
const ACCOUNT_ISSUE: &str = "We couldn't proceed with your request. This may be because the Employer ID is incorrect, or the account has already been claimed.";

/// Tempo de vida de uma sessão do wizard, concluída ou não.
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60);
const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

type SharedSession = Arc<Mutex<SignupSession>>;

struct SessionEntry {
    created_at: Instant,
    session: SharedSession,
}

/// O wizard de cadastro. As sessões vivem em memória, uma por UUID, até SESSION_TTL.
#[derive(Clone)]
pub struct SignupService {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    repos: Repositories,
    auth: AuthService,
    profiles: ProfileService,
    storage: Arc<dyn BlobStorage>,
}

fn required(value: &Option<String>) -> Option<&str> {
    Some(SignupForm::field(value)).filter(|v| !v.is_empty())
}

impl SignupService {
    pub fn new(
        repos: Repositories,
        auth: AuthService,
        profiles: ProfileService,
        storage: Arc<dyn BlobStorage>,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            repos,
            auth,
            profiles,
            storage,
        }
    }

    async fn session(&self, id: Uuid) -> Result<SharedSession, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(|entry| entry.session.clone())
            .ok_or(AppError::SignupSessionNotFound)
    }

    /// Remove as sessões mais antigas que SESSION_TTL. Devolve quantas saíram.
    pub async fn sweep_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.created_at.elapsed() < SESSION_TTL);
        before - sessions.len()
    }

    /// Limpeza periódica das sessões expiradas, enquanto o servidor rodar.
    pub fn spawn_expiry_sweep(&self) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                let removed = service.sweep_expired().await;
                if removed > 0 {
                    tracing::debug!("🧹 {} sessão(ões) de cadastro expirada(s) removida(s)", removed);
                }
            }
        })
    }

    pub async fn create(&self) -> WizardView {
        let session = SignupSession::new();
        let view = session.view();
        let entry = SessionEntry { created_at: Instant::now(), session: Arc::new(Mutex::new(session)) };
        self.sessions.write().await.insert(view.id, entry);
        view
    }

    pub async fn get(&self, id: Uuid) -> Result<WizardView, AppError> {
        Ok(self.session(id).await?.lock().await.view())
    }

    pub async fn select_account_type(&self, id: Uuid, account_type: AccountType) -> Result<WizardView, AppError> {
        let shared = self.session(id).await?;
        let mut session = shared.lock().await;
        if session.current_step != 0 {
            return Err(AppError::InvalidSignupStep("The account type has already been chosen.".into()));
        }
        session.account_type = Some(account_type);
        session.employee_status = EmployeeStatus::Check;
        session.current_step = 1;
        session.notice = None;
        Ok(session.view())
    }

    /// Avança uma etapa comum (sem efeitos colaterais), guardando os campos enviados.
    pub async fn next(&self, id: Uuid, form: SignupForm) -> Result<WizardView, AppError> {
        let shared = self.session(id).await?;
        let mut session = shared.lock().await;
        let account_type = session
            .account_type
            .ok_or_else(|| AppError::InvalidSignupStep("Please choose an account type first.".into()))?;

        if account_type == AccountType::Employee && session.current_step == 1 {
            return Err(AppError::InvalidSignupStep("Please verify your employment to continue.".into()));
        }
        if session.current_step >= account_type.submit_index() {
            return Err(AppError::InvalidSignupStep("Submit this step to continue.".into()));
        }

        session.form.merge(form);
        session.current_step += 1;
        session.notice = None;
        Ok(session.view())
    }

    pub async fn back(&self, id: Uuid) -> Result<WizardView, AppError> {
        let shared = self.session(id).await?;
        let mut session = shared.lock().await;
        if session.is_finished() {
            return Err(AppError::InvalidSignupStep("This signup is already complete.".into()));
        }

        match (session.account_type, session.current_step) {
            // Voltar da primeira etapa recomeça o fluxo
            (_, 0 | 1) => {
                let fresh = SignupSession { id: session.id, ..SignupSession::new() };
                *session = fresh;
            }
            (Some(AccountType::Employee), 2) => {
                session.employee_status = EmployeeStatus::Check;
                session.found_associate = None;
                session.current_step = 1;
            }
            _ => session.current_step -= 1,
        }
        session.notice = None;
        Ok(session.view())
    }

    pub async fn reset(&self, id: Uuid) -> Result<WizardView, AppError> {
        let shared = self.session(id).await?;
        let mut session = shared.lock().await;
        *session = SignupSession { id, ..SignupSession::new() };
        Ok(session.view())
    }

    /// Imagem do cadastro (avatar, logo ou foto do pedido de entrada), antes de existir login.
    pub async fn upload_avatar(&self, id: Uuid, file_name: &str, bytes: Vec<u8>) -> Result<WizardView, AppError> {
        let shared = self.session(id).await?;
        let mut session = shared.lock().await;
        let account_type = session
            .account_type
            .ok_or_else(|| AppError::InvalidSignupStep("Please choose an account type first.".into()))?;
        if session.is_finished() {
            return Err(AppError::InvalidSignupStep("This signup is already complete.".into()));
        }
        if bytes.is_empty() {
            return Err(AppError::InvalidInput("The uploaded file is empty.".into()));
        }

        let folder = match account_type {
            AccountType::Employee => match required(&session.form.employer_id) {
                Some(employer_id) => format!("requests/{employer_id}"),
                None => return Err(AppError::InvalidInput("Email and Employer ID are required.".into())),
            },
            AccountType::Corporate => format!("logos/{id}"),
            AccountType::Customer | AccountType::Individual => format!("avatars/{id}"),
        };
        let url = self.storage.upload(&folder, file_name, bytes).await?;
        tracing::info!("📤 Imagem do cadastro {} salva em {}", id, folder);

        session.form.avatar_url = Some(url);
        Ok(session.view())
    }

    /// Etapa "Verify" do funcionário: procura o associado por (corporateId, email).
    /// Sempre avança; o resultado fica em `employeeStatus`.
    pub async fn verify(&self, id: Uuid, form: SignupForm) -> Result<WizardView, AppError> {
        let shared = self.session(id).await?;
        let mut session = shared.lock().await;
        if session.account_type != Some(AccountType::Employee) || session.current_step != 1 {
            return Err(AppError::InvalidSignupStep("Verification is only part of the employee signup.".into()));
        }
        session.form.merge(form);

        let (Some(email), Some(employer_id)) = (required(&session.form.email), required(&session.form.employer_id)) else {
            return Err(AppError::InvalidInput("Email and Employer ID are required.".into()));
        };

        let lookup = self
            .repos
            .associates
            .find_by_corporation_and_email(employer_id, email)
            .await;

        session.notice = None;
        session.found_associate = None;
        match lookup {
            Ok(Some(associate)) if associate.is_claimed() => {
                session.employee_status = EmployeeStatus::Error;
                session.notice = Some(ALREADY_CLAIMED_NOTICE.into());
            }
            Ok(Some(associate)) => {
                session.form.name = Some(associate.name.clone());
                session.form.about_me = Some(associate.about_me.clone());
                session.found_associate = Some(associate);
                session.employee_status = EmployeeStatus::Claim;
            }
            Ok(None) => session.employee_status = EmployeeStatus::Request,
            Err(e) => {
                tracing::error!("🔥 Falha ao verificar funcionário: {}", e);
                session.employee_status = EmployeeStatus::Error;
                session.notice = Some(VERIFY_FAILED_NOTICE.into());
            }
        }
        session.current_step += 1;
        Ok(session.view())
    }

    /// A etapa final antes de "Finish": envia o pedido de entrada ou cria a conta.
    pub async fn submit(&self, id: Uuid, form: SignupForm) -> Result<SignupOutcome, AppError> {
        let shared = self.session(id).await?;
        let mut session = shared.lock().await;
        let account_type = session
            .account_type
            .ok_or_else(|| AppError::InvalidSignupStep("Please choose an account type first.".into()))?;
        if session.current_step != account_type.submit_index() {
            return Err(AppError::InvalidSignupStep("This step cannot be submitted.".into()));
        }
        session.form.merge(form);
        session.notice = None;

        if account_type == AccountType::Employee {
            match session.employee_status {
                EmployeeStatus::Request => {
                    self.send_join_request(&session.form).await?;
                    session.employee_status = EmployeeStatus::Pending;
                    session.current_step += 1;
                    session.form.password = None;
                    return Ok(SignupOutcome { wizard: session.view(), auth: None });
                }
                EmployeeStatus::Claim => {}
                _ => return Err(AppError::InvalidSignupStep(ACCOUNT_ISSUE.into())),
            }
        }

        let auth = self.create_account(account_type, &session).await?;
        session.home_path = Some(auth.home_path.clone());
        session.current_step += 1;
        // A sessão concluída fica até expirar, sem a senha
        session.form.password = None;
        Ok(SignupOutcome { wizard: session.view(), auth: Some(auth) })
    }

    async fn send_join_request(&self, form: &SignupForm) -> Result<(), AppError> {
        let name = required(&form.name)
            .ok_or_else(|| AppError::InvalidInput("Please enter your name.".into()))?;
        let avatar_url = required(&form.avatar_url)
            .map(str::to_string)
            .unwrap_or_else(|| placeholder_image_url(name));

        self.repos
            .join_requests
            .create(NewJoinRequest::pending(
                SignupForm::field(&form.employer_id),
                SignupForm::field(&form.email),
                name,
                &avatar_url,
                Utc::now(),
            ))
            .await
            .map_err(|e| {
                tracing::error!("🔥 Falha ao enviar pedido de entrada: {}", e);
                AppError::ServiceUnavailable("Failed to send join request.".into())
            })?;
        tracing::info!("📨 Pedido de entrada enviado para a corporação {}", SignupForm::field(&form.employer_id));
        Ok(())
    }

    async fn create_account(&self, account_type: AccountType, session: &SignupSession) -> Result<AuthResponse, AppError> {
        let form = &session.form;
        let (Some(email), Some(password), Some(_)) =
            (required(&form.email), required(&form.password), required(&form.name))
        else {
            return Err(AppError::InvalidInput("Email, Password, and Name are required.".into()));
        };
        let company_name = required(&form.company_name);
        if account_type == AccountType::Corporate && company_name.is_none() {
            return Err(AppError::InvalidInput("Please enter your company name.".into()));
        }

        // O associado pode ter sido reivindicado depois da verificação
        if account_type == AccountType::Employee {
            let found = session
                .found_associate
                .as_ref()
                .ok_or_else(|| AppError::InvalidSignupStep(ACCOUNT_ISSUE.into()))?;
            let still_free = self
                .repos
                .associates
                .find_by_id(&found.id)
                .await?
                .is_some_and(|associate| !associate.is_claimed());
            if !still_free {
                return Err(AppError::AlreadyClaimed);
            }
        }

        let auth_uid = self.auth.register_user(email, password).await?;
        let user_type = match self.provision(account_type, session, &auth_uid).await {
            Ok(user_type) => user_type,
            Err(e) => {
                self.discard_identity(&auth_uid).await;
                return Err(e);
            }
        };

        tracing::info!("✅ Conta '{:?}' criada para {}", account_type, email);
        let current_user = self.profiles.require_current_user(&auth_uid).await?;
        Ok(AuthResponse {
            token: self.auth.create_token(&auth_uid)?,
            current_user,
            home_path: user_type.home_path().to_string(),
        })
    }

    // Desfaz a identidade de um cadastro que falhou no meio, liberando o email
    async fn discard_identity(&self, auth_uid: &str) {
        if let Err(e) = self.repos.users.delete_profile(auth_uid).await {
            tracing::error!("🔥 Falha ao remover o perfil {} do cadastro abortado: {}", auth_uid, e);
        }
        match self.repos.users.delete_credential(auth_uid).await {
            Ok(_) => tracing::warn!("⚠️ Cadastro abortado; credencial {} removida", auth_uid),
            Err(e) => tracing::error!("🔥 Falha ao remover a credencial {}: {}", auth_uid, e),
        }
    }

    // Cria os documentos do tipo de conta para uma identidade recém-registrada
    async fn provision(
        &self,
        account_type: AccountType,
        session: &SignupSession,
        auth_uid: &str,
    ) -> Result<UserType, AppError> {
        let form = &session.form;
        let email = SignupForm::field(&form.email);
        let name = SignupForm::field(&form.name);
        let company_name = SignupForm::field(&form.company_name);
        let avatar_url = required(&form.avatar_url)
            .map(str::to_string)
            .unwrap_or_else(|| placeholder_image_url(name));
        let role = SignupForm::field(&form.role);
        let about_me = SignupForm::field(&form.about_me);

        let user_type = match account_type {
            AccountType::Individual => {
                let associate = self
                    .repos
                    .associates
                    .create(NewAssociate::independent(email, name, role, about_me, &avatar_url).with_auth_uid(auth_uid))
                    .await?;
                self.repos
                    .users
                    .set_profile(auth_uid, &UserProfile::associate(&associate.id, &avatar_url))
                    .await?;
                UserType::Associate
            }
            AccountType::Employee => {
                let found = session
                    .found_associate
                    .as_ref()
                    .ok_or_else(|| AppError::InvalidSignupStep(ACCOUNT_ISSUE.into()))?;
                // Só reivindica se ninguém chegou antes
                if !self.repos.associates.claim(&found.id, auth_uid, name, about_me).await? {
                    tracing::warn!("⚠️ Associado {} reivindicado por outra conta durante o cadastro", found.id);
                    return Err(AppError::AlreadyClaimed);
                }
                self.repos
                    .users
                    .set_profile(auth_uid, &UserProfile::associate(&found.id, &found.avatar_url))
                    .await?;
                UserType::Associate
            }
            AccountType::Corporate => {
                // A imagem enviada no cadastro corporativo é o logo
                let logo_url = required(&form.avatar_url)
                    .map(str::to_string)
                    .unwrap_or_else(|| placeholder_image_url(company_name));
                let corporation = self
                    .repos
                    .corporations
                    .create(NewCorporation {
                        name: company_name.to_string(),
                        allow_tips: true,
                        logo_url: Some(logo_url.clone()),
                    })
                    .await?;
                self.repos
                    .users
                    .set_profile(auth_uid, &UserProfile::corporate(&corporation.id, &placeholder_image_url(name)))
                    .await?;
                self.repos
                    .associates
                    .create(
                        NewAssociate::corporate(
                            &corporation.id,
                            email,
                            name,
                            "Administrator",
                            &format!("Administrator for {company_name}."),
                            &logo_url,
                        )
                        .with_auth_uid(auth_uid),
                    )
                    .await?;
                UserType::Corporate
            }
            AccountType::Customer => {
                self.repos
                    .users
                    .set_profile(auth_uid, &UserProfile::customer(name, &avatar_url))
                    .await?;
                if let Some(tip_id) = required(&form.claim_tip_id) {
                    if !self.repos.tips.claim(tip_id, auth_uid).await? {
                        tracing::warn!("⚠️ Bravo {} não pôde ser vinculado ao novo cliente", tip_id);
                    }
                }
                UserType::Customer
            }
        };
        Ok(user_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::signup::{CREATED_FINISH_MESSAGE, PENDING_FINISH_MESSAGE},
        test_support::{memory_repositories, signup_service},
    };

    fn form() -> SignupForm {
        SignupForm::default()
    }

    #[tokio::test]
    async fn individual_flow_creates_associate_and_profile() {
        let repos = memory_repositories();
        let service = signup_service(&repos);
        let id = service.create().await.id;

        service.select_account_type(id, AccountType::Individual).await.unwrap();
        let view = service
            .next(id, SignupForm { name: Some("Ana Lima".into()), role: Some("Barista".into()), ..form() })
            .await
            .unwrap();
        assert_eq!(view.step_title, "Account");
        service
            .next(id, SignupForm { email: Some("ana@x.com".into()), password: Some("secret1".into()), ..form() })
            .await
            .unwrap();

        let err = service.next(id, form()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidSignupStep(_)));

        let outcome = service.submit(id, form()).await.unwrap();
        assert!(outcome.wizard.finished);
        assert_eq!(outcome.wizard.finish_message.as_deref(), Some(CREATED_FINISH_MESSAGE));
        let finished = service.session(id).await.unwrap();
        assert!(finished.lock().await.form.password.is_none());
        let auth = outcome.auth.unwrap();
        assert_eq!(auth.home_path, "/associate");
        assert_eq!(auth.current_user.avatar_url.as_deref(), Some("https://picsum.photos/seed/ana-lima/200"));

        let associate = repos.associates.find_by_id(&auth.current_user.id).await.unwrap().unwrap();
        assert!(!associate.is_corporate);
        assert_eq!(associate.auth_uid.as_deref(), Some(auth.current_user.auth_uid.as_str()));
    }

    #[tokio::test]
    async fn missing_account_fields_block_submission() {
        let repos = memory_repositories();
        let service = signup_service(&repos);
        let id = service.create().await.id;
        service.select_account_type(id, AccountType::Customer).await.unwrap();
        service.next(id, SignupForm { name: Some("Alex".into()), ..form() }).await.unwrap();

        let err = service.submit(id, form()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(m) if m == "Email, Password, and Name are required."));
        assert!(!service.get(id).await.unwrap().finished);
    }

    #[tokio::test]
    async fn unknown_employee_sends_a_join_request() {
        let repos = memory_repositories();
        let service = signup_service(&repos);
        let id = service.create().await.id;
        service.select_account_type(id, AccountType::Employee).await.unwrap();

        let view = service
            .verify(id, SignupForm { email: Some("new@g.com".into()), employer_id: Some("corp-1".into()), ..form() })
            .await
            .unwrap();
        assert_eq!(view.employee_status, EmployeeStatus::Request);
        assert_eq!(view.step_title, "Complete Setup");

        let outcome = service
            .submit(id, SignupForm { name: Some("Nina Reis".into()), ..form() })
            .await
            .unwrap();
        assert!(outcome.auth.is_none());
        assert_eq!(outcome.wizard.employee_status, EmployeeStatus::Pending);
        assert_eq!(outcome.wizard.finish_message.as_deref(), Some(PENDING_FINISH_MESSAGE));

        let pending = repos.join_requests.pending_for_corporation("corp-1").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].avatar_url, "https://picsum.photos/seed/nina-reis/200");
    }

    #[tokio::test]
    async fn known_employee_claims_the_existing_profile() {
        let repos = memory_repositories();
        let service = signup_service(&repos);
        let member = repos
            .associates
            .create(NewAssociate::corporate("corp-1", "ana@g.com", "Ana", "Chef", "Cooks", "face.png"))
            .await
            .unwrap();

        let id = service.create().await.id;
        service.select_account_type(id, AccountType::Employee).await.unwrap();
        let view = service
            .verify(id, SignupForm { email: Some("ana@g.com".into()), employer_id: Some("corp-1".into()), ..form() })
            .await
            .unwrap();
        assert_eq!(view.employee_status, EmployeeStatus::Claim);

        // Voltar de "Complete Setup" recomeça a verificação
        let back = service.back(id).await.unwrap();
        assert_eq!(back.employee_status, EmployeeStatus::Check);
        assert_eq!(back.step_index, 1);
        service
            .verify(id, SignupForm { email: Some("ana@g.com".into()), employer_id: Some("corp-1".into()), ..form() })
            .await
            .unwrap();

        let outcome = service
            .submit(id, SignupForm { password: Some("secret1".into()), ..form() })
            .await
            .unwrap();
        let auth = outcome.auth.unwrap();
        assert_eq!(auth.current_user.id, member.id);
        assert_eq!(auth.current_user.avatar_url.as_deref(), Some("face.png"));

        let claimed = repos.associates.find_by_id(&member.id).await.unwrap().unwrap();
        assert!(claimed.is_claimed());
        assert!(repos.join_requests.pending_for_corporation("corp-1").await.unwrap().is_empty());

        // Uma segunda tentativa encontra a conta já reivindicada
        let again = service.create().await.id;
        service.select_account_type(again, AccountType::Employee).await.unwrap();
        let view = service
            .verify(again, SignupForm { email: Some("ana@g.com".into()), employer_id: Some("corp-1".into()), ..form() })
            .await
            .unwrap();
        assert_eq!(view.employee_status, EmployeeStatus::Error);
        assert_eq!(view.notice.as_deref(), Some(ALREADY_CLAIMED_NOTICE));
        assert!(matches!(service.submit(again, form()).await, Err(AppError::InvalidSignupStep(_))));
    }

    #[tokio::test]
    async fn corporate_signup_creates_company_and_administrator() {
        let repos = memory_repositories();
        let service = signup_service(&repos);
        let id = service.create().await.id;
        service.select_account_type(id, AccountType::Corporate).await.unwrap();
        service.next(id, SignupForm { company_name: Some("Grand Hotel".into()), ..form() }).await.unwrap();
        service
            .next(
                id,
                SignupForm {
                    name: Some("Rita".into()),
                    email: Some("rita@grand.com".into()),
                    password: Some("secret1".into()),
                    ..form()
                },
            )
            .await
            .unwrap();

        let auth = service.submit(id, form()).await.unwrap().auth.unwrap();
        assert_eq!(auth.home_path, "/corporate");

        let corporation = repos.corporations.find_by_id(&auth.current_user.id).await.unwrap().unwrap();
        assert_eq!(corporation.logo_url.as_deref(), Some("https://picsum.photos/seed/grand-hotel/200"));
        let team = repos.associates.find_by_corporation(&corporation.id).await.unwrap();
        assert_eq!(team.len(), 1);
        assert_eq!(team[0].role, "Administrator");
        assert_eq!(team[0].about_me, "Administrator for Grand Hotel.");
    }

    #[tokio::test]
    async fn back_from_the_first_step_restarts_the_flow() {
        let repos = memory_repositories();
        let service = signup_service(&repos);
        let id = service.create().await.id;
        service.select_account_type(id, AccountType::Customer).await.unwrap();

        let view = service.back(id).await.unwrap();
        assert_eq!(view.id, id);
        assert_eq!(view.step_index, 0);
        assert!(view.account_type.is_none());

        assert!(matches!(service.get(Uuid::new_v4()).await, Err(AppError::SignupSessionNotFound)));
    }

    async fn verified_employee(service: &SignupService, email: &str) -> Uuid {
        let id = service.create().await.id;
        service.select_account_type(id, AccountType::Employee).await.unwrap();
        let view = service
            .verify(id, SignupForm { email: Some(email.into()), employer_id: Some("corp-1".into()), ..form() })
            .await
            .unwrap();
        assert_eq!(view.employee_status, EmployeeStatus::Claim);
        id
    }

    #[tokio::test]
    async fn losing_a_claim_race_leaves_the_email_free() {
        let repos = memory_repositories();
        let service = signup_service(&repos);
        repos
            .associates
            .create(NewAssociate::corporate("corp-1", "ana@g.com", "Ana", "Chef", "Cooks", "face.png"))
            .await
            .unwrap();

        let first = verified_employee(&service, "ana@g.com").await;
        let second = verified_employee(&service, "ana@g.com").await;

        service
            .submit(first, SignupForm { password: Some("secret1".into()), ..form() })
            .await
            .unwrap();
        let lost = service
            .submit(
                second,
                SignupForm { email: Some("second@x.com".into()), password: Some("secret1".into()), ..form() },
            )
            .await;
        assert!(matches!(lost, Err(AppError::AlreadyClaimed)));
        assert!(!service.get(second).await.unwrap().finished);

        assert!(repos.users.find_credential_by_email("second@x.com").await.unwrap().is_none());
        crate::test_support::auth_service(&repos)
            .register_user("second@x.com", "secret1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn wizard_images_go_to_the_folder_of_the_account_type() {
        let repos = memory_repositories();
        let service = signup_service(&repos);
        let id = service.create().await.id;

        let early = service.upload_avatar(id, "me.png", b"png".to_vec()).await;
        assert!(matches!(early, Err(AppError::InvalidSignupStep(_))));

        service.select_account_type(id, AccountType::Employee).await.unwrap();
        service
            .verify(id, SignupForm { email: Some("new@g.com".into()), employer_id: Some("corp-1".into()), ..form() })
            .await
            .unwrap();
        let empty = service.upload_avatar(id, "me.png", Vec::new()).await;
        assert!(matches!(empty, Err(AppError::InvalidInput(_))));
        service.upload_avatar(id, "me.png", b"png".to_vec()).await.unwrap();

        service
            .submit(id, SignupForm { name: Some("Nina Reis".into()), ..form() })
            .await
            .unwrap();
        let pending = repos.join_requests.pending_for_corporation("corp-1").await.unwrap();
        assert_eq!(pending[0].avatar_url, "https://picsum.photos/seed/me.png/200");
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_sessions_expire() {
        let repos = memory_repositories();
        let service = signup_service(&repos);
        let old = service.create().await.id;
        tokio::time::advance(Duration::from_secs(30 * 60)).await;
        let fresh = service.create().await.id;

        assert_eq!(service.sweep_expired().await, 0);
        tokio::time::advance(Duration::from_secs(31 * 60)).await;
        assert_eq!(service.sweep_expired().await, 1);

        assert!(matches!(service.get(old).await, Err(AppError::SignupSessionNotFound)));
        assert_eq!(service.get(fresh).await.unwrap().id, fresh);
    }

    #[tokio::test(start_paused = true)]
    async fn the_background_sweep_runs_on_its_interval() {
        let repos = memory_repositories();
        let service = signup_service(&repos);
        let id = service.create().await.id;
        let sweeper = service.spawn_expiry_sweep();

        tokio::time::sleep(SESSION_TTL + SWEEP_INTERVAL).await;
        assert!(matches!(service.get(id).await, Err(AppError::SignupSessionNotFound)));
        sweeper.abort();
    }
}
