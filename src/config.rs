// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use sqlx::postgres::PgPoolOptions;

use crate::{
    common::i18n::I18nStore,
    db::{MemoryDocumentStore, PgDocumentStore, Repositories, SharedDocumentStore},
    services::{
        associate_service::AssociateService,
        auth::AuthService,
        corporate_service::CorporateService,
        document_service::DocumentService,
        message_service::MessageService,
        note_service::{NoteService, DEFAULT_GEMINI_MODEL},
        payment::DemoPaymentProvider,
        profile_service::ProfileService,
        report_service::ReportService,
        scan_service::ScanService,
        signup_service::SignupService,
        storage::{BlobStorage, LocalBlobStorage, PlaceholderBlobStorage},
        tip_service::TipService,
    },
};

pub const UPLOADS_ROUTE: &str = "/uploads";

// Configuração lida do ambiente (.env)
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    // Ausente = modo offline (document store em memória)
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub bcrypt_cost: u32,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub static_dir: PathBuf,
    pub uploads_dir: Option<PathBuf>,
    pub public_base_url: String,
    pub fonts_dir: PathBuf,
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let port = non_empty("PORT").and_then(|p| p.parse().ok()).unwrap_or(8080);

        let database_url = non_empty("DATABASE_URL");
        if database_url.is_none() {
            tracing::warn!("⚠️ DATABASE_URL não definida. Rodando em modo offline (dados em memória).");
        }

        let jwt_secret = non_empty("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("⚠️ JWT_SECRET não definido. Usando um segredo aleatório: tokens não sobrevivem a um restart.");
            format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
        });

        let bcrypt_cost = non_empty("BCRYPT_COST")
            .and_then(|c| c.parse().ok())
            .unwrap_or(bcrypt::DEFAULT_COST);

        let gemini_api_key = non_empty("GEMINI_API_KEY");
        let gemini_model = non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        let public_base_url = non_empty("PUBLIC_BASE_URL").unwrap_or_else(|| format!("http://localhost:{port}"));

        Self {
            port,
            database_url,
            jwt_secret,
            bcrypt_cost,
            gemini_api_key,
            gemini_model,
            static_dir: non_empty("STATIC_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("./dist")),
            uploads_dir: non_empty("UPLOADS_DIR").map(PathBuf::from),
            public_base_url,
            fonts_dir: non_empty("FONTS_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("./fonts")),
        }
    }
}

/// Conecta ao Postgres (rodando as migrações) ou cai no store em memória.
pub async fn connect_store(config: &Config) -> anyhow::Result<SharedDocumentStore> {
    let Some(database_url) = &config.database_url else {
        return Ok(Arc::new(MemoryDocumentStore::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;
    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

    sqlx::migrate!().run(&pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    Ok(Arc::new(PgDocumentStore::connect(pool).await?))
}

// O estado compartilhado, acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub repos: Repositories,
    pub i18n_store: Arc<I18nStore>,
    pub storage: Arc<dyn BlobStorage>,

    pub auth_service: AuthService,
    pub profile_service: ProfileService,
    pub associate_service: AssociateService,
    pub corporate_service: CorporateService,
    pub tip_service: TipService,
    pub message_service: MessageService,
    pub report_service: ReportService,
    pub signup_service: SignupService,
    pub scan_service: ScanService,
    pub document_service: DocumentService,
}

impl AppState {
    /// Monta o grafo de dependências: repositórios -> serviços.
    pub fn new(config: Config, store: SharedDocumentStore) -> Self {
        let repos = Repositories::new(store);

        let storage: Arc<dyn BlobStorage> = match &config.uploads_dir {
            Some(dir) => Arc::new(LocalBlobStorage::new(dir, UPLOADS_ROUTE)),
            None => {
                tracing::warn!("⚠️ UPLOADS_DIR não definido. Uploads devolvem imagens de exemplo.");
                Arc::new(PlaceholderBlobStorage)
            }
        };

        let auth_service = AuthService::new(repos.users.clone(), config.jwt_secret.clone(), config.bcrypt_cost);
        let profile_service = ProfileService::new(
            repos.users.clone(),
            repos.associates.clone(),
            repos.corporations.clone(),
        );
        let notes = NoteService::new(config.gemini_api_key.clone(), config.gemini_model.clone());
        let tip_service = TipService::new(
            repos.tips.clone(),
            repos.associates.clone(),
            repos.corporations.clone(),
            Arc::new(DemoPaymentProvider),
            notes,
        );

        Self {
            associate_service: AssociateService::new(repos.associates.clone(), repos.users.clone()),
            corporate_service: CorporateService::new(
                repos.associates.clone(),
                repos.corporations.clone(),
                repos.join_requests.clone(),
            ),
            message_service: MessageService::new(
                repos.messages.clone(),
                repos.tips.clone(),
                repos.associates.clone(),
            ),
            report_service: ReportService::new(repos.associates.clone(), repos.tips.clone()),
            signup_service: SignupService::new(
                repos.clone(),
                auth_service.clone(),
                profile_service.clone(),
                storage.clone(),
            ),
            scan_service: ScanService::new(repos.associates.clone(), repos.corporations.clone()),
            document_service: DocumentService::new(
                repos.associates.clone(),
                repos.corporations.clone(),
                config.public_base_url.clone(),
                config.fonts_dir.clone(),
            ),
            auth_service,
            profile_service,
            tip_service,
            storage,
            i18n_store: Arc::new(I18nStore::new()),
            repos,
            config: Arc::new(config),
        }
    }
}
