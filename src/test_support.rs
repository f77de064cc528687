// src/test_support.rs

use std::{path::PathBuf, sync::Arc, time::Duration};

use tokio::sync::watch;

use crate::{
    config::{AppState, Config},
    db::{MemoryDocumentStore, Repositories},
    models::{payment::PaymentDetails, session::ClientState},
    services::{
        auth::AuthService,
        note_service::{NoteService, DEFAULT_GEMINI_MODEL},
        payment::DemoPaymentProvider,
        profile_service::ProfileService,
        signup_service::SignupService,
        storage::PlaceholderBlobStorage,
        tip_service::TipService,
    },
};

pub const TEST_JWT_SECRET: &str = "test-secret";
const TEST_BCRYPT_COST: u32 = 4;

pub fn memory_repositories() -> Repositories {
    Repositories::new(Arc::new(MemoryDocumentStore::new()))
}

pub fn profile_service(repos: &Repositories) -> ProfileService {
    ProfileService::new(repos.users.clone(), repos.associates.clone(), repos.corporations.clone())
}

pub fn auth_service(repos: &Repositories) -> AuthService {
    AuthService::new(repos.users.clone(), TEST_JWT_SECRET.into(), TEST_BCRYPT_COST)
}

pub fn tip_service(repos: &Repositories) -> TipService {
    TipService::new(
        repos.tips.clone(),
        repos.associates.clone(),
        repos.corporations.clone(),
        Arc::new(DemoPaymentProvider),
        NoteService::new(None, DEFAULT_GEMINI_MODEL.into()),
    )
}

pub fn signup_service(repos: &Repositories) -> SignupService {
    SignupService::new(
        repos.clone(),
        auth_service(repos),
        profile_service(repos),
        Arc::new(PlaceholderBlobStorage),
    )
}

pub fn card() -> PaymentDetails {
    PaymentDetails {
        card_holder_name: "Alex Doe".into(),
        card_number: "4242 4242 4242 4242".into(),
        expiry: "12/30".into(),
        cvc: "123".into(),
        zip: "12345".into(),
    }
}

/// Espera (até 5s) o feed levar o estado até `done`.
pub async fn wait_for(
    rx: &mut watch::Receiver<ClientState>,
    done: impl FnMut(&ClientState) -> bool,
) -> ClientState {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(done))
        .await
        .expect("o estado não convergiu a tempo")
        .expect("o store foi encerrado")
        .clone()
}

pub fn test_config() -> Config {
    Config {
        port: 0,
        database_url: None,
        jwt_secret: TEST_JWT_SECRET.into(),
        bcrypt_cost: TEST_BCRYPT_COST,
        gemini_api_key: None,
        gemini_model: DEFAULT_GEMINI_MODEL.into(),
        static_dir: PathBuf::from("./no-such-static-dir"),
        uploads_dir: None,
        public_base_url: "https://bravos.test".into(),
        fonts_dir: PathBuf::from("./no-such-fonts-dir"),
    }
}

/// AppState completo sobre o store em memória.
pub fn test_state() -> AppState {
    AppState::new(test_config(), Arc::new(MemoryDocumentStore::new()))
}
