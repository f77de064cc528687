// src/services/sync.rs

use std::{future::Future, sync::Arc};

use tokio::{
    sync::{broadcast::error::RecvError, watch, Mutex},
    task::JoinHandle,
};

use crate::{
    common::error::AppError,
    db::{Collection, Repositories},
    models::{
        session::{ClientState, Toast},
        user::{CurrentUser, UserType},
    },
    services::{
        profile_service::ProfileService,
        store::{Action, ClientStore},
    },
};

// ---
// SyncSession: assinaturas em tempo real de um cliente conectado
// ---
// Coleções públicas (associates, corporations, tips) ficam ativas a sessão inteira.
// Mensagens e pedidos de entrada dependem do usuário e são refeitos a cada
// mudança de autenticação.
pub struct SyncSession {
    store: ClientStore,
    repos: Repositories,
    profiles: ProfileService,
    public_tasks: Vec<JoinHandle<()>>,
    session_tasks: Mutex<Vec<JoinHandle<()>>>,
}

// Quem aplica o resultado de uma consulta no store
#[derive(Clone, Copy)]
enum Gate {
    Always,
    Epoch(u64),
}

impl SyncSession {
    /// Liga os listeners públicos e resolve a identidade inicial.
    pub async fn start(
        repos: Repositories,
        profiles: ProfileService,
        identity: Option<String>,
    ) -> Arc<Self> {
        let store = ClientStore::new();

        let associates = repos.associates.clone();
        let corporations = repos.corporations.clone();
        let tips = repos.tips.clone();
        let public_tasks = vec![
            spawn_listener(&store, &repos, Collection::Associates, Gate::Always, move || {
                let repo = associates.clone();
                async move { Ok(Action::SetAssociates(repo.list_all().await?)) }
            }),
            spawn_listener(&store, &repos, Collection::Corporations, Gate::Always, move || {
                let repo = corporations.clone();
                async move { Ok(Action::SetCorporations(repo.list_all().await?)) }
            }),
            spawn_listener(&store, &repos, Collection::Tips, Gate::Always, move || {
                let repo = tips.clone();
                async move { Ok(Action::SetTips(repo.list_all().await?)) }
            }),
        ];

        let session = Arc::new(Self {
            store,
            repos,
            profiles,
            public_tasks,
            session_tasks: Mutex::new(Vec::new()),
        });
        session.on_auth_state_changed(identity).await;
        session
    }

    /// Reage a login/logout/troca de conta.
    pub async fn on_auth_state_changed(&self, identity: Option<String>) {
        // O lock serializa transições concorrentes
        let mut session_tasks = self.session_tasks.lock().await;
        for task in session_tasks.drain(..) {
            task.abort();
        }

        let epoch = self.store.begin_epoch();

        let Some(auth_uid) = identity else {
            self.store.dispatch_for_epoch(epoch, Action::SetCurrentUser(None));
            return;
        };

        match self.profiles.resolve_current_user(&auth_uid).await {
            Ok(Some(user)) => {
                if !self
                    .store
                    .dispatch_for_epoch(epoch, Action::SetCurrentUser(Some(user.clone())))
                {
                    return;
                }
                session_tasks.extend(self.spawn_session_listeners(&user, epoch));
            }
            // Cadastro incompleto: sem usuário, mas não é erro
            Ok(None) => {
                tracing::info!("👤 Perfil ausente para {}, aguardando cadastro", auth_uid);
                self.store.dispatch_for_epoch(epoch, Action::SetLoading(false));
            }
            Err(e) => {
                tracing::error!("🔥 Falha ao resolver o perfil de {}: {:?}", auth_uid, e);
                self.store.dispatch(Action::ShowToast(Toast::error("Could not load your profile.")));
                self.store.dispatch_for_epoch(epoch, Action::SetLoading(false));
            }
        }
    }

    fn spawn_session_listeners(&self, user: &CurrentUser, epoch: u64) -> Vec<JoinHandle<()>> {
        let gate = Gate::Epoch(epoch);

        let messages = self.repos.messages.clone();
        let auth_uid = user.auth_uid.clone();
        let mut tasks = vec![spawn_listener(&self.store, &self.repos, Collection::Messages, gate, move || {
            let repo = messages.clone();
            let auth_uid = auth_uid.clone();
            async move { Ok(Action::SetMessages(repo.find_for_participant(&auth_uid).await?)) }
        })];

        if user.is(UserType::Corporate) {
            let join_requests = self.repos.join_requests.clone();
            let corporate_id = user.id.clone();
            tasks.push(spawn_listener(&self.store, &self.repos, Collection::JoinRequests, gate, move || {
                let repo = join_requests.clone();
                let corporate_id = corporate_id.clone();
                async move {
                    Ok(Action::SetJoinRequests(repo.pending_for_corporation(&corporate_id).await?))
                }
            }));
        }

        tasks
    }

    pub fn subscribe(&self) -> watch::Receiver<ClientState> {
        self.store.subscribe()
    }

    pub fn snapshot(&self) -> ClientState {
        self.store.snapshot()
    }

    pub fn store(&self) -> &ClientStore {
        &self.store
    }
}

impl Drop for SyncSession {
    fn drop(&mut self) {
        for task in self.public_tasks.drain(..) {
            task.abort();
        }
        for task in self.session_tasks.get_mut().drain(..) {
            task.abort();
        }
    }
}

/// Listener de uma coleção: consulta agora e de novo a cada mudança dela.
fn spawn_listener<F, Fut>(
    store: &ClientStore,
    repos: &Repositories,
    collection: Collection,
    gate: Gate,
    fetch: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Action, AppError>> + Send,
{
    let store = store.clone();
    // Assina antes da primeira consulta para não perder escritas no meio
    let mut changes = repos.store.changes();

    tokio::spawn(async move {
        loop {
            match fetch().await {
                Ok(action) => {
                    let applied = match gate {
                        Gate::Always => {
                            store.dispatch(action);
                            true
                        }
                        Gate::Epoch(epoch) => store.dispatch_for_epoch(epoch, action),
                    };
                    if !applied {
                        // Sessão anterior: este listener não tem mais dono
                        return;
                    }
                }
                Err(e) => {
                    tracing::error!("🔥 Falha no listener de '{}': {:?}", collection.name(), e);
                    store.dispatch(Action::ShowToast(Toast::error(format!(
                        "Could not sync {}.",
                        collection.name()
                    ))));
                }
            }

            // Espera a próxima mudança relevante
            loop {
                match changes.recv().await {
                    Ok(changed) if changed == collection => break,
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("⚠️ Listener de '{}' atrasou {} eventos", collection.name(), skipped);
                        break;
                    }
                    Err(RecvError::Closed) => return,
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::{
        models::{
            associate::NewAssociate,
            join_request::NewJoinRequest,
            message::NewMessage,
            tip::NewTip,
            user::UserProfile,
        },
        test_support::{memory_repositories, profile_service, wait_for},
    };

    async fn corporate_admin(repos: &Repositories) -> (String, String) {
        let corp = repos
            .corporations
            .create(crate::models::corporation::NewCorporation {
                name: "Grand Hotel".into(),
                allow_tips: true,
                logo_url: None,
            })
            .await
            .unwrap();
        repos
            .users
            .set_profile("admin-uid", &UserProfile::corporate(&corp.id, "logo"))
            .await
            .unwrap();
        ("admin-uid".into(), corp.id)
    }

    #[tokio::test]
    async fn without_identity_settles_to_no_user_and_not_loading() {
        let repos = memory_repositories();
        let session = SyncSession::start(repos.clone(), profile_service(&repos), None).await;
        let state = session.snapshot();
        assert!(state.current_user.is_none());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn missing_profile_leaves_no_user_and_stops_loading() {
        let repos = memory_repositories();
        let session =
            SyncSession::start(repos.clone(), profile_service(&repos), Some("ghost".into())).await;
        let state = session.snapshot();
        assert!(state.current_user.is_none());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn public_collections_follow_the_change_feed() {
        let repos = memory_repositories();
        let session = SyncSession::start(repos.clone(), profile_service(&repos), None).await;
        let mut rx = session.subscribe();

        let associate = repos
            .associates
            .create(NewAssociate::independent("a@b.com", "Ana", "Barista", "", "url"))
            .await
            .unwrap();
        repos
            .tips
            .create(NewTip {
                associate_id: associate.id.clone(),
                corporate_id: None,
                amount: Decimal::new(500, 2),
                message: "Great job!".into(),
                customer_name: "Alex".into(),
                timestamp: Utc::now(),
                customer_auth_uid: None,
            })
            .await
            .unwrap();

        let state = wait_for(&mut rx, |s| s.associates.len() == 1 && s.tips.len() == 1).await;
        assert_eq!(state.tips[0].associate_id, associate.id);
    }

    #[tokio::test]
    async fn corporate_user_gets_pending_join_requests_sorted_by_time() {
        let repos = memory_repositories();
        let (uid, corp_id) = corporate_admin(&repos).await;

        let later = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        repos.join_requests.create(NewJoinRequest::pending(&corp_id, "b@x.com", "Bea", "u", later)).await.unwrap();
        repos.join_requests.create(NewJoinRequest::pending(&corp_id, "a@x.com", "Ana", "u", earlier)).await.unwrap();
        repos.join_requests.create(NewJoinRequest::pending("other", "c@x.com", "Caio", "u", earlier)).await.unwrap();

        let session = SyncSession::start(repos.clone(), profile_service(&repos), Some(uid)).await;
        let mut rx = session.subscribe();

        let state = wait_for(&mut rx, |s| s.join_requests.len() == 2).await;
        let user = state.current_user.unwrap();
        assert_eq!(user.user_type, UserType::Corporate);
        assert_eq!(user.id, corp_id);
        assert_eq!(state.join_requests[0].name, "Ana");
        assert_eq!(state.join_requests[1].name, "Bea");
    }

    #[tokio::test]
    async fn sign_out_clears_session_data_and_stops_role_listeners() {
        let repos = memory_repositories();
        let (uid, corp_id) = corporate_admin(&repos).await;
        repos.join_requests.create(NewJoinRequest::pending(&corp_id, "a@x.com", "Ana", "u", Utc::now())).await.unwrap();
        repos.messages.create(NewMessage::between("t1", "cust", &uid, "hello", Utc::now())).await.unwrap();

        let session = SyncSession::start(repos.clone(), profile_service(&repos), Some(uid)).await;
        let mut rx = session.subscribe();
        wait_for(&mut rx, |s| s.join_requests.len() == 1 && s.messages.len() == 1).await;

        session.on_auth_state_changed(None).await;
        let state = session.snapshot();
        assert!(state.current_user.is_none());
        assert!(state.messages.is_empty());
        assert!(state.join_requests.is_empty());

        // Escritas depois do logout não chegam mais ao store
        repos.join_requests.create(NewJoinRequest::pending(&corp_id, "b@x.com", "Bea", "u", Utc::now())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(session.snapshot().join_requests.is_empty());
    }

    #[tokio::test]
    async fn messages_are_filtered_by_participant() {
        let repos = memory_repositories();
        repos.users.set_profile("cust", &UserProfile::customer("Alex", "url")).await.unwrap();
        repos.messages.create(NewMessage::between("t1", "assoc", "cust", "thanks!", Utc::now())).await.unwrap();
        repos.messages.create(NewMessage::between("t2", "assoc", "someone", "hi", Utc::now())).await.unwrap();

        let session = SyncSession::start(repos.clone(), profile_service(&repos), Some("cust".into())).await;
        let mut rx = session.subscribe();
        let state = wait_for(&mut rx, |s| !s.messages.is_empty()).await;
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].tip_id, "t1");
        assert!(state.join_requests.is_empty());
    }
}
