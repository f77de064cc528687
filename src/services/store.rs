// src/services/store.rs

use std::time::Duration;

use tokio::sync::watch;

use crate::models::{
    associate::Associate,
    corporation::CorporateEntity,
    join_request::JoinRequest,
    message::Message,
    session::{ClientState, Toast},
    tip::Tip,
    user::CurrentUser,
};

pub const TOAST_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub enum Action {
    SetLoading(bool),
    SetAssociates(Vec<Associate>),
    SetCorporations(Vec<CorporateEntity>),
    SetTips(Vec<Tip>),
    SetMessages(Vec<Message>),
    SetJoinRequests(Vec<JoinRequest>),
    // Também encerra o "loading"
    SetCurrentUser(Option<CurrentUser>),
    Logout,
    ShowToast(Toast),
    HideToast,
}

/// O reducer: função pura de (estado, ação) para o próximo estado.
pub fn reduce(state: &mut ClientState, action: Action) {
    match action {
        Action::SetLoading(loading) => state.loading = loading,
        Action::SetAssociates(associates) => state.associates = associates,
        Action::SetCorporations(corporations) => state.corporations = corporations,
        Action::SetTips(tips) => state.tips = tips,
        Action::SetMessages(messages) => state.messages = messages,
        Action::SetJoinRequests(requests) => state.join_requests = requests,
        Action::SetCurrentUser(user) => {
            state.current_user = user;
            state.loading = false;
        }
        Action::Logout => {
            state.current_user = None;
            state.messages.clear();
            state.join_requests.clear();
        }
        Action::ShowToast(toast) => {
            state.toast = Some(toast);
            state.toast_seq += 1;
        }
        Action::HideToast => state.toast = None,
    }
}

// ---
// ClientStore: o estado de uma sessão, observável via `watch`
// ---
#[derive(Clone)]
pub struct ClientStore {
    tx: watch::Sender<ClientState>,
}

impl ClientStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ClientState::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<ClientState> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ClientState {
        self.tx.borrow().clone()
    }

    pub fn epoch(&self) -> u64 {
        self.tx.borrow().epoch
    }

    pub fn dispatch(&self, action: Action) {
        let is_toast = matches!(action, Action::ShowToast(_));
        self.tx.send_modify(|state| reduce(state, action));
        if is_toast {
            self.schedule_toast_hide();
        }
    }

    /// Só aplica a ação se a sessão ainda estiver na mesma época de autenticação.
    /// Retorna false quando a atualização era de uma sessão anterior.
    pub fn dispatch_for_epoch(&self, epoch: u64, action: Action) -> bool {
        let mut applied = false;
        self.tx.send_if_modified(|state| {
            if state.epoch != epoch {
                return false;
            }
            reduce(state, action);
            applied = true;
            true
        });
        applied
    }

    /// Nova época: invalida tudo que estava em voo da sessão anterior.
    pub fn begin_epoch(&self) -> u64 {
        let mut epoch = 0;
        self.tx.send_modify(|state| {
            state.epoch += 1;
            reduce(state, Action::Logout);
            epoch = state.epoch;
        });
        epoch
    }

    fn schedule_toast_hide(&self) {
        let seq = self.tx.borrow().toast_seq;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(TOAST_DURATION).await;
            // Um toast mais novo reinicia o próprio timer
            tx.send_if_modified(|state| {
                if state.toast_seq == seq && state.toast.is_some() {
                    state.toast = None;
                    true
                } else {
                    false
                }
            });
        });
    }
}

impl Default for ClientStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserType;

    fn user() -> CurrentUser {
        CurrentUser {
            auth_uid: "u1".into(),
            id: "a1".into(),
            user_type: UserType::Associate,
            avatar_url: None,
        }
    }

    #[test]
    fn set_current_user_ends_loading() {
        let mut state = ClientState::default();
        assert!(state.loading);
        reduce(&mut state, Action::SetCurrentUser(Some(user())));
        assert!(!state.loading);
        assert_eq!(state.current_user, Some(user()));
    }

    #[test]
    fn logout_clears_session_data() {
        let mut state = ClientState::default();
        reduce(&mut state, Action::SetCurrentUser(Some(user())));
        state.messages = vec![Message {
            id: "m".into(),
            tip_id: "t".into(),
            participant_ids: vec!["u1".into(), "u2".into()],
            from_id: "u1".into(),
            to_id: "u2".into(),
            text: "hi".into(),
            timestamp: chrono::Utc::now(),
        }];
        reduce(&mut state, Action::Logout);
        assert!(state.current_user.is_none());
        assert!(state.messages.is_empty());
        assert!(state.join_requests.is_empty());
    }

    #[tokio::test]
    async fn stale_epoch_updates_are_dropped() {
        let store = ClientStore::new();
        let old = store.epoch();
        let new = store.begin_epoch();
        assert_ne!(old, new);

        assert!(!store.dispatch_for_epoch(old, Action::SetCurrentUser(Some(user()))));
        assert!(store.snapshot().current_user.is_none());

        assert!(store.dispatch_for_epoch(new, Action::SetCurrentUser(Some(user()))));
        assert_eq!(store.snapshot().current_user, Some(user()));
    }

    #[tokio::test(start_paused = true)]
    async fn toast_hides_itself_after_five_seconds() {
        let store = ClientStore::new();
        store.dispatch(Action::ShowToast(Toast::success("Associate removed.")));
        assert!(store.snapshot().toast.is_some());

        tokio::time::sleep(TOAST_DURATION + Duration::from_millis(10)).await;
        assert!(store.snapshot().toast.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_toast_is_not_hidden_by_older_timer() {
        let store = ClientStore::new();
        store.dispatch(Action::ShowToast(Toast::success("first")));
        tokio::time::sleep(Duration::from_secs(3)).await;
        store.dispatch(Action::ShowToast(Toast::error("second")));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(store.snapshot().toast, Some(Toast::error("second")));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(store.snapshot().toast.is_none());
    }
}
