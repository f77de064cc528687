// src/services/message_service.rs

use chrono::Utc;

use crate::{
    common::error::AppError,
    db::{AssociateRepository, MessageRepository, TipRepository},
    models::{
        message::{Message, NewMessage},
        tip::Tip,
        user::{CurrentUser, UserType},
    },
};

/// Conversa sobre um Bravo, entre o associado e o cliente que o enviou.
#[derive(Clone)]
pub struct MessageService {
    messages: MessageRepository,
    tips: TipRepository,
    associates: AssociateRepository,
}

impl MessageService {
    pub fn new(messages: MessageRepository, tips: TipRepository, associates: AssociateRepository) -> Self {
        Self { messages, tips, associates }
    }

    async fn tip_for(&self, tip_id: &str, user: &CurrentUser) -> Result<Tip, AppError> {
        let tip = self
            .tips
            .find_by_id(tip_id)
            .await?
            .ok_or_else(|| AppError::TipNotFound(tip_id.to_string()))?;

        let involved = match user.user_type {
            UserType::Associate => tip.associate_id == user.id,
            UserType::Customer => tip.customer_auth_uid.as_deref() == Some(user.auth_uid.as_str()),
            UserType::Corporate => false,
        };
        if !involved {
            return Err(AppError::Forbidden);
        }
        Ok(tip)
    }

    // O associado fala com o cliente do Bravo; o cliente, com o associado
    async fn recipient(&self, tip: &Tip, sender: &CurrentUser) -> Result<String, AppError> {
        let recipient = if sender.is(UserType::Associate) {
            tip.customer_auth_uid.clone()
        } else {
            self.associates
                .find_by_id(&tip.associate_id)
                .await?
                .and_then(|associate| associate.auth_uid)
        };
        recipient.ok_or(AppError::RecipientUnavailable)
    }

    pub async fn send(&self, tip_id: &str, sender: &CurrentUser, text: &str) -> Result<Message, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::InvalidInput("Message cannot be empty.".into()));
        }
        let tip = self.tip_for(tip_id, sender).await?;
        let to_id = self.recipient(&tip, sender).await?;

        self.messages
            .create(NewMessage::between(&tip.id, &sender.auth_uid, &to_id, text, Utc::now()))
            .await
    }

    pub async fn conversation(&self, tip_id: &str, user: &CurrentUser) -> Result<Vec<Message>, AppError> {
        self.tip_for(tip_id, user).await?;
        self.messages.find_by_tip(tip_id, &user.auth_uid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::Repositories,
        models::{associate::NewAssociate, tip::NewTip},
        test_support::memory_repositories,
    };
    use rust_decimal::Decimal;

    fn user(auth_uid: &str, id: &str, user_type: UserType) -> CurrentUser {
        CurrentUser { auth_uid: auth_uid.into(), id: id.into(), user_type, avatar_url: None }
    }

    async fn tip(repos: &Repositories, associate_uid: Option<&str>, customer: Option<&str>) -> (String, Tip) {
        let mut new = NewAssociate::independent("a@b.com", "Ana", "Barista", "", "u");
        if let Some(uid) = associate_uid {
            new = new.with_auth_uid(uid);
        }
        let associate = repos.associates.create(new).await.unwrap();
        let tip = repos
            .tips
            .create(NewTip {
                associate_id: associate.id.clone(),
                corporate_id: None,
                amount: Decimal::ZERO,
                message: "Thanks".into(),
                customer_name: "Alex".into(),
                timestamp: Utc::now(),
                customer_auth_uid: customer.map(str::to_string),
            })
            .await
            .unwrap();
        (associate.id, tip)
    }

    #[tokio::test]
    async fn messages_go_between_associate_and_customer() {
        let repos = memory_repositories();
        let service = MessageService::new(repos.messages.clone(), repos.tips.clone(), repos.associates.clone());
        let (associate_id, tip) = tip(&repos, Some("assoc-uid"), Some("cust-uid")).await;

        let customer = user("cust-uid", "cust-uid", UserType::Customer);
        let sent = service.send(&tip.id, &customer, " Hello! ").await.unwrap();
        assert_eq!(sent.to_id, "assoc-uid");
        assert_eq!(sent.participant_ids, vec!["cust-uid".to_string(), "assoc-uid".to_string()]);
        assert_eq!(sent.text, "Hello!");

        let associate = user("assoc-uid", &associate_id, UserType::Associate);
        let reply = service.send(&tip.id, &associate, "Thanks!").await.unwrap();
        assert_eq!(reply.to_id, "cust-uid");

        let thread = service.conversation(&tip.id, &associate).await.unwrap();
        assert_eq!(thread.len(), 2);
    }

    #[tokio::test]
    async fn missing_recipient_account_is_reported() {
        let repos = memory_repositories();
        let service = MessageService::new(repos.messages.clone(), repos.tips.clone(), repos.associates.clone());
        let (associate_id, tip) = tip(&repos, None, Some("cust-uid")).await;

        let customer = user("cust-uid", "cust-uid", UserType::Customer);
        let err = service.send(&tip.id, &customer, "Hi").await.unwrap_err();
        assert!(matches!(err, AppError::RecipientUnavailable));

        let stranger = user("x", "other", UserType::Associate);
        let err = service.send(&tip.id, &stranger, "Hi").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let associate = user("assoc-uid", &associate_id, UserType::Associate);
        let err = service.send(&tip.id, &associate, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
