// src/services/tip_service.rs

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::{AssociateRepository, CorporationRepository, TipRepository},
    models::{
        associate::{Associate, TippingProfile},
        tip::{DistributionSummary, NewTip, SendTipPayload, SentTip, Tip},
        user::{CurrentUser, UserType},
    },
    services::{note_service::NoteService, payment::PaymentProvider},
};

pub const DEFAULT_MESSAGE_WITH_TIPS: &str = "Great job!";
pub const DEFAULT_MESSAGE_WITHOUT_TIPS: &str = "Thank you!";

/// Alíquota retida na distribuição (22%).
pub fn withholding_rate() -> Decimal {
    Decimal::new(22, 2)
}

/// Resumo de exibição: bruto, retido (22%) e líquido (bruto × 0,78).
pub fn distribution_summary(tips: &[Tip], tips_cleared: u64) -> DistributionSummary {
    let gross: Decimal = tips.iter().map(|t| t.amount).sum();
    let withheld = gross * withholding_rate();
    DistributionSummary {
        gross,
        withheld,
        net: gross * (Decimal::ONE - withholding_rate()),
        tips_cleared,
    }
}

#[derive(Clone)]
pub struct TipService {
    tips: TipRepository,
    associates: AssociateRepository,
    corporations: CorporationRepository,
    payments: Arc<dyn PaymentProvider>,
    notes: NoteService,
}

impl TipService {
    pub fn new(
        tips: TipRepository,
        associates: AssociateRepository,
        corporations: CorporationRepository,
        payments: Arc<dyn PaymentProvider>,
        notes: NoteService,
    ) -> Self {
        Self { tips, associates, corporations, payments, notes }
    }

    /// Permissão efetiva: associado.allowTips E corporação.allowTips (independentes sempre).
    pub async fn tipping_profile(&self, associate_id: &str) -> Result<TippingProfile, AppError> {
        let associate = self
            .associates
            .find_by_id(associate_id)
            .await?
            .ok_or_else(|| AppError::AssociateNotFound(associate_id.to_string()))?;
        self.profile_for(associate).await
    }

    async fn profile_for(&self, associate: Associate) -> Result<TippingProfile, AppError> {
        let corporation = match associate.corporate_id.as_deref().filter(|_| associate.is_corporate) {
            Some(corporate_id) => self.corporations.find_by_id(corporate_id).await?,
            None => None,
        };
        let corporation_allows = corporation.as_ref().is_none_or(|c| c.allow_tips);
        Ok(TippingProfile {
            allow_tips: associate.allow_tips && corporation_allows,
            corporation_name: corporation.map(|c| c.name),
            associate,
        })
    }

    pub async fn send_tip(
        &self,
        payload: SendTipPayload,
        sender: Option<&CurrentUser>,
    ) -> Result<SentTip, AppError> {
        let profile = self.tipping_profile(&payload.associate_id).await?;
        let allow_tips = profile.allow_tips;

        let customer_name = payload.customer_name.trim();
        let message = payload.message.trim();
        let amount = payload.amount.unwrap_or(Decimal::ZERO);

        if customer_name.is_empty() {
            return Err(AppError::InvalidInput("Please enter your name.".into()));
        }
        if amount < Decimal::ZERO {
            return Err(AppError::InvalidInput("Tip amount cannot be negative.".into()));
        }
        if allow_tips {
            if amount.is_zero() && message.is_empty() {
                return Err(AppError::InvalidInput("Please enter a tip amount or a message.".into()));
            }
        } else {
            if !amount.is_zero() {
                return Err(AppError::InvalidInput("Tips are not enabled for this associate.".into()));
            }
            if message.is_empty() {
                return Err(AppError::InvalidInput("Please enter a message for your Bravo.".into()));
            }
        }

        // Cobra antes de gravar: sem cobrança aprovada, sem Bravo
        let payment_reference = if amount > Decimal::ZERO {
            let details = payload
                .payment
                .as_ref()
                .ok_or_else(|| AppError::InvalidInput("Please complete the payment information.".into()))?;
            Some(self.payments.charge(amount, details).await?.reference)
        } else {
            None
        };

        let message = if message.is_empty() {
            if allow_tips { DEFAULT_MESSAGE_WITH_TIPS } else { DEFAULT_MESSAGE_WITHOUT_TIPS }
        } else {
            message
        };

        let associate = profile.associate;
        let tip = self
            .tips
            .create(NewTip {
                corporate_id: associate.corporate_id.clone().filter(|_| associate.is_corporate),
                associate_id: associate.id,
                amount,
                message: message.to_string(),
                customer_name: customer_name.to_string(),
                timestamp: Utc::now(),
                customer_auth_uid: sender
                    .filter(|user| user.is(UserType::Customer))
                    .map(|user| user.auth_uid.clone()),
            })
            .await?;

        tracing::info!("🎉 Bravo {} enviado para {} (${:.2})", tip.id, tip.associate_id, tip.amount);
        Ok(SentTip { tip, payment_reference })
    }

    /// Vincula um Bravo enviado como convidado ao cliente que acabou de entrar.
    pub async fn claim_tip(&self, tip_id: &str, customer: &CurrentUser) -> Result<Tip, AppError> {
        if !customer.is(UserType::Customer) {
            return Err(AppError::Forbidden);
        }
        let tip = self
            .tips
            .find_by_id(tip_id)
            .await?
            .ok_or_else(|| AppError::TipNotFound(tip_id.to_string()))?;

        if !self.tips.claim(tip_id, &customer.auth_uid).await? {
            // Já vinculado: só é ok se for ao mesmo cliente
            if tip.customer_auth_uid.as_deref() != Some(customer.auth_uid.as_str()) {
                return Err(AppError::TipAlreadyClaimed);
            }
        }

        Ok(Tip { customer_auth_uid: Some(customer.auth_uid.clone()), ..tip })
    }

    /// Histórico do cliente, do mais recente para o mais antigo.
    pub async fn customer_history(&self, customer: &CurrentUser) -> Result<Vec<Tip>, AppError> {
        let mut tips = self.tips.find_by_customer(&customer.auth_uid).await?;
        tips.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(tips)
    }

    pub async fn tips_for_associate(&self, associate_id: &str) -> Result<Vec<Tip>, AppError> {
        let mut tips = self.tips.find_by_associate(associate_id).await?;
        tips.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(tips)
    }

    /// Zera o pool: de um associado da corporação ou da corporação inteira.
    pub async fn distribute(
        &self,
        corporate_id: &str,
        associate_id: Option<&str>,
    ) -> Result<DistributionSummary, AppError> {
        let summary = match associate_id {
            Some(associate_id) => {
                let associate = self
                    .associates
                    .find_by_id(associate_id)
                    .await?
                    .ok_or_else(|| AppError::AssociateNotFound(associate_id.to_string()))?;
                if !associate.belongs_to(corporate_id) {
                    return Err(AppError::Forbidden);
                }
                // O resumo vem do que foi removido, não de uma leitura anterior
                let (tips, cleared) = self.tips.delete_for_associate(associate_id).await?;
                distribution_summary(&tips, cleared)
            }
            None => {
                let (tips, cleared) = self.tips.delete_for_corporation(corporate_id).await?;
                distribution_summary(&tips, cleared)
            }
        };

        // Sem ledger: a distribuição fica registrada apenas no log
        tracing::info!(
            "💸 Distribuição na corporação {} (associado: {:?}): bruto ${:.2}, retido ${:.2}, líquido ${:.2}, {} Bravos",
            corporate_id,
            associate_id,
            summary.gross,
            summary.withheld,
            summary.net,
            summary.tips_cleared
        );
        Ok(summary)
    }

    pub async fn thank_you_note(&self, tip_id: &str, associate: &CurrentUser) -> Result<String, AppError> {
        let tip = self
            .tips
            .find_by_id(tip_id)
            .await?
            .ok_or_else(|| AppError::TipNotFound(tip_id.to_string()))?;
        if tip.associate_id != associate.id {
            return Err(AppError::Forbidden);
        }
        Ok(self.notes.generate_thank_you_note(&tip).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::Repositories,
        models::{
            associate::{AssociateSettings, NewAssociate},
            corporation::{CorporateSettings, NewCorporation},
            payment::PaymentDetails,
        },
        test_support::{card, memory_repositories, tip_service},
    };
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::Value;
    use tokio::sync::broadcast;

    use crate::db::{
        documents::{encode, Collection, DocumentStore, Filter, StoredDocument},
        MemoryDocumentStore,
    };

    // Grava um Bravo novo no instante em que a primeira remoção em grupo começa
    struct LateTipStore {
        inner: MemoryDocumentStore,
        late_tip: Mutex<Option<Value>>,
    }

    #[async_trait]
    impl DocumentStore for LateTipStore {
        async fn get(&self, collection: Collection, id: &str) -> Result<Option<StoredDocument>, AppError> {
            self.inner.get(collection, id).await
        }

        async fn query(&self, collection: Collection, filters: &[Filter]) -> Result<Vec<StoredDocument>, AppError> {
            self.inner.query(collection, filters).await
        }

        async fn insert(&self, collection: Collection, data: Value) -> Result<String, AppError> {
            self.inner.insert(collection, data).await
        }

        async fn set(&self, collection: Collection, id: &str, data: Value) -> Result<(), AppError> {
            self.inner.set(collection, id, data).await
        }

        async fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<(), AppError> {
            self.inner.update(collection, id, patch).await
        }

        async fn update_where(
            &self,
            collection: Collection,
            id: &str,
            conditions: &[Filter],
            patch: Value,
        ) -> Result<bool, AppError> {
            self.inner.update_where(collection, id, conditions, patch).await
        }

        async fn delete(&self, collection: Collection, id: &str) -> Result<bool, AppError> {
            self.inner.delete(collection, id).await
        }

        async fn delete_many(&self, collection: Collection, filters: &[Filter]) -> Result<Vec<StoredDocument>, AppError> {
            let late_tip = self.late_tip.lock().unwrap().take();
            if let Some(late_tip) = late_tip {
                self.inner.insert(Collection::Tips, late_tip).await?;
            }
            self.inner.delete_many(collection, filters).await
        }

        async fn create_unique(
            &self,
            collection: Collection,
            id: &str,
            data: Value,
            unique: &[Filter],
        ) -> Result<bool, AppError> {
            self.inner.create_unique(collection, id, data, unique).await
        }

        fn changes(&self) -> broadcast::Receiver<Collection> {
            self.inner.changes()
        }
    }

    fn payload(associate_id: &str, amount: Option<Decimal>, message: &str, name: &str) -> SendTipPayload {
        SendTipPayload {
            associate_id: associate_id.into(),
            amount,
            message: message.into(),
            customer_name: name.into(),
            payment: amount.map(|_| card()),
        }
    }

    fn customer() -> CurrentUser {
        CurrentUser { auth_uid: "cust-1".into(), id: "cust-1".into(), user_type: UserType::Customer, avatar_url: None }
    }

    async fn corp_with_member(repos: &Repositories, corp_allows: bool) -> (String, Associate) {
        let corp = repos
            .corporations
            .create(NewCorporation { name: "Grand".into(), allow_tips: corp_allows, logo_url: None })
            .await
            .unwrap();
        let member = repos
            .associates
            .create(NewAssociate::corporate(&corp.id, "a@g.com", "Ana", "Concierge", "", "u"))
            .await
            .unwrap();
        (corp.id, member)
    }

    #[tokio::test]
    async fn tipping_requires_both_associate_and_corporation_permission() {
        let repos = memory_repositories();
        let service = tip_service(&repos);
        let (corp_id, member) = corp_with_member(&repos, true).await;

        assert!(service.tipping_profile(&member.id).await.unwrap().allow_tips);

        repos
            .corporations
            .update_settings(&corp_id, &CorporateSettings { allow_tips: Some(false), logo_url: None })
            .await
            .unwrap();
        assert!(!service.tipping_profile(&member.id).await.unwrap().allow_tips);

        let solo = repos
            .associates
            .create(NewAssociate::independent("s@x.com", "Sol", "Musician", "", "u").with_allow_tips(false))
            .await
            .unwrap();
        assert!(!service.tipping_profile(&solo.id).await.unwrap().allow_tips);
    }

    #[tokio::test]
    async fn empty_message_gets_a_default_and_customer_is_attached() {
        let repos = memory_repositories();
        let service = tip_service(&repos);
        let (corp_id, member) = corp_with_member(&repos, true).await;

        let sent = service
            .send_tip(payload(&member.id, Some(Decimal::new(1000, 2)), "", "Alex"), Some(&customer()))
            .await
            .unwrap();
        assert_eq!(sent.tip.message, "Great job!");
        assert_eq!(sent.tip.corporate_id.as_deref(), Some(corp_id.as_str()));
        assert_eq!(sent.tip.customer_auth_uid.as_deref(), Some("cust-1"));
        assert!(sent.payment_reference.is_some());
    }

    #[tokio::test]
    async fn disabled_tipping_requires_a_message_and_rejects_amounts() {
        let repos = memory_repositories();
        let service = tip_service(&repos);
        let (_, member) = corp_with_member(&repos, true).await;
        repos
            .associates
            .update_settings(&member.id, &AssociateSettings { allow_tips: Some(false), ..Default::default() })
            .await
            .unwrap();

        let no_message = service.send_tip(payload(&member.id, None, "  ", "Alex"), None).await;
        assert!(matches!(no_message, Err(AppError::InvalidInput(m)) if m == "Please enter a message for your Bravo."));

        let with_amount = service
            .send_tip(payload(&member.id, Some(Decimal::ONE), "Thanks", "Alex"), None)
            .await;
        assert!(matches!(with_amount, Err(AppError::InvalidInput(_))));

        let ok = service.send_tip(payload(&member.id, None, "Thanks", "Alex"), None).await.unwrap();
        assert_eq!(ok.tip.amount, Decimal::ZERO);
        assert!(ok.tip.customer_auth_uid.is_none());
    }

    #[tokio::test]
    async fn name_is_required_and_something_must_be_sent() {
        let repos = memory_repositories();
        let service = tip_service(&repos);
        let (_, member) = corp_with_member(&repos, true).await;

        let no_name = service.send_tip(payload(&member.id, None, "hi", " "), None).await;
        assert!(matches!(no_name, Err(AppError::InvalidInput(m)) if m == "Please enter your name."));

        let nothing = service.send_tip(payload(&member.id, None, "", "Alex"), None).await;
        assert!(matches!(nothing, Err(AppError::InvalidInput(m)) if m == "Please enter a tip amount or a message."));

        let missing = service.send_tip(payload("ghost", None, "hi", "Alex"), None).await;
        assert!(matches!(missing, Err(AppError::AssociateNotFound(_))));
    }

    #[tokio::test]
    async fn declined_payment_writes_nothing() {
        let repos = memory_repositories();
        let service = tip_service(&repos);
        let (_, member) = corp_with_member(&repos, true).await;

        let mut request = payload(&member.id, Some(Decimal::TEN), "", "Alex");
        request.payment = Some(PaymentDetails { cvc: String::new(), ..card() });
        let err = service.send_tip(request, None).await.unwrap_err();
        assert!(matches!(err, AppError::PaymentDeclined(_)));
        assert!(repos.tips.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn claiming_is_first_come_first_served() {
        let repos = memory_repositories();
        let service = tip_service(&repos);
        let (_, member) = corp_with_member(&repos, true).await;
        let sent = service.send_tip(payload(&member.id, None, "hi", "Alex"), None).await.unwrap();

        let claimed = service.claim_tip(&sent.tip.id, &customer()).await.unwrap();
        assert_eq!(claimed.customer_auth_uid.as_deref(), Some("cust-1"));
        // Idempotente para o mesmo cliente
        service.claim_tip(&sent.tip.id, &customer()).await.unwrap();

        let other = CurrentUser { auth_uid: "cust-2".into(), id: "cust-2".into(), ..customer() };
        let err = service.claim_tip(&sent.tip.id, &other).await.unwrap_err();
        assert!(matches!(err, AppError::TipAlreadyClaimed));
    }

    #[test]
    fn summary_withholds_twenty_two_percent() {
        let tip = |amount: i64| Tip {
            id: "t".into(),
            associate_id: "a".into(),
            corporate_id: None,
            amount: Decimal::new(amount, 0),
            message: String::new(),
            customer_name: String::new(),
            timestamp: Utc::now(),
            customer_auth_uid: None,
        };
        let summary = distribution_summary(&[tip(60), tip(40)], 2);
        assert_eq!(summary.gross, Decimal::new(100, 0));
        assert_eq!(summary.withheld, Decimal::new(22, 0));
        assert_eq!(summary.net, Decimal::new(78, 0));
        assert_eq!(summary.tips_cleared, 2);
    }

    #[tokio::test]
    async fn distribution_clears_one_associate_or_the_whole_corporation() {
        let repos = memory_repositories();
        let service = tip_service(&repos);
        let (corp_id, ana) = corp_with_member(&repos, true).await;
        let bia = repos
            .associates
            .create(NewAssociate::corporate(&corp_id, "b@g.com", "Bia", "Bellhop", "", "u"))
            .await
            .unwrap();
        for (who, cents) in [(&ana, 1000), (&ana, 500), (&bia, 2000)] {
            service
                .send_tip(payload(&who.id, Some(Decimal::new(cents, 2)), "", "Alex"), None)
                .await
                .unwrap();
        }

        let single = service.distribute(&corp_id, Some(&ana.id)).await.unwrap();
        assert_eq!(single.gross, Decimal::new(1500, 2));
        assert_eq!(single.tips_cleared, 2);
        assert_eq!(repos.tips.list_all().await.unwrap().len(), 1);

        let all = service.distribute(&corp_id, None).await.unwrap();
        assert_eq!(all.gross, Decimal::new(2000, 2));
        assert!(repos.tips.list_all().await.unwrap().is_empty());

        let foreign = service.distribute("other-corp", Some(&bia.id)).await.unwrap_err();
        assert!(matches!(foreign, AppError::Forbidden));
    }

    #[tokio::test]
    async fn distribution_pays_out_exactly_the_tips_it_removes() {
        let store = Arc::new(LateTipStore { inner: MemoryDocumentStore::new(), late_tip: Mutex::new(None) });
        let repos = Repositories::new(store.clone());
        let service = tip_service(&repos);
        let (corp_id, ana) = corp_with_member(&repos, true).await;
        service
            .send_tip(payload(&ana.id, Some(Decimal::new(1000, 2)), "", "Alex"), None)
            .await
            .unwrap();

        let late_tip = NewTip {
            associate_id: ana.id.clone(),
            corporate_id: Some(corp_id.clone()),
            amount: Decimal::new(50, 0),
            message: "Late".into(),
            customer_name: "Bo".into(),
            timestamp: Utc::now(),
            customer_auth_uid: None,
        };
        *store.late_tip.lock().unwrap() = Some(encode(&late_tip, &["timestamp"]).unwrap());

        let summary = service.distribute(&corp_id, Some(&ana.id)).await.unwrap();
        assert_eq!(summary.tips_cleared, 2);
        assert_eq!(summary.gross, Decimal::new(60, 0));
        assert_eq!(summary.net, Decimal::new(4680, 2));
        assert!(repos.tips.list_all().await.unwrap().is_empty());
    }
}
