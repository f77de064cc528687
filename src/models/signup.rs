// src/models/signup.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{
    associate::Associate,
    auth::AuthResponse,
    payment::{PaymentDetails, PayoutDetails},
};

pub const PENDING_FINISH_MESSAGE: &str = "Your request to join has been sent to your administrator. You'll be notified via email once it's approved.";
pub const CREATED_FINISH_MESSAGE: &str = "Your account has been created successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Customer,
    Individual,
    Employee,
    Corporate,
}

impl AccountType {
    /// Títulos das etapas, na ordem em que o wizard as percorre.
    pub fn steps(self) -> &'static [&'static str] {
        match self {
            AccountType::Customer => &["Account Type", "Your Info", "Payment", "Finish"],
            AccountType::Individual => &["Account Type", "Profile", "Account", "Payout", "Finish"],
            AccountType::Corporate => &["Account Type", "Business Info", "Admin Account", "Payout", "Finish"],
            AccountType::Employee => &["Account Type", "Verify", "Complete Setup", "Finish"],
        }
    }

    pub fn finish_index(self) -> usize {
        self.steps().len() - 1
    }

    // A etapa que dispara o submit (o botão "Create Account" / "Claim Account")
    pub fn submit_index(self) -> usize {
        self.finish_index() - 1
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    #[default]
    Check,
    Claim,
    Request,
    Pending,
    Error,
}

// Campos digitados no wizard. Cada PATCH (`next`) mescla o que vier.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub about_me: Option<String>,
    pub employer_id: Option<String>,
    pub company_name: Option<String>,
    // URL de imagem já enviada via /api/signup/{id}/avatar ou /api/uploads
    pub avatar_url: Option<String>,
    pub payment: Option<PaymentDetails>,
    pub payout: Option<PayoutDetails>,
    // Bravo enviado como convidado, vinculado ao criar a conta de cliente
    pub claim_tip_id: Option<String>,
}

impl SignupForm {
    pub fn merge(&mut self, other: SignupForm) {
        macro_rules! take {
            ($($field:ident),*) => {
                $( if other.$field.is_some() { self.$field = other.$field; } )*
            };
        }
        take!(
            email, password, name, role, about_me, employer_id, company_name, avatar_url,
            payment, payout, claim_tip_id
        );
    }

    pub fn field(value: &Option<String>) -> &str {
        value.as_deref().map(str::trim).unwrap_or("")
    }
}

#[derive(Debug, Clone)]
pub struct SignupSession {
    pub id: Uuid,
    pub account_type: Option<AccountType>,
    pub current_step: usize,
    pub employee_status: EmployeeStatus,
    pub form: SignupForm,
    pub found_associate: Option<Associate>,
    pub home_path: Option<String>,
    // Aviso da última transição (o toast do cliente web)
    pub notice: Option<String>,
}

impl SignupSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            account_type: None,
            current_step: 0,
            employee_status: EmployeeStatus::Check,
            form: SignupForm::default(),
            found_associate: None,
            home_path: None,
            notice: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.account_type
            .is_some_and(|account_type| self.current_step == account_type.finish_index())
    }

    pub fn finish_message(&self) -> &'static str {
        if self.employee_status == EmployeeStatus::Pending {
            PENDING_FINISH_MESSAGE
        } else {
            CREATED_FINISH_MESSAGE
        }
    }

    pub fn view(&self) -> WizardView {
        let steps = self.account_type.map(AccountType::steps).unwrap_or(&["Account Type"]);
        let finished = self.is_finished();
        WizardView {
            id: self.id,
            account_type: self.account_type,
            step_index: self.current_step,
            step_title: steps.get(self.current_step).copied().unwrap_or("Finish").to_string(),
            steps: steps.iter().map(|s| s.to_string()).collect(),
            employee_status: self.employee_status,
            found_associate: self.found_associate.clone(),
            avatar_url: self.form.avatar_url.clone(),
            finished,
            finish_message: finished.then(|| self.finish_message().to_string()),
            home_path: self.home_path.clone(),
            notice: self.notice.clone(),
        }
    }
}

impl Default for SignupSession {
    fn default() -> Self {
        Self::new()
    }
}

// O que o cliente web precisa para desenhar a etapa atual
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WizardView {
    pub id: Uuid,
    pub account_type: Option<AccountType>,
    pub step_index: usize,
    pub step_title: String,
    pub steps: Vec<String>,
    pub employee_status: EmployeeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_associate: Option<Associate>,
    // Imagem já enviada nesta sessão
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub finished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

// Resposta do submit: a etapa final e, quando uma conta foi criada, a sessão
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupOutcome {
    pub wizard: WizardView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectAccountTypePayload {
    pub account_type: AccountType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_flow_ends_in_finish() {
        for account_type in [
            AccountType::Customer,
            AccountType::Individual,
            AccountType::Employee,
            AccountType::Corporate,
        ] {
            let steps = account_type.steps();
            assert_eq!(steps[0], "Account Type");
            assert_eq!(steps[account_type.finish_index()], "Finish");
        }
    }

    #[test]
    fn merge_keeps_previous_values_for_missing_fields() {
        let mut form = SignupForm { email: Some("a@b.com".into()), ..Default::default() };
        form.merge(SignupForm { name: Some("Ana".into()), ..Default::default() });
        assert_eq!(form.email.as_deref(), Some("a@b.com"));
        assert_eq!(form.name.as_deref(), Some("Ana"));
    }
}
