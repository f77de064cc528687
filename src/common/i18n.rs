// src/common/i18n.rs

use std::{collections::HashMap, sync::OnceLock};

const DEFAULT_LANG: &str = "en";

// Mensagens de erro voltadas ao usuário, por idioma.
// O inglês é o idioma do produto; o português é o segundo idioma suportado.
const EN: &[(&str, &str)] = &[
    ("validation_failed", "One or more fields are invalid."),
    ("email_already_exists", "This email is already registered. Please log in."),
    ("weak_password", "Password should be at least 6 characters long."),
    ("invalid_credentials", "Failed to login. Please check your credentials."),
    ("invalid_token", "Invalid or missing authentication token."),
    ("profile_not_found", "User profile not found. Please complete setup."),
    ("forbidden", "You do not have access to this resource."),
    ("role_redirect", "Please sign in with the right account to continue."),
    ("already_claimed", "This account has already been claimed. Please log in."),
    ("tip_already_claimed", "This Bravo has already been claimed by another customer."),
    ("recipient_unavailable", "The recipient has not set up their account for messaging."),
    ("invalid_scan_payload", "Not a valid Bravos QR code."),
    ("scanned_associate_not_found", "Associate not found from the scanned code."),
    ("signup_session_not_found", "Signup session not found."),
    ("route_not_found", "Route not found."),
    ("unexpected", "An unexpected error occurred."),
];

const PT: &[(&str, &str)] = &[
    ("validation_failed", "Um ou mais campos são inválidos."),
    ("email_already_exists", "Este e-mail já está cadastrado. Faça login."),
    ("weak_password", "A senha deve ter no mínimo 6 caracteres."),
    ("invalid_credentials", "Falha no login. Verifique suas credenciais."),
    ("invalid_token", "Token de autenticação inválido ou ausente."),
    ("profile_not_found", "Perfil de usuário não encontrado. Conclua o cadastro."),
    ("forbidden", "Você não tem acesso a este recurso."),
    ("role_redirect", "Entre com a conta correta para continuar."),
    ("already_claimed", "Esta conta já foi reivindicada. Faça login."),
    ("tip_already_claimed", "Este Bravo já foi reivindicado por outro cliente."),
    ("recipient_unavailable", "O destinatário ainda não configurou a conta para mensagens."),
    ("invalid_scan_payload", "Não é um QR code válido do Bravos."),
    ("scanned_associate_not_found", "Associado não encontrado a partir do código lido."),
    ("signup_session_not_found", "Sessão de cadastro não encontrada."),
    ("route_not_found", "Rota não encontrada."),
    ("unexpected", "Ocorreu um erro inesperado."),
];

#[derive(Debug)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut messages = HashMap::new();
        messages.insert("en", EN.iter().copied().collect());
        messages.insert("pt", PT.iter().copied().collect());
        Self { messages }
    }

    /// Instância global, usada quando não temos o AppState em mãos (rejeições de extratores).
    pub fn shared() -> &'static I18nStore {
        static STORE: OnceLock<I18nStore> = OnceLock::new();
        STORE.get_or_init(I18nStore::new)
    }

    /// Busca a mensagem no idioma pedido e cai para o inglês se faltar.
    pub fn translate(&self, lang: &str, key: &str) -> Option<&'static str> {
        self.messages
            .get(lang)
            .and_then(|table| table.get(key))
            .or_else(|| self.messages.get(DEFAULT_LANG).and_then(|table| table.get(key)))
            .copied()
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_falls_back_to_english() {
        let store = I18nStore::new();
        assert_eq!(
            store.translate("fr", "invalid_scan_payload"),
            Some("Not a valid Bravos QR code.")
        );
        assert_eq!(store.translate("pt", "nope"), None);
    }

    #[test]
    fn every_key_has_a_portuguese_translation() {
        let store = I18nStore::new();
        for (key, _) in EN {
            assert!(store.messages["pt"].contains_key(key), "faltando: {key}");
        }
    }
}
