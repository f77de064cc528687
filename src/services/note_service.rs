// src/services/note_service.rs

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::models::tip::Tip;

pub const FALLBACK_NOTE: &str = "Thank you so much for your generous tip! I truly appreciate it.";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-04-17";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub fn thank_you_prompt(tip: &Tip) -> String {
    format!(
        "A customer named {} left a tip of ${:.2} with the message: \"{}\". Write a short, friendly, and sincere thank you note back to them. Keep it under 40 words.",
        tip.customer_name, tip.amount, tip.message
    )
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

/// Notas de agradecimento geradas por IA. Sem chave configurada, usa o texto padrão.
#[derive(Clone)]
pub struct NoteService {
    gemini: Option<std::sync::Arc<GeminiClient>>,
}

impl NoteService {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self::with_base_url(api_key, model, GEMINI_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: Option<String>, model: String, base_url: String) -> Self {
        let gemini = api_key.and_then(|api_key| {
            let client = Client::builder()
                .timeout(Duration::from_secs(15))
                .connect_timeout(Duration::from_secs(3))
                .build();
            match client {
                Ok(client) => Some(std::sync::Arc::new(GeminiClient { client, base_url, api_key, model })),
                Err(e) => {
                    tracing::warn!("⚠️ Cliente HTTP do Gemini indisponível: {}", e);
                    None
                }
            }
        });
        if gemini.is_none() {
            tracing::warn!("⚠️ GEMINI_API_KEY não definida. Recursos de IA desativados.");
        }
        Self { gemini }
    }

    pub async fn generate_thank_you_note(&self, tip: &Tip) -> String {
        let Some(gemini) = &self.gemini else {
            return FALLBACK_NOTE.to_string();
        };

        match gemini.generate(&thank_you_prompt(tip)).await {
            Ok(note) if !note.trim().is_empty() => note.trim().to_string(),
            Ok(_) => FALLBACK_NOTE.to_string(),
            Err(e) => {
                tracing::error!("🔥 Erro ao gerar nota de agradecimento com o Gemini: {}", e);
                FALLBACK_NOTE.to_string()
            }
        }
    }
}

impl GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, reqwest::Error> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response: GenerateContentResponse = self
            .client
            .post(url)
            .query(&[("key", &self.api_key)])
            .json(&json!({ "contents": [{ "parts": [{ "text": prompt }] }] }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn tip() -> Tip {
        Tip {
            id: "t1".into(),
            associate_id: "a1".into(),
            corporate_id: None,
            amount: Decimal::new(5, 0),
            message: "Great job!".into(),
            customer_name: "Alex".into(),
            timestamp: Utc::now(),
            customer_auth_uid: None,
        }
    }

    #[test]
    fn prompt_formats_amount_with_two_decimals() {
        assert_eq!(
            thank_you_prompt(&tip()),
            "A customer named Alex left a tip of $5.00 with the message: \"Great job!\". Write a short, friendly, and sincere thank you note back to them. Keep it under 40 words."
        );
    }

    #[tokio::test]
    async fn unconfigured_service_returns_fallback() {
        let notes = NoteService::new(None, DEFAULT_GEMINI_MODEL.into());
        assert_eq!(notes.generate_thank_you_note(&tip()).await, FALLBACK_NOTE);
    }

    #[tokio::test]
    async fn unreachable_service_returns_fallback() {
        let notes = NoteService::with_base_url(
            Some("key".into()),
            DEFAULT_GEMINI_MODEL.into(),
            "http://127.0.0.1:1".into(),
        );
        assert_eq!(notes.generate_thank_you_note(&tip()).await, FALLBACK_NOTE);
    }
}
