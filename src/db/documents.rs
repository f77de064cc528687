// src/db/documents.rs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::common::error::AppError;

// ---
// Coleções do serviço de documentos
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Associates,
    Corporations,
    Tips,
    Messages,
    JoinRequests,
    Users,
    Credentials,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Associates,
        Collection::Corporations,
        Collection::Tips,
        Collection::Messages,
        Collection::JoinRequests,
        Collection::Users,
        Collection::Credentials,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Associates => "associates",
            Collection::Corporations => "corporations",
            Collection::Tips => "tips",
            Collection::Messages => "messages",
            Collection::JoinRequests => "joinRequests",
            Collection::Users => "users",
            Collection::Credentials => "credentials",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// Um documento como está no banco: ID + corpo JSON (sempre um objeto).
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub data: Value,
}

// ---
// Filtros de consulta (combinados com AND)
// ---
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(&'static str, Value),
    ArrayContains(&'static str, Value),
    In(&'static str, Vec<Value>),
    // Campo ausente ou null
    Missing(&'static str),
}

impl Filter {
    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Filter::Eq(field, value.into())
    }

    pub fn array_contains(field: &'static str, value: impl Into<Value>) -> Self {
        Filter::ArrayContains(field, value.into())
    }

    pub fn field(&self) -> &'static str {
        match self {
            Filter::Eq(field, _)
            | Filter::ArrayContains(field, _)
            | Filter::In(field, _)
            | Filter::Missing(field) => field,
        }
    }

    pub fn matches(&self, data: &Value) -> bool {
        let current = data.get(self.field());
        match self {
            Filter::Eq(_, expected) => current == Some(expected),
            Filter::ArrayContains(_, expected) => current
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(expected)),
            Filter::In(_, options) => current.is_some_and(|value| options.contains(value)),
            Filter::Missing(_) => current.is_none_or(Value::is_null),
        }
    }

    pub fn matches_all(filters: &[Filter], data: &Value) -> bool {
        filters.iter().all(|filter| filter.matches(data))
    }
}

// ---
// A porta do serviço de documentos
// ---
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<StoredDocument>, AppError>;

    async fn query(&self, collection: Collection, filters: &[Filter]) -> Result<Vec<StoredDocument>, AppError>;

    /// Cria um documento com ID gerado e devolve o ID.
    async fn insert(&self, collection: Collection, data: Value) -> Result<String, AppError>;

    /// Cria ou substitui o documento com o ID informado.
    async fn set(&self, collection: Collection, id: &str, data: Value) -> Result<(), AppError>;

    /// Mescla os campos de primeiro nível. Falha se o documento não existir.
    async fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<(), AppError>;

    /// Mescla apenas se o documento existir e satisfizer as condições.
    /// Retorna se a atualização aconteceu.
    async fn update_where(
        &self,
        collection: Collection,
        id: &str,
        conditions: &[Filter],
        patch: Value,
    ) -> Result<bool, AppError>;

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, AppError>;

    /// Remove em uma única operação todos os documentos que casam com os filtros
    /// e devolve exatamente os que foram removidos.
    async fn delete_many(&self, collection: Collection, filters: &[Filter]) -> Result<Vec<StoredDocument>, AppError>;

    /// Cria o documento só se o ID estiver livre e nenhum outro casar com `unique`.
    /// Retorna se o documento foi criado.
    async fn create_unique(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
        unique: &[Filter],
    ) -> Result<bool, AppError>;

    /// Feed de mudanças: o nome da coleção alterada a cada escrita.
    fn changes(&self) -> broadcast::Receiver<Collection>;
}

pub type SharedDocumentStore = Arc<dyn DocumentStore>;

pub fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

// ---
// Timestamps serializados do banco: {"seconds": i64, "nanos": u32}
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocTimestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl DocTimestamp {
    pub fn to_utc(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.seconds, self.nanos).single()
    }
}

impl From<DateTime<Utc>> for DocTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self {
            seconds: value.timestamp(),
            nanos: value.timestamp_subsec_nanos(),
        }
    }
}

/// Converte para JSON e grava os campos de data no formato do banco.
pub fn encode<T: Serialize>(value: &T, timestamp_fields: &[&str]) -> Result<Value, AppError> {
    let mut data = serde_json::to_value(value)?;
    if let Value::Object(map) = &mut data {
        map.remove("id");
        for field in timestamp_fields {
            let Some(raw) = map.get(*field) else { continue };
            let parsed = raw
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| DocTimestamp::from(dt.with_timezone(&Utc)));
            if let Some(ts) = parsed {
                map.insert(field.to_string(), serde_json::to_value(ts)?);
            }
        }
    }
    Ok(data)
}

// Qualquer objeto {"seconds", "nanos"} vira uma string RFC 3339
fn normalize_timestamps(map: &mut Map<String, Value>) {
    for value in map.values_mut() {
        let Value::Object(inner) = value else { continue };
        if inner.len() != 2 || !inner.contains_key("seconds") || !inner.contains_key("nanos") {
            continue;
        }
        let normalized = serde_json::from_value::<DocTimestamp>(Value::Object(inner.clone()))
            .ok()
            .and_then(DocTimestamp::to_utc);
        if let Some(dt) = normalized {
            *value = Value::String(dt.to_rfc3339());
        }
    }
}

/// Converte um documento do banco no tipo de domínio (com o `id` injetado).
pub fn decode<T: DeserializeOwned>(doc: StoredDocument) -> Result<T, AppError> {
    let mut map = match doc.data {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    normalize_timestamps(&mut map);
    map.insert("id".to_string(), Value::String(doc.id));
    Ok(serde_json::from_value(Value::Object(map))?)
}

/// Como `decode`, mas um documento malformado não derruba a listagem inteira.
pub fn decode_all<T: DeserializeOwned>(collection: Collection, docs: Vec<StoredDocument>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| {
            let id = doc.id.clone();
            match decode(doc) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("⚠️ Documento ignorado {}/{}: {}", collection.name(), id, e);
                    None
                }
            }
        })
        .collect()
}
