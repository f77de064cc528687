// src/db/pg_store.rs

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{
    postgres::{PgListener, PgRow},
    types::Json,
    PgPool, Postgres, QueryBuilder, Row,
};
use tokio::sync::broadcast;

use crate::{
    common::error::AppError,
    db::documents::{new_document_id, Collection, DocumentStore, Filter, StoredDocument},
};

// Canal usado pelo trigger da migração `create_documents`
const CHANGE_CHANNEL: &str = "document_changes";
const CHANGE_FEED_CAPACITY: usize = 256;
const LISTEN_RETRY_BASE: Duration = Duration::from_millis(500);
const LISTEN_RETRY_MAX: Duration = Duration::from_secs(30);

// Repassa cada NOTIFY ao feed. Depois de uma queda, avisa todas as coleções,
// porque as notificações perdidas durante a reconexão não voltam.
struct ChangeRelay {
    feed: broadcast::Sender<Collection>,
    failures: u32,
}

impl ChangeRelay {
    fn new(feed: broadcast::Sender<Collection>) -> Self {
        Self { feed, failures: 0 }
    }

    fn forward(&mut self, payload: &str) {
        if self.failures > 0 {
            tracing::info!("✅ LISTEN restabelecido após {} falha(s); recarregando todas as coleções", self.failures);
            self.failures = 0;
            for collection in Collection::ALL {
                let _ = self.feed.send(collection);
            }
        }
        match Collection::from_name(payload) {
            Some(collection) => {
                let _ = self.feed.send(collection);
            }
            None => tracing::warn!("⚠️ Notificação de coleção desconhecida: {}", payload),
        }
    }

    // Espera exponencial até LISTEN_RETRY_MAX
    fn backoff(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);
        let exponent = (self.failures - 1).min(16);
        LISTEN_RETRY_BASE.saturating_mul(1 << exponent).min(LISTEN_RETRY_MAX)
    }
}

/// Document store sobre a tabela `documents(collection, id, data JSONB)`.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    changes: broadcast::Sender<Collection>,
}

impl PgDocumentStore {
    /// Conecta o LISTEN e repassa cada NOTIFY para o feed de mudanças.
    pub async fn connect(pool: PgPool) -> Result<Self, AppError> {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);

        let mut listener = PgListener::connect_with(&pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;

        let mut relay = ChangeRelay::new(changes.clone());
        tokio::spawn(async move {
            loop {
                match listener.recv().await {
                    Ok(notification) => relay.forward(notification.payload()),
                    Err(e) => {
                        // O PgListener reconecta sozinho na próxima chamada
                        let delay = relay.backoff();
                        tracing::error!("🔥 Falha no LISTEN de documentos: {}. Nova tentativa em {:?}", e, delay);
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        });

        tracing::info!("✅ Feed de mudanças do Postgres ativo (canal '{}')", CHANGE_CHANNEL);
        Ok(Self { pool, changes })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn row_to_document(row: PgRow) -> Result<StoredDocument, AppError> {
    let id: String = row.try_get("id")?;
    let Json(data): Json<Value> = row.try_get("data")?;
    Ok(StoredDocument { id, data })
}

// Acrescenta " AND <condição>" para cada filtro
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &[Filter]) {
    for filter in filters {
        builder.push(" AND ");
        match filter {
            Filter::Eq(field, value) => {
                builder.push("(data -> ");
                builder.push_bind(field.to_string());
                builder.push(") = ");
                builder.push_bind(Json(value.clone()));
            }
            Filter::ArrayContains(field, value) => {
                builder.push("(data -> ");
                builder.push_bind(field.to_string());
                builder.push(") @> ");
                builder.push_bind(Json(Value::Array(vec![value.clone()])));
            }
            Filter::In(field, values) => {
                if values.is_empty() {
                    builder.push("FALSE");
                    continue;
                }
                builder.push("(");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        builder.push(" OR ");
                    }
                    builder.push("(data -> ");
                    builder.push_bind(field.to_string());
                    builder.push(") = ");
                    builder.push_bind(Json(value.clone()));
                }
                builder.push(")");
            }
            Filter::Missing(field) => {
                builder.push("COALESCE(data -> ");
                builder.push_bind(field.to_string());
                builder.push(", 'null'::jsonb) = 'null'::jsonb");
            }
        }
    }
}

// Para credenciais, o índice único `idx_credentials_email` também barra a corrida
// entre o NOT EXISTS e o INSERT.
fn create_unique_query(collection: Collection, id: &str, data: Value, unique: &[Filter]) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("INSERT INTO documents (collection, id, data) SELECT ");
    builder.push_bind(collection.name());
    builder.push(", ");
    builder.push_bind(id.to_string());
    builder.push(", ");
    builder.push_bind(Json(data));
    builder.push(" WHERE NOT EXISTS (SELECT 1 FROM documents WHERE collection = ");
    builder.push_bind(collection.name());
    push_filters(&mut builder, unique);
    builder.push(") ON CONFLICT DO NOTHING");
    builder
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<StoredDocument>, AppError> {
        let row = sqlx::query("SELECT id, data FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.name())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_document).transpose()
    }

    async fn query(&self, collection: Collection, filters: &[Filter]) -> Result<Vec<StoredDocument>, AppError> {
        let mut builder = QueryBuilder::new("SELECT id, data FROM documents WHERE collection = ");
        builder.push_bind(collection.name());
        push_filters(&mut builder, filters);
        builder.push(" ORDER BY created_at");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.into_iter().map(row_to_document).collect()
    }

    async fn insert(&self, collection: Collection, data: Value) -> Result<String, AppError> {
        let id = new_document_id();
        sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
            .bind(collection.name())
            .bind(&id)
            .bind(Json(data))
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn set(&self, collection: Collection, id: &str, data: Value) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(collection.name())
        .bind(id)
        .bind(Json(data))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<(), AppError> {
        let updated = self.update_where(collection, id, &[], patch).await?;
        if !updated {
            return Err(AppError::DocumentNotFound {
                collection: collection.name(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn update_where(
        &self,
        collection: Collection,
        id: &str,
        conditions: &[Filter],
        patch: Value,
    ) -> Result<bool, AppError> {
        // `||` mescla os campos de primeiro nível do JSONB
        let mut builder = QueryBuilder::new("UPDATE documents SET updated_at = NOW(), data = data || ");
        builder.push_bind(Json(patch));
        builder.push(" WHERE collection = ");
        builder.push_bind(collection.name());
        builder.push(" AND id = ");
        builder.push_bind(id.to_string());
        push_filters(&mut builder, conditions);

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.name())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, collection: Collection, filters: &[Filter]) -> Result<Vec<StoredDocument>, AppError> {
        let mut builder = QueryBuilder::new("DELETE FROM documents WHERE collection = ");
        builder.push_bind(collection.name());
        push_filters(&mut builder, filters);
        builder.push(" RETURNING id, data");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.into_iter().map(row_to_document).collect()
    }

    async fn create_unique(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
        unique: &[Filter],
    ) -> Result<bool, AppError> {
        let result = create_unique_query(collection, id, data, unique)
            .build()
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn changes(&self) -> broadcast::Receiver<Collection> {
        self.changes.subscribe()
    }
}
