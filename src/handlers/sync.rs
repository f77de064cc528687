// src/handlers/sync.rs

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::{wrappers::WatchStream, Stream, StreamExt};

use crate::{
    config::AppState,
    middleware::auth::Identity,
    models::session::ClientState,
    services::sync::SyncSession,
};

fn state_event(state: &ClientState) -> Event {
    Event::default().event("state").json_data(state).unwrap_or_else(|e| {
        tracing::error!("🔥 Falha ao serializar o estado do cliente: {:?}", e);
        Event::default().event("error").data("serialization failed")
    })
}

// GET /api/sync/stream
/// Abre uma sessão de sincronização e publica cada novo estado como evento SSE.
/// O token pode vir no header ou em `?token=` (EventSource não envia headers).
#[utoipa::path(
    get,
    path = "/api/sync/stream",
    tag = "Sync",
    params(("token" = Option<String>, Query, description = "JWT opcional, alternativa ao header")),
    responses(
        (status = 200, description = "Stream SSE de eventos `state` com o ClientState", content_type = "text/event-stream", body = ClientState),
        (status = 401, description = "Token inválido")
    ),
    security((), ("api_jwt" = []))
)]
pub async fn stream(
    State(app_state): State<AppState>,
    Identity(identity): Identity,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session = SyncSession::start(
        app_state.repos.clone(),
        app_state.profile_service.clone(),
        identity,
    )
    .await;

    let updates = WatchStream::new(session.subscribe()).map(move |state| {
        // A sessão (e seus listeners) vive enquanto o cliente estiver conectado
        let _session = &session;
        Ok(state_event(&state))
    });

    Sse::new(updates).keep_alive(KeepAlive::default())
}
