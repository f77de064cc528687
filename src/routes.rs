// src/routes.rs

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    common::error::ApiError,
    config::{AppState, UPLOADS_ROUTE},
    docs::ApiDoc,
    handlers,
    middleware::{auth::auth_guard, i18n::Locale},
};

// Rota /api desconhecida: 404 em JSON (nunca o index.html do cliente web)
async fn api_not_found(State(app_state): State<AppState>, locale: Locale, uri: Uri) -> impl IntoResponse {
    tracing::debug!("Rota não encontrada: {}", uri);
    let error = app_state
        .i18n_store
        .translate(&locale.0, "route_not_found")
        .unwrap_or("Route not found.")
        .to_string();
    ApiError { status: StatusCode::NOT_FOUND, error, details: None }
}

fn api_routes(app_state: &AppState) -> Router<AppState> {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/customer-login", post(handlers::auth::customer_login));

    // Rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/avatar", patch(handlers::auth::update_avatar))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let associate_routes = Router::new()
        .route("/me", patch(handlers::associates::update_my_profile))
        .route("/me/earnings", get(handlers::associates::get_my_earnings))
        .route("/me/tips", get(handlers::associates::get_my_tips))
        .route("/{id}", get(handlers::associates::get_associate))
        .route("/{id}/tipping-profile", get(handlers::associates::get_tipping_profile))
        .route("/{id}/qr", get(handlers::documents::associate_qr))
        .route("/{id}/tip-card", get(handlers::documents::associate_tip_card));

    let corporate_routes = Router::new()
        .route("/", get(handlers::corporations::get_my_corporation))
        .route("/settings", patch(handlers::corporations::update_settings))
        .route(
            "/associates",
            get(handlers::corporations::list_team).post(handlers::corporations::add_associate),
        )
        .route("/associates/import", post(handlers::corporations::import_associates))
        .route(
            "/associates/{id}",
            patch(handlers::corporations::set_associate_tips)
                .delete(handlers::corporations::remove_associate),
        )
        .route("/join-requests", get(handlers::corporations::list_join_requests))
        .route("/join-requests/{id}/approve", post(handlers::corporations::approve_join_request))
        .route("/join-requests/{id}/deny", post(handlers::corporations::deny_join_request))
        .route("/summary", get(handlers::corporations::get_summary))
        .route("/distribute", post(handlers::corporations::distribute))
        .route("/reports", get(handlers::corporations::get_report))
        .route("/reports/csv", get(handlers::corporations::export_report_csv));

    let tip_routes = Router::new()
        .route("/", post(handlers::tips::send_tip))
        .route("/history", get(handlers::tips::customer_history))
        .route("/{id}/claim", post(handlers::tips::claim_tip))
        .route("/{id}/thank-you-note", post(handlers::tips::thank_you_note))
        .route(
            "/{id}/messages",
            get(handlers::messages::list_messages).post(handlers::messages::send_message),
        );

    let signup_routes = Router::new()
        .route("/", post(handlers::signup::create_session))
        .route("/{id}", get(handlers::signup::get_session))
        .route("/{id}/account-type", post(handlers::signup::select_account_type))
        .route("/{id}/next", post(handlers::signup::next_step))
        .route("/{id}/back", post(handlers::signup::previous_step))
        .route("/{id}/reset", post(handlers::signup::reset_session))
        .route("/{id}/verify", post(handlers::signup::verify_employee))
        .route("/{id}/avatar", post(handlers::signup::upload_avatar))
        .route("/{id}/submit", post(handlers::signup::submit));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/scan", post(handlers::scan::scan))
        .route("/sync/stream", get(handlers::sync::stream))
        .route("/uploads", post(handlers::uploads::upload))
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/associates", associate_routes)
        .nest("/corporations/me", corporate_routes)
        .nest("/tips", tip_routes)
        .nest("/signup", signup_routes)
        .fallback(api_not_found)
}

/// O router completo: API, documentação, uploads e o cliente web estático.
pub fn build_router(app_state: AppState) -> Router {
    let config = app_state.config.clone();

    // Qualquer caminho fora da API que não seja um arquivo cai no index.html
    let web_client = ServeDir::new(&config.static_dir)
        .not_found_service(ServeFile::new(config.static_dir.join("index.html")));

    let mut app = Router::new()
        .nest("/api", api_routes(&app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    if let Some(uploads_dir) = &config.uploads_dir {
        app = app.nest_service(UPLOADS_ROUTE, ServeDir::new(uploads_dir));
    }

    app.fallback_service(web_client)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{
        models::{
            associate::NewAssociate,
            corporation::NewCorporation,
            user::UserProfile,
        },
        test_support::test_state,
    };

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::get(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_and_openapi_are_served() {
        let app = build_router(test_state());

        let response = app.clone().oneshot(get_request("/api/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get_request("/api-docs/openapi.json", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let doc = json_body(response).await;
        assert!(doc["paths"]["/api/tips"].is_object());
    }

    #[tokio::test]
    async fn unknown_api_routes_answer_json_404() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                Request::get("/api/nope")
                    .header(header::ACCEPT_LANGUAGE, "pt-BR")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "Rota não encontrada.");
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let app = build_router(test_state());
        let response = app.oneshot(get_request("/api/users/me", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_role_gets_redirected_to_its_home() {
        let state = test_state();
        let associate = state
            .repos
            .associates
            .create(NewAssociate::independent("ana@b.com", "Ana", "Barista", "", "url").with_auth_uid("ana-uid"))
            .await
            .unwrap();
        state
            .repos
            .users
            .set_profile("ana-uid", &UserProfile::associate(&associate.id, "url"))
            .await
            .unwrap();
        let token = state.auth_service.create_token("ana-uid").unwrap();
        let app = build_router(state);

        let response = app
            .clone()
            .oneshot(get_request("/api/corporations/me", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(response).await["details"]["redirectTo"], "/associate");

        let response = app.oneshot(get_request("/api/users/me", Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["id"], associate.id.as_str());
    }

    #[tokio::test]
    async fn corporate_admin_sees_its_corporation() {
        let state = test_state();
        let corp = state
            .repos
            .corporations
            .create(NewCorporation { name: "Grand Hotel".into(), allow_tips: true, logo_url: None })
            .await
            .unwrap();
        state
            .repos
            .users
            .set_profile("admin-uid", &UserProfile::corporate(&corp.id, "logo"))
            .await
            .unwrap();
        let token = state.auth_service.create_token("admin-uid").unwrap();
        let app = build_router(state);

        let response = app.oneshot(get_request("/api/corporations/me", Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["name"], "Grand Hotel");
    }

    #[tokio::test]
    async fn guests_can_send_a_bravo_and_bad_scans_are_rejected() {
        let state = test_state();
        let associate = state
            .repos
            .associates
            .create(NewAssociate::independent("ana@b.com", "Ana", "Barista", "", "url"))
            .await
            .unwrap();
        let app = build_router(state);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/tips",
                json!({ "associateId": associate.id, "customerName": "Alex", "message": "Thanks!" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let sent = json_body(response).await;
        assert_eq!(sent["tip"]["message"], "Thanks!");

        let response = app
            .oneshot(post_json("/api/scan", json!({ "data": "not a url" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Not a valid Bravos QR code.");
    }

    #[tokio::test]
    async fn signup_sessions_start_at_step_zero() {
        let app = build_router(test_state());
        let response = app
            .clone()
            .oneshot(Request::post("/api/signup").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let view = json_body(response).await;
        assert_eq!(view["stepIndex"], 0);

        let id = view["id"].as_str().unwrap().to_string();
        let response = app
            .oneshot(get_request(&format!("/api/signup/{id}"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn wizard_uploads_need_a_session_not_a_login() {
        let app = build_router(test_state());

        let response = app
            .clone()
            .oneshot(Request::post("/api/uploads?folder=requests&fileName=me.png").body(Body::from("png")).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(Request::post("/api/signup").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let id = json_body(response).await["id"].as_str().unwrap().to_string();
        app.clone()
            .oneshot(post_json(&format!("/api/signup/{id}/account-type"), json!({ "accountType": "customer" })))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::post(format!("/api/signup/{id}/avatar?fileName=me.png"))
                    .header(header::CONTENT_TYPE, "application/octet-stream")
                    .body(Body::from("png"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["avatarUrl"], "https://picsum.photos/seed/me.png/200");

        let response = app
            .oneshot(
                Request::post(format!("/api/signup/{}/avatar?fileName=me.png", uuid::Uuid::new_v4()))
                    .body(Body::from("png"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
