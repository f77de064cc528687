// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::customer_login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::update_avatar,

        // --- Associates ---
        handlers::associates::get_associate,
        handlers::associates::get_tipping_profile,
        handlers::associates::update_my_profile,
        handlers::associates::get_my_earnings,
        handlers::associates::get_my_tips,

        // --- Documents ---
        handlers::documents::associate_qr,
        handlers::documents::associate_tip_card,

        // --- Corporations ---
        handlers::corporations::get_my_corporation,
        handlers::corporations::update_settings,
        handlers::corporations::list_team,
        handlers::corporations::add_associate,
        handlers::corporations::import_associates,
        handlers::corporations::remove_associate,
        handlers::corporations::set_associate_tips,
        handlers::corporations::list_join_requests,
        handlers::corporations::approve_join_request,
        handlers::corporations::deny_join_request,
        handlers::corporations::get_summary,
        handlers::corporations::distribute,
        handlers::corporations::get_report,
        handlers::corporations::export_report_csv,

        // --- Tips ---
        handlers::tips::send_tip,
        handlers::tips::claim_tip,
        handlers::tips::customer_history,
        handlers::tips::thank_you_note,

        // --- Messages ---
        handlers::messages::list_messages,
        handlers::messages::send_message,

        // --- Scan ---
        handlers::scan::scan,

        // --- Signup ---
        handlers::signup::create_session,
        handlers::signup::get_session,
        handlers::signup::select_account_type,
        handlers::signup::next_step,
        handlers::signup::previous_step,
        handlers::signup::reset_session,
        handlers::signup::verify_employee,
        handlers::signup::submit,
        handlers::signup::upload_avatar,

        // --- Sync ---
        handlers::sync::stream,

        // --- Uploads ---
        handlers::uploads::upload,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::user::UserType,
            models::user::CurrentUser,
            models::user::UserProfile,
            handlers::auth::AvatarPayload,

            // --- Associates ---
            models::associate::Associate,
            models::associate::AssociateSettings,
            models::associate::ProfileUpdatePayload,
            models::associate::AssociateTipsPayload,
            models::associate::AddAssociatePayload,
            models::associate::BulkImportResult,
            models::associate::TippingProfile,

            // --- Corporations ---
            models::corporation::CorporateEntity,
            models::corporation::CorporateSettings,
            models::join_request::JoinRequest,
            models::join_request::JoinRequestStatus,

            // --- Tips ---
            models::tip::Tip,
            models::tip::SendTipPayload,
            models::tip::SentTip,
            models::tip::DistributePayload,
            models::tip::DistributionSummary,
            models::tip::ThankYouNote,
            models::payment::PaymentDetails,
            models::payment::PayoutDetails,

            // --- Messages ---
            models::message::Message,
            models::message::SendMessagePayload,

            // --- Reports ---
            models::report::ReportPeriod,
            models::report::ReportKpis,
            models::report::LeaderboardEntry,
            models::report::CorporateReport,
            models::report::CorporateSummary,
            models::report::EarningsBucket,
            models::report::AssociateEarnings,

            // --- Scan ---
            models::scan::ScanPayload,
            models::scan::ScanResult,

            // --- Signup ---
            models::signup::AccountType,
            models::signup::EmployeeStatus,
            models::signup::SignupForm,
            models::signup::WizardView,
            models::signup::SignupOutcome,
            models::signup::SelectAccountTypePayload,

            // --- Sync ---
            models::session::ClientState,
            models::session::Toast,
            models::session::ToastKind,

            // --- Uploads ---
            handlers::uploads::UploadResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Login de empresas, associados e clientes"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Associates", description = "Perfil, ganhos e Bravos do associado"),
        (name = "Documents", description = "QR code e cartão impresso do associado"),
        (name = "Corporations", description = "Equipe, pedidos de entrada, distribuição e relatórios"),
        (name = "Tips", description = "Envio, vínculo e histórico de Bravos"),
        (name = "Messages", description = "Conversa entre associado e cliente sobre um Bravo"),
        (name = "Scan", description = "Leitura do QR code"),
        (name = "Signup", description = "Wizard de cadastro em etapas"),
        (name = "Sync", description = "Estado do cliente em tempo real (SSE)"),
        (name = "Uploads", description = "Envio de imagens (avatares e logos)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
