use axum::{
    routing::{get, post},
    Router,
};
use examdesk_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::cors::permissive_cors,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let integration_api = Router::new()
        .route(
            "/api/integration/subjects",
            get(routes::subject::list_subjects).post(routes::subject::create_subject),
        )
        .route(
            "/api/integration/subjects/:id/topics",
            get(routes::subject::list_topics),
        )
        .route(
            "/api/integration/topics",
            post(routes::subject::create_topic),
        )
        .route(
            "/api/integration/topics/:id/subtopics",
            get(routes::subject::list_subtopics),
        )
        .route(
            "/api/integration/subtopics",
            post(routes::subject::create_subtopic),
        )
        .route(
            "/api/integration/questions",
            get(routes::question::list_questions).post(routes::question::create_question),
        )
        .route(
            "/api/integration/questions/:id",
            get(routes::question::get_question)
                .patch(routes::question::update_question)
                .delete(routes::question::delete_question),
        )
        .route(
            "/api/integration/questions/draft",
            post(routes::question::draft_question),
        )
        .route(
            "/api/integration/oral-exams",
            get(routes::oral_exam::list_oral_exams).post(routes::oral_exam::create_oral_exam),
        )
        .route(
            "/api/integration/oral-exams/validate",
            post(routes::oral_exam::validate_oral_exam),
        )
        .route(
            "/api/integration/oral-exams/:id",
            get(routes::oral_exam::get_oral_exam).delete(routes::oral_exam::delete_oral_exam),
        )
        .route(
            "/api/integration/oral-exams/:id/export",
            get(routes::export::export_oral_exam),
        )
        .route(
            "/api/integration/oral-exams/students/:id",
            axum::routing::patch(routes::oral_exam::update_student),
        )
        .route(
            "/api/integration/oral-exams/assignments/:id/alternatives",
            get(routes::oral_exam::list_alternatives),
        )
        .route(
            "/api/integration/oral-exams/assignments/:id/exchange",
            post(routes::oral_exam::exchange_question),
        )
        .route(
            "/api/integration/oral-exams/assignments/:id/evaluate",
            post(routes::oral_exam::evaluate_assignment),
        )
        .layer(axum::middleware::from_fn(
            examdesk_backend::middleware::auth::require_bearer_auth,
        ))
        .layer(axum::middleware::from_fn_with_state(
            examdesk_backend::middleware::rate_limit::new_rps_state(config.integration_rps),
            examdesk_backend::middleware::rate_limit::rps_middleware,
        ));

    let app = base_routes
        .merge(integration_api)
        .with_state(app_state)
        .layer(permissive_cors())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
