// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, quiz},
    state::AppState,
    utils::jwt::{auth_middleware, author_middleware},
};

/// Assembles the main application router.
///
/// * Learner routes (play, attempts) need any valid token.
/// * Authoring and reporting routes under `/api/admin` need a teacher or admin token.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let quiz_routes = Router::new()
        .route("/{quiz_id}/play", get(quiz::get_quiz_for_play))
        .route("/{quiz_id}/attempts", post(quiz::start_attempt));

    let entity_routes = Router::new().route("/{entity_id}/quiz", get(quiz::get_quiz_for_entity));

    let attempt_routes = Router::new()
        .route("/{attempt_id}", get(quiz::get_attempt))
        .route("/{attempt_id}/submit", post(quiz::submit_attempt));

    let student_routes =
        Router::new().route("/{student_id}/attempts", get(quiz::list_student_attempts));

    let learner_routes = Router::new()
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/entities", entity_routes)
        .nest("/api/attempts", attempt_routes)
        .nest("/api/students", student_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route("/quizzes", post(admin::create_quiz))
        .route(
            "/quizzes/{quiz_id}",
            get(admin::get_quiz)
                .put(admin::update_quiz)
                .delete(admin::delete_quiz),
        )
        .route("/quizzes/{quiz_id}/publish", put(admin::publish_quiz))
        .route(
            "/quizzes/{quiz_id}/questions",
            post(admin::add_question).get(admin::list_questions),
        )
        .route("/quizzes/{quiz_id}/attempts", get(admin::list_quiz_attempts))
        .route("/quizzes/{quiz_id}/stats", get(admin::quiz_stats))
        .route("/questions/{question_id}", put(admin::update_question))
        .route("/questions/{question_id}/options", post(admin::add_option))
        .route("/questions/{question_id}/correct", put(admin::set_correct_option))
        .route(
            "/options/{option_id}",
            put(admin::update_option).delete(admin::delete_option),
        )
        // Double middleware protection: Auth first, then Author check
        .route_layer(middleware::from_fn(author_middleware))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(learner_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
