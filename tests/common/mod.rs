// tests/common/mod.rs
#![allow(dead_code)]

use std::net::SocketAddr;

use quiz_backend::{
    config::Config,
    models::{
        question::{AddQuestionRequest, NewOption, QuestionCreated},
        quiz::{CreateQuizRequest, EntityType, Quiz},
    },
    routes,
    services::authoring,
    state::AppState,
};
use rust_decimal::Decimal;
use sqlx::{PgPool, postgres::PgPoolOptions};

pub const JWT_SECRET: &str = "test_secret_for_integration_tests";

/// Connects to the database named by DATABASE_URL and migrates it.
pub async fn test_pool() -> PgPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    pool
}

pub fn test_config(database_url: &str) -> Config {
    Config {
        database_url: database_url.to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        rust_log: "error".to_string(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        max_connections: 1,
    }
}

/// Serves the router on a random port and returns its base URL.
pub async fn spawn_app(pool: PgPool) -> String {
    let state = AppState::new(pool, test_config("postgres://unused"));
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

/// Positive id that will not collide with other test runs.
pub fn unique_id() -> i64 {
    (uuid::Uuid::new_v4().as_u128() & 0x3fff_ffff) as i64 + 1
}

pub struct ArithmeticQuiz {
    pub quiz: Quiz,
    pub question: QuestionCreated,
}

impl ArithmeticQuiz {
    pub fn option(&self, text: &str) -> i64 {
        let index = ["3", "4", "5"].iter().position(|t| *t == text).unwrap();
        self.question.option_ids[index]
    }
}

/// Quiz with one question "2+2=?" worth 2 points, options 3/4/5, "4" correct.
pub async fn arithmetic_quiz(pool: &PgPool) -> ArithmeticQuiz {
    let quiz = authoring::create_quiz(
        pool,
        CreateQuizRequest {
            title: Some("Arithmetic".to_string()),
            entity_type: Some(EntityType::Chapter),
            entity_id: unique_id(),
            time_limit_sec: Some(300),
            is_active: None,
        },
    )
    .await
    .unwrap();

    let question = authoring::add_question(
        pool,
        quiz.id,
        question_request("2+2=?", Decimal::new(2, 0), &["3", "4", "5"], 1),
    )
    .await
    .unwrap();

    ArithmeticQuiz { quiz, question }
}

pub fn question_request(
    text: &str,
    points: Decimal,
    options: &[&str],
    correct_option_index: usize,
) -> AddQuestionRequest {
    AddQuestionRequest {
        text: text.to_string(),
        points: Some(points),
        options: options
            .iter()
            .map(|t| NewOption { text: t.to_string() })
            .collect(),
        correct_option_index,
    }
}

pub async fn count(pool: &PgPool, sql: &str, id: i64) -> i64 {
    sqlx::query_scalar::<_, i64>(sql)
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}
