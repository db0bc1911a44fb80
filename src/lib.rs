pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use crate::services::{
    generation_service::GenerationService, oral_exam_service::OralExamService,
    question_service::QuestionService, subject_service::SubjectService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub question_service: QuestionService,
    pub subject_service: SubjectService,
    pub oral_exam_service: OralExamService,
    pub generation_service: GenerationService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");

        let question_service = QuestionService::new(pool.clone());
        let subject_service = SubjectService::new(pool.clone());
        let oral_exam_service = OralExamService::new(pool.clone());
        let generation_service = GenerationService::new(
            config.generation_api_url.clone(),
            config.generation_api_key.clone(),
            http_client,
        );

        Self {
            pool,
            question_service,
            subject_service,
            oral_exam_service,
            generation_service,
        }
    }
}
