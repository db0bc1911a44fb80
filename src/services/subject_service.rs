use crate::error::Result;
use crate::models::subject::{Subject, Subtopic, Topic};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct SubjectService {
    pool: PgPool,
}

impl SubjectService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_subject(&self, name: &str, created_by: Uuid) -> Result<Subject> {
        let subject = sqlx::query_as::<_, Subject>(
            "INSERT INTO subjects (name, created_by) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(subject)
    }

    pub async fn list_subjects(&self, created_by: Option<Uuid>) -> Result<Vec<Subject>> {
        let subjects = sqlx::query_as::<_, Subject>(
            r#"
            SELECT * FROM subjects
            WHERE ($1::uuid IS NULL OR created_by = $1)
            ORDER BY name ASC
            "#,
        )
        .bind(created_by)
        .fetch_all(&self.pool)
        .await?;

        Ok(subjects)
    }

    pub async fn create_topic(&self, subject_id: Uuid, name: &str) -> Result<Topic> {
        let topic = sqlx::query_as::<_, Topic>(
            "INSERT INTO topics (subject_id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(subject_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(topic)
    }

    pub async fn list_topics(&self, subject_id: Uuid) -> Result<Vec<Topic>> {
        let topics = sqlx::query_as::<_, Topic>(
            "SELECT * FROM topics WHERE subject_id = $1 ORDER BY name ASC",
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(topics)
    }

    pub async fn create_subtopic(&self, topic_id: Uuid, name: &str) -> Result<Subtopic> {
        let subtopic = sqlx::query_as::<_, Subtopic>(
            "INSERT INTO subtopics (topic_id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(topic_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(subtopic)
    }

    pub async fn list_subtopics(&self, topic_id: Uuid) -> Result<Vec<Subtopic>> {
        let subtopics = sqlx::query_as::<_, Subtopic>(
            "SELECT * FROM subtopics WHERE topic_id = $1 ORDER BY name ASC",
        )
        .bind(topic_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(subtopics)
    }
}
