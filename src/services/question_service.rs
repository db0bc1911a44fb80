use crate::dto::question_dto::{CreateQuestionPayload, QuestionListQuery, UpdateQuestionPayload};
use crate::error::{Error, Result};
use crate::models::question::Question;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, serde::Serialize)]
pub struct PaginatedQuestions {
    #[serde(rename = "items")]
    pub questions: Vec<Question>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Clone)]
pub struct QuestionService {
    pool: PgPool,
}

impl QuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateQuestionPayload, created_by: Uuid) -> Result<Question> {
        let question = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (subject_id, topic_id, subtopic_id, difficulty, text, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(payload.subject_id)
        .bind(payload.topic_id)
        .bind(payload.subtopic_id)
        .bind(payload.difficulty.unwrap_or_else(|| "medium".to_string()))
        .bind(&payload.text)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(question)
    }

    pub async fn get_by_id(&self, question_id: Uuid) -> Result<Question> {
        let question = sqlx::query_as::<_, Question>("SELECT * FROM questions WHERE id = $1")
            .bind(question_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(question)
    }

    /// Questions remain editable only by their owning user once created.
    pub async fn update(
        &self,
        question_id: Uuid,
        payload: UpdateQuestionPayload,
        user_id: Uuid,
    ) -> Result<Question> {
        self.require_owner(question_id, user_id).await?;

        let question = sqlx::query_as::<_, Question>(
            r#"
            UPDATE questions
            SET
                subtopic_id = COALESCE($1, subtopic_id),
                difficulty = COALESCE($2, difficulty),
                text = COALESCE($3, text),
                updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(payload.subtopic_id)
        .bind(payload.difficulty)
        .bind(payload.text)
        .bind(question_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(question)
    }

    pub async fn delete(&self, question_id: Uuid, user_id: Uuid) -> Result<bool> {
        self.require_owner(question_id, user_id).await?;

        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(question_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list(&self, query: QuestionListQuery) -> Result<PaginatedQuestions> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        let search = query.search.map(|s| format!("%{}%", s));

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM questions
            WHERE ($1::uuid IS NULL OR subject_id = $1)
              AND ($2::uuid IS NULL OR topic_id = $2)
              AND ($3::uuid IS NULL OR subtopic_id = $3)
              AND ($4::text IS NULL OR difficulty = $4)
              AND ($5::uuid IS NULL OR created_by = $5)
              AND ($6::text IS NULL OR text ILIKE $6)
            "#,
        )
        .bind(query.subject_id)
        .bind(query.topic_id)
        .bind(query.subtopic_id)
        .bind(&query.difficulty)
        .bind(query.created_by)
        .bind(&search)
        .fetch_one(&self.pool)
        .await?;

        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT * FROM questions
            WHERE ($1::uuid IS NULL OR subject_id = $1)
              AND ($2::uuid IS NULL OR topic_id = $2)
              AND ($3::uuid IS NULL OR subtopic_id = $3)
              AND ($4::text IS NULL OR difficulty = $4)
              AND ($5::uuid IS NULL OR created_by = $5)
              AND ($6::text IS NULL OR text ILIKE $6)
            ORDER BY created_at DESC
            LIMIT $7 OFFSET $8
            "#,
        )
        .bind(query.subject_id)
        .bind(query.topic_id)
        .bind(query.subtopic_id)
        .bind(&query.difficulty)
        .bind(query.created_by)
        .bind(&search)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total_pages = (total.0 as f64 / per_page as f64).ceil() as i64;

        Ok(PaginatedQuestions {
            questions,
            total: total.0,
            page,
            per_page,
            total_pages,
        })
    }

    async fn require_owner(&self, question_id: Uuid, user_id: Uuid) -> Result<()> {
        let owner: (Uuid,) = sqlx::query_as("SELECT created_by FROM questions WHERE id = $1")
            .bind(question_id)
            .fetch_one(&self.pool)
            .await?;

        if owner.0 != user_id {
            return Err(Error::Unauthorized(
                "Only the owning user may modify this question".to_string(),
            ));
        }
        Ok(())
    }
}
