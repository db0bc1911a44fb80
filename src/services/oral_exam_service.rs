use crate::dto::oral_exam_dto::{
    AssignmentDetail, CreateOralExamPayload, GroupDetail, OralExamDetail, StudentDetail,
    ValidationReport,
};
use crate::error::{Error, Result};
use crate::models::oral_exam::{
    OralExamGroup, OralExamSet, OralExamStudent, OralExamStudentQuestion, EVALUATION_STATUSES,
};
use crate::models::question::Question;
use crate::services::allocation::{
    self, replacement_candidates, PoolQuestion, QuestionPool, SubtopicKey,
};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use tracing::info;
use uuid::Uuid;

/// Seed used when the payload omits one. The dry run and creation must
/// resolve an omitted seed to the same value: with uneven bucket depths,
/// allocation feasibility depends on the shuffle, so a configuration
/// validated under one seed can exhaust under another.
const DEFAULT_SEED: i64 = 0;

fn effective_seed(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_SEED)
}

#[derive(Clone)]
pub struct OralExamService {
    pool: PgPool,
}

impl OralExamService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Dry run: same planning and assignment as `create`, nothing persisted.
    pub async fn validate(
        &self,
        payload: &CreateOralExamPayload,
        user_id: Uuid,
    ) -> Result<ValidationReport> {
        let questions = self
            .load_pool(payload.subject_id, &payload.topic_ids, user_id)
            .await?;
        let seed = effective_seed(payload.seed);

        let (plan, _slots) = allocation::allocate(
            &questions,
            payload.total_students,
            payload.num_groups,
            payload.students_per_group,
            payload.questions_per_student,
            seed as u64,
        )?;

        let pool = QuestionPool::index(&questions);
        let warnings = plan
            .overshoot
            .map(|o| vec![o.message()])
            .unwrap_or_default();

        Ok(ValidationReport {
            group_sizes: plan.sizes,
            seats: plan.seats,
            subtopics_available: pool.subtopic_count(),
            questions_available: pool.question_count(),
            warnings,
        })
    }

    /// Creates the set, its groups, students and every (student, question,
    /// round) assignment in one transaction. Any allocation error fires
    /// before the transaction opens, so a failed creation leaves no rows.
    pub async fn create(
        &self,
        payload: &CreateOralExamPayload,
        user_id: Uuid,
    ) -> Result<(OralExamDetail, Vec<String>)> {
        let questions = self
            .load_pool(payload.subject_id, &payload.topic_ids, user_id)
            .await?;
        let seed = effective_seed(payload.seed);

        let (plan, slots) = allocation::allocate(
            &questions,
            payload.total_students,
            payload.num_groups,
            payload.students_per_group,
            payload.questions_per_student,
            seed as u64,
        )?;

        let mut tx = self.pool.begin().await?;

        let set = sqlx::query_as::<_, OralExamSet>(
            r#"
            INSERT INTO oral_exam_sets (
                title, subject_id, topic_ids, total_students, num_groups,
                students_per_group, questions_per_student, seed, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&payload.title)
        .bind(payload.subject_id)
        .bind(&payload.topic_ids)
        .bind(payload.total_students)
        .bind(payload.num_groups)
        .bind(payload.students_per_group)
        .bind(payload.questions_per_student)
        .bind(seed)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut student_ids: HashMap<(i32, i32), Uuid> = HashMap::new();
        for (group_index, &size) in plan.sizes.iter().enumerate() {
            let group_number = group_index as i32 + 1;
            let group = sqlx::query_as::<_, OralExamGroup>(
                r#"
                INSERT INTO oral_exam_groups (set_id, group_number, student_count)
                VALUES ($1, $2, $3)
                RETURNING *
                "#,
            )
            .bind(set.id)
            .bind(group_number)
            .bind(size)
            .fetch_one(&mut *tx)
            .await?;

            for student_number in 1..=size {
                let student: (Uuid,) = sqlx::query_as(
                    r#"
                    INSERT INTO oral_exam_students (group_id, student_number)
                    VALUES ($1, $2)
                    RETURNING id
                    "#,
                )
                .bind(group.id)
                .bind(student_number)
                .fetch_one(&mut *tx)
                .await?;
                student_ids.insert((group_number, student_number), student.0);
            }
        }

        for slot in &slots {
            let student_id = student_ids
                .get(&(slot.group_number, slot.student_number))
                .copied()
                .ok_or_else(|| {
                    Error::Internal("Assignment slot points at an unknown student".to_string())
                })?;
            sqlx::query(
                r#"
                INSERT INTO oral_exam_student_questions (student_id, question_id, round_order)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(student_id)
            .bind(slot.question_id)
            .bind(slot.round)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            set_id = %set.id,
            groups = plan.sizes.len(),
            assignments = slots.len(),
            "oral exam set created"
        );

        let warnings = plan
            .overshoot
            .map(|o| vec![o.message()])
            .unwrap_or_default();
        let detail = self.get_detail(set.id).await?;
        Ok((detail, warnings))
    }

    pub async fn list(&self, created_by: Option<Uuid>) -> Result<Vec<OralExamSet>> {
        let sets = sqlx::query_as::<_, OralExamSet>(
            r#"
            SELECT * FROM oral_exam_sets
            WHERE ($1::uuid IS NULL OR created_by = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(created_by)
        .fetch_all(&self.pool)
        .await?;

        Ok(sets)
    }

    pub async fn get_detail(&self, set_id: Uuid) -> Result<OralExamDetail> {
        let set = sqlx::query_as::<_, OralExamSet>("SELECT * FROM oral_exam_sets WHERE id = $1")
            .bind(set_id)
            .fetch_one(&self.pool)
            .await?;

        let groups = sqlx::query_as::<_, OralExamGroup>(
            "SELECT * FROM oral_exam_groups WHERE set_id = $1 ORDER BY group_number",
        )
        .bind(set_id)
        .fetch_all(&self.pool)
        .await?;

        let students = sqlx::query_as::<_, OralExamStudent>(
            r#"
            SELECT s.* FROM oral_exam_students s
            JOIN oral_exam_groups g ON s.group_id = g.id
            WHERE g.set_id = $1
            ORDER BY s.student_number
            "#,
        )
        .bind(set_id)
        .fetch_all(&self.pool)
        .await?;

        let assignments = sqlx::query_as::<_, AssignmentDetail>(
            r#"
            SELECT sq.id, sq.student_id, sq.question_id, sq.round_order, sq.evaluation,
                   q.text AS question_text
            FROM oral_exam_student_questions sq
            JOIN oral_exam_students s ON sq.student_id = s.id
            JOIN oral_exam_groups g ON s.group_id = g.id
            JOIN questions q ON sq.question_id = q.id
            WHERE g.set_id = $1
            ORDER BY sq.round_order
            "#,
        )
        .bind(set_id)
        .fetch_all(&self.pool)
        .await?;

        let mut by_student: HashMap<Uuid, Vec<AssignmentDetail>> = HashMap::new();
        for a in assignments {
            by_student.entry(a.student_id).or_default().push(a);
        }
        let mut by_group: HashMap<Uuid, Vec<StudentDetail>> = HashMap::new();
        for student in students {
            let assignments = by_student.remove(&student.id).unwrap_or_default();
            by_group
                .entry(student.group_id)
                .or_default()
                .push(StudentDetail {
                    student,
                    assignments,
                });
        }

        let groups = groups
            .into_iter()
            .map(|group| {
                let students = by_group.remove(&group.id).unwrap_or_default();
                GroupDetail { group, students }
            })
            .collect();

        Ok(OralExamDetail { set, groups })
    }

    /// Database-level cascade takes the groups, students and assignments.
    /// Only the owning user may delete a set.
    pub async fn delete(&self, set_id: Uuid, user_id: Uuid) -> Result<bool> {
        let owner: Option<(Uuid,)> =
            sqlx::query_as("SELECT created_by FROM oral_exam_sets WHERE id = $1")
                .bind(set_id)
                .fetch_optional(&self.pool)
                .await?;
        let Some((created_by,)) = owner else {
            return Ok(false);
        };
        if created_by != user_id {
            return Err(Error::Unauthorized(
                "Only the owning user may delete this oral exam set".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM oral_exam_sets WHERE id = $1")
            .bind(set_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn update_student_name(
        &self,
        student_id: Uuid,
        full_name: &str,
        user_id: Uuid,
    ) -> Result<OralExamStudent> {
        self.require_student_owner(student_id, user_id).await?;

        let student = sqlx::query_as::<_, OralExamStudent>(
            "UPDATE oral_exam_students SET full_name = $1 WHERE id = $2 RETURNING *",
        )
        .bind(full_name)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(student)
    }

    pub async fn evaluate(
        &self,
        assignment_id: Uuid,
        evaluation: &str,
        user_id: Uuid,
    ) -> Result<OralExamStudentQuestion> {
        if !EVALUATION_STATUSES.contains(&evaluation) {
            return Err(Error::BadRequest(format!(
                "Unknown evaluation '{}', expected one of {:?}",
                evaluation, EVALUATION_STATUSES
            )));
        }

        let ctx = self.assignment_context(assignment_id).await?;
        if ctx.created_by != user_id {
            return Err(Error::Unauthorized(
                "Only the owning user may evaluate this assignment".to_string(),
            ));
        }

        let assignment = sqlx::query_as::<_, OralExamStudentQuestion>(
            r#"
            UPDATE oral_exam_student_questions
            SET evaluation = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(evaluation)
        .bind(assignment_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(assignment)
    }

    /// Questions that could replace an assigned one without breaking the
    /// group's invariants, as full rows for display.
    pub async fn alternatives(&self, assignment_id: Uuid) -> Result<Vec<Question>> {
        let ctx = self.assignment_context(assignment_id).await?;
        let candidates = self.candidate_ids(&ctx, assignment_id).await?;
        if candidates.is_empty() {
            return Ok(vec![]);
        }

        let questions = sqlx::query_as::<_, Question>(
            "SELECT * FROM questions WHERE id = ANY($1) ORDER BY id",
        )
        .bind(&candidates)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    /// Swaps an assigned question for an eligible replacement. Fails with
    /// `SwapUnavailable` (original untouched) when nothing qualifies.
    pub async fn exchange(
        &self,
        assignment_id: Uuid,
        replacement_question_id: Option<Uuid>,
        user_id: Uuid,
    ) -> Result<OralExamStudentQuestion> {
        let ctx = self.assignment_context(assignment_id).await?;
        if ctx.created_by != user_id {
            return Err(Error::Unauthorized(
                "Only the owning user may exchange this assignment".to_string(),
            ));
        }

        let candidates = self.candidate_ids(&ctx, assignment_id).await?;
        if candidates.is_empty() {
            return Err(Error::SwapUnavailable);
        }

        let replacement = match replacement_question_id {
            Some(id) => {
                if !candidates.contains(&id) {
                    return Err(Error::BadRequest(
                        "Requested replacement is not eligible for this slot".to_string(),
                    ));
                }
                id
            }
            // Candidates come back sorted by id; the first is the
            // deterministic automatic pick.
            None => candidates[0],
        };

        let updated = sqlx::query_as::<_, OralExamStudentQuestion>(
            r#"
            UPDATE oral_exam_student_questions
            SET question_id = $1, evaluation = 'pending', updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(replacement)
        .bind(assignment_id)
        .fetch_one(&self.pool)
        .await?;

        info!(assignment_id = %assignment_id, replacement = %replacement, "assignment exchanged");
        Ok(updated)
    }

    async fn candidate_ids(
        &self,
        ctx: &AssignmentContext,
        assignment_id: Uuid,
    ) -> Result<Vec<Uuid>> {
        let pool_questions = self
            .load_pool(ctx.subject_id, &ctx.topic_ids, ctx.created_by)
            .await?;

        let used: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT sq.question_id
            FROM oral_exam_student_questions sq
            JOIN oral_exam_students s ON sq.student_id = s.id
            WHERE s.group_id = $1
            "#,
        )
        .bind(ctx.group_id)
        .fetch_all(&self.pool)
        .await?;
        let used_in_group: HashSet<Uuid> = used.into_iter().map(|r| r.0).collect();

        let round_peers: Vec<(Uuid, Option<Uuid>)> = sqlx::query_as(
            r#"
            SELECT q.topic_id, q.subtopic_id
            FROM oral_exam_student_questions sq
            JOIN oral_exam_students s ON sq.student_id = s.id
            JOIN questions q ON sq.question_id = q.id
            WHERE s.group_id = $1 AND sq.round_order = $2 AND sq.id <> $3
            "#,
        )
        .bind(ctx.group_id)
        .bind(ctx.round_order)
        .bind(assignment_id)
        .fetch_all(&self.pool)
        .await?;
        let blocked_keys: HashSet<SubtopicKey> = round_peers
            .into_iter()
            .map(|(topic_id, subtopic_id)| match subtopic_id {
                Some(id) => SubtopicKey::Subtopic(id),
                None => SubtopicKey::Topic(topic_id),
            })
            .collect();

        Ok(replacement_candidates(
            &pool_questions,
            &used_in_group,
            &blocked_keys,
            ctx.question_id,
        ))
    }

    async fn assignment_context(&self, assignment_id: Uuid) -> Result<AssignmentContext> {
        let row: Option<AssignmentContext> = sqlx::query_as(
            r#"
            SELECT sq.question_id, sq.round_order, s.group_id,
                   es.subject_id, es.topic_ids, es.created_by
            FROM oral_exam_student_questions sq
            JOIN oral_exam_students s ON sq.student_id = s.id
            JOIN oral_exam_groups g ON s.group_id = g.id
            JOIN oral_exam_sets es ON g.set_id = es.id
            WHERE sq.id = $1
            "#,
        )
        .bind(assignment_id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| Error::NotFound("Assignment not found".to_string()))
    }

    async fn require_student_owner(&self, student_id: Uuid, user_id: Uuid) -> Result<()> {
        let owner: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT es.created_by
            FROM oral_exam_students s
            JOIN oral_exam_groups g ON s.group_id = g.id
            JOIN oral_exam_sets es ON g.set_id = es.id
            WHERE s.id = $1
            "#,
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        match owner {
            None => Err(Error::NotFound("Student not found".to_string())),
            Some((created_by,)) if created_by != user_id => Err(Error::Unauthorized(
                "Only the owning user may rename this student".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }

    async fn load_pool(
        &self,
        subject_id: Uuid,
        topic_ids: &[Uuid],
        created_by: Uuid,
    ) -> Result<Vec<PoolQuestion>> {
        let rows: Vec<(Uuid, Uuid, Option<Uuid>)> = sqlx::query_as(
            r#"
            SELECT id, topic_id, subtopic_id
            FROM questions
            WHERE subject_id = $1 AND topic_id = ANY($2) AND created_by = $3
            "#,
        )
        .bind(subject_id)
        .bind(topic_ids)
        .bind(created_by)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, topic_id, subtopic_id)| PoolQuestion {
                id,
                topic_id,
                subtopic_id,
            })
            .collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AssignmentContext {
    question_id: Uuid,
    round_order: i32,
    group_id: Uuid,
    subject_id: Uuid,
    topic_ids: Vec<Uuid>,
    created_by: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_seed_resolves_identically_for_dry_run_and_creation() {
        assert_eq!(effective_seed(None), DEFAULT_SEED);
        assert_eq!(effective_seed(None), effective_seed(None));
        assert_eq!(effective_seed(Some(42)), 42);
    }
}
