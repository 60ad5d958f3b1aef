use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{OffboardEmployee, OffboardingRecord, ProbationEvaluation, ProbationReview},
};

pub struct CareerRepository;

impl CareerRepository {
    pub async fn insert_probation_evaluation(
        tx: &mut Transaction<'_, Postgres>,
        employee_id: Uuid,
        review: &ProbationReview,
    ) -> AppResult<ProbationEvaluation> {
        let evaluation = sqlx::query_as::<_, ProbationEvaluation>(
            r#"
            INSERT INTO probation_evaluations
                (employee_id, outcome, evaluator_id, comments, extended_until)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, employee_id, outcome, evaluator_id, comments, extended_until, created_at
            "#,
        )
        .bind(employee_id)
        .bind(review.outcome)
        .bind(review.evaluator_id)
        .bind(&review.comments)
        .bind(review.extended_until)
        .fetch_one(&mut **tx)
        .await?;

        Ok(evaluation)
    }

    pub async fn insert_offboarding_record(
        tx: &mut Transaction<'_, Postgres>,
        employee_id: Uuid,
        input: &OffboardEmployee,
    ) -> AppResult<OffboardingRecord> {
        let record = sqlx::query_as::<_, OffboardingRecord>(
            r#"
            INSERT INTO offboarding_records (employee_id, reason, last_working_day, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING id, employee_id, reason, last_working_day, notes, created_at
            "#,
        )
        .bind(employee_id)
        .bind(input.reason)
        .bind(input.last_working_day)
        .bind(&input.notes)
        .fetch_one(&mut **tx)
        .await?;

        Ok(record)
    }
}
