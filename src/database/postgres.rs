use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::QueryAs;
use sqlx::PgPool;

use crate::dto::candidate_dto::CandidateListQuery;
use crate::error::Result;
use crate::models::candidate::{AuditStamp, Candidate, CandidateFields};
use crate::models::job::{Job, NewJob};

use super::repository::{CandidateRepository, JobRepository};

/// Editable candidate columns, in bind order.
const FIELD_COLUMNS: &[&str] = &[
    "userid",
    "username",
    "city",
    "phone",
    "email",
    "apply_position",
    "born_address",
    "gender",
    "candidate_remark",
    "bachelor_school",
    "master_school",
    "doctor_school",
    "major",
    "degree",
    "test_score_of_general_ability",
    "paper_score",
    "first_score",
    "first_learning_ability",
    "first_professional_competency",
    "first_advantage",
    "first_disadvantage",
    "first_result",
    "first_recommend_position",
    "first_interviewer",
    "first_remark",
    "second_score",
    "second_learning_ability",
    "second_professional_competency",
    "second_pursue_of_excellence",
    "second_communication_ability",
    "second_pressure_score",
    "second_advantage",
    "second_disadvantage",
    "second_result",
    "second_recommend_position",
    "second_interviewer",
    "second_remark",
    "hr_score",
    "hr_responsibility",
    "hr_communication_ability",
    "hr_logic_ability",
    "hr_potential",
    "hr_stability",
    "hr_advantage",
    "hr_disadvantage",
    "hr_result",
    "hr_interviewer",
    "hr_remark",
];

type CandidateQuery<'q> = QueryAs<'q, Postgres, Candidate, PgArguments>;

fn insert_candidate_sql() -> String {
    let columns: Vec<&str> = FIELD_COLUMNS
        .iter()
        .copied()
        .chain(["creator", "last_editor", "created_date", "modified_date"])
        .collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
    format!(
        "INSERT INTO candidates ({}) VALUES ({}) RETURNING *",
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Editable columns are overwritten. A creator already on the row is kept,
/// and `modified_date` never moves backwards, so concurrent saves cannot
/// undo each other's audit values.
fn update_candidate_sql() -> String {
    let fields = FIELD_COLUMNS.len();
    let mut assignments: Vec<String> = FIELD_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ${}", column, i + 2))
        .collect();
    assignments.push(format!(
        "creator = COALESCE(NULLIF(creator, ''), ${})",
        fields + 2
    ));
    assignments.push(format!("last_editor = ${}", fields + 3));
    assignments.push(format!(
        "modified_date = GREATEST(${}, modified_date + INTERVAL '1 microsecond')",
        fields + 4
    ));
    format!(
        "UPDATE candidates SET {} WHERE id = $1 RETURNING *",
        assignments.join(", ")
    )
}

/// Substring pattern for ILIKE with `%`, `_` and `\` in `text` escaped.
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// SELECT for the admin candidate list with its bind values, all text.
fn search_candidates_sql(query: &CandidateListQuery) -> (String, Vec<String>) {
    let mut filters = Vec::new();
    let mut args: Vec<String> = Vec::new();

    if let Some(q) = query.search_text() {
        let n = args.len() + 1;
        filters.push(format!(
            "(username ILIKE ${n} OR phone ILIKE ${n} OR email ILIKE ${n} OR bachelor_school ILIKE ${n})"
        ));
        args.push(like_pattern(q));
    }

    let exact = [
        ("city", query.city.clone()),
        ("first_result", query.first_result.map(|r| r.as_str().to_string())),
        ("second_result", query.second_result.map(|r| r.as_str().to_string())),
        ("hr_result", query.hr_result.map(|r| r.as_str().to_string())),
        ("first_interviewer", query.first_interviewer.clone()),
        ("second_interviewer", query.second_interviewer.clone()),
        ("hr_interviewer", query.hr_interviewer.clone()),
    ];
    for (column, value) in exact {
        if let Some(value) = value {
            filters.push(format!("{} = ${}", column, args.len() + 1));
            args.push(value);
        }
    }

    let where_clause = if filters.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", filters.join(" AND "))
    };

    let sql = format!(
        "SELECT * FROM candidates {} ORDER BY hr_result ASC NULLS FIRST, second_result ASC NULLS FIRST, first_result ASC NULLS FIRST, id",
        where_clause
    );
    (sql, args)
}

fn bind_fields<'q>(query: CandidateQuery<'q>, f: &'q CandidateFields) -> CandidateQuery<'q> {
    query
        .bind(f.userid)
        .bind(&f.username)
        .bind(&f.city)
        .bind(&f.phone)
        .bind(&f.email)
        .bind(&f.apply_position)
        .bind(&f.born_address)
        .bind(&f.gender)
        .bind(&f.candidate_remark)
        .bind(&f.bachelor_school)
        .bind(&f.master_school)
        .bind(&f.doctor_school)
        .bind(&f.major)
        .bind(&f.degree)
        .bind(f.test_score_of_general_ability)
        .bind(f.paper_score)
        .bind(f.first_score)
        .bind(f.first_learning_ability)
        .bind(f.first_professional_competency)
        .bind(&f.first_advantage)
        .bind(&f.first_disadvantage)
        .bind(f.first_result)
        .bind(&f.first_recommend_position)
        .bind(&f.first_interviewer)
        .bind(&f.first_remark)
        .bind(f.second_score)
        .bind(f.second_learning_ability)
        .bind(f.second_professional_competency)
        .bind(f.second_pursue_of_excellence)
        .bind(f.second_communication_ability)
        .bind(f.second_pressure_score)
        .bind(&f.second_advantage)
        .bind(&f.second_disadvantage)
        .bind(f.second_result)
        .bind(&f.second_recommend_position)
        .bind(&f.second_interviewer)
        .bind(&f.second_remark)
        .bind(f.hr_score)
        .bind(f.hr_responsibility)
        .bind(f.hr_communication_ability)
        .bind(f.hr_logic_ability)
        .bind(f.hr_potential)
        .bind(f.hr_stability)
        .bind(&f.hr_advantage)
        .bind(&f.hr_disadvantage)
        .bind(f.hr_result)
        .bind(&f.hr_interviewer)
        .bind(&f.hr_remark)
}

#[derive(Clone)]
pub struct PgCandidateRepository {
    pool: PgPool,
}

impl PgCandidateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CandidateRepository for PgCandidateRepository {
    async fn insert(&self, fields: &CandidateFields, audit: &AuditStamp) -> Result<Candidate> {
        let sql = insert_candidate_sql();
        let candidate = bind_fields(sqlx::query_as::<_, Candidate>(&sql), fields)
            .bind(&audit.creator)
            .bind(&audit.last_editor)
            .bind(audit.at)
            .bind(audit.at)
            .fetch_one(&self.pool)
            .await?;
        Ok(candidate)
    }

    async fn update(&self, candidate: &Candidate) -> Result<Candidate> {
        let sql = update_candidate_sql();
        let query = sqlx::query_as::<_, Candidate>(&sql).bind(candidate.id);
        let updated = bind_fields(query, &candidate.fields)
            .bind(&candidate.creator)
            .bind(&candidate.last_editor)
            .bind(candidate.modified_date)
            .fetch_one(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn get(&self, id: i64) -> Result<Option<Candidate>> {
        let candidate = sqlx::query_as::<_, Candidate>("SELECT * FROM candidates WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(candidate)
    }

    async fn list(&self) -> Result<Vec<Candidate>> {
        let candidates = sqlx::query_as::<_, Candidate>("SELECT * FROM candidates ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(candidates)
    }

    async fn search(&self, query: &CandidateListQuery) -> Result<Vec<Candidate>> {
        let (sql, args) = search_candidates_sql(query);
        let mut statement = sqlx::query_as::<_, Candidate>(&sql);
        for value in &args {
            statement = statement.bind(value);
        }
        let candidates = statement.fetch_all(&self.pool).await?;
        Ok(candidates)
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Candidate>> {
        let mut by_id: HashMap<i64, Candidate> =
            sqlx::query_as::<_, Candidate>("SELECT * FROM candidates WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(|c| (c.id, c))
                .collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM candidates")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[derive(Clone)]
pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn insert(&self, job: &NewJob) -> Result<Job> {
        let stored = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (job_type, job_name, job_city, job_responsibility, job_requirement, creator)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, job_type, job_name, job_city, job_responsibility, job_requirement,
                      creator, created_date, modified_date
            "#,
        )
        .bind(job.job_type.code())
        .bind(&job.job_name)
        .bind(job.job_city.code())
        .bind(&job.job_responsibility)
        .bind(&job.job_requirement)
        .bind(&job.creator)
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }

    async fn list_by_type(&self) -> Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, job_type, job_name, job_city, job_responsibility, job_requirement,
                   creator, created_date, modified_date
            FROM jobs
            ORDER BY job_type, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    async fn get(&self, id: i64) -> Result<Option<Job>> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, job_type, job_name, job_city, job_responsibility, job_requirement,
                   creator, created_date, modified_date
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::{StageResult, FIELD_LABELS};

    #[test]
    fn columns_follow_declared_field_order() {
        let declared: Vec<&str> = FIELD_LABELS
            .iter()
            .map(|(name, _)| *name)
            .filter(|name| {
                !matches!(*name, "creator" | "last_editor" | "created_date" | "modified_date")
            })
            .collect();
        assert_eq!(declared, FIELD_COLUMNS);
    }

    #[test]
    fn insert_binds_every_column() {
        let sql = insert_candidate_sql();
        assert!(sql.contains("$52)"));
        assert!(!sql.contains("$53"));
    }

    #[test]
    fn update_leaves_created_date_alone() {
        let sql = update_candidate_sql();
        assert!(sql.starts_with("UPDATE candidates SET userid = $2,"));
        assert!(sql.contains("hr_remark = $49,"));
        assert!(!sql.contains("created_date"));
        assert!(!sql.contains("$53"));
    }

    #[test]
    fn update_keeps_existing_creator_and_advances_modified_date() {
        let sql = update_candidate_sql();
        assert!(sql.contains("creator = COALESCE(NULLIF(creator, ''), $50)"));
        assert!(sql.contains("last_editor = $51"));
        assert!(sql.contains(
            "modified_date = GREATEST($52, modified_date + INTERVAL '1 microsecond')"
        ));
    }

    #[test]
    fn score_columns_keep_exact_values() {
        let schema = include_str!("../../migrations/20240301000000_create_jobs_and_candidates.sql");
        for column in ["paper_score", "first_score", "second_pressure_score"] {
            let line = schema
                .lines()
                .find(|l| l.trim_start().starts_with(column))
                .unwrap();
            assert!(line.contains("NUMERIC,"), "{} is declared as {}", column, line.trim());
        }
    }

    #[test]
    fn search_without_filters_orders_by_results() {
        let (sql, args) = search_candidates_sql(&CandidateListQuery::default());
        assert!(args.is_empty());
        assert!(!sql.contains("WHERE"));
        assert!(sql.ends_with(
            "ORDER BY hr_result ASC NULLS FIRST, second_result ASC NULLS FIRST, first_result ASC NULLS FIRST, id"
        ));
    }

    #[test]
    fn search_binds_filters_in_order() {
        let query = CandidateListQuery {
            q: Some("  50%_off ".into()),
            city: Some("北京".into()),
            second_result: Some(StageResult::Pass),
            hr_interviewer: Some("li".into()),
            ..Default::default()
        };
        let (sql, args) = search_candidates_sql(&query);
        assert!(sql.contains("(username ILIKE $1 OR phone ILIKE $1 OR email ILIKE $1 OR bachelor_school ILIKE $1)"));
        assert!(sql.contains("AND city = $2 AND second_result = $3 AND hr_interviewer = $4"));
        assert_eq!(args, vec![r"%50\%\_off%", "北京", "pass", "li"]);
    }
}
