//! PostgreSQL Repository Implementations

use crate::domain::attempt_state::{AttemptPolicy, AttemptRejection, AttemptState};
use crate::domain::content::validate_content;
use crate::domain::entities::{
    Attempt, CompletionRecord, CompletionSummary, PlayerSummary, Puzzle, PuzzleDetails,
};
use crate::domain::repository::{
    AttemptFilter, AttemptRecord, AttemptRepository, PuzzleFilter, PuzzleRepository,
};
use crate::domain::statistics::PuzzleStats;
use crate::domain::value_objects::{Difficulty, PuzzleType, SolveTime, Title};
use crate::error::{PuzzleError, PuzzleResult};
use chrono::{DateTime, Utc};
use kernel::id::{AttemptId, PlayerId, PuzzleId};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

const PUZZLE_COLUMNS: &str = r#"
    puzzle_id, title, puzzle_type, difficulty, xp_reward, time_limit_minutes,
    content, solution, is_active, completions_count, average_time,
    created_by, created_at, updated_at
"#;

const ATTEMPT_COLUMNS: &str = r#"
    attempt_id, puzzle_id, player_id, solution, duration_secs, is_correct,
    xp_earned, created_at
"#;

/// PostgreSQL-backed repository
#[derive(Clone)]
pub struct PgPuzzleRepository {
    pool: PgPool,
}

impl PgPuzzleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_i32(value: u32, field: &str) -> PuzzleResult<i32> {
    i32::try_from(value).map_err(|_| PuzzleError::Internal(format!("{field} out of range: {value}")))
}

fn to_u32(value: i32, field: &str) -> PuzzleResult<u32> {
    u32::try_from(value).map_err(|_| PuzzleError::CorruptRecord(format!("negative {field}: {value}")))
}

fn to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

impl PuzzleRepository for PgPuzzleRepository {
    async fn create_puzzle(&self, puzzle: &Puzzle) -> PuzzleResult<()> {
        sqlx::query(
            r#"
            INSERT INTO puzzles (
                puzzle_id, title, puzzle_type, difficulty, xp_reward, time_limit_minutes,
                content, solution, is_active, completions_count, average_time,
                created_by, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(puzzle.id.into_uuid())
        .bind(puzzle.details.title.as_str())
        .bind(puzzle.puzzle_type().code())
        .bind(puzzle.details.difficulty.code())
        .bind(to_i32(puzzle.details.xp_reward, "xp_reward")?)
        .bind(
            puzzle
                .details
                .time_limit_minutes
                .map(|m| to_i32(m, "time_limit_minutes"))
                .transpose()?,
        )
        .bind(puzzle.content.to_json())
        .bind(puzzle.content.solution_json())
        .bind(puzzle.is_active)
        .bind(to_i32(puzzle.stats.completions_count, "completions_count")?)
        .bind(puzzle.stats.average_time)
        .bind(puzzle.created_by.into_uuid())
        .bind(puzzle.created_at)
        .bind(puzzle.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(puzzle_id = %puzzle.id, "Puzzle row inserted");

        Ok(())
    }

    async fn find_puzzle(&self, id: PuzzleId) -> PuzzleResult<Option<Puzzle>> {
        let row = sqlx::query_as::<_, PuzzleRow>(&format!(
            "SELECT {PUZZLE_COLUMNS} FROM puzzles WHERE puzzle_id = $1"
        ))
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(PuzzleRow::into_puzzle).transpose()
    }

    async fn update_puzzle(&self, puzzle: &Puzzle) -> PuzzleResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE puzzles SET
                title = $2,
                puzzle_type = $3,
                difficulty = $4,
                xp_reward = $5,
                time_limit_minutes = $6,
                content = $7,
                solution = $8,
                is_active = $9,
                updated_at = $10
            WHERE puzzle_id = $1
            "#,
        )
        .bind(puzzle.id.into_uuid())
        .bind(puzzle.details.title.as_str())
        .bind(puzzle.puzzle_type().code())
        .bind(puzzle.details.difficulty.code())
        .bind(to_i32(puzzle.details.xp_reward, "xp_reward")?)
        .bind(
            puzzle
                .details
                .time_limit_minutes
                .map(|m| to_i32(m, "time_limit_minutes"))
                .transpose()?,
        )
        .bind(puzzle.content.to_json())
        .bind(puzzle.content.solution_json())
        .bind(puzzle.is_active)
        .bind(puzzle.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PuzzleError::PuzzleNotFound);
        }
        Ok(())
    }

    async fn list_puzzles(&self, filter: &PuzzleFilter) -> PuzzleResult<(Vec<Puzzle>, u64)> {
        const WHERE: &str = r#"
            WHERE ($1::TEXT IS NULL OR puzzle_type = $1)
              AND ($2::TEXT IS NULL OR difficulty = $2)
              AND ($3::BOOLEAN IS NULL OR is_active = $3)
        "#;
        let puzzle_type = filter.puzzle_type.map(|t| t.code());
        let difficulty = filter.difficulty.map(|d| d.code());

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM puzzles {WHERE}"))
            .bind(puzzle_type)
            .bind(difficulty)
            .bind(filter.is_active)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, PuzzleRow>(&format!(
            "SELECT {PUZZLE_COLUMNS} FROM puzzles {WHERE} \
             ORDER BY created_at DESC, puzzle_id LIMIT $4 OFFSET $5"
        ))
        .bind(puzzle_type)
        .bind(difficulty)
        .bind(filter.is_active)
        .bind(i64::from(filter.page.limit))
        .bind(i64::from(filter.page.offset))
        .fetch_all(&self.pool)
        .await?;

        let puzzles = rows
            .into_iter()
            .map(PuzzleRow::into_puzzle)
            .collect::<PuzzleResult<Vec<_>>>()?;
        Ok((puzzles, to_u64(total)))
    }

    async fn completion_summary(
        &self,
        puzzle_id: PuzzleId,
        recent_limit: usize,
    ) -> PuzzleResult<CompletionSummary> {
        let (fastest, slowest) = sqlx::query_as::<_, (Option<i32>, Option<i32>)>(
            r#"
            SELECT MIN(duration_secs), MAX(duration_secs)
            FROM puzzle_attempts
            WHERE puzzle_id = $1 AND is_correct
            "#,
        )
        .bind(puzzle_id.into_uuid())
        .fetch_one(&self.pool)
        .await?;

        let recent = sqlx::query_as::<_, (Uuid, i32, DateTime<Utc>)>(
            r#"
            SELECT player_id, duration_secs, created_at
            FROM puzzle_attempts
            WHERE puzzle_id = $1 AND is_correct
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(puzzle_id.into_uuid())
        .bind(i64::try_from(recent_limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        let solve_time = |secs: i32| {
            SolveTime::from_secs(i64::from(secs))
                .ok_or_else(|| PuzzleError::CorruptRecord(format!("duration_secs: {secs}")))
        };

        Ok(CompletionSummary {
            fastest: fastest.map(solve_time).transpose()?,
            slowest: slowest.map(solve_time).transpose()?,
            recent: recent
                .into_iter()
                .map(|(player_id, secs, completed_at)| {
                    Ok(CompletionRecord {
                        player_id: PlayerId::from_uuid(player_id),
                        duration: solve_time(secs)?,
                        completed_at,
                    })
                })
                .collect::<PuzzleResult<Vec<_>>>()?,
        })
    }
}

impl AttemptRepository for PgPuzzleRepository {
    async fn list_pair_attempts(
        &self,
        puzzle_id: PuzzleId,
        player_id: PlayerId,
    ) -> PuzzleResult<Vec<Attempt>> {
        let rows = sqlx::query_as::<_, AttemptRow>(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM puzzle_attempts \
             WHERE puzzle_id = $1 AND player_id = $2 \
             ORDER BY created_at DESC, attempt_id"
        ))
        .bind(puzzle_id.into_uuid())
        .bind(player_id.into_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AttemptRow::into_attempt).collect()
    }

    async fn record_attempt(
        &self,
        attempt: &Attempt,
        policy: AttemptPolicy,
    ) -> PuzzleResult<AttemptRecord> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes every submission for this puzzle until commit
        let locked = sqlx::query_as::<_, (bool, i32, Option<f64>)>(
            r#"
            SELECT is_active, completions_count, average_time
            FROM puzzles
            WHERE puzzle_id = $1
            FOR UPDATE
            "#,
        )
        .bind(attempt.puzzle_id.into_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let Some((is_active, completions_count, average_time)) = locked else {
            return Err(PuzzleError::PuzzleNotFound);
        };
        if !is_active {
            return Err(PuzzleError::PuzzleInactive);
        }

        let (count, has_correct) = sqlx::query_as::<_, (i64, bool)>(
            r#"
            SELECT COUNT(*), COALESCE(BOOL_OR(is_correct), FALSE)
            FROM puzzle_attempts
            WHERE puzzle_id = $1 AND player_id = $2
            "#,
        )
        .bind(attempt.puzzle_id.into_uuid())
        .bind(attempt.player_id.into_uuid())
        .fetch_one(&mut *tx)
        .await?;

        let count = u32::try_from(count).unwrap_or(u32::MAX);
        let state = AttemptState::from_log(count, has_correct, policy);
        if let Err(rejection) = state.admit() {
            tx.rollback().await?;
            return Ok(AttemptRecord::Rejected { rejection, state });
        }

        let inserted = sqlx::query(&format!(
            "INSERT INTO puzzle_attempts ({ATTEMPT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        ))
        .bind(attempt.id.into_uuid())
        .bind(attempt.puzzle_id.into_uuid())
        .bind(attempt.player_id.into_uuid())
        .bind(&attempt.solution)
        .bind(to_i32(attempt.duration.as_secs(), "duration_secs")?)
        .bind(attempt.is_correct)
        .bind(to_i32(attempt.xp_earned, "xp_earned")?)
        .bind(attempt.created_at)
        .execute(&mut *tx)
        .await;

        if let Err(err) = inserted {
            // The partial unique index on correct attempts backs the row lock
            if let sqlx::Error::Database(db) = &err {
                if db.is_unique_violation() {
                    tracing::warn!(
                        puzzle_id = %attempt.puzzle_id,
                        player_id = %attempt.player_id,
                        "Second correct attempt blocked by unique index"
                    );
                    return Ok(AttemptRecord::Rejected {
                        rejection: AttemptRejection::AlreadyCompleted,
                        state: AttemptState::Completed { attempts: count },
                    });
                }
            }
            return Err(err.into());
        }

        let stats = if attempt.is_correct {
            let prior = PuzzleStats::new(to_u32(completions_count, "completions_count")?, average_time);
            let next = prior.record_completion(attempt.duration);
            sqlx::query(
                r#"
                UPDATE puzzles
                SET completions_count = $2, average_time = $3
                WHERE puzzle_id = $1
                "#,
            )
            .bind(attempt.puzzle_id.into_uuid())
            .bind(to_i32(next.completions_count, "completions_count")?)
            .bind(next.average_time)
            .execute(&mut *tx)
            .await?;
            Some(next)
        } else {
            None
        };

        tx.commit().await?;

        Ok(AttemptRecord::Recorded {
            state: state.record(attempt.is_correct, policy),
            stats,
        })
    }

    async fn list_player_attempts(
        &self,
        player_id: PlayerId,
        filter: &AttemptFilter,
    ) -> PuzzleResult<(Vec<Attempt>, u64)> {
        const WHERE: &str = "WHERE player_id = $1 AND ($2::BOOLEAN IS NULL OR is_correct = $2)";

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM puzzle_attempts {WHERE}"
        ))
        .bind(player_id.into_uuid())
        .bind(filter.is_correct)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, AttemptRow>(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM puzzle_attempts {WHERE} \
             ORDER BY created_at DESC, attempt_id LIMIT $3 OFFSET $4"
        ))
        .bind(player_id.into_uuid())
        .bind(filter.is_correct)
        .bind(i64::from(filter.page.limit))
        .bind(i64::from(filter.page.offset))
        .fetch_all(&self.pool)
        .await?;

        let attempts = rows
            .into_iter()
            .map(AttemptRow::into_attempt)
            .collect::<PuzzleResult<Vec<_>>>()?;
        Ok((attempts, to_u64(total)))
    }

    async fn player_summary(&self, player_id: PlayerId) -> PuzzleResult<PlayerSummary> {
        let (total, correct, total_xp, average_time) =
            sqlx::query_as::<_, (i64, i64, i64, Option<f64>)>(
                r#"
                SELECT
                    COUNT(*),
                    COUNT(*) FILTER (WHERE is_correct),
                    COALESCE(SUM(xp_earned), 0)::BIGINT,
                    AVG(duration_secs)::DOUBLE PRECISION
                FROM puzzle_attempts
                WHERE player_id = $1
                "#,
            )
            .bind(player_id.into_uuid())
            .fetch_one(&self.pool)
            .await?;

        Ok(PlayerSummary {
            total_attempts: to_u64(total),
            correct_attempts: to_u64(correct),
            total_xp: to_u64(total_xp),
            average_time,
        })
    }
}

// Internal row types for sqlx mapping
#[derive(sqlx::FromRow)]
struct PuzzleRow {
    puzzle_id: Uuid,
    title: String,
    puzzle_type: String,
    difficulty: String,
    xp_reward: i32,
    time_limit_minutes: Option<i32>,
    content: Value,
    solution: Option<Value>,
    is_active: bool,
    completions_count: i32,
    average_time: Option<f64>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PuzzleRow {
    fn into_puzzle(self) -> PuzzleResult<Puzzle> {
        let corrupt = |what: String| {
            tracing::error!(puzzle_id = %self.puzzle_id, what = %what, "Corrupt puzzle row");
            PuzzleError::CorruptRecord(what)
        };

        let puzzle_type = PuzzleType::from_code(&self.puzzle_type)
            .ok_or_else(|| corrupt(format!("unknown puzzle type '{}'", self.puzzle_type)))?;
        let difficulty = Difficulty::from_code(&self.difficulty)
            .ok_or_else(|| corrupt(format!("unknown difficulty '{}'", self.difficulty)))?;
        let title = Title::new(&self.title).map_err(corrupt)?;
        let content = validate_content(puzzle_type, &self.content, self.solution.as_ref())
            .map_err(|e| corrupt(format!("content no longer validates: {e}")))?;

        Ok(Puzzle {
            id: PuzzleId::from_uuid(self.puzzle_id),
            details: PuzzleDetails {
                title,
                difficulty,
                xp_reward: to_u32(self.xp_reward, "xp_reward")?,
                time_limit_minutes: self
                    .time_limit_minutes
                    .map(|m| to_u32(m, "time_limit_minutes"))
                    .transpose()?,
            },
            content,
            is_active: self.is_active,
            stats: PuzzleStats::new(
                to_u32(self.completions_count, "completions_count")?,
                self.average_time,
            ),
            created_by: PlayerId::from_uuid(self.created_by),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AttemptRow {
    attempt_id: Uuid,
    puzzle_id: Uuid,
    player_id: Uuid,
    solution: Value,
    duration_secs: i32,
    is_correct: bool,
    xp_earned: i32,
    created_at: DateTime<Utc>,
}

impl AttemptRow {
    fn into_attempt(self) -> PuzzleResult<Attempt> {
        let duration = SolveTime::from_secs(i64::from(self.duration_secs)).ok_or_else(|| {
            PuzzleError::CorruptRecord(format!("duration_secs: {}", self.duration_secs))
        })?;
        Ok(Attempt {
            id: AttemptId::from_uuid(self.attempt_id),
            puzzle_id: PuzzleId::from_uuid(self.puzzle_id),
            player_id: PlayerId::from_uuid(self.player_id),
            solution: self.solution,
            duration,
            is_correct: self.is_correct,
            xp_earned: to_u32(self.xp_earned, "xp_earned")?,
            created_at: self.created_at,
        })
    }
}
