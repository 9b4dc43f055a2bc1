// src/db/reaction_repository.rs
// DOCUMENTATION: Like/dislike toggling shared by reviews and replies
// PURPOSE: Insert, flip or remove one user's reaction, then recount

use crate::errors::HubError;
use crate::models::{Reaction, ReactionCounts};
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Which reaction table to operate on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionTarget {
    Review,
    Reply,
}

impl ReactionTarget {
    fn table(&self) -> &'static str {
        match self {
            ReactionTarget::Review => "review_likes",
            ReactionTarget::Reply => "reply_likes",
        }
    }

    fn column(&self) -> &'static str {
        match self {
            ReactionTarget::Review => "review_id",
            ReactionTarget::Reply => "reply_id",
        }
    }
}

/// What a toggle did to the stored row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Switched,
    Removed,
}

/// Decide the toggle branch from the existing row
pub fn toggle_outcome(existing: Option<Reaction>, requested: Reaction) -> ToggleOutcome {
    match existing {
        None => ToggleOutcome::Added,
        Some(current) if current == requested => ToggleOutcome::Removed,
        Some(_) => ToggleOutcome::Switched,
    }
}

fn db_error(context: &str, e: sqlx::Error) -> HubError {
    log::error!("{}: {}", context, e);
    HubError::DatabaseError(format!("{}: {}", context, e))
}

pub struct ReactionRepository;

impl ReactionRepository {
    /// Toggle a reaction and return the recomputed counts
    /// DOCUMENTATION: No row inserts, same type deletes, other type updates
    pub async fn toggle(
        pool: &SqlitePool,
        target: ReactionTarget,
        target_id: i64,
        user_id: i64,
        requested: Reaction,
    ) -> Result<ReactionCounts, HubError> {
        let table = target.table();
        let column = target.column();

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| db_error("Begin transaction failed", e))?;

        let existing: Option<(Reaction,)> = sqlx::query_as(&format!(
            "SELECT like_type FROM {} WHERE {} = $1 AND user_id = $2",
            table, column
        ))
        .bind(target_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Fetch reaction failed", e))?;

        let outcome = toggle_outcome(existing.map(|r| r.0), requested);

        let result = match outcome {
            ToggleOutcome::Added => {
                sqlx::query(&format!(
                    "INSERT INTO {} ({}, user_id, like_type, created_at) VALUES ($1, $2, $3, $4)",
                    table, column
                ))
                .bind(target_id)
                .bind(user_id)
                .bind(requested)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await
            }
            ToggleOutcome::Switched => {
                sqlx::query(&format!(
                    "UPDATE {} SET like_type = $3, created_at = $4 WHERE {} = $1 AND user_id = $2",
                    table, column
                ))
                .bind(target_id)
                .bind(user_id)
                .bind(requested)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await
            }
            ToggleOutcome::Removed => {
                sqlx::query(&format!(
                    "DELETE FROM {} WHERE {} = $1 AND user_id = $2",
                    table, column
                ))
                .bind(target_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
            }
        };
        result.map_err(|e| db_error("Toggle reaction failed", e))?;

        let (likes, dislikes) = Self::counts_in(&mut tx, target, target_id).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Commit failed", e))?;

        log::debug!(
            "{} {} reaction {:?} by user {} -> {:?}",
            table,
            target_id,
            requested,
            user_id,
            outcome
        );

        Ok(ReactionCounts {
            likes,
            dislikes,
            user_reaction: match outcome {
                ToggleOutcome::Removed => None,
                _ => Some(requested),
            },
        })
    }

    async fn counts_in(
        tx: &mut Transaction<'_, Sqlite>,
        target: ReactionTarget,
        target_id: i64,
    ) -> Result<(i64, i64), HubError> {
        sqlx::query_as::<_, (i64, i64)>(&format!(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN like_type = 'like' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN like_type = 'dislike' THEN 1 ELSE 0 END), 0)
            FROM {}
            WHERE {} = $1
            "#,
            target.table(),
            target.column()
        ))
        .bind(target_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| db_error("Count reactions failed", e))
    }
}
