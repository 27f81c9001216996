//! Learner-facing handlers: per-block interaction and lesson progress.
//!
//! Interaction state lives in `block_progress`, one row per learner and
//! block. The plugin view owns every transition; these handlers only load
//! the row, hand it to the view, and persist what comes back.
//!
//! Blocks with a `time_limit_secs` setting are timed. Their countdown runs
//! from `started_at` on the progress row. Once it has run out, answers are
//! only accepted through the timeout endpoint, which submits the current
//! selection exactly once.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use gonasi_core::error::CoreError;
use gonasi_core::interaction::timer::{elapsed_secs, Countdown, CountdownEvent};
use gonasi_core::plugins::{auto_submit, InteractionOutcome, ACTION_RESET};
use gonasi_core::progress::{summarize_lesson, BlockResult, LessonProgress};
use gonasi_core::settings::{BlockSettings, DEFAULT_WEIGHT};
use gonasi_core::types::DbId;
use gonasi_db::models::block::Block;
use gonasi_db::models::block_progress::{BlockProgress, UpsertBlockProgress};
use gonasi_db::repositories::{BlockProgressRepo, BlockRepo};
use serde_json::Value;

use super::block::find_block;
use super::lesson::find_lesson;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/blocks/{id}/interaction
///
/// The first visit stores the fresh state so shuffled orders stay put.
pub async fn get_interaction(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<InteractionOutcome>>> {
    let block = find_block(&state, id).await?;
    let view = state.registry.view(&block.plugin_type)?;
    let progress = BlockProgressRepo::find(&state.pool, user.user_id, id).await?;

    let outcome = view.snapshot(
        &block.content,
        &block.settings,
        progress.as_ref().map(|p| &p.state),
        &mut rand::rng(),
    )?;

    if progress.as_ref().map_or(true, |p| p.state != outcome.state) {
        save_progress(&state, user.user_id, &block, &outcome, TimerUpdate::Keep).await?;
    }
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/blocks/{id}/interaction
///
/// Body is one action, e.g. `{ "type": "select", "choice_index": 2 }`.
pub async fn interact(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(action): Json<Value>,
) -> AppResult<Json<DataResponse<InteractionOutcome>>> {
    let block = find_block(&state, id).await?;
    let view = state.registry.view(&block.plugin_type)?;
    let progress = BlockProgressRepo::find(&state.pool, user.user_id, id).await?;
    let now = Utc::now();

    let is_reset = action.get("type").and_then(Value::as_str) == Some(ACTION_RESET);
    if !is_reset {
        if let (Some(limit), Some(progress)) = (time_limit(&block), progress.as_ref()) {
            let mut countdown = Countdown::resume(limit, progress.timed_out_at.is_some());
            if !matches!(
                countdown.tick(elapsed_secs(progress.started_at, now)),
                CountdownEvent::Running { .. }
            ) {
                return Err(AppError::Core(CoreError::Conflict(
                    "Time limit reached for this block".into(),
                )));
            }
        }
    }

    let outcome = view.interact(
        &block.content,
        &block.settings,
        progress.as_ref().map(|p| &p.state),
        &action,
        now,
        &mut rand::rng(),
    )?;

    if outcome.changed || progress.is_none() {
        let timer = if is_reset {
            TimerUpdate::Restart
        } else {
            TimerUpdate::Keep
        };
        save_progress(&state, user.user_id, &block, &outcome, timer).await?;
        tracing::info!(
            user_id = user.user_id,
            block_id = id,
            phase = ?outcome.phase,
            score = ?outcome.score,
            "Interaction applied"
        );
    }
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/blocks/{id}/interaction/timeout
///
/// The block's countdown ran out: check whatever is currently selected.
/// Rejected with 409 while the countdown is still running. Repeated calls
/// after expiry return the current state without submitting again.
pub async fn timeout(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<InteractionOutcome>>> {
    let block = find_block(&state, id).await?;
    let view = state.registry.view(&block.plugin_type)?;
    let limit = time_limit(&block).ok_or(AppError::Core(CoreError::Validation(
        "Block has no time limit".into(),
    )))?;
    let progress = BlockProgressRepo::find(&state.pool, user.user_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::Conflict(
            "Countdown has not started for this block".into(),
        )))?;

    let now = Utc::now();
    let mut countdown = Countdown::resume(limit, progress.timed_out_at.is_some());
    match countdown.tick(elapsed_secs(progress.started_at, now)) {
        CountdownEvent::Running { remaining_secs } => Err(AppError::Core(CoreError::Conflict(
            format!("Countdown still running: {remaining_secs}s remaining"),
        ))),
        CountdownEvent::Finished => {
            let outcome = view.snapshot(
                &block.content,
                &block.settings,
                Some(&progress.state),
                &mut rand::rng(),
            )?;
            Ok(Json(DataResponse { data: outcome }))
        }
        CountdownEvent::Expired => {
            let outcome = auto_submit(
                view.as_ref(),
                &block.content,
                &block.settings,
                Some(&progress.state),
                now,
                &mut rand::rng(),
            )?;
            save_progress(&state, user.user_id, &block, &outcome, TimerUpdate::Expire).await?;
            tracing::info!(
                user_id = user.user_id,
                block_id = id,
                phase = ?outcome.phase,
                "Timed block auto-submitted"
            );
            Ok(Json(DataResponse { data: outcome }))
        }
    }
}

/// DELETE /api/v1/blocks/{id}/interaction
///
/// Forget the caller's progress; the next GET starts fresh.
pub async fn reset(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_block(&state, id).await?;
    if BlockProgressRepo::delete(&state.pool, user.user_id, id).await? {
        tracing::info!(user_id = user.user_id, block_id = id, "Block progress reset");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/lessons/{id}/progress
pub async fn lesson_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LessonProgress>>> {
    find_lesson(&state, id).await?;
    let blocks = BlockRepo::list_by_lesson(&state.pool, id).await?;
    let progress: HashMap<DbId, BlockProgress> =
        BlockProgressRepo::list_for_lesson(&state.pool, user.user_id, id)
            .await?
            .into_iter()
            .map(|p| (p.block_id, p))
            .collect();

    let results: Vec<BlockResult> = blocks
        .iter()
        .map(|block| {
            let entry = progress.get(&block.id);
            let is_complete = entry.is_some_and(|p| p.is_complete);
            BlockResult {
                block_id: block.id,
                weight: BlockSettings::parse(Some(&block.settings))
                    .map(|s| s.weight)
                    .unwrap_or(DEFAULT_WEIGHT),
                is_complete,
                score: entry
                    .filter(|_| is_complete)
                    .and_then(|p| p.score)
                    .and_then(|s| u8::try_from(s).ok()),
            }
        })
        .collect();

    Ok(Json(DataResponse {
        data: summarize_lesson(&results),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// What a progress write does to the block's countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerUpdate {
    Keep,
    /// A reset starts a new attempt with a fresh countdown.
    Restart,
    /// The countdown ran out on this request.
    Expire,
}

/// Countdown length of a timed block. Settings were validated on write, so
/// unreadable settings count as untimed.
fn time_limit(block: &Block) -> Option<u32> {
    BlockSettings::parse(Some(&block.settings))
        .ok()
        .and_then(|s| s.time_limit_secs)
}

async fn save_progress(
    state: &AppState,
    user_id: DbId,
    block: &Block,
    outcome: &InteractionOutcome,
    timer: TimerUpdate,
) -> AppResult<()> {
    BlockProgressRepo::upsert(
        &state.pool,
        &UpsertBlockProgress {
            user_id,
            block_id: block.id,
            lesson_id: block.lesson_id,
            plugin_type: block.plugin_type.clone(),
            state: outcome.state.clone(),
            score: outcome.score.map(i16::from),
            attempts: i32::try_from(outcome.attempts).unwrap_or(i32::MAX),
            is_complete: outcome.is_complete,
            restart_timer: timer == TimerUpdate::Restart,
            timed_out: timer == TimerUpdate::Expire,
        },
    )
    .await?;
    Ok(())
}
