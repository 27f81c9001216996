//! Lesson progress summary computed from per-block results.

use serde::Serialize;

use crate::types::DbId;

/// One block of a lesson, in lesson order, with the learner's result.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockResult {
    pub block_id: DbId,
    pub weight: u8,
    pub is_complete: bool,
    /// `None` until the block is complete.
    pub score: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LessonProgress {
    pub total_blocks: usize,
    pub completed_blocks: usize,
    pub completion_percentage: f64,
    /// Weight-averaged score over all blocks; incomplete blocks count as 0.
    pub weighted_score: f64,
    /// First incomplete block, `None` once the lesson is done.
    pub active_block_id: Option<DbId>,
    pub is_complete: bool,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn summarize_lesson(blocks: &[BlockResult]) -> LessonProgress {
    let total_blocks = blocks.len();
    let completed_blocks = blocks.iter().filter(|b| b.is_complete).count();

    let completion_percentage = if total_blocks == 0 {
        0.0
    } else {
        round2(completed_blocks as f64 * 100.0 / total_blocks as f64)
    };

    let total_weight: u32 = blocks.iter().map(|b| u32::from(b.weight)).sum();
    let weighted_sum: u32 = blocks
        .iter()
        .filter(|b| b.is_complete)
        .map(|b| u32::from(b.score.unwrap_or(0)) * u32::from(b.weight))
        .sum();
    let weighted_score = if total_weight == 0 {
        0.0
    } else {
        round2(f64::from(weighted_sum) / f64::from(total_weight))
    };

    LessonProgress {
        total_blocks,
        completed_blocks,
        completion_percentage,
        weighted_score,
        active_block_id: blocks.iter().find(|b| !b.is_complete).map(|b| b.block_id),
        is_complete: total_blocks > 0 && completed_blocks == total_blocks,
    }
}
