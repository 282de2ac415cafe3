// ========================================================================================
//
//                      The pipeline: standardize, classify, price
//
// ========================================================================================
//
// Each idea flows through the scaler, the classifier and the price optimizer independently
// of every other idea. Output order mirrors input order exactly. Large batches fan out
// across the rayon pool; small ones stay on the calling thread.

use crate::model::Model;
use crate::price::{self, coerce_unit_cost};
use crate::scaler::ScaleError;
use crate::types::{Idea, ScoredIdea};
use rayon::prelude::*;
use thiserror::Error;

/// Batches at or above this size are scored in parallel by default.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1024;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to standardize idea #{index}: {source}")]
    Standardize {
        index: usize,
        #[source]
        source: ScaleError,
    },
}

/// Scores batches of ideas against one read-only model.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'m> {
    model: &'m Model,
    unit_cost: f64,
    parallel_threshold: usize,
}

impl<'m> Pipeline<'m> {
    pub fn new(model: &'m Model, unit_cost: f64) -> Self {
        Self {
            model,
            unit_cost: coerce_unit_cost(unit_cost),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Sets the batch size from which scoring runs in parallel. Zero always parallelizes.
    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> Self {
        self.parallel_threshold = parallel_threshold;
        self
    }

    pub fn unit_cost(&self) -> f64 {
        self.unit_cost
    }

    /// Scores a single idea.
    pub fn score(&self, idea: &Idea) -> Result<ScoredIdea, ScaleError> {
        let prob = self.model.success_probability(idea)?;
        let point = price::optimize(prob, idea.projected_users, self.unit_cost);
        Ok(ScoredIdea::from_parts(idea, prob, point))
    }

    /// Scores every idea, preserving input order.
    pub fn score_all(&self, ideas: &[Idea]) -> Result<Vec<ScoredIdea>, PipelineError> {
        let score_indexed = |(index, idea): (usize, &Idea)| {
            self.score(idea)
                .map_err(|source| PipelineError::Standardize { index, source })
        };

        let parallel = ideas.len() >= self.parallel_threshold;
        log::debug!(
            "Scoring {} ideas (unit_cost={}, parallel={parallel})",
            ideas.len(),
            self.unit_cost
        );

        if parallel {
            ideas.par_iter().enumerate().map(score_indexed).collect()
        } else {
            ideas.iter().enumerate().map(score_indexed).collect()
        }
    }
}

/// Scores `ideas` with `model` at the given unit cost.
pub fn score_ideas(
    model: &Model,
    ideas: &[Idea],
    unit_cost: f64,
) -> Result<Vec<ScoredIdea>, PipelineError> {
    Pipeline::new(model, unit_cost).score_all(ideas)
}
