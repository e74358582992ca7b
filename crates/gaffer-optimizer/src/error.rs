// Optimizer and recommendation errors.

use gaffer_core::FplError;
use thiserror::Error;

use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum OptimizerError {
    /// The constraints admit no selection.
    #[error("squad model is infeasible: no selection satisfies the constraints")]
    InfeasibleModel,

    /// Fewer positive variables than the requested squad size.
    #[error("solver selected {available} players but {requested} were requested")]
    SelectionSize { requested: usize, available: usize },

    #[error("optimization backend failed: {0}")]
    Backend(BackendError),
}

impl From<BackendError> for OptimizerError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Infeasible => OptimizerError::InfeasibleModel,
            other => OptimizerError::Backend(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error(transparent)]
    Data(#[from] FplError),

    #[error(transparent)]
    Optimizer(#[from] OptimizerError),
}

impl RecommendError {
    pub fn is_infeasible(&self) -> bool {
        matches!(self, RecommendError::Optimizer(OptimizerError::InfeasibleModel))
    }
}
