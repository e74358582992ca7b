// Squad optimization: fixture difficulty, the integer-program model, the
// solver seam, selection and the query/recommendation entry points.

pub mod backend;
pub mod difficulty;
pub mod error;
pub mod model_builder;
pub mod query;
pub mod recommend;
pub mod selector;

#[cfg(test)]
mod test_support;

pub use backend::{GoodLpBackend, OptimizationBackend};
pub use error::{OptimizerError, RecommendError};
pub use recommend::{RecommendSettings, Recommender, TransferPlan};
