// Turn resolved solver values back into an ordered player list.

use std::cmp::Ordering;

use gaffer_core::entity::Player;
use tracing::debug;

use crate::error::OptimizerError;
use crate::model_builder::{ResolvedModel, ResolvedVariable};

/// Presentation order for the chosen players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOrder {
    /// Resolved value descending (ties: weight, then id).
    Value,
    /// Contribution weight descending (ties: id).
    Weight,
}

fn by_value(a: &ResolvedVariable, b: &ResolvedVariable) -> Ordering {
    b.value
        .total_cmp(&a.value)
        .then_with(|| by_weight(a, b))
}

fn by_weight(a: &ResolvedVariable, b: &ResolvedVariable) -> Ordering {
    b.weight
        .total_cmp(&a.weight)
        .then_with(|| a.player.id.cmp(&b.player.id))
}

/// Pick `k` players from a solved model.
///
/// Only strictly positive values count as selected. More than `k` positive
/// values are truncated to the `k` highest; fewer is a `SelectionSize` error.
pub fn select(
    resolved: &ResolvedModel,
    k: usize,
    order: SelectionOrder,
) -> Result<Vec<Player>, OptimizerError> {
    let mut chosen: Vec<&ResolvedVariable> =
        resolved.variables.iter().filter(|v| v.value > 0.0).collect();

    if chosen.len() < k {
        return Err(OptimizerError::SelectionSize {
            requested: k,
            available: chosen.len(),
        });
    }

    chosen.sort_by(|a, b| by_value(a, b));
    if chosen.len() > k {
        debug!(
            positive = chosen.len(),
            requested = k,
            "Solver slack: truncating selection"
        );
        chosen.truncate(k);
    }

    if order == SelectionOrder::Weight {
        chosen.sort_by(|a, b| by_weight(a, b));
    }
    Ok(chosen.into_iter().map(|v| v.player.clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::player;
    use gaffer_core::entity::Position;

    fn resolved(entries: &[(u32, f64, f64)]) -> ResolvedModel {
        ResolvedModel {
            variables: entries
                .iter()
                .map(|(id, value, weight)| ResolvedVariable {
                    player: player(*id, 1, Position::Midfielder, 50, 10),
                    value: *value,
                    weight: *weight,
                })
                .collect(),
        }
    }

    fn ids(players: &[Player]) -> Vec<u32> {
        players.iter().map(|p| p.id).collect()
    }

    #[test]
    fn keeps_positive_values_only() {
        let model = resolved(&[(1, 1.0, 5.0), (2, 0.0, 50.0), (3, 1.0, 7.0)]);
        let picked = select(&model, 2, SelectionOrder::Value).unwrap();
        assert_eq!(ids(&picked), vec![3, 1]);
    }

    #[test]
    fn too_few_positive_is_an_error() {
        let model = resolved(&[(1, 1.0, 5.0), (2, 0.0, 50.0)]);
        let err = select(&model, 2, SelectionOrder::Value).unwrap_err();
        assert!(matches!(
            err,
            OptimizerError::SelectionSize { requested: 2, available: 1 }
        ));
    }

    #[test]
    fn slack_is_truncated_by_value() {
        // A fractional leftover loses to whole selections.
        let model = resolved(&[(1, 1.0, 1.0), (2, 0.2, 99.0), (3, 1.0, 2.0)]);
        let picked = select(&model, 2, SelectionOrder::Value).unwrap();
        assert_eq!(ids(&picked), vec![3, 1]);
    }

    #[test]
    fn weight_order_reorders_chosen_for_presentation() {
        let model = resolved(&[(4, 1.0, 1.0), (5, 1.0, 9.0), (6, 1.0, 9.0), (7, 0.0, 100.0)]);
        let picked = select(&model, 3, SelectionOrder::Weight).unwrap();
        assert_eq!(ids(&picked), vec![5, 6, 4]);
    }

    #[test]
    fn zero_k_selects_nothing() {
        let model = resolved(&[(1, 1.0, 1.0)]);
        assert!(select(&model, 0, SelectionOrder::Value).unwrap().is_empty());
    }
}
