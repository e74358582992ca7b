// Squad selection as a 0/1 integer program.
//
// One bounded integer variable per eligible player, weighted by a blend of
// season points, form, fixture ease and fitness. Constraints are composable:
// each scenario adds only the ones it needs before solving.

use std::collections::{BTreeMap, HashMap};

use gaffer_core::config::SquadConfig;
use gaffer_core::entity::{Player, PlayerId, Position, TeamId};
use tracing::{debug, info};

use crate::backend::OptimizationBackend;
use crate::difficulty::max_difficulty_plus_one;
use crate::error::OptimizerError;

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

pub const SQUAD_SIZE: u32 = 15;
pub const STARTING_XI_SIZE: u32 = 11;

/// Exact per-position counts for a full squad.
pub const SQUAD_QUOTA: [(Position, u32); 4] = [
    (Position::Goalkeeper, 2),
    (Position::Defender, 5),
    (Position::Midfielder, 5),
    (Position::Forward, 3),
];

/// Per-position (min, max) counts for a starting XI.
pub const STARTING_XI_QUOTA: [(Position, u32, u32); 4] = [
    (Position::Goalkeeper, 1, 1),
    (Position::Defender, 3, 5),
    (Position::Midfielder, 2, 5),
    (Position::Forward, 1, 3),
];

/// Numeric squad rules. Costs are in tenths of the budget unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquadRules {
    pub budget: u32,
    pub max_per_team: u32,
    pub low_cost_threshold: u32,
}

impl Default for SquadRules {
    fn default() -> Self {
        Self {
            budget: 1000,
            max_per_team: 3,
            low_cost_threshold: 45,
        }
    }
}

impl From<&SquadConfig> for SquadRules {
    fn from(config: &SquadConfig) -> Self {
        Self {
            budget: config.budget,
            max_per_team: config.max_per_team,
            low_cost_threshold: config.low_cost_threshold,
        }
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct PlayerVariable {
    name: String,
    player: Player,
    weight: f64,
}

#[derive(Debug, Clone)]
struct LinearConstraint {
    name: String,
    lower: Option<f64>,
    upper: Option<f64>,
    coefficients: BTreeMap<String, f64>,
}

/// One solved variable mapped back to its player.
#[derive(Debug, Clone)]
pub struct ResolvedVariable {
    pub player: Player,
    pub value: f64,
    pub weight: f64,
}

/// Solver output joined with the variable -> player association.
#[derive(Debug, Clone, Default)]
pub struct ResolvedModel {
    pub variables: Vec<ResolvedVariable>,
}

pub fn variable_name(player_id: PlayerId) -> String {
    format!("player_{player_id}")
}

/// Builds one model per recommendation. Nothing is shared between builds.
#[derive(Debug, Clone)]
pub struct SquadModelBuilder {
    rules: SquadRules,
    horizon: u32,
    difficulty: HashMap<TeamId, u32>,
    variables: Vec<PlayerVariable>,
    constraints: Vec<LinearConstraint>,
}

impl SquadModelBuilder {
    /// `difficulty` comes from the estimator run with the same `horizon`.
    pub fn new(rules: SquadRules, horizon: u32, difficulty: HashMap<TeamId, u32>) -> Self {
        Self {
            rules,
            horizon,
            difficulty,
            variables: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Objective weight for one player:
    /// `total_points * form * (max_difficulty_plus_one - team_difficulty) * fitness`.
    /// Teams missing from the difficulty map count as maximally difficult.
    pub fn weight_for(&self, player: &Player) -> f64 {
        let ceiling = max_difficulty_plus_one(self.horizon);
        let difficulty = self.difficulty.get(&player.team).copied().unwrap_or(ceiling);
        let ease = ceiling.saturating_sub(difficulty);
        f64::from(player.total_points) * player.form * f64::from(ease) * player.fitness()
    }

    /// One [0, 1] integer variable per player. Duplicate players are ignored.
    pub fn initialize_variables<'a>(
        &mut self,
        players: impl IntoIterator<Item = &'a Player>,
    ) -> &mut Self {
        for player in players {
            let name = variable_name(player.id);
            if self.variables.iter().any(|v| v.name == name) {
                continue;
            }
            let weight = self.weight_for(player);
            self.variables.push(PlayerVariable {
                name,
                player: player.clone(),
                weight,
            });
        }
        debug!(
            variables = self.variables.len(),
            horizon = self.horizon,
            "Initialized squad variables"
        );
        self
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn constraint_names(&self) -> impl Iterator<Item = &str> {
        self.constraints.iter().map(|c| c.name.as_str())
    }

    fn add(
        &mut self,
        name: impl Into<String>,
        lower: Option<f64>,
        upper: Option<f64>,
        coefficients: BTreeMap<String, f64>,
    ) -> &mut Self {
        self.constraints.push(LinearConstraint {
            name: name.into(),
            lower,
            upper,
            coefficients,
        });
        self
    }

    fn unit_coefficients(&self, keep: impl Fn(&Player) -> bool) -> BTreeMap<String, f64> {
        self.variables
            .iter()
            .filter(|v| keep(&v.player))
            .map(|v| (v.name.clone(), 1.0))
            .collect()
    }

    /// Total cost within the budget.
    pub fn add_budget_constraint(&mut self) -> &mut Self {
        let coefficients = self
            .variables
            .iter()
            .map(|v| (v.name.clone(), f64::from(v.player.cost)))
            .collect();
        let budget = f64::from(self.rules.budget);
        self.add("max_budget", Some(0.0), Some(budget), coefficients)
    }

    /// At most `max_per_team` players from any one team.
    pub fn add_max_per_team_constraint(&mut self) -> &mut Self {
        let mut teams: Vec<TeamId> = self.variables.iter().map(|v| v.player.team).collect();
        teams.sort_unstable();
        teams.dedup();
        let cap = f64::from(self.rules.max_per_team);
        for team in teams {
            let coefficients = self.unit_coefficients(|p| p.team == team);
            self.add(format!("max_for_team_{team}"), Some(0.0), Some(cap), coefficients);
        }
        self
    }

    /// Per-position `[min, max]` counts.
    pub fn add_position_quota_constraint(&mut self, quota: &[(Position, u32, u32)]) -> &mut Self {
        for &(position, min, max) in quota {
            let coefficients = self.unit_coefficients(|p| p.position == position);
            self.add(
                format!("max_for_position_{}", position.slug()),
                Some(f64::from(min)),
                Some(f64::from(max)),
                coefficients,
            );
        }
        self
    }

    /// Exactly 2 goalkeepers, 5 defenders, 5 midfielders, 3 forwards.
    pub fn add_exact_position_quota_constraint(&mut self) -> &mut Self {
        let quota: Vec<(Position, u32, u32)> =
            SQUAD_QUOTA.iter().map(|&(p, n)| (p, n, n)).collect();
        self.add_position_quota_constraint(&quota)
    }

    /// Starting XI formation ranges.
    pub fn add_ranged_position_quota_constraint(&mut self) -> &mut Self {
        self.add_position_quota_constraint(&STARTING_XI_QUOTA)
    }

    /// At least one goalkeeper and one defender priced under the low-cost
    /// threshold, so the bench doesn't eat the budget.
    pub fn add_low_cost_bench_constraint(&mut self) -> &mut Self {
        let threshold = self.rules.low_cost_threshold;
        for position in [Position::Goalkeeper, Position::Defender] {
            let coefficients =
                self.unit_coefficients(|p| p.position == position && p.cost < threshold);
            self.add(
                format!("low_cost_{}", position.slug()),
                Some(1.0),
                None,
                coefficients,
            );
        }
        self
    }

    /// Keep at least `minimum_to_keep` of the current squad.
    pub fn add_retain_current_squad_constraint(
        &mut self,
        current_squad: &[Player],
        minimum_to_keep: u32,
    ) -> &mut Self {
        let current: Vec<PlayerId> = current_squad.iter().map(|p| p.id).collect();
        let coefficients = self.unit_coefficients(|p| current.contains(&p.id));
        self.add(
            "current_players_constraint",
            Some(f64::from(minimum_to_keep)),
            Some(f64::from(SQUAD_SIZE)),
            coefficients,
        )
    }

    /// Select exactly `count` players in total.
    pub fn add_fixed_count_constraint(&mut self, count: u32) -> &mut Self {
        let coefficients = self.unit_coefficients(|_| true);
        let count = f64::from(count);
        self.add("player_count", Some(count), Some(count), coefficients)
    }

    /// Hand the model to `backend` and join the result back onto players.
    pub fn solve<B: OptimizationBackend>(
        &self,
        backend: &mut B,
    ) -> Result<ResolvedModel, OptimizerError> {
        for v in &self.variables {
            backend.add_variable(&v.name, 0.0, 1.0, v.weight, true)?;
        }
        for c in &self.constraints {
            backend.add_constraint(&c.name, c.lower, c.upper, &c.coefficients)?;
        }

        let values = backend.maximize()?;
        let variables: Vec<ResolvedVariable> = self
            .variables
            .iter()
            .map(|v| ResolvedVariable {
                player: v.player.clone(),
                value: values.get(&v.name).copied().unwrap_or(0.0),
                weight: v.weight,
            })
            .collect();
        let selected = variables.iter().filter(|v| v.value > 0.0).count();
        info!(
            variables = variables.len(),
            constraints = self.constraints.len(),
            selected,
            "Solved squad model"
        );
        Ok(ResolvedModel { variables })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, GoodLpBackend};
    use crate::test_support::player;

    #[test]
    fn weight_blends_points_form_ease_and_fitness() {
        let mut difficulty = HashMap::new();
        difficulty.insert(1, 6);
        let builder = SquadModelBuilder::new(SquadRules::default(), 2, difficulty);

        let mut p = player(1, 1, Position::Midfielder, 80, 100);
        p.form = 2.0;
        p.chance_of_playing_next_round = Some(50);
        // 100 * 2.0 * (11 - 6) * 0.5
        assert!((builder.weight_for(&p) - 500.0).abs() < 1e-9);

        // Unknown team counts as worst difficulty.
        let other = player(2, 9, Position::Midfielder, 80, 100);
        assert_eq!(builder.weight_for(&other), 0.0);
    }

    #[test]
    fn empty_player_set_builds_empty_model() {
        let mut builder = SquadModelBuilder::new(SquadRules::default(), 1, HashMap::new());
        builder.initialize_variables(&[]);
        assert_eq!(builder.variable_count(), 0);
        let resolved = builder.solve(&mut GoodLpBackend::new()).unwrap();
        assert!(resolved.variables.is_empty());
    }

    #[test]
    fn constraint_names_follow_convention() {
        let players = vec![
            player(1, 1, Position::Goalkeeper, 40, 10),
            player(2, 2, Position::Defender, 40, 10),
        ];
        let mut builder = SquadModelBuilder::new(SquadRules::default(), 0, HashMap::new());
        builder
            .initialize_variables(&players)
            .add_budget_constraint()
            .add_max_per_team_constraint()
            .add_low_cost_bench_constraint()
            .add_retain_current_squad_constraint(&players[..1], 1)
            .add_fixed_count_constraint(2);
        let names: Vec<&str> = builder.constraint_names().collect();
        assert_eq!(
            names,
            vec![
                "max_budget",
                "max_for_team_1",
                "max_for_team_2",
                "low_cost_goalkeeper",
                "low_cost_defender",
                "current_players_constraint",
                "player_count",
            ]
        );
    }

    #[test]
    fn unsatisfiable_quota_is_infeasible() {
        // Only one goalkeeper available; the squad quota wants two.
        let players = vec![player(1, 1, Position::Goalkeeper, 40, 10)];
        let mut builder = SquadModelBuilder::new(SquadRules::default(), 0, HashMap::new());
        builder
            .initialize_variables(&players)
            .add_exact_position_quota_constraint();
        let err = builder.solve(&mut GoodLpBackend::new()).unwrap_err();
        assert!(matches!(err, OptimizerError::InfeasibleModel));
    }

    /// Backend that records what it was given and returns fixed values.
    #[derive(Default)]
    struct RecordingBackend {
        variables: Vec<(String, f64)>,
        constraints: Vec<(String, Option<f64>, Option<f64>, usize)>,
    }

    impl OptimizationBackend for RecordingBackend {
        fn add_variable(
            &mut self,
            name: &str,
            _lower: f64,
            _upper: f64,
            weight: f64,
            _is_integer: bool,
        ) -> Result<(), BackendError> {
            self.variables.push((name.to_string(), weight));
            Ok(())
        }

        fn add_constraint(
            &mut self,
            name: &str,
            lower: Option<f64>,
            upper: Option<f64>,
            coefficients: &BTreeMap<String, f64>,
        ) -> Result<(), BackendError> {
            self.constraints
                .push((name.to_string(), lower, upper, coefficients.len()));
            Ok(())
        }

        fn maximize(&mut self) -> Result<BTreeMap<String, f64>, BackendError> {
            Ok(self.variables.iter().map(|(n, _)| (n.clone(), 1.0)).collect())
        }
    }

    #[test]
    fn solve_registers_model_with_backend() {
        let players = vec![
            player(7, 1, Position::Goalkeeper, 40, 10),
            player(8, 1, Position::Defender, 50, 10),
        ];
        let mut builder = SquadModelBuilder::new(SquadRules::default(), 0, HashMap::new());
        builder
            .initialize_variables(&players)
            .add_low_cost_bench_constraint();

        let mut backend = RecordingBackend::default();
        let resolved = builder.solve(&mut backend).unwrap();

        let names: Vec<&str> = backend.variables.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["player_7", "player_8"]);
        // Defender at 50 is not low cost: empty lower-bounded constraint.
        assert_eq!(
            backend.constraints,
            vec![
                ("low_cost_goalkeeper".to_string(), Some(1.0), None, 1),
                ("low_cost_defender".to_string(), Some(1.0), None, 0),
            ]
        );
        assert!(resolved.variables.iter().all(|v| v.value == 1.0));
    }
}
