// Integer-programming backend seam and its good_lp adapter.

use std::collections::{BTreeMap, HashMap};

use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel,
    Variable,
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no assignment satisfies the constraints")]
    Infeasible,

    #[error("objective is unbounded")]
    Unbounded,

    #[error("variable {0} declared twice")]
    DuplicateVariable(String),

    #[error("constraint {constraint} references unknown variable {variable}")]
    UnknownVariable { constraint: String, variable: String },

    #[error("solver failure: {0}")]
    Solver(String),
}

/// A maximizing linear/integer program solver.
///
/// Variables and constraints are addressed by name. `maximize` returns the
/// resolved value of every declared variable.
pub trait OptimizationBackend {
    fn add_variable(
        &mut self,
        name: &str,
        lower: f64,
        upper: f64,
        weight: f64,
        is_integer: bool,
    ) -> Result<(), BackendError>;

    /// `lower <= sum(coefficient * variable) <= upper`; a `None` bound is
    /// unbounded on that side.
    fn add_constraint(
        &mut self,
        name: &str,
        lower: Option<f64>,
        upper: Option<f64>,
        coefficients: &BTreeMap<String, f64>,
    ) -> Result<(), BackendError>;

    fn maximize(&mut self) -> Result<BTreeMap<String, f64>, BackendError>;
}

// ---------------------------------------------------------------------------
// good_lp adapter
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct VariableSpec {
    name: String,
    lower: f64,
    upper: f64,
    weight: f64,
    is_integer: bool,
}

#[derive(Debug)]
struct ConstraintSpec {
    name: String,
    lower: Option<f64>,
    upper: Option<f64>,
    terms: Vec<(usize, f64)>,
}

impl ConstraintSpec {
    /// A constraint with no terms holds iff 0 lies within its bounds.
    fn holds_when_empty(&self) -> bool {
        self.lower.map_or(true, |lo| lo <= 0.0) && self.upper.map_or(true, |hi| hi >= 0.0)
    }
}

/// Collects a model and solves it with good_lp's pure-Rust `microlp`
/// solver. One instance per solve.
#[derive(Debug, Default)]
pub struct GoodLpBackend {
    variables: Vec<VariableSpec>,
    index: HashMap<String, usize>,
    constraints: Vec<ConstraintSpec>,
}

impl GoodLpBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OptimizationBackend for GoodLpBackend {
    fn add_variable(
        &mut self,
        name: &str,
        lower: f64,
        upper: f64,
        weight: f64,
        is_integer: bool,
    ) -> Result<(), BackendError> {
        if self.index.contains_key(name) {
            return Err(BackendError::DuplicateVariable(name.to_string()));
        }
        self.index.insert(name.to_string(), self.variables.len());
        self.variables.push(VariableSpec {
            name: name.to_string(),
            lower,
            upper,
            weight,
            is_integer,
        });
        Ok(())
    }

    fn add_constraint(
        &mut self,
        name: &str,
        lower: Option<f64>,
        upper: Option<f64>,
        coefficients: &BTreeMap<String, f64>,
    ) -> Result<(), BackendError> {
        let terms = coefficients
            .iter()
            .map(|(var, coef)| {
                self.index
                    .get(var)
                    .map(|i| (*i, *coef))
                    .ok_or_else(|| BackendError::UnknownVariable {
                        constraint: name.to_string(),
                        variable: var.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.constraints.push(ConstraintSpec {
            name: name.to_string(),
            lower,
            upper,
            terms,
        });
        Ok(())
    }

    fn maximize(&mut self) -> Result<BTreeMap<String, f64>, BackendError> {
        for c in self.constraints.iter().filter(|c| c.terms.is_empty()) {
            if !c.holds_when_empty() {
                debug!(constraint = %c.name, "Constraint over no variables cannot hold");
                return Err(BackendError::Infeasible);
            }
        }
        if self.variables.is_empty() {
            return Ok(BTreeMap::new());
        }

        let mut vars = ProblemVariables::new();
        let handles: Vec<Variable> = self
            .variables
            .iter()
            .map(|spec| {
                let def = variable().min(spec.lower).max(spec.upper);
                vars.add(if spec.is_integer { def.integer() } else { def })
            })
            .collect();

        let objective: Expression = self
            .variables
            .iter()
            .zip(&handles)
            .map(|(spec, var)| spec.weight * *var)
            .sum();

        let mut problem = vars.maximise(objective).using(good_lp::microlp);
        for c in self.constraints.iter().filter(|c| !c.terms.is_empty()) {
            let expr: Expression = c.terms.iter().map(|(i, coef)| *coef * handles[*i]).sum();
            if let Some(lo) = c.lower {
                problem = problem.with(constraint::geq(expr.clone(), lo));
            }
            if let Some(hi) = c.upper {
                problem = problem.with(constraint::leq(expr, hi));
            }
        }

        debug!(
            variables = self.variables.len(),
            constraints = self.constraints.len(),
            "Solving integer program"
        );
        let solution = problem.solve().map_err(|e| match e {
            ResolutionError::Infeasible => BackendError::Infeasible,
            ResolutionError::Unbounded => BackendError::Unbounded,
            other => BackendError::Solver(other.to_string()),
        })?;

        Ok(self
            .variables
            .iter()
            .zip(&handles)
            .map(|(spec, var)| (spec.name.clone(), solution.value(*var)))
            .collect())
    }
}
