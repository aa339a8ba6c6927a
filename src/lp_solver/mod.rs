//! Mixed-integer linear programming (MILP) solver abstraction layer
//!
//! This module decouples model construction from the solver that eventually runs it.
//! Models are assembled with an [`LPModelBuilder`], then handed to whichever backend
//! was compiled in (COIN-OR CBC by default, Gurobi behind the `gurobi` feature).
//!
//! # Branded Types
//!
//! All core types (`VariableId`, `LinearExpression`, `Constraint`, `LPModelBuilder`)
//! carry a `Brand` type parameter. Variables created by one builder cannot be used in
//! constraints of another builder; mixing them is a compile error.
//!
//! ```rust
//! use prodmix::constraint;
//! use prodmix::lp_model_builder;
//! use prodmix::lp_solver::VariableType;
//!
//! let mut plan = lp_model_builder!(Plan);
//! let x = plan.add_variable("x", VariableType::Integer, 0.0, f64::INFINITY);
//! let y = plan.add_variable("y", VariableType::Binary, 0.0, 1.0);
//!
//! plan.add_constraint(constraint!("link", (x - 1000.0 * y) <= 0.0));
//! ```
//!
//! A second builder gets its own brand, so the following does not compile:
//!
//! ```rust,compile_fail
//! use prodmix::constraint;
//! use prodmix::lp_model_builder;
//! use prodmix::lp_solver::VariableType;
//!
//! let mut first = lp_model_builder!();
//! let mut second = lp_model_builder!();
//! let x = second.add_variable("x", VariableType::Continuous, 0.0, 1.0);
//! first.add_constraint(constraint!((x) <= 1.0));
//! ```
//!
//! # Solving
//!
//! [`LPModelBuilder::solve_with`] runs the model with explicit [`SolverOptions`] and
//! returns an [`LPSolution`] carrying the status, the objective, the variable values
//! and [`SolveStatistics`]. When the status is [`OptimizationStatus::Infeasible`],
//! [`LPModelBuilder::refine_conflict`] isolates an irreducible set of conflicting
//! constraints (see [`conflict`]).
//!
//! # Solver Selection
//!
//! The backend can be chosen at run time with the `PRODMIX_LP_SOLVER` environment
//! variable:
//! - `"gurobi"` - Use Gurobi (requires `gurobi` feature)
//! - `"coin_cbc"` or `"cbc"` - Use COIN-OR CBC (requires `coin_cbc` feature)
//!
//! If not set, the solver defaults to Gurobi if available, otherwise CBC.

use anyhow::Result;
use std::env;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Environment variable used to pick a solver backend.
pub const SOLVER_ENV_VAR: &str = "PRODMIX_LP_SOLVER";

/// Variable types supported by the solvers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    /// Continuous variable (can take any real value)
    Continuous,
    /// Integer variable (can only take integer values)
    Integer,
    /// Binary variable (can only take values 0 or 1)
    Binary,
}

/// Constraint sense for linear constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSense {
    /// Less than or equal to (≤)
    LessEqual,
    /// Equal to (=)
    Equal,
    /// Greater than or equal to (≥)
    GreaterEqual,
}

impl ConstraintSense {
    /// Relational operator used when printing constraints
    pub fn symbol(&self) -> &'static str {
        match self {
            ConstraintSense::LessEqual => "<=",
            ConstraintSense::Equal => "==",
            ConstraintSense::GreaterEqual => ">=",
        }
    }
}

/// Optimization direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationSense {
    /// Minimize the objective function
    Minimize,
    /// Maximize the objective function
    Maximize,
}

/// Status of the optimization process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationStatus {
    /// Optimal solution found
    Optimal,
    /// Feasible solution found, but not necessarily optimal
    Feasible,
    /// Problem is infeasible (no solution exists)
    Infeasible,
    /// Problem is unbounded
    Unbounded,
    /// Problem is infeasible or unbounded
    InfeasibleOrUnbounded,
    /// Other status (solver-specific)
    Other(&'static str),
}

impl OptimizationStatus {
    /// Whether the status proves that no feasible point exists
    pub fn is_infeasible(&self) -> bool {
        matches!(
            self,
            OptimizationStatus::Infeasible | OptimizationStatus::InfeasibleOrUnbounded
        )
    }

    /// Whether the variable values of the solution are meaningful
    pub fn has_solution(&self) -> bool {
        matches!(
            self,
            OptimizationStatus::Optimal | OptimizationStatus::Feasible
        )
    }
}

/// Options forwarded to the solver backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolverOptions {
    /// Run the solver's presolve/preprocessing phase. Disabled by default.
    pub presolve: bool,
    /// Let the backend print its search log to stdout instead of silencing it.
    pub log_output: bool,
}

/// Available solver backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SolverBackend {
    #[cfg(feature = "gurobi")]
    /// Gurobi commercial solver
    Gurobi,
    #[cfg(feature = "coin_cbc")]
    /// Coin CBC open-source solver
    CoinCbc,
}

impl SolverBackend {
    /// Get the solver backend from environment variable or use fallback logic
    fn from_env_or_default() -> Result<Self> {
        if let Ok(solver_name) = env::var(SOLVER_ENV_VAR) {
            match solver_name.to_lowercase().as_str() {
                "gurobi" => {
                    #[cfg(feature = "gurobi")]
                    return Ok(SolverBackend::Gurobi);
                    #[cfg(not(feature = "gurobi"))]
                    return Err(anyhow::anyhow!(
                        "Gurobi solver requested via {} but gurobi feature not enabled",
                        SOLVER_ENV_VAR
                    ));
                }
                "coin_cbc" | "coin-cbc" | "cbc" => {
                    #[cfg(feature = "coin_cbc")]
                    return Ok(SolverBackend::CoinCbc);
                    #[cfg(not(feature = "coin_cbc"))]
                    return Err(anyhow::anyhow!(
                        "Coin CBC solver requested via {} but coin_cbc feature not enabled",
                        SOLVER_ENV_VAR
                    ));
                }
                _ => {
                    return Err(anyhow::anyhow!(
                        "Invalid solver '{}' in {}. Valid options: gurobi, coin_cbc",
                        solver_name,
                        SOLVER_ENV_VAR
                    ));
                }
            }
        }

        #[cfg(feature = "gurobi")]
        return Ok(SolverBackend::Gurobi);

        #[allow(unreachable_code)]
        #[cfg(feature = "coin_cbc")]
        return Ok(SolverBackend::CoinCbc);

        #[cfg(not(any(feature = "gurobi", feature = "coin_cbc")))]
        Err(anyhow::anyhow!(
            "No solver backend available. Please enable a solver feature (e.g., 'gurobi' or 'coin_cbc')"
        ))
    }
}

/// A linear expression term: coefficient * variable
#[derive(Debug)]
pub struct LinearTerm<Brand> {
    pub coefficient: f64,
    pub variable: VariableId<Brand>,
}

impl<Brand> Clone for LinearTerm<Brand> {
    fn clone(&self) -> Self {
        Self {
            coefficient: self.coefficient,
            variable: self.variable,
        }
    }
}

/// A linear expression: sum of terms plus constant
#[derive(Debug)]
pub struct LinearExpression<Brand> {
    pub terms: Vec<LinearTerm<Brand>>,
    pub constant: f64,
}

impl<Brand> Clone for LinearExpression<Brand> {
    fn clone(&self) -> Self {
        Self {
            terms: self.terms.clone(),
            constant: self.constant,
        }
    }
}

impl<Brand> LinearExpression<Brand> {
    /// Create a new linear expression with a constant term
    pub fn new(constant: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant,
        }
    }

    /// Create a linear expression from a single variable
    pub fn from_variable(variable: VariableId<Brand>) -> Self {
        Self {
            terms: vec![LinearTerm {
                coefficient: 1.0,
                variable,
            }],
            constant: 0.0,
        }
    }
}

impl<Brand> From<VariableId<Brand>> for LinearExpression<Brand> {
    fn from(variable: VariableId<Brand>) -> Self {
        Self::from_variable(variable)
    }
}

impl<Brand> From<f64> for LinearExpression<Brand> {
    fn from(constant: f64) -> Self {
        Self::new(constant)
    }
}

/// Unique identifier for a variable in the model
///
/// The `Brand` type parameter ensures that variables can only be used with the
/// builder that created them. This is enforced at compile time.
pub struct VariableId<Brand> {
    id: usize,
    _brand: PhantomData<fn() -> Brand>,
}

impl<Brand> VariableId<Brand> {
    fn new(id: usize) -> Self {
        Self {
            id,
            _brand: PhantomData,
        }
    }

    /// Position of the variable in its model
    pub fn index(&self) -> usize {
        self.id
    }
}

// Manual trait implementations that don't require Brand to implement anything
impl<Brand> std::fmt::Debug for VariableId<Brand> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableId").field("id", &self.id).finish()
    }
}

impl<Brand> Clone for VariableId<Brand> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Brand> Copy for VariableId<Brand> {}

impl<Brand> PartialEq for VariableId<Brand> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<Brand> Eq for VariableId<Brand> {}

impl<Brand> std::hash::Hash for VariableId<Brand> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Unique identifier for a constraint in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(usize);

impl ConstraintId {
    /// Position of the constraint in its model
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A named linear constraint
///
/// # Examples
///
/// ```rust
/// use prodmix::constraint;
/// use prodmix::lp_model_builder;
/// use prodmix::lp_solver::{Constraint, ConstraintSense, VariableType};
///
/// let mut builder = lp_model_builder!();
/// let x = builder.add_variable("x", VariableType::Continuous, 0.0, 10.0);
/// let y = builder.add_variable("y", VariableType::Continuous, 0.0, 10.0);
///
/// let total = constraint!("total", (x + y) == 10.0);
/// let cap = Constraint::new("cap", x + y, ConstraintSense::LessEqual, 10.0);
/// assert_eq!(cap.name(), "cap");
/// assert_eq!(total.sense(), ConstraintSense::Equal);
/// ```
#[derive(Debug)]
pub struct Constraint<Brand> {
    name: Arc<str>,
    expression: LinearExpression<Brand>,
    sense: ConstraintSense,
    rhs: f64,
}

impl<Brand> Clone for Constraint<Brand> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            expression: self.expression.clone(),
            sense: self.sense,
            rhs: self.rhs,
        }
    }
}

impl<Brand> Constraint<Brand> {
    /// Create a new constraint
    pub fn new(
        name: impl Into<Arc<str>>,
        expression: impl Into<LinearExpression<Brand>>,
        sense: ConstraintSense,
        rhs: f64,
    ) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            sense,
            rhs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expression(&self) -> &LinearExpression<Brand> {
        &self.expression
    }

    pub fn sense(&self) -> ConstraintSense {
        self.sense
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }
}

/// Variable information stored in the model
#[derive(Debug, Clone)]
pub struct VariableInfo {
    pub name: Arc<str>,
    pub var_type: VariableType,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Objective function information
#[derive(Debug)]
struct ObjectiveInfo<Brand> {
    expression: LinearExpression<Brand>,
    sense: OptimizationSense,
}

impl<Brand> Clone for ObjectiveInfo<Brand> {
    fn clone(&self) -> Self {
        Self {
            expression: self.expression.clone(),
            sense: self.sense,
        }
    }
}

/// Figures reported by the backend about a solve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SolveStatistics {
    /// Wall-clock time spent inside the backend's optimize call
    pub solve_time: Duration,
    /// Branch-and-bound nodes explored, when the backend exposes it
    pub node_count: Option<u64>,
}

/// Result of solving a model
#[derive(Debug, Clone)]
pub struct LPSolution<Brand> {
    pub status: OptimizationStatus,
    pub objective_value: f64,
    pub statistics: SolveStatistics,
    variable_values: Vec<f64>,
    _brand: PhantomData<fn() -> Brand>,
}

impl<Brand> LPSolution<Brand> {
    /// Get the value of a variable from the solution
    pub fn get_value(&self, var_id: VariableId<Brand>) -> Option<f64> {
        self.variable_values.get(var_id.id).copied()
    }
}

/// Structural summary of a model, as printed in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModelInformation {
    pub continuous: usize,
    pub integer: usize,
    pub binary: usize,
    pub less_equal: usize,
    pub equal: usize,
    pub greater_equal: usize,
    pub objective: Option<OptimizationSense>,
}

impl ModelInformation {
    pub fn variables(&self) -> usize {
        self.continuous + self.integer + self.binary
    }

    pub fn constraints(&self) -> usize {
        self.less_equal + self.equal + self.greater_equal
    }

    /// `MILP` when any variable is integral, `LP` otherwise
    pub fn problem_type(&self) -> &'static str {
        if self.integer + self.binary > 0 {
            "MILP"
        } else {
            "LP"
        }
    }
}

/// Builder for models that can be solved by any compiled-in backend
///
/// The `Brand` type parameter ensures that variables from one builder cannot be
/// used with another builder.
///
/// # Examples
///
/// ```rust,no_run
/// use prodmix::constraint;
/// use prodmix::lp_model_builder;
/// use prodmix::lp_solver::{OptimizationSense, SolverOptions, VariableType};
///
/// let mut builder = lp_model_builder!();
/// let x = builder.add_variable("x", VariableType::Integer, 0.0, f64::INFINITY);
/// let y = builder.add_variable("y", VariableType::Binary, 0.0, 1.0);
///
/// builder.add_constraint(constraint!("cap", (x) <= 1.0));
/// builder.add_constraint(constraint!("link", (x - 1000.0 * y) <= 0.0));
/// builder.set_objective(3.0 * x - y, OptimizationSense::Maximize);
///
/// let options = SolverOptions {
///     presolve: true,
///     ..Default::default()
/// };
/// let solution = builder.solve_with(&options).unwrap();
/// ```
pub struct LPModelBuilder<Brand> {
    name: Arc<str>,
    variables: Vec<VariableInfo>,
    constraints: Vec<Constraint<Brand>>,
    objective: Option<ObjectiveInfo<Brand>>,
    _brand: PhantomData<fn() -> Brand>,
}

impl<Brand> LPModelBuilder<Brand> {
    /// Create a new, empty model
    pub fn new() -> Self {
        Self {
            name: Arc::from("lp_model"),
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: None,
            _brand: PhantomData,
        }
    }

    /// Set the model name reported to the solver and printed in reports
    pub fn set_name(&mut self, name: impl Into<Arc<str>>) {
        self.name = name.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a variable to the model
    pub fn add_variable(
        &mut self,
        name: impl Into<Arc<str>>,
        var_type: VariableType,
        lower_bound: f64,
        upper_bound: f64,
    ) -> VariableId<Brand> {
        let var_id = VariableId::new(self.variables.len());
        let (lower_bound, upper_bound) = match var_type {
            VariableType::Binary => (0.0, 1.0),
            _ => (lower_bound, upper_bound),
        };
        self.variables.push(VariableInfo {
            name: name.into(),
            var_type,
            lower_bound,
            upper_bound,
        });
        var_id
    }

    /// Add a constraint to the model
    pub fn add_constraint(&mut self, constraint: Constraint<Brand>) -> ConstraintId {
        let constr_id = ConstraintId(self.constraints.len());
        self.constraints.push(constraint);
        constr_id
    }

    /// Set the objective function
    pub fn set_objective(
        &mut self,
        expression: impl Into<LinearExpression<Brand>>,
        sense: OptimizationSense,
    ) {
        self.objective = Some(ObjectiveInfo {
            expression: expression.into(),
            sense,
        });
    }

    pub fn variable(&self, var_id: VariableId<Brand>) -> &VariableInfo {
        &self.variables[var_id.id]
    }

    /// Iterate over all variables in creation order
    pub fn variables(&self) -> impl Iterator<Item = (VariableId<Brand>, &VariableInfo)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(idx, info)| (VariableId::new(idx), info))
    }

    pub fn constraint(&self, constr_id: ConstraintId) -> &Constraint<Brand> {
        &self.constraints[constr_id.0]
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Identifiers of all constraints in insertion order
    pub fn constraint_ids(&self) -> impl Iterator<Item = ConstraintId> + use<Brand> {
        (0..self.constraints.len()).map(ConstraintId)
    }

    pub fn objective_expression(&self) -> Option<&LinearExpression<Brand>> {
        self.objective.as_ref().map(|obj| &obj.expression)
    }

    /// Count variables and constraints by kind
    pub fn information(&self) -> ModelInformation {
        let mut info = ModelInformation {
            objective: self.objective.as_ref().map(|obj| obj.sense),
            ..Default::default()
        };

        for var in &self.variables {
            match var.var_type {
                VariableType::Continuous => info.continuous += 1,
                VariableType::Integer => info.integer += 1,
                VariableType::Binary => info.binary += 1,
            }
        }

        for constraint in &self.constraints {
            match constraint.sense {
                ConstraintSense::LessEqual => info.less_equal += 1,
                ConstraintSense::Equal => info.equal += 1,
                ConstraintSense::GreaterEqual => info.greater_equal += 1,
            }
        }

        info
    }

    /// Render an expression with the variable names of this model
    pub fn format_expression(&self, expression: &LinearExpression<Brand>) -> String {
        let mut parts = expression
            .terms
            .iter()
            .map(|term| {
                let name = &self.variables[term.variable.id].name;
                if term.coefficient == 1.0 {
                    name.to_string()
                } else if term.coefficient == -1.0 {
                    format!("-{}", name)
                } else {
                    format!("{}{}", term.coefficient, name)
                }
            })
            .collect::<Vec<_>>();

        if expression.constant != 0.0 || parts.is_empty() {
            parts.push(format!("{}", expression.constant));
        }

        parts.join(" + ").replace("+ -", "- ")
    }

    /// Render a constraint as `expression <sense> rhs`
    pub fn format_constraint(&self, constr_id: ConstraintId) -> String {
        let constraint = &self.constraints[constr_id.0];
        format!(
            "{} {} {}",
            self.format_expression(&constraint.expression),
            constraint.sense.symbol(),
            constraint.rhs
        )
    }

    /// Copy of this model keeping only the listed constraints and no objective
    fn restricted(&self, keep: &[usize]) -> Self {
        Self {
            name: self.name.clone(),
            variables: self.variables.clone(),
            constraints: keep.iter().map(|&i| self.constraints[i].clone()).collect(),
            objective: None,
            _brand: PhantomData,
        }
    }

    /// Solve the model with the selected backend
    pub fn solve_with(&self, options: &SolverOptions) -> Result<LPSolution<Brand>> {
        let solver = SolverBackend::from_env_or_default()?;

        match solver {
            #[cfg(feature = "gurobi")]
            SolverBackend::Gurobi => crate::lp_solver::gurobi::solve_gurobi(self, options),

            #[cfg(feature = "coin_cbc")]
            SolverBackend::CoinCbc => crate::lp_solver::coin_cbc::solve_coin_cbc(self, options),
        }
    }

    /// Find an irreducible infeasible subset of this model's constraints
    ///
    /// Each trial re-solves the model restricted to a subset of its constraints,
    /// with variable domains always kept and the solver log silenced. Fails with
    /// [`AppError::NotInfeasible`](crate::AppError::NotInfeasible) when the full
    /// model has a feasible point.
    pub fn refine_conflict(&self, options: &SolverOptions) -> Result<Vec<ConstraintId>> {
        let options = &SolverOptions {
            log_output: false,
            ..*options
        };
        let conflict = conflict::deletion_filter(self.constraints.len(), |subset| {
            let trial = self.restricted(subset);
            Ok(trial.solve_with(options)?.status.is_infeasible())
        })?;

        Ok(conflict.into_iter().map(ConstraintId).collect())
    }
}

impl<Brand> Default for LPModelBuilder<Brand> {
    fn default() -> Self {
        Self::new()
    }
}

pub mod conflict;

// Macros for convenient syntax
pub mod macros;

// Operator overloading for linear expressions
pub mod ops;

pub mod output_suppression;

#[cfg(feature = "gurobi")]
pub mod gurobi;

#[cfg(feature = "coin_cbc")]
pub mod coin_cbc;
