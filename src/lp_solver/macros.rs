//! Macros for the solver module
//!
//! Convenience syntax for creating branded model builders and named constraints.

/// Create a new model builder with a unique brand
///
/// Each invocation defines a fresh brand type, so variables of one model can never
/// end up in the constraints of another.
///
/// # Examples
///
/// ```rust
/// use prodmix::lp_model_builder;
/// use prodmix::lp_solver::VariableType;
///
/// // Anonymous brand (each call creates unique anonymous type)
/// let mut builder = lp_model_builder!();
/// let x = builder.add_variable("x", VariableType::Integer, 0.0, 1.0);
///
/// // Named brand (easier to identify in type errors)
/// let mut production = lp_model_builder!(ProductionPlan);
/// let y = production.add_variable("y", VariableType::Binary, 0.0, 1.0);
/// ```
#[macro_export]
macro_rules! lp_model_builder {
    ($brand_name:ident) => {{
        struct $brand_name;
        $crate::lp_solver::LPModelBuilder::<$brand_name>::new()
    }};

    // `UniqueBrand` is local to the block, so every expansion gets its own type
    () => {{
        struct UniqueBrand;
        $crate::lp_solver::LPModelBuilder::<UniqueBrand>::new()
    }};
}

/// Create constraints using natural comparison syntax
///
/// The left-hand side must be in parentheses. An optional leading name labels the
/// constraint in reports and conflict listings.
///
/// # Examples
///
/// ```rust
/// use prodmix::constraint;
/// use prodmix::lp_model_builder;
/// use prodmix::lp_solver::VariableType;
///
/// let mut builder = lp_model_builder!();
/// let x = builder.add_variable("x", VariableType::Integer, 0.0, 10.0);
/// let y = builder.add_variable("y", VariableType::Binary, 0.0, 1.0);
///
/// builder.add_constraint(constraint!((x) >= 0.0));
/// builder.add_constraint(constraint!("link", (x - 1000.0 * y) <= 0.0));
/// builder.add_constraint(constraint!("exact", (x + y) == 2.0));
/// ```
#[macro_export]
macro_rules! constraint {
    (($lhs:expr) == $rhs:expr) => {
        $crate::constraint!("", ($lhs) == $rhs)
    };
    (($lhs:expr) <= $rhs:expr) => {
        $crate::constraint!("", ($lhs) <= $rhs)
    };
    (($lhs:expr) >= $rhs:expr) => {
        $crate::constraint!("", ($lhs) >= $rhs)
    };

    ($name:expr, ($lhs:expr) == $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            $name,
            $lhs,
            $crate::lp_solver::ConstraintSense::Equal,
            $rhs as f64,
        )
    };
    ($name:expr, ($lhs:expr) <= $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            $name,
            $lhs,
            $crate::lp_solver::ConstraintSense::LessEqual,
            $rhs as f64,
        )
    };
    ($name:expr, ($lhs:expr) >= $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            $name,
            $lhs,
            $crate::lp_solver::ConstraintSense::GreaterEqual,
            $rhs as f64,
        )
    };
}
