//! Operator overloading for linear expressions
//!
//! Variables, expressions and `f64` constants combine with `+`, `-` and scalar `*`,
//! and iterators of expressions can be summed:
//!
//! ```rust
//! use prodmix::lp_model_builder;
//! use prodmix::lp_solver::{LinearExpression, VariableType};
//!
//! let mut builder = lp_model_builder!();
//! let x = builder.add_variable("x", VariableType::Integer, 0.0, 1.0);
//! let y = builder.add_variable("y", VariableType::Binary, 0.0, 1.0);
//!
//! let profit = 40.0 * x - 3.5 * y;
//! let usage: LinearExpression<_> = [x, y].into_iter().map(|v| 2.0 * v).sum();
//! ```
//!
//! Every operation preserves the brand, so terms of different models never mix.

use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};

use super::{LinearExpression, LinearTerm, VariableId};

impl<Brand, Rhs> Add<Rhs> for LinearExpression<Brand>
where
    Rhs: Into<LinearExpression<Brand>>,
{
    type Output = LinearExpression<Brand>;

    fn add(mut self, other: Rhs) -> Self::Output {
        let other: LinearExpression<Brand> = other.into();
        self.terms.extend(other.terms);
        self.constant += other.constant;
        self
    }
}

impl<Brand, Rhs> Sub<Rhs> for LinearExpression<Brand>
where
    Rhs: Into<LinearExpression<Brand>>,
{
    type Output = LinearExpression<Brand>;

    fn sub(self, other: Rhs) -> Self::Output {
        let other: LinearExpression<Brand> = other.into();
        self + (-other)
    }
}

impl<Brand> Neg for LinearExpression<Brand> {
    type Output = LinearExpression<Brand>;

    fn neg(self) -> Self::Output {
        self * -1.0
    }
}

impl<Brand> Mul<f64> for LinearExpression<Brand> {
    type Output = LinearExpression<Brand>;

    fn mul(mut self, factor: f64) -> Self::Output {
        for term in &mut self.terms {
            term.coefficient *= factor;
        }
        self.constant *= factor;
        self
    }
}

impl<Brand> Sum for LinearExpression<Brand> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(LinearExpression::new(0.0), |acc, expr| acc + expr)
    }
}

impl<Brand, Rhs> Add<Rhs> for VariableId<Brand>
where
    Rhs: Into<LinearExpression<Brand>>,
{
    type Output = LinearExpression<Brand>;

    fn add(self, other: Rhs) -> Self::Output {
        LinearExpression::from_variable(self) + other
    }
}

impl<Brand, Rhs> Sub<Rhs> for VariableId<Brand>
where
    Rhs: Into<LinearExpression<Brand>>,
{
    type Output = LinearExpression<Brand>;

    fn sub(self, other: Rhs) -> Self::Output {
        LinearExpression::from_variable(self) - other
    }
}

impl<Brand> Neg for VariableId<Brand> {
    type Output = LinearExpression<Brand>;

    fn neg(self) -> Self::Output {
        LinearExpression {
            terms: vec![LinearTerm {
                coefficient: -1.0,
                variable: self,
            }],
            constant: 0.0,
        }
    }
}

impl<Brand> Mul<f64> for VariableId<Brand> {
    type Output = LinearExpression<Brand>;

    fn mul(self, factor: f64) -> Self::Output {
        LinearExpression {
            terms: vec![LinearTerm {
                coefficient: factor,
                variable: self,
            }],
            constant: 0.0,
        }
    }
}

// Constant on the left-hand side

impl<Brand> Mul<VariableId<Brand>> for f64 {
    type Output = LinearExpression<Brand>;

    fn mul(self, variable: VariableId<Brand>) -> Self::Output {
        variable * self
    }
}

impl<Brand> Mul<LinearExpression<Brand>> for f64 {
    type Output = LinearExpression<Brand>;

    fn mul(self, expression: LinearExpression<Brand>) -> Self::Output {
        expression * self
    }
}

impl<Brand> Add<VariableId<Brand>> for f64 {
    type Output = LinearExpression<Brand>;

    fn add(self, variable: VariableId<Brand>) -> Self::Output {
        variable + self
    }
}

impl<Brand> Sub<VariableId<Brand>> for f64 {
    type Output = LinearExpression<Brand>;

    fn sub(self, variable: VariableId<Brand>) -> Self::Output {
        -variable + self
    }
}
