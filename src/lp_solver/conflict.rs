//! Conflict refinement for infeasible models.
//!
//! Refinement works on constraint indices only and talks to the solver through an
//! oracle closure, so it runs the same way on every backend. The oracle receives a
//! subset of constraint indices (in ascending order) and answers whether the model
//! restricted to that subset is infeasible.
//!
//! The deletion filter walks the constraints once. A constraint whose removal
//! leaves the remaining set infeasible is not needed to explain the conflict and is
//! dropped for good; a constraint whose removal makes the set feasible is part of
//! every conflict contained in the current set and is kept. What survives is an
//! irreducible infeasible subset: removing any single member makes it feasible.

use anyhow::Result;

use crate::AppError;

/// Reduce `0..count` to an irreducible infeasible subset.
///
/// Makes `count + 1` oracle calls. Fails with [`AppError::NotInfeasible`] when the
/// full set is feasible.
pub fn deletion_filter<F>(count: usize, mut is_infeasible: F) -> Result<Vec<usize>>
where
    F: FnMut(&[usize]) -> Result<bool>,
{
    let mut active: Vec<usize> = (0..count).collect();

    if !is_infeasible(&active)? {
        return Err(AppError::NotInfeasible.into());
    }

    let mut i = 0;
    while i < active.len() {
        let candidate = active.remove(i);

        if !is_infeasible(&active)? {
            active.insert(i, candidate);
            i += 1;
        }
    }

    Ok(active)
}
