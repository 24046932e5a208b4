//! Exhaustive enumeration of grid coordinates satisfying a predicate.
//!
//! Classic blocking-clause enumeration: check, read `(x, y)` from the model, assert
//! `x != mx || y != my`, repeat until the solver reports unsat. The solver is reset at
//! the start of every enumeration so independent predicates never share clauses.
use glam::IVec2;
use tracing::trace;

use crate::error::{Error, Result};
use crate::solver::{ConstraintSolver, Expr, IntVar, SatResult};

/// Inclusive coordinate bounds for the `x` and `y` variables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub min: IVec2,
    pub max: IVec2,
}

impl Bounds {
    pub fn new(min: IVec2, max: IVec2) -> Self {
        Self { min, max }
    }

    /// Bounds covering a `width`×`height` grid, or `None` for an empty grid.
    pub fn for_grid(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let max = IVec2::new(
            i32::try_from(width - 1).ok()?,
            i32::try_from(height - 1).ok()?,
        );
        Some(Self::new(IVec2::ZERO, max))
    }

    /// Number of coordinates inside the bounds.
    pub fn area(&self) -> usize {
        let size = (self.max - self.min + IVec2::ONE).max(IVec2::ZERO);
        (size.x as usize) * (size.y as usize)
    }
}

/// List every `(x, y)` within `bounds` for which `predicate(x, y)` holds.
///
/// Fails with [`Error::Solver`] if the solver reports more than `limit` solutions,
/// which a correct solver never does for `limit >= bounds.area()`.
pub fn enumerate_positions<S, F>(
    solver: &mut S,
    bounds: Bounds,
    limit: usize,
    predicate: F,
) -> Result<Vec<IVec2>>
where
    S: ConstraintSolver + ?Sized,
    F: FnOnce(IntVar, IntVar) -> Expr,
{
    solver.reset();
    let x = solver.int_var("x", bounds.min.x.into(), bounds.max.x.into())?;
    let y = solver.int_var("y", bounds.min.y.into(), bounds.max.y.into())?;
    solver.assert(predicate(x, y))?;

    let mut found = Vec::new();
    while solver.check()? == SatResult::Sat {
        let model = solver
            .model()
            .ok_or_else(|| Error::Solver("satisfiable check produced no model".into()))?;
        let (mx, my) = (model.eval(x)?, model.eval(y)?);
        let position = match (i32::try_from(mx), i32::try_from(my)) {
            (Ok(px), Ok(py)) => IVec2::new(px, py),
            _ => {
                return Err(Error::Solver(format!(
                    "model value ({mx}, {my}) does not fit a grid coordinate"
                )))
            }
        };
        if found.len() >= limit {
            return Err(Error::Solver(format!(
                "enumeration exceeded {limit} solutions"
            )));
        }
        trace!("Solution {}: ({}, {}).", found.len(), position.x, position.y);
        found.push(position);
        solver.assert(Expr::or([x.not_equals(mx), y.not_equals(my)]))?;
    }
    Ok(found)
}
