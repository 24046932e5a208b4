//! Reference solver that scans the bounded domain in lexicographic order.
//!
//! A check resumes at the last model instead of starting over, so a blocking-clause
//! enumeration visits each assignment at most once. Assertions only ever narrow the
//! problem, which keeps every assignment behind the resume point unsatisfiable.
//! Disjunctions of disequalities that mention every variable once ("blocking clauses")
//! are kept in a hashed nogood set instead of the assertion list.
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::solver::{CmpOp, ConstraintSolver, Expr, IntVar, Model, SatResult};

/// Largest number of values a single variable may range over.
pub const MAX_DOMAIN_SIZE: i64 = 1 << 22;

#[derive(Clone, Debug)]
struct VarDecl {
    min: i64,
    max: i64,
}

#[derive(Clone, Debug, Default)]
enum Cursor {
    #[default]
    Start,
    At(Vec<i64>),
    Exhausted,
}

/// Exhaustive finite-domain solver without external dependencies.
#[derive(Clone, Debug, Default)]
pub struct DomainSolver {
    vars: Vec<VarDecl>,
    assertions: Vec<Expr>,
    nogoods: HashSet<Vec<i64>>,
    cursor: Cursor,
    model: Option<Model>,
}

impl DomainSolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn as_nogood(&self, expr: &Expr) -> Option<Vec<i64>> {
        let Expr::Or(children) = expr else {
            return None;
        };
        if children.len() != self.vars.len() {
            return None;
        }
        let mut values = vec![None; self.vars.len()];
        for child in children {
            let Expr::Cmp {
                var,
                op: CmpOp::Ne,
                value,
            } = child
            else {
                return None;
            };
            let slot = values.get_mut(var.0)?;
            if slot.replace(*value).is_some() {
                return None;
            }
        }
        values.into_iter().collect()
    }

    fn accepts(&self, values: &[i64]) -> bool {
        if self.nogoods.contains(values) {
            return false;
        }
        let assignment: Vec<Option<i64>> = values.iter().copied().map(Some).collect();
        self.assertions
            .iter()
            .all(|a| a.evaluate(&assignment) == Some(true))
    }

    /// Step to the next assignment, last variable fastest.
    fn advance(&self, values: &mut [i64]) -> bool {
        for (value, decl) in values.iter_mut().zip(&self.vars).rev() {
            if *value < decl.max {
                *value += 1;
                return true;
            }
            *value = decl.min;
        }
        false
    }
}

impl ConstraintSolver for DomainSolver {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn int_var(&mut self, name: &str, min: i64, max: i64) -> Result<IntVar> {
        let size = max.checked_sub(min).and_then(|d| d.checked_add(1));
        if !size.is_some_and(|size| (1..=MAX_DOMAIN_SIZE).contains(&size)) {
            return Err(Error::Solver(format!(
                "domain [{min}, {max}] of '{name}' is empty or larger than {MAX_DOMAIN_SIZE}"
            )));
        }
        self.vars.push(VarDecl { min, max });
        self.cursor = Cursor::Start;
        self.model = None;
        Ok(IntVar(self.vars.len() - 1))
    }

    fn assert(&mut self, expr: Expr) -> Result<()> {
        let mut unknown = None;
        expr.for_each_var(&mut |var| {
            if var.0 >= self.vars.len() {
                unknown = Some(var);
            }
        });
        if let Some(var) = unknown {
            return Err(Error::Solver(format!("unknown variable v{}", var.0)));
        }
        self.model = None;
        match self.as_nogood(&expr) {
            Some(values) => {
                self.nogoods.insert(values);
            }
            None => self.assertions.push(expr),
        }
        Ok(())
    }

    fn check(&mut self) -> Result<SatResult> {
        let mut values = match std::mem::take(&mut self.cursor) {
            Cursor::Start => self.vars.iter().map(|d| d.min).collect(),
            Cursor::At(values) => values,
            Cursor::Exhausted => {
                self.cursor = Cursor::Exhausted;
                return Ok(SatResult::Unsat);
            }
        };
        loop {
            if self.accepts(&values) {
                self.model = Some(Model::new(values.clone()));
                self.cursor = Cursor::At(values);
                return Ok(SatResult::Sat);
            }
            if !self.advance(&mut values) {
                self.model = None;
                self.cursor = Cursor::Exhausted;
                return Ok(SatResult::Unsat);
            }
        }
    }

    fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }
}
