//! SAT-backed solver session on top of `rustsat`, using MiniSat by default.
//!
//! Each integer variable gets one literal per domain value, tied together by an
//! exactly-one constraint (sequential encoding). Comparisons become disjunctions over
//! value literals, compound expressions are Tseitin-encoded, and an assertion is a unit
//! clause on its root literal. Top-level conjunctions and disjunctions are added as
//! plain clauses, so a blocking clause `x != a || y != b` is a single binary clause.
//!
//! The backend is incremental: clauses added between checks keep everything the solver
//! learnt during earlier searches.
use std::fmt;

use rustsat::solvers::{Solve, SolverResult};
use rustsat::types::{Clause, Lit, TernaryVal, Var};
use rustsat_minisat::core::Minisat;
use tracing::trace;

use crate::error::{Error, Result};
use crate::solver::{CmpOp, ConstraintSolver, Expr, IntVar, Model, SatResult};

/// Largest number of values a single variable may range over.
pub const MAX_DOMAIN_SIZE: i64 = 1 << 16;

struct VarLits {
    name: String,
    min: i64,
    /// `lits[i]` holds when the variable equals `min + i`.
    lits: Vec<Lit>,
}

/// Constraint solver backed by an incremental SAT solver.
pub struct SatSolver<B = Minisat> {
    backend: B,
    vars: Vec<VarLits>,
    next_var: u32,
    truth: Option<Lit>,
    model: Option<Model>,
}

impl SatSolver<Minisat> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: Solve + Default> Default for SatSolver<B> {
    fn default() -> Self {
        Self {
            backend: B::default(),
            vars: Vec::new(),
            next_var: 0,
            truth: None,
            model: None,
        }
    }
}

impl<B> fmt::Debug for SatSolver<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SatSolver")
            .field("vars", &self.vars.len())
            .field("literals", &self.next_var)
            .field("has_model", &self.model.is_some())
            .finish()
    }
}

fn backend_error(err: impl fmt::Display) -> Error {
    Error::Solver(format!("SAT backend: {err}"))
}

impl<B: Solve + Default> SatSolver<B> {
    fn fresh(&mut self) -> Lit {
        let lit = Var::new(self.next_var).pos_lit();
        self.next_var += 1;
        lit
    }

    fn clause(&mut self, lits: impl IntoIterator<Item = Lit>) -> Result<()> {
        let clause: Clause = lits.into_iter().collect();
        self.backend.add_clause(clause).map_err(backend_error)
    }

    /// Literal that is true in every model.
    fn truth(&mut self) -> Result<Lit> {
        if let Some(lit) = self.truth {
            return Ok(lit);
        }
        let lit = self.fresh();
        self.clause([lit])?;
        self.truth = Some(lit);
        Ok(lit)
    }

    fn any_of(&mut self, lits: Vec<Lit>) -> Result<Lit> {
        match lits.as_slice() {
            [] => Ok(!self.truth()?),
            [lit] => Ok(*lit),
            _ => {
                let out = self.fresh();
                self.clause(std::iter::once(!out).chain(lits.iter().copied()))?;
                for lit in &lits {
                    self.clause([!*lit, out])?;
                }
                Ok(out)
            }
        }
    }

    fn all_of(&mut self, lits: Vec<Lit>) -> Result<Lit> {
        match lits.as_slice() {
            [] => self.truth(),
            [lit] => Ok(*lit),
            _ => {
                let out = self.fresh();
                for lit in &lits {
                    self.clause([!out, *lit])?;
                }
                self.clause(std::iter::once(out).chain(lits.iter().map(|lit| !*lit)))?;
                Ok(out)
            }
        }
    }

    fn compare(&mut self, var: IntVar, op: CmpOp, value: i64) -> Result<Lit> {
        let decl = self
            .vars
            .get(var.0)
            .ok_or_else(|| Error::Solver(format!("unknown variable v{}", var.0)))?;
        let offset = value
            .checked_sub(decl.min)
            .and_then(|o| usize::try_from(o).ok())
            .filter(|o| *o < decl.lits.len());
        match (op, offset) {
            (CmpOp::Eq, Some(o)) => return Ok(decl.lits[o]),
            (CmpOp::Ne, Some(o)) => return Ok(!decl.lits[o]),
            _ => {}
        }
        let min = decl.min;
        let hits: Vec<Lit> = decl
            .lits
            .iter()
            .enumerate()
            .filter(|(i, _)| op.holds(min + *i as i64, value))
            .map(|(_, lit)| *lit)
            .collect();
        if hits.len() == decl.lits.len() {
            return self.truth();
        }
        self.any_of(hits)
    }

    fn encode(&mut self, expr: &Expr) -> Result<Lit> {
        match expr {
            Expr::Bool(true) => self.truth(),
            Expr::Bool(false) => Ok(!self.truth()?),
            Expr::Cmp { var, op, value } => self.compare(*var, *op, *value),
            Expr::And(children) => {
                let lits = self.encode_all(children)?;
                self.all_of(lits)
            }
            Expr::Or(children) => {
                let lits = self.encode_all(children)?;
                self.any_of(lits)
            }
            Expr::Not(inner) => Ok(!self.encode(inner)?),
        }
    }

    fn encode_all(&mut self, exprs: &[Expr]) -> Result<Vec<Lit>> {
        exprs.iter().map(|e| self.encode(e)).collect()
    }

    fn read_model(&self) -> Result<Model> {
        let mut values = Vec::with_capacity(self.vars.len());
        for decl in &self.vars {
            let mut value = None;
            for (offset, lit) in decl.lits.iter().enumerate() {
                let val = self.backend.lit_val(*lit).map_err(backend_error)?;
                if matches!(val, TernaryVal::True) {
                    value = Some(decl.min + offset as i64);
                    break;
                }
            }
            let value = value.ok_or_else(|| {
                Error::Solver(format!("model assigns no value to '{}'", decl.name))
            })?;
            values.push(value);
        }
        Ok(Model::new(values))
    }
}

impl<B: Solve + Default> ConstraintSolver for SatSolver<B> {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn int_var(&mut self, name: &str, min: i64, max: i64) -> Result<IntVar> {
        let size = max
            .checked_sub(min)
            .and_then(|d| d.checked_add(1))
            .filter(|size| (1..=MAX_DOMAIN_SIZE).contains(size))
            .ok_or_else(|| {
                Error::Solver(format!(
                    "domain [{min}, {max}] of '{name}' is empty or larger than {MAX_DOMAIN_SIZE}"
                ))
            })?;

        let lits: Vec<Lit> = (0..size).map(|_| self.fresh()).collect();
        self.clause(lits.iter().copied())?;
        let mut seen_before: Option<Lit> = None;
        for lit in &lits {
            let seen = self.fresh();
            self.clause([!*lit, seen])?;
            if let Some(prev) = seen_before {
                self.clause([!prev, !*lit])?;
                self.clause([!prev, seen])?;
            }
            seen_before = Some(seen);
        }

        self.vars.push(VarLits {
            name: name.to_owned(),
            min,
            lits,
        });
        self.model = None;
        Ok(IntVar(self.vars.len() - 1))
    }

    fn assert(&mut self, expr: Expr) -> Result<()> {
        self.model = None;
        match expr {
            Expr::And(children) => children.into_iter().try_for_each(|c| self.assert(c)),
            Expr::Or(children) if !children.is_empty() => {
                let lits = self.encode_all(&children)?;
                self.clause(lits)
            }
            other => {
                let lit = self.encode(&other)?;
                self.clause([lit])
            }
        }
    }

    fn check(&mut self) -> Result<SatResult> {
        match self.backend.solve().map_err(backend_error)? {
            SolverResult::Sat => {
                let model = self.read_model()?;
                trace!("SAT model {:?}.", model.values());
                self.model = Some(model);
                Ok(SatResult::Sat)
            }
            SolverResult::Unsat => {
                self.model = None;
                Ok(SatResult::Unsat)
            }
            SolverResult::Interrupted => Err(Error::Solver("SAT search was interrupted".into())),
        }
    }

    fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }
}
