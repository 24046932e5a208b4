//! Finite-domain constraint solving over bounded integer variables.
//!
//! The placement pipeline only needs the public contract of a solver: declare bounded
//! integer variables, assert boolean [`Expr`]essions, [`ConstraintSolver::check`] for
//! satisfiability and read back a [`Model`]. [`SatSolver`] encodes them into
//! CNF for a SAT backend and [`DomainSolver`] is a dependency-free scanning reference;
//! [`enumerate::enumerate_positions`] drives any [`ConstraintSolver`] to list every
//! solution of a two-variable predicate by blocking each model once found.
use std::fmt;

use crate::error::{Error, Result};

pub mod domain;
pub mod enumerate;
pub mod sat;

pub use domain::DomainSolver;
pub use enumerate::{enumerate_positions, Bounds};
pub use sat::SatSolver;

/// Handle to an integer variable declared on a solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntVar(pub(crate) usize);

impl IntVar {
    /// Position of the variable in declaration order.
    pub fn index(self) -> usize {
        self.0
    }

    pub fn equals(self, value: i64) -> Expr {
        Expr::cmp(self, CmpOp::Eq, value)
    }

    pub fn not_equals(self, value: i64) -> Expr {
        Expr::cmp(self, CmpOp::Ne, value)
    }

    pub fn less_than(self, value: i64) -> Expr {
        Expr::cmp(self, CmpOp::Lt, value)
    }

    pub fn at_most(self, value: i64) -> Expr {
        Expr::cmp(self, CmpOp::Le, value)
    }

    pub fn greater_than(self, value: i64) -> Expr {
        Expr::cmp(self, CmpOp::Gt, value)
    }

    pub fn at_least(self, value: i64) -> Expr {
        Expr::cmp(self, CmpOp::Ge, value)
    }
}

/// Comparison between a variable and a constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    #[inline]
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
            CmpOp::Lt => lhs < rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Ge => lhs >= rhs,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// Boolean constraint expression over integer variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Bool(bool),
    Cmp { var: IntVar, op: CmpOp, value: i64 },
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    pub fn cmp(var: IntVar, op: CmpOp, value: i64) -> Self {
        Expr::Cmp { var, op, value }
    }

    /// Conjunction; the empty conjunction is `true`.
    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Self {
        Expr::And(exprs.into_iter().collect())
    }

    /// Disjunction; the empty disjunction is `false`.
    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Or(exprs.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// Evaluate under a partial assignment indexed by [`IntVar::index`].
    ///
    /// Returns `None` when the value depends on unassigned variables.
    pub fn evaluate(&self, assignment: &[Option<i64>]) -> Option<bool> {
        match self {
            Expr::Bool(b) => Some(*b),
            Expr::Cmp { var, op, value } => assignment
                .get(var.0)
                .copied()
                .flatten()
                .map(|v| op.holds(v, *value)),
            Expr::And(children) => {
                let mut known = true;
                for child in children {
                    match child.evaluate(assignment) {
                        Some(false) => return Some(false),
                        Some(true) => {}
                        None => known = false,
                    }
                }
                known.then_some(true)
            }
            Expr::Or(children) => {
                let mut known = true;
                for child in children {
                    match child.evaluate(assignment) {
                        Some(true) => return Some(true),
                        Some(false) => {}
                        None => known = false,
                    }
                }
                known.then_some(false)
            }
            Expr::Not(inner) => inner.evaluate(assignment).map(|b| !b),
        }
    }

    /// Visit every variable referenced by the expression.
    pub fn for_each_var(&self, f: &mut impl FnMut(IntVar)) {
        match self {
            Expr::Bool(_) => {}
            Expr::Cmp { var, .. } => f(*var),
            Expr::And(children) | Expr::Or(children) => {
                children.iter().for_each(|c| c.for_each_var(f))
            }
            Expr::Not(inner) => inner.for_each_var(f),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, name: &str, children: &[Expr]) -> fmt::Result {
            write!(f, "({name}")?;
            for child in children {
                write!(f, " {child}")?;
            }
            write!(f, ")")
        }

        match self {
            Expr::Bool(b) => write!(f, "{b}"),
            Expr::Cmp { var, op, value } => write!(f, "(v{} {} {})", var.0, op.symbol(), value),
            Expr::And(children) => join(f, "and", children),
            Expr::Or(children) => join(f, "or", children),
            Expr::Not(inner) => write!(f, "(not {inner})"),
        }
    }
}

/// Outcome of [`ConstraintSolver::check`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SatResult {
    Sat,
    Unsat,
}

/// Variable values of a satisfying assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Model {
    values: Vec<i64>,
}

impl Model {
    pub fn new(values: Vec<i64>) -> Self {
        Self { values }
    }

    pub fn eval(&self, var: IntVar) -> Result<i64> {
        self.values
            .get(var.0)
            .copied()
            .ok_or_else(|| Error::Solver(format!("model has no value for v{}", var.0)))
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }
}

/// Contract of a finite-domain constraint solver session.
///
/// A session is single-owner. [`ConstraintSolver::reset`] must be called before each
/// independent problem so that assertions from an earlier problem do not leak into it.
pub trait ConstraintSolver {
    /// Drop every variable, assertion and model.
    fn reset(&mut self);

    /// Declare an integer variable with inclusive bounds `[min, max]`.
    fn int_var(&mut self, name: &str, min: i64, max: i64) -> Result<IntVar>;

    /// Add a constraint to the current problem.
    fn assert(&mut self, expr: Expr) -> Result<()>;

    /// Decide satisfiability of the current problem, storing a model when satisfiable.
    fn check(&mut self) -> Result<SatResult>;

    /// Model found by the last satisfiable [`ConstraintSolver::check`].
    fn model(&self) -> Option<&Model>;
}
