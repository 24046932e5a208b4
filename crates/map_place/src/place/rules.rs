//! Translation of placement rules into spatial predicates and candidate sets.
//!
//! Each [`Rule`] compiles to zero or more [`Predicate`]s over the coordinate variables.
//! Every predicate is enumerated on its own (the solver is reset in between) and the
//! resulting coordinates are unioned in first-seen order without duplicates.
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use glam::IVec2;
use tracing::debug;

use crate::classify::{Classification, Region, TREE_CATEGORY};
use crate::error::{Error, Result};
use crate::solver::{enumerate_positions, Bounds, ConstraintSolver, Expr, IntVar};

/// 4-connected neighbor offsets, in the order east, west, south, north.
pub const NEIGHBOR_OFFSETS: [IVec2; 4] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(0, -1),
];

/// Declarative spatial rule a placed item has to satisfy.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Strictly inside a fence-enclosed region, one tile away from the fence.
    EnclosedArea,
    /// On an open cell next to a decoration tile of the named category.
    AdjacentToCategory(String),
    /// On an open cell next to any non-default ground tile.
    ///
    /// "Path" is a misnomer kept for familiarity: water, dirt or any other ground tile
    /// outside the default walkable set counts.
    AdjacentToPath,
    /// On any open cell.
    AnywhereOpen,
}

impl Rule {
    pub fn adjacent_to(category: impl Into<String>) -> Self {
        Rule::AdjacentToCategory(category.into())
    }

    pub fn adjacent_to_tree() -> Self {
        Rule::adjacent_to(TREE_CATEGORY)
    }

    /// Short human-readable location phrase, e.g. `"adjacent to tree"`.
    pub fn describe(&self) -> String {
        match self {
            Rule::EnclosedArea => "inside enclosed areas".into(),
            Rule::AdjacentToCategory(category) => format!("adjacent to {category}"),
            Rule::AdjacentToPath => "adjacent to path".into(),
            Rule::AnywhereOpen => "anywhere".into(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::EnclosedArea => f.write_str("enclosed-area"),
            Rule::AdjacentToCategory(category) => write!(f, "adjacent-to-{category}"),
            Rule::AdjacentToPath => f.write_str("adjacent-to-path"),
            Rule::AnywhereOpen => f.write_str("anywhere"),
        }
    }
}

impl FromStr for Rule {
    type Err = Error;

    /// Parse the kebab-case form produced by [`Rule`]'s `Display` implementation.
    ///
    /// Keywords are case-insensitive; category names keep their case.
    fn from_str(s: &str) -> Result<Self> {
        const ADJACENT_TO: &str = "adjacent-to-";
        let token = s.trim();
        match token.to_ascii_lowercase().as_str() {
            "enclosed-area" => return Ok(Rule::EnclosedArea),
            "adjacent-to-path" => return Ok(Rule::AdjacentToPath),
            "anywhere" => return Ok(Rule::AnywhereOpen),
            _ => {}
        }
        match token.get(..ADJACENT_TO.len()) {
            Some(head) if head.eq_ignore_ascii_case(ADJACENT_TO) => {
                let category = &token[ADJACENT_TO.len()..];
                if category.is_empty() {
                    Err(Error::Translation(format!("unknown placement rule '{s}'")))
                } else {
                    Ok(Rule::adjacent_to(category))
                }
            }
            _ => Err(Error::Translation(format!("unknown placement rule '{s}'"))),
        }
    }
}

/// Spatial predicate over the coordinate variables `(x, y)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    /// `x` and `y` strictly inside the border of a region.
    Interior(Region),
    /// `(x, y)` equals one of the listed cells.
    OneOf(Vec<IVec2>),
}

impl Predicate {
    pub fn to_expr(&self, x: IntVar, y: IntVar) -> Expr {
        match self {
            Predicate::Interior(region) => {
                let (rx, ry) = (i64::from(region.x), i64::from(region.y));
                let (w, h) = (i64::from(region.width), i64::from(region.height));
                Expr::and([
                    x.greater_than(rx),
                    x.less_than(rx + w - 1),
                    y.greater_than(ry),
                    y.less_than(ry + h - 1),
                ])
            }
            Predicate::OneOf(cells) => Expr::or(cells.iter().map(|cell| {
                Expr::and([x.equals(cell.x.into()), y.equals(cell.y.into())])
            })),
        }
    }
}

/// Compiles rules against a [`Classification`] and enumerates their candidates.
pub struct RuleCompiler<'a> {
    classification: &'a Classification,
}

impl<'a> RuleCompiler<'a> {
    pub fn new(classification: &'a Classification) -> Self {
        Self { classification }
    }

    /// Predicates whose solutions, unioned, are the rule's candidates.
    pub fn compile(&self, rule: &Rule) -> Result<Vec<Predicate>> {
        let predicates = match rule {
            Rule::EnclosedArea => self
                .classification
                .regions()
                .iter()
                .copied()
                .map(Predicate::Interior)
                .collect(),
            Rule::AdjacentToCategory(category) => {
                self.adjacency_predicates(self.classification.category_anchors(category)?)
            }
            Rule::AdjacentToPath => {
                self.adjacency_predicates(self.classification.non_default_ground())
            }
            Rule::AnywhereOpen => {
                let open: Vec<IVec2> = self.classification.open_cells().collect();
                if open.is_empty() {
                    Vec::new()
                } else {
                    vec![Predicate::OneOf(open)]
                }
            }
        };
        Ok(predicates)
    }

    /// Enumerate every predicate of `rule` and union the solutions.
    ///
    /// `limit` caps the solutions of a single predicate; `None` uses the grid area.
    pub fn candidates<S>(
        &self,
        rule: &Rule,
        solver: &mut S,
        limit: Option<usize>,
    ) -> Result<Vec<IVec2>>
    where
        S: ConstraintSolver + ?Sized,
    {
        let predicates = self.compile(rule)?;
        self.enumerate(&predicates, solver, limit)
    }

    /// Union of the solutions of `predicates`, in first-seen order.
    pub fn enumerate<S>(
        &self,
        predicates: &[Predicate],
        solver: &mut S,
        limit: Option<usize>,
    ) -> Result<Vec<IVec2>>
    where
        S: ConstraintSolver + ?Sized,
    {
        let Some(bounds) =
            Bounds::for_grid(self.classification.width(), self.classification.height())
        else {
            return Ok(Vec::new());
        };
        let limit = limit.unwrap_or_else(|| bounds.area());

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for predicate in predicates {
            let found =
                enumerate_positions(solver, bounds, limit, |x, y| predicate.to_expr(x, y))?;
            candidates.extend(found.into_iter().filter(|pos| seen.insert(*pos)));
        }

        debug!(
            "Enumerated {} candidates from {} predicates.",
            candidates.len(),
            predicates.len()
        );
        Ok(candidates)
    }

    fn adjacency_predicates(&self, anchors: &[IVec2]) -> Vec<Predicate> {
        anchors
            .iter()
            .filter_map(|anchor| {
                let cells: Vec<IVec2> = NEIGHBOR_OFFSETS
                    .iter()
                    .map(|offset| *anchor + *offset)
                    .filter(|pos| self.classification.is_open(*pos))
                    .collect();
                (!cells.is_empty()).then_some(Predicate::OneOf(cells))
            })
            .collect()
    }
}
