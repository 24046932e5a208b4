//! Direction filtering and random allocation of items onto candidate cells.
use std::fmt;
use std::str::FromStr;

use glam::IVec2;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};
use crate::grid::{ItemId, OutputLayer, Placement};

/// Optional directional preference applied to a candidate set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Parse an optional direction token.
    ///
    /// Missing, blank and `"null"`/`"none"` tokens mean no direction. Anything else must
    /// name one of the four directions.
    pub fn parse_optional(token: Option<&str>) -> Result<Option<Direction>> {
        match token.map(str::trim) {
            None | Some("") => Ok(None),
            Some(t) if t.eq_ignore_ascii_case("null") || t.eq_ignore_ascii_case("none") => {
                Ok(None)
            }
            Some(t) => t.parse().map(Some),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        Direction::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| Error::InvalidDirection {
                token: token.to_string(),
            })
    }
}

/// Half-range cut derived once from a candidate set's bounding box.
///
/// Applying the same cut again keeps the set unchanged. Deriving a new cut from an already
/// filtered set generally shrinks it further.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionCut {
    direction: Direction,
    threshold: f64,
}

impl DirectionCut {
    /// Compute the cut for `direction`, or `None` for an empty candidate set.
    pub fn from_candidates(candidates: &[IVec2], direction: Direction) -> Option<Self> {
        let first = candidates.first()?;
        let (min, max) = candidates
            .iter()
            .fold((*first, *first), |(min, max), c| (min.min(*c), max.max(*c)));
        let half = |lo: i32, hi: i32| f64::from(hi - lo) / 2.0;

        let threshold = match direction {
            Direction::Left => f64::from(min.x) + half(min.x, max.x),
            Direction::Right => f64::from(max.x) - half(min.x, max.x),
            Direction::Up => f64::from(min.y) + half(min.y, max.y),
            Direction::Down => f64::from(max.y) - half(min.y, max.y),
        };
        Some(Self {
            direction,
            threshold,
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns `true` if `pos` lies on the preferred side of the cut (boundary included).
    pub fn contains(&self, pos: IVec2) -> bool {
        match self.direction {
            Direction::Left => f64::from(pos.x) <= self.threshold,
            Direction::Right => f64::from(pos.x) >= self.threshold,
            Direction::Up => f64::from(pos.y) <= self.threshold,
            Direction::Down => f64::from(pos.y) >= self.threshold,
        }
    }

    pub fn apply(&self, candidates: &[IVec2]) -> Vec<IVec2> {
        candidates
            .iter()
            .copied()
            .filter(|pos| self.contains(*pos))
            .collect()
    }
}

/// Keep the candidates in the preferred half of their bounding box.
///
/// With a single distinct coordinate on the relevant axis every candidate is kept.
pub fn filter_by_direction(candidates: &[IVec2], direction: Direction) -> Vec<IVec2> {
    match DirectionCut::from_candidates(candidates, direction) {
        Some(cut) => cut.apply(candidates),
        None => Vec::new(),
    }
}

/// Result of one [`allocate`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// Candidates handed to the allocator.
    pub candidates: usize,
    /// Candidates left after direction filtering.
    pub filtered: usize,
    /// Placements written to the output layer, in selection order.
    pub placements: Vec<Placement>,
}

impl Allocation {
    /// `false` only when there were no candidates at all.
    pub fn succeeded(&self) -> bool {
        self.candidates > 0
    }
}

/// Write `count` copies of `item` onto distinct cells drawn uniformly from `candidates`.
///
/// With a `direction`, candidates are first reduced by [`filter_by_direction`]. When fewer
/// cells than `count` remain, every remaining cell is used. An empty candidate set writes
/// nothing and reports [`Allocation::succeeded`] as `false`. Positions are validated
/// before the first write, so an out-of-range candidate leaves `output` untouched.
pub fn allocate(
    candidates: &[IVec2],
    count: usize,
    item: ItemId,
    direction: Option<Direction>,
    output: &mut OutputLayer,
    rng: &mut impl RngCore,
) -> Result<Allocation> {
    if candidates.is_empty() {
        return Ok(Allocation {
            candidates: 0,
            filtered: 0,
            placements: Vec::new(),
        });
    }

    let mut pool = match direction {
        Some(direction) => filter_by_direction(candidates, direction),
        None => candidates.to_vec(),
    };
    let filtered = pool.len();

    let take = count.min(pool.len());
    let mut chosen = Vec::with_capacity(take);
    for _ in 0..take {
        let index = pick_index(rng, pool.len());
        chosen.push(pool.swap_remove(index));
    }

    for position in &chosen {
        output.get(*position)?;
    }
    let mut placements = Vec::with_capacity(chosen.len());
    for position in chosen {
        let placement = Placement::new(item, position);
        if let Some(previous) = output.place(placement)? {
            trace!(
                "Item {} replaces item {} at ({}, {}).",
                item,
                previous,
                position.x,
                position.y
            );
        }
        placements.push(placement);
    }

    Ok(Allocation {
        candidates: candidates.len(),
        filtered,
        placements,
    })
}

/// Uniform index in `0..len` via multiply-shift; `len` must be non-zero.
fn pick_index(rng: &mut dyn RngCore, len: usize) -> usize {
    ((u128::from(rng.next_u64()) * len as u128) >> 64) as usize
}
