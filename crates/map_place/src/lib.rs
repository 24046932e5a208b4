#![forbid(unsafe_code)]
//! map_place: Constraint-based item placement on layered tile maps.
//!
//! Modules:
//! - grid: layered tile grid, Tiled JSON loading and the item output layer
//! - classify: fenced regions, decoration categories, open cells and non-default ground
//! - solver: integer constraint solver and coordinate enumeration
//! - place: rules, direction filtering, allocation, commands, events and the runner
//!
//! For examples and docs, see README and docs.rs.
pub mod classify;
pub mod error;
pub mod grid;
pub mod place;
pub mod solver;

/// Convenient re-exports for common types. Import with `use map_place::prelude::*;`.
pub mod prelude {
    pub use crate::classify::{Classification, Classifier, Region, TileSets, TREE_CATEGORY};
    pub use crate::error::{Error, Result};
    pub use crate::grid::tiled::TiledLayerNames;
    pub use crate::grid::{
        CellTiles, ItemId, LayerKind, OutputLayer, Placement, TileGrid, EMPTY_TILE,
    };
    pub use crate::place::allocate::{allocate, filter_by_direction, Direction, DirectionCut};
    pub use crate::place::catalog::{CatalogItem, ItemCatalog};
    pub use crate::place::command::{translator_instructions, CommandTranslator, PlacementCommand};
    pub use crate::place::events::{
        EventSink, FnSink, MultiSink, PlaceEvent, PlaceEventKind, VecSink,
    };
    pub use crate::place::rules::{Predicate, Rule, RuleCompiler};
    pub use crate::place::runner::{
        CommandOutcome, GenerationPlan, GenerationReport, OccupancyPolicy, PlaceConfig,
        PlacementOutcome, PlacementRequest, Placer,
    };
    pub use crate::solver::{
        enumerate_positions, Bounds, ConstraintSolver, DomainSolver, Expr, IntVar, SatResult,
        SatSolver,
    };
}
