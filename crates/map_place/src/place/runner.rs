//! High-level runner tying classification, solving and allocation together.
use glam::IVec2;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classify::{Classification, Classifier, TileSets};
use crate::error::{Error, Result};
use crate::grid::{ItemId, OutputLayer, Placement, TileGrid};
use crate::place::allocate::{allocate, Direction};
use crate::place::catalog::ItemCatalog;
use crate::place::command::{CommandTranslator, PlacementCommand};
use crate::place::events::{EventSink, PlaceEvent, PlaceEventKind};
use crate::place::rules::{Rule, RuleCompiler};
use crate::solver::{ConstraintSolver, SatSolver};

/// What happens to candidate cells that already hold an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyPolicy {
    /// Occupied cells stay candidates; a new placement replaces the old item.
    #[default]
    Overwrite,
    /// Occupied cells are removed from the candidate set before direction filtering.
    SkipOccupied,
}

/// Configuration for a [`Placer`].
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceConfig {
    /// Handling of already occupied candidate cells.
    pub occupancy: OccupancyPolicy,
    /// Upper bound on the solutions enumerated per predicate; `None` uses the grid area.
    pub max_solutions_per_predicate: Option<usize>,
}

impl PlaceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the occupancy policy.
    pub fn with_occupancy(mut self, occupancy: OccupancyPolicy) -> Self {
        self.occupancy = occupancy;
        self
    }

    /// Sets the per-predicate solution limit.
    pub fn with_max_solutions_per_predicate(mut self, limit: usize) -> Self {
        self.max_solutions_per_predicate = Some(limit);
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.max_solutions_per_predicate == Some(0) {
            return Err(Error::InvalidConfig(
                "max_solutions_per_predicate must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// How many of which item to place, and where to prefer placing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementRequest {
    pub count: usize,
    pub item: ItemId,
    pub direction: Option<Direction>,
}

impl PlacementRequest {
    pub fn new(count: usize, item: ItemId) -> Self {
        Self {
            count,
            item,
            direction: None,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// Result of placing one rule.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementOutcome {
    pub rule: Rule,
    /// Number of items asked for.
    pub requested: usize,
    /// Candidate cells after occupancy filtering.
    pub candidates: usize,
    /// Candidate cells after direction filtering.
    pub filtered: usize,
    /// Placements written, in selection order.
    pub placements: Vec<Placement>,
}

impl PlacementOutcome {
    pub fn placed(&self) -> usize {
        self.placements.len()
    }

    /// Returns `true` if every requested item was placed.
    pub fn is_fulfilled(&self) -> bool {
        self.placed() == self.requested
    }
}

/// One rule of a [`GenerationPlan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationStep {
    pub rule: Rule,
    pub request: PlacementRequest,
}

/// Ordered list of placements run by [`Placer::regenerate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationPlan {
    pub steps: Vec<GenerationStep>,
}

impl GenerationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, rule: Rule, request: PlacementRequest) -> Self {
        self.push(rule, request);
        self
    }

    pub fn push(&mut self, rule: Rule, request: PlacementRequest) {
        self.steps.push(GenerationStep { rule, request });
    }

    /// One wheelbarrow in a fenced area, one mushroom next to a tree, one sign next to a
    /// path and one beehive anywhere.
    pub fn tiny_town(catalog: &ItemCatalog) -> Result<Self> {
        let id = |name: &str| catalog.lookup(name).map(|item| item.id);
        Ok(Self::new()
            .with_step(
                Rule::EnclosedArea,
                PlacementRequest::new(1, id("Wheelbarrow")?),
            )
            .with_step(
                Rule::adjacent_to_tree(),
                PlacementRequest::new(1, id("Mushroom")?),
            )
            .with_step(Rule::AdjacentToPath, PlacementRequest::new(1, id("Sign")?))
            .with_step(Rule::AnywhereOpen, PlacementRequest::new(1, id("Beehive")?)))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Outcome of one regeneration step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub rule: Rule,
    pub result: Result<PlacementOutcome>,
}

/// Outcome of a whole regeneration. Failed steps never abort the ones after them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub steps: Vec<StepReport>,
}

impl GenerationReport {
    /// Number of steps that found candidates.
    pub fn succeeded(&self) -> usize {
        self.steps.iter().filter(|s| s.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.steps.len() - self.succeeded()
    }

    /// Total number of items written.
    pub fn placed(&self) -> usize {
        self.steps
            .iter()
            .filter_map(|s| s.result.as_ref().ok())
            .map(PlacementOutcome::placed)
            .sum()
    }

    pub fn errors(&self) -> impl Iterator<Item = (&Rule, &Error)> {
        self.steps
            .iter()
            .filter_map(|s| s.result.as_ref().err().map(|e| (&s.rule, e)))
    }
}

/// Result of executing a [`PlacementCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub command: PlacementCommand,
    pub outcome: PlacementOutcome,
    /// Confirmation such as `"Placed 2 Mushroom(s) adjacent to tree."`.
    pub message: String,
}

/// Places items on an output layer according to spatial rules over a fixed tile grid.
///
/// The grid is classified once on construction. Each placement resets the solver session,
/// so no constraint leaks from one rule into the next.
pub struct Placer<'a, S = SatSolver> {
    grid: &'a TileGrid,
    classification: Classification,
    catalog: ItemCatalog,
    config: PlaceConfig,
    solver: S,
    output: OutputLayer,
}

impl<'a> Placer<'a, SatSolver> {
    /// Creates a placer with the default configuration.
    pub fn new(grid: &'a TileGrid, tile_sets: TileSets, catalog: ItemCatalog) -> Result<Self> {
        Self::try_new(grid, tile_sets, catalog, PlaceConfig::default())
    }

    pub fn try_new(
        grid: &'a TileGrid,
        tile_sets: TileSets,
        catalog: ItemCatalog,
        config: PlaceConfig,
    ) -> Result<Self> {
        Self::with_solver(grid, tile_sets, catalog, config, SatSolver::new())
    }
}

impl<'a, S: ConstraintSolver> Placer<'a, S> {
    /// Creates a placer backed by a caller-provided solver.
    pub fn with_solver(
        grid: &'a TileGrid,
        tile_sets: TileSets,
        catalog: ItemCatalog,
        config: PlaceConfig,
        solver: S,
    ) -> Result<Self> {
        config.validate()?;
        let classification = Classifier::new(tile_sets)?.classify(grid);
        Ok(Self {
            grid,
            classification,
            catalog,
            config,
            solver,
            output: OutputLayer::for_grid(grid),
        })
    }

    pub fn grid(&self) -> &TileGrid {
        self.grid
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &PlaceConfig {
        &self.config
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn output(&self) -> &OutputLayer {
        &self.output
    }

    pub fn into_output(self) -> OutputLayer {
        self.output
    }

    /// Removes every placed item.
    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    /// Candidate cells of `rule`, before occupancy and direction filtering.
    pub fn candidates(&mut self, rule: &Rule) -> Result<Vec<IVec2>> {
        RuleCompiler::new(&self.classification).candidates(
            rule,
            &mut self.solver,
            self.config.max_solutions_per_predicate,
        )
    }

    /// Places `request` under `rule`.
    ///
    /// Fails with [`Error::NoCandidates`] when no cell satisfies the rule; the output layer
    /// is left untouched in that case.
    pub fn place(
        &mut self,
        rule: &Rule,
        request: &PlacementRequest,
        rng: &mut impl RngCore,
    ) -> Result<PlacementOutcome> {
        self.place_with_events(rule, request, rng, &mut ())
    }

    pub fn place_with_events(
        &mut self,
        rule: &Rule,
        request: &PlacementRequest,
        rng: &mut impl RngCore,
        sink: &mut dyn EventSink,
    ) -> Result<PlacementOutcome> {
        let result = self.place_internal(rule, request, rng, sink);
        if let Err(error) = &result {
            report_failure(rule, error, sink);
        }
        result
    }

    pub fn place_inside_enclosed_areas(
        &mut self,
        request: &PlacementRequest,
        rng: &mut impl RngCore,
    ) -> Result<PlacementOutcome> {
        self.place(&Rule::EnclosedArea, request, rng)
    }

    pub fn place_adjacent_to_category(
        &mut self,
        category: &str,
        request: &PlacementRequest,
        rng: &mut impl RngCore,
    ) -> Result<PlacementOutcome> {
        self.place(&Rule::adjacent_to(category), request, rng)
    }

    pub fn place_adjacent_to_tree(
        &mut self,
        request: &PlacementRequest,
        rng: &mut impl RngCore,
    ) -> Result<PlacementOutcome> {
        self.place(&Rule::adjacent_to_tree(), request, rng)
    }

    pub fn place_adjacent_to_path(
        &mut self,
        request: &PlacementRequest,
        rng: &mut impl RngCore,
    ) -> Result<PlacementOutcome> {
        self.place(&Rule::AdjacentToPath, request, rng)
    }

    pub fn place_anywhere(
        &mut self,
        request: &PlacementRequest,
        rng: &mut impl RngCore,
    ) -> Result<PlacementOutcome> {
        self.place(&Rule::AnywhereOpen, request, rng)
    }

    /// Clears the output layer and runs every step of `plan` in order.
    pub fn regenerate(
        &mut self,
        plan: &GenerationPlan,
        rng: &mut impl RngCore,
    ) -> GenerationReport {
        self.regenerate_with_events(plan, rng, &mut ())
    }

    pub fn regenerate_with_events(
        &mut self,
        plan: &GenerationPlan,
        rng: &mut impl RngCore,
        sink: &mut dyn EventSink,
    ) -> GenerationReport {
        self.output.clear();
        info!("Regenerating placements: {} steps.", plan.len());
        if sink.wants(PlaceEventKind::RegenerationStarted) {
            sink.send(PlaceEvent::RegenerationStarted { steps: plan.len() });
        }

        let mut report = GenerationReport::default();
        for step in &plan.steps {
            let result = self.place_with_events(&step.rule, &step.request, rng, sink);
            report.steps.push(StepReport {
                rule: step.rule.clone(),
                result,
            });
        }

        info!(
            "Regeneration finished: {}/{} steps succeeded, {} items placed.",
            report.succeeded(),
            report.steps.len(),
            report.placed()
        );
        if sink.wants(PlaceEventKind::RegenerationFinished) {
            sink.send(PlaceEvent::RegenerationFinished {
                report: report.clone(),
            });
        }
        report
    }

    /// Executes a structured command.
    ///
    /// The item is resolved and the direction parsed before anything is solved, so
    /// [`Error::UnknownItem`] and [`Error::InvalidDirection`] leave the output untouched.
    pub fn execute_command(
        &mut self,
        command: &PlacementCommand,
        rng: &mut impl RngCore,
        sink: &mut dyn EventSink,
    ) -> Result<CommandOutcome> {
        let (request, name) = match self.prepare(command) {
            Ok(prepared) => prepared,
            Err(error) => {
                report_failure(&command.rule, &error, sink);
                return Err(error);
            }
        };
        let outcome = self.place_with_events(&command.rule, &request, rng, sink)?;
        let message = format!(
            "Placed {} {}(s) {}.",
            outcome.placed(),
            name,
            command.rule.describe()
        );
        Ok(CommandOutcome {
            command: command.clone(),
            outcome,
            message,
        })
    }

    /// Parses a translator reply and executes it.
    pub fn execute_reply(
        &mut self,
        reply: &str,
        rng: &mut impl RngCore,
        sink: &mut dyn EventSink,
    ) -> Result<CommandOutcome> {
        let command = PlacementCommand::from_reply(reply).inspect_err(|e| {
            warn!("Could not interpret translator reply: {}.", e);
        })?;
        self.execute_command(&command, rng, sink)
    }

    /// Translates a free-text request and executes the result.
    pub fn execute_phrase<T>(
        &mut self,
        translator: &mut T,
        phrase: &str,
        rng: &mut impl RngCore,
        sink: &mut dyn EventSink,
    ) -> Result<CommandOutcome>
    where
        T: CommandTranslator + ?Sized,
    {
        let reply = translator.translate(phrase, &self.catalog)?;
        debug!("Translator reply for '{}': {}", phrase, reply);
        self.execute_reply(&reply, rng, sink)
    }

    fn prepare(&self, command: &PlacementCommand) -> Result<(PlacementRequest, String)> {
        let item = self.catalog.lookup(&command.item)?;
        let direction = Direction::parse_optional(command.direction.as_deref())?;
        let request = PlacementRequest {
            count: command.count,
            item: item.id,
            direction,
        };
        Ok((request, item.name.clone()))
    }

    fn place_internal(
        &mut self,
        rule: &Rule,
        request: &PlacementRequest,
        rng: &mut impl RngCore,
        sink: &mut dyn EventSink,
    ) -> Result<PlacementOutcome> {
        self.catalog.require_id(request.item)?;
        if sink.wants(PlaceEventKind::RuleStarted) {
            sink.send(PlaceEvent::RuleStarted {
                rule: rule.clone(),
                request: request.clone(),
            });
        }

        let compiler = RuleCompiler::new(&self.classification);
        let predicates = compiler.compile(rule)?;
        let mut candidates = compiler.enumerate(
            &predicates,
            &mut self.solver,
            self.config.max_solutions_per_predicate,
        )?;
        if self.config.occupancy == OccupancyPolicy::SkipOccupied {
            candidates.retain(|pos| !self.output.is_occupied(*pos));
        }
        if sink.wants(PlaceEventKind::CandidatesEnumerated) {
            sink.send(PlaceEvent::CandidatesEnumerated {
                rule: rule.clone(),
                predicates: predicates.len(),
                candidates: candidates.len(),
            });
        }
        if candidates.is_empty() {
            return Err(Error::NoCandidates {
                rule: rule.to_string(),
            });
        }

        let allocation = allocate(
            &candidates,
            request.count,
            request.item,
            request.direction,
            &mut self.output,
            rng,
        )?;

        if let Some(direction) = request.direction {
            debug!(
                "Direction '{}' kept {} of {} candidates.",
                direction, allocation.filtered, allocation.candidates
            );
            if sink.wants(PlaceEventKind::DirectionFiltered) {
                sink.send(PlaceEvent::DirectionFiltered {
                    rule: rule.clone(),
                    direction,
                    before: allocation.candidates,
                    after: allocation.filtered,
                });
            }
        }
        if sink.wants(PlaceEventKind::PlacementMade) {
            for placement in &allocation.placements {
                sink.send(PlaceEvent::PlacementMade {
                    rule: rule.clone(),
                    placement: *placement,
                });
            }
        }

        let outcome = PlacementOutcome {
            rule: rule.clone(),
            requested: request.count,
            candidates: allocation.candidates,
            filtered: allocation.filtered,
            placements: allocation.placements,
        };
        if outcome.is_fulfilled() {
            info!(
                "Placed {} of item {} for rule '{}'.",
                outcome.placed(),
                request.item,
                rule
            );
        } else {
            warn!(
                "Placed only {} of {} requested items for rule '{}'; not enough candidates.",
                outcome.placed(),
                outcome.requested,
                rule
            );
            if sink.wants(PlaceEventKind::Warning) {
                sink.send(PlaceEvent::Warning {
                    context: format!("rule:{rule}"),
                    message: format!(
                        "placed {} of {} requested items",
                        outcome.placed(),
                        outcome.requested
                    ),
                });
            }
        }
        if sink.wants(PlaceEventKind::RuleFinished) {
            sink.send(PlaceEvent::RuleFinished {
                outcome: outcome.clone(),
            });
        }
        Ok(outcome)
    }
}

fn report_failure(rule: &Rule, error: &Error, sink: &mut dyn EventSink) {
    if error.is_recoverable() {
        warn!("Rule '{}' failed: {}.", rule, error);
    } else {
        tracing::error!("Rule '{}' failed: {}.", rule, error);
    }
    if sink.wants(PlaceEventKind::RuleFailed) {
        sink.send(PlaceEvent::RuleFailed {
            rule: rule.clone(),
            error: error.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::classify::Region;
    use crate::grid::LayerKind;
    use crate::place::events::VecSink;

    const GRASS: i32 = 1;
    const WALKWAY: i32 = 41;
    const CORNER: i32 = 45;
    const FENCE: i32 = 46;
    const TREE: i32 = 5;

    const WHEELBARROW: ItemId = 57;
    const MUSHROOM: ItemId = 29;
    const SIGN: ItemId = 83;

    /// 16x10 grass with a 5x5 fence at (1, 1), trees at (10, 2) and (12, 2) and a
    /// walkway along y = 8.
    fn town() -> TileGrid {
        let mut grid = TileGrid::new(16, 10);
        grid.fill_rect(LayerKind::Ground, IVec2::ZERO, IVec2::new(16, 10), GRASS);
        grid.fill_rect(LayerKind::Ground, IVec2::new(0, 8), IVec2::new(16, 1), WALKWAY);

        let s = LayerKind::Structure;
        grid.fill_rect(s, IVec2::new(1, 1), IVec2::new(5, 1), FENCE);
        grid.fill_rect(s, IVec2::new(1, 5), IVec2::new(5, 1), FENCE);
        grid.fill_rect(s, IVec2::new(1, 1), IVec2::new(1, 5), FENCE);
        grid.fill_rect(s, IVec2::new(5, 1), IVec2::new(1, 5), FENCE);
        grid.set_tile(s, IVec2::new(1, 1), CORNER).unwrap();

        for pos in [IVec2::new(10, 2), IVec2::new(12, 2)] {
            grid.set_tile(LayerKind::Decoration, pos, TREE).unwrap();
        }
        grid
    }

    fn placer(grid: &TileGrid) -> Placer<'_> {
        Placer::new(grid, TileSets::tiny_town(), ItemCatalog::tiny_town()).unwrap()
    }

    fn positions(outcome: &PlacementOutcome) -> Vec<IVec2> {
        outcome.placements.iter().map(|p| p.position).collect()
    }

    #[test]
    fn enclosed_placements_land_inside_the_fence() {
        let grid = town();
        let mut placer = placer(&grid);
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = placer
            .place_inside_enclosed_areas(&PlacementRequest::new(4, WHEELBARROW), &mut rng)
            .unwrap();

        assert!(outcome.is_fulfilled());
        assert_eq!(outcome.candidates, 9);
        let region = Region::new(1, 1, 5, 5);
        assert!(positions(&outcome)
            .iter()
            .all(|p| region.interior_contains(*p)));
        assert_eq!(placer.output().occupied_count(), 4);
    }

    #[test]
    fn tree_neighbors_are_open_and_adjacent() {
        let grid = town();
        let mut placer = placer(&grid);
        let mut rng = StdRng::seed_from_u64(2);
        let outcome = placer
            .place_adjacent_to_tree(&PlacementRequest::new(3, MUSHROOM), &mut rng)
            .unwrap();

        assert_eq!(outcome.candidates, 7);
        let trees = [IVec2::new(10, 2), IVec2::new(12, 2)];
        for pos in positions(&outcome) {
            assert!(placer.classification().is_open(pos));
            assert!(trees
                .iter()
                .any(|t| (*t - pos).abs().element_sum() == 1));
        }
    }

    #[test]
    fn direction_prefers_one_side_of_the_path() {
        let grid = town();
        let mut placer = placer(&grid);
        let mut rng = StdRng::seed_from_u64(3);
        let request = PlacementRequest::new(50, SIGN).with_direction(Direction::Down);
        let outcome = placer.place_adjacent_to_path(&request, &mut rng).unwrap();

        assert_eq!(outcome.candidates, 32);
        assert_eq!(outcome.filtered, 16);
        assert_eq!(outcome.placed(), 16);
        assert!(positions(&outcome).iter().all(|p| p.y == 9));
    }

    #[test]
    fn missing_anchors_fail_without_writes() {
        let mut grid = TileGrid::new(6, 6);
        grid.fill_rect(LayerKind::Ground, IVec2::ZERO, IVec2::new(6, 6), GRASS);
        let mut placer = placer(&grid);
        let mut sink = VecSink::new();
        let mut rng = StdRng::seed_from_u64(4);

        let result = placer.place_with_events(
            &Rule::adjacent_to_tree(),
            &PlacementRequest::new(1, MUSHROOM),
            &mut rng,
            &mut sink,
        );
        assert!(matches!(
            result,
            Err(Error::NoCandidates { ref rule }) if rule == "adjacent-to-tree"
        ));
        assert_eq!(placer.output().occupied_count(), 0);
        assert_eq!(sink.count(PlaceEventKind::RuleFailed), 1);
        assert_eq!(sink.count(PlaceEventKind::PlacementMade), 0);
    }

    #[test]
    fn unknown_item_ids_are_rejected() {
        let grid = town();
        let mut placer = placer(&grid);
        let mut rng = StdRng::seed_from_u64(5);
        assert!(matches!(
            placer.place_anywhere(&PlacementRequest::new(1, 4242), &mut rng),
            Err(Error::UnknownItem { .. })
        ));
        assert_eq!(placer.output().occupied_count(), 0);
    }

    #[test]
    fn overwrite_policy_reuses_occupied_cells() {
        let grid = town();
        let mut placer = placer(&grid);
        let mut rng = StdRng::seed_from_u64(6);
        placer
            .place_inside_enclosed_areas(&PlacementRequest::new(9, WHEELBARROW), &mut rng)
            .unwrap();
        let outcome = placer
            .place_inside_enclosed_areas(&PlacementRequest::new(1, SIGN), &mut rng)
            .unwrap();

        assert_eq!(outcome.placed(), 1);
        assert_eq!(placer.output().occupied_count(), 9);
        let position = outcome.placements[0].position;
        assert_eq!(placer.output().get(position).unwrap(), Some(SIGN));
    }

    #[test]
    fn skip_occupied_policy_exhausts_candidates() {
        let grid = town();
        let config = PlaceConfig::new().with_occupancy(OccupancyPolicy::SkipOccupied);
        let mut placer =
            Placer::try_new(&grid, TileSets::tiny_town(), ItemCatalog::tiny_town(), config)
                .unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let first = placer
            .place_inside_enclosed_areas(&PlacementRequest::new(6, WHEELBARROW), &mut rng)
            .unwrap();
        let second = placer
            .place_inside_enclosed_areas(&PlacementRequest::new(6, SIGN), &mut rng)
            .unwrap();
        assert_eq!(second.candidates, 3);
        assert_eq!(second.placed(), 3);
        assert!(!second.is_fulfilled());

        let all: HashSet<IVec2> = positions(&first)
            .into_iter()
            .chain(positions(&second))
            .collect();
        assert_eq!(all.len(), 9);
        assert!(matches!(
            placer.place_inside_enclosed_areas(&PlacementRequest::new(1, SIGN), &mut rng),
            Err(Error::NoCandidates { .. })
        ));
    }

    #[test]
    fn same_seed_gives_same_output() {
        let grid = town();
        let plan = GenerationPlan::tiny_town(&ItemCatalog::tiny_town()).unwrap();
        let run = |seed: u64| {
            let mut placer = placer(&grid);
            placer.regenerate(&plan, &mut StdRng::seed_from_u64(seed));
            placer.into_output()
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn regeneration_runs_every_step() {
        let grid = town();
        let config = PlaceConfig::new().with_occupancy(OccupancyPolicy::SkipOccupied);
        let mut placer =
            Placer::try_new(&grid, TileSets::tiny_town(), ItemCatalog::tiny_town(), config)
                .unwrap();
        let plan = GenerationPlan::tiny_town(placer.catalog()).unwrap();
        let mut sink = VecSink::new();
        let report =
            placer.regenerate_with_events(&plan, &mut StdRng::seed_from_u64(8), &mut sink);

        assert_eq!(report.succeeded(), 4);
        assert_eq!(report.placed(), 4);
        assert_eq!(placer.output().occupied_count(), 4);
        assert_eq!(sink.count(PlaceEventKind::RegenerationStarted), 1);
        assert_eq!(sink.count(PlaceEventKind::RuleFinished), 4);
        assert!(matches!(
            sink.as_slice().last(),
            Some(PlaceEvent::RegenerationFinished { .. })
        ));
    }

    #[test]
    fn regeneration_clears_previous_output() {
        let grid = town();
        let mut placer = placer(&grid);
        let mut rng = StdRng::seed_from_u64(9);
        placer
            .place_anywhere(&PlacementRequest::new(5, SIGN), &mut rng)
            .unwrap();
        let report = placer.regenerate(&GenerationPlan::new(), &mut rng);
        assert_eq!(report.steps.len(), 0);
        assert_eq!(placer.output().occupied_count(), 0);
    }

    #[test]
    fn failed_steps_do_not_stop_regeneration() {
        let mut grid = TileGrid::new(8, 8);
        grid.fill_rect(LayerKind::Ground, IVec2::ZERO, IVec2::new(8, 8), GRASS);
        grid.set_tile(LayerKind::Decoration, IVec2::new(3, 3), TREE)
            .unwrap();
        let mut placer = placer(&grid);
        let plan = GenerationPlan::tiny_town(placer.catalog()).unwrap();
        let report = placer.regenerate(&plan, &mut StdRng::seed_from_u64(10));

        let failed: Vec<String> = report.errors().map(|(rule, _)| rule.to_string()).collect();
        assert_eq!(failed, vec!["enclosed-area", "adjacent-to-path"]);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.placed(), 2);
    }

    #[test]
    fn commands_report_a_confirmation() {
        let grid = town();
        let mut placer = placer(&grid);
        let command =
            PlacementCommand::new(Rule::adjacent_to_tree(), 2, "mushroom").with_direction("left");
        let outcome = placer
            .execute_command(&command, &mut StdRng::seed_from_u64(12), &mut ())
            .unwrap();

        assert_eq!(outcome.message, "Placed 2 Mushroom(s) adjacent to tree.");
        assert!(outcome
            .outcome
            .placements
            .iter()
            .all(|p| p.item == MUSHROOM));
    }

    #[test]
    fn bad_commands_leave_output_untouched() {
        let grid = town();
        let mut placer = placer(&grid);
        let mut rng = StdRng::seed_from_u64(13);
        let mut sink = VecSink::new();

        let unknown = PlacementCommand::new(Rule::AnywhereOpen, 1, "Dragon");
        assert!(matches!(
            placer.execute_command(&unknown, &mut rng, &mut sink),
            Err(Error::UnknownItem { .. })
        ));
        let sideways =
            PlacementCommand::new(Rule::AnywhereOpen, 1, "Coin").with_direction("sideways");
        assert!(matches!(
            placer.execute_command(&sideways, &mut rng, &mut sink),
            Err(Error::InvalidDirection { .. })
        ));
        assert!(matches!(
            placer.execute_reply("no idea", &mut rng, &mut sink),
            Err(Error::Translation(_))
        ));
        assert_eq!(placer.output().occupied_count(), 0);
        assert_eq!(sink.count(PlaceEventKind::RuleFailed), 2);
    }

    #[test]
    fn phrases_go_through_the_translator() {
        let grid = town();
        let mut placer = placer(&grid);
        let mut translator = |phrase: &str, catalog: &ItemCatalog| -> Result<String> {
            assert!(catalog.lookup("Sign").is_ok());
            assert_eq!(phrase, "put a sign by the road");
            Ok(r#"{"function": "placeItemAdjacentToPath", "parameters": {"num": 1, "item": "Sign", "direction": null}}"#.to_string())
        };
        let outcome = placer
            .execute_phrase(
                &mut translator,
                "put a sign by the road",
                &mut StdRng::seed_from_u64(14),
                &mut (),
            )
            .unwrap();
        assert_eq!(outcome.command.rule, Rule::AdjacentToPath);
        assert_eq!(outcome.message, "Placed 1 Sign(s) adjacent to path.");
        assert_eq!(placer.output().occupied_count(), 1);
    }

    #[test]
    fn solution_limit_is_enforced() {
        let grid = town();
        let config = PlaceConfig::new().with_max_solutions_per_predicate(5);
        let mut placer =
            Placer::try_new(&grid, TileSets::tiny_town(), ItemCatalog::tiny_town(), config)
                .unwrap();
        let result = placer.place_anywhere(
            &PlacementRequest::new(1, SIGN),
            &mut StdRng::seed_from_u64(15),
        );
        assert!(matches!(result, Err(Error::Solver(_))));
        assert!(!result.unwrap_err().is_recoverable());
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let grid = town();
        let config = PlaceConfig {
            max_solutions_per_predicate: Some(0),
            ..PlaceConfig::default()
        };
        assert!(matches!(
            Placer::try_new(&grid, TileSets::tiny_town(), ItemCatalog::tiny_town(), config),
            Err(Error::InvalidConfig(_))
        ));
        let mut tile_sets = TileSets::tiny_town();
        tile_sets.corner_tile = 999;
        assert!(matches!(
            Placer::new(&grid, tile_sets, ItemCatalog::tiny_town()),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn candidates_match_classification() {
        let grid = town();
        let mut placer = placer(&grid);
        let open = placer.classification().open_count();
        assert_eq!(placer.candidates(&Rule::AnywhereOpen).unwrap().len(), open);
        assert_eq!(placer.candidates(&Rule::EnclosedArea).unwrap().len(), 9);
    }
}
