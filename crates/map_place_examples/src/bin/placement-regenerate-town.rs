use std::path::PathBuf;

use map_place::prelude::*;
use map_place_examples::{
    init_tracing, load_tiled_or_demo, render_ascii, render_to_png, RenderConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

// Usage: placement-regenerate-town [seed] [tiled-map.json]
fn main() -> anyhow::Result<()> {
    init_tracing();
    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().map(|s| s.parse::<u64>()).transpose()?.unwrap_or(42);
    let map_path = args.next().map(PathBuf::from);

    let grid = load_tiled_or_demo(map_path.as_deref())?;
    let catalog = ItemCatalog::tiny_town();
    let plan = GenerationPlan::tiny_town(&catalog)?;
    let mut placer = Placer::new(&grid, TileSets::tiny_town(), catalog)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let report = placer.regenerate(&plan, &mut rng);
    for step in &report.steps {
        match &step.result {
            Ok(outcome) => println!(
                "{:<18} placed {}/{} (from {} candidates)",
                step.rule,
                outcome.placed(),
                outcome.requested,
                outcome.candidates
            ),
            Err(e) => println!("{:<18} failed: {e}", step.rule),
        }
    }

    let rc = RenderConfig::default();
    print!("{}", render_ascii(&grid, placer.output(), placer.catalog(), &rc));
    render_to_png(&grid, placer.output(), &rc, "placement-regenerate-town.png")?;

    Ok(())
}
