use map_place::prelude::*;
use map_place_examples::{demo_town, init_tracing, render_ascii, render_to_png, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

// Places signs along the walkways once per direction, each on a fresh output layer.
fn main() -> anyhow::Result<()> {
    init_tracing();
    let grid = demo_town();
    let catalog = ItemCatalog::tiny_town();
    let sign = catalog.lookup("Sign")?.id;
    let rc = RenderConfig::default().with_cell_size(12);

    for direction in Direction::ALL {
        let mut placer = Placer::new(&grid, TileSets::tiny_town(), catalog.clone())?;
        let mut rng = StdRng::seed_from_u64(7);
        let request = PlacementRequest::new(12, sign).with_direction(direction);
        let outcome = placer.place_adjacent_to_path(&request, &mut rng)?;

        println!(
            "{direction}: {} of {} candidates kept, {} signs placed",
            outcome.filtered,
            outcome.candidates,
            outcome.placed()
        );
        print!("{}", render_ascii(&grid, placer.output(), &catalog, &rc));
        render_to_png(
            &grid,
            placer.output(),
            &rc,
            format!("placement-directional-{direction}.png"),
        )?;
    }

    Ok(())
}
