use map_place::prelude::*;
use map_place_examples::{demo_town, init_tracing, phrase_translator, render_ascii, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

const DEFAULT_PHRASES: [&str; 6] = [
    "place 3 Mushrooms adjacent to tree in the left direction",
    "put two signs above the road",
    "a wheelbarrow in the fenced yard",
    "place 5 coins anywhere",
    "drop a dragon by the pond",
    "place 2 beehives next to the trees on the right",
];

// Usage: placement-commands ["phrase" ...]
fn main() -> anyhow::Result<()> {
    init_tracing();
    let grid = demo_town();
    let mut placer = Placer::new(&grid, TileSets::tiny_town(), ItemCatalog::tiny_town())?;
    println!("{}", translator_instructions(placer.catalog()));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let phrases: Vec<&str> = if args.is_empty() {
        DEFAULT_PHRASES.to_vec()
    } else {
        args.iter().map(String::as_str).collect()
    };

    let mut rng = StdRng::seed_from_u64(2024);
    let mut placed = 0usize;
    let mut sink = FnSink::new(|event| {
        if let PlaceEvent::PlacementMade { placement, .. } = event {
            placed += 1;
            tracing::debug!(
                "Item {} at ({}, {}).",
                placement.item,
                placement.position.x,
                placement.position.y
            );
        }
    });
    let mut translator = phrase_translator;

    for phrase in phrases {
        println!("> {phrase}");
        match placer.execute_phrase(&mut translator, phrase, &mut rng, &mut sink) {
            Ok(result) => println!("{}", result.message),
            Err(e) if e.is_recoverable() => println!("Could not do that: {e}"),
            Err(e) => return Err(e.into()),
        }
    }
    drop(sink);

    println!("{placed} items placed in total");
    print!(
        "{}",
        render_ascii(&grid, placer.output(), placer.catalog(), &RenderConfig::default())
    );
    Ok(())
}
