#![forbid(unsafe_code)]

mod rendering;
mod town;

pub use rendering::{init_tracing, render_ascii, render_to_png, RenderConfig};
pub use town::{demo_town, load_tiled_or_demo, phrase_translator};
