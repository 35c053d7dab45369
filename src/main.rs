//! Thin binary wrapper for local development.
//!
//! Renders its arguments as one `MathTypst` (one argument per part) and prints the part
//! tree: source text, leaf count, bounds, and how many triangles each part tessellates to.
//!
//! Run:
//! - `cargo run -- 'e^(i pi)' '+' '1' '=' '0'`
//! - `RUST_LOG=debug cargo run -- 'a #{} + #{} b'`

use anyhow::Context as _;
use mathtypst::mobject::{MathTypst, MathTypstOptions};
use mathtypst::scene::tessellate::{TessellateOptions, flatten};
use mathtypst::typst::{CachingRenderer, TypstRenderer};

fn main() -> anyhow::Result<()> {
    // Keep logging setup in the binary so the library remains unopinionated.
    env_logger::init();

    let mut parts: Vec<String> = std::env::args().skip(1).collect();
    if parts.is_empty() {
        parts = ["zeta(s)", "=", "sum_(n=1)^oo", "1 / n^s"]
            .map(String::from)
            .to_vec();
    }

    let renderer = CachingRenderer::new(TypstRenderer::new().context("loading fonts")?);
    log::info!("typst renderer ready ({} fonts)", renderer.inner().font_count());

    let math = MathTypst::new(&parts, MathTypstOptions::default(), &renderer)
        .with_context(|| format!("rendering {parts:?}"))?;

    println!(
        "{:?}: {} part(s), font size {:.1}, {} render(s) cached",
        math.typst_string(),
        math.parts().len(),
        math.font_size(),
        renderer.cached_entries()
    );

    for (i, part) in math.parts().iter().enumerate() {
        let bounds = part.bounds();
        let triangles: usize = flatten(part, TessellateOptions::default())
            .iter()
            .map(|item| item.mesh.triangle_count())
            .sum();
        println!(
            "  [{i}] {:<16} leaves={:<3} min=({:.3}, {:.3}) max=({:.3}, {:.3}) triangles={triangles}",
            format!("{:?}", part.source_text()),
            part.leaf_count(),
            bounds.min[0],
            bounds.min[1],
            bounds.max[0],
            bounds.max[1],
        );
    }

    Ok(())
}
