//! Demo: a bulleted list under a title, rendered through Typst.
//!
//! Builds both objects, fades every item but the second, and prints where everything
//! ended up plus the tessellated triangle count.
//!
//! Run:
//! - `cargo run --example bulleted_list`

use anyhow::Context as _;
use mathtypst::mobject::{BulletedList, BulletedListOptions, TextMatch, Title, TitleOptions};
use mathtypst::scene::Rgba;
use mathtypst::scene::tessellate::{TessellateOptions, flatten};
use mathtypst::typst::{CachingRenderer, TypstRenderer};

fn main() -> anyhow::Result<()> {
    // Keep logging setup in the demo binary (library stays unopinionated).
    env_logger::init();

    let renderer = CachingRenderer::new(TypstRenderer::new().context("loading fonts")?);

    let title = Title::new(&["Typst lists"], TitleOptions::default(), &renderer)
        .context("building title")?;

    let mut list = BulletedList::new(
        &["Item 1", "Item 2", "Item 3"],
        BulletedListOptions::default(),
        &renderer,
    )
    .context("building list")?;

    list.math_mut()
        .set_color_by_text("Item 1", Rgba::RED, TextMatch::EXACT)
        .set_color_by_text("Item 2", Rgba::GREEN, TextMatch::EXACT)
        .set_color_by_text("Item 3", Rgba::BLUE, TextMatch::EXACT);
    list.fade_all_but(1usize, 0.3)?;

    let title_group = title.to_group();
    println!(
        "title: top={:.3} underline={}",
        title_group.bounds().max[1],
        title.underline().map_or(0.0, |u| u.width())
    );

    for item in list.items() {
        let b = item.bounds();
        println!(
            "item {:?}: leaves={} opacity={:.1} x=[{:.3}, {:.3}] y=[{:.3}, {:.3}]",
            item.source_text(),
            item.leaf_count(),
            item.fill_opacity,
            b.min[0],
            b.max[0],
            b.min[1],
            b.max[1]
        );
    }

    let items = flatten(list.math().mobject(), TessellateOptions::default());
    let triangles: usize = items.iter().map(|i| i.mesh.triangle_count()).sum();
    println!(
        "{} draw item(s), {triangles} triangle(s), {} cached render(s)",
        items.len(),
        renderer.cached_entries()
    );

    Ok(())
}
