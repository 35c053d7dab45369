//! Typst frame tree → flat leaf paths.
//!
//! This module turns a compiled `typst::layout::PagedDocument` into a flat, ordered list of
//! [`VMobject`] leaves: one per glyph outline and one per filled shape. It is intentionally
//! **pure** (no tessellation, no scene layout) and only does traversal + outline conversion.
//!
//! Traversal:
//! - Nested frames (`FrameItem::Group`) are walked depth-first while accumulating transforms
//!   (`group.transform`, then the group's position, then the parent).
//! - Leaves come out in Typst's frame order, which is the order the reassembly step in
//!   `mobject::segment` relies on when it counts paths.
//!
//! Geometry:
//! - Glyphs: outline via the Typst font's `ttf-parser` face, straight into a `lyon` path.
//!   Glyphs without an outline (spaces) produce nothing.
//! - `Geometry::Rect` / `Geometry::Curve` with a fill: one filled leaf.
//! - `Geometry::Line` with a stroke (fraction bars, overlines): a filled thin quad, so it
//!   scales together with the glyphs.
//! - Stroke-only rects/curves are skipped (counted in [`ExtractStats::strokes_skipped`]).
//!
//! Output is in pt with the y axis flipped to point up.
//!
//! Color: solid paints map to [`Rgba`]; anything else (gradients, tilings) becomes
//! `Rgba::BLACK`, the "unset" color that `SingleStringMathTypst` repaints.

use lyon::math::{Transform, point as lyon_point, vector};
use lyon::path::Path;
use typst::{
    layout::{Frame, FrameItem, PagedDocument, Point, Transform as TypstTransform},
    text::TextItem,
    visualize::{CurveItem, Geometry, Paint, Shape},
};

use crate::scene::{Rgba, VMobject};

/// Options controlling extraction behavior.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Enable glyph extraction (text → outlines).
    pub enable_glyphs: bool,

    /// Enable filled shape extraction (rect/curve).
    pub enable_shapes: bool,

    /// Enable line extraction (`Geometry::Line`).
    pub enable_lines: bool,

    /// Thickness used for lines that carry no stroke.
    pub default_line_thickness_pt: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            enable_glyphs: true,
            enable_shapes: true,
            enable_lines: true,
            default_line_thickness_pt: 0.75,
        }
    }
}

/// Basic extraction stats for logging.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractStats {
    pub pages: usize,
    pub groups: usize,
    pub texts_seen: usize,
    pub shapes_seen: usize,

    pub glyphs_emitted: usize,
    pub glyphs_without_outline: usize,
    pub shapes_emitted: usize,
    pub lines_emitted: usize,
    pub strokes_skipped: usize,
}

/// Extract every leaf path of a document, pages stacked top to bottom.
pub fn extract_leaf_paths(doc: &PagedDocument, opts: &RenderOptions) -> (Vec<VMobject>, ExtractStats) {
    let mut out = Vec::new();
    let mut stats = ExtractStats {
        pages: doc.pages.len(),
        ..Default::default()
    };

    let flip = Transform::scale(1.0, -1.0);
    let mut page_offset = 0.0f32;

    for page in &doc.pages {
        let scene_from_page = Transform::translation(0.0, page_offset).then(&flip);
        walk_frame(&page.frame, scene_from_page, opts, &mut out, &mut stats);
        page_offset += page.frame.size().y.to_pt() as f32;
    }

    (out, stats)
}

fn walk_frame(
    frame: &Frame,
    scene_from_frame: Transform,
    opts: &RenderOptions,
    out: &mut Vec<VMobject>,
    stats: &mut ExtractStats,
) {
    for (pos, item) in frame.items() {
        let scene_from_item = translation(*pos).then(&scene_from_frame);

        match item {
            FrameItem::Group(group) => {
                stats.groups += 1;
                let scene_from_group = lyon_from_typst_transform(group.transform).then(&scene_from_item);
                walk_frame(&group.frame, scene_from_group, opts, out, stats);
            }

            FrameItem::Shape(shape, _span) => {
                stats.shapes_seen += 1;
                extract_shape(scene_from_item, shape, opts, out, stats);
            }

            FrameItem::Text(text) => {
                stats.texts_seen += 1;
                if opts.enable_glyphs {
                    extract_glyphs(scene_from_item, text, out, stats);
                }
            }

            _ => {}
        }
    }
}

fn extract_glyphs(
    scene_from_item: Transform,
    text: &TextItem,
    out: &mut Vec<VMobject>,
    stats: &mut ExtractStats,
) {
    let face = text.font.ttf();
    let upm = face.units_per_em() as f32;
    if upm <= 0.0 {
        return;
    }

    let units_to_pt = (text.size.to_pt() as f32) / upm;
    let fill = paint_to_rgba(&text.fill).unwrap_or(Rgba::BLACK);

    let mut pen_x_pt = 0.0f32;

    for g in text.glyphs.iter() {
        let adv_pt = g.x_advance.at(text.size).to_pt() as f32;
        let x_off_pt = g.x_offset.at(text.size).to_pt() as f32;
        let y_off_pt = g.y_offset.at(text.size).to_pt() as f32;

        // Font units are y-up, Typst item space is y-down.
        let item_from_glyph = Transform::scale(units_to_pt, -units_to_pt)
            .then_translate(vector(pen_x_pt + x_off_pt, -y_off_pt));
        let scene_from_glyph = item_from_glyph.then(&scene_from_item);

        let mut builder = LyonOutlineBuilder::new(scene_from_glyph);
        if face
            .outline_glyph(ttf_parser::GlyphId(g.id), &mut builder)
            .is_some()
        {
            out.push(VMobject::leaf(format!("glyph:{}", g.id), builder.build(), fill));
            stats.glyphs_emitted += 1;
        } else {
            stats.glyphs_without_outline += 1;
        }

        pen_x_pt += adv_pt;
    }
}

fn extract_shape(
    scene_from_item: Transform,
    shape: &Shape,
    opts: &RenderOptions,
    out: &mut Vec<VMobject>,
    stats: &mut ExtractStats,
) {
    match &shape.geometry {
        Geometry::Line(delta) if opts.enable_lines => {
            let (color, thickness) = match &shape.stroke {
                Some(stroke) => (
                    paint_to_rgba(&stroke.paint).unwrap_or(Rgba::BLACK),
                    stroke.thickness.to_pt() as f32,
                ),
                None => (Rgba::BLACK, opts.default_line_thickness_pt),
            };

            let end = [delta.x.to_pt() as f32, delta.y.to_pt() as f32];
            if let Some(path) = line_as_rect([0.0, 0.0], end, thickness.max(0.25)) {
                out.push(VMobject::leaf("rule", path.transformed(&scene_from_item), color));
                stats.lines_emitted += 1;
            }
        }

        Geometry::Rect(size) if opts.enable_shapes => {
            let w = size.x.to_pt() as f32;
            let h = size.y.to_pt() as f32;

            let mut b = Path::builder();
            b.begin(lyon_point(0.0, 0.0));
            b.line_to(lyon_point(w, 0.0));
            b.line_to(lyon_point(w, h));
            b.line_to(lyon_point(0.0, h));
            b.close();

            push_filled(b.build(), "rect", scene_from_item, shape, out, stats);
        }

        Geometry::Curve(curve) if opts.enable_shapes => {
            let mut b = Path::builder();
            let mut started = false;

            for item in curve.0.iter() {
                match item {
                    CurveItem::Move(p) => {
                        if started {
                            b.close();
                        }
                        b.begin(lyon_point(p.x.to_pt() as f32, p.y.to_pt() as f32));
                        started = true;
                    }
                    CurveItem::Line(p) => {
                        if !started {
                            b.begin(lyon_point(0.0, 0.0));
                            started = true;
                        }
                        b.line_to(lyon_point(p.x.to_pt() as f32, p.y.to_pt() as f32));
                    }
                    CurveItem::Cubic(p1, p2, p) => {
                        if !started {
                            b.begin(lyon_point(0.0, 0.0));
                            started = true;
                        }
                        b.cubic_bezier_to(
                            lyon_point(p1.x.to_pt() as f32, p1.y.to_pt() as f32),
                            lyon_point(p2.x.to_pt() as f32, p2.y.to_pt() as f32),
                            lyon_point(p.x.to_pt() as f32, p.y.to_pt() as f32),
                        );
                    }
                    CurveItem::Close => {
                        if started {
                            b.close();
                            started = false;
                        }
                    }
                }
            }
            if started {
                b.close();
            }

            push_filled(b.build(), "curve", scene_from_item, shape, out, stats);
        }

        _ => {}
    }
}

fn push_filled(
    path: Path,
    name: &str,
    scene_from_item: Transform,
    shape: &Shape,
    out: &mut Vec<VMobject>,
    stats: &mut ExtractStats,
) {
    match shape.fill.as_ref() {
        Some(fill) => {
            let color = paint_to_rgba(fill).unwrap_or(Rgba::BLACK);
            out.push(VMobject::leaf(name, path.transformed(&scene_from_item), color));
            stats.shapes_emitted += 1;
        }
        None => {
            if shape.stroke.is_some() {
                stats.strokes_skipped += 1;
            }
        }
    }
}

/// Map a Typst `Paint` to a scene color (solid paints only).
fn paint_to_rgba(paint: &Paint) -> Option<Rgba> {
    match paint {
        Paint::Solid(c) => {
            let rgba = c.to_rgb();
            Some(Rgba {
                r: rgba.red as f32,
                g: rgba.green as f32,
                b: rgba.blue as f32,
                a: rgba.alpha as f32,
            })
        }
        _ => None,
    }
}

#[inline]
fn translation(pos: Point) -> Transform {
    Transform::translation(pos.x.to_pt() as f32, pos.y.to_pt() as f32)
}

/// Convert a Typst `Transform` into a lyon (euclid) transform.
///
/// Typst maps `(x, y)` to `(sx*x + kx*y + tx, ky*x + sy*y + ty)`.
fn lyon_from_typst_transform(t: TypstTransform) -> Transform {
    Transform::new(
        t.sx.get() as f32,
        t.ky.get() as f32,
        t.kx.get() as f32,
        t.sy.get() as f32,
        t.tx.to_pt() as f32,
        t.ty.to_pt() as f32,
    )
}

/// A segment as a closed thin rectangle, or `None` when it has no length.
fn line_as_rect(a: [f32; 2], b: [f32; 2], thickness: f32) -> Option<Path> {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-6 {
        return None;
    }

    let nx = -dy / len * 0.5 * thickness;
    let ny = dx / len * 0.5 * thickness;

    let mut pb = Path::builder();
    pb.begin(lyon_point(a[0] + nx, a[1] + ny));
    pb.line_to(lyon_point(a[0] - nx, a[1] - ny));
    pb.line_to(lyon_point(b[0] - nx, b[1] - ny));
    pb.line_to(lyon_point(b[0] + nx, b[1] + ny));
    pb.close();
    Some(pb.build())
}

/// Convert `ttf-parser` outline callbacks into a `lyon::path::Path`, transforming every
/// point on the way in.
///
/// A glyph may contain multiple contours: `move_to` starts a new one, `close` ends it.
struct LyonOutlineBuilder {
    builder: lyon::path::Builder,
    xf: Transform,
    contour_open: bool,
}

impl LyonOutlineBuilder {
    fn new(xf: Transform) -> Self {
        Self {
            builder: Path::builder(),
            xf,
            contour_open: false,
        }
    }

    #[inline]
    fn pt(&self, x: f32, y: f32) -> lyon::math::Point {
        self.xf.transform_point(lyon_point(x, y))
    }

    fn build(mut self) -> Path {
        if self.contour_open {
            self.builder.close();
            self.contour_open = false;
        }
        self.builder.build()
    }
}

impl ttf_parser::OutlineBuilder for LyonOutlineBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        if self.contour_open {
            self.builder.close();
        }
        let p = self.pt(x, y);
        self.builder.begin(p);
        self.contour_open = true;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.pt(x, y);
        self.builder.line_to(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (c, p) = (self.pt(x1, y1), self.pt(x, y));
        self.builder.quadratic_bezier_to(c, p);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (c1, c2, p) = (self.pt(x1, y1), self.pt(x2, y2), self.pt(x, y));
        self.builder.cubic_bezier_to(c1, c2, p);
    }

    fn close(&mut self) {
        if self.contour_open {
            self.builder.close();
            self.contour_open = false;
        }
    }
}
