//! Scene graph abstractions.
//!
//! This module follows manim's mental model:
//! - You build a picture out of objects ("mobjects") arranged in a tree.
//! - Leaves carry vector geometry (a `lyon::path::Path`), groups only carry children.
//! - Layout operations (`move_to`, `next_to`, `arrange`, `to_edge`) work on bounding boxes.
//!
//! Coordinate conventions:
//! - Scene units, y-up, frame centered on the origin (`FRAME_WIDTH` x `FRAME_HEIGHT`).
//! - Geometry is stored already placed: transforms are applied to the points directly,
//!   so there is no per-node transform to compose when reading bounds.
//!
//! Notes:
//! - This file intentionally does not depend on Typst.
//! - Rendering to triangles lives in [`tessellate`].

pub mod tessellate;

use ecow::EcoString;
use lyon::math::{Transform, vector};
use lyon::path::{Event, Path};

/// A 2D vector / point in scene units.
pub type Vec2 = [f32; 2];

pub const ORIGIN: Vec2 = [0.0, 0.0];
pub const LEFT: Vec2 = [-1.0, 0.0];
pub const RIGHT: Vec2 = [1.0, 0.0];
pub const UP: Vec2 = [0.0, 1.0];
pub const DOWN: Vec2 = [0.0, -1.0];

pub const FRAME_HEIGHT: f32 = 8.0;
pub const FRAME_WIDTH: f32 = FRAME_HEIGHT * 16.0 / 9.0;

pub const SMALL_BUFF: f32 = 0.1;
pub const MED_SMALL_BUFF: f32 = 0.25;
pub const MED_LARGE_BUFF: f32 = 0.5;
pub const DEFAULT_MOBJECT_TO_EDGE_BUFFER: f32 = MED_LARGE_BUFF;

/// The visible frame, centered on the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub width: f32,
    pub height: f32,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
        }
    }
}

/// Axis-aligned bounding box in scene units.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Aabb2 {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl Aabb2 {
    #[inline]
    pub fn from_min_max(min: [f32; 2], max: [f32; 2]) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn empty() -> Self {
        Self {
            min: [f32::INFINITY, f32::INFINITY],
            max: [f32::NEG_INFINITY, f32::NEG_INFINITY],
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0] || self.min[1] > self.max[1]
    }

    #[inline]
    pub fn include_point(&mut self, p: [f32; 2]) {
        self.min[0] = self.min[0].min(p[0]);
        self.min[1] = self.min[1].min(p[1]);
        self.max[0] = self.max[0].max(p[0]);
        self.max[1] = self.max[1].max(p[1]);
    }

    #[inline]
    pub fn union(self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Self {
            min: [self.min[0].min(other.min[0]), self.min[1].min(other.min[1])],
            max: [self.max[0].max(other.max[0]), self.max[1].max(other.max[1])],
        }
    }

    /// Center of the box; the origin for an empty box.
    #[inline]
    pub fn center(&self) -> [f32; 2] {
        if self.is_empty() {
            return ORIGIN;
        }
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        ]
    }

    /// Size of the box; zero for an empty box.
    #[inline]
    pub fn size(&self) -> [f32; 2] {
        if self.is_empty() {
            return [0.0, 0.0];
        }
        [self.max[0] - self.min[0], self.max[1] - self.min[1]]
    }

    /// The point of the box in `direction`.
    ///
    /// Per axis: a positive component picks the max edge, a negative one the min edge,
    /// and zero picks the center. `critical_point(RIGHT)` is the middle of the right edge.
    pub fn critical_point(&self, direction: Vec2) -> Vec2 {
        if self.is_empty() {
            return ORIGIN;
        }
        let center = self.center();
        let mut out = center;
        for axis in 0..2 {
            if direction[axis] > 0.0 {
                out[axis] = self.max[axis];
            } else if direction[axis] < 0.0 {
                out[axis] = self.min[axis];
            }
        }
        out
    }
}

/// Simple RGBA color (linear space assumed; your renderer may treat as sRGB).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const RED: Self = Self::rgb(0.988, 0.384, 0.333);
    pub const GREEN: Self = Self::rgb(0.514, 0.757, 0.404);
    pub const BLUE: Self = Self::rgb(0.345, 0.769, 0.867);
    pub const YELLOW: Self = Self::rgb(1.0, 1.0, 0.0);

    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// Stroke style for outlined geometry (rules, underlines).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f32,
    pub opacity: f32,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            color: Rgba::WHITE,
            width: 0.04,
            opacity: 1.0,
        }
    }
}

/// A vectorized mobject: a node in the scene tree.
///
/// Each node has:
/// - optional leaf geometry (`path`), already in scene coordinates
/// - fill color + opacity, optional stroke
/// - children
/// - an optional `anchor` point, which gives pathless nodes a position so that layout
///   operations on them still behave
/// - an optional `source` text, used by Typst objects to remember which fragment of the
///   input a node was built from
#[derive(Debug, Clone)]
pub struct VMobject {
    pub name: String,
    pub path: Option<Path>,

    pub color: Rgba,
    pub fill_opacity: f32,
    pub stroke: Option<Stroke>,

    pub anchor: Option<Vec2>,
    pub source: Option<EcoString>,

    /// Whether `set_color` recurses into children.
    pub propagate_colors: bool,

    pub children: Vec<VMobject>,
}

impl Default for VMobject {
    fn default() -> Self {
        Self {
            name: "vmobject".to_string(),
            path: None,
            color: Rgba::WHITE,
            fill_opacity: 1.0,
            stroke: None,
            anchor: None,
            source: None,
            propagate_colors: true,
            children: Vec::new(),
        }
    }
}

impl VMobject {
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A filled leaf path.
    pub fn leaf(name: impl Into<String>, path: Path, color: Rgba) -> Self {
        Self {
            name: name.into(),
            path: Some(path),
            color,
            ..Default::default()
        }
    }

    pub fn group(name: impl Into<String>, children: Vec<VMobject>) -> Self {
        Self {
            name: name.into(),
            children,
            ..Default::default()
        }
    }

    /// A pathless node positioned at `at`.
    pub fn anchored(name: impl Into<String>, at: Vec2) -> Self {
        Self {
            name: name.into(),
            anchor: Some(at),
            ..Default::default()
        }
    }

    /// A stroked straight segment.
    pub fn line(start: Vec2, end: Vec2, stroke: Stroke) -> Self {
        let mut b = Path::builder();
        b.begin(lyon::math::point(start[0], start[1]));
        b.line_to(lyon::math::point(end[0], end[1]));
        b.end(false);

        Self {
            name: "line".to_string(),
            path: Some(b.build()),
            color: stroke.color,
            fill_opacity: 0.0,
            stroke: Some(stroke),
            ..Default::default()
        }
    }

    #[inline]
    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    #[inline]
    pub fn with_source(mut self, source: impl Into<EcoString>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The recorded source text, or `""` for nodes that have none.
    #[inline]
    pub fn source_text(&self) -> &str {
        self.source.as_deref().unwrap_or("")
    }

    #[inline]
    pub fn add_child(&mut self, child: VMobject) {
        self.children.push(child);
    }

    /// Insert `child` first, so it is drawn behind its siblings.
    #[inline]
    pub fn add_to_back(&mut self, child: VMobject) {
        self.children.insert(0, child);
    }

    /// This node and all descendants, pre-order.
    pub fn family(&self) -> Vec<&VMobject> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.family());
        }
        out
    }

    /// Number of nodes in this subtree that carry geometry.
    pub fn leaf_count(&self) -> usize {
        usize::from(self.path.is_some())
            + self.children.iter().map(VMobject::leaf_count).sum::<usize>()
    }

    pub fn bounds(&self) -> Aabb2 {
        let mut bounds = Aabb2::empty();

        if let Some(path) = &self.path {
            bounds = bounds.union(path_bounds(path));
        }
        if let Some(anchor) = self.anchor {
            bounds.include_point(anchor);
        }
        for child in &self.children {
            bounds = bounds.union(child.bounds());
        }

        bounds
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.bounds().size()[0]
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bounds().size()[1]
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    #[inline]
    pub fn critical_point(&self, direction: Vec2) -> Vec2 {
        self.bounds().critical_point(direction)
    }

    /// Apply an affine transform to every point in the subtree.
    pub fn apply_transform(&mut self, xf: &Transform) {
        if let Some(path) = self.path.take() {
            self.path = Some(path.transformed(xf));
        }
        if let Some(anchor) = self.anchor {
            let p = xf.transform_point(lyon::math::point(anchor[0], anchor[1]));
            self.anchor = Some([p.x, p.y]);
        }
        for child in &mut self.children {
            child.apply_transform(xf);
        }
    }

    pub fn shift(&mut self, by: Vec2) {
        if by == ORIGIN {
            return;
        }
        self.apply_transform(&Transform::translation(by[0], by[1]));
    }

    /// Uniformly scale about the center of the bounding box.
    pub fn scale(&mut self, factor: f32) {
        let about = self.center();
        self.scale_about(factor, about);
    }

    pub fn scale_about(&mut self, factor: f32, about: Vec2) {
        let xf = Transform::translation(-about[0], -about[1])
            .then_scale(factor, factor)
            .then_translate(vector(about[0], about[1]));
        self.apply_transform(&xf);
    }

    /// Move so that the point of this object in `aligned_edge` lands on `target`.
    pub fn move_to(&mut self, target: Vec2, aligned_edge: Vec2) {
        let current = self.critical_point(aligned_edge);
        self.shift([target[0] - current[0], target[1] - current[1]]);
    }

    /// Place this object beside `target` in `direction`, `buff` apart.
    pub fn next_to(&mut self, target: Aabb2, direction: Vec2, buff: f32, aligned_edge: Vec2) {
        let target_point = target.critical_point(add(aligned_edge, direction));
        let point_to_align = self.critical_point(sub(aligned_edge, direction));
        self.shift([
            target_point[0] - point_to_align[0] + buff * direction[0],
            target_point[1] - point_to_align[1] + buff * direction[1],
        ]);
    }

    /// Scale uniformly to `width`. Degenerate (zero-width) objects are left alone.
    pub fn set_width(&mut self, width: f32) {
        let current = self.width();
        if current > 0.0 {
            self.scale(width / current);
        }
    }

    /// Scale uniformly to `height`. Degenerate (zero-height) objects are left alone.
    pub fn set_height(&mut self, height: f32) {
        let current = self.height();
        if current > 0.0 {
            self.scale(height / current);
        }
    }

    pub fn match_width(&mut self, other: &VMobject) {
        self.set_width(other.width());
    }

    /// Lay children out one after another in `direction`, then center the group on the origin.
    pub fn arrange(&mut self, direction: Vec2, aligned_edge: Vec2, buff: f32) {
        for i in 1..self.children.len() {
            let prev = self.children[i - 1].bounds();
            self.children[i].next_to(prev, direction, buff, aligned_edge);
        }
        self.move_to(ORIGIN, ORIGIN);
    }

    /// Push against the frame border in `edge`, keeping `buff` distance.
    pub fn to_edge(&mut self, edge: Vec2, buff: f32, frame: Frame) {
        let sx = sign(edge[0]);
        let sy = sign(edge[1]);
        let target = [sx * frame.width * 0.5, sy * frame.height * 0.5];
        let current = self.critical_point(edge);
        self.shift([
            (target[0] - current[0] - buff * edge[0]) * sx.abs(),
            (target[1] - current[1] - buff * edge[1]) * sy.abs(),
        ]);
    }

    /// Reorder children left to right by the x of their centers.
    pub fn sort_children_by_x(&mut self) {
        self.children
            .sort_by(|a, b| a.center()[0].total_cmp(&b.center()[0]));
    }

    /// Set fill and stroke color; recurses into children when `propagate_colors` is set.
    pub fn set_color(&mut self, color: Rgba) {
        self.color = color;
        if let Some(stroke) = &mut self.stroke {
            stroke.color = color;
        }
        if self.propagate_colors {
            for child in &mut self.children {
                child.set_color(color);
            }
        }
    }

    /// Set fill color and/or fill opacity on the whole subtree.
    pub fn set_fill(&mut self, color: Option<Rgba>, opacity: Option<f32>) {
        if let Some(color) = color {
            self.color = color;
        }
        if let Some(opacity) = opacity {
            self.fill_opacity = opacity.clamp(0.0, 1.0);
        }
        for child in &mut self.children {
            child.set_fill(color, opacity);
        }
    }

    /// Set fill and stroke opacity on the whole subtree.
    pub fn set_opacity(&mut self, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        self.fill_opacity = opacity;
        if let Some(stroke) = &mut self.stroke {
            stroke.opacity = opacity;
        }
        for child in &mut self.children {
            child.set_opacity(opacity);
        }
    }
}

/// Conservative bounds of a path: endpoints plus control points.
pub fn path_bounds(path: &Path) -> Aabb2 {
    let mut bounds = Aabb2::empty();
    for event in path.iter() {
        match event {
            Event::Begin { at } => bounds.include_point(at.to_array()),
            Event::Line { to, .. } => bounds.include_point(to.to_array()),
            Event::Quadratic { ctrl, to, .. } => {
                bounds.include_point(ctrl.to_array());
                bounds.include_point(to.to_array());
            }
            Event::Cubic {
                ctrl1, ctrl2, to, ..
            } => {
                bounds.include_point(ctrl1.to_array());
                bounds.include_point(ctrl2.to_array());
                bounds.include_point(to.to_array());
            }
            Event::End { .. } => {}
        }
    }
    bounds
}

#[inline]
fn add(a: Vec2, b: Vec2) -> Vec2 {
    [a[0] + b[0], a[1] + b[1]]
}

#[inline]
fn sub(a: Vec2, b: Vec2) -> Vec2 {
    [a[0] - b[0], a[1] - b[1]]
}

#[inline]
fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// An axis-aligned rectangle path, handy for tests and placeholder geometry.
pub fn rect_path(min: Vec2, max: Vec2) -> Path {
    let mut b = Path::builder();
    b.begin(lyon::math::point(min[0], min[1]));
    b.line_to(lyon::math::point(max[0], min[1]));
    b.line_to(lyon::math::point(max[0], max[1]));
    b.line_to(lyon::math::point(min[0], max[1]));
    b.close();
    b.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box(x: f32, y: f32) -> VMobject {
        VMobject::leaf("box", rect_path([x, y], [x + 1.0, y + 1.0]), Rgba::BLACK)
    }

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a[0] - b[0]).abs() < 1e-4 && (a[1] - b[1]).abs() < 1e-4
    }

    #[test]
    fn bounds_cover_children_and_anchor() {
        let mut g = VMobject::group("g", vec![unit_box(0.0, 0.0), unit_box(3.0, 1.0)]);
        g.add_child(VMobject::anchored("a", [-2.0, 0.5]));
        let b = g.bounds();
        assert_eq!(b.min, [-2.0, 0.0]);
        assert_eq!(b.max, [4.0, 2.0]);
        assert_eq!(g.leaf_count(), 2);
    }

    #[test]
    fn empty_node_has_zero_size_and_origin_center() {
        let m = VMobject::new("empty");
        assert_eq!(m.width(), 0.0);
        assert_eq!(m.height(), 0.0);
        assert_eq!(m.center(), ORIGIN);
    }

    #[test]
    fn critical_points_pick_edges() {
        let m = unit_box(0.0, 0.0);
        assert_eq!(m.critical_point(RIGHT), [1.0, 0.5]);
        assert_eq!(m.critical_point(add(UP, LEFT)), [0.0, 1.0]);
        assert_eq!(m.critical_point(ORIGIN), [0.5, 0.5]);
    }

    #[test]
    fn scale_keeps_center() {
        let mut m = unit_box(2.0, 2.0);
        m.scale(3.0);
        assert!(approx(m.center(), [2.5, 2.5]));
        assert!((m.width() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn move_to_aligns_requested_edge() {
        let mut m = unit_box(0.0, 0.0);
        m.move_to([10.0, 0.0], RIGHT);
        assert!(approx(m.critical_point(RIGHT), [10.0, 0.0]));
    }

    #[test]
    fn next_to_leaves_buff_gap() {
        let target = unit_box(0.0, 0.0);
        let mut m = unit_box(5.0, 5.0);
        m.next_to(target.bounds(), LEFT, 0.25, ORIGIN);
        let b = m.bounds();
        assert!((b.max[0] - -0.25).abs() < 1e-4);
        assert!((m.center()[1] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn arrange_stacks_down_left_aligned_and_centers() {
        let mut g = VMobject::group(
            "g",
            vec![
                VMobject::leaf("a", rect_path([0.0, 0.0], [4.0, 1.0]), Rgba::BLACK),
                VMobject::leaf("b", rect_path([7.0, 7.0], [9.0, 8.0]), Rgba::BLACK),
            ],
        );
        g.arrange(DOWN, LEFT, 0.5);

        let a = g.children[0].bounds();
        let b = g.children[1].bounds();
        assert!((a.min[0] - b.min[0]).abs() < 1e-4);
        assert!((a.min[1] - b.max[1] - 0.5).abs() < 1e-4);
        assert!(approx(g.center(), ORIGIN));
    }

    #[test]
    fn to_edge_moves_only_along_edge_axis() {
        let mut m = unit_box(1.0, 0.0);
        m.to_edge(UP, 0.5, Frame::default());
        let b = m.bounds();
        assert!((b.max[1] - (FRAME_HEIGHT * 0.5 - 0.5)).abs() < 1e-4);
        assert!((b.min[0] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn set_color_respects_propagation_flag() {
        let mut g = VMobject::group("g", vec![unit_box(0.0, 0.0)]);
        g.propagate_colors = false;
        g.set_color(Rgba::RED);
        assert_eq!(g.color, Rgba::RED);
        assert_eq!(g.children[0].color, Rgba::BLACK);

        g.propagate_colors = true;
        g.set_color(Rgba::BLUE);
        assert_eq!(g.children[0].color, Rgba::BLUE);
    }

    #[test]
    fn opacity_reaches_strokes_and_leaves() {
        let mut g = VMobject::group(
            "g",
            vec![
                unit_box(0.0, 0.0),
                VMobject::line(LEFT, RIGHT, Stroke::default()),
            ],
        );
        g.set_opacity(0.3);
        assert_eq!(g.children[0].fill_opacity, 0.3);
        assert_eq!(g.children[1].stroke.map(|s| s.opacity), Some(0.3));

        g.set_fill(None, Some(1.0));
        assert_eq!(g.children[0].fill_opacity, 1.0);
    }

    #[test]
    fn line_width_can_be_set() {
        let mut line = VMobject::line(LEFT, RIGHT, Stroke::default());
        assert!((line.width() - 2.0).abs() < 1e-4);
        line.set_width(6.0);
        assert!((line.width() - 6.0).abs() < 1e-4);
        assert!(approx(line.center(), ORIGIN));
    }

    #[test]
    fn add_to_back_inserts_first() {
        let mut g = VMobject::group("g", vec![unit_box(0.0, 0.0)]);
        g.add_to_back(VMobject::new("dot"));
        assert_eq!(g.children[0].name, "dot");
    }
}
