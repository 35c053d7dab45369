//! Path tessellation helpers.
//!
//! This module converts the vector geometry of a [`VMobject`] tree into renderer-friendly
//! triangle meshes using `lyon::tessellation`.
//!
//! Notes:
//! - Fills use the fill tessellator (closed contours), which is correct for glyph outlines.
//! - Winding / fill rule matters. Fonts are usually authored for non-zero winding; we expose both.
//! - Strokes (rules, underlines) go through the stroke tessellator with the node's stroke width.

use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, FillVertexConstructor,
    StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor, VertexBuffers,
};

use crate::scene::{Rgba, VMobject};

/// Owned CPU triangle mesh with 2D positions.
#[derive(Debug, Clone, Default)]
pub struct Mesh2D {
    pub positions: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl Mesh2D {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// One colored mesh produced by flattening a tree.
///
/// `color.a` already folds in the node's opacity.
#[derive(Debug, Clone)]
pub struct DrawItem2D {
    pub mesh: Mesh2D,
    pub color: Rgba,
}

#[derive(Debug, Copy, Clone)]
pub struct TessellateOptions {
    pub tolerance: f32,
    pub fill_rule: FillRule,
}

impl Default for TessellateOptions {
    fn default() -> Self {
        Self {
            tolerance: 0.001,
            fill_rule: FillRule::NonZero,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TessVertex {
    pub position: [f32; 2],
}

struct TessVertexCtor;

impl FillVertexConstructor<TessVertex> for TessVertexCtor {
    fn new_vertex(&mut self, v: FillVertex) -> TessVertex {
        TessVertex {
            position: v.position().to_array(),
        }
    }
}

impl StrokeVertexConstructor<TessVertex> for TessVertexCtor {
    fn new_vertex(&mut self, v: StrokeVertex) -> TessVertex {
        TessVertex {
            position: v.position().to_array(),
        }
    }
}

pub fn tessellate_fill(path: &Path, opts: TessellateOptions) -> Result<Mesh2D, String> {
    let mut tess = FillTessellator::new();
    let mut buffers: VertexBuffers<TessVertex, u32> = VertexBuffers::new();
    let fill = FillOptions::tolerance(opts.tolerance).with_fill_rule(opts.fill_rule);

    tess.tessellate_path(
        path,
        &fill,
        &mut BuffersBuilder::new(&mut buffers, TessVertexCtor),
    )
    .map_err(|e| format!("lyon fill tessellation failed: {e:?}"))?;

    Ok(mesh_from_buffers(buffers))
}

pub fn tessellate_stroke(
    path: &Path,
    line_width: f32,
    opts: TessellateOptions,
) -> Result<Mesh2D, String> {
    let mut tess = StrokeTessellator::new();
    let mut buffers: VertexBuffers<TessVertex, u32> = VertexBuffers::new();
    let stroke = StrokeOptions::tolerance(opts.tolerance).with_line_width(line_width);

    tess.tessellate_path(
        path,
        &stroke,
        &mut BuffersBuilder::new(&mut buffers, TessVertexCtor),
    )
    .map_err(|e| format!("lyon stroke tessellation failed: {e:?}"))?;

    Ok(mesh_from_buffers(buffers))
}

#[inline]
fn mesh_from_buffers(buffers: VertexBuffers<TessVertex, u32>) -> Mesh2D {
    Mesh2D {
        positions: buffers.vertices.iter().map(|v| v.position).collect(),
        indices: buffers.indices,
    }
}

/// Flatten a tree into draw items in painter's order (pre-order, fill before stroke).
///
/// Fully transparent fills/strokes are skipped. A path that fails to tessellate is logged
/// and skipped rather than aborting the whole flatten.
pub fn flatten(root: &VMobject, opts: TessellateOptions) -> Vec<DrawItem2D> {
    let mut out = Vec::new();

    for node in root.family() {
        let Some(path) = &node.path else {
            continue;
        };

        let fill_alpha = node.color.a * node.fill_opacity;
        if fill_alpha > 0.0 {
            match tessellate_fill(path, opts) {
                Ok(mesh) if !mesh.indices.is_empty() => out.push(DrawItem2D {
                    mesh,
                    color: node.color.with_alpha(fill_alpha),
                }),
                Ok(_) => {}
                Err(err) => log::warn!("skipping fill of {:?}: {err}", node.name),
            }
        }

        if let Some(stroke) = node.stroke {
            let alpha = stroke.color.a * stroke.opacity;
            if stroke.width > 0.0 && alpha > 0.0 {
                match tessellate_stroke(path, stroke.width, opts) {
                    Ok(mesh) if !mesh.indices.is_empty() => out.push(DrawItem2D {
                        mesh,
                        color: stroke.color.with_alpha(alpha),
                    }),
                    Ok(_) => {}
                    Err(err) => log::warn!("skipping stroke of {:?}: {err}", node.name),
                }
            }
        }
    }

    out
}
