//! Typst engine integration.
//!
//! This module is responsible for:
//! - owning the shared font store
//! - compiling an in-memory Typst source into a `PagedDocument`
//! - turning Typst diagnostics into [`RenderError::Compile`]

pub mod world;

use std::{sync::Arc, time::Instant};

use typst::layout::PagedDocument;

use crate::typst::renderer::RenderError;
use world::{FontStore, TypstWorld};

/// Compile a complete Typst source into a paged document.
pub fn compile_document(fonts: &Arc<FontStore>, source: &str) -> Result<PagedDocument, RenderError> {
    let start = Instant::now();
    let world = TypstWorld::new(fonts.clone(), "/main.typ", source.to_string());
    let warned = typst::compile::<PagedDocument>(&world);

    if !warned.warnings.is_empty() {
        log::debug!("typst emitted {} warning(s)", warned.warnings.len());
    }

    let result = warned.output.map_err(|errs| {
        let diagnostics = errs
            .iter()
            .map(|d| d.message.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        RenderError::Compile {
            errors: errs.len(),
            diagnostics,
        }
    });

    log::debug!(
        "typst compile {} in {} ms ({} bytes of source)",
        if result.is_ok() { "ok" } else { "failed" },
        start.elapsed().as_millis(),
        source.len()
    );

    result
}
