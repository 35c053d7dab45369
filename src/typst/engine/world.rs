//! Minimal Typst `World` implementation.
//!
//! - Compiles a single in-memory Typst source using **our own** font provisioning.
//! - Provides `library()`, `book()`, `font(index)`, `main()` and `source(main)`.
//! - Keeps everything deterministic and self-contained (no packages, no file imports).
//!
//! Design notes:
//! - Fonts are discovered through `fontdb` (system fonts) once, in [`FontStore::load`].
//!   The store is shared (`Arc`) between every world built from it, so compiling many small
//!   fragments does not re-read font files.
//! - If no system font can be loaded, Typst's embedded `typst-assets` fonts are used instead.
//! - `FontBook` is built from the loaded `Font`s so Typst can select faces, and indices stay
//!   aligned with `font(index)`.

use std::{fs, path::PathBuf, sync::Arc};

use fontdb::{Database, Source as FontSource};
use typst::{
    Library, LibraryExt,
    diag::{FileError, FileResult},
    foundations::{Bytes, Datetime},
    syntax::{FileId, Source as TypstSource, VirtualPath},
    text::{Font, FontBook},
    utils::LazyHash,
};

use crate::typst::renderer::RenderError;

/// Fonts + font book shared by all worlds.
pub struct FontStore {
    book: LazyHash<FontBook>,
    /// Loaded fonts, in the exact order used by `font(index)`.
    fonts: Vec<Font>,
}

impl std::fmt::Debug for FontStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontStore")
            .field("fonts", &self.fonts.len())
            .finish()
    }
}

impl FontStore {
    /// Discover system fonts, falling back to the embedded Typst font set.
    pub fn load() -> Result<Self, RenderError> {
        let mut fonts = load_system_fonts();

        if fonts.is_empty() {
            log::info!("no usable system fonts, falling back to typst-assets");
            fonts = load_embedded_fonts();
        }

        if fonts.is_empty() {
            return Err(RenderError::NoFonts);
        }

        let book = FontBook::from_fonts(fonts.iter());
        log::debug!("font store ready: {} faces", fonts.len());

        Ok(Self {
            book: LazyHash::new(book),
            fonts,
        })
    }

    /// Only Typst's embedded fonts. Deterministic across machines.
    pub fn embedded() -> Result<Self, RenderError> {
        let fonts = load_embedded_fonts();
        if fonts.is_empty() {
            return Err(RenderError::NoFonts);
        }
        let book = FontBook::from_fonts(fonts.iter());
        Ok(Self {
            book: LazyHash::new(book),
            fonts,
        })
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }
}

/// Load file-backed system fonts. Unreadable or unparsable faces are skipped.
fn load_system_fonts() -> Vec<Font> {
    let mut db = Database::new();
    db.load_system_fonts();

    let mut fonts = Vec::new();
    for face in db.faces() {
        let (path, index) = match &face.source {
            FontSource::File(p) => (p.clone(), face.index),
            _ => continue,
        };

        let Ok(data) = fs::read(&path) else {
            continue;
        };

        // `Bytes::new` wants owned `'static` backing storage.
        let owned: Arc<[u8]> = Arc::from(data);
        if let Some(font) = Font::new(Bytes::new(owned), index) {
            fonts.push(font);
        }
    }
    fonts
}

fn load_embedded_fonts() -> Vec<Font> {
    typst_assets::fonts()
        .flat_map(|data| Font::iter(Bytes::new(data)))
        .collect()
}

/// A single-source Typst world.
pub struct TypstWorld {
    main: FileId,
    source: TypstSource,
    library: LazyHash<Library>,
    fonts: Arc<FontStore>,
}

impl TypstWorld {
    pub fn new(fonts: Arc<FontStore>, main_path: &str, text: String) -> Self {
        let main = FileId::new(None, VirtualPath::new(main_path));
        Self {
            main,
            source: TypstSource::new(main, text),
            library: LazyHash::new(Library::default()),
            fonts,
        }
    }
}

impl typst::World for TypstWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.fonts.book
    }

    fn main(&self) -> FileId {
        self.main
    }

    fn source(&self, id: FileId) -> FileResult<TypstSource> {
        if id == self.main {
            Ok(self.source.clone())
        } else {
            Err(FileError::NotFound(PathBuf::from("<memory>")))
        }
    }

    fn file(&self, _id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(PathBuf::from("<memory>")))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        // Expressions never need the date; keep compilation deterministic.
        None
    }
}
