//! Registry of the volume formats available to the reader and writer.
//!
//! The set of recognized extensions is the union of every registered
//! format's declared extensions. The process wide registry is built once,
//! on first use, and never changes afterwards.
use crate::error::{LayerError, Result};
use crate::format::{NiftiFormat, VolumeFormat};
use crate::source::{VolumeDecoder, VolumeHandle};
use crate::util::split_ext_addext;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

static NIFTI: NiftiFormat = NiftiFormat;

static GLOBAL_REGISTRY: OnceLock<FormatRegistry> = OnceLock::new();

/// Registry of volume formats, looked up by file extension.
#[derive(Debug)]
pub struct FormatRegistry {
    formats: Vec<&'static dyn VolumeFormat>,
    extensions: BTreeSet<String>,
}

impl FormatRegistry {
    /// Create a registry over the given formats. Formats registered first
    /// take precedence when two of them claim the same extension.
    pub fn new(formats: Vec<&'static dyn VolumeFormat>) -> Self {
        let extensions = formats
            .iter()
            .flat_map(|f| f.extensions().iter())
            .map(|ext| ext.to_ascii_lowercase())
            .collect();
        FormatRegistry {
            formats,
            extensions,
        }
    }

    /// The registry of all formats built into this crate.
    pub fn builtin() -> Self {
        let formats: Vec<&'static dyn VolumeFormat> = vec![&NIFTI];
        FormatRegistry::new(formats)
    }

    /// The process wide registry, built from the builtin formats on first use.
    pub fn global() -> &'static FormatRegistry {
        GLOBAL_REGISTRY.get_or_init(FormatRegistry::builtin)
    }

    /// All recognized extensions, lowercase and in sorted order.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    /// Whether the extension of `path` (ignoring any compression suffix)
    /// is recognized, compared case-insensitively.
    pub fn recognizes<P: AsRef<Path>>(&self, path: P) -> bool {
        let ext = split_ext_addext(path).ext_lowercase();
        self.extensions.contains(&ext)
    }

    /// The format claiming the extension of `path`.
    pub fn format_for<P: AsRef<Path>>(&self, path: P) -> Option<&'static dyn VolumeFormat> {
        let ext = split_ext_addext(path).ext_lowercase();
        self.formats
            .iter()
            .copied()
            .find(|f| f.extensions().iter().any(|e| e.eq_ignore_ascii_case(&ext)))
    }

    /// The format able to write to `path`.
    pub fn writer_for<P: AsRef<Path>>(&self, path: P) -> Option<&'static dyn VolumeFormat> {
        let ext = split_ext_addext(path).ext_lowercase();
        self.formats
            .iter()
            .copied()
            .find(|f| f.writable_extensions().iter().any(|e| e.eq_ignore_ascii_case(&ext)))
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl VolumeDecoder for FormatRegistry {
    fn decode(&self, path: &Path) -> Result<VolumeHandle> {
        let format = self
            .format_for(path)
            .ok_or_else(|| LayerError::UnsupportedExtension(path.to_path_buf()))?;
        format.decode(path)
    }
}
