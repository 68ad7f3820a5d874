//! Reader hook for host viewers.
//!
//! A host hands a path, or a list of paths forming one item, to
//! [`get_reader`]. If the format is recognized, it gets back a function
//! which reads the same argument into a list of layers.
//!
//! ```no_run
//! use nifti_layers::{get_reader, PathInput};
//! # use nifti_layers::Result;
//!
//! # fn run() -> Result<()> {
//! let input = PathInput::from(vec!["run-01.nii.gz", "run-02.nii.gz"]);
//! if let Some(reader) = get_reader(&input) {
//!     for layer in reader(&input)? {
//!         println!("{:?} {:?}", layer.data.shape(), layer.kwargs.scale);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`get_reader`]: ./fn.get_reader.html
use crate::align::{AlignOptions, VolumeAligner};
use crate::error::Result;
use crate::layer::LayerData;
use crate::registry::FormatRegistry;
use crate::util::split_ext_addext;
use std::path::{Path, PathBuf};

/// One path, or an ordered list of paths to be read as a single item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathInput {
    /// A single file.
    Single(PathBuf),
    /// Files stacked in order along a new leading axis.
    Stack(Vec<PathBuf>),
}

impl PathInput {
    /// All paths, in order.
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            PathInput::Single(path) => vec![path.as_path()],
            PathInput::Stack(paths) => paths.iter().map(PathBuf::as_path).collect(),
        }
    }

    /// The path whose extension decides the format.
    pub fn first(&self) -> Option<&Path> {
        match self {
            PathInput::Single(path) => Some(path),
            PathInput::Stack(paths) => paths.first().map(PathBuf::as_path),
        }
    }
}

impl From<PathBuf> for PathInput {
    fn from(path: PathBuf) -> Self {
        PathInput::Single(path)
    }
}

impl<'a> From<&'a Path> for PathInput {
    fn from(path: &'a Path) -> Self {
        PathInput::Single(path.to_path_buf())
    }
}

impl<'a> From<&'a str> for PathInput {
    fn from(path: &'a str) -> Self {
        PathInput::Single(PathBuf::from(path))
    }
}

impl From<String> for PathInput {
    fn from(path: String) -> Self {
        PathInput::Single(PathBuf::from(path))
    }
}

impl<P> From<Vec<P>> for PathInput
where
    P: Into<PathBuf>,
{
    fn from(paths: Vec<P>) -> Self {
        PathInput::Stack(paths.into_iter().map(Into::into).collect())
    }
}

/// Function reading a path or list of paths into layers.
pub type ReaderFn = fn(&PathInput) -> Result<Vec<LayerData>>;

/// Whether the first path of `input` has an extension known to `registry`.
pub fn recognize(registry: &FormatRegistry, input: &PathInput) -> bool {
    input.first().map_or(false, |path| registry.recognizes(path))
}

/// Return the reader for `input` if its format is recognized, looking
/// only at the first path.
pub fn get_reader(input: &PathInput) -> Option<ReaderFn> {
    if recognize(FormatRegistry::global(), input) {
        Some(read_layers)
    } else {
        None
    }
}

/// Read `input` into a single image layer, using every registered format
/// and default options.
pub fn read_layers(input: &PathInput) -> Result<Vec<LayerData>> {
    read_layers_with(FormatRegistry::global(), AlignOptions::default(), input)
}

/// Read `input` into a single image layer with the given formats and
/// options. The layer is named after the first file.
pub fn read_layers_with(
    registry: &FormatRegistry,
    options: AlignOptions,
    input: &PathInput,
) -> Result<Vec<LayerData>> {
    let volume = VolumeAligner::with_options(registry, options).load_and_align(input)?;
    let name = input
        .first()
        .map(|path| split_ext_addext(path).file_root().to_owned());
    Ok(vec![LayerData::from_volume(volume, name)])
}
