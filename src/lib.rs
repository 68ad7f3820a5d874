//! Load NIfTI-1 volumes as image layers aligned for axis-indexed viewers.
//!
//! Volumes are decoded in their native voxel order, reoriented so that
//! the array axes run `[z, y, x]` from the far corner of the anatomical
//! axes, and paired with the physical size of each axis. Several files
//! given together are stacked along a new leading axis; 4-D files keep
//! their time axis in front.
//!
//! # Example
//!
//! ```no_run
//! use nifti_layers::{read_layers, PathInput};
//! # use nifti_layers::Result;
//! # fn run() -> Result<()> {
//! let layers = read_layers(&PathInput::from("T1w.nii.gz"))?;
//! let layer = &layers[0];
//! println!("{:?} at scale {:?}", layer.data.shape(), layer.kwargs.scale);
//! # Ok(())
//! # }
//! ```
//!
//! The plugin hooks [`get_reader`] and [`get_writer`] follow the calling
//! conventions of a host viewer: they return `None` for inputs this crate
//! does not handle, so that other plugins may be tried.
//!
//! [`get_reader`]: ./reader/fn.get_reader.html
//! [`get_writer`]: ./writer/fn.get_writer.html
#![deny(missing_debug_implementations)]
#![warn(missing_docs, unused_extern_crates, trivial_casts, unused_results)]

#[macro_use]
extern crate quick_error;

pub mod align;
pub mod error;
pub mod format;
pub mod layer;
pub mod orientation;
pub mod reader;
pub mod registry;
pub mod source;
pub mod spacing;
mod util;
pub mod writer;

pub use align::{AlignOptions, NormalizedVolume, SourceInfo, VolumeAligner, VolumeLayout};
pub use error::{LayerError, Result};
pub use format::{NiftiFormat, VolumeFormat};
pub use layer::{LayerData, LayerKwargs, LayerType};
pub use orientation::{AxisCode, OrientationCode, OrientationTransform, Polarity};
pub use reader::{get_reader, read_layers, read_layers_with, PathInput, ReaderFn};
pub use registry::FormatRegistry;
pub use source::{SourceMetadata, VolumeDecoder, VolumeHandle};
pub use spacing::{Spacing, SpacingFallback};
pub use writer::{get_writer, write_image, write_layers, WriterFn};
