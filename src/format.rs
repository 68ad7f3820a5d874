//! Volume formats known to this crate.
//!
//! A format declares the file extensions it claims and decodes files into
//! [`VolumeHandle`]s. Formats which can also write implement
//! [`VolumeFormat::encode`].
//!
//! [`VolumeHandle`]: ../source/struct.VolumeHandle.html
//! [`VolumeFormat::encode`]: ./trait.VolumeFormat.html#method.encode
use crate::error::{LayerError, Result};
use crate::source::{SourceMetadata, VolumeDecoder, VolumeHandle};
use crate::util::header_file_for;
use log::debug;
use ndarray::ArrayViewD;
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use std::fmt::Debug;
use std::path::Path;

/// A volumetric file format.
pub trait VolumeFormat: VolumeDecoder + Debug + Send + Sync {
    /// A short name for the format.
    fn name(&self) -> &'static str;

    /// Extensions claimed by this format, lowercase and with a leading dot,
    /// without compression suffixes.
    fn extensions(&self) -> &'static [&'static str];

    /// Extensions this format is able to write to.
    fn writable_extensions(&self) -> &'static [&'static str] {
        &[]
    }

    /// Write a volume in decoder axis order, using `reference` for every
    /// header field which does not depend on the data itself.
    fn encode(&self, path: &Path, data: ArrayViewD<f64>, reference: &NiftiHeader) -> Result<()> {
        let _ = (path, data, reference);
        Err(LayerError::ReadOnlyFormat(self.name()))
    }
}

/// The NIfTI-1 format, either as a single `.nii` file or as a
/// `.hdr`/`.img` pair, optionally gzip compressed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NiftiFormat;

impl VolumeDecoder for NiftiFormat {
    fn decode(&self, path: &Path) -> Result<VolumeHandle> {
        // pairs are always read through the header file
        let header_path = header_file_for(path);
        let object = ReaderOptions::new().read_file(&header_path)?;
        let header = object.header().clone();
        let array = object.into_volume().into_ndarray::<f64>()?;
        debug!("decoded {} with shape {:?}", path.display(), array.shape());
        Ok(VolumeHandle::new(array, SourceMetadata::new(path, header)))
    }
}

impl VolumeFormat for NiftiFormat {
    fn name(&self) -> &'static str {
        "nifti1"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".nii", ".hdr", ".img"]
    }

    fn writable_extensions(&self) -> &'static [&'static str] {
        &[".nii"]
    }

    fn encode(&self, path: &Path, data: ArrayViewD<f64>, reference: &NiftiHeader) -> Result<()> {
        WriterOptions::new(path)
            .reference_header(reference)
            .write_nifti(&data)?;
        debug!("wrote {} with shape {:?}", path.display(), data.shape());
        Ok(())
    }
}
