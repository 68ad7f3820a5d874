//! Decoded source volumes and the decoder interface which produces them.
//!
//! A [`VolumeHandle`] is what a decoder hands over for one file: the voxel
//! grid in the decoder's axis order (`[i, j, k]` or `[i, j, k, t]`) along
//! with the [`SourceMetadata`] describing where those voxels sit in
//! physical space.
//!
//! [`VolumeHandle`]: ./struct.VolumeHandle.html
//! [`SourceMetadata`]: ./struct.SourceMetadata.html
use crate::error::Result;
use nalgebra::Matrix4;
use ndarray::ArrayD;
use nifti::NiftiHeader;
use std::path::{Path, PathBuf};

/// Metadata of a decoded file: where it came from, its header and the
/// voxel to physical space affine.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMetadata {
    path: PathBuf,
    header: NiftiHeader,
    affine: Matrix4<f64>,
}

impl SourceMetadata {
    /// Create the metadata of a file, taking the affine from the header
    /// (sform first, then qform, then the affine implied by shape and zooms).
    pub fn new<P: AsRef<Path>>(path: P, header: NiftiHeader) -> Self {
        let affine: Matrix4<f32> = header.affine();
        SourceMetadata {
            path: path.as_ref().to_path_buf(),
            header,
            affine: affine.cast::<f64>(),
        }
    }

    /// Create the metadata of a file with an explicitly given affine.
    pub fn with_affine<P: AsRef<Path>>(path: P, header: NiftiHeader, affine: Matrix4<f64>) -> Self {
        SourceMetadata {
            path: path.as_ref().to_path_buf(),
            header,
            affine,
        }
    }

    /// The path this volume was decoded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The header of the source file.
    pub fn header(&self) -> &NiftiHeader {
        &self.header
    }

    /// Affine mapping voxel indices to physical coordinates.
    pub fn affine(&self) -> &Matrix4<f64> {
        &self.affine
    }

    /// Physical spacing of one voxel step along each voxel axis, in array
    /// axis order. `None` if the header does not declare a usable number
    /// of dimensions.
    pub fn zooms(&self) -> Option<Vec<f64>> {
        let ndim = usize::from(self.header.dim[0]);
        if ndim == 0 || ndim > 7 {
            return None;
        }
        Some(
            self.header.pixdim[1..=ndim]
                .iter()
                .map(|&z| f64::from(z))
                .collect(),
        )
    }
}

/// One decoded source file.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeHandle {
    array: ArrayD<f64>,
    metadata: SourceMetadata,
}

impl VolumeHandle {
    /// Pair a voxel grid with the metadata it was decoded with.
    pub fn new(array: ArrayD<f64>, metadata: SourceMetadata) -> Self {
        VolumeHandle { array, metadata }
    }

    /// The voxel grid, in decoder axis order.
    pub fn array(&self) -> &ArrayD<f64> {
        &self.array
    }

    /// The raw voxel grid shape.
    pub fn shape(&self) -> &[usize] {
        self.array.shape()
    }

    /// The metadata of this volume.
    pub fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    /// Shortcut to the metadata's affine.
    pub fn affine(&self) -> &Matrix4<f64> {
        self.metadata.affine()
    }

    /// Move the voxel grid and the metadata out of the handle.
    pub fn into_parts(self) -> (ArrayD<f64>, SourceMetadata) {
        (self.array, self.metadata)
    }
}

/// Interface for anything which decodes a path into a volume.
///
/// Errors raised by a decoder are handed to the caller unchanged.
pub trait VolumeDecoder {
    /// Decode the file at the given path.
    fn decode(&self, path: &Path) -> Result<VolumeHandle>;
}

impl<'a, D> VolumeDecoder for &'a D
where
    D: VolumeDecoder + ?Sized,
{
    fn decode(&self, path: &Path) -> Result<VolumeHandle> {
        (**self).decode(path)
    }
}
