//! Loading volumes and aligning them to the display orientation.
//!
//! The [`VolumeAligner`] decodes one file or an ordered list of files,
//! stacks them if needed, reorients the spatial axes to
//! [`OrientationCode::DISPLAY`] and derives the scale of every axis.
//!
//! The resulting array layouts are:
//!
//! | input                          | decoded          | aligned          |
//! |--------------------------------|------------------|------------------|
//! | one 3-D file                   | `[i, j, k]`      | `[z, y, x]`      |
//! | one 2-D file                   | `[i, j]`         | `[z, y, x]`, `z` of length 1 at most |
//! | one 4-D file                   | `[i, j, k, t]`   | `[t, z, y, x]`   |
//! | `n` 3-D files                  | `n × [i, j, k]`  | `[n, z, y, x]`   |
//!
//! [`VolumeAligner`]: ./struct.VolumeAligner.html
//! [`OrientationCode::DISPLAY`]: ../orientation/struct.OrientationCode.html#associatedconstant.DISPLAY
use crate::error::{LayerError, Result};
use crate::orientation::{OrientationCode, OrientationTransform};
use crate::reader::PathInput;
use crate::source::{SourceMetadata, VolumeDecoder, VolumeHandle};
use crate::spacing::{translation, Spacing};
use log::{debug, warn};
use ndarray::{ArrayD, Axis};

/// Options for aligning volumes.
///
/// # Example
///
/// ```
/// use nifti_layers::AlignOptions;
///
/// let options = AlignOptions::new().apply_translation(true);
/// assert!(options.translation_applied());
/// assert!(!options.scale_follows_axes());
/// assert!(!AlignOptions::default().translation_applied());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AlignOptions {
    apply_translation: bool,
    scale_along_axes: bool,
}

impl AlignOptions {
    /// Default options: no translation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether to place volumes at the offset given by their affine.
    ///
    /// Off by default: rotated affines cannot be represented by a scale
    /// and a translation alone, so only the orientation is applied.
    pub fn apply_translation(mut self, apply: bool) -> Self {
        self.apply_translation = apply;
        self
    }

    /// Whether translation is applied.
    pub fn translation_applied(&self) -> bool {
        self.apply_translation
    }

    /// Whether to reorder the header spacing along with the voxel axes.
    ///
    /// Off by default, in which case the first three spacings are simply
    /// reversed. That is only right for volumes stored in canonical axis
    /// order; with this option, a volume stored e.g. sagittally gets each
    /// spacing on the display axis its voxel axis ended up on.
    pub fn scale_along_axes(mut self, along: bool) -> Self {
        self.scale_along_axes = along;
        self
    }

    /// Whether the spacing follows the voxel axes.
    pub fn scale_follows_axes(&self) -> bool {
        self.scale_along_axes
    }
}

/// How the axes of an aligned array relate to the source files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeLayout {
    /// A single spatial volume, `[z, y, x]`.
    Volume,
    /// A single file with a time axis, `[t, z, y, x]`.
    TimeSeries {
        /// number of time points
        frames: usize,
    },
    /// Several files stacked along a new leading axis, `[n, z, y, x]`.
    Stack {
        /// number of stacked files
        members: usize,
    },
}

impl VolumeLayout {
    /// Number of non-spatial axes in front of the spatial ones.
    pub fn leading_axes(&self) -> usize {
        match self {
            VolumeLayout::Volume => 0,
            VolumeLayout::TimeSeries { .. } | VolumeLayout::Stack { .. } => 1,
        }
    }
}

/// Where an aligned volume came from, with everything needed to undo the
/// alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    /// Metadata of the first decoded file.
    pub metadata: SourceMetadata,
    /// Layout of the aligned array.
    pub layout: VolumeLayout,
    /// Native orientation of the first file.
    pub orientation: OrientationCode,
    /// Shape of the first file's voxel grid, as decoded.
    pub source_shape: Vec<usize>,
}

impl SourceInfo {
    /// The transform which took the source voxels to display order.
    pub fn transform(&self) -> OrientationTransform {
        OrientationTransform::between(&self.orientation, &OrientationCode::DISPLAY)
    }
}

/// A volume aligned to the display orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedVolume {
    /// Voxels in display axis order, in standard layout.
    pub array: ArrayD<f64>,
    /// Physical size of one step along each array axis.
    pub scale: Vec<f64>,
    /// Offset of each array axis.
    pub translate: Vec<f64>,
    /// Spacing read from the source header.
    pub spacing: Spacing,
    /// Provenance of the volume.
    pub source: SourceInfo,
}

/// Loads volumes through a decoder and aligns them to the display
/// orientation.
#[derive(Debug, Clone)]
pub struct VolumeAligner<D> {
    decoder: D,
    options: AlignOptions,
}

impl<D> VolumeAligner<D>
where
    D: VolumeDecoder,
{
    /// Create an aligner with default options.
    pub fn new(decoder: D) -> Self {
        Self::with_options(decoder, AlignOptions::default())
    }

    /// Create an aligner with the given options.
    pub fn with_options(decoder: D, options: AlignOptions) -> Self {
        VolumeAligner { decoder, options }
    }

    /// The options of this aligner.
    pub fn options(&self) -> &AlignOptions {
        &self.options
    }

    /// Decode every path of `input` and align the result.
    ///
    /// # Errors
    ///
    /// - `LayerError::EmptyInput` if `input` holds no path.
    /// - any error of the decoder, unchanged.
    /// - see [`align`](#method.align).
    pub fn load_and_align(&self, input: &PathInput) -> Result<NormalizedVolume> {
        let paths = input.paths();
        if paths.is_empty() {
            return Err(LayerError::EmptyInput);
        }
        let handles = paths
            .iter()
            .map(|path| self.decoder.decode(path))
            .collect::<Result<Vec<_>>>()?;
        self.align(handles)
    }

    /// Align already decoded volumes. Several handles are stacked in the
    /// given order; the first one provides the metadata of the result.
    ///
    /// # Errors
    ///
    /// - `LayerError::EmptyInput` if `handles` is empty.
    /// - `LayerError::ShapeMismatch` if handles have different shapes.
    /// - `LayerError::StackedTimeSeries` when stacking volumes with more
    ///   than three axes.
    /// - `LayerError::UnsupportedDimensionality` for a single volume with
    ///   more than four axes.
    pub fn align(&self, handles: Vec<VolumeHandle>) -> Result<NormalizedVolume> {
        let mut handles = handles.into_iter();
        let (first, metadata) = match handles.next() {
            Some(handle) => handle.into_parts(),
            None => return Err(LayerError::EmptyInput),
        };
        let rest: Vec<VolumeHandle> = handles.collect();
        let source_shape = first.shape().to_vec();

        let (array, layout) = if rest.is_empty() {
            single(first)?
        } else {
            stacked(first, &metadata, rest)?
        };

        let orientation = OrientationCode::from_affine(metadata.affine());
        debug!(
            "{} is oriented {}, layout {:?}",
            metadata.path().display(),
            orientation.labels(),
            layout
        );
        let transform = OrientationTransform::between(&orientation, &OrientationCode::DISPLAY);
        let array = match layout {
            VolumeLayout::Volume => transform.apply(array, 0)?,
            VolumeLayout::Stack { .. } => transform.apply(array, 1)?,
            // time comes last in the file, first in the viewer
            VolumeLayout::TimeSeries { .. } => transform
                .apply(array, 0)?
                .permuted_axes(vec![3, 0, 1, 2]),
        };
        let array = array.as_standard_layout().into_owned();

        let spacing = Spacing::from_zooms(metadata.zooms().as_deref());
        if let Spacing::Fallback(reason) = &spacing {
            warn!("{}: {}, using unit scale", metadata.path().display(), reason);
        }
        let scale = if self.options.scale_along_axes {
            spacing.scale_along(&transform, array.ndim())
        } else {
            spacing.scale(array.ndim())
        };
        let translate = translation(
            metadata.affine(),
            &OrientationCode::DISPLAY,
            array.ndim(),
            self.options.apply_translation,
        );

        Ok(NormalizedVolume {
            array,
            scale,
            translate,
            spacing,
            source: SourceInfo {
                metadata,
                layout,
                orientation,
                source_shape,
            },
        })
    }
}

/// Pad with trailing unit axes up to three spatial axes, never squeezing.
fn pad_spatial(mut array: ArrayD<f64>) -> ArrayD<f64> {
    while array.ndim() < 3 {
        let last = array.ndim();
        array = array.insert_axis(Axis(last));
    }
    array
}

fn single(array: ArrayD<f64>) -> Result<(ArrayD<f64>, VolumeLayout)> {
    let array = pad_spatial(array);
    let layout = match array.ndim() {
        3 => VolumeLayout::Volume,
        4 => VolumeLayout::TimeSeries {
            frames: array.len_of(Axis(3)),
        },
        ndim => return Err(LayerError::UnsupportedDimensionality(ndim)),
    };
    Ok((array, layout))
}

fn stacked(
    first: ArrayD<f64>,
    metadata: &SourceMetadata,
    rest: Vec<VolumeHandle>,
) -> Result<(ArrayD<f64>, VolumeLayout)> {
    let mismatched: Vec<_> = rest
        .iter()
        .filter(|h| h.shape() != first.shape())
        .map(|h| (h.metadata().path().to_path_buf(), h.shape().to_vec()))
        .collect();
    if !mismatched.is_empty() {
        return Err(LayerError::ShapeMismatch {
            reference: metadata.path().to_path_buf(),
            expected: first.shape().to_vec(),
            mismatched,
        });
    }
    if first.ndim() > 3 {
        return Err(LayerError::StackedTimeSeries(first.shape().to_vec()));
    }

    let members = rest.len() + 1;
    let arrays: Vec<ArrayD<f64>> = std::iter::once(first)
        .chain(rest.into_iter().map(|h| h.into_parts().0))
        .map(pad_spatial)
        .collect();
    let views: Vec<_> = arrays.iter().map(|a| a.view()).collect();
    let array = ndarray::stack(Axis(0), &views)?;
    Ok((array, VolumeLayout::Stack { members }))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use nalgebra::Matrix4;
    use ndarray::{Array, IxDyn};
    use nifti::NiftiHeader;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io;
    use std::path::{Path, PathBuf};

    /// Decoder handing out prepared volumes.
    #[derive(Debug, Default)]
    pub(crate) struct MapDecoder(pub HashMap<PathBuf, VolumeHandle>);

    impl MapDecoder {
        pub(crate) fn with(mut self, handle: VolumeHandle) -> Self {
            let _ = self.0.insert(handle.metadata().path().to_path_buf(), handle);
            self
        }
    }

    impl VolumeDecoder for MapDecoder {
        fn decode(&self, path: &Path) -> Result<VolumeHandle> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such volume").into())
        }
    }

    pub(crate) fn ramp(shape: &[usize], offset: f64) -> ArrayD<f64> {
        let len = shape.iter().product::<usize>();
        Array::from_shape_vec(IxDyn(shape), (0..len).map(|v| v as f64 + offset).collect()).unwrap()
    }

    pub(crate) fn handle(path: &str, array: ArrayD<f64>, zooms: &[f32], affine: Matrix4<f64>) -> VolumeHandle {
        let mut header = NiftiHeader::default();
        header.dim[0] = array.ndim() as u16;
        for (d, s) in header.dim[1..].iter_mut().zip(array.shape()) {
            *d = *s as u16;
        }
        for (p, z) in header.pixdim[1..].iter_mut().zip(zooms) {
            *p = *z;
        }
        VolumeHandle::new(array, SourceMetadata::with_affine(path, header, affine))
    }

    fn diagonal(x: f64, y: f64, z: f64) -> Matrix4<f64> {
        Matrix4::new(
            x, 0., 0., -90.,
            0., y, 0., 126.,
            0., 0., z, -72.,
            0., 0., 0., 1.,
        )
    }

    fn aligner(decoder: MapDecoder) -> VolumeAligner<MapDecoder> {
        VolumeAligner::new(decoder)
    }

    #[test]
    fn single_volume() {
        let data = ramp(&[2, 3, 4], 0.);
        let decoder = MapDecoder::default()
            .with(handle("a.nii", data.clone(), &[0.5, 0.75, 2.], diagonal(0.5, 0.75, 2.)));
        let volume = aligner(decoder).load_and_align(&"a.nii".into()).unwrap();

        assert_eq!(volume.array.shape(), &[4, 3, 2]);
        assert!(volume.array.is_standard_layout());
        assert_eq!(volume.array[[0, 0, 0]], data[[1, 2, 3]]);
        assert_eq!(volume.array[[3, 2, 1]], data[[0, 0, 0]]);
        assert_eq!(volume.array[[1, 0, 1]], data[[0, 2, 2]]);
        assert_eq!(volume.scale, vec![2., 0.75, 0.5]);
        assert_eq!(volume.translate, vec![0.; 3]);
        assert_eq!(volume.source.layout, VolumeLayout::Volume);
        assert_eq!(volume.source.orientation, OrientationCode::NATIVE);
        assert_eq!(volume.source.source_shape, vec![2, 3, 4]);
        assert_eq!(volume.source.metadata.path(), Path::new("a.nii"));
    }

    #[test]
    fn list_of_one_is_a_single_volume() {
        let decoder = MapDecoder::default()
            .with(handle("a.nii", ramp(&[2, 3, 4], 0.), &[1., 1., 1.], Matrix4::identity()));
        let aligner = aligner(decoder);
        let single = aligner.load_and_align(&"a.nii".into()).unwrap();
        let listed = aligner.load_and_align(&vec!["a.nii"].into()).unwrap();
        assert_eq!(single, listed);
        assert_eq!(listed.array.ndim(), 3);
    }

    #[test]
    fn reoriented_volume() {
        // voxel i runs along -y, j along +z, k along -x
        let affine = Matrix4::new(
            0., 0., -3., 0.,
            -1., 0., 0., 0.,
            0., 2., 0., 0.,
            0., 0., 0., 1.,
        );
        let data = ramp(&[2, 3, 4], 0.);
        let decoder = MapDecoder::default().with(handle("a.nii", data.clone(), &[1., 2., 3.], affine));
        let volume = aligner(decoder).load_and_align(&"a.nii".into()).unwrap();

        // display z <- j (same direction: flip), y <- i (reversed twice: keep), x <- k (keep)
        assert_eq!(volume.array.shape(), &[3, 2, 4]);
        // header spacing is reversed as is
        assert_eq!(volume.scale, vec![3., 2., 1.]);
        for z in 0..3 {
            for y in 0..2 {
                for x in 0..4 {
                    assert_eq!(volume.array[[z, y, x]], data[[y, 2 - z, x]]);
                }
            }
        }
    }

    #[test]
    fn reoriented_volume_scale_along_axes() {
        let affine = Matrix4::new(
            0., 0., -3., 0.,
            -1., 0., 0., 0.,
            0., 2., 0., 0.,
            0., 0., 0., 1.,
        );
        let decoder = MapDecoder::default().with(handle("a.nii", ramp(&[2, 3, 4], 0.), &[1., 2., 3.], affine));
        let options = AlignOptions::new().scale_along_axes(true);
        let volume = VolumeAligner::with_options(decoder, options)
            .load_and_align(&"a.nii".into())
            .unwrap();
        assert_eq!(volume.array.shape(), &[3, 2, 4]);
        assert_eq!(volume.scale, vec![2., 1., 3.]);
    }

    #[test]
    fn stack_of_volumes() {
        let a = ramp(&[2, 3, 4], 0.);
        let b = ramp(&[2, 3, 4], 100.);
        let decoder = MapDecoder::default()
            .with(handle("a.nii", a.clone(), &[0.5, 0.75, 2.], diagonal(0.5, 0.75, 2.)))
            .with(handle("b.nii", b.clone(), &[9., 9., 9.], diagonal(-9., 9., 9.)))
            .with(handle("b_alone.nii", b, &[0.5, 0.75, 2.], diagonal(0.5, 0.75, 2.)));
        let aligner = aligner(decoder);
        let stacked = aligner
            .load_and_align(&vec!["a.nii", "b.nii"].into())
            .unwrap();

        assert_eq!(stacked.array.shape(), &[2, 4, 3, 2]);
        assert_eq!(stacked.scale, vec![1., 2., 0.75, 0.5]);
        assert_eq!(stacked.translate, vec![0.; 4]);
        assert_eq!(stacked.source.layout, VolumeLayout::Stack { members: 2 });
        assert_eq!(stacked.source.metadata.path(), Path::new("a.nii"));

        // each member is aligned with the first file's metadata
        let first = aligner.load_and_align(&"a.nii".into()).unwrap();
        let second = aligner.load_and_align(&"b_alone.nii".into()).unwrap();
        assert_eq!(stacked.array.index_axis(Axis(0), 0), first.array);
        assert_eq!(stacked.array.index_axis(Axis(0), 1), second.array);
    }

    #[test]
    fn stack_shape_mismatch() {
        let decoder = MapDecoder::default()
            .with(handle("a.nii", ramp(&[2, 3, 4], 0.), &[1., 1., 1.], Matrix4::identity()))
            .with(handle("b.nii", ramp(&[2, 3, 4], 0.), &[1., 1., 1.], Matrix4::identity()))
            .with(handle("c.nii", ramp(&[2, 3, 5], 0.), &[1., 1., 1.], Matrix4::identity()))
            .with(handle("d.nii", ramp(&[4, 3, 2], 0.), &[1., 1., 1.], Matrix4::identity()));
        let err = aligner(decoder)
            .load_and_align(&vec!["a.nii", "b.nii", "c.nii", "d.nii"].into())
            .unwrap_err();
        match err {
            LayerError::ShapeMismatch {
                reference,
                expected,
                mismatched,
            } => {
                assert_eq!(reference, PathBuf::from("a.nii"));
                assert_eq!(expected, vec![2, 3, 4]);
                assert_eq!(
                    mismatched,
                    vec![
                        (PathBuf::from("c.nii"), vec![2, 3, 5]),
                        (PathBuf::from("d.nii"), vec![4, 3, 2]),
                    ]
                );
            }
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn time_series() {
        let data = ramp(&[2, 3, 4, 5], 0.);
        let decoder = MapDecoder::default()
            .with(handle("bold.nii", data.clone(), &[0.5, 0.75, 2., 1.5], diagonal(0.5, 0.75, 2.)));
        let volume = aligner(decoder).load_and_align(&"bold.nii".into()).unwrap();

        assert_eq!(volume.array.shape(), &[5, 4, 3, 2]);
        assert_eq!(volume.scale, vec![1., 2., 0.75, 0.5]);
        assert_eq!(volume.translate, vec![0.; 4]);
        assert_eq!(volume.source.layout, VolumeLayout::TimeSeries { frames: 5 });
        for t in 0..5 {
            for z in 0..4 {
                for y in 0..3 {
                    for x in 0..2 {
                        assert_eq!(volume.array[[t, z, y, x]], data[[1 - x, 2 - y, 3 - z, t]]);
                    }
                }
            }
        }
    }

    #[test]
    fn stacking_time_series_is_refused() {
        let decoder = MapDecoder::default()
            .with(handle("a.nii", ramp(&[2, 3, 4, 5], 0.), &[1., 1., 1., 1.], Matrix4::identity()))
            .with(handle("b.nii", ramp(&[2, 3, 4, 5], 0.), &[1., 1., 1., 1.], Matrix4::identity()));
        match aligner(decoder).load_and_align(&vec!["a.nii", "b.nii"].into()) {
            Err(LayerError::StackedTimeSeries(dims)) => assert_eq!(dims, vec![2, 3, 4, 5]),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn two_dimensional_volume_gets_depth_axis() {
        let data = ramp(&[3, 4], 0.);
        let decoder = MapDecoder::default()
            .with(handle("slice.nii", data.clone(), &[0.5, 0.25], Matrix4::identity()));
        let volume = aligner(decoder).load_and_align(&"slice.nii".into()).unwrap();
        assert_eq!(volume.array.shape(), &[1, 4, 3]);
        assert_eq!(volume.array[[0, 0, 0]], data[[2, 3]]);
        // only two spacings in the header
        assert!(volume.spacing.is_fallback());
        assert_eq!(volume.scale, vec![1.; 3]);
        assert_eq!(volume.source.source_shape, vec![3, 4]);
    }

    #[test]
    fn stack_of_two_dimensional_volumes() {
        let decoder = MapDecoder::default()
            .with(handle("a.nii", ramp(&[3, 4], 0.), &[1., 1.], Matrix4::identity()))
            .with(handle("b.nii", ramp(&[3, 4], 0.), &[1., 1.], Matrix4::identity()));
        let volume = aligner(decoder)
            .load_and_align(&vec!["a.nii", "b.nii"].into())
            .unwrap();
        assert_eq!(volume.array.shape(), &[2, 1, 4, 3]);
        assert_eq!(volume.scale, vec![1.; 4]);
    }

    #[test]
    fn five_dimensional_volume_is_refused() {
        let decoder = MapDecoder::default()
            .with(handle("a.nii", ramp(&[2, 2, 2, 2, 2], 0.), &[1.; 5], Matrix4::identity()));
        match aligner(decoder).load_and_align(&"a.nii".into()) {
            Err(LayerError::UnsupportedDimensionality(5)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn zero_zoom_falls_back_to_unit_scale() {
        let decoder = MapDecoder::default()
            .with(handle("a.nii", ramp(&[2, 3, 4], 0.), &[1., 0., 2.], Matrix4::identity()));
        let volume = aligner(decoder).load_and_align(&"a.nii".into()).unwrap();
        assert_eq!(volume.scale, vec![1.; 3]);
        assert!(volume.spacing.is_fallback());
    }

    #[test]
    fn translation_option() {
        let decoder = MapDecoder::default()
            .with(handle("a.nii", ramp(&[2, 3, 4], 0.), &[1., 1., 1.], diagonal(1., 1., 1.)));
        let aligner = VolumeAligner::with_options(decoder, AlignOptions::new().apply_translation(true));
        let volume = aligner.load_and_align(&"a.nii".into()).unwrap();
        assert_eq!(volume.translate, vec![72., -126., 90.]);
    }

    #[test]
    fn empty_input() {
        let aligner = aligner(MapDecoder::default());
        match aligner.load_and_align(&PathInput::Stack(vec![])) {
            Err(LayerError::EmptyInput) => {}
            other => panic!("unexpected result {:?}", other),
        }
        match aligner.align(vec![]) {
            Err(LayerError::EmptyInput) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn decoder_errors_are_passed_through() {
        let decoder = MapDecoder::default()
            .with(handle("a.nii", ramp(&[2, 3, 4], 0.), &[1., 1., 1.], Matrix4::identity()));
        match aligner(decoder).load_and_align(&vec!["a.nii", "missing.nii"].into()) {
            Err(LayerError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
