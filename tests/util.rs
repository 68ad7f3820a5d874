//! Helpers for writing small NIfTI files to read back in tests.
#![allow(dead_code)]
use ndarray::{Array, ArrayD, IxDyn};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use std::path::Path;

/// Rows of an affine with the given diagonal and an offset of
/// `(-90, 126, -72)`.
pub fn diagonal(x: f32, y: f32, z: f32) -> [[f32; 4]; 3] {
    [
        [x, 0., 0., -90.],
        [0., y, 0., 126.],
        [0., 0., z, -72.],
    ]
}

/// Voxels `offset, offset + 1, ...` in C order.
pub fn ramp(shape: &[usize], offset: f32) -> ArrayD<f32> {
    let len = shape.iter().product::<usize>();
    Array::from_shape_vec(IxDyn(shape), (0..len).map(|v| v as f32 + offset).collect()).unwrap()
}

/// A header with an sform made of `rows` and the given zooms.
pub fn header_with(zooms: &[f32], rows: [[f32; 4]; 3]) -> NiftiHeader {
    let mut pixdim = [1.; 8];
    for (p, z) in pixdim[1..].iter_mut().zip(zooms) {
        *p = *z;
    }
    NiftiHeader {
        pixdim,
        sform_code: 1,
        srow_x: rows[0],
        srow_y: rows[1],
        srow_z: rows[2],
        scl_slope: 1.,
        scl_inter: 0.,
        ..NiftiHeader::default()
    }
}

/// Write `data` to `path`, compressed if `path` ends in `.gz`, as a pair
/// if it ends in `.hdr`.
pub fn write_volume<P: AsRef<Path>>(path: P, data: &ArrayD<f32>, zooms: &[f32], rows: [[f32; 4]; 3]) {
    WriterOptions::new(path.as_ref())
        .reference_header(&header_with(zooms, rows))
        .write_nifti(data)
        .unwrap();
}

/// Read a file directly with the decoder, without any alignment.
pub fn read_raw<P: AsRef<Path>>(path: P) -> (NiftiHeader, ArrayD<f64>) {
    let object = ReaderOptions::new().read_file(path.as_ref()).unwrap();
    let header = object.header().clone();
    let data = object.into_volume().into_ndarray::<f64>().unwrap();
    (header, data)
}
