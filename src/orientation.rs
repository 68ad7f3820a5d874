//! Voxel axis orientation algebra.
//!
//! An [`OrientationCode`] describes, for each of the three spatial array
//! axes, along which physical axis it runs and in which direction. The
//! native code of a volume is read off its affine; the display code is a
//! constant. Comparing two codes yields an [`OrientationTransform`], a
//! signed axis permutation which is applied to arrays without any
//! resampling.
//!
//! [`OrientationCode`]: ./struct.OrientationCode.html
//! [`OrientationTransform`]: ./struct.OrientationTransform.html
use crate::error::{LayerError, Result};
use log::warn;
use nalgebra::{Matrix3, Matrix4};
use ndarray::{ArrayD, Axis};

/// Direction in which an array axis runs along its physical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// Increasing index, increasing physical coordinate.
    Forward,
    /// Increasing index, decreasing physical coordinate.
    Reverse,
}

impl Polarity {
    /// `1.0` or `-1.0`.
    pub fn sign(self) -> f64 {
        match self {
            Polarity::Forward => 1.0,
            Polarity::Reverse => -1.0,
        }
    }

    fn of(value: f64) -> Polarity {
        if value < 0.0 {
            Polarity::Reverse
        } else {
            Polarity::Forward
        }
    }
}

/// Orientation of one array axis: the physical axis it runs along
/// (0, 1, 2 for x, y, z) and its polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisCode {
    /// Physical axis index.
    pub axis: usize,
    /// Direction along that physical axis.
    pub polarity: Polarity,
}

impl AxisCode {
    const fn new(axis: usize, polarity: Polarity) -> Self {
        AxisCode { axis, polarity }
    }
}

/// Orientation of the three spatial axes of an array, always a signed
/// permutation of the physical axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrientationCode([AxisCode; 3]);

impl OrientationCode {
    /// Array axes `i, j, k` running along `x, y, z`, all forward.
    pub const NATIVE: OrientationCode = OrientationCode([
        AxisCode::new(0, Polarity::Forward),
        AxisCode::new(1, Polarity::Forward),
        AxisCode::new(2, Polarity::Forward),
    ]);

    /// The orientation viewers expect: array axis 0 runs along `z`,
    /// axis 1 along `y` and axis 2 along `x`, all reversed.
    pub const DISPLAY: OrientationCode = OrientationCode([
        AxisCode::new(2, Polarity::Reverse),
        AxisCode::new(1, Polarity::Reverse),
        AxisCode::new(0, Polarity::Reverse),
    ]);

    /// Build a code from per array axis codes. Returns `None` unless the
    /// physical axes form a permutation of `0, 1, 2`.
    pub fn new(axes: [AxisCode; 3]) -> Option<Self> {
        let mut seen = [false; 3];
        for code in &axes {
            if code.axis > 2 || seen[code.axis] {
                return None;
            }
            seen[code.axis] = true;
        }
        Some(OrientationCode(axes))
    }

    /// Derive the orientation of voxel axes from an affine.
    ///
    /// The columns of the linear part are scaled to unit length and the
    /// result replaced by its nearest orthogonal matrix. Voxel axes are
    /// then matched in order `i, j, k`, each to the physical axis with
    /// the largest absolute entry among those not matched yet. Voxel axes
    /// which cannot be matched (a degenerate affine) take the remaining
    /// physical axes in order, forward.
    pub fn from_affine(affine: &Matrix4<f64>) -> Self {
        let linear = Matrix3::from_fn(|r, c| affine[(r, c)]);
        if linear.iter().any(|v| !v.is_finite()) {
            warn!("affine has non-finite entries, assuming native orientation");
            return OrientationCode::NATIVE;
        }
        let mut rotation = nearest_orthogonal(&unit_columns(&linear));

        let mut codes: [Option<AxisCode>; 3] = [None; 3];
        let mut physical_taken = [false; 3];
        for (voxel, code) in codes.iter_mut().enumerate() {
            let column = rotation.column(voxel);
            if column.iter().all(|v| v.abs() <= ZERO_TOLERANCE) {
                continue;
            }
            let physical = column.iamax();
            *code = Some(AxisCode::new(physical, Polarity::of(column[physical])));
            physical_taken[physical] = true;
            rotation.row_mut(physical).fill(0.0);
        }

        if codes.iter().any(Option::is_none) {
            warn!("affine is degenerate, unmatched voxel axes keep native orientation");
        }
        let mut free = (0..3).filter(|&p| !physical_taken[p]);
        let mut axes = [AxisCode::new(0, Polarity::Forward); 3];
        for (axis, code) in axes.iter_mut().zip(codes.iter()) {
            *axis = match code {
                Some(code) => *code,
                None => AxisCode::new(free.next().unwrap_or(0), Polarity::Forward),
            };
        }
        OrientationCode(axes)
    }

    /// The per array axis codes.
    pub fn axes(&self) -> &[AxisCode; 3] {
        &self.0
    }

    /// The array axis running along `physical`, with its code.
    fn along(&self, physical: usize) -> (usize, AxisCode) {
        let mut found = (0, self.0[0]);
        for (index, code) in self.0.iter().enumerate() {
            if code.axis == physical {
                found = (index, *code);
            }
        }
        found
    }

    /// Anatomical labels of the directions the axes point to,
    /// e.g. `"RAS"` for [`NATIVE`](#associatedconstant.NATIVE).
    pub fn labels(&self) -> String {
        const LABELS: [(char, char); 3] = [('L', 'R'), ('P', 'A'), ('I', 'S')];
        self.0
            .iter()
            .map(|code| {
                let (negative, positive) = LABELS[code.axis];
                match code.polarity {
                    Polarity::Forward => positive,
                    Polarity::Reverse => negative,
                }
            })
            .collect()
    }
}

const ZERO_TOLERANCE: f64 = 1e-8;
const SVD_MAX_ITERATIONS: usize = 1000;

/// `linear` with every column scaled to unit length. Zero columns stay zero.
fn unit_columns(linear: &Matrix3<f64>) -> Matrix3<f64> {
    let largest = linear.amax();
    if largest == 0.0 {
        return Matrix3::zeros();
    }
    // prescaled so that the column norms cannot overflow
    let mut unit = *linear / largest;
    for mut column in unit.column_iter_mut() {
        let norm = column.norm();
        if norm > 0.0 {
            column /= norm;
        }
    }
    unit
}

/// Orthogonal matrix closest to `linear` (`U * V^T` of its SVD), with the
/// directions of vanishing singular values dropped.
fn nearest_orthogonal(linear: &Matrix3<f64>) -> Matrix3<f64> {
    let svd = match linear.try_svd(true, true, f64::EPSILON, SVD_MAX_ITERATIONS) {
        Some(svd) => svd,
        None => return *linear,
    };
    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return *linear,
    };
    let tolerance = svd.singular_values.max() * 3.0 * f64::EPSILON;
    let keep = Matrix3::from_diagonal(&svd.singular_values.map(|s| {
        if s > tolerance {
            1.0
        } else {
            0.0
        }
    }));
    u * keep * v_t
}

/// How one output axis is read from the input array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisMapping {
    /// Spatial input axis feeding this output axis.
    pub source: usize,
    /// Whether the input axis is read in reverse.
    pub flip: bool,
}

/// A signed permutation of the three spatial axes, taking an array in one
/// orientation to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrientationTransform([AxisMapping; 3]);

impl OrientationTransform {
    /// The transform which leaves arrays untouched.
    pub const IDENTITY: OrientationTransform = OrientationTransform([
        AxisMapping { source: 0, flip: false },
        AxisMapping { source: 1, flip: false },
        AxisMapping { source: 2, flip: false },
    ]);

    /// The transform taking an array oriented as `start` to `end`.
    pub fn between(start: &OrientationCode, end: &OrientationCode) -> Self {
        let mut mappings = [AxisMapping { source: 0, flip: false }; 3];
        for (mapping, target) in mappings.iter_mut().zip(end.0.iter()) {
            let (source, code) = start.along(target.axis);
            *mapping = AxisMapping {
                source,
                flip: code.polarity != target.polarity,
            };
        }
        OrientationTransform(mappings)
    }

    /// Per output axis mappings.
    pub fn mappings(&self) -> &[AxisMapping; 3] {
        &self.0
    }

    /// The transform undoing this one.
    pub fn inverse(&self) -> Self {
        let mut mappings = [AxisMapping { source: 0, flip: false }; 3];
        for (output, mapping) in self.0.iter().enumerate() {
            mappings[mapping.source] = AxisMapping {
                source: output,
                flip: mapping.flip,
            };
        }
        OrientationTransform(mappings)
    }

    /// Reorder `values` given per input axis into output axis order.
    pub fn permute<T: Copy>(&self, values: [T; 3]) -> [T; 3] {
        [
            values[self.0[0].source],
            values[self.0[1].source],
            values[self.0[2].source],
        ]
    }

    /// Apply the transform to the three spatial axes of `array`, which
    /// start at axis `first_spatial`. Other axes keep their place.
    ///
    /// Only strides change, no voxel is moved or resampled.
    pub fn apply<A>(&self, mut array: ArrayD<A>, first_spatial: usize) -> Result<ArrayD<A>> {
        let ndim = array.ndim();
        if ndim < first_spatial + 3 {
            return Err(LayerError::UnsupportedDimensionality(ndim));
        }
        let mut order: Vec<usize> = (0..ndim).collect();
        for (output, mapping) in self.0.iter().enumerate() {
            if mapping.flip {
                array.invert_axis(Axis(first_spatial + mapping.source));
            }
            order[first_spatial + output] = first_spatial + mapping.source;
        }
        Ok(array.permuted_axes(order))
    }
}
