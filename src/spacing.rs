//! Physical scale and translation of aligned volumes.
//!
//! Header spacing which cannot be trusted is not an error: the volume is
//! then shown with unit voxels, and [`Spacing::Fallback`] tells why.
//!
//! [`Spacing::Fallback`]: ./enum.Spacing.html#variant.Fallback
use crate::orientation::{OrientationCode, OrientationTransform};
use nalgebra::Matrix4;
use std::fmt;

/// Why unit scale was used instead of the header spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpacingFallback {
    /// The header declares no spacing at all.
    Missing,
    /// Fewer than three spatial spacings are declared.
    TooFewAxes(usize),
    /// A spatial spacing is zero, negative or not finite.
    Invalid {
        /// voxel axis of the offending value
        axis: usize,
        /// the offending value
        value: f64,
    },
}

impl fmt::Display for SpacingFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpacingFallback::Missing => write!(f, "no voxel spacing in header"),
            SpacingFallback::TooFewAxes(n) => write!(f, "only {} spacing values in header", n),
            SpacingFallback::Invalid { axis, value } => {
                write!(f, "invalid spacing {} on voxel axis {}", value, axis)
            }
        }
    }
}

/// Spatial voxel spacing of a volume, or the reason it is unusable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Spacing {
    /// Validated spacing of voxel axes `i, j, k`, all positive and finite.
    Physical([f64; 3]),
    /// Spacing could not be used; every axis gets unit scale.
    Fallback(SpacingFallback),
}

impl Spacing {
    /// Validate the first three header zooms.
    pub fn from_zooms(zooms: Option<&[f64]>) -> Self {
        let zooms = match zooms {
            Some(z) => z,
            None => return Spacing::Fallback(SpacingFallback::Missing),
        };
        if zooms.len() < 3 {
            return Spacing::Fallback(SpacingFallback::TooFewAxes(zooms.len()));
        }
        let mut spatial = [0.; 3];
        for (axis, (s, &value)) in spatial.iter_mut().zip(zooms).enumerate() {
            if !(value.is_finite() && value > 0.0) {
                return Spacing::Fallback(SpacingFallback::Invalid { axis, value });
            }
            *s = value;
        }
        Spacing::Physical(spatial)
    }

    /// Whether unit scale is being substituted.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Spacing::Fallback(_))
    }

    /// Scale of every axis of an aligned array with `ndim` axes: the
    /// spatial spacing reversed, `[dz, dy, dx]`, behind unit scale for
    /// any leading axes.
    pub fn scale(&self, ndim: usize) -> Vec<f64> {
        self.spatial_scale(ndim, |[dx, dy, dz]| [dz, dy, dx])
    }

    /// Like [`scale`](#method.scale), but the spacing is reordered by
    /// `transform` so that each value follows the voxel axis it was
    /// declared for, also when the volume was not stored in canonical
    /// axis order.
    pub fn scale_along(&self, transform: &OrientationTransform, ndim: usize) -> Vec<f64> {
        self.spatial_scale(ndim, |zooms| transform.permute(zooms))
    }

    fn spatial_scale<F>(&self, ndim: usize, order: F) -> Vec<f64>
    where
        F: FnOnce([f64; 3]) -> [f64; 3],
    {
        match self {
            Spacing::Physical(zooms) => {
                let leading = ndim.saturating_sub(3);
                let mut scale = vec![1.0; leading];
                scale.extend_from_slice(&order(*zooms));
                scale
            }
            Spacing::Fallback(_) => vec![1.0; ndim],
        }
    }
}

/// Translation of every axis of an aligned array with `ndim` axes.
///
/// All zero unless `apply` is set, in which case the affine's offset is
/// taken into `target` axis order, signed by each axis' polarity.
pub fn translation(affine: &Matrix4<f64>, target: &OrientationCode, ndim: usize, apply: bool) -> Vec<f64> {
    let mut translate = vec![0.0; ndim];
    if apply && ndim >= 3 {
        let leading = ndim - 3;
        for (t, code) in translate[leading..].iter_mut().zip(target.axes()) {
            *t = affine[(code.axis, 3)] * code.polarity.sign();
        }
    }
    translate
}
