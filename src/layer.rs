//! Layer data as exchanged with a host viewer.
use crate::align::{NormalizedVolume, SourceInfo};
use crate::error::LayerError;
use ndarray::ArrayD;
use std::fmt;
use std::str::FromStr;

/// Kinds of layers a viewer can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    /// Intensity image.
    Image,
    /// Integer label image.
    Labels,
    /// Point set.
    Points,
    /// Vector shapes.
    Shapes,
    /// Triangulated surface.
    Surface,
    /// Tracks over time.
    Tracks,
    /// Vector field.
    Vectors,
}

impl LayerType {
    /// Every layer type, in declaration order.
    pub const ALL: [LayerType; 7] = [
        LayerType::Image,
        LayerType::Labels,
        LayerType::Points,
        LayerType::Shapes,
        LayerType::Surface,
        LayerType::Tracks,
        LayerType::Vectors,
    ];

    /// The lowercase name viewers use for this layer type.
    pub fn as_str(self) -> &'static str {
        match self {
            LayerType::Image => "image",
            LayerType::Labels => "labels",
            LayerType::Points => "points",
            LayerType::Shapes => "shapes",
            LayerType::Surface => "surface",
            LayerType::Tracks => "tracks",
            LayerType::Vectors => "vectors",
        }
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerType {
    type Err = LayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayerType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LayerError::UnknownLayerType(s.to_owned()))
    }
}

/// Keyword arguments for adding a layer to a viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerKwargs {
    /// Layer name, if any.
    pub name: Option<String>,
    /// The source the layer was read from, if it was read from a file.
    pub metadata: Option<SourceInfo>,
    /// Whether the last axis holds color channels.
    pub rgb: bool,
    /// Physical size of one step along each axis.
    pub scale: Vec<f64>,
    /// Offset of each axis.
    pub translate: Vec<f64>,
}

/// A layer: data, keyword arguments and layer type.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerData {
    /// Layer voxels.
    pub data: ArrayD<f64>,
    /// Keyword arguments.
    pub kwargs: LayerKwargs,
    /// The kind of layer.
    pub layer_type: LayerType,
}

impl LayerData {
    /// Build an image layer from an aligned volume.
    pub fn from_volume(volume: NormalizedVolume, name: Option<String>) -> Self {
        LayerData {
            data: volume.array,
            kwargs: LayerKwargs {
                name,
                metadata: Some(volume.source),
                rgb: false,
                scale: volume.scale,
                translate: volume.translate,
            },
            layer_type: LayerType::Image,
        }
    }
}

impl From<NormalizedVolume> for LayerData {
    fn from(volume: NormalizedVolume) -> Self {
        LayerData::from_volume(volume, None)
    }
}
