//! Writer hooks for host viewers.
//!
//! Layers read by this crate can be written back in their source voxel
//! order and with their source header, so that the affine and spacing
//! survive a round trip through the viewer.
use crate::align::{SourceInfo, VolumeLayout};
use crate::error::{LayerError, Result};
use crate::layer::{LayerData, LayerKwargs, LayerType};
use crate::registry::FormatRegistry;
use crate::util::split_ext_addext;
use log::{debug, warn};
use ndarray::{ArrayD, Axis};
use std::path::{Path, PathBuf};

/// Function writing a list of layers next to `path`. Returns the written
/// paths, or `None` if the layers cannot be written by this crate.
pub type WriterFn = fn(&Path, &[LayerData]) -> Result<Option<Vec<PathBuf>>>;

/// Layer types this crate knows how to write.
pub const WRITABLE_LAYER_TYPES: &[LayerType] = &[LayerType::Image];

/// Return the writer for `path` if every layer type is writable and a
/// registered format writes the extension of `path`.
pub fn get_writer(path: &Path, layer_types: &[LayerType]) -> Option<WriterFn> {
    if !layer_types.iter().all(|t| WRITABLE_LAYER_TYPES.contains(t)) {
        return None;
    }
    let writer: WriterFn = write_layers;
    FormatRegistry::global().writer_for(path).map(|_| writer)
}

/// Write each layer to `<root>_<name><ext>` derived from `path`.
///
/// Unnamed layers are called `layer<index>`. Nothing is written, and
/// `None` returned, if any layer was not read from a file.
pub fn write_layers(path: &Path, layers: &[LayerData]) -> Result<Option<Vec<PathBuf>>> {
    write_layers_in(FormatRegistry::global(), path, layers)
}

/// Like [`write_layers`], with the given formats.
///
/// [`write_layers`]: ./fn.write_layers.html
pub fn write_layers_in(
    registry: &FormatRegistry,
    path: &Path,
    layers: &[LayerData],
) -> Result<Option<Vec<PathBuf>>> {
    if let Some(layer) = layers.iter().find(|l| l.kwargs.metadata.is_none()) {
        warn!(
            "layer {} has no source metadata, not writing {}",
            layer.kwargs.name.as_deref().unwrap_or("<unnamed>"),
            path.display()
        );
        return Ok(None);
    }
    let split = split_ext_addext(path);
    let mut written = Vec::with_capacity(layers.len());
    for (i, layer) in layers.iter().enumerate() {
        let name = match &layer.kwargs.name {
            Some(name) => name.clone(),
            None => format!("layer{}", i),
        };
        let target = PathBuf::from(format!("{}_{}{}{}", split.root, name, split.ext, split.addext));
        match write_image_in(registry, &target, &layer.data, &layer.kwargs)? {
            Some(p) => written.push(p),
            None => return Ok(None),
        }
    }
    Ok(Some(written))
}

/// Write a single image layer to `path`.
///
/// Returns `None` if no registered format writes the extension of `path`
/// or the layer was not read from a file.
pub fn write_image(path: &Path, data: &ArrayD<f64>, kwargs: &LayerKwargs) -> Result<Option<PathBuf>> {
    write_image_in(FormatRegistry::global(), path, data, kwargs)
}

/// Like [`write_image`], with the given formats.
///
/// [`write_image`]: ./fn.write_image.html
pub fn write_image_in(
    registry: &FormatRegistry,
    path: &Path,
    data: &ArrayD<f64>,
    kwargs: &LayerKwargs,
) -> Result<Option<PathBuf>> {
    let format = match registry.writer_for(path) {
        Some(format) => format,
        None => return Ok(None),
    };
    let source = match &kwargs.metadata {
        Some(source) => source,
        None => {
            warn!("no source metadata, not writing {}", path.display());
            return Ok(None);
        }
    };

    let restored = restore_source_order(data, source)?;
    // voxels are written as decoded, already scaled
    let mut header = source.metadata.header().clone();
    header.scl_slope = 1.0;
    header.scl_inter = 0.0;
    format.encode(path, restored.view(), &header)?;
    debug!(
        "restored {:?} to {:?} for {}",
        data.shape(),
        restored.shape(),
        path.display()
    );
    Ok(Some(path.to_path_buf()))
}

/// Undo the display alignment of `data`, giving an array in the voxel
/// order and shape of the source file.
///
/// # Errors
///
/// - `LayerError::UnwritableLayout` for stacked volumes.
/// - `LayerError::LayerShapeChanged` if `data` no longer has the shape
///   it was read with.
pub fn restore_source_order(data: &ArrayD<f64>, source: &SourceInfo) -> Result<ArrayD<f64>> {
    let changed = || LayerError::LayerShapeChanged {
        expected: source.source_shape.clone(),
        found: data.shape().to_vec(),
    };
    let inverse = source.transform().inverse();
    let array = match source.layout {
        VolumeLayout::Stack { .. } => return Err(LayerError::UnwritableLayout),
        VolumeLayout::Volume if data.ndim() == 3 => inverse.apply(data.clone(), 0)?,
        VolumeLayout::TimeSeries { .. } if data.ndim() == 4 => {
            inverse.apply(data.clone().permuted_axes(vec![1, 2, 3, 0]), 0)?
        }
        _ => return Err(changed()),
    };

    // drop the unit axes padded onto volumes of fewer than three axes
    let mut array = array;
    while array.ndim() > source.source_shape.len() {
        let last = Axis(array.ndim() - 1);
        if array.len_of(last) != 1 {
            return Err(changed());
        }
        array = array.index_axis_move(last, 0);
    }
    if array.shape() != &source.source_shape[..] {
        return Err(changed());
    }
    Ok(array.as_standard_layout().into_owned())
}
