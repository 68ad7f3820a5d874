//! Types for error handling go here.
use ndarray::ShapeError;
use nifti::NiftiError;
use std::io::Error as IOError;
use std::path::PathBuf;

quick_error! {
    /// Error type for all error kinds in this crate.
    #[derive(Debug)]
    pub enum LayerError {
        /// The volume decoder (or encoder) failed.
        Nifti(err: NiftiError) {
            from()
            source(err)
            display("{}", err)
        }
        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
            display("{}", err)
        }
        /// An array could not be stacked or reshaped.
        Shape(err: ShapeError) {
            from()
            source(err)
            display("{}", err)
        }
        /// Files meant to be stacked into one volume have different voxel grids.
        ///
        /// `reference` is the first file of the stack and `expected` its
        /// shape. `mismatched` lists every other file whose shape differs,
        /// in input order, alongside that shape.
        #[allow(missing_docs)]
        ShapeMismatch {
            reference: PathBuf,
            expected: Vec<usize>,
            mismatched: Vec<(PathBuf, Vec<usize>)>
        } {
            display(
                "all files must contain data of the same shape as {} {:?}, but got {}",
                reference.display(),
                expected,
                describe_mismatches(mismatched)
            )
        }
        /// An empty list of paths was given to the loader.
        EmptyInput {
            display("no paths were given")
        }
        /// Files which are already time series cannot be stacked.
        StackedTimeSeries(dims: Vec<usize>) {
            display("cannot stack volumes of shape {:?}, only 3-dimensional volumes can be stacked", dims)
        }
        /// A single volume with too many axes to be aligned.
        UnsupportedDimensionality(ndim: usize) {
            display("unsupported volume dimensionality {}, expected at most 4", ndim)
        }
        /// No registered format claims the extension of this path.
        UnsupportedExtension(path: PathBuf) {
            display("no volume format recognizes {}", path.display())
        }
        /// The format is able to read, but not to write.
        ReadOnlyFormat(name: &'static str) {
            display("format {} cannot write volumes", name)
        }
        /// A stack of volumes cannot be written back to a single source file.
        UnwritableLayout {
            display("stacked layers cannot be written to a single file")
        }
        /// Layer data no longer fits the header it was read with.
        ///
        /// `expected` is the shape of the source volume and `found` the shape
        /// of the layer data after undoing the alignment.
        #[allow(missing_docs)]
        LayerShapeChanged {
            expected: Vec<usize>,
            found: Vec<usize>
        } {
            display("layer data of shape {:?} does not match its source shape {:?}", found, expected)
        }
        /// Not one of the known layer kinds.
        UnknownLayerType(name: String) {
            display("unknown layer type `{}`", name)
        }
    }
}

fn describe_mismatches(mismatched: &[(PathBuf, Vec<usize>)]) -> String {
    mismatched
        .iter()
        .map(|(path, shape)| format!("{} {:?}", path.display(), shape))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Alias type for results originating from this crate.
pub type Result<T> = ::std::result::Result<T, LayerError>;
