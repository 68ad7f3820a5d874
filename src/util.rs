//! Private utility module
use std::path::{Path, PathBuf};

/// Secondary suffixes which only tell how a file is compressed,
/// not which format it holds.
pub const COMPRESSION_SUFFIXES: &[&str] = &[".gz", ".bz2", ".zst"];

/// A path taken apart into its root, format extension and compression
/// suffix, such that `root + ext + addext` gives back the original path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPath {
    pub root: String,
    pub ext: String,
    pub addext: String,
}

impl SplitPath {
    /// The format extension, lowercased for lookup.
    pub fn ext_lowercase(&self) -> String {
        self.ext.to_ascii_lowercase()
    }

    /// The last component of the root, e.g. `"brain"` for `"/data/brain.nii.gz"`.
    pub fn file_root(&self) -> &str {
        match self.root.rfind(is_separator) {
            Some(i) => &self.root[i + 1..],
            None => &self.root,
        }
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == std::path::MAIN_SEPARATOR
}

/// Split a path into root, extension and compression suffix.
/// Extension and suffix keep their leading dot and may be empty.
///
/// `"brain.NII.gz"` becomes `("brain", ".NII", ".gz")`.
pub fn split_ext_addext<P: AsRef<Path>>(path: P) -> SplitPath {
    let path = path.as_ref().to_string_lossy();
    let lower = path.to_ascii_lowercase();

    let mut rest = &path[..];
    let mut addext = "";
    for suffix in COMPRESSION_SUFFIXES {
        if lower.ends_with(suffix) {
            let at = path.len() - suffix.len();
            addext = &path[at..];
            rest = &path[..at];
            break;
        }
    }

    let name_start = rest.rfind(is_separator).map_or(0, |i| i + 1);
    let (root, ext) = match rest[name_start..].rfind('.') {
        // a leading dot marks a hidden file, not an extension
        Some(dot) if dot > 0 => rest.split_at(name_start + dot),
        _ => (rest, ""),
    };

    SplitPath {
        root: root.to_owned(),
        ext: ext.to_owned(),
        addext: addext.to_owned(),
    }
}

/// Map an image file of a header/image pair onto its header file,
/// keeping the compression suffix. Other paths are returned unchanged.
pub fn header_file_for<P: AsRef<Path>>(path: P) -> PathBuf {
    let split = split_ext_addext(&path);
    if split.ext_lowercase() == ".img" {
        let hdr = if split.ext == ".IMG" { ".HDR" } else { ".hdr" };
        PathBuf::from(format!("{}{}{}", split.root, hdr, split.addext))
    } else {
        path.as_ref().to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn split(path: &str) -> (String, String, String) {
        let s = split_ext_addext(path);
        (s.root, s.ext, s.addext)
    }

    fn owned(root: &str, ext: &str, addext: &str) -> (String, String, String) {
        (root.to_owned(), ext.to_owned(), addext.to_owned())
    }

    #[test]
    fn splits_extension_and_compression() {
        assert_eq!(split("brain.nii"), owned("brain", ".nii", ""));
        assert_eq!(split("brain.nii.gz"), owned("brain", ".nii", ".gz"));
        assert_eq!(split("/data/sub-01/T1w.NII.GZ"), owned("/data/sub-01/T1w", ".NII", ".GZ"));
        assert_eq!(split("scan.hdr.bz2"), owned("scan", ".hdr", ".bz2"));
        assert_eq!(split("scan.img.zst"), owned("scan", ".img", ".zst"));
    }

    #[test]
    fn splits_paths_without_extension() {
        assert_eq!(split("README"), owned("README", "", ""));
        assert_eq!(split("archive.gz"), owned("archive", "", ".gz"));
        assert_eq!(split(".nii"), owned(".nii", "", ""));
        assert_eq!(split("some.dir/volume"), owned("some.dir/volume", "", ""));
    }

    #[test]
    fn file_root_drops_directories() {
        assert_eq!(split_ext_addext("/data/sub-01/T1w.nii.gz").file_root(), "T1w");
        assert_eq!(split_ext_addext("T1w.nii").file_root(), "T1w");
    }

    #[test]
    fn header_file_for_image_files() {
        assert_eq!(header_file_for("minimal.img"), PathBuf::from("minimal.hdr"));
        assert_eq!(header_file_for("minimal.img.gz"), PathBuf::from("minimal.hdr.gz"));
        assert_eq!(header_file_for("MINIMAL.IMG"), PathBuf::from("MINIMAL.HDR"));
        assert_eq!(header_file_for("minimal.hdr"), PathBuf::from("minimal.hdr"));
        assert_eq!(header_file_for("minimal.nii.gz"), PathBuf::from("minimal.nii.gz"));
    }
}
