#![no_main]
use libfuzzer_sys::fuzz_target;
use nifti_layers::{get_reader, get_writer, FormatRegistry, LayerType, PathInput};
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    if let Ok(path) = std::str::from_utf8(data) {
        let recognized = FormatRegistry::global().recognizes(path);
        assert_eq!(get_reader(&PathInput::from(path)).is_some(), recognized);
        let _ = get_writer(Path::new(path), &[LayerType::Image]);
    }
});
