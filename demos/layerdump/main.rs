//! An application for showing how NIfTI files are laid out as viewer layers.
//!
//! Every path given is read as its own layer; paths joined with `+` are
//! stacked into one, e.g. `layerdump run-1.nii+run-2.nii T1w.nii.gz`.

use nifti_layers::{read_layers_with, AlignOptions, FormatRegistry, PathInput};
use std::env;

fn main() {
    env_logger::init();

    let mut translate = false;
    let mut along_axes = false;
    let mut inputs = Vec::new();
    for arg in env::args().skip(1) {
        if arg == "--translate" {
            translate = true;
        } else if arg == "--scale-along-axes" {
            along_axes = true;
        } else if arg.contains('+') {
            inputs.push(PathInput::from(arg.split('+').collect::<Vec<_>>()));
        } else {
            inputs.push(PathInput::from(arg));
        }
    }
    if inputs.is_empty() {
        eprintln!("usage: layerdump [--translate] [--scale-along-axes] PATH[+PATH...]...");
        std::process::exit(2);
    }

    let options = AlignOptions::new()
        .apply_translation(translate)
        .scale_along_axes(along_axes);
    for input in &inputs {
        let layers = read_layers_with(FormatRegistry::global(), options, input)
            .expect("Failed to read volume");
        for layer in layers {
            let orientation = layer
                .kwargs
                .metadata
                .as_ref()
                .map(|source| source.orientation.labels())
                .unwrap_or_default();
            println!("{}", layer.kwargs.name.as_deref().unwrap_or("<unnamed>"));
            println!("  type:        {}", layer.layer_type);
            println!("  shape:       {:?}", layer.data.shape());
            println!("  scale:       {:?}", layer.kwargs.scale);
            println!("  translate:   {:?}", layer.kwargs.translate);
            println!("  orientation: {}", orientation);
        }
    }
}
