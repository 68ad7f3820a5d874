#![no_main]
use libfuzzer_sys::fuzz_target;
use nalgebra::Matrix4;
use nifti_layers::{OrientationCode, OrientationTransform};

fuzz_target!(|data: &[u8]| {
    if data.len() < 12 * 8 {
        return;
    }
    let mut affine = Matrix4::<f64>::identity();
    for (i, chunk) in data.chunks_exact(8).take(12).enumerate() {
        let mut bytes = [0; 8];
        bytes.copy_from_slice(chunk);
        affine[(i / 4, i % 4)] = f64::from_le_bytes(bytes);
    }
    let code = OrientationCode::from_affine(&affine);
    let axes = code.axes();
    assert!(OrientationCode::new(*axes).is_some());
    let transform = OrientationTransform::between(&code, &OrientationCode::DISPLAY);
    assert_eq!(transform.inverse().inverse(), transform);
});
