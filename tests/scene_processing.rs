use std::fs::File;
use std::io::Write;
use std::path::Path;

use approx::assert_abs_diff_eq;
use qaa_iop::readers::{DataReader, GeoTiffReader, write_f32, write_u8};
use qaa_iop::{Config, IopFlags, SceneProcessor};
use tempfile::tempdir;

const MERIS_RRS: [f32; 7] = [
    0.030262154,
    0.031086152,
    0.022717977,
    0.013177891,
    0.0072450927,
    0.0028870495,
    0.0024475828,
];

const WAVELENGTHS: [u32; 7] = [412, 443, 490, 510, 560, 620, 665];

fn read(path: &Path) -> Vec<f32> {
    GeoTiffReader {
        file_name: path.to_path_buf(),
    }
    .read_data()
    .unwrap()
    .buffer
}

/// 2x2 scene: water, land, water with a broken spectrum, water
fn write_scene(dir: &Path) {
    let nested = dir.join("bands");
    std::fs::create_dir_all(&nested).unwrap();

    for (b, (&value, wl)) in MERIS_RRS.iter().zip(WAVELENGTHS).enumerate() {
        let mut band = vec![value; 4];
        if b == 0 {
            band[2] = -0.2;
        }
        // Half the bands sit in a sub directory to exercise the search
        let target = if b % 2 == 0 { dir } else { nested.as_path() };
        let path = target.join(format!("rrs_{wl}.tif"));
        write_f32(&path, 2, 2, &band).unwrap();
    }

    // Bit 2 marks water
    let flags = dir.join("l1_flags.tif");
    write_u8(&flags, 2, 2, &[4, 1, 4, 6]).unwrap();
}

fn write_config(dir: &Path, water_clarity: &str) -> std::path::PathBuf {
    let bands: Vec<String> = WAVELENGTHS
        .iter()
        .map(|wl| format!("\"rrs_{wl}.tif\""))
        .collect();
    let config = format!(
        r#"{{
            "sensor": "meris_legacy",
            "input_directory": "{}",
            "bands": [{}],
            "water_mask": {{ "file": "l1_flags.tif", "bit": 2 }},
            "output_directory": "{}"
            {}
        }}"#,
        dir.display(),
        bands.join(", "),
        dir.join("out").display(),
        water_clarity
    );

    let path = dir.join("config.json");
    File::create(&path)
        .unwrap()
        .write_all(config.as_bytes())
        .unwrap();
    path
}

#[test]
fn test_scene_round_trip() {
    let dir = tempdir().unwrap();
    write_scene(dir.path());
    let config = Config::from_file(write_config(dir.path(), "")).unwrap();

    let written = SceneProcessor::new(config).run().unwrap();
    assert_eq!(written.len(), 17);

    let out = dir.path().join("out");
    let flags = read(&out.join("analytical_flags.tif"));
    assert_eq!(
        flags,
        vec![
            IopFlags::VALID.bits() as f32,
            IopFlags::INVALID.bits() as f32,
            IopFlags::IMAGINARY.bits() as f32,
            IopFlags::VALID.bits() as f32,
        ]
    );

    let a_412 = read(&out.join("a_412.tif"));
    assert_abs_diff_eq!(a_412[0], 0.038455005, epsilon = 1e-7);
    assert!(a_412[1].is_nan());
    assert!(a_412[2].is_nan());
    assert_eq!(a_412[0], a_412[3]);

    let adg_490 = read(&out.join("adg_490.tif"));
    assert_abs_diff_eq!(adg_490[0], 0.009288344, epsilon = 1e-7);

    let bb_560 = read(&out.join("bb_560.tif"));
    assert_abs_diff_eq!(bb_560[3], 0.003206627, epsilon = 1e-7);

    assert!(!out.join("zeu.tif").exists());
}

#[test]
fn test_scene_with_euphotic_depth() {
    let dir = tempdir().unwrap();
    write_scene(dir.path());
    let config = Config::from_file(write_config(
        dir.path(),
        r#", "water_clarity": { "percentile": 10, "sun_zenith": 30.0 }"#,
    ))
    .unwrap();

    let written = SceneProcessor::new(config).run().unwrap();
    assert_eq!(written.len(), 18);

    let zeu = read(&dir.path().join("out").join("zeu.tif"));
    assert!(zeu[0] > 0.0);
    assert_eq!(zeu[0], zeu[3]);
    assert!(zeu[1].is_nan());
    assert!(zeu[2].is_nan());
}

#[test]
fn test_missing_band_is_reported() {
    let dir = tempdir().unwrap();
    write_scene(dir.path());
    let missing = dir.path().join("rrs_412.tif");
    std::fs::remove_file(missing).unwrap();
    let config = Config::from_file(write_config(dir.path(), "")).unwrap();

    let err = SceneProcessor::new(config).run().unwrap_err();
    assert!(err.to_string().contains("rrs_412.tif"), "{err}");
}
