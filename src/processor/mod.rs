//! Scene processing: resolve and load the reflectance bands, apply the water
//! mask, run the QAA on every pixel in parallel and write the output rasters.

use log::{debug, info};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::{Config, ConfigError, WaterClarityConfig, WaterMask};
use crate::iop::{
    IopFlags, IopResult, MAX_BANDS, NO_DATA_VALUE, NUM_A_PIG_BANDS, NUM_A_TOTAL_BANDS,
    NUM_A_YS_BANDS, NUM_BB_SPM_BANDS, NUM_IOP_BANDS, QaaAlgorithm, SensorConfig, qaaf_zeu,
};
use crate::readers::{Data, RasterError, create_reader, write_f32, write_u8};
use crate::utils;

pub const FLAGS_BAND_NAME: &str = "analytical_flags";
pub const ZEU_BAND_NAME: &str = "zeu";

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("Band file {name} not found under {directory}")]
    MissingBand { name: String, directory: PathBuf },
    #[error("Failed to create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Names of the 16 IOP bands in output order, e.g. `a_412`, `bb_412`, `aph_412`, `adg_412`
pub fn output_band_names(sensor: &SensorConfig) -> Vec<String> {
    let wl = sensor.wavelengths();
    let named = |prefix: &str, count: usize| {
        wl[..count]
            .iter()
            .map(|w| format!("{}_{}", prefix, w.round() as i64))
            .collect::<Vec<_>>()
    };

    let mut names = named("a", NUM_A_TOTAL_BANDS);
    names.extend(named("bb", NUM_BB_SPM_BANDS));
    names.extend(named("aph", NUM_A_PIG_BANDS));
    names.extend(named("adg", NUM_A_YS_BANDS));
    names
}

/// Input reflectance bands of one scene, all with the same dimensions
#[derive(Debug, Clone)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub bands: Vec<Data>,
    /// Per pixel water decision, every pixel is water when absent
    pub water: Option<Vec<bool>>,
}

impl Scene {
    pub fn new(bands: Vec<Data>, water: Option<Vec<bool>>) -> Result<Self, RasterError> {
        let (width, height) = bands.first().map_or((0, 0), |b| (b.width, b.height));
        for band in &bands {
            band.check_dimensions(width, height)?;
            if band.buffer.len() != band.num_pixels() {
                return Err(RasterError::BufferLength {
                    expected: band.num_pixels(),
                    got: band.buffer.len(),
                });
            }
        }
        let num_pixels = width as usize * height as usize;
        if let Some(water) = &water
            && water.len() != num_pixels
        {
            return Err(RasterError::BufferLength {
                expected: num_pixels,
                got: water.len(),
            });
        }

        Ok(Self {
            width,
            height,
            bands,
            water,
        })
    }

    pub fn num_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn is_water(&self, pixel: usize) -> bool {
        self.water.as_ref().is_none_or(|water| water[pixel])
    }
}

/// Per pixel retrieval output of a scene
#[derive(Debug, Clone)]
pub struct IopScene {
    pub width: u32,
    pub height: u32,
    /// Pixel-major values in [`IopResult::write_to`] order
    pub iops: Vec<[f32; NUM_IOP_BANDS]>,
    pub flags: Vec<u8>,
    pub zeu: Option<Vec<f32>>,
}

impl IopScene {
    /// One output band as a row-major raster buffer
    pub fn band(&self, index: usize) -> Vec<f32> {
        self.iops.iter().map(|pixel| pixel[index]).collect()
    }

    pub fn count_flag(&self, flag: IopFlags) -> usize {
        self.flags
            .iter()
            .filter(|&&bits| IopFlags::from_bits_truncate(bits).contains(flag))
            .count()
    }

    /// Write every band as `<name>.tif` into `directory`
    pub fn write(&self, directory: &Path, names: &[String]) -> Result<Vec<PathBuf>, ProcessError> {
        std::fs::create_dir_all(directory).map_err(|source| ProcessError::OutputDirectory {
            path: directory.to_path_buf(),
            source,
        })?;

        let mut written = Vec::with_capacity(NUM_IOP_BANDS + 2);
        for (index, name) in names.iter().enumerate().take(NUM_IOP_BANDS) {
            let path = directory.join(format!("{name}.tif"));
            let band = self.band(index);
            utils::log_band_statistics(name, &band);
            write_f32(&path, self.width, self.height, &band)?;
            written.push(path);
        }

        let path = directory.join(format!("{FLAGS_BAND_NAME}.tif"));
        for (flag, name, description) in IopFlags::CODING {
            let count = self.count_flag(flag);
            debug!("  {name} ({description}): {count} pixels");
        }
        write_u8(&path, self.width, self.height, &self.flags)?;
        written.push(path);

        if let Some(zeu) = &self.zeu {
            let path = directory.join(format!("{ZEU_BAND_NAME}.tif"));
            utils::log_band_statistics(ZEU_BAND_NAME, zeu);
            write_f32(&path, self.width, self.height, zeu)?;
            written.push(path);
        }

        info!("Wrote {} rasters to {}", written.len(), directory.display());
        Ok(written)
    }
}

pub struct SceneProcessor {
    config: Config,
    algorithm: QaaAlgorithm,
}

impl SceneProcessor {
    pub fn new(config: Config) -> Self {
        let algorithm = QaaAlgorithm::new(config.sensor().config(), *config.qaa());
        SceneProcessor { config, algorithm }
    }

    pub fn algorithm(&self) -> &QaaAlgorithm {
        &self.algorithm
    }

    /// Load, process and write the configured scene
    pub fn run(&self) -> Result<Vec<PathBuf>, ProcessError> {
        let scene = self.load_scene()?;
        let iops = self.process_scene(&scene);
        let names = output_band_names(self.algorithm.sensor());
        iops.write(self.config.output_directory(), &names)
    }

    pub fn load_scene(&self) -> Result<Scene, ProcessError> {
        let directory = self.config.input_directory();

        let mut bands = Vec::with_capacity(self.config.bands().len());
        for name in self.config.bands() {
            let path = resolve_file(directory, name)?;
            debug!("Reading band {}", path.display());
            bands.push(create_reader(&path)?.read_data()?);
        }

        let water = match self.config.water_mask() {
            Some(mask) => Some(load_water_mask(directory, mask)?),
            None => None,
        };

        let scene = Scene::new(bands, water)?;
        info!(
            "Loaded {} bands of {}x{} pixels",
            scene.bands.len(),
            scene.width,
            scene.height
        );
        Ok(scene)
    }

    /// Run the retrieval on every pixel of `scene`.
    ///
    /// Non-water pixels are invalidated without running the kernel. Each
    /// worker recycles a single [`IopResult`].
    ///
    /// # Panics
    ///
    /// If the scene has fewer bands than the sensor needs.
    pub fn process_scene(&self, scene: &Scene) -> IopScene {
        let num_pixels = scene.num_pixels();
        let num_bands = scene.bands.len().min(MAX_BANDS);
        let algorithm = &self.algorithm;

        let mut iops = vec![[NO_DATA_VALUE; NUM_IOP_BANDS]; num_pixels];
        let mut flags = vec![0u8; num_pixels];

        iops.par_iter_mut()
            .zip(flags.par_iter_mut())
            .enumerate()
            .for_each_init(IopResult::new, |result, (pixel, (out, flag))| {
                if scene.is_water(pixel) {
                    let mut spectrum = [0.0f32; MAX_BANDS];
                    for (value, band) in spectrum.iter_mut().zip(&scene.bands) {
                        *value = band.buffer[pixel];
                    }
                    // Failures are recorded in the flags
                    let _ = algorithm.process(&spectrum[..num_bands], result);
                } else {
                    result.invalidate();
                }
                result.write_to(out);
                *flag = result.flag_bits();
            });

        let zeu = self
            .config
            .water_clarity()
            .map(|wc| self.euphotic_depth(&iops, &flags, wc));

        let output = IopScene {
            width: scene.width,
            height: scene.height,
            iops,
            flags,
            zeu,
        };

        info!("Processed {} pixels", num_pixels);
        debug!(
            "{} non-water, {} imaginary, {} negative a_ys pixels",
            output.count_flag(IopFlags::INVALID),
            output.count_flag(IopFlags::IMAGINARY),
            output.count_flag(IopFlags::NEGATIVE_AYS)
        );
        output
    }

    fn euphotic_depth(
        &self,
        iops: &[[f32; NUM_IOP_BANDS]],
        flags: &[u8],
        water_clarity: &WaterClarityConfig,
    ) -> Vec<f32> {
        let cyan = self.algorithm.sensor().closest_band(490.0);
        let a_index = cyan;
        let bb_index = NUM_A_TOTAL_BANDS + cyan;
        let sun_zenith = water_clarity.sun.zenith();
        let percentile = water_clarity.percentile;
        info!(
            "Euphotic depth at {} light, sun zenith {:.2} deg",
            percentile, sun_zenith
        );

        let valid = IopFlags::VALID.bits();
        let zeu: Vec<f32> = iops
            .par_iter()
            .zip(flags.par_iter())
            .map(|(pixel, &bits)| {
                if bits & valid == 0 {
                    return NO_DATA_VALUE;
                }
                qaaf_zeu(
                    pixel[a_index] as f64,
                    pixel[bb_index] as f64,
                    sun_zenith,
                    percentile,
                )
                .map_or(NO_DATA_VALUE, |z| z as f32)
            })
            .collect();

        let failures = zeu
            .iter()
            .zip(flags)
            .filter(|(z, bits)| z.is_nan() && **bits & valid != 0)
            .count();
        debug!("{} valid pixels without euphotic depth", failures);

        zeu
    }
}

fn load_water_mask(directory: &Path, mask: &WaterMask) -> Result<Vec<bool>, ProcessError> {
    let path = resolve_file(directory, &mask.file)?;
    debug!("Reading water mask {}", path.display());
    let data = create_reader(&path)?.read_flags()?;
    Ok(data.buffer.iter().map(|&v| mask.is_water(v)).collect())
}

/// Look for `name` directly under `directory`, then recursively below it
pub fn resolve_file(directory: &Path, name: &str) -> Result<PathBuf, ProcessError> {
    let direct_path = directory.join(name);
    if direct_path.is_file() {
        return Ok(direct_path);
    }

    search_file_recursively(directory, name).ok_or_else(|| ProcessError::MissingBand {
        name: name.to_string(),
        directory: directory.to_path_buf(),
    })
}

fn search_file_recursively(base_dir: &Path, filename: &str) -> Option<PathBuf> {
    if !base_dir.exists() {
        return None;
    }

    for entry in WalkDir::new(base_dir).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file()
            && let Some(file_name) = entry.path().file_name()
            && file_name.to_string_lossy() == filename
        {
            return Some(entry.path().to_path_buf());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SunPosition, WaterClarityConfig};
    use crate::iop::{Sensor, WaterClarity};
    use approx::assert_abs_diff_eq;
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

    fn band_names() -> Vec<String> {
        (0..7).map(|b| format!("rrs_{b}.tif")).collect()
    }

    fn uniform_scene(pixels: u32, water: Option<Vec<bool>>) -> Scene {
        let bands = MERIS_RRS
            .iter()
            .map(|&v| Data {
                width: pixels,
                height: 1,
                buffer: vec![v; pixels as usize],
            })
            .collect();
        Scene::new(bands, water).unwrap()
    }

    fn meris_config() -> Config {
        let names = band_names();
        Config::new(Sensor::MerisLegacy, ".", names, ".").unwrap()
    }

    fn processor(config: Config) -> SceneProcessor {
        SceneProcessor::new(config)
    }

    #[test]
    fn test_output_band_names() {
        let names = output_band_names(&SensorConfig::meris_legacy());
        assert_eq!(names.len(), NUM_IOP_BANDS);
        assert_eq!(names[0], "a_412");
        assert_eq!(names[4], "a_560");
        assert_eq!(names[5], "bb_412");
        assert_eq!(names[10], "aph_412");
        assert_eq!(names[15], "adg_490");

        let names = output_band_names(&SensorConfig::modis());
        assert_eq!(names[4], "a_547");
    }

    #[test]
    fn test_scene_dimension_mismatch() {
        let bands = vec![
            Data {
                width: 2,
                height: 1,
                buffer: vec![0.0; 2],
            },
            Data {
                width: 1,
                height: 2,
                buffer: vec![0.0; 2],
            },
        ];
        assert!(matches!(
            Scene::new(bands, None),
            Err(RasterError::Dimensions { .. })
        ));
    }

    #[test]
    fn test_process_scene_with_mask() {
        let config = meris_config();
        let scene = uniform_scene(3, Some(vec![true, false, true]));
        let output = processor(config).process_scene(&scene);

        assert_eq!(output.flags, vec![1, 8, 1]);
        assert!(output.iops[1].iter().all(|v| v.is_nan()));
        assert_eq!(output.iops[0], output.iops[2]);
        assert_abs_diff_eq!(output.iops[0][0], 0.038455005, epsilon = 1e-7);
        assert_eq!(output.count_flag(IopFlags::INVALID), 1);
        assert!(output.zeu.is_none());
    }

    #[test]
    fn test_failed_pixel_does_not_leak() {
        let config = meris_config();
        let mut scene = uniform_scene(4, None);
        scene.bands[0].buffer[1] = -0.2;
        let output = processor(config).process_scene(&scene);

        assert_eq!(output.flags, vec![1, 2, 1, 1]);
        assert!(output.iops[1].iter().all(|v| v.is_nan()));
        assert_eq!(output.iops[0], output.iops[3]);
    }

    #[test]
    fn test_euphotic_depth_band() {
        let config = meris_config().with_water_clarity(WaterClarityConfig {
            percentile: WaterClarity::OnePercent,
            sun: SunPosition::Zenith(30.0),
        });
        let scene = uniform_scene(2, Some(vec![true, false]));
        let output = processor(config).process_scene(&scene);

        let zeu = output.zeu.unwrap();
        let expected = qaaf_zeu(
            output.iops[0][2] as f64,
            output.iops[0][NUM_A_TOTAL_BANDS + 2] as f64,
            30.0,
            WaterClarity::OnePercent,
        )
        .unwrap();
        assert_abs_diff_eq!(zeu[0], expected as f32);
        assert!(zeu[0] > 0.0);
        assert!(zeu[1].is_nan());
    }

    #[test]
    fn test_resolve_file_recursively() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("2024").join("07");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("rrs_443.tif"), b"").unwrap();
        std::fs::write(dir.path().join("rrs_412.tif"), b"").unwrap();

        assert_eq!(
            resolve_file(dir.path(), "rrs_412.tif").unwrap(),
            dir.path().join("rrs_412.tif")
        );
        assert_eq!(
            resolve_file(dir.path(), "rrs_443.tif").unwrap(),
            nested.join("rrs_443.tif")
        );
        assert!(matches!(
            resolve_file(dir.path(), "rrs_490.tif"),
            Err(ProcessError::MissingBand { .. })
        ));
    }
}
