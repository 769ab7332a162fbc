use qaa_iop::iop::{ConfAlgorithm, IopResult, QaaAlgorithm, SensorConfig, WaterClarity, qaaf_zeu};

fn main() {
    // MERIS reflectance at 412, 443, 490, 510, 560, 620 and 665 nm
    let meris = [
        0.030262154,
        0.031086152,
        0.022717977,
        0.013177891,
        0.0072450927,
        0.0028870495,
        0.0024475828,
    ];

    let algorithm = QaaAlgorithm::default();
    let mut result = IopResult::new();
    match algorithm.process(&meris, &mut result) {
        Ok(()) => println!("{}\n{}", algorithm.sensor(), result),
        Err(e) => println!("{e}"),
    }

    if let Ok(zeu) = qaaf_zeu(
        result.a_total()[2] as f64,
        result.bb_spm()[2] as f64,
        30.0,
        WaterClarity::OnePercent,
    ) {
        println!("Euphotic depth: {zeu:.2} m");
    }

    // Same retrieval on SeaWiFS bands, raw values without bounds or flags
    let seawifs = [
        0.0016797247,
        0.0018691907,
        0.0027188008,
        0.0030926220,
        0.0040638220,
        0.0012051459,
    ];
    let algorithm = ConfAlgorithm::new(SensorConfig::seawifs());
    if algorithm.process(&seawifs, &mut result).is_ok() {
        println!("{}\n{}", algorithm.sensor(), result);
    }
}
