use survival_concordance::{BootstrapConfig, BootstrapEstimator, SurvivalData};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("Bootstrap Confidence Interval Example");
    println!("=====================================\n");

    let mut rng = StdRng::seed_from_u64(3045);
    let n_samples = 250;
    let mut times = Vec::with_capacity(n_samples);
    let mut events = Vec::with_capacity(n_samples);
    let mut risks = Vec::with_capacity(n_samples);

    for _ in 0..n_samples {
        let linear_pred: f64 = rng.gen_range(-2.0..2.0);
        let time = -rng.r#gen::<f64>().ln() / (0.1 * linear_pred.exp());
        let censoring_time = rng.gen_range(1.0..15.0);

        times.push(time.min(censoring_time));
        events.push(time < censoring_time);
        risks.push(linear_pred + rng.gen_range(-1.0..1.0));
    }
    let data = SurvivalData::new(times, events, risks)?;

    let config = BootstrapConfig::from_toml_str(
        r#"
        [bootstrap]
        num_samples = 1000
        seed = 3045
        confidence_level = 0.95
        "#,
    )?;
    println!("Config: {:?}\n", config);

    let interval = BootstrapEstimator::from_config(config).estimate(&data)?;
    println!("C-index:          {:.6}", interval.point_estimate);
    println!("{:.0}% interval:     [{:.6}, {:.6}]", interval.confidence_level * 100.0, interval.ci_lower, interval.ci_upper);
    if let Some(se) = interval.standard_error() {
        println!("Bootstrap SE:     {:.6}", se);
    }
    println!("Dropped resamples: {}", interval.n_degenerate);

    Ok(())
}
