//! Bootstrap percentile intervals for the concordance index.
//!
//! Each resample draws `n` subject indices uniformly with replacement. The
//! generator for resample `b` is `StdRng::seed_from_u64(base_seed + b)`, so a
//! fixed seed reproduces the same resamples whether they run in order or on
//! the rayon pool.
//!
//! The point estimate is computed once on the full data and is not forced to
//! lie inside `[ci_lower, ci_upper]`; with skewed resampling distributions it
//! can fall outside the percentile band.

use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use crate::{
    concordance::{concordance_index, Convention},
    config::BootstrapConfig,
    data::SurvivalData,
    error::{ConcordanceError, Result},
};

/// point estimate plus percentile interval
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapInterval {
    pub point_estimate: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub confidence_level: f64,
    pub num_samples: usize,                  // resamples drawn
    pub n_degenerate: usize,                 // resamples with no comparable pair
    pub distribution: Vec<f64>,              // defined resample c-indices, sorted
}

impl BootstrapInterval {
    /// (point, lower, upper)
    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (self.point_estimate, self.ci_lower, self.ci_upper)
    }

    /// std dev of the bootstrap distribution, needs 2+ defined resamples
    pub fn standard_error(&self) -> Option<f64> {
        let m = self.distribution.len();
        if m < 2 {
            return None;
        }
        let mean = self.distribution.iter().sum::<f64>() / m as f64;
        let var = self.distribution.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / (m - 1) as f64;
        Some(var.sqrt())
    }

    pub fn contains_point_estimate(&self) -> bool {
        self.ci_lower <= self.point_estimate && self.point_estimate <= self.ci_upper
    }
}

/// Quantile of sorted data, linear interpolation between order statistics
/// at position `q * (len - 1)`.
pub fn quantile_linear_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    if sorted.len() == 1 {
        return Some(sorted[0]);
    }

    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let i = pos.floor() as usize;
    let j = pos.ceil() as usize;
    if i == j {
        return Some(sorted[i]);
    }
    let t = pos - i as f64;
    Some((1.0 - t) * sorted[i] + t * sorted[j])
}

/// bootstrap estimator w/ builder-style settings
#[derive(Debug, Clone, Default)]
pub struct BootstrapEstimator {
    config: BootstrapConfig,
}

impl BootstrapEstimator {
    /// new estimator w/ defaults (1000 resamples, 95%, Harrell, entropy seed)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: BootstrapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// how many resamples to draw
    pub fn with_num_samples(mut self, num_samples: usize) -> Self {
        self.config.num_samples = num_samples;
        self
    }

    /// fix the seed for reproducible intervals
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// two-sided coverage, e.g. 0.95
    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.config.confidence_level = level;
        self
    }

    /// pair convention for both the point estimate and every resample
    pub fn with_convention(mut self, convention: Convention) -> Self {
        self.config.convention = convention;
        self
    }

    /// spread resamples over rayon (needs the `parallel` feature)
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Estimate the interval. Without a configured seed the base seed comes
    /// from OS entropy.
    pub fn estimate(&self, data: &SurvivalData) -> Result<BootstrapInterval> {
        self.config.validate()?;
        let base_seed = match self.config.seed {
            Some(seed) => seed,
            None => StdRng::from_entropy().r#gen::<u64>(),
        };
        self.estimate_from_seed(data, base_seed)
    }

    /// Estimate the interval, taking the base seed from `rng` instead of the
    /// configured seed.
    pub fn estimate_with_rng<R: Rng>(
        &self,
        data: &SurvivalData,
        rng: &mut R,
    ) -> Result<BootstrapInterval> {
        self.config.validate()?;
        let base_seed = rng.r#gen::<u64>();
        self.estimate_from_seed(data, base_seed)
    }

    fn estimate_from_seed(&self, data: &SurvivalData, base_seed: u64) -> Result<BootstrapInterval> {
        let convention = self.config.convention;

        let point_estimate = concordance_index(data, convention).ok_or_else(|| {
            ConcordanceError::insufficient_data(format!(
                "no comparable pairs among {} subjects",
                data.n_samples()
            ))
        })?;

        debug!(
            "bootstrapping c-index: {} subjects, {} resamples, {:?}, base seed {}",
            data.n_samples(),
            self.config.num_samples,
            convention,
            base_seed
        );

        let replicates = run_replicates(
            data,
            convention,
            base_seed,
            self.config.num_samples,
            self.config.parallel,
        )?;

        interval_from_replicates(point_estimate, replicates, self.config.confidence_level)
    }
}

/// c-index of resample `b`
fn replicate(
    data: &SurvivalData,
    convention: Convention,
    base_seed: u64,
    b: usize,
) -> Result<Option<f64>> {
    let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(b as u64));
    let n = data.n_samples();
    let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

    let resample = data.subset(&indices)?;
    Ok(concordance_index(&resample, convention))
}

#[cfg(feature = "parallel")]
fn run_replicates(
    data: &SurvivalData,
    convention: Convention,
    base_seed: u64,
    num_samples: usize,
    parallel: bool,
) -> Result<Vec<Option<f64>>> {
    use rayon::prelude::*;

    if parallel {
        return (0..num_samples)
            .into_par_iter()
            .map(|b| replicate(data, convention, base_seed, b))
            .collect();
    }

    (0..num_samples)
        .map(|b| replicate(data, convention, base_seed, b))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn run_replicates(
    data: &SurvivalData,
    convention: Convention,
    base_seed: u64,
    num_samples: usize,
    parallel: bool,
) -> Result<Vec<Option<f64>>> {
    if parallel {
        warn!("parallel bootstrap requested but built without the `parallel` feature, running sequentially");
    }

    (0..num_samples)
        .map(|b| replicate(data, convention, base_seed, b))
        .collect()
}

/// drop undefined resamples and take percentiles of the rest
fn interval_from_replicates(
    point_estimate: f64,
    replicates: Vec<Option<f64>>,
    confidence_level: f64,
) -> Result<BootstrapInterval> {
    let num_samples = replicates.len();
    let mut distribution: Vec<f64> = replicates.into_iter().flatten().collect();
    let n_degenerate = num_samples - distribution.len();

    if distribution.is_empty() {
        return Err(ConcordanceError::StatisticalDegeneracy { num_samples });
    }
    if n_degenerate > 0 {
        warn!(
            "{} of {} bootstrap resamples had no comparable pairs and were dropped",
            n_degenerate, num_samples
        );
    }

    distribution.sort_by(f64::total_cmp);
    let alpha = (1.0 - confidence_level) / 2.0;
    let (ci_lower, ci_upper) = match (
        quantile_linear_sorted(&distribution, alpha),
        quantile_linear_sorted(&distribution, 1.0 - alpha),
    ) {
        (Some(lo), Some(hi)) => (lo.min(hi), lo.max(hi)),
        _ => return Err(ConcordanceError::StatisticalDegeneracy { num_samples }),
    };

    debug!(
        "c-index {:.4}, {:.0}% interval [{:.4}, {:.4}]",
        point_estimate,
        confidence_level * 100.0,
        ci_lower,
        ci_upper
    );

    Ok(BootstrapInterval {
        point_estimate,
        ci_lower,
        ci_upper,
        confidence_level,
        num_samples,
        n_degenerate,
        distribution,
    })
}

/// 95% interval on the Harrell c-index - returns (point, lower, upper)
pub fn bootstrap_c_index(
    data: &SurvivalData,
    num_samples: usize,
    seed: Option<u64>,
) -> Result<(f64, f64, f64)> {
    let mut estimator = BootstrapEstimator::new().with_num_samples(num_samples);
    if let Some(seed) = seed {
        estimator = estimator.with_seed(seed);
    }
    Ok(estimator.estimate(data)?.as_tuple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn create_test_data(n: usize) -> SurvivalData {
        // noisy but mostly concordant, every fourth subject censored
        let times: Vec<f64> = (0..n).map(|i| (i + 1) as f64).collect();
        let events: Vec<bool> = (0..n).map(|i| i % 4 != 3).collect();
        let risks: Vec<f64> = (0..n)
            .map(|i| -(i as f64) + if i % 3 == 0 { 4.0 } else { 0.0 })
            .collect();
        SurvivalData::new(times, events, risks).unwrap()
    }

    #[test]
    fn test_quantile_linear_sorted() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_linear_sorted(&xs, 0.0), Some(1.0));
        assert_eq!(quantile_linear_sorted(&xs, 1.0), Some(4.0));
        assert_relative_eq!(quantile_linear_sorted(&xs, 0.5).unwrap(), 2.5, epsilon = 1e-12);
        assert_relative_eq!(quantile_linear_sorted(&xs, 0.025).unwrap(), 1.075, epsilon = 1e-12);
        assert_eq!(quantile_linear_sorted(&[0.3], 0.975), Some(0.3));
        assert_eq!(quantile_linear_sorted(&[], 0.5), None);
    }

    #[test]
    fn test_seed_reproducibility() {
        let data = create_test_data(40);
        let estimator = BootstrapEstimator::new().with_num_samples(200).with_seed(3045);

        let first = estimator.estimate(&data).unwrap();
        let second = estimator.estimate(&data).unwrap();

        assert_eq!(first.ci_lower.to_bits(), second.ci_lower.to_bits());
        assert_eq!(first.ci_upper.to_bits(), second.ci_upper.to_bits());
        assert_eq!(first.point_estimate.to_bits(), second.point_estimate.to_bits());
        assert_eq!(first.distribution, second.distribution);
    }

    #[test]
    fn test_different_seeds_differ() {
        let data = create_test_data(40);
        let a = BootstrapEstimator::new().with_num_samples(200).with_seed(1).estimate(&data).unwrap();
        let b = BootstrapEstimator::new().with_num_samples(200).with_seed(2).estimate(&data).unwrap();

        assert_eq!(a.point_estimate, b.point_estimate);
        assert_ne!(a.distribution, b.distribution);
    }

    #[test]
    fn test_seeded_interval_is_stable() {
        // fixed values, so a change in seeding or resampling shows up across runs
        let data = create_test_data(40);
        let interval = BootstrapEstimator::new()
            .with_num_samples(200)
            .with_seed(3045)
            .estimate(&data)
            .unwrap();

        assert_eq!(interval.n_degenerate, 0);
        assert_eq!(interval.point_estimate.to_bits(), 0x3feeb17e4b17e4b1); // 0.9591666666666666
        assert_eq!(interval.ci_lower.to_bits(), 0x3fee08c7cebeabb8);       // 0.9385718381866957
        assert_eq!(interval.ci_upper.to_bits(), 0x3fef4e08d6da124b);       // 0.9782756992650062
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_flag_matches_sequential() {
        let data = create_test_data(30);
        let sequential = BootstrapEstimator::new().with_num_samples(100).with_seed(9);
        let parallel = sequential.clone().with_parallel(true);

        assert_eq!(sequential.estimate(&data).unwrap(), parallel.estimate(&data).unwrap());
    }

    #[test]
    fn test_interval_ordering() {
        let data = create_test_data(25);
        for seed in 0..10 {
            let interval = BootstrapEstimator::new()
                .with_num_samples(50)
                .with_seed(seed)
                .estimate(&data)
                .unwrap();

            assert!(interval.ci_lower <= interval.ci_upper);
            assert!((0.0..=1.0).contains(&interval.ci_lower));
            assert!((0.0..=1.0).contains(&interval.ci_upper));
            assert_eq!(interval.num_samples, 50);
            assert_eq!(interval.distribution.len() + interval.n_degenerate, 50);
        }
    }

    #[test]
    fn test_perfectly_concordant_interval() {
        // duplicated subjects share time and are events, so Harrell never compares them
        let times = (1..=10).map(|t| t as f64).collect();
        let risks = (1..=10).map(|t| -(t as f64)).collect();
        let data = SurvivalData::new(times, vec![true; 10], risks).unwrap();

        let interval = BootstrapEstimator::new().with_num_samples(100).with_seed(5).estimate(&data).unwrap();
        assert_eq!(interval.point_estimate, 1.0);
        assert_relative_eq!(interval.ci_lower, 1.0, epsilon = 1e-12);
        assert_relative_eq!(interval.ci_upper, 1.0, epsilon = 1e-12);
        assert!(interval.distribution.iter().all(|&c| c == 1.0));
        assert_eq!(interval.standard_error(), Some(0.0));
    }

    #[test]
    fn test_rejects_bad_configuration() {
        let data = create_test_data(10);

        let err = BootstrapEstimator::new().with_num_samples(0).estimate(&data).unwrap_err();
        assert!(matches!(err, ConcordanceError::InvalidConfiguration { .. }));

        for level in [0.0, 1.0, -0.5, 1.5] {
            let err = BootstrapEstimator::new()
                .with_confidence_level(level)
                .estimate(&data)
                .unwrap_err();
            assert!(matches!(err, ConcordanceError::InvalidConfiguration { .. }));
        }
    }

    #[test]
    fn test_insufficient_data() {
        let empty = SurvivalData::new(vec![], vec![], vec![]).unwrap();
        let err = BootstrapEstimator::new().with_seed(1).estimate(&empty).unwrap_err();
        assert!(matches!(err, ConcordanceError::InsufficientData { .. }));

        let all_censored = SurvivalData::new(vec![1.0, 2.0, 3.0], vec![false; 3], vec![0.1, 0.2, 0.3]).unwrap();
        let err = BootstrapEstimator::new().with_seed(1).estimate(&all_censored).unwrap_err();
        assert!(matches!(err, ConcordanceError::InsufficientData { .. }));
    }

    #[test]
    fn test_all_degenerate_resamples() {
        let err = interval_from_replicates(0.7, vec![None; 25], 0.95).unwrap_err();
        assert_eq!(err, ConcordanceError::StatisticalDegeneracy { num_samples: 25 });
    }

    #[test]
    fn test_degenerate_resamples_dropped() {
        let replicates = vec![Some(0.6), None, Some(0.8), None, Some(0.7)];
        let interval = interval_from_replicates(0.7, replicates, 0.5).unwrap();

        assert_eq!(interval.n_degenerate, 2);
        assert_eq!(interval.distribution, vec![0.6, 0.7, 0.8]);
        assert_relative_eq!(interval.ci_lower, 0.65, epsilon = 1e-12);
        assert_relative_eq!(interval.ci_upper, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_point_estimate_may_fall_outside() {
        let interval = interval_from_replicates(0.9, vec![Some(0.5), Some(0.6), Some(0.55)], 0.95).unwrap();
        assert!(!interval.contains_point_estimate());
        assert!(interval.ci_lower <= interval.ci_upper);
    }

    #[test]
    fn test_estimate_with_rng() {
        let data = create_test_data(30);
        let estimator = BootstrapEstimator::new().with_num_samples(80);

        let a = estimator.estimate_with_rng(&data, &mut StdRng::seed_from_u64(77)).unwrap();
        let b = estimator.estimate_with_rng(&data, &mut StdRng::seed_from_u64(77)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bootstrap_c_index_helper() {
        let data = create_test_data(30);
        let (point, lower, upper) = bootstrap_c_index(&data, 100, Some(3045)).unwrap();
        let expected = BootstrapEstimator::new()
            .with_num_samples(100)
            .with_seed(3045)
            .estimate(&data)
            .unwrap();

        assert_eq!((point, lower, upper), expected.as_tuple());
        assert_eq!(Some(point), concordance_index(&data, Convention::Harrell));
    }
}
