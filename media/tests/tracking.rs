use media::tracking::*;
use media::*;
use render_core::geometry::*;
use render_core::medium::*;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::sampler::*;
use render_core::stats::*;
use samplers::*;
use std::sync::Arc;

const N: usize = 20_000;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn homogeneous(sigma_t: Float, albedo: Float) -> ArcMedium {
    let mut params = ParamSet::new();
    params.add_float("sigma_t", &[sigma_t]);
    params.add_float("albedo", &[albedo]);
    let medium = HomogeneousMedium::from_params(&params).expect("valid homogeneous medium");
    params.report_unused();
    Arc::new(medium)
}

/// Optical depth 2 along x through the unit cube.
fn ramp() -> ArcMedium {
    let mut params = ParamSet::new();
    params.add_string("sigma_t.type", &[String::from("grid")]);
    params.add_int("sigma_t.resolution", &[2, 1, 1]);
    params.add_float("sigma_t.values", &[1.0, 3.0]);
    params.add_float("albedo", &[0.8]);
    Arc::new(HeterogeneousMedium::from_params(&params).expect("valid heterogeneous medium"))
}

#[test]
fn homogeneous_escape_and_scatter_mass() {
    init();
    let albedo = 0.6;
    let medium = homogeneous(2.0, albedo);
    let ray = Ray::new(Point3f::ZERO, Vector3f::Z, 1.0, 0.0);
    let mut sampler = IndependentSampler::new(5);
    let mut stats = TrackingStats::new();

    let mut escaped = 0.0;
    let mut scattered = 0.0;
    for _ in 0..N {
        match sample_scattering(&medium, &ray, 0, &mut sampler, &mut stats) {
            ScatteringEvent::Escaped { weight } => escaped += weight[0] as f64,
            ScatteringEvent::Scattered { mi, weight } => {
                assert!(mi.t <= 1.0);
                scattered += weight[0] as f64;
            }
            ScatteringEvent::Absorbed => {}
        }
    }
    stats.report("homogeneous");

    let expected_escape = (-2.0_f64).exp();
    let expected_scatter = albedo as f64 * (1.0 - expected_escape);
    assert!((escaped / N as f64 - expected_escape).abs() < 0.01);
    assert!((scattered / N as f64 - expected_scatter).abs() < 0.01);
    assert_eq!(stats.null_collisions, 0);
    assert_eq!(stats.escapes + stats.real_collisions, N as u64);
}

#[test]
fn spectral_extinction_weights_per_channel() {
    init();
    let albedo = 0.5;
    let sigma = [0.5, 1.0, 2.0];
    let mut params = ParamSet::new();
    params.add_rgb_spectrum("sigma_t", &sigma);
    params.add_float("albedo", &[albedo]);
    let medium: ArcMedium = Arc::new(HomogeneousMedium::from_params(&params).expect("valid spectral medium"));
    let ray = Ray::new(Point3f::ZERO, Vector3f::Z, 1.0, 0.0);
    let mut sampler = IndependentSampler::new(17);
    let mut stats = TrackingStats::new();

    let mut escaped = [0.0_f64; 3];
    let mut scattered = [0.0_f64; 3];
    for _ in 0..N {
        match sample_scattering(&medium, &ray, 1, &mut sampler, &mut stats) {
            ScatteringEvent::Escaped { weight } => {
                for c in 0..3 {
                    escaped[c] += weight[c] as f64;
                }
            }
            ScatteringEvent::Scattered { weight, .. } => {
                for c in 0..3 {
                    scattered[c] += weight[c] as f64;
                }
            }
            ScatteringEvent::Absorbed => {}
        }
    }

    for c in 0..3 {
        let transmittance = (-(sigma[c] as f64)).exp();
        let mean_escape = escaped[c] / N as f64;
        let mean_scatter = scattered[c] / N as f64;
        assert!(
            (mean_escape - transmittance).abs() < 0.01,
            "channel {}: escape {} vs {}",
            c,
            mean_escape,
            transmittance
        );
        assert!(
            (mean_scatter - albedo as f64 * (1.0 - transmittance)).abs() < 0.015,
            "channel {}: scatter {}",
            c,
            mean_scatter
        );
    }
}

#[test]
fn delta_tracking_through_ramp() {
    init();
    let medium = ramp();
    let ray = Ray::unbounded(Point3f::new(-1.0, 0.5, 0.5), Vector3f::X);
    let mut sampler = IndependentSampler::new(6);
    let mut stats = TrackingStats::new();

    let mean = (0..N)
        .map(|_| delta_tracking_transmittance(medium.as_ref(), &ray, 0, &mut sampler, &mut stats) as f64)
        .sum::<f64>()
        / N as f64;
    stats.report("delta tracking");

    assert!((mean - (-2.0_f64).exp()).abs() < 0.01, "mean {}", mean);
    assert!(stats.null_collisions > 0);
    assert_eq!(stats.steps.count(), N as u64);
}

#[test]
fn ratio_tracking_through_ramp() {
    init();
    let medium = ramp();
    let ray = Ray::unbounded(Point3f::new(-1.0, 0.5, 0.5), Vector3f::X);
    let mut sampler = HaltonSampler::new(7);
    let mut stats = TrackingStats::new();

    let mut sum = 0.0;
    for i in 0..N as u64 {
        sampler.start_sample(i);
        let tr = ratio_tracking_transmittance(medium.as_ref(), &ray, 2, &mut sampler, &mut stats);
        assert!(tr >= 0.0);
        sum += tr as f64;
    }
    stats.report("ratio tracking");

    let mean = sum / N as f64;
    assert!((mean - (-2.0_f64).exp()).abs() < 0.01, "mean {}", mean);
    assert_eq!(stats.real_collisions, 0);
}

#[test]
fn per_thread_stats_merge() {
    init();
    let medium = homogeneous(1.0, 0.5);
    let ray = Ray::new(Point3f::ZERO, Vector3f::Y, 2.0, 0.0);
    let base = IndependentSampler::new(0);

    let mut total = TrackingStats::new();
    for seed in 0..4 {
        let mut sampler: Box<dyn Sampler> = base.clone_sampler(seed);
        let mut stats = TrackingStats::new();
        for _ in 0..100 {
            delta_tracking_transmittance(medium.as_ref(), &ray, 0, sampler.as_mut(), &mut stats);
        }
        total.merge(&stats);
    }
    assert_eq!(total.steps.count(), 400);
    assert_eq!(total.escapes + total.real_collisions, 400);
}

#[test]
fn escape_weight_is_one_for_uniform_extinction() {
    init();
    let medium = ramp();
    let ray = Ray::new(Point3f::new(-1.0, 0.5, 0.5), Vector3f::X, 1.5, 0.0);
    let mut sampler = IndependentSampler::new(8);
    let mut stats = TrackingStats::new();
    for _ in 0..200 {
        if let ScatteringEvent::Escaped { weight } = sample_scattering(&medium, &ray, 0, &mut sampler, &mut stats) {
            assert!(weight.max_value() <= 1.0 + 1e-4);
            assert!(!weight.has_nans());
        }
    }
    assert!(stats.escapes > 0);
}
