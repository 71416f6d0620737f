//! Tracking estimators
//!
//! Walks along a ray through a medium, one tentative collision at a time.
//! Rays must have unit-length directions so that ray parameters are
//! distances. Event counts go to a caller-owned `TrackingStats`.

use render_core::geometry::*;
use render_core::interaction::*;
use render_core::medium::*;
use render_core::pbrt::*;
use render_core::sampler::*;
use render_core::spectrum::*;
use render_core::stats::*;
use std::sync::Arc;

/// Transmittance below which ratio tracking applies Russian roulette.
const RR_THRESHOLD: Float = 0.1;

/// Outcome of a scattering walk.
pub enum ScatteringEvent {
    /// A real scattering collision. `mi.t` and `mi.mint` are measured along
    /// the original ray and `mi.medium` is set.
    Scattered { mi: MediumInteraction, weight: Spectrum },

    /// The walk reached the end of the ray segment or left the medium.
    Escaped { weight: Spectrum },

    /// The path weight dropped to zero.
    Absorbed,
}

/// Continues `ray` from the collision at parameter `t`.
fn advance(ray: &Ray, t: Float) -> Ray {
    Ray::new(ray.at(t), ray.d, ray.t_max - t, ray.time)
}

/// Estimates the transmittance of one channel along `ray` with delta
/// tracking. Every estimate is either 0 or 1.
///
/// * `medium`  - The medium.
/// * `ray`     - The ray; `t_max` bounds the segment.
/// * `channel` - Channel to estimate.
/// * `sampler` - The sampler.
/// * `stats`   - Event counts.
pub fn delta_tracking_transmittance<M: Medium + ?Sized>(
    medium: &M,
    ray: &Ray,
    channel: usize,
    sampler: &mut dyn Sampler,
    stats: &mut TrackingStats,
) -> Float {
    debug_assert!((ray.d.length() - 1.0).abs() < 1e-3, "ray direction must be normalized");

    let mut ray = *ray;
    let mut steps = 0_u64;
    let tr = loop {
        let mi = medium.sample_interaction(&ray, sampler.next_1d(), channel, true);
        if !mi.is_valid() {
            stats.escapes += 1;
            break 1.0;
        }
        steps += 1;

        let m = mi.combined_extinction[channel];
        if sampler.next_1d() * m < mi.sigma_t[channel] {
            stats.real_collisions += 1;
            break 0.0;
        }
        stats.null_collisions += 1;
        ray = advance(&ray, mi.t);
    };
    stats.steps.report(steps);
    tr
}

/// Estimates the transmittance of one channel along `ray` with ratio
/// tracking. Each tentative collision multiplies the estimate by the null
/// fraction `1 - σt / majorant`; Russian roulette ends walks whose estimate
/// has become small.
///
/// * `medium`  - The medium.
/// * `ray`     - The ray; `t_max` bounds the segment.
/// * `channel` - Channel to estimate.
/// * `sampler` - The sampler.
/// * `stats`   - Event counts.
pub fn ratio_tracking_transmittance<M: Medium + ?Sized>(
    medium: &M,
    ray: &Ray,
    channel: usize,
    sampler: &mut dyn Sampler,
    stats: &mut TrackingStats,
) -> Float {
    debug_assert!((ray.d.length() - 1.0).abs() < 1e-3, "ray direction must be normalized");

    let mut ray = *ray;
    let mut tr = 1.0;
    let mut steps = 0_u64;
    loop {
        let mi = medium.sample_interaction(&ray, sampler.next_1d(), channel, true);
        if !mi.is_valid() {
            stats.escapes += 1;
            break;
        }
        steps += 1;
        stats.null_collisions += 1;

        let m = mi.combined_extinction[channel];
        tr *= 1.0 - max(0.0, mi.sigma_t[channel] / m);

        if tr < RR_THRESHOLD {
            let q = max(0.05, 1.0 - tr);
            if sampler.next_1d() < q {
                tr = 0.0;
                break;
            }
            tr /= 1.0 - q;
        }
        ray = advance(&ray, mi.t);
    }
    stats.steps.report(steps);
    tr
}

/// Samples the first real scattering event along `ray`. Each free flight
/// multiplies the path weight by the majorant transmittance over its
/// density in `channel`. Tentative collisions are classified with the
/// medium's interaction probabilities and the weight carries the ratio of
/// coefficients to probabilities.
///
/// * `medium`  - The medium.
/// * `ray`     - The ray; `t_max` bounds the segment.
/// * `channel` - Channel whose majorant drives free-flight sampling.
/// * `sampler` - The sampler.
/// * `stats`   - Event counts.
pub fn sample_scattering(
    medium: &ArcMedium,
    ray: &Ray,
    channel: usize,
    sampler: &mut dyn Sampler,
    stats: &mut TrackingStats,
) -> ScatteringEvent {
    debug_assert!((ray.d.length() - 1.0).abs() < 1e-3, "ray direction must be normalized");

    let mut segment = *ray;
    let mut offset = 0.0;
    let mut weight = Spectrum::ONE;
    let mut steps = 0_u64;
    let event = loop {
        let mut mi = medium.sample_interaction(&segment, sampler.next_1d(), channel, true);
        let si = SurfaceInteraction {
            t: segment.t_max,
            ..Default::default()
        };
        let (tr, pdf) = medium.transmittance_eval_pdf(&mi, &si, true);
        if !mi.is_valid() {
            // Spectral majorants leave a ratio of survival probabilities.
            if pdf[channel] > 0.0 {
                weight *= tr / pdf[channel];
            }
            stats.escapes += 1;
            break ScatteringEvent::Escaped { weight };
        }
        steps += 1;

        weight = (weight * tr / pdf[channel]).sanitize();
        let ((prob_scatter, _prob_null), (weight_scatter, weight_null)) =
            medium.get_interaction_probabilities(&Spectrum::ONE, &mi, &weight);

        if sampler.next_1d() < prob_scatter {
            stats.real_collisions += 1;
            weight *= weight_scatter;
            if weight.is_black() {
                break ScatteringEvent::Absorbed;
            }
            let t = mi.t;
            mi.t = t + offset;
            mi.mint += offset;
            mi.medium = Some(Arc::clone(medium));
            break ScatteringEvent::Scattered { mi, weight };
        }

        stats.null_collisions += 1;
        weight *= weight_null;
        if weight.is_black() {
            break ScatteringEvent::Absorbed;
        }
        offset += mi.t;
        segment = advance(&segment, mi.t);
    };
    stats.steps.report(steps);
    event
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HomogeneousMedium;
    use render_core::paramset::*;
    use render_core::rng::*;

    /// Minimal sampler so these tests do not depend on the samplers crate.
    struct RngSampler(RNG);

    impl Sampler for RngSampler {
        fn next_1d(&mut self) -> Float {
            self.0.uniform_float()
        }

        fn next_2d(&mut self) -> Point2f {
            let x = self.0.uniform_float();
            Point2f::new(x, self.0.uniform_float())
        }

        fn seed(&mut self, seed: u64) {
            self.0 = RNG::new(seed);
        }

        fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler> {
            Box::new(RngSampler(RNG::new(seed)))
        }
    }

    fn homogeneous(albedo: Float) -> ArcMedium {
        let mut params = ParamSet::new();
        params.add_float("sigma_t", &[1.0]);
        params.add_float("albedo", &[albedo]);
        Arc::new(HomogeneousMedium::from_params(&params).unwrap())
    }

    #[test]
    fn tight_majorant_has_no_null_collisions() {
        let medium = homogeneous(0.5);
        let ray = Ray::new(Point3f::ZERO, Vector3f::Z, 1.0, 0.0);
        let mut sampler = RngSampler(RNG::new(1));
        let mut stats = TrackingStats::new();
        for _ in 0..100 {
            let tr = delta_tracking_transmittance(medium.as_ref(), &ray, 0, &mut sampler, &mut stats);
            assert!(tr == 0.0 || tr == 1.0);
        }
        assert_eq!(stats.null_collisions, 0);
        assert_eq!(stats.real_collisions + stats.escapes, 100);
        assert_eq!(stats.steps.count(), 100);
    }

    #[test]
    fn ratio_tracking_of_homogeneous_medium_is_binary() {
        // σn = 0 so the first collision zeroes the estimate.
        let medium = homogeneous(0.5);
        let ray = Ray::new(Point3f::ZERO, Vector3f::Z, 1.0, 0.0);
        let mut sampler = RngSampler(RNG::new(2));
        let mut stats = TrackingStats::new();
        for _ in 0..50 {
            let tr = ratio_tracking_transmittance(medium.as_ref(), &ray, 1, &mut sampler, &mut stats);
            assert!(tr == 0.0 || tr == 1.0);
        }
    }

    #[test]
    fn scattering_offsets_to_the_original_ray() {
        let medium = homogeneous(1.0);
        let ray = Ray::unbounded(Point3f::new(0.0, 0.0, -3.0), Vector3f::Z);
        let mut sampler = RngSampler(RNG::new(3));
        let mut stats = TrackingStats::new();
        match sample_scattering(&medium, &ray, 0, &mut sampler, &mut stats) {
            ScatteringEvent::Scattered { mi, weight } => {
                assert!(mi.t > 0.0);
                assert!((mi.p.z - (mi.t - 3.0)).abs() < 1e-4);
                assert!(mi.medium.is_some());
                assert_eq!(weight, Spectrum::ONE);
            }
            _ => panic!("an unbounded ray in a scattering medium must scatter"),
        }
        assert_eq!(stats.real_collisions, 1);
    }

    #[test]
    fn purely_absorbing_medium_absorbs() {
        let medium = homogeneous(0.0);
        let ray = Ray::unbounded(Point3f::ZERO, Vector3f::X);
        let mut sampler = RngSampler(RNG::new(4));
        let mut stats = TrackingStats::new();
        assert!(matches!(
            sample_scattering(&medium, &ray, 0, &mut sampler, &mut stats),
            ScatteringEvent::Absorbed
        ));
    }
}
