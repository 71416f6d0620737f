//! Blended Phase Function

use super::*;
use crate::paramset::*;

/// Linear mixture of two phase functions, `(1 - weight)·phase1 + weight·phase2`.
#[derive(Clone)]
pub struct BlendPhaseFunction {
    weight: Float,
    phases: [ArcPhaseFunction; 2],
}

impl BlendPhaseFunction {
    /// Returns a new `BlendPhaseFunction`.
    ///
    /// * `weight` - Weight of `phase2` in [0, 1].
    /// * `phase1` - First component.
    /// * `phase2` - Second component.
    pub fn new(weight: Float, phase1: ArcPhaseFunction, phase2: ArcPhaseFunction) -> Result<Self> {
        if !(0.0..=1.0).contains(&weight) {
            return Err(Error::InvalidParameter {
                name: String::from("weight"),
                reason: format!("must lie in [0, 1], got {}", weight),
            });
        }
        Ok(Self {
            weight,
            phases: [phase1, phase2],
        })
    }

    /// Create from parameters: `weight` (default 0.5) and the nested
    /// `phase1.*` and `phase2.*` sets.
    ///
    /// * `params` - Parameter set.
    pub fn from_params(params: &ParamSet) -> Result<Self> {
        Self::from_params_with(params, &no_volume_loader)
    }

    /// Same as `from_params()`, building volume parameters of the nested
    /// phase functions with `volumes`.
    ///
    /// * `params`  - Parameter set.
    /// * `volumes` - Builds the volume parameter of a given name.
    pub fn from_params_with(params: &ParamSet, volumes: &VolumeLoader) -> Result<Self> {
        let phase1 = PhaseFunction::from_params_with(&params.prefixed("phase1."), volumes)?;
        let phase2 = PhaseFunction::from_params_with(&params.prefixed("phase2."), volumes)?;
        Self::new(params.find_one_float("weight", 0.5), Arc::new(phase1), Arc::new(phase2))
    }

    /// Weight of the second component.
    pub fn weight(&self) -> Float {
        self.weight
    }

    /// The two components.
    pub fn phases(&self) -> &[ArcPhaseFunction; 2] {
        &self.phases
    }

    /// Maps a component index of the blend to `(phase, component within it)`.
    fn route(&self, component: usize) -> (usize, usize) {
        let n1 = self.phases[0].component_count();
        if component < n1 {
            (0, component)
        } else {
            (1, component - n1)
        }
    }

    fn phase_weight(&self, phase: usize) -> Float {
        if phase == 0 {
            1.0 - self.weight
        } else {
            self.weight
        }
    }

    /// Returns `(value, pdf)` of the mixture, or of the weighted component
    /// selected by `ctx`. A selected component reports its own pdf.
    ///
    /// * `ctx` - Query context.
    /// * `mi`  - The medium interaction.
    /// * `wo`  - Scattered direction.
    pub fn eval_pdf(&self, ctx: &PhaseFunctionContext, mi: &MediumInteraction, wo: &Vector3f) -> (Float, Float) {
        if let Some(component) = ctx.component {
            let (phase, sub) = self.route(component);
            let sub_ctx = PhaseFunctionContext {
                component: Some(sub),
                ..*ctx
            };
            let (value, pdf) = self.phases[phase].eval_pdf(&sub_ctx, mi, wo, true);
            return (value * self.phase_weight(phase), pdf);
        }

        let (v0, p0) = self.phases[0].eval_pdf(ctx, mi, wo, self.weight < 1.0);
        let (v1, p1) = self.phases[1].eval_pdf(ctx, mi, wo, self.weight > 0.0);
        let w = self.weight;
        ((1.0 - w) * v0 + w * v1, (1.0 - w) * p0 + w * p1)
    }

    /// Picks a component with `sample1`, rescales it for reuse, and samples
    /// that component. The returned pdf is the mixture pdf.
    ///
    /// * `ctx`     - Query context.
    /// * `mi`      - The medium interaction.
    /// * `sample1` - Uniform sample in [0, 1).
    /// * `sample2` - Sample value in [0, 1)^2.
    pub fn sample(
        &self,
        ctx: &PhaseFunctionContext,
        mi: &MediumInteraction,
        sample1: Float,
        sample2: &Point2f,
    ) -> (Vector3f, Float, Float) {
        if let Some(component) = ctx.component {
            let (phase, sub) = self.route(component);
            let sub_ctx = PhaseFunctionContext {
                component: Some(sub),
                ..*ctx
            };
            let (wo, weight, pdf) = self.phases[phase].sample(&sub_ctx, mi, sample1, sample2, true);
            return (wo, weight * self.phase_weight(phase), pdf);
        }

        let w = self.weight;
        let (phase, sample1) = if sample1 >= w {
            (0, safe_div(sample1 - w, 1.0 - w))
        } else {
            (1, safe_div(sample1, w))
        };
        let (wo, _, sampled_pdf) = self.phases[phase].sample(ctx, mi, sample1, sample2, true);
        if sampled_pdf == 0.0 {
            return (wo, 0.0, 0.0);
        }

        let (value, pdf) = self.eval_pdf(ctx, mi, &wo);
        (wo, safe_div(value, pdf), pdf)
    }

    /// Union of the component flags.
    pub fn flags(&self) -> PhaseFunctionFlags {
        self.phases[0].flags() | self.phases[1].flags()
    }

    /// Total number of components.
    pub fn component_count(&self) -> usize {
        self.phases[0].component_count() + self.phases[1].component_count()
    }

    /// Largest of the component bounds.
    pub fn max_projected_area(&self) -> Float {
        max(self.phases[0].max_projected_area(), self.phases[1].max_projected_area())
    }

    /// Weighted component projected areas.
    ///
    /// * `mi` - The medium interaction.
    pub fn projected_area(&self, mi: &MediumInteraction) -> Float {
        lerp(self.weight, self.phases[0].projected_area(mi), self.phases[1].projected_area(mi))
    }
}
