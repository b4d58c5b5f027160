// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFEvalResult, BSDFSample, same_hemisphere};
use crate::core::material_data::{MaterialData, MaterialOffset};
use crate::core::rng::RngCursor;
use crate::math::constants::{Float, Vector3f, INV_PI};
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{sample_cosine_hemisphere, sample_cosine_hemisphere_pdf};
use crate::materials::microfacet::{eval_reflection, fresnel_dielectric, sample_reflection, MIN_ALPHA};

const REFLECTANCE: MaterialOffset = 0;
const ROUGHNESS: MaterialOffset = 3;
const COATING: MaterialOffset = 4;
const IOR: MaterialOffset = 5;

/// Diffuse substrate under a rough dielectric coating. Both lobes are blended
/// by the coating weight, for values and densities alike.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlasticParams {
    pub reflectance: RGBSpectrum,
    pub roughness: Float,
    pub coating: Float,
    pub ior: Float,
}

impl PlasticParams {
    pub const PARAMETER_COUNT: usize = 6;

    pub fn new(reflectance: RGBSpectrum, roughness: Float, coating: Float, ior: Float) -> Self {
        Self { reflectance, roughness, coating, ior }
    }

    pub fn load<D: MaterialData + ?Sized>(data: &D, offset: MaterialOffset) -> Self {
        Self {
            reflectance: data.fetch_rgb(offset + REFLECTANCE),
            roughness: data.fetch(offset + ROUGHNESS),
            coating: data.fetch(offset + COATING),
            ior: data.fetch(offset + IOR),
        }
    }

    pub fn write(&self, out: &mut Vec<Float>) {
        out.extend_from_slice(&[self.reflectance.r(), self.reflectance.g(), self.reflectance.b(),
                                self.roughness, self.coating, self.ior]);
    }

    fn alpha(&self) -> Float {
        self.roughness.max(MIN_ALPHA)
    }

    fn coating_weight(&self) -> Float {
        self.coating.max(0.0).min(1.0)
    }

    pub fn eval_diffuse(&self, wo: Vector3f, wi: Vector3f) -> BSDFEvalResult {
        if !same_hemisphere(&wo, &wi) {
            return BSDFEvalResult::default();
        }
        BSDFEvalResult::new(self.reflectance * INV_PI, sample_cosine_hemisphere_pdf(wi.z.abs()))
    }

    pub fn eval_coating(&self, wo: Vector3f, wi: Vector3f) -> BSDFEvalResult {
        if !same_hemisphere(&wo, &wi) {
            return BSDFEvalResult::default();
        }
        let (wo, wi) = if wo.z < 0.0 { (-wo, -wi) } else { (wo, wi) };
        let ior = self.ior;
        eval_reflection(&wo, &wi, self.alpha(),
                        |cos_theta| RGBSpectrum::uniform(fresnel_dielectric(cos_theta, 1.0, ior)))
    }

    pub fn eval(&self, wo: Vector3f, wi: Vector3f) -> BSDFEvalResult {
        let c = self.coating_weight();
        let diffuse = self.eval_diffuse(wo, wi);
        let coating = self.eval_coating(wo, wi);

        BSDFEvalResult::new(coating.value * c + diffuse.value * (1.0 - c),
                            coating.pdf * c + diffuse.pdf * (1.0 - c))
    }

    /// One draw picks the lobe, two more drive it. The returned density is the
    /// mixture density at the drawn direction, not the density of the chosen lobe.
    pub fn sample(&self, wo: Vector3f, rng: &mut RngCursor) -> BSDFSample {
        let choose_coating = rng.next_float() < self.coating_weight();
        let u = rng.next_2d();
        let flip = if wo.z < 0.0 { -1.0 } else { 1.0 };

        let wi = if choose_coating {
            sample_reflection(&(wo * flip), &u, self.alpha()) * flip
        } else {
            let mut wi = sample_cosine_hemisphere(&u);
            wi.z *= flip;
            wi
        };

        BSDFSample::new(wi, self.eval(wo, wi))
    }

    pub fn emission(&self) -> RGBSpectrum {
        RGBSpectrum::default()
    }
}

pub fn eval<D: MaterialData + ?Sized>(data: &D, offset: MaterialOffset, wo: Vector3f, wi: Vector3f) -> BSDFEvalResult {
    PlasticParams::load(data, offset).eval(wo, wi)
}

pub fn sample<D: MaterialData + ?Sized>(data: &D, offset: MaterialOffset, wo: Vector3f, rng: &mut RngCursor) -> BSDFSample {
    PlasticParams::load(data, offset).sample(wo, rng)
}

pub fn emission<D: MaterialData + ?Sized>(data: &D, offset: MaterialOffset) -> RGBSpectrum {
    PlasticParams::load(data, offset).emission()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rel_close(a: f32, b: f32, rel: f32) {
        let scale = a.abs().max(b.abs()).max(1e-6);
        assert!((a - b).abs() / scale <= rel, "expected {} ≈ {}", a, b);
    }

    #[test]
    fn test_sampled_pdf_is_mixture_density() {
        let plastic = PlasticParams::new(RGBSpectrum::new(0.7, 0.1, 0.1), 0.15, 0.3, 1.5);
        let c = 0.3;
        let mut rng = RngCursor::new(21, 0);
        let mut coating_dominated = 0;
        for i in 0..500 {
            let wo = Vector3f::new(0.4 * ((i % 7) as Float / 7.0), -0.2, 0.9).normalize();
            let sample = plastic.sample(wo, &mut rng);
            if sample.pdf == 0.0 {
                continue;
            }
            let diffuse_pdf = plastic.eval_diffuse(wo, sample.wi).pdf;
            let coating_pdf = plastic.eval_coating(wo, sample.wi).pdf;
            assert_rel_close(sample.pdf, c * coating_pdf + (1.0 - c) * diffuse_pdf, 1e-4);
            if coating_pdf > diffuse_pdf {
                coating_dominated += 1;
            }
        }
        assert!(coating_dominated > 0);
        assert_eq!(rng.counter(), 1500);
    }

    #[test]
    fn test_eval_is_weighted_sum() {
        let plastic = PlasticParams::new(RGBSpectrum::uniform(0.5), 0.3, 0.4, 1.5);
        let wo = Vector3f::new(0.3, 0.0, 0.954).normalize();
        let wi = Vector3f::new(-0.25, 0.05, 0.967).normalize();
        let full = plastic.eval(wo, wi);
        let diffuse = plastic.eval_diffuse(wo, wi);
        let coating = plastic.eval_coating(wo, wi);
        for ch in 0..3 {
            assert_rel_close(full.value[ch], 0.4 * coating.value[ch] + 0.6 * diffuse.value[ch], 1e-5);
        }
        assert_rel_close(diffuse.value[0], 0.5 * INV_PI, 1e-5);
    }

    #[test]
    fn test_coating_weight_is_clamped() {
        let fully_coated = PlasticParams::new(RGBSpectrum::uniform(0.5), 0.3, 2.0, 1.5);
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let wi = Vector3f::new(0.6, 0.0, 0.8);
        let coating = fully_coated.eval_coating(wo, wi);
        let full = fully_coated.eval(wo, wi);
        assert_rel_close(full.pdf, coating.pdf, 1e-6);
    }

    #[test]
    fn test_opposite_hemispheres_are_zero() {
        let plastic = PlasticParams::new(RGBSpectrum::uniform(0.5), 0.3, 0.5, 1.5);
        let result = plastic.eval(Vector3f::new(0.0, 0.0, 1.0), Vector3f::new(0.0, 0.6, -0.8));
        assert!(result.is_zero());
    }

    #[test]
    fn test_load_from_buffer() {
        let params = PlasticParams::new(RGBSpectrum::new(0.1, 0.2, 0.3), 0.05, 0.25, 1.45);
        let mut data = Vec::new();
        params.write(&mut data);
        assert_eq!(data.len(), PlasticParams::PARAMETER_COUNT);
        assert_eq!(PlasticParams::load(data.as_slice(), 0), params);
    }
}
