// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFEvalResult, BSDFSample, same_hemisphere};
use crate::core::material_data::{MaterialData, MaterialOffset};
use crate::core::rng::RngCursor;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::materials::microfacet::{eval_reflection, fresnel_schlick, reflect_normal, sample_reflection};

const REFLECTANCE: MaterialOffset = 0;
const ROUGHNESS: MaterialOffset = 3;

/// Below this roughness the lobe is treated as a perfect mirror.
pub const DELTA_ROUGHNESS: Float = 1e-3;
const DELTA_TOLERANCE: Float = 1e-4;

/// GGX conductor with Schlick Fresnel; the reflectance is the normal-incidence tint.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MetalParams {
    pub reflectance: RGBSpectrum,
    pub roughness: Float,
}

impl MetalParams {
    pub const PARAMETER_COUNT: usize = 4;

    pub fn new(reflectance: RGBSpectrum, roughness: Float) -> Self {
        Self { reflectance, roughness }
    }

    pub fn load<D: MaterialData + ?Sized>(data: &D, offset: MaterialOffset) -> Self {
        Self {
            reflectance: data.fetch_rgb(offset + REFLECTANCE),
            roughness: data.fetch(offset + ROUGHNESS),
        }
    }

    pub fn write(&self, out: &mut Vec<Float>) {
        out.extend_from_slice(&[self.reflectance.r(), self.reflectance.g(), self.reflectance.b(),
                                self.roughness]);
    }

    pub fn is_delta(&self) -> bool {
        self.roughness < DELTA_ROUGHNESS
    }

    pub fn eval(&self, wo: Vector3f, wi: Vector3f) -> BSDFEvalResult {
        if !same_hemisphere(&wo, &wi) {
            return BSDFEvalResult::default();
        }
        // Work in the hemisphere of wo; the lobe is isotropic so this is a pure flip.
        let (wo, wi) = if wo.z < 0.0 { (-wo, -wi) } else { (wo, wi) };

        if self.is_delta() {
            return self.eval_mirror(wo, wi);
        }

        let reflectance = self.reflectance;
        eval_reflection(&wo, &wi, self.roughness, |cos_theta| fresnel_schlick(reflectance, cos_theta))
    }

    // Discrete pdf of one: the mirror direction is the only one ever drawn.
    fn eval_mirror(&self, wo: Vector3f, wi: Vector3f) -> BSDFEvalResult {
        if (wi - reflect_normal(&wo)).norm() > DELTA_TOLERANCE || wi.z <= 1e-6 {
            return BSDFEvalResult::default();
        }
        let value = fresnel_schlick(self.reflectance, wo.z) / wi.z;
        BSDFEvalResult::new(value, 1.0)
    }

    pub fn sample(&self, wo: Vector3f, rng: &mut RngCursor) -> BSDFSample {
        if self.is_delta() {
            let wi = reflect_normal(&wo);
            return BSDFSample::new(wi, self.eval(wo, wi));
        }

        let u = rng.next_2d();
        let flip = if wo.z < 0.0 { -1.0 } else { 1.0 };
        let wi = sample_reflection(&(wo * flip), &u, self.roughness) * flip;
        BSDFSample::new(wi, self.eval(wo, wi))
    }

    pub fn emission(&self) -> RGBSpectrum {
        RGBSpectrum::default()
    }
}

pub fn eval<D: MaterialData + ?Sized>(data: &D, offset: MaterialOffset, wo: Vector3f, wi: Vector3f) -> BSDFEvalResult {
    MetalParams::load(data, offset).eval(wo, wi)
}

pub fn sample<D: MaterialData + ?Sized>(data: &D, offset: MaterialOffset, wo: Vector3f, rng: &mut RngCursor) -> BSDFSample {
    MetalParams::load(data, offset).sample(wo, rng)
}

pub fn emission<D: MaterialData + ?Sized>(data: &D, offset: MaterialOffset) -> RGBSpectrum {
    MetalParams::load(data, offset).emission()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!((a - b).abs() <= tol, "expected {} ≈ {}", a, b);
    }

    #[test]
    fn test_mirror_straight_on_ignores_cursor() {
        let metal = MetalParams::new(RGBSpectrum::new(0.95, 0.64, 0.54), 0.0);
        for stream in 0..8 {
            let mut rng = RngCursor::new(stream, stream * 13);
            let before = rng;
            let sample = metal.sample(Vector3f::new(0.0, 0.0, 1.0), &mut rng);
            assert_close((sample.wi - Vector3f::new(0.0, 0.0, 1.0)).norm(), 0.0, 1e-6);
            assert_eq!(sample.pdf, 1.0);
            assert_close(sample.value[0], 0.95, 1e-5);
            assert_eq!(rng, before);
        }
    }

    #[test]
    fn test_mirror_eval_only_at_reflection() {
        let metal = MetalParams::new(RGBSpectrum::uniform(0.9), 0.0);
        let wo = Vector3f::new(0.3, -0.4, 0.866).normalize();

        let hit = metal.eval(wo, reflect_normal(&wo));
        assert_eq!(hit.pdf, 1.0);
        assert!(!hit.value.is_black());

        let miss = metal.eval(wo, Vector3f::new(0.0, 0.0, 1.0));
        assert!(miss.is_zero());
    }

    #[test]
    fn test_rough_eval_below_surface_is_zero() {
        let metal = MetalParams::new(RGBSpectrum::uniform(0.9), 0.3);
        let result = metal.eval(Vector3f::new(0.0, 0.0, 1.0), Vector3f::new(0.6, 0.0, -0.8));
        assert!(result.is_zero());
    }

    #[test]
    fn test_rough_sample_consumes_two_draws() {
        let metal = MetalParams::new(RGBSpectrum::uniform(0.9), 0.3);
        let mut rng = RngCursor::new(5, 0);
        let sample = metal.sample(Vector3f::new(0.2, 0.1, 0.97).normalize(), &mut rng);
        assert_eq!(rng.counter(), 2);
        assert!(sample.pdf > 0.0);
    }

    #[test]
    fn test_backside_is_mirrored() {
        let metal = MetalParams::new(RGBSpectrum::uniform(0.9), 0.25);
        let wo = Vector3f::new(0.3, 0.2, 0.93).normalize();
        let wi = Vector3f::new(-0.4, 0.1, 0.91).normalize();
        let front = metal.eval(wo, wi);
        let back = metal.eval(-wo, -wi);
        assert_close(front.pdf, back.pdf, 1e-6);
        assert_close(front.value[1], back.value[1], 1e-6);
    }

    #[test]
    fn test_load_from_buffer() {
        let params = MetalParams::new(RGBSpectrum::new(1.0, 0.78, 0.34), 0.2);
        let mut data = vec![9.0];
        params.write(&mut data);
        assert_eq!(data.len(), 1 + MetalParams::PARAMETER_COUNT);
        assert_eq!(MetalParams::load(data.as_slice(), 1), params);
        assert!(emission(data.as_slice(), 1).is_black());
    }
}
