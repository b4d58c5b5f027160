// Copyright @yucwang 2023

use crate::core::bsdf::{BSDFEvalResult, BSDFSample, same_hemisphere};
use crate::core::material_data::{MaterialData, MaterialOffset};
use crate::core::rng::RngCursor;
use crate::math::constants::{ Float, Vector3f, INV_PI };
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ sample_cosine_hemisphere, sample_cosine_hemisphere_pdf };

const REFLECTANCE: MaterialOffset = 0;
const EMISSION: MaterialOffset = 3;

/// Lambertian diffuse reflection, optionally emissive.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MatteParams {
    pub reflectance: RGBSpectrum,
    pub emission: RGBSpectrum,
}

impl MatteParams {
    pub const PARAMETER_COUNT: usize = 6;

    pub fn new(reflectance: RGBSpectrum) -> Self {
        Self { reflectance, emission: RGBSpectrum::default() }
    }

    pub fn with_emission(mut self, emission: RGBSpectrum) -> Self {
        self.emission = emission;
        self
    }

    pub fn load<D: MaterialData + ?Sized>(data: &D, offset: MaterialOffset) -> Self {
        Self {
            reflectance: data.fetch_rgb(offset + REFLECTANCE),
            emission: data.fetch_rgb(offset + EMISSION),
        }
    }

    pub fn write(&self, out: &mut Vec<Float>) {
        out.extend_from_slice(&[self.reflectance.r(), self.reflectance.g(), self.reflectance.b(),
                                self.emission.r(), self.emission.g(), self.emission.b()]);
    }

    pub fn eval(&self, wo: Vector3f, wi: Vector3f) -> BSDFEvalResult {
        if !same_hemisphere(&wo, &wi) {
            return BSDFEvalResult::default();
        }

        BSDFEvalResult::new(self.reflectance * INV_PI,
                            sample_cosine_hemisphere_pdf(wi.z.abs()))
    }

    pub fn sample(&self, wo: Vector3f, rng: &mut RngCursor) -> BSDFSample {
        let mut wi = sample_cosine_hemisphere(&rng.next_2d());
        if wo.z < 0.0 {
            wi.z *= -1.0;
        }

        BSDFSample::new(wi, self.eval(wo, wi))
    }

    pub fn emission(&self) -> RGBSpectrum {
        self.emission
    }
}

pub fn eval<D: MaterialData + ?Sized>(data: &D, offset: MaterialOffset, wo: Vector3f, wi: Vector3f) -> BSDFEvalResult {
    MatteParams::load(data, offset).eval(wo, wi)
}

pub fn sample<D: MaterialData + ?Sized>(data: &D, offset: MaterialOffset, wo: Vector3f, rng: &mut RngCursor) -> BSDFSample {
    MatteParams::load(data, offset).sample(wo, rng)
}

pub fn emission<D: MaterialData + ?Sized>(data: &D, offset: MaterialOffset) -> RGBSpectrum {
    MatteParams::load(data, offset).emission()
}
