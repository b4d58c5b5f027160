// Copyright @yucwang 2023

use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;

// Definitions of types used in BSDF sampling and eval
// processes
pub type BSDFValue = RGBSpectrum;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BSDFEvalResult {
    pub value: BSDFValue,
    pub pdf: Float,
}

/// A sampled incoming direction with the BSDF value and pdf for it.
/// A zero pdf means no valid direction was produced.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BSDFSample {
    pub wi: Vector3f,
    pub value: BSDFValue,
    pub pdf: Float,
}

impl Default for BSDFEvalResult {
    fn default() -> Self {
        Self {
            value: RGBSpectrum::default(),
            pdf: 0.0,
        }
    }
}

impl BSDFEvalResult {
    pub fn new(value: BSDFValue, pdf: Float) -> Self {
        Self { value, pdf }
    }

    pub fn is_zero(&self) -> bool {
        self.pdf == 0.0 && self.value.is_black()
    }

    /// Packed `(f.r, f.g, f.b, pdf)`.
    pub fn to_array(&self) -> [Float; 4] {
        [self.value.r(), self.value.g(), self.value.b(), self.pdf]
    }
}

impl Default for BSDFSample {
    fn default() -> Self {
        Self {
            wi: Vector3f::zeros(),
            value: RGBSpectrum::default(),
            pdf: 0.0,
        }
    }
}

impl BSDFSample {
    pub fn new(wi: Vector3f, eval: BSDFEvalResult) -> Self {
        Self { wi, value: eval.value, pdf: eval.pdf }
    }

    pub fn eval(&self) -> BSDFEvalResult {
        BSDFEvalResult::new(self.value, self.pdf)
    }
}

pub fn same_hemisphere(a: &Vector3f, b: &Vector3f) -> bool {
    a.z * b.z > 0.0
}
