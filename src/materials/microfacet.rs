// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFEvalResult, same_hemisphere};
use crate::math::constants::{Float, Vector2f, Vector3f, PI};
use crate::math::spectrum::RGBSpectrum;

/// Smallest GGX alpha evaluated with the general formula.
pub const MIN_ALPHA: Float = 1e-3;

fn clamp01(v: Float) -> Float {
    v.max(0.0).min(1.0)
}

pub fn ggx_d(cos_theta: Float, alpha: Float) -> Float {
    if cos_theta <= 0.0 {
        return 0.0;
    }
    let a = alpha.max(MIN_ALPHA);
    let a2 = a * a;
    let cos2 = cos_theta * cos_theta;
    let denom = cos2 * (a2 - 1.0) + 1.0;
    a2 / (PI * denom * denom)
}

pub fn ggx_g1(cos_theta: Float, alpha: Float) -> Float {
    if cos_theta <= 0.0 {
        return 0.0;
    }
    let a = alpha.max(MIN_ALPHA);
    let cos2 = cos_theta * cos_theta;
    let sin2 = (1.0 - cos2).max(0.0);
    if sin2 <= 0.0 {
        return 1.0;
    }
    let tan2 = sin2 / cos2.max(1e-6);
    let root = (1.0 + a * a * tan2).sqrt();
    2.0 / (1.0 + root)
}

pub fn ggx_g(cos_i: Float, cos_o: Float, alpha: Float) -> Float {
    ggx_g1(cos_i.abs(), alpha) * ggx_g1(cos_o.abs(), alpha)
}

/// Density of visible normal `m` as seen from `w`, both in the upper hemisphere.
pub fn pdf_ggx_vndf(w: &Vector3f, m: &Vector3f, alpha: Float) -> Float {
    if w.z <= 1e-6 || m.z <= 0.0 {
        return 0.0;
    }
    let d = ggx_d(m.z, alpha);
    let g1 = ggx_g1(w.z, alpha);
    d * g1 * w.dot(m).max(0.0) / w.z
}

// Heitz 2018, "Sampling the GGX Distribution of Visible Normals".
pub fn sample_ggx_vndf(w: &Vector3f, u: &Vector2f, alpha: Float) -> Vector3f {
    let a = alpha.max(MIN_ALPHA);
    let wh = Vector3f::new(a * w.x, a * w.y, w.z).normalize();

    let mut t1 = Vector3f::new(1.0, 0.0, 0.0);
    if wh.z < 0.9999 {
        t1 = Vector3f::new(0.0, 0.0, 1.0).cross(&wh).normalize();
    }
    let t2 = wh.cross(&t1);

    let u1 = clamp01(u.x);
    let u2 = clamp01(u.y);
    let r = u1.sqrt();
    let phi = 2.0 * PI * u2;
    let t1p = r * phi.cos();
    let mut t2p = r * phi.sin();
    let s = 0.5 * (1.0 + wh.z);
    t2p = (1.0 - s) * (1.0 - t1p * t1p).max(0.0).sqrt() + s * t2p;

    let nh = t1 * t1p + t2 * t2p + wh * (1.0 - t1p * t1p - t2p * t2p).max(0.0).sqrt();
    Vector3f::new(a * nh.x, a * nh.y, nh.z.max(0.0)).normalize()
}

pub fn reflect(w: &Vector3f, m: &Vector3f) -> Vector3f {
    2.0 * w.dot(m) * m - w
}

/// Mirror direction about the local normal.
pub fn reflect_normal(w: &Vector3f) -> Vector3f {
    Vector3f::new(-w.x, -w.y, w.z)
}

pub fn fresnel_dielectric(cos_i: Float, eta_i: Float, eta_t: Float) -> Float {
    let mut cos_i = cos_i.max(-1.0).min(1.0);
    let entering = cos_i > 0.0;
    let (eta_i, eta_t) = if entering { (eta_i, eta_t) } else { (eta_t, eta_i) };
    cos_i = cos_i.abs();

    let sin2_i = (1.0 - cos_i * cos_i).max(0.0);
    let eta = eta_i / eta_t;
    let sin2_t = eta * eta * sin2_i;
    if sin2_t >= 1.0 {
        return 1.0;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    let r_parl = (eta_t * cos_i - eta_i * cos_t) / (eta_t * cos_i + eta_i * cos_t);
    let r_perp = (eta_i * cos_i - eta_t * cos_t) / (eta_i * cos_i + eta_t * cos_t);
    0.5 * (r_parl * r_parl + r_perp * r_perp)
}

pub fn fresnel_schlick(f0: RGBSpectrum, cos_theta: Float) -> RGBSpectrum {
    let cos_theta = clamp01(cos_theta);
    let one_minus = (1.0 - cos_theta).powi(5);
    f0 + (RGBSpectrum::uniform(1.0) - f0) * one_minus
}

/// Torrance-Sparrow reflection for directions in the upper hemisphere, with
/// the pdf of sampling `wi` through `sample_reflection`. `fresnel` receives
/// the cosine between `wo` and the half vector.
pub fn eval_reflection<F>(wo: &Vector3f, wi: &Vector3f, alpha: Float, fresnel: F) -> BSDFEvalResult
where
    F: Fn(Float) -> RGBSpectrum,
{
    let eval_result = BSDFEvalResult::default();
    if !same_hemisphere(wo, wi) || wo.z <= 0.0 {
        return eval_result;
    }

    let cos_o = wo.z;
    let cos_i = wi.z;
    if cos_i <= 1e-6 || cos_o <= 1e-6 {
        return eval_result;
    }

    let m = wi + wo;
    if m.norm_squared() <= 0.0 {
        return eval_result;
    }
    let m = m.normalize();
    let cos_o_m = wo.dot(&m);
    let cos_i_m = wi.dot(&m);
    if m.z <= 0.0 || cos_o_m <= 0.0 || cos_i_m <= 0.0 {
        return eval_result;
    }

    let d = ggx_d(m.z, alpha);
    let g = ggx_g(cos_i, cos_o, alpha);
    let value = fresnel(cos_o_m) * (d * g / (4.0 * cos_i * cos_o));
    let pdf = pdf_ggx_vndf(wo, &m, alpha) / (4.0 * cos_i_m);

    BSDFEvalResult::new(value, pdf)
}

/// Draws `wi` by reflecting `wo` about a visible microfacet normal. The result
/// may point below the surface; evaluating it then gives zero.
pub fn sample_reflection(wo: &Vector3f, u: &Vector2f, alpha: Float) -> Vector3f {
    if wo.z <= 0.0 {
        return Vector3f::zeros();
    }
    let m = sample_ggx_vndf(wo, u, alpha);
    reflect(wo, &m)
}
