// Copyright @yucwang 2026

use crate::core::material_data::{MaterialData, MaterialOffset};
use crate::materials::BSDFDispatcher;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;

/// Direction seen through pixel (x, y) of a `size` x `size` orthographic view
/// of the upper hemisphere. Pixels outside the unit disk have none.
pub fn pixel_direction(x: usize, y: usize, size: usize) -> Option<Vector3f> {
    if size == 0 {
        return None;
    }
    let u = 2.0 * (x as Float + 0.5) / size as Float - 1.0;
    let v = 1.0 - 2.0 * (y as Float + 0.5) / size as Float;
    let r2 = u * u + v * v;
    if r2 >= 1.0 {
        return None;
    }
    Some(Vector3f::new(u, v, (1.0 - r2).sqrt()))
}

/// Image of `f(wo, wi) * cos(theta_i)` over the hemisphere, row-major.
pub fn render_lobe<D: MaterialData + ?Sized>(dispatcher: &BSDFDispatcher<'_, D>,
                                             offset: MaterialOffset,
                                             wo: Vector3f,
                                             size: usize) -> Vec<RGBSpectrum> {
    let mut image = vec![RGBSpectrum::default(); size * size];
    for y in 0..size {
        for x in 0..size {
            if let Some(wi) = pixel_direction(x, y, size) {
                image[y * size + x] = dispatcher.evaluate(offset, wo, wi).value * wi.z;
            }
        }
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::material_data::MaterialDataStore;
    use crate::integrators::albedo::incident_direction;
    use crate::materials::MaterialRecord;
    use crate::materials::matte::MatteParams;
    use crate::materials::metal::MetalParams;
    use crate::math::constants::INV_PI;

    #[test]
    fn test_pixel_directions() {
        assert!(pixel_direction(0, 0, 8).is_none());
        assert!(pixel_direction(0, 0, 0).is_none());
        let center = pixel_direction(4, 4, 9).unwrap();
        assert!((center.z - 1.0).abs() < 1e-6);
        let side = pixel_direction(6, 2, 8).unwrap();
        assert!((side.norm() - 1.0).abs() < 1e-5);
        assert!(side.x > 0.0 && side.y > 0.0);
    }

    #[test]
    fn test_matte_lobe_is_cosine() {
        let mut store = MaterialDataStore::new();
        let offset = store.push(&MaterialRecord::Matte(MatteParams::new(RGBSpectrum::uniform(0.6))));
        let dispatcher = BSDFDispatcher::new(&store);
        let size = 16;
        let image = render_lobe(&dispatcher, offset, incident_direction(30.0), size);

        assert_eq!(image.len(), size * size);
        assert!(image[0].is_black());
        for y in 0..size {
            for x in 0..size {
                if let Some(wi) = pixel_direction(x, y, size) {
                    let expected = 0.6 * INV_PI * wi.z;
                    assert!((image[y * size + x].r() - expected).abs() < 1e-5);
                }
            }
        }
    }

    #[test]
    fn test_rough_metal_peaks_near_mirror() {
        let mut store = MaterialDataStore::new();
        let offset = store.push(&MaterialRecord::Metal(MetalParams::new(RGBSpectrum::uniform(0.9), 0.2)));
        let dispatcher = BSDFDispatcher::new(&store);
        let size = 33;
        let wo = incident_direction(40.0);
        let image = render_lobe(&dispatcher, offset, wo, size);

        let (brightest, _) = image.iter().enumerate()
            .fold((0, 0.0), |(bi, bv), (i, p)| if p.r() > bv { (i, p.r()) } else { (bi, bv) });
        let wi = pixel_direction(brightest % size, brightest / size, size).unwrap();
        let mirror = Vector3f::new(-wo.x, -wo.y, wo.z);
        assert!(wi.dot(&mirror) > 0.9, "peak at {:?}", wi);
    }
}
