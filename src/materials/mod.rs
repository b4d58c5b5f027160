// Copyright @yucwang 2026

pub mod matte;
pub mod metal;
pub mod microfacet;
pub mod plastic;

use crate::core::bsdf::{BSDFEvalResult, BSDFSample};
use crate::core::material_data::{MaterialData, MaterialOffset};
use crate::core::rng::RngCursor;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;

use self::matte::MatteParams;
use self::metal::MetalParams;
use self::plastic::PlasticParams;

/// Type tags stored in the first field of every material record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MaterialType {
    Matte = 0,
    Metal = 1,
    Plastic = 2,
}

impl MaterialType {
    pub fn tag(self) -> Float {
        self as i32 as Float
    }

    /// Tags are truncated towards zero before matching, like an `int()` cast.
    pub fn from_tag(tag: Float) -> Option<Self> {
        if !tag.is_finite() {
            return None;
        }
        match tag as i32 {
            0 => Some(MaterialType::Matte),
            1 => Some(MaterialType::Metal),
            2 => Some(MaterialType::Plastic),
            _ => None,
        }
    }

    pub fn parameter_count(self) -> usize {
        match self {
            MaterialType::Matte => MatteParams::PARAMETER_COUNT,
            MaterialType::Metal => MetalParams::PARAMETER_COUNT,
            MaterialType::Plastic => PlasticParams::PARAMETER_COUNT,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MaterialType::Matte => "matte",
            MaterialType::Metal => "metal",
            MaterialType::Plastic => "plastic",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MaterialRecord {
    Matte(MatteParams),
    Metal(MetalParams),
    Plastic(PlasticParams),
}

impl MaterialRecord {
    pub fn material_type(&self) -> MaterialType {
        match self {
            MaterialRecord::Matte(_) => MaterialType::Matte,
            MaterialRecord::Metal(_) => MaterialType::Metal,
            MaterialRecord::Plastic(_) => MaterialType::Plastic,
        }
    }

    pub fn write_parameters(&self, out: &mut Vec<Float>) {
        match self {
            MaterialRecord::Matte(params) => params.write(out),
            MaterialRecord::Metal(params) => params.write(out),
            MaterialRecord::Plastic(params) => params.write(out),
        }
    }

    /// Reads the parameter block starting at `offset` (one past the tag).
    pub fn read<D: MaterialData + ?Sized>(material_type: MaterialType, data: &D, offset: MaterialOffset) -> Self {
        match material_type {
            MaterialType::Matte => MaterialRecord::Matte(MatteParams::load(data, offset)),
            MaterialType::Metal => MaterialRecord::Metal(MetalParams::load(data, offset)),
            MaterialType::Plastic => MaterialRecord::Plastic(PlasticParams::load(data, offset)),
        }
    }
}

/// Routes BSDF queries to the kernel named by the tag at a record's offset.
/// Unknown tags contribute nothing.
pub struct BSDFDispatcher<'a, D: MaterialData + ?Sized> {
    data: &'a D,
}

impl<'a, D: MaterialData + ?Sized> Clone for BSDFDispatcher<'a, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, D: MaterialData + ?Sized> Copy for BSDFDispatcher<'a, D> {}

impl<'a, D: MaterialData + ?Sized> BSDFDispatcher<'a, D> {
    pub fn new(data: &'a D) -> Self {
        Self { data }
    }

    pub fn material_type(&self, offset: MaterialOffset) -> Option<MaterialType> {
        MaterialType::from_tag(self.data.fetch(offset))
    }

    /// BSDF value and pdf for a pair of local-frame directions.
    pub fn evaluate(&self, offset: MaterialOffset, wo: Vector3f, wi: Vector3f) -> BSDFEvalResult {
        match self.material_type(offset) {
            Some(MaterialType::Matte) => matte::eval(self.data, offset + 1, wo, wi),
            Some(MaterialType::Metal) => metal::eval(self.data, offset + 1, wo, wi),
            Some(MaterialType::Plastic) => plastic::eval(self.data, offset + 1, wo, wi),
            None => BSDFEvalResult::default(),
        }
    }

    /// Draws an incoming direction for `wo` and returns it with the BSDF value
    /// and pdf evaluated for the pair.
    pub fn sample(&self, offset: MaterialOffset, wo: Vector3f, rng: &mut RngCursor) -> BSDFSample {
        match self.material_type(offset) {
            Some(MaterialType::Matte) => matte::sample(self.data, offset + 1, wo, rng),
            Some(MaterialType::Metal) => metal::sample(self.data, offset + 1, wo, rng),
            Some(MaterialType::Plastic) => plastic::sample(self.data, offset + 1, wo, rng),
            None => BSDFSample::default(),
        }
    }

    pub fn emission(&self, offset: MaterialOffset) -> RGBSpectrum {
        match self.material_type(offset) {
            Some(MaterialType::Matte) => matte::emission(self.data, offset + 1),
            Some(MaterialType::Metal) => metal::emission(self.data, offset + 1),
            Some(MaterialType::Plastic) => plastic::emission(self.data, offset + 1),
            None => RGBSpectrum::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::material_data::MaterialDataStore;
    use crate::math::warp::sample_cosine_hemisphere;

    fn assert_rel_close(a: Float, b: Float, rel: Float) {
        let scale = a.abs().max(b.abs()).max(1e-6);
        assert!((a - b).abs() / scale <= rel, "expected {} ≈ {}", a, b);
    }

    fn test_store() -> (MaterialDataStore, Vec<MaterialOffset>) {
        let mut store = MaterialDataStore::new();
        let offsets = vec![
            store.push(&MaterialRecord::Matte(MatteParams::new(RGBSpectrum::new(0.8, 0.5, 0.2)))),
            store.push(&MaterialRecord::Metal(MetalParams::new(RGBSpectrum::new(0.95, 0.64, 0.54), 0.25))),
            store.push(&MaterialRecord::Metal(MetalParams::new(RGBSpectrum::uniform(0.9), 0.0))),
            store.push(&MaterialRecord::Plastic(PlasticParams::new(RGBSpectrum::new(0.1, 0.6, 0.2), 0.2, 0.35, 1.5))),
        ];
        (store, offsets)
    }

    fn random_wo(rng: &mut RngCursor) -> Vector3f {
        let mut wo = sample_cosine_hemisphere(&rng.next_2d());
        wo.z = wo.z.max(1e-2);
        wo.normalize()
    }

    #[test]
    fn test_tags_round_trip() {
        for t in [MaterialType::Matte, MaterialType::Metal, MaterialType::Plastic].iter() {
            assert_eq!(MaterialType::from_tag(t.tag()), Some(*t));
        }
        assert_eq!(MaterialType::from_tag(2.7), Some(MaterialType::Plastic));
        assert_eq!(MaterialType::from_tag(3.0), None);
        assert_eq!(MaterialType::from_tag(-1.0), None);
        assert_eq!(MaterialType::from_tag(Float::NAN), None);
    }

    #[test]
    fn test_dispatch_forwards_past_tag() {
        let (store, offsets) = test_store();
        let dispatcher = BSDFDispatcher::new(&store);
        let wo = Vector3f::new(0.1, 0.2, 0.97).normalize();
        let wi = Vector3f::new(-0.3, 0.1, 0.95).normalize();

        let direct = MatteParams::new(RGBSpectrum::new(0.8, 0.5, 0.2)).eval(wo, wi);
        assert_eq!(dispatcher.evaluate(offsets[0], wo, wi), direct);
        assert_eq!(dispatcher.material_type(offsets[3]), Some(MaterialType::Plastic));
    }

    #[test]
    fn test_unknown_tag_is_zero() {
        let mut store = MaterialDataStore::new();
        let offset = store.push_raw(&[7.0, 0.5, 0.5, 0.5, 0.3, 0.2, 1.5]);
        let dispatcher = BSDFDispatcher::new(&store);
        let wo = Vector3f::new(0.0, 0.0, 1.0);

        assert!(dispatcher.evaluate(offset, wo, wo).is_zero());
        assert_eq!(dispatcher.evaluate(offset, wo, wo).to_array(), [0.0; 4]);

        let mut rng = RngCursor::new(1, 0);
        let sample = dispatcher.sample(offset, wo, &mut rng);
        assert_eq!(sample, BSDFSample::default());
        assert_eq!(sample.wi, Vector3f::zeros());
        assert!(dispatcher.emission(offset).is_black());
    }

    #[test]
    fn test_sample_matches_evaluate() {
        let (store, offsets) = test_store();
        let dispatcher = BSDFDispatcher::new(&store);
        for (i, offset) in offsets.iter().enumerate() {
            let mut rng = RngCursor::new(100 + i as u32, 0);
            for _ in 0..1000 {
                let wo = random_wo(&mut rng);
                let sample = dispatcher.sample(*offset, wo, &mut rng);
                let eval = dispatcher.evaluate(*offset, wo, sample.wi);
                for ch in 0..3 {
                    assert_rel_close(sample.value[ch], eval.value[ch], 1e-4);
                }
                assert_rel_close(sample.pdf, eval.pdf, 1e-4);
            }
        }
    }

    #[test]
    fn test_sampled_pdf_zero_iff_value_zero() {
        let (store, offsets) = test_store();
        let dispatcher = BSDFDispatcher::new(&store);
        for (i, offset) in offsets.iter().enumerate() {
            let mut rng = RngCursor::new(200 + i as u32, 0);
            for _ in 0..1000 {
                let wo = random_wo(&mut rng);
                let sample = dispatcher.sample(*offset, wo, &mut rng);
                assert!(sample.pdf >= 0.0);
                assert_eq!(sample.pdf == 0.0, sample.value.is_black());
            }
        }
    }

    #[test]
    fn test_black_materials_keep_sampling_density() {
        // A material that reflects nothing still draws valid directions: the
        // value is zero but the density is not.
        let mut store = MaterialDataStore::new();
        let offsets = [
            store.push(&MaterialRecord::Matte(MatteParams::new(RGBSpectrum::default()))),
            store.push(&MaterialRecord::Plastic(PlasticParams::new(RGBSpectrum::default(), 0.2, 0.0, 1.5))),
        ];
        let dispatcher = BSDFDispatcher::new(&store);
        for offset in offsets.iter() {
            let mut rng = RngCursor::new(300, 0);
            let mut valid = 0;
            for _ in 0..200 {
                let wo = random_wo(&mut rng);
                let sample = dispatcher.sample(*offset, wo, &mut rng);
                assert!(sample.value.is_black());
                if sample.pdf > 0.0 {
                    valid += 1;
                }
            }
            assert!(valid > 100);
        }
    }

    #[test]
    fn test_emission_dispatch() {
        let mut store = MaterialDataStore::new();
        let lamp = store.push(&MaterialRecord::Matte(
            MatteParams::new(RGBSpectrum::uniform(0.5)).with_emission(RGBSpectrum::new(10.0, 9.0, 8.0))));
        let metal = store.push(&MaterialRecord::Metal(MetalParams::new(RGBSpectrum::uniform(0.9), 0.1)));
        let dispatcher = BSDFDispatcher::new(&store);

        assert_eq!(dispatcher.emission(lamp), RGBSpectrum::new(10.0, 9.0, 8.0));
        assert!(dispatcher.emission(metal).is_black());
    }

    #[test]
    fn test_dispatch_over_borrowed_slice() {
        let (store, offsets) = test_store();
        let dispatcher = BSDFDispatcher::new(store.as_slice());
        let mut rng = RngCursor::new(0, 0);
        let sample = dispatcher.sample(offsets[2], Vector3f::new(0.0, 0.0, 1.0), &mut rng);
        assert_rel_close(sample.wi.z, 1.0, 1e-6);
        assert_eq!(sample.pdf, 1.0);
    }
}
