// Copyright @yucwang 2026

use crate::materials::{MaterialRecord, MaterialType};
use crate::math::constants::Float;
use crate::math::spectrum::RGBSpectrum;

/// Index of a field inside a material data buffer.
pub type MaterialOffset = usize;

/// Read access to the flat material buffer. This is the only thing the
/// kernels need from the backing storage.
pub trait MaterialData {
    fn fetch(&self, offset: MaterialOffset) -> Float;

    fn fetch_rgb(&self, offset: MaterialOffset) -> RGBSpectrum {
        RGBSpectrum::new(self.fetch(offset), self.fetch(offset + 1), self.fetch(offset + 2))
    }
}

impl MaterialData for [Float] {
    fn fetch(&self, offset: MaterialOffset) -> Float {
        self[offset]
    }
}

/// Append-only storage of material records. Each record is its type tag
/// followed by the parameter block of that type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialDataStore {
    data: Vec<Float>,
}

impl MaterialData for MaterialDataStore {
    fn fetch(&self, offset: MaterialOffset) -> Float {
        self.data[offset]
    }
}

impl MaterialDataStore {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Appends a record and returns the offset of its tag field.
    pub fn push(&mut self, record: &MaterialRecord) -> MaterialOffset {
        let offset = self.data.len();
        self.data.push(record.material_type().tag());
        record.write_parameters(&mut self.data);
        debug_assert_eq!(self.data.len() - offset, 1 + record.material_type().parameter_count());
        log::debug!("Material {:?} stored at offset {}.", record.material_type(), offset);
        offset
    }

    /// Appends raw fields without any validation.
    pub fn push_raw(&mut self, fields: &[Float]) -> MaterialOffset {
        let offset = self.data.len();
        self.data.extend_from_slice(fields);
        offset
    }

    /// Decodes the record whose tag sits at `offset`.
    pub fn record(&self, offset: MaterialOffset) -> Option<MaterialRecord> {
        if offset >= self.data.len() {
            return None;
        }
        let material_type = MaterialType::from_tag(self.fetch(offset))?;
        if offset + 1 + material_type.parameter_count() > self.data.len() {
            return None;
        }
        Some(MaterialRecord::read(material_type, self, offset + 1))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[Float] {
        &self.data
    }
}
