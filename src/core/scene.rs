// Copyright @yucwang 2026

use crate::core::material_data::{MaterialDataStore, MaterialOffset};
use crate::materials::{BSDFDispatcher, MaterialRecord};
use crate::volumes::voxel_grid::VoxelGrid;

/// Materials plus the voxel content that references them.
pub struct Scene {
    materials: MaterialDataStore,
    material_ids: Vec<(String, MaterialOffset)>,
    volume: VoxelGrid,
}

impl Scene {
    pub fn new(volume: VoxelGrid) -> Self {
        Self {
            materials: MaterialDataStore::new(),
            material_ids: Vec::new(),
            volume,
        }
    }

    pub fn add_material(&mut self, id: &str, record: &MaterialRecord) -> MaterialOffset {
        let offset = self.materials.push(record);
        self.material_ids.push((id.to_string(), offset));
        offset
    }

    pub fn material_offset(&self, id: &str) -> Option<MaterialOffset> {
        self.material_ids.iter()
            .find(|(name, _)| name == id)
            .map(|(_, offset)| *offset)
    }

    /// Material ids with their record offsets, in declaration order.
    pub fn material_ids(&self) -> &[(String, MaterialOffset)] {
        &self.material_ids
    }

    pub fn materials(&self) -> &MaterialDataStore {
        &self.materials
    }

    pub fn dispatcher(&self) -> BSDFDispatcher<'_, MaterialDataStore> {
        BSDFDispatcher::new(&self.materials)
    }

    pub fn volume(&self) -> &VoxelGrid {
        &self.volume
    }

    pub fn volume_mut(&mut self) -> &mut VoxelGrid {
        &mut self.volume
    }
}
