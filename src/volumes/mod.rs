// Copyright @yucwang 2026

pub mod voxel_grid;
