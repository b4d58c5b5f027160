// Copyright @yucwang 2021

pub mod bsdf;
pub mod material_data;
pub mod rng;
pub mod scene;
pub mod scene_loader;
