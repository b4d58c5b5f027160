// Copyright @yucwang 2021

pub mod albedo;
pub mod lobe;
