/* Copyright 2020 @Yuchen Wong */

use nalgebra::{ Vector2, Vector3 };

pub type Float = f32;
pub type Int = i32;
pub type UInt = u32;

pub type Vector2f = Vector2<Float>;
pub type Vector3f = Vector3<Float>;
pub type Vector3i = Vector3<Int>;

pub const EPSILON: Float = 1e-4;
pub const PI: Float = 3.14159265359;
pub const INV_PI: Float = 0.31830988618;
pub const INV_TWO_PI: Float = 0.15915494309;
