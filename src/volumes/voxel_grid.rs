// Copyright @yucwang 2026

use crate::core::material_data::MaterialOffset;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;

pub const OCCUPIED: u8 = 255;
pub const EMPTY: u8 = 0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_spectrum(color: &RGBSpectrum) -> Self {
        let quantize = |v: Float| (v.max(0.0).min(1.0) * 255.0).round() as u8;
        Self::new(quantize(color.r()), quantize(color.g()), quantize(color.b()))
    }

    pub fn to_spectrum(&self) -> RGBSpectrum {
        RGBSpectrum::new(self.r as Float, self.g as Float, self.b as Float) / 255.0
    }
}

/// Occupancy, colour and material assignment over a regular grid spanning `bbox`.
/// Voxels are stored x fastest, then y, then z.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    xres: usize,
    yres: usize,
    zres: usize,
    bbox: AABB,
    occupancy: Vec<u8>,
    colors: Vec<Rgb8>,
    materials: Vec<Option<MaterialOffset>>,
}

impl VoxelGrid {
    pub fn new(xres: usize, yres: usize, zres: usize, bbox: AABB) -> Self {
        let count = xres * yres * zres;
        Self {
            xres,
            yres,
            zres,
            bbox,
            occupancy: vec![EMPTY; count],
            colors: vec![Rgb8::default(); count],
            materials: vec![None; count],
        }
    }

    pub fn resolution(&self) -> (usize, usize, usize) {
        (self.xres, self.yres, self.zres)
    }

    pub fn bbox(&self) -> &AABB {
        &self.bbox
    }

    pub fn voxel_count(&self) -> usize {
        self.occupancy.len()
    }

    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.xres * (y + self.yres * z)
    }

    pub fn voxel_size(&self) -> Vector3f {
        let d = self.bbox.diagonal();
        Vector3f::new(d.x / self.xres.max(1) as Float,
                      d.y / self.yres.max(1) as Float,
                      d.z / self.zres.max(1) as Float)
    }

    pub fn voxel_center(&self, x: usize, y: usize, z: usize) -> Vector3f {
        let size = self.voxel_size();
        self.bbox.p_min + Vector3f::new((x as Float + 0.5) * size.x,
                                        (y as Float + 0.5) * size.y,
                                        (z as Float + 0.5) * size.z)
    }

    pub fn is_occupied(&self, x: usize, y: usize, z: usize) -> bool {
        self.occupancy[self.index(x, y, z)] != EMPTY
    }

    pub fn color(&self, x: usize, y: usize, z: usize) -> Rgb8 {
        self.colors[self.index(x, y, z)]
    }

    pub fn material(&self, x: usize, y: usize, z: usize) -> Option<MaterialOffset> {
        self.materials[self.index(x, y, z)]
    }

    pub fn occupancy(&self) -> &[u8] {
        &self.occupancy
    }

    pub fn colors(&self) -> &[Rgb8] {
        &self.colors
    }

    pub fn occupied_count(&self) -> usize {
        self.occupancy.iter().filter(|v| **v != EMPTY).count()
    }

    fn set(&mut self, idx: usize, color: Rgb8, material: Option<MaterialOffset>) {
        self.occupancy[idx] = OCCUPIED;
        self.colors[idx] = color;
        self.materials[idx] = material;
    }

    // Voxel indices along `axis` whose centres may fall inside [lo, hi].
    fn axis_range(&self, axis: usize, lo: Float, hi: Float) -> (usize, usize) {
        let res = [self.xres, self.yres, self.zres][axis];
        let size = self.voxel_size()[axis];
        if res == 0 || size <= 0.0 {
            return (0, 0);
        }
        let to_index = |p: Float| ((p - self.bbox.p_min[axis]) / size).floor();
        let begin = to_index(lo).max(0.0).min(res as Float) as usize;
        let end = (to_index(hi) + 1.0).max(0.0).min(res as Float) as usize;
        (begin, end)
    }

    /// Fills every voxel whose centre lies inside the sphere. Returns the
    /// number of voxels written.
    pub fn add_voxel_sphere(&mut self, center: &Vector3f, radius: Float,
                            color: Rgb8, material: Option<MaterialOffset>) -> usize {
        if radius <= 0.0 {
            return 0;
        }
        let (x0, x1) = self.axis_range(0, center.x - radius, center.x + radius);
        let (y0, y1) = self.axis_range(1, center.y - radius, center.y + radius);
        let (z0, z1) = self.axis_range(2, center.z - radius, center.z + radius);

        let radius2 = radius * radius;
        let mut written = 0;
        for z in z0..z1 {
            for y in y0..y1 {
                for x in x0..x1 {
                    if (self.voxel_center(x, y, z) - center).norm_squared() <= radius2 {
                        let idx = self.index(x, y, z);
                        self.set(idx, color, material);
                        written += 1;
                    }
                }
            }
        }
        log::debug!("Voxel sphere at {:?} r={} filled {} voxels.", center, radius, written);
        written
    }

    /// Fills the half-space behind the plane through `point`, i.e. every voxel
    /// whose centre is on the side opposite to `normal` or on the plane itself.
    pub fn add_plane(&mut self, normal: &Vector3f, point: &Vector3f,
                     color: Rgb8, material: Option<MaterialOffset>) -> usize {
        if normal.norm_squared() <= 0.0 {
            return 0;
        }
        let mut written = 0;
        for z in 0..self.zres {
            for y in 0..self.yres {
                for x in 0..self.xres {
                    if (self.voxel_center(x, y, z) - point).dot(normal) <= 0.0 {
                        let idx = self.index(x, y, z);
                        self.set(idx, color, material);
                        written += 1;
                    }
                }
            }
        }
        log::debug!("Voxel plane n={:?} through {:?} filled {} voxels.", normal, point, written);
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_grid(res: usize) -> VoxelGrid {
        VoxelGrid::new(res, res, res, AABB::new(Vector3f::new(-1.0, -1.0, -1.0), Vector3f::new(1.0, 1.0, 1.0)))
    }

    #[test]
    fn test_indexing_and_centers() {
        let grid = unit_grid(4);
        assert_eq!(grid.voxel_count(), 64);
        assert_eq!(grid.index(1, 2, 3), 1 + 4 * (2 + 4 * 3));
        assert_eq!(grid.voxel_center(0, 0, 0), Vector3f::new(-0.75, -0.75, -0.75));
        assert_eq!(grid.voxel_center(3, 3, 3), Vector3f::new(0.75, 0.75, 0.75));
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_sphere_fill() {
        let mut grid = unit_grid(32);
        let red = Rgb8::new(255, 0, 0);
        let written = grid.add_voxel_sphere(&Vector3f::zeros(), 0.5, red, Some(7));

        // About the analytic volume, measured in voxels of edge 1/16.
        let expected = 4.0 / 3.0 * std::f32::consts::PI * 0.125 * 4096.0;
        assert!((written as f32 - expected).abs() / expected < 0.05, "written = {}", written);
        assert_eq!(grid.occupied_count(), written);

        assert!(grid.is_occupied(16, 16, 16));
        assert_eq!(grid.color(16, 16, 16), red);
        assert_eq!(grid.material(16, 16, 16), Some(7));
        assert!(!grid.is_occupied(0, 0, 0));
        assert_eq!(grid.material(0, 0, 0), None);
    }

    #[test]
    fn test_sphere_clipped_by_bounds() {
        let mut grid = unit_grid(8);
        let written = grid.add_voxel_sphere(&Vector3f::new(5.0, 0.0, 0.0), 1.0, Rgb8::default(), None);
        assert_eq!(written, 0);
        let written = grid.add_voxel_sphere(&Vector3f::new(1.0, 1.0, 1.0), 0.3, Rgb8::default(), None);
        assert_eq!(written, 1);
        assert!(grid.is_occupied(7, 7, 7));
    }

    #[test]
    fn test_plane_fills_half_space() {
        let mut grid = unit_grid(8);
        let written = grid.add_plane(&Vector3f::new(0.0, 1.0, 0.0), &Vector3f::new(0.0, -0.5, 0.0),
                                     Rgb8::new(10, 20, 30), Some(0));
        // Rows with centres at y = -0.875 and y = -0.625.
        assert_eq!(written, 2 * 8 * 8);
        assert!(grid.is_occupied(3, 1, 5));
        assert!(!grid.is_occupied(3, 2, 5));
    }

    #[test]
    fn test_later_primitives_overwrite() {
        let mut grid = unit_grid(8);
        grid.add_plane(&Vector3f::new(0.0, 0.0, 1.0), &Vector3f::zeros(), Rgb8::new(1, 1, 1), Some(0));
        grid.add_voxel_sphere(&Vector3f::new(0.0, 0.0, -0.5), 0.3, Rgb8::new(2, 2, 2), Some(9));
        assert_eq!(grid.material(4, 4, 2), Some(9));
        assert_eq!(grid.material(0, 0, 0), Some(0));
    }

    #[test]
    fn test_degenerate_plane_is_ignored() {
        let mut grid = unit_grid(4);
        assert_eq!(grid.add_plane(&Vector3f::zeros(), &Vector3f::zeros(), Rgb8::default(), None), 0);
    }

    #[test]
    fn test_color_quantization() {
        let c = Rgb8::from_spectrum(&RGBSpectrum::new(1.5, 0.5, -0.2));
        assert_eq!(c, Rgb8::new(255, 128, 0));
        assert!((c.to_spectrum().g() - 128.0 / 255.0).abs() < 1e-6);
    }
}
