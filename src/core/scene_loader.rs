// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::scene::Scene;
use crate::materials::MaterialRecord;
use crate::materials::matte::MatteParams;
use crate::materials::metal::MetalParams;
use crate::materials::plastic::PlasticParams;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::volumes::voxel_grid::{Rgb8, VoxelGrid};

const DEFAULT_RESOLUTION: usize = 64;
const DEFAULT_REFLECTANCE: Float = 0.5;
const DEFAULT_COATING: Float = 0.5;
const DEFAULT_IOR: Float = 1.5;
// 512 x 512 x 256 voxels.
const MAX_VOXELS: usize = 1 << 26;

#[derive(Debug)]
pub enum SceneLoadError {
    Io(std::io::Error),
    Xml(quick_xml::Error),
    Parse(String),
    MissingField(&'static str),
    UnknownReference(String),
}

impl From<std::io::Error> for SceneLoadError {
    fn from(err: std::io::Error) -> Self {
        SceneLoadError::Io(err)
    }
}

impl From<quick_xml::Error> for SceneLoadError {
    fn from(err: quick_xml::Error) -> Self {
        SceneLoadError::Xml(err)
    }
}

impl From<AttrError> for SceneLoadError {
    fn from(err: AttrError) -> Self {
        SceneLoadError::Xml(quick_xml::Error::InvalidAttr(err))
    }
}

impl fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneLoadError::Io(err) => write!(f, "io error: {}", err),
            SceneLoadError::Xml(err) => write!(f, "xml error: {}", err),
            SceneLoadError::Parse(msg) => write!(f, "parse error: {}", msg),
            SceneLoadError::MissingField(field) => write!(f, "missing field: {}", field),
            SceneLoadError::UnknownReference(id) => write!(f, "unknown bsdf reference: {}", id),
        }
    }
}

impl std::error::Error for SceneLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneLoadError::Io(err) => Some(err),
            SceneLoadError::Xml(err) => Some(err),
            _ => None,
        }
    }
}

pub struct SceneLoadResult {
    pub scene: Scene,
    pub samples: Option<u32>,
    pub seed: Option<u32>,
}

pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, SceneLoadError> {
    let result = load_scene_with_settings(path)?;
    Ok(result.scene)
}

pub fn load_scene_with_settings<P: AsRef<Path>>(path: P) -> Result<SceneLoadResult, SceneLoadError> {
    let path = path.as_ref();
    log::info!("Loading scene from: {}.", path.display());
    let xml = fs::read_to_string(path)?;
    parse_scene(&xml)
}

// Parameters of a <bsdf> or <shape> block, keyed by their `name` attribute.
#[derive(Default)]
struct PendingBlock {
    kind: String,
    id: Option<String>,
    params: HashMap<String, String>,
    reference: Option<String>,
}

impl PendingBlock {
    fn from_attributes(attrs: &HashMap<String, String>) -> Self {
        Self {
            kind: attrs.get("type").cloned().unwrap_or_default(),
            id: attrs.get("id").cloned(),
            ..Default::default()
        }
    }

    fn float(&self, name: &'static str) -> Result<Option<Float>, SceneLoadError> {
        self.params.get(name).map(|v| parse_float(v)).transpose()
    }

    fn vector(&self, name: &'static str) -> Result<Option<Vector3f>, SceneLoadError> {
        self.params.get(name).map(|v| parse_vector(v)).transpose()
    }

    fn rgb(&self, name: &'static str) -> Result<Option<RGBSpectrum>, SceneLoadError> {
        self.params.get(name).map(|v| parse_rgb(v)).transpose()
    }
}

struct VolumeSettings {
    resolution: (usize, usize, usize),
    bbox: AABB,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            resolution: (DEFAULT_RESOLUTION, DEFAULT_RESOLUTION, DEFAULT_RESOLUTION),
            bbox: AABB::default(),
        }
    }
}

fn parse_scene(xml: &str) -> Result<SceneLoadResult, SceneLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut defaults: HashMap<String, String> = HashMap::new();
    let mut volume = VolumeSettings::default();
    let mut bsdfs: Vec<(String, MaterialRecord)> = Vec::new();
    let mut shapes: Vec<PendingBlock> = Vec::new();

    let mut current_bsdf: Option<PendingBlock> = None;
    let mut current_shape: Option<PendingBlock> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => {
                let attrs = attributes_of(&e)?;
                match e.name().as_ref() {
                    b"bsdf" => current_bsdf = Some(PendingBlock::from_attributes(&attrs)),
                    b"shape" => current_shape = Some(PendingBlock::from_attributes(&attrs)),
                    name => handle_leaf(name, &attrs, &mut defaults, &mut volume,
                                        current_bsdf.as_mut().or(current_shape.as_mut()))?,
                }
            }
            Event::Empty(e) => {
                let attrs = attributes_of(&e)?;
                match e.name().as_ref() {
                    b"bsdf" => bsdfs.push(build_bsdf(PendingBlock::from_attributes(&attrs), bsdfs.len())?),
                    b"shape" => shapes.push(PendingBlock::from_attributes(&attrs)),
                    name => handle_leaf(name, &attrs, &mut defaults, &mut volume,
                                        current_bsdf.as_mut().or(current_shape.as_mut()))?,
                }
            }
            Event::End(e) => {
                match e.name().as_ref() {
                    b"bsdf" => {
                        if let Some(block) = current_bsdf.take() {
                            bsdfs.push(build_bsdf(block, bsdfs.len())?);
                        }
                    }
                    b"shape" => {
                        if let Some(block) = current_shape.take() {
                            shapes.push(block);
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        buf.clear();
    }

    let (xres, yres, zres) = volume.resolution;
    let mut scene = Scene::new(VoxelGrid::new(xres, yres, zres, volume.bbox));
    for (id, record) in bsdfs.iter() {
        scene.add_material(id, record);
    }
    for shape in shapes.iter() {
        add_shape(&mut scene, shape)?;
    }

    let samples = defaults.get("samples").map(|v| parse_u32(v)).transpose()?;
    let seed = defaults.get("seed").map(|v| parse_u32(v)).transpose()?;

    log::info!("Scene loaded: {} materials, {} shapes, {} of {} voxels occupied.",
               scene.material_ids().len(), shapes.len(),
               scene.volume().occupied_count(), scene.volume().voxel_count());

    Ok(SceneLoadResult { scene, samples, seed })
}

fn attributes_of(e: &BytesStart) -> Result<HashMap<String, String>, SceneLoadError> {
    let mut attrs = HashMap::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

fn handle_leaf(name: &[u8],
               attrs: &HashMap<String, String>,
               defaults: &mut HashMap<String, String>,
               volume: &mut VolumeSettings,
               block: Option<&mut PendingBlock>) -> Result<(), SceneLoadError> {
    match name {
        b"scene" => {}
        b"default" => {
            let key = attrs.get("name").ok_or(SceneLoadError::MissingField("default.name"))?;
            let value = attrs.get("value").ok_or(SceneLoadError::MissingField("default.value"))?;
            defaults.insert(key.clone(), value.clone());
        }
        b"volume" => {
            if let Some(res) = attrs.get("resolution") {
                volume.resolution = parse_resolution(res)?;
            }
            let p_min = attrs.get("min").map(|v| parse_vector(v)).transpose()?;
            let p_max = attrs.get("max").map(|v| parse_vector(v)).transpose()?;
            if let (Some(p_min), Some(p_max)) = (p_min, p_max) {
                volume.bbox = AABB::new(p_min, p_max);
            }
        }
        b"rgb" | b"float" | b"point" | b"vector" | b"integer" => {
            let block = match block {
                Some(block) => block,
                None => {
                    log::warn!("Parameter outside of a bsdf or shape ignored.");
                    return Ok(());
                }
            };
            let key = attrs.get("name").ok_or(SceneLoadError::MissingField("name"))?;
            let value = attrs.get("value").ok_or(SceneLoadError::MissingField("value"))?;
            block.params.insert(key.clone(), value.clone());
        }
        b"ref" => {
            if let Some(block) = block {
                block.reference = Some(attrs.get("id").ok_or(SceneLoadError::MissingField("ref.id"))?.clone());
            }
        }
        other => {
            log::warn!("Unknown scene element <{}> ignored.", String::from_utf8_lossy(other));
        }
    }
    Ok(())
}

fn build_bsdf(block: PendingBlock, index: usize) -> Result<(String, MaterialRecord), SceneLoadError> {
    let id = block.id.clone().unwrap_or_else(|| format!("{}_{}", block.kind, index));
    let reflectance = block.rgb("reflectance")?.unwrap_or_else(|| RGBSpectrum::uniform(DEFAULT_REFLECTANCE));
    let roughness = block.float("roughness")?.unwrap_or(0.0);

    let record = match block.kind.as_str() {
        "matte" | "diffuse" => {
            let emission = block.rgb("emission")?.unwrap_or_default();
            MaterialRecord::Matte(MatteParams::new(reflectance).with_emission(emission))
        }
        "metal" | "conductor" => MaterialRecord::Metal(MetalParams::new(reflectance, roughness)),
        "plastic" => {
            let coating = block.float("coating")?.unwrap_or(DEFAULT_COATING);
            if coating < 0.0 || coating > 1.0 {
                log::warn!("Plastic '{}' coating {} clamped to [0, 1].", id, coating);
            }
            let ior = block.float("ior")?.unwrap_or(DEFAULT_IOR);
            MaterialRecord::Plastic(PlasticParams::new(reflectance, roughness, coating, ior))
        }
        other => return Err(SceneLoadError::Parse(format!("unknown bsdf type '{}'", other))),
    };
    if reflectance.max_component() > 1.0 {
        log::warn!("Bsdf '{}' reflectance {:?} exceeds one and is not energy conserving.", id, reflectance);
    }
    Ok((id, record))
}

fn add_shape(scene: &mut Scene, shape: &PendingBlock) -> Result<(), SceneLoadError> {
    let material = match &shape.reference {
        Some(id) => Some(scene.material_offset(id)
            .ok_or_else(|| SceneLoadError::UnknownReference(id.clone()))?),
        None => None,
    };
    let color = Rgb8::from_spectrum(&shape.rgb("color")?.unwrap_or_else(|| RGBSpectrum::uniform(1.0)));

    match shape.kind.as_str() {
        "sphere" => {
            let center = shape.vector("center")?.ok_or(SceneLoadError::MissingField("sphere.center"))?;
            let radius = shape.float("radius")?.ok_or(SceneLoadError::MissingField("sphere.radius"))?;
            scene.volume_mut().add_voxel_sphere(&center, radius, color, material);
        }
        "plane" => {
            let normal = shape.vector("normal")?.ok_or(SceneLoadError::MissingField("plane.normal"))?;
            let point = shape.vector("point")?.ok_or(SceneLoadError::MissingField("plane.point"))?;
            scene.volume_mut().add_plane(&normal, &point, color, material);
        }
        other => return Err(SceneLoadError::Parse(format!("unknown shape type '{}'", other))),
    }
    Ok(())
}

fn split_values(value: &str) -> impl Iterator<Item = &str> {
    value.split(|c: char| c == ',' || c.is_whitespace()).filter(|s| !s.is_empty())
}

fn parse_float(value: &str) -> Result<Float, SceneLoadError> {
    value.trim().parse::<Float>()
        .map_err(|_| SceneLoadError::Parse(format!("invalid float '{}'", value)))
}

fn parse_u32(value: &str) -> Result<u32, SceneLoadError> {
    value.trim().parse::<u32>()
        .map_err(|_| SceneLoadError::Parse(format!("invalid integer '{}'", value)))
}

fn parse_vector(value: &str) -> Result<Vector3f, SceneLoadError> {
    let parts = split_values(value).map(parse_float).collect::<Result<Vec<Float>, _>>()?;
    if parts.len() != 3 {
        return Err(SceneLoadError::Parse(format!("expected 3 components in '{}'", value)));
    }
    Ok(Vector3f::new(parts[0], parts[1], parts[2]))
}

fn parse_rgb(value: &str) -> Result<RGBSpectrum, SceneLoadError> {
    let parts = split_values(value).map(parse_float).collect::<Result<Vec<Float>, _>>()?;
    match parts.len() {
        1 => Ok(RGBSpectrum::uniform(parts[0])),
        3 => Ok(RGBSpectrum::new(parts[0], parts[1], parts[2])),
        _ => Err(SceneLoadError::Parse(format!("expected 1 or 3 components in '{}'", value))),
    }
}

fn parse_resolution(value: &str) -> Result<(usize, usize, usize), SceneLoadError> {
    let parts = split_values(value)
        .map(|v| v.parse::<usize>().map_err(|_| SceneLoadError::Parse(format!("invalid resolution '{}'", value))))
        .collect::<Result<Vec<usize>, _>>()?;
    let (x, y, z) = match parts.len() {
        1 => (parts[0], parts[0], parts[0]),
        3 => (parts[0], parts[1], parts[2]),
        _ => return Err(SceneLoadError::Parse(format!("expected 1 or 3 components in '{}'", value))),
    };
    if x == 0 || y == 0 || z == 0 {
        return Err(SceneLoadError::Parse(format!("resolution '{}' has an empty axis", value)));
    }
    match x.checked_mul(y).and_then(|xy| xy.checked_mul(z)) {
        Some(count) if count <= MAX_VOXELS => Ok((x, y, z)),
        _ => Err(SceneLoadError::Parse(format!("resolution '{}' exceeds {} voxels", value, MAX_VOXELS))),
    }
}
