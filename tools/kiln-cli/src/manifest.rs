//! Scene manifest (kiln.toml)
//!
//! ```toml
//! [output]
//! dir = "build"
//!
//! [atlas]
//! width = 256
//! height = 256
//!
//! [[shape]]
//! name = "crate"
//! kind = "cuboid"
//! size = [1.0, 1.0, 1.0]
//! texture = { rect = [0, 0, 64, 64] }
//!
//! [[object]]
//! shape = "crate"
//! position = [4.0, 0.0, 0.0]
//! texture = "atlas.png"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail, ensure};
use kiln_geometry::{
    CuboidSide, CuboidTexture, PixelRect, TextureMultiplier, TextureProjector, TextureRectangle,
    TubeTexture,
};
use kiln_scene::BlendMode;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub atlas: Option<AtlasConfig>,
    #[serde(default, rename = "shape")]
    pub shapes: Vec<ShapeDef>,
    #[serde(default, rename = "object")]
    pub objects: Vec<ObjectDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Atlas size in pixels; pixel rectangles are normalized against it
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AtlasConfig {
    pub width: i32,
    pub height: i32,
}

impl AtlasConfig {
    pub fn bounds(&self) -> PixelRect {
        PixelRect::bounds(self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Triangle,
    Circle,
    Tube,
    Cylinder,
    Cuboid,
    Pyramid,
}

/// One `[[shape]]` entry; which parameters apply depends on `kind`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShapeDef {
    pub name: String,
    pub kind: ShapeKind,
    /// `[w, h]` for rectangles, `[w, h, d]` for cuboids
    #[serde(default)]
    pub size: Option<Vec<f32>>,
    #[serde(default)]
    pub points: Option<[[f32; 3]; 3]>,
    #[serde(default)]
    pub radius: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub edges: Option<u32>,
    #[serde(default)]
    pub levels: Option<u32>,
    #[serde(default)]
    pub texture: Option<TextureSpec>,
    /// Cylinder end caps
    #[serde(default)]
    pub ends: Option<TextureSpec>,
}

/// Projector description; exactly one of `rect`, `multiplier`, `tube`
/// or `cuboid` must be set
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextureSpec {
    #[serde(default)]
    pub rect: Option<[i32; 4]>,
    #[serde(default)]
    pub multiplier: Option<[f32; 2]>,
    #[serde(default)]
    pub tube: Option<[i32; 4]>,
    #[serde(default)]
    pub elements: Option<u32>,
    #[serde(default)]
    pub cuboid: Option<CuboidRects>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CuboidRects {
    pub front: Option<[i32; 4]>,
    pub back: Option<[i32; 4]>,
    pub left: Option<[i32; 4]>,
    pub right: Option<[i32; 4]>,
    pub top: Option<[i32; 4]>,
    pub bottom: Option<[i32; 4]>,
}

/// One `[[object]]` entry: a shape instance for `kiln batch`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectDef {
    pub shape: String,
    #[serde(default)]
    pub position: [f32; 3],
    /// Euler angles in radians
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default)]
    pub texture: Option<String>,
    /// none | additive | alpha-blend | non-premultiplied | opaque | custom:<name>
    #[serde(default)]
    pub blend: Option<String>,
    #[serde(default = "default_true")]
    pub opaque: bool,
    #[serde(default = "default_true")]
    pub optimizable: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    #[serde(default)]
    pub tag: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_alpha() -> f32 {
    1.0
}

impl ObjectDef {
    /// Parsed blend state (`None` is the backend default)
    pub fn blend_mode(&self) -> Result<Option<BlendMode>> {
        match &self.blend {
            None => Ok(None),
            Some(name) => BlendMode::parse(name)
                .with_context(|| format!("Unknown blend state {name:?} on object {:?}", self.shape)),
        }
    }
}

fn pixel_rect([x, y, width, height]: [i32; 4]) -> PixelRect {
    PixelRect::new(x, y, width, height)
}

impl TextureSpec {
    /// Build the projector this spec describes
    ///
    /// Pixel rectangles need the manifest's `[atlas]` bounds.
    pub fn projector(&self, atlas: Option<PixelRect>) -> Result<Box<dyn TextureProjector>> {
        let set = [
            self.rect.is_some(),
            self.multiplier.is_some(),
            self.tube.is_some(),
            self.cuboid.is_some(),
        ]
        .into_iter()
        .filter(|&s| s)
        .count();
        ensure!(
            set == 1,
            "Texture spec needs exactly one of rect, multiplier, tube or cuboid (found {set})"
        );
        ensure!(
            self.elements.is_none() || self.tube.is_some(),
            "`elements` only applies to tube textures"
        );

        if let Some([u, v]) = self.multiplier {
            return Ok(Box::new(TextureMultiplier::new(glam::Vec2::new(u, v))));
        }

        let atlas = atlas.context("Pixel rectangles need an [atlas] section")?;
        ensure!(
            atlas.width > 0 && atlas.height > 0,
            "Atlas size must be positive, got {}x{}",
            atlas.width,
            atlas.height
        );

        if let Some(rect) = self.rect {
            return Ok(Box::new(TextureRectangle::from_pixels(pixel_rect(rect), atlas)));
        }
        if let Some(rect) = self.tube {
            let elements = self.elements.context("Tube textures need `elements`")?;
            ensure!(elements >= 1, "Tube textures need at least one element");
            return Ok(Box::new(TubeTexture::from_pixels(
                pixel_rect(rect),
                atlas,
                elements,
            )));
        }
        if let Some(sides) = &self.cuboid {
            let rects: Vec<_> = [
                (CuboidSide::Front, sides.front),
                (CuboidSide::Back, sides.back),
                (CuboidSide::Left, sides.left),
                (CuboidSide::Right, sides.right),
                (CuboidSide::Top, sides.top),
                (CuboidSide::Bottom, sides.bottom),
            ]
            .into_iter()
            .filter_map(|(side, rect)| rect.map(|r| (side, pixel_rect(r))))
            .collect();
            return Ok(Box::new(CuboidTexture::from_rects(&rects, atlas)));
        }

        bail!("Empty texture spec")
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    parse_manifest(&content).with_context(|| format!("Invalid manifest {}", path.display()))
}

/// Parse manifest text and check cross references
pub fn parse_manifest(content: &str) -> Result<Manifest> {
    let manifest: Manifest = toml::from_str(content).context("Failed to parse manifest TOML")?;
    validate(&manifest)?;
    Ok(manifest)
}

/// Shape names are unique and every object names a known shape
pub fn validate(manifest: &Manifest) -> Result<()> {
    for (i, shape) in manifest.shapes.iter().enumerate() {
        ensure!(!shape.name.is_empty(), "Shape {i} has an empty name");
        if manifest.shapes[..i].iter().any(|s| s.name == shape.name) {
            bail!("Duplicate shape name {:?}", shape.name);
        }
    }
    for object in &manifest.objects {
        ensure!(
            manifest.find_shape(&object.shape).is_some(),
            "Object refers to unknown shape {:?}",
            object.shape
        );
        object.blend_mode()?;
    }
    Ok(())
}

impl Manifest {
    pub fn find_shape(&self, name: &str) -> Option<&ShapeDef> {
        self.shapes.iter().find(|s| s.name == name)
    }

    pub fn atlas_bounds(&self) -> Option<PixelRect> {
        self.atlas.as_ref().map(AtlasConfig::bounds)
    }

    /// Output directory, relative paths resolved against `base`
    pub fn output_dir(&self, base: &Path) -> PathBuf {
        if self.output.dir.is_absolute() {
            self.output.dir.clone()
        } else {
            base.join(&self.output.dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const SCENE: &str = r#"
        [output]
        dir = "build"

        [atlas]
        width = 256
        height = 128

        [[shape]]
        name = "crate"
        kind = "cuboid"
        size = [1.0, 2.0, 3.0]
        texture = { rect = [0, 0, 64, 64] }

        [[shape]]
        name = "pillar"
        kind = "cylinder"
        radius = 0.5
        height = 4.0
        edges = 12
        texture = { tube = [0, 64, 128, 64], elements = 12 }
        ends = { multiplier = [2.0, 2.0] }

        [[object]]
        shape = "crate"
        position = [4.0, 0.0, 0.0]
        texture = "atlas.png"
        blend = "opaque"

        [[object]]
        shape = "pillar"
        opaque = false
        alpha = 0.5
    "#;

    #[test]
    fn test_parse_scene() {
        let manifest = parse_manifest(SCENE).unwrap();
        assert_eq!(manifest.output.dir, PathBuf::from("build"));
        assert_eq!(manifest.atlas_bounds(), Some(PixelRect::bounds(256, 128)));
        assert_eq!(manifest.shapes.len(), 2);
        assert_eq!(manifest.shapes[0].kind, ShapeKind::Cuboid);
        assert_eq!(manifest.shapes[1].edges, Some(12));

        let crate_object = &manifest.objects[0];
        assert_eq!(crate_object.position, [4.0, 0.0, 0.0]);
        assert_eq!(crate_object.rotation, [0.0; 3]);
        assert!(crate_object.opaque && crate_object.optimizable && crate_object.visible);
        assert_eq!(crate_object.blend_mode().unwrap(), Some(BlendMode::Opaque));

        let pillar = &manifest.objects[1];
        assert!(!pillar.opaque);
        assert_eq!(pillar.alpha, 0.5);
        assert_eq!(pillar.blend_mode().unwrap(), None);
    }

    #[test]
    fn test_defaults() {
        let manifest = parse_manifest("").unwrap();
        assert_eq!(manifest.output.dir, PathBuf::from("."));
        assert!(manifest.atlas.is_none());
        assert!(manifest.shapes.is_empty());
        assert!(manifest.objects.is_empty());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = parse_manifest(
            r#"
            [[shape]]
            name = "a"
            kind = "circle"
            radius = 1.0
            edges = 8
            colour = "red"
            "#,
        );
        assert!(err.is_err());
        assert!(parse_manifest("[[shape]]\nname = \"a\"\nkind = \"sphere\"").is_err());
    }

    #[test]
    fn test_unknown_shape_reference() {
        let err = parse_manifest("[[object]]\nshape = \"missing\"").unwrap_err();
        assert!(format!("{err:#}").contains("unknown shape"));
    }

    #[test]
    fn test_duplicate_shape_names() {
        let manifest = r#"
            [[shape]]
            name = "a"
            kind = "rectangle"
            size = [1.0, 1.0]

            [[shape]]
            name = "a"
            kind = "rectangle"
            size = [2.0, 2.0]
        "#;
        assert!(parse_manifest(manifest).is_err());
    }

    #[test]
    fn test_bad_blend_rejected() {
        let manifest = r#"
            [[shape]]
            name = "a"
            kind = "rectangle"
            size = [1.0, 1.0]

            [[object]]
            shape = "a"
            blend = "multiply"
        "#;
        assert!(parse_manifest(manifest).is_err());
    }

    #[test]
    fn test_rect_projector() {
        let spec = TextureSpec {
            rect: Some([64, 0, 64, 64]),
            ..TextureSpec::default()
        };
        let projector = spec.projector(Some(PixelRect::bounds(256, 256))).unwrap();
        assert_eq!(projector.transform(Vec2::ONE), Vec2::new(0.5, 0.25));
    }

    #[test]
    fn test_rect_projector_needs_atlas() {
        let spec = TextureSpec {
            rect: Some([0, 0, 16, 16]),
            ..TextureSpec::default()
        };
        assert!(spec.projector(None).is_err());
    }

    #[test]
    fn test_multiplier_projector_without_atlas() {
        let spec = TextureSpec {
            multiplier: Some([2.0, 3.0]),
            ..TextureSpec::default()
        };
        let projector = spec.projector(None).unwrap();
        assert_eq!(projector.transform(Vec2::ONE), Vec2::new(2.0, 3.0));
    }

    #[test]
    fn test_ambiguous_projector() {
        let spec = TextureSpec {
            rect: Some([0, 0, 16, 16]),
            multiplier: Some([1.0, 1.0]),
            ..TextureSpec::default()
        };
        assert!(spec.projector(Some(PixelRect::bounds(16, 16))).is_err());
        assert!(TextureSpec::default().projector(None).is_err());
    }

    #[test]
    fn test_tube_projector_needs_elements() {
        let atlas = Some(PixelRect::bounds(64, 64));
        let mut spec = TextureSpec {
            tube: Some([0, 0, 64, 64]),
            ..TextureSpec::default()
        };
        assert!(spec.projector(atlas).is_err());
        spec.elements = Some(0);
        assert!(spec.projector(atlas).is_err());
        spec.elements = Some(4);
        assert!(spec.projector(atlas).is_ok());
    }

    #[test]
    fn test_output_dir_relative_to_manifest() {
        let manifest = parse_manifest("[output]\ndir = \"build\"").unwrap();
        assert_eq!(
            manifest.output_dir(Path::new("scenes")),
            PathBuf::from("scenes/build")
        );
    }
}
