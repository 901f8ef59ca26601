//! Manifest shapes -> composed, welded geometry

use anyhow::{Context, Result, ensure};
use glam::Vec3;
use kiln_geometry::{GeometryBuffer, Identity, PixelRect, TextureProjector, Vertex, composers};

use crate::manifest::{ShapeDef, ShapeKind, TextureSpec};

fn projector(
    spec: Option<&TextureSpec>,
    atlas: Option<PixelRect>,
) -> Result<Box<dyn TextureProjector>> {
    match spec {
        Some(spec) => spec.projector(atlas),
        None => Ok(Box::new(Identity)),
    }
}

fn size<const N: usize>(shape: &ShapeDef) -> Result<[f32; N]> {
    let size = shape
        .size
        .as_deref()
        .with_context(|| format!("{:?} shape {:?} needs `size`", shape.kind, shape.name))?;
    size.try_into().map_err(|_| {
        anyhow::anyhow!(
            "{:?} shape {:?} needs {N} size values, got {}",
            shape.kind,
            shape.name,
            size.len()
        )
    })
}

fn param<T: Copy>(shape: &ShapeDef, value: Option<T>, field: &str) -> Result<T> {
    value.with_context(|| format!("{:?} shape {:?} needs `{field}`", shape.kind, shape.name))
}

fn radial(shape: &ShapeDef) -> Result<(f32, u32)> {
    let radius = param(shape, shape.radius, "radius")?;
    let edges = param(shape, shape.edges, "edges")?;
    ensure!(
        edges >= 3,
        "Shape {:?} needs at least 3 edges, got {edges}",
        shape.name
    );
    Ok((radius, edges))
}

/// Compose a shape's triangle list
///
/// Parameter problems are reported as errors rather than reaching the
/// composers' own assertions.
pub fn compose_shape(shape: &ShapeDef, atlas: Option<PixelRect>) -> Result<Vec<Vertex>> {
    let mut projector = projector(shape.texture.as_ref(), atlas)
        .with_context(|| format!("Bad texture on shape {:?}", shape.name))?;
    let projector = projector.as_mut();

    let vertices = match shape.kind {
        ShapeKind::Rectangle => {
            let [width, height] = size(shape)?;
            composers::rectangle_textured(width, height, projector)
        }
        ShapeKind::Triangle => {
            let points = param(shape, shape.points, "points")?;
            composers::triangle_textured(points.map(Vec3::from_array), projector)
        }
        ShapeKind::Circle => {
            let (radius, edges) = radial(shape)?;
            composers::circle_textured(radius, edges, projector)
        }
        ShapeKind::Tube => {
            let (radius, edges) = radial(shape)?;
            let height = param(shape, shape.height, "height")?;
            composers::tube_textured(radius, height, edges, projector)
        }
        ShapeKind::Cylinder => {
            let (radius, edges) = radial(shape)?;
            let height = param(shape, shape.height, "height")?;
            let mut ends = self::projector(shape.ends.as_ref(), atlas)
                .with_context(|| format!("Bad end texture on shape {:?}", shape.name))?;
            composers::cylinder_textured(radius, height, edges, projector, ends.as_mut())
        }
        ShapeKind::Cuboid => {
            let [width, height, depth] = size(shape)?;
            composers::cuboid_textured(width, height, depth, projector)
        }
        ShapeKind::Pyramid => {
            let (radius, edges) = radial(shape)?;
            let height = param(shape, shape.height, "height")?;
            let levels = param(shape, shape.levels, "levels")?;
            ensure!(
                levels >= 1,
                "Pyramid {:?} needs at least one level",
                shape.name
            );
            composers::pyramid_textured(radius, height, edges, levels, projector)
        }
    };
    Ok(vertices)
}

/// Compose and weld a shape
pub fn build_geometry(shape: &ShapeDef, atlas: Option<PixelRect>) -> Result<GeometryBuffer> {
    let vertices = compose_shape(shape, atlas)?;
    Ok(GeometryBuffer::from_triangle_list(&vertices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::parse_manifest;

    fn shape(toml: &str) -> ShapeDef {
        let manifest = parse_manifest(toml).unwrap();
        manifest.shapes.into_iter().next().unwrap()
    }

    #[test]
    fn test_cuboid_welds_to_24_vertices() {
        let cuboid = shape("[[shape]]\nname = \"c\"\nkind = \"cuboid\"\nsize = [1.0, 2.0, 3.0]");
        let geometry = build_geometry(&cuboid, None).unwrap();
        assert_eq!(geometry.index_count(), 36);
        assert_eq!(geometry.vertex_count(), 24);
    }

    #[test]
    fn test_radial_shape_counts() {
        let cylinder = shape(
            "[[shape]]\nname = \"c\"\nkind = \"cylinder\"\nradius = 1.0\nheight = 2.0\nedges = 8",
        );
        assert_eq!(compose_shape(&cylinder, None).unwrap().len(), 8 * 6 + 2 * 8 * 3);

        let pyramid = shape(
            "[[shape]]\nname = \"p\"\nkind = \"pyramid\"\nradius = 1.0\nheight = 2.0\nedges = 4\nlevels = 3",
        );
        assert_eq!(compose_shape(&pyramid, None).unwrap().len(), 4 * 3 * 6);
    }

    #[test]
    fn test_triangle_points() {
        let triangle = shape(
            "[[shape]]\nname = \"t\"\nkind = \"triangle\"\npoints = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]",
        );
        let vertices = compose_shape(&triangle, None).unwrap();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[1].position, Vec3::X);
    }

    #[test]
    fn test_missing_parameter_is_an_error() {
        let circle = shape("[[shape]]\nname = \"c\"\nkind = \"circle\"\nedges = 8");
        let err = compose_shape(&circle, None).unwrap_err();
        assert!(err.to_string().contains("radius"));
    }

    #[test]
    fn test_wrong_size_arity() {
        let rectangle = shape("[[shape]]\nname = \"r\"\nkind = \"rectangle\"\nsize = [1.0]");
        assert!(compose_shape(&rectangle, None).is_err());
    }

    #[test]
    fn test_too_few_edges_is_an_error() {
        let tube = shape(
            "[[shape]]\nname = \"t\"\nkind = \"tube\"\nradius = 1.0\nheight = 1.0\nedges = 2",
        );
        assert!(compose_shape(&tube, None).is_err());
    }

    #[test]
    fn test_textured_rectangle_uses_atlas() {
        let rectangle = shape(
            "[atlas]\nwidth = 128\nheight = 128\n[[shape]]\nname = \"r\"\nkind = \"rectangle\"\nsize = [1.0, 1.0]\ntexture = { rect = [64, 64, 64, 64] }",
        );
        let atlas = Some(PixelRect::bounds(128, 128));
        let vertices = compose_shape(&rectangle, atlas).unwrap();
        assert!(
            vertices
                .iter()
                .all(|v| v.uv.x >= 0.5 && v.uv.y >= 0.5 && v.uv.x <= 1.0 && v.uv.y <= 1.0)
        );
    }
}
