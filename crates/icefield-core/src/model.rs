//! glTF model loading.
//!
//! The document and its external buffers are fetched through an
//! [`AssetFetcher`]; meshes from the default scene are flattened into
//! world-space triangle lists ready for upload.

use glam::{Mat3, Mat4, Vec3};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to fetch `{url}`: {reason}")]
    Fetch { url: String, reason: String },
    #[error("invalid glTF document: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("buffer {index} uses an unsupported uri (data uris are not supported)")]
    UnsupportedUri { index: usize },
    #[error("buffer {index} is missing its binary chunk")]
    MissingBuffer { index: usize },
    #[error("mesh `{mesh}` has a primitive without positions")]
    MissingPositions { mesh: String },
    #[error("document has no scene")]
    NoScene,
    #[error("renderer rejected model: {0}")]
    Upload(String),
}

/// Source of raw asset bytes.
#[allow(async_fn_in_trait)]
pub trait AssetFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, String>;
}

/// One triangle list in world space.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub base_color: [f32; 4],
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A loaded model: every triangle mesh of the scene, transforms baked in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    pub meshes: Vec<Mesh>,
}

impl Model {
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }

    /// Axis-aligned bounds `(min, max)`; `None` for an empty model.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut points = self
            .meshes
            .iter()
            .flat_map(|m| m.positions.iter())
            .map(|p| Vec3::from(*p));
        let first = points.next()?;
        Some(points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    /// Flatten the default scene (or the first one) of a parsed document.
    pub fn from_gltf(document: &gltf::Document, buffers: &[Vec<u8>]) -> Result<Self, ModelError> {
        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or(ModelError::NoScene)?;
        let mut meshes = Vec::new();
        for node in scene.nodes() {
            collect_node(&node, Mat4::IDENTITY, buffers, &mut meshes)?;
        }
        Ok(Self { meshes })
    }
}

fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[Vec<u8>],
    out: &mut Vec<Mesh>,
) -> Result<(), ModelError> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        let name = mesh.name().unwrap_or("unnamed").to_string();
        let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::debug!("skipping non-triangle primitive in mesh `{}`", name);
                continue;
            }
            let reader = primitive.reader(|b| buffers.get(b.index()).map(|d| d.as_slice()));
            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .ok_or_else(|| ModelError::MissingPositions { mesh: name.clone() })?
                .map(|p| world.transform_point3(Vec3::from(p)).to_array())
                .collect();
            let indices: Vec<u32> = match reader.read_indices() {
                Some(ix) => ix.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };
            let normals: Vec<[f32; 3]> = match reader.read_normals() {
                Some(ns) => ns
                    .map(|n| (normal_matrix * Vec3::from(n)).normalize_or_zero().to_array())
                    .collect(),
                None => compute_normals(&positions, &indices),
            };
            let base_color = primitive
                .material()
                .pbr_metallic_roughness()
                .base_color_factor();
            out.push(Mesh {
                name: name.clone(),
                positions,
                normals,
                indices,
                base_color,
            });
        }
    }
    for child in node.children() {
        collect_node(&child, world, buffers, out)?;
    }
    Ok(())
}

/// Area-weighted vertex normals for meshes that ship without them.
pub fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa = Vec3::from(positions[a]);
        let face = (Vec3::from(positions[b]) - pa).cross(Vec3::from(positions[c]) - pa);
        acc[a] += face;
        acc[b] += face;
        acc[c] += face;
    }
    acc.into_iter()
        .map(|n| n.normalize_or_zero().to_array())
        .collect()
}

/// Resolve a buffer uri against the url of the document referencing it.
pub fn resolve_uri(document_url: &str, uri: &str) -> String {
    if uri.contains("://") || uri.starts_with('/') {
        return uri.to_string();
    }
    match document_url.rfind('/') {
        Some(slash) => format!("{}{}", &document_url[..=slash], uri),
        None => uri.to_string(),
    }
}

/// Fetch and parse a glTF document plus its external buffers.
pub async fn load_model<F: AssetFetcher>(fetcher: &F, url: &str) -> Result<Model, ModelError> {
    let bytes = fetcher
        .fetch(url)
        .await
        .map_err(|reason| ModelError::Fetch {
            url: url.to_string(),
            reason,
        })?;
    let gltf = gltf::Gltf::from_slice(&bytes)?;

    let mut buffers = Vec::with_capacity(gltf.buffers().len());
    for buffer in gltf.buffers() {
        let index = buffer.index();
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .clone()
                .ok_or(ModelError::MissingBuffer { index })?,
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                return Err(ModelError::UnsupportedUri { index });
            }
            gltf::buffer::Source::Uri(uri) => {
                let buffer_url = resolve_uri(url, uri);
                fetcher
                    .fetch(&buffer_url)
                    .await
                    .map_err(|reason| ModelError::Fetch {
                        url: buffer_url.clone(),
                        reason,
                    })?
            }
        };
        buffers.push(data);
    }

    let model = Model::from_gltf(&gltf.document, &buffers)?;
    log::info!(
        "[model] {} meshes, {} triangles from {}",
        model.meshes.len(),
        model.triangle_count(),
        url
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_uri_is_relative_to_document() {
        assert_eq!(resolve_uri("media/ice.gltf", "ice.bin"), "media/ice.bin");
        assert_eq!(resolve_uri("ice.gltf", "ice.bin"), "ice.bin");
        assert_eq!(resolve_uri("media/ice.gltf", "/abs/ice.bin"), "/abs/ice.bin");
        assert_eq!(
            resolve_uri("media/ice.gltf", "https://cdn.example/ice.bin"),
            "https://cdn.example/ice.bin"
        );
    }

    #[test]
    fn computed_normals_face_out_of_ccw_triangle() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let normals = compute_normals(&positions, &[0, 1, 2]);
        for n in normals {
            assert_eq!(n, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn out_of_range_indices_are_ignored() {
        let positions = [[0.0, 0.0, 0.0]];
        let normals = compute_normals(&positions, &[0, 5, 9]);
        assert_eq!(normals, vec![[0.0, 0.0, 0.0]]);
    }

    #[test]
    fn bounds_cover_all_meshes() {
        let mesh = |p: Vec<[f32; 3]>| Mesh {
            name: "m".into(),
            normals: vec![[0.0, 1.0, 0.0]; p.len()],
            indices: vec![],
            positions: p,
            base_color: [1.0; 4],
        };
        let model = Model {
            meshes: vec![
                mesh(vec![[-1.0, 0.0, 2.0]]),
                mesh(vec![[3.0, -4.0, 0.0], [0.0, 5.0, 0.0]]),
            ],
        };
        let (lo, hi) = model.bounds().unwrap();
        assert_eq!(lo, Vec3::new(-1.0, -4.0, 0.0));
        assert_eq!(hi, Vec3::new(3.0, 5.0, 2.0));
        assert!(Model::default().bounds().is_none());
    }
}
