//! glTF 2.0 scene adapter for udimscan.
//!
//! Loads a `.glb` or `.gltf` document and exposes its materials, meshes and
//! `TEXCOORD_0` layouts through [`SceneQuery`]. Every triangle of every
//! triangle-list primitive becomes one face; all primitives of a glTF mesh
//! share a single UV array.
//!
//! glTF places the UV origin at the top-left corner while UDIM numbering
//! counts rows upward from the bottom-left, so `v` is read as `1 - v`.
//!
//! # Example
//!
//! ```no_run
//! use udimscan_core::{Analyzer, CancellationToken, NoProgress};
//! use udimscan_gltf::GltfScene;
//! use std::path::Path;
//!
//! let scene = GltfScene::from_path(Path::new("character.glb")).unwrap();
//! let report = Analyzer::default()
//!     .analyze(&scene, &mut NoProgress, &CancellationToken::new())
//!     .unwrap();
//! println!("{} overlapping face pairs", report.overlaps.len());
//! ```

mod accessors;
mod error;

pub use error::GltfSceneError;

use accessors::{read_indices, read_uvs, resolve_buffers, BufferData};
use gltf::mesh::Mode;
use gltf::Semantic;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};
use udimscan_core::{
    FaceId, MaterialId, MeshId, MeshQueryError, SceneError, SceneQuery, UvSetId,
};

/// Name given to primitives without a material.
pub const DEFAULT_MATERIAL: &str = "default_material";

/// Name of the single UV set each mesh exposes.
pub const UV_SET: &str = "TEXCOORD_0";

#[derive(Debug, Default)]
struct GltfMesh {
    /// `None` when no primitive has texture coordinates.
    uvs: Option<(Vec<f64>, Vec<f64>)>,
    faces: Vec<Vec<usize>>,
    error: Option<String>,
}

impl GltfMesh {
    fn add_primitive(
        &mut self,
        primitive: &gltf::Primitive,
        buffers: &[BufferData],
    ) -> Result<(), String> {
        if primitive.mode() != Mode::Triangles {
            debug!(mode = ?primitive.mode(), "skipping non-triangle primitive");
            return Ok(());
        }
        let Some(uv_accessor) = primitive.get(&Semantic::TexCoords(0)) else {
            return Ok(());
        };

        let uvs = read_uvs(&uv_accessor, buffers)?;
        let indices: Vec<usize> = match primitive.indices() {
            Some(accessor) => read_indices(&accessor, buffers)?
                .into_iter()
                .map(|i| i as usize)
                .collect(),
            None => (0..uvs.len()).collect(),
        };

        let (us, vs) = self.uvs.get_or_insert_with(Default::default);
        let base = us.len();
        for [u, v] in uvs {
            us.push(f64::from(u));
            vs.push(1.0 - f64::from(v));
        }
        for triangle in indices.chunks_exact(3) {
            self.faces.push(triangle.iter().map(|&i| base + i).collect());
        }
        Ok(())
    }
}

/// A [`SceneQuery`] over a loaded glTF document.
///
/// Geometry is extracted once at load time. Materials are named after the
/// glTF material, or `material_<index>` when unnamed; meshes likewise use
/// `mesh_<index>`.
#[derive(Debug, Default)]
pub struct GltfScene {
    materials: Vec<MaterialId>,
    material_meshes: BTreeMap<MaterialId, Vec<MeshId>>,
    meshes: BTreeMap<MeshId, GltfMesh>,
}

impl GltfScene {
    /// Loads a document from memory.
    ///
    /// Buffers referenced by external URIs cannot be resolved; meshes that
    /// use them fail with a per-mesh error.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, GltfSceneError> {
        Self::load(bytes, None)
    }

    /// Loads a document from disk, resolving external buffers next to it.
    pub fn from_path(path: &Path) -> Result<Self, GltfSceneError> {
        let bytes = std::fs::read(path).map_err(|source| GltfSceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load(&bytes, path.parent())
    }

    fn load(bytes: &[u8], base_dir: Option<&Path>) -> Result<Self, GltfSceneError> {
        let gltf = gltf::Gltf::from_slice(bytes)?;
        let doc = &gltf.document;
        let buffers = resolve_buffers(doc, gltf.blob.as_deref(), base_dir);

        let mut scene = Self::default();
        for material in doc.materials() {
            scene.materials.push(material_id(&material));
        }

        for mesh in doc.meshes() {
            let id = scene.mesh_id(&mesh);
            let mut extracted = GltfMesh::default();

            for primitive in mesh.primitives() {
                let material = material_id(&primitive.material());
                if !scene.materials.contains(&material) {
                    scene.materials.push(material.clone());
                }
                let shaded = scene.material_meshes.entry(material).or_default();
                if !shaded.contains(&id) {
                    shaded.push(id.clone());
                }

                if extracted.error.is_some() {
                    continue;
                }
                if let Err(message) = extracted.add_primitive(&primitive, &buffers) {
                    warn!(mesh = %id, %message, "unreadable primitive");
                    extracted.error = Some(message);
                }
            }

            scene.meshes.insert(id, extracted);
        }

        debug!(
            materials = scene.materials.len(),
            meshes = scene.meshes.len(),
            "loaded glTF scene"
        );
        Ok(scene)
    }

    /// Mesh name, made unique by suffixing the index on collision.
    fn mesh_id(&self, mesh: &gltf::Mesh) -> MeshId {
        let id = match mesh.name() {
            Some(name) => MeshId::new(name),
            None => MeshId::new(format!("mesh_{}", mesh.index())),
        };
        if self.meshes.contains_key(&id) {
            MeshId::new(format!("{}_{}", id, mesh.index()))
        } else {
            id
        }
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    fn mesh(&self, mesh: &MeshId) -> Result<&GltfMesh, MeshQueryError> {
        let found = self
            .meshes
            .get(mesh)
            .ok_or_else(|| MeshQueryError::Detached { mesh: mesh.clone() })?;
        match &found.error {
            Some(message) => Err(MeshQueryError::Backend {
                mesh: mesh.clone(),
                message: message.clone(),
            }),
            None => Ok(found),
        }
    }
}

fn material_id(material: &gltf::Material) -> MaterialId {
    match (material.name(), material.index()) {
        (Some(name), _) => MaterialId::new(name),
        (None, Some(index)) => MaterialId::new(format!("material_{}", index)),
        (None, None) => MaterialId::new(DEFAULT_MATERIAL),
    }
}

impl SceneQuery for GltfScene {
    fn list_materials(&self) -> Result<Vec<MaterialId>, SceneError> {
        Ok(self.materials.clone())
    }

    fn material_meshes(&self, material: &MaterialId) -> Result<Vec<MeshId>, MeshQueryError> {
        Ok(self
            .material_meshes
            .get(material)
            .cloned()
            .unwrap_or_default())
    }

    fn mesh_uv_sets(&self, mesh: &MeshId) -> Result<Vec<UvSetId>, MeshQueryError> {
        let found = self.mesh(mesh)?;
        Ok(match found.uvs {
            Some(_) => vec![UvSetId::new(UV_SET)],
            None => Vec::new(),
        })
    }

    fn mesh_uv_coordinates(
        &self,
        mesh: &MeshId,
        uv_set: &UvSetId,
    ) -> Result<(Vec<f64>, Vec<f64>), MeshQueryError> {
        let found = self.mesh(mesh)?;
        match &found.uvs {
            Some(uvs) if uv_set.as_str() == UV_SET => Ok(uvs.clone()),
            _ => Err(MeshQueryError::Backend {
                mesh: mesh.clone(),
                message: format!("unknown UV set '{}'", uv_set),
            }),
        }
    }

    fn mesh_face_count(&self, mesh: &MeshId) -> Result<usize, MeshQueryError> {
        Ok(self.mesh(mesh)?.faces.len())
    }

    fn mesh_face_uv_indices(
        &self,
        mesh: &MeshId,
        face: FaceId,
    ) -> Result<Vec<usize>, MeshQueryError> {
        self.mesh(mesh)?
            .faces
            .get(face)
            .cloned()
            .ok_or_else(|| MeshQueryError::FaceOutOfRange {
                mesh: mesh.clone(),
                face,
            })
    }
}
