//! In-memory scene used for fixtures, tests and JSON scene documents.
//!
//! A scene document looks like:
//!
//! ```json
//! {
//!   "materials": [{ "name": "skin_mat", "meshes": ["|body|bodyShape"] }],
//!   "meshes": [{
//!     "name": "|body|bodyShape",
//!     "uv_sets": [{ "name": "map1", "u": [0.0, 1.0, 1.0, 0.0], "v": [0.0, 0.0, 1.0, 1.0] }],
//!     "faces": [[0, 1, 2, 3]]
//!   }]
//! }
//! ```

use super::SceneQuery;
use crate::error::{MeshQueryError, SceneError};
use crate::types::{FaceId, MaterialId, MeshId, UvSetId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One named UV set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryUvSet {
    pub name: UvSetId,
    pub u: Vec<f64>,
    pub v: Vec<f64>,
}

/// A mesh with UV sets and faces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMesh {
    pub name: MeshId,
    #[serde(default)]
    pub uv_sets: Vec<MemoryUvSet>,
    #[serde(default)]
    pub faces: Vec<Vec<usize>>,
    /// When set, every query on this mesh fails with this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl MemoryMesh {
    /// Creates a mesh with no UV sets and no faces.
    pub fn new(name: impl Into<MeshId>) -> Self {
        Self {
            name: name.into(),
            uv_sets: Vec::new(),
            faces: Vec::new(),
            failure: None,
        }
    }

    /// Creates a mesh whose queries all fail with `message`.
    pub fn failing(name: impl Into<MeshId>, message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new(name)
        }
    }

    /// Appends a UV set.
    pub fn with_uvs(mut self, name: impl Into<UvSetId>, uvs: &[(f64, f64)]) -> Self {
        self.uv_sets.push(MemoryUvSet {
            name: name.into(),
            u: uvs.iter().map(|&(u, _)| u).collect(),
            v: uvs.iter().map(|&(_, v)| v).collect(),
        });
        self
    }

    /// Appends a face referencing existing UV indices.
    pub fn with_face(mut self, uv_indices: &[usize]) -> Self {
        self.faces.push(uv_indices.to_vec());
        self
    }

    /// Appends a rectangular face spanning `[u_min, u_max] x [v_min, v_max]`.
    ///
    /// The four corners are added to the first UV set, which is created as
    /// `map1` if the mesh has none yet.
    pub fn with_quad(mut self, u_min: f64, v_min: f64, u_max: f64, v_max: f64) -> Self {
        if self.uv_sets.is_empty() {
            self.uv_sets.push(MemoryUvSet {
                name: UvSetId::new("map1"),
                u: Vec::new(),
                v: Vec::new(),
            });
        }
        let set = &mut self.uv_sets[0];
        let base = set.u.len();
        for (u, v) in [(u_min, v_min), (u_max, v_min), (u_max, v_max), (u_min, v_max)] {
            set.u.push(u);
            set.v.push(v);
        }
        self.faces.push((base..base + 4).collect());
        self
    }

    fn check(&self) -> Result<(), MeshQueryError> {
        match &self.failure {
            Some(message) => Err(MeshQueryError::Backend {
                mesh: self.name.clone(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Material entry of a scene document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMaterial {
    pub name: MaterialId,
    #[serde(default)]
    pub meshes: Vec<MeshId>,
}

#[derive(Debug, Deserialize)]
struct SceneDocument {
    #[serde(default)]
    materials: Vec<MemoryMaterial>,
    #[serde(default)]
    meshes: Vec<MemoryMesh>,
}

/// A [`SceneQuery`] backed by plain vectors.
///
/// Materials may reference meshes that are not defined; those behave like
/// detached nodes and fail with [`MeshQueryError::Detached`].
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    materials: Vec<MemoryMaterial>,
    meshes: BTreeMap<MeshId, MemoryMesh>,
    listing_failure: Option<String>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON scene document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let doc: SceneDocument = serde_json::from_str(json)?;
        Ok(Self::from_document(doc))
    }

    /// Parses a JSON scene document from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let doc: SceneDocument = serde_json::from_slice(bytes)?;
        Ok(Self::from_document(doc))
    }

    fn from_document(doc: SceneDocument) -> Self {
        let mut scene = Self::new();
        scene.materials = doc.materials;
        for mesh in doc.meshes {
            scene.meshes.insert(mesh.name.clone(), mesh);
        }
        scene
    }

    /// Adds a material shading the named meshes.
    pub fn with_material(mut self, name: impl Into<MaterialId>, meshes: &[&str]) -> Self {
        self.materials.push(MemoryMaterial {
            name: name.into(),
            meshes: meshes.iter().map(|&m| MeshId::new(m)).collect(),
        });
        self
    }

    /// Adds or replaces a mesh.
    pub fn with_mesh(mut self, mesh: MemoryMesh) -> Self {
        self.meshes.insert(mesh.name.clone(), mesh);
        self
    }

    /// Makes [`SceneQuery::list_materials`] fail.
    pub fn with_listing_failure(mut self, message: impl Into<String>) -> Self {
        self.listing_failure = Some(message.into());
        self
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    fn mesh(&self, mesh: &MeshId) -> Result<&MemoryMesh, MeshQueryError> {
        let found = self
            .meshes
            .get(mesh)
            .ok_or_else(|| MeshQueryError::Detached { mesh: mesh.clone() })?;
        found.check()?;
        Ok(found)
    }
}

impl SceneQuery for MemoryScene {
    fn list_materials(&self) -> Result<Vec<MaterialId>, SceneError> {
        if let Some(message) = &self.listing_failure {
            return Err(SceneError::new(message.clone()));
        }
        Ok(self.materials.iter().map(|m| m.name.clone()).collect())
    }

    fn material_meshes(&self, material: &MaterialId) -> Result<Vec<MeshId>, MeshQueryError> {
        Ok(self
            .materials
            .iter()
            .filter(|m| &m.name == material)
            .flat_map(|m| m.meshes.iter().cloned())
            .collect())
    }

    fn mesh_uv_sets(&self, mesh: &MeshId) -> Result<Vec<UvSetId>, MeshQueryError> {
        Ok(self
            .mesh(mesh)?
            .uv_sets
            .iter()
            .map(|set| set.name.clone())
            .collect())
    }

    fn mesh_uv_coordinates(
        &self,
        mesh: &MeshId,
        uv_set: &UvSetId,
    ) -> Result<(Vec<f64>, Vec<f64>), MeshQueryError> {
        let found = self.mesh(mesh)?;
        let set = found
            .uv_sets
            .iter()
            .find(|set| &set.name == uv_set)
            .ok_or_else(|| MeshQueryError::Backend {
                mesh: mesh.clone(),
                message: format!("no UV set named '{}'", uv_set),
            })?;
        Ok((set.u.clone(), set.v.clone()))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scene_document() {
        let json = r#"{
            "materials": [
                {"name": "skin_mat", "meshes": ["|body|bodyShape"]},
                {"name": "empty_mat"}
            ],
            "meshes": [{
                "name": "|body|bodyShape",
                "uv_sets": [{"name": "map1", "u": [0.0, 1.0, 1.0, 0.0], "v": [0.0, 0.0, 1.0, 1.0]}],
                "faces": [[0, 1, 2, 3]]
            }]
        }"#;

        let scene = MemoryScene::from_json(json).unwrap();
        assert_eq!(scene.material_count(), 2);
        assert_eq!(scene.mesh_count(), 1);

        let materials = scene.list_materials().unwrap();
        assert_eq!(materials, vec![MaterialId::new("skin_mat"), MaterialId::new("empty_mat")]);

        let meshes = scene.material_meshes(&materials[0]).unwrap();
        assert_eq!(meshes, vec![MeshId::new("|body|bodyShape")]);
        assert!(scene.material_meshes(&materials[1]).unwrap().is_empty());

        let mesh = &meshes[0];
        assert_eq!(scene.mesh_face_count(mesh).unwrap(), 1);
        assert_eq!(scene.mesh_face_uv_indices(mesh, 0).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_rejects_malformed_document() {
        assert!(MemoryScene::from_json("{\"materials\": 3}").is_err());
        assert!(MemoryScene::from_slice(b"not json").is_err());
    }

    #[test]
    fn test_failing_mesh() {
        let scene = MemoryScene::new().with_mesh(MemoryMesh::failing("bad", "node is locked"));
        let err = scene.mesh_uv_sets(&MeshId::new("bad")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "geometry query failed for mesh 'bad': node is locked"
        );
    }

    #[test]
    fn test_listing_failure() {
        let scene = MemoryScene::new().with_listing_failure("scene not loaded");
        assert!(scene.list_materials().is_err());
    }

    #[test]
    fn test_face_out_of_range() {
        let scene = MemoryScene::new().with_mesh(MemoryMesh::new("m").with_quad(0.0, 0.0, 1.0, 1.0));
        let err = scene.mesh_face_uv_indices(&MeshId::new("m"), 3).unwrap_err();
        assert!(matches!(err, MeshQueryError::FaceOutOfRange { face: 3, .. }));
    }
}
