//! Scene query interface and per-mesh UV extraction.
//!
//! The analysis never talks to a host application directly. Everything it
//! needs comes through [`SceneQuery`], which an adapter implements over a
//! DCC scene graph, a glTF document or an in-memory fixture.

pub mod memory;

use crate::error::{MeshQueryError, SceneError};
use crate::types::{FaceId, MaterialId, MeshId, UvBounds, UvSetId};

pub use memory::{MemoryMesh, MemoryScene};

/// Read-only access to materials, the meshes they shade and mesh UVs.
///
/// Every mesh-level call may fail with a [`MeshQueryError`]; callers treat
/// those as "skip this mesh". Only [`SceneQuery::list_materials`] failing is
/// fatal.
pub trait SceneQuery {
    /// All materials in the scene, in scene order.
    fn list_materials(&self) -> Result<Vec<MaterialId>, SceneError>;

    /// Meshes shaded by `material`.
    fn material_meshes(&self, material: &MaterialId) -> Result<Vec<MeshId>, MeshQueryError>;

    /// UV set names on `mesh`. Only the first one is analyzed.
    fn mesh_uv_sets(&self, mesh: &MeshId) -> Result<Vec<UvSetId>, MeshQueryError>;

    /// Parallel u and v arrays of one UV set, indexed by UV index.
    fn mesh_uv_coordinates(
        &self,
        mesh: &MeshId,
        uv_set: &UvSetId,
    ) -> Result<(Vec<f64>, Vec<f64>), MeshQueryError>;

    /// Number of faces on `mesh`.
    fn mesh_face_count(&self, mesh: &MeshId) -> Result<usize, MeshQueryError>;

    /// UV indices of the face's vertices, in vertex order.
    fn mesh_face_uv_indices(
        &self,
        mesh: &MeshId,
        face: FaceId,
    ) -> Result<Vec<usize>, MeshQueryError>;
}

impl<T: SceneQuery + ?Sized> SceneQuery for &T {
    fn list_materials(&self) -> Result<Vec<MaterialId>, SceneError> {
        (**self).list_materials()
    }

    fn material_meshes(&self, material: &MaterialId) -> Result<Vec<MeshId>, MeshQueryError> {
        (**self).material_meshes(material)
    }

    fn mesh_uv_sets(&self, mesh: &MeshId) -> Result<Vec<UvSetId>, MeshQueryError> {
        (**self).mesh_uv_sets(mesh)
    }

    fn mesh_uv_coordinates(
        &self,
        mesh: &MeshId,
        uv_set: &UvSetId,
    ) -> Result<(Vec<f64>, Vec<f64>), MeshQueryError> {
        (**self).mesh_uv_coordinates(mesh, uv_set)
    }

    fn mesh_face_count(&self, mesh: &MeshId) -> Result<usize, MeshQueryError> {
        (**self).mesh_face_count(mesh)
    }

    fn mesh_face_uv_indices(
        &self,
        mesh: &MeshId,
        face: FaceId,
    ) -> Result<Vec<usize>, MeshQueryError> {
        (**self).mesh_face_uv_indices(mesh, face)
    }
}

/// UVs of a mesh's first UV set together with its face topology.
///
/// Every face index has been checked against the UV arrays, so lookups
/// through this type cannot go out of bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshUvData {
    mesh: MeshId,
    uv_set: UvSetId,
    us: Vec<f64>,
    vs: Vec<f64>,
    faces: Vec<Vec<usize>>,
}

impl MeshUvData {
    /// The mesh the data was read from.
    pub fn mesh(&self) -> &MeshId {
        &self.mesh
    }

    /// The UV set that was read.
    pub fn uv_set(&self) -> &UvSetId {
        &self.uv_set
    }

    pub fn uv_count(&self) -> usize {
        self.us.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// UV coordinates referenced by `face`, in vertex order.
    pub fn face_uvs(&self, face: FaceId) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.faces
            .get(face)
            .map(|indices| indices.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&i| (self.us[i], self.vs[i]))
    }

    /// Bounding box of `face`, or `None` if the face has no UVs.
    pub fn face_bounds(&self, face: FaceId) -> Option<UvBounds> {
        UvBounds::from_points(self.face_uvs(face))
    }

    /// Every face with a bounding box.
    pub fn face_bounds_iter(&self) -> impl Iterator<Item = (FaceId, UvBounds)> + '_ {
        (0..self.faces.len()).filter_map(move |face| Some((face, self.face_bounds(face)?)))
    }
}

/// Reads a mesh's first UV set and face UV indices through `scene`.
///
/// Any query failure, a mesh without UV sets, mismatched u/v arrays or an
/// out-of-range UV index is returned as an error for the caller to skip.
pub fn load_mesh_uvs<S>(scene: &S, mesh: &MeshId) -> Result<MeshUvData, MeshQueryError>
where
    S: SceneQuery + ?Sized,
{
    let uv_set = scene
        .mesh_uv_sets(mesh)?
        .into_iter()
        .next()
        .ok_or_else(|| MeshQueryError::NoUvSet { mesh: mesh.clone() })?;

    let (us, vs) = scene.mesh_uv_coordinates(mesh, &uv_set)?;
    if us.len() != vs.len() {
        return Err(MeshQueryError::MismatchedUvArrays {
            mesh: mesh.clone(),
            u_count: us.len(),
            v_count: vs.len(),
        });
    }

    let face_count = scene.mesh_face_count(mesh)?;
    let mut faces = Vec::with_capacity(face_count);
    for face in 0..face_count {
        let indices = scene.mesh_face_uv_indices(mesh, face)?;
        if let Some(&index) = indices.iter().find(|&&i| i >= us.len()) {
            return Err(MeshQueryError::UvIndexOutOfRange {
                mesh: mesh.clone(),
                face,
                index,
                uv_count: us.len(),
            });
        }
        faces.push(indices);
    }

    Ok(MeshUvData {
        mesh: mesh.clone(),
        uv_set,
        us,
        vs,
        faces,
    })
}
