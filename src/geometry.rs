//! Geometry Encoder - Meshes and Lines to Geometry Fragments
//!
//! Faces are flat integer runs: a type flag followed by vertex indices.
//! Only triangles are emitted; quads are split along the A-C diagonal.

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::align::align_by_repeating_last;
use crate::color::{hex_color, Rgb};
use crate::coords::{remap_point, round5};
use crate::error::SceneError;

/// Face run flag for a plain triangle
pub const FACE_TRIANGLE: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Face {
    Tri([u32; 3]),
    Quad([u32; 4]),
}

impl Face {
    /// Triangles in original winding; quads become (a, b, c) and (a, c, d)
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        match *self {
            Face::Tri(t) => vec![t],
            Face::Quad([a, b, c, d]) => vec![[a, b, c], [a, c, d]],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayFlags {
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub cast_shadow: bool,
    #[serde(default)]
    pub receive_shadow: bool,
    #[serde(default)]
    pub double_sided: bool,
}

fn default_true() -> bool { true }

impl Default for DisplayFlags {
    fn default() -> Self {
        Self {
            visible: true,
            cast_shadow: false,
            receive_shadow: false,
            double_sided: false,
        }
    }
}

/// Raw mesh in CAD coordinates, already triangulated or quad-dominant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshInput {
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<Face>,
    #[serde(default)]
    pub normals: Vec<[f64; 3]>,
    #[serde(default)]
    pub uvs: Vec<[f64; 2]>,
    #[serde(default)]
    pub vertex_colors: Option<Vec<Rgb>>,
    #[serde(default)]
    pub flags: DisplayFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineInput {
    pub start: [f64; 3],
    pub end: [f64; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    Geometry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryData {
    pub vertices: Vec<f64>,
    #[serde(default)]
    pub faces: Vec<u32>,
    #[serde(default)]
    pub normals: Vec<f64>,
    #[serde(default)]
    pub uvs: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(flatten)]
    pub flags: DisplayFlags,
}

fn default_scale() -> f64 { 1.0 }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryFragment {
    pub uuid: Uuid,
    #[serde(rename = "type")]
    pub kind: GeometryType,
    pub data: GeometryData,
}

impl GeometryFragment {
    fn new(data: GeometryData) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            kind: GeometryType::Geometry,
            data,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.data.vertices.len() / 3
    }

    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }
}

pub fn encode_mesh(mesh: &MeshInput) -> GeometryFragment {
    let vertices = mesh.vertices.iter().flat_map(|&p| remap_point(p)).collect();
    let normals = mesh.normals.iter().flat_map(|&n| remap_point(n)).collect();
    let uvs = mesh
        .uvs
        .iter()
        .flat_map(|uv| [round5(uv[0]), round5(uv[1])])
        .collect();

    let mut faces = Vec::with_capacity(mesh.faces.len() * 8);
    for face in &mesh.faces {
        for tri in face.triangles() {
            faces.push(FACE_TRIANGLE);
            faces.extend_from_slice(&tri);
        }
    }

    let colors = mesh
        .vertex_colors
        .as_deref()
        .and_then(|c| {
            let aligned = align_by_repeating_last(c, mesh.vertices.len());
            if aligned.is_none() {
                warn!(
                    vertices = mesh.vertices.len(),
                    "Vertex color list is empty, geometry emitted without colors"
                );
            }
            aligned
        })
        .map(|c| c.into_iter().map(hex_color).collect())
        .unwrap_or_default();

    GeometryFragment::new(GeometryData {
        vertices,
        faces,
        normals,
        uvs,
        colors,
        scale: 1.0,
        flags: mesh.flags,
    })
}

/// A line is a two-vertex geometry without faces
pub fn encode_line(line: &LineInput) -> GeometryFragment {
    let vertices = [line.start, line.end]
        .into_iter()
        .flat_map(remap_point)
        .collect();

    GeometryFragment::new(GeometryData {
        vertices,
        faces: vec![],
        normals: vec![],
        uvs: vec![],
        colors: vec![],
        scale: 1.0,
        flags: DisplayFlags::default(),
    })
}

/// Decode a face run back into triangles
pub fn decode_faces(faces: &[u32]) -> Result<Vec<[u32; 3]>, SceneError> {
    let mut out = Vec::with_capacity(faces.len() / 4);
    let mut rest = faces;
    while let Some((&flag, tail)) = rest.split_first() {
        if flag != FACE_TRIANGLE {
            return Err(SceneError::Validation(format!(
                "unsupported face type flag {}",
                flag
            )));
        }
        match tail {
            [a, b, c, remaining @ ..] => {
                out.push([*a, *b, *c]);
                rest = remaining;
            }
            _ => {
                return Err(SceneError::Validation(
                    "truncated face run".to_string(),
                ))
            }
        }
    }
    Ok(out)
}
