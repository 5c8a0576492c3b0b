//! Scene Document Model
//!
//! Nodes reference geometries and materials by uuid; the renderer resolves
//! them against the top-level arrays at load time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::element::{Attributes, Layer};
use crate::error::SceneError;
use crate::geometry::GeometryFragment;
use crate::material::MaterialFragment;
use crate::view::ViewRecord;

/// Row-major 4x4 identity
pub const IDENTITY_MATRIX: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub version: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub generator: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Scene,
    Mesh,
    Line,
}

/// Per-node user data: authoring attributes inline, plus layer membership
/// on children and named views on the root
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(flatten)]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layer: Vec<Layer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub views: Vec<ViewRecord>,
}

/// Keys `UserData` owns; attributes may not shadow them
pub const RESERVED_USER_DATA_KEYS: [&str; 2] = ["layer", "views"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<Uuid>,
    pub matrix: [f64; 16],
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneNode>,
    #[serde(default, rename = "userData")]
    pub user_data: UserData,
}

impl SceneNode {
    pub fn scene(children: Vec<SceneNode>, views: Vec<ViewRecord>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: None,
            kind: NodeKind::Scene,
            geometry: None,
            material: None,
            matrix: IDENTITY_MATRIX,
            children,
            user_data: UserData {
                views,
                ..Default::default()
            },
        }
    }

    pub fn leaf(
        kind: NodeKind,
        name: String,
        geometry: Uuid,
        material: Uuid,
        attributes: Attributes,
        layer: Layer,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: Some(name),
            kind,
            geometry: Some(geometry),
            material: Some(material),
            matrix: IDENTITY_MATRIX,
            children: vec![],
            user_data: UserData {
                attributes,
                layer: vec![layer],
                views: vec![],
            },
        }
    }
}

/// Key order on the wire: metadata, geometries, materials, cameras, object, layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub metadata: Metadata,
    pub geometries: Vec<GeometryFragment>,
    pub materials: Vec<MaterialFragment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cameras: Option<Vec<ViewRecord>>,
    pub object: SceneNode,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl SceneDocument {
    pub fn to_json(&self, pretty: bool) -> Result<String, SceneError> {
        let text = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(text)
    }

    pub fn views(&self) -> &[ViewRecord] {
        &self.object.user_data.views
    }

    pub fn geometry(&self, uuid: Uuid) -> Option<&GeometryFragment> {
        self.geometries.iter().find(|g| g.uuid == uuid)
    }

    pub fn material(&self, uuid: Uuid) -> Option<&MaterialFragment> {
        self.materials.iter().find(|m| m.uuid() == uuid)
    }
}
