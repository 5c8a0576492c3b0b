//! Named Views
//!
//! A view is camera metadata, never a renderable node.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coords::remap_point;
use crate::error::SceneError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<[f64; 3]> for Point {
    fn from(p: [f64; 3]) -> Self {
        Self { x: p[0], y: p[1], z: p[2] }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRecord {
    pub uuid: Uuid,
    pub name: String,
    pub eye: Point,
    pub target: Point,
}

impl ViewRecord {
    /// Build from CAD-space eye and target, remapping both
    pub fn from_cad(name: impl Into<String>, eye: [f64; 3], target: [f64; 3]) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            eye: remap_point(eye).into(),
            target: remap_point(target).into(),
        }
    }

    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cad_remaps_eye_and_target() {
        let v = ViewRecord::from_cad("front", [10.0, 0.0, 0.0], [1.0, 2.0, 3.0]);
        assert_eq!(v.eye, Point { x: -10.0, y: 0.0, z: 0.0 });
        assert_eq!(v.target, Point { x: -1.0, y: 3.0, z: 2.0 });
    }

    #[test]
    fn test_json_uses_uppercase_axes() {
        let v = ViewRecord::from_cad("top", [0.0, 0.0, 5.0], [0.0, 0.0, 0.0]);
        let json: serde_json::Value = serde_json::from_str(&v.to_json().unwrap()).unwrap();
        assert_eq!(json["name"], "top");
        assert_eq!(json["eye"]["Y"], 5.0);
        assert!(json["eye"].get("y").is_none());
    }
}
