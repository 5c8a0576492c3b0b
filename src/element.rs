//! Elements - The Compiler's Input Unit
//!
//! An element pairs one geometry fragment with one material fragment,
//! plus optional layer and attribute metadata. Fragments travel as JSON
//! text so host components stay decoupled from the compiler.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::SceneError;
use crate::geometry::GeometryFragment;
use crate::material::{FaceColoring, MaterialFragment, MaterialKind};
use crate::view::ViewRecord;

/// Attribute key carrying the per-face palette indexes of a colored mesh
pub const FACE_COLOR_INDEXES_KEY: &str = "FaceColorIndexes";

pub const DEFAULT_LAYER: &str = "Default";

pub type Attributes = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Mesh,
    Line,
    Camera,
}

impl ElementKind {
    pub fn label(self) -> &'static str {
        match self {
            ElementKind::Mesh => "mesh",
            ElementKind::Line => "line",
            ElementKind::Camera => "camera",
        }
    }

    /// Mesh materials render meshes, line materials render lines
    pub fn accepts(self, material: MaterialKind) -> bool {
        match self {
            ElementKind::Mesh => !material.is_line(),
            ElementKind::Line => material.is_line(),
            ElementKind::Camera => false,
        }
    }
}

/// Flat, name-identified grouping tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for Layer {
    fn default() -> Self {
        Self::new(DEFAULT_LAYER)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub kind: ElementKind,
    pub geometry: String,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub layer: Option<Layer>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Element {
    pub fn mesh(geometry: &GeometryFragment, material: &MaterialFragment) -> Result<Self, SceneError> {
        Self::renderable(ElementKind::Mesh, geometry, material)
    }

    pub fn line(geometry: &GeometryFragment, material: &MaterialFragment) -> Result<Self, SceneError> {
        Self::renderable(ElementKind::Line, geometry, material)
    }

    /// Mesh element whose material is a per-face palette
    pub fn face_colored(geometry: &GeometryFragment, coloring: &FaceColoring) -> Result<Self, SceneError> {
        let mut element = Self::mesh(geometry, &coloring.material)?;
        element
            .attributes
            .insert(FACE_COLOR_INDEXES_KEY.to_string(), coloring.indexes_csv());
        Ok(element)
    }

    pub fn camera(view: &ViewRecord) -> Result<Self, SceneError> {
        Ok(Self {
            kind: ElementKind::Camera,
            geometry: view.to_json()?,
            material: None,
            layer: None,
            attributes: Attributes::new(),
        })
    }

    fn renderable(
        kind: ElementKind,
        geometry: &GeometryFragment,
        material: &MaterialFragment,
    ) -> Result<Self, SceneError> {
        check_material(kind, material.kind(), kind.label())?;
        Ok(Self {
            kind,
            geometry: geometry.to_json()?,
            material: Some(material.to_json()?),
            layer: None,
            attributes: Attributes::new(),
        })
    }

    pub fn on_layer(mut self, name: impl Into<String>) -> Self {
        self.layer = Some(Layer::new(name));
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn layer_name<'a>(&'a self, default: &'a str) -> &'a str {
        self.layer.as_ref().map_or(default, |l| l.name.as_str())
    }
}

pub fn check_material(kind: ElementKind, material: MaterialKind, element: &str) -> Result<(), SceneError> {
    if kind.accepts(material) {
        return Ok(());
    }
    Err(SceneError::TypeMismatch {
        element: element.to_string(),
        expected: kind.label().to_string(),
        found: material.type_name().to_string(),
    })
}

/// Zip parallel name/value lists into an attribute map
pub fn attributes_from_lists(names: &[String], values: &[String]) -> Result<Attributes, SceneError> {
    if names.len() != values.len() {
        return Err(SceneError::Validation(format!(
            "attribute names ({}) and values ({}) differ in length",
            names.len(),
            values.len()
        )));
    }

    let mut attributes = Attributes::new();
    for (name, value) in names.iter().zip(values) {
        if attributes.insert(name.clone(), value.clone()).is_some() {
            return Err(SceneError::Validation(format!("duplicate attribute name '{}'", name)));
        }
    }
    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::geometry::{encode_line, encode_mesh, LineInput, MeshInput};
    use crate::material::{encode_face_colors, LineBasicMaterial, PhongMaterial};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mesh_rejects_line_material() {
        let g = encode_mesh(&MeshInput::default());
        let m: MaterialFragment = LineBasicMaterial::new(Rgb::new(0, 0, 0), 1.0, 1.0).into();
        let err = Element::mesh(&g, &m).unwrap_err();
        assert!(matches!(err, SceneError::TypeMismatch { .. }));
    }

    #[test]
    fn test_line_rejects_mesh_material() {
        let g = encode_line(&LineInput { start: [0.0; 3], end: [1.0; 3] });
        let m: MaterialFragment = PhongMaterial::from_color(Rgb::new(0, 0, 0), 1.0).into();
        assert!(Element::line(&g, &m).is_err());
    }

    #[test]
    fn test_layer_defaults() {
        let g = encode_mesh(&MeshInput::default());
        let m: MaterialFragment = PhongMaterial::from_color(Rgb::new(1, 2, 3), 1.0).into();
        let e = Element::mesh(&g, &m).unwrap();
        assert_eq!(e.layer_name(DEFAULT_LAYER), "Default");
        assert_eq!(e.on_layer("Walls").layer_name(DEFAULT_LAYER), "Walls");
        assert_eq!(Layer::default().name, "Default");
    }

    #[test]
    fn test_face_colored_sets_index_attribute() {
        let g = encode_mesh(&MeshInput::default());
        let red = Rgb::new(255, 0, 0);
        let coloring = encode_face_colors(&[red, red, Rgb::new(0, 255, 0)], 3, 1.0).unwrap();
        let e = Element::face_colored(&g, &coloring).unwrap();
        assert_eq!(e.attributes[FACE_COLOR_INDEXES_KEY], "0,0,1");
    }

    #[test]
    fn test_attribute_lists() {
        let attrs = attributes_from_lists(&strings(&["Level", "Mark"]), &strings(&["2", "W-01"])).unwrap();
        assert_eq!(attrs["Mark"], "W-01");

        assert!(attributes_from_lists(&strings(&["a", "b"]), &strings(&["1"])).is_err());
        assert!(attributes_from_lists(&strings(&["a", "a"]), &strings(&["1", "2"])).is_err());
    }

    #[test]
    fn test_element_json_input() {
        let json = r#"{"kind":"camera","geometry":"{}"}"#;
        let e: Element = serde_json::from_str(json).unwrap();
        assert_eq!(e.kind, ElementKind::Camera);
        assert!(e.material.is_none());
        assert!(e.attributes.is_empty());
    }
}
