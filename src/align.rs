//! Forgiving Iteration - Parallel List Alignment
//!
//! Hosts hand over geometry and material lists of independent length.
//! A short list is extended by repeating its last item; a long one is cut.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::element::{Element, ElementKind, Layer};
use crate::error::SceneError;

/// Align `items` to exactly `len` entries by repeating the last item.
///
/// Returns `None` when `items` is empty but `len` is not: there is nothing
/// to repeat.
pub fn align_by_repeating_last<T: Clone>(items: &[T], len: usize) -> Option<Vec<T>> {
    if len == 0 {
        return Some(vec![]);
    }
    let last = items.last()?;
    let mut out: Vec<T> = items.iter().take(len).cloned().collect();
    out.resize(len, last.clone());
    Some(out)
}

/// Parallel lists as a host component collects them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementLists {
    #[serde(default)]
    pub meshes: Vec<String>,
    #[serde(default)]
    pub mesh_materials: Vec<String>,
    #[serde(default)]
    pub mesh_layers: Vec<String>,
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(default)]
    pub line_materials: Vec<String>,
    #[serde(default)]
    pub line_layers: Vec<String>,
}

impl ElementLists {
    /// Pair every geometry with a material (and optional layer) of its partition
    pub fn into_elements(self) -> Result<Vec<Element>, SceneError> {
        let mut elements = pair_partition(
            ElementKind::Mesh,
            self.meshes,
            &self.mesh_materials,
            &self.mesh_layers,
        )?;
        elements.extend(pair_partition(
            ElementKind::Line,
            self.lines,
            &self.line_materials,
            &self.line_layers,
        )?);
        Ok(elements)
    }
}

fn pair_partition(
    kind: ElementKind,
    geometries: Vec<String>,
    materials: &[String],
    layers: &[String],
) -> Result<Vec<Element>, SceneError> {
    if geometries.is_empty() {
        return Ok(vec![]);
    }

    if materials.len() > geometries.len() {
        warn!(
            partition = kind.label(),
            geometries = geometries.len(),
            materials = materials.len(),
            "Dropping surplus materials"
        );
    } else if materials.len() < geometries.len() && !materials.is_empty() {
        warn!(
            partition = kind.label(),
            reused = geometries.len() - materials.len(),
            "Reusing last material for remaining geometries"
        );
    }

    let materials = align_by_repeating_last(materials, geometries.len()).ok_or_else(|| {
        SceneError::Validation(format!(
            "at least one {} material is required to create {}s",
            kind.label(),
            kind.label()
        ))
    })?;
    let layers = align_by_repeating_last(layers, geometries.len())
        .unwrap_or_else(|| vec![String::new(); geometries.len()]);

    Ok(geometries
        .into_iter()
        .zip(materials)
        .zip(layers)
        .map(|((geometry, material), layer)| Element {
            kind,
            geometry,
            material: Some(material),
            layer: (!layer.is_empty()).then(|| Layer::new(layer)),
            attributes: Default::default(),
        })
        .collect())
}
