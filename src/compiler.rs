//! Scene Compiler - Single Entry Point
//!
//! Elements in, one scene document out. Every element is decoded and
//! checked before the document is assembled, so a failure never leaves a
//! partial document behind.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::align::ElementLists;
use crate::config::CompilerConfig;
use crate::element::{check_material, Attributes, Element, ElementKind, Layer};
use crate::error::SceneError;
use crate::geometry::GeometryFragment;
use crate::material::{decode_material_as, peek_kind, MaterialFragment};
use crate::output::{publish, OutputTarget, PublishOutcome};
use crate::scene::{NodeKind, SceneDocument, SceneNode, RESERVED_USER_DATA_KEYS};
use crate::view::ViewRecord;

/// One compile snapshot. Elements may arrive directly, as host-side
/// parallel lists, or both; cameras may also ride in `elements`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub lists: ElementLists,
    #[serde(default)]
    pub cameras: Vec<Element>,
}

/// A mesh or line element after decoding
struct Renderable {
    kind: ElementKind,
    name: String,
    geometry: GeometryFragment,
    material: MaterialFragment,
    layer: Layer,
    attributes: Attributes,
}

/// Output arrays plus the geometry-to-material lookup
#[derive(Default)]
struct Assembly {
    geometries: Vec<GeometryFragment>,
    materials: Vec<MaterialFragment>,
    material_ids: HashSet<Uuid>,
    bindings: HashMap<Uuid, Uuid>,
    layers: Vec<Layer>,
}

impl Assembly {
    fn add(&mut self, item: &Renderable) -> Result<(), SceneError> {
        let geometry_id = item.geometry.uuid;
        let material_id = item.material.uuid();

        match self.bindings.get(&geometry_id) {
            Some(bound) if *bound != material_id => {
                return Err(SceneError::Validation(format!(
                    "{}: geometry {} is already bound to material {}",
                    item.name, geometry_id, bound
                )));
            }
            Some(_) => debug!(%geometry_id, "Geometry already present, reusing"),
            None => {
                self.bindings.insert(geometry_id, material_id);
                self.geometries.push(item.geometry.clone());
            }
        }

        if self.material_ids.insert(material_id) {
            self.materials.push(item.material.clone());
        } else {
            debug!(%material_id, "Material shared, emitted once");
        }

        if !self.layers.contains(&item.layer) {
            self.layers.push(item.layer.clone());
        }
        Ok(())
    }

    fn material_for(&self, item: &Renderable) -> Result<Uuid, SceneError> {
        self.bindings
            .get(&item.geometry.uuid)
            .copied()
            .ok_or_else(|| {
                SceneError::Validation(format!("{}: geometry has no bound material", item.name))
            })
    }
}

/// The scene compiler - single entry point for all compile operations
pub struct SceneCompiler {
    config: CompilerConfig,
}

impl SceneCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// Compile a request into a scene document
    pub fn compile(&self, request: &CompileRequest) -> Result<SceneDocument, SceneError> {
        let listed = request.lists.clone().into_elements()?;

        let mut meshes = Vec::new();
        let mut lines = Vec::new();
        let mut cameras = Vec::new();
        for element in request
            .elements
            .iter()
            .chain(listed.iter())
            .chain(request.cameras.iter())
        {
            match element.kind {
                ElementKind::Mesh => meshes.push(element),
                ElementKind::Line => lines.push(element),
                ElementKind::Camera => cameras.push(element),
            }
        }
        debug!(
            meshes = meshes.len(),
            lines = lines.len(),
            cameras = cameras.len(),
            "Partitioned elements"
        );

        if meshes.is_empty() && lines.is_empty() {
            return Err(SceneError::Validation(
                "scene needs at least one renderable element".to_string(),
            ));
        }

        let renderables = meshes
            .into_iter()
            .chain(lines)
            .enumerate()
            .map(|(i, element)| self.decode_renderable(i, element))
            .collect::<Result<Vec<_>, _>>()?;

        let views = cameras
            .into_iter()
            .map(decode_camera)
            .collect::<Result<Vec<_>, _>>()?;

        let mut assembly = Assembly::default();
        for item in &renderables {
            assembly.add(item)?;
        }

        let children = renderables
            .into_iter()
            .map(|item| -> Result<SceneNode, SceneError> {
                let material = assembly.material_for(&item)?;
                let kind = match item.kind {
                    ElementKind::Line => NodeKind::Line,
                    _ => NodeKind::Mesh,
                };
                Ok(SceneNode::leaf(
                    kind,
                    item.name,
                    item.geometry.uuid,
                    material,
                    item.attributes,
                    item.layer,
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cameras = (self.config.emit_cameras && !views.is_empty()).then(|| views.clone());

        Ok(SceneDocument {
            metadata: self.config.metadata(),
            geometries: assembly.geometries,
            materials: assembly.materials,
            cameras,
            object: SceneNode::scene(children, views),
            layers: assembly.layers,
        })
    }

    /// Compile host-side parallel lists plus camera elements
    pub fn compile_lists(
        &self,
        lists: ElementLists,
        cameras: Vec<Element>,
    ) -> Result<SceneDocument, SceneError> {
        self.compile(&CompileRequest {
            elements: vec![],
            lists,
            cameras,
        })
    }

    /// Compile, then hand the document to the persistence boundary
    pub fn compile_and_publish(
        &self,
        request: &CompileRequest,
        target: &OutputTarget,
    ) -> Result<PublishOutcome, SceneError> {
        let document = self.compile(request)?;
        publish(&document, target, self.config.pretty)
    }

    fn decode_renderable(&self, index: usize, element: &Element) -> Result<Renderable, SceneError> {
        let name = format!("{}{}", element.kind.label(), index);

        let material_json = element.material.as_deref().ok_or_else(|| {
            SceneError::Validation(format!("{} has no material", name))
        })?;
        let material_kind = peek_kind(material_json)?;
        check_material(element.kind, material_kind, &name)?;
        let material = decode_material_as(material_kind, material_json)?;

        let geometry = GeometryFragment::from_json(&element.geometry)?;

        if let Some(key) = RESERVED_USER_DATA_KEYS
            .iter()
            .find(|k| element.attributes.contains_key(**k))
        {
            return Err(SceneError::Validation(format!(
                "{}: attribute name '{}' is reserved",
                name, key
            )));
        }

        let layer = match &element.layer {
            Some(layer) if !layer.name.is_empty() => layer.clone(),
            _ => Layer::new(self.config.default_layer.clone()),
        };

        Ok(Renderable {
            kind: element.kind,
            name,
            geometry,
            material,
            layer,
            attributes: element.attributes.clone(),
        })
    }
}

impl Default for SceneCompiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

fn decode_camera(element: &Element) -> Result<ViewRecord, SceneError> {
    if element.material.is_some() || element.layer.is_some() {
        warn!("Camera element carries a material or layer; ignoring it");
    }
    ViewRecord::from_json(&element.geometry)
}
