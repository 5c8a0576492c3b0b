//! Material Encoder - Shading Descriptions to Material Fragments
//!
//! The `type` field is the discriminator the compiler dispatches on.
//! Numeric constants (`side`, `shading`, `vertexColors`) are the renderer's
//! wire values and must not be renumbered.

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::align::align_by_repeating_last;
use crate::color::{hex_color, Rgb, BLACK, GRAY};
use crate::error::SceneError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    Basic,
    Phong,
    Lambert,
    FaceIndexed,
    LineBasic,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 5] = [
        MaterialKind::Basic,
        MaterialKind::Phong,
        MaterialKind::Lambert,
        MaterialKind::FaceIndexed,
        MaterialKind::LineBasic,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            MaterialKind::Basic => "MeshBasicMaterial",
            MaterialKind::Phong => "MeshPhongMaterial",
            MaterialKind::Lambert => "MeshLambertMaterial",
            MaterialKind::FaceIndexed => "MeshFaceMaterial",
            MaterialKind::LineBasic => "LineBasicMaterial",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_name() == name)
    }

    pub fn is_line(self) -> bool {
        matches!(self, MaterialKind::LineBasic)
    }
}

macro_rules! wire_enum {
    ($name:ident, $label:literal { $($variant:ident = $value:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(into = "u8", try_from = "u8")]
        pub enum $name {
            $($variant),+
        }

        impl From<$name> for u8 {
            fn from(v: $name) -> u8 {
                match v {
                    $($name::$variant => $value),+
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = String;

            fn try_from(v: u8) -> Result<Self, Self::Error> {
                match v {
                    $($value => Ok($name::$variant),)+
                    other => Err(format!("invalid {} value {}", $label, other)),
                }
            }
        }
    };
}

wire_enum!(Side, "side" { Front = 0, Back = 1, Double = 2 });
wire_enum!(Shading, "shading" { Faceted = 1, Smooth = 2 });
wire_enum!(VertexColors, "vertexColors" { NoColors = 0, Face = 1, Vertex = 2 });

impl Default for Side {
    fn default() -> Self {
        Side::Double
    }
}

impl Default for VertexColors {
    fn default() -> Self {
        VertexColors::NoColors
    }
}

impl Shading {
    pub fn from_smooth(smooth: bool) -> Self {
        if smooth {
            Shading::Smooth
        } else {
            Shading::Faceted
        }
    }
}

fn default_opacity() -> f64 { 1.0 }
fn default_shininess() -> f64 { 50.0 }
fn default_linewidth() -> f64 { 1.0 }
fn default_true() -> bool { true }

fn is_false(v: &bool) -> bool { !*v }

fn no_vertex_colors(v: &VertexColors) -> bool {
    *v == VertexColors::NoColors
}

/// Clamp out-of-range opacity back to fully opaque
pub fn sanitize_opacity(opacity: f64, material: &str) -> f64 {
    if (0.0..=1.0).contains(&opacity) {
        opacity
    } else {
        warn!(opacity, material, "Opacity must be between 0 and 1, defaulting to 1");
        1.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicMaterial {
    pub uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub color: String,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub transparent: bool,
    #[serde(default)]
    pub side: Side,
    #[serde(default)]
    pub wireframe: bool,
    #[serde(default, skip_serializing_if = "no_vertex_colors")]
    pub vertex_colors: VertexColors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhongMaterial {
    pub uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub color: String,
    pub ambient: String,
    pub emissive: String,
    pub specular: String,
    #[serde(default = "default_shininess")]
    pub shininess: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub transparent: bool,
    #[serde(default)]
    pub side: Side,
    #[serde(default)]
    pub wireframe: bool,
    #[serde(default, skip_serializing_if = "no_vertex_colors")]
    pub vertex_colors: VertexColors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LambertMaterial {
    pub uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub color: String,
    pub ambient: String,
    pub emissive: String,
    pub shading: Shading,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub transparent: bool,
    #[serde(default)]
    pub side: Side,
    #[serde(default)]
    pub wireframe: bool,
    #[serde(default, skip_serializing_if = "no_vertex_colors")]
    pub vertex_colors: VertexColors,
}

/// One Basic material per face group; faces pick theirs by index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceIndexedMaterial {
    pub uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(with = "basic_entries")]
    pub materials: Vec<BasicMaterial>,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub transparent: bool,
}

/// Palette entries are full fragments on the wire, so each carries its
/// `type`. Only Basic entries are accepted back.
mod basic_entries {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::BasicMaterial;

    #[derive(Serialize)]
    #[serde(tag = "type")]
    enum Tagged<'a> {
        #[serde(rename = "MeshBasicMaterial")]
        Basic(&'a BasicMaterial),
    }

    #[derive(Deserialize)]
    #[serde(tag = "type")]
    enum Owned {
        #[serde(rename = "MeshBasicMaterial")]
        Basic(BasicMaterial),
    }

    pub fn serialize<S: Serializer>(materials: &[BasicMaterial], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(materials.iter().map(Tagged::Basic))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<BasicMaterial>, D::Error> {
        let entries = Vec::<Owned>::deserialize(d)?;
        Ok(entries.into_iter().map(|Owned::Basic(m)| m).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineBasicMaterial {
    pub uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub color: String,
    #[serde(default = "default_linewidth")]
    pub linewidth: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub transparent: bool,
}

impl BasicMaterial {
    pub fn new(color: Rgb, opacity: f64) -> Self {
        let opacity = sanitize_opacity(opacity, MaterialKind::Basic.type_name());
        Self {
            uuid: Uuid::new_v4(),
            name: None,
            color: hex_color(color),
            opacity,
            transparent: opacity < 1.0,
            side: Side::Double,
            wireframe: false,
            vertex_colors: VertexColors::NoColors,
        }
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }
}

impl PhongMaterial {
    /// Ambient follows the base color; black emissive, gray specular, shininess 50
    pub fn from_color(color: Rgb, opacity: f64) -> Self {
        Self::new(color, color, BLACK, GRAY, default_shininess(), opacity)
    }

    pub fn new(
        color: Rgb,
        ambient: Rgb,
        emissive: Rgb,
        specular: Rgb,
        shininess: f64,
        opacity: f64,
    ) -> Self {
        let opacity = sanitize_opacity(opacity, MaterialKind::Phong.type_name());
        Self {
            uuid: Uuid::new_v4(),
            name: None,
            color: hex_color(color),
            ambient: hex_color(ambient),
            emissive: hex_color(emissive),
            specular: hex_color(specular),
            shininess,
            opacity,
            transparent: opacity < 1.0,
            side: Side::Double,
            wireframe: false,
            vertex_colors: VertexColors::NoColors,
        }
    }
}

impl LambertMaterial {
    pub fn new(color: Rgb, ambient: Rgb, emissive: Rgb, smooth: bool, opacity: f64) -> Self {
        let opacity = sanitize_opacity(opacity, MaterialKind::Lambert.type_name());
        Self {
            uuid: Uuid::new_v4(),
            name: None,
            color: hex_color(color),
            ambient: hex_color(ambient),
            emissive: hex_color(emissive),
            shading: Shading::from_smooth(smooth),
            opacity,
            transparent: opacity < 1.0,
            side: Side::Double,
            wireframe: false,
            vertex_colors: VertexColors::NoColors,
        }
    }
}

impl LineBasicMaterial {
    pub fn new(color: Rgb, linewidth: f64, opacity: f64) -> Self {
        let opacity = sanitize_opacity(opacity, MaterialKind::LineBasic.type_name());
        Self {
            uuid: Uuid::new_v4(),
            name: None,
            color: hex_color(color),
            linewidth,
            opacity,
            transparent: opacity < 1.0,
        }
    }
}

/// Basic material that takes its color from the geometry's `colors` array
pub fn vertex_colored_material(opacity: f64) -> MaterialFragment {
    let mut m = BasicMaterial::new(crate::color::WHITE, opacity);
    m.vertex_colors = VertexColors::Vertex;
    MaterialFragment::Basic(m)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MaterialFragment {
    #[serde(rename = "MeshBasicMaterial")]
    Basic(BasicMaterial),
    #[serde(rename = "MeshPhongMaterial")]
    Phong(PhongMaterial),
    #[serde(rename = "MeshLambertMaterial")]
    Lambert(LambertMaterial),
    #[serde(rename = "MeshFaceMaterial")]
    FaceIndexed(FaceIndexedMaterial),
    #[serde(rename = "LineBasicMaterial")]
    LineBasic(LineBasicMaterial),
}

impl MaterialFragment {
    pub fn kind(&self) -> MaterialKind {
        match self {
            MaterialFragment::Basic(_) => MaterialKind::Basic,
            MaterialFragment::Phong(_) => MaterialKind::Phong,
            MaterialFragment::Lambert(_) => MaterialKind::Lambert,
            MaterialFragment::FaceIndexed(_) => MaterialKind::FaceIndexed,
            MaterialFragment::LineBasic(_) => MaterialKind::LineBasic,
        }
    }

    pub fn uuid(&self) -> Uuid {
        match self {
            MaterialFragment::Basic(m) => m.uuid,
            MaterialFragment::Phong(m) => m.uuid,
            MaterialFragment::Lambert(m) => m.uuid,
            MaterialFragment::FaceIndexed(m) => m.uuid,
            MaterialFragment::LineBasic(m) => m.uuid,
        }
    }

    pub fn opacity(&self) -> f64 {
        match self {
            MaterialFragment::Basic(m) => m.opacity,
            MaterialFragment::Phong(m) => m.opacity,
            MaterialFragment::Lambert(m) => m.opacity,
            MaterialFragment::FaceIndexed(m) => m.opacity,
            MaterialFragment::LineBasic(m) => m.opacity,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let slot = match &mut self {
            MaterialFragment::Basic(m) => &mut m.name,
            MaterialFragment::Phong(m) => &mut m.name,
            MaterialFragment::Lambert(m) => &mut m.name,
            MaterialFragment::FaceIndexed(m) => &mut m.name,
            MaterialFragment::LineBasic(m) => &mut m.name,
        };
        *slot = Some(name.into());
        self
    }

    fn opacity_fields(&mut self) -> (&mut f64, &mut bool) {
        match self {
            MaterialFragment::Basic(m) => (&mut m.opacity, &mut m.transparent),
            MaterialFragment::Phong(m) => (&mut m.opacity, &mut m.transparent),
            MaterialFragment::Lambert(m) => (&mut m.opacity, &mut m.transparent),
            MaterialFragment::FaceIndexed(m) => (&mut m.opacity, &mut m.transparent),
            MaterialFragment::LineBasic(m) => (&mut m.opacity, &mut m.transparent),
        }
    }

    /// Re-establish the opacity invariant on a decoded fragment
    pub fn sanitize(&mut self) {
        let label = self.kind().type_name();
        if let MaterialFragment::FaceIndexed(m) = self {
            for sub in &mut m.materials {
                sub.opacity = sanitize_opacity(sub.opacity, MaterialKind::Basic.type_name());
                sub.transparent = sub.opacity < 1.0;
            }
        }
        let (opacity, transparent) = self.opacity_fields();
        *opacity = sanitize_opacity(*opacity, label);
        *transparent = *opacity < 1.0;
    }

    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<BasicMaterial> for MaterialFragment {
    fn from(m: BasicMaterial) -> Self {
        MaterialFragment::Basic(m)
    }
}

impl From<PhongMaterial> for MaterialFragment {
    fn from(m: PhongMaterial) -> Self {
        MaterialFragment::Phong(m)
    }
}

impl From<LambertMaterial> for MaterialFragment {
    fn from(m: LambertMaterial) -> Self {
        MaterialFragment::Lambert(m)
    }
}

impl From<LineBasicMaterial> for MaterialFragment {
    fn from(m: LineBasicMaterial) -> Self {
        MaterialFragment::LineBasic(m)
    }
}

#[derive(Deserialize)]
struct Discriminator {
    #[serde(rename = "type")]
    kind: String,
}

/// Read only the `type` field of a material fragment
pub fn peek_kind(json: &str) -> Result<MaterialKind, SceneError> {
    let d: Discriminator = serde_json::from_str(json)?;
    MaterialKind::from_type_name(&d.kind).ok_or_else(|| SceneError::TypeMismatch {
        element: "material".to_string(),
        expected: "a recognized".to_string(),
        found: d.kind,
    })
}

/// Peek the discriminator, then decode through the matching typed path
pub fn decode_material(json: &str) -> Result<MaterialFragment, SceneError> {
    decode_material_as(peek_kind(json)?, json)
}

/// Typed decode for an already-peeked kind; opacity is re-sanitized
pub fn decode_material_as(kind: MaterialKind, json: &str) -> Result<MaterialFragment, SceneError> {
    let mut material = match kind {
        MaterialKind::Basic => MaterialFragment::Basic(serde_json::from_str(json)?),
        MaterialKind::Phong => MaterialFragment::Phong(serde_json::from_str(json)?),
        MaterialKind::Lambert => MaterialFragment::Lambert(serde_json::from_str(json)?),
        MaterialKind::FaceIndexed => MaterialFragment::FaceIndexed(serde_json::from_str(json)?),
        MaterialKind::LineBasic => MaterialFragment::LineBasic(serde_json::from_str(json)?),
    };
    material.sanitize();
    Ok(material)
}

/// Host-facing shading description
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MaterialInput {
    Basic {
        color: Rgb,
        #[serde(default = "default_opacity")]
        opacity: f64,
        #[serde(default)]
        side: Side,
    },
    Phong {
        color: Rgb,
        #[serde(default)]
        ambient: Option<Rgb>,
        #[serde(default)]
        emissive: Option<Rgb>,
        #[serde(default)]
        specular: Option<Rgb>,
        #[serde(default = "default_shininess")]
        shininess: f64,
        #[serde(default = "default_opacity")]
        opacity: f64,
    },
    Lambert {
        color: Rgb,
        #[serde(default)]
        ambient: Option<Rgb>,
        #[serde(default)]
        emissive: Option<Rgb>,
        #[serde(default = "default_true")]
        smooth: bool,
        #[serde(default = "default_opacity")]
        opacity: f64,
    },
    LineBasic {
        color: Rgb,
        #[serde(default = "default_linewidth")]
        linewidth: f64,
        #[serde(default = "default_opacity")]
        opacity: f64,
    },
}

impl MaterialInput {
    pub fn encode(&self) -> MaterialFragment {
        match *self {
            MaterialInput::Basic { color, opacity, side } => {
                BasicMaterial::new(color, opacity).with_side(side).into()
            }
            MaterialInput::Phong {
                color,
                ambient,
                emissive,
                specular,
                shininess,
                opacity,
            } => PhongMaterial::new(
                color,
                ambient.unwrap_or(color),
                emissive.unwrap_or(BLACK),
                specular.unwrap_or(GRAY),
                shininess,
                opacity,
            )
            .into(),
            MaterialInput::Lambert {
                color,
                ambient,
                emissive,
                smooth,
                opacity,
            } => LambertMaterial::new(
                color,
                ambient.unwrap_or(color),
                emissive.unwrap_or(BLACK),
                smooth,
                opacity,
            )
            .into(),
            MaterialInput::LineBasic {
                color,
                linewidth,
                opacity,
            } => LineBasicMaterial::new(color, linewidth, opacity).into(),
        }
    }
}

/// Per-face palette material plus the face-to-palette index list
#[derive(Debug, Clone, PartialEq)]
pub struct FaceColoring {
    pub material: MaterialFragment,
    pub indexes: Vec<usize>,
}

impl FaceColoring {
    /// Comma-separated indexes, stored under the element's `FaceColorIndexes` attribute
    pub fn indexes_csv(&self) -> String {
        self.indexes
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Deduplicate one-color-per-face into a minimal palette.
///
/// The first color seen takes index 0. A colors list shorter than the
/// face list repeats its last color.
pub fn encode_face_colors(
    colors: &[Rgb],
    face_count: usize,
    opacity: f64,
) -> Result<FaceColoring, SceneError> {
    let colors = align_by_repeating_last(colors, face_count).ok_or_else(|| {
        SceneError::Validation("per-face coloring needs at least one color".to_string())
    })?;
    let opacity = sanitize_opacity(opacity, MaterialKind::FaceIndexed.type_name());

    let mut palette: Vec<Rgb> = Vec::new();
    let indexes = colors
        .iter()
        .map(|c| match palette.iter().position(|p| p == c) {
            Some(i) => i,
            None => {
                palette.push(*c);
                palette.len() - 1
            }
        })
        .collect();

    let materials = palette
        .into_iter()
        .map(|c| BasicMaterial::new(c, opacity))
        .collect();

    Ok(FaceColoring {
        material: MaterialFragment::FaceIndexed(FaceIndexedMaterial {
            uuid: Uuid::new_v4(),
            name: None,
            materials,
            opacity,
            transparent: opacity < 1.0,
        }),
        indexes,
    })
}
