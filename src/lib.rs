//! SceneForge Core - Scene Graph Compiler
//!
//! # Data Flow (One Direction Only)
//! 1. Primitives are encoded into geometry and material fragments
//! 2. Fragments are paired into elements
//! 3. Elements are compiled into one scene document
//! 4. The document is persisted as text
//!
//! Nothing reads back from a compiled document.

pub mod align;
pub mod color;
pub mod compiler;
pub mod config;
pub mod coords;
pub mod element;
pub mod error;
pub mod geometry;
pub mod material;
pub mod output;
pub mod scene;
pub mod view;

pub use align::{align_by_repeating_last, ElementLists};
pub use color::{hex_color, Rgb};
pub use compiler::{CompileRequest, SceneCompiler};
pub use config::CompilerConfig;
pub use coords::{inverse_remap, remap_point};
pub use element::{attributes_from_lists, Element, ElementKind, Layer};
pub use error::{ErrorKind, SceneError};
pub use geometry::{encode_line, encode_mesh, Face, GeometryFragment, LineInput, MeshInput};
pub use material::{decode_material, encode_face_colors, MaterialFragment, MaterialInput, MaterialKind};
pub use output::{publish, OutputTarget, PublishOutcome};
pub use scene::{SceneDocument, SceneNode};
pub use view::ViewRecord;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
