//! Contract Invariant Tests
//!
//! These tests verify the guarantees consumers of the scene document rely on.

use approx::assert_abs_diff_eq;
use serde_json::Value;

use sceneforge_core::{
    color::Rgb,
    geometry::{decode_faces, encode_line, encode_mesh, Face, LineInput, MeshInput},
    inverse_remap,
    material::{encode_face_colors, BasicMaterial, LineBasicMaterial, MaterialFragment, PhongMaterial},
    scene::NodeKind,
    CompileRequest, CompilerConfig, Element, ErrorKind, OutputTarget, SceneCompiler, ViewRecord,
};

fn quad_mesh() -> MeshInput {
    MeshInput {
        vertices: vec![
            [0.0, 0.0, 0.0],
            [4.0, 0.0, 0.0],
            [4.0, 0.0, 3.0],
            [0.0, 0.0, 3.0],
        ],
        faces: vec![Face::Quad([0, 1, 2, 3])],
        ..Default::default()
    }
}

fn walls_request() -> CompileRequest {
    let material: MaterialFragment = PhongMaterial::from_color(Rgb::new(180, 180, 170), 1.0).into();
    let mesh = Element::mesh(&encode_mesh(&quad_mesh()), &material)
        .unwrap()
        .on_layer("Walls");
    let camera = Element::camera(&ViewRecord::from_cad("front", [10.0, 0.0, 0.0], [0.0, 0.0, 0.0])).unwrap();

    CompileRequest {
        elements: vec![mesh],
        cameras: vec![camera],
        ..Default::default()
    }
}

#[test]
fn invariant_end_to_end_walls_scene() {
    let doc = SceneCompiler::default().compile(&walls_request()).unwrap();
    let v: Value = serde_json::from_str(&doc.to_json(true).unwrap()).unwrap();

    assert_eq!(v["geometries"].as_array().unwrap().len(), 1);
    assert_eq!(v["materials"].as_array().unwrap().len(), 1);

    let children = v["object"]["children"].as_array().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0]["type"], "Mesh");
    assert_eq!(children[0]["userData"]["layer"][0]["name"], "Walls");

    let views = v["object"]["userData"]["views"].as_array().unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0]["eye"]["X"], -10.0);
    assert_eq!(views[0]["eye"]["Y"], 0.0);
    assert_eq!(views[0]["eye"]["Z"], 0.0);
}

#[test]
fn invariant_document_key_order() {
    let doc = SceneCompiler::default().compile(&walls_request()).unwrap();
    let text = doc.to_json(false).unwrap();

    let keys = ["\"metadata\"", "\"geometries\"", "\"materials\"", "\"cameras\"", "\"object\"", "\"layers\""];
    let positions: Vec<usize> = keys.iter().map(|k| text.find(k).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(text.starts_with("{\"metadata\""));
}

#[test]
fn invariant_metadata_block() {
    let doc = SceneCompiler::default().compile(&walls_request()).unwrap();
    assert_eq!(doc.metadata.version, 4.3);
    assert_eq!(doc.metadata.kind, "Object");
    assert_eq!(doc.object.kind, NodeKind::Scene);
}

#[test]
fn invariant_children_exclude_cameras() {
    let material: MaterialFragment = BasicMaterial::new(Rgb::new(1, 2, 3), 1.0).into();
    let line = Element::line(
        &encode_line(&LineInput { start: [0.0; 3], end: [1.0, 1.0, 1.0] }),
        &LineBasicMaterial::new(Rgb::new(0, 0, 0), 1.0, 1.0).into(),
    )
    .unwrap();

    let mut elements = vec![
        Element::mesh(&encode_mesh(&quad_mesh()), &material).unwrap(),
        Element::mesh(&encode_mesh(&quad_mesh()), &material).unwrap(),
        line,
    ];
    for i in 0..3 {
        let view = ViewRecord::from_cad(format!("v{}", i), [i as f64, 1.0, 1.0], [0.0; 3]);
        elements.push(Element::camera(&view).unwrap());
    }

    let doc = SceneCompiler::default()
        .compile(&CompileRequest { elements, ..Default::default() })
        .unwrap();

    assert_eq!(doc.object.children.len(), 3);
    assert!(doc.object.children.iter().all(|c| c.kind != NodeKind::Scene));
    assert_eq!(doc.views().len(), 3);
}

#[test]
fn invariant_missing_material_produces_no_document() {
    let mut mesh = Element::mesh(
        &encode_mesh(&quad_mesh()),
        &PhongMaterial::from_color(Rgb::new(0, 0, 0), 1.0).into(),
    )
    .unwrap();
    mesh.material = None;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");
    let result = SceneCompiler::default().compile_and_publish(
        &CompileRequest { elements: vec![mesh], ..Default::default() },
        &OutputTarget { commit: true, path: path.clone() },
    );

    let err = result.unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Validation | ErrorKind::TypeMismatch));
    assert!(!path.exists());
}

#[test]
fn invariant_line_material_on_mesh_is_fatal() {
    let mut mesh = Element::mesh(
        &encode_mesh(&quad_mesh()),
        &PhongMaterial::from_color(Rgb::new(0, 0, 0), 1.0).into(),
    )
    .unwrap();
    let line_material: MaterialFragment = LineBasicMaterial::new(Rgb::new(0, 0, 0), 1.0, 1.0).into();
    mesh.material = Some(line_material.to_json().unwrap());

    let err = SceneCompiler::default()
        .compile(&CompileRequest { elements: vec![mesh], ..Default::default() })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn invariant_empty_scene_rejected() {
    let camera = Element::camera(&ViewRecord::from_cad("only", [1.0; 3], [0.0; 3])).unwrap();
    let err = SceneCompiler::default()
        .compile(&CompileRequest { cameras: vec![camera], ..Default::default() })
        .unwrap_err();
    assert!(err.to_string().contains("at least one renderable element"));
}

#[test]
fn invariant_emitted_opacity_in_range() {
    for input in [1.5, -0.2] {
        let material: MaterialFragment = BasicMaterial::new(Rgb::new(9, 9, 9), input).into();
        let doc = SceneCompiler::default()
            .compile(&CompileRequest {
                elements: vec![Element::mesh(&encode_mesh(&quad_mesh()), &material).unwrap()],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(doc.materials[0].opacity(), 1.0);
    }
}

#[test]
fn invariant_face_round_trip_and_vertex_length() {
    let mesh = MeshInput {
        vertices: vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.5, 0.5, 1.0],
        ],
        faces: vec![Face::Quad([0, 1, 2, 3]), Face::Tri([0, 1, 4]), Face::Tri([2, 3, 4])],
        ..Default::default()
    };
    let g = encode_mesh(&mesh);
    assert_eq!(g.data.vertices.len(), 3 * mesh.vertices.len());

    let expected: Vec<[u32; 3]> = mesh.faces.iter().flat_map(|f| f.triangles()).collect();
    assert_eq!(decode_faces(&g.data.faces).unwrap(), expected);
    assert_eq!(expected[..2], [[0, 1, 2], [0, 2, 3]]);
}

#[test]
fn invariant_inverse_remap_recovers_vertices() {
    let mesh = MeshInput {
        vertices: vec![[1.234_567_89, -9.876_543_21, 0.000_004], [-1e3, 2e-6, 42.0]],
        faces: vec![],
        ..Default::default()
    };
    let g = encode_mesh(&mesh);
    for (i, original) in mesh.vertices.iter().enumerate() {
        let v = &g.data.vertices[i * 3..i * 3 + 3];
        let back = inverse_remap([v[0], v[1], v[2]]);
        for axis in 0..3 {
            assert_abs_diff_eq!(back[axis], original[axis], epsilon = 1e-5);
        }
    }
}

#[test]
fn invariant_face_palette_two_colors() {
    let red = Rgb::new(255, 0, 0);
    let green = Rgb::new(0, 255, 0);
    let faces = 9;
    let colors: Vec<Rgb> = (0..faces).map(|i| if i % 3 == 0 { green } else { red }).collect();

    let coloring = encode_face_colors(&colors, faces, 1.0).unwrap();
    let element = Element::face_colored(&encode_mesh(&quad_mesh()), &coloring).unwrap();
    let doc = SceneCompiler::default()
        .compile(&CompileRequest { elements: vec![element], ..Default::default() })
        .unwrap();

    let v = serde_json::to_value(&doc.materials[0]).unwrap();
    assert_eq!(v["type"], "MeshFaceMaterial");
    assert_eq!(v["materials"].as_array().unwrap().len(), 2);
    assert_eq!(v["materials"][0]["color"], "0x00FF00");
    for entry in v["materials"].as_array().unwrap() {
        assert_eq!(entry["type"], "MeshBasicMaterial");
    }

    let csv = doc.object.children[0].user_data.attributes["FaceColorIndexes"].clone();
    let indexes: Vec<usize> = csv.split(',').map(|s| s.parse().unwrap()).collect();
    assert_eq!(indexes.len(), faces);
    assert_eq!(indexes[0], 0);
    assert!(indexes.iter().all(|&i| i < 2));
}

#[test]
fn invariant_commit_writes_same_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");
    let compiler = SceneCompiler::new(CompilerConfig { pretty: false, ..Default::default() });

    let outcome = compiler
        .compile_and_publish(&walls_request(), &OutputTarget { commit: true, path: path.clone() })
        .unwrap();

    assert_eq!(outcome.written.as_deref(), Some(path.as_path()));
    assert!(outcome.status.contains("written successfully"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), outcome.json);
    assert!(outcome.json.contains("\"object\":"));
}

#[test]
fn invariant_no_commit_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");
    let outcome = SceneCompiler::default()
        .compile_and_publish(&walls_request(), &OutputTarget { commit: false, path: path.clone() })
        .unwrap();

    assert!(outcome.written.is_none());
    assert!(!outcome.json.is_empty());
    assert!(!path.exists());
}

#[test]
fn invariant_unwritable_destination_is_io() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.txt");
    let err = SceneCompiler::default()
        .compile_and_publish(&walls_request(), &OutputTarget { commit: true, path })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(err.exit_code(), 2);
}
