//! SceneForge CLI - Bridge interface for CAD hosts
//!
//! Commands: compile, check, mesh, material, view
//! Outputs JSON to stdout, logs to stderr
//! Exit codes: 0 success, 1 validation failure, 2 I/O failure

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use sceneforge_core::{
    encode_mesh, CompileRequest, CompilerConfig, Element, MaterialInput, MeshInput, OutputTarget,
    SceneCompiler, SceneError, ViewRecord, ENGINE_VERSION,
};

#[derive(Parser)]
#[command(name = "sceneforge-cli")]
#[command(about = "SceneForge CLI - Scene Graph Compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a compiler config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a request and write the scene document
    Compile {
        /// Compile request file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Destination .json or .js file
        #[arg(short, long)]
        output: PathBuf,

        /// Actually write to disk
        #[arg(long)]
        commit: bool,
    },

    /// Compile in memory and report counts
    Check {
        /// Compile request file (JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Encode a mesh into a mesh element
    Mesh {
        /// JSON payload (MeshInput)
        #[arg(short, long)]
        payload: String,

        /// JSON payload (MaterialInput)
        #[arg(short, long)]
        material: String,

        /// Layer name
        #[arg(short, long)]
        layer: Option<String>,
    },

    /// Encode a material fragment
    Material {
        /// JSON payload (MaterialInput)
        #[arg(short, long)]
        payload: String,
    },

    /// Encode a named view into a camera element
    View {
        #[arg(short, long)]
        name: String,

        /// Eye position x,y,z in CAD coordinates
        #[arg(long, value_delimiter = ',', num_args = 3, allow_hyphen_values = true)]
        eye: Vec<f64>,

        /// Target position x,y,z in CAD coordinates
        #[arg(long, value_delimiter = ',', num_args = 3, allow_hyphen_values = true)]
        target: Vec<f64>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match CompilerConfig::load_from_file(path) {
            Ok(c) => c,
            Err(e) => return fail(&e),
        },
        None => CompilerConfig::default(),
    };

    match run(cli.command, config) {
        Ok(output) => {
            println!("{:#}", output);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn fail(e: &SceneError) -> ExitCode {
    println!("{}", json!({ "success": false, "error": e.to_string() }));
    ExitCode::from(e.exit_code())
}

fn run(command: Commands, config: CompilerConfig) -> Result<Value, SceneError> {
    match command {
        Commands::Compile { input, output, commit } => {
            let request = read_request(&input)?;
            let compiler = SceneCompiler::new(config);
            let outcome = compiler.compile_and_publish(&request, &OutputTarget { commit, path: output })?;
            Ok(json!({
                "success": true,
                "engineVersion": ENGINE_VERSION,
                "status": outcome.status,
                "written": outcome.written,
            }))
        }

        Commands::Check { input } => {
            let request = read_request(&input)?;
            let document = SceneCompiler::new(config).compile(&request)?;
            Ok(json!({
                "success": true,
                "geometries": document.geometries.len(),
                "materials": document.materials.len(),
                "children": document.object.children.len(),
                "views": document.views().len(),
                "layers": document.layers,
            }))
        }

        Commands::Mesh { payload, material, layer } => {
            let mesh: MeshInput = serde_json::from_str(&payload)?;
            let material: MaterialInput = serde_json::from_str(&material)?;
            let mut element = Element::mesh(&encode_mesh(&mesh), &material.encode())?;
            if let Some(layer) = layer {
                element = element.on_layer(layer);
            }
            Ok(serde_json::to_value(element)?)
        }

        Commands::Material { payload } => {
            let input: MaterialInput = serde_json::from_str(&payload)?;
            Ok(serde_json::to_value(input.encode())?)
        }

        Commands::View { name, eye, target } => {
            let view = ViewRecord::from_cad(name, point(&eye)?, point(&target)?);
            Ok(serde_json::to_value(Element::camera(&view)?)?)
        }
    }
}

fn read_request(path: &Path) -> Result<CompileRequest, SceneError> {
    let content = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

fn point(values: &[f64]) -> Result<[f64; 3], SceneError> {
    match values {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(SceneError::Validation(format!(
            "expected 3 coordinates, got {}",
            values.len()
        ))),
    }
}
