//! # Calor CLI
//!
//! Command-line interface for the Calor viewport model.
//!
//! ## Commands
//! - `primitive` - Generate a primitive and summarize its mesh
//! - `settings` - Load, validate and print editor settings
//! - `demo` - Run a scripted editing session

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use calor_core::{PrimitiveKind, SceneObject};
use calor_editor::{Editor, EditorSettings, InteractionMode};
use clap::{Parser, Subcommand};
use glam::DVec3;

/// Calor viewport CLI
#[derive(Parser)]
#[command(name = "calor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a primitive and print its mesh summary
    Primitive {
        /// Shape to generate (box, cylinder, sphere)
        kind: PrimitiveKind,

        /// Size along X
        #[arg(long, default_value = "1.0")]
        width: f64,

        /// Size along Y
        #[arg(long, default_value = "1.0")]
        height: f64,

        /// Size along Z
        #[arg(long, default_value = "1.0")]
        depth: f64,

        /// Sides of a cylinder or longitude divisions of a sphere
        #[arg(long)]
        segments: Option<u32>,

        /// Latitude divisions of a sphere
        #[arg(long)]
        rings: Option<u32>,

        /// Print the render buffers as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate and print editor settings
    Settings {
        /// Settings file (defaults are used if omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Run a scripted editing session
    Demo,
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let output = match cli.command {
        Commands::Primitive {
            kind,
            width,
            height,
            depth,
            segments,
            rings,
            json,
        } => {
            let kind = with_resolution(kind, segments, rings)?;
            run_primitive(kind, DVec3::new(width, height, depth), json)?
        }
        Commands::Settings { file } => run_settings(file)?,
        Commands::Demo => run_demo()?,
    };

    println!("{output}");
    Ok(())
}

/// Apply resolution overrides to a parsed kind
pub fn with_resolution(
    kind: PrimitiveKind,
    segments: Option<u32>,
    rings: Option<u32>,
) -> Result<PrimitiveKind> {
    let kind = match kind {
        PrimitiveKind::Box => {
            if segments.is_some() || rings.is_some() {
                log::warn!("Boxes have no resolution; ignoring --segments/--rings");
            }
            PrimitiveKind::Box
        }
        PrimitiveKind::Cylinder { segments: default } => {
            PrimitiveKind::cylinder(segments.unwrap_or(default))?
        }
        PrimitiveKind::Sphere {
            segments: default_segments,
            rings: default_rings,
        } => PrimitiveKind::sphere(
            segments.unwrap_or(default_segments),
            rings.unwrap_or(default_rings),
        )?,
    };
    Ok(kind)
}

/// Build a primitive object and describe it
pub fn run_primitive(kind: PrimitiveKind, dimensions: DVec3, json: bool) -> Result<String> {
    if dimensions.cmple(DVec3::ZERO).any() {
        log::warn!("Non-positive dimensions {:?} produce a degenerate mesh", dimensions);
    }

    let object = SceneObject::new_primitive(kind, dimensions);
    let buffers = object
        .geometry()
        .and_then(|binding| binding.buffers())
        .context("primitive produced no render buffers")?;

    if json {
        return Ok(serde_json::to_string_pretty(buffers)?);
    }

    let mesh = object.mesh();
    let bounds = mesh.bounds();
    let mut out = String::new();
    writeln!(out, "{} ({})", object.name(), kind)?;
    writeln!(out, "  vertices:  {}", mesh.vertex_count())?;
    writeln!(out, "  edges:     {}", mesh.edge_count())?;
    writeln!(out, "  faces:     {}", mesh.face_count())?;
    writeln!(out, "  triangles: {}", buffers.triangle_count())?;
    write!(out, "  bounds:    {} .. {}", bounds.min, bounds.max)?;
    Ok(out)
}

/// Load settings (or defaults), validate them and print them as JSON
pub fn run_settings(file: Option<PathBuf>) -> Result<String> {
    let settings = match file {
        Some(path) => EditorSettings::load(&path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => {
            let settings = EditorSettings::default();
            settings.validate()?;
            settings
        }
    };
    Ok(settings.to_json_string()?)
}

/// Scripted session exercising creation, selection, duplication, locking,
/// collection visibility and removal
pub fn run_demo() -> Result<String> {
    let mut editor = Editor::new();

    log::info!("Creating primitives...");
    let plate = editor.create_box(DVec3::new(4.0, 0.2, 4.0));
    let pipe = editor.create_cylinder(0.25, 3.0)?;
    let marker = editor.create_sphere(0.5)?;

    log::info!("Selecting plate and entering edit mode...");
    editor.select(plate, false);
    editor.set_mode(InteractionMode::Edit)?;
    editor.set_mode(InteractionMode::Object)?;

    log::info!("Duplicating pipe...");
    editor.select(pipe, false);
    let pipe_copy = editor.duplicate(pipe)?;
    editor.select(pipe_copy, true);

    log::info!("Locking plate...");
    if let Some(object) = editor.object_mut(plate) {
        object.set_locked(true);
        if !object.set_location(DVec3::new(0.0, 5.0, 0.0)) {
            log::info!("  Move rejected: {} is locked", object.name());
        }
    }

    log::info!("Hiding the piping collection...");
    let piping = editor.create_collection("Piping", None)?;
    editor.move_to_collection(pipe, piping)?;
    editor.move_to_collection(pipe_copy, piping)?;
    editor.set_collection_visible(piping, false)?;

    log::info!("Removing marker...");
    let removed = editor.remove_object(marker)?;
    log::info!("  Removed {}", removed.name());

    let mut out = String::new();
    writeln!(out, "Objects: {}", editor.objects().len())?;
    for (key, object) in editor.objects().iter() {
        writeln!(
            out,
            "  {:<14} at {}  visible={} locked={} selected={}",
            object.name(),
            object.location(),
            object.is_visible(),
            object.is_locked(),
            editor.selection().is_selected(key)
        )?;
    }
    write!(out, "Collections: {}", editor.collections().len())?;
    for (_, collection) in editor.collections().iter() {
        write!(
            out,
            "\n  {:<16} objects={} visible={}",
            collection.name(),
            collection.objects().len(),
            collection.is_visible()
        )?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        let cli = Cli::parse_from(["calor", "demo"]);
        assert!(matches!(cli.command, Commands::Demo));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_primitive_command() {
        let cli = Cli::parse_from([
            "calor", "-v", "primitive", "cylinder", "--width", "2", "--segments", "8", "--json",
        ]);
        assert!(cli.verbose);
        if let Commands::Primitive {
            kind,
            width,
            height,
            segments,
            json,
            ..
        } = cli.command
        {
            assert_eq!(kind, PrimitiveKind::Cylinder { segments: 32 });
            assert_eq!(width, 2.0);
            assert_eq!(height, 1.0);
            assert_eq!(segments, Some(8));
            assert!(json);
        } else {
            panic!("Expected Primitive command");
        }
    }

    #[test]
    fn test_unknown_primitive_rejected() {
        assert!(Cli::try_parse_from(["calor", "primitive", "torus"]).is_err());
    }

    #[test]
    fn test_with_resolution() {
        let cylinder = PrimitiveKind::Cylinder { segments: 32 };
        let kind = with_resolution(cylinder, Some(6), None).unwrap();
        assert_eq!(kind, PrimitiveKind::Cylinder { segments: 6 });

        let sphere = PrimitiveKind::Sphere { segments: 32, rings: 16 };
        let kind = with_resolution(sphere, None, Some(4)).unwrap();
        assert_eq!(kind, PrimitiveKind::Sphere { segments: 32, rings: 4 });

        assert!(with_resolution(PrimitiveKind::Cylinder { segments: 32 }, Some(2), None).is_err());
        assert_eq!(
            with_resolution(PrimitiveKind::Box, Some(9), None).unwrap(),
            PrimitiveKind::Box
        );
    }

    #[test]
    fn test_run_primitive_summary() {
        let out = run_primitive(PrimitiveKind::Box, DVec3::new(2.0, 2.0, 2.0), false).unwrap();
        assert!(out.starts_with("Box (box)"));
        assert!(out.contains("vertices:  8"));
        assert!(out.contains("faces:     6"));
        assert!(out.contains("triangles: 12"));
    }

    #[test]
    fn test_run_primitive_json() {
        let out = run_primitive(PrimitiveKind::Box, DVec3::ONE, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["indices"].as_array().unwrap().len(), 36);
        assert_eq!(value["positions"].as_array().unwrap().len(), 108);
    }

    #[test]
    fn test_run_settings_defaults() {
        let out = run_settings(None).unwrap();
        let settings = EditorSettings::from_json_str(&out).unwrap();
        assert_eq!(settings, EditorSettings::default());
    }

    #[test]
    fn test_run_settings_missing_file() {
        assert!(run_settings(Some(PathBuf::from("/nonexistent/calor.json"))).is_err());
    }

    #[test]
    fn test_run_demo() {
        let out = run_demo().unwrap();
        assert!(out.starts_with("Objects: 3"));
        assert!(out.contains("Cylinder_copy"));
        assert!(!out.contains("Sphere"));
        assert!(out.contains("Piping"));
    }
}
