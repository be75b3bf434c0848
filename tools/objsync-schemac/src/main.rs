// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! objsync schema compiler CLI
//!
//! Loads a compiler configuration and a schema manifest, builds the data
//! model and reconcilers, and prints the finalized summary as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Compile a manifest with the default configuration
//! objsync-schemac compile --manifest game.toml
//!
//! # With a configuration file, written to disk
//! objsync-schemac compile --config objsync.toml --manifest game.toml --out schema.json
//!
//! # Only the wire-compatibility hash
//! objsync-schemac hash --config objsync.toml --manifest game.toml
//!
//! # Generate an example configuration
//! objsync-schemac gen-config --output objsync.toml
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use objsync_schema::{CompiledSchema, CompilerConfig, SchemaManifest};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// objsync schema compiler
#[derive(Parser, Debug)]
#[command(name = "objsync-schemac")]
#[command(about = "objsync schema compiler - type graph, change bitmasks and schema hash")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a manifest and print its summary
    Compile {
        /// Compiler configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Schema manifest (TOML, or JSON with a .json extension)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Write the summary here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print only the schema hash
    Hash {
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long)]
        manifest: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Generate example configuration file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "objsync.toml")]
        output: PathBuf,
    },

    /// List builtin type names
    Builtins,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Commands::Compile {
            config,
            manifest,
            out,
        } => {
            let compiled = compile(config.as_deref(), &manifest)?;
            let json = serde_json::to_string_pretty(&compiled.summary()?)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!(path = %path.display(), "summary written");
                }
                None => println!("{json}"),
            }
        }
        Commands::Hash { config, manifest } => {
            let compiled = compile(config.as_deref(), &manifest)?;
            println!("{}", compiled.model.get_hash()?);
        }
        Commands::Validate { config } => {
            load_config(Some(&config))?;
            println!("Configuration is valid: {}", config.display());
        }
        Commands::GenConfig { output } => {
            std::fs::write(&output, EXAMPLE_CONFIG)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("Generated example configuration: {}", output.display());
        }
        Commands::Builtins => {
            for name in objsync_schema::semantic::BUILTIN_TYPE_NAMES {
                println!("{name}");
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<CompilerConfig> {
    match path {
        Some(path) => CompilerConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(CompilerConfig::default()),
    }
}

fn compile(config: Option<&Path>, manifest: &Path) -> Result<CompiledSchema> {
    let config = load_config(config)?;
    let manifest = SchemaManifest::from_file(manifest)
        .with_context(|| format!("loading manifest {}", manifest.display()))?;
    manifest
        .apply(&config)
        .context("schema compilation failed")
}

const EXAMPLE_CONFIG: &str = r#"# objsync schema compiler configuration

# Target API of the generated native code
api_name = "cpp"

# Coordinate system of the native side
[local]
up = "+Y"
right = "+X"
forward = "-Z"
spatial_unit = "meter"
angular_unit = "radian"

# Coordinate system on the wire (part of the schema hash)
[stored]
up = "+Z"
right = "+Y"
forward = "+X"
spatial_unit = "centimeter"
angular_unit = "degree"

# Native type overrides
[type_map.Quaternion]
native_name = "glm::quat"
field_order = ["w", "x", "y", "z"]

[type_map.Vector3]
native_name = "glm::vec3"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_example_config_is_valid() {
        let config: CompilerConfig = EXAMPLE_CONFIG.parse().unwrap();
        assert_eq!(config.api_name, "cpp");
    }

    #[test]
    fn test_compile_files() {
        let mut config = tempfile::NamedTempFile::new().unwrap();
        config.write_all(EXAMPLE_CONFIG.as_bytes()).unwrap();
        let mut manifest = tempfile::NamedTempFile::new().unwrap();
        manifest
            .write_all(
                br#"
[[declarations]]
kind = "collection"
name = "Crate"
max_count = 8
fields = [{ name = "position", type = "Vector3" }]
"#,
            )
            .unwrap();

        let compiled = compile(Some(config.path()), manifest.path()).unwrap();
        let summary = compiled.summary().unwrap();
        assert_eq!(summary.collections.len(), 1);
        let vec3 = summary.types.iter().find(|t| t.name == "Vector3").unwrap();
        assert_eq!(vec3.native_name, "glm::vec3");
    }

    #[test]
    fn test_compile_reports_fault() {
        let mut manifest = tempfile::NamedTempFile::new().unwrap();
        manifest
            .write_all(b"[[declarations]]\nkind = \"reference\"\nname = \"R\"\ntarget = \"Missing\"\n")
            .unwrap();
        let err = compile(None, manifest.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Missing"));
    }
}
