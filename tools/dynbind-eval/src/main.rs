// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! dynbind-eval - evaluate pipe expressions and decode key/value text
//!
//! # Usage
//!
//! ```bash
//! # Evaluate an expression against the builtin functions
//! dynbind-eval eval '{{ "hello" 4 | repeat }}'
//!
//! # Decode into map[int64]string
//! dynbind-eval decode-map "1=foo,2=bar"
//!
//! # Decode into a struct, failing on unknown fields
//! dynbind-eval --strict decode-struct "Name=Ariel,Github=a8m" -f Name:string -f Github:string
//!
//! # Using a configuration file
//! dynbind-eval --config dynbind.toml decode-map "1=a;2=b"
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dynbind::{
    evaluate, BindConfig, Decoder, DynamicData, FieldPolicy, FunctionRegistry, PrimitiveKind,
    TypeDescriptor, TypeDescriptorBuilder,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Reflective binding playground
#[derive(Parser, Debug)]
#[command(name = "dynbind-eval")]
#[command(about = "Evaluate binding expressions and decode key/value text")]
#[command(version)]
struct Args {
    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Fail on struct entries that cannot be assigned
    #[arg(long, global = true)]
    strict: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Shorthand for --log-level debug
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate `{{ args | func }}` against the builtin functions
    Eval {
        /// Expression text
        expression: String,
    },

    /// Decode `key=value` entries into a map
    DecodeMap {
        /// Entries text
        text: String,

        /// Key type
        #[arg(long, default_value = "int64")]
        key: String,

        /// Element type (string or any)
        #[arg(long, default_value = "string")]
        elem: String,
    },

    /// Decode `Field=value` entries into a struct
    DecodeStruct {
        /// Entries text
        text: String,

        /// Field declaration `Name:type`, can repeat
        #[arg(short, long = "field", required = true)]
        fields: Vec<String>,

        /// Struct type name
        #[arg(long, default_value = "Record")]
        name: String,
    },

    /// List the builtin functions and their signatures
    Functions,

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { args.log_level.as_str() };
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;
    tracing::debug!(?config, "effective configuration");

    match args.command {
        Commands::Eval { expression } => cmd_eval(&expression),
        Commands::DecodeMap { text, key, elem } => cmd_decode_map(&config, &text, &key, &elem),
        Commands::DecodeStruct { text, fields, name } => {
            cmd_decode_struct(&config, &text, &name, &fields)
        }
        Commands::Functions => cmd_functions(),
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn load_config(args: &Args) -> Result<BindConfig> {
    let mut config = match &args.config {
        Some(path) => BindConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => BindConfig::default(),
    };
    if args.strict {
        config.field_policy = FieldPolicy::Strict;
    }
    Ok(config)
}

/// `any` for the empty interface, otherwise a primitive name.
fn parse_type(name: &str) -> Result<Arc<TypeDescriptor>> {
    match name {
        "any" | "interface{}" => Ok(TypeDescriptor::any()),
        other => {
            let kind: PrimitiveKind = other
                .parse()
                .with_context(|| format!("Unknown type: {other}"))?;
            Ok(TypeDescriptor::primitive(kind))
        }
    }
}

fn cmd_eval(expression: &str) -> Result<()> {
    let registry = FunctionRegistry::with_builtins();
    let output = evaluate(expression, &registry)
        .with_context(|| format!("Failed to evaluate {expression}"))?;
    println!("{output}");
    Ok(())
}

fn cmd_decode_map(config: &BindConfig, text: &str, key: &str, elem: &str) -> Result<()> {
    let desc = TypeDescriptor::map(parse_type(key)?, parse_type(elem)?);
    tracing::info!("decoding into {desc}");

    let mut target = DynamicData::pointer_to(DynamicData::new(&desc));
    Decoder::new(config.clone())
        .decode_map(text, target.reflect_mut())
        .context("Decode failed")?;

    let map = target.reflect().elem()?;
    println!("{}", map.storage());
    Ok(())
}

fn cmd_decode_struct(config: &BindConfig, text: &str, name: &str, fields: &[String]) -> Result<()> {
    let desc = struct_type(name, fields)?;
    tracing::info!("decoding into {}", desc.shape());

    let mut target = DynamicData::pointer_to(DynamicData::new(&desc));
    Decoder::new(config.clone())
        .decode_struct(text, target.reflect_mut())
        .context("Decode failed")?;

    for line in struct_lines(&desc, &target)? {
        println!("{line}");
    }
    Ok(())
}

/// Struct descriptor from `Name:type` declarations.
fn struct_type(name: &str, fields: &[String]) -> Result<Arc<TypeDescriptor>> {
    let mut builder = TypeDescriptorBuilder::new(name);
    for field in fields {
        let Some((field_name, type_name)) = field.split_once(':') else {
            bail!("Invalid field declaration {field:?}, expected Name:type");
        };
        builder = builder.field_with_type(field_name, parse_type(type_name)?);
    }
    Ok(builder.build())
}

/// One `Name = value` line per field of the struct behind `target`.
///
/// Fields are read by position so names holding `.` or `[` are not taken
/// for paths.
fn struct_lines(desc: &TypeDescriptor, target: &DynamicData) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for field in desc.fields().unwrap_or_default() {
        let value = target.reflect().elem()?.field_by_index(field.index())?;
        let marker = if field.is_exported() { "" } else { " (unexported)" };
        lines.push(format!("{} = {}{}", field.name, value.storage(), marker));
    }
    Ok(lines)
}

fn cmd_functions() -> Result<()> {
    let registry = FunctionRegistry::with_builtins();
    for name in registry.names() {
        if let Some(callable) = registry.get(name) {
            println!("{:<8} {}", name, callable.descriptor());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn decl(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_struct_lines_with_dotted_names() {
        let desc = struct_type("Record", &decl(&["Name:string", "A.b:string", "x[0]:int32"]))
            .expect("struct type");
        let mut target = DynamicData::pointer_to(DynamicData::new(&desc));
        Decoder::new(BindConfig::default())
            .decode_struct("Name=Ariel,A.b=dotted", target.reflect_mut())
            .expect("decode");

        let lines = struct_lines(&desc, &target).expect("lines");
        assert_eq!(lines, ["Name = Ariel", "A.b = dotted", "x[0] = 0 (unexported)"]);
    }

    #[test]
    fn test_struct_type_rejects_bad_declaration() {
        assert!(struct_type("Record", &decl(&["Name"])).is_err());
        assert!(struct_type("Record", &decl(&["Name:complex128"])).is_err());
    }

    #[test]
    fn test_version_follows_workspace() {
        let manifest = include_str!("../Cargo.toml");
        assert!(manifest.contains("version.workspace = true"));
        let pinned = format!(r#"dynbind = {{ version = "{}""#, env!("CARGO_PKG_VERSION"));
        assert!(manifest.contains(&pinned), "{pinned}");
        assert_eq!(Args::command().get_version(), Some(env!("CARGO_PKG_VERSION")));
    }
}
