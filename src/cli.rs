//! Minimal CLI: parse schema documents → resolve/derive → (type | graph)
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde_json::Value;

use crate::schema::SchemaNode;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// derive reference-free type descriptions from JSON Schema documents
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// derive and print type declarations
    Type(TypeOut),
    /// derive and print the resolved type graph as JSON
    Graph(GraphOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer selecting a subnode of each document (e.g. /components/schemas/Pet)
    #[arg(long)]
    json_pointer: Option<String>,

    /// jq filter applied to each document before parsing
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug)]
struct TypeOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// name of the emitted root declaration
    #[arg(long, default_value = "Root")]
    root_type: String,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct GraphOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Type(target) => {
                let documents = target.input_settings.load_documents()?;
                // each document is an independent resolution; nothing shared
                let rendered = documents
                    .par_iter()
                    .map(|(path, doc)| {
                        let ty = crate::schema_to_type(doc)
                            .with_context(|| format!("failed to derive a type for {path}"))?;
                        Ok(crate::emit::render_decls(&ty, &target.root_type))
                    })
                    .collect::<Result<Vec<_>>>()?;
                write_output(target.out.as_deref(), &rendered.join("\n"))
            }
            Command::Graph(target) => {
                let documents = target.input_settings.load_documents()?;
                let rendered = documents
                    .par_iter()
                    .map(|(path, doc)| {
                        let ty = crate::schema_to_type(doc)
                            .with_context(|| format!("failed to derive a type for {path}"))?;
                        serde_json::to_string_pretty(&crate::emit::type_graph_json(&ty))
                            .context("failed to serialize the type graph")
                    })
                    .collect::<Result<Vec<_>>>()?;
                write_output(target.out.as_deref(), &rendered.join("\n"))
            }
        }
    }
}

impl InputSettings {
    /// Read, pre-filter, and parse every input into (path, document) pairs.
    fn load_documents(&self) -> Result<Vec<(String, SchemaNode)>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut out = Vec::new();
        for source_path in source_paths {
            let display = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read {display}"))?;

            // fast path: parse straight from text, keeping JSON-path context
            if self.jq_expr.is_none() && self.json_pointer.is_none() {
                let node = crate::parse::parse_str(&source)
                    .with_context(|| format!("failed to parse schema document {display}"))?;
                out.push((display, node));
                continue;
            }

            let value: Value = serde_json::from_str(&source)
                .with_context(|| format!("failed to parse JSON in {display}"))?;
            let selected = match self.jq_expr.as_ref() {
                Some(jq_expr) => crate::jq_exec::apply_filter(jq_expr, &value)
                    .with_context(|| format!("failed to apply jq filter to {display}"))?,
                None => vec![value],
            };
            for value in &selected {
                out.push((display.clone(), self.select(value, &display)?));
            }
        }
        Ok(out)
    }

    fn select(&self, value: &Value, display: &str) -> Result<SchemaNode> {
        let value = match self.json_pointer.as_deref() {
            Some(pointer) => value.pointer(pointer).with_context(|| {
                format!("JSON pointer `{pointer}` selects nothing in {display}")
            })?,
            None => value,
        };
        crate::parse::parse_value(value)
            .with_context(|| format!("failed to parse schema document {display}"))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    // minimal glob detection for the `glob` crate syntax
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();

        if !has_glob_chars(pattern) {
            // literal path
            out.push(PathBuf::from(pattern));
            continue;
        }

        let before = out.len();
        for entry in
            glob::glob(pattern).with_context(|| format!("invalid glob pattern `{pattern}`"))?
        {
            let path =
                entry.with_context(|| format!("failed to read a match of `{pattern}`"))?;
            out.push(path);
        }
        if out.len() == before {
            // explicitly a glob, yet nothing matched: surface it
            bail!("glob pattern matched no files: {pattern}");
        }
    }
    Ok(out)
}
