//! Where descriptors come from: schema sources or a compiled bundle.

use anyhow::{Context, Result, bail};
use engine_ddf::DescriptorSet;
use engine_schema::Schema;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(clap::Args)]
pub struct DescriptorSource {
    /// Schema files or directories of `.proto` files
    #[arg(short, long = "schema")]
    pub schemas: Vec<PathBuf>,

    /// Descriptor bundle written by `ddfc compile`
    #[arg(short, long, conflicts_with = "schemas")]
    pub bundle: Option<PathBuf>,
}

impl DescriptorSource {
    pub fn load(&self) -> Result<DescriptorSet> {
        if let Some(bundle) = &self.bundle {
            let bytes = std::fs::read(bundle)
                .with_context(|| format!("reading bundle {}", bundle.display()))?;
            return DescriptorSet::from_bytes(&bytes)
                .with_context(|| format!("loading bundle {}", bundle.display()));
        }
        if self.schemas.is_empty() {
            bail!("either --schema or --bundle is required");
        }
        compile_schemas(&self.schemas)
    }
}

pub fn compile_schemas(paths: &[PathBuf]) -> Result<DescriptorSet> {
    let mut schema = Schema::new();
    for path in paths {
        load_schema_recursive(&mut schema, path)?;
    }
    if schema.messages.is_empty() {
        warn!("no messages found in schema files");
    }
    let set = schema.compile().context("compiling schema")?;
    info!(messages = set.len(), "schema compiled");
    Ok(set)
}

fn load_schema_recursive(schema: &mut Schema, path: &Path) -> Result<()> {
    if path.is_dir() {
        let mut entries = std::fs::read_dir(path)
            .with_context(|| format!("reading directory {}", path.display()))?
            .map(|e| e.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort();
        for entry in entries {
            if entry.is_dir() || entry.extension().is_some_and(|e| e == "proto") {
                load_schema_recursive(schema, &entry)?;
            }
        }
        return Ok(());
    }
    info!(file = %path.display(), "loading schema file");
    schema
        .load_file(path)
        .with_context(|| format!("loading {}", path.display()))
}
