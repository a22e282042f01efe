//! # Digest Subcommand
//!
//! Builds manifest entries for files about to be declared.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use exh_core::FileDigests;
use exh_exchange::payload::{ArchivoPayload, Text};

/// Arguments for `exh digest`.
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Files to describe. Only `.pdf` files are accepted by the exchange.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Document type code written into every entry.
    #[arg(long, default_value_t = 1)]
    pub tipo_documento: i64,
}

/// Execute the digest subcommand. Prints a JSON array on stdout.
pub fn run_digest(args: &DigestArgs) -> Result<u8> {
    let entries = args
        .files
        .iter()
        .map(|path| manifest_entry(path, args.tipo_documento))
        .collect::<Result<Vec<_>>>()?;

    let unsupported = entries
        .iter()
        .filter_map(|e| e.nombre_archivo.as_ref().and_then(Text::as_str))
        .filter(|name| !exh_exchange::validation::has_pdf_extension(name))
        .count();
    if unsupported > 0 {
        tracing::warn!(unsupported, "some files are not .pdf and will be refused on upload");
    }

    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(0)
}

/// One `archivos` entry for the file at `path`.
pub fn manifest_entry(path: &Path, tipo_documento: i64) -> Result<ArchivoPayload> {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        bail!("not a file name: {}", path.display());
    };
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))?;
    let digests = FileDigests::compute(&bytes);
    tracing::debug!(file = name, size = bytes.len(), "digested");

    Ok(ArchivoPayload {
        nombre_archivo: Some(name.into()),
        hash_sha1: Some(digests.sha1.into()),
        hash_sha256: Some(digests.sha256.into()),
        tipo_documento: Some(tipo_documento.into()),
    })
}
