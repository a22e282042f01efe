//! # Validate Subcommand
//!
//! Runs a payload file through the service's validation pipeline without a
//! server. With `--catalog`, the exhorto and respuesta references are also
//! resolved. Unlike the service, which stops at the first unknown
//! reference, every unresolved code is reported.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::de::DeserializeOwned;

use exh_catalog::{
    CatalogError, Dimension, InMemoryCatalog, ReferenceDefaults, ReferenceResolver,
};
use exh_exchange::payload::{
    ActualizacionPayload, ExhortoPayload, PromocionPayload, RespuestaPayload,
};
use exh_exchange::validation::{self, ExhortoDraft, RespuestaDraft};
use exh_exchange::ExchangeError;

/// Package kind of the payload file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PayloadKind {
    Exhorto,
    Promocion,
    Respuesta,
    Actualizacion,
}

/// Arguments for `exh validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Kind of payload in the file.
    #[arg(long, value_enum)]
    pub kind: PayloadKind,

    /// JSON payload file.
    #[arg(value_name = "PAYLOAD")]
    pub payload: PathBuf,

    /// Reference catalog (YAML) to resolve codes against.
    #[arg(long, value_name = "YAML")]
    pub catalog: Option<PathBuf>,

    /// INEGI code of the receiving estado, for destination municipios.
    #[arg(long, default_value = "05")]
    pub estado: String,
}

/// Execute the validate subcommand. Exit code 0 when the payload is
/// acceptable, 1 when any error was found.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let content = std::fs::read_to_string(&args.payload)
        .with_context(|| format!("failed to read file: {}", args.payload.display()))?;
    let resolver = args.catalog.as_deref().map(load_resolver).transpose()?;

    let errors = check_payload(args.kind, &content, resolver.as_ref(), &args.estado)?;
    if errors.is_empty() {
        println!("OK: {} is a valid {:?} payload", args.payload.display(), args.kind);
        return Ok(0);
    }
    for line in &errors {
        println!("FAIL: {line}");
    }
    Ok(1)
}

fn load_resolver(path: &Path) -> Result<ReferenceResolver> {
    let catalog = InMemoryCatalog::from_yaml_file(path)
        .with_context(|| format!("failed to load catalog: {}", path.display()))?;
    tracing::info!(path = %path.display(), records = catalog.len(), "catalog loaded");
    Ok(ReferenceResolver::new(
        Arc::new(catalog),
        ReferenceDefaults::default(),
    ))
}

/// Every problem found in `content`, as one line each.
///
/// Unparseable JSON is an `Err`; field and reference problems are lines.
pub fn check_payload(
    kind: PayloadKind,
    content: &str,
    resolver: Option<&ReferenceResolver>,
    estado: &str,
) -> Result<Vec<String>> {
    let outcome = match kind {
        PayloadKind::Exhorto => {
            let draft = parse::<ExhortoPayload>(content).map(|p| validation::validate_exhorto(&p))?;
            draft.map(|d| resolver.map(|r| exhorto_references(r, &d, estado)).unwrap_or_default())
        }
        PayloadKind::Respuesta => {
            let draft =
                parse::<RespuestaPayload>(content).map(|p| validation::validate_respuesta(&p))?;
            draft.map(|d| resolver.map(|r| respuesta_references(r, &d, estado)).unwrap_or_default())
        }
        PayloadKind::Promocion => parse::<PromocionPayload>(content)
            .map(|p| validation::validate_promocion(&p).map(|_| Vec::new()))?,
        PayloadKind::Actualizacion => parse::<ActualizacionPayload>(content)
            .map(|p| validation::validate_actualizacion(&p).map(|_| Vec::new()))?,
    };
    Ok(match outcome {
        Ok(unresolved) => unresolved,
        Err(err) => err.errors(),
    })
}

fn parse<T: DeserializeOwned>(content: &str) -> Result<T> {
    serde_json::from_str(content).context("payload is not valid JSON for this kind")
}

fn exhorto_references(r: &ReferenceResolver, d: &ExhortoDraft, estado: &str) -> Vec<String> {
    let mut results = vec![
        r.resolve_municipio(estado, &d.municipio_destino).map(drop),
        r.resolve(Dimension::Materia, &d.materia).map(drop),
        r.resolve_municipio(&d.estado_origen, &d.municipio_origen).map(drop),
        r.resolve_default(Dimension::Area).map(drop),
        r.resolve_default(Dimension::Autoridad).map(drop),
    ];
    if let Some(code) = &d.tipo_diligencia {
        results.push(r.resolve(Dimension::TipoDiligencia, code).map(drop));
    }
    failures(results)
}

fn respuesta_references(r: &ReferenceResolver, d: &RespuestaDraft, estado: &str) -> Vec<String> {
    failures(vec![
        r.resolve_municipio(estado, &d.municipio_turnado).map(drop),
        r.resolve_or_default(Dimension::Area, d.area_turnado.as_deref())
            .map(drop),
    ])
}

fn failures(results: Vec<Result<(), CatalogError>>) -> Vec<String> {
    results
        .into_iter()
        .filter_map(Result::err)
        .map(|e| ExchangeError::from(e).to_string())
        .collect()
}
