//! # Package Aggregate
//!
//! An exchange [`Package`] is the root of its own aggregate: it owns its
//! declared files, its transition log and, once issued, its acuse. Kind-
//! specific data lives in [`PackageBody`].
//!
//! The whole aggregate is serde-serializable so that the API layer can
//! write it through to Postgres as one JSONB document.

use chrono::{DateTime, NaiveDateTime, Utc};
use exh_catalog::{CatalogEntry, ResolvedMunicipio};
use exh_core::{DeclaredDigest, Folio, OriginId, PackageId};
use exh_state::{DeclaredFileState, DocumentType, PackageKind, PackageState, TransitionRecord};
use serde::{Deserialize, Serialize};

use crate::acuse::Acuse;

// ── Parties, videos, updates ─────────────────────────────────────────

/// Gender of a natural person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Genero {
    #[serde(rename = "M")]
    Masculino,
    #[serde(rename = "F")]
    Femenino,
}

impl Genero {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Self::Masculino),
            "F" => Some(Self::Femenino),
            _ => None,
        }
    }
}

/// Role of a party: 1 actor, 2 demandado, 0 other (named by
/// `tipo_parte_nombre`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TipoParte {
    Otro,
    Actor,
    Demandado,
}

impl TipoParte {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Otro),
            1 => Some(Self::Actor),
            2 => Some(Self::Demandado),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::Otro => 0,
            Self::Actor => 1,
            Self::Demandado => 2,
        }
    }
}

impl From<TipoParte> for u8 {
    fn from(t: TipoParte) -> u8 {
        t.code()
    }
}

impl TryFrom<u8> for TipoParte {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(i64::from(code)).ok_or_else(|| format!("unknown party type {code}"))
    }
}

/// A party to the case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parte {
    pub nombre: String,
    pub apellido_paterno: Option<String>,
    pub apellido_materno: Option<String>,
    pub genero: Option<Genero>,
    pub es_persona_moral: bool,
    pub tipo_parte: TipoParte,
    pub tipo_parte_nombre: Option<String>,
}

/// Outcome of the diligence reported in a respuesta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TipoDiligenciado {
    /// 0: not carried out.
    NoDiligenciado,
    /// 1: partially carried out.
    Parcial,
    /// 2: carried out.
    Diligenciado,
}

impl TipoDiligenciado {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::NoDiligenciado),
            1 => Some(Self::Parcial),
            2 => Some(Self::Diligenciado),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::NoDiligenciado => 0,
            Self::Parcial => 1,
            Self::Diligenciado => 2,
        }
    }
}

impl From<TipoDiligenciado> for u8 {
    fn from(t: TipoDiligenciado) -> u8 {
        t.code()
    }
}

impl TryFrom<u8> for TipoDiligenciado {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(i64::from(code)).ok_or_else(|| format!("unknown diligence outcome {code}"))
    }
}

/// A video link attached to a respuesta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub titulo: String,
    pub descripcion: Option<String>,
    pub fecha: Option<NaiveDateTime>,
    pub url_acceso: String,
}

/// A status update recorded against an exhorto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actualizacion {
    pub actualizacion_origen_id: OriginId,
    pub tipo_actualizacion: String,
    pub fecha_hora: NaiveDateTime,
    pub descripcion: Option<String>,
    pub recibida: DateTime<Utc>,
}

// ── Declared files ───────────────────────────────────────────────────

/// A validated manifest entry, before it becomes a [`DeclaredFile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredFileSpec {
    pub nombre_archivo: String,
    pub hash_sha1: Option<DeclaredDigest>,
    pub hash_sha256: Option<DeclaredDigest>,
    pub tipo_documento: DocumentType,
}

/// A file the sender promised to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredFile {
    pub nombre_archivo: String,
    pub hash_sha1: Option<DeclaredDigest>,
    pub hash_sha256: Option<DeclaredDigest>,
    pub tipo_documento: DocumentType,
    pub state: DeclaredFileState,
    pub received_at: Option<DateTime<Utc>>,
    pub size: Option<u64>,
    pub locator: Option<String>,
    pub url: Option<String>,
}

impl From<DeclaredFileSpec> for DeclaredFile {
    fn from(spec: DeclaredFileSpec) -> Self {
        Self {
            nombre_archivo: spec.nombre_archivo,
            hash_sha1: spec.hash_sha1,
            hash_sha256: spec.hash_sha256,
            tipo_documento: spec.tipo_documento,
            state: DeclaredFileState::Pending,
            received_at: None,
            size: None,
            locator: None,
            url: None,
        }
    }
}

impl DeclaredFile {
    pub fn is_pending(&self) -> bool {
        self.state == DeclaredFileState::Pending
    }
}

// ── Kind bodies ──────────────────────────────────────────────────────

/// Exhorto-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhortoBody {
    pub municipio_destino: ResolvedMunicipio,
    pub materia: CatalogEntry,
    pub origen: ResolvedMunicipio,
    pub juzgado_origen_id: String,
    pub juzgado_origen_nombre: String,
    pub numero_expediente_origen: String,
    pub numero_oficio_origen: Option<String>,
    pub tipo_juicio_asunto_delitos: String,
    pub juez_exhortante: Option<String>,
    pub partes: Vec<Parte>,
    pub fojas: u32,
    pub dias_responder: u32,
    pub tipo_diligencia: Option<CatalogEntry>,
    pub tipo_diligenciacion_nombre: Option<String>,
    pub fecha_origen: Option<NaiveDateTime>,
    pub observaciones: Option<String>,
    /// Routing area (the "not defined" record at reception).
    pub area: CatalogEntry,
    /// Routing authority (the "not defined" record at reception).
    pub autoridad: CatalogEntry,
    /// Respuesta accepted for this exhorto, if any.
    pub respuesta: Option<PackageId>,
    #[serde(default)]
    pub actualizaciones: Vec<Actualizacion>,
}

/// Promoción-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromocionBody {
    pub folio_seguimiento: Folio,
    pub promoventes: Vec<Parte>,
    pub fojas: u32,
    pub fecha_origen: Option<NaiveDateTime>,
    pub observaciones: Option<String>,
}

/// Respuesta-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespuestaBody {
    pub municipio_turnado: ResolvedMunicipio,
    pub area_turnado: CatalogEntry,
    pub area_turnado_nombre: Option<String>,
    pub numero_exhorto: Option<String>,
    pub tipo_diligenciado: TipoDiligenciado,
    pub observaciones: Option<String>,
    pub videos: Vec<Video>,
}

/// Kind-specific data of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageBody {
    Exhorto(ExhortoBody),
    Promocion(PromocionBody),
    Respuesta(RespuestaBody),
}

impl PackageBody {
    pub fn kind(&self) -> PackageKind {
        match self {
            Self::Exhorto(_) => PackageKind::Exhorto,
            Self::Promocion(_) => PackageKind::Promocion,
            Self::Respuesta(_) => PackageKind::Respuesta,
        }
    }
}

// ── The package ──────────────────────────────────────────────────────

/// Back-reference from a promoción or respuesta to its exhorto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: PackageId,
    pub origin_id: OriginId,
    pub folio: Option<Folio>,
}

/// An exchange package with its declared files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: PackageId,
    pub kind: PackageKind,
    pub origin_id: OriginId,
    /// Tracking folio. Exhortos and promociones get one on completion;
    /// respuestas are tracked through their exhorto's folio.
    pub folio: Option<Folio>,
    pub state: PackageState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub parent: Option<ParentRef>,
    pub files: Vec<DeclaredFile>,
    /// Count of `PENDING` files, maintained under the package lock.
    pub remaining: usize,
    pub transition_log: Vec<TransitionRecord>,
    pub acuse: Option<Acuse>,
    pub body: PackageBody,
}

impl Package {
    /// Index of the first pending declared file with this exact name.
    pub fn first_pending(&self, nombre_archivo: &str) -> Option<usize> {
        self.files
            .iter()
            .position(|f| f.is_pending() && f.nombre_archivo == nombre_archivo)
    }

    /// Number of files already received.
    pub fn received_count(&self) -> usize {
        self.files.len() - self.remaining
    }

    /// Recount pending files. Used after hydration to re-establish the
    /// counter from the files themselves.
    pub fn recount(&mut self) {
        self.remaining = self.files.iter().filter(|f| f.is_pending()).count();
    }

    pub fn exhorto_mut(&mut self) -> Option<&mut ExhortoBody> {
        match &mut self.body {
            PackageBody::Exhorto(b) => Some(b),
            _ => None,
        }
    }
}
