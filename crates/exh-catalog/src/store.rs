//! # Catalog Store
//!
//! Read-only reference tables. The trait is the seam between the exchange
//! core and whatever owns catalog CRUD; [`InMemoryCatalog`] is the bundled
//! implementation, loaded once at startup from a YAML seed.
//!
//! ## Seed Format
//!
//! ```yaml
//! estados:
//!   - clave: "05"
//!     nombre: COAHUILA DE ZARAGOZA
//!     municipios:
//!       - { clave: "030", nombre: SALTILLO }
//! materias:
//!   - { clave: CIV, nombre: CIVIL }
//! areas:
//!   - { clave: ND, nombre: NO DEFINIDO }
//! autoridades:
//!   - { clave: ND, nombre: NO DEFINIDO }
//! tipos_diligencias:
//!   - { clave: "1", nombre: EMPLAZAMIENTO }
//! ```
//!
//! Codes are stored normalized: INEGI codes zero-padded, everything else
//! trimmed and uppercased.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codes::{pad_estado, pad_municipio};
use crate::error::CatalogError;

/// A reference dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Estado,
    Municipio,
    Materia,
    Area,
    Autoridad,
    TipoDiligencia,
}

impl Dimension {
    /// Identifier used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Estado => "estado",
            Self::Municipio => "municipio",
            Self::Materia => "materia",
            Self::Area => "area",
            Self::Autoridad => "autoridad",
            Self::TipoDiligencia => "tipo_diligencia",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Internal id, assigned in seed order when the seed omits it.
    pub id: u32,
    /// Normalized code.
    pub clave: String,
    /// Display name.
    pub nombre: String,
}

/// Read-only reference lookups.
///
/// `lookup` answers every flat dimension. Municipios are only unique within
/// their estado, so they are answered by `municipio` and `lookup` returns
/// `None` for [`Dimension::Municipio`].
pub trait CatalogStore: Send + Sync + std::fmt::Debug {
    /// Find a record by normalized code.
    fn lookup(&self, dimension: Dimension, clave: &str) -> Option<CatalogEntry>;

    /// Find a municipio by padded estado and municipio codes.
    fn municipio(&self, estado: &str, municipio: &str) -> Option<CatalogEntry>;
}

// ── Seed ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Seed {
    #[serde(default)]
    estados: Vec<SeedEstado>,
    #[serde(default)]
    materias: Vec<SeedEntry>,
    #[serde(default)]
    areas: Vec<SeedEntry>,
    #[serde(default)]
    autoridades: Vec<SeedEntry>,
    #[serde(default)]
    tipos_diligencias: Vec<SeedEntry>,
}

#[derive(Debug, Deserialize)]
struct SeedEstado {
    #[serde(default)]
    id: Option<u32>,
    clave: String,
    nombre: String,
    #[serde(default)]
    municipios: Vec<SeedEntry>,
}

#[derive(Debug, Deserialize)]
struct SeedEntry {
    #[serde(default)]
    id: Option<u32>,
    clave: String,
    nombre: String,
}

// ── In-memory store ──────────────────────────────────────────────────

/// Catalog held entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    flat: HashMap<(Dimension, String), CatalogEntry>,
    municipios: HashMap<(String, String), CatalogEntry>,
}

impl InMemoryCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a YAML seed file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let seed: Seed =
            serde_yaml::from_str(&content).map_err(|source| CatalogError::SeedParse {
                path: path.to_path_buf(),
                source,
            })?;
        let catalog = Self::from_seed(seed)?;
        tracing::info!(
            path = %path.display(),
            entries = catalog.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse a catalog from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, CatalogError> {
        let seed: Seed = serde_yaml::from_str(content).map_err(|source| CatalogError::SeedParse {
            path: "<inline>".into(),
            source,
        })?;
        Self::from_seed(seed)
    }

    fn from_seed(seed: Seed) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for (i, estado) in seed.estados.into_iter().enumerate() {
            let clave = pad_estado(&estado.clave).ok_or_else(|| {
                CatalogError::InvalidSeed(format!("estado code \"{}\" is not INEGI", estado.clave))
            })?;
            catalog.insert(
                Dimension::Estado,
                CatalogEntry {
                    id: estado.id.unwrap_or(i as u32 + 1),
                    clave: clave.clone(),
                    nombre: estado.nombre,
                },
            )?;
            for (j, m) in estado.municipios.into_iter().enumerate() {
                let mclave = pad_municipio(&m.clave).ok_or_else(|| {
                    CatalogError::InvalidSeed(format!("municipio code \"{}\" is not INEGI", m.clave))
                })?;
                catalog.insert_municipio(
                    &clave,
                    CatalogEntry {
                        id: m.id.unwrap_or(j as u32 + 1),
                        clave: mclave,
                        nombre: m.nombre,
                    },
                )?;
            }
        }
        for (dimension, entries) in [
            (Dimension::Materia, seed.materias),
            (Dimension::Area, seed.areas),
            (Dimension::Autoridad, seed.autoridades),
            (Dimension::TipoDiligencia, seed.tipos_diligencias),
        ] {
            for (i, e) in entries.into_iter().enumerate() {
                catalog.insert(
                    dimension,
                    CatalogEntry {
                        id: e.id.unwrap_or(i as u32 + 1),
                        clave: normalize_clave(&e.clave),
                        nombre: e.nombre,
                    },
                )?;
            }
        }
        Ok(catalog)
    }

    /// Add a flat record. Rejects duplicate codes.
    pub fn insert(&mut self, dimension: Dimension, entry: CatalogEntry) -> Result<(), CatalogError> {
        let key = (dimension, entry.clave.clone());
        if self.flat.contains_key(&key) {
            return Err(CatalogError::InvalidSeed(format!(
                "duplicate {dimension} code \"{}\"",
                entry.clave
            )));
        }
        self.flat.insert(key, entry);
        Ok(())
    }

    /// Add a municipio under a padded estado code. Rejects duplicates.
    pub fn insert_municipio(&mut self, estado: &str, entry: CatalogEntry) -> Result<(), CatalogError> {
        let key = (estado.to_string(), entry.clave.clone());
        if self.municipios.contains_key(&key) {
            return Err(CatalogError::InvalidSeed(format!(
                "duplicate municipio code \"{estado}-{}\"",
                entry.clave
            )));
        }
        self.municipios.insert(key, entry);
        Ok(())
    }

    /// Total number of records across all dimensions.
    pub fn len(&self) -> usize {
        self.flat.len() + self.municipios.len()
    }

    /// Whether the catalog holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CatalogStore for InMemoryCatalog {
    fn lookup(&self, dimension: Dimension, clave: &str) -> Option<CatalogEntry> {
        self.flat.get(&(dimension, clave.to_string())).cloned()
    }

    fn municipio(&self, estado: &str, municipio: &str) -> Option<CatalogEntry> {
        self.municipios
            .get(&(estado.to_string(), municipio.to_string()))
            .cloned()
    }
}

/// Normalize a non-geographic code: trimmed, uppercased.
pub(crate) fn normalize_clave(clave: &str) -> String {
    clave.trim().to_uppercase()
}
