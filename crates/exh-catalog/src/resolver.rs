//! # Reference Resolver
//!
//! Maps the codes a sender supplies to catalog records, applying the
//! protocol's normalization and default rules. Unknown and malformed codes
//! fail the same way, naming the dimension and the code as received.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::codes::{pad_estado, pad_municipio};
use crate::error::CatalogError;
use crate::store::{normalize_clave, CatalogEntry, CatalogStore, Dimension};

/// Codes of the "not defined" placeholder records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDefaults {
    /// Placeholder routing area.
    pub area_clave: String,
    /// Placeholder authority.
    pub autoridad_clave: String,
}

impl Default for ReferenceDefaults {
    fn default() -> Self {
        Self {
            area_clave: "ND".to_string(),
            autoridad_clave: "ND".to_string(),
        }
    }
}

/// A resolved two-level geographic reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMunicipio {
    pub estado: CatalogEntry,
    pub municipio: CatalogEntry,
}

/// Resolves codes against a [`CatalogStore`].
#[derive(Debug, Clone)]
pub struct ReferenceResolver {
    store: Arc<dyn CatalogStore>,
    defaults: ReferenceDefaults,
}

impl ReferenceResolver {
    pub fn new(store: Arc<dyn CatalogStore>, defaults: ReferenceDefaults) -> Self {
        Self { store, defaults }
    }

    /// Resolve a flat code.
    ///
    /// Estado codes are zero-padded first; other codes are trimmed and
    /// uppercased. [`Dimension::Municipio`] always fails here: use
    /// [`Self::resolve_municipio`].
    pub fn resolve(&self, dimension: Dimension, code: &str) -> Result<CatalogEntry, CatalogError> {
        let unknown = || CatalogError::UnknownReference {
            dimension,
            code: code.to_string(),
        };
        let normalized = match dimension {
            Dimension::Estado => pad_estado(code).ok_or_else(unknown)?,
            Dimension::Municipio => return Err(unknown()),
            _ => normalize_clave(code),
        };
        if normalized.is_empty() {
            return Err(unknown());
        }
        self.store.lookup(dimension, &normalized).ok_or_else(unknown)
    }

    /// Resolve an estado/municipio pair.
    ///
    /// The estado is resolved first, so an unknown estado is reported as such
    /// rather than as an unknown municipio.
    pub fn resolve_municipio(
        &self,
        estado: &str,
        municipio: &str,
    ) -> Result<ResolvedMunicipio, CatalogError> {
        let estado_entry = self.resolve(Dimension::Estado, estado)?;
        let unknown = || CatalogError::UnknownReference {
            dimension: Dimension::Municipio,
            code: format!("{}-{}", estado_entry.clave, municipio.trim()),
        };
        let padded = pad_municipio(municipio).ok_or_else(unknown)?;
        let municipio_entry = self
            .store
            .municipio(&estado_entry.clave, &padded)
            .ok_or_else(unknown)?;
        Ok(ResolvedMunicipio {
            estado: estado_entry,
            municipio: municipio_entry,
        })
    }

    /// The configured "not defined" record for area or autoridad.
    ///
    /// # Errors
    ///
    /// [`CatalogError::MissingDefault`] when the record is absent from the
    /// store, or when `dimension` has no default at all.
    pub fn resolve_default(&self, dimension: Dimension) -> Result<CatalogEntry, CatalogError> {
        let code = match dimension {
            Dimension::Area => &self.defaults.area_clave,
            Dimension::Autoridad => &self.defaults.autoridad_clave,
            _ => {
                return Err(CatalogError::MissingDefault {
                    dimension,
                    code: String::new(),
                })
            }
        };
        let entry = self.store.lookup(dimension, &normalize_clave(code));
        entry.ok_or_else(|| {
            tracing::error!(%dimension, code = %code, "configured default record is missing");
            CatalogError::MissingDefault {
                dimension,
                code: code.clone(),
            }
        })
    }

    /// Resolve `code` when present and non-blank, else the default.
    pub fn resolve_or_default(
        &self,
        dimension: Dimension,
        code: Option<&str>,
    ) -> Result<CatalogEntry, CatalogError> {
        match code.map(str::trim).filter(|c| !c.is_empty()) {
            Some(c) => self.resolve(dimension, c),
            None => self.resolve_default(dimension),
        }
    }

    /// Check at startup that every default record exists.
    pub fn check_defaults(&self) -> Result<(), CatalogError> {
        self.resolve_default(Dimension::Area)?;
        self.resolve_default(Dimension::Autoridad)?;
        Ok(())
    }

    /// The configured defaults.
    pub fn defaults(&self) -> &ReferenceDefaults {
        &self.defaults
    }
}
