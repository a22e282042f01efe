//! Exchange configuration, injected by the host process.

use exh_catalog::ReferenceDefaults;
use exh_core::LocalZone;

/// Default upload cap: 10 MiB.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Runtime settings of the exchange core.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Largest accepted upload, in bytes.
    pub max_file_bytes: u64,
    /// Offset used to render timestamps and date blob locators.
    pub local_zone: LocalZone,
    /// INEGI code of the estado this deployment serves. Destination and
    /// turned-to municipios are looked up inside it.
    pub estado_clave: String,
    /// Codes of the "not defined" area and authority records.
    pub defaults: ReferenceDefaults,
    /// Base URL for the `urlInfo` link in exhorto acuses.
    pub public_base_url: Option<String>,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            local_zone: LocalZone::utc(),
            estado_clave: "05".to_string(),
            defaults: ReferenceDefaults::default(),
            public_base_url: None,
        }
    }
}
