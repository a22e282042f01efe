//! # File Reception Tracker
//!
//! Matches one upload to a pending declaration, verifies it, stores it and
//! marks it received. The caller holds the package's mutex for the whole
//! call; completion handling (lifecycle advance, folio, acuse) happens in
//! the service once this returns with `completed == true`.
//!
//! Checks run in a fixed order, and a failing check leaves the package
//! untouched:
//!
//! 1. extension (`.pdf`, any case)
//! 2. first pending declaration with the same name
//! 3. size cap
//! 4. declared SHA-1, then declared SHA-256
//! 5. blob store write
//!
//! Only after the write succeeds is the declaration marked `RECEIVED` and
//! the remaining counter decremented.

use chrono::{DateTime, Utc};
use exh_core::{DigestAlgorithm, FileDigests};
use exh_state::DeclaredFileState;
use exh_storage::{BlobLocator, BlobStore, PDF_CONTENT_TYPE};

use crate::config::ExchangeConfig;
use crate::error::ExchangeError;
use crate::model::Package;
use crate::validation::has_pdf_extension;

/// Result of a successful reception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reception {
    /// Position of the fulfilled declaration in the package's file list.
    pub index: usize,
    /// Stored size in bytes.
    pub tamano: u64,
    /// Whether this upload brought the remaining counter to zero.
    pub completed: bool,
}

/// Reject anything but a `.pdf` name.
pub fn check_extension(nombre_archivo: &str) -> Result<(), ExchangeError> {
    if has_pdf_extension(nombre_archivo.trim()) {
        Ok(())
    } else {
        Err(ExchangeError::UnsupportedFileType(nombre_archivo.to_string()))
    }
}

/// Receive one upload into `package`.
///
/// `digests` must be the digests of `bytes`; they are computed by the
/// caller before the package lock is taken.
pub async fn receive(
    package: &mut Package,
    nombre_archivo: &str,
    bytes: &[u8],
    digests: &FileDigests,
    blobs: &dyn BlobStore,
    config: &ExchangeConfig,
    now: DateTime<Utc>,
) -> Result<Reception, ExchangeError> {
    check_extension(nombre_archivo)?;
    let nombre_archivo = nombre_archivo.trim();

    let index = package
        .first_pending(nombre_archivo)
        .ok_or_else(|| ExchangeError::DeclarationNotFound(nombre_archivo.to_string()))?;

    let tamano = bytes.len() as u64;
    if tamano > config.max_file_bytes {
        return Err(ExchangeError::PayloadTooLarge {
            file: nombre_archivo.to_string(),
            size: tamano,
            max: config.max_file_bytes,
        });
    }

    let declared = &package.files[index];
    for digest in [&declared.hash_sha1, &declared.hash_sha256].into_iter().flatten() {
        if !digest.matches(digests) {
            let actual = match digest.algorithm {
                DigestAlgorithm::Sha1 => &digests.sha1,
                DigestAlgorithm::Sha256 => &digests.sha256,
            };
            tracing::warn!(
                kind = %package.kind,
                origin_id = %package.origin_id,
                file = nombre_archivo,
                algorithm = %digest.algorithm,
                "declared digest mismatch"
            );
            return Err(ExchangeError::Integrity {
                file: nombre_archivo.to_string(),
                algorithm: digest.algorithm.as_str(),
                declared: digest.hex.clone(),
                actual: actual.clone(),
            });
        }
    }

    let local_date = config.local_zone.localize(now).date_naive();
    let locator = BlobLocator::for_upload(
        package.kind.as_str(),
        local_date,
        &package.origin_id,
        package.received_count() + 1,
    );
    let blob = blobs
        .put(&locator, bytes, PDF_CONTENT_TYPE)
        .await
        .map_err(|e| {
            tracing::error!(locator = %locator, error = %e, "blob write failed");
            e
        })?;

    let file = &mut package.files[index];
    file.state = DeclaredFileState::Received;
    file.received_at = Some(now);
    file.size = Some(tamano);
    file.locator = Some(blob.locator);
    file.url = Some(blob.url);
    package.remaining = package.remaining.saturating_sub(1);
    package.updated_at = now;

    tracing::info!(
        kind = %package.kind,
        origin_id = %package.origin_id,
        file = nombre_archivo,
        size = tamano,
        remaining = package.remaining,
        "file received"
    );

    Ok(Reception {
        index,
        tamano,
        completed: package.remaining == 0,
    })
}
