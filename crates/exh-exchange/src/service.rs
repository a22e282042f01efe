//! # Exchange Service
//!
//! Facade over validation, reference resolution, the repository, reception
//! and the acuse builder. Every public operation is one protocol call.
//!
//! ## Write-through
//!
//! Mutating operations return the ids of every package they changed
//! (`changed`), so a host with a persistent store can snapshot and write
//! them through after the call. The service itself never touches a
//! database.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use exh_catalog::{CatalogStore, Dimension, ReferenceResolver};
use exh_core::{Clock, FileDigests, Folio, OriginId, PackageId};
use exh_state::{PackageKind, Trigger};
use exh_storage::BlobStore;
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;

use crate::acuse::{self, Acuse};
use crate::config::ExchangeConfig;
use crate::error::ExchangeError;
use crate::lifecycle;
use crate::model::{
    Actualizacion, ExhortoBody, Package, PackageBody, ParentRef, PromocionBody, RespuestaBody,
};
use crate::payload::{ActualizacionPayload, ExhortoPayload, PromocionPayload, RespuestaPayload};
use crate::reception;
use crate::repository::{PackageHandle, PackageRepository};
use crate::validation;
use crate::view::PackageView;

// ── Outcomes ─────────────────────────────────────────────────────────

/// A package was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub origin_id: String,
    /// Creation time rendered in the local zone.
    pub fecha_hora: String,
    pub package_id: PackageId,
    pub changed: Vec<PackageId>,
}

/// The received file, as echoed to the sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReceipt {
    pub nombre_archivo: String,
    pub tamano: u64,
}

/// A file was received. `acuse` is the empty shape unless this upload
/// completed the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Received {
    pub archivo: FileReceipt,
    pub acuse: Acuse,
    #[serde(skip)]
    pub changed: Vec<PackageId>,
}

/// An actualización was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualizacionRecorded {
    pub exhorto_id: String,
    pub actualizacion_origen_id: String,
    pub fecha_hora: String,
    #[serde(skip)]
    pub changed: Vec<PackageId>,
}

// ── Service ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ExchangeService {
    repo: PackageRepository,
    resolver: ReferenceResolver,
    blobs: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
    config: ExchangeConfig,
}

impl ExchangeService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
        config: ExchangeConfig,
    ) -> Self {
        let resolver = ReferenceResolver::new(catalog, config.defaults.clone());
        Self {
            repo: PackageRepository::new(),
            resolver,
            blobs,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    pub fn repository(&self) -> &PackageRepository {
        &self.repo
    }

    // -- Exhortos -----------------------------------------------------------

    /// Declare an exhorto and its files.
    pub async fn create_exhorto(&self, payload: &ExhortoPayload) -> Result<Created, ExchangeError> {
        let draft = validation::validate_exhorto(payload)?;
        self.ensure_new(PackageKind::Exhorto, &draft.origin_id)?;

        let municipio_destino = self
            .resolver
            .resolve_municipio(&self.config.estado_clave, &draft.municipio_destino)?;
        let materia = self.resolver.resolve(Dimension::Materia, &draft.materia)?;
        let origen = self
            .resolver
            .resolve_municipio(&draft.estado_origen, &draft.municipio_origen)?;
        let tipo_diligencia = draft
            .tipo_diligencia
            .as_deref()
            .map(|code| self.resolver.resolve(Dimension::TipoDiligencia, code))
            .transpose()?;
        let area = self.resolver.resolve_default(Dimension::Area)?;
        let autoridad = self.resolver.resolve_default(Dimension::Autoridad)?;

        let body = ExhortoBody {
            municipio_destino,
            materia,
            origen,
            juzgado_origen_id: draft.juzgado_origen_id,
            juzgado_origen_nombre: draft.juzgado_origen_nombre,
            numero_expediente_origen: draft.numero_expediente_origen,
            numero_oficio_origen: draft.numero_oficio_origen,
            tipo_juicio_asunto_delitos: draft.tipo_juicio_asunto_delitos,
            juez_exhortante: draft.juez_exhortante,
            partes: draft.partes,
            fojas: draft.fojas,
            dias_responder: draft.dias_responder,
            tipo_diligencia,
            tipo_diligenciacion_nombre: draft.tipo_diligenciacion_nombre,
            fecha_origen: draft.fecha_origen,
            observaciones: draft.observaciones,
            area,
            autoridad,
            respuesta: None,
            actualizaciones: Vec::new(),
        };
        let now = self.clock.now();
        let package = lifecycle::new_package(
            draft.origin_id,
            draft.archivos,
            PackageBody::Exhorto(body),
            None,
            now,
        );
        self.insert(package)
    }

    /// Receive one file of an exhorto.
    pub async fn receive_exhorto_file(
        &self,
        exhorto_origen_id: &str,
        nombre_archivo: &str,
        bytes: &[u8],
    ) -> Result<Received, ExchangeError> {
        reception::check_extension(nombre_archivo)?;
        let origin_id = parse_origin("exhortoOrigenId", exhorto_origen_id)?;
        let handle = self
            .repo
            .find_by_origin(PackageKind::Exhorto, &origin_id)
            .ok_or_else(|| ExchangeError::not_found("exhorto", origin_id.as_str()))?;
        self.receive_into(handle, nombre_archivo, bytes).await
    }

    /// Exhorto projection by tracking folio.
    pub async fn exhorto_by_folio(&self, folio: &str) -> Result<PackageView, ExchangeError> {
        let folio = Folio::parse(folio)
            .map_err(|e| ExchangeError::Validation(vec![e.at("folioSeguimiento")]))?;
        let handle = self
            .repo
            .find_by_folio(&folio)
            .ok_or_else(|| ExchangeError::not_found("exhorto", folio.as_str()))?;
        let package = handle.lock().await;
        if package.kind != PackageKind::Exhorto {
            return Err(ExchangeError::not_found("exhorto", folio.as_str()));
        }
        Ok(PackageView::render(&package, &self.config.local_zone))
    }

    /// Exhorto projection by origin id.
    pub async fn exhorto_by_origin(&self, origin_id: &str) -> Result<PackageView, ExchangeError> {
        self.view_by_origin(PackageKind::Exhorto, "exhortoOrigenId", origin_id)
            .await
    }

    // -- Promociones --------------------------------------------------------

    /// Declare a promoción against an exhorto identified by folio.
    pub async fn create_promocion(
        &self,
        payload: &PromocionPayload,
    ) -> Result<Created, ExchangeError> {
        let draft = validation::validate_promocion(payload)?;
        self.ensure_new(PackageKind::Promocion, &draft.origin_id)?;

        let parent_handle = self
            .repo
            .find_by_folio(&draft.folio_seguimiento)
            .ok_or_else(|| ExchangeError::not_found("exhorto", draft.folio_seguimiento.as_str()))?;
        let parent = {
            let exhorto = parent_handle.lock().await;
            if exhorto.kind != PackageKind::Exhorto {
                return Err(ExchangeError::not_found(
                    "exhorto",
                    draft.folio_seguimiento.as_str(),
                ));
            }
            parent_ref(&exhorto)
        };

        let body = PromocionBody {
            folio_seguimiento: draft.folio_seguimiento,
            promoventes: draft.promoventes,
            fojas: draft.fojas,
            fecha_origen: draft.fecha_origen,
            observaciones: draft.observaciones,
        };
        let now = self.clock.now();
        let package = lifecycle::new_package(
            draft.origin_id,
            draft.archivos,
            PackageBody::Promocion(body),
            Some(parent),
            now,
        );
        self.insert(package)
    }

    /// Receive one file of a promoción.
    pub async fn receive_promocion_file(
        &self,
        folio_origen_promocion: &str,
        nombre_archivo: &str,
        bytes: &[u8],
    ) -> Result<Received, ExchangeError> {
        reception::check_extension(nombre_archivo)?;
        let origin_id = parse_origin("folioOrigenPromocion", folio_origen_promocion)?;
        let handle = self
            .repo
            .find_by_origin(PackageKind::Promocion, &origin_id)
            .ok_or_else(|| ExchangeError::not_found("promocion", origin_id.as_str()))?;
        self.receive_into(handle, nombre_archivo, bytes).await
    }

    pub async fn promocion_by_origin(&self, origin_id: &str) -> Result<PackageView, ExchangeError> {
        self.view_by_origin(PackageKind::Promocion, "folioOrigenPromocion", origin_id)
            .await
    }

    // -- Respuestas ---------------------------------------------------------

    /// Declare a respuesta to a received exhorto.
    ///
    /// The exhorto's lock is held from the state check until it has been
    /// advanced to `RESPONDED`, so of two concurrent respuestas exactly one
    /// is accepted.
    pub async fn create_respuesta(
        &self,
        payload: &RespuestaPayload,
    ) -> Result<Created, ExchangeError> {
        let draft = validation::validate_respuesta(payload)?;
        self.ensure_new(PackageKind::Respuesta, &draft.origin_id)?;

        let municipio_turnado = self
            .resolver
            .resolve_municipio(&self.config.estado_clave, &draft.municipio_turnado)?;
        let area_turnado = self
            .resolver
            .resolve_or_default(Dimension::Area, draft.area_turnado.as_deref())?;

        let parent_handle = self
            .repo
            .find_by_origin(PackageKind::Exhorto, &draft.exhorto_origin_id)
            .ok_or_else(|| {
                ExchangeError::not_found("exhorto", draft.exhorto_origin_id.as_str())
            })?;
        let mut exhorto = parent_handle.lock().await;
        if !lifecycle::accepts_respuesta(exhorto.state) {
            return Err(ExchangeError::InvalidState {
                kind: exhorto.kind,
                state: exhorto.state,
                reason: "only a RECEIVED exhorto accepts a respuesta".to_string(),
            });
        }

        let body = RespuestaBody {
            municipio_turnado,
            area_turnado,
            area_turnado_nombre: draft.area_turnado_nombre,
            numero_exhorto: draft.numero_exhorto,
            tipo_diligenciado: draft.tipo_diligenciado,
            observaciones: draft.observaciones,
            videos: draft.videos,
        };
        let now = self.clock.now();
        let package = lifecycle::new_package(
            draft.origin_id,
            draft.archivos,
            PackageBody::Respuesta(body),
            Some(parent_ref(&exhorto)),
            now,
        );
        let mut created = self.insert(package)?;

        lifecycle::apply(&mut exhorto, Trigger::ResponseAccepted, now)?;
        if let Some(body) = exhorto.exhorto_mut() {
            body.respuesta = Some(created.package_id);
        }
        created.changed.push(exhorto.id);
        Ok(created)
    }

    /// Receive one file of a respuesta. `exhorto_id` must be the origin id
    /// of the respuesta's exhorto.
    pub async fn receive_respuesta_file(
        &self,
        exhorto_id: &str,
        respuesta_origen_id: &str,
        nombre_archivo: &str,
        bytes: &[u8],
    ) -> Result<Received, ExchangeError> {
        reception::check_extension(nombre_archivo)?;
        let exhorto_origin = parse_origin("exhortoId", exhorto_id)?;
        let origin_id = parse_origin("respuestaOrigenId", respuesta_origen_id)?;
        let handle = self
            .repo
            .find_by_origin(PackageKind::Respuesta, &origin_id)
            .ok_or_else(|| ExchangeError::not_found("respuesta", origin_id.as_str()))?;
        {
            let respuesta = handle.lock().await;
            let belongs = respuesta
                .parent
                .as_ref()
                .is_some_and(|p| p.origin_id == exhorto_origin);
            if !belongs {
                return Err(ExchangeError::not_found(
                    "respuesta",
                    format!("{} for exhorto {}", origin_id, exhorto_origin),
                ));
            }
        }
        self.receive_into(handle, nombre_archivo, bytes).await
    }

    pub async fn respuesta_by_origin(&self, origin_id: &str) -> Result<PackageView, ExchangeError> {
        self.view_by_origin(PackageKind::Respuesta, "respuestaOrigenId", origin_id)
            .await
    }

    // -- Actualizaciones ----------------------------------------------------

    /// Append a status update to a received exhorto.
    pub async fn record_actualizacion(
        &self,
        payload: &ActualizacionPayload,
    ) -> Result<ActualizacionRecorded, ExchangeError> {
        let draft = validation::validate_actualizacion(payload)?;
        let handle = self
            .repo
            .find_by_origin(PackageKind::Exhorto, &draft.exhorto_origin_id)
            .ok_or_else(|| {
                ExchangeError::not_found("exhorto", draft.exhorto_origin_id.as_str())
            })?;
        let mut exhorto = handle.lock().await;
        if exhorto.folio.is_none() {
            return Err(ExchangeError::InvalidState {
                kind: exhorto.kind,
                state: exhorto.state,
                reason: "files are still pending".to_string(),
            });
        }
        let now = self.clock.now();
        let id = exhorto.id;
        let body = exhorto
            .exhorto_mut()
            .ok_or_else(|| ExchangeError::Internal(format!("package {id} has no exhorto body")))?;
        if body
            .actualizaciones
            .iter()
            .any(|a| a.actualizacion_origen_id == draft.actualizacion_origen_id)
        {
            return Err(ExchangeError::Validation(vec![exh_core::FieldError::new(
                "actualizacionOrigenId",
                format!(
                    "\"{}\" is already recorded for this exhorto",
                    draft.actualizacion_origen_id
                ),
            )]));
        }
        body.actualizaciones.push(Actualizacion {
            actualizacion_origen_id: draft.actualizacion_origen_id.clone(),
            tipo_actualizacion: draft.tipo_actualizacion,
            fecha_hora: draft.fecha_hora,
            descripcion: draft.descripcion,
            recibida: now,
        });
        exhorto.updated_at = now;

        tracing::info!(
            exhorto = %draft.exhorto_origin_id,
            actualizacion = %draft.actualizacion_origen_id,
            "actualizacion recorded"
        );
        Ok(ActualizacionRecorded {
            exhorto_id: draft.exhorto_origin_id.to_string(),
            actualizacion_origen_id: draft.actualizacion_origen_id.to_string(),
            fecha_hora: self.config.local_zone.render(now),
            changed: vec![id],
        })
    }

    // -- Snapshots and hydration -------------------------------------------

    /// A copy of the package's current state, for write-through.
    pub async fn snapshot(&self, id: &PackageId) -> Option<Package> {
        let handle = self.repo.get(id)?;
        let package = handle.lock().await;
        Some(package.clone())
    }

    /// Hold a package's lock while the caller stores it. Operations on the
    /// package wait until the guard is dropped, so stores of one package
    /// happen in the order its mutations did.
    pub async fn lock_for_write(&self, id: &PackageId) -> Option<OwnedMutexGuard<Package>> {
        let handle = self.repo.get(id)?;
        Some(handle.lock_owned().await)
    }

    /// Re-insert a package loaded from persistent storage.
    pub fn restore(&self, mut package: Package) -> Result<(), ExchangeError> {
        package.recount();
        self.repo.insert_new(package).map(|_| ())
    }

    // -- Internals ----------------------------------------------------------

    fn ensure_new(&self, kind: PackageKind, origin_id: &OriginId) -> Result<(), ExchangeError> {
        if self.repo.contains_origin(kind, origin_id) {
            return Err(ExchangeError::Duplicate {
                kind,
                origin_id: origin_id.to_string(),
            });
        }
        Ok(())
    }

    fn insert(&self, package: Package) -> Result<Created, ExchangeError> {
        let kind = package.kind;
        let id = package.id;
        let origin_id = package.origin_id.to_string();
        let created_at = package.created_at;
        let declared = package.files.len();

        self.repo.insert_new(package)?;

        metrics::counter!("exh_packages_created_total", "kind" => kind.as_str()).increment(1);
        tracing::info!(%kind, origin_id = %origin_id, declared, "package created");
        Ok(Created {
            origin_id,
            fecha_hora: self.config.local_zone.render(created_at),
            package_id: id,
            changed: vec![id],
        })
    }

    async fn view_by_origin(
        &self,
        kind: PackageKind,
        field: &str,
        origin_id: &str,
    ) -> Result<PackageView, ExchangeError> {
        let origin_id = parse_origin(field, origin_id)?;
        let handle = self
            .repo
            .find_by_origin(kind, &origin_id)
            .ok_or_else(|| ExchangeError::not_found(kind.as_str(), origin_id.as_str()))?;
        let package = handle.lock().await;
        Ok(PackageView::render(&package, &self.config.local_zone))
    }

    /// Receive into a located package. Digests are computed before the
    /// package lock is taken; everything after runs under it.
    ///
    /// When this upload can be the last one, everything completion needs
    /// is checked and reserved first, so a refusal leaves the file pending.
    async fn receive_into(
        &self,
        handle: PackageHandle,
        nombre_archivo: &str,
        bytes: &[u8],
    ) -> Result<Received, ExchangeError> {
        let digests = FileDigests::compute(bytes);
        let mut package = handle.lock().await;
        let now = self.clock.now();

        let completion = if package.remaining == 1 {
            Some(self.prepare_completion(&package).await?)
        } else {
            None
        };

        let received = reception::receive(
            &mut package,
            nombre_archivo,
            bytes,
            &digests,
            self.blobs.as_ref(),
            &self.config,
            now,
        )
        .await;
        let reception = match received {
            Ok(reception) => reception,
            Err(e) => {
                if let Some(folio) = completion.as_ref().and_then(|c| c.folio.as_ref()) {
                    self.repo.release_folio(folio, package.id);
                }
                return Err(e);
            }
        };
        metrics::counter!("exh_files_received_total", "kind" => package.kind.as_str())
            .increment(1);

        let mut changed = vec![package.id];
        let acuse = match (reception.completed, completion) {
            (true, Some(completion)) => self.complete(&mut package, completion, now, &mut changed)?,
            (true, None) => {
                return Err(ExchangeError::Internal(format!(
                    "{} {} completed unprepared",
                    package.kind, package.origin_id
                )))
            }
            (false, _) => Acuse::empty(package.kind),
        };

        Ok(Received {
            archivo: FileReceipt {
                nombre_archivo: package.files[reception.index].nombre_archivo.clone(),
                tamano: reception.tamano,
            },
            acuse,
            changed,
        })
    }

    /// Check that `package` can complete and take what completing needs: a
    /// reserved folio, or the locked exhorto of a respuesta.
    async fn prepare_completion(&self, package: &Package) -> Result<Completion, ExchangeError> {
        exh_state::advance(package.kind, package.state, Trigger::FilesComplete)?;

        match package.kind {
            PackageKind::Exhorto | PackageKind::Promocion => {
                let folio = Folio::generate();
                self.repo.assign_folio(&folio, package.id)?;
                Ok(Completion {
                    folio: Some(folio),
                    exhorto: None,
                })
            }
            PackageKind::Respuesta => {
                let parent_id = package
                    .parent
                    .as_ref()
                    .map(|p| p.id)
                    .ok_or_else(|| ExchangeError::Internal("respuesta without exhorto".into()))?;
                let parent_handle = self.repo.get(&parent_id).ok_or_else(|| {
                    ExchangeError::Internal(format!("exhorto {parent_id} missing from repository"))
                })?;
                let exhorto = parent_handle.lock_owned().await;
                exh_state::advance(exhorto.kind, exhorto.state, Trigger::ResponseFilesComplete)?;
                Ok(Completion {
                    folio: None,
                    exhorto: Some(exhorto),
                })
            }
        }
    }

    /// Advance a package whose last file just arrived and issue its acuse.
    /// Runs with the package's lock held, and a respuesta's exhorto lock
    /// taken after it.
    fn complete(
        &self,
        package: &mut Package,
        completion: Completion,
        now: DateTime<Utc>,
        changed: &mut Vec<PackageId>,
    ) -> Result<Acuse, ExchangeError> {
        lifecycle::apply(package, Trigger::FilesComplete, now)?;
        if let Some(folio) = completion.folio {
            package.folio = Some(folio);
        }
        if let Some(mut exhorto) = completion.exhorto {
            lifecycle::apply(&mut exhorto, Trigger::ResponseFilesComplete, now)?;
            changed.push(exhorto.id);
        }

        let issued = acuse::build(package, now, &self.config)?;
        package.acuse = Some(issued.clone());

        metrics::counter!("exh_packages_completed_total", "kind" => package.kind.as_str())
            .increment(1);
        tracing::info!(
            kind = %package.kind,
            origin_id = %package.origin_id,
            folio = issued.folio_seguimiento(),
            "package complete, acuse issued"
        );
        Ok(issued)
    }
}

/// What completing a package needs, taken before its last file is recorded.
struct Completion {
    folio: Option<Folio>,
    exhorto: Option<OwnedMutexGuard<Package>>,
}

fn parse_origin(field: &str, value: &str) -> Result<OriginId, ExchangeError> {
    OriginId::new(value).map_err(|e| ExchangeError::Validation(vec![e.at(field)]))
}

fn parent_ref(exhorto: &Package) -> ParentRef {
    ParentRef {
        id: exhorto.id,
        origin_id: exhorto.origin_id.clone(),
        folio: exhorto.folio.clone(),
    }
}
