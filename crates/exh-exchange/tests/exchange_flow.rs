//! # Integration Tests for exh-exchange
//!
//! Drives the service facade end to end: declare, upload, complete, query.
//! Uses the seed catalog shipped with the workspace, an in-memory blob
//! store and a fixed clock.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use exh_catalog::InMemoryCatalog;
use exh_core::{sha1_hex, sha256_hex, FixedClock, LocalZone};
use exh_exchange::payload::{
    ActualizacionPayload, ArchivoPayload, Code, ExhortoPayload, PromocionPayload, RespuestaPayload,
};
use exh_exchange::{Acuse, ExchangeConfig, ExchangeError, ExchangeService};
use exh_state::{DeclaredFileState, PackageKind, PackageState};
use exh_storage::MemoryBlobStore;

const SEED: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../catalog/seed.yaml");

struct Harness {
    service: ExchangeService,
    blobs: MemoryBlobStore,
}

fn harness() -> Harness {
    harness_with(ExchangeConfig {
        local_zone: LocalZone::parse("-06:00").unwrap(),
        public_base_url: Some("https://exhortos.example.gob.mx/".to_string()),
        ..ExchangeConfig::default()
    })
}

fn harness_with(config: ExchangeConfig) -> Harness {
    let catalog = InMemoryCatalog::from_yaml_file(std::path::Path::new(SEED)).unwrap();
    let blobs = MemoryBlobStore::new();
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 10, 16, 30, 0).unwrap());
    let service = ExchangeService::new(
        Arc::new(catalog),
        Arc::new(blobs.clone()),
        Arc::new(clock),
        config,
    );
    Harness { service, blobs }
}

fn archivo(nombre: &str) -> ArchivoPayload {
    ArchivoPayload {
        nombre_archivo: Some(nombre.into()),
        hash_sha1: None,
        hash_sha256: None,
        tipo_documento: Some(1.into()),
    }
}

fn exhorto(origin: &str, files: &[&str]) -> ExhortoPayload {
    ExhortoPayload {
        exhorto_origen_id: Some(origin.into()),
        municipio_destino_id: Some(Code::Number(30)),
        materia_clave: Some("civ".into()),
        estado_origen_id: Some(Code::Number(19)),
        municipio_origen_id: Some(Code::Text("39".to_string())),
        juzgado_origen_id: Some("NL-J3-CIV".into()),
        juzgado_origen_nombre: Some("JUZGADO TERCERO CIVIL MONTERREY".into()),
        numero_expediente_origen: Some("1024/2024".into()),
        tipo_juicio_asunto_delitos: Some("ORDINARIO CIVIL".into()),
        fojas: Some(12.into()),
        dias_responder: Some(15.into()),
        tipo_diligencia_id: Some(Code::Number(1)),
        archivos: files.iter().map(|f| archivo(f)).collect(),
        ..Default::default()
    }
}

async fn received_exhorto(h: &Harness, origin: &str) -> String {
    h.service
        .create_exhorto(&exhorto(origin, &["oficio.pdf"]))
        .await
        .unwrap();
    let r = h
        .service
        .receive_exhorto_file(origin, "oficio.pdf", b"%PDF-1.4 oficio")
        .await
        .unwrap();
    r.acuse.folio_seguimiento().to_string()
}

// -- Exhortos -----------------------------------------------------------------

#[tokio::test]
async fn two_files_complete_on_second_upload() {
    let h = harness();
    let created = h
        .service
        .create_exhorto(&exhorto("EXH-2024-001", &["a.pdf", "b.pdf"]))
        .await
        .unwrap();
    assert_eq!(created.origin_id, "EXH-2024-001");
    assert_eq!(created.fecha_hora, "2024-05-10T10:30:00");

    let first = h
        .service
        .receive_exhorto_file("EXH-2024-001", "a.pdf", b"first")
        .await
        .unwrap();
    assert!(first.acuse.is_empty());
    assert_eq!(first.archivo.nombre_archivo, "a.pdf");
    assert_eq!(first.archivo.tamano, 5);
    let view = h.service.exhorto_by_origin("EXH-2024-001").await.unwrap();
    assert_eq!(view.estado, PackageState::Pending);
    assert!(view.folio_seguimiento.is_none());

    let second = h
        .service
        .receive_exhorto_file("EXH-2024-001", "b.pdf", b"second")
        .await
        .unwrap();
    let Acuse::Exhorto(acuse) = &second.acuse else {
        panic!("expected exhorto acuse, got {:?}", second.acuse);
    };
    assert_eq!(acuse.exhorto_origen_id, "EXH-2024-001");
    assert_eq!(acuse.fecha_hora_recepcion.as_deref(), Some("2024-05-10T10:30:00"));
    assert_eq!(acuse.municipio_area_recibe_id, "030");
    assert_eq!(acuse.area_recibe_id, "ND");
    assert_eq!(
        acuse.url_info,
        format!(
            "https://exhortos.example.gob.mx/v1/exh_exhortos/{}",
            acuse.folio_seguimiento
        )
    );

    let view = h
        .service
        .exhorto_by_folio(&acuse.folio_seguimiento)
        .await
        .unwrap();
    assert_eq!(view.estado, PackageState::Received);
    assert_eq!(view.archivos_pendientes, 0);
    assert_eq!(view.acuse, second.acuse);
    assert_eq!(h.blobs.len(), 2);
}

#[tokio::test]
async fn n_files_yield_one_filled_acuse() {
    let h = harness();
    let names: Vec<String> = (1..=5).map(|i| format!("anexo{i}.pdf")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    h.service
        .create_exhorto(&exhorto("EXH-N", &refs))
        .await
        .unwrap();

    let mut filled = 0;
    for (i, name) in names.iter().enumerate() {
        let r = h
            .service
            .receive_exhorto_file("EXH-N", name, name.as_bytes())
            .await
            .unwrap();
        if r.acuse.is_empty() {
            assert!(i < names.len() - 1);
        } else {
            filled += 1;
            assert_eq!(i, names.len() - 1);
        }
    }
    assert_eq!(filled, 1);

    let err = h
        .service
        .receive_exhorto_file("EXH-N", "anexo1.pdf", b"again")
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::DeclarationNotFound(_)));
}

#[tokio::test]
async fn sha256_mismatch_keeps_file_pending() {
    let h = harness();
    let mut payload = exhorto("EXH-HASH", &["x.pdf"]);
    payload.archivos[0].hash_sha256 = Some(sha256_hex(b"expected").into());
    payload.archivos[0].hash_sha1 = Some(sha1_hex(b"expected").into());
    h.service.create_exhorto(&payload).await.unwrap();

    let err = h
        .service
        .receive_exhorto_file("EXH-HASH", "x.pdf", b"tampered")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INTEGRITY_ERROR");

    let view = h.service.exhorto_by_origin("EXH-HASH").await.unwrap();
    assert_eq!(view.estado, PackageState::Pending);
    assert_eq!(view.archivos_pendientes, 1);

    let ok = h
        .service
        .receive_exhorto_file("EXH-HASH", "x.pdf", b"expected")
        .await
        .unwrap();
    assert!(!ok.acuse.is_empty());
}

#[tokio::test]
async fn unsupported_type_is_reported_before_lookup() {
    let h = harness();
    let err = h
        .service
        .receive_exhorto_file("NO-SUCH-EXHORTO", "virus.exe", b"MZ")
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::UnsupportedFileType(_)));
}

#[tokio::test]
async fn duplicate_origin_leaves_first_untouched() {
    let h = harness();
    h.service
        .create_exhorto(&exhorto("EXH-DUP", &["a.pdf"]))
        .await
        .unwrap();
    let err = h
        .service
        .create_exhorto(&exhorto("EXH-DUP", &["other.pdf"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::Duplicate { kind: PackageKind::Exhorto, .. }));

    let view = h.service.exhorto_by_origin("EXH-DUP").await.unwrap();
    assert_eq!(view.archivos.len(), 1);
    assert_eq!(view.archivos[0].nombre_archivo, "a.pdf");
}

#[tokio::test]
async fn unknown_references_are_named() {
    let h = harness();
    let mut payload = exhorto("EXH-REF", &["a.pdf"]);
    payload.materia_clave = Some("XYZ".into());
    let err = h.service.create_exhorto(&payload).await.unwrap_err();
    match err {
        ExchangeError::UnknownReference { dimension, code } => {
            assert_eq!(dimension.as_str(), "materia");
            assert_eq!(code, "XYZ");
        }
        other => panic!("expected unknown reference, got {other:?}"),
    }

    let mut payload = exhorto("EXH-REF", &["a.pdf"]);
    payload.municipio_destino_id = Some(Code::Text("1234".into()));
    let err = h.service.create_exhorto(&payload).await.unwrap_err();
    assert_eq!(err.code(), "UNKNOWN_REFERENCE");
    assert!(h.service.repository().is_empty());
}

#[tokio::test]
async fn missing_default_stops_creation() {
    let mut config = ExchangeConfig::default();
    config.defaults.area_clave = "NO-EXISTE".to_string();
    let h = harness_with(config);
    let err = h
        .service
        .create_exhorto(&exhorto("EXH-DEF", &["a.pdf"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::MissingDefault { .. }));
    assert!(h.service.repository().is_empty());
}

#[tokio::test]
async fn concurrent_final_uploads_issue_one_acuse() {
    let h = harness();
    h.service
        .create_exhorto(&exhorto("EXH-RACE", &["a.pdf", "b.pdf", "c.pdf"]))
        .await
        .unwrap();
    h.service
        .receive_exhorto_file("EXH-RACE", "a.pdf", b"a")
        .await
        .unwrap();

    let tasks: Vec<_> = ["b.pdf", "c.pdf"]
        .into_iter()
        .map(|name| {
            let service = h.service.clone();
            tokio::spawn(async move {
                service
                    .receive_exhorto_file("EXH-RACE", name, name.as_bytes())
                    .await
            })
        })
        .collect();

    let mut filled = 0;
    for task in tasks {
        let received = task.await.unwrap().unwrap();
        if !received.acuse.is_empty() {
            filled += 1;
        }
    }
    assert_eq!(filled, 1);
    let view = h.service.exhorto_by_origin("EXH-RACE").await.unwrap();
    assert_eq!(view.estado, PackageState::Received);
    assert_eq!(view.archivos_pendientes, 0);
}

#[tokio::test]
async fn concurrent_same_name_uploads_fulfil_once() {
    let h = harness();
    h.service
        .create_exhorto(&exhorto("EXH-SAME", &["a.pdf"]))
        .await
        .unwrap();

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let service = h.service.clone();
            tokio::spawn(async move {
                service
                    .receive_exhorto_file("EXH-SAME", "a.pdf", b"bytes")
                    .await
            })
        })
        .collect();

    let mut ok = 0;
    let mut not_found = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => ok += 1,
            Err(ExchangeError::DeclarationNotFound(_)) => not_found += 1,
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }
    assert_eq!((ok, not_found), (1, 3));
}

// -- Promociones --------------------------------------------------------------

#[tokio::test]
async fn promocion_gets_its_own_folio() {
    let h = harness();
    let folio = received_exhorto(&h, "EXH-P").await;

    let payload = PromocionPayload {
        folio_seguimiento: Some(folio.clone().into()),
        folio_origen_promocion: Some("PROM-1".into()),
        fojas: Some(3.into()),
        archivos: vec![archivo("promocion.pdf")],
        ..Default::default()
    };
    h.service.create_promocion(&payload).await.unwrap();

    let r = h
        .service
        .receive_promocion_file("PROM-1", "promocion.pdf", b"promocion")
        .await
        .unwrap();
    let Acuse::Promocion(acuse) = &r.acuse else {
        panic!("expected promocion acuse, got {:?}", r.acuse);
    };
    assert_eq!(acuse.folio_origen_promocion, "PROM-1");
    assert_eq!(acuse.folio_seguimiento, folio);
    assert_ne!(acuse.folio_promocion_recibida, folio);
    assert!(!acuse.folio_promocion_recibida.is_empty());

    let view = h.service.promocion_by_origin("PROM-1").await.unwrap();
    assert_eq!(view.estado, PackageState::Sent);
}

#[tokio::test]
async fn promocion_for_unknown_folio_is_not_found() {
    let h = harness();
    let payload = PromocionPayload {
        folio_seguimiento: Some("0b0d3c1e-8f2a-4d8e-9c53-5f5e6a7b8c9d".into()),
        folio_origen_promocion: Some("PROM-X".into()),
        fojas: Some(1.into()),
        archivos: vec![archivo("p.pdf")],
        ..Default::default()
    };
    let err = h.service.create_promocion(&payload).await.unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

// -- Respuestas ---------------------------------------------------------------

fn respuesta(exhorto_id: &str, origin: &str) -> RespuestaPayload {
    RespuestaPayload {
        exhorto_id: Some(exhorto_id.into()),
        respuesta_origen_id: Some(origin.into()),
        municipio_turnado_id: Some(Code::Number(35)),
        area_turnado_id: Some("OCP-TRC".into()),
        tipo_diligenciado: Some(2.into()),
        archivos: vec![archivo("respuesta.pdf"), archivo("acta.pdf")],
        ..Default::default()
    }
}

#[tokio::test]
async fn respuesta_drives_exhorto_to_answered() {
    let h = harness();
    let folio = received_exhorto(&h, "EXH-R").await;

    let created = h
        .service
        .create_respuesta(&respuesta("EXH-R", "RESP-1"))
        .await
        .unwrap();
    assert_eq!(created.changed.len(), 2);
    let exhorto = h.service.exhorto_by_origin("EXH-R").await.unwrap();
    assert_eq!(exhorto.estado, PackageState::Responded);

    let first = h
        .service
        .receive_respuesta_file("EXH-R", "RESP-1", "respuesta.pdf", b"r")
        .await
        .unwrap();
    assert!(first.acuse.is_empty());
    let last = h
        .service
        .receive_respuesta_file("EXH-R", "RESP-1", "acta.pdf", b"acta")
        .await
        .unwrap();
    assert_eq!(last.changed.len(), 2);
    let Acuse::Respuesta(acuse) = &last.acuse else {
        panic!("expected respuesta acuse, got {:?}", last.acuse);
    };
    assert_eq!(acuse.exhorto_id, "EXH-R");
    assert_eq!(acuse.respuesta_origen_id, "RESP-1");
    assert_eq!(acuse.folio_seguimiento, folio);
    assert_eq!(acuse.area_turnado_id, "OCP-TRC");

    let exhorto = h.service.exhorto_by_origin("EXH-R").await.unwrap();
    assert_eq!(exhorto.estado, PackageState::Answered);
    let resp = h.service.respuesta_by_origin("RESP-1").await.unwrap();
    assert_eq!(resp.estado, PackageState::Answered);
}

#[tokio::test]
async fn respuesta_requires_received_exhorto() {
    let h = harness();
    h.service
        .create_exhorto(&exhorto("EXH-PEND", &["a.pdf"]))
        .await
        .unwrap();
    let err = h
        .service
        .create_respuesta(&respuesta("EXH-PEND", "RESP-P"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExchangeError::InvalidState {
            state: PackageState::Pending,
            ..
        }
    ));

    let err = h
        .service
        .create_respuesta(&respuesta("EXH-NADA", "RESP-P"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[tokio::test]
async fn second_respuesta_is_rejected() {
    let h = harness();
    received_exhorto(&h, "EXH-2R").await;
    h.service
        .create_respuesta(&respuesta("EXH-2R", "RESP-A"))
        .await
        .unwrap();
    let err = h
        .service
        .create_respuesta(&respuesta("EXH-2R", "RESP-B"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_STATE");
}

#[tokio::test]
async fn respuesta_upload_checks_exhorto_id() {
    let h = harness();
    received_exhorto(&h, "EXH-ID").await;
    h.service
        .create_respuesta(&respuesta("EXH-ID", "RESP-ID"))
        .await
        .unwrap();
    let err = h
        .service
        .receive_respuesta_file("EXH-OTRO", "RESP-ID", "acta.pdf", b"acta")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[tokio::test]
async fn omitted_area_uses_default() {
    let h = harness();
    received_exhorto(&h, "EXH-ND").await;
    let mut payload = respuesta("EXH-ND", "RESP-ND");
    payload.area_turnado_id = None;
    payload.archivos = vec![archivo("r.pdf")];
    h.service.create_respuesta(&payload).await.unwrap();
    let r = h
        .service
        .receive_respuesta_file("EXH-ND", "RESP-ND", "r.pdf", b"r")
        .await
        .unwrap();
    let Acuse::Respuesta(acuse) = r.acuse else {
        panic!("expected respuesta acuse");
    };
    assert_eq!(acuse.area_turnado_id, "ND");
    assert_eq!(acuse.area_turnado_nombre, "NO DEFINIDO");
}

// -- Actualizaciones ----------------------------------------------------------

fn actualizacion(exhorto_id: &str, origin: &str) -> ActualizacionPayload {
    ActualizacionPayload {
        exhorto_id: Some(exhorto_id.into()),
        actualizacion_origen_id: Some(origin.into()),
        tipo_actualizacion: Some("AreaTurnado".into()),
        fecha_hora: Some("2024-05-11T09:00:00".into()),
        descripcion: Some("Turnado a juzgado civil".into()),
    }
}

#[tokio::test]
async fn actualizaciones_are_appended_once() {
    let h = harness();
    received_exhorto(&h, "EXH-ACT").await;

    let recorded = h
        .service
        .record_actualizacion(&actualizacion("EXH-ACT", "ACT-1"))
        .await
        .unwrap();
    assert_eq!(recorded.actualizacion_origen_id, "ACT-1");

    let err = h
        .service
        .record_actualizacion(&actualizacion("EXH-ACT", "ACT-1"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let view = h.service.exhorto_by_origin("EXH-ACT").await.unwrap();
    assert_eq!(view.estado, PackageState::Received);
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["actualizaciones"].as_array().unwrap().len(), 1);
    assert_eq!(json["actualizaciones"][0]["fechaHora"], "2024-05-11T09:00:00");
}

#[tokio::test]
async fn actualizacion_needs_received_exhorto() {
    let h = harness();
    h.service
        .create_exhorto(&exhorto("EXH-NOACT", &["a.pdf"]))
        .await
        .unwrap();
    let err = h
        .service
        .record_actualizacion(&actualizacion("EXH-NOACT", "ACT-1"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_STATE");
}

// -- Snapshots ----------------------------------------------------------------

#[tokio::test]
async fn snapshot_restores_into_fresh_service() {
    let h = harness();
    let folio = received_exhorto(&h, "EXH-SNAP").await;
    let handle = h
        .service
        .repository()
        .find_by_origin(PackageKind::Exhorto, &exh_core::OriginId::new("EXH-SNAP").unwrap())
        .unwrap();
    let id = handle.lock().await.id;
    let snapshot = h.service.snapshot(&id).await.unwrap();
    let json = serde_json::to_value(&snapshot).unwrap();

    let fresh = harness();
    fresh
        .service
        .restore(serde_json::from_value(json).unwrap())
        .unwrap();
    let view = fresh.service.exhorto_by_folio(&folio).await.unwrap();
    assert_eq!(view.estado, PackageState::Received);
    assert!(!view.acuse.is_empty());
}

#[tokio::test]
async fn refused_completion_leaves_last_file_pending() {
    let h = harness();
    h.service
        .create_exhorto(&exhorto("EXH-STUCK", &["oficio.pdf"]))
        .await
        .unwrap();
    let handle = h
        .service
        .repository()
        .find_by_origin(PackageKind::Exhorto, &exh_core::OriginId::new("EXH-STUCK").unwrap())
        .unwrap();
    let id = handle.lock().await.id;
    let mut json = serde_json::to_value(h.service.snapshot(&id).await.unwrap()).unwrap();
    // A promoción state: no exhorto transition leaves it.
    json["state"] = serde_json::json!("SENT");

    let fresh = harness();
    fresh
        .service
        .restore(serde_json::from_value(json).unwrap())
        .unwrap();
    let err = fresh
        .service
        .receive_exhorto_file("EXH-STUCK", "oficio.pdf", b"%PDF-1.4 stuck")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INTERNAL_ERROR");

    let view = fresh.service.exhorto_by_origin("EXH-STUCK").await.unwrap();
    assert_eq!(view.archivos_pendientes, 1);
    assert_eq!(view.archivos[0].estado, DeclaredFileState::Pending);
    assert!(view.acuse.is_empty());
    assert!(fresh.blobs.is_empty());
}

#[tokio::test]
async fn rejected_last_file_can_be_sent_again() {
    let h = harness();
    let mut payload = exhorto("EXH-RETRY", &["oficio.pdf"]);
    payload.archivos[0].hash_sha256 = Some(sha256_hex(b"expected").into());
    h.service.create_exhorto(&payload).await.unwrap();

    let err = h
        .service
        .receive_exhorto_file("EXH-RETRY", "oficio.pdf", b"tampered")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INTEGRITY_ERROR");

    let received = h
        .service
        .receive_exhorto_file("EXH-RETRY", "oficio.pdf", b"expected")
        .await
        .unwrap();
    let folio = received.acuse.folio_seguimiento().to_string();
    assert!(!folio.is_empty());
    let view = h.service.exhorto_by_folio(&folio).await.unwrap();
    assert_eq!(view.estado, PackageState::Received);
}
