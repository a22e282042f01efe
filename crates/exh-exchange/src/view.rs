//! Query projections.
//!
//! A [`PackageView`] is what a counterpart sees when it asks for a package:
//! every declared file, resolved reference names, the current state, the
//! folio and the acuse (empty shape until issued). Timestamps are rendered
//! in the configured local zone in protocol format.

use chrono::{DateTime, NaiveDateTime, Utc};
use exh_core::{LocalZone, PROTOCOL_DATETIME_FORMAT};
use exh_state::{DeclaredFileState, DocumentType, PackageKind, PackageState};
use serde::Serialize;

use crate::acuse::Acuse;
use crate::model::{
    Actualizacion, DeclaredFile, ExhortoBody, Package, PackageBody, Parte, PromocionBody,
    RespuestaBody, TipoDiligenciado, Video,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageView {
    pub tipo: PackageKind,
    pub origen_id: String,
    pub folio_seguimiento: Option<String>,
    pub estado: PackageState,
    pub creado: String,
    pub modificado: String,
    pub archivos_pendientes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exhorto: Option<ParentView>,
    pub archivos: Vec<ArchivoView>,
    pub acuse: Acuse,
    #[serde(flatten)]
    pub datos: BodyView,
}

/// The exhorto a promoción or respuesta belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentView {
    pub exhorto_origen_id: String,
    pub folio_seguimiento: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivoView {
    pub nombre_archivo: String,
    pub hash_sha1: String,
    pub hash_sha256: String,
    pub tipo_documento: DocumentType,
    pub tipo_documento_nombre: &'static str,
    pub estado: DeclaredFileState,
    pub fecha_hora_recepcion: Option<String>,
    pub tamano: Option<u64>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BodyView {
    Exhorto(ExhortoView),
    Promocion(PromocionView),
    Respuesta(RespuestaView),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhortoView {
    pub municipio_destino_id: String,
    pub municipio_destino_nombre: String,
    pub estado_destino_nombre: String,
    pub materia_clave: String,
    pub materia_nombre: String,
    pub estado_origen_id: String,
    pub estado_origen_nombre: String,
    pub municipio_origen_id: String,
    pub municipio_origen_nombre: String,
    pub juzgado_origen_id: String,
    pub juzgado_origen_nombre: String,
    pub numero_expediente_origen: String,
    pub numero_oficio_origen: Option<String>,
    pub tipo_juicio_asunto_delitos: String,
    pub juez_exhortante: Option<String>,
    pub partes: Vec<Parte>,
    pub fojas: u32,
    pub dias_responder: u32,
    pub tipo_diligencia_id: Option<String>,
    pub tipo_diligencia_nombre: Option<String>,
    pub tipo_diligenciacion_nombre: Option<String>,
    pub fecha_origen: Option<String>,
    pub observaciones: Option<String>,
    pub area_clave: String,
    pub area_nombre: String,
    pub autoridad_clave: String,
    pub autoridad_nombre: String,
    pub actualizaciones: Vec<ActualizacionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualizacionView {
    pub actualizacion_origen_id: String,
    pub tipo_actualizacion: String,
    pub fecha_hora: String,
    pub descripcion: Option<String>,
    pub fecha_hora_recepcion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromocionView {
    pub folio_origen_promocion: String,
    pub promoventes: Vec<Parte>,
    pub fojas: u32,
    pub fecha_origen: Option<String>,
    pub observaciones: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RespuestaView {
    pub municipio_turnado_id: String,
    pub municipio_turnado_nombre: String,
    pub area_turnado_id: String,
    pub area_turnado_nombre: String,
    pub numero_exhorto: Option<String>,
    pub tipo_diligenciado: TipoDiligenciado,
    pub observaciones: Option<String>,
    pub videos: Vec<VideoView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoView {
    pub titulo: String,
    pub descripcion: Option<String>,
    pub fecha: Option<String>,
    pub url_acceso: String,
}

impl PackageView {
    /// Project `package` with timestamps rendered in `zone`.
    pub fn render(package: &Package, zone: &LocalZone) -> Self {
        let at = |t: DateTime<Utc>| zone.render(t);
        Self {
            tipo: package.kind,
            origen_id: package.origin_id.to_string(),
            folio_seguimiento: package.folio.as_ref().map(ToString::to_string),
            estado: package.state,
            creado: at(package.created_at),
            modificado: at(package.updated_at),
            archivos_pendientes: package.remaining,
            exhorto: package.parent.as_ref().map(|p| ParentView {
                exhorto_origen_id: p.origin_id.to_string(),
                folio_seguimiento: p.folio.as_ref().map(ToString::to_string),
            }),
            archivos: package.files.iter().map(|f| archivo(f, zone)).collect(),
            acuse: package
                .acuse
                .clone()
                .unwrap_or_else(|| Acuse::empty(package.kind)),
            datos: match &package.body {
                PackageBody::Exhorto(b) => BodyView::Exhorto(exhorto(b, zone)),
                PackageBody::Promocion(b) => BodyView::Promocion(promocion(package, b)),
                PackageBody::Respuesta(b) => BodyView::Respuesta(respuesta(b)),
            },
        }
    }
}

fn protocol(dt: &NaiveDateTime) -> String {
    dt.format(PROTOCOL_DATETIME_FORMAT).to_string()
}

fn archivo(f: &DeclaredFile, zone: &LocalZone) -> ArchivoView {
    ArchivoView {
        nombre_archivo: f.nombre_archivo.clone(),
        hash_sha1: f.hash_sha1.as_ref().map(|d| d.hex.clone()).unwrap_or_default(),
        hash_sha256: f.hash_sha256.as_ref().map(|d| d.hex.clone()).unwrap_or_default(),
        tipo_documento: f.tipo_documento,
        tipo_documento_nombre: f.tipo_documento.nombre(),
        estado: f.state,
        fecha_hora_recepcion: f.received_at.map(|t| zone.render(t)),
        tamano: f.size,
        url: f.url.clone(),
    }
}

fn exhorto(b: &ExhortoBody, zone: &LocalZone) -> ExhortoView {
    ExhortoView {
        municipio_destino_id: b.municipio_destino.municipio.clave.clone(),
        municipio_destino_nombre: b.municipio_destino.municipio.nombre.clone(),
        estado_destino_nombre: b.municipio_destino.estado.nombre.clone(),
        materia_clave: b.materia.clave.clone(),
        materia_nombre: b.materia.nombre.clone(),
        estado_origen_id: b.origen.estado.clave.clone(),
        estado_origen_nombre: b.origen.estado.nombre.clone(),
        municipio_origen_id: b.origen.municipio.clave.clone(),
        municipio_origen_nombre: b.origen.municipio.nombre.clone(),
        juzgado_origen_id: b.juzgado_origen_id.clone(),
        juzgado_origen_nombre: b.juzgado_origen_nombre.clone(),
        numero_expediente_origen: b.numero_expediente_origen.clone(),
        numero_oficio_origen: b.numero_oficio_origen.clone(),
        tipo_juicio_asunto_delitos: b.tipo_juicio_asunto_delitos.clone(),
        juez_exhortante: b.juez_exhortante.clone(),
        partes: b.partes.clone(),
        fojas: b.fojas,
        dias_responder: b.dias_responder,
        tipo_diligencia_id: b.tipo_diligencia.as_ref().map(|t| t.clave.clone()),
        tipo_diligencia_nombre: b.tipo_diligencia.as_ref().map(|t| t.nombre.clone()),
        tipo_diligenciacion_nombre: b.tipo_diligenciacion_nombre.clone(),
        fecha_origen: b.fecha_origen.as_ref().map(protocol),
        observaciones: b.observaciones.clone(),
        area_clave: b.area.clave.clone(),
        area_nombre: b.area.nombre.clone(),
        autoridad_clave: b.autoridad.clave.clone(),
        autoridad_nombre: b.autoridad.nombre.clone(),
        actualizaciones: b
            .actualizaciones
            .iter()
            .map(|a| actualizacion(a, zone))
            .collect(),
    }
}

fn actualizacion(a: &Actualizacion, zone: &LocalZone) -> ActualizacionView {
    ActualizacionView {
        actualizacion_origen_id: a.actualizacion_origen_id.to_string(),
        tipo_actualizacion: a.tipo_actualizacion.clone(),
        fecha_hora: protocol(&a.fecha_hora),
        descripcion: a.descripcion.clone(),
        fecha_hora_recepcion: zone.render(a.recibida),
    }
}

fn promocion(package: &Package, b: &PromocionBody) -> PromocionView {
    PromocionView {
        folio_origen_promocion: package.origin_id.to_string(),
        promoventes: b.promoventes.clone(),
        fojas: b.fojas,
        fecha_origen: b.fecha_origen.as_ref().map(protocol),
        observaciones: b.observaciones.clone(),
    }
}

fn respuesta(b: &RespuestaBody) -> RespuestaView {
    RespuestaView {
        municipio_turnado_id: b.municipio_turnado.municipio.clave.clone(),
        municipio_turnado_nombre: b.municipio_turnado.municipio.nombre.clone(),
        area_turnado_id: b.area_turnado.clave.clone(),
        area_turnado_nombre: b
            .area_turnado_nombre
            .clone()
            .unwrap_or_else(|| b.area_turnado.nombre.clone()),
        numero_exhorto: b.numero_exhorto.clone(),
        tipo_diligenciado: b.tipo_diligenciado,
        observaciones: b.observaciones.clone(),
        videos: b.videos.iter().map(video).collect(),
    }
}

fn video(v: &Video) -> VideoView {
    VideoView {
        titulo: v.titulo.clone(),
        descripcion: v.descripcion.clone(),
        fecha: v.fecha.as_ref().map(protocol),
        url_acceso: v.url_acceso.clone(),
    }
}
