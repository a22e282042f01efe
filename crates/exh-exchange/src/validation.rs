//! # Validation Pipeline
//!
//! Turns a wire payload into a normalized draft, or into the complete list
//! of field errors. No check stops the pipeline: every field is examined
//! and every failure is collected in a [`ValidationReport`], then the
//! payload is accepted or rejected as a whole.
//!
//! Field paths use the protocol's names: `archivos[1].hashSha256`,
//! `partes[0].genero`.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use exh_core::{
    parse_protocol_datetime, DeclaredDigest, DigestAlgorithm, FieldError, Folio, OriginId,
};
use exh_state::DocumentType;

use crate::error::ExchangeError;
use crate::model::{DeclaredFileSpec, Genero, Parte, TipoDiligenciado, TipoParte, Video};
use crate::payload::{
    json_type, ActualizacionPayload, ArchivoPayload, Code, ExhortoPayload, Flag, Integer,
    PartePayload, PromocionPayload, RespuestaPayload, Text, VideoPayload,
};

/// The single accepted upload extension.
pub const PDF_EXTENSION: &str = ".pdf";

/// Whether a file name ends in `.pdf`, ignoring case, with a non-empty stem.
pub fn has_pdf_extension(name: &str) -> bool {
    name.len() > PDF_EXTENSION.len() && name.to_ascii_lowercase().ends_with(PDF_EXTENSION)
}

// ── Report ───────────────────────────────────────────────────────────

/// Accumulated field errors.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// `Ok(())` when nothing failed, else every error at once.
    pub fn into_result(self) -> Result<(), ExchangeError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ExchangeError::Validation(self.errors))
        }
    }

    // -- Field checks -------------------------------------------------------
    //
    // Each check returns the normalized value, or `None` after recording
    // why it failed. Optional fields return `None` without an error when
    // absent or blank. A value of the wrong JSON type is reported once,
    // never again as missing.

    /// The string inside `value`. `Err` once a wrong type was recorded.
    fn text<'a>(&mut self, field: &str, value: Option<&'a Text>) -> Result<Option<&'a str>, ()> {
        match value {
            None => Ok(None),
            Some(v) => match v.as_str() {
                Some(s) => Ok(Some(s)),
                None => {
                    self.add(field, format!("must be a string, not {}", v.sent_type()));
                    Err(())
                }
            },
        }
    }

    /// The integer inside `value`. `Err` once a wrong type was recorded.
    fn integer(&mut self, field: &str, value: Option<&Integer>) -> Result<Option<i64>, ()> {
        match value {
            None => Ok(None),
            Some(v) => match v.as_i64() {
                Some(n) => Ok(Some(n)),
                None => {
                    self.add(field, format!("must be an integer, not {}", v.sent_type()));
                    Err(())
                }
            },
        }
    }

    /// Trimmed, non-empty string.
    pub fn required(&mut self, field: &str, value: Option<&Text>) -> Option<String> {
        let v = optional(self.text(field, value).ok()?);
        if v.is_none() {
            self.add(field, "is required");
        }
        v
    }

    /// Trimmed string, `None` when absent or blank.
    pub fn optional_text(&mut self, field: &str, value: Option<&Text>) -> Option<String> {
        optional(self.text(field, value).ok()?)
    }

    /// Boolean, `false` when absent.
    pub fn flag(&mut self, field: &str, value: Option<&Flag>) -> bool {
        match value {
            None => false,
            Some(v) => match v.valid() {
                Some(b) => *b,
                None => {
                    self.add(field, format!("must be true or false, not {}", v.sent_type()));
                    false
                }
            },
        }
    }

    /// Required origin id.
    pub fn origin_id(&mut self, field: &str, value: Option<&Text>) -> Option<OriginId> {
        let raw = self.required(field, value)?;
        match OriginId::new(raw) {
            Ok(id) => Some(id),
            Err(e) => {
                self.push(e.at(field));
                None
            }
        }
    }

    /// Required tracking folio.
    pub fn folio(&mut self, field: &str, value: Option<&Text>) -> Option<Folio> {
        let raw = self.required(field, value)?;
        match Folio::parse(&raw) {
            Ok(f) => Some(f),
            Err(e) => {
                self.push(e.at(field));
                None
            }
        }
    }

    /// Optional catalog code.
    pub fn optional_code(&mut self, field: &str, value: Option<&Code>) -> Option<String> {
        let code = value?;
        match code.as_text() {
            Some(text) => Some(text).filter(|s| !s.is_empty()),
            None => {
                if let Code::Other(v) = code {
                    self.add(field, format!("must be a number or a string, not {}", json_type(v)));
                }
                None
            }
        }
    }

    /// Required catalog code.
    pub fn code(&mut self, field: &str, value: Option<&Code>) -> Option<String> {
        let wrong_type = matches!(value, Some(Code::Other(_)));
        let v = self.optional_code(field, value);
        if v.is_none() && !wrong_type {
            self.add(field, "is required");
        }
        v
    }

    /// Required integer.
    pub fn required_integer(&mut self, field: &str, value: Option<&Integer>) -> Option<i64> {
        match self.integer(field, value) {
            Ok(Some(n)) => Some(n),
            Ok(None) => {
                self.add(field, "is required");
                None
            }
            Err(()) => None,
        }
    }

    /// Required non-negative count.
    pub fn count(&mut self, field: &str, value: Option<&Integer>) -> Option<u32> {
        let n = self.required_integer(field, value)?;
        if n < 0 {
            self.add(field, "must not be negative");
            return None;
        }
        match u32::try_from(n) {
            Ok(v) => Some(v),
            Err(_) => {
                self.add(field, "is too large");
                None
            }
        }
    }

    fn datetime(&mut self, field: &str, raw: &str) -> Option<NaiveDateTime> {
        match parse_protocol_datetime(raw) {
            Ok(dt) => Some(dt),
            Err(e) => {
                self.push(e.at(field));
                None
            }
        }
    }

    /// Optional date-time in protocol format.
    pub fn optional_datetime(&mut self, field: &str, value: Option<&Text>) -> Option<NaiveDateTime> {
        let raw = self.optional_text(field, value)?;
        self.datetime(field, &raw)
    }

    /// Required date-time in protocol format.
    pub fn required_datetime(&mut self, field: &str, value: Option<&Text>) -> Option<NaiveDateTime> {
        let raw = self.required(field, value)?;
        self.datetime(field, &raw)
    }

    /// The declared-file manifest. Must be non-empty, with unique `.pdf`
    /// names.
    pub fn archivos(&mut self, items: &[ArchivoPayload]) -> Vec<DeclaredFileSpec> {
        if items.is_empty() {
            self.add("archivos", "must declare at least one file");
        }
        let mut seen = HashSet::new();
        let mut specs = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let at = |f: &str| format!("archivos[{i}].{f}");
            let nombre = self.required(&at("nombreArchivo"), item.nombre_archivo.as_ref());
            if let Some(n) = &nombre {
                if !has_pdf_extension(n) {
                    self.add(at("nombreArchivo"), format!("\"{n}\" must end in .pdf"));
                } else if !seen.insert(n.clone()) {
                    self.add(at("nombreArchivo"), format!("\"{n}\" is declared more than once"));
                }
            }
            let sha1 = self.digest(&at("hashSha1"), DigestAlgorithm::Sha1, item.hash_sha1.as_ref());
            let sha256 =
                self.digest(&at("hashSha256"), DigestAlgorithm::Sha256, item.hash_sha256.as_ref());
            let tipo = self
                .required_integer(&at("tipoDocumento"), item.tipo_documento.as_ref())
                .and_then(|code| {
                    let t = DocumentType::from_code(code);
                    if t.is_none() {
                        self.add(at("tipoDocumento"), format!("{code} is not one of 1, 2, 3"));
                    }
                    t
                });
            if let (Some(nombre_archivo), Ok(hash_sha1), Ok(hash_sha256), Some(tipo_documento)) =
                (nombre, sha1, sha256, tipo)
            {
                specs.push(DeclaredFileSpec {
                    nombre_archivo,
                    hash_sha1,
                    hash_sha256,
                    tipo_documento,
                });
            }
        }
        specs
    }

    fn digest(
        &mut self,
        field: &str,
        algorithm: DigestAlgorithm,
        value: Option<&Text>,
    ) -> Result<Option<DeclaredDigest>, ()> {
        let raw = self.text(field, value)?;
        DeclaredDigest::parse(algorithm, raw.unwrap_or("")).map_err(|e| self.push(e.at(field)))
    }

    /// Parties (`partes` or `promoventes`).
    pub fn partes(&mut self, list: &str, items: &[PartePayload]) -> Vec<Parte> {
        let mut out = Vec::with_capacity(items.len());
        for (i, p) in items.iter().enumerate() {
            let at = |f: &str| format!("{list}[{i}].{f}");
            let errors_before = self.errors.len();
            let nombre = self.required(&at("nombre"), p.nombre.as_ref());
            let es_persona_moral = self.flag(&at("esPersonaMoral"), p.es_persona_moral.as_ref());
            let genero = match self.text(&at("genero"), p.genero.as_ref()) {
                Err(()) => None,
                Ok(raw) => match optional(raw) {
                    Some(g) => {
                        let parsed = Genero::from_code(&g.to_ascii_uppercase());
                        if parsed.is_none() {
                            self.add(at("genero"), format!("\"{g}\" is not M or F"));
                        }
                        parsed
                    }
                    None => {
                        if !es_persona_moral {
                            self.add(at("genero"), "is required for a natural person");
                        }
                        None
                    }
                },
            };

            let tipo_parte = self
                .required_integer(&at("tipoParte"), p.tipo_parte.as_ref())
                .and_then(|code| {
                    let t = TipoParte::from_code(code);
                    if t.is_none() {
                        self.add(at("tipoParte"), format!("{code} is not one of 0, 1, 2"));
                    }
                    t
                });
            let tipo_parte_nombre = self.text(&at("tipoParteNombre"), p.tipo_parte_nombre.as_ref());
            let apellido_paterno =
                self.optional_text(&at("apellidoPaterno"), p.apellido_paterno.as_ref());
            let apellido_materno =
                self.optional_text(&at("apellidoMaterno"), p.apellido_materno.as_ref());
            let tipo_parte_nombre = match tipo_parte_nombre {
                Ok(raw) => {
                    let nombre = optional(raw);
                    if tipo_parte == Some(TipoParte::Otro) && nombre.is_none() {
                        self.add(at("tipoParteNombre"), "is required when tipoParte is 0");
                    }
                    nombre
                }
                Err(()) => None,
            };

            if self.errors.len() == errors_before {
                if let (Some(nombre), Some(tipo_parte)) = (nombre, tipo_parte) {
                    out.push(Parte {
                        nombre,
                        apellido_paterno,
                        apellido_materno,
                        genero: if es_persona_moral { None } else { genero },
                        es_persona_moral,
                        tipo_parte,
                        tipo_parte_nombre,
                    });
                }
            }
        }
        out
    }

    /// Respuesta video links.
    pub fn videos(&mut self, items: &[VideoPayload]) -> Vec<Video> {
        let mut out = Vec::with_capacity(items.len());
        for (i, v) in items.iter().enumerate() {
            let at = |f: &str| format!("videos[{i}].{f}");
            let errors_before = self.errors.len();
            let titulo = self.required(&at("titulo"), v.titulo.as_ref());
            let descripcion = self.optional_text(&at("descripcion"), v.descripcion.as_ref());
            let url = self.required(&at("urlAcceso"), v.url_acceso.as_ref());
            let url = url.filter(|u| {
                let ok = u.starts_with("http://") || u.starts_with("https://");
                if !ok {
                    self.add(at("urlAcceso"), "must be an http or https URL");
                }
                ok
            });
            let fecha = self.optional_datetime(&at("fecha"), v.fecha.as_ref());
            if self.errors.len() != errors_before {
                continue;
            }
            if let (Some(titulo), Some(url_acceso)) = (titulo, url) {
                out.push(Video {
                    titulo,
                    descripcion,
                    fecha,
                    url_acceso,
                });
            }
        }
        out
    }
}

/// Trimmed value, or `None` when absent or blank.
pub fn optional(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

// ── Drafts ───────────────────────────────────────────────────────────

/// A validated exhorto, with catalog codes still unresolved.
#[derive(Debug, Clone)]
pub struct ExhortoDraft {
    pub origin_id: OriginId,
    pub municipio_destino: String,
    pub materia: String,
    pub estado_origen: String,
    pub municipio_origen: String,
    pub juzgado_origen_id: String,
    pub juzgado_origen_nombre: String,
    pub numero_expediente_origen: String,
    pub numero_oficio_origen: Option<String>,
    pub tipo_juicio_asunto_delitos: String,
    pub juez_exhortante: Option<String>,
    pub partes: Vec<Parte>,
    pub fojas: u32,
    pub dias_responder: u32,
    pub tipo_diligencia: Option<String>,
    pub tipo_diligenciacion_nombre: Option<String>,
    pub fecha_origen: Option<NaiveDateTime>,
    pub observaciones: Option<String>,
    pub archivos: Vec<DeclaredFileSpec>,
}

/// A validated promoción.
#[derive(Debug, Clone)]
pub struct PromocionDraft {
    pub folio_seguimiento: Folio,
    pub origin_id: OriginId,
    pub promoventes: Vec<Parte>,
    pub fojas: u32,
    pub fecha_origen: Option<NaiveDateTime>,
    pub observaciones: Option<String>,
    pub archivos: Vec<DeclaredFileSpec>,
}

/// A validated respuesta, with catalog codes still unresolved.
#[derive(Debug, Clone)]
pub struct RespuestaDraft {
    pub exhorto_origin_id: OriginId,
    pub origin_id: OriginId,
    pub municipio_turnado: String,
    pub area_turnado: Option<String>,
    pub area_turnado_nombre: Option<String>,
    pub numero_exhorto: Option<String>,
    pub tipo_diligenciado: TipoDiligenciado,
    pub observaciones: Option<String>,
    pub archivos: Vec<DeclaredFileSpec>,
    pub videos: Vec<Video>,
}

/// A validated actualización.
#[derive(Debug, Clone)]
pub struct ActualizacionDraft {
    pub exhorto_origin_id: OriginId,
    pub actualizacion_origen_id: OriginId,
    pub tipo_actualizacion: String,
    pub fecha_hora: NaiveDateTime,
    pub descripcion: Option<String>,
}

fn incomplete() -> ExchangeError {
    ExchangeError::Internal("validation passed with missing values".to_string())
}

// ── Pipelines ────────────────────────────────────────────────────────

/// Validate an exhorto payload.
pub fn validate_exhorto(p: &ExhortoPayload) -> Result<ExhortoDraft, ExchangeError> {
    let mut r = ValidationReport::new();
    let origin_id = r.origin_id("exhortoOrigenId", p.exhorto_origen_id.as_ref());
    let municipio_destino = r.code("municipioDestinoId", p.municipio_destino_id.as_ref());
    let materia = r.required("materiaClave", p.materia_clave.as_ref());
    let estado_origen = r.code("estadoOrigenId", p.estado_origen_id.as_ref());
    let municipio_origen = r.code("municipioOrigenId", p.municipio_origen_id.as_ref());
    let juzgado_origen_id = r.required("juzgadoOrigenId", p.juzgado_origen_id.as_ref());
    let juzgado_origen_nombre = r.required("juzgadoOrigenNombre", p.juzgado_origen_nombre.as_ref());
    let numero_expediente_origen =
        r.required("numeroExpedienteOrigen", p.numero_expediente_origen.as_ref());
    let tipo_juicio =
        r.required("tipoJuicioAsuntoDelitos", p.tipo_juicio_asunto_delitos.as_ref());
    let partes = r.partes("partes", &p.partes);
    let fojas = r.count("fojas", p.fojas.as_ref());
    let dias_responder = r.count("diasResponder", p.dias_responder.as_ref());
    let fecha_origen = r.optional_datetime("fechaOrigen", p.fecha_origen.as_ref());
    let archivos = r.archivos(&p.archivos);
    let numero_oficio_origen = r.optional_text("numeroOficioOrigen", p.numero_oficio_origen.as_ref());
    let juez_exhortante = r.optional_text("juezExhortante", p.juez_exhortante.as_ref());
    let tipo_diligencia = r.optional_code("tipoDiligenciaId", p.tipo_diligencia_id.as_ref());
    let tipo_diligenciacion_nombre =
        r.optional_text("tipoDiligenciacionNombre", p.tipo_diligenciacion_nombre.as_ref());
    let observaciones = r.optional_text("observaciones", p.observaciones.as_ref());
    r.into_result()?;

    let (
        Some(origin_id),
        Some(municipio_destino),
        Some(materia),
        Some(estado_origen),
        Some(municipio_origen),
        Some(juzgado_origen_id),
        Some(juzgado_origen_nombre),
        Some(numero_expediente_origen),
        Some(tipo_juicio_asunto_delitos),
        Some(fojas),
        Some(dias_responder),
    ) = (
        origin_id,
        municipio_destino,
        materia,
        estado_origen,
        municipio_origen,
        juzgado_origen_id,
        juzgado_origen_nombre,
        numero_expediente_origen,
        tipo_juicio,
        fojas,
        dias_responder,
    )
    else {
        return Err(incomplete());
    };

    Ok(ExhortoDraft {
        origin_id,
        municipio_destino,
        materia,
        estado_origen,
        municipio_origen,
        juzgado_origen_id,
        juzgado_origen_nombre,
        numero_expediente_origen,
        numero_oficio_origen,
        tipo_juicio_asunto_delitos,
        juez_exhortante,
        partes,
        fojas,
        dias_responder,
        tipo_diligencia,
        tipo_diligenciacion_nombre,
        fecha_origen,
        observaciones,
        archivos,
    })
}

/// Validate a promoción payload.
pub fn validate_promocion(p: &PromocionPayload) -> Result<PromocionDraft, ExchangeError> {
    let mut r = ValidationReport::new();
    let folio_seguimiento = r.folio("folioSeguimiento", p.folio_seguimiento.as_ref());
    let origin_id = r.origin_id("folioOrigenPromocion", p.folio_origen_promocion.as_ref());
    let promoventes = r.partes("promoventes", &p.promoventes);
    let fojas = r.count("fojas", p.fojas.as_ref());
    let fecha_origen = r.optional_datetime("fechaOrigen", p.fecha_origen.as_ref());
    let archivos = r.archivos(&p.archivos);
    let observaciones = r.optional_text("observaciones", p.observaciones.as_ref());
    r.into_result()?;

    let (Some(folio_seguimiento), Some(origin_id), Some(fojas)) = (folio_seguimiento, origin_id, fojas)
    else {
        return Err(incomplete());
    };
    Ok(PromocionDraft {
        folio_seguimiento,
        origin_id,
        promoventes,
        fojas,
        fecha_origen,
        observaciones,
        archivos,
    })
}

/// Validate a respuesta payload.
pub fn validate_respuesta(p: &RespuestaPayload) -> Result<RespuestaDraft, ExchangeError> {
    let mut r = ValidationReport::new();
    let exhorto_origin_id = r.origin_id("exhortoId", p.exhorto_id.as_ref());
    let origin_id = r.origin_id("respuestaOrigenId", p.respuesta_origen_id.as_ref());
    let municipio_turnado = r.code("municipioTurnadoId", p.municipio_turnado_id.as_ref());
    let tipo_diligenciado = r
        .required_integer("tipoDiligenciado", p.tipo_diligenciado.as_ref())
        .and_then(|code| {
            let t = TipoDiligenciado::from_code(code);
            if t.is_none() {
                r.add("tipoDiligenciado", format!("{code} is not one of 0, 1, 2"));
            }
            t
        });
    let area_turnado = r.optional_text("areaTurnadoId", p.area_turnado_id.as_ref());
    let area_turnado_nombre = r.optional_text("areaTurnadoNombre", p.area_turnado_nombre.as_ref());
    let numero_exhorto = r.optional_text("numeroExhorto", p.numero_exhorto.as_ref());
    let observaciones = r.optional_text("observaciones", p.observaciones.as_ref());
    let archivos = r.archivos(&p.archivos);
    let videos = r.videos(&p.videos);
    r.into_result()?;

    let (Some(exhorto_origin_id), Some(origin_id), Some(municipio_turnado), Some(tipo_diligenciado)) =
        (exhorto_origin_id, origin_id, municipio_turnado, tipo_diligenciado)
    else {
        return Err(incomplete());
    };
    Ok(RespuestaDraft {
        exhorto_origin_id,
        origin_id,
        municipio_turnado,
        area_turnado,
        area_turnado_nombre,
        numero_exhorto,
        tipo_diligenciado,
        observaciones,
        archivos,
        videos,
    })
}

/// Validate an actualización payload.
pub fn validate_actualizacion(p: &ActualizacionPayload) -> Result<ActualizacionDraft, ExchangeError> {
    let mut r = ValidationReport::new();
    let exhorto_origin_id = r.origin_id("exhortoId", p.exhorto_id.as_ref());
    let actualizacion_origen_id =
        r.origin_id("actualizacionOrigenId", p.actualizacion_origen_id.as_ref());
    let tipo_actualizacion = r.required("tipoActualizacion", p.tipo_actualizacion.as_ref());
    let fecha_hora = r.required_datetime("fechaHora", p.fecha_hora.as_ref());
    let descripcion = r.optional_text("descripcion", p.descripcion.as_ref());
    r.into_result()?;

    let (Some(exhorto_origin_id), Some(actualizacion_origen_id), Some(tipo_actualizacion), Some(fecha_hora)) =
        (exhorto_origin_id, actualizacion_origen_id, tipo_actualizacion, fecha_hora)
    else {
        return Err(incomplete());
    };
    Ok(ActualizacionDraft {
        exhorto_origin_id,
        actualizacion_origen_id,
        tipo_actualizacion,
        fecha_hora,
        descripcion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Lenient;

    fn archivo(nombre: &str) -> ArchivoPayload {
        ArchivoPayload {
            nombre_archivo: Some(nombre.into()),
            hash_sha1: Some("".into()),
            hash_sha256: None,
            tipo_documento: Some(1.into()),
        }
    }

    fn exhorto() -> ExhortoPayload {
        ExhortoPayload {
            exhorto_origen_id: Some("EXH-1".into()),
            municipio_destino_id: Some(Code::Number(30)),
            materia_clave: Some("CIV".into()),
            estado_origen_id: Some(Code::Number(19)),
            municipio_origen_id: Some(Code::Number(39)),
            juzgado_origen_id: Some("J1".into()),
            juzgado_origen_nombre: Some("JUZGADO PRIMERO".into()),
            numero_expediente_origen: Some("123/2024".into()),
            tipo_juicio_asunto_delitos: Some("DIVORCIO".into()),
            fojas: Some(10.into()),
            dias_responder: Some(15.into()),
            archivos: vec![archivo("a.pdf")],
            ..Default::default()
        }
    }

    fn field_errors(err: ExchangeError) -> Vec<String> {
        match err {
            ExchangeError::Validation(list) => list.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_exhorto_normalizes() {
        let mut p = exhorto();
        p.exhorto_origen_id = Some("  EXH-1 ".into());
        p.observaciones = Some("   ".into());
        let d = validate_exhorto(&p).unwrap();
        assert_eq!(d.origin_id.as_str(), "EXH-1");
        assert_eq!(d.municipio_destino, "30");
        assert_eq!(d.observaciones, None);
        assert_eq!(d.archivos.len(), 1);
        assert_eq!(d.archivos[0].hash_sha1, None);
    }

    #[test]
    fn every_violation_is_reported_at_once() {
        let p = ExhortoPayload {
            fojas: Some((-1).into()),
            fecha_origen: Some("2024-01-15 09:30:00".into()),
            archivos: vec![
                ArchivoPayload {
                    nombre_archivo: Some("a.doc".into()),
                    hash_sha1: Some("zz".into()),
                    hash_sha256: None,
                    tipo_documento: Some(7.into()),
                },
                archivo("b.pdf"),
                archivo("b.pdf"),
            ],
            ..Default::default()
        };
        let fields = field_errors(validate_exhorto(&p).unwrap_err());
        for expected in [
            "exhortoOrigenId",
            "municipioDestinoId",
            "materiaClave",
            "estadoOrigenId",
            "municipioOrigenId",
            "juzgadoOrigenId",
            "juzgadoOrigenNombre",
            "numeroExpedienteOrigen",
            "tipoJuicioAsuntoDelitos",
            "fojas",
            "diasResponder",
            "fechaOrigen",
            "archivos[0].nombreArchivo",
            "archivos[0].hashSha1",
            "archivos[0].tipoDocumento",
            "archivos[2].nombreArchivo",
        ] {
            assert!(fields.iter().any(|f| f == expected), "missing {expected} in {fields:?}");
        }
    }

    #[test]
    fn wrong_json_types_are_reported_once_each() {
        let p: ExhortoPayload = serde_json::from_value(serde_json::json!({
            "exhortoOrigenId": "EXH-1",
            "municipioDestinoId": 30,
            "materiaClave": "CIV",
            "estadoOrigenId": 19,
            "municipioOrigenId": {"id": 39},
            "juzgadoOrigenNombre": "JUZGADO PRIMERO",
            "numeroExpedienteOrigen": 123,
            "tipoJuicioAsuntoDelitos": "DIVORCIO",
            "fojas": "doce",
            "diasResponder": "15",
            "partes": [{"nombre": "JUAN", "genero": 1, "tipoParte": "actor"}],
            "archivos": [{"nombreArchivo": "a.pdf", "hashSha1": false, "tipoDocumento": "uno"}]
        }))
        .unwrap();
        let fields = field_errors(validate_exhorto(&p).unwrap_err());
        assert_eq!(
            fields,
            vec![
                "municipioOrigenId",
                "juzgadoOrigenId",
                "numeroExpedienteOrigen",
                "partes[0].genero",
                "partes[0].tipoParte",
                "fojas",
                "archivos[0].hashSha1",
                "archivos[0].tipoDocumento",
            ]
        );
    }

    #[test]
    fn wrong_type_message_names_the_sent_type() {
        let p = PromocionPayload {
            folio_seguimiento: Some(Lenient::Invalid(serde_json::json!(42))),
            folio_origen_promocion: Some("PROM-1".into()),
            fojas: Some(Lenient::Invalid(serde_json::json!([1]))),
            archivos: vec![archivo("p.pdf")],
            ..Default::default()
        };
        let ExchangeError::Validation(errors) = validate_promocion(&p).unwrap_err() else {
            panic!("expected validation error");
        };
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec![
                "folioSeguimiento: must be a string, not a number",
                "fojas: must be an integer, not an array",
            ]
        );
    }

    #[test]
    fn empty_manifest_is_rejected() {
        let mut p = exhorto();
        p.archivos.clear();
        assert_eq!(field_errors(validate_exhorto(&p).unwrap_err()), vec!["archivos"]);
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(has_pdf_extension("a.PDF"));
        assert!(has_pdf_extension("Oficio.Pdf"));
        assert!(!has_pdf_extension(".pdf"));
        assert!(!has_pdf_extension("virus.exe"));
        assert!(!has_pdf_extension("a.pdf.exe"));
    }

    #[test]
    fn short_hex_digest_is_accepted_at_declaration() {
        let mut p = exhorto();
        p.archivos[0].hash_sha1 = Some("deadbeef".into());
        let d = validate_exhorto(&p).unwrap();
        assert_eq!(d.archivos[0].hash_sha1.as_ref().unwrap().hex, "deadbeef");
    }

    #[test]
    fn party_rules() {
        let mut p = exhorto();
        p.partes = vec![
            PartePayload {
                nombre: Some("ACME SA".into()),
                es_persona_moral: Some(true.into()),
                tipo_parte: Some(1.into()),
                ..Default::default()
            },
            PartePayload {
                nombre: Some("JUAN".into()),
                genero: Some("X".into()),
                tipo_parte: Some(0.into()),
                ..Default::default()
            },
            PartePayload {
                nombre: Some("ANA".into()),
                tipo_parte: Some(5.into()),
                ..Default::default()
            },
        ];
        let fields = field_errors(validate_exhorto(&p).unwrap_err());
        assert_eq!(
            fields,
            vec![
                "partes[1].genero",
                "partes[1].tipoParteNombre",
                "partes[2].genero",
                "partes[2].tipoParte",
            ]
        );
    }

    #[test]
    fn legal_entity_needs_no_gender() {
        let mut p = exhorto();
        p.partes = vec![PartePayload {
            nombre: Some("ACME SA".into()),
            genero: Some("m".into()),
            es_persona_moral: Some(true.into()),
            tipo_parte: Some(2.into()),
            ..Default::default()
        }];
        let d = validate_exhorto(&p).unwrap();
        assert_eq!(d.partes[0].genero, None);
        assert!(d.partes[0].es_persona_moral);
    }

    #[test]
    fn promocion_requires_uuid_folio() {
        let p = PromocionPayload {
            folio_seguimiento: Some("not-a-folio".into()),
            folio_origen_promocion: Some("PROM-1".into()),
            fojas: Some(1.into()),
            archivos: vec![archivo("p.pdf")],
            ..Default::default()
        };
        assert_eq!(field_errors(validate_promocion(&p).unwrap_err()), vec!["folioSeguimiento"]);
    }

    #[test]
    fn respuesta_checks_outcome_and_videos() {
        let p = RespuestaPayload {
            exhorto_id: Some("EXH-1".into()),
            respuesta_origen_id: Some("RESP-1".into()),
            municipio_turnado_id: Some(Code::Number(30)),
            tipo_diligenciado: Some(3.into()),
            archivos: vec![archivo("r.pdf")],
            videos: vec![VideoPayload {
                titulo: Some("Audiencia".into()),
                url_acceso: Some("ftp://videos/1".into()),
                fecha: Some("ayer".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let fields = field_errors(validate_respuesta(&p).unwrap_err());
        assert_eq!(
            fields,
            vec!["tipoDiligenciado", "videos[0].urlAcceso", "videos[0].fecha"]
        );
    }

    #[test]
    fn actualizacion_requires_exact_datetime() {
        let p = ActualizacionPayload {
            exhorto_id: Some("EXH-1".into()),
            actualizacion_origen_id: Some("ACT-1".into()),
            tipo_actualizacion: Some("AreaTurnado".into()),
            fecha_hora: Some("2024-01-15T09:30".into()),
            descripcion: None,
        };
        assert_eq!(field_errors(validate_actualizacion(&p).unwrap_err()), vec!["fechaHora"]);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn pdf_extension_ignores_case(stem in "[a-zA-Z0-9_-]{1,20}", ext in "[pP][dD][fF]") {
                let name = format!("{stem}.{ext}");
                prop_assert!(has_pdf_extension(&name));
            }

            #[test]
            fn other_extensions_are_refused(stem in "[a-z]{1,12}", ext in "(exe|docx|txt|pd|pdfx)") {
                let name = format!("{stem}.{ext}");
                prop_assert!(!has_pdf_extension(&name));
            }
        }
    }
}
