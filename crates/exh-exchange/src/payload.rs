//! # Wire Payloads
//!
//! Inbound JSON bodies as the counterpart courts send them. Field names
//! follow the inter-state protocol (camelCase Spanish).
//!
//! Nearly every field is optional at the serde level, and every scalar
//! keeps a value of the wrong JSON type instead of failing the whole body.
//! Required-ness and types are enforced by the
//! [`validation`](crate::validation) pipeline, so that a payload with five
//! bad fields yields five errors rather than a single deserialization
//! failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A catalog code sent either as a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Code {
    Number(i64),
    Text(String),
    /// Any other JSON value, reported by validation.
    Other(Value),
}

impl Code {
    /// The code as text, as the resolver expects it. `None` for a value
    /// that is neither a number nor a string.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Number(n) => Some(n.to_string()),
            Self::Text(s) => Some(s.trim().to_string()),
            Self::Other(_) => None,
        }
    }
}

impl From<&str> for Code {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for Code {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

/// A scalar field as sent: the expected type, or whatever JSON value came
/// instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    Valid(T),
    Invalid(Value),
}

/// A string field.
pub type Text = Lenient<String>;
/// An integer field.
pub type Integer = Lenient<i64>;
/// A boolean field.
pub type Flag = Lenient<bool>;

impl<T> Lenient<T> {
    pub fn valid(&self) -> Option<&T> {
        match self {
            Self::Valid(v) => Some(v),
            Self::Invalid(_) => None,
        }
    }

    /// The JSON type that was sent, for error messages.
    pub fn sent_type(&self) -> &'static str {
        match self {
            Self::Valid(_) => "the expected type",
            Self::Invalid(v) => json_type(v),
        }
    }
}

impl Text {
    pub fn as_str(&self) -> Option<&str> {
        self.valid().map(String::as_str)
    }
}

impl Integer {
    /// The integer, also accepting a string of decimal digits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Valid(n) => Some(*n),
            Self::Invalid(Value::String(s)) => s.trim().parse().ok(),
            Self::Invalid(_) => None,
        }
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Self::Valid(s.to_string())
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Self::Valid(s)
    }
}

impl From<i64> for Integer {
    fn from(n: i64) -> Self {
        Self::Valid(n)
    }
}

impl From<bool> for Flag {
    fn from(b: bool) -> Self {
        Self::Valid(b)
    }
}

/// Name of a JSON value's type, with its article.
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// One entry of a declared-file manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivoPayload {
    pub nombre_archivo: Option<Text>,
    #[serde(default)]
    pub hash_sha1: Option<Text>,
    #[serde(default)]
    pub hash_sha256: Option<Text>,
    pub tipo_documento: Option<Integer>,
}

/// A party to the case (parte or promovente).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartePayload {
    pub nombre: Option<Text>,
    pub apellido_paterno: Option<Text>,
    pub apellido_materno: Option<Text>,
    pub genero: Option<Text>,
    pub es_persona_moral: Option<Flag>,
    pub tipo_parte: Option<Integer>,
    pub tipo_parte_nombre: Option<Text>,
}

/// A video link attached to a respuesta.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPayload {
    pub titulo: Option<Text>,
    pub descripcion: Option<Text>,
    pub fecha: Option<Text>,
    pub url_acceso: Option<Text>,
}

/// Body of "receive exhorto".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhortoPayload {
    pub exhorto_origen_id: Option<Text>,
    pub municipio_destino_id: Option<Code>,
    pub materia_clave: Option<Text>,
    pub estado_origen_id: Option<Code>,
    pub municipio_origen_id: Option<Code>,
    pub juzgado_origen_id: Option<Text>,
    pub juzgado_origen_nombre: Option<Text>,
    pub numero_expediente_origen: Option<Text>,
    pub numero_oficio_origen: Option<Text>,
    pub tipo_juicio_asunto_delitos: Option<Text>,
    pub juez_exhortante: Option<Text>,
    #[serde(default)]
    pub partes: Vec<PartePayload>,
    pub fojas: Option<Integer>,
    pub dias_responder: Option<Integer>,
    pub tipo_diligencia_id: Option<Code>,
    pub tipo_diligenciacion_nombre: Option<Text>,
    pub fecha_origen: Option<Text>,
    pub observaciones: Option<Text>,
    #[serde(default)]
    pub archivos: Vec<ArchivoPayload>,
}

/// Body of "receive promoción".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromocionPayload {
    /// Tracking folio of the exhorto this promoción belongs to.
    pub folio_seguimiento: Option<Text>,
    /// Origin id of the promoción itself.
    pub folio_origen_promocion: Option<Text>,
    #[serde(default)]
    pub promoventes: Vec<PartePayload>,
    pub fojas: Option<Integer>,
    pub fecha_origen: Option<Text>,
    pub observaciones: Option<Text>,
    #[serde(default)]
    pub archivos: Vec<ArchivoPayload>,
}

/// Body of "receive respuesta".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespuestaPayload {
    /// Origin id of the exhorto being answered.
    pub exhorto_id: Option<Text>,
    pub respuesta_origen_id: Option<Text>,
    pub municipio_turnado_id: Option<Code>,
    pub area_turnado_id: Option<Text>,
    pub area_turnado_nombre: Option<Text>,
    pub numero_exhorto: Option<Text>,
    pub tipo_diligenciado: Option<Integer>,
    pub observaciones: Option<Text>,
    #[serde(default)]
    pub archivos: Vec<ArchivoPayload>,
    #[serde(default)]
    pub videos: Vec<VideoPayload>,
}

/// Body of "receive actualización".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualizacionPayload {
    /// Origin id of the exhorto being updated.
    pub exhorto_id: Option<Text>,
    pub actualizacion_origen_id: Option<Text>,
    pub tipo_actualizacion: Option<Text>,
    pub fecha_hora: Option<Text>,
    pub descripcion: Option<Text>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_accept_numbers_and_strings() {
        let p: ExhortoPayload =
            serde_json::from_str(r#"{"municipioDestinoId": 30, "estadoOrigenId": "19"}"#).unwrap();
        assert_eq!(p.municipio_destino_id.unwrap().as_text().as_deref(), Some("30"));
        assert_eq!(p.estado_origen_id.unwrap().as_text().as_deref(), Some("19"));
    }

    #[test]
    fn missing_fields_deserialize_as_absent() {
        let p: PromocionPayload = serde_json::from_str("{}").unwrap();
        assert!(p.folio_seguimiento.is_none());
        assert!(p.archivos.is_empty());
    }

    #[test]
    fn archivo_uses_protocol_names() {
        let a: ArchivoPayload = serde_json::from_str(
            r#"{"nombreArchivo":"a.pdf","hashSha1":"","hashSha256":"ab","tipoDocumento":1}"#,
        )
        .unwrap();
        assert_eq!(a.nombre_archivo, Some("a.pdf".into()));
        assert_eq!(a.hash_sha1, Some("".into()));
        assert_eq!(a.tipo_documento, Some(1.into()));
    }

    #[test]
    fn wrong_json_types_are_kept_for_validation() {
        let p: ExhortoPayload = serde_json::from_str(
            r#"{"fojas":"doce","diasResponder":2.5,"juzgadoOrigenId":7,
                "estadoOrigenId":true,"partes":[{"esPersonaMoral":"no"}]}"#,
        )
        .unwrap();
        assert_eq!(p.fojas, Some(Lenient::Invalid(Value::from("doce"))));
        assert_eq!(p.fojas.as_ref().and_then(Integer::as_i64), None);
        assert_eq!(p.dias_responder.unwrap().sent_type(), "a number");
        assert_eq!(p.juzgado_origen_id.unwrap().sent_type(), "a number");
        assert_eq!(p.estado_origen_id.unwrap().as_text(), None);
        assert_eq!(p.partes[0].es_persona_moral.as_ref().unwrap().sent_type(), "a string");
    }

    #[test]
    fn integers_accept_digit_strings() {
        let p: PromocionPayload = serde_json::from_str(r#"{"fojas":" 12 "}"#).unwrap();
        assert_eq!(p.fojas.as_ref().and_then(Integer::as_i64), Some(12));
    }

    #[test]
    fn null_is_absent() {
        let p: PromocionPayload = serde_json::from_str(r#"{"fojas":null}"#).unwrap();
        assert!(p.fojas.is_none());
    }
}
