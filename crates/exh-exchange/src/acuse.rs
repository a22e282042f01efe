//! # Acknowledgment Builder
//!
//! An acuse is issued exactly once per package, by the upload that
//! completes it. Every other upload gets the same shape with empty strings
//! and a null timestamp, so a client can always parse the response the same
//! way. "Not complete yet" is a normal state, not a failure.

use chrono::{DateTime, Utc};
use exh_core::LocalZone;
use exh_state::PackageKind;
use serde::{Deserialize, Serialize};

use crate::config::ExchangeConfig;
use crate::error::ExchangeError;
use crate::model::{Package, PackageBody};

/// Exhorto acuse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhortoAcuse {
    pub exhorto_origen_id: String,
    pub folio_seguimiento: String,
    pub fecha_hora_recepcion: Option<String>,
    pub municipio_area_recibe_id: String,
    pub area_recibe_id: String,
    pub area_recibe_nombre: String,
    pub url_info: String,
}

/// Promoción acuse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromocionAcuse {
    pub folio_origen_promocion: String,
    pub folio_seguimiento: String,
    pub folio_promocion_recibida: String,
    pub fecha_hora_recepcion: Option<String>,
}

/// Respuesta acuse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespuestaAcuse {
    pub exhorto_id: String,
    pub respuesta_origen_id: String,
    pub folio_seguimiento: String,
    pub fecha_hora_recepcion: Option<String>,
    pub area_turnado_id: String,
    pub area_turnado_nombre: String,
}

/// Acuse of any kind. Serialized without a tag: each kind has its own
/// distinct required fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Acuse {
    Exhorto(ExhortoAcuse),
    Promocion(PromocionAcuse),
    Respuesta(RespuestaAcuse),
}

impl Acuse {
    /// The content-empty shape for `kind`.
    pub fn empty(kind: PackageKind) -> Self {
        match kind {
            PackageKind::Exhorto => Self::Exhorto(ExhortoAcuse::default()),
            PackageKind::Promocion => Self::Promocion(PromocionAcuse::default()),
            PackageKind::Respuesta => Self::Respuesta(RespuestaAcuse::default()),
        }
    }

    /// Whether this is the empty shape.
    pub fn is_empty(&self) -> bool {
        self.fecha_hora_recepcion().is_none()
    }

    pub fn fecha_hora_recepcion(&self) -> Option<&str> {
        match self {
            Self::Exhorto(a) => a.fecha_hora_recepcion.as_deref(),
            Self::Promocion(a) => a.fecha_hora_recepcion.as_deref(),
            Self::Respuesta(a) => a.fecha_hora_recepcion.as_deref(),
        }
    }

    /// Tracking folio carried by this acuse.
    pub fn folio_seguimiento(&self) -> &str {
        match self {
            Self::Exhorto(a) => &a.folio_seguimiento,
            Self::Promocion(a) => &a.folio_seguimiento,
            Self::Respuesta(a) => &a.folio_seguimiento,
        }
    }
}

/// Build the filled acuse for a package that just completed.
///
/// The package must already carry its folio (exhorto, promoción) or its
/// parent reference (respuesta).
pub fn build(
    package: &Package,
    now: DateTime<Utc>,
    config: &ExchangeConfig,
) -> Result<Acuse, ExchangeError> {
    let zone: &LocalZone = &config.local_zone;
    let fecha = Some(zone.render(now));
    let missing = |what: &str| {
        ExchangeError::Internal(format!(
            "{} {} completed without {what}",
            package.kind, package.origin_id
        ))
    };

    let acuse = match &package.body {
        PackageBody::Exhorto(body) => {
            let folio = package.folio.as_ref().ok_or_else(|| missing("a folio"))?;
            let url_info = config
                .public_base_url
                .as_deref()
                .map(|base| format!("{}/v1/exh_exhortos/{folio}", base.trim_end_matches('/')))
                .unwrap_or_default();
            Acuse::Exhorto(ExhortoAcuse {
                exhorto_origen_id: package.origin_id.to_string(),
                folio_seguimiento: folio.to_string(),
                fecha_hora_recepcion: fecha,
                municipio_area_recibe_id: body.municipio_destino.municipio.clave.clone(),
                area_recibe_id: body.area.clave.clone(),
                area_recibe_nombre: body.area.nombre.clone(),
                url_info,
            })
        }
        PackageBody::Promocion(body) => {
            let folio = package.folio.as_ref().ok_or_else(|| missing("a folio"))?;
            Acuse::Promocion(PromocionAcuse {
                folio_origen_promocion: package.origin_id.to_string(),
                folio_seguimiento: body.folio_seguimiento.to_string(),
                folio_promocion_recibida: folio.to_string(),
                fecha_hora_recepcion: fecha,
            })
        }
        PackageBody::Respuesta(body) => {
            let parent = package.parent.as_ref().ok_or_else(|| missing("a parent"))?;
            Acuse::Respuesta(RespuestaAcuse {
                exhorto_id: parent.origin_id.to_string(),
                respuesta_origen_id: package.origin_id.to_string(),
                folio_seguimiento: parent
                    .folio
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                fecha_hora_recepcion: fecha,
                area_turnado_id: body.area_turnado.clave.clone(),
                area_turnado_nombre: body
                    .area_turnado_nombre
                    .clone()
                    .unwrap_or_else(|| body.area_turnado.nombre.clone()),
            })
        }
    };
    Ok(acuse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_shapes_serialize_with_every_field() {
        let json = serde_json::to_value(Acuse::empty(PackageKind::Exhorto)).unwrap();
        assert_eq!(json["exhortoOrigenId"], "");
        assert_eq!(json["folioSeguimiento"], "");
        assert!(json["fechaHoraRecepcion"].is_null());
        assert_eq!(json["urlInfo"], "");

        let json = serde_json::to_value(Acuse::empty(PackageKind::Promocion)).unwrap();
        assert_eq!(json["folioPromocionRecibida"], "");

        let json = serde_json::to_value(Acuse::empty(PackageKind::Respuesta)).unwrap();
        assert_eq!(json["respuestaOrigenId"], "");
    }

    #[test]
    fn empty_shape_is_empty() {
        for kind in PackageKind::ALL {
            assert!(Acuse::empty(kind).is_empty());
        }
    }

    #[test]
    fn untagged_roundtrip_keeps_kind() {
        let a = Acuse::Respuesta(RespuestaAcuse {
            exhorto_id: "EXH-1".into(),
            respuesta_origen_id: "R-1".into(),
            folio_seguimiento: "f".into(),
            fecha_hora_recepcion: Some("2024-01-01T00:00:00".into()),
            area_turnado_id: "ND".into(),
            area_turnado_nombre: "NO DEFINIDO".into(),
        });
        let back: Acuse = serde_json::from_value(serde_json::to_value(&a).unwrap()).unwrap();
        assert_eq!(back, a);

        let p = Acuse::Promocion(PromocionAcuse {
            folio_origen_promocion: "P-1".into(),
            folio_seguimiento: "f".into(),
            folio_promocion_recibida: "g".into(),
            fecha_hora_recepcion: None,
        });
        let back: Acuse = serde_json::from_value(serde_json::to_value(&p).unwrap()).unwrap();
        assert_eq!(back, p);
    }
}
