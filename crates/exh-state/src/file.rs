//! Declared-file state and document types.

use serde::{Deserialize, Serialize};

/// One-way state of a declared file: `PENDING → RECEIVED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeclaredFileState {
    /// Declared, bytes not yet delivered.
    Pending,
    /// Bytes delivered, verified and stored.
    Received,
}

impl DeclaredFileState {
    /// The canonical string name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Received => "RECEIVED",
        }
    }
}

impl std::fmt::Display for DeclaredFileState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document type code declared per file (`tipoDocumento`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum DocumentType {
    /// 1: official letter.
    Oficio,
    /// 2: court order.
    Acuerdo,
    /// 3: annex.
    Anexo,
}

impl DocumentType {
    /// Protocol code of this type.
    pub fn code(&self) -> u8 {
        match self {
            Self::Oficio => 1,
            Self::Acuerdo => 2,
            Self::Anexo => 3,
        }
    }

    /// Look up a type by protocol code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Oficio),
            2 => Some(Self::Acuerdo),
            3 => Some(Self::Anexo),
            _ => None,
        }
    }

    /// Spanish display name.
    pub fn nombre(&self) -> &'static str {
        match self {
            Self::Oficio => "OFICIO",
            Self::Acuerdo => "ACUERDO",
            Self::Anexo => "ANEXO",
        }
    }
}

impl From<DocumentType> for u8 {
    fn from(t: DocumentType) -> u8 {
        t.code()
    }
}

impl TryFrom<u8> for DocumentType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(i64::from(code)).ok_or_else(|| format!("unknown document type {code}"))
    }
}
