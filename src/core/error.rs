//! Fehlertypen des Datenmodells.

use thiserror::Error;

/// Eingabe ist kein erkannter Geometrie-Sammlungstyp oder inkonsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Ungültige Geometrie-Eingabe: {reason}")]
pub struct InvalidGeometryInput {
    /// Beschreibung des Problems
    pub reason: String,
}

impl InvalidGeometryInput {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Zugriff auf ein Attribut schlug fehl.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// Attribut existiert in der Collection nicht
    #[error("Unbekanntes Attribut '{name}'")]
    UnknownAttribute { name: String },
    /// Attribut ist nicht numerisch (z.B. Text oder Geometrie)
    #[error("Attribut '{name}' ist nicht numerisch")]
    NotNumeric { name: String },
    /// Attribut ist weder Text noch Ganzzahl
    #[error("Attribut '{name}' ist nicht kategorial")]
    NotCategorical { name: String },
}

impl AttributeError {
    /// Name des betroffenen Attributs.
    pub fn attribute(&self) -> &str {
        match self {
            AttributeError::UnknownAttribute { name }
            | AttributeError::NotNumeric { name }
            | AttributeError::NotCategorical { name } => name,
        }
    }
}
