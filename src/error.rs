//! Error types for the copiloto-abp library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ParseError`] — **User-correctable**: the pasted AI response could not
//!   be turned into a typed entity. The user fixes it by re-copying the JSON
//!   block from the chat session; messages are written for teachers and are
//!   surfaced verbatim by the UI layer.
//!
//! * [`CopilotoError`] — **Fatal**: an export or store operation cannot
//!   proceed at all (structurally required data absent, document packing
//!   failed, file I/O failed).
//!
//! The separation keeps retry semantics honest: parse failures have exactly
//! one remedy (paste again), so they are never retried automatically, while
//! fatal errors carry enough path/context detail for a bug report.

use std::path::PathBuf;
use thiserror::Error;

/// A user-correctable failure while parsing a pasted AI response.
///
/// All three variants mean "the pasted text is not usable"; none of them is
/// retried automatically because the AI interaction is manual copy/paste.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// No `{` / `}` pair could be located anywhere in the pasted text.
    #[error("No se encontraron llaves JSON válidas en el texto. Copia el bloque JSON completo de la respuesta de la IA.")]
    NoJsonFound,

    /// A brace-delimited slice was found but is not valid JSON.
    ///
    /// Wraps the underlying parser message so the user can spot the typo
    /// (truncated paste, smart quotes, trailing commentary inside the braces).
    #[error("El JSON copiado no es válido: {0}")]
    InvalidJson(String),

    /// Valid JSON, but none of the three known structural signatures
    /// (proyecto, rúbrica, instrumento) matched.
    #[error("El JSON no tiene la estructura esperada (falta nombre/cronograma, criterios o instrumento).")]
    UnrecognizedShape,
}

/// All fatal errors returned by the copiloto-abp library.
///
/// Parse-level failures use [`ParseError`] and pass through transparently so
/// callers can still match on the taxonomy of §user-correctable errors.
#[derive(Debug, Error)]
pub enum CopilotoError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Pasted-response errors, passed through unchanged.
    #[error(transparent)]
    Parse(#[from] ParseError),

    // ── Export preconditions ─────────────────────────────────────────────
    /// Rubric export requires at least one criterion.
    #[error("La rúbrica no tiene criterios; genera la rúbrica antes de exportarla.")]
    EmptyRubric,

    /// Instrument export requires at least one item.
    #[error("El instrumento no tiene ítems; genera el instrumento antes de exportarlo.")]
    EmptyInstrument,

    /// The requested class session does not exist in the cronograma.
    #[error("La clase {index} no existe (el cronograma tiene {total} sesiones).")]
    SessionOutOfRange { index: usize, total: usize },

    // ── Document build errors ────────────────────────────────────────────
    /// The DOCX packer failed while serialising the finished document tree.
    #[error("Failed to pack DOCX document: {0}")]
    DocxBuild(String),

    /// The PDF backend failed (font registration or byte serialisation).
    #[error("Failed to build PDF document: {0}")]
    PdfBuild(String),

    // ── Store errors ─────────────────────────────────────────────────────
    /// Could not read or write the project store file.
    #[error("Failed to access project store '{path}': {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store file exists but does not contain a valid project list.
    #[error("Project store '{path}' is corrupt: {detail}")]
    CorruptStore { path: PathBuf, detail: String },

    /// A backup file is missing the `projects` array or has a wrong version.
    #[error("Invalid backup file: {0}")]
    InvalidBackup(String),

    /// No project with the given id exists in the store.
    #[error("Project '{id}' not found in the store.")]
    ProjectNotFound { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_json_wraps_underlying_message() {
        let e = ParseError::InvalidJson("expected `,` at line 3".into());
        assert!(e.to_string().contains("expected `,` at line 3"));
    }

    #[test]
    fn no_json_found_mentions_the_remedy() {
        let msg = ParseError::NoJsonFound.to_string();
        assert!(msg.contains("JSON"), "got: {msg}");
    }

    #[test]
    fn session_out_of_range_display() {
        let e = CopilotoError::SessionOutOfRange { index: 9, total: 4 };
        let msg = e.to_string();
        assert!(msg.contains('9') && msg.contains('4'), "got: {msg}");
    }

    #[test]
    fn parse_error_passes_through() {
        let e: CopilotoError = ParseError::UnrecognizedShape.into();
        assert_eq!(e.to_string(), ParseError::UnrecognizedShape.to_string());
    }
}
