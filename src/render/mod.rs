//! Document rendering: structured project data to downloadable binaries.
//!
//! Each submodule owns one backend and nothing else:
//!
//! 1. [`layout`] — text measurement, wrapping and page-break math shared by
//!    the PDF layouts; the only geometry code in the crate
//! 2. [`docx`]   — word-processor documents as a node tree, byte-packed in
//!    one terminal call
//! 3. [`pdf`]    — hand-positioned PDF pages (PDF has no automatic flow)
//!
//! Styling is deliberately restated per backend — the DOCX palette and the
//! two PDF palettes are different products of the same phase keywords, not a
//! shared theme. Changing one must not silently restyle the other.

pub mod docx;
pub mod layout;
pub mod pdf;

pub use docx::DocxRenderer;
pub use pdf::{PdfOutput, PdfRenderer};

use crate::model::{Instrument, Project};

/// Page orientation for the project exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

fn title_or_default(project: &Project) -> &str {
    if project.nombre_proyecto.is_empty() {
        "Proyecto"
    } else {
        &project.nombre_proyecto
    }
}

/// Suggested filename for a project DOCX export.
///
/// Titles flow in verbatim (spaces and all) — the historical pattern the
/// tool's users already have on disk. Callers wanting filesystem-safe names
/// rename the suggestion.
pub fn project_docx_filename(project: &Project, orientation: Orientation) -> String {
    match orientation {
        Orientation::Portrait => format!("Planificacion_ABP_{}.docx", title_or_default(project)),
        Orientation::Landscape => {
            format!("Planificacion_ABP_Landscape_{}.docx", title_or_default(project))
        }
    }
}

/// Suggested filename for a project PDF export.
pub fn project_pdf_filename(project: &Project, orientation: Orientation) -> String {
    match orientation {
        Orientation::Portrait => format!("Plan_ABP_Vertical_{}.pdf", title_or_default(project)),
        Orientation::Landscape => format!("Plan_ABP_Landscape_{}.pdf", title_or_default(project)),
    }
}

/// Suggested filename for a rubric DOCX export.
pub fn rubric_filename(project: &Project) -> String {
    format!("Rubrica_{}.docx", title_or_default(project))
}

/// Suggested filename for an instrument DOCX export (1-based class number).
pub fn instrument_filename(instrument: &Instrument, session_index: usize) -> String {
    let name = if instrument.instrumento.is_empty() {
        "Eval"
    } else {
        &instrument.instrumento
    };
    format!("Instrumento_C{}_{}.docx", session_index + 1, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_follow_historical_patterns() {
        let p = Project {
            nombre_proyecto: "Huerto Escolar".into(),
            ..Project::default()
        };
        assert_eq!(
            project_docx_filename(&p, Orientation::Portrait),
            "Planificacion_ABP_Huerto Escolar.docx"
        );
        assert_eq!(
            project_docx_filename(&p, Orientation::Landscape),
            "Planificacion_ABP_Landscape_Huerto Escolar.docx"
        );
        assert_eq!(
            project_pdf_filename(&p, Orientation::Landscape),
            "Plan_ABP_Landscape_Huerto Escolar.pdf"
        );
        assert_eq!(rubric_filename(&p), "Rubrica_Huerto Escolar.docx");
    }

    #[test]
    fn empty_titles_fall_back() {
        let p = Project::default();
        assert_eq!(
            project_pdf_filename(&p, Orientation::Portrait),
            "Plan_ABP_Vertical_Proyecto.pdf"
        );
        let i = Instrument::default();
        assert_eq!(instrument_filename(&i, 0), "Instrumento_C1_Eval.docx");
    }
}
