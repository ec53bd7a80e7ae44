//! # copiloto-abp
//!
//! Planning copilot for project-based-learning (ABP) units.
//!
//! ## Why this crate?
//!
//! Teachers planning an ABP unit juggle three artefacts that must stay in
//! sync: a curriculum-grounded plan, a grading rubric, and per-class
//! assessment instruments. This crate owns the whole round trip without ever
//! calling an AI itself — the "model" is an external, human-operated chat
//! session. The crate builds the prompt, the teacher pastes it out, pastes
//! the answer back, and everything after that paste is deterministic:
//! tolerant JSON extraction, shape classification, typed project state, and
//! faithful DOCX/PDF exports.
//!
//! ## Pipeline Overview
//!
//! ```text
//! idea / curso / duración
//!  │
//!  ├─ 1. Prompt    render project state into one of four templates
//!  ├─ 2. (manual)  teacher relays prompt ⇄ external chat session
//!  ├─ 3. Parse     fences → brace slice → JSON → Project/Rubric/Instrument
//!  ├─ 4. Model     wizard overlay, rubric/instrument merges, path edits
//!  ├─ 5. Store     JSON file, upsert by id, versioned backups
//!  └─ 6. Export    DOCX matrix/rubric/instrument · PDF educational/modern
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use copiloto_abp::{parse, DocxRenderer, Orientation, ParsedEntity, PromptBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let prompts = PromptBuilder::default();
//!     let prompt = prompts.full_project_prompt(
//!         "huerto escolar con residuos del casino",
//!         "5° Básico",
//!         4,
//!         &["Ciencias".into(), "Matemática".into()],
//!     );
//!     println!("{prompt}"); // → paste into the chat session
//!
//!     let pasted = std::fs::read_to_string("respuesta.txt")?;
//!     if let ParsedEntity::Project(project) = parse(&pasted)? {
//!         let bytes = DocxRenderer::default().project_docx(&project, Orientation::Portrait)?;
//!         std::fs::write("Planificacion.docx", bytes)?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `copiloto` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! copiloto-abp = { version = "0.4", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod model;
pub mod parse;
pub mod prompts;
pub mod render;
pub mod sanitize;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{CurriculumLabels, PromptConfig, RenderConfig};
pub use error::{CopilotoError, ParseError};
pub use model::{
    set_path, ClassSession, Criterion, Instrument, InstrumentItem, InstrumentKind, OaiEntry,
    PathSeg, Project, Rubric, RubricLevels, WizardContext,
};
pub use parse::{parse, parse_improvement_response, ParsedEntity};
pub use prompts::PromptBuilder;
pub use render::{DocxRenderer, Orientation, PdfOutput, PdfRenderer};
pub use sanitize::{clean_for_display, parse_rich_text, sanitize};
pub use store::{Backup, ProjectStore, BACKUP_VERSION};
