//! Configuration types for prompt building and document rendering.
//!
//! All ambient defaults — institution header, curriculum-decree labels, the
//! six transversal competencies — live here as plain data injected into
//! [`crate::prompts::PromptBuilder`] and the renderers at construction time.
//! Keeping them out of module globals means a test (or a school with its own
//! letterhead) can substitute an alternate configuration without touching
//! template code.

use serde::{Deserialize, Serialize};

/// Institution identity printed on every exported document.
///
/// # Example
/// ```rust
/// use copiloto_abp::RenderConfig;
///
/// let config = RenderConfig::default().with_institution("Liceo Bicentenario");
/// assert_eq!(config.institution, "Liceo Bicentenario");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// School name for the document header. Projects carrying their own
    /// `nombre_colegio` override this per document.
    ///
    /// The literal default matches the school the tool was first built for;
    /// it is what the original shipped when the user never set one.
    pub institution: String,

    /// Second header line under the school name on planning exports.
    pub unit_label: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            institution: "Escuela Roberto Ojeda Torres".to_string(),
            unit_label: "Unidad Técnico Pedagógica".to_string(),
        }
    }
}

impl RenderConfig {
    /// Replace the institution name.
    pub fn with_institution(mut self, name: impl Into<String>) -> Self {
        self.institution = name.into();
        self
    }

    /// Replace the unit label.
    pub fn with_unit_label(mut self, label: impl Into<String>) -> Self {
        self.unit_label = label.into();
        self
    }

    /// Header school name for one document: the project's own
    /// `nombre_colegio` when set, otherwise the configured institution.
    pub fn school_for<'a>(&'a self, nombre_colegio: &'a str) -> &'a str {
        if nombre_colegio.trim().is_empty() {
            &self.institution
        } else {
            nombre_colegio
        }
    }
}

/// Curriculum-normative-framework labels keyed by school level.
///
/// The label is selected from the grade string (`curso`) by
/// [`crate::prompts::PromptBuilder::curriculum_context`]; the defaults are the
/// Chilean MINEDUC decree sets the tool was written against. They are data,
/// not code, so a curriculum update is a config edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumLabels {
    /// Early childhood (kínder).
    pub parvularia: String,
    /// 1° to 6° básico.
    pub basica_1_a_6: String,
    /// 7° básico to 2° medio.
    pub basica_7_a_media_2: String,
    /// 3° and 4° medio.
    pub media_3_y_4: String,
    /// Fallback when the grade string matches no known level.
    pub vigente: String,
}

impl Default for CurriculumLabels {
    fn default() -> Self {
        Self {
            parvularia: "Nivel Parvularia: Bases Curriculares Decreto 481 (2018).".to_string(),
            basica_1_a_6: "Nivel 1° a 6° Básico: Bases Curriculares Decretos 433 y 439 (2012)."
                .to_string(),
            basica_7_a_media_2:
                "Nivel 7° Básico a 2° Medio: Bases Curriculares Decretos 614 (2013) y 369 (2015)."
                    .to_string(),
            media_3_y_4: "Nivel 3° y 4° Medio: Bases Curriculares Decreto 193 (2019).".to_string(),
            vigente: "Bases Curriculares vigentes del MINEDUC.".to_string(),
        }
    }
}

/// Static pedagogical data embedded into every full-project prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Decree labels per school level.
    pub curriculum: CurriculumLabels,

    /// The six transversal competencies (Fullan's 6C), one numbered line
    /// each, exactly as they appear in the prompt's theory section.
    pub competencies: Vec<String>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            curriculum: CurriculumLabels::default(),
            competencies: vec![
                "Carácter: Aprender a aprender, resiliencia, autorregulación.".to_string(),
                "Ciudadanía: Visión global, empatía, sostenibilidad.".to_string(),
                "Colaboración: Trabajo en equipo, interdependencia positiva.".to_string(),
                "Comunicación: Claridad, diversas audiencias y herramientas.".to_string(),
                "Creatividad: Soluciones nuevas, pensamiento emprendedor.".to_string(),
                "Pensamiento Crítico: Evaluar información, resolver problemas complejos."
                    .to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_institution_is_the_shipped_fallback() {
        let c = RenderConfig::default();
        assert_eq!(c.institution, "Escuela Roberto Ojeda Torres");
    }

    #[test]
    fn project_school_overrides_institution() {
        let c = RenderConfig::default();
        assert_eq!(c.school_for("Colegio Andino"), "Colegio Andino");
        assert_eq!(c.school_for(""), "Escuela Roberto Ojeda Torres");
        assert_eq!(c.school_for("   "), "Escuela Roberto Ojeda Torres");
    }

    #[test]
    fn six_competencies_by_default() {
        assert_eq!(PromptConfig::default().competencies.len(), 6);
    }
}
