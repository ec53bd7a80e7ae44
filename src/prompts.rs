//! Prompt templates for the external, human-operated chat session.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the JSON shape each template mandates is
//!    the exact contract [`crate::parse`] classifies on; changing a field
//!    name means editing exactly one place and its parser counterpart.
//!
//! 2. **Testability** — the builders are pure string functions, so unit
//!    tests can assert on template content without any chat session.
//!
//! Templates use `{PLACEHOLDER}` tokens substituted by the builder methods;
//! no token may survive into the returned string. All pedagogical data that
//! is configuration rather than prose (decree labels, the 6C list) is
//! injected via [`PromptConfig`] at construction.

use crate::config::PromptConfig;
use crate::model::{ClassSession, Project};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static RE_GRADE_NUMERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Template for the full-project "mega prompt".
///
/// The terminal FORMATO DE SALIDA section is the response contract: field
/// names (`nombre_proyecto`, `problema`, `oai`, `rai`, `hsxxi`,
/// `producto_final`, `pregunta_guia`, `cronograma`) and the four-part
/// `actividades` narrative are what the parser's Project signature and the
/// renderers depend on.
const FULL_PROJECT_TEMPLATE: &str = r#"ROL: Actúa como un experto en Diseño Universal para el Aprendizaje (DUA) y especialista en el Currículum Nacional de Chile del MINEDUC.

TU TAREA:
Diseñar una planificación completa para un proyecto escolar basándote EXCLUSIVAMENTE en los siguientes datos y normativa:

CONTEXTO:
- IDEA / NECESIDADES: "{IDEA}" (Analiza aquí si el usuario menciona características del curso, estudiantes PIE/NEEP, recursos disponibles o metodología específica).
- NIVEL EDUCATIVO: {CURSO}
- NORMATIVA APLICABLE: {NORMATIVAS}
- DURACIÓN: {DURACION} semanas
- ASIGNATURAS INTEGRADAS: {ASIGNATURAS}

MARCO TEÓRICO: APRENDIZAJE PROFUNDO (MICHAEL FULLAN) - LAS 6C:
Debes integrar transversalmente estas competencias:
{COMPETENCIAS}

REGLAS DE PLANIFICACIÓN (ESTRICTAS):
1. Filtro de Nivel: Antes de proponer un Objetivo de Aprendizaje (OA), verifica que corresponda estrictamente al nivel y asignatura solicitada según la normativa citada. No mezcles OAs de básica en educación media ni viceversa.
2. Estructura del OA: Cada OA seleccionado debe incluir su número y el texto íntegro según el documento oficial vigente.
3. Vinculación: Relaciona el OA con los Indicadores de Evaluación sugeridos por el MINEDUC.
4. Vigencia Legal: Asegúrate siempre de verificar si la normativa citada sigue vigente.
5. INTEGRACIÓN 6C: Aunque los OAs son los oficiales, las ACTIVIDADES y la EVALUACIÓN deben estar diseñadas para movilizar las 6C de Fullan. No diseñes actividades de "relleno" o solo memorísticas.

FORMATO DE SALIDA (ESTRICTO):
Debes responder ÚNICAMENTE con un objeto JSON válido. NO añadas texto introductorio ni de cierre. El JSON debe seguir EXACTAMENTE esta estructura:

{
  "nombre_proyecto": "Un título creativo y atractivo para el proyecto",
  "problema": "Descripción pedagógica del problema o desafío a resolver",
  "oai": [
    {
      "asignatura": "Nombre Asignatura 1",
      "oa": "Número y Texto del OA (ej: OA 3: Analizar...)",
      "indicadores": ["Indicador 1", "Indicador 2"],
      "oat": ["OAT relacionado"]
    },
    ...
  ],
  "rai": ["Resultado de Aprendizaje Indicador 1", "Resultado de Aprendizaje Indicador 2"],
  "hsxxi": ["Competencia 6C 1 (ej: Carácter - Resiliencia)", "Competencia 6C 2 (ej: Creatividad - Solución de problemas)"],
  "producto_final": "Descripción detallada del artefacto o producto que crearán los estudiantes",
  "pregunta_guia": "¿Pregunta desafiante que impulsa el proyecto?",
  "cronograma": [
    {
      "semana": 1,
      "fase": "Lanzamiento",
      "actividades": "OBLIGATORIO: Tu respuesta para 'actividades' DEBE ser un único string siguiendo este formato EXACTO (usa saltos de línea \n\n):\n\n**Asignatura(s) Principal(es)**: [Indica qué asignatura lidera esta semana]\n\n**Inicio (10-15 min)**: DESCRIPCIÓN DETALLADA PASO A PASO. Qué hace el docente para activar y motivar. Qué responden los estudiantes.\n\n**Desarrollo (45 min)**: DESCRIPCIÓN DETALLADA PASO A PASO de la actividad principal. Explica la instrucción, el trabajo de los estudiantes y el rol del docente. Evita generalidades.\n\n**Aplicación (25 min)**: DESCRIPCIÓN DETALLADA de cómo los estudiantes practican o aplican lo aprendido en el contexto del proyecto.\n\n**Cierre (10 min)**: DESCRIPCIÓN DETALLADA de la metacognición, preguntas clave y ticket de salida.",
      "evaluacion": "Tipo de evaluación o instrumento",
      "recursos": "Recursos necesarios",
      "producto_intermedio": "Opcional: entregable de la semana"
    },
    ... (generar una entrada por cada semana de duración)
  ]
}

INSTRUCCIONES ADICIONALES:
1. Asegúrate de que las actividades sean coherentes con la metodología ABP.
2. Integra realmente las asignaturas mencionadas.
3. El tono debe ser profesional pero motivador para profesores y estudiantes.
4. NO MARQUES EL JSON CON BLOQUES DE CÓDIGO (markdown), SOLO EL TEXTO PLANO DEL JSON.
5. VITAL: En las 'actividades', NO seas genérico. NO digas 'analizan un texto'. DI: 'Leen el texto X, subrayan las ideas principales y discuten en parejas la pregunta Y'. SÉ DESCRIPTIVO."#;

const RUBRIC_TEMPLATE: &str = r#"ACTÚA COMO UN EXPERTO EN EVALUACIÓN EDUCATIVA.

TU TAREA:
Crear una Rúbrica de Evaluación Analítica detallada para el siguiente proyecto:

- TÍTULO: "{TITULO}"
- NIVEL: {CURSO}
- OBJETIVOS DE APRENDIZAJE: {OAI}
- PRODUCTO FINAL: "{PRODUCTO}"
- COMPETENCIAS 6C (Fullan): {HSXXI}

FORMATO DE SALIDA (ESTRICTO JSON):
Debes responder ÚNICAMENTE con un objeto JSON válido con la siguiente estructura:

{
  "criterios": [
    {
      "nombre": "Nombre del Criterio (ej: Calidad de la Investigación)",
      "peso": "20%",
      "niveles": {
        "excelente": "Descripción de desempeño sobresaliente (7.0)",
        "bueno": "Descripción de desempeño adecuado (5.0 - 6.0)",
        "suficiente": "Descripción de desempeño mínimo (4.0)",
        "insuficiente": "Descripción de desempeño bajo (1.0 - 3.9)"
      }
    },
    ... (Generar entre 5 y 7 criterios variados que cubran proceso, producto, y habilidades blandas)
  ]
}

IMPORTANTE:
- Los criterios deben estar ALINEADOS con las 6C de Michael Fullan (Carácter, Ciudadanía, Colaboración, Comunicación, Creatividad, Pensamiento Crítico).
- Evalúa tanto el proceso (competencias) como el producto final.
- Los criterios deben ser específicos y observables.
- El lenguaje debe ser constructivo.
- NO uses markdown para el bloque de código, solo el texto plano del JSON."#;

const INSTRUMENT_TEMPLATE: &str = r#"ACTÚA COMO UN EXPERTO EVALUADOR EDUCACIONAL, ESPECIALISTA EN EVALUACIÓN FORMATIVA Y AUTÉNTICA.

TU TAREA: Diseñar un instrumento de evaluación preciso, sensible y contextualizado para una sesión específica de un Proyecto ABP.

CONTEXTO DEL PROYECTO:
- Nombre: "{TITULO}"
- Nivel Educativo: {CURSO}

INFORMACIÓN DE LA CLASE A EVALUAR:
- Fase del Proyecto: {FASE}
- Actividad Principal: {ACTIVIDADES}
- Evaluación Solicitada: {EVALUACION}
- Producto/Evidencia esperada de esta clase: {PRODUCTO}

INSTRUCCIONES CLAVE:
1. ANALIZA PROFUNDAMENTE la "Evaluación Solicitada" y el "Producto Esperado".
   - Si pide "Autoevaluación" o "Coevaluación", dirígete al estudiante ("Me sentí...", "Mi compañero...").
   - Si hay un producto tangible (ej: maqueta, boceto), sugiere una Rúbrica o Lista de Cotejo técnica.
   - Si es una discusión o debate, sugiere una Escala de Apreciación o Registro de Observación.

2. SELECCIONA EL FORMATO MÁS ADECUADO:
   - "lista_cotejo": Para verificar presencia/ausencia de indicadores.
   - "rubrica": Para evaluar calidad con niveles de desempeño (Excelente, Bueno, etc.).
   - "escala": Para grados de logro (Logrado, Medianamente, Por lograr).
   - "ticket": Preguntas abiertas de metacognición o cierre.
   - "quiz": Preguntas de selección múltiple.

3. REDACTA LOS ITEMS CON LENGUAJE CERCANO Y ADECUADO A LA EDAD ({CURSO}).
   - Sé específico con lo que se evalúa (evita generalidades como "trabajó bien").
   - Vincula los indicadores DIRECTAMENTE con el contenido de la clase y el proyecto.
   - Si es pertinente, evalúa alguna de las 6C (Colaboración, Comunicación, Pensamiento Crítico, etc.) movilizada en la clase.

4. TU RESPUESTA DEBE SER ÚNICAMENTE UN JSON CON ESTA ESTRUCTURA EXACTA:

{
  "instrumento": "Nombre Técnico (ej: Rúbrica Analítica, Autoevaluación de Trabajo en Equipo)",
  "titulo": "Título Creativo para el Estudiante (ej: ¡Revisando mi Progreso!)",
  "instrucciones": "Indicaciones claras y motivadoras para quien responde.",
  "tipo": "rubrica" | "lista_cotejo" | "escala" | "quiz" | "ticket",
  "items": [
    // OPCIÓN A: Para Lista de Cotejo / Escala / Quiz / Ticket
    {
      "pregunta": "Indicador o Pregunta",
      "opciones": ["Sí", "No"] O ["Siempre", "A veces", "Nunca"] O ["A", "B", "C"] (según corresponda)
    },
    // OPCIÓN B: Solo si es "rubrica"
    {
      "criterio": "Nombre del criterio (ej: Creatividad)",
      "niveles": [
          { "nombre": "Excelente", "descripcion": "..." },
          { "nombre": "Regular", "descripcion": "..." },
          { "nombre": "Por mejorar", "descripcion": "..." }
      ]
    }
  ]
}"#;

const IMPROVEMENT_TEMPLATE: &str = r#"ACTÚA COMO UN EXPERTO PEDAGOGO.
TU TAREA: Mejorar el siguiente texto que es parte de un Proyecto ABP.

CONTEXTO DEL PROYECTO:
{CONTEXTO}

SECCIÓN A MEJORAR: {SECCION}
TEXTO ACTUAL: "{TEXTO}"
INSTRUCCIÓN DE MEJORA: "{INSTRUCCION}"

SALIDA ESPERADA:
Solo devuelve el texto mejorado. No agregues comillas ni explicaciones extra. Mantenlo directo y listo para usar."#;

/// Renders project state into the four prompt templates.
///
/// Holds the injected pedagogical configuration; every method is a
/// deterministic pure function of its arguments.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    config: PromptConfig,
}

impl PromptBuilder {
    pub fn new(config: PromptConfig) -> Self {
        Self { config }
    }

    /// The curriculum-normative-framework label for a grade string.
    ///
    /// Matching is on literal (lowercased) substrings — "básico" with its
    /// accent is what the UI produces; an unaccented "basico" is accepted
    /// for hand-typed grades. First match wins:
    /// kínder → parvularia; básico N≤6 → decree set A; básico N>6 or medio
    /// N≤2 → decree set B; medio N>2 → decree set C; else the fallback.
    pub fn curriculum_context(&self, curso: &str) -> &str {
        let labels = &self.config.curriculum;
        if curso.is_empty() {
            return &labels.vigente;
        }
        let lower = curso.to_lowercase();

        if lower.contains("kínder") || lower.contains("kinder") {
            return &labels.parvularia;
        }

        let nivel: u32 = match RE_GRADE_NUMERAL
            .find(curso)
            .and_then(|m| m.as_str().parse().ok())
        {
            Some(n) => n,
            None => return &labels.vigente,
        };

        if lower.contains("básico") || lower.contains("basico") {
            if nivel <= 6 {
                return &labels.basica_1_a_6;
            }
            return &labels.basica_7_a_media_2;
        }

        if lower.contains("medio") {
            if nivel <= 2 {
                return &labels.basica_7_a_media_2;
            }
            return &labels.media_3_y_4;
        }

        &labels.vigente
    }

    /// The "mega prompt" that produces a complete project plan.
    pub fn full_project_prompt(
        &self,
        idea: &str,
        curso: &str,
        duracion_weeks: u32,
        asignaturas: &[String],
    ) -> String {
        let competencias = self
            .config
            .competencies
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}. {}", i + 1, c))
            .collect::<Vec<_>>()
            .join("\n");

        FULL_PROJECT_TEMPLATE
            .replace("{IDEA}", idea)
            .replace("{CURSO}", curso)
            .replace("{NORMATIVAS}", self.curriculum_context(curso))
            .replace("{DURACION}", &duracion_weeks.to_string())
            .replace("{ASIGNATURAS}", &asignaturas.join(", "))
            .replace("{COMPETENCIAS}", &competencias)
    }

    /// The rubric prompt for an already-generated project.
    pub fn rubric_prompt(&self, project: &Project) -> String {
        let curso = if project.curso.is_empty() {
            "No especificado"
        } else {
            &project.curso
        };
        let producto = if project.producto_final.is_empty() {
            "No especificado"
        } else {
            &project.producto_final
        };

        RUBRIC_TEMPLATE
            .replace("{TITULO}", &project.nombre_proyecto)
            .replace("{CURSO}", curso)
            .replace("{OAI}", &json_or_empty_list(&project.oai))
            .replace("{PRODUCTO}", producto)
            .replace("{HSXXI}", &json_or_empty_list(&project.hsxxi))
    }

    /// The per-session instrument prompt.
    pub fn instrument_prompt(&self, session: &ClassSession, project: &Project) -> String {
        let producto = if session.producto_intermedio.is_empty() {
            "No especificado (inferir de la actividad)"
        } else {
            &session.producto_intermedio
        };

        INSTRUMENT_TEMPLATE
            .replace("{TITULO}", &project.nombre_proyecto)
            .replace("{CURSO}", &project.curso)
            .replace("{FASE}", &session.fase)
            .replace("{ACTIVIDADES}", &session.actividades)
            .replace("{EVALUACION}", &session.evaluacion)
            .replace("{PRODUCTO}", producto)
    }

    /// Generic "rewrite this text" prompt for inline improvements.
    ///
    /// `project_context` is embedded as-is when it is a JSON string and
    /// serialised otherwise, matching what editors pass along.
    pub fn improvement_prompt(
        &self,
        field_label: &str,
        current_text: &str,
        instruction: &str,
        project_context: &Value,
    ) -> String {
        let contexto = match project_context {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        IMPROVEMENT_TEMPLATE
            .replace("{CONTEXTO}", &contexto)
            .replace("{SECCION}", field_label)
            .replace("{TEXTO}", current_text)
            .replace("{INSTRUCCION}", instruction)
    }
}

fn json_or_empty_list<T: serde::Serialize>(value: &[T]) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassSession, Project};

    fn builder() -> PromptBuilder {
        PromptBuilder::default()
    }

    #[test]
    fn curriculum_mapping_first_match_wins() {
        let b = builder();
        assert!(b.curriculum_context("Kínder").contains("Decreto 481"));
        assert!(b.curriculum_context("5° Básico").contains("433 y 439"));
        assert!(b.curriculum_context("7° Básico").contains("614 (2013)"));
        assert!(b.curriculum_context("2° Medio").contains("614 (2013)"));
        assert!(b.curriculum_context("3° Medio").contains("Decreto 193"));
        assert!(b.curriculum_context("Multigrado").contains("vigentes"));
        assert!(b.curriculum_context("").contains("vigentes"));
    }

    #[test]
    fn unaccented_basico_is_accepted() {
        assert!(builder().curriculum_context("4 basico").contains("433 y 439"));
    }

    #[test]
    fn full_prompt_resolves_every_placeholder() {
        let p = builder().full_project_prompt(
            "huerto escolar",
            "5° Básico",
            3,
            &["Ciencias".into(), "Lenguaje".into()],
        );
        for token in ["{IDEA}", "{CURSO}", "{NORMATIVAS}", "{DURACION}", "{ASIGNATURAS}", "{COMPETENCIAS}"] {
            assert!(!p.contains(token), "unresolved {token}");
        }
        assert!(p.contains("huerto escolar"));
        assert!(p.contains("3 semanas"));
        assert!(p.contains("Ciencias, Lenguaje"));
        assert!(p.contains("433 y 439"));
    }

    #[test]
    fn full_prompt_fixes_the_response_contract() {
        let p = builder().full_project_prompt("idea", "1° Medio", 4, &[]);
        for field in [
            "\"nombre_proyecto\"",
            "\"problema\"",
            "\"oai\"",
            "\"rai\"",
            "\"hsxxi\"",
            "\"producto_final\"",
            "\"pregunta_guia\"",
            "\"cronograma\"",
        ] {
            assert!(p.contains(field), "missing contract field {field}");
        }
        // The mandated four-part narrative for actividades.
        for part in ["**Inicio", "**Desarrollo", "**Aplicación", "**Cierre"] {
            assert!(p.contains(part), "missing narrative part {part}");
        }
    }

    #[test]
    fn full_prompt_is_deterministic() {
        let b = builder();
        let args = ("idea", "8° Básico", 6u32, vec!["Historia".to_string()]);
        assert_eq!(
            b.full_project_prompt(args.0, args.1, args.2, &args.3),
            b.full_project_prompt(args.0, args.1, args.2, &args.3),
        );
    }

    #[test]
    fn rubric_prompt_embeds_serialized_objectives() {
        let mut project = Project {
            nombre_proyecto: "Huerto".into(),
            producto_final: "Maqueta".into(),
            ..Project::default()
        };
        project.oai.push(crate::model::OaiEntry {
            asignatura: "Ciencias".into(),
            oa: "OA 3".into(),
            ..Default::default()
        });

        let p = builder().rubric_prompt(&project);
        assert!(p.contains(r#""asignatura":"Ciencias""#));
        assert!(p.contains("\"criterios\""));
        assert!(p.contains("No especificado"), "empty curso falls back");
    }

    #[test]
    fn instrument_prompt_embeds_session_fields() {
        let project = Project {
            nombre_proyecto: "Huerto".into(),
            curso: "5° Básico".into(),
            ..Project::default()
        };
        let session = ClassSession {
            semana: 2,
            fase: "Desarrollo".into(),
            actividades: "Construyen el prototipo".into(),
            evaluacion: "Coevaluación".into(),
            ..Default::default()
        };

        let p = builder().instrument_prompt(&session, &project);
        assert!(p.contains("Construyen el prototipo"));
        assert!(p.contains("Coevaluación"));
        assert!(p.contains("inferir de la actividad"), "empty producto falls back");
        for tipo in ["lista_cotejo", "rubrica", "escala", "quiz", "ticket"] {
            assert!(p.contains(tipo));
        }
    }

    #[test]
    fn improvement_prompt_serializes_object_context() {
        let ctx = serde_json::json!({"problema": "Basura en el patio"});
        let p = builder().improvement_prompt("Problema", "texto actual", "más breve", &ctx);
        assert!(p.contains(r#"{"problema":"Basura en el patio"}"#));
        assert!(p.contains("SECCIÓN A MEJORAR: Problema"));

        let plain = builder().improvement_prompt(
            "Problema",
            "t",
            "i",
            &Value::String("contexto plano".into()),
        );
        assert!(plain.contains("contexto plano"));
        assert!(!plain.contains("\"contexto plano\""), "string context is not quoted");
    }
}
