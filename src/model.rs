//! The in-memory schema for projects, rubrics and assessment instruments.
//!
//! Field names are the Spanish identifiers of the JSON contract the prompts
//! mandate and the parser classifies on — they are wire format, not style,
//! so they stay exactly as the external chat session produces them.
//!
//! Every struct is `#[serde(default)]`-tolerant: the AI's project response
//! carries only the generated fields (no `id`, no `curso`, no `duracion`);
//! the wizard overlay ([`Project::apply_wizard_context`]) fills in what the
//! user typed. Renderers must therefore treat every field as possibly empty.
//!
//! Mutation policy: the editing layer never mutates in place — it calls
//! [`set_path`] to obtain a fresh tree with one leaf replaced, keeping
//! concurrent reads safe by construction.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

// ── Project aggregate ────────────────────────────────────────────────────────

/// One learning objective tied to one subject.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OaiEntry {
    pub asignatura: String,
    /// Number and full text of the objective (e.g. "OA 3: Analizar…").
    pub oa: String,
    pub indicadores: Vec<String>,
    pub oat: Vec<String>,
}

/// One week of the cronograma.
///
/// Position in the `cronograma` array is canonical; `semana` is display
/// data and never reorders anything, even when out of sequence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassSession {
    pub semana: u32,
    pub fase: String,
    /// Four-part narrative (Inicio/Desarrollo/Aplicación/Cierre) with
    /// `**bold**` section markers.
    pub actividades: String,
    pub evaluacion: String,
    pub recursos: String,
    /// Some responses use the shorter key `producto`.
    #[serde(alias = "producto")]
    pub producto_intermedio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrumento_evaluacion: Option<Instrument>,
}

impl ClassSession {
    /// Attach (replacing any previous) the session's assessment instrument.
    ///
    /// Refuses instruments with no items, mirroring the render precondition.
    pub fn attach_instrument(&mut self, instrument: Instrument) -> bool {
        if instrument.items.is_empty() {
            warn!("discarding instrument without items for fase '{}'", self.fase);
            return false;
        }
        self.instrumento_evaluacion = Some(instrument);
        true
    }
}

/// Descriptions for the four fixed performance bands of a rubric criterion.
///
/// Exactly four levels — the band set is part of the document contract and
/// every renderer's header row, not an extensible list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RubricLevels {
    pub excelente: String,
    pub bueno: String,
    pub suficiente: String,
    pub insuficiente: String,
}

/// One rubric criterion with its weight (free text, typically "NN%").
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Criterion {
    pub nombre: String,
    pub peso: String,
    pub niveles: RubricLevels,
}

/// The project-level grading rubric.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rubric {
    pub criterios: Vec<Criterion>,
}

/// The five instrument formats the instrument prompt may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    Rubrica,
    /// Presence/absence checklists; also the rendering default for any
    /// instrument whose `tipo` is absent.
    #[default]
    ListaCotejo,
    Escala,
    Quiz,
    Ticket,
}

/// One performance level of a rubric-shaped instrument item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelDescriptor {
    pub nombre: String,
    pub descripcion: String,
}

/// An instrument item: the shape depends on the instrument's `tipo`.
///
/// This is the tagged union of the response contract — rubric instruments
/// carry `{criterio, niveles}` items, every other kind carries
/// `{pregunta, opciones}`. Deserialisation is untagged: the `criterio` key
/// decides the variant, since only rubric items have it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InstrumentItem {
    Rubric {
        criterio: String,
        #[serde(default)]
        niveles: Vec<LevelDescriptor>,
    },
    Choice {
        #[serde(default)]
        pregunta: String,
        #[serde(default)]
        opciones: Vec<String>,
    },
}

impl InstrumentItem {
    /// The item's display text regardless of variant (the original renderer
    /// read `pregunta || criterio`).
    pub fn label(&self) -> &str {
        match self {
            InstrumentItem::Rubric { criterio, .. } => criterio,
            InstrumentItem::Choice { pregunta, .. } => pregunta,
        }
    }

    /// Performance levels, when this is a rubric-shaped item.
    pub fn niveles(&self) -> Option<&[LevelDescriptor]> {
        match self {
            InstrumentItem::Rubric { niveles, .. } => Some(niveles),
            InstrumentItem::Choice { .. } => None,
        }
    }
}

/// A generated assessment instrument attached to one class session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Instrument {
    /// Technical name (e.g. "Rúbrica Analítica").
    pub instrumento: String,
    /// Student-facing title.
    pub titulo: String,
    pub instrucciones: String,
    pub tipo: InstrumentKind,
    pub items: Vec<InstrumentItem>,
}

/// The root aggregate: one project-based-learning unit.
///
/// `id` is assigned on first persistence; `None` signals "new, unsaved".
/// `cronograma.len()` should equal `duracion` but the invariant is not
/// enforced — renderers tolerate the mismatch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub nombre_proyecto: String,
    pub nombre_colegio: String,
    pub curso: String,
    /// Duration in weeks.
    pub duracion: u32,
    pub fecha_inicio: String,
    pub asignaturas: Vec<String>,
    /// The teacher's original free-text idea the prompt was built from.
    pub idea: String,
    pub problema: String,
    pub pregunta_guia: String,
    pub producto_final: String,
    pub oai: Vec<OaiEntry>,
    pub rai: Vec<String>,
    pub hsxxi: Vec<String>,
    pub cronograma: Vec<ClassSession>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rubrica: Option<Rubric>,
    /// Last-modified instant, epoch milliseconds. Stamped by the store.
    pub timestamp: i64,
}

/// The wizard's form fields, overlaid onto a freshly parsed project.
#[derive(Debug, Clone, Default)]
pub struct WizardContext {
    pub curso: String,
    pub duracion: u32,
    pub asignaturas: Vec<String>,
    pub nombre_colegio: String,
    pub fecha_inicio: String,
    pub idea: String,
}

impl Project {
    /// Overlay the wizard's own answers onto this (AI-generated) project.
    ///
    /// The response contract never echoes these fields back, so they come
    /// from the form the prompt was built with.
    pub fn apply_wizard_context(&mut self, ctx: &WizardContext) {
        self.curso = ctx.curso.clone();
        self.duracion = ctx.duracion;
        self.asignaturas = ctx.asignaturas.clone();
        self.nombre_colegio = ctx.nombre_colegio.clone();
        self.fecha_inicio = ctx.fecha_inicio.clone();
        self.idea = ctx.idea.clone();
    }

    /// Merge a separately parsed rubric into the project.
    ///
    /// Re-validates that `criterios` is a non-empty array even though the
    /// parser already classified the shape — rubric consumers keep their own
    /// guard so a hand-edited store file cannot smuggle an empty rubric in.
    pub fn attach_rubric(&mut self, rubric: Rubric) -> bool {
        if rubric.criterios.is_empty() {
            warn!("discarding rubric without criterios for '{}'", self.nombre_proyecto);
            return false;
        }
        self.rubrica = Some(rubric);
        true
    }
}

// ── Path-based mutation ──────────────────────────────────────────────────────

/// One step of an edit path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSeg {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSeg {
    fn from(s: &str) -> Self {
        PathSeg::Key(s.to_string())
    }
}

impl From<String> for PathSeg {
    fn from(s: String) -> Self {
        PathSeg::Key(s)
    }
}

impl From<usize> for PathSeg {
    fn from(i: usize) -> Self {
        PathSeg::Index(i)
    }
}

/// Return a copy of `root` with the value at the end of `path` replaced.
///
/// This is the single mutation primitive the inline-editing layer builds on:
/// every edit produces a fresh tree, so readers holding the old root never
/// observe a half-applied change.
///
/// An empty `path` is a defensive no-op (the unchanged root is returned).
/// Precondition: every intermediate segment exists and has the matching
/// container type — the function does not auto-vivify missing objects or
/// arrays. A dangling segment leaves the tree unchanged and logs a warning.
pub fn set_path(root: &Value, path: &[PathSeg], value: Value) -> Value {
    let mut out = root.clone();
    if path.is_empty() {
        return out;
    }

    let mut cursor = &mut out;
    for seg in &path[..path.len() - 1] {
        let next = match seg {
            PathSeg::Key(k) => cursor.get_mut(k.as_str()),
            PathSeg::Index(i) => cursor.get_mut(*i),
        };
        match next {
            Some(v) => cursor = v,
            None => {
                warn!("set_path: segment {seg:?} not found; tree unchanged");
                return out;
            }
        }
    }

    match path.last().expect("non-empty path") {
        PathSeg::Key(k) => match cursor.as_object_mut() {
            Some(map) => {
                map.insert(k.clone(), value);
            }
            None => warn!("set_path: terminal segment '{k}' is not an object key; tree unchanged"),
        },
        PathSeg::Index(i) => match cursor.as_array_mut() {
            Some(arr) if *i < arr.len() => arr[*i] = value,
            _ => warn!("set_path: terminal index {i} out of bounds; tree unchanged"),
        },
    }

    out
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_path_replaces_leaf_copy_on_write() {
        let root = json!({"a": {"b": 1, "c": 2}});
        let result = set_path(&root, &["a".into(), "b".into()], json!(99));
        assert_eq!(result["a"]["b"], 99);
        assert_eq!(result["a"]["c"], 2);
        assert_eq!(root["a"]["b"], 1, "original must be untouched");
        assert_ne!(result, root);
    }

    #[test]
    fn set_path_array_index() {
        let root = json!({"cronograma": [{"fase": "Inicio"}, {"fase": "Cierre"}]});
        let result = set_path(
            &root,
            &["cronograma".into(), 1usize.into(), "fase".into()],
            json!("Publicación"),
        );
        assert_eq!(result["cronograma"][1]["fase"], "Publicación");
        assert_eq!(result["cronograma"][0]["fase"], "Inicio");
    }

    #[test]
    fn set_path_empty_path_is_noop() {
        let root = json!({"a": 1});
        assert_eq!(set_path(&root, &[], json!(2)), root);
    }

    #[test]
    fn set_path_dangling_segment_leaves_tree_unchanged() {
        let root = json!({"a": {"b": 1}});
        let result = set_path(&root, &["missing".into(), "b".into()], json!(2));
        assert_eq!(result, root);
    }

    #[test]
    fn instrument_item_variants_deserialize_by_shape() {
        let choice: InstrumentItem =
            serde_json::from_value(json!({"pregunta": "¿Colaboró?", "opciones": ["Sí", "No"]}))
                .unwrap();
        assert_eq!(choice.label(), "¿Colaboró?");
        assert!(choice.niveles().is_none());

        let rubric: InstrumentItem = serde_json::from_value(json!({
            "criterio": "Creatividad",
            "niveles": [{"nombre": "Excelente", "descripcion": "…"}]
        }))
        .unwrap();
        assert_eq!(rubric.label(), "Creatividad");
        assert_eq!(rubric.niveles().unwrap().len(), 1);
    }

    #[test]
    fn instrument_kind_wire_names() {
        assert_eq!(
            serde_json::to_value(InstrumentKind::ListaCotejo).unwrap(),
            json!("lista_cotejo")
        );
        let k: InstrumentKind = serde_json::from_value(json!("rubrica")).unwrap();
        assert_eq!(k, InstrumentKind::Rubrica);
    }

    #[test]
    fn session_producto_alias() {
        let s: ClassSession =
            serde_json::from_value(json!({"semana": 1, "producto": "Boceto"})).unwrap();
        assert_eq!(s.producto_intermedio, "Boceto");
    }

    #[test]
    fn project_tolerates_partial_ai_shape() {
        let p: Project = serde_json::from_value(json!({
            "nombre_proyecto": "Huerto Escolar",
            "cronograma": [{"semana": 1, "fase": "Lanzamiento"}]
        }))
        .unwrap();
        assert!(p.id.is_none());
        assert_eq!(p.duracion, 0);
        assert_eq!(p.cronograma.len(), 1);
    }

    #[test]
    fn attach_rubric_rejects_empty_criterios() {
        let mut p = Project::default();
        assert!(!p.attach_rubric(Rubric::default()));
        assert!(p.rubrica.is_none());

        let ok = Rubric { criterios: vec![Criterion::default()] };
        assert!(p.attach_rubric(ok));
        assert!(p.rubrica.is_some());
    }
}
