//! End-to-end pipeline tests for copiloto-abp.
//!
//! These exercise the public API the way the tool is actually used: build a
//! prompt, simulate the teacher pasting back a contract-shaped response,
//! parse it, merge it, persist it, and export the documents. No network, no
//! chat session — the "AI" here is a JSON fixture shaped exactly like the
//! prompt contract demands.
//!
//! Run with:
//!   cargo test --test pipeline

use copiloto_abp::{
    parse, parse_rich_text, render, sanitize, DocxRenderer, Orientation, ParseError, ParsedEntity,
    PdfRenderer, Project, ProjectStore, PromptBuilder, WizardContext,
};
use pretty_assertions::assert_eq;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// A project holding ONLY the fields the full-project prompt mandates —
/// what a well-behaved chat response contains.
fn contract_project() -> Project {
    serde_json::from_value(serde_json::json!({
        "nombre_proyecto": "Huerto Escolar",
        "problema": "El patio acumula residuos orgánicos sin uso.",
        "oai": [{
            "asignatura": "Ciencias Naturales",
            "oa": "OA 3: Analizar los ciclos de la materia",
            "indicadores": ["Describe el compostaje"],
            "oat": ["OAT 5"]
        }],
        "rai": ["Explica el ciclo del compost"],
        "hsxxi": ["Colaboración - Interdependencia positiva"],
        "producto_final": "Un huerto escolar operativo",
        "pregunta_guia": "¿Cómo transformamos residuos en alimento?",
        "cronograma": [{
            "semana": 1,
            "fase": "Lanzamiento",
            "actividades": "**Inicio**: saludo",
            "evaluacion": "Observación",
            "recursos": "Pizarra",
            "producto_intermedio": "Boceto"
        }]
    }))
    .expect("fixture deserializes")
}

fn long_project(weeks: usize) -> Project {
    let mut project = contract_project();
    project.cronograma = (0..weeks)
        .map(|i| copiloto_abp::ClassSession {
            semana: (i + 1) as u32,
            fase: "Desarrollo".into(),
            actividades: "Los estudiantes investigan en grupos, registran sus hallazgos \
                          en la bitácora y preparan una breve presentación para el curso."
                .into(),
            evaluacion: "Pauta de observación".into(),
            recursos: "Bitácoras".into(),
            producto_intermedio: "Registro semanal".into(),
            ..Default::default()
        })
        .collect();
    project
}

// ── Round trip: prompt contract → parse → deep equal ─────────────────────────

#[test]
fn contract_json_round_trips_through_the_parser() {
    let original = contract_project();
    let json = serde_json::to_string_pretty(&original).unwrap();

    for wrapped in [json.clone(), format!("```json\n{json}\n```")] {
        match parse(&wrapped).unwrap() {
            ParsedEntity::Project(parsed) => assert_eq!(*parsed, original),
            other => panic!("expected a project, got {}", other.kind()),
        }
    }
}

#[test]
fn fenced_and_noisy_inputs_parse_identically() {
    let json = r#"{"nombre_proyecto":"X","cronograma":[]}"#;
    let fenced = format!("```json\n{json}\n```");
    let noisy = format!("noise before {json} noise after");
    assert_eq!(parse(&fenced).unwrap(), parse(&noisy).unwrap());
}

#[test]
fn classification_priority_and_failures() {
    let both = r#"{"nombre_proyecto":"X","cronograma":[],"criterios":[]}"#;
    assert_eq!(parse(both).unwrap().kind(), "proyecto");

    assert_eq!(parse("not json at all").unwrap_err(), ParseError::NoJsonFound);
    assert!(matches!(
        parse("{not: valid}").unwrap_err(),
        ParseError::InvalidJson(_)
    ));
    assert_eq!(
        parse(r#"{"foo":"bar"}"#).unwrap_err(),
        ParseError::UnrecognizedShape
    );
}

// ── Sanitizer properties ─────────────────────────────────────────────────────

#[test]
fn sanitize_is_idempotent_over_representative_inputs() {
    let samples = [
        "texto [con corchetes] INCLUYE: materiales",
        "**Inicio**: saludo\n\n**Cierre**: ticket",
        "  espacios  ",
        "",
        "sin nada que limpiar",
    ];
    for s in samples {
        let once = sanitize(s);
        assert_eq!(sanitize(&once), once, "input: {s:?}");
    }
}

// ── The documented end-to-end scenario ───────────────────────────────────────

#[test]
fn huerto_escolar_scenario() {
    let project: Project = serde_json::from_value(serde_json::json!({
        "nombre_proyecto": "Huerto Escolar",
        "curso": "5° Básico",
        "duracion": 3,
        "cronograma": [{
            "semana": 1,
            "fase": "Lanzamiento",
            "actividades": "**Inicio**: saludo",
            "evaluacion": "Observación",
            "recursos": "Pizarra",
            "producto_intermedio": "Boceto"
        }]
    }))
    .unwrap();

    // Exactly one schedule entry flows into the document.
    assert_eq!(project.cronograma.len(), 1);

    // "Lanzamiento" matches no phase keyword → the default pale yellow.
    assert_eq!(render::docx::fase_color("Lanzamiento"), "FFF2CC");

    // The activities cell splits into a bold "Inicio" run and a plain rest.
    let lines = parse_rich_text(&project.cronograma[0].actividades);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].len(), 2);
    assert_eq!((lines[0][0].text.as_str(), lines[0][0].bold), ("Inicio", true));
    assert_eq!((lines[0][1].text.as_str(), lines[0][1].bold), (": saludo", false));

    // And the whole thing packs into a real DOCX container.
    let bytes = DocxRenderer::default()
        .project_docx(&project, Orientation::Portrait)
        .unwrap();
    assert!(bytes.starts_with(b"PK"));
}

// ── PDF pagination boundary ──────────────────────────────────────────────────

#[test]
fn long_schedule_forces_extra_pdf_pages() {
    let renderer = PdfRenderer::default();
    for orientation in [Orientation::Portrait, Orientation::Landscape] {
        let output = renderer.project_pdf(&long_project(14), orientation).unwrap();
        assert!(
            output.page_count >= 2,
            "{orientation:?}: expected pagination, got {} page(s)",
            output.page_count
        );
        assert_eq!(
            output.chrome_draws, output.page_count,
            "{orientation:?}: chrome must be drawn exactly once per page"
        );
    }
}

// ── Full cycle through the store ─────────────────────────────────────────────

#[test]
fn prompt_parse_merge_store_export_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("proyectos.json");

    // 1. The prompt the teacher would paste out.
    let prompts = PromptBuilder::default();
    let prompt = prompts.full_project_prompt(
        "huerto escolar con residuos del casino",
        "5° Básico",
        1,
        &["Ciencias Naturales".into()],
    );
    assert!(prompt.contains("\"cronograma\""));

    // 2. The pasted-back response (fixture standing in for the chat).
    let response = format!(
        "Aquí tienes tu planificación:\n```json\n{}\n```",
        serde_json::to_string(&contract_project()).unwrap()
    );
    let mut project = match parse(&response).unwrap() {
        ParsedEntity::Project(p) => *p,
        other => panic!("expected project, got {}", other.kind()),
    };

    // 3. Overlay what the wizard knew and the response never echoes.
    project.apply_wizard_context(&WizardContext {
        curso: "5° Básico".into(),
        duracion: 1,
        asignaturas: vec!["Ciencias Naturales".into()],
        nombre_colegio: String::new(),
        fecha_inicio: "2026-03-02".into(),
        idea: "huerto escolar con residuos del casino".into(),
    });

    // 4. Persist; a fresh id is assigned.
    let mut store = ProjectStore::open(&store_path).unwrap();
    assert!(project.id.is_none());
    let id = store.upsert(project).unwrap();

    // 5. Merge a rubric response into the stored project.
    let rubric_response = r#"{"criterios":[{"nombre":"Calidad de la Investigación","peso":"20%",
        "niveles":{"excelente":"Sobresaliente","bueno":"Adecuado",
                   "suficiente":"Mínimo","insuficiente":"Bajo"}}]}"#;
    let rubric = match parse(rubric_response).unwrap() {
        ParsedEntity::Rubric(r) => r,
        other => panic!("expected rubric, got {}", other.kind()),
    };
    let mut stored = store.get(&id).unwrap().clone();
    assert!(stored.attach_rubric(rubric));
    store.upsert(stored).unwrap();

    // 6. Export everything.
    let stored = store.get(&id).unwrap().clone();
    let docx = DocxRenderer::default();
    assert!(docx
        .project_docx(&stored, Orientation::Landscape)
        .unwrap()
        .starts_with(b"PK"));
    assert!(docx
        .rubric_docx(&stored, stored.rubrica.as_ref().unwrap())
        .unwrap()
        .starts_with(b"PK"));
    let pdf = PdfRenderer::default()
        .project_pdf(&stored, Orientation::Portrait)
        .unwrap();
    assert!(pdf.bytes.starts_with(b"%PDF"));

    // 7. Filenames follow the historical patterns.
    assert_eq!(
        render::project_docx_filename(&stored, Orientation::Landscape),
        "Planificacion_ABP_Landscape_Huerto Escolar.docx"
    );
    assert_eq!(render::rubric_filename(&stored), "Rubrica_Huerto Escolar.docx");
}
