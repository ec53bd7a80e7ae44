//! Word-processor export: project matrix, rubric and instrument documents.
//!
//! The renderer builds a tree of paragraph/table/cell nodes with `docx-rs`
//! and byte-serialises it in one terminal `build().pack()` call — the packer
//! is a dumb collaborator, every layout decision happens in the tree.
//!
//! Layout contract (fixed, not configurable):
//!
//! * Project, portrait: "PARTE 1" — a 3-column key/value matrix where the
//!   four context rows share one merged "1" index cell and each content row
//!   owns a numbered, colour-coded row; "PARTE 2" — a 6-column schedule
//!   table, one row per cronograma entry, Fase cell coloured by keyword.
//! * Project, landscape: same section builders with a condensed 2-column
//!   context table (no index column, combined curso/duración/fecha row, no
//!   pregunta guía row).
//! * Rubric: landscape, one table, header row fixed to the four performance
//!   bands with their literal grade anchors.
//! * Instrument: a table when `tipo` is rubrica (level headers taken from
//!   the FIRST item — uniform level sets are assumed), a numbered list with
//!   per-tipo option rendering otherwise.
//!
//! Every free-text cell goes through the rich-text tokenizer, so `**bold**`
//! spans survive into real bold runs.

use docx_rs::{
    AbstractNumbering, AlignmentType, BreakType, Docx, Header, IndentLevel, Level, LevelJc,
    LevelText, LineSpacing, NumberFormat, Numbering, NumberingId, Paragraph, Run, RunFonts,
    ShdType, Shading, Start, Table, TableCell, TableRow, VAlignType, VMergeType, WidthType,
};
use tracing::info;

use crate::config::RenderConfig;
use crate::error::CopilotoError;
use crate::model::{ClassSession, Instrument, InstrumentKind, Project, Rubric};
use crate::render::Orientation;
use crate::sanitize::parse_rich_text;

// ── Design constants ─────────────────────────────────────────────────────────

const FONT_FAMILY: &str = "Calibri";

/// Asignaturas index block.
const YELLOW_HEADER: &str = "FFD966";
/// Problema row; also the default phase colour.
const YELLOW_LIGHT: &str = "FFF2CC";
/// Oai row; "desarrollo" phases.
const GREEN_LIGHT: &str = "E2EFDA";
/// Rais row.
const BLUE_LIGHT: &str = "DDEBF7";
/// "experimentar"/"prototipar" phases.
const BLUE_DARK: &str = "BDD7EE";
/// HSXXI row.
const RED_LIGHT: &str = "F4CCCC";
/// "publicar"/"cierre" phases.
const RED_BOLD: &str = "FF6666";
/// Producto final row.
const PURPLE: &str = "E1D5E7";
/// Pregunta guía row.
const ORANGE: &str = "FBE5D6";
/// Table header rows.
const HEADER_GRAY: &str = "F2F2F2";
const TEXT_BLACK: &str = "000000";
const HEADER_TEXT_GRAY: &str = "666666";

/// A4 page size in twips.
const A4_PORTRAIT: (u32, u32) = (11_906, 16_838);

/// Hex fill for a schedule row's Fase cell, decided by keyword.
pub fn fase_color(fase: &str) -> &'static str {
    let f = fase.to_lowercase();
    if f.contains("desarroll") {
        GREEN_LIGHT
    } else if f.contains("experiment") || f.contains("prototip") {
        BLUE_DARK
    } else if f.contains("publicar") || f.contains("cierre") {
        RED_BOLD
    } else {
        YELLOW_LIGHT
    }
}

// ── Cell building ────────────────────────────────────────────────────────────

/// Per-cell styling; the `Default` is a plain left-aligned body cell.
#[derive(Debug, Clone)]
struct CellOpts {
    bold: bool,
    shading: Option<&'static str>,
    /// Width in percent of the table.
    width: Option<usize>,
    align: AlignmentType,
    /// Half-points (22 = 11 pt), matching the document's body size.
    font_size: usize,
    v_merge: Option<VMergeType>,
}

impl Default for CellOpts {
    fn default() -> Self {
        Self {
            bold: false,
            shading: None,
            width: None,
            align: AlignmentType::Left,
            font_size: 22,
            v_merge: None,
        }
    }
}

impl CellOpts {
    fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    fn header(shading: &'static str, width: usize) -> Self {
        Self {
            bold: true,
            shading: Some(shading),
            width: Some(width),
            align: AlignmentType::Center,
            ..Self::default()
        }
    }

    fn with(mut self, f: impl FnOnce(&mut Self)) -> Self {
        f(&mut self);
        self
    }
}

fn styled_run(text: &str, size: usize, bold: bool, color: &str) -> Run {
    let mut run = Run::new()
        .add_text(text)
        .size(size)
        .color(color)
        .fonts(RunFonts::new().ascii(FONT_FAMILY));
    if bold {
        run = run.bold();
    }
    run
}

/// Paragraphs for one free-text value: rich-text tokenized, optionally as
/// bullet list items.
fn rich_paragraphs(text: &str, font_size: usize, align: AlignmentType, bullet: bool) -> Vec<Paragraph> {
    parse_rich_text(text)
        .into_iter()
        .map(|line| {
            let mut p = Paragraph::new().align(align.clone());
            if bullet {
                p = p.numbering(NumberingId::new(1), IndentLevel::new(0));
            }
            for run in line {
                p = p.add_run(styled_run(&run.text, font_size, run.bold, TEXT_BLACK));
            }
            p
        })
        .collect()
}

fn apply_opts(mut cell: TableCell, opts: &CellOpts) -> TableCell {
    if let Some(fill) = opts.shading {
        cell = cell.shading(Shading::new().shd_type(ShdType::Clear).color("auto").fill(fill));
    }
    if let Some(width) = opts.width {
        // Table widths are percent-based; OOXML pct units are 1/50 %.
        cell = cell.width(width * 50, WidthType::Pct);
    }
    if let Some(merge) = opts.v_merge.clone() {
        cell = cell.vertical_merge(merge);
    }
    cell.vertical_align(VAlignType::Center)
}

/// A cell holding one text value.
fn text_cell(content: &str, opts: CellOpts) -> TableCell {
    let paragraphs = if opts.bold {
        vec![Paragraph::new()
            .align(opts.align.clone())
            .add_run(styled_run(content, opts.font_size, true, TEXT_BLACK))]
    } else {
        rich_paragraphs(content, opts.font_size, opts.align.clone(), false)
    };

    let mut cell = TableCell::new();
    for p in paragraphs {
        cell = cell.add_paragraph(p);
    }
    apply_opts(cell, &opts)
}

/// A cell holding a bullet list, one rich-text item per entry.
fn list_cell(items: &[String], opts: CellOpts) -> TableCell {
    let mut cell = TableCell::new();
    for item in items {
        for p in rich_paragraphs(item, opts.font_size, opts.align.clone(), true) {
            cell = cell.add_paragraph(p);
        }
    }
    apply_opts(cell, &opts)
}

// ── Renderer ─────────────────────────────────────────────────────────────────

/// Renders projects, rubrics and instruments into DOCX bytes.
#[derive(Debug, Clone, Default)]
pub struct DocxRenderer {
    config: RenderConfig,
}

impl DocxRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// The full planning document ("mátrix" + cronograma).
    pub fn project_docx(
        &self,
        project: &Project,
        orientation: Orientation,
    ) -> Result<Vec<u8>, CopilotoError> {
        info!(
            proyecto = %project.nombre_proyecto,
            ?orientation,
            "rendering project DOCX"
        );

        let mut docx = base_docx(orientation)
            .header(self.school_header(project, &self.config.unit_label));

        let title = match orientation {
            Orientation::Portrait => "MÁTRIX",
            Orientation::Landscape => "MÁTRIX (HORIZONTAL)",
        };
        docx = docx.add_paragraph(
            Paragraph::new()
                .align(AlignmentType::Center)
                .line_spacing(LineSpacing::new().after(200))
                .add_run(styled_run(title, 28, true, TEXT_BLACK)),
        );

        if orientation == Orientation::Portrait {
            docx = docx.add_paragraph(section_label("PARTE 1"));
        }

        docx = docx.add_paragraph(
            Paragraph::new()
                .line_spacing(LineSpacing::new().after(300))
                .add_run(styled_run("Nombre del proyecto: ", 22, true, TEXT_BLACK))
                .add_run(
                    styled_run(&format!("“{}”", project.nombre_proyecto), 22, true, TEXT_BLACK)
                        .italic(),
                ),
        );

        let context = match orientation {
            Orientation::Portrait => portrait_context_table(project),
            Orientation::Landscape => landscape_context_table(project),
        };
        docx = docx
            .add_table(context)
            .add_paragraph(Paragraph::new().line_spacing(LineSpacing::new().after(400)));

        if orientation == Orientation::Portrait {
            docx = docx.add_paragraph(section_label("PARTE 2"));
        }

        docx = docx.add_table(schedule_table(&project.cronograma, orientation));

        pack(docx)
    }

    /// The analytic rubric, one row per criterion, landscape.
    ///
    /// Precondition: the rubric must have at least one criterion; an empty
    /// `criterios` list aborts the export instead of producing a header-only
    /// table.
    pub fn rubric_docx(&self, project: &Project, rubric: &Rubric) -> Result<Vec<u8>, CopilotoError> {
        if rubric.criterios.is_empty() {
            return Err(CopilotoError::EmptyRubric);
        }
        info!(proyecto = %project.nombre_proyecto, "rendering rubric DOCX");

        let title = project.nombre_proyecto.to_uppercase();
        let docx = base_docx(Orientation::Landscape)
            .header(self.school_header(project, "Rúbrica de Evaluación"))
            .add_paragraph(
                Paragraph::new()
                    .align(AlignmentType::Center)
                    .line_spacing(LineSpacing::new().after(300))
                    .add_run(styled_run("RÚBRICA DE EVALUACIÓN", 28, true, TEXT_BLACK))
                    .add_run(
                        Run::new()
                            .add_break(BreakType::TextWrapping)
                            .add_text(format!("Proyecto: {title}"))
                            .size(24)
                            .bold()
                            .color(TEXT_BLACK)
                            .fonts(RunFonts::new().ascii(FONT_FAMILY)),
                    ),
            )
            .add_table(rubric_table(rubric));

        pack(docx)
    }

    /// One session's assessment instrument.
    ///
    /// `session_index` is 0-based; a session beyond the cronograma renders
    /// with a generic "Clase" phase rather than failing — the instrument is
    /// the document, the session line is context.
    pub fn instrument_docx(
        &self,
        project: &Project,
        instrument: &Instrument,
        session_index: usize,
    ) -> Result<Vec<u8>, CopilotoError> {
        if instrument.items.is_empty() {
            return Err(CopilotoError::EmptyInstrument);
        }
        info!(
            instrumento = %instrument.instrumento,
            clase = session_index + 1,
            "rendering instrument DOCX"
        );

        let fase = project
            .cronograma
            .get(session_index)
            .map(|s| s.fase.as_str())
            .unwrap_or("Clase");

        let titulo = if instrument.titulo.is_empty() {
            "Evaluación".to_string()
        } else {
            instrument.titulo.to_uppercase()
        };
        let instrucciones = if instrument.instrucciones.is_empty() {
            "Responde según lo solicitado."
        } else {
            &instrument.instrucciones
        };

        let mut docx = base_docx(Orientation::Portrait)
            .header(self.school_header(project, "Instrumento de Evaluación"))
            .add_paragraph(
                Paragraph::new()
                    .align(AlignmentType::Center)
                    .line_spacing(LineSpacing::new().after(100))
                    .add_run(styled_run(&titulo, 28, true, TEXT_BLACK)),
            )
            .add_paragraph(
                Paragraph::new()
                    .align(AlignmentType::Center)
                    .line_spacing(LineSpacing::new().after(300))
                    .add_run(styled_run(
                        &format!("Clase {}: {}", session_index + 1, fase),
                        22,
                        true,
                        HEADER_TEXT_GRAY,
                    )),
            )
            .add_paragraph(
                Paragraph::new()
                    .line_spacing(LineSpacing::new().after(400))
                    .add_run(styled_run(
                        "Nombre Estudiante: __________________________________________  Fecha: ____________",
                        22,
                        false,
                        TEXT_BLACK,
                    )),
            )
            .add_paragraph(
                Paragraph::new()
                    .line_spacing(LineSpacing::new().after(200))
                    .add_run(styled_run("Instrucciones: ", 22, true, TEXT_BLACK))
                    .add_run(styled_run(instrucciones, 22, false, TEXT_BLACK)),
            );

        if instrument.tipo == InstrumentKind::Rubrica {
            docx = docx.add_table(instrument_rubric_table(instrument));
        } else {
            for p in instrument_item_paragraphs(instrument) {
                docx = docx.add_paragraph(p);
            }
        }

        pack(docx)
    }

    /// Right-aligned institutional header block shared by every document.
    fn school_header(&self, project: &Project, subtitle: &str) -> Header {
        let school = self.config.school_for(&project.nombre_colegio);
        Header::new().add_paragraph(
            Paragraph::new()
                .align(AlignmentType::Right)
                .add_run(styled_run(school, 20, false, HEADER_TEXT_GRAY))
                .add_run(
                    // Break first: the subtitle sits on its own line.
                    Run::new()
                        .add_break(BreakType::TextWrapping)
                        .add_text(subtitle)
                        .size(20)
                        .color(HEADER_TEXT_GRAY)
                        .fonts(RunFonts::new().ascii(FONT_FAMILY)),
                ),
        )
    }
}

// ── Section builders ─────────────────────────────────────────────────────────

fn base_docx(orientation: Orientation) -> Docx {
    let (w, h) = match orientation {
        Orientation::Portrait => A4_PORTRAIT,
        Orientation::Landscape => (A4_PORTRAIT.1, A4_PORTRAIT.0),
    };
    Docx::new()
        .page_size(w, h)
        .add_abstract_numbering(AbstractNumbering::new(1).add_level(Level::new(
            0,
            Start::new(1),
            NumberFormat::new("bullet"),
            LevelText::new("•"),
            LevelJc::new("left"),
        )))
        .add_numbering(Numbering::new(1, 1))
}

fn section_label(text: &str) -> Paragraph {
    Paragraph::new()
        .line_spacing(LineSpacing::new().after(200))
        .add_run(styled_run(text, 24, true, TEXT_BLACK))
}

/// Oai entries as "**Asignatura**: OA" rich-text list items.
fn oai_list(project: &Project) -> Vec<String> {
    project
        .oai
        .iter()
        .map(|o| format!("**{}**: {}", o.asignatura, o.oa))
        .collect()
}

fn fecha_inicio_or_default(project: &Project) -> &str {
    if project.fecha_inicio.is_empty() {
        "A definir"
    } else {
        &project.fecha_inicio
    }
}

/// Portrait "PARTE 1": numbered, colour-coded key/value matrix. The four
/// context rows (asignaturas/nivel/duración/fecha) share one merged index
/// cell.
fn portrait_context_table(project: &Project) -> Table {
    let asignaturas = project.asignaturas.join(", ");
    let index = |shading| CellOpts::header(shading, 5);
    let label = |shading| {
        CellOpts::bold().with(|o| {
            o.shading = Some(shading);
            o.width = Some(20);
        })
    };

    let rows = vec![
        TableRow::new(vec![
            text_cell("1", index(YELLOW_HEADER).with(|o| o.v_merge = Some(VMergeType::Restart))),
            text_cell("Asignaturas", label(YELLOW_HEADER)),
            text_cell(&asignaturas, CellOpts::bold().with(|o| o.width = Some(75))),
        ]),
        TableRow::new(vec![
            text_cell("", CellOpts::default().with(|o| {
                o.v_merge = Some(VMergeType::Continue);
                o.shading = Some(YELLOW_HEADER);
            })),
            text_cell("Nivel/es", label(YELLOW_HEADER)),
            text_cell(&project.curso, CellOpts::default()),
        ]),
        TableRow::new(vec![
            text_cell("", CellOpts::default().with(|o| {
                o.v_merge = Some(VMergeType::Continue);
                o.shading = Some(YELLOW_HEADER);
            })),
            text_cell("Duración", label(YELLOW_HEADER)),
            text_cell(&format!("{} semanas", project.duracion), CellOpts::default()),
        ]),
        TableRow::new(vec![
            text_cell("", CellOpts::default().with(|o| {
                o.v_merge = Some(VMergeType::Continue);
                o.shading = Some(YELLOW_HEADER);
            })),
            text_cell("Fecha de inicio", label(YELLOW_HEADER)),
            text_cell(fecha_inicio_or_default(project), CellOpts::default()),
        ]),
        TableRow::new(vec![
            text_cell("2", index(YELLOW_LIGHT)),
            text_cell("Problema", label(YELLOW_LIGHT)),
            text_cell(&project.problema, CellOpts::default().with(|o| o.align = AlignmentType::Both)),
        ]),
        TableRow::new(vec![
            text_cell("3", index(GREEN_LIGHT)),
            text_cell("Oai", label(GREEN_LIGHT)),
            list_cell(&oai_list(project), CellOpts::default().with(|o| o.font_size = 18)),
        ]),
        TableRow::new(vec![
            text_cell("4", index(BLUE_LIGHT)),
            text_cell("Rais", label(BLUE_LIGHT)),
            list_cell(&project.rai, CellOpts::default().with(|o| o.font_size = 18)),
        ]),
        TableRow::new(vec![
            text_cell("5", index(RED_LIGHT)),
            text_cell("HSXXI", label(RED_LIGHT)),
            list_cell(&project.hsxxi, CellOpts::default().with(|o| o.font_size = 18)),
        ]),
        TableRow::new(vec![
            text_cell("6", index(PURPLE)),
            text_cell("Producto final", label(PURPLE)),
            text_cell(&project.producto_final, CellOpts::default()),
        ]),
        TableRow::new(vec![
            text_cell("7", index(ORANGE)),
            text_cell("Pregunta Guía", label(ORANGE)),
            text_cell(&project.pregunta_guia, CellOpts::default()),
        ]),
    ];

    Table::new(rows).width(5000, WidthType::Pct)
}

/// Landscape context: condensed 2-column variant, no index column, combined
/// curso/duración/fecha row, no pregunta guía.
fn landscape_context_table(project: &Project) -> Table {
    let asignaturas = project.asignaturas.join(", ");
    let combined = format!(
        "{} | {} semanas | Inicio: {}",
        project.curso,
        project.duracion,
        fecha_inicio_or_default(project)
    );
    let label = |shading| {
        CellOpts::bold().with(|o| {
            o.shading = Some(shading);
            o.width = Some(20);
        })
    };

    let rows = vec![
        TableRow::new(vec![
            text_cell("Asignaturas", label(YELLOW_HEADER)),
            text_cell(&asignaturas, CellOpts::bold().with(|o| o.width = Some(80))),
        ]),
        TableRow::new(vec![
            text_cell("Curso & Fecha", label(YELLOW_HEADER)),
            text_cell(&combined, CellOpts::default()),
        ]),
        TableRow::new(vec![
            text_cell("Problema", label(YELLOW_LIGHT)),
            text_cell(&project.problema, CellOpts::default().with(|o| o.align = AlignmentType::Both)),
        ]),
        TableRow::new(vec![
            text_cell("Oai", label(GREEN_LIGHT)),
            list_cell(&oai_list(project), CellOpts::default().with(|o| o.font_size = 18)),
        ]),
        TableRow::new(vec![
            text_cell("Rais", label(BLUE_LIGHT)),
            list_cell(&project.rai, CellOpts::default().with(|o| o.font_size = 18)),
        ]),
        TableRow::new(vec![
            text_cell("HSXXI", label(RED_LIGHT)),
            list_cell(&project.hsxxi, CellOpts::default().with(|o| o.font_size = 18)),
        ]),
        TableRow::new(vec![
            text_cell("Producto Final", label(PURPLE)),
            text_cell(&project.producto_final, CellOpts::default()),
        ]),
    ];

    Table::new(rows).width(5000, WidthType::Pct)
}

/// "PARTE 2": the 6-column schedule, one row per cronograma entry.
fn schedule_table(cronograma: &[ClassSession], orientation: Orientation) -> Table {
    let semana_header = match orientation {
        Orientation::Portrait => "Semana",
        Orientation::Landscape => "Sem",
    };
    let producto_header = match orientation {
        Orientation::Portrait => "Producto intermedio",
        Orientation::Landscape => "Producto",
    };

    let mut rows = vec![TableRow::new(vec![
        text_cell("Fase", CellOpts::header(HEADER_GRAY, 15)),
        text_cell(semana_header, CellOpts::header(HEADER_GRAY, 5)),
        text_cell("Actividades", CellOpts::header(HEADER_GRAY, 35)),
        text_cell("Evaluación", CellOpts::header(HEADER_GRAY, 15)),
        text_cell("Recursos", CellOpts::header(HEADER_GRAY, 15)),
        text_cell(producto_header, CellOpts::header(HEADER_GRAY, 15)),
    ])];
    rows.extend(schedule_rows(cronograma));

    Table::new(rows).width(5000, WidthType::Pct)
}

/// Data rows of the schedule table; split out for testability.
fn schedule_rows(cronograma: &[ClassSession]) -> Vec<TableRow> {
    cronograma
        .iter()
        .enumerate()
        .map(|(index, session)| {
            let semana = if session.semana == 0 {
                (index + 1).to_string()
            } else {
                session.semana.to_string()
            };
            TableRow::new(vec![
                text_cell(
                    &session.fase,
                    CellOpts::bold().with(|o| {
                        o.shading = Some(fase_color(&session.fase));
                        o.align = AlignmentType::Center;
                        o.font_size = 18;
                    }),
                ),
                text_cell(&semana, CellOpts::default().with(|o| o.align = AlignmentType::Center)),
                text_cell(&session.actividades, CellOpts::default().with(|o| o.font_size = 18)),
                text_cell(&session.evaluacion, CellOpts::default().with(|o| o.font_size = 18)),
                text_cell(&session.recursos, CellOpts::default().with(|o| o.font_size = 18)),
                text_cell(
                    &session.producto_intermedio,
                    CellOpts::default().with(|o| o.font_size = 18),
                ),
            ])
        })
        .collect()
}

/// The four-band rubric table with its literal grade anchors.
fn rubric_table(rubric: &Rubric) -> Table {
    let mut rows = vec![TableRow::new(vec![
        text_cell("Criterio y Peso", CellOpts::header(HEADER_GRAY, 20).with(|o| o.align = AlignmentType::Left)),
        text_cell("Excelente (7.0)", CellOpts::header(BLUE_LIGHT, 20).with(|o| o.align = AlignmentType::Left)),
        text_cell("Bueno (5.0 - 6.0)", CellOpts::header(GREEN_LIGHT, 20).with(|o| o.align = AlignmentType::Left)),
        text_cell("Suficiente (4.0)", CellOpts::header(YELLOW_LIGHT, 20).with(|o| o.align = AlignmentType::Left)),
        text_cell("Insuficiente (1.0 - 3.9)", CellOpts::header(RED_LIGHT, 20).with(|o| o.align = AlignmentType::Left)),
    ])];

    let dash = |text: &str| if text.is_empty() { "-" } else { text }.to_string();
    for c in &rubric.criterios {
        let head = vec![c.nombre.clone(), format!("Peso: {}", dash(&c.peso))];
        let level = |text: &str| {
            text_cell(&dash(text), CellOpts::default().with(|o| {
                o.width = Some(20);
                o.font_size = 18;
            }))
        };
        rows.push(TableRow::new(vec![
            list_cell(&head, CellOpts::bold().with(|o| o.width = Some(20))),
            level(&c.niveles.excelente),
            level(&c.niveles.bueno),
            level(&c.niveles.suficiente),
            level(&c.niveles.insuficiente),
        ]));
    }

    Table::new(rows).width(5000, WidthType::Pct)
}

/// Rubric-shaped instrument: one column per performance level, taken from
/// the first item (uniform level sets across items are assumed).
fn instrument_rubric_table(instrument: &Instrument) -> Table {
    let levels = instrument.items[0].niveles().unwrap_or(&[]);

    let mut header = vec![text_cell("Criterio / Indicador", CellOpts::header(HEADER_GRAY, 25).with(|o| o.align = AlignmentType::Left))];
    for level in levels {
        let name = if level.nombre.is_empty() { "Nivel" } else { &level.nombre };
        header.push(text_cell(name, CellOpts::bold().with(|o| {
            o.shading = Some(BLUE_LIGHT);
            o.align = AlignmentType::Center;
        })));
    }

    let mut rows = vec![TableRow::new(header)];
    for item in &instrument.items {
        let mut cells = vec![text_cell(item.label(), CellOpts::bold())];
        for level in item.niveles().unwrap_or(&[]) {
            cells.push(text_cell(&level.descripcion, CellOpts::default().with(|o| o.font_size = 18)));
        }
        rows.push(TableRow::new(cells));
    }

    Table::new(rows).width(5000, WidthType::Pct)
}

/// List-shaped instruments: numbered items, then per-tipo option lines.
fn instrument_item_paragraphs(instrument: &Instrument) -> Vec<Paragraph> {
    let mut out = Vec::new();
    let default_options = ["Sí".to_string(), "No".to_string()];

    for (idx, item) in instrument.items.iter().enumerate() {
        out.push(
            Paragraph::new()
                .line_spacing(LineSpacing::new().before(200).after(100))
                .add_run(styled_run(
                    &format!("{}. {}", idx + 1, item.label()),
                    22,
                    true,
                    TEXT_BLACK,
                )),
        );

        let opciones: &[String] = match item {
            crate::model::InstrumentItem::Choice { opciones, .. } => opciones,
            crate::model::InstrumentItem::Rubric { .. } => &[],
        };

        match instrument.tipo {
            InstrumentKind::Quiz => {
                for (i, opt) in opciones.iter().enumerate() {
                    let letter = (b'a' + (i as u8 % 26)) as char;
                    out.push(
                        Paragraph::new()
                            .indent(Some(720), None, None, None)
                            .add_run(styled_run(&format!("{letter}) {opt}"), 20, false, TEXT_BLACK)),
                    );
                }
            }
            InstrumentKind::Ticket => {
                for _ in 0..2 {
                    out.push(
                        Paragraph::new()
                            .line_spacing(LineSpacing::new().before(100))
                            .add_run(styled_run(
                                "___________________________________________________________________________________",
                                20,
                                false,
                                TEXT_BLACK,
                            )),
                    );
                }
            }
            _ => {
                // Checklists and scales fall back to a yes/no pair.
                let opts = if opciones.is_empty() { &default_options[..] } else { opciones };
                for opt in opts {
                    out.push(
                        Paragraph::new()
                            .indent(Some(720), None, None, None)
                            .add_run(styled_run(&format!("[   ] {opt}"), 20, false, TEXT_BLACK)),
                    );
                }
            }
        }
    }

    out
}

/// Terminal packing call: tree → DOCX zip bytes.
fn pack(docx: Docx) -> Result<Vec<u8>, CopilotoError> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| CopilotoError::DocxBuild(e.to_string()))?;
    Ok(buffer.into_inner())
}

// ── Tests ────────────────────────────────────────────────────────────────────
