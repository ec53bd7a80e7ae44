//! PDF export: two hand-laid page styles over the same project data.
//!
//! PDF has no automatic flow, so this renderer owns every vertical position:
//! it measures text through [`crate::render::layout`], wraps to column
//! widths, computes card and row heights from wrapped-line counts, decides
//! page breaks, and re-draws the running chrome (header rule, school line,
//! page number or footer) on every page it creates.
//!
//! Two layouts:
//!
//! * **Landscape "educational"** — sequential bordered tables (context row,
//!   desafío triad, curricular triad, full schedule) with fixed column-width
//!   ratios; the schedule allows row-level page breaks and repeats its
//!   column header on every page.
//! * **Portrait "modern"** — a dark header band sized to the wrapped title,
//!   three info cards, and a manually iterated vertical timeline where each
//!   entry's box height comes from its wrapped activity text.
//!
//! Body text goes through [`crate::sanitize::clean_for_display`]: inline
//! `**bold**` runs are unwrapped, not styled — mixed-run width measurement
//! is not implemented, and that asymmetry with the DOCX output is an
//! accepted limitation, not a bug. Only labels use the bold face.
//!
//! The phase palette here is deliberately restated, muted, and distinct
//! from the DOCX fills; the two exports are different products of the same
//! keywords.

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerIndex, PdfLayerReference, PdfPageIndex, Point, Polygon, Rgb,
};
use tracing::info;

use crate::config::RenderConfig;
use crate::error::CopilotoError;
use crate::model::{ClassSession, Project};
use crate::render::layout::{wrap_text, Cursor};
use crate::render::Orientation;
use crate::sanitize::clean_for_display;

// ── Palettes (0–255 RGB, converted at draw time) ─────────────────────────────

type Swatch = (u8, u8, u8);

/// Landscape "educational" palette.
const L_PRIMARY: Swatch = (15, 118, 110);
const L_SECONDARY: Swatch = (51, 65, 85);
const L_ACCENT: Swatch = (245, 158, 11);
const L_BG_HEADER: Swatch = (241, 245, 249);
const L_WHITE: Swatch = (255, 255, 255);
const L_BORDER: Swatch = (226, 232, 240);

/// Portrait "modern" palette (sober navy/bronze/slate).
const P_DARK: Swatch = (15, 23, 42);
const P_SLATE: Swatch = (71, 85, 105);
const P_BRONZE: Swatch = (180, 83, 9);
const P_TEXT: Swatch = (51, 65, 85);
const P_WHITE: Swatch = (255, 255, 255);
const P_CARD_BORDER: Swatch = (230, 230, 230);
const P_MUTED: Swatch = (150, 150, 150);
const P_LABEL: Swatch = (100, 100, 100);

/// Muted phase colour for schedule entries, distinct from the DOCX fills.
///
/// Same keywords as the DOCX mapping, different product: timeline markers
/// and phase labels want ink colours, not cell fills.
pub fn pdf_phase_color(fase: &str) -> Swatch {
    let f = fase.to_lowercase();
    if f.contains("desarroll") {
        P_BRONZE
    } else if f.contains("experiment") || f.contains("prototip") {
        L_PRIMARY
    } else if f.contains("publicar") || f.contains("cierre") {
        P_DARK
    } else {
        P_SLATE
    }
}

fn color(s: Swatch) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(s.0) / 255.0,
        f32::from(s.1) / 255.0,
        f32::from(s.2) / 255.0,
        None,
    ))
}

// ── Output ───────────────────────────────────────────────────────────────────

/// A finished PDF with the pagination facts a caller may want to assert on.
#[derive(Debug, Clone)]
pub struct PdfOutput {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// How many times the running header/footer chrome was drawn; equals
    /// `page_count` when pagination behaved.
    pub chrome_draws: usize,
}

// ── Canvas: printpdf plumbing behind a top-origin API ────────────────────────

/// Wraps the printpdf document with from-top coordinates (the convention the
/// layouts are written in; printpdf itself is bottom-origin).
struct Canvas {
    doc: PdfDocumentReference,
    pages: Vec<(PdfPageIndex, PdfLayerIndex)>,
    current: usize,
    width: f32,
    height: f32,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Canvas {
    fn new(title: &str, width: f32, height: f32) -> Result<Self, CopilotoError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(width), Mm(height), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| CopilotoError::PdfBuild(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| CopilotoError::PdfBuild(e.to_string()))?;
        Ok(Self {
            doc,
            pages: vec![(page, layer)],
            current: 0,
            width,
            height,
            regular,
            bold,
        })
    }

    fn add_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(self.width), Mm(self.height), "Layer 1");
        self.pages.push((page, layer));
        self.current = self.pages.len() - 1;
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Switch drawing to an already-created page (footer pass).
    fn goto_page(&mut self, index: usize) {
        self.current = index;
    }

    fn layer(&self) -> PdfLayerReference {
        let (page, layer) = self.pages[self.current];
        self.doc.get_page(page).get_layer(layer)
    }

    fn text(&self, text: &str, size: f32, x: f32, y_top: f32, bold: bool, ink: Swatch) {
        let layer = self.layer();
        layer.set_fill_color(color(ink));
        let font = if bold { &self.bold } else { &self.regular };
        layer.use_text(text, size, Mm(x), Mm(self.height - y_top), font);
    }

    /// Draw pre-wrapped lines downward from `y_top` with `line_h` leading.
    fn text_lines(
        &self,
        lines: &[String],
        size: f32,
        x: f32,
        y_top: f32,
        line_h: f32,
        bold: bool,
        ink: Swatch,
    ) {
        for (i, line) in lines.iter().enumerate() {
            self.text(line, size, x, y_top + i as f32 * line_h, bold, ink);
        }
    }

    /// Centered single line.
    fn text_centered(&self, text: &str, size: f32, y_top: f32, bold: bool, ink: Swatch) {
        let w = crate::render::layout::measure_text(text, size);
        self.text(text, size, (self.width - w) / 2.0, y_top, bold, ink);
    }

    fn fill_rect(&self, x: f32, y_top: f32, w: f32, h: f32, fill: Swatch) {
        let layer = self.layer();
        layer.set_fill_color(color(fill));
        layer.add_polygon(Polygon {
            rings: vec![self.rect_ring(x, y_top, w, h)],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn stroke_rect(&self, x: f32, y_top: f32, w: f32, h: f32, ink: Swatch, thickness: f32) {
        let layer = self.layer();
        layer.set_outline_color(color(ink));
        layer.set_outline_thickness(thickness);
        let mut points = self.rect_ring(x, y_top, w, h);
        points.push(points[0].clone());
        layer.add_line(Line {
            points,
            is_closed: true,
        });
    }

    fn rect_ring(&self, x: f32, y_top: f32, w: f32, h: f32) -> Vec<(Point, bool)> {
        let top = self.height - y_top;
        let bottom = self.height - (y_top + h);
        vec![
            (Point::new(Mm(x), Mm(top)), false),
            (Point::new(Mm(x + w), Mm(top)), false),
            (Point::new(Mm(x + w), Mm(bottom)), false),
            (Point::new(Mm(x), Mm(bottom)), false),
        ]
    }

    fn line(&self, x1: f32, y1_top: f32, x2: f32, y2_top: f32, ink: Swatch, thickness: f32) {
        let layer = self.layer();
        layer.set_outline_color(color(ink));
        layer.set_outline_thickness(thickness);
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Mm(self.height - y1_top)), false),
                (Point::new(Mm(x2), Mm(self.height - y2_top)), false),
            ],
            is_closed: false,
        });
    }

    /// Filled circle as a 12-gon; markers are 3 mm, nobody sees the facets.
    fn fill_circle(&self, cx: f32, cy_top: f32, r: f32, fill: Swatch) {
        let cy = self.height - cy_top;
        let ring: Vec<(Point, bool)> = (0..12)
            .map(|i| {
                let a = std::f32::consts::TAU * i as f32 / 12.0;
                (Point::new(Mm(cx + r * a.cos()), Mm(cy + r * a.sin())), false)
            })
            .collect();
        let layer = self.layer();
        layer.set_fill_color(color(fill));
        layer.add_polygon(Polygon {
            rings: vec![ring],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn save(self) -> Result<Vec<u8>, CopilotoError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| CopilotoError::PdfBuild(e.to_string()))
    }
}

// ── Mini table engine ────────────────────────────────────────────────────────

/// One cell of a hand-laid table row.
struct Cell<'a> {
    text: &'a str,
    bold: bool,
    ink: Swatch,
    fill: Option<Swatch>,
    centered: bool,
}

impl<'a> Cell<'a> {
    fn plain(text: &'a str) -> Self {
        Cell {
            text,
            bold: false,
            ink: L_SECONDARY,
            fill: None,
            centered: false,
        }
    }

    fn label(text: &'a str) -> Self {
        Cell {
            text,
            bold: true,
            ink: L_PRIMARY,
            fill: Some(L_BG_HEADER),
            centered: false,
        }
    }
}

const CELL_PADDING: f32 = 3.0;

fn row_line_height(font_size: f32) -> f32 {
    font_size * 0.5
}

/// Wrapped line counts per cell → the row height that fits them all.
fn measure_row(cells: &[Cell<'_>], widths: &[f32], font_size: f32) -> (Vec<Vec<String>>, f32) {
    let mut wrapped = Vec::with_capacity(cells.len());
    let mut max_lines = 1usize;
    for (cell, w) in cells.iter().zip(widths) {
        let lines = wrap_text(cell.text, font_size, w - 2.0 * CELL_PADDING);
        max_lines = max_lines.max(lines.len());
        wrapped.push(lines);
    }
    let height = max_lines as f32 * row_line_height(font_size) + 2.0 * CELL_PADDING;
    (wrapped, height)
}

/// Draw one measured row at the cursor; the caller has already page-checked.
fn draw_row(
    canvas: &Canvas,
    cursor: &Cursor,
    x: f32,
    widths: &[f32],
    cells: &[Cell<'_>],
    wrapped: &[Vec<String>],
    height: f32,
    font_size: f32,
) {
    let mut cx = x;
    for ((cell, lines), w) in cells.iter().zip(wrapped).zip(widths) {
        if let Some(fill) = cell.fill {
            canvas.fill_rect(cx, cursor.y, *w, height, fill);
        }
        canvas.stroke_rect(cx, cursor.y, *w, height, L_BORDER, 0.3);
        let text_x = if cell.centered {
            let first = lines.first().map(String::as_str).unwrap_or("");
            cx + (w - crate::render::layout::measure_text(first, font_size)) / 2.0
        } else {
            cx + CELL_PADDING
        };
        canvas.text_lines(
            lines,
            font_size,
            text_x,
            cursor.y + CELL_PADDING + row_line_height(font_size) * 0.8,
            row_line_height(font_size),
            cell.bold,
            cell.ink,
        );
        cx += w;
    }
}

/// A full-width single-cell band (section title row).
fn draw_band(canvas: &Canvas, cursor: &mut Cursor, x: f32, width: f32, text: &str, fill: Swatch) {
    let height = 8.0;
    canvas.fill_rect(x, cursor.y, width, height, fill);
    canvas.text_centered(text, 11.0, cursor.y + 5.5, true, L_WHITE);
    cursor.advance(height);
}

// ── Renderer ─────────────────────────────────────────────────────────────────

const MARGIN: f32 = 15.0;

/// Renders projects into paginated PDF bytes.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    config: RenderConfig,
}

impl PdfRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render the project in the requested page style.
    pub fn project_pdf(
        &self,
        project: &Project,
        orientation: Orientation,
    ) -> Result<PdfOutput, CopilotoError> {
        info!(
            proyecto = %project.nombre_proyecto,
            ?orientation,
            "rendering project PDF"
        );
        match orientation {
            Orientation::Landscape => self.landscape(project),
            Orientation::Portrait => self.portrait(project),
        }
    }

    // ── Landscape "educational" ──────────────────────────────────────────

    fn landscape(&self, project: &Project) -> Result<PdfOutput, CopilotoError> {
        let (width, height) = (297.0, 210.0);
        let mut canvas = Canvas::new("Plan ABP", width, height)?;
        let mut cursor = Cursor::new(25.0, height, 20.0);
        let school = self.config.school_for(&project.nombre_colegio).to_string();
        let mut chrome_draws = 0usize;

        let chrome = |canvas: &Canvas, school: &str, page_num: usize| {
            canvas.line(MARGIN, 15.0, width - MARGIN, 15.0, L_PRIMARY, 1.5);
            canvas.text(
                &format!("{school} | {}", self.config.unit_label),
                9.0,
                MARGIN,
                12.0,
                false,
                L_SECONDARY,
            );
            canvas.text(
                &format!("Página {page_num}"),
                8.0,
                width - MARGIN - 15.0,
                height - 10.0,
                false,
                L_SECONDARY,
            );
        };
        chrome(&canvas, &school, 1);
        chrome_draws += 1;

        // Title: wrap BEFORE laying anything out so multi-line names push
        // the body down instead of overprinting it.
        let title = upper_or(&project.nombre_proyecto, "PROYECTO S/N");
        let title_lines = wrap_text(&title, 24.0, width - 2.0 * MARGIN);
        for line in &title_lines {
            canvas.text_centered(line, 24.0, cursor.y, true, L_PRIMARY);
            cursor.advance(10.0);
        }
        cursor.advance(5.0);

        // Context strip.
        let table_w = width - 2.0 * MARGIN;
        let nivel = format!("NIVEL: {}", or_placeholder(&project.curso, "?"));
        let dur = format!("DURACIÓN: {} SEMANAS", project.duracion);
        let inicio = format!(
            "INICIO: {}",
            or_placeholder(&project.fecha_inicio, "A DEFINIR").to_uppercase()
        );
        let thirds = [table_w / 3.0, table_w / 3.0, table_w / 3.0];
        let cells = [
            Cell { centered: true, fill: Some(L_BG_HEADER), bold: true, ink: L_SECONDARY, text: &nivel },
            Cell { centered: true, fill: Some(L_BG_HEADER), bold: true, ink: L_SECONDARY, text: &dur },
            Cell { centered: true, fill: Some(L_BG_HEADER), bold: true, ink: L_SECONDARY, text: &inicio },
        ];
        let (wrapped, row_h) = measure_row(&cells, &thirds, 10.0);
        draw_row(&canvas, &cursor, MARGIN, &thirds, &cells, &wrapped, row_h, 10.0);
        cursor.advance(row_h);

        let asignaturas = format!(
            "ASIGNATURAS: {}",
            project.asignaturas.join(", ").to_uppercase()
        );
        let span = [table_w];
        let cells = [Cell { centered: true, fill: Some(L_BG_HEADER), bold: true, ink: L_PRIMARY, text: &asignaturas }];
        let (wrapped, row_h) = measure_row(&cells, &span, 11.0);
        draw_row(&canvas, &cursor, MARGIN, &span, &cells, &wrapped, row_h, 11.0);
        cursor.advance(row_h + 10.0);

        // El desafío.
        let problema = clean_for_display(&project.problema);
        let pregunta = clean_for_display(&project.pregunta_guia);
        let producto = clean_for_display(&project.producto_final);
        let desafio_w = [table_w * 0.40, table_w * 0.30, table_w * 0.30];
        draw_band(&canvas, &mut cursor, MARGIN, table_w, "EL DESAFÍO (CONTEXTO)", L_PRIMARY);
        let heads = [
            Cell::label("PROBLEMA O NECESIDAD"),
            Cell::label("PREGUNTA GUÍA"),
            Cell::label("PRODUCTO FINAL"),
        ];
        let (wrapped, row_h) = measure_row(&heads, &desafio_w, 10.0);
        draw_row(&canvas, &cursor, MARGIN, &desafio_w, &heads, &wrapped, row_h, 10.0);
        cursor.advance(row_h);
        let body = [Cell::plain(&problema), Cell::plain(&pregunta), Cell::plain(&producto)];
        let (wrapped, row_h) = measure_row(&body, &desafio_w, 10.0);
        draw_row(&canvas, &cursor, MARGIN, &desafio_w, &body, &wrapped, row_h, 10.0);
        cursor.advance(row_h + 10.0);

        // Fundamentación curricular.
        let oa = bullet_list(project.oai.iter().map(|o| format!("{}: {}", o.asignatura, o.oa)));
        let hsxxi = bullet_list(project.hsxxi.iter().cloned());
        let rai = bullet_list(project.rai.iter().cloned());
        draw_band(&canvas, &mut cursor, MARGIN, table_w, "FUNDAMENTACIÓN CURRICULAR", L_PRIMARY);
        let heads = [
            Cell::label("OBJETIVOS DE APRENDIZAJE (OA)"),
            Cell::label("HABILIDADES SIGLO XXI"),
            Cell::label("INDICADORES (RAIS)"),
        ];
        let (wrapped, row_h) = measure_row(&heads, &thirds, 9.0);
        draw_row(&canvas, &cursor, MARGIN, &thirds, &heads, &wrapped, row_h, 9.0);
        cursor.advance(row_h);
        let body = [Cell::plain(&oa), Cell::plain(&hsxxi), Cell::plain(&rai)];
        let (wrapped, row_h) = measure_row(&body, &thirds, 9.0);
        if !cursor.fits(row_h) {
            canvas.add_page();
            chrome(&canvas, &school, canvas.page_count());
            chrome_draws += 1;
            cursor.reset(25.0);
        }
        draw_row(&canvas, &cursor, MARGIN, &thirds, &body, &wrapped, row_h, 9.0);
        cursor.advance(row_h);

        // Schedule needs breathing room before it starts.
        if height - cursor.y < 60.0 {
            canvas.add_page();
            chrome(&canvas, &school, canvas.page_count());
            chrome_draws += 1;
            cursor.reset(25.0);
        } else {
            cursor.advance(15.0);
        }

        draw_band(
            &canvas,
            &mut cursor,
            MARGIN,
            table_w,
            "RUTA DE APRENDIZAJE (CRONOGRAMA DETALLADO)",
            L_PRIMARY,
        );
        chrome_draws += self.landscape_schedule(
            &mut canvas,
            &mut cursor,
            project,
            &school,
            table_w,
            &chrome,
        );

        let page_count = canvas.page_count();
        Ok(PdfOutput {
            bytes: canvas.save()?,
            page_count,
            chrome_draws,
        })
    }

    /// The schedule table with row-level page breaks and header repetition.
    /// Returns how many extra chrome draws the breaks caused.
    fn landscape_schedule(
        &self,
        canvas: &mut Canvas,
        cursor: &mut Cursor,
        project: &Project,
        school: &str,
        table_w: f32,
        chrome: &dyn Fn(&Canvas, &str, usize),
    ) -> usize {
        let widths = [
            12.0,
            25.0,
            table_w - 12.0 - 25.0 - 35.0 * 3.0,
            35.0,
            35.0,
            35.0,
        ];
        let mut extra_chrome = 0usize;

        let header_cells = [
            Cell::label("SEM"),
            Cell::label("FASE"),
            Cell::label("ACTIVIDADES"),
            Cell::label("EVALUACIÓN"),
            Cell::label("RECURSOS"),
            Cell::label("PRODUCTO"),
        ];
        let draw_header = |canvas: &Canvas, cursor: &mut Cursor| {
            let (wrapped, row_h) = measure_row(&header_cells, &widths, 9.0);
            draw_row(canvas, cursor, MARGIN, &widths, &header_cells, &wrapped, row_h, 9.0);
            cursor.advance(row_h);
        };
        draw_header(canvas, cursor);

        for (index, session) in project.cronograma.iter().enumerate() {
            let sem = display_semana(session, index);
            let actividades = clean_for_display(&session.actividades);
            let evaluacion = clean_for_display(&session.evaluacion);
            let recursos = clean_for_display(&session.recursos);
            let producto = clean_for_display(&session.producto_intermedio);

            let cells = [
                Cell { centered: true, bold: true, ink: L_SECONDARY, fill: None, text: &sem },
                Cell { centered: false, bold: true, ink: L_ACCENT, fill: None, text: &session.fase },
                Cell::plain(&actividades),
                Cell::plain(&evaluacion),
                Cell::plain(&recursos),
                Cell::plain(&producto),
            ];
            let (wrapped, row_h) = measure_row(&cells, &widths, 9.0);

            if !cursor.fits(row_h) {
                canvas.add_page();
                chrome(canvas, school, canvas.page_count());
                extra_chrome += 1;
                cursor.reset(25.0);
                draw_header(canvas, cursor);
            }

            draw_row(canvas, cursor, MARGIN, &widths, &cells, &wrapped, row_h, 9.0);
            cursor.advance(row_h);
        }

        extra_chrome
    }

    // ── Portrait "modern" ────────────────────────────────────────────────

    fn portrait(&self, project: &Project) -> Result<PdfOutput, CopilotoError> {
        let (width, height) = (210.0, 297.0);
        let mut canvas = Canvas::new("Plan ABP", width, height)?;
        let school = self
            .config
            .school_for(&project.nombre_colegio)
            .to_uppercase();
        let content_w = width - 2.0 * MARGIN;

        // Header band: measure the title FIRST, then size the band so a
        // multi-line name never clips.
        let title = upper_or(&project.nombre_proyecto, "PROYECTO");
        let title_lines = wrap_text(&title, 26.0, content_w);
        let title_height = title_lines.len() as f32 * 12.0;
        let header_height = 40.0 + title_height;

        canvas.fill_rect(0.0, 0.0, width, header_height, P_DARK);
        canvas.text(
            &format!("PLANIFICACIÓN ABP | {school}"),
            10.0,
            MARGIN,
            15.0,
            true,
            P_BRONZE,
        );
        canvas.text_lines(&title_lines, 26.0, MARGIN, 30.0, 12.0, true, P_WHITE);

        let mut cursor = Cursor::new(header_height + 15.0, height, 15.0);

        // Overview cards.
        let card_w = (content_w - 10.0) / 3.0;
        let dur = format!("{} Semanas", project.duracion);
        let cards = [
            ("CURSO", or_placeholder(&project.curso, "?"), P_SLATE),
            ("FECHA ESTIMADA", or_placeholder(&project.fecha_inicio, "A definir"), P_BRONZE),
            ("DURACIÓN", dur.as_str(), P_DARK),
        ];
        for (i, (label, value, ink)) in cards.iter().enumerate() {
            let x = MARGIN + i as f32 * (card_w + 5.0);
            canvas.fill_rect(x, cursor.y, card_w, 25.0, P_WHITE);
            canvas.stroke_rect(x, cursor.y, card_w, 25.0, P_CARD_BORDER, 0.5);
            canvas.text(label, 8.0, x + 5.0, cursor.y + 8.0, false, P_LABEL);
            canvas.text(value, 11.0, x + 5.0, cursor.y + 18.0, false, *ink);
        }
        cursor.advance(35.0);

        // Asignaturas line.
        canvas.text("ASIGNATURAS:", 10.0, MARGIN, cursor.y, true, P_SLATE);
        let subjects = project.asignaturas.join(", ");
        let subject_lines = wrap_text(&subjects, 10.0, width - MARGIN - 45.0);
        canvas.text_lines(&subject_lines, 10.0, MARGIN + 35.0, cursor.y, 5.0, false, P_TEXT);
        cursor.advance(subject_lines.len() as f32 * 5.0 + 10.0);

        // Contexto del desafío.
        canvas.text("Contexto del Desafío", 14.0, MARGIN, cursor.y, false, P_DARK);
        canvas.line(MARGIN, cursor.y + 2.0, MARGIN + 40.0, cursor.y + 2.0, P_BRONZE, 1.0);
        cursor.advance(10.0);

        let ctx_w = [35.0, content_w - 35.0];
        for (label, value) in [
            ("PROBLEMA", clean_for_display(&project.problema)),
            ("PREGUNTA", clean_for_display(&project.pregunta_guia)),
            ("PRODUCTO", clean_for_display(&project.producto_final)),
        ] {
            let cells = [
                Cell { centered: false, bold: true, ink: P_SLATE, fill: None, text: label },
                Cell { centered: false, bold: false, ink: P_TEXT, fill: None, text: &value },
            ];
            let (wrapped, row_h) = measure_row(&cells, &ctx_w, 10.0);
            draw_row(&canvas, &cursor, MARGIN, &ctx_w, &cells, &wrapped, row_h, 10.0);
            cursor.advance(row_h);
        }
        cursor.advance(15.0);

        // Fundamentos.
        canvas.text("Fundamentos", 14.0, MARGIN, cursor.y, false, P_DARK);
        canvas.line(MARGIN, cursor.y + 2.0, MARGIN + 30.0, cursor.y + 2.0, P_SLATE, 1.0);
        cursor.advance(10.0);

        let thirds = [content_w / 3.0, content_w / 3.0, content_w / 3.0];
        let heads = [
            Cell { centered: false, bold: true, ink: P_WHITE, fill: Some(P_SLATE), text: "OA" },
            Cell { centered: false, bold: true, ink: P_WHITE, fill: Some(P_SLATE), text: "Habilidades" },
            Cell { centered: false, bold: true, ink: P_WHITE, fill: Some(P_SLATE), text: "Indicadores" },
        ];
        let (wrapped, row_h) = measure_row(&heads, &thirds, 8.0);
        draw_row(&canvas, &cursor, MARGIN, &thirds, &heads, &wrapped, row_h, 8.0);
        cursor.advance(row_h);

        let oa = bullet_list_single(project.oai.iter().map(|o| format!("{}: {}", o.asignatura, o.oa)));
        let hsxxi = bullet_list_single(project.hsxxi.iter().cloned());
        let rai = bullet_list_single(project.rai.iter().cloned());
        let body = [
            Cell { centered: false, bold: false, ink: P_TEXT, fill: None, text: &oa },
            Cell { centered: false, bold: false, ink: P_TEXT, fill: None, text: &hsxxi },
            Cell { centered: false, bold: false, ink: P_TEXT, fill: None, text: &rai },
        ];
        let (wrapped, row_h) = measure_row(&body, &thirds, 8.0);
        draw_row(&canvas, &cursor, MARGIN, &thirds, &body, &wrapped, row_h, 8.0);
        cursor.advance(row_h + 15.0);

        // Timeline heading; start a fresh page when there is no room for
        // heading plus at least one card start.
        if cursor.y + 30.0 > height {
            canvas.add_page();
            cursor.reset(20.0);
        }
        canvas.text("Ruta de Aprendizaje", 16.0, MARGIN, cursor.y, false, P_DARK);
        cursor.advance(15.0);

        self.portrait_timeline(&mut canvas, &mut cursor, project, width, height);

        // Footer pass: now that the page count is final, stamp every page.
        let page_count = canvas.page_count();
        let footer = format!(
            "Página {{i}} de {page_count} | {}",
            or_placeholder(&project.nombre_proyecto, "Proyecto ABP")
        );
        let mut chrome_draws = 0usize;
        for i in 0..page_count {
            canvas.goto_page(i);
            let text = footer.replace("{i}", &(i + 1).to_string());
            canvas.text_centered(&text, 8.0, height - 10.0, false, P_MUTED);
            chrome_draws += 1;
        }

        Ok(PdfOutput {
            bytes: canvas.save()?,
            page_count,
            chrome_draws,
        })
    }

    /// The vertical timeline: marker, phase label, wrapped activity body,
    /// metadata footer — each card's height computed from its line counts.
    fn portrait_timeline(
        &self,
        canvas: &mut Canvas,
        cursor: &mut Cursor,
        project: &Project,
        width: f32,
        height: f32,
    ) {
        for (index, session) in project.cronograma.iter().enumerate() {
            // Break BEFORE the card so it never straddles pages.
            if cursor.y > height - 50.0 {
                canvas.add_page();
                cursor.reset(20.0);
            }

            let ink = pdf_phase_color(&session.fase);
            canvas.fill_circle(MARGIN + 4.0, cursor.y + 6.0, 3.0, ink);
            canvas.text(
                &format!("SEM {}", display_semana(session, index)),
                9.0,
                MARGIN + 10.0,
                cursor.y + 9.0,
                false,
                ink,
            );

            let fase = or_placeholder(&session.fase, "Fase");
            let title_lines = wrap_text(fase, 11.0, width - MARGIN - 40.0);

            // Measured at 10 pt, drawn at 9 pt: the original measured with
            // the font still set from the previous block, and card heights
            // are tuned to that slightly-generous estimate.
            let body = clean_for_display(&session.actividades);
            let act_lines = wrap_text(&body, 10.0, width - MARGIN - 40.0);

            let card_h = 20.0 + act_lines.len() as f32 * 5.0 + 20.0;

            canvas.line(
                MARGIN + 4.0,
                cursor.y + 10.0,
                MARGIN + 4.0,
                cursor.y + card_h,
                P_CARD_BORDER,
                1.0,
            );

            canvas.text_lines(&title_lines, 11.0, MARGIN + 25.0, cursor.y + 6.0, 5.5, true, P_DARK);
            canvas.text_lines(&act_lines, 9.0, MARGIN + 25.0, cursor.y + 16.0, 5.0, false, P_TEXT);

            let footer_y = cursor.y + 16.0 + act_lines.len() as f32 * 5.0 + 5.0;
            let eval: String = clean_for_display(&session.evaluacion).chars().take(50).collect();
            let meta = format!(
                "EVALUACIÓN: {}... | RECURSOS: {}",
                eval,
                clean_for_display(&session.recursos)
            );
            canvas.text(&meta, 8.0, MARGIN + 25.0, footer_y, false, P_MUTED);

            cursor.advance(card_h + 5.0);
        }
    }
}

// ── Small helpers ────────────────────────────────────────────────────────────

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

fn upper_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_uppercase()
    }
}

fn display_semana(session: &ClassSession, index: usize) -> String {
    if session.semana == 0 {
        (index + 1).to_string()
    } else {
        session.semana.to_string()
    }
}

fn bullet_list(items: impl Iterator<Item = String>) -> String {
    items
        .map(|i| format!("• {}", clean_for_display(&i)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Single-spaced variant for the compact portrait table.
fn bullet_list_single(items: impl Iterator<Item = String>) -> String {
    items
        .map(|i| format!("• {}", clean_for_display(&i)))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Tests ────────────────────────────────────────────────────────────────────
