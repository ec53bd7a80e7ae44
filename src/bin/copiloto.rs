//! CLI binary for copiloto-abp.
//!
//! A thin shim over the library crate: subcommands map 1:1 onto library
//! calls and print results. No planning logic lives here.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use copiloto_abp::{
    parse, render, DocxRenderer, Orientation, ParsedEntity, PdfRenderer, Project, ProjectStore,
    PromptBuilder, WizardContext,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI definition ───────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "copiloto",
    version,
    about = "Copiloto ABP — planifica proyectos escolares con ayuda de una sesión de chat externa",
    long_about = "Genera prompts para pegar en una sesión de chat con IA, interpreta la \
                  respuesta pegada de vuelta, y exporta la planificación a DOCX y PDF."
)]
struct Cli {
    /// Project store file.
    #[arg(long, global = true, env = "COPILOTO_STORE", default_value = "proyectos.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a prompt to paste into the chat session.
    Prompt {
        #[command(subcommand)]
        kind: PromptKind,
    },
    /// Parse a pasted AI response (stdin or --file) into the store.
    Parse {
        /// Read the pasted response from this file instead of stdin.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Merge a rubric/instrument response into this project.
        #[arg(long)]
        id: Option<String>,
        /// 1-based class number, required when merging an instrument.
        #[arg(long)]
        clase: Option<usize>,
        /// Wizard context to overlay on a freshly parsed project.
        #[command(flatten)]
        wizard: WizardArgs,
    },
    /// List, show or delete stored projects.
    Projects {
        #[command(subcommand)]
        action: ProjectsAction,
    },
    /// Export a stored project as DOCX or PDF.
    Export {
        format: ExportFormat,
        /// Project id (see `copiloto projects list`).
        #[arg(long)]
        id: String,
        #[arg(long)]
        landscape: bool,
        /// Output directory (filename is derived from the project title).
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Export or import a versioned backup of every project.
    Backup {
        #[command(subcommand)]
        action: BackupAction,
    },
}

#[derive(Subcommand)]
enum PromptKind {
    /// The full-project "mega prompt".
    Project {
        #[arg(long)]
        idea: String,
        #[arg(long)]
        curso: String,
        #[arg(long)]
        duracion: u32,
        /// Comma-separated subject list.
        #[arg(long, value_delimiter = ',')]
        asignaturas: Vec<String>,
    },
    /// Rubric prompt for a stored project.
    Rubric {
        #[arg(long)]
        id: String,
    },
    /// Instrument prompt for one class of a stored project.
    Instrument {
        #[arg(long)]
        id: String,
        /// 1-based class number.
        #[arg(long)]
        clase: usize,
    },
    /// Free-text improvement prompt.
    Improve {
        #[arg(long)]
        seccion: String,
        #[arg(long)]
        texto: String,
        #[arg(long)]
        instruccion: String,
        /// Optional project id whose state becomes the prompt context.
        #[arg(long)]
        id: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProjectsAction {
    List,
    Show {
        #[arg(long)]
        id: String,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[derive(Copy, Clone, ValueEnum)]
enum ExportFormat {
    Docx,
    Pdf,
}

#[derive(Subcommand)]
enum BackupAction {
    Export {
        #[arg(long, default_value = "copiloto-backup.json")]
        out: PathBuf,
    },
    Import {
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Args, Default)]
struct WizardArgs {
    #[arg(long)]
    curso: Option<String>,
    #[arg(long)]
    duracion: Option<u32>,
    #[arg(long, value_delimiter = ',')]
    asignaturas: Option<Vec<String>>,
    #[arg(long)]
    colegio: Option<String>,
    #[arg(long)]
    fecha_inicio: Option<String>,
    #[arg(long)]
    idea: Option<String>,
}

impl WizardArgs {
    fn to_context(&self) -> Option<WizardContext> {
        if self.curso.is_none()
            && self.duracion.is_none()
            && self.asignaturas.is_none()
            && self.colegio.is_none()
            && self.fecha_inicio.is_none()
            && self.idea.is_none()
        {
            return None;
        }
        Some(WizardContext {
            curso: self.curso.clone().unwrap_or_default(),
            duracion: self.duracion.unwrap_or_default(),
            asignaturas: self.asignaturas.clone().unwrap_or_default(),
            nombre_colegio: self.colegio.clone().unwrap_or_default(),
            fecha_inicio: self.fecha_inicio.clone().unwrap_or_default(),
            idea: self.idea.clone().unwrap_or_default(),
        })
    }
}

// ── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Prompt { kind } => run_prompt(&cli.store, kind),
        Command::Parse {
            file,
            id,
            clase,
            wizard,
        } => run_parse(&cli.store, file, id, clase, &wizard),
        Command::Projects { action } => run_projects(&cli.store, action),
        Command::Export {
            format,
            id,
            landscape,
            out,
        } => run_export(&cli.store, format, &id, landscape, &out),
        Command::Backup { action } => run_backup(&cli.store, action),
    }
}

fn load_project(store: &ProjectStore, id: &str) -> Result<Project> {
    store
        .get(id)
        .cloned()
        .with_context(|| format!("proyecto '{id}' no encontrado en {}", store.path().display()))
}

fn run_prompt(store_path: &Path, kind: PromptKind) -> Result<()> {
    let prompts = PromptBuilder::default();
    let text = match kind {
        PromptKind::Project {
            idea,
            curso,
            duracion,
            asignaturas,
        } => prompts.full_project_prompt(&idea, &curso, duracion, &asignaturas),
        PromptKind::Rubric { id } => {
            let store = ProjectStore::open(store_path)?;
            prompts.rubric_prompt(&load_project(&store, &id)?)
        }
        PromptKind::Instrument { id, clase } => {
            let store = ProjectStore::open(store_path)?;
            let project = load_project(&store, &id)?;
            let session = project
                .cronograma
                .get(clase.saturating_sub(1))
                .with_context(|| {
                    format!(
                        "la clase {clase} no existe (el cronograma tiene {} sesiones)",
                        project.cronograma.len()
                    )
                })?;
            prompts.instrument_prompt(session, &project)
        }
        PromptKind::Improve {
            seccion,
            texto,
            instruccion,
            id,
        } => {
            let context = match id {
                Some(id) => {
                    let store = ProjectStore::open(store_path)?;
                    serde_json::to_value(load_project(&store, &id)?)?
                }
                None => serde_json::Value::String(String::new()),
            };
            prompts.improvement_prompt(&seccion, &texto, &instruccion, &context)
        }
    };

    println!("{text}");
    Ok(())
}

fn run_parse(
    store_path: &Path,
    file: Option<PathBuf>,
    id: Option<String>,
    clase: Option<usize>,
    wizard: &WizardArgs,
) -> Result<()> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("no se pudo leer {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let entity = match parse(&raw) {
        Ok(entity) => entity,
        Err(e) => {
            eprintln!("{} {e}", red("✗"));
            std::process::exit(1);
        }
    };

    let mut store = ProjectStore::open(store_path)?;
    match entity {
        ParsedEntity::Project(mut project) => {
            if let Some(ctx) = wizard.to_context() {
                project.apply_wizard_context(&ctx);
            }
            let saved = store.upsert(*project)?;
            println!(
                "{} proyecto guardado: {}",
                green("✓"),
                bold(&saved)
            );
        }
        ParsedEntity::Rubric(rubric) => {
            let id = id.context("--id es obligatorio para fusionar una rúbrica")?;
            let mut project = load_project(&store, &id)?;
            if !project.attach_rubric(rubric) {
                bail!("la rúbrica venía sin criterios; nada que fusionar");
            }
            store.upsert(project)?;
            println!("{} rúbrica fusionada en {}", green("✓"), bold(&id));
        }
        ParsedEntity::Instrument(instrument) => {
            let id = id.context("--id es obligatorio para fusionar un instrumento")?;
            let clase = clase.context("--clase es obligatorio para fusionar un instrumento")?;
            let mut project = load_project(&store, &id)?;
            let total = project.cronograma.len();
            let session = project
                .cronograma
                .get_mut(clase.saturating_sub(1))
                .with_context(|| format!("la clase {clase} no existe (hay {total} sesiones)"))?;
            if !session.attach_instrument(instrument) {
                bail!("el instrumento venía sin ítems; nada que fusionar");
            }
            store.upsert(project)?;
            println!("{} instrumento fusionado en clase {clase} de {}", green("✓"), bold(&id));
        }
    }
    Ok(())
}

fn run_projects(store_path: &Path, action: ProjectsAction) -> Result<()> {
    let mut store = ProjectStore::open(store_path)?;
    match action {
        ProjectsAction::List => {
            let projects = store.list();
            if projects.is_empty() {
                println!("(sin proyectos — usa `copiloto parse` para guardar uno)");
            }
            for p in projects {
                println!(
                    "{}  {}  ({} · {} semanas)",
                    p.id.as_deref().unwrap_or("-"),
                    bold(&p.nombre_proyecto),
                    p.curso,
                    p.duracion
                );
            }
        }
        ProjectsAction::Show { id } => {
            let project = load_project(&store, &id)?;
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        ProjectsAction::Delete { id } => {
            store.delete(&id)?;
            println!("{} proyecto {} eliminado", green("✓"), bold(&id));
        }
    }
    Ok(())
}

fn run_export(
    store_path: &Path,
    format: ExportFormat,
    id: &str,
    landscape: bool,
    out_dir: &Path,
) -> Result<()> {
    let store = ProjectStore::open(store_path)?;
    let project = load_project(&store, id)?;
    let orientation = if landscape {
        Orientation::Landscape
    } else {
        Orientation::Portrait
    };

    let (bytes, filename) = match format {
        ExportFormat::Docx => (
            DocxRenderer::default().project_docx(&project, orientation)?,
            render::project_docx_filename(&project, orientation),
        ),
        ExportFormat::Pdf => {
            let output = PdfRenderer::default().project_pdf(&project, orientation)?;
            println!("{} páginas generadas: {}", green("✓"), output.page_count);
            (output.bytes, render::project_pdf_filename(&project, orientation))
        }
    };

    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(filename);
    std::fs::write(&path, bytes).with_context(|| format!("no se pudo escribir {}", path.display()))?;
    println!("{} exportado a {}", green("✓"), bold(&path.display().to_string()));
    Ok(())
}

fn run_backup(store_path: &Path, action: BackupAction) -> Result<()> {
    match action {
        BackupAction::Export { out } => {
            let store = ProjectStore::open(store_path)?;
            let backup = store.export_backup();
            std::fs::write(&out, serde_json::to_string_pretty(&backup)?)?;
            println!(
                "{} {} proyectos respaldados en {}",
                green("✓"),
                backup.projects.len(),
                bold(&out.display().to_string())
            );
        }
        BackupAction::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("no se pudo leer {}", file.display()))?;
            let backup = ProjectStore::parse_backup(&raw)?;
            let mut store = ProjectStore::open(store_path)?;
            let count = store.import_backup(backup)?;
            println!("{} {count} proyectos importados", green("✓"));
        }
    }
    Ok(())
}
