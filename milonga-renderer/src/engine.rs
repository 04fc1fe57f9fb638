//! Tera rendering engine: [`TemplateEngine`] and the domain-facing [`Renderer`].
//!
//! | Output            | Template                                   |
//! |-------------------|--------------------------------------------|
//! | Warning message   | `messages/<key>.tera`, one per [`MessageKey`] |
//! | Text export       | `program.txt.tera`                         |
//! | Energy curve      | `energy_curve.svg.tera`                    |
//! | Curve placeholder | `energy_curve_empty.svg.tera`              |

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use milonga_advisor::{CurvePoint, MessageKey, Warning};
use milonga_core::store::milonga_dir_at;
use milonga_core::{Catalog, Program};

use crate::context::{CurveContext, MessageContext, ProgramContext, CURVE_HEIGHT, CURVE_WIDTH};
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates, baked into the binary via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    (
        "messages/back_to_back.tera",
        include_str!("templates/messages/back_to_back.tera"),
    ),
    (
        "messages/consecutive_type.tera",
        include_str!("templates/messages/consecutive_type.tera"),
    ),
    (
        "messages/no_vals_early.tera",
        include_str!("templates/messages/no_vals_early.tera"),
    ),
    (
        "messages/no_milonga_early.tera",
        include_str!("templates/messages/no_milonga_early.tera"),
    ),
    (
        "messages/energy_jump.tera",
        include_str!("templates/messages/energy_jump.tera"),
    ),
    (
        "messages/complex_early.tera",
        include_str!("templates/messages/complex_early.tera"),
    ),
    (
        "messages/suggest_warmup.tera",
        include_str!("templates/messages/suggest_warmup.tera"),
    ),
    (
        "messages/suggest_cumparsita.tera",
        include_str!("templates/messages/suggest_cumparsita.tera"),
    ),
    (
        "messages/low_tango_percent.tera",
        include_str!("templates/messages/low_tango_percent.tera"),
    ),
    (
        "messages/high_tango_percent.tera",
        include_str!("templates/messages/high_tango_percent.tera"),
    ),
    ("messages/overused.tera", include_str!("templates/messages/overused.tera")),
    ("program.txt.tera", include_str!("templates/program.txt.tera")),
    ("energy_curve.svg.tera", include_str!("templates/energy_curve.svg.tera")),
    (
        "energy_curve_empty.svg.tera",
        include_str!("templates/energy_curve_empty.svg.tera"),
    ),
];

const PROGRAM_TEMPLATE: &str = "program.txt.tera";
const CURVE_TEMPLATE: &str = "energy_curve.svg.tera";
const EMPTY_CURVE_TEMPLATE: &str = "energy_curve_empty.svg.tera";

/// Shown in place of a curve with fewer than two filled slots.
pub const EMPTY_CURVE_MESSAGE: &str = "Add at least two tandas to see the energy curve";

/// Template name for a warning message.
pub fn message_template(key: MessageKey) -> String {
    format!("messages/{}.tera", key.as_str())
}

/// `~/.milonga/templates`, where user overrides live.
pub fn user_template_dir_at(home: &Path) -> PathBuf {
    milonga_dir_at(home).join("templates")
}

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() && path.extension().and_then(|s| s.to_str()) == Some("tera") {
            out.push(path);
        }
    }
    Ok(())
}

/// `.tera` files under `dir`, named by their path relative to it.
fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.is_dir() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    files
        .into_iter()
        .map(|path| {
            let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
            let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            Ok((normalize_template_name(rel), contents))
        })
        .collect()
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = TPLS
        .iter()
        .map(|(name, content)| (normalize_template_name(Path::new(name)), (*content).to_string()))
        .collect();
    if let Some(dir) = user_template_dir {
        templates.extend(load_user_templates(dir)?);
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(templates.into_iter().collect::<Vec<_>>())?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Embedded templates plus optional user overrides.
///
/// A `.tera` file in the override directory replaces the embedded template
/// with the same relative name, e.g. `messages/overused.tera`.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(TemplateEngine {
            tera: build_tera(user_template_dir)?,
        })
    }

    pub fn render(&self, name: &str, ctx: &tera::Context) -> Result<String, RenderError> {
        Ok(self.tera.render(name, ctx)?)
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Renders warnings, text exports and energy curves. Create once and reuse.
pub struct Renderer {
    engine: TemplateEngine,
}

impl Renderer {
    /// Embedded templates only.
    pub fn new() -> Result<Self, RenderError> {
        Ok(Renderer {
            engine: TemplateEngine::new(None)?,
        })
    }

    /// Embedded templates overlaid with any `.tera` files under `dir`.
    /// A missing directory is not an error.
    pub fn with_overrides(dir: &Path) -> Result<Self, RenderError> {
        Ok(Renderer {
            engine: TemplateEngine::new(Some(dir))?,
        })
    }

    /// One-line message for `warning`.
    pub fn message(&self, warning: &Warning) -> Result<String, RenderError> {
        let key = warning.key.as_str();
        let ctx = MessageContext::from_warning(warning).to_tera_context()?;
        self.engine
            .tera
            .render(&message_template(warning.key), &ctx)
            .map(|s| s.trim().to_string())
            .map_err(|source| RenderError::Message { key, source })
    }

    /// The program as plain text, one line per slot, cortinas between.
    pub fn program_text(&self, program: &Program, catalog: &Catalog) -> Result<String, RenderError> {
        let ctx = ProgramContext::from_program(program, catalog).to_tera_context()?;
        let rendered = self.engine.render(PROGRAM_TEMPLATE, &ctx)?;
        Ok(single_trailing_newline(&rendered))
    }

    /// SVG energy curve for `points` on a timeline of `total_slots`.
    pub fn energy_curve_svg(
        &self,
        points: &[CurvePoint],
        total_slots: usize,
    ) -> Result<String, RenderError> {
        let rendered = match CurveContext::build(points, total_slots) {
            Some(curve) => self.engine.render(CURVE_TEMPLATE, &curve.to_tera_context()?)?,
            None => {
                let mut ctx = tera::Context::new();
                ctx.insert("width", &CURVE_WIDTH.to_string());
                ctx.insert("height", &CURVE_HEIGHT.to_string());
                ctx.insert("cx", &(CURVE_WIDTH / 2.0).to_string());
                ctx.insert("cy", &(CURVE_HEIGHT / 2.0).to_string());
                ctx.insert("message", EMPTY_CURVE_MESSAGE);
                self.engine.render(EMPTY_CURVE_TEMPLATE, &ctx)?
            }
        };
        Ok(single_trailing_newline(&rendered))
    }
}

fn single_trailing_newline(s: &str) -> String {
    let mut out = s.trim_end().to_string();
    out.push('\n');
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
