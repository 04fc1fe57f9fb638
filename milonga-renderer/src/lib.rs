//! # milonga-renderer
//!
//! Tera-based rendering of advisory output: warning messages from their
//! template key and params, the plain-text program export, and the SVG
//! energy curve.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use milonga_advisor::generate_warnings;
//! use milonga_core::{Catalog, Program};
//! use milonga_renderer::Renderer;
//!
//! fn print_warnings(program: &Program, catalog: &Catalog) {
//!     if let Ok(renderer) = Renderer::new() {
//!         for warning in generate_warnings(&program.slots(), catalog) {
//!             if let Ok(line) = renderer.message(&warning) {
//!                 println!("{line}");
//!             }
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::{CurveContext, MessageContext, ProgramContext};
pub use engine::{user_template_dir_at, Renderer, TemplateEngine, EMPTY_CURVE_MESSAGE};
pub use error::RenderError;
