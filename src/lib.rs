//! folio - a static portfolio site generator.
//!
//! Turns one YAML content document into a portfolio site with a blog. The
//! generated pages load the `folio-web` WebAssembly package for the particle
//! background, custom cursor, chat assistant and contact form.

pub mod blog;
pub mod chat_context;
pub mod config;
pub mod content;
pub mod markdown;
pub mod metadata;
pub mod page_config;
pub mod routing;
pub mod server;
pub mod site_writer;
