pub mod analysis;
pub mod config;
pub mod document;
pub mod error;
pub mod lsp;
pub mod markup;
pub mod taglib;
pub mod text;

pub use error::{LspError, LspResult};

// Re-export the main server implementation
pub use lsp::MarkoLs;
