pub mod core;
pub mod services;
pub mod utils;

pub use crate::core::config::{Config, ParserConfig};
pub use crate::core::error::ScriptError;
pub use crate::core::model::{
    Act, Character, Dialogue, DialogueType, Scene, Script, ScriptMetadata, ScriptStatus,
};
pub use crate::services::parser::ScriptParser;
