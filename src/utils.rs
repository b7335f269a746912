pub mod vec_stores;
pub mod token;
pub mod llm;
pub mod embedding;
pub mod postprocess;
#[cfg(feature = "terminal_printing")]
pub mod printing;
pub(crate) mod prompt_processing;

use serde_json::{Map, Value};

pub type JsonMap = Map<String, Value>;
