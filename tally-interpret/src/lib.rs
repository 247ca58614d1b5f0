//! tally-interpret: turn free-text entries into structured transaction fields
//! by asking an external language model, then validating what comes back.

pub mod decode;
pub mod error;
pub mod llm;
pub mod prompt;

use std::future::Future;

pub use error::InterpretError;
pub use llm::{LlmInterpreter, LlmSettings, Provider};
pub use tally_core::{CategorySuggestion, ParsedTransaction};

/// Something that can interpret a free-text entry.
///
/// A failure is always an `Err`, never a zero-valued `Ok`, so callers can tell
/// "the service gave up" apart from "the service read an amount of 0".
pub trait Interpreter {
    fn interpret(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<ParsedTransaction, InterpretError>> + Send;
}
