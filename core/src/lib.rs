pub mod cli;
pub mod codec;
pub mod config;
pub mod interpreter;
pub mod program;
pub mod types;

// Re-export main types
pub use types::*;

pub use codec::{parse_program, serialize_program, CodecError, ParsedProgram};
pub use config::Config;
pub use interpreter::{Host, Interpreter, InterpreterError, MemoryHost};
pub use program::{Block, ProgramBlock, ProgramSequence};
