//! Program text codec - PEST-based parser and serializer
//!
//! Movements are single characters, a loop opens with `s<LABEL><N>s` and
//! closes with `z`:
//!
//! ```text
//! 1sA3s2Bz   forward1, loop A x3 { forward2, left90 }
//! ```
//!
//! The display cache is never part of the text; it is recomputed on parse.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use serde::Serialize;
use thiserror::Error;

use crate::program::{
    calculate_cached_loop_data, parse_loop_label, Block, LoopIterationsLeft, Program,
    ProgramBlock, ProgramSequence, LOOP_ITERATIONS_RANGE, MAX_LOOP_LABEL_LENGTH,
};


/// Character of every movement command
pub const MOVEMENTS: [(char, &str); 12] = [
    ('1', "forward1"),
    ('2', "forward2"),
    ('3', "forward3"),
    ('4', "backward1"),
    ('5', "backward2"),
    ('6', "backward3"),
    ('A', "left45"),
    ('B', "left90"),
    ('D', "left180"),
    ('a', "right45"),
    ('b', "right90"),
    ('d', "right180"),
];

/* ===================== PEST Parser ===================== */

#[derive(Parser)]
#[grammar = "codec/program.pest"]
struct ProgramParser;

/* ===================== Error Types ===================== */

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("loop label too long: {0}")]
    LabelTooLong(String),

    #[error("duplicate loop label: {0}")]
    DuplicateLabel(String),

    #[error("loop iterations must be in the range 1-99: {0}")]
    IterationsOutOfRange(String),

    #[error("endLoop without startLoop")]
    EndLoopWithoutStartLoop,

    #[error("startLoop without endLoop")]
    StartLoopWithoutEndLoop,

    #[error("unrecognized command when serializing program: {0}")]
    UnknownCommand(String),
}

impl From<pest::error::Error<Rule>> for CodecError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        CodecError::Syntax(err.to_string())
    }
}

pub type CodecResult<T> = Result<T, CodecError>;

/// A parsed program and the highest loop number its labels use
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedProgram {
    pub program: Program,
    pub highest_loop_number: u32,
}

impl ParsedProgram {
    /// Sequence at counter 0, with the loop counter seeded from the labels
    pub fn into_sequence(self) -> ProgramSequence {
        ProgramSequence::new(
            self.program,
            0,
            self.highest_loop_number,
            LoopIterationsLeft::new(),
        )
    }
}

/* ===================== Public API ===================== */

pub fn parse_program(text: &str) -> CodecResult<ParsedProgram> {
    let mut pairs = ProgramParser::parse(Rule::program, text)?;
    let Some(program) = pairs.next() else {
        return Ok(ParsedProgram {
            program: Vec::new(),
            highest_loop_number: 0,
        });
    };

    let mut builder = Builder::default();
    for pair in program.into_inner() {
        match pair.as_rule() {
            Rule::movement => builder.movement(pair)?,
            Rule::loop_start => builder.loop_start(pair)?,
            Rule::loop_end => builder.loop_end()?,
            _ => {}
        }
    }
    builder.finish()
}

/// Write `program` back to text. Fails on commands with no character.
pub fn serialize_program(program: &[ProgramBlock]) -> CodecResult<String> {
    let mut text = String::new();
    for program_block in program {
        match &program_block.block {
            Block::Movement { command } => {
                let ch = MOVEMENTS
                    .iter()
                    .find(|(_, name)| *name == command.as_str())
                    .map(|(ch, _)| *ch)
                    .ok_or_else(|| CodecError::UnknownCommand(command.clone()))?;
                text.push(ch);
            }
            Block::LoopStart { label, iterations } => {
                text.push('s');
                text.push_str(label);
                text.push_str(&iterations.to_string());
                text.push('s');
            }
            Block::LoopEnd { .. } => text.push('z'),
        }
    }
    Ok(text)
}

/// Command name for a movement character
pub fn movement_command(ch: char) -> Option<&'static str> {
    MOVEMENTS
        .iter()
        .find(|(c, _)| *c == ch)
        .map(|(_, name)| *name)
}

/* ===================== Program Builder ===================== */

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    labels_used: Vec<String>,
    open_loops: Vec<String>,
    highest_loop_number: u32,
}

impl Builder {
    fn movement(&mut self, pair: Pair<Rule>) -> CodecResult<()> {
        let text = pair.as_str();
        let command = text
            .chars()
            .next()
            .and_then(movement_command)
            .ok_or_else(|| CodecError::Syntax(format!("unexpected movement: {}", text)))?;
        self.blocks.push(Block::movement(command));
        Ok(())
    }

    fn loop_start(&mut self, pair: Pair<Rule>) -> CodecResult<()> {
        // loop_start = ${ "s" ~ label ~ iterations ~ "s" }
        let mut inner = pair.into_inner();
        let (Some(label), Some(iterations)) = (inner.next(), inner.next()) else {
            return Err(CodecError::Syntax("incomplete startLoop".to_string()));
        };
        let label = label.as_str().to_string();
        let iterations_text = iterations.as_str();

        if label.len() > MAX_LOOP_LABEL_LENGTH {
            return Err(CodecError::LabelTooLong(label));
        }
        if self.labels_used.contains(&label) {
            return Err(CodecError::DuplicateLabel(label));
        }
        let iterations = iterations_text
            .parse::<u32>()
            .ok()
            .filter(|n| LOOP_ITERATIONS_RANGE.contains(n))
            .ok_or_else(|| CodecError::IterationsOutOfRange(iterations_text.to_string()))?;

        if let Some(number) = parse_loop_label(&label) {
            self.highest_loop_number = self.highest_loop_number.max(number);
        }
        self.labels_used.push(label.clone());
        self.open_loops.push(label.clone());
        self.blocks.push(Block::loop_start(label, iterations));
        Ok(())
    }

    fn loop_end(&mut self) -> CodecResult<()> {
        let label = self
            .open_loops
            .pop()
            .ok_or(CodecError::EndLoopWithoutStartLoop)?;
        self.blocks.push(Block::loop_end(label));
        Ok(())
    }

    fn finish(self) -> CodecResult<ParsedProgram> {
        if !self.open_loops.is_empty() {
            return Err(CodecError::StartLoopWithoutEndLoop);
        }
        let program: Program = self.blocks.into_iter().map(ProgramBlock::new).collect();
        Ok(ParsedProgram {
            program: calculate_cached_loop_data(&program),
            highest_loop_number: self.highest_loop_number,
        })
    }
}
