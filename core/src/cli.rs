use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::codec::{self, MOVEMENTS};
use crate::config::Config;
use crate::interpreter::{Interpreter, MemoryHost};
use crate::program::{Block, ProgramSequence};

const CLI_NAMESPACE: &str = "cli";

#[derive(Parser)]
#[command(name = "blockrun")]
#[command(about = "Blockrun - run block programs step by step", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides BLOCKRUN_CONFIG_PATH)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a program to completion
    Run {
        /// Program text, e.g. "1sA3s2z4"
        program: String,

        /// Step duration in milliseconds (overrides config)
        #[arg(long = "step-time-ms")]
        step_time_ms: Option<u64>,
    },

    /// Parse a program and list its blocks
    Check {
        /// Program text
        program: String,

        /// Print the blocks as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI by parsing process arguments
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli).await
}

/// Run the CLI with provided arguments
pub async fn run_cli_from_args(args: Vec<String>) -> Result<()> {
    let cli = Cli::parse_from(args);
    run_cli_with_args(cli).await
}

async fn run_cli_with_args(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            program,
            step_time_ms,
        } => {
            let config = Config::builder()
                .config_path(cli.config.map(PathBuf::from))
                .step_time_ms(step_time_ms)
                .build()
                .context("Failed to load configuration")?;

            let finished = run_program(&program, config.interpreter.step_time_ms).await?;

            println!(
                "Program counter: {}/{}",
                finished.program_counter(),
                finished.program_length()
            );
            let mut loops: Vec<_> = finished.loop_iterations_left().iter().collect();
            loops.sort();
            for (label, left) in loops {
                println!("Loop {}: {} iterations left", label, left);
            }
        }

        Commands::Check { program, json } => {
            let parsed = codec::parse_program(&program).context("Failed to parse program")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&parsed.program)?);
            } else {
                for line in describe_program(&parsed.program) {
                    println!("{}", line);
                }
            }
        }
    }

    Ok(())
}

/// Parse `text` and run it on an in-memory host until it stops.
///
/// Every movement command gets a handler that logs the step and waits for
/// the step duration. Returns the sequence as the run left it.
pub async fn run_program(text: &str, step_time_ms: u64) -> Result<ProgramSequence> {
    let parsed = codec::parse_program(text).context("Failed to parse program")?;
    let host = Arc::new(MemoryHost::new(parsed.into_sequence()));
    let interpreter = Interpreter::new(step_time_ms, host.clone());

    for (_, command) in MOVEMENTS {
        interpreter.register_handler(command, CLI_NAMESPACE, move |step_time_ms| async move {
            info!(command, step_time_ms, "step");
            tokio::time::sleep(Duration::from_millis(step_time_ms)).await;
            Ok(())
        });
    }

    host.play();
    interpreter.start_run().await?;

    Ok(host.snapshot())
}

/// One line per block: index, block, and enclosing loop position
pub fn describe_program(program: &[crate::program::ProgramBlock]) -> Vec<String> {
    program
        .iter()
        .enumerate()
        .map(|(index, program_block)| {
            let block = match &program_block.block {
                Block::Movement { command } => command.clone(),
                Block::LoopStart { label, iterations } => {
                    format!("loop {} x{}", label, iterations)
                }
                Block::LoopEnd { label } => format!("end {}", label),
            };
            match &program_block.cache {
                Some(cache) => format!(
                    "{:>3}  {:<16} [{}:{}]",
                    index, block, cache.containing_loop_label, cache.containing_loop_position
                ),
                None => format!("{:>3}  {}", index, block),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::hashmap;

    #[tokio::test(start_paused = true)]
    async fn test_run_program_finishes() {
        let finished = run_program("1sA2s2az3", 10).await.unwrap();

        assert!(finished.at_end());
        assert_eq!(finished.program_length(), 6);
        assert_eq!(finished.loop_iterations_left(), &hashmap! { "A".to_string() => 0 });
    }

    #[tokio::test]
    async fn test_run_program_rejects_bad_text() {
        assert!(run_program("sA2s1", 0).await.is_err());
    }

    #[test]
    fn test_describe_program() {
        let parsed = codec::parse_program("1sA2s2z").unwrap();
        let lines = describe_program(&parsed.program);

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("forward1"));
        assert!(lines[1].contains("loop A x2"));
        assert!(lines[2].contains("forward2"));
        assert!(lines[2].ends_with("[A:1]"));
        assert!(lines[3].contains("end A"));
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::parse_from(["blockrun", "run", "12", "--step-time-ms", "5"]);
        match cli.command {
            Commands::Run {
                program,
                step_time_ms,
            } => {
                assert_eq!(program, "12");
                assert_eq!(step_time_ms, Some(5));
            }
            _ => panic!("expected run"),
        }

        let cli = Cli::parse_from(["blockrun", "--config", "c.toml", "check", "1", "--json"]);
        assert_eq!(cli.config.as_deref(), Some("c.toml"));
        assert!(matches!(cli.command, Commands::Check { json: true, .. }));
    }
}
