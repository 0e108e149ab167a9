/*!
 * xv6 Executor - Main Entry Point
 *
 * Bootstraps the xv6 target, runs setup, executes a JSON program, and
 * prints one JSON result record per call on stdout as soon as it returns.
 */

use clap::Parser;
use miette::Result;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use xv6_executor::{
    init_tracing,
    target::{parse_program, CallInfo},
    xv6::DEFAULT_HEAP_LIMIT,
    Arch, ExecutorConfig, ExecutorError, HostAbi, SetupSequence, Xv6Target,
};

#[derive(Debug, Parser)]
#[command(name = "xv6-executor", version, about = "Run a syscall program on the xv6 target")]
struct Cli {
    /// Executor configuration (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Target arch, overriding the configuration
    #[arg(long)]
    arch: Option<Arch>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Ceiling for the emulated program break
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_HEAP_LIMIT)]
    heap_limit: usize,

    /// Program to execute (JSON array of calls)
    program: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = match &cli.config {
        Some(path) => ExecutorConfig::from_json_file(path)?,
        None => ExecutorConfig::default(),
    }
    .apply_env()?;
    if let Some(arch) = cli.arch {
        config.arch = arch;
    }

    let text = std::fs::read_to_string(&cli.program)
        .map_err(|e| ExecutorError::Io(format!("{}: {e}", cli.program.display())))?;
    let program = parse_program(&text)?;

    info!(arch = %config.arch, calls = program.len(), "xv6 executor starting");

    let argv: Vec<String> = std::env::args().collect();
    let target = Xv6Target::new(HostAbi::with_heap_limit(cli.heap_limit), config.arch);
    let mut executor = SetupSequence::new(target, config)
        .bootstrap_or_exit(&argv)
        .run_hooks()
        .map_err(ExecutorError::from)?;

    let mut stdout = std::io::stdout();
    let mut emit = |info: &CallInfo| -> Result<(), ExecutorError> {
        let line = serde_json::to_string(info).map_err(|e| ExecutorError::Io(e.to_string()))?;
        writeln!(stdout, "{line}")
            .and_then(|()| stdout.flush())
            .map_err(|e| ExecutorError::Io(format!("stdout: {e}")))
    };

    // SAFETY: the data segment was reserved by bootstrap, and program
    // arguments are fuzzer input the target is expected to survive or crash on.
    unsafe { executor.execute_program_with(&program, &mut emit)? };
    Ok(())
}
