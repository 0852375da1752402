use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use cinder::bytecode::Program;
use cinder::bytecode::disasm::print_program;
use cinder::bytecode::verify::verify;
use cinder::logger::{self, LogLevel};
use cinder::runtime::{Kernel, Runtime, Vm, VmConfig};

#[derive(Parser)]
#[command(name = "cinder", version, about = "Minimal stack-based bytecode interpreter")]
struct Cli {
    /// More logging (-v info, -vv debug, -vvv per-instruction trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the built-in reference program
    Demo(RunOptions),

    /// Run a program file
    Run {
        file: PathBuf,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Print a program listing
    Disasm {
        /// Program file; omit to list the reference program
        file: Option<PathBuf>,
    },

    /// Save the reference program to a file
    WriteDemo { file: PathBuf },
}

#[derive(Args)]
struct RunOptions {
    /// Operand stack capacity
    #[arg(long, default_value_t = VmConfig::default().stack_capacity)]
    stack: usize,

    /// Number of local slots
    #[arg(long, default_value_t = VmConfig::default().locals_capacity)]
    locals: usize,

    /// Largest argument count a CALL may carry
    #[arg(long, default_value_t = VmConfig::default().max_args)]
    max_args: usize,

    /// Abort after this many instructions
    #[arg(long)]
    max_steps: Option<usize>,

    /// Check the program before running it
    #[arg(long)]
    verify: bool,
}

impl RunOptions {
    fn config(&self) -> VmConfig {
        VmConfig {
            stack_capacity: self.stack,
            locals_capacity: self.locals,
            max_args: self.max_args,
            max_steps: self.max_steps,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_with_level(LogLevel::from_verbosity(cli.verbose));

    match dispatch(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Demo(options) => run_program(&Program::demo(), &options),
        Command::Run { file, options } => run_program(&load(&file)?, &options),
        Command::Disasm { file } => {
            let program = match file {
                Some(file) => load(&file)?,
                None => Program::demo(),
            };
            print_program(&program);
            Ok(())
        }
        Command::WriteDemo { file } => {
            let bytes = Program::demo().to_bytes()?;
            fs::write(&file, bytes)
                .with_context(|| format!("failed to write '{}'", file.display()))?;
            tracing::info!(path = %file.display(), "reference program written");
            Ok(())
        }
    }
}

fn load(file: &Path) -> anyhow::Result<Program> {
    let bytes =
        fs::read(file).with_context(|| format!("failed to read '{}'", file.display()))?;
    let program = Program::from_bytes(&bytes)
        .with_context(|| format!("'{}' is not a program file", file.display()))?;
    tracing::info!(
        path = %file.display(),
        code_len = program.code.len(),
        literals = program.literals.len(),
        "program loaded"
    );
    Ok(program)
}

fn run_program(program: &Program, options: &RunOptions) -> anyhow::Result<()> {
    let vm = Vm::with_config(options.config());
    tracing::debug!(config = ?vm.config(), "engine configured");

    if options.verify {
        verify(program, vm.config())?;
        tracing::info!("program verified");
    }

    let runtime = Runtime::init();
    let mut kernel = Kernel::stdout();
    let result = vm.run(&runtime, program, &mut kernel);
    runtime.teardown();

    let halt = result?;
    tracing::info!(steps = halt.steps, stack = halt.stack.len(), "halted");
    Ok(())
}
