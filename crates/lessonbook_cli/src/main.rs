//! Out-of-band authoring and inspection entry point.
//!
//! # Responsibility
//! - Invoke any catalog function with JSON arguments.
//! - Render a lesson file to HTML plus table of contents.
//! - Print health and version info.

use clap::{Parser, Subcommand};
use lessonbook_api::{call_at, init_logging, resolve_db_path, FUNCTION_NAMES};
use lessonbook_core::{default_log_level, load_lesson_file, CompileCache};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "lessonbook", version)]
#[command(about = "Lesson catalog and content tooling")]
struct Cli {
    /// SQLite catalog file
    #[arg(long, global = true, env = "LESSONBOOK_DB")]
    db: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "LESSONBOOK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "LESSONBOOK_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print core health and version
    Ping,
    /// List callable function names
    Functions,
    /// Call a catalog function, e.g. `call lessons:getSidebarTree '{"subjectId":"..."}'`
    Call {
        function: String,
        /// JSON arguments; `-` reads them from stdin
        #[arg(default_value = "{}")]
        args: String,
    },
    /// Compile a lesson file and print the result as JSON
    Render {
        file: PathBuf,
        /// Print only the HTML body
        #[arg(long)]
        html: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let error = init_logging(level, log_dir);
        if !error.is_empty() {
            eprintln!("logging disabled: {error}");
        }
    }

    match run(cli) {
        Ok(code) => code,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, String> {
    match cli.command {
        Command::Ping => {
            println!("lessonbook_core ping={}", lessonbook_api::ping());
            println!("lessonbook_core version={}", lessonbook_api::core_version());
            Ok(ExitCode::SUCCESS)
        }
        Command::Functions => {
            for name in FUNCTION_NAMES {
                println!("{name}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Call { function, args } => {
            let args = if args == "-" {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .map_err(|err| format!("failed to read arguments from stdin: {err}"))?;
                buffer
            } else {
                args
            };
            let db_path = cli.db.unwrap_or_else(resolve_db_path);
            let response = call_at(&db_path, &function, &args);
            print_json(&response)?;
            Ok(if response.ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Render { file, html } => {
            let cache = CompileCache::new();
            let document = load_lesson_file(&file, &cache).map_err(|err| err.to_string())?;
            if html {
                println!("{}", document.html);
            } else {
                print_json(&document)?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| format!("failed to encode output: {err}"))?;
    println!("{rendered}");
    Ok(())
}
