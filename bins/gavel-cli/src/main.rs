mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gavel")]
#[command(about = "Gavel CLI - Judge jobs locally and inspect checker behavior", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Judge a job file against the sandbox
    Run {
        /// Path to a JSON job file
        file: String,

        /// Use the echo engine instead of Docker (dry run)
        #[arg(long)]
        echo: bool,

        /// Per-test timeout in milliseconds
        #[arg(long, default_value = "10000")]
        timeout_ms: u64,

        /// Path to a languages.json profile file
        #[arg(short, long)]
        languages: Option<String>,
    },

    /// Compare a candidate output file against an expected answer file
    Check {
        /// Path to the expected answer file
        answer: String,

        /// Path to the candidate output file
        output: String,

        /// Type descriptor, e.g. "int float string"
        #[arg(short, long, default_value = "string")]
        types: String,
    },

    /// List configured sandbox languages
    Languages {
        /// Path to a languages.json profile file
        #[arg(short, long)]
        languages: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            echo,
            timeout_ms,
            languages,
        } => {
            commands::run(&file, echo, timeout_ms, languages.as_deref()).await?;
        }
        Commands::Check {
            answer,
            output,
            types,
        } => {
            commands::check_files(&answer, &output, &types)?;
        }
        Commands::Languages { languages } => {
            commands::list_languages(languages.as_deref())?;
        }
    }

    Ok(())
}
