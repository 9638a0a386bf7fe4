use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    redis_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the counter record if it does not exist yet
    Init {
        /// Last complaint number already issued elsewhere
        #[arg(long, default_value_t = 0)]
        start: u64,
    },

    /// Print the counter
    Status,

    /// Check that complaints 1..=counter all exist and nothing lies beyond
    Audit,

    /// Print one complaint
    Show { complaint_id: u64 },

    /// Write every complaint as JSON lines
    Export { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut connection = admin::connect(&args.redis_url).await?;

    match args.command {
        Command::Init { start } => admin::init(&mut connection, start).await,
        Command::Status => admin::status(&mut connection).await,
        Command::Audit => admin::audit(&mut connection).await,
        Command::Show { complaint_id } => admin::show(&mut connection, complaint_id).await,
        Command::Export { path } => admin::export(&mut connection, &path).await,
    }
}
