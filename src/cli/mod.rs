use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod init;
pub mod serve;
pub mod show;

use crate::core::AppConfig;

#[derive(Subcommand)]
enum Command {
    /// Create the local bookings database
    Init {},
    /// Run the web server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Print the bookings of the active year
    Show {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    let config = AppConfig::default();

    // Handle each sub command
    match args.command {
        Some(Command::Init {}) => {
            init::run(&config).await?;
        }
        Some(Command::Serve { host, port }) => {
            serve::run(host, port, config).await?;
        }
        Some(Command::Show {}) => {
            show::run(&config).await?;
        }
        None => {}
    }

    Ok(())
}
