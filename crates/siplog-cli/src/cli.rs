use clap::{Args, Parser, Subcommand};
use siplog_core::ExecutionStrategy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "siplog")]
#[command(about = "Anonymize batches of SIP signaling logs", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind (default from config: 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default from config: 3333)
        #[arg(long)]
        port: Option<u16>,

        #[command(flatten)]
        dispatch: DispatchArgs,
    },

    /// Anonymize a single batch from a file or stdin and print it
    Anonymize {
        /// JSON batch file (reads stdin when omitted)
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,

        #[command(flatten)]
        dispatch: DispatchArgs,
    },
}

/// Options shared by every command that runs the pipeline
#[derive(Args)]
pub struct DispatchArgs {
    /// Config file (default: platform config dir)
    #[arg(long, env = "SIPLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Execution strategy: sequential or fan_out
    #[arg(long)]
    pub strategy: Option<ExecutionStrategy>,

    /// Maximum concurrent redactions for fan_out
    #[arg(long)]
    pub max_in_flight: Option<usize>,
}
