//! CLI - command-line argument parsing
//!
//! Defines the CLI structure using clap; execution lives in main.rs.

use clap::{Parser, Subcommand};

/// NOC Assistant CLI
#[derive(Parser)]
#[command(name = "nocctl")]
#[command(about = "NOC Assistant - telecom alarm work-order diagnosis", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Daemon base URL (overrides $NOCD_URL and the default)
    #[arg(long, global = true)]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Replay a rule set against a work order, injecting a failure
    Diagnose {
        /// Work order id, e.g. CMCC-GD-GZCL-20250628-000781
        work_order_id: String,

        /// Step at which the simulated failure appears
        #[arg(long, default_value_t = 1)]
        step: i64,

        /// Severity index applied at that step (0 = normal)
        #[arg(long, default_value_t = 1)]
        error_index: i32,

        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },

    /// List out-of-service work orders
    WorkOrders {
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u64,

        /// Page size
        #[arg(long, default_value_t = 10)]
        size: u64,

        /// Keyword on the alarm name or work order id
        #[arg(long, default_value_t = String::new())]
        keyword: String,

        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one work order, details expanded
    Show {
        /// Work order id
        work_order_id: String,

        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Show daemon health
    Health,
}
