use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "barcheck")]
#[command(about = "Verify scanned barcodes against known models", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Read barcodes from stdin, one per line, and classify each one
    Scan {
        /// STT of the first scan in this session
        #[arg(long)]
        start: Option<String>,
        /// Shift label stamped on every record
        #[arg(long)]
        shift: Option<String>,
    },
    /// Show the most recent records
    Recent {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show records captured between two dates (YYYY-MM-DD, inclusive)
    Range {
        from: String,
        to: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Find records whose barcode contains the given text
    Search {
        text: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the number of stored records
    Count,
    /// Export one month of records to CSV
    Export {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        /// Output file, defaults to scans_<year>_<month>.csv
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete records older than the retention window
    Prune {
        #[arg(long)]
        days: Option<u32>,
    },
    /// Delete the newest record matching barcode, display time and result
    Delete {
        barcode: String,
        timestamp_display: String,
        result: String,
    },
    /// Print configuration values
    PrintConfig,
}
