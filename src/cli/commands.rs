use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::task::Quadrant;

#[derive(Parser)]
#[command(name = "eisen", about = concat!("eisen v", env!("CARGO_PKG_VERSION"), " - an Eisenhower matrix for your terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Keep tasks in this directory instead of the default data directory
    #[arg(short = 'D', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task
    Add(AddArgs),
    /// List tasks by quadrant
    List(ListArgs),
    /// Replace a task's text
    Edit(EditArgs),
    /// Delete a task
    Rm(IdArg),
    /// Move a task to another quadrant
    Mv(MvArgs),
    /// Mark a task done
    Done(IdArg),
    /// Mark a task not done
    Undone(IdArg),
    /// Set the order of tasks within a quadrant
    Order(OrderArgs),
    /// Delete every task
    Clear(ClearArgs),
    /// Show the recovery log
    Recovery(RecoveryArgs),
}

#[derive(Args)]
pub struct AddArgs {
    /// Task text
    pub text: String,
    /// Quadrant (default: the last one used)
    #[arg(short, long)]
    pub quadrant: Option<Quadrant>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only this quadrant
    pub quadrant: Option<Quadrant>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID (a unique prefix is enough)
    pub id: String,
    /// New text
    pub text: String,
}

#[derive(Args)]
pub struct IdArg {
    /// Task ID (a unique prefix is enough)
    pub id: String,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task ID (a unique prefix is enough)
    pub id: String,
    /// Destination quadrant
    pub quadrant: Quadrant,
}

#[derive(Args)]
pub struct OrderArgs {
    /// Quadrant to reorder
    pub quadrant: Quadrant,
    /// Task IDs in the new order; unlisted tasks keep their order after these
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Args)]
pub struct ClearArgs {
    /// Don't ask for confirmation
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Maximum number of entries to show (newest first)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Print the path of the recovery log instead
    #[arg(long)]
    pub path: bool,
}
