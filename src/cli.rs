use std::path::PathBuf;

use account_scan_core::Relation;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "account-scan", version)]
#[command(about = "Scan an account's followers or friends and render a filtered report")]
#[command(subcommand_negates_reqs = true)]
pub struct Cli {
    /// Screen name of the account to scan, with or without `@`
    #[arg(required = true)]
    pub screen_name: Option<String>,

    /// Which edge of the account to scan
    #[arg(short = 't', long = "type", value_enum, required = true)]
    pub relation: Option<RelationArg>,

    /// Number of identifier pages to request (5000 ids per page)
    #[arg(long)]
    pub pages: Option<usize>,

    /// Write the report without opening it
    #[arg(long, default_value_t = false)]
    pub no_open: bool,

    /// Also print every filtered profile to stdout
    #[arg(long, default_value_t = false)]
    pub print: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Default, Args)]
pub struct GlobalArgs {
    /// Directory of cached profile records
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Directory of cached profile images
    #[arg(long, global = true)]
    pub images_dir: Option<PathBuf>,

    /// Directory reports are written to
    #[arg(long, global = true)]
    pub reports_dir: Option<PathBuf>,

    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print cached profile records without touching the network
    Cached {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the live rate limit of an endpoint category (e.g. `user-lookup`)
    Quota { category: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RelationArg {
    Followers,
    Friends,
}

impl From<RelationArg> for Relation {
    fn from(arg: RelationArg) -> Self {
        match arg {
            RelationArg::Followers => Relation::Followers,
            RelationArg::Friends => Relation::Friends,
        }
    }
}
