use clap::Parser;
use std::path::PathBuf;

use oceanix_devsub::config::Overrides;

#[derive(Parser, Debug)]
#[command(
    name = "oceanix-dev",
    version,
    about = "Preload a tenant subdomain into the Oceanix front-end and run the dev server.",
    after_help = "Example: oceanix-dev techcorp\n\nOnly one instance may run per checkout; a second concurrent run is refused (exit 1)."
)]
pub(crate) struct Cli {
    /// Tenant subdomain to preload (e.g. techcorp)
    pub tenant: Option<String>,

    /// Entry-point HTML document (default: src/index.html)
    #[arg(long, value_name = "PATH")]
    pub entry: Option<PathBuf>,

    /// Backup of the entry-point document (default: <entry>.backup)
    #[arg(long, value_name = "PATH")]
    pub backup: Option<PathBuf>,

    /// Dev-server command line, run through the shell (default: ng serve)
    #[arg(long = "serve-cmd", value_name = "CMD")]
    pub serve_cmd: Option<String>,

    /// When an existing backup may be replaced: keep|stale
    #[arg(long, value_enum)]
    pub resnapshot: Option<oceanix_devsub::SnapshotPolicy>,

    /// Print what would run, but do not touch any file or start the server
    #[arg(long)]
    pub dry_run: bool,

    /// Restore the entry-point document from its backup and exit
    #[arg(long, conflicts_with = "dry_run")]
    pub restore: bool,

    /// Print detailed execution info
    #[arg(long)]
    pub verbose: bool,

    /// Colorize output: auto|always|never
    #[arg(long, value_enum)]
    pub color: Option<oceanix_devsub::ColorMode>,
}

impl Cli {
    pub(crate) fn overrides(&self) -> Overrides {
        Overrides {
            entry: self.entry.clone(),
            backup: self.backup.clone(),
            serve_cmd: self.serve_cmd.clone(),
            resnapshot: self.resnapshot,
        }
    }
}

pub(crate) const USAGE_HINT: &str = concat!(
    "usage: oceanix-dev <subdomain>\n",
    "  e.g. oceanix-dev techcorp\n",
    "  the subdomain is stored in localStorage['dev_subdomain'] before the dev server starts\n",
    "  only one instance may run per checkout; a second concurrent run is refused",
);
