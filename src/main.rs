use clap::Parser;
use std::process::ExitCode;

use oceanix_devsub::{bootstrap, config, exit_code_for_child, exit_code_for_dev_error, DevError};

mod cli;

use cli::{Cli, USAGE_HINT};

fn fail(e: &DevError) -> ExitCode {
    let use_err = oceanix_devsub::color_enabled_stderr();
    oceanix_devsub::log_error_stderr(use_err, &format!("oceanix-dev: {e}"));
    ExitCode::from(exit_code_for_dev_error(e))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(mode) = cli.color {
        oceanix_devsub::set_color_mode(mode);
    }

    // Missing tenant is a usage error (exit 1), checked before any file is touched
    let tenant = match (&cli.tenant, cli.restore) {
        (Some(t), _) => Some(t.clone()),
        (None, true) => None,
        (None, false) => {
            return fail(&DevError::Usage(format!(
                "missing subdomain argument\n{USAGE_HINT}"
            )));
        }
    };

    #[cfg(feature = "tracing")]
    oceanix_devsub::telemetry::init();

    let cfg = match config::load(&cli.overrides()) {
        Ok(c) => c,
        Err(e) => return fail(&DevError::Message(format!("{e:#}"))),
    };

    if cli.restore {
        return match bootstrap::restore_only(&cfg) {
            Ok(()) => ExitCode::from(0),
            Err(e) => fail(&e),
        };
    }

    let Some(tenant) = tenant else {
        return ExitCode::from(1);
    };

    if cli.dry_run {
        eprint!("{}", bootstrap::plan(&cfg, &tenant));
        eprintln!("oceanix-dev: dry-run requested; nothing was changed.");
        return ExitCode::from(0);
    }

    match bootstrap::run(&cfg, &tenant, cli.verbose) {
        Ok(code) => ExitCode::from(exit_code_for_child(code)),
        Err(e) => fail(&e),
    }
}
