use std::sync::Arc;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::app::{self, RunConfig, prepare_run};
use crate::args::LoadArgs;
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::{ClientSettings, HttpExecutor, validate_target_url};

/// Binary entry point: parse arguments, merge the config file, start the
/// runtime and drive one run.
///
/// # Errors
///
/// Returns an error when configuration is invalid, the run cannot start, or
/// a virtual user task ended abnormally.
pub fn run() -> AppResult<()> {
    let (mut args, matches) = parse_args()?;
    apply_file_config(&mut args, &matches)?;

    crate::system::logger::init_logging(args.verbose, args.no_color);

    validate_target_url(&args.url)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

fn parse_args() -> AppResult<(LoadArgs, ArgMatches)> {
    let matches = LoadArgs::command().get_matches();
    let args = LoadArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

fn apply_file_config(args: &mut LoadArgs, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = crate::config::load_config(args.config.as_deref())? {
        crate::config::apply_config(args, matches, &config)?;
    }
    Ok(())
}

async fn run_async(args: LoadArgs) -> AppResult<()> {
    let executor = HttpExecutor::from_settings(&ClientSettings {
        request_timeout: args.request_timeout,
        connect_timeout: args.connect_timeout,
    })?;

    let prepared = match prepare_run(RunConfig::from_args(&args)).await {
        Ok(prepared) => prepared,
        Err(err) => {
            tracing::error!("Failed to start run: {}", err);
            return Err(err);
        }
    };
    app::print_start(&prepared.plan(), args.output_format);

    let outcome = prepared.execute(Arc::new(executor)).await?;
    app::print_summary(&outcome, args.output_format)?;

    if !outcome.runtime_errors.is_empty() {
        app::print_runtime_errors(&outcome.runtime_errors);
        return Err(AppError::validation(ValidationError::RuntimeErrors));
    }
    Ok(())
}
