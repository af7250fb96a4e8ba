mod cli;
mod error;

use crate::cli::{Batch as BatchArgs, Cli, Commands, Convert};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use htmlto_batch::{Batch, Target};
use htmlto_config::Config;
use htmlto_render::{Document, OptionSet, OutputKind, Status};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        true => tracing::Level::DEBUG,
        false => tracing::Level::WARN,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    match cli.command {
        Commands::Pdf(args) => convert(OutputKind::Pdf, &config, &args),
        Commands::Image(args) => convert(OutputKind::Image, &config, &args),
        Commands::Batch(args) => batch(&config, args),
    }
}

fn convert(kind: OutputKind, config: &Config, args: &Convert) -> Result<()> {
    let mut document = config.document(kind).or_raise(|| ErrorKind::Config)?;
    build(&mut document, args)?;
    let status = match &args.output {
        Some(path) => document.save_as(path).or_raise(|| ErrorKind::Render)?,
        None => {
            let mut stdout = io::stdout().lock();
            document.send(&mut stdout, args.filename.as_deref(), args.inline).or_raise(|| ErrorKind::Render)?;
            document.result().map_or(Status::Success, |result| result.status())
        },
    };
    if let Some(warnings) = document.warnings() {
        tracing::warn!(status = ?status, warnings = %warnings.trim_end(), "Renderer reported problems");
    }
    document.close().or_raise(|| ErrorKind::Render)
}

fn build(document: &mut Document, args: &Convert) -> Result<()> {
    let stdin_inputs = args.stdin_inputs();
    if stdin_inputs > 1 {
        exn::bail!(ErrorKind::StdinReused(stdin_inputs));
    }
    document.set_options(args.options()).or_raise(|| ErrorKind::Render)?;
    let page_options = args.page_options();
    if !page_options.is_empty() {
        let merged = OptionSet::merged(document.page_options(), page_options);
        document.set_page_options(merged).or_raise(|| ErrorKind::Render)?;
    }
    if let Some(cover) = &args.cover {
        let input = cli::input(cover, read_stdin).or_raise(|| ErrorKind::Stdin)?;
        document.add_cover(input, OptionSet::new()).or_raise(|| ErrorKind::Render)?;
    }
    if args.toc {
        document.add_toc(OptionSet::new()).or_raise(|| ErrorKind::Render)?;
    }
    for token in &args.inputs {
        let input = cli::input(token, read_stdin).or_raise(|| ErrorKind::Stdin)?;
        document.add_page(input, OptionSet::new()).or_raise(|| ErrorKind::Render)?;
    }
    Ok(())
}

fn read_stdin() -> io::Result<String> {
    io::read_to_string(io::stdin())
}

fn batch(config: &Config, args: BatchArgs) -> Result<()> {
    let mut kinds = Vec::new();
    if args.pdf || !args.image {
        kinds.push(OutputKind::Pdf);
    }
    if args.image {
        kinds.push(OutputKind::Image);
    }
    let mut batch = Batch::new(args.input_dir, args.output_dir).extension(&args.extension);
    for kind in kinds {
        let target = Target::new(kind)
            .settings(config.settings.clone())
            .options(config.options())
            .page_options(config.page_options());
        batch = batch.target(target);
    }
    let report = batch.run().or_raise(|| ErrorKind::Batch)?;
    for failed in &report.failed {
        tracing::error!(source = %failed.source.display(), kind = ?failed.kind, error = ?failed.error, "Not converted");
    }
    if !report.is_success() {
        exn::bail!(ErrorKind::Incomplete(report.failed.len()));
    }
    Ok(())
}
