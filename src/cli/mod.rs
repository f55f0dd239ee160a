pub mod args;
pub mod commands;

pub use args::{BlobRef, CheckTemplateArgs, ModuleArg, ServeArgs, TransformArgs};
use crate::core::error::ClassifiedError;
use crate::core::types::StatusClass;
use crate::core::ConfigLoader;
use crate::logging::{self, detect_context, LoggingConfig};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::Path;

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
MAPPER COMMANDS:\n{subcommands}\n";

#[derive(Parser, Debug)]
#[command(name = "xslmapper")]
#[command(version = crate::VERSION)]
#[command(about = "XML-to-XML mapping service driven by stored XSLT templates")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: check a template locally, try it with `transform`, then `serve` it over HTTP."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(
        about = "Run the HTTP mapping service",
        long_about = "Serve exposes POST /api/xml-to-xml and GET /api/health, resolving templates and extension modules from the configured content store.",
        after_help = "Example:\n    xslmapper serve --config xslmapper.toml --bind 0.0.0.0:7071"
    )]
    Serve(ServeArgs),
    #[command(
        about = "Map one document and print the result",
        long_about = "Transform runs a single pipeline against the configured store and writes the mapped content to stdout or --output. Classified failures exit non-zero.",
        after_help = "Example:\n    xslmapper transform --template dte/factura.xsl --input dte.xml --module fmt/money.rhai=urn:money#Money"
    )]
    Transform(TransformArgs),
    #[command(
        about = "Compile a local template file",
        long_about = "Check-template compiles a stylesheet without touching the store and reports its output settings, or the compilation diagnostic.",
        after_help = "Example:\n    xslmapper check-template mappers/dte/factura.xsl"
    )]
    CheckTemplate(CheckTemplateArgs),
}

impl Command {
    fn config_path(&self) -> Option<&Path> {
        match self {
            Command::Serve(args) => args.config.as_deref(),
            Command::Transform(args) => args.config.as_deref(),
            Command::CheckTemplate(_) => None,
        }
    }
}

pub async fn run(args: Args) -> crate::Result<()> {
    let working_dir = std::env::current_dir().context("failed to read the working directory")?;
    let config = ConfigLoader::load(args.command.config_path(), &working_dir)?;
    let logging_config = LoggingConfig::from_section(&config.logging)?;
    let _guard = logging::init(
        detect_context(&args.command),
        &logging_config,
        Some(&working_dir),
    )?;

    match args.command {
        Command::Serve(serve_args) => commands::serve(serve_args, config).await,
        Command::Transform(transform_args) => commands::transform(transform_args, config).await,
        Command::CheckTemplate(check_args) => commands::check_template(check_args),
    }
}

/// Process exit code for a failed command: 2 for caller faults, 1 otherwise.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ClassifiedError>() {
        Some(classified) if classified.status_class() == StatusClass::CallerFault => 2,
        _ => 1,
    }
}
