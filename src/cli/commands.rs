use crate::{
    cli::args::{CheckTemplateArgs, ServeArgs, TransformArgs},
    core::{
        config::ServiceConfig,
        engine::default_engine,
        types::{SourceInput, TransformRequest},
        BarcodeGenerator, CompiledTemplate, ConfigLoader, PipelineOutcome, PipelineResult,
        RhaiModuleRuntime, TransformPipeline,
    },
    server, Result,
};
use anyhow::Context;
use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
    sync::Arc,
    time::Instant,
};
use tracing::{error, info};

pub async fn serve(args: ServeArgs, mut config: ServiceConfig) -> Result<()> {
    if let Some(bind) = args.bind {
        config.server.bind = bind;
        ConfigLoader::validate_config(&config)?;
    }
    info!(
        backend = %config.store.backend,
        bind = %config.server.bind,
        "starting xslmapper service"
    );
    server::serve(&config).await
}

pub async fn transform(args: TransformArgs, config: ServiceConfig) -> Result<()> {
    let input = read_input(&args.input)?;
    let pipeline = TransformPipeline::new(
        config.store.build()?,
        Arc::new(RhaiModuleRuntime::default()),
        BarcodeGenerator::new(config.barcode.clone()),
    );
    let request = TransformRequest {
        template: config
            .containers
            .template_location(&args.template.directory, &args.template.name),
        input: SourceInput::Bytes(input),
        modules: args
            .modules
            .iter()
            .map(|module| {
                config.containers.module_descriptor(
                    &module.blob.directory,
                    &module.blob.name,
                    &module.namespace,
                    &module.class_name,
                )
            })
            .collect(),
        encode_base64: args.base64 || config.output.encode_base64,
    };

    let started = Instant::now();
    match pipeline.run(request).await {
        PipelineOutcome::Succeeded(result) => {
            for message in &result.messages {
                info!("xsl:message: {}", message);
            }
            write_result(args.output.as_deref(), &result)?;
            info!(
                bytes = result.bytes.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "mapping succeeded"
            );
            Ok(())
        }
        PipelineOutcome::Failed(err) => {
            error!(
                kind = %err.kind,
                stage = ?err.stage,
                code = err.code(),
                "mapping failed: {}",
                err.message
            );
            Err(err.into())
        }
    }
}

pub fn check_template(args: CheckTemplateArgs) -> Result<()> {
    let bytes = fs::read(&args.file)
        .with_context(|| format!("failed to read template {}", args.file.display()))?;
    let template = CompiledTemplate::from_bytes(&bytes, args.file.display().to_string())?;
    let output = template.output();
    let method = output
        .method
        .map(|method| format!("{:?}", method).to_lowercase())
        .unwrap_or_else(|| "xml".to_string());

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}: ok", template.origin())?;
    writeln!(stdout, "  method:   {}", method)?;
    writeln!(stdout, "  encoding: {}", template.output_encoding().name())?;
    let engine = default_engine();
    writeln!(stdout, "  engine:   {} {}", engine.engine_name(), engine.engine_version())?;
    if let Some(media_type) = &output.media_type {
        writeln!(stdout, "  media-type: {}", media_type)?;
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("failed to read input document from stdin")?;
        return Ok(buffer);
    }
    fs::read(path).with_context(|| format!("failed to read input document {}", path.display()))
}

fn write_result(output: Option<&Path>, result: &PipelineResult) -> Result<()> {
    let content = match &result.base64 {
        Some(encoded) => encoded.as_bytes(),
        None => result.bytes.as_slice(),
    };
    match output {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("failed to write result to {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content)?;
            stdout.flush()?;
            Ok(())
        }
    }
}
