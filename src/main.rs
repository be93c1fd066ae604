// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;

use tarjama::app_config::Config;
use tarjama::engines::{RemoteEngine, TranslationEngine};
use tarjama::errors::GatewayError;
use tarjama::fallback::DomainHint;
use tarjama::gateway::{TranslationGateway, TranslationRequest};
use tarjama::language::parse_lang;
use tarjama::terminology::StaticTerminology;

/// Translate a legal text fragment through the purity pipeline.
#[derive(Parser, Debug)]
#[command(name = "tarjama", version, about)]
struct Args {
    /// Text fragment to translate
    #[arg(value_name = "TEXT", required_unless_present = "init_config")]
    text: Option<String>,

    /// Source language code (ar or fr)
    #[arg(short = 'f', long = "from", default_value = "fr")]
    source: String,

    /// Target language code (ar or fr)
    #[arg(short = 't', long = "to", default_value = "ar")]
    target: String,

    /// Domain hint (generic, family-law, commercial)
    #[arg(short, long, default_value = "generic")]
    domain: String,

    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "tarjama.json")]
    config: PathBuf,

    /// Write a default configuration file and exit
    #[arg(long)]
    init_config: bool,
}

/// Minimal timestamped stderr logger.
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level }))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let mut stderr = std::io::stderr();
            let _ = match record.level() {
                Level::Error => writeln!(stderr, "\x1B[1;31m{} ERROR {}\x1B[0m", now, record.args()),
                Level::Warn => writeln!(stderr, "\x1B[1;33m{} WARN  {}\x1B[0m", now, record.args()),
                level => writeln!(stderr, "{} {:5} {}", now, level, record.args()),
            };
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.init_config {
        let config = Config::default();
        config.save_to_file(&args.config)?;
        println!("Wrote default configuration to {:?}", args.config);
        return Ok(());
    }

    let config = if args.config.exists() {
        Config::from_file(&args.config)?
    } else {
        Config::default()
    };

    CustomLogger::init(config.log_level.to_level_filter())
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

    let source = parse_lang(&args.source)?;
    let target = parse_lang(&args.target)?;
    if source == target {
        return Err(anyhow!("Source and target language must differ"));
    }
    let domain = DomainHint::from_str(&args.domain)?;

    let mut engines: Vec<Arc<dyn TranslationEngine>> = Vec::new();
    for engine in &config.engines {
        engines.push(Arc::new(RemoteEngine::new(
            &engine.id,
            &engine.endpoint,
            &engine.api_key,
            &engine.model,
        )?));
    }

    let gateway = TranslationGateway::new(
        engines,
        Arc::new(StaticTerminology::new()),
        config.pipeline.clone(),
    )
    .map_err(|e| anyhow!("Failed to construct gateway: {}", e))?;

    let text = args.text.unwrap_or_default();
    let request = TranslationRequest::new(text, source, target).with_domain(domain);
    info!("translating {} -> {} (correlation {})", source, target, request.correlation_id);

    let outcome = match gateway.translate(request).await {
        Ok(outcome) => outcome,
        Err(e @ GatewayError::CapacityExceeded(_)) => {
            return Err(anyhow!("Gateway at capacity, retry later: {}", e));
        }
        Err(e) => return Err(anyhow!("Translation failed: {}", e)),
    };

    let rendered = serde_json::to_string_pretty(&outcome)
        .context("Failed to render translation outcome")?;
    println!("{}", rendered);
    Ok(())
}
