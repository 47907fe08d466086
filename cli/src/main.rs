//! CLI entrypoint for answer-checker
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use checker_application::{
    AppContext, CardSource, NoProgress, NoReviewLogger, ProgressNotifier, ReviewError,
    ReviewLogger,
};
use checker_domain::{
    CardContent, ErrorKind, ExtractionMode, RequestContext, RequestKind, extract,
};
use checker_infrastructure::{
    AnkiCard, CommandLlmGateway, ConfigLoader, FileConfig, FileOutputFormat, JsonFileCardSource,
    JsonlReviewLogger, StaticCardSource, card::cloze_answers,
};
use checker_presentation::{
    AskArgs, CardArgs, Cli, ClozeArgs, Command, ConsoleFormatter, EvaluateArgs, ExtractArgs,
    OutputFormat, ProgressReporter, PromptArgs, SimpleProgress,
};
use clap::{CommandFactory, Parser};
use std::io::{IsTerminal, Read};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Held until exit so buffered log lines are flushed.
    let _log_guard = init_logging(&cli)?;

    info!("Starting answer-checker");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(ExitCode::SUCCESS);
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    config.validate().context("Invalid configuration")?;
    debug!("Configuration: {:?}", config);

    ConsoleFormatter::set_color(config.output.color && std::io::stdout().is_terminal());

    let format = cli.output.unwrap_or(match config.output.format {
        Some(FileOutputFormat::Json) => OutputFormat::Json,
        Some(FileOutputFormat::Text) | None => OutputFormat::Text,
    });
    let app = App {
        config,
        format,
        quiet: cli.quiet,
    };

    match cli.command {
        None => {
            Cli::command().print_help()?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Cloze(args)) => Ok(app.cloze(&args)),
        Some(Command::Extract(args)) => app.extract(&args),
        Some(Command::Prompt(args)) => app.prompt(&args),
        Some(Command::Evaluate(args)) => app.evaluate(&args).await,
        Some(Command::Ask(args)) => app.ask(&args).await,
    }
}

/// Initialize logging based on verbosity level
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let Some(path) = &cli.log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .with_context(|| format!("--log-file {} has no file name", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Could not create log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        dir, file_name,
    ));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

/// Everything a subcommand needs once configuration is loaded.
struct App {
    config: FileConfig,
    format: OutputFormat,
    quiet: bool,
}

impl App {
    fn cloze(&self, args: &ClozeArgs) -> ExitCode {
        let answers = cloze_answers(&args.field, args.ordinal);
        self.print(
            || ConsoleFormatter::format_answers(&answers),
            || ConsoleFormatter::format_answers_json(&answers),
        );
        ExitCode::SUCCESS
    }

    fn extract(&self, args: &ExtractArgs) -> Result<ExitCode> {
        let reply = match &args.input {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Could not read {}", path.display()))?,
            None => {
                let mut reply = String::new();
                std::io::stdin()
                    .read_to_string(&mut reply)
                    .context("Could not read reply from stdin")?;
                reply
            }
        };

        let mode = if args.recommendation_only {
            ExtractionMode::Recommendation
        } else {
            ExtractionMode::FullRecord
        };

        match extract(&reply, mode) {
            Some(extraction) => {
                self.print(
                    || ConsoleFormatter::format_extraction(&extraction),
                    || ConsoleFormatter::format_extraction_json(&extraction),
                );
                Ok(ExitCode::SUCCESS)
            }
            None => Ok(self.fail(ErrorKind::ExtractionMiss, "")),
        }
    }

    fn prompt(&self, args: &PromptArgs) -> Result<ExitCode> {
        let card = card_source(&args.card)?
            .card_content()
            .map_err(|e| anyhow!(e))?;

        let mut ctx = RequestContext::new(RequestKind::Answer, card)
            .with_elapsed_seconds(args.seconds);
        if let Some(answer) = &args.answer {
            ctx = ctx.with_user_answer(answer.clone());
        }
        if let Some(question) = &args.follow_up {
            ctx = ctx.with_question(question.clone());
        }

        let pair = match self
            .config
            .to_params()
            .prompt_builder()
            .build_named(&args.kind, ctx, &[])
        {
            Ok(pair) => pair,
            Err(e) => return Ok(self.fail(ErrorKind::InvalidRequest, &e.to_string())),
        };

        self.print(
            || ConsoleFormatter::format_prompt(&pair),
            || ConsoleFormatter::format_prompt_json(&pair),
        );
        Ok(if pair.is_invalid() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        })
    }

    async fn evaluate(&self, args: &EvaluateArgs) -> Result<ExitCode> {
        let context = self.app_context(&args.card)?;
        let progress = self.progress();

        match context
            .evaluate_answer(&args.answer, args.seconds, progress.as_ref())
            .await
        {
            Ok(output) => {
                self.print(
                    || ConsoleFormatter::format_extraction(&output.extraction),
                    || ConsoleFormatter::format_extraction_json(&output.extraction),
                );
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => Ok(self.fail_review(&e)),
        }
    }

    async fn ask(&self, args: &AskArgs) -> Result<ExitCode> {
        let context = self.app_context(&args.card)?;
        let progress = self.progress();

        match context
            .follow_up(&args.kind, args.text.as_deref(), progress.as_ref())
            .await
        {
            Ok(output) => {
                self.print(
                    || ConsoleFormatter::format_reply(output.kind, &output.reply),
                    || ConsoleFormatter::format_reply_json(output.kind, &output.reply),
                );
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => Ok(self.fail_review(&e)),
        }
    }

    // === Dependency Injection ===
    fn app_context(&self, card: &CardArgs) -> Result<AppContext<CommandLlmGateway>> {
        let gateway = Arc::new(
            CommandLlmGateway::from_config(&self.config.provider)
                .context("Set [provider].command or ANSWER_CHECKER_PROVIDER__COMMAND")?,
        );
        let logger: Arc<dyn ReviewLogger> = match &self.config.log.review_log {
            Some(path) => match JsonlReviewLogger::open(path) {
                Some(logger) => Arc::new(logger),
                None => Arc::new(NoReviewLogger),
            },
            None => Arc::new(NoReviewLogger),
        };

        Ok(AppContext::with_review_logger(
            gateway,
            card_source(card)?,
            self.config.to_params(),
            logger,
        ))
    }

    fn progress(&self) -> Box<dyn ProgressNotifier> {
        if self.quiet || self.format == OutputFormat::Json {
            Box::new(NoProgress)
        } else if std::io::stderr().is_terminal() {
            Box::new(ProgressReporter::new())
        } else {
            Box::new(SimpleProgress)
        }
    }

    fn print(&self, text: impl FnOnce() -> String, json: impl FnOnce() -> String) {
        match self.format {
            OutputFormat::Text => println!("{}", text()),
            OutputFormat::Json => println!("{}", json()),
        }
    }

    fn fail(&self, kind: ErrorKind, detail: &str) -> ExitCode {
        match self.format {
            OutputFormat::Text => eprintln!("{}", ConsoleFormatter::format_error(kind, detail)),
            OutputFormat::Json => println!("{}", ConsoleFormatter::format_error_json(kind, detail)),
        }
        ExitCode::FAILURE
    }

    fn fail_review(&self, error: &ReviewError) -> ExitCode {
        self.fail(error.kind(), &error.to_string())
    }
}

fn card_source(args: &CardArgs) -> Result<Arc<dyn CardSource>> {
    if let Some(path) = &args.card_file {
        return Ok(Arc::new(JsonFileCardSource::new(path)));
    }
    if let Some(field) = &args.cloze_field {
        return Ok(Arc::new(StaticCardSource::from_anki(&AnkiCard::Cloze {
            field: field.clone(),
            ordinal: args.ordinal,
        })));
    }
    if let Some(question) = &args.question {
        return Ok(Arc::new(StaticCardSource::new(CardContent::new(
            question.clone(),
            args.accepted.clone(),
        ))));
    }
    bail!("No card given: use --card-file, --question or --cloze")
}
