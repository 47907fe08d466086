//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored output
    Text,
    /// JSON output
    Json,
}

/// CLI arguments for answer-checker
#[derive(Parser, Debug)]
#[command(name = "answer-checker")]
#[command(author, version, about = "Grade flashcard answers with an LLM")]
#[command(long_about = r#"
answer-checker asks a language model whether a typed flashcard answer is
right, and turns its reply into one of the review difficulties Again, Hard,
Good or Easy.

The model is an external command configured under [provider]: it receives
the prompt on stdin and writes its reply on stdout.

Configuration is loaded from (in priority order):
1. ANSWER_CHECKER_* environment variables (e.g. ANSWER_CHECKER_REVIEW__GOOD=30)
2. --config <path>           Explicit config file
3. ./answer-checker.toml     Project-level config
4. ~/.config/answer-checker/config.toml   Global config

Example:
  answer-checker evaluate --question "Capital of France?" --accepted Paris --answer Paris --seconds 4
  answer-checker cloze --field "{{c1::Paris}} is the capital of France" --ordinal 0
  llm "..." | answer-checker extract
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format (overrides [output].format)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the system and user prompt for a request
    Prompt(PromptArgs),
    /// Extract the verdict from a raw model reply
    Extract(ExtractArgs),
    /// Grade an answer with the configured model
    Evaluate(EvaluateArgs),
    /// Ask a follow-up: question, joke or edit-advice
    Ask(AskArgs),
    /// Print the accepted answers of a cloze field
    Cloze(ClozeArgs),
}

/// Where the card under review comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct CardArgs {
    /// JSON card file, re-read on every request
    #[arg(long, value_name = "PATH", conflicts_with_all = ["question", "cloze_field"])]
    pub card_file: Option<PathBuf>,

    /// Question text of a basic card
    #[arg(long, value_name = "TEXT", conflicts_with = "cloze_field")]
    pub question: Option<String>,

    /// Accepted answer of a basic card (repeatable)
    #[arg(long, value_name = "TEXT", requires = "question")]
    pub accepted: Vec<String>,

    /// Raw cloze field, e.g. "{{c1::Paris}} is the capital of France"
    #[arg(long = "cloze", value_name = "FIELD")]
    pub cloze_field: Option<String>,

    /// Cloze ordinal under review (0-based)
    #[arg(long, default_value_t = 0)]
    pub ordinal: u32,
}

#[derive(Args, Debug)]
pub struct PromptArgs {
    #[command(flatten)]
    pub card: CardArgs,

    /// Request kind: answer, question, joke, edit-advice
    #[arg(long, default_value = "answer")]
    pub kind: String,

    /// The reviewer's typed answer
    #[arg(long)]
    pub answer: Option<String>,

    /// Seconds the reviewer took to answer
    #[arg(long, default_value_t = 0)]
    pub seconds: u64,

    /// Follow-up question text
    #[arg(long = "ask", value_name = "TEXT")]
    pub follow_up: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// File holding the reply; stdin when omitted
    #[arg(value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Only extract the recommendation, not the full record
    #[arg(long)]
    pub recommendation_only: bool,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub card: CardArgs,

    /// The reviewer's typed answer
    #[arg(long)]
    pub answer: String,

    /// Seconds the reviewer took to answer
    #[arg(long, default_value_t = 0)]
    pub seconds: u64,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    #[command(flatten)]
    pub card: CardArgs,

    /// Follow-up kind: question, joke, edit-advice
    #[arg(long, default_value = "question")]
    pub kind: String,

    /// Question text (question kind only)
    pub text: Option<String>,
}

#[derive(Args, Debug)]
pub struct ClozeArgs {
    /// Raw cloze field
    #[arg(long)]
    pub field: String,

    /// Cloze ordinal (0-based)
    #[arg(long, default_value_t = 0)]
    pub ordinal: u32,
}
