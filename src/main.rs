//! Legible CLI - plain-language explanations of legal documents
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments, printing results and handling top-level errors.

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use legible::{
    extract, keywords, language, Analyzer, Answer, Config, DocumentContext, GeminiGenerator, Language, RiskReport,
    SafetyLevel, SafetyRecommendation, SessionStore, Severity, SummaryResult,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "legible")]
#[command(author, version, about = "Plain-language explanations of legal documents", long_about = None)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported output languages
    Languages,
    /// Summarise a PDF or DOCX document
    Summarize {
        file: PathBuf,
        /// Output language (defaults to the configured language)
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Detect risky clauses in a document
    Risks {
        file: PathBuf,
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Recommend whether to sign, using the stored risk report
    Safety {
        file: PathBuf,
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Run summary, risk detection and safety recommendation in sequence
    Analyze {
        file: PathBuf,
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Ask a question about a document
    Ask {
        file: PathBuf,
        question: String,
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Ask questions about a document interactively
    Chat {
        file: PathBuf,
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Translate text into a supported language
    Translate {
        text: String,
        #[arg(short, long)]
        language: String,
    },
    /// Count risk keywords without calling the model
    Scan { file: PathBuf },
    /// List stored analyses
    History,
    /// Generate shell completions
    Completions { shell: clap_complete::Shell },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    let json = cli.json;
    match cli.command {
        Commands::Languages => {
            if json {
                return print_json(language::list());
            }
            println!("Supported languages:\n");
            for (name, code) in language::list() {
                println!("  {:<12} {}", name, code.dimmed());
            }
        }
        Commands::Summarize { file, language } => {
            let config = Config::load()?;
            let language = resolve_language(language.as_deref(), &config)?;
            let document = load_document(&file, &config)?;
            let analyzer = analyzer(&config)?;

            let summary = analyzer.summarize(&document, language).await;
            open_store(&config)?.store_summary(&document, &label(&file), &summary)?;
            emit(json, &summary, print_summary)?;
        }
        Commands::Risks { file, language } => {
            let config = Config::load()?;
            let language = resolve_language(language.as_deref(), &config)?;
            let document = load_document(&file, &config)?;
            let analyzer = analyzer(&config)?;

            let report = analyzer.detect_risks(&document, language).await;
            open_store(&config)?.store_risks(&document, &label(&file), &report)?;
            emit(json, &report, print_risks)?;
        }
        Commands::Safety { file, language } => {
            let config = Config::load()?;
            let language = resolve_language(language.as_deref(), &config)?;
            let document = load_document(&file, &config)?;
            let analyzer = analyzer(&config)?;
            let store = open_store(&config)?;

            let report = store.risks(&document)?;
            let recommendation = analyzer
                .recommend_safety(&document, report.as_ref(), language)
                .await
                .with_context(|| format!("run `legible risks {}` first", file.display()))?;
            store.store_safety(&document, &label(&file), &recommendation)?;
            emit(json, &recommendation, print_safety)?;
        }
        Commands::Analyze { file, language } => {
            let config = Config::load()?;
            let language = resolve_language(language.as_deref(), &config)?;
            let document = load_document(&file, &config)?;
            let analyzer = analyzer(&config)?;
            let store = open_store(&config)?;
            let label = label(&file);

            let summary = analyzer.summarize(&document, language).await;
            store.store_summary(&document, &label, &summary)?;
            let report = analyzer.detect_risks(&document, language).await;
            store.store_risks(&document, &label, &report)?;
            let recommendation = analyzer
                .recommend_safety(&document, Some(&report), language)
                .await?;
            store.store_safety(&document, &label, &recommendation)?;

            if json {
                return print_json(&serde_json::json!({
                    "summary": summary,
                    "risks": report,
                    "safety": recommendation,
                }));
            }
            print_summary(&summary);
            println!();
            print_risks(&report);
            println!();
            print_safety(&recommendation);
        }
        Commands::Ask {
            file,
            question,
            language,
        } => {
            if question.trim().is_empty() {
                bail!("No question provided");
            }
            let config = Config::load()?;
            let language = resolve_language(language.as_deref(), &config)?;
            let document = load_document(&file, &config)?;
            let analyzer = analyzer(&config)?;

            let answer = analyzer.answer(&question, &document, language).await;
            emit(json, &answer, print_answer)?;
        }
        Commands::Chat { file, language } => {
            let config = Config::load()?;
            let language = resolve_language(language.as_deref(), &config)?;
            let document = load_document(&file, &config)?;
            let analyzer = analyzer(&config)?;

            println!(
                "Ask anything about {} ({} words, {} {}). Empty line or 'exit' to quit.\n",
                label(&file).bold(),
                document.word_count,
                document.page_or_paragraph_count,
                document.format.unit()
            );
            loop {
                let question: String = dialoguer::Input::new()
                    .with_prompt("Question")
                    .allow_empty(true)
                    .interact_text()?;
                let question = question.trim();
                if question.is_empty() || question == "exit" || question == "quit" {
                    break;
                }
                let answer = analyzer.answer(question, &document, language).await;
                emit(json, &answer, print_answer)?;
                println!();
            }
        }
        Commands::Translate { text, language } => {
            let config = Config::load()?;
            let language = resolve_language(Some(language.as_str()), &config)?;
            let analyzer = analyzer(&config)?;

            let translation = analyzer.translate(&text, language).await;
            if json {
                return print_json(&translation);
            }
            if let Some(error) = &translation.error {
                print_degraded(error);
            }
            println!("{}", translation.text);
        }
        Commands::Scan { file } => {
            let config = Config::load()?;
            let document = load_document(&file, &config)?;
            let hits = keywords::scan(&document.text);

            if json {
                return print_json(&hits);
            }
            if hits.is_empty() {
                println!("No risk keywords found.");
            }
            for hit in &hits {
                println!("🔎 {} ({})", hit.category.bold(), hit.total);
                let words: Vec<String> = hit
                    .keywords
                    .iter()
                    .map(|(word, count)| format!("{} ×{}", word, count))
                    .collect();
                println!("   {}", words.join(", "));
            }
        }
        Commands::History => {
            let config = Config::load()?;
            let analyses = open_store(&config)?.list_all()?;

            if analyses.is_empty() {
                println!("No stored analyses found.");
            } else {
                println!("Stored analyses ({}):\n", analyses.len());
                for stored in analyses {
                    let mut stages = Vec::new();
                    if stored.summary.is_some() {
                        stages.push("summary");
                    }
                    if let Some(report) = &stored.risks {
                        stages.push(if report.is_degraded() { "risks (degraded)" } else { "risks" });
                    }
                    if stored.safety.is_some() {
                        stages.push("safety");
                    }
                    println!(
                        "📄 {} ({})",
                        stored.label,
                        stored.updated_at.format("%Y-%m-%d %H:%M")
                    );
                    println!("   {}\n", stages.join(", "));
                }
            }
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "legible", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over `-v`
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "legible=warn",
        1 => "legible=info",
        _ => "legible=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Pick the requested language, or the configured default
fn resolve_language(requested: Option<&str>, config: &Config) -> anyhow::Result<Language> {
    let Some(name) = requested else {
        return Ok(config.default_language()?);
    };
    match Language::from_name(name) {
        Some(language) => Ok(language),
        None => {
            let names: Vec<&str> = language::list().keys().copied().collect();
            bail!("Unsupported language '{}'. Choose one of: {}", name, names.join(", "))
        }
    }
}

fn load_document(path: &Path, config: &Config) -> anyhow::Result<DocumentContext> {
    extract::read_document(path, config.documents.max_upload_bytes)
        .with_context(|| format!("could not read {}", path.display()))
}

fn analyzer(config: &Config) -> anyhow::Result<Analyzer<GeminiGenerator>> {
    let generator = GeminiGenerator::from_config(config).context("set GEMINI_API_KEY or add it to legible.toml")?;
    Ok(Analyzer::from_config(generator, config))
}

fn open_store(config: &Config) -> anyhow::Result<SessionStore> {
    SessionStore::open(&config.storage.path)
        .with_context(|| format!("could not open session store at {}", config.storage.path.display()))
}

fn label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn emit<T: Serialize>(json: bool, value: &T, print: fn(&T)) -> anyhow::Result<()> {
    if json {
        print_json(value)
    } else {
        print(value);
        Ok(())
    }
}

fn print_degraded(error: &str) {
    eprintln!("{} {}", "⚠️  Analysis degraded:".yellow().bold(), error);
}

fn print_summary(summary: &SummaryResult) {
    if let Some(error) = &summary.error {
        print_degraded(error);
    }
    println!("📝 {}", "Summary:".bold());
    println!("  {}\n", summary.summary);

    println!("📌 {}", "Key Points:".bold());
    for point in &summary.key_points {
        println!("  • {}", point);
    }

    if !summary.important_dates.is_empty() {
        println!("\n📅 {}", "Important Dates:".bold());
        for date in &summary.important_dates {
            println!("  • {}", date);
        }
    }

    if !summary.parties.is_empty() {
        println!("\n👥 {}", "Parties:".bold());
        println!("  {}", summary.parties.join(", "));
    }
}

fn print_risks(report: &RiskReport) {
    if let Some(error) = report.error() {
        print_degraded(error);
    }
    println!(
        "⚖️  {} {} ({} high, {} medium, {} low)",
        "Risks:".bold(),
        report.total_risks(),
        report.high_risk_count().to_string().red(),
        report.medium_risk_count().to_string().yellow(),
        report.low_risk_count().to_string().green()
    );
    for risk in report.risks() {
        let severity = match risk.severity {
            Severity::High => risk.severity.to_string().red().bold(),
            Severity::Medium => risk.severity.to_string().yellow().bold(),
            Severity::Low => risk.severity.to_string().green().bold(),
        };
        println!("\n  [{}] {}", severity, risk.risk_type.bold());
        println!("  {}", risk.description);
        if !risk.excerpt.is_empty() {
            println!("  {}", format!("“{}”", risk.excerpt).italic().dimmed());
        }
    }
}

fn print_safety(recommendation: &SafetyRecommendation) {
    if let Some(error) = &recommendation.error {
        print_degraded(error);
    }
    let level = match recommendation.safety_level {
        SafetyLevel::Safe => "SAFE".green().bold(),
        SafetyLevel::Warning => "WARNING".yellow().bold(),
        SafetyLevel::Danger => "DANGER".red().bold(),
    };
    println!("🛡️  {} {}", "Safety:".bold(), level);
    println!("  {}", recommendation.recommendation);

    if !recommendation.reasons.is_empty() {
        println!("\n❗ {}", "Reasons:".bold());
        for reason in &recommendation.reasons {
            println!("  • {}", reason);
        }
    }

    if !recommendation.suggestions.is_empty() {
        println!("\n✅ {}", "Suggestions:".bold());
        for suggestion in &recommendation.suggestions {
            println!("  • {}", suggestion);
        }
    }
}

fn print_answer(answer: &Answer) {
    if answer.error.is_some() {
        println!("{}", answer.text.yellow());
    } else {
        println!("💬 {}", answer.text);
    }
}
