use anyhow::{Context, Result};
use clap::Parser;
use doi_verify::config::{find_config_file, load_config, save_config, Config, API_KEY_ENV};
use doi_verify::llm::{LlmTasks, OpenAiClient};
use doi_verify::sources::CrossRefSource;
use doi_verify::utils::PdfReader;
use doi_verify::{ui, Pipeline};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// DOI Verify - Check that the DOI printed in each PDF belongs to that paper
#[derive(Parser, Debug)]
#[command(name = "doi-verify")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check that the DOI printed in each PDF belongs to that paper", long_about = None)]
struct Cli {
    /// Folder containing the PDFs (prompted for when omitted)
    folder: Option<PathBuf>,

    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Language model name
    #[arg(long)]
    model: Option<String>,

    /// Attempts per language model call (1 disables retries)
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Write a JSON report of every result to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write the effective configuration to this path and exit
    #[arg(long)]
    init_config: Option<PathBuf>,

    /// Show all environment variables
    #[arg(long)]
    env: bool,
}

/// Print all recognised environment variables
fn print_env_vars() {
    println!("DOI Verify - Environment Variables");
    println!();
    println!("API Keys:");
    println!("  {:<34}API key for the language model", API_KEY_ENV);
    println!();
    println!("Configuration Overrides:");
    println!("  DOI_VERIFY_LLM__MODEL             Language model name (default: gpt-4o-mini)");
    println!("  DOI_VERIFY_LLM__BASE_URL          OpenAI-compatible API base URL");
    println!("  DOI_VERIFY_REGISTRY__BASE_URL     CrossRef API base URL");
    println!("  DOI_VERIFY_REGISTRY__MAILTO       Contact address for CrossRef's polite pool");
    println!("  DOI_VERIFY_HTTP__TIMEOUT_SECS     Request timeout in seconds (default: 30)");
    println!("  DOI_VERIFY_RETRY__MAX_ATTEMPTS    Attempts per language model call (default: 5)");
    println!("  DOI_VERIFY_LOGGING__LEVEL         Log level when no -v flag is given (default: info)");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                          Rust logging level (e.g., debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export {}=\"your-key-here\"", API_KEY_ENV);
    println!("  export DOI_VERIFY_RETRY__MAX_ATTEMPTS=\"1\"");
}

/// Apply CLI flags on top of the file and environment layers
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(timeout) = cli.timeout {
        config.http.timeout_secs = timeout;
    }
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    if let Some(max_attempts) = cli.max_attempts {
        config.retry.max_attempts = max_attempts;
    }
}

/// Language model client built from the merged configuration
fn build_model(config: &Config) -> Result<OpenAiClient> {
    Ok(OpenAiClient::new(
        &config.llm.base_url,
        config.llm.api_key.clone(),
        config.timeout(),
    )?)
}

/// Warning logged when the client has no usable API key
fn missing_key_warning(model: &OpenAiClient) -> Option<String> {
    (!model.has_api_key()).then(|| {
        format!(
            "{} is not set; language model calls will fail and their results count as missing",
            API_KEY_ENV
        )
    })
}

/// Ask for the folder on stdin
fn prompt_folder() -> Result<PathBuf> {
    print!("Input your folder path here: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read folder path from stdin")?;

    let folder = line.trim();
    if folder.is_empty() {
        anyhow::bail!("No folder path given");
    }
    Ok(PathBuf::from(folder))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show environment variables and exit if requested
    if cli.env {
        print_env_vars();
        return Ok(());
    }

    // Load configuration from file if specified or found in default locations
    let config_path = cli.config.clone().or_else(find_config_file);
    let mut config = load_config(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("Failed to load config from {}", path.display()),
        None => "Failed to load config from environment".to_string(),
    })?;
    apply_overrides(&mut config, &cli);

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("doi_verify={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    if let Some(path) = &cli.init_config {
        save_config(&config, path)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let model = build_model(&config)?;
    if let Some(warning) = missing_key_warning(&model) {
        tracing::warn!("{}", warning);
    }

    let folder = match cli.folder.clone() {
        Some(folder) => folder,
        None => prompt_folder()?,
    };

    let registry = CrossRefSource::with_base_url(
        &config.registry.base_url,
        config.registry.mailto.as_deref(),
        config.timeout(),
    )?;
    let llm = LlmTasks::new(Arc::new(model), &config.llm.model, config.retry_config());
    let pipeline = Pipeline::new(Arc::new(PdfReader::new()), Arc::new(registry), llm);

    let quiet = cli.quiet;
    let report = pipeline
        .run_with(&folder, |record| {
            if !quiet {
                ui::print_record(record);
            }
        })
        .await?;

    ui::print_summary(&report);

    if let Some(path) = &cli.report {
        report.write_json(path)?;
        tracing::info!("Report written to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_version() {
        let version = env!("CARGO_PKG_VERSION");
        assert!(!version.is_empty());
        let parts: Vec<&str> = version.split('.').collect();
        assert!(parts.len() >= 2);
        assert!(parts[0].parse::<u32>().is_ok());
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["doi-verify"]);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert!(cli.folder.is_none());
        assert!(cli.timeout.is_none());
        assert!(cli.report.is_none());
        assert!(!cli.env);
    }

    #[test]
    fn test_cli_folder_positional() {
        let cli = Cli::parse_from(["doi-verify", "./papers"]);
        assert_eq!(cli.folder, Some(PathBuf::from("./papers")));
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::parse_from(["doi-verify", "-v"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["doi-verify", "-vv"]);
        assert_eq!(cli.verbose, 2);

        let cli = Cli::parse_from(["doi-verify", "--verbose"]);
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_cli_quiet_flag() {
        let cli = Cli::parse_from(["doi-verify", "-q"]);
        assert!(cli.quiet);
    }

    #[test]
    fn test_cli_overrides_applied() {
        let cli = Cli::parse_from([
            "doi-verify",
            "papers",
            "--timeout",
            "5",
            "--model",
            "gpt-4o",
            "--max-attempts",
            "1",
            "--report",
            "out.json",
        ]);
        let mut config = Config::default();
        apply_overrides(&mut config, &cli);

        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(cli.report, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_cli_rejects_zero_timeout() {
        assert!(Cli::try_parse_from(["doi-verify", "--timeout", "0"]).is_err());
        assert!(Cli::try_parse_from(["doi-verify", "--timeout", "1"]).is_ok());
    }

    #[test]
    fn test_blank_api_key_warns() {
        let mut config = Config::default();
        config.llm.api_key = Some(String::new());
        let model = build_model(&config).unwrap();
        let warning = missing_key_warning(&model).unwrap();
        assert!(warning.contains(API_KEY_ENV));

        config.llm.api_key = Some("sk-test".to_string());
        let model = build_model(&config).unwrap();
        assert_eq!(missing_key_warning(&model), None);
    }

    #[test]
    fn test_cli_without_overrides_keeps_config() {
        let cli = Cli::parse_from(["doi-verify"]);
        let mut config = Config::default();
        config.http.timeout_secs = 12;
        apply_overrides(&mut config, &cli);

        assert_eq!(config.http.timeout_secs, 12);
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }
}
