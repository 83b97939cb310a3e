use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use profile_scraper::{
    config::{AppConfig, ScrapeSettings, DEFAULT_PROXIES_FILE},
    logging::{init_logger, LogLevel},
    proxy::{ProxyCatalog, ProxyParser, ProxyType},
    scraper::{run_scrape, Backoff, RetryPolicy, DEFAULT_BASE_URL},
};
use std::path::PathBuf;
use std::time::Duration;

/// Sequential user-profile scraper with a rotating proxy list
#[derive(Parser)]
#[command(name = "profile-scraper")]
#[command(about = "Sequential user-profile scraper with a rotating proxy list")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Default log level (per-module RUST_LOG directives still apply)
    #[arg(long, value_enum, default_value = "info", global = true)]
    log_level: LogLevel,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the next batch of ids and store the profiles
    Scrape {
        /// .env file with MAX_WORKERS, MAX_GENERATIONS and DATABASE_URL
        #[arg(long, default_value = ".env")]
        env_file: PathBuf,
        /// Proxy list file
        #[arg(short, long, default_value = DEFAULT_PROXIES_FILE)]
        proxies: PathBuf,
        /// Users API base URL
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,
        /// Per-request timeout in seconds (0 keeps the transport default)
        #[arg(long, default_value = "30")]
        timeout: u64,
        /// Give up on an id after this many attempts (unbounded when omitted)
        #[arg(long)]
        max_attempts: Option<u32>,
        /// Delay after a rate-limited response, in milliseconds
        #[arg(long, default_value = "1000")]
        rate_limit_delay_ms: u64,
        /// Delay before re-drawing after a proxy or connection failure, in milliseconds
        #[arg(long, default_value = "0")]
        transport_delay_ms: u64,
        /// How the rate-limit delay grows on repeated 429s
        #[arg(long, value_enum, default_value = "fixed")]
        backoff: Backoff,
        /// Ceiling for exponential backoff, in milliseconds
        #[arg(long, default_value = "60000")]
        max_delay_ms: u64,
    },
    /// Check the proxy list file format
    Validate {
        /// Proxy list file
        #[arg(default_value = DEFAULT_PROXIES_FILE)]
        input: PathBuf,
    },
    /// Draw a random proxy from the list and print its URL
    Draw {
        /// Proxy list file
        #[arg(default_value = DEFAULT_PROXIES_FILE)]
        input: PathBuf,
    },
    /// Print a correctly formatted proxy list line
    Encode {
        host: String,
        port: u32,
        /// Proxy type (http, https, socks4, socks5)
        #[arg(short = 't', long, default_value = "http")]
        proxy_type: String,
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short = 'P', long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_level).context("Failed to initialize logger")?;

    match cli.command {
        Commands::Scrape {
            env_file,
            proxies,
            base_url,
            timeout,
            max_attempts,
            rate_limit_delay_ms,
            transport_delay_ms,
            backoff,
            max_delay_ms,
        } => {
            let config = AppConfig::load(&env_file)?;
            let settings = ScrapeSettings {
                proxies_file: proxies,
                base_url,
                request_timeout: (timeout > 0).then(|| Duration::from_secs(timeout)),
                retry: RetryPolicy::new()
                    .with_max_attempts(max_attempts)
                    .with_rate_limit_delay(Duration::from_millis(rate_limit_delay_ms))
                    .with_transport_delay(Duration::from_millis(transport_delay_ms))
                    .with_backoff(backoff)
                    .with_max_delay(Duration::from_millis(max_delay_ms)),
            };

            let report = run_scrape(&config, &settings).await?;
            println!("{}", report);
        }
        Commands::Validate { input } => {
            let count = ProxyCatalog::new(&input).validate_file()?;
            println!("{:?} is valid: {} proxies", input, count);
        }
        Commands::Draw { input } => {
            let catalog = ProxyCatalog::new(&input);
            let proxy = catalog.draw_random().await?;
            println!("{}", proxy.proxy_url());
        }
        Commands::Encode {
            host,
            port,
            proxy_type,
            username,
            password,
        } => {
            let ptype: ProxyType = proxy_type.parse()?;
            let line = ProxyParser::encode(
                ptype,
                &host,
                port,
                username.as_deref(),
                password.as_deref(),
            )?;
            println!("{}", line);
        }
    }

    Ok(())
}
