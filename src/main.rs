use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use pagewire::check;
use pagewire::controllers::{search_url, validate_email, OrderBy};
use pagewire::fingerprint::{fallback_fingerprint, BrowserTraits, HashKind};
use pagewire::transport::{HttpTransport, SubscribeRequest, SubscribeTransport};
use pagewire::UiConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Public-site page behaviour tooling")]
struct Cli {
    /// UI config (TOML). Built-in defaults when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mount the page controllers against rendered templates and report drift.
    Check {
        #[arg(required = true)]
        templates: Vec<PathBuf>,
    },
    /// Print the fallback browser fingerprint for the given traits.
    Fingerprint {
        #[command(flatten)]
        traits: TraitArgs,
        /// Use the 32-bit fold hash instead of SHA-256.
        #[arg(long)]
        fold: bool,
    },
    /// Print the URL a search box submission navigates to.
    SearchUrl {
        #[arg(long, default_value = "")]
        keyword: String,
        /// Raw order selector value (0 = latest, 1 = most viewed).
        #[arg(long, default_value = "0")]
        order_by: String,
    },
    /// Post one subscription the way the signup form does.
    Subscribe {
        #[arg(long)]
        base_url: String,
        #[arg(long)]
        email: String,
        /// Sent as-is. Computed from the browser traits when omitted.
        #[arg(long)]
        fingerprint: Option<String>,
        #[command(flatten)]
        traits: TraitArgs,
    },
}

/// Browser properties for the fallback fingerprint.
#[derive(Args, Debug, Clone)]
struct TraitArgs {
    #[arg(long, default_value = "")]
    user_agent: String,
    #[arg(long, default_value_t = 1920)]
    screen_width: u32,
    #[arg(long, default_value_t = 1080)]
    screen_height: u32,
    #[arg(long, default_value_t = 24)]
    color_depth: u32,
    /// Minutes from UTC, as the browser reports it.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    timezone_offset: i32,
    #[arg(long, default_value = "en-US")]
    language: String,
}

impl From<TraitArgs> for BrowserTraits {
    fn from(a: TraitArgs) -> Self {
        BrowserTraits {
            user_agent: a.user_agent,
            screen_width: a.screen_width,
            screen_height: a.screen_height,
            color_depth: a.color_depth,
            timezone_offset: a.timezone_offset,
            language: a.language,
        }
    }
}

/// Same checks the signup form runs before posting.
fn subscribe_request(
    email: &str,
    fingerprint: Option<String>,
    traits: BrowserTraits,
) -> Result<SubscribeRequest, String> {
    let email = validate_email(email).ok_or_else(|| format!("invalid email address '{}'", email))?;
    let browser_fingerprint = match fingerprint.filter(|f| !f.trim().is_empty()) {
        Some(f) => f,
        None => fallback_fingerprint(&traits, HashKind::Sha256),
    };
    Ok(SubscribeRequest {
        email: email.to_string(),
        browser_fingerprint,
    })
}

fn load_config(path: Option<&PathBuf>) -> Result<UiConfig, String> {
    match path {
        Some(p) => UiConfig::load(p).map_err(|e| e.to_string()),
        None => Ok(UiConfig::default()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Check { templates } => {
            log::info!("Checking {} template(s)...", templates.len());
            let errors = check::run(&templates, &config);
            if errors > 0 {
                log::error!("{} template(s) failed", errors);
                return ExitCode::FAILURE;
            }
            log::info!("All templates passed");
        }
        Command::Fingerprint { traits, fold } => {
            let traits = BrowserTraits::from(traits);
            let kind = if fold { HashKind::Fold } else { HashKind::Sha256 };
            println!("{}", fallback_fingerprint(&traits, kind));
        }
        Command::SearchUrl { keyword, order_by } => {
            if OrderBy::from_param(&order_by).is_none() {
                log::warn!("order_by {:?} is not a known ordering, passing it through", order_by);
            }
            println!("{}", search_url(&config.search.path, keyword.trim(), &order_by));
        }
        Command::Subscribe {
            base_url,
            email,
            fingerprint,
            traits,
        } => {
            let req = match subscribe_request(&email, fingerprint, traits.into()) {
                Ok(r) => r,
                Err(e) => {
                    log::error!("{}", e);
                    return ExitCode::FAILURE;
                }
            };
            let transport = match HttpTransport::new(&base_url, &config.subscribe.endpoint) {
                Ok(t) => t,
                Err(e) => {
                    log::error!("{}", e);
                    return ExitCode::FAILURE;
                }
            };
            log::info!("POST {}", transport.url());
            match transport.subscribe(&req).await {
                Ok(resp) => {
                    println!("{}", resp.message);
                    if !resp.success {
                        return ExitCode::FAILURE;
                    }
                }
                Err(e) => {
                    log::error!("{}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }
    ExitCode::SUCCESS
}
