// # dns01-hook - certbot manual hook for Hetzner DNS
//
// Thin integration layer between certbot's manual plugin and `dns01-core`.
// All challenge logic lives in the library crates; this binary only:
// 1. Reads arguments and environment variables
// 2. Resolves credentials
// 3. Initializes logging and the runtime
// 4. Calls `perform` or `cleanup` once
//
// ## Usage with certbot
//
// ```bash
// export DNS01_CREDENTIALS=/etc/letsencrypt/hetzner.ini
//
// certbot certonly --manual --preferred-challenges dns \
//     --manual-auth-hook "dns01-hook perform" \
//     --manual-cleanup-hook "dns01-hook cleanup" \
//     -d example.com -d '*.example.com'
// ```
//
// ## Configuration
//
// - `CERTBOT_DOMAIN` / `--domain`: Domain being validated (set by certbot)
// - `CERTBOT_VALIDATION` / `--validation`: Validation token (set by certbot)
// - `--validation-name`: Record name (default `_acme-challenge.<domain>`)
// - `DNS01_API_TOKEN` / `--api-token`: Hetzner API token
// - `DNS01_CREDENTIALS` / `--credentials`: Credentials file (used when no token is given)
// - `DNS01_API_BASE` / `--api-base`: API base URL override
// - `DNS01_PROPAGATION_SECONDS` / `--propagation-seconds`: Wait after perform (default 60)
// - `DNS01_LOG_LEVEL` / `--log-level`: trace, debug, info, warn, error (default info)

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dns01_core::{Authenticator, ChallengeAuthenticator, Credentials, PluginConfig};
use dns01_provider_hetzner::HETZNER_PLUGIN;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes reported to certbot
///
/// - 0: Challenge step succeeded
/// - 1: Configuration error
/// - 2: Challenge error (provider failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HookExitCode {
    Success = 0,
    ConfigError = 1,
    ChallengeError = 2,
}

impl From<HookExitCode> for ExitCode {
    fn from(code: HookExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug, Parser)]
#[command(name = "dns01-hook", version, about = HETZNER_PLUGIN.description, long_about = HETZNER_PLUGIN.more_info)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Hetzner API token
    #[arg(long, env = "DNS01_API_TOKEN", hide_env_values = true, global = true)]
    api_token: Option<String>,

    /// Credentials file (INI, JSON or plain token)
    #[arg(long, env = "DNS01_CREDENTIALS", global = true)]
    credentials: Option<PathBuf>,

    /// Override the Hetzner DNS API base URL
    #[arg(long, env = "DNS01_API_BASE", global = true)]
    api_base: Option<String>,

    /// Seconds to wait after publishing the record [default: provider default]
    #[arg(long, env = "DNS01_PROPAGATION_SECONDS", global = true)]
    propagation_seconds: Option<u64>,

    /// Log level
    #[arg(long, env = "DNS01_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Publish the validation token (certbot --manual-auth-hook)
    Perform(ChallengeArgs),
    /// Withdraw the validation token (certbot --manual-cleanup-hook)
    Cleanup(ChallengeArgs),
    /// Print plugin description and required credentials
    Describe,
}

#[derive(Debug, Args)]
struct ChallengeArgs {
    /// Domain being validated
    #[arg(long, env = "CERTBOT_DOMAIN")]
    domain: String,

    /// Validation token
    #[arg(long, env = "CERTBOT_VALIDATION", hide_env_values = true)]
    validation: String,

    /// TXT record name (default `_acme-challenge.<domain>`)
    #[arg(long)]
    validation_name: Option<String>,
}

impl ChallengeArgs {
    fn validation_name(&self) -> String {
        match self.validation_name {
            Some(ref name) => name.clone(),
            None => format!(
                "_acme-challenge.{}",
                self.domain.trim_start_matches("*.")
            ),
        }
    }
}

impl Cli {
    /// Resolve the hook configuration
    ///
    /// An explicit token wins over a credentials file.
    fn plugin_config(&self) -> Result<PluginConfig> {
        let credentials = match (&self.api_token, &self.credentials) {
            (Some(token), _) => Credentials::new(token.trim()),
            (None, Some(path)) => Credentials::load_from_file(path)?,
            (None, None) => anyhow::bail!(
                "No credentials configured. \
                Set DNS01_API_TOKEN or point DNS01_CREDENTIALS at a file containing \
                'dns_hetzner_api_token = <token>'"
            ),
        };

        let mut config = PluginConfig::new(credentials);
        if let Some(seconds) = self.propagation_seconds {
            config = config.with_propagation_seconds(seconds);
        }
        if let Some(ref base) = self.api_base {
            config = config.with_api_base(base.clone());
        }

        config.validate()?;
        Ok(config)
    }

    /// Propagation delay, falling back to the plugin's default
    fn propagation_seconds(&self, auth: &dyn Authenticator) -> u64 {
        self.propagation_seconds
            .unwrap_or_else(|| auth.default_propagation_seconds())
    }

    fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "DNS01_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

fn describe() -> String {
    let mut out = format!("{}\n\n{}\n\nCredentials:\n", HETZNER_PLUGIN.description, HETZNER_PLUGIN.more_info);
    for key in HETZNER_PLUGIN.credentials {
        out.push_str(&format!("  {}: {}\n", key.name, key.help));
    }
    out.push_str(&format!(
        "\nDefault propagation delay: {}s\n",
        HETZNER_PLUGIN.propagation_seconds
    ));
    out
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return HookExitCode::ConfigError.into();
        }
    };

    // stdout is captured by certbot as CERTBOT_AUTH_OUTPUT; log to stderr.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return HookExitCode::ConfigError.into();
    }

    let args = match cli.command {
        Command::Describe => {
            print!("{}", describe());
            return HookExitCode::Success.into();
        }
        Command::Perform(ref args) | Command::Cleanup(ref args) => args,
    };

    let config = match cli.plugin_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return HookExitCode::ConfigError.into();
        }
    };

    let auth = match dns01_provider_hetzner::authenticator(&config) {
        Ok(auth) => auth,
        Err(e) => {
            error!("Failed to create Hetzner client: {}", e);
            return HookExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return HookExitCode::ChallengeError.into();
        }
    };

    let result = rt.block_on(async {
        match cli.command {
            Command::Perform(_) => perform(&auth, args, cli.propagation_seconds(&auth)).await,
            _ => cleanup(&auth, args).await,
        }
    });

    match result {
        Ok(()) => HookExitCode::Success.into(),
        Err(e) => {
            error!("{:#}", e);
            HookExitCode::ChallengeError.into()
        }
    }
}

async fn perform(
    auth: &ChallengeAuthenticator,
    args: &ChallengeArgs,
    propagation_seconds: u64,
) -> Result<()> {
    let name = args.validation_name();
    info!(domain = %args.domain, record = %name, "Publishing DNS-01 validation token");

    auth.perform(&args.domain, &name, &args.validation)
        .await
        .with_context(|| format!("Failed to publish TXT record {}", name))?;

    if propagation_seconds > 0 {
        info!("Waiting {}s for DNS propagation", propagation_seconds);
        tokio::time::sleep(Duration::from_secs(propagation_seconds)).await;
    }

    Ok(())
}

async fn cleanup(auth: &ChallengeAuthenticator, args: &ChallengeArgs) -> Result<()> {
    let name = args.validation_name();
    info!(domain = %args.domain, record = %name, "Removing DNS-01 validation token");

    auth.cleanup(&args.domain, &name, &args.validation)
        .await
        .with_context(|| format!("Failed to clean up TXT record {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments parse")
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn perform_arguments() {
        let cli = parse(&[
            "dns01-hook",
            "perform",
            "--domain",
            "example.com",
            "--validation",
            "tok1",
            "--api-token",
            "token",
        ]);

        match cli.command {
            Command::Perform(ref args) => {
                assert_eq!(args.domain, "example.com");
                assert_eq!(args.validation, "tok1");
                assert_eq!(args.validation_name(), "_acme-challenge.example.com");
            }
            ref other => panic!("expected perform, got {:?}", other),
        }
    }

    #[test]
    fn explicit_validation_name_is_kept() {
        let cli = parse(&[
            "dns01-hook",
            "cleanup",
            "--domain",
            "example.com",
            "--validation",
            "tok1",
            "--validation-name",
            "_acme-challenge.other.example.com.",
        ]);

        match cli.command {
            Command::Cleanup(ref args) => {
                assert_eq!(args.validation_name(), "_acme-challenge.other.example.com.");
            }
            ref other => panic!("expected cleanup, got {:?}", other),
        }
    }

    #[test]
    fn wildcard_domain_uses_base_name() {
        let args = ChallengeArgs {
            domain: "*.example.com".to_string(),
            validation: "tok".to_string(),
            validation_name: None,
        };
        assert_eq!(args.validation_name(), "_acme-challenge.example.com");
    }

    #[test]
    fn token_wins_over_credentials_file() {
        let cli = parse(&[
            "dns01-hook",
            "--api-token",
            "from-flag",
            "--credentials",
            "/nonexistent/credentials.ini",
            "--propagation-seconds",
            "5",
            "describe",
        ]);

        let config = cli.plugin_config().unwrap();
        assert_eq!(config.credentials.api_token, "from-flag");
        assert_eq!(config.propagation_seconds, 5);
    }

    #[test]
    fn credentials_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dns_hetzner_api_token = from-file").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = parse(&["dns01-hook", "--credentials", &path, "describe"]);

        let config = cli.plugin_config().unwrap();
        assert_eq!(config.credentials.api_token, "from-file");
        assert_eq!(config.propagation_seconds, 60);
    }

    #[test]
    fn propagation_defaults_to_plugin_value() {
        let cli = parse(&["dns01-hook", "--api-token", "token", "describe"]);
        let auth = dns01_provider_hetzner::authenticator(&cli.plugin_config().unwrap()).unwrap();
        assert_eq!(cli.propagation_seconds(&auth), auth.default_propagation_seconds());
        assert_eq!(cli.propagation_seconds(&auth), 60);

        let cli = parse(&[
            "dns01-hook",
            "--api-token",
            "token",
            "--propagation-seconds",
            "0",
            "describe",
        ]);
        let auth = dns01_provider_hetzner::authenticator(&cli.plugin_config().unwrap()).unwrap();
        assert_eq!(cli.propagation_seconds(&auth), 0);
    }

    #[test]
    fn excessive_propagation_is_rejected() {
        let cli = parse(&[
            "dns01-hook",
            "--api-token",
            "token",
            "--propagation-seconds",
            "7200",
            "describe",
        ]);

        assert!(cli.plugin_config().is_err());
    }

    #[test]
    fn invalid_api_base_is_rejected() {
        let cli = parse(&[
            "dns01-hook",
            "--api-token",
            "token",
            "--api-base",
            "ftp://dns",
            "describe",
        ]);

        assert!(cli.plugin_config().is_err());
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let cli = parse(&["dns01-hook", "--log-level", "loud", "describe"]);
        assert!(cli.log_level().is_err());

        let cli = parse(&["dns01-hook", "--log-level", "DEBUG", "describe"]);
        assert_eq!(cli.log_level().unwrap(), Level::DEBUG);
    }

    #[test]
    fn describe_lists_credentials() {
        let text = describe();
        assert!(text.contains("Hetzner"));
        assert!(text.contains("api_token"));
    }

    #[test]
    fn exit_codes() {
        assert_eq!(HookExitCode::Success as u8, 0);
        assert_eq!(HookExitCode::ConfigError as u8, 1);
        assert_eq!(HookExitCode::ChallengeError as u8, 2);
    }
}
