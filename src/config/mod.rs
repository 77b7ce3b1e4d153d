//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "vetrina";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_SITE_ROOT: &str = ".";
const DEFAULT_DIST_DIR: &str = "dist";
const DEFAULT_PUBLIC_URL: &str = "http://127.0.0.1:3000/";

/// Environment variable serverless platforms set to mark their runtime.
const SERVERLESS_PLATFORM_ENV: &str = "VETRINA_PLATFORM";
const SERVERLESS_PLATFORM_VALUE: &str = "serverless";

const SHELL_FILE: &str = "index.html";
const CONTENT_DIR: &str = "content";
const STYLES_DIR: &str = "styles";
const PUBLIC_DIR: &str = "public";
const ASSETS_DIR: &str = "assets";

/// Command-line arguments for the Vetrina binary.
#[derive(Debug, Parser)]
#[command(name = "vetrina", version, about = "Vetrina portfolio server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "VETRINA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP server.
    Serve(Box<ServeArgs>),
    /// Render one URL to stdout from the build output (the serverless
    /// invocation path).
    #[command(name = "render")]
    Render(RenderArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "port", value_name = "PORT")]
    pub port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "graceful-shutdown-seconds", value_name = "SECONDS")]
    pub graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Serve the production build output instead of the source tree.
    #[arg(
        long = "production",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub production: Option<bool>,

    /// Override the site root directory.
    #[arg(long = "site-root", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub site_root: Option<PathBuf>,

    /// Override the public base URL used for canonical metadata.
    #[arg(long = "public-url", value_name = "URL")]
    pub public_url: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    /// URL path to render.
    #[arg(value_name = "URL", default_value = "/")]
    pub url: String,

    /// Language to render in; defaults to the site's fallback chain.
    #[arg(long = "language", value_name = "TAG")]
    pub language: Option<String>,

    /// Override the site root directory.
    #[arg(long = "site-root", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub site_root: Option<PathBuf>,
}

/// Fully-resolved deployment settings after precedence resolution and
/// validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub site: SiteSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub production: bool,
    pub serverless: bool,
    pub root: PathBuf,
    pub public_url: Url,
    pub dist_dir: String,
}

/// Which of the three deployments this process is serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    InteractiveDev,
    StaticProduction,
    Serverless,
}

impl RenderMode {
    /// Pure over its inputs: the production flag picks dev vs built output,
    /// the platform indicator picks the serverless sub-mode of production.
    pub fn resolve(production: bool, serverless: bool) -> Self {
        match (production, serverless) {
            (false, _) => Self::InteractiveDev,
            (true, false) => Self::StaticProduction,
            (true, true) => Self::Serverless,
        }
    }
}

/// Where the active mode finds the shell, content bundle, style sources, and
/// servable assets.
///
/// Static production resolves everything under the configured site root;
/// serverless resolves the build output relative to the process working
/// directory. That relative base is the only difference between the two.
#[derive(Debug, Clone)]
pub struct SitePaths {
    pub shell: PathBuf,
    pub content: PathBuf,
    pub styles: PathBuf,
    pub assets: PathBuf,
}

impl SitePaths {
    pub fn for_mode(mode: RenderMode, site: &SiteSettings) -> Self {
        match mode {
            RenderMode::InteractiveDev => Self {
                shell: site.root.join(SHELL_FILE),
                content: site.root.join(CONTENT_DIR),
                styles: site.root.join(STYLES_DIR),
                assets: site.root.join(PUBLIC_DIR),
            },
            RenderMode::StaticProduction => Self::in_dist(site.root.join(&site.dist_dir)),
            RenderMode::Serverless => Self::in_dist(PathBuf::from(&site.dist_dir)),
        }
    }

    fn in_dist(dist: PathBuf) -> Self {
        Self {
            shell: dist.join(SHELL_FILE),
            content: dist.join(CONTENT_DIR),
            styles: dist.join(ASSETS_DIR),
            assets: dist.join(ASSETS_DIR),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Parse the CLI and load settings in one step.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let cli = CliArgs::parse();
    let settings = load(&cli)?;
    Ok((cli, settings))
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("VETRINA").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    if serverless_platform_detected() {
        raw.site.serverless = Some(true);
    }

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Render(args)) => raw.apply_render_overrides(args),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

fn serverless_platform_detected() -> bool {
    std::env::var(SERVERLESS_PLATFORM_ENV)
        .map(|value| value.eq_ignore_ascii_case(SERVERLESS_PLATFORM_VALUE))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    site: RawSiteSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    production: Option<bool>,
    serverless: Option<bool>,
    root: Option<PathBuf>,
    public_url: Option<String>,
    dist_dir: Option<String>,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(production) = overrides.production {
            self.site.production = Some(production);
        }
        if let Some(root) = overrides.site_root.as_ref() {
            self.site.root = Some(root.clone());
        }
        if let Some(url) = overrides.public_url.as_ref() {
            self.site.public_url = Some(url.clone());
        }
    }

    fn apply_render_overrides(&mut self, args: &RenderArgs) {
        // The render invocation always reads the build output.
        self.site.production = Some(true);
        if let Some(root) = args.site_root.as_ref() {
            self.site.root = Some(root.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            site,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let site = build_site_settings(site)?;

        Ok(Self {
            server,
            logging,
            site,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }
    let graceful_shutdown = Duration::from_secs(graceful_secs);

    Ok(ServerSettings {
        addr,
        graceful_shutdown,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let root = site
        .root
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SITE_ROOT));
    if root.as_os_str().is_empty() {
        return Err(LoadError::invalid("site.root", "path must not be empty"));
    }

    let public_url = site
        .public_url
        .unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string());
    let public_url = Url::parse(&public_url)
        .map_err(|err| LoadError::invalid("site.public_url", format!("failed to parse: {err}")))?;
    if public_url.cannot_be_a_base() {
        return Err(LoadError::invalid(
            "site.public_url",
            "must be an absolute http(s) URL",
        ));
    }

    let dist_dir = site.dist_dir.unwrap_or_else(|| DEFAULT_DIST_DIR.to_string());
    if dist_dir.is_empty() || Path::new(&dist_dir).is_absolute() {
        return Err(LoadError::invalid(
            "site.dist_dir",
            "must be a non-empty relative directory name",
        ));
    }

    Ok(SiteSettings {
        production: site.production.unwrap_or(false),
        serverless: site.serverless.unwrap_or(false),
        root,
        public_url,
        dist_dir,
    })
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let ip = IpAddr::from_str(host)
        .map_err(|_| format!("host `{host}` is not a valid IP address"))?;
    Ok(SocketAddr::new(ip, port))
}

#[cfg(test)]
mod tests;
