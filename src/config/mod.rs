//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr, num::NonZeroUsize, path::PathBuf, str::FromStr, time::Duration,
};

use clap::{Args, Parser, Subcommand, ValueEnum, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::seo::SiteSettings;

mod live;

pub use live::{GRAPHQL_AUTH_TOKEN_VAR, GRAPHQL_URL_VAR, LiveEnv, SITE_URL_VAR};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "presswire";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_CACHE_ENTRY_LIMIT: usize = 512;
const DEFAULT_SITE_NAME: &str = "Presswire Blog";
const DEFAULT_SITE_DESCRIPTION: &str = "Headless WordPress content, served fast";
const DEFAULT_SITE_URL: &str = "http://localhost:3000";
const DEFAULT_SITE_AUTHOR: &str = "Presswire";
const DEFAULT_SITE_KEYWORDS: &str = "wordpress, headless cms, blog";
const DEFAULT_SITE_LOCALE: &str = "en-US";
const DEFAULT_OG_IMAGE_PATH: &str = "og-image.jpg";
const DEFAULT_OG_IMAGE_WIDTH: u32 = 1200;
const DEFAULT_OG_IMAGE_HEIGHT: u32 = 630;

/// Command-line arguments for the Presswire binary.
#[derive(Debug, Parser)]
#[command(name = "presswire", version, about = "Headless CMS content gateway")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "PRESSWIRE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub content: ContentOverrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP service.
    Serve(Box<ServeArgs>),
    /// Print the slugs used for static path generation as JSON.
    Paths(PathsArgs),
    /// Print the SEO metadata of a single post as JSON.
    Metadata(MetadataArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ContentOverrides {
    /// Override the GraphQL endpoint of the content API. `GRAPHQL_URL` wins when set.
    #[arg(long = "graphql-url", value_name = "URL", global = true)]
    pub graphql_url: Option<String>,

    /// Bearer token sent to the content API. `GRAPHQL_AUTH_TOKEN` wins when set.
    #[arg(long = "graphql-auth-token", value_name = "TOKEN", global = true)]
    pub auth_token: Option<String>,

    /// Override the public site URL used for canonical links. `SITE_URL` wins when set.
    #[arg(long = "site-url", value_name = "URL", global = true)]
    pub site_url: Option<String>,
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
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

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

    /// Toggle the fetch-level response cache.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override the maximum number of cached responses.
    #[arg(long = "cache-entry-limit", value_name = "COUNT")]
    pub cache_entry_limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PathsKind {
    Posts,
    Categories,
}

#[derive(Debug, Args, Clone)]
pub struct PathsArgs {
    /// Which collection to enumerate.
    #[arg(value_enum)]
    pub kind: PathsKind,
}

#[derive(Debug, Args, Clone)]
pub struct MetadataArgs {
    /// Slug of the post to describe.
    #[arg(value_name = "SLUG")]
    pub slug: String,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub content: ContentSettings,
    pub site: SiteSettings,
    pub cache: CacheSettings,
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

/// Connection details for the remote content API, as resolved at startup.
///
/// A missing endpoint is not a load error: every query reports it on use.
/// [`LiveEnv::content`] layers the current environment over these values.
#[derive(Debug, Clone, Default)]
pub struct ContentSettings {
    pub graphql_url: Option<Url>,
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub entry_limit: NonZeroUsize,
    pub revalidate_token: Option<String>,
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

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("PRESSWIRE").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    raw.apply_content_overrides(&cli.content);
    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Paths(_)) | Some(Command::Metadata(_)) => {}
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    content: RawContentSettings,
    site: RawSiteSettings,
    cache: RawCacheSettings,
}

impl RawSettings {
    fn apply_content_overrides(&mut self, overrides: &ContentOverrides) {
        if let Some(url) = overrides.graphql_url.as_ref() {
            self.content.graphql_url = Some(url.clone());
        }
        if let Some(token) = overrides.auth_token.as_ref() {
            self.content.auth_token = Some(token.clone());
        }
        if let Some(url) = overrides.site_url.as_ref() {
            self.site.url = Some(url.clone());
        }
    }

    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }
        if let Some(limit) = overrides.cache_entry_limit {
            self.cache.entry_limit = Some(limit);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            content,
            site,
            cache,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            content: build_content_settings(content)?,
            site: build_site_settings(site)?,
            cache: build_cache_settings(cache)?,
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

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
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

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let graphql_url = match non_empty(content.graphql_url) {
        Some(value) => Some(parse_http_url(&value, "content.graphql_url")?),
        None => None,
    };

    Ok(ContentSettings {
        graphql_url,
        auth_token: non_empty(content.auth_token),
    })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let url_value = non_empty(site.url).unwrap_or_else(|| DEFAULT_SITE_URL.to_string());
    let url = parse_http_url(&url_value, "site.url")?;

    let default_image = match non_empty(site.default_image) {
        Some(value) => value,
        None => url
            .join(DEFAULT_OG_IMAGE_PATH)
            .map_err(|err| LoadError::invalid("site.default_image", err.to_string()))?
            .to_string(),
    };

    let image_width = site.default_image_width.unwrap_or(DEFAULT_OG_IMAGE_WIDTH);
    let image_height = site.default_image_height.unwrap_or(DEFAULT_OG_IMAGE_HEIGHT);
    if image_width == 0 || image_height == 0 {
        return Err(LoadError::invalid(
            "site.default_image_width",
            "image dimensions must be greater than zero",
        ));
    }

    Ok(SiteSettings {
        name: non_empty(site.name).unwrap_or_else(|| DEFAULT_SITE_NAME.to_string()),
        description: non_empty(site.description)
            .unwrap_or_else(|| DEFAULT_SITE_DESCRIPTION.to_string()),
        url,
        author: non_empty(site.author).unwrap_or_else(|| DEFAULT_SITE_AUTHOR.to_string()),
        keywords: non_empty(site.keywords).unwrap_or_else(|| DEFAULT_SITE_KEYWORDS.to_string()),
        locale: non_empty(site.locale).unwrap_or_else(|| DEFAULT_SITE_LOCALE.to_string()),
        twitter_handle: non_empty(site.twitter_handle),
        default_image,
        default_image_width: image_width,
        default_image_height: image_height,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let limit = cache.entry_limit.unwrap_or(DEFAULT_CACHE_ENTRY_LIMIT);
    let entry_limit = NonZeroUsize::new(limit)
        .ok_or_else(|| LoadError::invalid("cache.entry_limit", "must be greater than zero"))?;

    Ok(CacheSettings {
        enabled: cache.enabled.unwrap_or(true),
        entry_limit,
        revalidate_token: non_empty(cache.revalidate_token),
    })
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
struct RawContentSettings {
    graphql_url: Option<String>,
    auth_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    name: Option<String>,
    description: Option<String>,
    url: Option<String>,
    author: Option<String>,
    keywords: Option<String>,
    locale: Option<String>,
    twitter_handle: Option<String>,
    default_image: Option<String>,
    default_image_width: Option<u32>,
    default_image_height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    entry_limit: Option<usize>,
    revalidate_token: Option<String>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn parse_http_url(value: &str, key: &'static str) -> Result<Url, LoadError> {
    let url = Url::parse(value)
        .map_err(|err| LoadError::invalid(key, format!("invalid URL `{value}`: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(LoadError::invalid(
            key,
            format!("unsupported scheme `{other}`"),
        )),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn cli_overrides_take_highest_precedence() {
        let mut raw = RawSettings::default();
        raw.server.port = Some(4000);
        raw.logging.level = Some("info".to_string());

        let overrides = ServeOverrides {
            server_port: Some(4321),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };

        raw.apply_serve_overrides(&overrides);
        let settings = Settings::from_raw(raw).expect("valid settings");

        assert_eq!(settings.server.addr.port(), 4321);
        assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    }

    #[test]
    fn missing_endpoint_is_not_a_load_error() {
        let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");
        assert!(settings.content.graphql_url.is_none());
        assert!(settings.content.auth_token.is_none());
    }

    #[test]
    fn blank_token_is_treated_as_absent() {
        let mut raw = RawSettings::default();
        raw.content.auth_token = Some("   ".to_string());
        let settings = Settings::from_raw(raw).expect("valid settings");
        assert!(settings.content.auth_token.is_none());
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let mut raw = RawSettings::default();
        raw.content.graphql_url = Some("ftp://cms.example.com/graphql".to_string());
        let err = Settings::from_raw(raw).expect_err("ftp endpoint should be rejected");
        assert!(matches!(
            err,
            LoadError::Invalid {
                key: "content.graphql_url",
                ..
            }
        ));
    }

    #[test]
    fn zero_cache_limit_is_rejected() {
        let mut raw = RawSettings::default();
        raw.cache.entry_limit = Some(0);
        assert!(Settings::from_raw(raw).is_err());
    }

    #[test]
    fn default_image_derives_from_site_url() {
        let mut raw = RawSettings::default();
        raw.site.url = Some("https://blog.example.com/".to_string());
        let settings = Settings::from_raw(raw).expect("valid settings");
        assert_eq!(
            settings.site.default_image,
            "https://blog.example.com/og-image.jpg"
        );
    }

    #[test]
    fn content_flags_override_file_values() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("tmp config");
        writeln!(
            file,
            "[content]\ngraphql_url = \"https://file.example.com/graphql\"\n[cache]\nentry_limit = 8"
        )
        .expect("write config");

        let args = CliArgs::parse_from([
            "presswire",
            "--config-file",
            file.path().to_str().expect("utf-8 path"),
            "--graphql-url",
            "https://cli.example.com/graphql",
            "paths",
            "posts",
        ]);
        let settings = load(&args).expect("settings load");

        assert_eq!(
            settings.content.graphql_url.map(|url| url.to_string()),
            Some("https://cli.example.com/graphql".to_string())
        );
        assert_eq!(settings.cache.entry_limit.get(), 8);
    }

    #[test]
    fn default_to_serve_command() {
        let args = CliArgs::parse_from(["presswire"]);
        let command = args
            .command
            .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
        assert!(matches!(command, Command::Serve(_)));
    }

    #[test]
    fn parse_paths_arguments() {
        let args = CliArgs::parse_from(["presswire", "paths", "categories"]);
        match args.command.expect("paths command") {
            Command::Paths(paths) => assert_eq!(paths.kind, PathsKind::Categories),
            _ => panic!("wrong command parsed"),
        }
    }

    #[test]
    fn parse_metadata_arguments() {
        let args = CliArgs::parse_from(["presswire", "metadata", "hello-world"]);
        match args.command.expect("metadata command") {
            Command::Metadata(meta) => assert_eq!(meta.slug, "hello-world"),
            _ => panic!("wrong command parsed"),
        }
    }
}
