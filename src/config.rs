use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use config::{Config, Environment, File};
use serde::Deserialize;
use url::Url;

use crate::chat::DEFAULT_GREETING;
use crate::proxy::{ProxyRule, default_rules};
use crate::transport::{resolve_endpoint, websocket_scheme};

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Prefix for environment overrides, e.g. `DEMO_CHAT_SERVER__PORT=5174`.
pub const ENV_PREFIX: &str = "DEMO_CHAT";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    /// Port the dev server listens on
    #[arg(long, env = "PORT", global = true)]
    pub port: Option<u16>,

    /// Address the dev server binds to
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Log output format
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve static files and apply the proxy rules (default)
    Serve,
    /// Run the demo backend the default proxy rule points at
    Backend,
    /// Open the terminal chat client
    Chat {
        /// WebSocket URL, bypassing endpoint resolution
        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    pub chat: ChatConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
}

/// Where the demo backend listens.
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProxyConfig {
    #[serde(default = "default_rules")]
    pub rules: Vec<ProxyRule>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    /// Endpoint path resolved against the dev server origin.
    pub endpoint: String,
    /// Absolute WebSocket URL; wins over `endpoint` when set.
    #[serde(default)]
    pub url: Option<String>,
    /// First assistant message. Empty disables it.
    #[serde(default)]
    pub greeting: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::load_from_cli(&cli)
    }

    /// Layering: defaults < config file < `DEMO_CHAT_*` env < CLI flags.
    pub fn load_from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.port", 5173)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.static_dir", "static")?
            .set_default("backend.port", 8000)?
            .set_default("backend.host", "127.0.0.1")?
            .set_default("chat.endpoint", "/ws")?
            .set_default("chat.greeting", DEFAULT_GREETING)?
            .set_default("log.format", LogFormat::default().as_str())?;

        if let Some(path) = &cli.config {
            builder = builder.add_source(File::from(Path::new(path)).required(true));
        } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
            builder = builder.add_source(File::from(Path::new(DEFAULT_CONFIG_FILE)));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(host) = &cli.host {
            builder = builder.set_override("server.host", host.as_str())?;
        }
        if let Some(format) = cli.log_format {
            builder = builder.set_override("log.format", format.as_str())?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        for rule in &self.proxy.rules {
            if !rule.prefix.starts_with('/') {
                return Err(config::ConfigError::Message(format!(
                    "proxy rule prefix must start with '/': {:?}",
                    rule.prefix
                )));
            }
        }
        Ok(())
    }

    /// Socket address the dev server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Socket address the demo backend binds to.
    pub fn backend_address(&self) -> String {
        format!("{}:{}", self.backend.host, self.backend.port)
    }

    /// Origin a client uses to reach the dev server.
    pub fn origin(&self) -> crate::error::Result<Url> {
        let host = match self.server.host.as_str() {
            "0.0.0.0" | "::" | "[::]" => "127.0.0.1",
            host => host,
        };
        Ok(Url::parse(&format!("http://{host}:{}/", self.server.port))?)
    }

    /// WebSocket URL the chat client connects to.
    ///
    /// An explicit URL (argument, then `chat.url`) wins; otherwise
    /// `chat.endpoint` is resolved against [`AppConfig::origin`].
    pub fn chat_url(&self, explicit: Option<&str>) -> crate::error::Result<Url> {
        if let Some(raw) = explicit.or(self.chat.url.as_deref()) {
            let mut url = Url::parse(raw)?;
            websocket_scheme(&mut url)?;
            return Ok(url);
        }
        resolve_endpoint(&self.origin()?, &self.chat.endpoint)
    }

    /// Greeting to mount the view with, if any.
    pub fn greeting(&self) -> Option<&str> {
        self.chat.greeting.as_deref().filter(|g| !g.is_empty())
    }
}
