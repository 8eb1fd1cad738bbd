//! Configuration for xfer-server
//!
//! Command-line flags and environment variables are parsed together by clap
//! (flag wins). An optional TOML file supplies the recipient routing table and
//! fallbacks for the notification settings.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;
use tracing::info;
use xfer_common::config::{load_optional, non_blank, resolve_setting};
use xfer_common::{Error, Result};

use crate::catalog::DatabaseSettings;
use crate::notify::{RecipientRoute, RecipientRouter, SmtpSettings};

/// Sender used when neither a from-address nor an SMTP user is configured
pub const FALLBACK_SENDER: &str = "inventory-transfer@localhost";

/// Command-line arguments for xfer-server
#[derive(Parser, Debug, Clone)]
#[command(name = "xfer-server")]
#[command(about = "Inventory transfer request service")]
#[command(version)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3030, env = "PORT")]
    pub port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0", env = "XFER_BIND")]
    pub bind: String,

    /// TOML config file (routing table and notification fallbacks)
    #[arg(short, long, env = "XFER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Catalog connection URL (postgres://… or sqlite:…)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Catalog host, when no URL is given
    #[arg(long, env = "DB_HOST")]
    pub db_host: Option<String>,

    #[arg(long, env = "DB_PORT")]
    pub db_port: Option<u16>,

    #[arg(long, env = "DB_NAME")]
    pub db_name: Option<String>,

    #[arg(long, env = "DB_USER")]
    pub db_user: Option<String>,

    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// SMTP relay host; notifications are only logged without one
    #[arg(long, env = "EMAIL_HOST")]
    pub email_host: Option<String>,

    #[arg(long, default_value_t = 587, env = "EMAIL_PORT")]
    pub email_port: u16,

    #[arg(long, env = "EMAIL_USER")]
    pub email_user: Option<String>,

    #[arg(long, env = "EMAIL_PASS", hide_env_values = true)]
    pub email_pass: Option<String>,

    /// Refuse to send unless the relay accepts STARTTLS; without this flag
    /// the connection is upgraded whenever the relay offers it
    #[arg(long, env = "EMAIL_STARTTLS")]
    pub email_starttls: bool,

    /// From address (defaults to the SMTP user)
    #[arg(long, env = "EMAIL_FROM")]
    pub email_from: Option<String>,

    /// Inventory officer, who receives every notification
    #[arg(long, env = "INVENTORY_OFFICER_EMAIL")]
    pub officer_email: Option<String>,

    /// Inventory technician for the built-in tasting room route
    #[arg(long, env = "INVENTORY_TECH_EMAIL")]
    pub tech_email: Option<String>,

    /// Directory of static files served at `/`
    #[arg(long, env = "XFER_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
}

/// Contents of the optional TOML config file
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub officer_email: Option<String>,
    pub tech_email: Option<String>,
    pub email_from: Option<String>,
    pub static_dir: Option<PathBuf>,
    /// Extra recipients per (from, to) pair, checked alongside the technician route
    #[serde(default)]
    pub routes: Vec<RecipientRoute>,
}

/// Fully resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database: DatabaseSettings,
    /// `None` means notifications are logged instead of sent
    pub smtp: Option<SmtpSettings>,
    pub sender: String,
    pub router: RecipientRouter,
    pub static_dir: PathBuf,
}

impl ServerConfig {
    /// Merge arguments/environment with the config file
    pub fn resolve(args: Args) -> Result<Self> {
        let file: FileConfig = load_optional(args.config.as_deref())?;

        let bind_addr: SocketAddr = format!("{}:{}", args.bind, args.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address {}:{}: {}", args.bind, args.port, e)))?;

        let officer = resolve_setting("officer_email", args.officer_email, file.officer_email)
            .ok_or_else(|| {
                Error::Config(
                    "Inventory officer address not configured. Set INVENTORY_OFFICER_EMAIL, \
                     --officer-email, or officer_email in the config file"
                        .to_string(),
                )
            })?;

        if !file.routes.is_empty() {
            info!("Loaded {} recipient route(s) from config file", file.routes.len());
        }
        let tech = resolve_setting("tech_email", args.tech_email, file.tech_email);
        let router = RecipientRouter::with_technician(officer, file.routes, tech);

        let email_user = non_blank(args.email_user);
        let sender = resolve_setting("email_from", args.email_from, file.email_from)
            .or_else(|| email_user.clone())
            .unwrap_or_else(|| FALLBACK_SENDER.to_string());

        let smtp = non_blank(args.email_host).map(|host| SmtpSettings {
            host,
            port: args.email_port,
            username: email_user,
            password: non_blank(args.email_pass),
            starttls: args.email_starttls,
        });

        let database = DatabaseSettings {
            url: non_blank(args.database_url),
            host: non_blank(args.db_host),
            port: args.db_port,
            name: non_blank(args.db_name),
            user: non_blank(args.db_user),
            password: args.db_password,
        };

        let static_dir = args
            .static_dir
            .or(file.static_dir)
            .unwrap_or_else(|| PathBuf::from("public"));

        Ok(Self {
            bind_addr,
            database,
            smtp,
            sender,
            router,
            static_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["xfer-server", "--officer-email", "officer@example.com"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_officer_is_required() {
        let mut a = args(&[]);
        a.officer_email = None;
        a.config = None;
        assert!(matches!(ServerConfig::resolve(a), Err(Error::Config(_))));
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::resolve(args(&["--port", "3030", "--bind", "0.0.0.0"])).unwrap();
        assert_eq!(config.bind_addr.port(), 3030);
        assert_eq!(config.router.officer(), "officer@example.com");
    }

    #[test]
    fn test_sender_falls_back_to_smtp_user() {
        let config = ServerConfig::resolve(args(&[
            "--email-host",
            "smtp.example.com",
            "--email-user",
            "relay@example.com",
        ]))
        .unwrap();
        assert_eq!(config.sender, "relay@example.com");
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.host, "smtp.example.com");
        assert_eq!(smtp.username.as_deref(), Some("relay@example.com"));
    }

    #[test]
    fn test_technician_flag_builds_default_route() {
        let config = ServerConfig::resolve(args(&["--tech-email", "tech@example.com"])).unwrap();
        assert_eq!(
            config.router.recipients("Groskopf", "Donum - Tasting Room"),
            vec!["officer@example.com".to_string(), "tech@example.com".to_string()]
        );
    }

    fn route_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_file_routes_keep_technician_route() {
        let file = route_file(
            r#"
[[routes]]
from = "Cellar"
to = "Shop"
recipients = ["shop@example.com"]
"#,
        );

        let path = file.path().to_str().unwrap().to_string();
        let config =
            ServerConfig::resolve(args(&["--tech-email", "tech@example.com", "--config", &path])).unwrap();

        assert_eq!(config.router.routes().len(), 2);
        assert_eq!(
            config.router.recipients("Cellar", "Shop"),
            vec!["officer@example.com".to_string(), "shop@example.com".to_string()]
        );
        assert_eq!(
            config.router.recipients("Groskopf", "Donum - Tasting Room"),
            vec!["officer@example.com".to_string(), "tech@example.com".to_string()]
        );
    }

    #[test]
    fn test_file_technician_is_used_with_file_routes() {
        let file = route_file(
            r#"
tech_email = "tech@example.com"

[[routes]]
from = "Cellar"
to = "Shop"
recipients = ["shop@example.com"]
"#,
        );

        let path = file.path().to_str().unwrap().to_string();
        let mut a = args(&["--config", &path]);
        a.tech_email = None;
        let config = ServerConfig::resolve(a).unwrap();

        assert_eq!(
            config.router.recipients("Groskopf", "Donum - Tasting Room"),
            vec!["officer@example.com".to_string(), "tech@example.com".to_string()]
        );
    }

    #[test]
    fn test_file_route_for_tasting_room_overrides_technician() {
        let file = route_file(
            r#"
[[routes]]
from = "Groskopf"
to = "Donum - Tasting Room"
recipients = ["floor@example.com"]
"#,
        );

        let path = file.path().to_str().unwrap().to_string();
        let config =
            ServerConfig::resolve(args(&["--tech-email", "tech@example.com", "--config", &path])).unwrap();

        assert_eq!(config.router.routes().len(), 1);
        assert_eq!(
            config.router.recipients("Groskopf", "Donum - Tasting Room"),
            vec!["officer@example.com".to_string(), "floor@example.com".to_string()]
        );
    }

    #[test]
    fn test_bad_bind_address() {
        let result = ServerConfig::resolve(args(&["--bind", "not-an-ip"]));
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("bind")));
    }
}
