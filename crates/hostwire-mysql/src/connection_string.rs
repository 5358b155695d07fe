//! Connection string parsing
//!
//! Two forms are accepted:
//!
//! - a URL understood by the driver: `mysql://user:pass@db:3306/orders?ssl-mode=required`
//! - the key/value form: `Server=db;Port=3306;User ID=app;Password=secret;Database=orders`
//!
//! Key/value keys are case-insensitive, ignore inner whitespace and accept the
//! common synonyms (`Host`, `Data Source`, `Uid`, `Pwd`, `Initial Catalog`, ...).
//! Values may be wrapped in single or double quotes; a quoted value may
//! contain `;`, and the quote character is escaped by doubling it
//! (`Password='it''s;secret'`).
//!
//! Options other MySQL clients understand but the driver has no setting for
//! (`AllowUserVariables`, `ConvertZeroDateTime`, ...) are accepted with a
//! warning. Keys nobody knows are rejected.

use crate::constants::{
    ACTIVITY_SOURCE_NAME, DEFAULT_CONNECTION_TIMEOUT, DEFAULT_MAXIMUM_POOL_SIZE,
    DEFAULT_MINIMUM_POOL_SIZE, DEFAULT_PORT,
};
use hostwire_domain::error::{Error, Result};
use sqlx::mysql::{MySqlConnectOptions, MySqlSslMode};
use std::iter::Peekable;
use std::str::{Chars, FromStr};
use std::time::Duration;
use tracing::warn;

/// Recognized options without a driver equivalent, in normalized form
const IGNORED_OPTIONS: &[&str] = &[
    "allowloadlocalinfile",
    "allowpublickeyretrieval",
    "allowuservariables",
    "allowzerodatetime",
    "applicationname",
    "autoenlist",
    "cancellationtimeout",
    "certificatefile",
    "certificatepassword",
    "certificatestorelocation",
    "certificatethumbprint",
    "connectionidleping",
    "connectionidletimeout",
    "connectionlifetime",
    "connectionprotocol",
    "commandtimeout",
    "connectionreset",
    "convertzerodatetime",
    "datetimekind",
    "defaultcommandtimeout",
    "deferconnectionreset",
    "dnscheckinterval",
    "forcesynchronous",
    "guidformat",
    "ignorecommandtransaction",
    "ignoreprepare",
    "interactivesession",
    "keepalive",
    "loadbalance",
    "nobackslashescapes",
    "oldguids",
    "persistsecurityinfo",
    "pipe",
    "pipelining",
    "protocol",
    "serverredirectionmode",
    "serverrsapublickeyfile",
    "serverspn",
    "tlsciphersuites",
    "tlsversion",
    "treattinyasboolean",
    "useaffectedrows",
    "usecompression",
    "usexatransactions",
];

/// Pool sizing taken from the connection string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// Whether connections are pooled; when off the pool holds a single connection
    pub pooling: bool,
    /// Connections kept open
    pub minimum_pool_size: u32,
    /// Upper bound on open connections
    pub maximum_pool_size: u32,
    /// Time allowed for acquiring a connection
    pub connection_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            pooling: true,
            minimum_pool_size: DEFAULT_MINIMUM_POOL_SIZE,
            maximum_pool_size: DEFAULT_MAXIMUM_POOL_SIZE,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
        }
    }
}

impl PoolSettings {
    /// Effective `(min, max)` connection counts
    pub fn bounds(&self) -> (u32, u32) {
        if self.pooling {
            (self.minimum_pool_size, self.maximum_pool_size)
        } else {
            (0, 1)
        }
    }
}

/// A parsed connection string
#[derive(Debug, Clone)]
pub struct MySqlConnectionInfo {
    /// Driver connect options
    pub options: MySqlConnectOptions,
    /// Pool sizing
    pub pool: PoolSettings,
    /// Server host, when given in key/value form
    pub host: Option<String>,
    /// Database name, when given in key/value form
    pub database: Option<String>,
}

impl MySqlConnectionInfo {
    /// Parse either connection string form
    pub fn parse(connection_string: &str) -> Result<Self> {
        let trimmed = connection_string.trim();
        if trimmed.is_empty() {
            return Err(Error::configuration("Connection string is empty"));
        }

        if is_url(trimmed) {
            let options = MySqlConnectOptions::from_str(trimmed).map_err(|e| {
                Error::configuration_with_source("Invalid MySQL connection URL", e)
            })?;
            return Ok(Self {
                options,
                pool: PoolSettings::default(),
                host: None,
                database: None,
            });
        }

        parse_key_values(trimmed)
    }
}

impl FromStr for MySqlConnectionInfo {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn is_url(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.starts_with("mysql://") || lower.starts_with("mariadb://")
}

fn parse_key_values(connection_string: &str) -> Result<MySqlConnectionInfo> {
    let mut options = MySqlConnectOptions::new().port(DEFAULT_PORT);
    let mut pool = PoolSettings::default();
    let mut host = None;
    let mut database = None;

    for (raw_key, value) in split_pairs(connection_string)? {
        let key: String = raw_key
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        let value = value.as_str();

        match key.as_str() {
            "server" | "host" | "datasource" | "address" | "addr" | "networkaddress" => {
                // only the first of a comma-separated host list is used
                let first = value.split(',').next().unwrap_or_default().trim();
                options = options.host(first);
                host = Some(first.to_string());
            }
            "port" => options = options.port(parse_number(&key, value)?),
            "userid" | "uid" | "user" | "username" => options = options.username(value),
            "password" | "pwd" => options = options.password(value),
            "database" | "initialcatalog" => {
                options = options.database(value);
                database = Some(value.to_string());
            }
            "sslmode" => options = options.ssl_mode(parse_ssl_mode(value)?),
            "sslca" | "cacertificatefile" => options = options.ssl_ca(value),
            "sslcert" => options = options.ssl_client_cert(value),
            "sslkey" => options = options.ssl_client_key(value),
            "characterset" | "charset" => options = options.charset(value),
            "pooling" => pool.pooling = parse_bool(&key, value)?,
            "minimumpoolsize" | "minpoolsize" => pool.minimum_pool_size = parse_number(&key, value)?,
            "maximumpoolsize" | "maxpoolsize" => pool.maximum_pool_size = parse_number(&key, value)?,
            "connectiontimeout" | "connecttimeout" => {
                pool.connection_timeout = Duration::from_secs(parse_number(&key, value)?);
            }
            ignored if IGNORED_OPTIONS.contains(&ignored) => {
                warn!(
                    target: ACTIVITY_SOURCE_NAME,
                    option = raw_key.as_str(),
                    "Ignoring MySQL connection option without a driver equivalent"
                );
            }
            _ => {
                return Err(Error::configuration(format!(
                    "Option '{raw_key}' is not supported in MySQL connection strings"
                )));
            }
        }
    }

    if pool.maximum_pool_size == 0 {
        return Err(Error::configuration("Maximum Pool Size must be greater than 0"));
    }
    if pool.minimum_pool_size > pool.maximum_pool_size {
        return Err(Error::configuration(format!(
            "Minimum Pool Size ({}) must not exceed Maximum Pool Size ({})",
            pool.minimum_pool_size, pool.maximum_pool_size
        )));
    }

    Ok(MySqlConnectionInfo {
        options,
        pool,
        host,
        database,
    })
}

/// Split into trimmed `(key, value)` pairs, honoring quoted values
fn split_pairs(connection_string: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    let mut chars = connection_string.chars().peekable();

    while chars.peek().is_some() {
        let mut key = String::new();
        let mut has_value = false;
        for c in chars.by_ref() {
            match c {
                '=' => {
                    has_value = true;
                    break;
                }
                ';' => break,
                _ => key.push(c),
            }
        }

        let key = key.trim();
        if !has_value {
            if key.is_empty() {
                continue;
            }
            return Err(Error::configuration(format!(
                "Invalid connection string segment '{key}': expected 'key=value'"
            )));
        }
        let value = read_value(&mut chars)?;
        pairs.push((key.to_string(), value));
    }

    Ok(pairs)
}

/// Read one value up to and including its terminating `;`
fn read_value(chars: &mut Peekable<Chars<'_>>) -> Result<String> {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}

    let quote = chars.peek().copied().filter(|c| matches!(c, '"' | '\''));
    let Some(quote) = quote else {
        let value: String = chars.by_ref().take_while(|c| *c != ';').collect();
        return Ok(value.trim_end().to_string());
    };
    chars.next();

    let mut value = String::new();
    loop {
        match chars.next() {
            None => {
                return Err(Error::configuration(
                    "Unterminated quoted value in connection string",
                ));
            }
            Some(c) if c == quote => {
                if chars.next_if_eq(&quote).is_some() {
                    value.push(quote);
                } else {
                    break;
                }
            }
            Some(c) => value.push(c),
        }
    }

    for c in chars.by_ref() {
        if c == ';' {
            break;
        }
        if !c.is_whitespace() {
            return Err(Error::configuration(
                "Unexpected text after quoted value in connection string",
            ));
        }
    }
    Ok(value)
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        Error::configuration(format!("Invalid value '{value}' for connection option '{key}'"))
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(Error::configuration(format!(
            "Invalid value '{value}' for connection option '{key}'"
        ))),
    }
}

fn parse_ssl_mode(value: &str) -> Result<MySqlSslMode> {
    match value.to_ascii_lowercase().as_str() {
        "none" | "disabled" => Ok(MySqlSslMode::Disabled),
        "preferred" => Ok(MySqlSslMode::Preferred),
        "required" => Ok(MySqlSslMode::Required),
        "verifyca" => Ok(MySqlSslMode::VerifyCa),
        "verifyfull" | "verifyidentity" => Ok(MySqlSslMode::VerifyIdentity),
        _ => Err(Error::configuration(format!("Invalid SslMode '{value}'"))),
    }
}
