// src/config.rs
//! Process configuration. Every flag can also come from the environment
//! (and therefore from `.env`, loaded in `main`).

use std::time::Duration;

use chrono_tz::Tz;
use clap::{Parser, ValueEnum};
use reqwest::Client;

use crate::error::ConfigError;
use crate::feed::http::{DEFAULT_FEED_BASE, DEFAULT_UPDATES};
use crate::notify::bark::DEFAULT_PUSH_BASE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "quake-alert", version, about = "Push fresh earthquake early warnings to your phone")]
pub struct Args {
    /// Push key issued by the notification app
    #[arg(long, env = "QUAKE_PUSH_KEY", default_value = "", hide_env_values = true)]
    pub key: String,

    /// Interval between feed queries (e.g. 500ms, 3s, 1m)
    #[arg(long, env = "QUAKE_POLL_INTERVAL", default_value = "3s", value_parser = parse_duration)]
    pub duration: Duration,

    /// Events older than this are not pushed
    #[arg(long, env = "QUAKE_STALENESS", default_value = "30m", value_parser = parse_duration)]
    pub staleness: Duration,

    #[arg(long, env = "QUAKE_FEED_BASE", default_value = DEFAULT_FEED_BASE)]
    pub feed_base: String,

    /// `updates` query parameter sent to the feed
    #[arg(long, env = "QUAKE_FEED_UPDATES", default_value_t = DEFAULT_UPDATES)]
    pub feed_updates: u32,

    #[arg(long, env = "QUAKE_PUSH_BASE", default_value = DEFAULT_PUSH_BASE)]
    pub push_base: String,

    /// Timeout applied to every outbound request
    #[arg(long, env = "QUAKE_HTTP_TIMEOUT", default_value = "10s", value_parser = parse_duration)]
    pub http_timeout: Duration,

    /// Skip TLS certificate verification (the public feed serves a certificate that does not validate)
    #[arg(long, env = "QUAKE_INSECURE_TLS")]
    pub insecure_tls: bool,

    /// IANA zone used for the timestamp in the alert title
    #[arg(long, env = "QUAKE_TIME_ZONE", default_value = "Asia/Shanghai", value_parser = parse_time_zone)]
    pub time_zone: Tz,

    /// How long to wait for both loops after Ctrl-C; 0s exits right away
    #[arg(long, env = "QUAKE_SHUTDOWN_GRACE", default_value = "0s", value_parser = parse_duration)]
    pub shutdown_grace: Duration,

    #[arg(long, env = "QUAKE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

/// Validated settings handed to both loops at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub push_key: String,
    pub poll_interval: Duration,
    pub staleness: Duration,
    pub feed_base: String,
    pub feed_updates: u32,
    pub push_base: String,
    pub http_timeout: Duration,
    pub accept_invalid_certs: bool,
    pub time_zone: Tz,
    pub shutdown_grace: Duration,
}

impl AppConfig {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let push_key = args.key.trim().to_string();
        if push_key.is_empty() {
            return Err(ConfigError::MissingKey);
        }
        if args.duration.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }

        Ok(Self {
            push_key,
            poll_interval: args.duration,
            staleness: args.staleness,
            feed_base: args.feed_base,
            feed_updates: args.feed_updates,
            push_base: args.push_base,
            http_timeout: args.http_timeout,
            accept_invalid_certs: args.insecure_tls,
            time_zone: args.time_zone,
            shutdown_grace: args.shutdown_grace,
        })
    }

    /// The one client shared by the feed and the push sink.
    pub fn http_client(&self) -> Result<Client, ConfigError> {
        Client::builder()
            .timeout(self.http_timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ConfigError::HttpClient)
    }
}

/// `<n>ms`, `<n>s`, `<n>m`, `<n>h`; a bare number means seconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (num, unit) = s.split_at(split);
    let n: u64 = num
        .parse()
        .map_err(|_| format!("invalid duration `{s}`: expected e.g. 3s, 500ms, 1m"))?;

    match unit.trim() {
        "ms" => Ok(Duration::from_millis(n)),
        "" | "s" => Ok(Duration::from_secs(n)),
        "m" => Ok(Duration::from_secs(n.saturating_mul(60))),
        "h" => Ok(Duration::from_secs(n.saturating_mul(3600))),
        other => Err(format!("invalid duration unit `{other}` in `{s}`")),
    }
}

fn parse_time_zone(s: &str) -> Result<Tz, String> {
    s.trim()
        .parse::<Tz>()
        .map_err(|e| format!("unknown time zone `{s}`: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["quake-alert"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn durations_parse_with_units() {
        assert_eq!(parse_duration("3s").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("30m").unwrap(), Duration::from_secs(1800));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_duration("15").unwrap(), Duration::from_secs(15));
        assert!(parse_duration("3 days").is_err());
        assert!(parse_duration("fast").is_err());
    }

    #[test]
    fn defaults_target_the_public_feed() {
        let cfg = AppConfig::from_args(args(&["--key", "abc"])).unwrap();
        assert_eq!(cfg.push_key, "abc");
        assert_eq!(cfg.poll_interval, Duration::from_secs(3));
        assert_eq!(cfg.staleness, Duration::from_secs(30 * 60));
        assert_eq!(cfg.http_timeout, Duration::from_secs(10));
        assert_eq!(cfg.time_zone, chrono_tz::Asia::Shanghai);
        assert_eq!(cfg.feed_updates, 4);
        assert!(!cfg.accept_invalid_certs);
        assert!(cfg.shutdown_grace.is_zero());
    }

    #[test]
    fn blank_key_is_fatal() {
        let err = AppConfig::from_args(args(&["--key", "   "])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = AppConfig::from_args(args(&["--key", "k", "--duration", "0s"])).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroInterval));
    }

    #[test]
    fn bad_time_zone_fails_parsing() {
        let res = Args::try_parse_from(["quake-alert", "--key", "k", "--time-zone", "Mars/Olympus"]);
        assert!(res.is_err());
    }

    #[test]
    fn client_builds_with_insecure_tls() {
        let cfg = AppConfig::from_args(args(&["--key", "k", "--insecure-tls"])).unwrap();
        assert!(cfg.accept_invalid_certs);
        assert!(cfg.http_client().is_ok());
    }
}
