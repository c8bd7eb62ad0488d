//! Server configuration.

use clap::Parser;

/// Runtime configuration, read from the command line and environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "sourcebit")]
#[command(author, version, about = "Run a SourceBit application server", long_about = None)]
pub struct Config {
    /// Address to bind.
    #[arg(long, env = "SOURCEBIT_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind.
    #[arg(short, long, env = "SOURCEBIT_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Render diagnostic pages for handler errors.
    #[arg(long, env = "SOURCEBIT_DEBUG")]
    pub debug: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Log every request line.
    #[arg(long)]
    pub request_log: bool,
}

impl Config {
    /// Returns the `host:port` pair to bind.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            debug: false,
            verbose: false,
            request_log: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_parsed_defaults() {
        let parsed = Config::try_parse_from(["sourcebit"]).unwrap();
        let default = Config::default();
        assert_eq!(parsed.port, default.port);
        assert_eq!(parsed.host, default.host);
        assert_eq!(default.address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "sourcebit",
            "--host",
            "0.0.0.0",
            "-p",
            "8080",
            "--debug",
            "--request-log",
        ])
        .unwrap();
        assert_eq!(config.address(), "0.0.0.0:8080");
        assert!(config.debug);
        assert!(config.request_log);
        assert!(!config.verbose);
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Config::try_parse_from(["sourcebit", "--port", "http"]).is_err());
    }
}
