use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;

/// podshelf: the latest episodes of a few podcasts on one page
#[derive(Parser, Debug)]
#[command(name = "podshelf")]
#[command(about = "Poll podcast feeds and serve their latest episodes over HTTP", long_about = None)]
pub struct Cli {
    /// Address to listen on; a bare `:PORT` listens on all interfaces
    #[arg(long, default_value = ":6363")]
    pub listen: String,

    /// YAML file listing the sources to track (built-in list if omitted)
    #[arg(long)]
    pub sources: Option<PathBuf>,

    /// Seconds between scheduled refreshes
    #[arg(long, default_value_t = 3600, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: u64,
}

impl Cli {
    /// Parse CLI arguments from the environment
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// The socket address to bind.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        parse_listen_addr(&self.listen)
    }
}

fn parse_listen_addr(raw: &str) -> Result<SocketAddr> {
    let s = raw.trim();
    let full = match s.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => s.to_string(),
    };
    full.parse::<SocketAddr>()
        .map_err(|e| anyhow!("invalid listen address {s:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let cli = Cli::try_parse_from(["podshelf"]).unwrap();
        assert_eq!(cli.listen, ":6363");
        assert!(cli.sources.is_none());
        assert_eq!(cli.interval_secs, 3600);
        assert_eq!(cli.listen_addr().unwrap(), "0.0.0.0:6363".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_override_listen_and_sources() {
        let cli = Cli::try_parse_from([
            "podshelf",
            "--listen",
            "127.0.0.1:8080",
            "--sources",
            "pods.yaml",
        ])
        .unwrap();
        assert_eq!(cli.listen_addr().unwrap(), "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(cli.sources, Some(PathBuf::from("pods.yaml")));
    }

    #[test]
    fn test_ipv6_listen_addr() {
        assert_eq!(
            parse_listen_addr("[::1]:6363").unwrap(),
            "[::1]:6363".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_invalid_listen_addr() {
        assert!(parse_listen_addr("localhost").is_err());
        assert!(parse_listen_addr(":http").is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(Cli::try_parse_from(["podshelf", "--interval-secs", "0"]).is_err());
    }
}
