use chrono::FixedOffset;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cost-manager", version, about = "Personal expense tracking REST API")]
pub struct Config {
    /// MongoDB connection string.
    #[arg(long, env = "MONGODB_URI", required_unless_present = "in_memory")]
    pub mongodb_uri: Option<String>,

    #[arg(long, env = "DATABASE_NAME", default_value = "cost-manager")]
    pub database: String,

    /// Keep everything in process memory instead of MongoDB.
    #[arg(long, env = "IN_MEMORY_STORE")]
    pub in_memory: bool,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// UTC offset treated as local time, e.g. `+02:00`. Report windows use it,
    /// and so do cost timestamps given without an offset.
    #[arg(long, env = "REPORT_UTC_OFFSET", default_value = "+00:00", value_parser = parse_offset)]
    pub report_utc_offset: FixedOffset,

    /// Origins allowed by CORS.
    #[arg(long = "allowed-origin", env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Serve the HTTP API (default).
    Serve,
    /// Clear all users and costs, then add the demo user.
    ResetDb,
}

fn parse_offset(raw: &str) -> Result<FixedOffset, String> {
    raw.parse::<FixedOffset>()
        .map_err(|err| format!("invalid UTC offset `{raw}`: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_with_in_memory_store() {
        let config = Config::try_parse_from(["cost-manager", "--in-memory"]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.database, "cost-manager");
        assert_eq!(config.report_utc_offset, FixedOffset::east_opt(0).unwrap());
        assert!(config.allowed_origins.is_empty());
        assert_eq!(config.command, None);
    }

    #[test]
    fn parses_offset_origins_and_subcommand() {
        let config = Config::try_parse_from([
            "cost-manager",
            "--mongodb-uri",
            "mongodb://localhost:27017",
            "--report-utc-offset",
            "+02:00",
            "--allowed-origin",
            "http://localhost:5173,https://costs.example.com",
            "reset-db",
        ])
        .unwrap();
        assert_eq!(config.report_utc_offset, FixedOffset::east_opt(7200).unwrap());
        assert_eq!(config.allowed_origins.len(), 2);
        assert_eq!(config.command, Some(Command::ResetDb));
    }

    #[test]
    fn invalid_offset_is_rejected() {
        assert!(Config::try_parse_from(["cost-manager", "--in-memory", "--report-utc-offset", "noon"]).is_err());
    }
}
