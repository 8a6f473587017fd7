use anyhow::{Context, Result};
use bmc_core::{transport, AuthType, BmcClient, DEFAULT_BASE_URL};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Print firmware details of a Turing Pi 2 BMC.
#[derive(Debug, Parser)]
#[command(name = "bmc-cli", version)]
struct Args {
    /// BMC username
    username: String,

    /// BMC password
    password: String,

    /// Base URL of the BMC
    #[arg(long, env = "BMC_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Authentication scheme: basic or bearer
    #[arg(long, env = "BMC_AUTH_TYPE", default_value = "bearer", value_parser = parse_auth_type)]
    auth_type: AuthType,
}

fn parse_auth_type(s: &str) -> Result<AuthType, String> {
    s.parse::<AuthType>().map_err(|e| e.to_string())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    // Stock boards ship a self-signed certificate.
    let agent = transport::insecure_agent();

    let bmc = BmcClient::connect_with(
        &args.base_url,
        args.auth_type,
        &args.username,
        &args.password,
        agent,
    )
    .context("creating BMC client")?;

    let other = bmc.get_other().context("getting other info")?;

    println!("API: {}", other.api);
    println!("Build Version: {}", other.build_version);
    println!("Buildroot: {}", other.buildroot);
    println!("Buildtime: {}", other.buildtime);
    println!("IP: {}", other.ip);
    println!("MAC: {}", other.mac);
    println!("Version: {}", other.version);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_credentials_are_required() {
        assert!(Args::try_parse_from(["bmc-cli", "root"]).is_err());
    }

    #[test]
    fn defaults_to_bearer_on_the_stock_hostname() {
        let args = Args::try_parse_from(["bmc-cli", "root", "turing"]).unwrap();
        assert_eq!(args.username, "root");
        assert_eq!(args.password, "turing");
        assert_eq!(args.auth_type, AuthType::Bearer);
        assert_eq!(args.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn rejects_unknown_auth_type() {
        let parsed = Args::try_parse_from(["bmc-cli", "--auth-type", "digest", "root", "turing"]);
        assert!(parsed.is_err());
    }
}
