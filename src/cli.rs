use clap::Parser;

/// Netbox to Proxmox webhook relay
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Validate the environment configuration and exit
    #[arg(long, default_value_t = false)]
    pub check_config: bool,
}

impl Cli {
    pub fn init() -> Self { Cli::parse() }
}
