use netbox_proxmox::{cli::Cli, server, Config};

fn main() {
    let cli = Cli::init();

    let config = match Config::load_from_env() {
        Ok(config) => config,
        Err(e) => {
            println!("Error reading config: {}", e);
            std::process::exit(exitcode::CONFIG);
        }
    };

    if cli.check_config {
        println!("Config ok, listening on {}", config.webhook.listen);
        return;
    }

    config.log.setup();

    server::run(config);
}
