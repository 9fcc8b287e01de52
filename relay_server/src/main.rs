use dotenvy::dotenv;
use log::info;
use relay_server::{cli::handle_command_line_args, config::RelayConfig, server::run_server};

#[actix_web::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    if handle_command_line_args() {
        return;
    }
    let config = RelayConfig::from_env_or_default();

    info!("🚀️ Starting payment relay on {}:{}", config.host, config.port);
    match run_server(config).await {
        Ok(_) => println!("Bye!"),
        Err(e) => eprintln!("{e}"),
    }
}
