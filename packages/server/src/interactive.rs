//! Interactive mode for the server.
//!
//! Prompts for the data directory, bind address and port before starting
//! the server.

use dialoguer::{Confirm, Input};

use crate::ServerConfig;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Starts from [`ServerConfig::from_env`], lets the user override the data
/// directory, bind address and port, and delegates to
/// [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Mobility Map Server");
    println!();

    let mut config = ServerConfig::from_env();

    let data_dir: String = Input::new()
        .with_prompt("Data directory")
        .default(config.data_dir.display().to_string())
        .interact_text()
        .unwrap_or_else(|_| config.data_dir.display().to_string());
    config.data_dir = data_dir.into();

    config.bind_addr = Input::new()
        .with_prompt("Bind address")
        .default(config.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| config.bind_addr.clone());

    config.port = Input::new()
        .with_prompt("Port")
        .default(config.port)
        .interact_text()
        .unwrap_or(config.port);

    if !Confirm::new()
        .with_prompt(format!(
            "Start server on {}:{} with data from {}?",
            config.bind_addr,
            config.port,
            config.data_dir.display()
        ))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(config).await
}
