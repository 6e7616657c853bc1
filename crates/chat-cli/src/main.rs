mod cli;
mod client;
mod session;

use std::io::Write;

use cli::{CliError, CliOptions};
use client::ChatApiClient;
use session::{InputAction, assistant_line, classify_input, render_ask, render_history};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "chat_cli=warn".to_string()))
        .with_writer(std::io::stderr)
        .init();

    let options = match CliOptions::parse(
        std::env::args().skip(1),
        std::env::var("CHAT_API_URL").ok(),
    ) {
        Ok(options) => options,
        Err(CliError::HelpRequested) => {
            print_usage();
            std::process::exit(0);
        }
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!();
            print_usage();
            std::process::exit(2);
        }
    };

    let client = match ChatApiClient::new(&options.api_url) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    };

    match client.history().await {
        Ok(history) => {
            debug!(turns = history.len(), "loaded chat history");
            for line in render_history(&history) {
                println!("{line}\n");
            }
        }
        Err(err) => println!("{}\n", session::render_history_error(&err)),
    }

    println!("Connected to {} (type 'bye' to exit).", options.api_url);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        if let Err(err) = std::io::stdout().flush() {
            debug!(error = %err, "failed to flush prompt");
        }

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                println!();
                break;
            }
            Err(err) => {
                eprintln!("error: failed to read input: {err}");
                break;
            }
        };

        match classify_input(&line) {
            InputAction::Skip => continue,
            InputAction::Exit => {
                println!("{}", assistant_line("Bye!"));
                break;
            }
            InputAction::Send(prompt) => {
                let rendered = render_ask(client.ask(&prompt).await);
                println!("{rendered}\n");
            }
        }
    }
}

fn print_usage() {
    eprintln!(
        "Usage: chat-cli [--api-url URL]\n\
         \n\
         Options:\n\
         - --api-url URL  Chat backend base url (default: $CHAT_API_URL or http://localhost:8000)\n\
         - --help         Show this help text"
    );
}
