use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use parlor_client::ui::{self, Command, Composer, ComposerEvent, Key};
use parlor_client::{ChatBackend, ChatController, LocalBackend, LocalStorage, RemoteBackend};

#[derive(Debug, Parser)]
#[command(name = "parlor-chat", about = "Terminal client for the Parlor chat server")]
struct Cli {
    /// Base URL of the Parlor server
    #[arg(long, env = "PARLOR_SERVER_URL", default_value = "http://localhost:5000")]
    server: String,

    /// Keep chat history in this file instead of on the server
    #[arg(long)]
    local: Option<PathBuf>,

    /// Screen width in columns
    #[arg(long, default_value_t = 80)]
    width: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so they do not interleave with the chat screen
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parlor_chat=info,parlor_client=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let remote = RemoteBackend::new(cli.server);

    match cli.local {
        Some(path) => {
            let backend = LocalBackend::new(remote, LocalStorage::new(path));
            run(ChatController::new(backend), cli.width).await
        }
        None => run(ChatController::new(remote), cli.width).await,
    }
}

async fn run<B: ChatBackend>(controller: ChatController<B>, width: usize) -> anyhow::Result<()> {
    // Failures already surface as the on-screen notice
    if let Err(e) = controller.start().await {
        debug!("Startup load failed: {}", e);
    }
    redraw(&controller, width);
    println!("{}", ui::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut composer = Composer::default();

    loop {
        composer.set_disabled(controller.snapshot().loading);
        print!("{}", ui::render_prompt(&composer));
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match Command::parse(&line) {
            Some(Command::Quit) => break,
            Some(Command::Help) => {
                println!("{}", ui::HELP);
                continue;
            }
            Some(Command::New) => controller.new_chat(),
            Some(Command::Chats) => {
                if let Err(e) = controller.refresh().await {
                    debug!("Refresh failed: {}", e);
                }
            }
            Some(Command::Open(n)) => {
                let chat_id = controller.snapshot().chats.get(n - 1).map(|c| c.id);
                match chat_id {
                    Some(chat_id) => {
                        if let Err(e) = controller.select_chat(chat_id).await {
                            debug!("Open failed: {}", e);
                        }
                    }
                    None => {
                        println!("No chat #{}", n);
                        continue;
                    }
                }
            }
            None => {
                // A trailing backslash stands in for Shift+Enter
                let (text, continued) = match line.strip_suffix('\\') {
                    Some(text) => (text, true),
                    None => (line.as_str(), false),
                };
                for c in text.chars() {
                    composer.handle_key(Key::Char(c));
                }

                composer.set_disabled(controller.snapshot().loading);
                match composer.handle_key(Key::Enter { shift: continued }) {
                    ComposerEvent::Submit(message) => {
                        if let Err(e) = controller.send_message(&message).await {
                            debug!("Send failed: {}", e);
                        }
                    }
                    _ => continue,
                }
            }
        }

        redraw(&controller, width);
        controller.dismiss_notice();
    }

    Ok(())
}

fn redraw<B: ChatBackend>(controller: &ChatController<B>, width: usize) {
    println!("\n{}", ui::render_screen(&controller.snapshot(), Utc::now(), width));
}
