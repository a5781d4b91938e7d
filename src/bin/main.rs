use defi_assistant::{agent::MockAssistant, config::AssistantConfig};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Logs go to stderr so they don't interleave with the chat
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = AssistantConfig::from_env()?;
    let assistant = MockAssistant::from_config(&config);
    let user_id = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.default_user_id.clone());

    info!(%user_id, "DeFi assistant starting");

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(b"DeFi assistant ready. Type a message, or 'quit' to exit.\n\n> ")
        .await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if message.eq_ignore_ascii_case("quit") || message.eq_ignore_ascii_case("exit") {
            break;
        }
        if message.is_empty() {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;
            continue;
        }

        let reply = assistant.process_message(Some(&user_id), message, &[]).await?;
        let intent = reply
            .intent
            .map(|intent| format!(" [{}]", intent))
            .unwrap_or_default();

        stdout
            .write_all(format!("\n{}{}\n\n> ", reply.response, intent).as_bytes())
            .await?;
        stdout.flush().await?;
    }

    Ok(())
}
