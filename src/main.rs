use std::io;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use schedule_assistant::chat::ChatLoop;
use schedule_assistant::client::client::OpenAIClient;
use schedule_assistant::config::Config;
use schedule_assistant::input::InputReader;
use schedule_assistant::logging;
use schedule_assistant::session::bootstrap;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    logging::init(config.verbose);

    let client = OpenAIClient::with_base_url(config.api_key()?, &config.base_url)?;
    let settings = config.session_settings();
    let session = bootstrap(&client, &settings)
        .await
        .with_context(|| format!("starting session with {}", settings.file_path.display()))?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let chat = ChatLoop::new(client, session, config.poll_policy(), cancel.clone());
    let mut input = InputReader::stdin();
    chat.run(&mut input, &mut io::stdout()).await?;

    if cancel.is_cancelled() {
        // the blocking stdin read would otherwise hold up runtime shutdown
        std::process::exit(0);
    }
    Ok(())
}
