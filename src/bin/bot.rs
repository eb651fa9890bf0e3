//! Telegram frontend: one command, one button. The bot never touches the
//! database; it only hands the user a deep link into the web client.

use std::env;

use dotenv::dotenv;
use teloxide::prelude::*;
use teloxide::types::{ButtonRequest, KeyboardButton, KeyboardMarkup, WebAppInfo};
use teloxide::utils::command::BotCommands;
use tracing_subscriber::EnvFilter;
use url::Url;

const DEFAULT_WEBAPP_URL: &str = "https://novels-reader-beta.vercel.app";

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
enum Command {
    #[command(description = "открыть читалку")]
    Start,
}

fn webapp_url() -> Url {
    env::var("WEBAPP_URL")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_else(|| Url::parse(DEFAULT_WEBAPP_URL).expect("default URL is valid"))
}

async fn answer(bot: Bot, message: Message, command: Command) -> ResponseResult<()> {
    match command {
        Command::Start => {
            let open_button = KeyboardButton::new("Открыть читалку")
                .request(ButtonRequest::WebApp(WebAppInfo { url: webapp_url() }));
            let keyboard = KeyboardMarkup::new([[open_button]]).resize_keyboard(true);
            bot.send_message(
                message.chat.id,
                "Добро пожаловать в Novels Reader! Нажмите кнопку ниже, чтобы открыть приложение:",
            )
            .reply_markup(keyboard)
            .await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let token = env::var("BOT_TOKEN").expect("BOT_TOKEN must be set");
    let bot = Bot::new(token);
    tracing::info!("bot is polling");
    Command::repl(bot, answer).await;
}
