use std::env;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_SUBSTACK_ACCOUNTS_PATH: &str = "config/substack_accounts.yaml";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub openai_api_key: String,
    pub openai_org_id: Option<String>,
    pub openai_model: String,
    pub openai_temperature: f32,
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub telegram_webhook_secret: Option<String>,
    pub x_api_key: String,
    pub x_api_secret: String,
    pub x_access_token: String,
    pub x_access_token_secret: String,
    pub processing_queue_url: Option<String>,
    pub juggernaut_signing_secret: Option<String>,
    pub substack_accounts_path: String,
}

fn required(name: &str) -> Result<String, String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(format!("{name}: environment variable is empty")),
        Err(e) => Err(format!("{name}: {e}")),
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let openai_temperature = match optional("OPENAI_TEMPERATURE") {
            Some(raw) => raw
                .trim()
                .parse::<f32>()
                .map_err(|e| format!("OPENAI_TEMPERATURE: {e}"))?,
            None => DEFAULT_OPENAI_TEMPERATURE,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_org_id: optional("OPENAI_ORG_ID"),
            openai_model: optional("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_temperature,
            telegram_bot_token: required("TELEGRAM_BOT_TOKEN")?,
            telegram_chat_id: required("TELEGRAM_CHAT_ID")?,
            telegram_webhook_secret: optional("TELEGRAM_WEBHOOK_SECRET"),
            x_api_key: required("API_Key")?,
            x_api_secret: required("API_Key_Secret")?,
            x_access_token: required("Access_Token")?,
            x_access_token_secret: required("Access_Token_Secret")?,
            processing_queue_url: optional("PROCESSING_QUEUE_URL"),
            juggernaut_signing_secret: optional("JUGGERNAUT_SIGNING_SECRET"),
            substack_accounts_path: optional("SUBSTACK_ACCOUNTS_PATH")
                .unwrap_or_else(|| DEFAULT_SUBSTACK_ACCOUNTS_PATH.to_string()),
        })
    }

    /// The API function cannot acknowledge webhooks without somewhere to queue them.
    pub fn require_queue_url(&self) -> Result<&str, String> {
        self.processing_queue_url
            .as_deref()
            .ok_or_else(|| "PROCESSING_QUEUE_URL: environment variable not present".to_string())
    }
}
