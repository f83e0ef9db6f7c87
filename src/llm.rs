use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde_json::json;

use crate::config::Config;

const SIMULATED_REPLY: &str = "yes";
const SIMULATED_DELAY: Duration = Duration::from_secs(1);

/// Client for the text-generation endpoint. One synchronous request per
/// prompt; failures surface as `Err` and the caller decides how to degrade.
pub struct LlmClient {
    http: Client,
    generation_url: String,
    model: String,
    api_key: Option<String>,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .user_agent("paper-daily/0.1")
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            generation_url: config.generation_url.clone(),
            model: config.model.clone(),
            api_key: config.credential().map(str::to_string),
        })
    }

    /// True when no usable credential is configured and every reply is a
    /// canned stand-in. Keeps the whole pipeline runnable offline.
    pub fn is_simulated(&self) -> bool {
        self.api_key.is_none()
    }

    pub fn complete(&self, prompt: &str) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            eprintln!("warning: no model credential configured, using simulated reply");
            thread::sleep(SIMULATED_DELAY);
            return Ok(SIMULATED_REPLY.to_string());
        };

        let body = json!({
            "model": self.model,
            "input": {
                "messages": [
                    { "role": "user", "content": prompt }
                ]
            },
            "parameters": {
                "temperature": 0.1,
                "top_p": 0.9,
                "result_format": "message"
            }
        });

        let response = self
            .http
            .post(&self.generation_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .context("send generation request")?;
        let status = response.status();
        let text = response.text().context("read generation response body")?;
        if !status.is_success() {
            bail!("generation request failed: {status} {text}");
        }

        let value: serde_json::Value =
            serde_json::from_str(&text).context("parse generation response")?;
        let content = value
            .get("output")
            .and_then(|output| output.get("choices"))
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str());
        match content {
            Some(reply) => Ok(reply.to_string()),
            None => bail!("generation response missing message content"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_yields_simulated_replies() {
        let client = LlmClient::new(&Config::default()).unwrap();
        assert!(client.is_simulated());
        assert_eq!(client.complete("anything").unwrap(), "yes");
    }
}
