//! WhatsApp gateway over the Twilio REST API.
//!
//! The dispatcher and the HTTP handlers talk to the gateway through the
//! `Messenger` trait so tests can swap in a mock. The real gateway posts
//! to Twilio's Messages endpoint with HTTP basic auth and reports plain
//! success/failure; the caller decides what to persist.

use async_trait::async_trait;
use log::{error, warn};
use std::env;

const DEFAULT_FROM: &str = "whatsapp:+14155238886";

#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub enabled: bool,
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
}

impl WhatsAppConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: env::var("WHATSAPP_REMINDERS_ENABLED")
                .map(|v| v == "true")
                .unwrap_or(false),
            account_sid: env::var("TWILIO_ACCOUNT_SID").unwrap_or_default(),
            auth_token: env::var("TWILIO_AUTH_TOKEN").unwrap_or_default(),
            from: env::var("TWILIO_WHATSAPP_FROM").unwrap_or_else(|_| DEFAULT_FROM.to_string()),
        }
    }
}

/// Message transport seam. `send` returns whether the provider accepted
/// the message; transport errors are logged by the implementation.
#[async_trait]
pub trait Messenger: Send + Sync {
    fn enabled(&self) -> bool;
    async fn send(&self, to: &str, body: &str) -> bool;
}

pub struct WhatsAppGateway {
    config: WhatsAppConfig,
    client: reqwest::Client,
}

impl WhatsAppGateway {
    pub fn new(config: WhatsAppConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Enabled by flag AND fully configured with credentials.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
            && !self.config.account_sid.is_empty()
            && !self.config.auth_token.is_empty()
    }
}

#[async_trait]
impl Messenger for WhatsAppGateway {
    fn enabled(&self) -> bool {
        self.is_enabled()
    }

    async fn send(&self, to: &str, body: &str) -> bool {
        if !self.is_enabled() {
            warn!("Servicio de WhatsApp deshabilitado, no se envía mensaje a {}", to);
            return false;
        }
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account_sid
        );
        let form = [
            ("To", to),
            ("From", self.config.from.as_str()),
            ("Body", body),
        ];
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await;
        match response {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                warn!(
                    "Twilio rechazó el mensaje a {}: HTTP {}",
                    to,
                    resp.status()
                );
                false
            }
            Err(e) => {
                error!("Error de red enviando WhatsApp a {}: {}", to, e);
                false
            }
        }
    }
}

/// Normalizes a stored phone into a `whatsapp:+<e164>` address.
///
/// Separators (spaces, dashes, parentheses, dots) are stripped first, then
/// the cheapest rule that matches wins: already-prefixed numbers pass
/// through, `+` numbers get the prefix, `56...` numbers get `+`, local
/// 9-digit mobiles get `+56`, 8-digit numbers get `+569`, and anything
/// else is assumed to already carry its country code.
pub fn normalize_whatsapp_number(raw: &str) -> Result<String, String> {
    let limpio: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')' | '.'))
        .collect();
    if limpio.is_empty() {
        return Err("Número de teléfono vacío".to_string());
    }
    if limpio.starts_with("whatsapp:") {
        return Ok(limpio);
    }
    if let Some(resto) = limpio.strip_prefix('+') {
        return Ok(format!("whatsapp:+{}", resto));
    }
    if limpio.starts_with("56") && limpio.len() == 11 {
        return Ok(format!("whatsapp:+{}", limpio));
    }
    if limpio.len() == 9 && limpio.starts_with('9') {
        return Ok(format!("whatsapp:+56{}", limpio));
    }
    if limpio.len() == 8 {
        return Ok(format!("whatsapp:+569{}", limpio));
    }
    Ok(format!("whatsapp:+{}", limpio))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_mobile_gets_country_code() {
        assert_eq!(
            normalize_whatsapp_number("912345678").unwrap(),
            "whatsapp:+56912345678"
        );
    }

    #[test]
    fn eight_digit_number_gets_mobile_prefix() {
        assert_eq!(
            normalize_whatsapp_number("12345678").unwrap(),
            "whatsapp:+56912345678"
        );
    }

    #[test]
    fn international_forms_keep_their_code() {
        assert_eq!(
            normalize_whatsapp_number("+56912345678").unwrap(),
            "whatsapp:+56912345678"
        );
        assert_eq!(
            normalize_whatsapp_number("56912345678").unwrap(),
            "whatsapp:+56912345678"
        );
    }

    #[test]
    fn already_prefixed_passes_through() {
        assert_eq!(
            normalize_whatsapp_number("whatsapp:+56912345678").unwrap(),
            "whatsapp:+56912345678"
        );
    }

    #[test]
    fn separators_are_stripped() {
        assert_eq!(
            normalize_whatsapp_number("9 1234-5678").unwrap(),
            "whatsapp:+56912345678"
        );
        assert_eq!(
            normalize_whatsapp_number("(56) 9.1234.5678").unwrap(),
            "whatsapp:+56912345678"
        );
    }

    #[test]
    fn empty_number_is_an_error() {
        assert!(normalize_whatsapp_number("  ").is_err());
    }

    #[test]
    fn gateway_without_credentials_is_disabled() {
        let gateway = WhatsAppGateway::new(WhatsAppConfig {
            enabled: true,
            account_sid: String::new(),
            auth_token: String::new(),
            from: DEFAULT_FROM.to_string(),
        });
        assert!(!gateway.is_enabled());
    }

    #[tokio::test]
    async fn disabled_gateway_refuses_to_send() {
        let gateway = WhatsAppGateway::new(WhatsAppConfig {
            enabled: false,
            account_sid: "AC123".to_string(),
            auth_token: "secreto".to_string(),
            from: DEFAULT_FROM.to_string(),
        });
        // Returns false without touching the network.
        assert!(!gateway.send("whatsapp:+56912345678", "hola").await);
    }
}
