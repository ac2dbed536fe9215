use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};

use crate::config::EmailConfig;
use crate::error::DigestError;

/// Delivers a finished report.
pub trait Mailer {
    fn send(&self, subject: &str, body: &str) -> Result<(), DigestError>;
}

/// Authenticated STARTTLS delivery to a single fixed recipient.
pub struct SmtpMailer {
    host: String,
    port: u16,
    sender: String,
    recipient: String,
    password: String,
    accept_invalid_certs: bool,
}

impl SmtpMailer {
    /// Build from config, reading the password from the environment.
    pub fn from_config(config: &EmailConfig) -> Self {
        Self::with_password(config, config.password())
    }

    pub fn with_password(config: &EmailConfig, password: String) -> Self {
        SmtpMailer {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            sender: config.sender.clone(),
            recipient: config.recipient.clone(),
            password,
            accept_invalid_certs: config.accept_invalid_certs,
        }
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, subject: &str, body: &str) -> Result<(), DigestError> {
        if self.sender.is_empty() || self.password.is_empty() {
            return Err(DigestError::EmailSend(
                "SMTP sender address or password not configured".into(),
            ));
        }

        let email = build_message(&self.sender, &self.recipient, subject, body)?;
        send_smtp(
            &self.host,
            self.port,
            &self.sender,
            &self.password,
            self.accept_invalid_certs,
            &email,
        )
    }
}

/// Compose a plain-text message.
pub fn build_message(
    from: &str,
    to: &str,
    subject: &str,
    body: &str,
) -> Result<Message, DigestError> {
    Message::builder()
        .from(
            from.parse()
                .map_err(|e| DigestError::EmailSend(format!("Invalid from address: {}", e)))?,
        )
        .to(to
            .parse()
            .map_err(|e| DigestError::EmailSend(format!("Invalid to address: {}", e)))?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .map_err(|e| DigestError::EmailSend(format!("Failed to build email: {}", e)))
}

fn send_smtp(
    host: &str,
    port: u16,
    username: &str,
    password: &str,
    accept_invalid_certs: bool,
    email: &Message,
) -> Result<(), DigestError> {
    let creds = Credentials::new(username.to_string(), password.to_string());

    let mut builder = SmtpTransport::starttls_relay(host)
        .map_err(|e| DigestError::EmailSend(format!("SMTP relay error: {}", e)))?
        .port(port)
        .credentials(creds);

    if accept_invalid_certs {
        let params = TlsParameters::builder(host.to_string())
            .dangerous_accept_invalid_certs(true)
            .build()
            .map_err(|e| DigestError::EmailSend(format!("TLS setup error: {}", e)))?;
        builder = builder.tls(Tls::Required(params));
    }

    builder
        .build()
        .send(email)
        .map_err(|e| DigestError::EmailSend(format!("SMTP send error: {}", e)))?;
    Ok(())
}
