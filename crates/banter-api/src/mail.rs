use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use tracing::info;

/// SMTP settings, built by the server's config layer and passed in at
/// startup.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

/// Outbound mail seam. The OTP challenge service depends only on this trait;
/// tests substitute a recording implementation. Dispatch is awaited on the
/// issuance path and a failure aborts the challenge.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send_login_code(&self, to: &str, code: &str) -> Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .context("failed to configure SMTP relay")?
            .port(config.port);

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send_login_code(&self, to: &str, code: &str) -> Result<()> {
        let message = Message::builder()
            .from(self.from.parse().context("invalid From address")?)
            .to(to.parse().context("invalid To address")?)
            .subject("Your Banter login code")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Your login code is {code}. It expires in 5 minutes.\n\n\
                 If you did not request this code, you can ignore this email.\n"
            ))?;

        self.transport
            .send(message)
            .await
            .context("SMTP send failed")?;

        info!("Login code dispatched to {}", to);
        Ok(())
    }
}
