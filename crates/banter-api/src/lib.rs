pub mod auth;
pub mod error;
pub mod friends;
pub mod mail;
pub mod messages;
pub mod middleware;
pub mod otp;
pub mod session;

#[cfg(test)]
pub(crate) mod testutil {
    use std::sync::{Arc, Mutex};

    use anyhow::Result;
    use async_trait::async_trait;

    use crate::auth::{AppState, AppStateInner};
    use crate::mail::MailTransport;
    use crate::session::SessionService;

    /// Captures outbound login codes instead of talking SMTP.
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl MailTransport for RecordingMailer {
        async fn send_login_code(&self, to: &str, code: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), code.to_string()));
            Ok(())
        }
    }

    pub fn test_state() -> (AppState, Arc<RecordingMailer>) {
        let mailer = Arc::new(RecordingMailer::default());
        let state = Arc::new(AppStateInner {
            db: banter_db::Database::open_in_memory().unwrap(),
            sessions: SessionService::new("test-secret", false),
            mailer: mailer.clone(),
        });
        (state, mailer)
    }
}
