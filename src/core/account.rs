use crate::domain::model::{Principal, UserInfo};
use crate::domain::ports::{MailSender, TokenIssuer, UserDirectory};
use crate::utils::error::{ParkingError, Result};
use std::sync::Arc;

pub const RECOVERY_MAIL_SUBJECT: &str = "Password recovery mail";

pub fn recovery_mail_content(recovery_base_url: &str, token: &str) -> String {
    let base = recovery_base_url.trim_end_matches('/');
    format!(
        "You asked to reset the password of your parking account.\n\
         Follow this link to choose a new one:\n\
         {}/recover-password?token={}\n\
         If you did not ask for it, ignore this mail.",
        base, token
    )
}

/// Mails a recovery token to a registered user.
pub struct PasswordRecovery<U: UserDirectory, T: TokenIssuer, M: MailSender> {
    directory: Arc<U>,
    issuer: Arc<T>,
    mailer: Arc<M>,
    recovery_base_url: String,
}

impl<U: UserDirectory, T: TokenIssuer, M: MailSender> PasswordRecovery<U, T, M> {
    pub fn new(
        directory: Arc<U>,
        issuer: Arc<T>,
        mailer: Arc<M>,
        recovery_base_url: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            issuer,
            mailer,
            recovery_base_url: recovery_base_url.into(),
        }
    }

    pub async fn recover(&self, email: &str) -> Result<()> {
        if self.directory.lookup_user(email).await?.is_none() {
            tracing::warn!(email, "Password recovery for unknown user");
            return Err(ParkingError::UserNotFound {
                email: email.to_string(),
            });
        }

        let token = self.issuer.issue_token(email).await?;
        self.mailer
            .send_mail(
                email,
                RECOVERY_MAIL_SUBJECT,
                &recovery_mail_content(&self.recovery_base_url, &token),
            )
            .await?;
        tracing::info!(email, "Password recovery mail sent");
        Ok(())
    }
}

pub struct Authenticator<T: TokenIssuer> {
    issuer: Arc<T>,
}

impl<T: TokenIssuer> Authenticator<T> {
    pub fn new(issuer: Arc<T>) -> Self {
        Self { issuer }
    }

    pub async fn authenticate(&self, token: &str) -> Result<Principal> {
        match self.issuer.verify_token(token).await? {
            Some(principal) if !principal.email.is_empty() => Ok(principal),
            _ => {
                tracing::debug!("Token rejected");
                Err(ParkingError::Unauthorized)
            }
        }
    }
}

pub async fn user_info<U: UserDirectory + ?Sized>(
    directory: &U,
    email: &str,
) -> Result<Option<UserInfo>> {
    directory.lookup_user(email).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    struct OneUser;

    #[async_trait]
    impl UserDirectory for OneUser {
        async fn lookup_user(&self, email: &str) -> Result<Option<UserInfo>> {
            Ok((email == "ada@parking.example").then(|| UserInfo {
                email: email.to_string(),
                name: "Ada".to_string(),
                surname: None,
            }))
        }
    }

    struct FixedIssuer {
        principal_email: String,
    }

    #[async_trait]
    impl TokenIssuer for FixedIssuer {
        async fn issue_token(&self, _email: &str) -> Result<String> {
            Ok("tok-123".to_string())
        }

        async fn verify_token(&self, token: &str) -> Result<Option<Principal>> {
            Ok((token == "tok-123").then(|| Principal {
                email: self.principal_email.clone(),
            }))
        }
    }

    #[derive(Default)]
    struct CapturingMailer {
        sent: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl MailSender for CapturingMailer {
        async fn send_mail(&self, to: &str, subject: &str, body: &str) -> Result<()> {
            self.sent
                .lock()
                .await
                .push((to.to_string(), subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn recovery(mailer: Arc<CapturingMailer>) -> PasswordRecovery<OneUser, FixedIssuer, CapturingMailer> {
        PasswordRecovery::new(
            Arc::new(OneUser),
            Arc::new(FixedIssuer {
                principal_email: "ada@parking.example".to_string(),
            }),
            mailer,
            "https://parking.example/",
        )
    }

    #[tokio::test]
    async fn test_recover_sends_token_mail() {
        let mailer = Arc::new(CapturingMailer::default());
        recovery(Arc::clone(&mailer))
            .recover("ada@parking.example")
            .await
            .unwrap();

        let sent = mailer.sent.lock().await;
        assert_eq!(sent.len(), 1);
        let (to, subject, body) = &sent[0];
        assert_eq!(to, "ada@parking.example");
        assert_eq!(subject, RECOVERY_MAIL_SUBJECT);
        assert!(body.contains("https://parking.example/recover-password?token=tok-123"));
    }

    #[tokio::test]
    async fn test_recover_unknown_user_sends_nothing() {
        let mailer = Arc::new(CapturingMailer::default());
        let result = recovery(Arc::clone(&mailer)).recover("who@parking.example").await;

        assert!(matches!(result, Err(ParkingError::UserNotFound { .. })));
        assert!(mailer.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_authenticate() {
        let auth = Authenticator::new(Arc::new(FixedIssuer {
            principal_email: "ada@parking.example".to_string(),
        }));
        assert_eq!(
            auth.authenticate("tok-123").await.unwrap().email,
            "ada@parking.example"
        );
        assert!(matches!(
            auth.authenticate("forged").await,
            Err(ParkingError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_empty_email_claim() {
        let auth = Authenticator::new(Arc::new(FixedIssuer {
            principal_email: String::new(),
        }));
        assert!(matches!(
            auth.authenticate("tok-123").await,
            Err(ParkingError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_user_info() {
        let info = user_info(&OneUser, "ada@parking.example").await.unwrap();
        assert_eq!(info.map(|i| i.name), Some("Ada".to_string()));
        assert_eq!(user_info(&OneUser, "x@y.z").await.unwrap(), None);
    }
}
