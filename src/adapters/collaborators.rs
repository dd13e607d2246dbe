use crate::domain::model::{Principal, UserInfo};
use crate::domain::ports::{MailSender, TokenIssuer, UserDirectory};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Opaque random tokens remembered until they expire.
pub struct InMemoryTokenIssuer {
    ttl: Duration,
    tokens: Mutex<HashMap<String, (String, DateTime<Utc>)>>,
}

impl InMemoryTokenIssuer {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            tokens: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl TokenIssuer for InMemoryTokenIssuer {
    async fn issue_token(&self, email: &str) -> Result<String> {
        let token = Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + self.ttl;

        let mut tokens = self.tokens.lock().await;
        tokens.retain(|_, (_, expiry)| *expiry > Utc::now());
        tokens.insert(token.clone(), (email.to_string(), expires_at));
        Ok(token)
    }

    async fn verify_token(&self, token: &str) -> Result<Option<Principal>> {
        let tokens = self.tokens.lock().await;
        Ok(tokens
            .get(token)
            .filter(|(_, expiry)| *expiry > Utc::now())
            .map(|(email, _)| Principal {
                email: email.clone(),
            }))
    }
}

pub struct StaticUserDirectory {
    users: HashMap<String, UserInfo>,
}

impl StaticUserDirectory {
    pub fn new(users: impl IntoIterator<Item = UserInfo>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.email.clone(), u)).collect(),
        }
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn lookup_user(&self, email: &str) -> Result<Option<UserInfo>> {
        Ok(self.users.get(email).cloned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Logs mail instead of delivering it and keeps a copy in an outbox.
pub struct LogMailSender {
    sender: String,
    outbox: Mutex<Vec<OutgoingMail>>,
}

impl LogMailSender {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            outbox: Mutex::new(Vec::new()),
        }
    }

    pub async fn outbox(&self) -> Vec<OutgoingMail> {
        self.outbox.lock().await.clone()
    }
}

#[async_trait]
impl MailSender for LogMailSender {
    async fn send_mail(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        tracing::info!(from = %self.sender, to, subject, "Mail queued");
        tracing::debug!(body, "Mail body");
        self.outbox.lock().await.push(OutgoingMail {
            from: self.sender.clone(),
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
