// ABOUTME: Completion email for finished driver runs, sent over SMTP.
// ABOUTME: Plain body plus the run log as a text attachment.

use std::fs;
use std::path::Path;

use anyhow::Context;
use lettre::message::{header, Attachment, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};
use tracing::info;

use crate::config::NotificationConfig;

/// One-shot mailer for the end-of-run email.
pub struct Notifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl Notifier {
    pub fn new(config: &NotificationConfig) -> anyhow::Result<Self> {
        let mut builder = if config.smtp_ssl {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_server)
                .with_context(|| format!("invalid smtp_server {:?}", config.smtp_server))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_server)
        };
        builder = builder.port(config.smtp_port);
        if !config.smtp_user.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_user.clone(),
                config.smtp_pass.clone(),
            ));
        }

        let from: Mailbox = config
            .email_from
            .parse()
            .with_context(|| format!("invalid email_from {:?}", config.email_from))?;
        let mut to = Vec::new();
        for addr in config.email_to.split(',') {
            let addr = addr.trim();
            if addr.is_empty() {
                continue;
            }
            to.push(
                addr.parse()
                    .with_context(|| format!("invalid email_to entry {:?}", addr))?,
            );
        }
        if to.is_empty() {
            anyhow::bail!("email_to names no recipients");
        }

        Ok(Self {
            mailer: builder.build(),
            from,
            to,
        })
    }

    /// Send the completion email, attaching the run log when one is given.
    pub async fn send(
        &self,
        subject: &str,
        body: &str,
        attachment: Option<&Path>,
    ) -> anyhow::Result<()> {
        info!("Sending email: [{}] to {:?}", subject, self.recipients());
        let msg = self.message(subject, body, attachment)?;
        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }

    fn recipients(&self) -> Vec<String> {
        self.to.iter().map(|mailbox| mailbox.to_string()).collect()
    }

    fn message(
        &self,
        subject: &str,
        body: &str,
        attachment: Option<&Path>,
    ) -> anyhow::Result<Message> {
        let mut builder = Message::builder().from(self.from.clone()).subject(subject);
        for mailbox in &self.to {
            builder = builder.to(mailbox.clone());
        }

        let msg = match attachment {
            Some(path) => {
                let log = fs::read_to_string(path)
                    .with_context(|| format!("read log attachment {}", path.display()))?;
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "run.log".to_string());
                builder
                    .multipart(
                        MultiPart::mixed()
                            .singlepart(
                                SinglePart::builder()
                                    .header(header::ContentType::TEXT_PLAIN)
                                    .body(body.to_string()),
                            )
                            .singlepart(
                                Attachment::new(name)
                                    .body(log, header::ContentType::TEXT_PLAIN),
                            ),
                    )
                    .context("build email")?
            }
            None => builder
                .header(header::ContentType::TEXT_PLAIN)
                .body(body.to_string())
                .context("build email")?,
        };
        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn config() -> NotificationConfig {
        NotificationConfig {
            smtp_server: "smtp.example.com".into(),
            smtp_port: 25,
            smtp_user: String::new(),
            smtp_pass: String::new(),
            smtp_ssl: false,
            email_from: "robot@example.com".into(),
            email_to: "a@example.com, b@example.com,".into(),
        }
    }

    #[test]
    fn recipients_come_from_the_comma_list() {
        let notifier = Notifier::new(&config()).unwrap();
        assert_eq!(notifier.to.len(), 2);
        let raw = notifier.message("done", "all good", None).unwrap().formatted();
        let raw = String::from_utf8_lossy(&raw).into_owned();
        assert!(raw.contains("Subject: done"));
        assert!(raw.contains("a@example.com"));
        assert!(raw.contains("b@example.com"));
        assert!(raw.contains("all good"));
    }

    #[test]
    fn log_file_rides_along_as_attachment() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join("top10-20120305120000.log");
        let mut file = std::fs::File::create(&log_path).unwrap();
        writeln!(file, "scraped 10 records").unwrap();

        let notifier = Notifier::new(&config()).unwrap();
        let raw = notifier
            .message("done", "see log", Some(&log_path))
            .unwrap()
            .formatted();
        let raw = String::from_utf8_lossy(&raw).into_owned();
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("top10-20120305120000.log"));
        assert!(raw.contains("scraped 10 records"));
    }

    #[test]
    fn empty_recipient_list_is_rejected() {
        let mut bad = config();
        bad.email_to = " , ".into();
        assert!(Notifier::new(&bad).is_err());
    }

    #[test]
    fn bad_addresses_are_rejected() {
        let mut bad = config();
        bad.email_from = "not an address".into();
        assert!(Notifier::new(&bad).is_err());
    }
}
