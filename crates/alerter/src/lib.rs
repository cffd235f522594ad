use crate::error::AlerterError;
use async_trait::async_trait;
use configuration::MailSettings;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::path::Path;
pub mod error;

pub use lettre::Message;

/// Subject line of every report email.
pub const SUBJECT: &str = "Ежемесячный отчет по индикативным курсам валют";

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Anything that can deliver a finished message.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: Message) -> Result<(), AlerterError>;
}

/// Delivers over SMTP with implicit TLS, authenticating as the sender.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(settings: &MailSettings) -> Result<Self, AlerterError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.server)?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.sender.clone(),
                settings.password.clone(),
            ))
            .build();
        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: Message) -> Result<(), AlerterError> {
        let response = self.transport.send(message).await?;
        tracing::debug!(code = %response.code(), "SMTP server accepted the message.");
        Ok(())
    }
}

/// Emails a finished report to the configured recipient.
pub struct EmailNotifier {
    transport: Box<dyn MailTransport>,
    sender: Mailbox,
    recipient: Mailbox,
}

impl EmailNotifier {
    pub fn new(
        transport: Box<dyn MailTransport>,
        sender: &str,
        recipient: &str,
    ) -> Result<Self, AlerterError> {
        Ok(Self {
            transport,
            sender: sender.parse()?,
            recipient: recipient.parse()?,
        })
    }

    /// A notifier that talks to the SMTP server from `settings`.
    pub fn from_settings(settings: &MailSettings) -> Result<Self, AlerterError> {
        let mailer = SmtpMailer::new(settings)?;
        Self::new(Box::new(mailer), &settings.sender, &settings.recipient)
    }

    /// Builds the report email: a plain-text summary plus the spreadsheet attached.
    /// The row count comes from reading the file back, not from the caller.
    pub fn compose(&self, artifact_path: &Path) -> Result<(Message, usize), AlerterError> {
        let rows = report::count_data_rows(artifact_path)?;
        let content = std::fs::read(artifact_path)?;
        let filename = artifact_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report.xlsx".to_string());
        let content_type = ContentType::parse(XLSX_CONTENT_TYPE)
            .map_err(|e| AlerterError::Rejected(format!("invalid content type: {e}")))?;

        let message = Message::builder()
            .from(self.sender.clone())
            .to(self.recipient.clone())
            .subject(SUBJECT)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(body_text(rows)))
                    .singlepart(Attachment::new(filename).body(content, content_type)),
            )?;

        Ok((message, rows))
    }

    /// Composes and sends the report email. Returns the row count it announced.
    pub async fn notify(&self, artifact_path: &Path) -> Result<usize, AlerterError> {
        let (message, rows) = self.compose(artifact_path)?;
        tracing::info!(
            to = %self.recipient,
            path = %artifact_path.display(),
            rows,
            "Sending report email."
        );
        self.transport.send(message).await?;
        Ok(rows)
    }
}

/// The message body announcing how many rows the report has.
pub fn body_text(rows: usize) -> String {
    format!("Сгенерирован отчет размером {rows} {}.", row_noun(rows))
}

/// Russian grammatical number for "row".
pub fn row_noun(count: usize) -> &'static str {
    match (count % 10, count % 100) {
        (1, last_two) if last_two != 11 => "строка",
        (2..=4, last_two) if !(12..=14).contains(&last_two) => "строки",
        _ => "строк",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use core_types::{RateRecord, RateSeries, ReportPeriod};
    use report::{ReportArtifact, ReportRenderer};
    use rust_decimal_macros::dec;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct RecordingTransport {
        sent: Arc<Mutex<Vec<Message>>>,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, message: Message) -> Result<(), AlerterError> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }

    fn write_report(dir: &TempDir, rows: usize) -> PathBuf {
        let mut usd = RateSeries::new("USD/RUB".parse().unwrap());
        let mut jpy = RateSeries::new("JPY/RUB".parse().unwrap());
        for day in 1..=rows as u32 {
            let date = NaiveDate::from_ymd_opt(2026, 9, day).unwrap();
            let time = NaiveTime::from_hms_opt(18, 30, 0).unwrap();
            usd.push(RateRecord { date, time, value: dec!(90) });
            jpy.push(RateRecord { date, time, value: dec!(0.6) });
        }

        let period = ReportPeriod::for_month(2026, 9).unwrap();
        let artifact = ReportArtifact::new(dir.path(), &period);
        let renderer = ReportRenderer::default();
        renderer
            .render(&renderer.layout(&usd, &jpy), &period, &artifact)
            .unwrap();
        artifact.path().to_path_buf()
    }

    #[test]
    fn pluralizes_rows_like_russian_grammar() {
        assert_eq!(body_text(1), "Сгенерирован отчет размером 1 строка.");
        assert_eq!(body_text(2), "Сгенерирован отчет размером 2 строки.");
        assert_eq!(body_text(5), "Сгенерирован отчет размером 5 строк.");
        assert_eq!(body_text(11), "Сгенерирован отчет размером 11 строк.");
        assert_eq!(body_text(21), "Сгенерирован отчет размером 21 строка.");
    }

    #[test]
    fn teens_always_take_the_genitive_plural() {
        for count in [0, 11, 12, 13, 14, 111, 112, 25, 100] {
            assert_eq!(row_noun(count), "строк", "count {count}");
        }
        for count in [3, 4, 22, 23, 104] {
            assert_eq!(row_noun(count), "строки", "count {count}");
        }
        assert_eq!(row_noun(101), "строка");
    }

    #[test]
    fn rejects_invalid_addresses() {
        let transport = Box::new(RecordingTransport::default());
        assert!(matches!(
            EmailNotifier::new(transport, "not an address", "finance@example.com"),
            Err(AlerterError::Address(_))
        ));
    }

    #[test]
    fn composes_message_with_attachment_and_row_count() {
        let dir = TempDir::new().unwrap();
        let path = write_report(&dir, 3);
        let notifier = EmailNotifier::new(
            Box::new(RecordingTransport::default()),
            "reports@example.com",
            "finance@example.com",
        )
        .unwrap();

        let (message, rows) = notifier.compose(&path).unwrap();
        assert_eq!(rows, 3);
        assert_eq!(message.headers().get_raw("Subject"), Some(SUBJECT));

        let recipients: Vec<String> = message.envelope().to().iter().map(|a| a.to_string()).collect();
        assert_eq!(recipients, vec!["finance@example.com".to_string()]);

        let formatted = String::from_utf8_lossy(&message.formatted()).into_owned();
        assert!(formatted.contains("Report_2026-9.xlsx"));
        assert!(formatted.contains(XLSX_CONTENT_TYPE));
    }

    #[tokio::test]
    async fn notify_hands_the_message_to_the_transport() {
        let dir = TempDir::new().unwrap();
        let path = write_report(&dir, 2);
        let transport = RecordingTransport::default();
        let notifier = EmailNotifier::new(
            Box::new(transport.clone()),
            "reports@example.com",
            "finance@example.com",
        )
        .unwrap();

        let rows = notifier.notify(&path).await.unwrap();
        assert_eq!(rows, 2);
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_report_fails_before_sending() {
        let dir = TempDir::new().unwrap();
        let transport = RecordingTransport::default();
        let notifier = EmailNotifier::new(
            Box::new(transport.clone()),
            "reports@example.com",
            "finance@example.com",
        )
        .unwrap();

        assert!(notifier.notify(&dir.path().join("Report_2026-9.xlsx")).await.is_err());
        assert!(transport.sent.lock().unwrap().is_empty());
    }
}
