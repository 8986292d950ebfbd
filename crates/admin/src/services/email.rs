//! Email service for sending quote emails with bank-transfer instructions.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use thiserror::Error;

use fagot_core::types::format_eur;

use crate::config::EmailConfig;

/// Everything the quote templates need.
pub struct QuoteEmail<'a> {
    pub customer_name: &'a str,
    pub order_number: &'a str,
    pub amount: Decimal,
    pub account_holder: &'a str,
    pub iban: &'a str,
    pub bic: &'a str,
    pub company_name: &'a str,
    pub note: Option<&'a str>,
}

/// HTML template for the quote email.
#[derive(Template)]
#[template(path = "email/quote.html")]
struct QuoteEmailHtml<'a> {
    quote: &'a QuoteEmail<'a>,
    amount: String,
}

/// Plain text template for the quote email.
#[derive(Template)]
#[template(path = "email/quote.txt")]
struct QuoteEmailText<'a> {
    quote: &'a QuoteEmail<'a>,
    amount: String,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send a quote email with the amount and bank-transfer instructions.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_quote(&self, to: &str, quote: &QuoteEmail<'_>) -> Result<(), EmailError> {
        let amount = format_eur(quote.amount);
        let html = QuoteEmailHtml {
            quote,
            amount: amount.clone(),
        }
        .render()?;
        let text = QuoteEmailText { quote, amount }.render()?;
        let subject = format!("Votre devis {} - {}", quote.order_number, quote.company_name);

        self.send_multipart_email(to, &subject, &text, &html).await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample<'a>() -> QuoteEmail<'a> {
        QuoteEmail {
            customer_name: "Marie Dupont",
            order_number: "CMD25081442000",
            amount: Decimal::new(27800, 2),
            account_holder: "Fagot SARL",
            iban: "FR76 3000 4000 0100 0001 2345 678",
            bic: "BNPAFRPP",
            company_name: "Fagot",
            note: Some("Livraison sous 10 jours"),
        }
    }

    #[test]
    fn test_quote_templates_render() {
        let quote = sample();
        let amount = format_eur(quote.amount);
        let html = QuoteEmailHtml {
            quote: &quote,
            amount: amount.clone(),
        }
        .render()
        .expect("html");
        let text = QuoteEmailText {
            quote: &quote,
            amount,
        }
        .render()
        .expect("text");

        for body in [&html, &text] {
            assert!(body.contains("CMD25081442000"));
            assert!(body.contains("278.00 €"));
            assert!(body.contains("FR76 3000 4000 0100 0001 2345 678"));
            assert!(body.contains("Livraison sous 10 jours"));
        }
    }

    #[test]
    fn test_quote_text_template_omits_missing_note() {
        let mut quote = sample();
        quote.note = None;
        let text = QuoteEmailText {
            quote: &quote,
            amount: format_eur(quote.amount),
        }
        .render()
        .expect("text");
        assert!(!text.contains("Livraison"));
    }
}
