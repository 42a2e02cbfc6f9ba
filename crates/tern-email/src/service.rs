use crate::EmailError;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tern_core::{DraftRecord, EmailPage, OutgoingEmail};

#[derive(Debug, Clone)]
pub struct MailApiConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for MailApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://mail.ternmail.example/api".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CategoryListing {
    #[serde(default)]
    categories: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct DraftListing {
    #[serde(default)]
    drafts: Vec<DraftRecord>,
}

/// Typed client for the mail backend's JSON routes. Thin by design: the
/// backend owns storage and categorization, this side only fetches, sends,
/// and saves drafts.
#[derive(Clone, Debug)]
pub struct MailApi {
    base: Url,
    http: reqwest::Client,
}

impl MailApi {
    pub fn new(config: MailApiConfig) -> Result<Self, EmailError> {
        let base =
            Url::parse(&config.base_url).map_err(|err| EmailError::Config(err.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| EmailError::Config(err.to_string()))?;

        Ok(Self { base, http })
    }

    /// `GET {base}/emails`.
    pub async fn list_emails(&self) -> Result<EmailPage, EmailError> {
        let url = self.endpoint(&["emails"])?;
        let page: EmailPage = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        tracing::debug!(count = page.emails.len(), total = page.total, "fetched inbox page");
        Ok(page)
    }

    /// `GET {base}/emails/category/{category}`. The category lands in its
    /// own path segment, percent-encoded.
    pub async fn list_emails_in_category(&self, category: &str) -> Result<EmailPage, EmailError> {
        let url = self.endpoint(&["emails", "category", category])?;
        Ok(self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    /// `GET {base}/emails/categories`.
    pub async fn list_categories(&self) -> Result<Vec<String>, EmailError> {
        let url = self.endpoint(&["emails", "categories"])?;
        let listing: CategoryListing = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(listing.categories)
    }

    /// `POST {base}/emails/send`. Success is opaque; the backend keeps
    /// whatever record it wants.
    pub async fn send(&self, outgoing: &OutgoingEmail) -> Result<(), EmailError> {
        let url = self.endpoint(&["emails", "send"])?;
        self.http
            .post(url)
            .json(outgoing)
            .send()
            .await?
            .error_for_status()?;
        tracing::info!(to = %outgoing.to, "sent email");
        Ok(())
    }

    /// `POST {base}/emails/drafts`.
    pub async fn create_draft(&self, draft: &DraftRecord) -> Result<(), EmailError> {
        let url = self.endpoint(&["emails", "drafts"])?;
        self.http
            .post(url)
            .json(draft)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// `GET {base}/emails/drafts`.
    pub async fn list_drafts(&self) -> Result<Vec<DraftRecord>, EmailError> {
        let url = self.endpoint(&["emails", "drafts"])?;
        let listing: DraftListing = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(listing.drafts)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, EmailError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| EmailError::Config("mail api base url cannot be a base".to_string()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::{MailApi, MailApiConfig};
    use crate::EmailError;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;
    use tern_core::OutgoingEmail;

    fn api_for(server: &mockito::ServerGuard) -> MailApi {
        MailApi::new(MailApiConfig {
            base_url: server.url(),
            request_timeout: Duration::from_secs(5),
        })
        .expect("mail api")
    }

    #[tokio::test]
    async fn list_emails_parses_the_page_envelope() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/emails")
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "emails": [
                        {
                            "sender": "ana@example.com",
                            "subject": "Quarterly report",
                            "body": "Please review the attached report.",
                            "category": "Work / Professional",
                            "timestamp": "2025-06-01T09:30:00Z"
                        },
                        {
                            "sender": "noreply@shop.example",
                            "subject": "Your order shipped",
                            "body": "Tracking inside."
                        }
                    ],
                    "total": 2
                }"#,
            )
            .create_async()
            .await;

        let page = api_for(&server).list_emails().await.expect("page");
        assert_eq!(page.total, 2);
        assert_eq!(page.emails.len(), 2);
        assert_eq!(page.emails[0].sender, "ana@example.com");
        assert_eq!(
            page.emails[0].timestamp,
            Some(Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap())
        );
        // Missing category and timestamp fall back to defaults.
        assert_eq!(page.emails[1].category, "");
        assert_eq!(page.emails[1].timestamp, None);
    }

    #[tokio::test]
    async fn category_route_percent_encodes_the_label() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/emails/category/Work%20%2F%20Professional")
            .with_header("content-type", "application/json")
            .with_body(r#"{"emails": [], "total": 0}"#)
            .create_async()
            .await;

        let page = api_for(&server)
            .list_emails_in_category("Work / Professional")
            .await
            .expect("page");

        mock.assert_async().await;
        assert!(page.emails.is_empty());
    }

    #[tokio::test]
    async fn send_posts_the_outgoing_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/emails/send")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "to": "ana@example.com",
                "subject": "Re: Quarterly report",
                "body": "Will do.",
            })))
            .with_body(r#"{"status": "sent"}"#)
            .create_async()
            .await;

        api_for(&server)
            .send(&OutgoingEmail {
                to: "ana@example.com".to_string(),
                subject: "Re: Quarterly report".to_string(),
                body: "Will do.".to_string(),
            })
            .await
            .expect("send");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn list_categories_unwraps_the_listing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/emails/categories")
            .with_header("content-type", "application/json")
            .with_body(r#"{"categories": ["Finance", "Personal"]}"#)
            .create_async()
            .await;

        let categories = api_for(&server).list_categories().await.expect("categories");
        assert_eq!(categories, vec!["Finance", "Personal"]);
    }

    #[tokio::test]
    async fn list_drafts_unwraps_the_listing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/emails/drafts")
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"drafts": [{"to": "ana@example.com", "subject": "Draft", "body": "wip"}]}"#,
            )
            .create_async()
            .await;

        let drafts = api_for(&server).list_drafts().await.expect("drafts");
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].subject, "Draft");
    }

    #[tokio::test]
    async fn server_errors_classify_as_transport() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/emails")
            .with_status(502)
            .create_async()
            .await;

        let err = api_for(&server).list_emails().await.expect_err("bad gateway");
        assert!(matches!(err, EmailError::Transport(_)));
    }

    #[test]
    fn rejects_an_unparseable_base_url() {
        let err = MailApi::new(MailApiConfig {
            base_url: "not a url".to_string(),
            request_timeout: Duration::from_secs(5),
        })
        .expect_err("invalid base");
        assert!(matches!(err, EmailError::Config(_)));
    }
}
