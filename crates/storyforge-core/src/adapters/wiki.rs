//! Confluence page adapter.
//!
//! Users paste either the site root or the full `/wiki` path from their
//! browser; one trailing slash is stripped and `/wiki` appended when absent
//! so both forms reach the same REST route. Cloud sites want Basic auth
//! with an account email; a PAT-only setup sends the token as Bearer.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::debug;

use super::{classify_response, transport_error, Wiki};
use crate::config::WikiSettings;
use crate::document::Document;
use crate::error::{CoreError, Result};

// ---------------------------------------------------------------------------
// ConfluenceWiki
// ---------------------------------------------------------------------------

pub struct ConfluenceWiki {
    http: reqwest::Client,
    base_url: String,
    user: String,
    token: String,
}

impl ConfluenceWiki {
    pub fn new(settings: &WikiSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: normalize_base_url(&settings.base_url),
            user: settings.user.clone(),
            token: settings.token.clone(),
        }
    }
}

#[async_trait]
impl Wiki for ConfluenceWiki {
    async fn fetch_page(&self, id: &str) -> Result<Document> {
        let what = format!("wiki page {id}");
        let url = format!("{}/rest/api/content/{id}", self.base_url);
        let req = self
            .http
            .get(&url)
            .query(&[("expand", "body.storage")])
            .header(ACCEPT, "application/json");
        let req = if self.user.is_empty() {
            req.bearer_auth(&self.token)
        } else {
            req.basic_auth(&self.user, Some(&self.token))
        };
        let resp = req.send().await.map_err(|e| transport_error(&what, e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| transport_error(&what, e))?;
        if !status.is_success() {
            return Err(classify_response(status, &what, &body));
        }
        let page: Page = serde_json::from_str(&body)
            .map_err(|e| CoreError::TransportFailure(format!("{what}: unexpected payload: {e}")))?;
        debug!(id = %page.id, "fetched wiki page");
        Ok(normalize(page))
    }
}

fn normalize_base_url(url: &str) -> String {
    let trimmed = url.strip_suffix('/').unwrap_or(url);
    if trimmed.contains("/wiki") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/wiki")
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Page {
    id: String,
    title: String,
    body: Option<PageBody>,
}

#[derive(Debug, Deserialize)]
struct PageBody {
    storage: Option<PageStorage>,
}

#[derive(Debug, Deserialize)]
struct PageStorage {
    #[serde(default)]
    value: String,
}

fn normalize(page: Page) -> Document {
    let body = page
        .body
        .and_then(|b| b.storage)
        .map(|s| s.value)
        .unwrap_or_default();
    Document::new(page.id, page.title, body)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn wiki_for(server: &Server, user: &str) -> ConfluenceWiki {
        ConfluenceWiki::new(&WikiSettings {
            base_url: server.url(),
            user: user.into(),
            token: "secret-token".into(),
        })
    }

    #[test]
    fn base_url_normalization() {
        assert_eq!(
            normalize_base_url("https://acme.atlassian.net"),
            "https://acme.atlassian.net/wiki"
        );
        assert_eq!(
            normalize_base_url("https://acme.atlassian.net/"),
            "https://acme.atlassian.net/wiki"
        );
        assert_eq!(
            normalize_base_url("https://acme.atlassian.net/wiki"),
            "https://acme.atlassian.net/wiki"
        );
        assert_eq!(
            normalize_base_url("https://acme.atlassian.net/wiki/"),
            "https://acme.atlassian.net/wiki"
        );
    }

    #[tokio::test]
    async fn fetch_page_normalizes_payload() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/wiki/rest/api/content/12345")
            .match_query(Matcher::UrlEncoded("expand".into(), "body.storage".into()))
            .match_header("accept", "application/json")
            .with_body(
                r#"{
                  "id": "12345",
                  "title": "Feature brief",
                  "body": { "storage": { "value": "<p>As a user...</p>" } }
                }"#,
            )
            .create_async()
            .await;

        let doc = wiki_for(&server, "me@acme.com")
            .fetch_page("12345")
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(doc.id, "12345");
        assert_eq!(doc.title, "Feature brief");
        assert_eq!(doc.body, "<p>As a user...</p>");
        assert!(doc.fields.is_empty());
    }

    #[tokio::test]
    async fn explicit_wiki_suffix_is_not_doubled() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/wiki/rest/api/content/1")
            .match_query(Matcher::Any)
            .with_body(r#"{"id":"1","title":"T"}"#)
            .create_async()
            .await;

        let wiki = ConfluenceWiki::new(&WikiSettings {
            base_url: format!("{}/wiki/", server.url()),
            user: String::new(),
            token: "t".into(),
        });
        wiki.fetch_page("1").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn basic_auth_when_a_user_is_configured() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/wiki/rest/api/content/1")
            .match_query(Matcher::Any)
            .match_header("authorization", Matcher::Regex("^Basic ".into()))
            .with_body(r#"{"id":"1","title":"T"}"#)
            .create_async()
            .await;

        wiki_for(&server, "me@acme.com").fetch_page("1").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn bearer_auth_when_no_user_is_configured() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/wiki/rest/api/content/1")
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer secret-token")
            .with_body(r#"{"id":"1","title":"T"}"#)
            .create_async()
            .await;

        wiki_for(&server, "").fetch_page("1").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_body_defaults_to_empty() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/wiki/rest/api/content/1")
            .match_query(Matcher::Any)
            .with_body(r#"{"id":"1","title":"Stub page"}"#)
            .create_async()
            .await;

        let doc = wiki_for(&server, "").fetch_page("1").await.unwrap();
        assert_eq!(doc.title, "Stub page");
        assert_eq!(doc.body, "");
    }

    #[tokio::test]
    async fn missing_page_is_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/wiki/rest/api/content/404404")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let err = wiki_for(&server, "").fetch_page("404404").await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn rejected_token_is_an_auth_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/wiki/rest/api/content/1")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("current user not permitted")
            .create_async()
            .await;

        let err = wiki_for(&server, "").fetch_page("1").await.unwrap_err();
        assert!(matches!(err, CoreError::AuthFailure(_)));
        assert!(err.to_string().contains("current user not permitted"));
    }
}
