//! Dictionary fetching

use std::path::PathBuf;

use async_trait::async_trait;
use mockall::automock;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::i18n::{
    dictionary::Dictionary,
    locale::{Locale, Namespace},
};

/// Failure to obtain a dictionary
#[derive(Debug, Error)]
pub enum FetchError {
    /// Reading the dictionary file failed
    #[error("failed to read dictionary: {0}")]
    Io(#[from] std::io::Error),

    /// The dictionary was not a JSON object
    #[error("failed to parse dictionary: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP request failed
    #[error("dictionary request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("dictionary request to {url} returned {status}")]
    Status {
        /// Requested URL
        url: String,

        /// Response status
        status: StatusCode,
    },
}

/// Loads the dictionary for a locale and namespace.
#[automock]
#[async_trait]
pub trait DictionaryFetcher: Send + Sync {
    /// Fetch one dictionary.
    async fn fetch(&self, locale: Locale, namespace: Namespace)
    -> Result<Dictionary, FetchError>;
}

/// Reads dictionaries from `{root}/{locale}/{namespace}.json`.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    /// Create a fetcher rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File holding a locale's namespace
    pub fn path(&self, locale: Locale, namespace: Namespace) -> PathBuf {
        self.root
            .join(locale.as_str())
            .join(format!("{}.json", namespace.as_str()))
    }
}

#[async_trait]
impl DictionaryFetcher for DirectoryFetcher {
    async fn fetch(
        &self,
        locale: Locale,
        namespace: Namespace,
    ) -> Result<Dictionary, FetchError> {
        let path = self.path(locale, namespace);

        debug!(path = %path.display(), "reading dictionary");

        let contents = tokio::fs::read_to_string(&path).await?;

        Ok(Dictionary::from_json_str(&contents)?)
    }
}

/// Requests dictionaries from `{base_url}/{locale}/{namespace}.json`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    /// Create a fetcher for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a fetcher using an existing HTTP client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// URL of a locale's namespace
    pub fn url(&self, locale: Locale, namespace: Namespace) -> String {
        format!(
            "{}/{}/{}.json",
            self.base_url.trim_end_matches('/'),
            locale.as_str(),
            namespace.as_str()
        )
    }
}

#[async_trait]
impl DictionaryFetcher for HttpFetcher {
    async fn fetch(
        &self,
        locale: Locale,
        namespace: Namespace,
    ) -> Result<Dictionary, FetchError> {
        let url = self.url(locale, namespace);

        debug!(%url, "requesting dictionary");

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }

        Ok(response.json::<Dictionary>().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use testresult::TestResult;

    use super::*;

    #[test]
    fn directory_layout() {
        let fetcher = DirectoryFetcher::new("/srv/locales");

        assert_eq!(
            fetcher.path(Locale::Vi, Namespace::WoodIdeas),
            PathBuf::from("/srv/locales/vi/wood-ideas.json")
        );
    }

    #[test]
    fn url_layout_ignores_trailing_slash() {
        let fetcher = HttpFetcher::new("https://shop.example/locales/");

        assert_eq!(
            fetcher.url(Locale::En, Namespace::ColorMatch),
            "https://shop.example/locales/en/color-match.json"
        );
    }

    #[tokio::test]
    async fn directory_fetcher_reads_json() -> TestResult {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join("en"))?;
        fs::write(
            dir.path().join("en").join("common.json"),
            r#"{"nav":{"home":"Home"}}"#,
        )?;

        let fetcher = DirectoryFetcher::new(dir.path());
        let dictionary = fetcher.fetch(Locale::En, Namespace::Common).await?;

        assert_eq!(dictionary.lookup("nav.home"), Some("Home"));

        Ok(())
    }

    #[tokio::test]
    async fn directory_fetcher_missing_file() -> TestResult {
        let dir = tempfile::tempdir()?;

        let result = DirectoryFetcher::new(dir.path())
            .fetch(Locale::Vi, Namespace::Home)
            .await;

        assert!(
            matches!(result, Err(FetchError::Io(_))),
            "expected Io, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn directory_fetcher_rejects_non_object() -> TestResult {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join("vi"))?;
        fs::write(dir.path().join("vi").join("home.json"), "[1, 2, 3]")?;

        let result = DirectoryFetcher::new(dir.path())
            .fetch(Locale::Vi, Namespace::Home)
            .await;

        assert!(
            matches!(result, Err(FetchError::Json(_))),
            "expected Json, got {result:?}"
        );

        Ok(())
    }
}
