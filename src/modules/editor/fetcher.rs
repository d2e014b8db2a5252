use std::time::Duration;

use crate::api::error;

/// Pulls edited document content from the document server.
#[async_trait::async_trait]
pub trait ContentFetcher {
    /// Fails once the body grows past `max_bytes`.
    async fn fetch(&self, url: &str, max_bytes: usize) -> Result<Vec<u8>, error::SystemError>;
}

/// Accepts only http(s) URLs whose host is one of `allowed_hosts` or a
/// subdomain of one. Private addresses stay reachable: the document server
/// lives on the internal network.
pub fn validate_download_url(
    url: &str,
    allowed_hosts: &[String],
) -> Result<reqwest::Url, error::SystemError> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| error::SystemError::bad_request(format!("Invalid download url: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(error::SystemError::bad_request("Download url must use http or https"));
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| error::SystemError::bad_request("Download url must have a host"))?
        .to_lowercase();

    let allowed = allowed_hosts.iter().any(|allowed| {
        let allowed = allowed.to_lowercase();
        host == allowed || host.ends_with(&format!(".{allowed}"))
    });

    if !allowed {
        return Err(error::SystemError::forbidden(format!(
            "Download host '{host}' is not an allowed document server"
        )));
    }

    Ok(parsed)
}

#[derive(Clone)]
pub struct HttpContentFetcher {
    client: reqwest::Client,
}

impl HttpContentFetcher {
    pub fn new(timeout: Duration) -> Result<Self, error::SystemError> {
        let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
            error::SystemError::UpstreamFetch(format!("Failed to create HTTP client: {e}").into())
        })?;

        Ok(Self { client })
    }
}

fn too_large(max_bytes: usize) -> error::SystemError {
    error::SystemError::UpstreamFetch(
        format!("Edited document exceeds the {max_bytes} byte limit").into(),
    )
}

#[async_trait::async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch(&self, url: &str, max_bytes: usize) -> Result<Vec<u8>, error::SystemError> {
        let mut response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!(error = %e, url = %url, "Failed to download edited document");
            error::SystemError::UpstreamFetch(format!("Failed to download: {e}").into())
        })?;

        if !response.status().is_success() {
            return Err(error::SystemError::UpstreamFetch(
                format!("Document server returned status {}", response.status()).into(),
            ));
        }

        if response.content_length().is_some_and(|len| len > max_bytes as u64) {
            return Err(too_large(max_bytes));
        }

        // Content-Length may be absent or wrong; the running total decides.
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            error::SystemError::UpstreamFetch(format!("Failed to read response body: {e}").into())
        })? {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(too_large(max_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(list: &[&str]) -> Vec<String> {
        list.iter().map(|h| h.to_string()).collect()
    }

    #[test]
    fn download_url_must_point_at_the_document_server() {
        let allowed = hosts(&["onlyoffice", "docs.example.com"]);

        assert!(validate_download_url("http://onlyoffice/cache/files/1/output.docx", &allowed).is_ok());
        assert!(validate_download_url("https://ONLYOFFICE:8443/cache/1", &allowed).is_ok());
        assert!(validate_download_url("https://eu.docs.example.com/cache/1", &allowed).is_ok());

        let err = validate_download_url("http://169.254.169.254/latest/meta-data", &allowed).unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));
        let err = validate_download_url("http://onlyoffice.evil.net/x", &allowed).unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));
        let err = validate_download_url("http://notdocs.example.com/x", &allowed).unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));

        let err = validate_download_url("file:///etc/passwd", &allowed).unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));
        let err = validate_download_url("not a url", &allowed).unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));
    }
}
