//! WebDAV backend.
//!
//! `webdav`/`webdavs` locations are plain WebDAV shares; the scheme prefix
//! is rewritten to `http`/`https` and the transfer is an ordinary HTTP PUT
//! or GET against the rewritten URL. No bespoke upload script is involved.

use std::fs;
use std::path::Path;

use reqwest::blocking::Client;
use tracing::info;

use crate::error::{TransportError, TransportResult};
use crate::http::build_client;
use crate::location::ensure_trailing_slash;
use crate::settings::{Credentials, TransportSettings};
use crate::transport::Transport;

/// Rewrites a `webdav`/`webdavs` scheme prefix to `http`/`https`.
///
/// URLs already carrying another scheme pass through unchanged.
fn rewrite_scheme(url: &str) -> String {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("webdavs:") {
        format!("https{}", &url["webdavs".len()..])
    } else if lower.starts_with("webdav:") {
        format!("http{}", &url["webdav".len()..])
    } else {
        url.to_string()
    }
}

/// Backend for `webdav` and `webdavs` locations.
pub struct WebdavTransport {
    client: Client,
}

impl WebdavTransport {
    /// Builds the backend. Shares the HTTP backend's client construction,
    /// so proxy settings and the trust policy apply here too.
    pub fn new(settings: &TransportSettings) -> TransportResult<Self> {
        Ok(Self {
            client: build_client(settings)?,
        })
    }
}

impl Transport for WebdavTransport {
    fn put(
        &self,
        location: &str,
        file: &Path,
        credentials: Option<&Credentials>,
    ) -> TransportResult<()> {
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                TransportError::invalid_location(
                    file.display().to_string(),
                    "upload source has no usable file name",
                )
            })?;
        let url = format!(
            "{}{}",
            ensure_trailing_slash(&rewrite_scheme(location)),
            file_name
        );

        info!("webdav put {} (auth: {})", url, credentials.is_some());

        let bytes = fs::read(file).map_err(|e| TransportError::io("reading upload source file", e))?;

        let mut request = self.client.put(&url).body(bytes);
        if let Some(creds) = credentials {
            request = request.basic_auth(creds.username(), Some(creds.password()));
        }
        let response = request
            .send()
            .map_err(|e| TransportError::network("uploading to", &url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::status("uploading to", &url, status));
        }
        Ok(())
    }

    fn get(&self, url: &str, credentials: Option<&Credentials>) -> TransportResult<Vec<u8>> {
        let url = rewrite_scheme(url);

        info!("webdav get {} (auth: {})", url, credentials.is_some());

        let mut request = self.client.get(&url);
        if let Some(creds) = credentials {
            request = request.basic_auth(creds.username(), Some(creds.password()));
        }
        let response = request
            .send()
            .map_err(|e| TransportError::network("getting", &url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::status("getting", &url, status));
        }

        let body = response
            .bytes()
            .map_err(|e| TransportError::network("getting", &url, e))?;
        Ok(body.to_vec())
    }

    /// Intentionally a no-op.
    ///
    /// The sync workflow only ever deletes a remote vault immediately
    /// before putting a file of the same name, and a WebDAV PUT replaces
    /// the resource anyway, so the round-trip is skipped. If the calling
    /// workflow ever stops pairing delete with put, this must become a
    /// real DELETE request.
    fn delete(
        &self,
        _location: &str,
        _name: &str,
        _credentials: Option<&Credentials>,
    ) -> TransportResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webdav_rewrites_to_http() {
        assert_eq!(rewrite_scheme("webdav://host/path"), "http://host/path");
    }

    #[test]
    fn webdavs_rewrites_to_https() {
        assert_eq!(rewrite_scheme("webdavs://host/path"), "https://host/path");
    }

    #[test]
    fn rewrite_is_case_insensitive_on_the_scheme_only() {
        assert_eq!(rewrite_scheme("WEBDAV://Host/Path"), "http://Host/Path");
        assert_eq!(rewrite_scheme("WebDavS://Host/Path"), "https://Host/Path");
    }

    #[test]
    fn other_schemes_pass_through() {
        assert_eq!(rewrite_scheme("https://host/path"), "https://host/path");
        assert_eq!(rewrite_scheme("ftp://host/path"), "ftp://host/path");
    }
}
