//! HTTP/HTTPS backend.
//!
//! Speaks a tiny bespoke protocol against a minimal server-side script pair
//! (an upload handler and a delete handler) layered over plain HTTP POST,
//! not a standards-based file API. Success and failure are signalled by the
//! literal response bodies `OK` and `FILE_WASNT_MOVED` in addition to the
//! HTTP status code; those sentinels are preserved byte-for-byte for wire
//! compatibility with existing server-side counterparts.

use std::fs;
use std::path::Path;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{TransportError, TransportResult};
use crate::location::ensure_trailing_slash;
use crate::settings::{Credentials, TransportSettings};
use crate::transport::Transport;

/// Server-side upload script, relative to the vault location.
const UPLOAD_SCRIPT: &str = "upload.php";
/// Server-side delete script, relative to the vault location.
const DELETE_SCRIPT: &str = "deletefile.php";
/// Multipart field name the upload script reads the file from.
const UPLOAD_FIELD: &str = "userfile";
/// Form field name the delete script reads the target from.
const DELETE_FIELD: &str = "fileToDelete";
/// Response body signalling success.
const BODY_OK: &str = "OK";
/// Response body the upload script emits when its server-side file move
/// raced; a second identical request is known to succeed.
const BODY_FILE_WASNT_MOVED: &str = "FILE_WASNT_MOVED";

/// Builds the pooled blocking client both backends share, applying the
/// trust policy and proxy settings once per instance.
pub(crate) fn build_client(settings: &TransportSettings) -> TransportResult<Client> {
    let mut builder = Client::builder();

    if settings.trust.accepts_invalid_certs() {
        builder = builder.danger_accept_invalid_certs(true);
    }

    if let Some(proxy) = settings.proxy.as_ref().filter(|p| p.is_active()) {
        let mut scheme = reqwest::Proxy::all(format!("http://{}:{}", proxy.host, proxy.port))
            .map_err(TransportError::Client)?;
        let password = proxy.decoded_password()?;
        if let (Some(username), Some(password)) = (proxy.username.as_deref(), password.as_deref()) {
            scheme = scheme.basic_auth(username, password);
        }
        builder = builder.proxy(scheme);
    }

    builder.build().map_err(TransportError::Client)
}

/// Attaches basic credentials to the request when a username is supplied.
///
/// Credentials are sent with the first request rather than after a 401
/// challenge; the servers this protocol targets do not reliably challenge.
fn with_auth(
    request: reqwest::blocking::RequestBuilder,
    credentials: Option<&Credentials>,
) -> reqwest::blocking::RequestBuilder {
    match credentials {
        Some(creds) => request.basic_auth(creds.username(), Some(creds.password())),
        None => request,
    }
}

/// Backend for `http` and `https` locations.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds the backend, constructing its pooled client from `settings`.
    pub fn new(settings: &TransportSettings) -> TransportResult<Self> {
        Ok(Self {
            client: build_client(settings)?,
        })
    }

    /// Issues one upload POST and returns the status plus the full
    /// response body. Consuming the body returns the connection to the
    /// pool on every path.
    fn send_upload(
        &self,
        url: &str,
        file_name: &str,
        bytes: &[u8],
        credentials: Option<&Credentials>,
    ) -> TransportResult<(StatusCode, String)> {
        let part = Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
        let form = Form::new().part(UPLOAD_FIELD, part);
        let request = with_auth(self.client.post(url).multipart(form), credentials);
        let response = request
            .send()
            .map_err(|e| TransportError::network("uploading to", url, e))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| TransportError::network("uploading to", url, e))?;
        Ok((status, body))
    }
}

impl Transport for HttpTransport {
    fn put(
        &self,
        location: &str,
        file: &Path,
        credentials: Option<&Credentials>,
    ) -> TransportResult<()> {
        let url = format!("{}{}", ensure_trailing_slash(location), UPLOAD_SCRIPT);
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                TransportError::invalid_location(
                    file.display().to_string(),
                    "upload source has no usable file name",
                )
            })?;
        let bytes = fs::read(file).map_err(|e| TransportError::io("reading upload source file", e))?;

        debug!(
            "PUT {} ({} bytes, auth: {})",
            url,
            bytes.len(),
            credentials.is_some()
        );

        let (mut status, mut body) = self.send_upload(&url, file_name, &bytes, credentials)?;

        // The upload script has been seen to fail moving the file on the
        // first attempt; the identical request succeeds on the second. One
        // retry, never more.
        if status == StatusCode::OK && body == BODY_FILE_WASNT_MOVED {
            debug!("server reported FILE_WASNT_MOVED, re-issuing the upload once");
            (status, body) = self.send_upload(&url, file_name, &bytes, credentials)?;
        }

        if status != StatusCode::OK {
            return Err(TransportError::status("uploading to", &url, status));
        }
        if body != BODY_OK {
            return Err(TransportError::rejected("uploading to", &url, body));
        }
        Ok(())
    }

    fn get(&self, url: &str, credentials: Option<&Credentials>) -> TransportResult<Vec<u8>> {
        debug!("GET {} (auth: {})", url, credentials.is_some());

        let request = with_auth(self.client.get(url), credentials);
        let response = request
            .send()
            .map_err(|e| TransportError::network("getting", url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            // Dropping the response returns the connection to the pool.
            return Err(TransportError::status("getting", url, status));
        }

        let body = response
            .bytes()
            .map_err(|e| TransportError::network("getting", url, e))?;
        Ok(body.to_vec())
    }

    fn delete(
        &self,
        location: &str,
        name: &str,
        credentials: Option<&Credentials>,
    ) -> TransportResult<()> {
        let url = format!("{}{}", ensure_trailing_slash(location), DELETE_SCRIPT);

        debug!("DELETE {} via {} (auth: {})", name, url, credentials.is_some());

        let request = with_auth(
            self.client.post(&url).form(&[(DELETE_FIELD, name)]),
            credentials,
        );
        let response = request
            .send()
            .map_err(|e| TransportError::network("deleting via", &url, e))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| TransportError::network("deleting via", &url, e))?;

        if status != StatusCode::OK {
            return Err(TransportError::status("deleting via", &url, status));
        }
        if body != BODY_OK {
            return Err(TransportError::rejected("deleting via", &url, body));
        }
        Ok(())
    }
}
