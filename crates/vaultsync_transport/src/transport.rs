//! The transport contract and the scheme-keyed backend factory.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{TransportError, TransportResult};
use crate::http::HttpTransport;
use crate::location;
use crate::settings::{Credentials, TransportSettings};
use crate::webdav::WebdavTransport;

/// Moves the vault database file to and from a remote location without the
/// caller having to know the underlying wire protocol.
///
/// Implementations perform strictly synchronous, blocking network calls and
/// define no internal threading; callers must serialize `put`/`get`/`delete`
/// against one instance. Instances are short-lived, constructed per sync
/// operation.
pub trait Transport {
    /// Uploads `file`'s bytes to a resource derived from `location`.
    ///
    /// Atomic from the caller's perspective: on success the remote resource
    /// contains the new bytes; on error the remote state is unspecified and
    /// must not be treated as success.
    fn put(
        &self,
        location: &str,
        file: &Path,
        credentials: Option<&Credentials>,
    ) -> TransportResult<()>;

    /// Downloads the resource at the absolute `url` and returns its bytes
    /// verbatim.
    fn get(&self, url: &str, credentials: Option<&Credentials>) -> TransportResult<Vec<u8>>;

    /// Removes the resource called `name` under `location`.
    fn delete(
        &self,
        location: &str,
        name: &str,
        credentials: Option<&Credentials>,
    ) -> TransportResult<()>;

    /// Downloads `file_name` from under the directory-style `base`
    /// location, inserting exactly one separator between them.
    fn get_file(
        &self,
        base: &str,
        file_name: &str,
        credentials: Option<&Credentials>,
    ) -> TransportResult<Vec<u8>> {
        self.get(&location::join(base, file_name), credentials)
    }

    /// Downloads the resource at `url` into a newly created temporary file
    /// and hands ownership of that file to the caller.
    ///
    /// The file is deleted when the returned handle is dropped.
    fn get_remote_file(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
    ) -> TransportResult<NamedTempFile> {
        let bytes = self.get(url, credentials)?;
        let mut file = NamedTempFile::new()
            .map_err(|e| TransportError::io("creating temporary download file", e))?;
        file.write_all(&bytes)
            .map_err(|e| TransportError::io("writing temporary download file", e))?;
        Ok(file)
    }

    /// Like [`get_remote_file`](Transport::get_remote_file), but joins a
    /// directory-style `base` location and `file_name` first.
    fn get_remote_file_named(
        &self,
        base: &str,
        file_name: &str,
        credentials: Option<&Credentials>,
    ) -> TransportResult<NamedTempFile> {
        self.get_remote_file(&location::join(base, file_name), credentials)
    }
}

/// Picks the backend for `url` by its scheme prefix (case-insensitive).
///
/// `http:`/`https:` yield an [`HttpTransport`], `webdav:`/`webdavs:` a
/// [`WebdavTransport`]. `Ok(None)` means no backend handles the scheme
/// (`file:` locations are handled directly by the caller). `Err` means a
/// matching backend exists but its client could not be constructed, e.g. a
/// malformed proxy configuration.
pub fn transport_for_url(
    url: &str,
    settings: &TransportSettings,
) -> TransportResult<Option<Box<dyn Transport>>> {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http:") || lower.starts_with("https:") {
        Ok(Some(Box::new(HttpTransport::new(settings)?)))
    } else if lower.starts_with("webdav:") || lower.starts_with("webdavs:") {
        Ok(Some(Box::new(WebdavTransport::new(settings)?)))
    } else {
        Ok(None)
    }
}
