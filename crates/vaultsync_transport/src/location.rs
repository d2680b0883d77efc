//! Remote location handling: scheme classification and URL normalization.
//!
//! A remote location is an opaque URL string. The only structure this layer
//! reads out of it is the scheme prefix (to pick a backend) and the presence
//! of a trailing separator (so filenames can be appended safely).

/// The URL schemes a vault location may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Plain HTTP against the bespoke upload/delete script pair.
    Http,
    /// HTTPS against the bespoke upload/delete script pair.
    Https,
    /// WebDAV over plain HTTP.
    Webdav,
    /// WebDAV over HTTPS.
    Webdavs,
    /// A local file path; handled by the caller, not by this layer.
    File,
}

impl Scheme {
    /// Parses a bare scheme token (no `:` or `//`).
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "http" => Some(Self::Http),
            "https" => Some(Self::Https),
            "webdav" => Some(Self::Webdav),
            "webdavs" => Some(Self::Webdavs),
            "file" => Some(Self::File),
            _ => None,
        }
    }

    /// Returns true if `token` names a scheme the application can work
    /// with. Used for upstream validation before any network attempt.
    pub fn is_supported(token: &str) -> bool {
        Self::parse(token).is_some()
    }

    /// The canonical token for this scheme.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::Webdav => "webdav",
            Self::Webdavs => "webdavs",
            Self::File => "file",
        }
    }
}

/// Appends a single trailing `/` to `location` if one is not already
/// present. Idempotent: a location already ending in `/` is returned
/// unchanged.
pub fn ensure_trailing_slash(location: &str) -> String {
    if location.ends_with('/') {
        location.to_string()
    } else {
        format!("{location}/")
    }
}

/// Joins a directory-style location and a filename with exactly one
/// separator between them.
pub(crate) fn join(base: &str, file_name: &str) -> String {
    format!("{}{}", ensure_trailing_slash(base), file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_appended_when_absent() {
        assert_eq!(ensure_trailing_slash("http://host/dir"), "http://host/dir/");
    }

    #[test]
    fn trailing_slash_is_idempotent() {
        let once = ensure_trailing_slash("http://host/dir");
        let twice = ensure_trailing_slash(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn join_never_doubles_the_separator() {
        assert_eq!(join("http://host/dir", "vault.db"), "http://host/dir/vault.db");
        assert_eq!(join("http://host/dir/", "vault.db"), "http://host/dir/vault.db");
    }

    #[test]
    fn supported_schemes() {
        for token in ["http", "https", "file", "webdav", "webdavs"] {
            assert!(Scheme::is_supported(token), "{token} should be supported");
        }
    }

    #[test]
    fn unsupported_schemes() {
        for token in ["ftp", "ssh", "smb", "HTTP", ""] {
            assert!(!Scheme::is_supported(token), "{token} should not be supported");
        }
    }

    #[test]
    fn parse_round_trips() {
        for token in ["http", "https", "file", "webdav", "webdavs"] {
            assert_eq!(Scheme::parse(token).unwrap().as_str(), token);
        }
    }
}
