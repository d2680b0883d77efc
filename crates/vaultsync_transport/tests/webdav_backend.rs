//! Integration tests for the WebDAV backend and the scheme-keyed factory.

use std::io::Write;
use std::path::PathBuf;

use tempfile::TempDir;
use vaultsync_testkit::FakeServer;
use vaultsync_transport::{
    transport_for_url, Credentials, Transport, TransportSettings, WebdavTransport,
};

fn vault_file(name: &str, content: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create vault file");
    file.write_all(content).expect("write vault file");
    (dir, path)
}

fn webdav_transport() -> WebdavTransport {
    WebdavTransport::new(&TransportSettings::new()).expect("build transport")
}

#[test]
fn factory_dispatch_rewrites_webdav_to_http() {
    // The server only speaks plain HTTP; reaching it through a webdav://
    // location proves the backend rewrote the scheme before connecting.
    let server = FakeServer::start(vec![(200, "dav-bytes")]);

    let location = server.url_with_scheme("webdav");
    let url = format!("{location}/share/vault.db");
    let transport = transport_for_url(&url, &TransportSettings::new())
        .expect("factory")
        .expect("webdav should have a backend");

    let bytes = transport.get(&url, None).expect("get over rewritten scheme");
    assert_eq!(bytes, b"dav-bytes");
    assert_eq!(server.requests()[0].path, "/share/vault.db");
}

#[test]
fn put_issues_a_webdav_put_at_location_plus_filename() {
    let server = FakeServer::start(vec![(201, "")]);
    let (_dir, path) = vault_file("vault.db", b"dav-vault-bytes");

    let location = format!("{}/share", server.url_with_scheme("webdav"));
    webdav_transport().put(&location, &path, None).expect("put should succeed");

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "PUT");
    assert_eq!(requests[0].path, "/share/vault.db");
    assert_eq!(requests[0].body, b"dav-vault-bytes");
}

#[test]
fn put_accepts_any_success_status() {
    for status in [200, 201, 204] {
        let server = FakeServer::start(vec![(status, "")]);
        let (_dir, path) = vault_file("vault.db", b"bytes");
        let location = server.url_with_scheme("webdav");
        webdav_transport()
            .put(&location, &path, None)
            .unwrap_or_else(|e| panic!("put should accept {status}: {e}"));
    }
}

#[test]
fn put_reports_status_text_on_failure() {
    let server = FakeServer::start(vec![(403, "")]);
    let (_dir, path) = vault_file("vault.db", b"bytes");

    let location = server.url_with_scheme("webdav");
    let err = webdav_transport()
        .put(&location, &path, None)
        .expect_err("put should fail on 403");
    assert!(err.to_string().contains("Forbidden"), "got: {err}");
}

#[test]
fn put_attaches_basic_auth_when_credentials_supplied() {
    let server = FakeServer::start(vec![(201, "")]);
    let (_dir, path) = vault_file("vault.db", b"bytes");

    let location = server.url_with_scheme("webdav");
    let creds = Credentials::new("user", "secret");
    webdav_transport()
        .put(&location, &path, Some(&creds))
        .expect("authenticated put");

    assert_eq!(
        server.requests()[0].header("authorization"),
        Some("Basic dXNlcjpzZWNyZXQ=")
    );
}

#[test]
fn get_returns_the_body() {
    let server = FakeServer::start(vec![(200, "share-content")]);

    let url = format!("{}/share/vault.db", server.url_with_scheme("webdav"));
    let bytes = webdav_transport().get(&url, None).expect("get");
    assert_eq!(bytes, b"share-content");
}

#[test]
fn get_reports_status_text_on_failure() {
    let server = FakeServer::start(vec![(404, "")]);

    let url = format!("{}/share/vault.db", server.url_with_scheme("webdav"));
    let err = webdav_transport().get(&url, None).expect_err("get should fail on 404");
    assert!(err.to_string().contains("Not Found"), "got: {err}");
}

#[test]
fn delete_is_a_no_op_and_makes_no_request() {
    // The sync workflow always deletes right before putting the same name,
    // so the backend skips the round-trip entirely.
    let server = FakeServer::start(vec![(500, "must never be hit")]);

    let location = server.url_with_scheme("webdav");
    webdav_transport()
        .delete(&location, "vault.db", None)
        .expect("no-op delete succeeds");

    assert_eq!(server.request_count(), 0);
}
