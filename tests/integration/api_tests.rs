//! Request handler routes end to end: parse → handler → service → mock KVM.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::mock_hw::{Journal, MockKvm, MockService, RecordingSink, service};

use hmac_sha256::Hash;
use kvmswitch::api::request::MAX_BODY;
use kvmswitch::api::{ApiRequest, DeviceInfo, Method, RequestHandler};
use kvmswitch::app::events::AppEvent;
use kvmswitch::kvm::Port;

type Handler = RequestHandler<
    crate::mock_hw::MockKvm,
    crate::mock_hw::MockDelay,
    RecordingSink,
>;

struct Fixture {
    journal: Journal,
    sink: RecordingSink,
    handler: Handler,
}

fn fixture_with(active: Port, ota_enabled: bool) -> Fixture {
    let journal = Journal::default();
    let sink = RecordingSink::default();
    let svc: MockService = service(&journal, MockKvm::new(journal.clone(), active), &sink);
    let handler = RequestHandler::new(
        Arc::new(svc),
        DeviceInfo {
            hostname: "kvm-aabbcc".into(),
            device_id: "KV-AABBCC".into(),
            version: "0.3.0",
        },
        ota_enabled,
    );
    Fixture {
        journal,
        sink,
        handler,
    }
}

fn fixture(active: Port) -> Fixture {
    fixture_with(active, true)
}

impl Fixture {
    fn request(&self, method: Method, uri: &str, body: &str) -> (u16, String) {
        let resp = self.handler.handle(&ApiRequest::parse(method, uri, body));
        (resp.status, resp.body)
    }

    /// As the server does it: body pulled through the handler's reader.
    fn streamed(&self, method: Method, uri: &str, body: &[u8]) -> (u16, String) {
        let resp = self
            .handler
            .handle_streamed(method, uri, None, reader(body));
        (resp.status, resp.body)
    }
}

// ── Port routes ───────────────────────────────────────────────

#[test]
fn get_port_is_plain_decimal() {
    let f = fixture(Port::Three);
    let resp = f.handler.handle(&ApiRequest::parse(Method::Get, "/api/port", ""));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, "3");
    assert!(resp.content_type.starts_with("text/plain"));
    assert_eq!(f.journal.actuations(), 0);
}

#[test]
fn switch_via_path_query_and_body() {
    let f = fixture(Port::One);
    assert_eq!(f.request(Method::Post, "/api/port/2", ""), (200, "2".into()));
    assert_eq!(f.request(Method::Put, "/api/port?port=4", ""), (200, "4".into()));
    assert_eq!(f.request(Method::Post, "/api/port", " 3\r\n"), (200, "3".into()));
    assert_eq!(f.request(Method::Get, "/api/port", ""), (200, "3".into()));
    assert_eq!(f.journal.presses(), vec![Port::Two, Port::Four, Port::Three]);
}

#[test]
fn invalid_port_is_client_error_without_actuation() {
    let f = fixture(Port::One);
    for (uri, body) in [
        ("/api/port/0", ""),
        ("/api/port/5", ""),
        ("/api/port/-1", ""),
        ("/api/port/abc", ""),
        ("/api/port", ""),
        ("/api/port?port=", ""),
        ("/api/port", "two"),
    ] {
        assert_eq!(
            f.request(Method::Post, uri, body),
            (400, "invalid port".into()),
            "{uri} {body:?}"
        );
    }
    assert_eq!(f.journal.actuations(), 0);
    assert!(f.sink.events().iter().all(|e| *e == AppEvent::SwitchRejected));
}

#[test]
fn switch_emits_event_with_reported_port() {
    let f = fixture(Port::One);
    f.request(Method::Post, "/api/port/3", "");
    assert_eq!(
        f.sink.events(),
        vec![AppEvent::Switched {
            requested: Port::Three,
            reported: Port::Three
        }]
    );
}

#[test]
fn streamed_body_switches() {
    let f = fixture(Port::One);
    assert_eq!(f.streamed(Method::Post, "/api/port", b"port=2"), (200, "2".into()));
    assert_eq!(f.streamed(Method::Get, "/api/port", b""), (200, "2".into()));
    assert_eq!(f.journal.presses(), vec![Port::Two]);
}

#[test]
fn oversized_body_is_refused_without_actuation() {
    let f = fixture(Port::One);
    // Cut at MAX_BODY this would read as port 1.
    let mut body = vec![b' '; MAX_BODY - 1];
    body.extend_from_slice(b"12");
    assert_eq!(f.streamed(Method::Post, "/api/port", &body).0, 413);

    let declared = f.handler.handle_streamed(
        Method::Post,
        "/api/port",
        Some(MAX_BODY as u64 + 1),
        reader(b"1"),
    );
    assert_eq!(declared.status, 413);

    assert_eq!(f.journal.actuations(), 0);
    assert!(f.sink.events().is_empty());
}

#[test]
fn page_form_post_redirects_home() {
    let f = fixture(Port::One);
    let resp = f.handler.handle(&ApiRequest::parse(Method::Post, "/", "port=3"));
    assert_eq!(resp.status, 303);
    assert_eq!(resp.location, Some("/"));
    assert_eq!(f.journal.presses(), vec![Port::Three]);

    assert_eq!(f.request(Method::Post, "/", "port=9"), (400, "invalid port".into()));
    assert_eq!(f.journal.presses(), vec![Port::Three]);
}

// ── Other routes ──────────────────────────────────────────────

#[test]
fn status_is_json() {
    let f = fixture(Port::Two);
    f.request(Method::Post, "/api/port/4", "");
    let resp = f.handler.handle(&ApiRequest::parse(Method::Get, "/api/status", ""));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.content_type, "application/json");

    let v: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(v["port"], 4);
    assert_eq!(v["hostname"], "kvm-aabbcc");
    assert_eq!(v["device_id"], "KV-AABBCC");
    assert_eq!(v["hold_ms"], 100);
    assert_eq!(v["settle_ms"], 50);
    assert_eq!(v["switch_count"], 1);
}

#[test]
fn page_highlights_active_port() {
    let f = fixture(Port::Two);
    let resp = f.handler.handle(&ApiRequest::parse(Method::Get, "/", ""));
    assert_eq!(resp.status, 200);
    assert!(resp.content_type.starts_with("text/html"));
    assert!(resp.body.contains("class=\"active\">2</button>"));
    assert_eq!(f.journal.actuations(), 0);
}

#[test]
fn unknown_and_wrong_method() {
    let f = fixture(Port::One);
    assert_eq!(f.request(Method::Get, "/missing", "").0, 404);
    assert_eq!(f.request(Method::Post, "/api/status", "").0, 405);
    assert_eq!(f.request(Method::Get, "/api/port/2", "").0, 405);
    assert_eq!(f.journal.actuations(), 0);
}

// ── Firmware upload ───────────────────────────────────────────

fn hex(digest: &[u8; 32]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Body reader yielding `image` in 7-byte pieces.
fn reader(image: &[u8]) -> impl FnMut(&mut [u8]) -> Option<usize> + '_ {
    let mut pos = 0;
    move |buf: &mut [u8]| {
        let n = (image.len() - pos).min(buf.len()).min(7);
        buf[..n].copy_from_slice(&image[pos..pos + n]);
        pos += n;
        Some(n)
    }
}

#[test]
fn upload_with_matching_digest_is_accepted() {
    let f = fixture(Port::One);
    let image = b"firmware image bytes".repeat(10);
    let sha = hex(&Hash::hash(&image));
    let resp = f
        .handler
        .handle_update(Some(&sha), Some(image.len() as u64), reader(&image));
    assert_eq!(resp.status, 200);
}

#[test]
fn upload_with_wrong_digest_is_rejected() {
    let f = fixture(Port::One);
    let image = b"firmware".to_vec();
    let sha = hex(&Hash::hash(b"something else"));
    let resp = f
        .handler
        .handle_update(Some(&sha), Some(image.len() as u64), reader(&image));
    assert_eq!(resp.status, 400);

    // A later, correct upload still goes through.
    let sha = hex(&Hash::hash(&image));
    let resp = f
        .handler
        .handle_update(Some(&sha), Some(image.len() as u64), reader(&image));
    assert_eq!(resp.status, 200);
}

#[test]
fn upload_without_header_or_length_is_rejected() {
    let f = fixture(Port::One);
    let image = b"firmware".to_vec();
    let sha = hex(&Hash::hash(&image));
    assert_eq!(f.handler.handle_update(None, Some(8), reader(&image)).status, 400);
    assert_eq!(f.handler.handle_update(Some(&sha), None, reader(&image)).status, 400);
    assert_eq!(
        f.handler
            .handle_update(Some(&sha), Some(16), reader(&image))
            .status,
        400
    );
}

#[test]
fn upload_disabled_by_config() {
    let f = fixture_with(Port::One, false);
    let image = b"firmware".to_vec();
    let sha = hex(&Hash::hash(&image));
    let resp = f.handler.handle_update(Some(&sha), Some(8), reader(&image));
    assert_eq!(resp.status, 403);
}

#[test]
fn second_upload_during_first_is_refused() {
    let f = fixture(Port::One);
    let image = b"firmware image bytes".repeat(4);
    let sha = hex(&Hash::hash(&image));
    let len = Some(image.len() as u64);

    let mut body = reader(&image);
    let mut concurrent = None;
    let first = f.handler.handle_update(Some(&sha), len, |buf| {
        if concurrent.is_none() {
            concurrent = Some(f.handler.handle_update(Some(&sha), len, reader(&image)).status);
        }
        body(buf)
    });

    assert_eq!(first.status, 200);
    assert_eq!(concurrent, Some(409));
    assert_eq!(f.handler.handle_update(Some(&sha), len, reader(&image)).status, 200);
}

#[test]
fn panicking_upload_frees_the_slot() {
    let f = fixture(Port::One);
    let image = b"firmware".to_vec();
    let sha = hex(&Hash::hash(&image));

    let unwound = panic::catch_unwind(AssertUnwindSafe(|| {
        f.handler
            .handle_update(Some(&sha), Some(8), |_| -> Option<usize> { panic!("link reset") })
    }));
    assert!(unwound.is_err());

    assert_eq!(f.handler.handle_update(Some(&sha), Some(8), reader(&image)).status, 200);
}
