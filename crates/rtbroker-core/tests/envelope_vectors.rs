//! Envelope codec vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use rtbroker_core::protocol::payload::StoreRequest;
use rtbroker_core::Envelope;

mod vector_loader;
use vector_loader::load;

#[test]
fn envelope_vectors() {
    let files = [
        "envelope_chat.json",
        "envelope_join_min.json",
        "envelope_empty.json",
        "envelope_truncated.json",
        "envelope_unknown_field.json",
        "envelope_missing_event.json",
    ];

    for f in files {
        let v = load(f);
        let res = Envelope::decode(&v.frame);

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let env = res.expect("expected ok envelope");
        let ex = v.expect.expect("missing expect block");
        assert_eq!(env.room, ex["room"].as_str().unwrap(), "vector={}", v.description);
        assert_eq!(env.event, ex["event"].as_str().unwrap(), "vector={}", v.description);
        assert_eq!(env.payload, ex["payload"].as_str().unwrap(), "vector={}", v.description);
    }
}

#[test]
fn chat_envelope_survives_encode_decode() {
    let env = Envelope::new("root", "chat", "hi");
    let wire = env.encode().unwrap();
    assert_eq!(Envelope::decode(&wire).unwrap(), env);
}

#[test]
fn store_request_nested_in_payload() {
    let inner = r#"{"db":"memory","table":"posts","key":"p1","data":"{\"title\":\"x\"}"}"#;
    let env = Envelope::new("root", "insertObj", inner);
    let wire = env.encode().unwrap();

    let decoded = Envelope::decode(&wire).unwrap();
    let req = StoreRequest::decode(&decoded.payload).unwrap();
    assert_eq!(req.db, "memory");
    assert_eq!(req.table, "posts");
    assert_eq!(req.key, "p1");
    assert_eq!(req.data, r#"{"title":"x"}"#);
}

#[test]
fn store_request_data_is_optional() {
    let req = StoreRequest::decode(r#"{"db":"memory","table":"users","key":"bob"}"#).unwrap();
    assert!(req.data.is_empty());
}

#[test]
fn store_request_rejects_non_json_payload() {
    let err = StoreRequest::decode("not json").unwrap_err();
    assert_eq!(err.code().as_str(), "DECODE");
}
