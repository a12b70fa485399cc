#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use rtbroker_gateway::config::{self, SlowConsumerPolicy};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
gateway:
  listen: "0.0.0.0:8080"
broker:
  mailbox_capacty: 16 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.gateway.ws_path, "/ws");
    assert_eq!(cfg.gateway.max_frame_bytes, 4096);
    assert_eq!(cfg.broker.default_room, "root");
    assert_eq!(cfg.broker.admin_role, "admin");
    assert_eq!(cfg.broker.slow_consumer, SlowConsumerPolicy::Evict);
    assert_eq!(cfg.sessions.default_privilege, "user");
}

#[test]
fn full_config_parses() {
    let ok = r#"
version: 1
gateway:
  listen: "127.0.0.1:9000"
  ws_path: "/realtime"
  ping_interval_ms: 5000
  pong_wait_ms: 6000
broker:
  mailbox_capacity: 8
  slow_consumer: drop
  relay_events: [chat, typing]
sessions:
  tickets:
    s3cret: admin
databases:
  app:
    tables: [posts]
routes:
  "/":
    markup: "<h1>home</h1>"
    controller: home
  "^/post/(\\w+)$":
    markup: "<article/>"
    controller: "$1"
    table: posts
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.gateway.listen_addr().unwrap().port(), 9000);
    assert_eq!(cfg.broker.slow_consumer, SlowConsumerPolicy::Drop);
    assert_eq!(cfg.sessions.tickets.get("s3cret").map(String::as_str), Some("admin"));
    assert_eq!(cfg.databases["app"].tables, vec!["posts".to_string()]);
    assert_eq!(cfg.routes.len(), 2);
    assert_eq!(cfg.broker.relay_events, vec!["chat".to_string(), "typing".to_string()]);
}

#[test]
fn relaying_a_builtin_event_is_rejected() {
    let bad = r#"
version: 1
broker:
  relay_events: [join]
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn unsupported_version_is_rejected() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn ping_must_be_shorter_than_pong_wait() {
    let bad = r#"
version: 1
gateway:
  ping_interval_ms: 60000
  pong_wait_ms: 60000
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn zero_mailbox_is_rejected() {
    let bad = r#"
version: 1
broker:
  mailbox_capacity: 0
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn missing_file_is_config_error() {
    let err = config::load_from_file("/nonexistent/rtbroker.yaml").expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}
