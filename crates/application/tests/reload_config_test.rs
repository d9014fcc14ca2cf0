mod helpers;

use helpers::{a_record, dns_config, engine_with};
use polydns_application::ports::DomainRoutePort;
use polydns_application::use_cases::dns::DEFAULT_CLIENT_IP;
use polydns_application::use_cases::ReloadConfigUseCase;
use polydns_domain::{Config, Protocol, RecordType};
use std::io::Write;

fn reload_use_case(fx: &helpers::EngineFixture, initial: &Config) -> ReloadConfigUseCase {
    ReloadConfigUseCase::new(
        fx.state.clone(),
        fx.cache.clone(),
        fx.log.clone(),
        fx.routes.clone(),
        initial,
    )
}

fn config_with_dns() -> Config {
    Config {
        dns: dns_config(),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_reload_blocked_domains_applies_to_next_lookup() {
    let initial = config_with_dns();
    let fx = engine_with(initial.dns.clone());
    fx.upstream
        .respond(Protocol::Standard, vec![a_record("ads.test", "10.0.0.1")]);
    let reload = reload_use_case(&fx, &initial);

    let mut updated = initial.clone();
    updated.dns.security.blocked_domains = vec!["ads.test".into()];
    reload.reload_blocked_domains(&updated);

    let result = fx
        .engine
        .lookup("ads.test", RecordType::A, DEFAULT_CLIENT_IP, None, None)
        .await
        .unwrap();
    assert!(result.is_empty());
    assert!(fx.upstream.calls().is_empty());
    assert_eq!(fx.state.load().version, 2);
}

#[tokio::test]
async fn test_reload_upstream_servers_recomputes_supported() {
    let initial = config_with_dns();
    let fx = engine_with(initial.dns.clone());
    let reload = reload_use_case(&fx, &initial);

    let mut updated = initial.clone();
    updated.dns.protocols.doq.settings.enable = true;
    updated.dns.protocols.doq.quic_supported = false;
    updated.dns.protocols.dot.enable = true;
    updated.dns.default_protocol = Protocol::Dot;

    let supported = reload.reload_upstream_servers(&updated);

    assert!(supported.dot);
    assert!(!supported.doq);
    assert_eq!(fx.state.load().config.default_protocol, Protocol::Dot);
}

#[tokio::test]
async fn test_reload_allowed_ips_rejects_invalid_network() {
    let initial = config_with_dns();
    let fx = engine_with(initial.dns.clone());
    let reload = reload_use_case(&fx, &initial);

    let mut updated = initial.clone();
    updated.dns.security.allowed_ips = vec!["300.1.1.1/8".into()];

    assert!(reload.reload_allowed_ips(&updated).is_err());
    assert_eq!(
        fx.state.load().config.security.allowed_ips,
        vec!["0.0.0.0/0".to_string()]
    );
}

#[tokio::test]
async fn test_reload_security_settings_updates_passthroughs() {
    let initial = config_with_dns();
    let fx = engine_with(initial.dns.clone());
    let reload = reload_use_case(&fx, &initial);

    let mut updated = initial.clone();
    updated.dns.security.rate_limit.enable = true;
    updated.dns.security.rate_limit.threshold = 50;
    updated.dns.security.dnssec.enable = true;
    updated.dns.security.allowed_ips = vec!["10.0.0.0/8".into()];

    reload.reload_security_settings(&updated).unwrap();

    let state = fx.state.load();
    assert!(state.config.security.rate_limit.enable);
    assert_eq!(state.config.security.rate_limit.threshold, 50);
    assert!(state.config.security.dnssec.enable);
    assert_eq!(state.config.security.allowed_ips, vec!["10.0.0.0/8".to_string()]);
}

#[tokio::test]
async fn test_reload_logging_pushes_policy_to_sink() {
    let initial = config_with_dns();
    let fx = engine_with(initial.dns.clone());
    let reload = reload_use_case(&fx, &initial);

    let mut updated = initial.clone();
    updated.dns.debug = true;
    updated.dns.query_log.log_queries = false;
    reload.reload_logging(&updated);

    assert!(fx.state.load().config.debug);
    assert!(!fx.log.policy().unwrap().log_queries);
}

#[tokio::test]
async fn test_reload_cache_configures_store() {
    let initial = config_with_dns();
    let fx = engine_with(initial.dns.clone());
    let reload = reload_use_case(&fx, &initial);

    let mut updated = initial.clone();
    updated.dns.cache.max_size = 10;
    updated.dns.cache.ttl = 60;
    reload.reload_cache(&updated);

    let options = fx.cache.last_options().unwrap();
    assert_eq!(options.max_size, Some(10));
    assert_eq!(options.ttl, Some(60));
}

#[tokio::test]
async fn test_reload_dns_server_config_reports_rebind() {
    let initial = config_with_dns();
    let fx = engine_with(initial.dns.clone());
    let reload = reload_use_case(&fx, &initial);

    let mut same_address = initial.clone();
    same_address.server.tcp = false;
    assert!(!reload.reload_dns_server_config(&same_address));
    assert!(!reload.server_config().tcp);

    let mut moved = initial.clone();
    moved.server.dns_port = 5353;
    assert!(reload.reload_dns_server_config(&moved));
}

#[tokio::test]
async fn test_reload_general_config_replaces_table() {
    let initial = config_with_dns();
    let fx = engine_with(initial.dns.clone());
    let reload = reload_use_case(&fx, &initial);

    let updated = Config::parse(
        r#"
        [general]
        instance = "edge-1"
        "#,
    )
    .unwrap();
    reload.reload_general_config(&updated);

    assert_eq!(
        reload
            .general_config()
            .get("instance")
            .and_then(|v| v.as_str()),
        Some("edge-1")
    );
}

#[tokio::test]
async fn test_reload_routes_from_file() {
    let initial = config_with_dns();
    let fx = engine_with(initial.dns.clone());
    let reload = reload_use_case(&fx, &initial);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"domestic":[{{"domain":"corp.example","dns":"10.0.0.53","protocol":"custom"}}]}}"#
    )
    .unwrap();

    let count = reload.reload_routes(file.path()).unwrap();

    assert_eq!(count, 1);
    assert_eq!(fx.routes.routes()[0].server.as_deref(), Some("10.0.0.53"));
}

#[tokio::test]
async fn test_reload_from_file_applies_all() {
    let initial = config_with_dns();
    let fx = engine_with(initial.dns.clone());
    let reload = reload_use_case(&fx, &initial);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [dns]
        default_protocol = "custom"
        fallback_order = ["custom", "standard"]

        [dns.protocols.custom]
        enable = true

        [dns.security]
        blocked_domains = ["*.ads.test"]
        "#
    )
    .unwrap();

    reload
        .reload_from_file(file.path().to_str().unwrap())
        .unwrap();

    let state = fx.state.load();
    assert_eq!(state.config.default_protocol, Protocol::Custom);
    assert!(state.blocked.is_blocked("banner.ads.test"));
}
