mod common;

use common::*;
use serde_json::json;
use technitium_provider::config::ConfigError;
use technitium_provider::provider::lifecycle::{self, PlannedAction};
use technitium_provider::provider::{
    DataSource, DhcpReservedLeaseModel, DhcpScopeModel, DnsZoneModel, DnsZoneRecordModel,
    Resource,
};
use technitium_provider::technitium::ZoneType;
use technitium_provider::{ProviderConfig, ProviderError, TechnitiumProvider};
use wiremock::{MockServer, ResponseTemplate};

fn lan() -> DhcpScopeModel {
    DhcpScopeModel {
        name: "LAN".into(),
        starting_address: "192.168.1.100".into(),
        ending_address: "192.168.1.200".into(),
        subnet_mask: "255.255.255.0".into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn configure_logs_in_when_no_token_is_given() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/api/user/login",
        ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "token": "session"})),
    )
    .await;
    mount(&server, "/api/user/session/get", ok(json!({}))).await;

    let config = ProviderConfig {
        host: Some(server.uri()),
        username: Some("admin".into()),
        password: Some("admin".into()),
        ..Default::default()
    };
    TechnitiumProvider::configure(&config).await.unwrap();

    let session = only_query(&server, "/api/user/session/get").await;
    assert_eq!(param(&session, "token"), Some("session"));
}

#[tokio::test]
async fn configure_without_credentials_fails_locally() {
    let server = MockServer::start().await;
    let config = ProviderConfig {
        host: Some(server.uri()),
        ..Default::default()
    };

    let err = TechnitiumProvider::configure(&config).await.unwrap_err();
    assert!(matches!(
        err,
        ProviderError::Config(ConfigError::MissingCredentials)
    ));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn scope_create_refreshes_only_managed_attributes() {
    let server = MockServer::start().await;
    mount(&server, "/api/dhcp/scopes/set", ok_empty()).await;
    mount(
        &server,
        "/api/dhcp/scopes/get",
        ok(json!({
            "name": "LAN",
            "startingAddress": "192.168.1.100",
            "endingAddress": "192.168.1.200",
            "subnetMask": "255.255.255.0",
            "leaseTimeDays": 1,
            "routerAddress": "192.168.1.1",
            "dnsServers": ["192.168.1.1"]
        })),
    )
    .await;

    let mut plan = lan();
    plan.router_address = Some("192.168.1.1".into());
    let state = lifecycle::apply(&provider(&server).dhcp_scope(), Some(&plan), None)
        .await
        .unwrap();

    assert_eq!(state, Some(plan));
}

#[tokio::test]
async fn scope_rename_updates_in_place() {
    let server = MockServer::start().await;
    mount(&server, "/api/dhcp/scopes/set", ok_empty()).await;
    mount(
        &server,
        "/api/dhcp/scopes/get",
        ok(json!({
            "name": "Office",
            "startingAddress": "192.168.1.100",
            "endingAddress": "192.168.1.200",
            "subnetMask": "255.255.255.0"
        })),
    )
    .await;

    let mut plan = lan();
    plan.name = "Office".into();
    let state = lifecycle::apply(&provider(&server).dhcp_scope(), Some(&plan), Some(&lan()))
        .await
        .unwrap();
    assert_eq!(state.map(|s| s.name), Some("Office".to_string()));

    let query = only_query(&server, "/api/dhcp/scopes/set").await;
    assert_eq!(param(&query, "name"), Some("LAN"));
    assert_eq!(param(&query, "newName"), Some("Office"));
    assert!(queries(&server, "/api/dhcp/scopes/delete").await.is_empty());
}

#[tokio::test]
async fn scope_missing_from_list_reads_as_gone() {
    let server = MockServer::start().await;
    mount(&server, "/api/dhcp/scopes/list", ok(json!({"scopes": []}))).await;

    let state = lifecycle::refresh(&provider(&server).dhcp_scope(), &lan())
        .await
        .unwrap();
    assert_eq!(state, None);
    assert!(queries(&server, "/api/dhcp/scopes/get").await.is_empty());
}

#[tokio::test]
async fn client_errors_carry_an_operation_summary() {
    let server = MockServer::start().await;
    mount(&server, "/api/dhcp/scopes/set", api_error("Invalid subnet mask")).await;

    let err = provider(&server)
        .dhcp_scope()
        .create(&lan())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Could not create DHCP scope LAN: Invalid subnet mask"
    );
}

#[tokio::test]
async fn lease_change_is_delete_then_add() {
    let server = MockServer::start().await;
    mount(&server, "/api/dhcp/scopes/removeReservedLease", ok_empty()).await;
    mount(&server, "/api/dhcp/scopes/addReservedLease", ok_empty()).await;

    let state = DhcpReservedLeaseModel {
        name: "LAN".into(),
        hardware_address: "00-11-22-33-44-55".into(),
        ip_address: "192.168.1.50".into(),
        host_name: None,
        comments: None,
    };
    let mut plan = state.clone();
    plan.ip_address = "192.168.1.51".into();

    assert_eq!(
        lifecycle::decide::<technitium_provider::provider::DhcpReservedLeaseResource>(
            Some(&plan),
            Some(&state)
        ),
        PlannedAction::Replace {
            attributes: vec!["ip_address"]
        }
    );

    let resource = provider(&server).dhcp_reserved_lease();
    let new_state = lifecycle::apply(&resource, Some(&plan), Some(&state))
        .await
        .unwrap();
    assert_eq!(new_state, Some(plan));

    let received: Vec<String> = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(
        received,
        [
            "/api/dhcp/scopes/removeReservedLease",
            "/api/dhcp/scopes/addReservedLease"
        ]
    );
}

#[tokio::test]
async fn zone_create_applies_options_after_creation() {
    let server = MockServer::start().await;
    mount(&server, "/api/zones/create", ok(json!({"domain": "example.com"}))).await;
    mount(&server, "/api/zones/options/set", ok_empty()).await;
    mount(
        &server,
        "/api/zones/options/get",
        ok(json!({
            "name": "example.com",
            "type": "Primary",
            "disabled": false,
            "dnssecStatus": "Unsigned",
            "zoneTransfer": "Deny",
            "notify": "ZoneNameServers"
        })),
    )
    .await;

    let mut plan = DnsZoneModel::new("example.com", ZoneType::Primary);
    plan.zone_transfer = Some("Deny".into());
    let state = provider(&server).dns_zone().create(&plan).await.unwrap();

    assert_eq!(state.zone_transfer.as_deref(), Some("Deny"));
    assert_eq!(state.notify, None);
    assert_eq!(state.dnssec_status.as_deref(), Some("Unsigned"));

    let create = only_query(&server, "/api/zones/create").await;
    assert_eq!(keys(&create), ["zone", "type", "token"]);
    let options = only_query(&server, "/api/zones/options/set").await;
    assert_eq!(param(&options, "zoneTransfer"), Some("Deny"));
}

#[tokio::test]
async fn record_value_change_updates_with_new_value() {
    let server = MockServer::start().await;
    mount(&server, "/api/zones/records/update", ok_empty()).await;
    mount(
        &server,
        "/api/zones/records/get",
        ok(json!({
            "zone": {"name": "example.com"},
            "records": [{
                "name": "www.example.com",
                "type": "A",
                "ttl": 3600,
                "rData": {"ipAddress": "192.0.2.20"}
            }]
        })),
    )
    .await;

    let state = DnsZoneRecordModel {
        domain: "www.example.com".into(),
        zone: "example.com".into(),
        record_type: "A".into(),
        ttl: Some(3600),
        ip_address: Some("192.0.2.10".into()),
        ..Default::default()
    };
    let mut plan = state.clone();
    plan.ip_address = Some("192.0.2.20".into());

    let resource = provider(&server).dns_zone_record();
    let new_state = lifecycle::apply(&resource, Some(&plan), Some(&state))
        .await
        .unwrap();
    assert_eq!(new_state, Some(plan));

    let query = only_query(&server, "/api/zones/records/update").await;
    assert_eq!(param(&query, "domain"), Some("www.example.com"));
    assert_eq!(param(&query, "newDomain"), None);
    assert_eq!(param(&query, "ipAddress"), Some("192.0.2.10"));
    assert_eq!(param(&query, "newIpAddress"), Some("192.0.2.20"));
}

#[tokio::test]
async fn disabled_record_is_added_then_disabled() {
    let server = MockServer::start().await;
    mount(&server, "/api/zones/records/add", ok(json!({"addedRecord": {}}))).await;
    mount(&server, "/api/zones/records/update", ok_empty()).await;
    mount(
        &server,
        "/api/zones/records/get",
        ok(json!({
            "zone": {"name": "example.com"},
            "records": [{
                "name": "www.example.com",
                "type": "A",
                "ttl": 3600,
                "disabled": true,
                "rData": {"ipAddress": "192.0.2.10"}
            }]
        })),
    )
    .await;

    let plan = DnsZoneRecordModel {
        domain: "www.example.com".into(),
        zone: "example.com".into(),
        record_type: "A".into(),
        ttl: Some(3600),
        disabled: Some(true),
        ip_address: Some("192.0.2.10".into()),
        ..Default::default()
    };
    let state = provider(&server).dns_zone_record().create(&plan).await.unwrap();
    assert_eq!(state, plan);

    let add = only_query(&server, "/api/zones/records/add").await;
    assert_eq!(param(&add, "disable"), None);
    let update = only_query(&server, "/api/zones/records/update").await;
    assert_eq!(param(&update, "disable"), Some("true"));
    assert_eq!(param(&update, "ipAddress"), Some("192.0.2.10"));
    assert_eq!(param(&update, "newIpAddress"), None);
}

#[tokio::test]
async fn record_missing_after_create_is_not_found() {
    let server = MockServer::start().await;
    mount(&server, "/api/zones/records/add", ok(json!({"addedRecord": {}}))).await;
    mount(
        &server,
        "/api/zones/records/get",
        ok(json!({"zone": {"name": "example.com"}, "records": []})),
    )
    .await;

    let plan = DnsZoneRecordModel {
        domain: "www.example.com".into(),
        zone: "example.com".into(),
        record_type: "A".into(),
        ip_address: Some("192.0.2.10".into()),
        ..Default::default()
    };
    let err = provider(&server)
        .dns_zone_record()
        .create(&plan)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::NotFound(_)), "{err:?}");
}

#[tokio::test]
async fn record_data_source_filters_by_type() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/api/zones/records/get",
        ok(json!({
            "zone": {"name": "example.com"},
            "records": [
                {"name": "example.com", "type": "SOA", "ttl": 900,
                 "rData": {"primaryNameServer": "ns1.example.com"}},
                {"name": "example.com", "type": "MX", "ttl": 3600,
                 "rData": {"preference": 10, "exchange": "mail.example.com"}}
            ]
        })),
    )
    .await;

    let source = provider(&server).dns_zone_record_data_source();
    let query = serde_json::from_value(json!({"domain": "example.com", "type": "mx"})).unwrap();
    let record = source.read(&query).await.unwrap();
    assert_eq!(record.exchange.as_deref(), Some("mail.example.com"));
    assert_eq!(record.preference, Some(10));

    let query = serde_json::from_value(json!({"domain": "example.com", "type": "TXT"})).unwrap();
    assert!(matches!(
        source.read(&query).await,
        Err(ProviderError::NotFound(_))
    ));
}

#[tokio::test]
async fn zones_data_source_lists_every_zone() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/api/zones/list",
        ok(json!({"zones": [
            {"name": "example.com", "type": "Primary", "dnssecStatus": "Unsigned"},
            {"name": "corp.internal", "type": "Forwarder", "disabled": true}
        ]})),
    )
    .await;

    let source = provider(&server).dns_zones_data_source();
    let zones = source.read(&Default::default()).await.unwrap();
    assert_eq!(zones.len(), 2);
    assert_eq!(zones[1].zone_type, ZoneType::Forwarder);
    assert!(zones[1].disabled);
}
