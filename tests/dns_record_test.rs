mod common;

use common::*;
use serde_json::json;
use technitium_provider::ClientError;
use technitium_provider::technitium::{AddressData, DnsZoneRecord, RecordData};
use wiremock::MockServer;

fn a_record(domain: &str, ip: &str) -> DnsZoneRecord {
    DnsZoneRecord {
        domain: domain.into(),
        zone: "example.com".into(),
        ttl: Some(3600),
        disabled: None,
        comments: None,
        expiry_ttl: None,
        data: RecordData::A(AddressData {
            ip_address: ip.into(),
            ..Default::default()
        }),
    }
}

fn records_response() -> serde_json::Value {
    json!({
        "zone": {"name": "example.com", "type": "Primary", "disabled": false},
        "records": [
            {
                "name": "www.example.com",
                "type": "A",
                "ttl": 3600,
                "disabled": false,
                "rData": {"ipAddress": "192.0.2.10"}
            },
            {
                "name": "www.example.com",
                "type": "A",
                "ttl": 3600,
                "disabled": false,
                "rData": {"ipAddress": "192.0.2.11"}
            },
            {
                "name": "www.example.com",
                "type": "TXT",
                "ttl": 300,
                "disabled": true,
                "comments": "verification",
                "rData": {"text": "v=spf1 -all", "splitText": false}
            }
        ]
    })
}

#[tokio::test]
async fn delete_of_missing_record_succeeds() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/api/zones/records/delete",
        api_error("Cannot delete record: no such record exists"),
    )
    .await;

    client(&server)
        .delete_dns_zone_record(&a_record("gone.example.com", "192.0.2.1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn other_delete_errors_propagate() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/api/zones/records/delete",
        api_error("No such zone was found: example.com"),
    )
    .await;

    let err = client(&server)
        .delete_dns_zone_record(&a_record("www.example.com", "192.0.2.1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Api { .. }), "{err:?}");
}

#[tokio::test]
async fn update_with_new_domain_sends_both_names() {
    let server = MockServer::start().await;
    mount(&server, "/api/zones/records/update", ok_empty()).await;

    let prior = a_record("old.example.com", "192.0.2.1");
    let desired = a_record("new.example.com", "192.0.2.1");
    client(&server)
        .update_dns_zone_record(&desired, Some(&prior))
        .await
        .unwrap();

    let query = only_query(&server, "/api/zones/records/update").await;
    assert_eq!(param(&query, "domain"), Some("old.example.com"));
    assert_eq!(param(&query, "newDomain"), Some("new.example.com"));
    assert_eq!(param(&query, "ipAddress"), Some("192.0.2.1"));
    assert_eq!(param(&query, "newIpAddress"), None);
}

#[tokio::test]
async fn upsert_without_prior_adds() {
    let server = MockServer::start().await;
    mount(&server, "/api/zones/records/add", ok(json!({"addedRecord": {}}))).await;

    client(&server)
        .upsert_dns_zone_record(&a_record("www.example.com", "192.0.2.10"), None)
        .await
        .unwrap();

    let query = only_query(&server, "/api/zones/records/add").await;
    assert_eq!(
        keys(&query),
        ["domain", "zone", "type", "ttl", "ipAddress", "token"]
    );
    assert!(queries(&server, "/api/zones/records/update").await.is_empty());
}

#[tokio::test]
async fn records_are_decoded_into_typed_variants() {
    let server = MockServer::start().await;
    mount(&server, "/api/zones/records/get", ok(records_response())).await;

    let records = client(&server)
        .get_dns_zone_records("www.example.com", None)
        .await
        .unwrap();

    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.zone == "example.com"));
    assert_eq!(
        records[2].data,
        RecordData::Txt {
            text: "v=spf1 -all".into(),
            split_text: Some(false)
        }
    );
    assert_eq!(records[2].comments.as_deref(), Some("verification"));
    assert_eq!(records[2].disabled, Some(true));

    let query = only_query(&server, "/api/zones/records/get").await;
    assert_eq!(param(&query, "listZone"), Some("true"));
    assert_eq!(param(&query, "zone"), None);
}

#[tokio::test]
async fn find_picks_record_by_discriminator() {
    let server = MockServer::start().await;
    mount(&server, "/api/zones/records/get", ok(records_response())).await;

    let found = client(&server)
        .find_dns_zone_record(&a_record("www.example.com", "192.0.2.11"))
        .await
        .unwrap()
        .expect("second A record matches");
    assert_eq!(found.data.discriminator(), Some("192.0.2.11"));

    let query = only_query(&server, "/api/zones/records/get").await;
    assert_eq!(param(&query, "zone"), Some("example.com"));
}

#[tokio::test]
async fn type_change_is_refused_before_any_request() {
    let server = MockServer::start().await;

    let prior = a_record("www.example.com", "192.0.2.10");
    let mut desired = prior.clone();
    desired.data = RecordData::Cname {
        cname: "web.example.com".into(),
    };
    let err = client(&server)
        .update_dns_zone_record(&desired, Some(&prior))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidRequest(_)), "{err:?}");
    assert_eq!(request_count(&server).await, 0);
}
