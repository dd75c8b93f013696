//! Integration tests for `RecordsClient` using wiremock HTTP mocks.

use tenantdesk_core::{TenantRecord, VendorRecord};
use tenantdesk_records::{
    ClientOptions, RecordsClient, RecordsError, TenantUpdate, VendorPayload, VendorUpdate,
};
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> RecordsClient {
    let options = ClientOptions {
        retry_backoff_base_ms: 0,
        ..ClientOptions::default()
    };
    RecordsClient::with_base_url(base_url, &options).expect("client construction should not fail")
}

fn stage(server: &MockServer) -> String {
    format!("{}/multi_tenant", server.uri())
}

#[tokio::test]
async fn list_tenants_returns_records() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "statusCode": 200,
        "headers": { "Content-Type": "application/json" },
        "body": {
            "type": "tenant",
            "count": 2,
            "data": [
                { "tenant_id": "t-1", "tenant_name": "Acme", "status": "active", "domain": "acme.example" },
                { "tenant_id": "t-2", "tenant_name": "Globex", "status": "inactive" }
            ]
        }
    });
    Mock::given(method("POST"))
        .and(path("/multi_tenant/tenantandvendor"))
        .and(body_json(serde_json::json!({ "type": "tenant" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let tenants = test_client(&stage(&server))
        .list_tenants()
        .await
        .expect("should parse tenants");

    assert_eq!(tenants.len(), 2);
    assert_eq!(tenants[0].tenant_name, "Acme");
    assert_eq!(tenants[1].status, "inactive");
    assert!(tenants[1].domain.is_empty());
}

#[tokio::test]
async fn list_vendors_sends_tenant_id() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "statusCode": 200,
        "body": {
            "type": "vendor",
            "count": 1,
            "data": [{
                "vendor_id": "v-1",
                "vendor_name": "Corner Store",
                "tenant_id": "t-1",
                "vendor_location": { "latitude": "17.4482947", "longitude": "78.3753447" }
            }]
        }
    });
    Mock::given(method("POST"))
        .and(path("/multi_tenant/tenantandvendor"))
        .and(body_json(serde_json::json!({ "type": "vendor", "tenant_id": "t-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let vendors = test_client(&stage(&server))
        .list_vendors("t-1")
        .await
        .expect("should parse vendors");

    assert_eq!(vendors.len(), 1);
    let location = vendors[0].vendor_location.as_ref().expect("location");
    assert_eq!(location.latitude, "17.4482947");
}

#[tokio::test]
async fn list_without_data_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/multi_tenant/tenantandvendor"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "statusCode": 200, "body": { "type": "tenant" } })),
        )
        .mount(&server)
        .await;

    let err = test_client(&stage(&server)).list_tenants().await.unwrap_err();
    assert!(matches!(err, RecordsError::Api { status_code: 200, .. }));
}

#[tokio::test]
async fn list_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/multi_tenant/tenantandvendor"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/multi_tenant/tenantandvendor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "statusCode": 200,
            "body": { "type": "tenant", "count": 0, "data": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tenants: Vec<TenantRecord> = test_client(&stage(&server))
        .list_tenants()
        .await
        .expect("second attempt should succeed");
    assert!(tenants.is_empty());
}

#[tokio::test]
async fn list_does_not_retry_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/multi_tenant/tenantandvendor"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&stage(&server)).list_vendors("t-1").await.unwrap_err();
    assert_eq!(err.status_code(), Some(403));
}

#[tokio::test]
async fn create_vendor_posts_normalized_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/multi_tenant/create_vendor"))
        .and(body_partial_json(serde_json::json!({
            "vendor_name": "Corner Store",
            "tenant_id": "t-1",
            "vendor_location": { "latitude": "", "longitude": "", "vendor_address": "", "address_name": "" }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "statusCode": 200, "message": "Vendor created" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut draft = tenantdesk_core::VendorDraft::new(&tenantdesk_core::DraftDefaults::for_tenant(
        "t-1", "",
    ));
    draft.name = " Corner Store ".to_owned();
    let payload = VendorPayload::from_draft(&draft, "t-1");

    let response = test_client(&stage(&server))
        .create_vendor(&payload)
        .await
        .expect("create should succeed");
    assert_eq!(response.message.as_deref(), Some("Vendor created"));
}

#[tokio::test]
async fn create_vendor_is_never_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/multi_tenant/create_vendor"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let payload = VendorPayload::from_draft(
        &tenantdesk_core::VendorDraft::new(&tenantdesk_core::DraftDefaults::default()),
        "t-1",
    );
    let err = test_client(&stage(&server))
        .create_vendor(&payload)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(502));
}

#[tokio::test]
async fn create_vendor_non_200_status_code_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/multi_tenant/create_vendor"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "statusCode": 409, "message": "duplicate email" })),
        )
        .mount(&server)
        .await;

    let payload = VendorPayload::from_draft(
        &tenantdesk_core::VendorDraft::new(&tenantdesk_core::DraftDefaults::default()),
        "t-1",
    );
    let err = test_client(&stage(&server))
        .create_vendor(&payload)
        .await
        .unwrap_err();
    match err {
        RecordsError::Api {
            status_code,
            message,
        } => {
            assert_eq!(status_code, 409);
            assert_eq!(message, "duplicate email");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn update_vendor_and_tenant_use_edit_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/multi_tenant/edit_detail"))
        .and(body_partial_json(serde_json::json!({ "type": "vendor", "vendor_id": "v-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "statusCode": 200 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/multi_tenant/edit_detail"))
        .and(body_partial_json(serde_json::json!({ "type": "tenant", "tenant_id": "t-1", "status": "inactive" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "statusCode": 200 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&stage(&server));
    let vendor = VendorRecord {
        vendor_id: "v-1".to_owned(),
        vendor_name: "Corner Store".to_owned(),
        ..VendorRecord::default()
    };
    client
        .update_vendor(&VendorUpdate::from(&vendor))
        .await
        .expect("vendor update should succeed");

    let tenant = TenantRecord {
        tenant_id: "t-1".to_owned(),
        status: "inactive".to_owned(),
        ..TenantRecord::default()
    };
    client
        .update_tenant(&TenantUpdate::from(&tenant))
        .await
        .expect("tenant update should succeed");
}

#[tokio::test]
async fn edit_accepts_2xx_without_status_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/multi_tenant/edit_detail"))
        .and(body_partial_json(serde_json::json!({ "type": "vendor" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "message": "Updated" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/multi_tenant/edit_detail"))
        .and(body_partial_json(serde_json::json!({ "type": "tenant" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&stage(&server));
    let reply = client
        .update_vendor(&VendorUpdate::from(&VendorRecord::default()))
        .await
        .expect("2xx without statusCode is a success");
    assert_eq!(reply.status_code, None);
    assert_eq!(reply.message.as_deref(), Some("Updated"));

    client
        .update_tenant(&TenantUpdate::from(&TenantRecord::default()))
        .await
        .expect("empty 2xx body is a success");
}

#[tokio::test]
async fn edit_rejects_present_non_200_status_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/multi_tenant/edit_detail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({ "statusCode": 404, "message": "tenant not found" }),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&stage(&server));
    let err = client
        .update_tenant(&TenantUpdate::from(&TenantRecord::default()))
        .await
        .unwrap_err();

    match err {
        RecordsError::Api {
            status_code,
            message,
        } => {
            assert_eq!(status_code, 404);
            assert_eq!(message, "tenant not found");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}
