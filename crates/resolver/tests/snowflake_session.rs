use resolver::config::SnowflakeConfig;
use resolver::warehouse::{SnowflakeWarehouse, Statement, Warehouse, WarehouseError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "session-token-123";

fn config_for(server: &MockServer) -> SnowflakeConfig {
  SnowflakeConfig {
    account: "xy12345.us-east-1".into(),
    user: "analyst".into(),
    password: "hunter2".into(),
    warehouse: "COMPUTE_WH".into(),
    database: "OPS".into(),
    schema: "INCIDENTS".into(),
    role: Some("ANALYST".into()),
    host: Some(server.uri()),
  }
}

fn auth_header() -> String {
  format!("Snowflake Token=\"{TOKEN}\"")
}

async fn mount_login(server: &MockServer) {
  Mock::given(method("POST"))
    .and(path("/session/v1/login-request"))
    .and(query_param("warehouse", "COMPUTE_WH"))
    .and(query_param("databaseName", "OPS"))
    .and(query_param("schemaName", "INCIDENTS"))
    .and(query_param("roleName", "ANALYST"))
    .and(body_partial_json(json!({
      "data": { "ACCOUNT_NAME": "xy12345", "LOGIN_NAME": "analyst", "PASSWORD": "hunter2" }
    })))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "data": { "token": TOKEN, "masterToken": "master" },
      "code": null,
      "message": null,
      "success": true
    })))
    .expect(1)
    .mount(server)
    .await;
}

async fn mount_close(server: &MockServer, expected_calls: u64) {
  Mock::given(method("POST"))
    .and(path("/session"))
    .and(query_param("delete", "true"))
    .and(header("authorization", auth_header().as_str()))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "data": null, "code": null, "message": null, "success": true
    })))
    .expect(expected_calls)
    .mount(server)
    .await;
}

#[tokio::test]
async fn login_query_and_close_round_trip() {
  let server = MockServer::start().await;
  mount_login(&server).await;
  mount_close(&server, 1).await;

  Mock::given(method("POST"))
    .and(path("/queries/v1/query-request"))
    .and(header("authorization", auth_header().as_str()))
    .and(body_partial_json(json!({
      "sqlText": "SELECT ?",
      "bindings": { "1": { "type": "TEXT", "value": "API gateway timeout" } }
    })))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "data": { "queryId": "01b2", "rowset": [["[]"]] },
      "code": null,
      "message": null,
      "success": true
    })))
    .expect(1)
    .mount(&server)
    .await;

  let warehouse = SnowflakeWarehouse::new(config_for(&server)).unwrap();
  let session = warehouse.connect().await.unwrap();

  let value = session.query_scalar(&Statement::new("SELECT ?").bind("API gateway timeout")).await.unwrap();
  assert_eq!(value.as_deref(), Some("[]"));

  session.close().await.unwrap();
  // Closing twice is a no-op against the server.
  session.close().await.unwrap();

  let after_close = session.query_scalar(&Statement::new("SELECT 1")).await;
  assert!(matches!(after_close, Err(WarehouseError::Closed)));
}

#[tokio::test]
async fn rejected_login_surfaces_snowflake_message() {
  let server = MockServer::start().await;

  Mock::given(method("POST"))
    .and(path("/session/v1/login-request"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "data": { "nextAction": "RETRY_LOGIN" },
      "code": "390100",
      "message": "Incorrect username or password was specified.",
      "success": false
    })))
    .mount(&server)
    .await;

  let warehouse = SnowflakeWarehouse::new(config_for(&server)).unwrap();
  let err = warehouse.connect().await.err().expect("login should fail");

  assert!(err.to_string().contains("Incorrect username or password"));
  assert!(err.to_string().contains("390100"));
}

#[tokio::test]
async fn running_queries_are_polled_until_complete() {
  let server = MockServer::start().await;
  mount_login(&server).await;
  mount_close(&server, 1).await;

  Mock::given(method("POST"))
    .and(path("/queries/v1/query-request"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "data": { "queryId": "01b3", "getResultUrl": "/queries/01b3/result" },
      "code": "333334",
      "message": "Asynchronous execution in progress.",
      "success": true
    })))
    .expect(1)
    .mount(&server)
    .await;

  Mock::given(method("GET"))
    .and(path("/queries/01b3/result"))
    .and(header("authorization", auth_header().as_str()))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "data": { "queryId": "01b3", "rowset": [["1. Similar Incident IDs:\n   - None"]] },
      "code": null,
      "message": null,
      "success": true
    })))
    .expect(1)
    .mount(&server)
    .await;

  let warehouse = SnowflakeWarehouse::new(config_for(&server)).unwrap();
  let session = warehouse.connect().await.unwrap();

  let value = session.query_scalar(&Statement::new("SELECT 1")).await.unwrap();
  assert_eq!(value.as_deref(), Some("1. Similar Incident IDs:\n   - None"));

  session.close().await.unwrap();
}

#[tokio::test]
async fn http_failures_become_rejections() {
  let server = MockServer::start().await;
  mount_login(&server).await;
  mount_close(&server, 1).await;

  Mock::given(method("POST"))
    .and(path("/queries/v1/query-request"))
    .respond_with(ResponseTemplate::new(503).set_body_string("service unavailable"))
    .mount(&server)
    .await;

  let warehouse = SnowflakeWarehouse::new(config_for(&server)).unwrap();
  let session = warehouse.connect().await.unwrap();

  match session.query_scalar(&Statement::new("SELECT 1")).await {
    Err(WarehouseError::Rejected { code, message }) => {
      assert_eq!(code, "503");
      assert_eq!(message, "service unavailable");
    }
    other => panic!("expected rejection, got {other:?}"),
  }

  session.close().await.unwrap();
}

#[tokio::test]
async fn non_json_responses_are_protocol_errors() {
  let server = MockServer::start().await;
  mount_login(&server).await;
  mount_close(&server, 0).await;

  Mock::given(method("POST"))
    .and(path("/queries/v1/query-request"))
    .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy login</html>"))
    .mount(&server)
    .await;

  let warehouse = SnowflakeWarehouse::new(config_for(&server)).unwrap();
  let session = warehouse.connect().await.unwrap();

  let result = session.query_scalar(&Statement::new("SELECT 1")).await;
  assert!(matches!(result, Err(WarehouseError::Protocol(_))));
}
