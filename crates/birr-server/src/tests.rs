//! In-process API tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use birr_core::{run_forecast, Dataset, ForecastConfig, ForecastSet};

use crate::create_router;

const FIXTURE: &str = "\
id,record_type,date,pillar,category,indicator,value,event_ref,indicator_ref,lag_months,effect,target_value,target_date,source,description
OBS-001,observation,2014,Access,,ACC_OWNERSHIP,22,,,,,,,Findex,
OBS-002,observation,2017,Access,,ACC_OWNERSHIP,35,,,,,,,Findex,
OBS-003,observation,2021,Access,,ACC_OWNERSHIP,46,,,,,,,Findex,
OBS-004,observation,2017,Usage,,USG_DIGITAL_PAYMENT,11.9,,,,,,,Findex,
OBS-005,observation,2021,Usage,,USG_DIGITAL_PAYMENT,20.3,,,,,,,Findex,
EVT-001,event,2021-05,,product_launch,,,,,,,,,,Telebirr launched
IMP-001,impact_link,,,,,,EVT-001,Usage,12,2.5,,,,Onboarding surge
TGT-001,target,,,,ACC_OWNERSHIP,,,,,,60,2027-12-31,NFIS-II,Headline target
";

fn dataset() -> Dataset {
    Dataset::read_csv(FIXTURE.as_bytes()).unwrap()
}

fn forecasts() -> ForecastSet {
    run_forecast(&dataset(), &ForecastConfig::default()).unwrap()
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_overview() {
    let app = create_router(dataset(), Some(forecasts()), None);
    let (status, body) = get(app, "/api/overview").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["observations"], 5);
    assert_eq!(body["summary"]["events"], 1);
    assert_eq!(body["latest_access"]["value"], 46.0);

    // 2027 base forecast against the 60% target
    let headline = &body["headline_forecast"];
    assert_eq!(headline["year"], 2027);
    assert_eq!(headline["target"], 60.0);
    assert!(headline["target_gap"].is_number());
}

#[tokio::test]
async fn test_records_filtering() {
    let app = create_router(dataset(), None, None);
    let (status, body) = get(app, "/api/records?record_type=event").await;

    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], "EVT-001");
}

#[tokio::test]
async fn test_records_rejects_unknown_kind() {
    let app = create_router(dataset(), None, None);
    let (status, body) = get(app, "/api/records?record_type=measurement").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("measurement"));
}

#[tokio::test]
async fn test_coverage_reports_gaps() {
    let app = create_router(dataset(), None, None);
    let (status, body) = get(app, "/api/coverage").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["years"], serde_json::json!([2014, 2017, 2021]));
    // Usage was not surveyed in 2014
    let gaps = body["gaps"].as_array().unwrap();
    assert!(gaps
        .iter()
        .any(|g| g["indicator"] == "USG_DIGITAL_PAYMENT" && g["year"] == 2014));
}

#[tokio::test]
async fn test_trends_unknown_indicator_404() {
    let app = create_router(dataset(), None, None);
    let (status, _) = get(app, "/api/trends/ACC_UNKNOWN").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trends_includes_forecasts_when_loaded() {
    let app = create_router(dataset(), Some(forecasts()), None);
    let (status, body) = get(app, "/api/trends/ACC_OWNERSHIP").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["series"].as_array().unwrap().len(), 3);
    assert_eq!(body["targets"].as_array().unwrap().len(), 1);
    // 3 years x 3 scenarios
    assert_eq!(body["forecasts"].as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn test_events_joined() {
    let app = create_router(dataset(), None, None);
    let (status, body) = get(app, "/api/events").await;

    assert_eq!(status, StatusCode::OK);
    let overlay = body.as_array().unwrap();
    assert_eq!(overlay.len(), 1);
    assert_eq!(overlay[0]["event"]["id"], "EVT-001");
    assert_eq!(overlay[0]["indicators"][0], "USG_DIGITAL_PAYMENT");
}

#[tokio::test]
async fn test_forecasts_404_without_artifacts() {
    let app = create_router(dataset(), None, None);
    let (status, body) = get(app, "/api/forecasts").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("birr forecast"));
}

#[tokio::test]
async fn test_forecasts_scenario_filter() {
    let app = create_router(dataset(), Some(forecasts()), None);
    let (status, body) = get(app, "/api/forecasts?scenario=optimistic").await;

    assert_eq!(status, StatusCode::OK);
    let points = body.as_array().unwrap();
    // 2 indicators x 3 years
    assert_eq!(points.len(), 6);
    assert!(points.iter().all(|p| p["scenario"] == "optimistic"));
}
