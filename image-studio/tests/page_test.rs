mod common;

use axum::http::StatusCode;
use common::{generation_form, TestApp};
use image_studio::error::MISSING_PROMPT_MESSAGE;
use image_studio::services::providers::MockImageProvider;

#[tokio::test]
async fn successful_submission_renders_inline_image() {
    let (app, provider) =
        TestApp::spawn_with_mock(MockImageProvider::returning(vec![1, 2, 3])).await;

    let response = app.post_page(generation_form("orange cat", &[4, 4])).await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let html = response.text().await.unwrap();
    assert!(html.contains("src=\"data:image/png;base64,AQID\""));
    assert!(html.contains("orange cat"));
    assert!(!html.contains("role=\"alert\""));
    assert_eq!(provider.calls().await[0].image_names.len(), 2);
}

#[tokio::test]
async fn missing_prompt_renders_error_banner() {
    let (app, provider) = TestApp::spawn_with_mock(MockImageProvider::default()).await;

    let response = app.post_page(generation_form("", &[])).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = response.text().await.unwrap();
    assert!(html.contains("role=\"alert\""));
    assert!(html.contains(MISSING_PROMPT_MESSAGE));
    assert!(!html.contains("class=\"result\""));
    assert!(provider.calls().await.is_empty());
}

#[tokio::test]
async fn generation_failure_renders_error_banner() {
    let (app, _) = TestApp::spawn_with_mock(MockImageProvider::failing("quota exceeded")).await;

    let response = app.post_page(generation_form("castle", &[])).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = response.text().await.unwrap();
    assert!(html.contains("quota exceeded"));
    assert!(!html.contains("class=\"result\""));
}

#[tokio::test]
async fn failed_submission_keeps_prompt_in_form() {
    let (app, _) = TestApp::spawn_with_mock(MockImageProvider::failing("quota exceeded")).await;

    let response = app.post_page(generation_form("castle on a cliff", &[3])).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = response.text().await.unwrap();
    assert!(html.contains("required>castle on a cliff</textarea>"));
}

#[tokio::test]
async fn prompt_is_html_escaped() {
    let (app, _) = TestApp::spawn_with_mock(MockImageProvider::default()).await;

    let response = app
        .post_page(generation_form("<script>alert(1)</script>", &[]))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(!html.contains("<script>alert(1)</script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn page_gets_csp_allowing_data_images() {
    let (app, _) = TestApp::spawn_with_mock(MockImageProvider::default()).await;

    let response = app
        .client
        .get(format!("{}/", app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    let csp = response.headers()["content-security-policy"]
        .to_str()
        .unwrap()
        .to_string();
    assert!(csp.contains("img-src 'self' data:"));
}
