use axum_test::TestServer;

use crate::test::setup;

#[tokio::test]
async fn home_page_renders() {
    let t = setup();
    let server = TestServer::new(t.app.clone()).unwrap();

    let response = server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("No challenge is running"));

    t.seed_challenge(4, &["Alpha"], true);
    let response = server.get("/").await;
    response.assert_status_ok();
    let page = response.text();
    assert!(page.contains("Challenge #4: Challenge 4"));
    assert!(page.contains("Alpha"));
    assert!(page.contains("Nobody has voted yet."));
}
