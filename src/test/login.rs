use axum::http::StatusCode;

use crate::{
    config::AppConfig,
    test::{body_string, location, session_cookie, setup, setup_with, test_config},
};

#[tokio::test]
async fn sign_in_link_works_once() {
    let t = setup();
    let response = t
        .post("/login", None, &[("email", " Voter@Example.com ")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // emails are stored lowercased
    let token = t.latest_token("voter@example.com");
    let uri = format!("/auth/callback?token={token}&next=%2Fvote");

    let response = t.get(&uri, None).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/vote");
    let cookie = session_cookie(&response);

    let home = body_string(t.get("/", Some(&cookie)).await).await;
    assert!(home.contains("voter@example.com"));

    let response = t.get(&uri, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_emails_get_no_link() {
    let t = setup();
    let response = t.post("/login", None, &[("email", "not an email")]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = t
        .get("/auth/callback?token=made-up", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn links_can_be_shown_for_local_use() {
    let t = setup_with(AppConfig {
        show_login_links: true,
        ..test_config()
    });
    let page = body_string(
        t.post("/login", None, &[("email", "voter@example.com")])
            .await,
    )
    .await;
    let token = t.latest_token("voter@example.com");
    assert!(page.contains("id=\"login-link\""));
    assert!(page.contains(&token));
}

#[tokio::test]
async fn garbage_cookies_are_not_sessions() {
    let t = setup();
    t.seed_challenge(1, &["Alpha", "Bravo", "Charlie"], true);

    let response = t.get("/vote", Some("tunevote_session=forged")).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn signing_out_clears_the_cookie() {
    let t = setup();
    let cookie = t.sign_in("voter@example.com").await;

    let response = t.post("/logout", Some(&cookie), &[]).await;
    assert!(response.status().is_redirection());
    let cleared = session_cookie(&response);
    assert!(cleared.starts_with("tunevote_session="));

    let home = body_string(t.get("/", Some(&cleared)).await).await;
    assert!(home.contains("Sign in"));
    assert!(!home.contains("voter@example.com"));
}
