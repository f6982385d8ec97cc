use axum::http::StatusCode;

use crate::test::{ADMIN_EMAIL, TestApp, body_string, setup, vote_form};

/// Three voters in an active challenge of three songs. Alpha wins with two
/// best votes.
async fn contest() -> (TestApp, String) {
    let t = setup();
    let (_, cats) = t.seed_challenge(1, &["Alpha", "Bravo", "Charlie"], true);
    for (email, name, [best, nice, own]) in [
        ("ana@example.com", "Ana", [0, 1, 2]),
        ("bob@example.com", "Bob", [0, 2, 1]),
        ("cat@example.com", "Cat", [1, 0, 2]),
    ] {
        let cookie = t.sign_in(email).await;
        let response = t
            .post(
                "/vote",
                Some(&cookie),
                &vote_form(name, &cats[best], &cats[nice], &cats[own]),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let admin = t.sign_in(ADMIN_EMAIL).await;
    (t, admin)
}

#[tokio::test]
async fn results_are_hidden_until_published() {
    let (t, admin) = contest().await;

    let response = t.get("/results", None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let page = body_string(response).await;
    assert!(page.contains("Results are not available yet"));
    assert!(page.contains("http-equiv=\"refresh\""));
    assert!(!page.contains("Alpha"));

    let voter = t.sign_in("ana@example.com").await;
    let response = t.get("/results", Some(&voter)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = t.get("/results", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    assert!(page.contains("only visible to you as an admin"));
    assert!(page.contains("Alpha"));
}

#[tokio::test]
async fn published_results_show_the_ranking() {
    let (t, admin) = contest().await;

    let response = t
        .post("/admin/settings", Some(&admin), &[("results_public", "true")])
        .await;
    assert!(response.status().is_redirection());

    let response = t.get("/results", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    assert!(page.contains("3 votes counted"));
    assert!(!page.contains("only visible to you as an admin"));

    let alpha = page.find("Alpha").unwrap();
    let bravo = page.find("Bravo").unwrap();
    // the podium lists second place first, the table follows
    assert!(page[alpha..].contains("Bravo"));
    assert!(bravo < alpha);

    let response = t
        .post("/admin/settings", Some(&admin), &[("results_public", "false")])
        .await;
    assert!(response.status().is_redirection());
    assert_eq!(
        t.get("/results", None).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn only_admins_change_visibility() {
    let (t, _) = contest().await;
    let voter = t.sign_in("ana@example.com").await;

    let response = t
        .post("/admin/settings", Some(&voter), &[("results_public", "true")])
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        t.get("/results", None).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn ranking_json_follows_visibility() {
    let (t, admin) = contest().await;

    assert_eq!(
        t.get("/api/results", None).await.status(),
        StatusCode::FORBIDDEN
    );

    let response = t.get("/api/results", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let ranking: serde_json::Value =
        serde_json::from_str(&body_string(response).await).unwrap();

    assert_eq!(ranking["total_votes"], 3);
    let results = ranking["results"].as_array().unwrap();
    let summary: Vec<(&str, u64, u64, u64)> = results
        .iter()
        .map(|r| {
            (
                r["category_name"].as_str().unwrap(),
                r["best_votes"].as_u64().unwrap(),
                r["nice_votes"].as_u64().unwrap(),
                r["position"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![("Alpha", 2, 1, 1), ("Bravo", 1, 1, 2), ("Charlie", 0, 1, 3)]
    );
    // votes are tallied newest first, so the latest claim on Charlie wins
    assert_eq!(results[2]["submitted_by"], "Cat");
    assert_eq!(results[1]["submitted_by"], "Bob");
}
