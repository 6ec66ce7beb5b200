//! End-to-end tests for the JSON API
//!
//! These tests drive the full router through `axum_test::TestServer`:
//! catalog search, filtering and ordering, review submission and the
//! currency switch.

use axum::http::StatusCode;
use axum_test::TestServer;
use nursery::prelude::*;
use serde_json::{Value, json};

// =============================================================================
// Helpers
// =============================================================================

const PASSWORD: &str = "secret123";

/// Four facilities with a tie on rating (Sunny Hills / Berlin Kids)
fn test_catalog() -> Vec<Facility> {
    vec![
        Facility::new("Little Explorers", "Berlin", 4.8, 950)
            .with_country("Germany")
            .with_curriculum(["Montessori", "Bilingual"]),
        Facility::new("Sunny Hills", "Munich", 4.5, 780)
            .with_country("Germany")
            .with_curriculum(["Waldorf"]),
        Facility::new("Happy Stars", "Dubai", 4.6, 1400)
            .with_country("UAE")
            .with_curriculum(["British", "EYFS"]),
        Facility::new("Berlin Kids", "Hamburg", 4.5, 690).with_curriculum(["Montessori"]),
    ]
}

fn create_test_server() -> TestServer {
    let app = ServerBuilder::new()
        .with_facility_service(InMemoryFacilityService::with_facilities(test_catalog()))
        .with_password_hasher(Argon2PasswordHasher::new(8, 1).expect("valid argon2 parameters"))
        .build()
        .expect("Failed to build app");

    let mut server = TestServer::try_new(app).expect("Failed to create test server");
    server.save_cookies();
    server
}

async fn sign_up_and_log_in(server: &TestServer, username: &str) {
    let email = format!("{}@example.com", username);
    server
        .post("/signup")
        .form(&[
            ("username", username),
            ("email", email.as_str()),
            ("password", PASSWORD),
            ("confirm_password", PASSWORD),
        ])
        .await
        .assert_status_ok();

    server
        .post("/login")
        .form(&[("username", username), ("password", PASSWORD)])
        .await
        .assert_status(StatusCode::SEE_OTHER);
}

async fn names(server: &TestServer, query: &str) -> Vec<String> {
    let response = server.get(&format!("/api/nurseries{}", query)).await;
    response.assert_status_ok();
    response
        .json::<Vec<FacilitySummary>>()
        .into_iter()
        .map(|f| f.name)
        .collect()
}

async fn nursery_id(server: &TestServer, name: &str) -> Uuid {
    server
        .get("/api/nurseries")
        .await
        .json::<Vec<FacilitySummary>>()
        .into_iter()
        .find(|f| f.name == name)
        .map(|f| f.id)
        .expect("nursery present in catalog")
}

// =============================================================================
// Catalog Query Tests
// =============================================================================

mod catalog_tests {
    use super::*;

    #[tokio::test]
    async fn test_default_order_is_rating_desc_and_stable() {
        let server = create_test_server();

        assert_eq!(
            names(&server, "").await,
            vec!["Little Explorers", "Happy Stars", "Sunny Hills", "Berlin Kids"]
        );
    }

    #[tokio::test]
    async fn test_term_matches_name_or_city() {
        let server = create_test_server();

        assert_eq!(
            names(&server, "?q=berlin").await,
            vec!["Little Explorers", "Berlin Kids"]
        );
    }

    #[tokio::test]
    async fn test_term_matches_country_case_insensitively() {
        let server = create_test_server();

        assert_eq!(
            names(&server, "?q=GERMANY").await,
            vec!["Little Explorers", "Sunny Hills"]
        );
        assert_eq!(names(&server, "?q=%20%20dubai%20").await, vec!["Happy Stars"]);
    }

    #[tokio::test]
    async fn test_term_without_match_returns_empty_list() {
        let server = create_test_server();

        assert!(names(&server, "?q=atlantis").await.is_empty());
    }

    #[tokio::test]
    async fn test_curriculum_filter() {
        let server = create_test_server();

        assert_eq!(
            names(&server, "?curriculum=montessori").await,
            vec!["Little Explorers", "Berlin Kids"]
        );
        assert_eq!(names(&server, "?curriculum=All").await.len(), 4);
        assert_eq!(names(&server, "?curriculum=").await.len(), 4);
    }

    #[tokio::test]
    async fn test_curriculum_and_term_combine() {
        let server = create_test_server();

        assert_eq!(
            names(&server, "?q=hamburg&curriculum=Montessori").await,
            vec!["Berlin Kids"]
        );
        assert!(names(&server, "?q=dubai&curriculum=Montessori").await.is_empty());
    }

    #[tokio::test]
    async fn test_sort_by_fee() {
        let server = create_test_server();

        assert_eq!(
            names(&server, "?sort=fee_asc").await,
            vec!["Berlin Kids", "Sunny Hills", "Little Explorers", "Happy Stars"]
        );
        assert_eq!(
            names(&server, "?sort=fee_desc").await,
            vec!["Happy Stars", "Little Explorers", "Sunny Hills", "Berlin Kids"]
        );
    }

    #[tokio::test]
    async fn test_sort_aliases() {
        let server = create_test_server();

        assert_eq!(
            names(&server, "?sort=price_low").await,
            names(&server, "?sort=fee_asc").await
        );
        assert_eq!(
            names(&server, "?sort=price_high").await,
            names(&server, "?sort=fee_desc").await
        );
    }

    #[tokio::test]
    async fn test_sort_by_name() {
        let server = create_test_server();

        assert_eq!(
            names(&server, "?sort=name").await,
            vec!["Berlin Kids", "Happy Stars", "Little Explorers", "Sunny Hills"]
        );
    }

    #[tokio::test]
    async fn test_unknown_sort_falls_back_to_rating() {
        let server = create_test_server();

        assert_eq!(names(&server, "?sort=bogus").await, names(&server, "").await);
    }

    #[tokio::test]
    async fn test_summary_shape() {
        let server = create_test_server();

        let body: Value = server.get("/api/nurseries?q=explorers").await.json();
        let first = &body[0];
        assert_eq!(first["name"], "Little Explorers");
        assert_eq!(first["city"], "Berlin");
        assert_eq!(first["country"], "Germany");
        assert_eq!(first["curriculum_main"], "Montessori");
        assert_eq!(first["curriculum_second"], "Bilingual");
        assert_eq!(first["monthly_fee"], 950);
    }
}

// =============================================================================
// Single Nursery Tests
// =============================================================================

mod nursery_tests {
    use super::*;

    #[tokio::test]
    async fn test_get_nursery_by_id() {
        let server = create_test_server();
        let id = nursery_id(&server, "Happy Stars").await;

        let response = server.get(&format!("/api/nurseries/{}", id)).await;
        response.assert_status_ok();
        let summary: FacilitySummary = response.json();
        assert_eq!(summary.id, id);
        assert_eq!(summary.city, "Dubai");
    }

    #[tokio::test]
    async fn test_unknown_nursery_returns_404() {
        let server = create_test_server();

        let response = server.get(&format!("/api/nurseries/{}", Uuid::new_v4())).await;
        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["code"], "ENTITY_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_malformed_id_returns_404() {
        let server = create_test_server();

        server
            .get("/api/nurseries/not-a-uuid")
            .await
            .assert_status_not_found();
    }
}

// =============================================================================
// Review Tests
// =============================================================================

mod review_tests {
    use super::*;

    #[tokio::test]
    async fn test_review_requires_login() {
        let server = create_test_server();
        let id = nursery_id(&server, "Sunny Hills").await;

        let response = server
            .post(&format!("/api/nurseries/{}/reviews", id))
            .json(&json!({ "rating": 5, "comment": "Lovely staff" }))
            .await;
        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["code"], "not_authenticated");
    }

    #[tokio::test]
    async fn test_create_review_increments_count() {
        let server = create_test_server();
        sign_up_and_log_in(&server, "alice").await;
        let id = nursery_id(&server, "Sunny Hills").await;

        let response = server
            .post(&format!("/api/nurseries/{}/reviews", id))
            .json(&json!({ "rating": 5, "comment": "Lovely staff" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let review: ReviewSummary = response.json();
        assert_eq!(review.name, "alice");
        assert_eq!(review.rating, 5);
        assert_eq!(review.nursery_id, id);

        let summary: FacilitySummary = server.get(&format!("/api/nurseries/{}", id)).await.json();
        assert_eq!(summary.reviews_count, 1);
        assert_eq!(summary.rating, 4.5);

        let reviews: Vec<ReviewSummary> = server
            .get(&format!("/api/nurseries/{}/reviews", id))
            .await
            .json();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].comment, "Lovely staff");

        let all: Vec<ReviewSummary> = server.get("/api/reviews").await.json();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_review_with_custom_name() {
        let server = create_test_server();
        sign_up_and_log_in(&server, "bob").await;
        let id = nursery_id(&server, "Happy Stars").await;

        let review: ReviewSummary = server
            .post(&format!("/api/nurseries/{}/reviews", id))
            .json(&json!({ "reviewer_name": "Parent of Mia", "rating": 4, "comment": "Good" }))
            .await
            .json();
        assert_eq!(review.name, "Parent of Mia");
    }

    #[tokio::test]
    async fn test_review_out_of_range_rating() {
        let server = create_test_server();
        sign_up_and_log_in(&server, "carol").await;
        let id = nursery_id(&server, "Happy Stars").await;

        let response = server
            .post(&format!("/api/nurseries/{}/reviews", id))
            .json(&json!({ "rating": 9, "comment": "Too good" }))
            .await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_review_with_malformed_body() {
        let server = create_test_server();
        sign_up_and_log_in(&server, "dave").await;
        let id = nursery_id(&server, "Happy Stars").await;

        let response = server
            .post(&format!("/api/nurseries/{}/reviews", id))
            .json(&json!({ "comment": "missing rating" }))
            .await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_BODY");
    }

    #[tokio::test]
    async fn test_review_for_unknown_nursery() {
        let server = create_test_server();
        sign_up_and_log_in(&server, "erin").await;

        server
            .post(&format!("/api/nurseries/{}/reviews", Uuid::new_v4()))
            .json(&json!({ "rating": 3, "comment": "Where is it?" }))
            .await
            .assert_status_not_found();
        server
            .get(&format!("/api/nurseries/{}/reviews", Uuid::new_v4()))
            .await
            .assert_status_not_found();
    }
}

// =============================================================================
// Currency Tests
// =============================================================================

mod currency_tests {
    use super::*;

    #[tokio::test]
    async fn test_set_currency_requires_login() {
        let server = create_test_server();

        let response = server
            .post("/set-currency")
            .json(&json!({ "currency": "USD" }))
            .await;
        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "not_authenticated");
    }

    #[tokio::test]
    async fn test_set_currency_rejects_unknown_code() {
        let server = create_test_server();
        sign_up_and_log_in(&server, "frank").await;

        let response = server
            .post("/set-currency")
            .json(&json!({ "currency": "GBP" }))
            .await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body, json!({ "ok": false, "error": "invalid_currency" }));
    }

    #[tokio::test]
    async fn test_set_currency_changes_displayed_prices() {
        let server = create_test_server();
        sign_up_and_log_in(&server, "grace").await;

        let response = server
            .post("/set-currency")
            .json(&json!({ "currency": "usd" }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body, json!({ "ok": true }));

        let page = server.get("/nurseries?q=explorers").await.text();
        assert!(page.contains("data-currency=\"USD\""));
        assert!(page.contains("$1026"));
    }
}

// =============================================================================
// Health Check Tests
// =============================================================================

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoints() {
        let server = create_test_server();

        for path in ["/health", "/healthz"] {
            let response = server.get(path).await;
            response.assert_status_ok();
            let body: Value = response.json();
            assert_eq!(body["status"], "ok");
            assert_eq!(body["service"], "nursery-finder");
        }
    }
}
