// tests/api.rs
// End-to-end HTTP tests against an in-memory database

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{web, App};
use fragrance_hub::config::{init_memory_pool, Config};
use fragrance_hub::db::{run_migrations, UserRepository};
use fragrance_hub::services::Catalog;
use fragrance_hub::{handlers, AppState};
use image::{DynamicImage, GenericImageView, ImageOutputFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use std::io::Cursor;

const PASSWORD: &str = "correct-horse-battery";

async fn state_with(config: Config) -> AppState {
    let pool = init_memory_pool().await.unwrap();
    run_migrations(&pool).await.unwrap();
    AppState::new(pool, config, Catalog::embedded().unwrap())
}

fn test_config() -> Config {
    Config {
        bcrypt_cost: 4,
        require_email_verification: false,
        ..Config::default()
    }
}

async fn test_state() -> AppState {
    state_with(test_config()).await
}

fn request(req: TestRequest, token: Option<&str>) -> TestRequest {
    match token {
        Some(t) => req.insert_header(("Authorization", format!("Bearer {}", t))),
        None => req,
    }
}

fn get(uri: &str, token: Option<&str>) -> TestRequest {
    request(TestRequest::get().uri(uri), token)
}

fn post(uri: &str, token: Option<&str>, body: Value) -> TestRequest {
    request(TestRequest::post().uri(uri).set_json(body), token)
}

fn put(uri: &str, token: Option<&str>, body: Value) -> TestRequest {
    request(TestRequest::put().uri(uri).set_json(body), token)
}

fn delete(uri: &str, token: Option<&str>) -> TestRequest {
    request(TestRequest::delete().uri(uri), token)
}

macro_rules! test_app {
    ($state:expr) => {{
        let state = $state.clone();
        test::init_service(
            App::new()
                .configure(move |cfg| state.configure(cfg))
                .default_service(web::to(handlers::not_found)),
        )
        .await
    }};
}

/// Send a request, return status and JSON body (Null when empty)
macro_rules! call {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let bytes = test::read_body(resp).await;
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }};
}

/// Register and log in, returning (token, user id)
macro_rules! signup {
    ($app:expr, $name:expr) => {{
        let name: &str = $name;
        let (status, _) = call!(
            $app,
            post(
                "/api/auth/register",
                None,
                json!({ "username": name, "email": format!("{}@example.com", name), "password": PASSWORD })
            )
        );
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = call!(
            $app,
            post(
                "/api/auth/login",
                None,
                json!({ "email": format!("{}@example.com", name), "password": PASSWORD })
            )
        );
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_i64().unwrap(),
        )
    }};
}

fn review_body(fragrance: &str, rating: i64) -> Value {
    json!({
        "fragrance_name": fragrance,
        "rating": rating,
        "title": "Worth it",
        "content": "Smoky pineapple opening that settles into birch and musk."
    })
}

#[actix_web::test]
async fn test_health() {
    let state = test_state().await;
    let app = test_app!(state);

    let (status, body) = call!(app, get("/health", None));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "fragrance-hub");
}

#[actix_web::test]
async fn test_unknown_route_returns_json_404() {
    let state = test_state().await;
    let app = test_app!(state);

    let (status, body) = call!(app, get("/api/does-not-exist", None));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(body["timestamp"].is_string());
}

#[actix_web::test]
async fn test_duplicate_registration_is_rejected() {
    let state = test_state().await;
    let app = test_app!(state);
    signup!(app, "vetiver");

    let (status, body) = call!(
        app,
        post(
            "/api/auth/register",
            None,
            json!({ "username": "other", "email": "VETIVER@example.com", "password": PASSWORD })
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[actix_web::test]
async fn test_register_validation_errors() {
    let state = test_state().await;
    let app = test_app!(state);

    let (status, body) = call!(
        app,
        post(
            "/api/auth/register",
            None,
            json!({ "username": "no spaces!", "email": "x@example.com", "password": PASSWORD })
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = call!(
        app,
        post(
            "/api/auth/register",
            None,
            json!({ "username": "shortpw", "email": "y@example.com", "password": "short" })
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_malformed_json_is_a_400() {
    let state = test_state().await;
    let app = test_app!(state);

    let req = TestRequest::post()
        .uri("/api/auth/login")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json");
    let (status, body) = call!(app, req);
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[actix_web::test]
async fn test_login_with_wrong_password() {
    let state = test_state().await;
    let app = test_app!(state);
    signup!(app, "oud");

    let (status, body) = call!(
        app,
        post(
            "/api/auth/login",
            None,
            json!({ "email": "oud@example.com", "password": "wrong-password" })
        )
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[actix_web::test]
async fn test_email_verification_flow() {
    let state = state_with(Config {
        require_email_verification: true,
        ..test_config()
    })
    .await;
    let app = test_app!(state);

    let (status, body) = call!(
        app,
        post(
            "/api/auth/register",
            None,
            json!({ "username": "iris", "email": "iris@example.com", "password": PASSWORD })
        )
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["is_verified"], false);

    let login = json!({ "email": "iris@example.com", "password": PASSWORD });
    let (status, _) = call!(app, post("/api/auth/login", None, login.clone()));
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (token,): (Option<String>,) =
        sqlx::query_as("SELECT verification_token FROM users WHERE email = $1")
            .bind("iris@example.com")
            .fetch_one(&state.pool)
            .await
            .unwrap();
    let token = token.expect("verification token stored");

    let (status, _) = call!(app, get("/api/auth/verify-email?token=not-a-token", None));
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/auth/verify-email?token={}", token);
    let (status, body) = call!(app, get(&uri, None));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["is_verified"], true);

    let (status, body) = call!(app, post("/api/auth/login", None, login));
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
}

#[actix_web::test]
async fn test_me_requires_token() {
    let state = test_state().await;
    let app = test_app!(state);

    let (status, _) = call!(app, get("/api/auth/me", None));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call!(app, get("/api/auth/me", Some("garbage")));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (token, id) = signup!(app, "amber");
    let (status, body) = call!(app, get("/api/auth/me", Some(&token)));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["email"], "amber@example.com");
}

#[actix_web::test]
async fn test_profile_and_settings() {
    let state = test_state().await;
    let app = test_app!(state);
    let (token, _) = signup!(app, "jasmine");

    let (status, body) = call!(
        app,
        put(
            "/api/profile",
            Some(&token),
            json!({ "display_name": "Jasmine S.", "bio": "White florals only" })
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "Jasmine S.");

    let (status, body) = call!(
        app,
        put("/api/profile/settings", Some(&token), json!({ "theme": "dark" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["theme"], "dark");

    let (status, _) = call!(
        app,
        put("/api/profile/settings", Some(&token), json!({ "theme": "neon" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call!(app, get("/api/users/jasmine", None));
    assert_eq!(status, StatusCode::OK);
    assert!(body.to_string().contains("Jasmine S."));
    assert!(!body.to_string().contains("jasmine@example.com"));

    let (status, _) = call!(
        app,
        put("/api/profile/settings", Some(&token), json!({ "public_profile": false }))
    );
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call!(app, get("/api/users/jasmine", None));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_change_password_and_delete_account() {
    let state = test_state().await;
    let app = test_app!(state);
    let (token, _) = signup!(app, "cedar");

    let (status, _) = call!(
        app,
        put(
            "/api/profile/password",
            Some(&token),
            json!({ "current_password": "not-it", "new_password": "another-password" })
        )
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call!(
        app,
        put(
            "/api/profile/password",
            Some(&token),
            json!({ "current_password": PASSWORD, "new_password": "another-password" })
        )
    );
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call!(
        app,
        post(
            "/api/auth/login",
            None,
            json!({ "email": "cedar@example.com", "password": "another-password" })
        )
    );
    assert_eq!(status, StatusCode::OK);

    let req = delete("/api/profile", Some(&token)).set_json(json!({ "password": "another-password" }));
    let (status, _) = call!(app, req);
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Token still verifies but the account is gone
    let (status, _) = call!(app, get("/api/auth/me", Some(&token)));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_favorites_crud() {
    let state = test_state().await;
    let app = test_app!(state);
    let (token, _) = signup!(app, "musk");

    let fav = json!({ "fragrance_name": "Aventus", "brand": "Creed" });
    let (status, body) = call!(app, post("/api/favorites", Some(&token), fav.clone()));
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["fragrance_name"], "Aventus");

    let (status, body) = call!(app, post("/api/favorites", Some(&token), fav));
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_EXISTS");

    let (status, body) = call!(app, get("/api/favorites/check/Aventus", Some(&token)));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_favorite"], true);

    let (_, body) = call!(app, get("/api/favorites", Some(&token)));
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = call!(app, delete("/api/favorites/Aventus", Some(&token)));
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call!(app, delete("/api/favorites/Aventus", Some(&token)));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = call!(app, get("/api/favorites/check/Aventus", Some(&token)));
    assert_eq!(body["is_favorite"], false);
}

#[actix_web::test]
async fn test_review_lifecycle() {
    let state = test_state().await;
    let app = test_app!(state);
    let (alice, _) = signup!(app, "alice");
    let (bob, _) = signup!(app, "bob");

    let (status, review) = call!(app, post("/api/reviews", Some(&alice), review_body("Aventus", 5)));
    assert_eq!(status, StatusCode::CREATED);
    let review_id = review["id"].as_i64().unwrap();
    assert_eq!(review["username"], "alice");

    let (status, body) = call!(app, post("/api/reviews", Some(&alice), review_body("aventus", 3)));
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);

    let (status, _) = call!(app, post("/api/reviews", Some(&bob), review_body("Aventus", 7)));
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call!(app, post("/api/reviews", Some(&bob), review_body("Aventus", 3)));
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call!(app, get("/api/reviews?fragrance=Aventus&sort=highest", None));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 2);
    assert_eq!(body["data"][0]["rating"], 5);

    let (_, summary) = call!(app, get("/api/reviews/summary?fragrance=Aventus", None));
    assert_eq!(summary["review_count"], 2);
    assert_eq!(summary["average_rating"], 4.0);

    let uri = format!("/api/reviews/{}", review_id);
    let (status, _) = call!(app, put(&uri, Some(&bob), json!({ "rating": 1 })));
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call!(app, put(&uri, Some(&alice), json!({ "rating": 4 })));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 4);
    assert_eq!(body["is_edited"], true);

    let (status, _) = call!(app, delete(&uri, Some(&bob)));
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call!(app, delete(&uri, Some(&alice)));
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, mine) = call!(app, get("/api/profile/reviews", Some(&alice)));
    assert_eq!(mine.as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn test_review_reaction_toggles() {
    let state = test_state().await;
    let app = test_app!(state);
    let (author, _) = signup!(app, "author");
    let (fan, _) = signup!(app, "fan");

    let (_, review) = call!(app, post("/api/reviews", Some(&author), review_body("Sauvage", 4)));
    let review_id = review["id"].as_i64().unwrap();

    let like = json!({ "review_id": review_id, "like_type": "like" });
    let dislike = json!({ "review_id": review_id, "like_type": "dislike" });

    let (status, body) = call!(app, post("/api/reviews/like", Some(&fan), like.clone()));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["likes"], 1);
    assert_eq!(body["user_reaction"], "like");

    let (_, body) = call!(app, post("/api/reviews/like", Some(&fan), dislike));
    assert_eq!(body["likes"], 0);
    assert_eq!(body["dislikes"], 1);
    assert_eq!(body["user_reaction"], "dislike");

    let (_, body) = call!(app, post("/api/reviews/like", Some(&author), like.clone()));
    assert_eq!(body["likes"], 1);
    assert_eq!(body["dislikes"], 1);

    // Same reaction again removes it
    let (_, body) = call!(app, post("/api/reviews/like", Some(&author), like));
    assert_eq!(body["likes"], 0);
    assert!(body["user_reaction"].is_null());

    let (_, list) = call!(app, get("/api/reviews?fragrance=Sauvage", Some(&fan)));
    assert_eq!(list["data"][0]["user_reaction"], "dislike");

    let (status, _) = call!(
        app,
        post("/api/reviews/like", Some(&fan), json!({ "review_id": 9999, "like_type": "like" }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_reply_spam_is_rejected() {
    let state = test_state().await;
    let app = test_app!(state);
    let (token, _) = signup!(app, "neroli");

    let (_, review) = call!(app, post("/api/reviews", Some(&token), review_body("Aventus", 5)));
    let uri = format!("/api/reviews/{}/replies", review["id"]);

    let (status, body) = call!(
        app,
        post(&uri, Some(&token), json!({ "content": "Click here for cheap decants www.spam.example" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "SPAM_DETECTED");

    let (status, _) = call!(app, post(&uri, Some(&token), json!({ "content": "   " })));
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_reply_cooldown() {
    let state = test_state().await;
    let app = test_app!(state);
    let (token, _) = signup!(app, "bergamot");

    let (_, review) = call!(app, post("/api/reviews", Some(&token), review_body("Aventus", 5)));
    let uri = format!("/api/reviews/{}/replies", review["id"]);

    let (status, _) = call!(app, post(&uri, Some(&token), json!({ "content": "Agreed, great drydown." })));
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call!(app, post(&uri, Some(&token), json!({ "content": "One more thought." })));
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "RATE_LIMIT_EXCEEDED");
}

#[actix_web::test]
async fn test_reply_threading() {
    let state = state_with(Config {
        reply_cooldown_secs: 0,
        ..test_config()
    })
    .await;
    let app = test_app!(state);
    let (token, _) = signup!(app, "patchouli");

    let (_, review) = call!(app, post("/api/reviews", Some(&token), review_body("Aventus", 5)));
    let review_id = review["id"].as_i64().unwrap();
    let uri = format!("/api/reviews/{}/replies", review_id);

    let (status, root) = call!(app, post(&uri, Some(&token), json!({ "content": "Level one" })));
    assert_eq!(status, StatusCode::CREATED);

    // Chain down to the depth limit
    let mut parent = root["id"].as_i64().unwrap();
    for level in 2..=5 {
        let (status, reply) = call!(
            app,
            post(&uri, Some(&token), json!({ "content": format!("Level {}", level), "parent_reply_id": parent }))
        );
        assert_eq!(status, StatusCode::CREATED);
        parent = reply["id"].as_i64().unwrap();
    }

    let (status, _) = call!(
        app,
        post(&uri, Some(&token), json!({ "content": "Too deep", "parent_reply_id": parent }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, sibling) = call!(app, post(&uri, Some(&token), json!({ "content": "Another root" })));

    let (status, thread) = call!(app, get(&uri, None));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(thread["total_count"], 6);
    let roots = thread["replies"].as_array().unwrap();
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0]["content"], "Level one");
    assert_eq!(roots[0]["children"][0]["children"][0]["content"], "Level 3");
    assert_eq!(roots[1]["id"], sibling["id"]);

    // A parent from a different review is rejected
    let (_, other) = call!(app, post("/api/reviews", Some(&token), review_body("Sauvage", 2)));
    let other_uri = format!("/api/reviews/{}/replies", other["id"]);
    let (status, _) = call!(
        app,
        post(&other_uri, Some(&token), json!({ "content": "Wrong thread", "parent_reply_id": parent }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Deleting the root removes its whole subtree
    let (status, _) = call!(app, delete(&format!("/api/replies/{}", root["id"]), Some(&token)));
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, thread) = call!(app, get(&uri, None));
    assert_eq!(thread["total_count"], 1);

    // Deleting the review cascades to the rest
    let (status, _) = call!(app, delete(&format!("/api/reviews/{}", review_id), Some(&token)));
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call!(app, get(&uri, None));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_reply_edit_and_reaction() {
    let state = test_state().await;
    let app = test_app!(state);
    let (author, _) = signup!(app, "tonka");
    let (other, _) = signup!(app, "labdanum");

    let (_, review) = call!(app, post("/api/reviews", Some(&author), review_body("Aventus", 5)));
    let uri = format!("/api/reviews/{}/replies", review["id"]);
    let (_, reply) = call!(app, post(&uri, Some(&author), json!({ "content": "<b>Bold</b> take" })));
    assert_eq!(reply["content"], "Bold take");
    let reply_uri = format!("/api/replies/{}", reply["id"]);

    let (status, _) = call!(app, put(&reply_uri, Some(&other), json!({ "content": "Hijacked" })));
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call!(app, put(&reply_uri, Some(&author), json!({ "content": "Edited take" })));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_edited"], true);

    let like_uri = format!("{}/like", reply_uri);
    let (status, body) = call!(app, post(&like_uri, Some(&other), json!({ "like_type": "like" })));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["likes"], 1);
    assert_eq!(body["reply_id"], reply["id"]);

    let (_, body) = call!(app, post(&like_uri, Some(&other), json!({ "like_type": "like" })));
    assert_eq!(body["likes"], 0);
}

#[actix_web::test]
async fn test_admin_routes_require_admin() {
    let state = test_state().await;
    let app = test_app!(state);
    let (token, _) = signup!(app, "regular");

    let (status, _) = call!(app, get("/api/admin/stats", None));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call!(app, get("/api/admin/stats", Some(&token)));
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[actix_web::test]
async fn test_ban_blocks_writes_until_unban() {
    let state = test_state().await;
    let app = test_app!(state);
    let (admin, admin_id) = signup!(app, "moderator");
    let (troll, troll_id) = signup!(app, "troll");
    UserRepository::set_admin(&state.pool, admin_id, true).await.unwrap();

    let (_, review) = call!(app, post("/api/reviews", Some(&troll), review_body("Aventus", 1)));

    let (status, _) = call!(
        app,
        post(&format!("/api/admin/users/{}/ban", admin_id), Some(&admin), json!({ "reason": "self" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call!(
        app,
        post(&format!("/api/admin/users/{}/ban", troll_id), Some(&admin), json!({ "reason": "Spam reviews" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_banned"], true);

    // Bans apply to tokens issued before the ban
    let (status, body) = call!(app, post("/api/reviews", Some(&troll), review_body("Sauvage", 1)));
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("Spam reviews"));

    let (status, _) = call!(
        app,
        post("/api/auth/login", None, json!({ "email": "troll@example.com", "password": PASSWORD }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, listing) = call!(app, get("/api/admin/users?banned=true", Some(&admin)));
    assert_eq!(listing["total_count"], 1);

    let (_, stats) = call!(app, get("/api/admin/stats", Some(&admin)));
    assert_eq!(stats["users"], 2);
    assert_eq!(stats["banned_users"], 1);
    assert_eq!(stats["reviews"], 1);

    let (status, _) = call!(
        app,
        delete(&format!("/api/admin/reviews/{}", review["id"]), Some(&admin))
    );
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call!(
        app,
        post(&format!("/api/admin/users/{}/unban", troll_id), Some(&admin), json!({}))
    );
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call!(app, post("/api/reviews", Some(&troll), review_body("Sauvage", 2)));
    assert_eq!(status, StatusCode::CREATED);
}

#[actix_web::test]
async fn test_admin_cannot_ban_other_admin() {
    let state = test_state().await;
    let app = test_app!(state);
    let (first, first_id) = signup!(app, "first_admin");
    let (_, second_id) = signup!(app, "second_admin");
    UserRepository::set_admin(&state.pool, first_id, true).await.unwrap();
    UserRepository::set_admin(&state.pool, second_id, true).await.unwrap();

    let (status, _) = call!(
        app,
        post(&format!("/api/admin/users/{}/ban", second_id), Some(&first), json!({ "reason": "coup" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call!(
        app,
        post("/api/admin/users/424242/ban", Some(&first), json!({ "reason": "ghost" }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_catalog_endpoints() {
    let state = test_state().await;
    let app = test_app!(state);

    let (_, body) = call!(app, get("/api/fragrances", None));
    assert!(body["total_count"].as_u64().unwrap() >= 500);

    let (status, body) = call!(app, get("/api/fragrances?brand=chanel", None));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 20);
    assert!(body["data"].as_array().unwrap().iter().all(|f| f["brand"] == "Chanel"));

    let (_, body) = call!(app, get("/api/fragrances?note=saffron", None));
    let slugs: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["slug"].as_str())
        .collect();
    assert!(slugs.contains(&"mfk-baccarat-rouge-540"));

    let (_, body) = call!(app, get("/api/fragrances?limit=5&page=2", None));
    assert_eq!(body["page"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["has_more"], true);

    let (_, body) = call!(app, get("/api/fragrances/brands", None));
    let brands = body["brands"].as_array().unwrap();
    assert!(brands.windows(2).all(|w| w[0].as_str() < w[1].as_str()));

    let (status, body) = call!(app, get("/api/fragrances/creed-aventus", None));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["brand"], "Creed");

    let (status, _) = call!(app, get("/api/fragrances/not-a-real-slug", None));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_huge_page_numbers_are_clamped() {
    let state = test_state().await;
    let app = test_app!(state);
    let (token, _) = signup!(app, "oakmoss");
    call!(app, post("/api/reviews", Some(&token), review_body("Aventus", 4)));

    let (status, body) = call!(app, get("/api/fragrances?page=18446744073709551615", None));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 10_000);
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["has_more"], false);

    let (status, body) = call!(
        app,
        get("/api/reviews?fragrance=Aventus&page=9223372036854775807", None)
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 1);
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["has_more"], false);
}

#[actix_web::test]
async fn test_register_trims_padded_email() {
    let state = test_state().await;
    let app = test_app!(state);

    let (status, body) = call!(
        app,
        post(
            "/api/auth/register",
            None,
            json!({ "username": " padded ", "email": "  Padded@Example.com ", "password": PASSWORD })
        )
    );
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["user"]["email"], "padded@example.com");
    assert_eq!(body["user"]["username"], "padded");

    let (status, _) = call!(
        app,
        post("/api/auth/login", None, json!({ "email": "padded@example.com", "password": PASSWORD }))
    );
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_login_throttle_returns_429() {
    let state = state_with(Config {
        login_attempts_per_minute: 3,
        ..test_config()
    })
    .await;
    let app = test_app!(state);
    // signup! spends one attempt
    signup!(app, "civet");

    let wrong = json!({ "email": "civet@example.com", "password": "wrong-password" });
    for _ in 0..2 {
        let (status, _) = call!(app, post("/api/auth/login", None, wrong.clone()));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, body) = call!(app, post("/api/auth/login", None, wrong));
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "RATE_LIMIT_EXCEEDED");

    // The right password does not get past the throttle either
    let (status, _) = call!(
        app,
        post("/api/auth/login", None, json!({ "email": "CIVET@example.com", "password": PASSWORD }))
    );
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // Other accounts keep their own quota
    let (status, _) = call!(
        app,
        post("/api/auth/login", None, json!({ "email": "nobody@example.com", "password": PASSWORD }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_concurrent_replies_respect_cooldown() {
    let state = test_state().await;
    let app = test_app!(state);
    let (token, _) = signup!(app, "ambrette");

    let (_, review) = call!(app, post("/api/reviews", Some(&token), review_body("Aventus", 5)));
    let uri = format!("/api/reviews/{}/replies", review["id"]);

    let first = post(&uri, Some(&token), json!({ "content": "First at the door." })).to_request();
    let second = post(&uri, Some(&token), json!({ "content": "Right behind you." })).to_request();
    let (a, b) = tokio::join!(
        test::call_service(&app, first),
        test::call_service(&app, second)
    );

    let statuses = [a.status(), b.status()];
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::CREATED).count(),
        1,
        "{:?}",
        statuses
    );
    assert!(statuses.contains(&StatusCode::TOO_MANY_REQUESTS));

    let (_, thread) = call!(app, get(&uri, None));
    assert_eq!(thread["total_count"], 1);
}

#[actix_web::test]
async fn test_failed_reply_does_not_start_cooldown() {
    let state = test_state().await;
    let app = test_app!(state);
    let (token, _) = signup!(app, "galbanum");

    let (_, review) = call!(app, post("/api/reviews", Some(&token), review_body("Aventus", 5)));
    let uri = format!("/api/reviews/{}/replies", review["id"]);

    let (status, _) = call!(
        app,
        post(&uri, Some(&token), json!({ "content": "Orphan", "parent_reply_id": 999 }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call!(app, post(&uri, Some(&token), json!({ "content": "Proper reply" })));
    assert_eq!(status, StatusCode::CREATED);
}

#[actix_web::test]
async fn test_admins_skip_reply_cooldown() {
    let state = test_state().await;
    let app = test_app!(state);
    let (admin, admin_id) = signup!(app, "curator");
    UserRepository::set_admin(&state.pool, admin_id, true).await.unwrap();

    let (_, review) = call!(app, post("/api/reviews", Some(&admin), review_body("Aventus", 5)));
    let uri = format!("/api/reviews/{}/replies", review["id"]);

    for n in 1..=3 {
        let (status, body) = call!(
            app,
            post(&uri, Some(&admin), json!({ "content": format!("Moderator note {}", n) }))
        );
        assert_eq!(status, StatusCode::CREATED, "{}", body);
    }

    let (_, thread) = call!(app, get(&uri, None));
    assert_eq!(thread["total_count"], 3);
}

#[actix_web::test]
async fn test_review_sort_orders() {
    let state = test_state().await;
    let app = test_app!(state);
    let (first, _) = signup!(app, "sort_first");
    let (second, _) = signup!(app, "sort_second");
    let (third, _) = signup!(app, "sort_third");

    let (_, liked) = call!(app, post("/api/reviews", Some(&first), review_body("Sauvage", 3)));
    call!(app, post("/api/reviews", Some(&second), review_body("Sauvage", 5)));
    call!(app, post("/api/reviews", Some(&third), review_body("Sauvage", 1)));

    let (status, _) = call!(
        app,
        post("/api/reviews/like", Some(&second), json!({ "review_id": liked["id"], "like_type": "like" }))
    );
    assert_eq!(status, StatusCode::OK);

    let ratings = |body: &Value| -> Vec<i64> {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["rating"].as_i64().unwrap())
            .collect()
    };

    let cases = [
        ("", vec![1, 5, 3]),
        ("&sort=newest", vec![1, 5, 3]),
        ("&sort=oldest", vec![3, 5, 1]),
        ("&sort=highest", vec![5, 3, 1]),
        ("&sort=lowest", vec![1, 3, 5]),
        ("&sort=helpful", vec![3, 1, 5]),
    ];
    for (sort, expected) in cases {
        let (status, body) = call!(app, get(&format!("/api/reviews?fragrance=Sauvage{}", sort), None));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ratings(&body), expected, "sort {:?}", sort);
    }

    let (status, _) = call!(app, get("/api/reviews?fragrance=Sauvage&sort=random", None));
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_hidden_favorites_on_public_profile() {
    let state = test_state().await;
    let app = test_app!(state);
    let (token, _) = signup!(app, "vanilla");

    call!(
        app,
        post("/api/favorites", Some(&token), json!({ "fragrance_name": "Aventus", "brand": "Creed" }))
    );

    let (status, body) = call!(app, get("/api/users/vanilla", None));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["favorites"].as_array().unwrap().len(), 1);

    let (status, _) = call!(
        app,
        put("/api/profile/settings", Some(&token), json!({ "show_favorites": false }))
    );
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call!(app, get("/api/users/vanilla", None));
    assert_eq!(status, StatusCode::OK);
    assert!(body["favorites"].is_null());
    assert!(!body.to_string().contains("Aventus"));
}

#[actix_web::test]
async fn test_blank_ban_reason_is_rejected() {
    let state = test_state().await;
    let app = test_app!(state);
    let (admin, admin_id) = signup!(app, "warden");
    let (_, target_id) = signup!(app, "suspect");
    UserRepository::set_admin(&state.pool, admin_id, true).await.unwrap();

    let uri = format!("/api/admin/users/{}/ban", target_id);
    let (status, body) = call!(app, post(&uri, Some(&admin), json!({ "reason": "   " })));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = call!(app, post(&uri, Some(&admin), json!({ "reason": "  Sock puppet  " })));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ban_reason"], "Sock puppet");

    let (_, active) = call!(app, get("/api/admin/users?banned=false", Some(&admin)));
    assert_eq!(active["total_count"], 1);
    let (_, everyone) = call!(app, get("/api/admin/users", Some(&admin)));
    assert_eq!(everyone["total_count"], 2);
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([120, 60, 200])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageOutputFormat::Png).unwrap();
    buf.into_inner()
}

fn avatar_upload(token: Option<&str>, body: Vec<u8>) -> TestRequest {
    request(
        TestRequest::put()
            .uri("/api/profile/avatar")
            .insert_header(("Content-Type", "image/png"))
            .set_payload(body),
        token,
    )
}

#[actix_web::test]
async fn test_avatar_upload_is_resized() {
    let state = test_state().await;
    let app = test_app!(state);
    let (token, id) = signup!(app, "orris");

    let (status, _) = call!(app, avatar_upload(None, png_bytes(400, 300)));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call!(app, avatar_upload(Some(&token), png_bytes(400, 300)));
    assert_eq!(status, StatusCode::OK, "{}", body);
    let avatar_url = format!("/api/avatars/{}", id);
    assert_eq!(body["avatar_url"], avatar_url.as_str());
    assert_eq!(body["width"], 256);

    let (_, profile) = call!(app, get("/api/profile", Some(&token)));
    assert_eq!(profile["user"]["avatar_url"], avatar_url.as_str());

    let resp = test::call_service(&app, get(&avatar_url, None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("Content-Type").unwrap().to_str().unwrap(), "image/png");
    let bytes = test::read_body(resp).await;
    let stored = image::load_from_memory(&bytes).unwrap();
    assert_eq!(stored.dimensions(), (256, 256));

    // A second upload replaces the first
    let (status, _) = call!(app, avatar_upload(Some(&token), png_bytes(30, 500)));
    assert_eq!(status, StatusCode::OK);
    let resp = test::call_service(&app, get(&avatar_url, None).to_request()).await;
    let stored = image::load_from_memory(&test::read_body(resp).await).unwrap();
    assert_eq!(stored.dimensions(), (256, 256));

    let (status, body) = call!(app, avatar_upload(Some(&token), b"plain text".to_vec()));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, _) = call!(app, get("/api/avatars/999", None));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_banned_user_cannot_upload_avatar() {
    let state = test_state().await;
    let app = test_app!(state);
    let (admin, admin_id) = signup!(app, "gatekeeper");
    let (troll, troll_id) = signup!(app, "vandal");
    UserRepository::set_admin(&state.pool, admin_id, true).await.unwrap();

    call!(
        app,
        post(&format!("/api/admin/users/{}/ban", troll_id), Some(&admin), json!({ "reason": "Offensive images" }))
    );

    let (status, _) = call!(app, avatar_upload(Some(&troll), png_bytes(64, 64)));
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call!(app, get(&format!("/api/avatars/{}", troll_id), None));
    assert_eq!(status, StatusCode::NOT_FOUND);
}
