//! HTTP-level tests for organizations, members and course authoring.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_block, create_lesson, create_organization, delete_auth, get_auth,
    post_json_auth, put_json_auth, signup,
};
use gonasi_core::storage::verify_object_signature;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Organizations and members
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn creator_becomes_owner(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = signup(app.clone(), "owner").await;
    let org_id = create_organization(app.clone(), &token, "river-school").await;

    let response = get_auth(app.clone(), "/api/v1/organizations", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["id"], org_id);
    assert_eq!(json["data"][0]["role"], "owner");

    let response = post_json_auth(
        app,
        "/api/v1/organizations",
        json!({ "name": "Copy", "handle": "river-school" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_handle_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = signup(app.clone(), "owner").await;

    let response = post_json_auth(
        app,
        "/api/v1/organizations",
        json!({ "name": "Bad", "handle": "Has Spaces" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn member_management_respects_roles(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (owner_id, owner) = signup(app.clone(), "owner").await;
    let (editor_id, editor) = signup(app.clone(), "editor").await;
    let (outsider_id, _) = signup(app.clone(), "outsider").await;
    let org_id = create_organization(app.clone(), &owner, "acme").await;
    let members = format!("/api/v1/organizations/{org_id}/members");

    let response = post_json_auth(
        app.clone(),
        &members,
        json!({ "user_id": editor_id, "role": "editor" }),
        &owner,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Owner role cannot be handed out.
    let response = post_json_auth(
        app.clone(),
        &members,
        json!({ "user_id": outsider_id, "role": "owner" }),
        &owner,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Editors cannot manage members.
    let response = post_json_auth(
        app.clone(),
        &members,
        json!({ "user_id": outsider_id, "role": "editor" }),
        &editor,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The owner cannot be removed.
    let response = delete_auth(app.clone(), &format!("{members}/{owner_id}"), &owner).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json_auth(
        app.clone(),
        &format!("{members}/{editor_id}"),
        json!({ "role": "admin" }),
        &owner,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["role"], "admin");

    let response = get_auth(app.clone(), &members, &editor).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert_eq!(json["data"][0]["role"], "owner");

    let response = delete_auth(app, &format!("{members}/{editor_id}"), &owner).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_members_cannot_see_organization(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, owner) = signup(app.clone(), "owner").await;
    let (_, stranger) = signup(app.clone(), "stranger").await;
    let org_id = create_organization(app.clone(), &owner, "private-org").await;

    let response = get_auth(
        app.clone(),
        &format!("/api/v1/organizations/{org_id}"),
        &stranger,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app, "/api/v1/organizations/999999", &owner).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn course_image_gets_a_signed_url(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = signup(app.clone(), "owner").await;
    let org_id = create_organization(app.clone(), &token, "imgs").await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/organizations/{org_id}/courses"),
        json!({ "name": "Rivers", "image_url": "courses/rivers/cover.png" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let url = json["data"]["signed_image_url"].as_str().unwrap();
    assert!(url.starts_with(
        "http://storage.test/storage/v1/object/sign/course-images/courses/rivers/cover.png?expires="
    ));
    let (_, query) = url.split_once('?').unwrap();
    let (expires, token_param) = query
        .strip_prefix("expires=")
        .and_then(|q| q.split_once("&token="))
        .unwrap();
    // The storage gateway accepts what the API signed.
    verify_object_signature(
        "course-images",
        "courses/rivers/cover.png",
        expires.parse().unwrap(),
        token_param,
        "test-storage-secret",
        chrono::Utc::now(),
    )
    .unwrap();

    let response = post_json_auth(
        app,
        &format!("/api/v1/organizations/{org_id}/courses"),
        json!({ "name": "Escape", "image_url": "../etc/passwd" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn editors_author_but_only_admins_delete(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, owner) = signup(app.clone(), "owner").await;
    let (editor_id, editor) = signup(app.clone(), "editor").await;
    let (_, stranger) = signup(app.clone(), "stranger").await;
    let org_id = create_organization(app.clone(), &owner, "team").await;
    post_json_auth(
        app.clone(),
        &format!("/api/v1/organizations/{org_id}/members"),
        json!({ "user_id": editor_id, "role": "editor" }),
        &owner,
    )
    .await;

    let courses = format!("/api/v1/organizations/{org_id}/courses");
    let response =
        post_json_auth(app.clone(), &courses, json!({ "name": "Nope" }), &stranger).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(app.clone(), &courses, json!({ "name": "Draft" }), &editor).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let course_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/courses/{course_id}"),
        json!({ "name": "Final" }),
        &editor,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["name"], "Final");

    let response = delete_auth(app.clone(), &format!("/api/v1/courses/{course_id}"), &editor).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app.clone(), &format!("/api/v1/courses/{course_id}"), &owner).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, &format!("/api/v1/courses/{course_id}"), &owner).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Chapters, lessons, blocks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn chapters_reorder_as_a_permutation(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = signup(app.clone(), "owner").await;
    let org_id = create_organization(app.clone(), &token, "order").await;
    let (course_id, _) = create_lesson(app.clone(), &token, org_id).await;
    let chapters = format!("/api/v1/courses/{course_id}/chapters");

    let response =
        post_json_auth(app.clone(), &chapters, json!({ "name": "Chapter 2" }), &token).await;
    let second = body_json(response).await["data"]["id"].as_i64().unwrap();
    let response = get_auth(app.clone(), &chapters, &token).await;
    let first = body_json(response).await["data"][0]["id"].as_i64().unwrap();

    let response = put_json_auth(
        app.clone(),
        &format!("{chapters}/reorder"),
        json!({ "ordered_ids": [second, first] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["id"], second);
    assert_eq!(json["data"][0]["position"], 0);
    assert_eq!(json["data"][1]["id"], first);

    let response = put_json_auth(
        app,
        &format!("{chapters}/reorder"),
        json!({ "ordered_ids": [second] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_a_block_closes_the_gap(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = signup(app.clone(), "owner").await;
    let org_id = create_organization(app.clone(), &token, "gaps").await;
    let (_, lesson_id) = create_lesson(app.clone(), &token, org_id).await;

    let mut ids = Vec::new();
    for text in ["one", "two", "three"] {
        ids.push(
            create_block(
                app.clone(),
                &token,
                lesson_id,
                "rich_text",
                json!({ "rich_text_state": text }),
            )
            .await,
        );
    }

    let response = delete_auth(app.clone(), &format!("/api/v1/blocks/{}", ids[1]), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, &format!("/api/v1/lessons/{lesson_id}/blocks"), &token).await;
    let json = body_json(response).await;
    let positions: Vec<(i64, i64)> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| (b["id"].as_i64().unwrap(), b["position"].as_i64().unwrap()))
        .collect();
    assert_eq!(positions, vec![(ids[0], 0), (ids[2], 1)]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn block_content_is_validated_by_its_plugin(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = signup(app.clone(), "owner").await;
    let org_id = create_organization(app.clone(), &token, "blocks").await;
    let (_, lesson_id) = create_lesson(app.clone(), &token, org_id).await;
    let blocks = format!("/api/v1/lessons/{lesson_id}/blocks");

    let response = post_json_auth(
        app.clone(),
        &blocks,
        json!({ "plugin_type": "video_embed" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "UNKNOWN_PLUGIN");

    let response = post_json_auth(
        app.clone(),
        &blocks,
        json!({
            "plugin_type": "true_or_false",
            "content": { "question": "  ", "correct_answer": true },
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = post_json_auth(
        app.clone(),
        &blocks,
        json!({ "plugin_type": "true_or_false", "settings": { "weight": 11 } }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // No content: plugin default is stored.
    let response = post_json_auth(
        app.clone(),
        &blocks,
        json!({ "plugin_type": "true_or_false" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["content"]["correct_answer"], true);
    assert_eq!(json["data"]["settings"]["weight"], 1);

    // Legacy key is migrated on write.
    let response = post_json_auth(
        app,
        &blocks,
        json!({ "plugin_type": "rich_text", "content": { "content": "<p>Hello</p>" } }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["content"]["rich_text_state"], "<p>Hello</p>");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn oversized_block_content_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = signup(app.clone(), "owner").await;
    let org_id = create_organization(app.clone(), &token, "bigcontent").await;
    let (_, lesson_id) = create_lesson(app.clone(), &token, org_id).await;

    let huge = format!("<p>{}</p>", "x".repeat(100 * 1024));
    let response = post_json_auth(
        app,
        &format!("/api/v1/lessons/{lesson_id}/blocks"),
        json!({ "plugin_type": "rich_text", "content": { "rich_text_state": huge } }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn plugins_endpoint_lists_builtins(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = signup(app.clone(), "viewer").await;

    let response = get_auth(app.clone(), "/api/v1/plugins", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 6);

    let response = get_auth(app.clone(), "/api/v1/plugins/matching_game", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["plugin_type"], "matching_game");
    assert_eq!(json["data"]["supports_check"], false);
    assert!(json["data"]["default_content"]["pairs"].is_array());

    let response = get_auth(app, "/api/v1/plugins/nope", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
