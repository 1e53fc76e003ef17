use std::path::Path;

use axum::Json;
use axum::Router;
use axum::extract::{Multipart, Path as UrlPath};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::routing::{get, post};
use serde_json::{Value, json};

use super::*;
use crate::test_support::{property_json, sample_draft, spawn_api, unreachable_api};

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(ToOwned::to_owned)
}

#[tokio::test]
async fn list_and_get_are_public() {
    let router = Router::new()
        .route(
            "/property",
            get(|| async {
                Json(json!([
                    property_json("p1", "apartment", 20_000, "Pune"),
                    property_json("p2", "room", 7_000, "Mumbai")
                ]))
            }),
        )
        .route(
            "/property/{id}",
            get(|UrlPath(id): UrlPath<String>| async move {
                if id == "p1" {
                    (StatusCode::OK, Json(property_json("p1", "apartment", 20_000, "Pune")))
                } else {
                    (StatusCode::NOT_FOUND, Json(json!({ "message": "Property not found" })))
                }
            }),
        );
    let service = PropertyService::new(spawn_api(router).await);

    let all = service.list().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].location.city, "Mumbai");

    assert_eq!(service.get("p1").await.unwrap().price.rent, 20_000);
    let missing = service.get("nope").await.unwrap_err();
    assert_eq!(missing.status(), Some(404));
    assert_eq!(missing.to_string(), "Property not found");
}

#[tokio::test]
async fn empty_id_is_rejected_locally() {
    let service = PropertyService::new(unreachable_api());
    assert!(matches!(service.get(" ").await, Err(ApiError::InvalidInput(_))));
    assert!(matches!(service.delete("tok", "").await, Err(ApiError::InvalidInput(_))));
    assert!(matches!(service.toggle_favorite("tok", "").await, Err(ApiError::InvalidInput(_))));
}

#[tokio::test]
async fn ids_stay_inside_one_path_segment() {
    let router = Router::new()
        .route(
            "/property/{id}",
            get(|UrlPath(id): UrlPath<String>| async move { Json(property_json(&id, "room", 8_000, "Pune")) }),
        )
        .route("/property/user", get(|| async { Json(json!([])) }));
    let service = PropertyService::new(spawn_api(router).await);

    assert_eq!(service.get("a/b").await.unwrap().id, "a/b");
    assert_eq!(service.get("x?y=1").await.unwrap().id, "x?y=1");
    assert!(matches!(service.get("user").await, Err(ApiError::InvalidInput(_))));
    assert!(matches!(service.toggle_favorite("tok", "favorites").await, Err(ApiError::InvalidInput(_))));
}

#[tokio::test]
async fn owner_and_favorite_lists_send_token() {
    let router = Router::new()
        .route(
            "/property/user",
            get(|headers: HeaderMap| async move {
                match bearer(&headers).as_deref() {
                    Some("tok") => (StatusCode::OK, Json(json!([property_json("mine", "house", 30_000, "Goa")]))),
                    _ => (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" }))),
                }
            }),
        )
        .route(
            "/property/favorites",
            get(|headers: HeaderMap| async move {
                match bearer(&headers).as_deref() {
                    Some("tok") => (StatusCode::OK, Json(json!([property_json("fav", "villa", 90_000, "Goa")]))),
                    _ => (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" }))),
                }
            }),
        );
    let service = PropertyService::new(spawn_api(router).await);

    assert_eq!(service.by_owner("tok").await.unwrap()[0].id, "mine");
    assert_eq!(service.favorites("tok").await.unwrap()[0].id, "fav");
    assert!(service.by_owner("other").await.unwrap_err().is_unauthorized());
}

#[tokio::test]
async fn create_uploads_data_part_and_images() {
    let router = Router::new().route(
        "/property",
        post(|headers: HeaderMap, mut multipart: Multipart| async move {
            let mut data: Option<Value> = None;
            let mut images = Vec::new();
            while let Some(field) = multipart.next_field().await.unwrap() {
                let name = field.name().unwrap_or_default().to_owned();
                let file_name = field.file_name().map(ToOwned::to_owned);
                let bytes = field.bytes().await.unwrap();
                if name == DATA_FIELD {
                    data = Some(serde_json::from_slice(&bytes).unwrap());
                } else if name == IMAGES_FIELD {
                    images.push(file_name.unwrap_or_default());
                }
            }
            let data = data.unwrap_or_default();
            let mut created = property_json("new1", "apartment", data["price"]["rent"].as_u64().unwrap_or(0), "Pune");
            created["title"] = data["title"].clone();
            created["images"] = json!(images);
            created["owner"] = json!(bearer(&headers).unwrap_or_default());
            (StatusCode::CREATED, Json(created))
        }),
    );
    let service = PropertyService::new(spawn_api(router).await);

    let images = vec![
        ImageUpload::new(Path::new("front.jpg"), vec![1, 2, 3]),
        ImageUpload::new(Path::new("kitchen.png"), vec![4, 5]),
    ];
    let created = service.create("tok", &sample_draft(), images).await.unwrap();

    assert_eq!(created.id, "new1");
    assert_eq!(created.title, sample_draft().title);
    assert_eq!(created.price.rent, 25_000);
    assert_eq!(created.images, vec!["front.jpg".to_owned(), "kitchen.png".to_owned()]);
    assert_eq!(created.owner.as_ref().map(|o| o.id().to_owned()), Some("tok".to_owned()));
}

#[tokio::test]
async fn create_rejects_invalid_draft_and_too_many_images() {
    let service = PropertyService::new(unreachable_api());

    let mut draft = sample_draft();
    draft.location.pincode = "4110".to_owned();
    let err = service.create("tok", &draft, Vec::new()).await.unwrap_err();
    assert!(matches!(&err, ApiError::Invalid(e) if e.has("location.pincode")));

    let images = (0..11)
        .map(|i| ImageUpload::new(Path::new(&format!("{i}.jpg")), vec![0]))
        .collect();
    let err = service.create("tok", &sample_draft(), images).await.unwrap_err();
    assert!(matches!(&err, ApiError::Invalid(e) if e.has("images")));
}

#[tokio::test]
async fn update_delete_and_toggle() {
    let router = Router::new()
        .route(
            "/property/{id}",
            axum::routing::put(|UrlPath(id): UrlPath<String>, mut multipart: Multipart| async move {
                let mut title = String::new();
                while let Some(field) = multipart.next_field().await.unwrap() {
                    if field.name() == Some(DATA_FIELD) {
                        let data: Value = serde_json::from_slice(&field.bytes().await.unwrap()).unwrap();
                        title = data["title"].as_str().unwrap_or_default().to_owned();
                    }
                }
                let mut updated = property_json(&id, "apartment", 25_000, "Pune");
                updated["title"] = json!(title);
                Json(updated)
            })
            .delete(|UrlPath(id): UrlPath<String>| async move { Json(json!({ "message": format!("deleted {id}") })) }),
        )
        .route(
            "/property/{id}/favorite",
            post(|UrlPath(id): UrlPath<String>| async move { Json(json!({ "isFavorite": id == "p1" })) }),
        );
    let service = PropertyService::new(spawn_api(router).await);

    let mut draft = sample_draft();
    draft.title = "Renovated 2BHK near park".to_owned();
    let updated = service.update("tok", "p7", &draft, Vec::new()).await.unwrap();
    assert_eq!(updated.id, "p7");
    assert_eq!(updated.title, "Renovated 2BHK near park");

    assert_eq!(service.delete("tok", "p7").await.unwrap().message, "deleted p7");
    assert!(service.toggle_favorite("tok", "p1").await.unwrap().is_favorite);
    assert!(!service.toggle_favorite("tok", "p2").await.unwrap().is_favorite);
}
