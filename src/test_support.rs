//! In-process fake API and fixtures shared by unit tests.

use axum::Router;
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};

use crate::net::api::ApiClient;
use crate::net::types::{Details, Furnishing, Location, Maintenance, Price, PropertyDraft, PropertyType, TenantPreference};

const TEST_SECRET: &[u8] = b"test-signing-secret";

/// Serve `router` on an ephemeral localhost port and return a client for it.
pub(crate) async fn spawn_api(router: Router) -> ApiClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    ApiClient::with_base_url(&format!("http://{addr}")).unwrap()
}

/// Base URL nothing listens on, for transport failures.
pub(crate) fn unreachable_api() -> ApiClient {
    ApiClient::with_base_url("http://127.0.0.1:9").unwrap()
}

pub(crate) fn mint_token(id: &str, exp: u64) -> String {
    jsonwebtoken::encode(
        &Header::default(),
        &json!({ "id": id, "exp": exp, "iat": exp.saturating_sub(3600) }),
        &EncodingKey::from_secret(TEST_SECRET),
    )
    .unwrap()
}

pub(crate) fn mint_token_without_exp(id: &str) -> String {
    jsonwebtoken::encode(&Header::default(), &json!({ "id": id }), &EncodingKey::from_secret(TEST_SECRET)).unwrap()
}

pub(crate) fn user_json(id: &str) -> Value {
    json!({
        "_id": id,
        "firstName": "Asha",
        "lastName": "Rao",
        "email": "asha@example.com",
        "isVerified": true
    })
}

pub(crate) fn property_json(id: &str, property_type: &str, rent: u64, city: &str) -> Value {
    json!({
        "_id": id,
        "title": format!("Listing {id}"),
        "description": format!("A well lit {property_type} in {city} close to transit"),
        "propertyType": property_type,
        "price": { "rent": rent, "securityDeposit": rent * 2 },
        "location": { "address": "1 Main Road", "city": city, "state": "MH", "pincode": "411001" },
        "details": { "bedrooms": 2, "bathrooms": 1, "areaSqft": 800, "furnishing": "semi-furnished" },
        "maintenance": { "included": true },
        "tenantPreferences": ["family"],
        "images": [],
        "createdAt": format!("2026-01-{:02}T00:00:00Z", (rent / 1000) % 28 + 1)
    })
}

pub(crate) fn sample_draft() -> PropertyDraft {
    PropertyDraft {
        title: "2BHK near Koregaon Park".to_owned(),
        description: "Sunny two bedroom apartment with balcony and covered parking.".to_owned(),
        property_type: PropertyType::Apartment,
        price: Price { rent: 25_000, security_deposit: 50_000, negotiable: true },
        location: Location {
            address: "12 North Main Road".to_owned(),
            city: "Pune".to_owned(),
            state: "Maharashtra".to_owned(),
            pincode: "411001".to_owned(),
            latitude: Some(18.5362),
            longitude: Some(73.8940),
        },
        details: Details {
            bedrooms: 2,
            bathrooms: 2,
            area_sqft: 950,
            furnishing: Some(Furnishing::SemiFurnished),
            floor: Some(3),
            total_floors: Some(7),
            available_from: Some("2026-11-01".to_owned()),
        },
        maintenance: Maintenance { included: false, amount: Some(2_500) },
        amenities: vec!["lift".to_owned(), "parking".to_owned()],
        tenant_preferences: vec![TenantPreference::Family, TenantPreference::Couples],
    }
}
