//! End-to-end checks against the public PokeAPI.
//!
//! Skipped unless `APIPROBE_LIVE` is set. `BASE_URL` may point them at a mirror.

use apiprobe_http::{
    request,
    schema::{self, PaginatedList, Pokemon, PokemonSummary, PokemonType},
    Method, RequestOptions,
};
use serde_json::json;

fn live_enabled() -> bool {
    match std::env::var("APIPROBE_LIVE") {
        Ok(value) if !value.trim().is_empty() => true,
        _ => {
            eprintln!("skipping live test: APIPROBE_LIVE is not set");
            false
        }
    }
}

#[tokio::test]
async fn live_ditto_is_a_valid_pokemon() {
    if !live_enabled() {
        return;
    }

    let res = request("/pokemon/ditto", RequestOptions::new().retries(1))
        .await
        .expect("request must succeed");
    assert_eq!(res.status(), 200);
    assert!(res
        .headers()
        .get("content-type")
        .unwrap_or_default()
        .contains("application/json"));

    let ditto: Pokemon = schema::parse(res.json_value().await.expect("json body"))
        .expect("ditto must match schema");
    assert_eq!(ditto.name, "ditto");
    assert!(ditto.id > 0);
    assert!(!ditto.abilities.is_empty());
}

#[tokio::test]
async fn live_pagination_first_page() {
    if !live_enabled() {
        return;
    }

    let res = request(
        "/pokemon",
        RequestOptions::new().param("limit", 20).param("offset", 0),
    )
    .await
    .expect("request must succeed");
    assert_eq!(res.status(), 200);

    let page: PaginatedList = schema::parse(res.json_value().await.expect("json body"))
        .expect("page must match schema");
    assert_eq!(page.results.len(), 20);
    assert!(page.next.is_some());
    assert!(page.previous.is_none());
}

#[tokio::test]
async fn live_fire_type_has_damage_relations() {
    if !live_enabled() {
        return;
    }

    let res = request("/type/fire", RequestOptions::new())
        .await
        .expect("request must succeed");
    assert_eq!(res.status(), 200);

    let fire: PokemonType = schema::parse(res.json_value().await.expect("json body"))
        .expect("type must match schema");
    assert_eq!(fire.name, "fire");
    assert!(fire.damage_relations.total() > 0);
}

#[tokio::test]
async fn live_known_ids_resolve_to_names() {
    if !live_enabled() {
        return;
    }

    for (path, name) in [
        ("/pokemon/1", "bulbasaur"),
        ("/pokemon/25", "pikachu"),
        ("/pokemon/150", "mewtwo"),
    ] {
        let res = request(path, RequestOptions::new())
            .await
            .expect("request must succeed");
        assert_eq!(res.status(), 200, "{path}");
        let summary: PokemonSummary = schema::parse(res.json_value().await.expect("json body"))
            .expect("summary must match schema");
        assert_eq!(summary.name, name);
        assert!(summary.id > 0);
    }
}

#[tokio::test]
async fn live_common_headers_present() {
    if !live_enabled() {
        return;
    }

    let res = request("/pokemon/1", RequestOptions::new())
        .await
        .expect("request must succeed");
    assert_eq!(res.status(), 200);
    assert!(res.headers().has("cache-control"));
    assert!(res.headers().has("date"));
}

#[tokio::test]
async fn live_unknown_pokemon_is_not_found() {
    if !live_enabled() {
        return;
    }

    for path in ["/pokemon/nonexistentmon", "/pokemon/100000"] {
        let res = request(path, RequestOptions::new())
            .await
            .expect("404 is a response");
        assert_eq!(res.status(), 404, "{path}");
        assert_eq!(res.attempts(), 1);
    }
}

#[tokio::test]
async fn live_negative_offset_is_coerced_or_rejected() {
    if !live_enabled() {
        return;
    }

    let res = request(
        "/pokemon",
        RequestOptions::new().param("limit", 5).param("offset", -10),
    )
    .await
    .expect("request must succeed");
    assert!([200, 400].contains(&res.status()));
    if res.status() == 200 {
        let page: PaginatedList = schema::parse(res.json_value().await.expect("json body"))
            .expect("page must match schema");
        assert!(page.results.len() <= 5);
    }
}

// Zero limit falling back to the default page size is the remote API's
// behavior, not something the client enforces.
#[tokio::test]
async fn live_zero_limit_uses_default_page_size() {
    if !live_enabled() {
        return;
    }

    let res = request(
        "/pokemon",
        RequestOptions::new().param("limit", 0).param("offset", 0),
    )
    .await
    .expect("request must succeed");
    assert_eq!(res.status(), 200);
    let page: PaginatedList = schema::parse(res.json_value().await.expect("json body"))
        .expect("page must match schema");
    assert!((1..=20).contains(&page.results.len()));
    assert!(page.previous.is_none());
}

#[tokio::test]
async fn live_post_is_not_supported() {
    if !live_enabled() {
        return;
    }

    let res = request(
        "/pokemon",
        RequestOptions::new()
            .method(Method::POST)
            .json_body(&json!({"foo": "bar"}))
            .expect("body must encode"),
    )
    .await
    .expect("request must succeed");
    assert!([404, 405].contains(&res.status()));
}

#[tokio::test]
async fn live_escaped_markup_in_path_is_rejected() {
    if !live_enabled() {
        return;
    }

    let res = request("/pokemon/%3Cscript%3E", RequestOptions::new())
        .await
        .expect("request must succeed");
    assert!([400, 404].contains(&res.status()));
}

#[tokio::test]
async fn live_transient_errors_surface_as_statuses() {
    if !live_enabled() {
        return;
    }

    let res = request("/pokemon/ditto", RequestOptions::new())
        .await
        .expect("request must succeed");
    assert!([200, 429, 503, 504].contains(&res.status()));
}
