mod common;

use std::sync::Arc;

use catalog_storage::book::BookStore;
use common::*;
use http::StatusCode;
use pretty_assertions::assert_eq;

async fn seed(context: &TestSetup) {
    for (title, authors, reference, category) in [
        ("Rayuela", "Julio Cortázar", "LIT-002", "Literatura"),
        ("Cálculo", "James Stewart", "MAT-001", "Matemáticas"),
        ("Cien años de soledad", "Gabriel García Márquez", "LIT-001", "Literatura"),
        ("Breve historia del tiempo", "Stephen Hawking", "FIS-001", "Física"),
    ] {
        context
            .store
            .insert(book_record(title, authors, reference, category))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_index_lists_books_by_title_with_distinct_categories() {
    let context = TestSetup::new();
    seed(&context).await;

    let response = context.send_get_request("/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = parse_response_body(response).await;
    assert_eq!(page["page"], "index");
    assert_eq!(
        titles(&page),
        vec![
            "Breve historia del tiempo",
            "Cien años de soledad",
            "Cálculo",
            "Rayuela",
        ]
    );
    assert_eq!(
        page["categorias"],
        serde_json::json!(["Física", "Literatura", "Matemáticas"])
    );
}

#[tokio::test]
async fn test_book_detail_shows_stored_fields() {
    let context = TestSetup::new();
    let book = context
        .store
        .insert(book_record("Rayuela", "Julio Cortázar", "LIT-002", "Literatura"))
        .await
        .unwrap();

    let response = context
        .send_get_request(&format!("/libro/{}", book.id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = parse_response_body(response).await;
    assert_eq!(page["page"], "book_detail");
    assert_eq!(page["libro"]["id"], book.id.as_str());
    assert_eq!(page["libro"]["titulo"], "Rayuela");
    assert_eq!(page["libro"]["autores"], "Julio Cortázar");
    assert_eq!(page["libro"]["referencia"], "LIT-002");
    assert_eq!(page["libro"]["num_paginas"], 200);
    assert_eq!(page["libro"]["cantidad_ejemplares"], 2);
    assert!(page["libro"]["imagen_url"].is_null());
}

#[tokio::test]
async fn test_unknown_book_redirects_with_notice() {
    let context = TestSetup::new();

    let response = context.send_get_request("/libro/no-existe").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));

    let page = parse_response_body(context.send_get_request("/").await).await;
    assert_eq!(notice_messages(&page), vec!["Libro no encontrado"]);
    assert_eq!(page["notices"][0]["level"], "error");

    // Notices are shown once
    let page = parse_response_body(context.send_get_request("/").await).await;
    assert!(notice_messages(&page).is_empty());
}

#[tokio::test]
async fn test_search_text_matches_any_field_case_insensitively() {
    let context = TestSetup::new();
    seed(&context).await;

    let page = parse_response_body(context.send_get_request("/buscar?q=rayu").await).await;
    assert_eq!(titles(&page), vec!["Rayuela"]);

    let page = parse_response_body(context.send_get_request("/buscar?q=HAWKING").await).await;
    assert_eq!(titles(&page), vec!["Breve historia del tiempo"]);

    let page = parse_response_body(context.send_get_request("/buscar?q=lit-00").await).await;
    assert_eq!(titles(&page), vec!["Cien años de soledad", "Rayuela"]);
    assert_eq!(page["query"], "lit-00");
}

#[tokio::test]
async fn test_search_combines_text_and_category() {
    let context = TestSetup::new();
    seed(&context).await;

    let page = parse_response_body(
        context
            .send_get_request("/buscar?q=a&categoria=Literatura")
            .await,
    )
    .await;

    assert_eq!(page["page"], "search");
    assert_eq!(titles(&page), vec!["Cien años de soledad", "Rayuela"]);
    assert_eq!(page["categoria"], "Literatura");
    // The category list is not narrowed by the filter
    assert_eq!(
        page["categorias"],
        serde_json::json!(["Física", "Literatura", "Matemáticas"])
    );
}

#[tokio::test]
async fn test_search_without_filter_lists_everything() {
    let context = TestSetup::new();
    seed(&context).await;

    let page = parse_response_body(context.send_get_request("/buscar").await).await;

    assert_eq!(titles(&page).len(), 4);
    assert_eq!(page["query"], "");
    assert_eq!(page["categoria"], "");
}

#[tokio::test]
async fn test_unreadable_search_query_lists_everything() {
    let context = TestSetup::new();
    seed(&context).await;

    let response = context.send_get_request("/buscar?q=rayuela&q=calculo").await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = parse_response_body(response).await;
    assert_eq!(page["page"], "search");
    assert_eq!(titles(&page).len(), 4);
    assert_eq!(page["query"], "");
}

#[tokio::test]
async fn test_search_treats_percent_and_underscore_literally() {
    let context = TestSetup::new();
    seed(&context).await;
    context
        .store
        .insert(book_record("Rebajas 50%_off", "Varios", "VAR-001", "Varios"))
        .await
        .unwrap();

    let page = parse_response_body(context.send_get_request("/buscar?q=50%25_").await).await;
    assert_eq!(titles(&page), vec!["Rebajas 50%_off"]);

    let page = parse_response_body(context.send_get_request("/buscar?q=%25").await).await;
    assert_eq!(titles(&page), vec!["Rebajas 50%_off"]);
}

#[tokio::test]
async fn test_pages_degrade_when_store_is_down() {
    let context = TestSetup::with_store(Arc::new(FailingBookStore));

    let response = context.send_get_request("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = parse_response_body(response).await;
    assert!(titles(&page).is_empty());
    assert_eq!(page["categorias"], serde_json::json!([]));

    let response = context.send_get_request("/buscar?q=rayuela").await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = parse_response_body(response).await;
    assert!(titles(&page).is_empty());
    assert_eq!(page["query"], "rayuela");

    let response = context.send_get_request("/libro/1").await;
    assert_eq!(location(&response), Some("/"));
}

#[tokio::test]
async fn test_health() {
    let context = TestSetup::new();

    let response = context.send_get_request("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "ok");
}
