//! Document lifecycle integration tests for boq-service.

mod common;

use boq_service::models::{ClientInfo, CreateDocument, SectionInput, SubsectionInput};
use boq_service::services::DocumentService;
use chrono::{NaiveDate, Utc};
use common::{dec, item, sample_payload, test_scope, test_store};
use service_core::error::AppError;

#[tokio::test]
async fn create_document_assigns_first_number_for_today() {
    let service = DocumentService::new(test_store());
    let scope = test_scope();

    let document = service
        .create_document(&scope, sample_payload())
        .await
        .expect("Failed to create document");

    let expected = format!("BOQ-{}-0001", Utc::now().format("%Y%m%d"));
    assert_eq!(document.number, expected);
    assert_eq!(document.company_id, scope.company_id);
}

#[tokio::test]
async fn document_numbers_increment_sequentially() {
    let service = DocumentService::new(test_store());
    let scope = test_scope();

    let first = service
        .create_document(&scope, sample_payload())
        .await
        .expect("Failed to create first document");
    let second = service
        .create_document(&scope, sample_payload())
        .await
        .expect("Failed to create second document");

    assert!(first.number.ends_with("-0001"));
    assert!(second.number.ends_with("-0002"));
}

#[tokio::test]
async fn subtotal_is_recomputed_bottom_up() {
    let service = DocumentService::new(test_store());
    let scope = test_scope();

    let document = service
        .create_document(&scope, sample_payload())
        .await
        .expect("Failed to create document");

    // 10 × 50 + 5 × 100
    assert_eq!(document.subtotal(), dec("1000"));
    assert_eq!(document.sections[0].subsections[0].total(), dec("500"));
    assert_eq!(document.sections[0].subsections[1].total(), dec("500"));
}

#[tokio::test]
async fn partially_filled_item_blocks_creation() {
    let service = DocumentService::new(test_store());
    let scope = test_scope();

    let mut payload = sample_payload();
    // Description and quantity set, rate missing: two of three conditions.
    payload.sections[0].subsections[0]
        .items
        .push(item("Sand", "3", "0"));

    let result = service.create_document(&scope, payload).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn empty_items_are_dropped_silently() {
    let service = DocumentService::new(test_store());
    let scope = test_scope();

    let mut payload = sample_payload();
    payload.sections[0].subsections[0]
        .items
        .push(item("", "0", "0"));

    let document = service
        .create_document(&scope, payload)
        .await
        .expect("Empty items are noise, not an error");

    assert_eq!(document.sections[0].subsections[0].items.len(), 1);
    assert_eq!(document.subtotal(), dec("1000"));
}

#[tokio::test]
async fn missing_client_name_fails_validation() {
    let service = DocumentService::new(test_store());
    let scope = test_scope();

    let mut payload = sample_payload();
    payload.client.name = String::new();

    let result = service.create_document(&scope, payload).await;
    assert!(matches!(result, Err(AppError::ValidationErrors(_))));
}

#[tokio::test]
async fn section_and_item_order_is_preserved() {
    let service = DocumentService::new(test_store());
    let scope = test_scope();

    let payload = CreateDocument {
        date: NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
        currency: "USD".to_string(),
        client: ClientInfo {
            name: "Acme Builders".to_string(),
            email: None,
            phone: None,
            address: None,
        },
        sections: vec![
            SectionInput {
                title: Some("Zebra".to_string()),
                subsections: vec![SubsectionInput {
                    name: "B".to_string(),
                    label: "Second letter first".to_string(),
                    items: vec![item("Beta", "1", "2"), item("Alpha", "1", "1")],
                }],
            },
            SectionInput {
                title: Some("Aardvark".to_string()),
                subsections: vec![],
            },
        ],
    };

    let created = service
        .create_document(&scope, payload)
        .await
        .expect("Failed to create document");
    let fetched = service
        .get_document(&scope, created.id)
        .await
        .expect("Failed to fetch document")
        .expect("Document missing");

    let titles: Vec<_> = fetched
        .sections
        .iter()
        .map(|s| s.title.clone().unwrap())
        .collect();
    assert_eq!(titles, vec!["Zebra", "Aardvark"]);

    let descriptions: Vec<_> = fetched.sections[0].subsections[0]
        .items
        .iter()
        .map(|i| i.description.clone())
        .collect();
    assert_eq!(descriptions, vec!["Beta", "Alpha"]);
}

#[tokio::test]
async fn list_documents_is_scoped_to_company() {
    let store = test_store();
    let service = DocumentService::new(store.clone());
    let scope = test_scope();
    let mut other_scope = test_scope();
    other_scope.company_id = uuid::Uuid::new_v4();

    service
        .create_document(&scope, sample_payload())
        .await
        .expect("Failed to create document");
    service
        .create_document(&other_scope, sample_payload())
        .await
        .expect("Failed to create document in other company");

    let listed = service
        .list_documents(&scope)
        .await
        .expect("Failed to list documents");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].company_id, scope.company_id);
}

#[tokio::test]
async fn update_document_replaces_content_and_keeps_identity() {
    let service = DocumentService::new(test_store());
    let scope = test_scope();

    let created = service
        .create_document(&scope, sample_payload())
        .await
        .expect("Failed to create document");

    let mut payload = sample_payload();
    payload.sections[0].subsections[0].items = vec![item("Cement", "20", "50")];

    let updated = service
        .update_document(&scope, created.id, payload)
        .await
        .expect("Failed to update document");

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.number, created.number);
    assert_eq!(updated.subtotal(), dec("1500"));
}
