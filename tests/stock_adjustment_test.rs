use rentals_api::{
    db::{establish_connection_with_config, run_migrations, DbConfig, DbPool},
    errors::ServiceError,
    services::materials::{CreateMaterialRequest, MaterialService},
    services::suggestions::{SuggestionField, SuggestionService},
};
use rust_decimal_macros::dec;
use std::sync::Arc;
use uuid::Uuid;

async fn setup() -> (Arc<DbPool>, MaterialService) {
    let config = DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        ..DbConfig::default()
    };
    let db = Arc::new(
        establish_connection_with_config(&config)
            .await
            .expect("Failed to connect"),
    );
    run_migrations(db.as_ref())
        .await
        .expect("Failed to run migrations");

    let materials = MaterialService::new(db.clone(), None);
    (db, materials)
}

async fn seed(materials: &MaterialService, item_name: &str, model: &str, quantity: i32) -> Uuid {
    materials
        .create_material(CreateMaterialRequest {
            item_name: item_name.to_string(),
            model: Some(model.to_string()),
            quantity,
            price: dec!(100.00),
            notes: None,
        })
        .await
        .expect("Failed to seed material")
        .id
}

#[tokio::test]
async fn consuming_stock_clamps_at_zero() {
    let (_db, materials) = setup().await;
    let id = seed(&materials, "Drill", "D-18V", 3).await;

    materials.adjust_stock("Drill", "D-18V", -10).await.unwrap();

    assert_eq!(materials.get_material(id).await.unwrap().quantity, 0);
}

#[tokio::test]
async fn restoring_stock_adds_to_the_ledger() {
    let (_db, materials) = setup().await;
    let id = seed(&materials, "Drill", "D-18V", 3).await;

    materials.adjust_stock("Drill", "D-18V", 5).await.unwrap();

    assert_eq!(materials.get_material(id).await.unwrap().quantity, 8);
}

#[tokio::test]
async fn adjusting_an_unknown_item_is_not_found() {
    let (_db, materials) = setup().await;
    seed(&materials, "Drill", "D-18V", 3).await;

    let err = materials
        .adjust_stock("Drill", "D-24V", -1)
        .await
        .expect_err("Unknown model should not adjust");
    assert!(matches!(err, ServiceError::NotFound(_)));

    // The known row is untouched
    assert_eq!(
        materials.list_materials().await.unwrap()[0].quantity,
        3
    );
}

#[tokio::test]
async fn price_lookup_reflects_the_ledger() {
    let (_db, materials) = setup().await;
    seed(&materials, "Drill", "D-18V", 3).await;

    assert_eq!(
        materials.find_price("Drill", "D-18V").await.unwrap(),
        Some(dec!(100.00))
    );
    assert_eq!(materials.find_price("Drill", "D-24V").await.unwrap(), None);
}

#[tokio::test]
async fn suggestions_match_case_insensitively_and_dedupe() {
    let (db, materials) = setup().await;
    seed(&materials, "Concrete Mixer", "M-300", 2).await;
    seed(&materials, "concrete mixer", "M-500", 1).await;
    seed(&materials, "Concrete Saw", "S-12", 4).await;
    seed(&materials, "Ladder", "A-Type", 6).await;

    let suggestions = SuggestionService::new(db);
    let names = suggestions
        .suggest(SuggestionField::ItemName, "conc")
        .await
        .unwrap();

    assert_eq!(names.len(), 2);
    assert!(names
        .iter()
        .any(|n| n.eq_ignore_ascii_case("concrete mixer")));
    assert!(names.contains(&"Concrete Saw".to_string()));

    let blank = suggestions
        .suggest(SuggestionField::ItemName, "   ")
        .await
        .unwrap();
    assert!(blank.is_empty());
}

#[tokio::test]
async fn suggestion_query_wildcards_match_literally() {
    let (db, materials) = setup().await;
    seed(&materials, "50% Grade Sand", "G-50", 10).await;
    seed(&materials, "500 Grit Paper", "P-500", 20).await;
    seed(&materials, "Under_layment", "U-1", 5).await;

    let suggestions = SuggestionService::new(db);

    let percent = suggestions
        .suggest(SuggestionField::ItemName, "50%")
        .await
        .unwrap();
    assert_eq!(percent, vec!["50% Grade Sand".to_string()]);

    let underscore = suggestions
        .suggest(SuggestionField::ItemName, "under_")
        .await
        .unwrap();
    assert_eq!(underscore, vec!["Under_layment".to_string()]);
}
