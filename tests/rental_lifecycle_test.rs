use chrono::NaiveDate;
use rentals_api::{
    db::{establish_connection_with_config, run_migrations, DbConfig, DbPool},
    services::materials::{CreateMaterialRequest, MaterialService},
    services::rentals::{RentalDraft, RentalItemDraft, RentalService, StockLine},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use uuid::Uuid;

async fn setup() -> (Arc<DbPool>, Arc<MaterialService>, RentalService) {
    // A single pooled connection keeps every query on the same in-memory DB
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

    let materials = Arc::new(MaterialService::new(db.clone(), None));
    let rentals = RentalService::new(db.clone(), materials.clone(), None);
    (db, materials, rentals)
}

async fn seed_material(
    materials: &MaterialService,
    item_name: &str,
    model: &str,
    quantity: i32,
    price: Decimal,
) -> Uuid {
    materials
        .create_material(CreateMaterialRequest {
            item_name: item_name.to_string(),
            model: Some(model.to_string()),
            quantity,
            price,
            notes: None,
        })
        .await
        .expect("Failed to seed material")
        .id
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn draft(items: Vec<RentalItemDraft>, amount_paid: Decimal) -> RentalDraft {
    RentalDraft {
        customer_name: "Kumara Silva".to_string(),
        mobile: Some("0771234567".to_string()),
        nic_or_license: Some("851234567V".to_string()),
        start_date: date(2024, 1, 1),
        end_date: date(2024, 1, 3),
        amount_paid,
        items,
    }
}

#[tokio::test]
async fn creating_a_rental_computes_totals_and_consumes_stock() {
    let (_db, materials, rentals) = setup().await;
    let material_id = seed_material(&materials, "Scaffolding", "H-Frame", 20, dec!(150.00)).await;

    let record = rentals
        .create_rental(draft(
            vec![RentalItemDraft {
                item_name: "Scaffolding".to_string(),
                model: "H-Frame".to_string(),
                quantity: 4,
                price: None,
            }],
            dec!(200.00),
        ))
        .await
        .expect("Failed to create rental");

    // Price backfilled from the ledger, totals derived server-side
    assert_eq!(record.items.len(), 1);
    assert_eq!(record.items[0].price, dec!(150.00));
    assert_eq!(record.items[0].total, dec!(600.00));
    assert_eq!(record.rental.grand_total, dec!(600.00));
    assert_eq!(record.rental.remaining_amount, dec!(400.00));
    // Inclusive day count: Jan 1 through Jan 3 is three days
    assert_eq!(record.rental.number_of_days, 3);

    let material = materials.get_material(material_id).await.unwrap();
    assert_eq!(material.quantity, 16);
}

#[tokio::test]
async fn unknown_items_price_at_zero_but_the_rental_still_saves() {
    let (_db, _materials, rentals) = setup().await;

    let record = rentals
        .create_rental(draft(
            vec![RentalItemDraft {
                item_name: "Jack Hammer".to_string(),
                model: "JH-2".to_string(),
                quantity: 2,
                price: None,
            }],
            dec!(0),
        ))
        .await
        .expect("Rental should save even with no matching material");

    assert_eq!(record.items[0].price, Decimal::ZERO);
    assert_eq!(record.rental.grand_total, Decimal::ZERO);
}

#[tokio::test]
async fn client_supplied_prices_are_kept_and_totals_recomputed() {
    let (_db, materials, rentals) = setup().await;
    seed_material(&materials, "Scaffolding", "H-Frame", 20, dec!(150.00)).await;

    let record = rentals
        .create_rental(draft(
            vec![RentalItemDraft {
                item_name: "Scaffolding".to_string(),
                model: "H-Frame".to_string(),
                quantity: 3,
                price: Some(dec!(99.99)),
            }],
            dec!(0),
        ))
        .await
        .unwrap();

    assert_eq!(record.items[0].price, dec!(99.99));
    assert_eq!(record.items[0].total, dec!(299.97));
}

#[tokio::test]
async fn editing_a_rental_restores_old_stock_before_consuming_new() {
    let (_db, materials, rentals) = setup().await;
    let ladder = seed_material(&materials, "Ladder", "A-Type", 10, dec!(50.00)).await;
    let mixer = seed_material(&materials, "Mixer", "M-500", 5, dec!(300.00)).await;

    let record = rentals
        .create_rental(draft(
            vec![RentalItemDraft {
                item_name: "Ladder".to_string(),
                model: "A-Type".to_string(),
                quantity: 6,
                price: None,
            }],
            dec!(0),
        ))
        .await
        .unwrap();
    assert_eq!(materials.get_material(ladder).await.unwrap().quantity, 4);

    // Swap the ladder line for a mixer line
    let updated = rentals
        .update_rental(
            record.rental.id,
            draft(
                vec![RentalItemDraft {
                    item_name: "Mixer".to_string(),
                    model: "M-500".to_string(),
                    quantity: 2,
                    price: None,
                }],
                dec!(100.00),
            ),
            None,
        )
        .await
        .unwrap();

    assert_eq!(materials.get_material(ladder).await.unwrap().quantity, 10);
    assert_eq!(materials.get_material(mixer).await.unwrap().quantity, 3);
    assert_eq!(updated.rental.grand_total, dec!(600.00));
    assert_eq!(updated.rental.remaining_amount, dec!(500.00));
    assert_eq!(updated.items.len(), 1);
}

#[tokio::test]
async fn editing_honours_caller_supplied_original_items() {
    let (_db, materials, rentals) = setup().await;
    let ladder = seed_material(&materials, "Ladder", "A-Type", 10, dec!(50.00)).await;

    let record = rentals
        .create_rental(draft(
            vec![RentalItemDraft {
                item_name: "Ladder".to_string(),
                model: "A-Type".to_string(),
                quantity: 6,
                price: None,
            }],
            dec!(0),
        ))
        .await
        .unwrap();
    assert_eq!(materials.get_material(ladder).await.unwrap().quantity, 4);

    // Caller reports only 2 of the original 6 as outstanding
    rentals
        .update_rental(
            record.rental.id,
            draft(
                vec![RentalItemDraft {
                    item_name: "Ladder".to_string(),
                    model: "A-Type".to_string(),
                    quantity: 1,
                    price: None,
                }],
                dec!(0),
            ),
            Some(vec![StockLine {
                item_name: "Ladder".to_string(),
                model: "A-Type".to_string(),
                quantity: 2,
            }]),
        )
        .await
        .unwrap();

    // 4 + 2 restored - 1 consumed
    assert_eq!(materials.get_material(ladder).await.unwrap().quantity, 5);
}

#[tokio::test]
async fn repeating_the_same_update_leaves_stock_unchanged() {
    let (_db, materials, rentals) = setup().await;
    let ladder = seed_material(&materials, "Ladder", "A-Type", 10, dec!(50.00)).await;

    let items = vec![RentalItemDraft {
        item_name: "Ladder".to_string(),
        model: "A-Type".to_string(),
        quantity: 3,
        price: None,
    }];
    let record = rentals
        .create_rental(draft(items.clone(), dec!(0)))
        .await
        .unwrap();
    assert_eq!(materials.get_material(ladder).await.unwrap().quantity, 7);

    let originals = Some(vec![StockLine {
        item_name: "Ladder".to_string(),
        model: "A-Type".to_string(),
        quantity: 3,
    }]);

    // Reversal then reapplication is symmetric, so repeating the same
    // update nets zero stock movement
    for _ in 0..2 {
        rentals
            .update_rental(
                record.rental.id,
                draft(items.clone(), dec!(0)),
                originals.clone(),
            )
            .await
            .unwrap();
    }
    assert_eq!(materials.get_material(ladder).await.unwrap().quantity, 7);
}

#[tokio::test]
async fn deleting_a_rental_restores_stock_and_removes_items() {
    let (_db, materials, rentals) = setup().await;
    let ladder = seed_material(&materials, "Ladder", "A-Type", 10, dec!(50.00)).await;

    let record = rentals
        .create_rental(draft(
            vec![RentalItemDraft {
                item_name: "Ladder".to_string(),
                model: "A-Type".to_string(),
                quantity: 3,
                price: None,
            }],
            dec!(0),
        ))
        .await
        .unwrap();
    assert_eq!(materials.get_material(ladder).await.unwrap().quantity, 7);

    rentals.delete_rental(record.rental.id).await.unwrap();

    assert_eq!(materials.get_material(ladder).await.unwrap().quantity, 10);
    assert!(rentals.get_rental(record.rental.id).await.is_err());
    assert!(rentals.list_rentals().await.unwrap().is_empty());
}

#[tokio::test]
async fn inverted_date_windows_save_with_zero_days() {
    let (_db, materials, rentals) = setup().await;
    seed_material(&materials, "Ladder", "A-Type", 10, dec!(50.00)).await;

    let mut d = draft(
        vec![RentalItemDraft {
            item_name: "Ladder".to_string(),
            model: "A-Type".to_string(),
            quantity: 1,
            price: None,
        }],
        dec!(0),
    );
    d.start_date = date(2024, 1, 10);
    d.end_date = date(2024, 1, 5);

    let record = rentals.create_rental(d).await.unwrap();
    assert_eq!(record.rental.number_of_days, 0);
}

#[tokio::test]
async fn incomplete_submissions_write_nothing() {
    let (_db, materials, rentals) = setup().await;
    let ladder = seed_material(&materials, "Ladder", "A-Type", 10, dec!(50.00)).await;

    let mut d = draft(
        vec![RentalItemDraft {
            item_name: "Ladder".to_string(),
            model: "A-Type".to_string(),
            quantity: 2,
            price: None,
        }],
        dec!(0),
    );
    d.customer_name = "   ".to_string();

    assert!(rentals.create_rental(d).await.is_err());
    assert!(rentals.list_rentals().await.unwrap().is_empty());
    assert_eq!(materials.get_material(ladder).await.unwrap().quantity, 10);
}
