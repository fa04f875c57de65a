use sea_orm_migration::prelude::*;

/// Embedded migrator holding the full schema history.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_materials::Migration),
            Box::new(m20240101_000002_create_customers::Migration),
            Box::new(m20240101_000003_create_rentals::Migration),
            Box::new(m20240101_000004_create_rental_items::Migration),
            Box::new(m20240101_000005_create_users::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_names_are_distinct() {
        let migrations = Migrator::migrations();
        let mut names: Vec<&str> = migrations.iter().map(|m| m.name()).collect();
        assert_eq!(names.len(), 5);
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 5, "duplicate migration names break the version table");
    }
}

mod m20240101_000001_create_materials {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_materials"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Materials::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Materials::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Materials::ItemName).string().not_null())
                        .col(
                            ColumnDef::new(Materials::Model)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Materials::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Materials::Price)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Materials::Notes).string())
                        .col(
                            ColumnDef::new(Materials::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Materials::UpdatedAt).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_materials_item_name_model")
                        .table(Materials::Table)
                        .col(Materials::ItemName)
                        .col(Materials::Model)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Materials::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Materials {
        Table,
        Id,
        ItemName,
        Model,
        Quantity,
        Price,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_customers {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_customers"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Customers::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::Mobile).string())
                        .col(
                            ColumnDef::new(Customers::NicOrLicense)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Customers::Address).string())
                        .col(ColumnDef::new(Customers::Photo).string())
                        .col(
                            ColumnDef::new(Customers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Customers {
        Table,
        Id,
        Name,
        Mobile,
        NicOrLicense,
        Address,
        Photo,
        CreatedAt,
    }
}

mod m20240101_000003_create_rentals {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_rentals"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Rentals::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Rentals::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Rentals::CustomerName).string().not_null())
                        .col(ColumnDef::new(Rentals::Mobile).string())
                        .col(ColumnDef::new(Rentals::NicOrLicense).string())
                        .col(ColumnDef::new(Rentals::StartDate).date().not_null())
                        .col(ColumnDef::new(Rentals::EndDate).date().not_null())
                        .col(
                            ColumnDef::new(Rentals::NumberOfDays)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Rentals::AmountPaid)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Rentals::GrandTotal)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Rentals::RemainingAmount)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Rentals::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Rentals::UpdatedAt).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_rentals_start_date")
                        .table(Rentals::Table)
                        .col(Rentals::StartDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Rentals::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Rentals {
        Table,
        Id,
        CustomerName,
        Mobile,
        NicOrLicense,
        StartDate,
        EndDate,
        NumberOfDays,
        AmountPaid,
        GrandTotal,
        RemainingAmount,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_rental_items {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_rental_items"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(RentalItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RentalItems::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(RentalItems::RentalId).uuid().not_null())
                        .col(ColumnDef::new(RentalItems::ItemName).string().not_null())
                        .col(
                            ColumnDef::new(RentalItems::Model)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(RentalItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(RentalItems::Price)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RentalItems::Total)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_rental_items_rental_id")
                                .from(RentalItems::Table, RentalItems::RentalId)
                                .to(Rentals::Table, Rentals::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_rental_items_rental_id")
                        .table(RentalItems::Table)
                        .col(RentalItems::RentalId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RentalItems::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum RentalItems {
        Table,
        Id,
        RentalId,
        ItemName,
        Model,
        Quantity,
        Price,
        Total,
    }

    #[derive(Iden)]
    enum Rentals {
        Table,
        Id,
    }
}

mod m20240101_000005_create_users {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_users"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                        .col(
                            ColumnDef::new(Users::Username)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Users::Role)
                                .string()
                                .not_null()
                                .default("staff"),
                        )
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Users {
        Table,
        Id,
        Username,
        PasswordHash,
        Role,
        CreatedAt,
    }
}
