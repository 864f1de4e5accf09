use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string_len(Users::Username, 150).unique_key())
                    .col(string_len(Users::Email, 254))
                    .col(string(Users::PasswordHash))
                    .col(timestamp_with_time_zone(Users::DateJoined))
                    .to_owned(),
            )
            .await?;

        // Create producers table
        manager
            .create_table(
                Table::create()
                    .table(Producers::Table)
                    .if_not_exists()
                    .col(pk_auto(Producers::Id))
                    .col(string_len(Producers::Name, 200))
                    .col(string_len(Producers::ContactInfo, 200))
                    .col(string_len(Producers::Email, 254))
                    .col(string_len(Producers::Location, 200))
                    .col(text_null(Producers::Bio))
                    .col(timestamp_with_time_zone(Producers::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create products table
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_auto(Products::Id))
                    .col(string_len(Products::Name, 200))
                    .col(text(Products::Description))
                    .col(decimal(Products::Price).decimal_len(10, 2))
                    .col(date(Products::ProdDate))
                    .col(string_len_null(Products::Image, 100))
                    .col(string_len(Products::Rarity, 20).default("common"))
                    .col(integer(Products::ProducerId))
                    .col(timestamp_with_time_zone(Products::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_producer")
                            .from(Products::Table, Products::ProducerId)
                            .to(Producers::Table, Producers::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create customers table, one row per user at most
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(pk_auto(Customers::Id))
                    .col(integer(Customers::UserId).unique_key())
                    .col(string_len(Customers::ContactInfo, 200))
                    .col(string_len(Customers::Location, 200))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_user")
                            .from(Customers::Table, Customers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create orders table
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(pk_auto(Orders::Id))
                    .col(integer(Orders::CustomerId))
                    .col(integer(Orders::ProductId))
                    .col(integer(Orders::Quantity).default(1))
                    .col(timestamp_with_time_zone(Orders::OrderDate))
                    .col(string_len(Orders::Status, 20).default("pending"))
                    .col(decimal(Orders::TotalPrice).decimal_len(10, 2))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_customer")
                            .from(Orders::Table, Orders::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_product")
                            .from(Orders::Table, Orders::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Order listings are always per customer, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_customer_order_date")
                    .table(Orders::Table)
                    .col(Orders::CustomerId)
                    .col(Orders::OrderDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_producer")
                    .table(Products::Table)
                    .col(Products::ProducerId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Producers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    DateJoined,
}

#[derive(DeriveIden)]
enum Producers {
    Table,
    Id,
    Name,
    ContactInfo,
    Email,
    Location,
    Bio,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Description,
    Price,
    ProdDate,
    Image,
    Rarity,
    ProducerId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    UserId,
    ContactInfo,
    Location,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    CustomerId,
    ProductId,
    Quantity,
    OrderDate,
    Status,
    TotalPrice,
}
