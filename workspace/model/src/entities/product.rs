use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Categorical tag on a product. Has no effect on pricing.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    #[sea_orm(string_value = "common")]
    Common,
    #[sea_orm(string_value = "rare")]
    Rare,
    #[sea_orm(string_value = "limited")]
    Limited,
    #[sea_orm(string_value = "unique")]
    Unique,
}

impl Rarity {
    /// Human readable label shown in listings.
    pub fn label(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Limited => "Limited Edition",
            Rarity::Unique => "Unique Piece",
        }
    }
}

/// A product offered by exactly one producer.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    /// Production date.
    pub prod_date: Date,
    /// Opaque path or URL of the product image. Storage is handled elsewhere.
    pub image: Option<String>,
    pub rarity: Rarity,
    pub producer_id: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::producer::Entity",
        from = "Column::ProducerId",
        to = "super::producer::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Producer,
    #[sea_orm(has_many = "super::order::Entity")]
    Order,
}

impl Related<super::producer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Producer.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
