use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Car::Table)
                    .if_not_exists()
                    .col(pk_auto(Car::Id))
                    .col(string_len(Car::Name, 100).not_null())
                    .col(string_len(Car::Brand, 100).not_null())
                    .col(integer(Car::ModelYear).not_null())
                    .col(string_len(Car::Transmission, 16).not_null())
                    .col(string_len(Car::FuelType, 16).not_null())
                    .col(double(Car::PricePerDay).not_null())
                    .col(string_len(Car::ImageUrl, 255).not_null())
                    .col(boolean(Car::Available).not_null().default(true))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Car::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Car {
    #[sea_orm(iden = "cars")]
    Table,
    Id,
    Name,
    Brand,
    ModelYear,
    Transmission,
    FuelType,
    PricePerDay,
    ImageUrl,
    Available,
}
