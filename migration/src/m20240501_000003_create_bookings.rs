use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Bookings reference their owner by email and their car by id, neither
        // backed by a foreign key: deleting a car leaves its bookings in place.
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(pk_auto(Booking::Id))
                    .col(string_len(Booking::UserEmail, 255).not_null())
                    .col(integer(Booking::CarId).not_null())
                    .col(date(Booking::PickupDate).not_null())
                    .col(date(Booking::ReturnDate).not_null())
                    .col(string_len(Booking::Status, 16).not_null().default("pending"))
                    .col(double(Booking::Total).not_null())
                    .col(
                        timestamp_with_time_zone(Booking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_user_email")
                    .table(Booking::Table)
                    .col(Booking::UserEmail)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Booking {
    #[sea_orm(iden = "bookings")]
    Table,
    Id,
    UserEmail,
    CarId,
    PickupDate,
    ReturnDate,
    Status,
    Total,
    CreatedAt,
}
