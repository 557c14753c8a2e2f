use sea_orm_migration::{prelude::*, schema::*};

use super::m20240501_000001_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No unique key on (user_id, car_id): the same car may sit in a cart twice
        manager
            .create_table(
                Table::create()
                    .table(CartItem::Table)
                    .if_not_exists()
                    .col(pk_auto(CartItem::Id))
                    .col(integer(CartItem::UserId).not_null())
                    .col(integer(CartItem::CarId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cart_items_user")
                            .from(CartItem::Table, CartItem::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CartItem::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CartItem {
    #[sea_orm(iden = "cart_items")]
    Table,
    Id,
    UserId,
    CarId,
}
