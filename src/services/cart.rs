//! Server-side mirror of a user's cart.
//!
//! Writes are whole-cart replacements: concurrent writers for the same user
//! race and the last one wins.

use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use serde::Serialize;

use crate::entities::car::{self, FuelType, Transmission};
use crate::entities::cart_item;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize)]
pub struct CartEntry {
    pub id: i32,
    pub car_id: i32,
    pub name: String,
    pub brand: String,
    pub model_year: i32,
    pub fuel_type: FuelType,
    pub transmission: Transmission,
    pub price_per_day: f64,
    pub image_url: String,
}

/// Cart rows of `user_id` joined with their cars. Rows pointing at a deleted
/// car are skipped.
pub async fn get_cart(db: &DatabaseConnection, user_id: i32) -> AppResult<Vec<CartEntry>> {
    let rows = cart_item::Entity::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .find_also_related(car::Entity)
        .order_by_asc(cart_item::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(item, car)| {
            let car = car?;
            Some(CartEntry {
                id: item.id,
                car_id: item.car_id,
                name: car.name,
                brand: car.brand,
                model_year: car.model_year,
                fuel_type: car.fuel_type,
                transmission: car.transmission,
                price_per_day: car.price_per_day,
                image_url: car.image_url,
            })
        })
        .collect())
}

/// Replace the whole cart of `user_id` with `car_ids`, in order, atomically.
pub async fn replace_cart(
    db: &DatabaseConnection,
    user_id: i32,
    car_ids: &[i32],
) -> AppResult<()> {
    let txn = db.begin().await?;

    match write_cart(&txn, user_id, car_ids).await {
        Ok(()) => {
            txn.commit()
                .await
                .map_err(|e| AppError::transaction("Failed to update cart", e))?;
            tracing::info!(user_id, items = car_ids.len(), "Cart replaced");
            Ok(())
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!(error = %rollback_err, "Rollback failed");
            }
            Err(AppError::transaction("Failed to update cart", e))
        }
    }
}

async fn write_cart(txn: &DatabaseTransaction, user_id: i32, car_ids: &[i32]) -> AppResult<()> {
    cart_item::Entity::delete_many()
        .filter(cart_item::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;

    if car_ids.is_empty() {
        return Ok(());
    }

    let rows = car_ids.iter().map(|car_id| cart_item::ActiveModel {
        user_id: Set(user_id),
        car_id: Set(*car_id),
        ..Default::default()
    });

    cart_item::Entity::insert_many(rows)
        .exec_without_returning(txn)
        .await?;

    Ok(())
}

/// Remove every row of `car_id` from the cart of `user_id`.
pub async fn remove_item(db: &DatabaseConnection, user_id: i32, car_id: i32) -> AppResult<()> {
    let result = cart_item::Entity::delete_many()
        .filter(cart_item::Column::UserId.eq(user_id))
        .filter(cart_item::Column::CarId.eq(car_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Cart item not found".to_string()));
    }

    Ok(())
}

/// Empty the cart of `user_id`. Returns how many rows went away.
pub async fn clear_cart(db: &DatabaseConnection, user_id: i32) -> AppResult<u64> {
    let result = cart_item::Entity::delete_many()
        .filter(cart_item::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// A shopper's cart as seen by one client session.
///
/// While logged out the cart lives only here. Logging in pushes a non-empty
/// local cart to the store, which from then on is the record; every later
/// mutation goes to the store first and is applied locally only once the
/// store accepted it.
#[derive(Debug, Clone, Default)]
pub struct CartSession {
    user_id: Option<i32>,
    car_ids: Vec<i32>,
}

impl CartSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_id(&self) -> Option<i32> {
        self.user_id
    }

    pub fn car_ids(&self) -> &[i32] {
        &self.car_ids
    }

    pub async fn login(&mut self, db: &DatabaseConnection, user_id: i32) -> AppResult<()> {
        if !self.car_ids.is_empty() {
            replace_cart(db, user_id, &self.car_ids).await?;
        }

        self.car_ids = get_cart(db, user_id)
            .await?
            .into_iter()
            .map(|entry| entry.car_id)
            .collect();
        self.user_id = Some(user_id);
        Ok(())
    }

    pub fn logout(&mut self) {
        self.user_id = None;
        self.car_ids.clear();
    }

    pub async fn add(&mut self, db: &DatabaseConnection, car_id: i32) -> AppResult<()> {
        let mut next = self.car_ids.clone();
        next.push(car_id);

        if let Some(user_id) = self.user_id {
            replace_cart(db, user_id, &next).await?;
        }

        self.car_ids = next;
        Ok(())
    }

    pub async fn remove(&mut self, db: &DatabaseConnection, car_id: i32) -> AppResult<()> {
        match self.user_id {
            Some(user_id) => remove_item(db, user_id, car_id).await?,
            None if !self.car_ids.contains(&car_id) => {
                return Err(AppError::NotFound("Cart item not found".to_string()));
            }
            None => {}
        }

        self.car_ids.retain(|id| *id != car_id);
        Ok(())
    }

    pub async fn clear(&mut self, db: &DatabaseConnection) -> AppResult<()> {
        if let Some(user_id) = self.user_id {
            clear_cart(db, user_id).await?;
        }

        self.car_ids.clear();
        Ok(())
    }
}
