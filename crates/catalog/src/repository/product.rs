use domain::{Discount, Field, Product};
use store::{Columns, Mutation, Value};

use crate::error::Result;
use crate::schema::products as col;

fn put_price(columns: &mut Columns, product: &Product) -> Result<()> {
    let (numerator, denominator) = product.base_price().to_i64_parts()?;
    columns.insert(col::BASE_PRICE_NUMERATOR, Value::int(numerator));
    columns.insert(col::BASE_PRICE_DENOMINATOR, Value::int(denominator));
    Ok(())
}

/// Discount ratio (0–1 scale) as an exact fraction such as `"1/5"`.
pub fn encode_discount_ratio(discount: &Discount) -> String {
    discount.ratio().to_string()
}

fn put_discount(columns: &mut Columns, discount: Option<&Discount>) {
    columns.insert(
        col::DISCOUNT_PERCENT,
        Value::Text(discount.map(encode_discount_ratio)),
    );
    columns.insert(
        col::DISCOUNT_START_DATE,
        Value::Timestamp(discount.map(Discount::start)),
    );
    columns.insert(
        col::DISCOUNT_END_DATE,
        Value::Timestamp(discount.map(Discount::end)),
    );
}

/// Insert of a brand-new product. Every column is written; absent
/// description and discount fields are stored as NULL.
pub fn insert_mutation(product: &Product) -> Result<Mutation> {
    let mut columns = Columns::new();
    columns.insert(col::PRODUCT_ID, Value::text(product.id().as_str()));
    columns.insert(col::NAME, Value::text(product.name()));
    columns.insert(
        col::DESCRIPTION,
        Value::Text(product.description().map(str::to_string)),
    );
    columns.insert(col::CATEGORY, Value::text(product.category()));
    put_price(&mut columns, product)?;
    put_discount(&mut columns, product.discount());
    columns.insert(col::STATUS, Value::text(product.status().as_str()));
    columns.insert(col::CREATED_AT, Value::timestamp(product.created_at()));
    columns.insert(col::UPDATED_AT, Value::timestamp(product.updated_at()));
    columns.insert(col::ARCHIVED_AT, Value::Timestamp(product.archived_at()));

    Ok(Mutation::insert(col::TABLE, columns))
}

/// Update of the dirty columns plus `updated_at`, or `None` when nothing
/// is dirty.
pub fn update_mutation(product: &Product) -> Result<Option<Mutation>> {
    let changes = product.changes();
    if !changes.has_changes() {
        return Ok(None);
    }

    let mut columns = Columns::new();
    for field in changes.dirty_fields() {
        match field {
            Field::Name => {
                columns.insert(col::NAME, Value::text(product.name()));
            }
            Field::Description => {
                columns.insert(
                    col::DESCRIPTION,
                    Value::Text(product.description().map(str::to_string)),
                );
            }
            Field::Category => {
                columns.insert(col::CATEGORY, Value::text(product.category()));
            }
            Field::BasePrice => put_price(&mut columns, product)?,
            Field::Discount => put_discount(&mut columns, product.discount()),
            Field::Status => {
                columns.insert(col::STATUS, Value::text(product.status().as_str()));
            }
            Field::ArchivedAt => {
                columns.insert(col::ARCHIVED_AT, Value::Timestamp(product.archived_at()));
            }
        }
    }
    columns.insert(col::UPDATED_AT, Value::timestamp(product.updated_at()));

    Ok(Some(Mutation::update(
        col::TABLE,
        product.id().as_str(),
        columns,
    )))
}
