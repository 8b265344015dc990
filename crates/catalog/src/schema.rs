//! Table and column names of the persisted schema.

use store::Table;

pub mod products {
    use super::Table;

    pub const TABLE: Table = Table::new("products", PRODUCT_ID);

    pub const PRODUCT_ID: &str = "product_id";
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const CATEGORY: &str = "category";
    pub const BASE_PRICE_NUMERATOR: &str = "base_price_numerator";
    pub const BASE_PRICE_DENOMINATOR: &str = "base_price_denominator";
    pub const DISCOUNT_PERCENT: &str = "discount_percent";
    pub const DISCOUNT_START_DATE: &str = "discount_start_date";
    pub const DISCOUNT_END_DATE: &str = "discount_end_date";
    pub const STATUS: &str = "status";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
    pub const ARCHIVED_AT: &str = "archived_at";
}

pub mod outbox {
    use super::Table;

    pub const TABLE: Table = Table::new("outbox_events", EVENT_ID);

    pub const EVENT_ID: &str = "event_id";
    pub const EVENT_TYPE: &str = "event_type";
    pub const AGGREGATE_ID: &str = "aggregate_id";
    pub const PAYLOAD: &str = "payload";
    pub const STATUS: &str = "status";
    pub const CREATED_AT: &str = "created_at";
    pub const PROCESSED_AT: &str = "processed_at";
}
