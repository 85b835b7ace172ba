//! Order input and display projection.

use chrono::{DateTime, Utc};
use common::Money;
use order_store::OrderRecord;
use serde::Serialize;

use crate::error::OrderError;

/// Display format for order dates, e.g. `01-05-2024`.
const DISPLAY_DATE_FORMAT: &str = "%d-%m-%Y";

/// A submitted order, prior to validation.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub email: String,
    pub name: String,
    pub surname: String,
    pub address: String,
    pub tel_number: String,
    /// Order lines, serialized as text by the client.
    pub order_list: String,
    pub total_price: Money,
}

impl NewOrder {
    /// Checks that every required field is present.
    ///
    /// Absence of any field is a client error; it never reaches the
    /// resilience pipeline.
    pub fn validate(&self) -> Result<(), OrderError> {
        let required = [
            ("email", &self.email),
            ("name", &self.name),
            ("surname", &self.surname),
            ("address", &self.address),
            ("tel_number", &self.tel_number),
            ("order_list", &self.order_list),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(OrderError::missing_field(field));
            }
        }
        Ok(())
    }
}

/// A stored order projected for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderView {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub address: String,
    pub tel_number: String,
    pub order_list: String,
    /// Total price rendered as a decimal string, e.g. `"299.99"`.
    pub total_price: String,
    pub status: String,
    /// Stored ISO timestamp rendered as a display date.
    pub date: String,
}

impl OrderView {
    /// Projects a persisted record into its display form.
    pub fn from_record(record: &OrderRecord) -> Self {
        Self {
            name: record.name.clone(),
            surname: record.surname.clone(),
            email: record.email.clone(),
            address: record.address.clone(),
            tel_number: record.tel_number.clone(),
            order_list: record.order_list.clone(),
            total_price: record.total_price.to_string(),
            status: record.status.to_string(),
            date: format_display_date(record.created_at),
        }
    }
}

fn format_display_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format(DISPLAY_DATE_FORMAT).to_string()
}
