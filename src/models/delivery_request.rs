use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::utils::time::{TimestampError, parse_utc_timestamp};

pub const FIELD_CART_VALUE: &str = "cart_value";
pub const FIELD_DELIVERY_DISTANCE: &str = "delivery_distance";
pub const FIELD_NUMBER_OF_ITEMS: &str = "number_of_items";
pub const FIELD_TIME: &str = "time";
pub const FIELD_SCHEMA: &str = "_schema";

const FIELDS: [&str; 4] = [
    FIELD_CART_VALUE,
    FIELD_DELIVERY_DISTANCE,
    FIELD_NUMBER_OF_ITEMS,
    FIELD_TIME,
];

pub const MSG_MISSING: &str = "Missing data for required field.";
pub const MSG_NULL: &str = "Field may not be null.";
pub const MSG_NOT_INTEGER: &str = "Not a valid integer.";
pub const MSG_NOT_POSITIVE: &str = "Value must be greater than 0.";
pub const MSG_NOT_DATETIME: &str = "Not a valid datetime.";
pub const MSG_NOT_AWARE: &str = "Not a valid aware datetime.";
pub const MSG_UNKNOWN_FIELD: &str = "Unknown field.";
pub const MSG_INVALID_INPUT: &str = "Invalid input type.";

/// Field-level validation failures, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Error)]
#[error("Validation errors")]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn schema() -> Self {
        let mut errors = Self::default();
        errors.add(FIELD_SCHEMA, MSG_INVALID_INPUT);
        errors
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn messages(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }
}

/// A delivery request that passed validation. Every field is present and in range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryRequest {
    pub cart_value: u64,
    pub delivery_distance: u64,
    pub number_of_items: u64,
    pub time: DateTime<Utc>,
}

impl DeliveryRequest {
    pub fn from_slice(body: &[u8]) -> Result<Self, ValidationErrors> {
        let value: Value =
            serde_json::from_slice(body).map_err(|_| ValidationErrors::schema())?;
        Self::from_json(&value)
    }

    /// Validates a raw JSON body, collecting every failing field instead of
    /// stopping at the first.
    pub fn from_json(value: &Value) -> Result<Self, ValidationErrors> {
        let object = value.as_object().ok_or_else(ValidationErrors::schema)?;
        let mut errors = ValidationErrors::default();

        for key in object.keys() {
            if !FIELDS.contains(&key.as_str()) {
                errors.add(key, MSG_UNKNOWN_FIELD);
            }
        }

        let cart_value = positive_integer(object, FIELD_CART_VALUE, &mut errors);
        let delivery_distance = positive_integer(object, FIELD_DELIVERY_DISTANCE, &mut errors);
        let number_of_items = positive_integer(object, FIELD_NUMBER_OF_ITEMS, &mut errors);
        let time = utc_timestamp(object, FIELD_TIME, &mut errors);

        match (cart_value, delivery_distance, number_of_items, time) {
            (Some(cart_value), Some(delivery_distance), Some(number_of_items), Some(time))
                if errors.is_empty() =>
            {
                Ok(Self {
                    cart_value,
                    delivery_distance,
                    number_of_items,
                    time,
                })
            }
            _ => Err(errors),
        }
    }
}

fn required<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<&'a Value> {
    match object.get(field) {
        None => {
            errors.add(field, MSG_MISSING);
            None
        }
        Some(Value::Null) => {
            errors.add(field, MSG_NULL);
            None
        }
        Some(value) => Some(value),
    }
}

// Integer strings are coerced, fractional numbers and booleans are not.
fn positive_integer(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<u64> {
    let value = required(object, field, errors)?;

    let integer = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.parse::<i64>().ok(),
        _ => None,
    };

    match integer {
        None => {
            errors.add(field, MSG_NOT_INTEGER);
            None
        }
        Some(n) if n < 1 => {
            errors.add(field, MSG_NOT_POSITIVE);
            None
        }
        Some(n) => u64::try_from(n).ok(),
    }
}

fn utc_timestamp(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<DateTime<Utc>> {
    let value = required(object, field, errors)?;

    let Value::String(text) = value else {
        errors.add(field, MSG_NOT_DATETIME);
        return None;
    };

    match parse_utc_timestamp(text) {
        Ok(time) => Some(time),
        Err(TimestampError::Naive(_)) => {
            errors.add(field, MSG_NOT_AWARE);
            None
        }
        Err(TimestampError::Invalid(_) | TimestampError::NotUtc(_)) => {
            errors.add(field, MSG_NOT_DATETIME);
            None
        }
    }
}
