//! Database-agnostic type mappings.
//!
//! Rows come back from the driver untouched; this module only turns each
//! column into a JSON value so every backend prints the same way.
//!
//! # Architecture
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies column types into logical categories
//! 2. Database-specific decoders handle the actual value extraction

use crate::models::{ColumnMetadata, DatabaseType};
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Decode, Row, Type, TypeInfo};

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Temporal,
    Binary,
    Json,
    Unknown,
}

/// Classify a database type name into a logical category.
pub fn categorize_type(type_name: &str, db: DatabaseType) -> TypeCategory {
    let lower = type_name.to_lowercase();

    // Decimal/Numeric - check first as it overlaps with "numeric" in float checks
    if lower.contains("decimal") || lower.contains("numeric") {
        // SQLite's NUMERIC is actually a float
        if db == DatabaseType::SQLite && lower == "numeric" {
            return TypeCategory::Float;
        }
        return TypeCategory::Decimal;
    }

    // TINYTEXT, MEDIUMTEXT, CHAR... would otherwise match the integer checks
    if lower.contains("text") || lower.contains("char") {
        return TypeCategory::Unknown;
    }

    if lower.contains("blob") || lower.contains("binary") {
        return TypeCategory::Binary;
    }

    // "BIGINT UNSIGNED", "INT(11)": only the leading word names the type
    let base = lower
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default();
    if matches!(
        base,
        "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint"
    ) {
        return TypeCategory::Integer;
    }

    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    if lower.contains("float") || lower.contains("double") || lower == "real" {
        return TypeCategory::Float;
    }

    if lower == "json" {
        return TypeCategory::Json;
    }

    if lower.contains("date") || lower.contains("time") || lower == "year" {
        return TypeCategory::Temporal;
    }

    // varchar, text, char, enum, set and anything else decode as text
    TypeCategory::Unknown
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// Raw DECIMAL value as the server formatted it.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

// =============================================================================
// Binary Encoding
// =============================================================================

/// Binary columns print as UTF-8 text when valid, base64 otherwise.
pub fn decode_binary_value(bytes: &[u8]) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    match std::str::from_utf8(bytes) {
        Ok(s) => JsonValue::String(s.to_string()),
        Err(_) => JsonValue::String(STANDARD.encode(bytes)),
    }
}

fn float_value(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(v.to_string()))
}

// =============================================================================
// Row to JSON Trait
// =============================================================================

/// Trait for converting database rows to JSON maps.
pub trait RowToJson {
    fn to_json_map(&self) -> serde_json::Map<String, JsonValue>;
    fn get_column_metadata(&self) -> Vec<ColumnMetadata>;
}

impl RowToJson for MySqlRow {
    fn to_json_map(&self) -> serde_json::Map<String, JsonValue> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let type_name = col.type_info().name();
                let category = categorize_type(type_name, DatabaseType::MySQL);
                let value = mysql::decode_column(self, idx, type_name, category);
                (col.name().to_string(), value)
            })
            .collect()
    }

    fn get_column_metadata(&self) -> Vec<ColumnMetadata> {
        self.columns()
            .iter()
            .map(|col| ColumnMetadata::new(col.name(), col.type_info().name()))
            .collect()
    }
}

impl RowToJson for SqliteRow {
    fn to_json_map(&self) -> serde_json::Map<String, JsonValue> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let type_name = col.type_info().name();
                let category = categorize_type(type_name, DatabaseType::SQLite);
                let value = sqlite::decode_column(self, idx, category);
                (col.name().to_string(), value)
            })
            .collect()
    }

    fn get_column_metadata(&self) -> Vec<ColumnMetadata> {
        self.columns()
            .iter()
            .map(|col| ColumnMetadata::new(col.name(), col.type_info().name()))
            .collect()
    }
}

// =============================================================================
// Database-Specific Decoders
// =============================================================================

mod mysql {
    use super::*;
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

    pub fn decode_column(
        row: &MySqlRow,
        idx: usize,
        type_name: &str,
        category: TypeCategory,
    ) -> JsonValue {
        match category {
            TypeCategory::Decimal => decode_decimal(row, idx),
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Boolean => decode_boolean(row, idx),
            TypeCategory::Float => decode_float(row, idx),
            TypeCategory::Temporal => decode_temporal(row, idx, type_name),
            TypeCategory::Binary => decode_binary_col(row, idx),
            TypeCategory::Json => decode_json(row, idx),
            TypeCategory::Unknown => decode_text(row, idx),
        }
    }

    fn decode_decimal(row: &MySqlRow, idx: usize) -> JsonValue {
        match row.try_get::<Option<RawDecimal>, _>(idx) {
            Ok(Some(v)) => JsonValue::String(v.0),
            Ok(None) => JsonValue::Null,
            Err(e) => {
                tracing::error!("Failed to decode DECIMAL: {:?}", e);
                JsonValue::Null
            }
        }
    }

    fn decode_integer(row: &MySqlRow, idx: usize) -> JsonValue {
        if let Ok(None) = row.try_get::<Option<i64>, _>(idx) {
            return JsonValue::Null;
        }
        if let Ok(Some(v)) = row.try_get::<Option<i8>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i16>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i32>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        // UNSIGNED columns
        if let Ok(Some(v)) = row.try_get::<Option<u8>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<u16>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<u32>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<u64>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        JsonValue::Null
    }

    fn decode_boolean(row: &MySqlRow, idx: usize) -> JsonValue {
        row.try_get::<Option<bool>, _>(idx)
            .ok()
            .flatten()
            .map(JsonValue::Bool)
            .unwrap_or(JsonValue::Null)
    }

    fn decode_float(row: &MySqlRow, idx: usize) -> JsonValue {
        if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
            return float_value(v);
        }
        if let Ok(Some(v)) = row.try_get::<Option<f32>, _>(idx) {
            return float_value(v as f64);
        }
        JsonValue::Null
    }

    fn decode_temporal(row: &MySqlRow, idx: usize, type_name: &str) -> JsonValue {
        let text = match type_name.to_lowercase().as_str() {
            "datetime" => row
                .try_get::<Option<NaiveDateTime>, _>(idx)
                .ok()
                .flatten()
                .map(|v| v.to_string()),
            "timestamp" => row
                .try_get::<Option<DateTime<Utc>>, _>(idx)
                .ok()
                .flatten()
                .map(|v| v.naive_utc().to_string()),
            "date" => row
                .try_get::<Option<NaiveDate>, _>(idx)
                .ok()
                .flatten()
                .map(|v| v.to_string()),
            "time" => row
                .try_get::<Option<NaiveTime>, _>(idx)
                .ok()
                .flatten()
                .map(|v| v.to_string()),
            _ => None,
        };
        match text {
            Some(s) => JsonValue::String(s),
            None => decode_text(row, idx),
        }
    }

    fn decode_binary_col(row: &MySqlRow, idx: usize) -> JsonValue {
        row.try_get::<Option<Vec<u8>>, _>(idx)
            .ok()
            .flatten()
            .map(|v| decode_binary_value(&v))
            .unwrap_or(JsonValue::Null)
    }

    fn decode_json(row: &MySqlRow, idx: usize) -> JsonValue {
        row.try_get::<Option<serde_json::Value>, _>(idx)
            .ok()
            .flatten()
            .unwrap_or(JsonValue::Null)
    }

    fn decode_text(row: &MySqlRow, idx: usize) -> JsonValue {
        if let Ok(Some(v)) = row.try_get::<Option<String>, _>(idx) {
            return JsonValue::String(v);
        }
        // ENUM/SET and other types sqlx will not hand out as String
        row.try_get_unchecked::<Option<Vec<u8>>, _>(idx)
            .ok()
            .flatten()
            .map(|v| decode_binary_value(&v))
            .unwrap_or(JsonValue::Null)
    }
}

mod sqlite {
    use super::*;

    pub fn decode_column(row: &SqliteRow, idx: usize, category: TypeCategory) -> JsonValue {
        match category {
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Boolean => decode_boolean(row, idx),
            TypeCategory::Float | TypeCategory::Decimal => decode_float(row, idx),
            TypeCategory::Binary => decode_binary_col(row, idx),
            TypeCategory::Json => decode_json_text(row, idx),
            TypeCategory::Temporal | TypeCategory::Unknown => decode_text(row, idx),
        }
    }

    // Declared types are only affinities: an INTEGER column may still hold
    // text, so a value the typed decode rejects goes through decode_text.

    fn decode_integer(row: &SqliteRow, idx: usize) -> JsonValue {
        match row.try_get::<Option<i64>, _>(idx) {
            Ok(Some(v)) => JsonValue::Number(v.into()),
            Ok(None) => JsonValue::Null,
            Err(_) => decode_text(row, idx),
        }
    }

    fn decode_boolean(row: &SqliteRow, idx: usize) -> JsonValue {
        match row.try_get::<Option<bool>, _>(idx) {
            Ok(Some(v)) => JsonValue::Bool(v),
            Ok(None) => JsonValue::Null,
            Err(_) => decode_text(row, idx),
        }
    }

    fn decode_float(row: &SqliteRow, idx: usize) -> JsonValue {
        match row.try_get::<Option<f64>, _>(idx) {
            Ok(Some(v)) => float_value(v),
            Ok(None) => JsonValue::Null,
            Err(_) => decode_text(row, idx),
        }
    }

    fn decode_binary_col(row: &SqliteRow, idx: usize) -> JsonValue {
        row.try_get::<Option<Vec<u8>>, _>(idx)
            .ok()
            .flatten()
            .map(|v| decode_binary_value(&v))
            .unwrap_or(JsonValue::Null)
    }

    fn decode_json_text(row: &SqliteRow, idx: usize) -> JsonValue {
        match decode_text(row, idx) {
            JsonValue::String(s) => serde_json::from_str(&s).unwrap_or(JsonValue::String(s)),
            other => other,
        }
    }

    /// Expression columns (e.g. `SELECT 1 + 1`) report "NULL" as their type,
    /// so fall back across the storage classes.
    fn decode_text(row: &SqliteRow, idx: usize) -> JsonValue {
        if let Ok(Some(v)) = row.try_get::<Option<String>, _>(idx) {
            return JsonValue::String(v);
        }
        if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
            return float_value(v);
        }
        decode_binary_col(row, idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_type_integer() {
        assert_eq!(
            categorize_type("INT", DatabaseType::MySQL),
            TypeCategory::Integer
        );
        assert_eq!(
            categorize_type("BIGINT UNSIGNED", DatabaseType::MySQL),
            TypeCategory::Integer
        );
        assert_eq!(
            categorize_type("INTEGER", DatabaseType::SQLite),
            TypeCategory::Integer
        );
    }

    #[test]
    fn test_categorize_type_decimal() {
        assert_eq!(
            categorize_type("DECIMAL", DatabaseType::MySQL),
            TypeCategory::Decimal
        );
        // SQLite NUMERIC is a float
        assert_eq!(
            categorize_type("numeric", DatabaseType::SQLite),
            TypeCategory::Float
        );
    }

    #[test]
    fn test_categorize_type_temporal() {
        for name in ["DATETIME", "TIMESTAMP", "DATE", "TIME", "YEAR"] {
            assert_eq!(
                categorize_type(name, DatabaseType::MySQL),
                TypeCategory::Temporal,
                "{name}"
            );
        }
    }

    #[test]
    fn test_categorize_type_fallbacks() {
        assert_eq!(
            categorize_type("BOOLEAN", DatabaseType::MySQL),
            TypeCategory::Boolean
        );
        assert_eq!(
            categorize_type("VARBINARY", DatabaseType::MySQL),
            TypeCategory::Binary
        );
        assert_eq!(
            categorize_type("JSON", DatabaseType::MySQL),
            TypeCategory::Json
        );
        assert_eq!(
            categorize_type("VARCHAR", DatabaseType::MySQL),
            TypeCategory::Unknown
        );
        assert_eq!(
            categorize_type("ENUM", DatabaseType::MySQL),
            TypeCategory::Unknown
        );
        assert_eq!(
            categorize_type("TINYTEXT", DatabaseType::MySQL),
            TypeCategory::Unknown
        );
        assert_eq!(
            categorize_type("TINYBLOB", DatabaseType::MySQL),
            TypeCategory::Binary
        );
        assert_eq!(
            categorize_type("POINT", DatabaseType::MySQL),
            TypeCategory::Unknown
        );
    }

    #[test]
    fn test_categorize_type_integer_widths() {
        for name in [
            "TINYINT",
            "TINYINT UNSIGNED",
            "SMALLINT",
            "MEDIUMINT",
            "INT(11)",
        ] {
            assert_eq!(
                categorize_type(name, DatabaseType::MySQL),
                TypeCategory::Integer,
                "{name}"
            );
        }
    }

    #[test]
    fn test_decode_binary_value() {
        assert_eq!(
            decode_binary_value(b"hello world"),
            JsonValue::String("hello world".to_string())
        );
        let bytes: &[u8] = &[0xFF, 0xFE, 0x00, 0x01];
        assert_eq!(
            decode_binary_value(bytes),
            JsonValue::String("//4AAQ==".to_string())
        );
    }

    #[test]
    fn test_float_value_non_finite() {
        assert_eq!(float_value(1.5), serde_json::json!(1.5));
        assert_eq!(float_value(f64::NAN), JsonValue::String("NaN".to_string()));
    }
}
