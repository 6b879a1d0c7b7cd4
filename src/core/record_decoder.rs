#[cfg(feature = "lambda")]
use crate::domain::model::{UserId, UserRecord};
#[cfg(feature = "lambda")]
use crate::utils::error::{Result, StatsError};
#[cfg(feature = "lambda")]
use aws_sdk_dynamodb::types::AttributeValue;
#[cfg(feature = "lambda")]
use std::collections::HashMap;

#[cfg(feature = "lambda")]
pub type Item = HashMap<String, AttributeValue>;

/// 將 DynamoDB 項目轉為 `UserRecord`。任何欄位缺少或型別不符都會失敗
#[cfg(feature = "lambda")]
pub fn decode_user(item: &Item) -> Result<UserRecord> {
    Ok(UserRecord {
        id: decode_id(item)?,
        name: string_field(item, "name")?,
        surname: string_field(item, "surname")?,
        position: string_field(item, "position")?,
        salary: number_field(item, "salary")?,
    })
}

#[cfg(feature = "lambda")]
pub fn decode_users(items: &[Item]) -> Result<Vec<UserRecord>> {
    items.iter().map(decode_user).collect()
}

#[cfg(feature = "lambda")]
fn field<'a>(item: &'a Item, name: &str) -> Result<&'a AttributeValue> {
    item.get(name).ok_or_else(|| StatsError::DecodeError {
        field: name.to_string(),
        reason: "attribute is missing".to_string(),
    })
}

#[cfg(feature = "lambda")]
fn decode_id(item: &Item) -> Result<UserId> {
    match field(item, "id")? {
        AttributeValue::N(raw) => raw
            .parse::<i64>()
            .map(UserId::Number)
            .map_err(|e| StatsError::DecodeError {
                field: "id".to_string(),
                reason: format!("{:?} is not an integer: {}", raw, e),
            }),
        AttributeValue::S(raw) => Ok(UserId::Text(raw.clone())),
        other => Err(type_mismatch("id", "N or S", other)),
    }
}

#[cfg(feature = "lambda")]
fn string_field(item: &Item, name: &str) -> Result<String> {
    match field(item, name)? {
        AttributeValue::S(value) => Ok(value.clone()),
        other => Err(type_mismatch(name, "S", other)),
    }
}

#[cfg(feature = "lambda")]
fn number_field(item: &Item, name: &str) -> Result<f64> {
    match field(item, name)? {
        AttributeValue::N(raw) => raw.parse::<f64>().map_err(|e| StatsError::DecodeError {
            field: name.to_string(),
            reason: format!("{:?} is not a number: {}", raw, e),
        }),
        other => Err(type_mismatch(name, "N", other)),
    }
}

#[cfg(feature = "lambda")]
fn type_mismatch(name: &str, expected: &str, found: &AttributeValue) -> StatsError {
    StatsError::DecodeError {
        field: name.to_string(),
        reason: format!("expected {} attribute, found {:?}", expected, found),
    }
}

#[cfg(all(test, feature = "lambda"))]
mod tests {
    use super::*;

    fn item(pairs: &[(&str, AttributeValue)]) -> Item {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn full_user() -> Item {
        item(&[
            ("id", AttributeValue::N("7".to_string())),
            ("name", AttributeValue::S("Grace".to_string())),
            ("surname", AttributeValue::S("Hopper".to_string())),
            ("position", AttributeValue::S("Admiral".to_string())),
            ("salary", AttributeValue::N("65000.50".to_string())),
        ])
    }

    #[test]
    fn test_decode_user() {
        let user = decode_user(&full_user()).unwrap();

        assert_eq!(user.id, UserId::Number(7));
        assert_eq!(user.name, "Grace");
        assert_eq!(user.surname, "Hopper");
        assert_eq!(user.position, "Admiral");
        assert_eq!(user.salary, 65000.5);
    }

    #[test]
    fn test_string_id_is_accepted() {
        let mut user = full_user();
        user.insert("id".to_string(), AttributeValue::S("u-7".to_string()));
        assert_eq!(decode_user(&user).unwrap().id, UserId::Text("u-7".to_string()));
    }

    #[test]
    fn test_missing_salary_is_decode_error() {
        let mut user = full_user();
        user.remove("salary");
        match decode_user(&user) {
            Err(StatsError::DecodeError { field, .. }) => assert_eq!(field, "salary"),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_mistyped_salary_is_decode_error() {
        let mut user = full_user();
        user.insert("salary".to_string(), AttributeValue::S("a lot".to_string()));
        assert!(matches!(
            decode_user(&user),
            Err(StatsError::DecodeError { .. })
        ));
    }

    #[test]
    fn test_one_bad_item_fails_the_batch() {
        let mut bad = full_user();
        bad.remove("position");
        let result = decode_users(&[full_user(), bad]);
        assert!(matches!(result, Err(StatsError::DecodeError { field, .. }) if field == "position"));
    }
}
