use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::FavouriteError;
use super::repo_types::{Favourite, NewFavourite};

/// Body of create and update: `{"favourite": {"user_id": .., "product_id": ..}}`.
#[derive(Debug, Default, Deserialize)]
pub struct FavouriteRequest {
    #[serde(default)]
    pub favourite: FavouriteParams,
}

/// A reference as sent by the client. Form-style clients send ids as
/// strings, so `"5"` reads the same as `5`; anything else that is not
/// blank is kept as `Invalid` and reported during validation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub enum IdField {
    #[default]
    Missing,
    Id(i64),
    Invalid,
}

impl From<Value> for IdField {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => IdField::Missing,
            Value::Number(n) => n.as_i64().map_or(IdField::Invalid, IdField::Id),
            Value::String(s) if s.trim().is_empty() => IdField::Missing,
            Value::String(s) => s.trim().parse::<i64>().map_or(IdField::Invalid, IdField::Id),
            _ => IdField::Invalid,
        }
    }
}

impl IdField {
    pub fn id(self) -> Option<i64> {
        match self {
            IdField::Id(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct FavouriteParams {
    #[serde(default)]
    pub user_id: IdField,
    #[serde(default)]
    pub product_id: IdField,
}

impl FavouriteParams {
    /// Stand-in for a body that could not be read at all.
    pub fn unreadable() -> Self {
        Self {
            user_id: IdField::Invalid,
            product_id: IdField::Invalid,
        }
    }

    /// Both fields are required; referential checks are left to the store.
    pub fn validate(&self) -> Result<NewFavourite, FavouriteError> {
        if let (IdField::Id(user_id), IdField::Id(product_id)) = (self.user_id, self.product_id) {
            return Ok(NewFavourite {
                user_id,
                product_id,
            });
        }

        let problems: Vec<String> = [("user_id", self.user_id), ("product_id", self.product_id)]
            .into_iter()
            .filter_map(|(name, field)| match field {
                IdField::Missing => Some(format!("{name} can't be blank")),
                IdField::Invalid => Some(format!("{name} is invalid")),
                IdField::Id(_) => None,
            })
            .collect();
        Err(FavouriteError::ValidationFailed(problems.join(", ")))
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FavouriteView {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
}

impl From<Favourite> for FavouriteView {
    fn from(f: Favourite) -> Self {
        Self {
            id: f.id,
            user_id: f.user_id,
            product_id: f.product_id,
        }
    }
}
