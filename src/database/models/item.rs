use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid item ID: {0}")]
pub struct InvalidItemId(pub String);

/// Item identifier. Native ObjectId inside the store, 24-char hex string on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(ObjectId);

impl ItemId {
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    pub fn parse(raw: &str) -> Result<Self, InvalidItemId> {
        ObjectId::parse_str(raw)
            .map(Self)
            .map_err(|_| InvalidItemId(raw.to_string()))
    }

    /// The all-zero id is treated as "no id supplied".
    pub fn is_zero(&self) -> bool {
        self.0.bytes() == [0u8; 12]
    }

    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for ItemId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl Serialize for ItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

/// Stored shape of an item in the `items` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub price: i64,
}

/// Item as exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub price: i64,
}

impl From<ItemDocument> for Item {
    fn from(doc: ItemDocument) -> Self {
        Self {
            id: ItemId(doc.id),
            name: doc.name,
            price: doc.price,
        }
    }
}

impl From<&Item> for ItemDocument {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.as_object_id(),
            name: item.name.clone(),
            price: item.price,
        }
    }
}

/// Create payload. `id` is optional; empty, zero or absent means "generate one".
#[derive(Debug, Clone, Deserialize)]
pub struct NewItem {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub price: i64,
}

/// Merge-set update: only the fields present are written.
///
/// Any other key in the request body (including `id`) is ignored, so the set of
/// updatable fields is closed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ItemPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none()
    }

    /// Applies the present fields to a stored document.
    pub fn apply_to(&self, doc: &mut ItemDocument) {
        if let Some(name) = &self.name {
            doc.name = name.clone();
        }
        if let Some(price) = self.price {
            doc.price = price;
        }
    }
}
