use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};

use crate::auth::Identity;
use crate::database::models::{Item, ItemId, ItemPatch, NewItem};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, MessageResponse};
use crate::services::{ItemError, PaginatedItems};
use crate::state::AppState;

/// Raw query values; validation belongs to the pagination engine so that an
/// empty `page=` is rejected rather than defaulted. A repeated key keeps its
/// first value.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "page" if query.page.is_none() => query.page = Some(value),
                "limit" if query.limit.is_none() => query.limit = Some(value),
                _ => {}
            }
        }
        query
    }
}

/// GET /items?page&limit - one page of items with live totals
pub async fn list(
    State(state): State<AppState>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<PaginatedItems> {
    let Query(pairs) = pairs?;
    let query = ListQuery::from_pairs(pairs);
    let page = state
        .items
        .list(query.page.as_deref(), query.limit.as_deref())
        .await?;
    Ok(ApiResponse::success(page))
}

/// POST /items - create an item, generating its id when absent
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<NewItem>, JsonRejection>,
) -> ApiResult<Item> {
    let Json(new_item) = payload?;
    tracing::debug!(subject = %identity.subject, "create item");

    let item = state.items.create(new_item).await?;
    Ok(ApiResponse::created(item))
}

/// PUT /items/:id - merge the supplied fields into an existing item
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ItemPatch>, JsonRejection>,
) -> ApiResult<MessageResponse> {
    // A malformed id wins over a malformed body.
    let id = parse_id(&id)?;
    let Json(patch) = payload?;

    let id = state.items.update(id, &patch).await?;
    Ok(ApiResponse::success(MessageResponse::new("Item updated", id)))
}

/// DELETE /items/:id - permanently remove an item
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    let id = state.items.delete(parse_id(&id)?).await?;
    Ok(ApiResponse::success(MessageResponse::new("Item deleted", id)))
}

fn parse_id(raw: &str) -> Result<ItemId, ApiError> {
    ItemId::parse(raw).map_err(|e| ApiError::from(ItemError::from(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn first_value_of_a_repeated_key_wins() {
        let query = ListQuery::from_pairs(pairs(&[
            ("page", "2"),
            ("limit", "5"),
            ("page", "9"),
            ("limit", "6"),
        ]));
        assert_eq!(query.page.as_deref(), Some("2"));
        assert_eq!(query.limit.as_deref(), Some("5"));
    }

    #[test]
    fn unrelated_keys_are_ignored() {
        let query = ListQuery::from_pairs(pairs(&[("sort", "name"), ("page", "")]));
        assert_eq!(
            query,
            ListQuery {
                page: Some(String::new()),
                limit: None,
            }
        );
    }
}
