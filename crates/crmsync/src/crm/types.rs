//! CRM API data types: raw records, pages and the listing envelope.

use serde::Deserialize;
use serde_json::Value;

use crate::entity::resource_type::ResourceType;

use super::error::{CrmError, Result};

/// Records per listing page requested from the API.
pub const PER_PAGE: u32 = 100;

/// One loosely-typed record exactly as the API returned it.
///
/// Shape varies per resource type and may contain nested sub-objects,
/// embedded arrays and missing or null optional fields. Interpretation is
/// the transformer's job; the fetch path treats this as opaque.
pub type RawRecord = serde_json::Map<String, Value>;

/// One bounded batch of raw records from a listing endpoint.
#[derive(Debug)]
pub struct Page {
    /// Records in API order.
    pub records: Vec<RawRecord>,
    /// The next page to request. `None` is the sole termination signal for
    /// the pagination loop.
    pub next_page: Option<u32>,
}

/// Pagination metadata some listing endpoints include in their envelope.
#[derive(Debug, Default, Deserialize)]
struct ListMeta {
    total_pages: Option<u32>,
}

/// Listing envelope: records nested under the collection key, plus optional
/// pagination metadata.
///
/// ```json
/// { "deals": [ {...}, {...} ], "meta": { "total_pages": 3 } }
/// ```
#[derive(Debug, Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    meta: Option<ListMeta>,
    #[serde(flatten)]
    rest: serde_json::Map<String, Value>,
}

impl Page {
    /// Parse a listing response body into a page.
    ///
    /// The records array must sit under the resource's collection key and
    /// contain only JSON objects; anything else fails closed with a decode
    /// error rather than being silently coerced.
    ///
    /// The next-page indicator is derived from `meta.total_pages` when the
    /// endpoint reports it, otherwise from the full-page heuristic (a page
    /// with fewer than [`PER_PAGE`] records is the last one).
    pub fn from_response(resource: ResourceType, page: u32, body: &[u8]) -> Result<Self> {
        let envelope: ListEnvelope = serde_json::from_slice(body)
            .map_err(|e| CrmError::decode(format!("invalid JSON body: {e}")))?;

        let key = resource.collection();
        let records_value = envelope
            .rest
            .get(key)
            .ok_or_else(|| CrmError::decode(format!("response has no `{key}` array")))?;

        let items = records_value
            .as_array()
            .ok_or_else(|| CrmError::decode(format!("`{key}` is not an array")))?;

        let mut records = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Object(map) => records.push(map.clone()),
                other => {
                    return Err(CrmError::decode(format!(
                        "`{key}` contains a non-object element: {other}"
                    )));
                }
            }
        }

        let total_pages = envelope.meta.and_then(|m| m.total_pages);
        let next_page = match total_pages {
            Some(total) if page < total => Some(page + 1),
            Some(_) => None,
            None if records.len() as u32 == PER_PAGE => Some(page + 1),
            None => None,
        };

        Ok(Self { records, next_page })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: &Value) -> Vec<u8> {
        value.to_string().into_bytes()
    }

    #[test]
    fn parses_records_under_the_collection_key() {
        let payload = json!({
            "deals": [{"id": 1, "name": "Acme renewal"}, {"id": 2}],
            "meta": {"total_pages": 1}
        });
        let page = Page::from_response(ResourceType::Deal, 1, &body(&payload)).unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].get("id"), Some(&json!(1)));
        assert_eq!(page.next_page, None);
    }

    #[test]
    fn meta_total_pages_drives_next_page() {
        let payload = json!({"contacts": [{"id": 1}], "meta": {"total_pages": 3}});
        let page = Page::from_response(ResourceType::Contact, 1, &body(&payload)).unwrap();
        assert_eq!(page.next_page, Some(2));

        let page = Page::from_response(ResourceType::Contact, 3, &body(&payload)).unwrap();
        assert_eq!(page.next_page, None);
    }

    #[test]
    fn full_page_heuristic_when_meta_is_absent() {
        let full: Vec<Value> = (0..PER_PAGE).map(|i| json!({"id": i})).collect();
        let payload = json!({"products": full});
        let page = Page::from_response(ResourceType::Product, 4, &body(&payload)).unwrap();
        assert_eq!(page.next_page, Some(5));

        let payload = json!({"products": [{"id": 1}]});
        let page = Page::from_response(ResourceType::Product, 4, &body(&payload)).unwrap();
        assert_eq!(page.next_page, None);
    }

    #[test]
    fn missing_envelope_key_fails_closed() {
        let payload = json!({"unexpected": []});
        let err = Page::from_response(ResourceType::Deal, 1, &body(&payload)).unwrap_err();
        assert!(matches!(err, CrmError::Decode { .. }));
        assert!(err.to_string().contains("deals"));
    }

    #[test]
    fn non_object_record_fails_closed() {
        let payload = json!({"deals": [42]});
        let err = Page::from_response(ResourceType::Deal, 1, &body(&payload)).unwrap_err();
        assert!(matches!(err, CrmError::Decode { .. }));
    }

    #[test]
    fn invalid_json_fails_closed() {
        let err = Page::from_response(ResourceType::Deal, 1, b"not json").unwrap_err();
        assert!(matches!(err, CrmError::Decode { .. }));
    }

    #[test]
    fn empty_page_without_meta_terminates() {
        let payload = json!({"sales_activities": []});
        let page = Page::from_response(ResourceType::SalesActivity, 1, &body(&payload)).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.next_page, None);
    }
}
