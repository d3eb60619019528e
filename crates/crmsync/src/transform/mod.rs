//! Raw-record normalization, one mapping rule per resource type.
//!
//! `transform` is a pure function from a loose API record to its typed
//! counterpart. The rules fail closed: a field that is present but cannot be
//! coerced to its target type is a [`TransformError`], never a silent
//! default. A missing amount stays unset; it must not become `0` and pollute
//! downstream aggregates.

pub mod records;

pub use records::{
    AccountRecord, ContactRecord, DealRecord, NormalizedRecord, ProductRecord,
    SalesActivityRecord,
};

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::Value;
use thiserror::Error;

use crate::crm::types::RawRecord;
use crate::entity::resource_type::ResourceType;

/// A single record failed to normalize.
///
/// `record_id` is 0 when the record's own identifier was missing or
/// unusable. Transform errors are per-record: the caller skips the record
/// and keeps going.
#[derive(Debug, Clone, Error)]
#[error("cannot normalize {resource_type} record {record_id}: field `{field}` {message}")]
pub struct TransformError {
    pub resource_type: ResourceType,
    pub record_id: i64,
    pub field: &'static str,
    pub message: String,
}

impl TransformError {
    fn new(
        resource_type: ResourceType,
        record_id: i64,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            resource_type,
            record_id,
            field,
            message: message.into(),
        }
    }
}

/// Normalize one raw record according to its resource type's rule.
pub fn transform(
    resource: ResourceType,
    raw: &RawRecord,
) -> Result<NormalizedRecord, TransformError> {
    let cx = FieldContext::new(resource, raw)?;

    match resource {
        ResourceType::Deal => Ok(NormalizedRecord::Deal(DealRecord {
            id: cx.id,
            name: cx.opt_string("name")?,
            amount: cx.opt_amount("amount")?,
            close_date: match cx.opt_date("expected_close_date")? {
                Some(date) => Some(date),
                None => cx.opt_date("closed_date")?,
            },
            product_id: cx.first_embedded_id("products")?,
            account_id: cx.nested_id("sales_account")?,
            contact_id: cx.first_embedded_id("contacts")?,
        })),
        ResourceType::Contact => Ok(NormalizedRecord::Contact(ContactRecord {
            id: cx.id,
            first_name: cx.opt_string("first_name")?,
            last_name: cx.opt_string("last_name")?,
            email: cx.opt_string("email")?,
        })),
        ResourceType::Account => Ok(NormalizedRecord::Account(AccountRecord {
            id: cx.id,
            name: cx.opt_string("name")?,
            industry: cx.nested_name("industry_type")?,
        })),
        ResourceType::Product => Ok(NormalizedRecord::Product(ProductRecord {
            id: cx.id,
            name: cx.opt_string("name")?,
            price: match cx.opt_amount("unit_price")? {
                Some(price) => Some(price),
                None => cx.opt_amount("price")?,
            },
        })),
        ResourceType::SalesActivity => Ok(NormalizedRecord::SalesActivity(SalesActivityRecord {
            id: cx.id,
            title: cx.opt_string("title")?,
            activity_type: cx.opt_string("type")?,
            targetable_type: cx.opt_string("targetable_type")?,
            targetable_id: cx.opt_i64("targetable_id")?,
            start_date: cx.opt_datetime("start_date")?,
            end_date: cx.opt_datetime("end_date")?,
            outcome: cx.nested_name("outcome")?,
        })),
    }
}

/// Extraction context: the raw record plus everything needed to build
/// precise per-field errors.
struct FieldContext<'a> {
    resource: ResourceType,
    id: i64,
    raw: &'a RawRecord,
}

impl<'a> FieldContext<'a> {
    /// Extract the mandatory identifier up front. Everything else hangs off
    /// a known record id.
    fn new(resource: ResourceType, raw: &'a RawRecord) -> Result<Self, TransformError> {
        let id = match raw.get("id") {
            None | Some(Value::Null) => {
                return Err(TransformError::new(resource, 0, "id", "is missing"));
            }
            Some(value) => value.as_i64().filter(|id| *id > 0).ok_or_else(|| {
                TransformError::new(
                    resource,
                    0,
                    "id",
                    format!("is not a positive integer: {value}"),
                )
            })?,
        };
        Ok(Self { resource, id, raw })
    }

    fn err(&self, field: &'static str, message: impl Into<String>) -> TransformError {
        TransformError::new(self.resource, self.id, field, message)
    }

    /// A field that is absent or null maps to `None`.
    fn get(&self, field: &str) -> Option<&Value> {
        self.raw.get(field).filter(|v| !v.is_null())
    }

    fn opt_string(&self, field: &'static str) -> Result<Option<String>, TransformError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.err(field, format!("is not a string: {other}"))),
        }
    }

    fn opt_i64(&self, field: &'static str) -> Result<Option<i64>, TransformError> {
        match self.get(field) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.err(field, format!("is not an integer: {value}"))),
        }
    }

    /// Currency amount: a JSON number, or a numeric string possibly using
    /// thousands separators ("12,500.75").
    fn opt_amount(&self, field: &'static str) -> Result<Option<f64>, TransformError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.err(field, format!("is not a finite number: {n}"))),
            Some(Value::String(s)) => {
                let cleaned = s.trim().replace(',', "");
                if cleaned.is_empty() {
                    return Ok(None);
                }
                cleaned
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| self.err(field, format!("is not a numeric amount: {s:?}")))
            }
            Some(other) => Err(self.err(field, format!("is not an amount: {other}"))),
        }
    }

    /// Calendar date: `YYYY-MM-DD`, or an RFC 3339 timestamp whose date part
    /// is taken.
    fn opt_date(&self, field: &'static str) -> Result<Option<NaiveDate>, TransformError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => {
                if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    return Ok(Some(date));
                }
                DateTime::parse_from_rfc3339(s)
                    .map(|dt| Some(dt.date_naive()))
                    .map_err(|_| self.err(field, format!("is not a date: {s:?}")))
            }
            Some(other) => Err(self.err(field, format!("is not a date: {other}"))),
        }
    }

    /// RFC 3339 timestamp.
    fn opt_datetime(
        &self,
        field: &'static str,
    ) -> Result<Option<DateTime<FixedOffset>>, TransformError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
                .map(Some)
                .map_err(|_| self.err(field, format!("is not a timestamp: {s:?}"))),
            Some(other) => Err(self.err(field, format!("is not a timestamp: {other}"))),
        }
    }

    /// Identifier of a related record embedded as a nested sub-object:
    /// `{"sales_account": {"id": 5, ...}}`.
    fn nested_id(&self, field: &'static str) -> Result<Option<i64>, TransformError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Object(map)) => match map.get("id").filter(|v| !v.is_null()) {
                None => Ok(None),
                Some(value) => value
                    .as_i64()
                    .map(Some)
                    .ok_or_else(|| self.err(field, format!("has a non-integer id: {value}"))),
            },
            Some(other) => Err(self.err(field, format!("is not an object: {other}"))),
        }
    }

    /// Identifier of the first related record in an embedded array:
    /// `{"products": [{"id": 3}, {"id": 9}]}` yields 3.
    ///
    /// When the array holds several related records the first element by
    /// array order wins; this is a deterministic tie-break, not a ranking.
    fn first_embedded_id(&self, field: &'static str) -> Result<Option<i64>, TransformError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Array(items)) => match items.first() {
                None => Ok(None),
                Some(Value::Object(map)) => match map.get("id").filter(|v| !v.is_null()) {
                    None => Ok(None),
                    Some(value) => value.as_i64().map(Some).ok_or_else(|| {
                        self.err(field, format!("first element has a non-integer id: {value}"))
                    }),
                },
                Some(other) => {
                    Err(self.err(field, format!("first element is not an object: {other}")))
                }
            },
            Some(other) => Err(self.err(field, format!("is not an array: {other}"))),
        }
    }

    /// `name` of a nested sub-object: `{"industry_type": {"name": "SaaS"}}`.
    fn nested_name(&self, field: &'static str) -> Result<Option<String>, TransformError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Object(map)) => match map.get("name").filter(|v| !v.is_null()) {
                None => Ok(None),
                Some(Value::String(s)) => Ok(Some(s.clone())),
                Some(other) => {
                    Err(self.err(field, format!("has a non-string name: {other}")))
                }
            },
            Some(other) => Err(self.err(field, format!("is not an object: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("test fixture must be an object, got {other}"),
        }
    }

    // ─── Identifier handling ───────────────────────────────────────────────

    #[test]
    fn identifier_is_preserved_verbatim() {
        let record = transform(ResourceType::Contact, &raw(json!({"id": 901}))).unwrap();
        assert_eq!(record.id(), 901);
        assert_eq!(record.resource_type(), ResourceType::Contact);
    }

    #[test]
    fn missing_identifier_is_an_error() {
        let err = transform(ResourceType::Deal, &raw(json!({"name": "x"}))).unwrap_err();
        assert_eq!(err.field, "id");
        assert_eq!(err.record_id, 0);
    }

    #[test]
    fn null_or_non_integer_identifier_is_an_error() {
        let err = transform(ResourceType::Deal, &raw(json!({"id": null}))).unwrap_err();
        assert_eq!(err.field, "id");

        let err = transform(ResourceType::Deal, &raw(json!({"id": "abc"}))).unwrap_err();
        assert_eq!(err.field, "id");

        let err = transform(ResourceType::Deal, &raw(json!({"id": 0}))).unwrap_err();
        assert_eq!(err.field, "id");
    }

    // ─── Deals ─────────────────────────────────────────────────────────────

    #[test]
    fn deal_full_record() {
        let input = raw(json!({
            "id": 1,
            "name": "Acme renewal",
            "amount": "12,500.75",
            "expected_close_date": "2025-09-30",
            "products": [{"id": 3, "name": "Widget"}, {"id": 9}],
            "sales_account": {"id": 5, "name": "Acme"},
            "contacts": [{"id": 7}]
        }));

        match transform(ResourceType::Deal, &input).unwrap() {
            NormalizedRecord::Deal(deal) => {
                assert_eq!(deal.id, 1);
                assert_eq!(deal.name.as_deref(), Some("Acme renewal"));
                assert_eq!(deal.amount, Some(12_500.75));
                assert_eq!(
                    deal.close_date,
                    Some(NaiveDate::from_ymd_opt(2025, 9, 30).unwrap())
                );
                // First element by array order wins.
                assert_eq!(deal.product_id, Some(3));
                assert_eq!(deal.account_id, Some(5));
                assert_eq!(deal.contact_id, Some(7));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn deal_numeric_amount_is_accepted() {
        let input = raw(json!({"id": 1, "amount": 990.5}));
        match transform(ResourceType::Deal, &input).unwrap() {
            NormalizedRecord::Deal(deal) => assert_eq!(deal.amount, Some(990.5)),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn deal_missing_amount_stays_unset_not_zero() {
        let input = raw(json!({"id": 1, "name": "No amount yet"}));
        match transform(ResourceType::Deal, &input).unwrap() {
            NormalizedRecord::Deal(deal) => assert_eq!(deal.amount, None),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn deal_non_numeric_amount_fails_per_record() {
        let input = raw(json!({"id": 17, "amount": "TBD"}));
        let err = transform(ResourceType::Deal, &input).unwrap_err();
        assert_eq!(err.resource_type, ResourceType::Deal);
        assert_eq!(err.record_id, 17);
        assert_eq!(err.field, "amount");
    }

    #[test]
    fn deal_missing_close_date_stays_unset_not_epoch() {
        let input = raw(json!({"id": 1}));
        match transform(ResourceType::Deal, &input).unwrap() {
            NormalizedRecord::Deal(deal) => assert_eq!(deal.close_date, None),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn deal_falls_back_to_closed_date() {
        let input = raw(json!({"id": 1, "closed_date": "2025-01-15"}));
        match transform(ResourceType::Deal, &input).unwrap() {
            NormalizedRecord::Deal(deal) => {
                assert_eq!(
                    deal.close_date,
                    Some(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap())
                );
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn deal_close_date_accepts_rfc3339_timestamps() {
        let input = raw(json!({"id": 1, "expected_close_date": "2025-03-01T09:30:00Z"}));
        match transform(ResourceType::Deal, &input).unwrap() {
            NormalizedRecord::Deal(deal) => {
                assert_eq!(
                    deal.close_date,
                    Some(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
                );
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn deal_empty_embedded_arrays_yield_unset_foreign_keys() {
        let input = raw(json!({"id": 1, "products": [], "contacts": [], "sales_account": null}));
        match transform(ResourceType::Deal, &input).unwrap() {
            NormalizedRecord::Deal(deal) => {
                assert_eq!(deal.product_id, None);
                assert_eq!(deal.account_id, None);
                assert_eq!(deal.contact_id, None);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn deal_malformed_embedded_array_fails_closed() {
        let input = raw(json!({"id": 2, "products": ["widget"]}));
        let err = transform(ResourceType::Deal, &input).unwrap_err();
        assert_eq!(err.field, "products");
    }

    // ─── Contacts ──────────────────────────────────────────────────────────

    #[test]
    fn contact_optional_fields_stay_unset() {
        let input = raw(json!({"id": 9, "first_name": "Ada"}));
        match transform(ResourceType::Contact, &input).unwrap() {
            NormalizedRecord::Contact(contact) => {
                assert_eq!(contact.first_name.as_deref(), Some("Ada"));
                assert_eq!(contact.last_name, None);
                assert_eq!(contact.email, None);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn contact_non_string_email_fails() {
        let input = raw(json!({"id": 9, "email": 42}));
        let err = transform(ResourceType::Contact, &input).unwrap_err();
        assert_eq!(err.field, "email");
    }

    // ─── Accounts ──────────────────────────────────────────────────────────

    #[test]
    fn account_industry_descends_into_nested_object() {
        let input = raw(json!({
            "id": 4,
            "name": "Acme",
            "industry_type": {"id": 11, "name": "Manufacturing"}
        }));
        match transform(ResourceType::Account, &input).unwrap() {
            NormalizedRecord::Account(account) => {
                assert_eq!(account.industry.as_deref(), Some("Manufacturing"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn account_without_industry_stays_unset() {
        let input = raw(json!({"id": 4, "name": "Acme"}));
        match transform(ResourceType::Account, &input).unwrap() {
            NormalizedRecord::Account(account) => assert_eq!(account.industry, None),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    // ─── Products ──────────────────────────────────────────────────────────

    #[test]
    fn product_price_prefers_unit_price() {
        let input = raw(json!({"id": 3, "unit_price": "99.00", "price": 120}));
        match transform(ResourceType::Product, &input).unwrap() {
            NormalizedRecord::Product(product) => assert_eq!(product.price, Some(99.0)),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn product_price_falls_back_then_stays_unset() {
        let input = raw(json!({"id": 3, "price": 120}));
        match transform(ResourceType::Product, &input).unwrap() {
            NormalizedRecord::Product(product) => assert_eq!(product.price, Some(120.0)),
            other => panic!("unexpected variant: {other:?}"),
        }

        let input = raw(json!({"id": 3, "name": "Widget"}));
        match transform(ResourceType::Product, &input).unwrap() {
            NormalizedRecord::Product(product) => assert_eq!(product.price, None),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    // ─── Sales activities ──────────────────────────────────────────────────

    #[test]
    fn sales_activity_full_record() {
        let input = raw(json!({
            "id": 88,
            "title": "Demo call",
            "type": "meeting",
            "targetable_type": "Deal",
            "targetable_id": 1,
            "start_date": "2025-06-02T14:00:00+02:00",
            "end_date": "2025-06-02T15:00:00+02:00",
            "outcome": {"id": 2, "name": "Interested"}
        }));
        match transform(ResourceType::SalesActivity, &input).unwrap() {
            NormalizedRecord::SalesActivity(activity) => {
                assert_eq!(activity.title.as_deref(), Some("Demo call"));
                assert_eq!(activity.activity_type.as_deref(), Some("meeting"));
                assert_eq!(activity.targetable_type.as_deref(), Some("Deal"));
                assert_eq!(activity.targetable_id, Some(1));
                assert!(activity.start_date.is_some());
                assert!(activity.end_date.is_some());
                assert_eq!(activity.outcome.as_deref(), Some("Interested"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn sales_activity_bad_timestamp_fails() {
        let input = raw(json!({"id": 88, "start_date": "yesterday"}));
        let err = transform(ResourceType::SalesActivity, &input).unwrap_err();
        assert_eq!(err.field, "start_date");
    }

    #[test]
    fn error_display_names_resource_record_and_field() {
        let input = raw(json!({"id": 17, "amount": "TBD"}));
        let err = transform(ResourceType::Deal, &input).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("deal"));
        assert!(message.contains("17"));
        assert!(message.contains("amount"));
    }
}
