//! Show records as they travel between the HTTP layer and the store.

use super::error::{ShowStoreError, ShowStoreResult};
use super::query::ShowField;
use serde::{Deserialize, Deserializer, Serialize};

/// Exclusive upper bound for `show_id` and `release_year` (32-bit signed max).
pub const MAX_INT_FIELD_EXCLUSIVE: i64 = 2_147_483_647;

/// A persisted catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    pub show_id: i64,
    #[serde(rename = "type")]
    pub show_type: Option<String>,
    pub title: Option<String>,
    pub director: Option<String>,
    pub cast: Option<String>,
    pub country: Option<String>,
    pub date_added: Option<String>,
    pub release_year: Option<i64>,
    pub rating: Option<String>,
    pub duration: Option<String>,
    pub listed_in: Option<String>,
    pub description: Option<String>,
}

/// Body of a create request. `show_id` is assigned by the store when absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShow {
    #[serde(default)]
    pub show_id: Option<i64>,
    #[serde(rename = "type", default)]
    pub show_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub cast: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub date_added: Option<String>,
    #[serde(default)]
    pub release_year: Option<i64>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub listed_in: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn check_positive_int(field: ShowField, value: Option<i64>) -> ShowStoreResult<()> {
    match value {
        Some(v) if v <= 0 || v >= MAX_INT_FIELD_EXCLUSIVE => {
            Err(ShowStoreError::invalid_parameter(format!(
                "{} must be greater than 0 and less than {}, got {}",
                field, MAX_INT_FIELD_EXCLUSIVE, v
            )))
        }
        _ => Ok(()),
    }
}

impl NewShow {
    pub fn validate(&self) -> ShowStoreResult<()> {
        check_positive_int(ShowField::ShowId, self.show_id)?;
        check_positive_int(ShowField::ReleaseYear, self.release_year)
    }
}

/// Body of an update request. An absent field keeps its stored value, an
/// explicit `null` clears it. The id is never part of an update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowUpdate {
    #[serde(rename = "type", default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub show_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub director: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub cast: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub country: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub date_added: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub release_year: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub rating: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub duration: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub listed_in: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

/// Wraps any present value, `null` included, in `Some`. Combined with
/// `#[serde(default)]` an absent key stays `None`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Per-field substring filters. Every field is optional and an empty string
/// is the same as no constraint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ShowFilter {
    pub show_id: Option<String>,
    #[serde(rename = "type")]
    pub show_type: Option<String>,
    pub title: Option<String>,
    pub director: Option<String>,
    pub cast: Option<String>,
    pub country: Option<String>,
    pub date_added: Option<String>,
    pub release_year: Option<String>,
    pub rating: Option<String>,
    pub duration: Option<String>,
    pub listed_in: Option<String>,
    pub description: Option<String>,
}

impl ShowFilter {
    /// The non-empty filter value for `field`, if any.
    pub fn value_of(&self, field: ShowField) -> Option<&str> {
        let value = match field {
            ShowField::ShowId => &self.show_id,
            ShowField::Type => &self.show_type,
            ShowField::Title => &self.title,
            ShowField::Director => &self.director,
            ShowField::Cast => &self.cast,
            ShowField::Country => &self.country,
            ShowField::DateAdded => &self.date_added,
            ShowField::ReleaseYear => &self.release_year,
            ShowField::Rating => &self.rating,
            ShowField::Duration => &self.duration,
            ShowField::ListedIn => &self.listed_in,
            ShowField::Description => &self.description,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    pub fn with(mut self, field: ShowField, value: &str) -> Self {
        let value = Some(value.to_string());
        match field {
            ShowField::ShowId => self.show_id = value,
            ShowField::Type => self.show_type = value,
            ShowField::Title => self.title = value,
            ShowField::Director => self.director = value,
            ShowField::Cast => self.cast = value,
            ShowField::Country => self.country = value,
            ShowField::DateAdded => self.date_added = value,
            ShowField::ReleaseYear => self.release_year = value,
            ShowField::Rating => self.rating = value,
            ShowField::Duration => self.duration = value,
            ShowField::ListedIn => self.listed_in = value,
            ShowField::Description => self.description = value,
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_show_accepts_missing_id_and_year() {
        NewShow::default().validate().unwrap();
    }

    #[test]
    fn new_show_rejects_out_of_range_values() {
        let show = NewShow {
            show_id: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            show.validate(),
            Err(ShowStoreError::InvalidParameter(_))
        ));

        let show = NewShow {
            release_year: Some(MAX_INT_FIELD_EXCLUSIVE),
            ..Default::default()
        };
        assert!(matches!(
            show.validate(),
            Err(ShowStoreError::InvalidParameter(_))
        ));

        let show = NewShow {
            show_id: Some(MAX_INT_FIELD_EXCLUSIVE - 1),
            release_year: Some(1),
            ..Default::default()
        };
        show.validate().unwrap();
    }

    #[test]
    fn empty_filter_values_impose_no_constraint() {
        let filter = ShowFilter::default()
            .with(ShowField::Title, "")
            .with(ShowField::Cast, "Keanu");
        assert_eq!(filter.value_of(ShowField::Title), None);
        assert_eq!(filter.value_of(ShowField::Cast), Some("Keanu"));
        assert_eq!(filter.value_of(ShowField::Director), None);
    }

    #[test]
    fn show_serializes_type_under_its_wire_name() {
        let json = serde_json::json!({
            "type": "Movie",
            "title": "Inception",
            "release_year": 2010
        });
        let show: NewShow = serde_json::from_value(json).unwrap();
        assert_eq!(show.show_type.as_deref(), Some("Movie"));
        assert_eq!(show.show_id, None);
        assert_eq!(show.release_year, Some(2010));
    }

    #[test]
    fn update_tells_null_from_absent() {
        let update: ShowUpdate =
            serde_json::from_str(r#"{"director": null, "title": "Rope", "type": "Movie"}"#)
                .unwrap();
        assert_eq!(update.director, Some(None));
        assert_eq!(update.title, Some(Some("Rope".to_string())));
        assert_eq!(update.show_type, Some(Some("Movie".to_string())));
        assert_eq!(update.cast, None);
        assert_eq!(update.release_year, None);
    }
}
