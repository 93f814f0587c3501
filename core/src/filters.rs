//! The closed set of structured search filters.
//!
//! Filters arrive either typed, as a JSON object, or as string key/value
//! pairs (config files, the C host). Every entry point rejects keys outside
//! `genre`, `rows`, `sortField`, `sortOrder` instead of dropping them.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Id,
    Title,
    Year,
    Rating,
}

impl SortField {
    /// Field name understood by the catalog service.
    pub fn wire_name(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "primaryTitle",
            SortField::Year => "startYear",
            SortField::Rating => "averageRating",
        }
    }
}

impl FromStr for SortField {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortField::Id),
            "title" => Ok(SortField::Title),
            "year" => Ok(SortField::Year),
            "rating" => Ok(SortField::Rating),
            other => Err(CatalogError::InvalidFilter(format!("sortField={other}"))),
        }
    }
}

/// Deserialized through `FromStr`, so JSON and string pairs accept the same
/// spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl TryFrom<String> for SortOrder {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl SortOrder {
    pub fn wire_name(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortOrder::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortOrder::Desc)
        } else {
            Err(CatalogError::InvalidFilter(format!("sortOrder={s}")))
        }
    }
}

/// Optional structured filters for `search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchFilters {
    pub genre: Option<String>,
    pub rows: Option<u32>,
    pub sort_field: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

impl SearchFilters {
    /// Parse a JSON object such as `{"genre":"Drama","rows":25}`.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let filters: SearchFilters =
            serde_json::from_str(json).map_err(|e| CatalogError::InvalidFilter(e.to_string()))?;
        filters.validate()?;
        Ok(filters)
    }

    /// Build filters from string pairs, failing on the first unknown key or
    /// unparsable value.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filters = SearchFilters::default();
        for (key, value) in pairs {
            match key {
                "genre" => filters.genre = Some(value.to_string()),
                "rows" => {
                    let rows = value
                        .parse()
                        .map_err(|_| CatalogError::InvalidFilter(format!("rows={value}")))?;
                    filters.rows = Some(rows);
                }
                "sortField" => filters.sort_field = Some(value.parse()?),
                "sortOrder" => filters.sort_order = Some(value.parse()?),
                other => {
                    return Err(CatalogError::InvalidFilter(format!("unknown key `{other}`")))
                }
            }
        }
        filters.validate()?;
        Ok(filters)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.rows == Some(0) {
            return Err(CatalogError::InvalidFilter("rows must be positive".to_string()));
        }
        if matches!(&self.genre, Some(g) if g.trim().is_empty()) {
            return Err(CatalogError::InvalidFilter("genre must not be blank".to_string()));
        }
        Ok(())
    }

    /// Query-string pairs in the order the service documents them.
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(genre) = &self.genre {
            pairs.push(("genre", genre.clone()));
        }
        if let Some(rows) = self.rows {
            pairs.push(("rows", rows.to_string()));
        }
        if let Some(field) = self.sort_field {
            pairs.push(("sortField", field.wire_name().to_string()));
        }
        if let Some(order) = self.sort_order {
            pairs.push(("sortOrder", order.wire_name().to_string()));
        }
        pairs
    }
}
