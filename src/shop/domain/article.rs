//! Catalog articles and the queries used to browse them.

use super::{ArticleId, ShopDomainError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Catalog number of an article, unique across the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleNumber(String);

impl ArticleNumber {
    /// Creates a trimmed, non-empty article number.
    ///
    /// # Errors
    ///
    /// Returns [`ShopDomainError::EmptyArticleNumber`] for blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, ShopDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ShopDomainError::EmptyArticleNumber);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the number as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated article fields, used for both create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleDraft {
    /// Catalog number.
    pub article_num: ArticleNumber,
    /// Display name.
    pub name: String,
    /// Sheet thickness in millimetres.
    pub thickness: f64,
    /// Material designation, e.g. `S235`.
    pub material_type: String,
    /// Optional path or URL of the drawing.
    pub file_url: Option<String>,
}

impl ArticleDraft {
    /// Validates raw article input.
    ///
    /// # Errors
    ///
    /// Returns a [`ShopDomainError`] when the number, name or material is
    /// blank, or the thickness is not a positive finite number.
    pub fn new(
        number: impl Into<String>,
        raw_name: impl Into<String>,
        thickness: f64,
        raw_material: impl Into<String>,
        raw_file_url: Option<String>,
    ) -> Result<Self, ShopDomainError> {
        let article_num = ArticleNumber::new(number)?;
        let name = raw_name.into().trim().to_owned();
        if name.is_empty() {
            return Err(ShopDomainError::EmptyArticleName);
        }
        if !thickness.is_finite() || thickness <= 0.0 {
            return Err(ShopDomainError::InvalidThickness(thickness.to_string()));
        }
        let material_type = raw_material.into().trim().to_owned();
        if material_type.is_empty() {
            return Err(ShopDomainError::EmptyMaterialType);
        }
        let file_url = raw_file_url
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty());

        Ok(Self {
            article_num,
            name,
            thickness,
            material_type,
            file_url,
        })
    }
}

/// Catalog article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    id: ArticleId,
    fields: ArticleDraft,
}

impl Article {
    /// Reconstructs an article from persisted storage.
    #[must_use]
    pub const fn from_persisted(id: ArticleId, fields: ArticleDraft) -> Self {
        Self { id, fields }
    }

    /// Returns the article key.
    #[must_use]
    pub const fn id(&self) -> ArticleId {
        self.id
    }

    /// Returns the catalog number.
    #[must_use]
    pub const fn article_num(&self) -> &ArticleNumber {
        &self.fields.article_num
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.fields.name
    }

    /// Returns the thickness in millimetres.
    #[must_use]
    pub const fn thickness(&self) -> f64 {
        self.fields.thickness
    }

    /// Returns the material designation.
    #[must_use]
    pub fn material_type(&self) -> &str {
        &self.fields.material_type
    }

    /// Returns the drawing location, if any.
    #[must_use]
    pub fn file_url(&self) -> Option<&str> {
        self.fields.file_url.as_deref()
    }

    /// Returns the validated fields.
    #[must_use]
    pub const fn fields(&self) -> &ArticleDraft {
        &self.fields
    }
}

/// Column a catalog search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleSearchField {
    /// Display name.
    #[default]
    Name,
    /// Catalog number.
    ArticleNumber,
    /// Material designation.
    MaterialType,
    /// Display name or catalog number, as the article picker searches.
    NameOrNumber,
}

impl ArticleSearchField {
    /// Returns whether `article` contains `needle` (already lowercased).
    #[must_use]
    pub fn matches(self, article: &Article, needle: &str) -> bool {
        let contains = |haystack: &str| haystack.to_lowercase().contains(needle);
        match self {
            Self::Name => contains(article.name()),
            Self::ArticleNumber => contains(article.article_num().as_str()),
            Self::MaterialType => contains(article.material_type()),
            Self::NameOrNumber => {
                contains(article.name()) || contains(article.article_num().as_str())
            }
        }
    }
}

/// Column the catalog list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleSortField {
    /// Store key.
    #[default]
    Id,
    /// Display name.
    Name,
    /// Catalog number.
    ArticleNumber,
    /// Thickness.
    Thickness,
    /// Material designation.
    MaterialType,
}

impl ArticleSortField {
    /// Compares two articles on this column in ascending order.
    #[must_use]
    pub fn compare(self, left: &Article, right: &Article) -> Ordering {
        match self {
            Self::Id => left.id().cmp(&right.id()),
            Self::Name => left.name().cmp(right.name()),
            Self::ArticleNumber => left.article_num().cmp(right.article_num()),
            Self::Thickness => left.thickness().total_cmp(&right.thickness()),
            Self::MaterialType => left.material_type().cmp(right.material_type()),
        }
    }
}

/// Sort direction for tabular views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl SortDirection {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Applies the direction to an ascending ordering.
    #[must_use]
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Current sort of a table plus the header-click toggle rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArticleSort {
    /// Sorted column.
    pub field: ArticleSortField,
    /// Sort direction.
    pub direction: SortDirection,
}

impl ArticleSort {
    /// Returns the sort after clicking the `field` header: the same column
    /// flips direction, a new column starts ascending.
    #[must_use]
    pub fn clicked(self, field: ArticleSortField) -> Self {
        if self.field == field {
            Self {
                field,
                direction: self.direction.toggled(),
            }
        } else {
            Self {
                field,
                direction: SortDirection::Ascending,
            }
        }
    }
}

/// Store query for articles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticleQuery {
    /// Column and term for a case-insensitive contains match; blank terms
    /// match everything.
    pub search: Option<(ArticleSearchField, String)>,
    /// Result order.
    pub sort: ArticleSort,
    /// Maximum number of rows.
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "Plate", 1.0, "S235")]
    #[case("A-1", "  ", 1.0, "S235")]
    #[case("A-1", "Plate", 0.0, "S235")]
    #[case("A-1", "Plate", f64::NAN, "S235")]
    #[case("A-1", "Plate", 2.0, "")]
    fn draft_rejects_incomplete_input(
        #[case] number: &str,
        #[case] name: &str,
        #[case] thickness: f64,
        #[case] material: &str,
    ) {
        assert!(ArticleDraft::new(number, name, thickness, material, None).is_err());
    }

    #[test]
    fn draft_trims_and_drops_blank_file_url() {
        let draft = ArticleDraft::new(" A-100 ", " Plate ", 2.5, " S235 ", Some("  ".to_owned()))
            .expect("valid draft");
        assert_eq!(draft.article_num.as_str(), "A-100");
        assert_eq!(draft.name, "Plate");
        assert_eq!(draft.material_type, "S235");
        assert_eq!(draft.file_url, None);
    }

    #[test]
    fn clicking_same_header_toggles_direction() {
        let toggled = ArticleSort::default().clicked(ArticleSortField::Id);
        assert_eq!(toggled.direction, SortDirection::Descending);
        let switched = toggled.clicked(ArticleSortField::Name);
        assert_eq!(switched.field, ArticleSortField::Name);
        assert_eq!(switched.direction, SortDirection::Ascending);
    }
}
