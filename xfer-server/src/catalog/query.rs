//! Product search query construction
//!
//! A variant matches when every query word appears in its product title, or
//! the whole query does (anywhere, as a prefix, or as a suffix). Matches are
//! ranked substring (1), prefix (2), suffix (3), words only (4), then ordered
//! by product and variant title. The substring test is checked first and
//! covers prefixes and suffixes, so whole-query matches always rank 1.
//!
//! User text only ever reaches the database through `push_bind`. LIKE
//! wildcards in that text are escaped, so `50%` matches a literal percent sign.

use sqlx::{Database, Encode, QueryBuilder, Type};

/// Upper bound on search results
pub const MAX_SEARCH_RESULTS: i64 = 20;

/// Columns selected for every catalog read
///
/// Numeric columns are cast so a catalog storing them as NUMERIC or text
/// still decodes into `ProductVariant`.
pub const PRODUCT_COLUMNS: &str = "CAST(product_variant_id AS BIGINT) AS product_variant_id, \
     product_title, variant_title, \
     CAST(volume_ml AS INTEGER) AS volume_ml, sku, sub_title";

/// Excludes bundle listings; contains no user input
pub const NOT_BUNDLE: &str = "(sub_title IS NULL OR LOWER(sub_title) NOT LIKE '%wine bundle%')";

/// Parsed search input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerms {
    query: String,
    words: Vec<String>,
}

impl SearchTerms {
    /// Split a raw query; `None` when there is nothing to search for
    pub fn parse(raw: &str) -> Option<Self> {
        let query = raw.trim();
        if query.is_empty() {
            return None;
        }

        Some(Self {
            query: query.to_string(),
            words: query.split_whitespace().map(str::to_string).collect(),
        })
    }

    /// The trimmed query
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

/// Escape LIKE metacharacters for use with `ESCAPE '\'`
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn contains_pattern(text: &str) -> String {
    format!("%{}%", escape_like(text))
}

fn prefix_pattern(text: &str) -> String {
    format!("{}%", escape_like(text))
}

fn suffix_pattern(text: &str) -> String {
    format!("%{}", escape_like(text))
}

fn push_title_like<'args, DB>(builder: &mut QueryBuilder<'args, DB>, pattern: String)
where
    DB: Database,
    String: 'args + Encode<'args, DB> + Type<DB>,
{
    builder.push("LOWER(product_title) LIKE LOWER(");
    builder.push_bind(pattern);
    builder.push(") ESCAPE '\\'");
}

/// Append the ranked search SELECT to an empty builder
///
/// Generic over the backend so PostgreSQL and SQLite share one statement;
/// each backend renders its own placeholders.
pub fn push_search_query<'args, DB>(builder: &mut QueryBuilder<'args, DB>, terms: &SearchTerms)
where
    DB: Database,
    String: 'args + Encode<'args, DB> + Type<DB>,
    i64: 'args + Encode<'args, DB> + Type<DB>,
{
    builder.push("SELECT ");
    builder.push(PRODUCT_COLUMNS);
    builder.push(", CASE WHEN ");
    push_title_like(builder, contains_pattern(&terms.query));
    builder.push(" THEN 1 WHEN ");
    push_title_like(builder, prefix_pattern(&terms.query));
    builder.push(" THEN 2 WHEN ");
    push_title_like(builder, suffix_pattern(&terms.query));
    builder.push(" THEN 3 ELSE 4 END AS match_rank FROM dim_product_variant WHERE ((");

    for (i, word) in terms.words.iter().enumerate() {
        if i > 0 {
            builder.push(" AND ");
        }
        push_title_like(builder, contains_pattern(word));
    }

    builder.push(") OR ");
    push_title_like(builder, contains_pattern(&terms.query));
    builder.push(" OR ");
    push_title_like(builder, prefix_pattern(&terms.query));
    builder.push(" OR ");
    push_title_like(builder, suffix_pattern(&terms.query));
    builder.push(") AND ");
    builder.push(NOT_BUNDLE);
    builder.push(" ORDER BY match_rank, product_title, variant_title LIMIT ");
    builder.push_bind(MAX_SEARCH_RESULTS);
}

/// Full listing of non-bundle variants
pub fn list_products_sql() -> String {
    format!(
        "SELECT {} FROM dim_product_variant WHERE {} ORDER BY product_title, variant_title",
        PRODUCT_COLUMNS, NOT_BUNDLE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::{Postgres, Sqlite};

    #[test]
    fn test_parse_splits_on_whitespace() {
        let terms = SearchTerms::parse("  pinot   noir\t2019 ").unwrap();
        assert_eq!(terms.query(), "pinot   noir\t2019");
        assert_eq!(terms.words(), &["pinot", "noir", "2019"]);
    }

    #[test]
    fn test_parse_blank_is_none() {
        assert!(SearchTerms::parse("").is_none());
        assert!(SearchTerms::parse("   \t").is_none());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_sql_has_no_user_text() {
        let terms = SearchTerms::parse("x' OR 1=1 --").unwrap();
        let mut builder = QueryBuilder::<Sqlite>::new("");
        push_search_query(&mut builder, &terms);
        let sql = builder.sql();

        assert!(!sql.contains("1=1"));
        assert!(sql.contains("LIMIT ?"));
    }

    #[test]
    fn test_postgres_placeholders_are_numbered() {
        // 3 rank patterns + 2 words + 3 whole-query patterns + limit
        let terms = SearchTerms::parse("pinot noir").unwrap();
        let mut builder = QueryBuilder::<Postgres>::new("");
        push_search_query(&mut builder, &terms);
        let sql = builder.sql();

        assert!(sql.contains("$1"));
        assert!(sql.contains("LIMIT $9"));
        assert!(!sql.contains("$10"));
    }

    #[test]
    fn test_numeric_columns_are_cast() {
        assert!(PRODUCT_COLUMNS.contains("CAST(product_variant_id AS BIGINT) AS product_variant_id"));
        assert!(PRODUCT_COLUMNS.contains("CAST(volume_ml AS INTEGER) AS volume_ml"));

        let terms = SearchTerms::parse("pinot").unwrap();
        let mut builder = QueryBuilder::<Postgres>::new("");
        push_search_query(&mut builder, &terms);
        assert!(builder.sql().starts_with("SELECT CAST(product_variant_id AS BIGINT)"));
    }

    #[test]
    fn test_list_sql_excludes_bundles() {
        let sql = list_products_sql();
        assert!(sql.contains("wine bundle"));
        assert!(sql.ends_with("ORDER BY product_title, variant_title"));
    }
}
