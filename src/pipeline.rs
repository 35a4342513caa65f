//! Pure filter/sort transform over an aggregated article set.
//!
//! Filters run in a fixed order (search, reading-time bucket, source) before
//! a single sort pass. The stages are independent; the order only matters in
//! that sorting never re-runs filtering and vice versa.

use crate::types::{Article, FilterCriteria, SortBy, SortOrder};

/// Applies `criteria` to `articles` and returns the filtered, ordered result.
/// Deterministic for identical inputs; the caller keeps ownership of the
/// input slice.
pub fn apply(articles: &[Article], criteria: &FilterCriteria) -> Vec<Article> {
    let term = criteria.search_term.to_lowercase();

    let mut selected: Vec<Article> = articles
        .iter()
        .filter(|article| matches_search(article, &term))
        .filter(|article| criteria.reading_time.matches(article.reading_time))
        .filter(|article| {
            criteria
                .source
                .as_deref()
                .map_or(true, |source| article.source == source)
        })
        .cloned()
        .collect();

    selected.sort_by(|a, b| {
        let ordering = match criteria.sort_by {
            SortBy::Popularity => a.popularity.cmp(&b.popularity),
            // Null dates sort as epoch 0: oldest end, never excluded.
            SortBy::Date => date_ms(a).cmp(&date_ms(b)),
            SortBy::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        };
        match criteria.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    selected
}

/// Case-insensitive substring match over title or summary; an empty term
/// matches everything.
fn matches_search(article: &Article, lowercase_term: &str) -> bool {
    if lowercase_term.is_empty() {
        return true;
    }
    article.title.to_lowercase().contains(lowercase_term)
        || article.summary.to_lowercase().contains(lowercase_term)
}

fn date_ms(article: &Article) -> i64 {
    article.pub_date.map(|d| d.timestamp_millis()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReadingTimeBucket;
    use chrono::{TimeZone, Utc};

    fn article(title: &str, summary: &str) -> Article {
        Article {
            id: format!("test-{title}"),
            title: title.to_string(),
            summary: summary.to_string(),
            url: "https://example.com/a".to_string(),
            image: "https://example.com/img.png".to_string(),
            source: "test".to_string(),
            pub_date: None,
            reading_time: 1,
            popularity: 0,
        }
    }

    fn dated(title: &str, year: i32, month: u32, day: u32) -> Article {
        Article {
            pub_date: Some(Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()),
            ..article(title, "")
        }
    }

    #[test]
    fn search_matches_title_or_summary_case_insensitively() {
        let articles = vec![
            article("Alpha release", ""),
            article("Other", "mentions ALPHA inside"),
            article("Beta", "nothing relevant"),
        ];
        let criteria = FilterCriteria {
            search_term: "alpha".to_string(),
            ..Default::default()
        };

        let result = apply(&articles, &criteria);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn empty_search_matches_everything() {
        let articles = vec![article("Alpha", ""), article("Beta", "")];
        let result = apply(&articles, &FilterCriteria::default());
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn reading_time_bucket_filters() {
        let mut short = article("short", "");
        short.reading_time = 3;
        let mut medium = article("medium", "");
        medium.reading_time = 8;
        let mut long = article("long", "");
        long.reading_time = 25;

        let articles = vec![short, medium, long];
        let criteria = FilterCriteria {
            reading_time: ReadingTimeBucket::UpTo10,
            ..Default::default()
        };

        let result = apply(&articles, &criteria);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "medium");
    }

    #[test]
    fn source_filter_is_exact_match() {
        let mut a = article("a", "");
        a.source = "Tech".to_string();
        let mut b = article("b", "");
        b.source = "Tech Weekly".to_string();

        let criteria = FilterCriteria {
            source: Some("Tech".to_string()),
            ..Default::default()
        };

        let result = apply(&[a, b], &criteria);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "a");
    }

    #[test]
    fn sort_by_date_descending() {
        let articles = vec![
            dated("jan1", 2020, 1, 1),
            dated("jan3", 2020, 1, 3),
            dated("jan2", 2020, 1, 2),
        ];
        let criteria = FilterCriteria {
            sort_by: SortBy::Date,
            sort_order: SortOrder::Desc,
            ..Default::default()
        };

        let result = apply(&articles, &criteria);
        let titles: Vec<&str> = result.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["jan3", "jan2", "jan1"]);
    }

    #[test]
    fn null_date_sorts_to_oldest_end_ascending() {
        let articles = vec![dated("dated", 2020, 1, 1), article("undated", "")];
        let criteria = FilterCriteria {
            sort_by: SortBy::Date,
            sort_order: SortOrder::Asc,
            ..Default::default()
        };

        let result = apply(&articles, &criteria);
        assert_eq!(result[0].title, "undated");
        assert_eq!(result[1].title, "dated");
    }

    #[test]
    fn sort_by_popularity() {
        let mut a = article("a", "");
        a.popularity = 10;
        let mut b = article("b", "");
        b.popularity = 500;

        let criteria = FilterCriteria {
            sort_by: SortBy::Popularity,
            sort_order: SortOrder::Desc,
            ..Default::default()
        };

        let result = apply(&[a, b], &criteria);
        assert_eq!(result[0].title, "b");
    }

    #[test]
    fn sort_by_title_is_case_insensitive() {
        let articles = vec![article("banana", ""), article("Apple", ""), article("cherry", "")];
        let criteria = FilterCriteria {
            sort_by: SortBy::Title,
            sort_order: SortOrder::Asc,
            ..Default::default()
        };

        let result = apply(&articles, &criteria);
        let titles: Vec<&str> = result.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn apply_is_idempotent_for_identical_inputs() {
        let articles = vec![
            dated("jan2", 2020, 1, 2),
            dated("jan1", 2020, 1, 1),
            article("undated", ""),
        ];
        let criteria = FilterCriteria {
            sort_by: SortBy::Date,
            sort_order: SortOrder::Desc,
            ..Default::default()
        };

        let first = apply(&articles, &criteria);
        let second = apply(&articles, &criteria);
        assert_eq!(first, second);
    }
}
