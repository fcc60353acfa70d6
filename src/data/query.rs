//! Queries over the dataset, keyed by language, category and sub-category.
//!
//! All matching is exact string equality. Results borrow from the dataset.

use std::cmp::Ordering;
use std::collections::HashSet;

use icu_collator::CollatorBorrowed;
use icu_collator::options::CollatorOptions;
use icu_locale_core::locale;

use crate::data::record::Record;
use crate::data::store::Dataset;

/// Categories containing this marker are browsable libraries.
pub const LIBRARY_MARKER: &str = "AULA";
/// Lower-cased categories containing this marker offer the metronome.
pub const CPR_MARKER: &str = "rcp";

pub fn is_library(category: &str) -> bool {
    category.contains(LIBRARY_MARKER)
}

pub fn is_cpr(category: &str) -> bool {
    category.to_lowercase().contains(CPR_MARKER)
}

/// Distinct categories for `lang`: regular categories first, libraries
/// last, each group in collation order.
pub fn list_categories<'a>(dataset: &'a Dataset, lang: &str) -> Vec<&'a str> {
    let mut categories = distinct(
        dataset
            .records()
            .iter()
            .filter(|r| r.matches_language(lang))
            .map(|r| r.category.as_str()),
    );
    let collator = collator();
    categories.sort_by(|a, b| compare_categories(collator.as_ref(), a, b));
    categories
}

/// Distinct sub-categories in the order they first appear.
pub fn list_sub_categories<'a>(dataset: &'a Dataset, lang: &str, category: &str) -> Vec<&'a str> {
    distinct(
        dataset
            .records()
            .iter()
            .filter(|r| r.matches(lang, category))
            .map(|r| r.sub_category.as_str()),
    )
}

pub fn find_record<'a>(
    dataset: &'a Dataset,
    lang: &str,
    category: &str,
    sub_category: &str,
) -> Option<&'a Record> {
    dataset
        .records()
        .iter()
        .find(|r| r.matches(lang, category) && r.sub_category == sub_category)
}

/// Every record of a library category, duplicates included.
pub fn list_library_items<'a>(dataset: &'a Dataset, lang: &str, category: &str) -> Vec<&'a Record> {
    dataset
        .records()
        .iter()
        .filter(|r| r.matches(lang, category))
        .collect()
}

pub fn list_languages(dataset: &Dataset) -> Vec<&str> {
    distinct(
        dataset
            .records()
            .iter()
            .map(|r| r.language.as_str())
            .filter(|l| !l.is_empty()),
    )
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.filter(|v| seen.insert(*v)).collect()
}

fn compare_categories(collator: Option<&CollatorBorrowed<'static>>, a: &str, b: &str) -> Ordering {
    match (is_library(a), is_library(b)) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => match collator {
            Some(collator) => collator.compare(a, b).then_with(|| a.cmp(b)),
            None => a.cmp(b),
        },
    }
}

/// Portuguese collator from the compiled ICU data. `None` only if the
/// data cannot be loaded, in which case ordering falls back to bytes.
fn collator() -> Option<CollatorBorrowed<'static>> {
    match CollatorBorrowed::try_new(locale!("pt").into(), CollatorOptions::default()) {
        Ok(collator) => Some(collator),
        Err(err) => {
            tracing::warn!(error = %err, "collation data unavailable, using byte order");
            None
        }
    }
}

/// Locale-aware comparison (accents and case are secondary and tertiary
/// differences), falling back to the raw strings so equal keys still
/// order deterministically.
pub fn collate(a: &str, b: &str) -> Ordering {
    match collator() {
        Some(collator) => collator.compare(a, b).then_with(|| a.cmp(b)),
        None => a.cmp(b),
    }
}
