//! Dense (year x category) temporal aggregation.
//!
//! Groups the classified corpus into a dense count table: one row per
//! distinct publication year (ascending), one column per observed category
//! (first-seen order), explicit zeros for absent combinations. Documents
//! without a parseable year are excluded from the table but counted so the
//! caller can report them, never silently dropped.

use crate::models::Document;
use serde_json::{Map, Value};

/// The dense year-by-category count table.
///
/// Invariant: `counts` is `years.len()` rows of `categories.len()` cells
/// each; the full cross-product of observed years and observed categories
/// is always materialized.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionTable {
    /// Distinct publication years, sorted ascending
    pub years: Vec<i32>,

    /// Observed category names, in first-seen order
    pub categories: Vec<String>,

    /// `counts[row][col]` = number of documents from `years[row]` assigned
    /// `categories[col]`
    pub counts: Vec<Vec<u64>>,

    /// Number of documents excluded for lacking a parseable year
    pub undated_documents: usize,
}

impl EvolutionTable {
    /// Build the table from a classified document set.
    ///
    /// Documents without an assigned category are skipped (classification
    /// runs before aggregation, so in practice none are). Must be rebuilt
    /// from scratch whenever the underlying document set changes.
    pub fn build(documents: &[Document]) -> Self {
        let mut years: Vec<i32> = Vec::new();
        let mut categories: Vec<String> = Vec::new();
        let mut undated_documents = 0;

        for doc in documents {
            let Some(category) = doc.primary_category.as_deref() else {
                continue;
            };
            if !categories.iter().any(|c| c == category) {
                categories.push(category.to_string());
            }
            match doc.year {
                Some(year) => {
                    if !years.contains(&year) {
                        years.push(year);
                    }
                }
                None => undated_documents += 1,
            }
        }
        years.sort_unstable();

        let mut counts = vec![vec![0u64; categories.len()]; years.len()];
        for doc in documents {
            let (Some(year), Some(category)) = (doc.year, doc.primary_category.as_deref()) else {
                continue;
            };
            let row = years.iter().position(|&y| y == year).expect("year indexed above");
            let col = categories
                .iter()
                .position(|c| c == category)
                .expect("category indexed above");
            counts[row][col] += 1;
        }

        Self {
            years,
            categories,
            counts,
            undated_documents,
        }
    }

    /// Count for a single (year, category) cell; `None` when either axis
    /// value was never observed.
    pub fn count(&self, year: i32, category: &str) -> Option<u64> {
        let row = self.years.iter().position(|&y| y == year)?;
        let col = self.categories.iter().position(|c| c == category)?;
        Some(self.counts[row][col])
    }

    /// Total number of cells (rows x columns).
    pub fn cell_count(&self) -> usize {
        self.years.len() * self.categories.len()
    }

    /// Render the table as one JSON object per year: a `year` key plus one
    /// integer key per category, zero-filled.
    pub fn rows(&self) -> Vec<Map<String, Value>> {
        self.years
            .iter()
            .enumerate()
            .map(|(row, &year)| {
                let mut object = Map::new();
                object.insert("year".to_string(), Value::from(year));
                for (col, category) in self.categories.iter().enumerate() {
                    object.insert(category.clone(), Value::from(self.counts[row][col]));
                }
                object
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: usize, year: Option<i32>, category: &str) -> Document {
        Document {
            id,
            title: format!("doc {id}"),
            link: None,
            abstract_text: String::new(),
            conclusion: String::new(),
            date: None,
            year,
            primary_category: Some(category.to_string()),
        }
    }

    #[test]
    fn test_dense_cross_product() {
        let documents = vec![
            doc(0, Some(2020), "A"),
            doc(1, Some(2021), "B"),
            doc(2, Some(2022), "A"),
        ];
        let table = EvolutionTable::build(&documents);
        assert_eq!(table.years, vec![2020, 2021, 2022]);
        assert_eq!(table.categories, vec!["A", "B"]);
        // Full cross-product, zero-filled.
        assert_eq!(table.cell_count(), 6);
        assert_eq!(table.count(2020, "B"), Some(0));
        assert_eq!(table.count(2021, "B"), Some(1));
        assert_eq!(table.count(2022, "A"), Some(1));
    }

    #[test]
    fn test_years_sorted_ascending() {
        let documents = vec![
            doc(0, Some(2023), "A"),
            doc(1, Some(2019), "A"),
            doc(2, Some(2021), "A"),
        ];
        let table = EvolutionTable::build(&documents);
        assert_eq!(table.years, vec![2019, 2021, 2023]);
    }

    #[test]
    fn test_undated_documents_counted_not_dropped_silently() {
        let documents = vec![
            doc(0, Some(2020), "A"),
            doc(1, None, "A"),
            doc(2, None, "B"),
        ];
        let table = EvolutionTable::build(&documents);
        assert_eq!(table.undated_documents, 2);
        assert_eq!(table.years, vec![2020]);
        // Undated documents still contribute their category to the columns.
        assert_eq!(table.categories, vec!["A", "B"]);
        assert_eq!(table.count(2020, "B"), Some(0));
    }

    #[test]
    fn test_rows_shape() {
        let documents = vec![doc(0, Some(2020), "A"), doc(1, Some(2020), "A")];
        let table = EvolutionTable::build(&documents);
        let rows = table.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["year"], 2020);
        assert_eq!(rows[0]["A"], 2);
    }

    #[test]
    fn test_empty_corpus() {
        let table = EvolutionTable::build(&[]);
        assert!(table.years.is_empty());
        assert!(table.categories.is_empty());
        assert_eq!(table.cell_count(), 0);
        assert_eq!(table.undated_documents, 0);
    }
}
