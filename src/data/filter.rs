use std::collections::BTreeSet;

use thiserror::Error;

use super::model::Table;

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// Rows with `min_year <= year <= max_year`, in their original order.
/// An inverted range selects nothing.
pub fn filter_by_year(table: &Table, min_year: i32, max_year: i32) -> Table {
    table
        .iter()
        .filter(|r| min_year <= r.year && r.year <= max_year)
        .cloned()
        .collect()
}

/// Rows whose country is in `countries`, in their original order.
/// An empty set selects nothing.
pub fn filter_by_country(table: &Table, countries: &BTreeSet<String>) -> Table {
    table
        .iter()
        .filter(|r| countries.contains(&r.country))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Filter state: a snapshot of the sidebar controls
// ---------------------------------------------------------------------------

/// Raised when a filter value falls outside the domain its control offers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("country '{0}' is not part of the dataset")]
    UnknownCountry(String),
    #[error("year {year} lies outside the dataset span {min}..={max}")]
    YearOutOfSpan { year: i32, min: i32, max: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub min_year: i32,
    pub max_year: i32,
    pub selected_countries: BTreeSet<String>,
}

impl FilterState {
    /// Everything selected: the full year span and every country.
    pub fn select_all(table: &Table) -> Self {
        let (min_year, max_year) = table.year_span().unwrap_or((0, 0));
        FilterState {
            min_year,
            max_year,
            selected_countries: table.countries(),
        }
    }

    /// Check that every value is one the controls could have produced.
    pub fn validate(
        &self,
        known_countries: &BTreeSet<String>,
        year_span: Option<(i32, i32)>,
    ) -> Result<(), FilterError> {
        if let Some(unknown) = self
            .selected_countries
            .iter()
            .find(|c| !known_countries.contains(*c))
        {
            return Err(FilterError::UnknownCountry(unknown.clone()));
        }
        if let Some((min, max)) = year_span {
            for year in [self.min_year, self.max_year] {
                if year < min || year > max {
                    return Err(FilterError::YearOutOfSpan { year, min, max });
                }
            }
        }
        Ok(())
    }

    /// `filter_by_country(filter_by_year(table, min, max), countries)`.
    pub fn apply(&self, table: &Table) -> Table {
        filter_by_country(
            &filter_by_year(table, self.min_year, self.max_year),
            &self.selected_countries,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{sample_table, COUNTRIES};

    fn countries(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn inverted_year_range_is_empty() {
        let table = sample_table();
        assert!(filter_by_year(&table, 2010, 2000).is_empty());
        assert!(filter_by_year(&table, 1971, 1970).is_empty());
    }

    #[test]
    fn year_bounds_are_inclusive() {
        let table = sample_table();
        let single = filter_by_year(&table, 1990, 1990);
        assert_eq!(single.len(), COUNTRIES.len());
        assert!(single.iter().all(|r| r.year == 1990));
    }

    #[test]
    fn country_filter_keeps_members_in_source_order() {
        let table = sample_table();
        let wanted = countries(&["Japan", "Canada"]);
        let out = filter_by_country(&table, &wanted);

        assert_eq!(out.len(), 2 * 51);
        assert!(out.iter().all(|r| wanted.contains(&r.country)));

        // Relative order equals the order of the matching rows in the source.
        let expected: Vec<_> = table.iter().filter(|r| wanted.contains(&r.country)).collect();
        assert!(out.iter().eq(expected.into_iter()));
    }

    #[test]
    fn empty_country_set_is_empty_not_an_error() {
        let table = sample_table();
        assert!(filter_by_country(&table, &BTreeSet::new()).is_empty());
    }

    #[test]
    fn filters_commute() {
        let table = sample_table();
        let wanted = countries(&["France", "USA", "Germany"]);
        let a = filter_by_country(&filter_by_year(&table, 1985, 2003), &wanted);
        let b = filter_by_year(&filter_by_country(&table, &wanted), 1985, 2003);
        assert_eq!(a, b);
    }

    #[test]
    fn usa_between_2000_and_2010() {
        let state = FilterState {
            min_year: 2000,
            max_year: 2010,
            selected_countries: countries(&["USA"]),
        };
        let out = state.apply(&sample_table());
        assert_eq!(out.len(), 11);
        assert!(out.iter().all(|r| r.country == "USA" && (2000..=2010).contains(&r.year)));
    }

    #[test]
    fn full_selection_reproduces_the_base_table() {
        let table = sample_table();
        let state = FilterState {
            min_year: 1970,
            max_year: 2020,
            selected_countries: countries(&COUNTRIES),
        };
        assert_eq!(state, FilterState::select_all(&table));
        assert_eq!(state.apply(&table), table);
    }

    #[test]
    fn validate_rejects_values_outside_the_controls() {
        let table = sample_table();
        let known = table.countries();
        let span = table.year_span();

        let mut state = FilterState::select_all(&table);
        assert_eq!(state.validate(&known, span), Ok(()));

        state.selected_countries.insert("Atlantis".to_string());
        assert_eq!(
            state.validate(&known, span),
            Err(FilterError::UnknownCountry("Atlantis".to_string()))
        );

        let mut state = FilterState::select_all(&table);
        state.max_year = 2030;
        assert_eq!(
            state.validate(&known, span),
            Err(FilterError::YearOutOfSpan {
                year: 2030,
                min: 1970,
                max: 2020,
            })
        );

        // An inverted range is within the domain; it simply selects nothing.
        state.min_year = 2015;
        state.max_year = 1990;
        assert_eq!(state.validate(&known, span), Ok(()));
    }
}
