//! Derived projection of the user list.
//!
//! Nothing here is stored: [`derive_view`] recomputes the filtered list and the statistics
//! from the current list and filter each time it is called.

use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

use crate::model::{Gender, User};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Backend order.
    #[default]
    None,
    Names,
    Age,
}

impl SortKey {
    pub const ALL: [Self; 3] = [Self::None, Self::Names, Self::Age];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Names => "names",
            Self::Age => "age",
        }
    }

    fn compare(self, a: &User, b: &User) -> Ordering {
        match self {
            Self::None => Ordering::Equal,
            Self::Names => a.names.to_lowercase().cmp(&b.names.to_lowercase()),
            Self::Age => a.age.cmp(&b.age),
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown sort key '{s}', expected none, names or age"))
    }
}

/// Search term, gender filter and sort key as entered by the admin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub search: String,
    pub gender: Option<Gender>,
    pub sort: SortKey,
}

impl UserFilter {
    /// Case-insensitive substring match on names, residence or guardian, intersected with
    /// the gender filter. The term is used as typed, surrounding whitespace included.
    pub fn matches(&self, user: &User) -> bool {
        self.matches_search(user) && self.gender.is_none_or(|g| user.gender == g)
    }

    fn matches_search(&self, user: &User) -> bool {
        let needle = self.search.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&user.names, &user.residence, &user.guardian]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.gender.is_some()
    }
}

/// Aggregate counts over the whole list, independent of the filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
    pub total: usize,
    pub male: usize,
    pub female: usize,
    pub other: usize,
    /// Rounded to the nearest whole year; zero for an empty list.
    pub average_age: u32,
}

impl UserStats {
    pub fn from_users(users: &[User]) -> Self {
        let mut stats = Self {
            total: users.len(),
            ..Self::default()
        };
        let mut age_sum: u64 = 0;
        for user in users {
            age_sum += u64::from(user.age);
            match user.gender {
                Gender::Male => stats.male += 1,
                Gender::Female => stats.female += 1,
                Gender::Other => stats.other += 1,
            }
        }
        let total = users.len() as u64;
        if total > 0 {
            // Half rounds up.
            let rounded = (age_sum * 2 + total) / (total * 2);
            stats.average_age = u32::try_from(rounded).unwrap_or(u32::MAX);
        }
        stats
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedView<'a> {
    pub users: Vec<&'a User>,
    pub stats: UserStats,
}

pub fn derive_view<'a>(users: &'a [User], filter: &UserFilter) -> DerivedView<'a> {
    let mut visible: Vec<&User> = users.iter().filter(|u| filter.matches(u)).collect();
    if filter.sort != SortKey::None {
        // Stable, so ties keep backend order.
        visible.sort_by(|a, b| filter.sort.compare(a, b));
    }
    DerivedView {
        users: visible,
        stats: UserStats::from_users(users),
    }
}
