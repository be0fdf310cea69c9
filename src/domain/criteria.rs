use std::collections::HashMap;
use std::fmt;

/// Allowed range for the `limit` query parameter. Requests outside the
/// range are clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub min: u32,
    pub max: u32,
}

impl Default for PageBounds {
    fn default() -> Self {
        PageBounds { min: 10, max: 50 }
    }
}

/// Whitelisted sort columns. Anything else degrades to `Title`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Category,
    Town,
    County,
    Postcode,
}

impl SortField {
    fn parse(value: &str) -> Option<SortField> {
        match value {
            "title" => Some(SortField::Title),
            "category" => Some(SortField::Category),
            "town" => Some(SortField::Town),
            "county" => Some(SortField::County),
            "postcode" => Some(SortField::Postcode),
            _ => None,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Category => "category",
            SortField::Town => "town",
            SortField::County => "county",
            SortField::Postcode => "postcode",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn parse(value: &str) -> SortDirection {
        if value.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        })
    }
}

/// Normalized search/filter/sort/page parameters.
///
/// Empty strings mean "filter not applied". All parsing is forgiving:
/// malformed numbers fall back to defaults, an unknown sort field falls
/// back to `title` ascending, and the page size is clamped into bounds.
/// Construction is deterministic, so the same raw input always produces
/// the same [`signature`](FilterCriteria::signature).
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub search_term: String,
    pub category: Option<i64>,
    pub town: String,
    pub county: String,
    pub postcode: String,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub page: u32,
    pub page_size: u32,
}

impl FilterCriteria {
    /// Criteria matching everything, first page, smallest page size.
    pub fn unfiltered(bounds: PageBounds) -> Self {
        FilterCriteria {
            search_term: String::new(),
            category: None,
            town: String::new(),
            county: String::new(),
            postcode: String::new(),
            sort_field: SortField::Title,
            sort_direction: SortDirection::Asc,
            page: 1,
            page_size: bounds.min,
        }
    }

    /// Builds criteria from decoded query parameters.
    pub fn from_query(params: &HashMap<String, String>, bounds: PageBounds) -> Self {
        let text = |key: &str| -> String {
            params
                .get(key)
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        let category = params
            .get("category")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|v| *v > 0);

        let page = params
            .get("page")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .map(|p| p.max(1))
            .unwrap_or(1);

        let page_size = params
            .get("limit")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(bounds.min)
            .clamp(bounds.min, bounds.max);

        // An unrecognized sort field degrades to title ascending; the
        // requested direction only applies to a valid field.
        let (sort_field, sort_direction) = match params.get("sortField").map(|v| v.trim()) {
            None | Some("") => (
                SortField::Title,
                SortDirection::parse(text("sortDirection").as_str()),
            ),
            Some(raw) => match SortField::parse(raw) {
                Some(field) => (field, SortDirection::parse(text("sortDirection").as_str())),
                None => (SortField::Title, SortDirection::Asc),
            },
        };

        FilterCriteria {
            search_term: text("searchTerm"),
            category,
            town: text("town"),
            county: text("county"),
            postcode: text("postcode"),
            sort_field,
            sort_direction,
            page,
            page_size,
        }
    }

    /// The criteria as query pairs, in a fixed order. Used both for the
    /// HTTP fetcher and for [`signature`](FilterCriteria::signature);
    /// `page` is deliberately excluded so a filter change can be told
    /// apart from plain page advancement.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("searchTerm", self.search_term.clone()),
            (
                "category",
                self.category.map(|c| c.to_string()).unwrap_or_default(),
            ),
            ("town", self.town.clone()),
            ("county", self.county.clone()),
            ("postcode", self.postcode.clone()),
            ("sortField", self.sort_field.to_string()),
            ("sortDirection", self.sort_direction.to_string()),
            ("limit", self.page_size.to_string()),
        ]
    }

    /// Deterministic serialization of every filter dimension except the
    /// page number. Two criteria with equal signatures produce identical
    /// predicates, ordering and page sizing.
    pub fn signature(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.to_query_pairs() {
            if !out.is_empty() {
                out.push('&');
            }
            out.push_str(key);
            out.push('=');
            out.push_str(&value);
        }
        out
    }
}
