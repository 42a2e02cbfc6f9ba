//! Category tabs and search over a fetched inbox page.
//!
//! The backend labels emails with free-form categories; these rules fold the
//! known aliases together and split the list into user-selected tabs plus a
//! leftover bucket for everything unclaimed.

use tern_core::Email;

pub const UNCATEGORIZED: &str = "Uncategorized";

/// The ten stock categories the UI seeds before any mail arrives.
pub const DEFAULT_CATEGORIES: [&str; 10] = [
    "Urgent / Action Required",
    "Work / Professional",
    "Personal",
    "Finance",
    "Newsletters & Subscriptions",
    "Social & Notifications",
    "Shopping & Orders",
    "Travel & Bookings",
    "Reference / Archives",
    "Scheduled",
];

/// Fold backend category aliases into display labels. Empty and "other"
/// both mean uncategorized; "gov" is a legacy label for work mail.
pub fn normalize_category(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("other") {
        return UNCATEGORIZED.to_string();
    }
    if trimmed.eq_ignore_ascii_case("gov") {
        return "Work/Professional".to_string();
    }
    trimmed.to_string()
}

/// Distinct normalized categories present in `emails`, sorted, with the
/// uncategorized bucket left out.
pub fn available_categories(emails: &[Email]) -> Vec<String> {
    let mut categories: Vec<String> = emails
        .iter()
        .map(|email| normalize_category(&email.category))
        .filter(|category| category != UNCATEGORIZED)
        .collect();
    categories.sort();
    categories.dedup();
    categories
}

/// Whether the leftover tab has anything to show: any email whose raw
/// trimmed label is outside the selected set. Raw on purpose, so aliased
/// labels stay visible in leftover until the user selects their alias.
pub fn has_leftover(emails: &[Email], selected: &[String]) -> bool {
    emails.iter().any(|email| {
        let raw = email.category.trim();
        !selected.iter().any(|category| category == raw)
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboxTab {
    /// Everything the selected categories do not claim.
    Leftover,
    Category(String),
}

/// Current tab and search state of the inbox list.
#[derive(Debug, Clone, Default)]
pub struct InboxFilter {
    pub selected_categories: Vec<String>,
    pub active_tab: Option<InboxTab>,
    pub search_term: String,
}

impl InboxFilter {
    /// Emails visible under the active tab, narrowed by the search term.
    pub fn apply<'a>(&self, emails: &'a [Email]) -> Vec<&'a Email> {
        emails
            .iter()
            .filter(|email| self.matches_tab(email) && self.matches_search(email))
            .collect()
    }

    fn matches_tab(&self, email: &Email) -> bool {
        let category = normalize_category(&email.category);
        match &self.active_tab {
            Some(InboxTab::Category(tab)) => category == *tab,
            // No tab behaves like leftover: with nothing selected every
            // email shows, otherwise only the unclaimed ones.
            Some(InboxTab::Leftover) | None => {
                self.selected_categories.is_empty()
                    || !self.selected_categories.contains(&category)
            }
        }
    }

    fn matches_search(&self, email: &Email) -> bool {
        let term = self.search_term.to_lowercase();
        email.subject.to_lowercase().contains(&term)
            || email.body.to_lowercase().contains(&term)
            || email.sender.to_lowercase().contains(&term)
    }
}
