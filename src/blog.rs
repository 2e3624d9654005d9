//! Blog categories, posts and the lookups the site pages need

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of related posts shown under an article
pub const RELATED_LIMIT: usize = 3;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Calendar date of a post, written `YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublishDate {
    year: u16,
    month: u8,
    day: u8,
}

impl PublishDate {
    pub fn new(year: u16, month: u8, day: u8) -> Result<Self, String> {
        if !(1..=12).contains(&month) {
            return Err(format!("month {month} is out of range"));
        }
        if day == 0 || day > days_in_month(year, month) {
            return Err(format!("day {day} is out of range for {year}-{month:02}"));
        }
        Ok(Self { year, month, day })
    }

    /// Long US English form, e.g. "January 15, 2024"
    pub fn long_form(&self) -> String {
        format!(
            "{} {}, {}",
            MONTHS[usize::from(self.month - 1)],
            self.day,
            self.year
        )
    }
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

impl FromStr for PublishDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid date '{s}', expected YYYY-MM-DD");
        let mut parts = s.trim().splitn(3, '-');
        let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        if year.len() != 4 || month.len() != 2 || day.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        let day = day.parse().map_err(|_| invalid())?;
        PublishDate::new(year, month, day)
    }
}

impl TryFrom<String> for PublishDate {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PublishDate> for String {
    fn from(date: PublishDate) -> Self {
        date.to_string()
    }
}

impl fmt::Display for PublishDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogCategory {
    pub id: String,
    pub name: String,
    /// URL segment; posts refer to their category by this value
    pub slug: String,
    pub description: String,
    /// CSS color, e.g. `#f7df1e`
    pub color: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub slug: String,
    /// Slug of the owning category
    pub category: String,
    pub author: String,
    pub publish_date: PublishDate,
    pub description: String,
    /// Markdown body
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Estimated reading time in minutes
    pub read_time: u32,
    #[serde(default)]
    pub featured: bool,
}

impl BlogPost {
    /// "January 15, 2024"
    pub fn formatted_date(&self) -> String {
        self.publish_date.long_form()
    }
}

/// All categories and posts, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    #[serde(default)]
    pub categories: Vec<BlogCategory>,
    #[serde(default)]
    pub posts: Vec<BlogPost>,
}

impl Blog {
    pub fn category(&self, slug: &str) -> Option<&BlogCategory> {
        self.categories.iter().find(|category| category.slug == slug)
    }

    /// Posts of one category, in source order
    pub fn posts_in_category(&self, slug: &str) -> Vec<&BlogPost> {
        self.posts.iter().filter(|post| post.category == slug).collect()
    }

    pub fn post(&self, category: &str, slug: &str) -> Option<&BlogPost> {
        self.posts
            .iter()
            .find(|post| post.category == category && post.slug == slug)
    }

    pub fn featured(&self) -> Vec<&BlogPost> {
        self.posts.iter().filter(|post| post.featured).collect()
    }

    /// Every post, newest first; posts sharing a date keep source order
    pub fn all_by_date(&self) -> Vec<&BlogPost> {
        let mut posts: Vec<&BlogPost> = self.posts.iter().collect();
        posts.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
        posts
    }

    /// Other posts in the same category, at most `limit`
    pub fn related(&self, post: &BlogPost, limit: usize) -> Vec<&BlogPost> {
        self.posts
            .iter()
            .filter(|other| other.category == post.category && other.slug != post.slug)
            .take(limit)
            .collect()
    }

    /// Check that posts point at known categories and are uniquely addressable
    pub fn validate(&self) -> Result<(), String> {
        for post in &self.posts {
            if self.category(&post.category).is_none() {
                return Err(format!(
                    "post '{}' refers to unknown category '{}'",
                    post.id, post.category
                ));
            }
            let addressed = self
                .posts
                .iter()
                .filter(|other| other.category == post.category && other.slug == post.slug)
                .count();
            if addressed > 1 {
                return Err(format!(
                    "more than one post at /blog/{}/{}",
                    post.category, post.slug
                ));
            }
        }
        Ok(())
    }
}
