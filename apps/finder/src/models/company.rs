#![allow(dead_code)]

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Visit status written on insert; nothing in this tool advances it.
pub const UNVISITED: &str = "unvisited";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Unchecked,
    Active,
    Dead,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Unchecked => "unchecked",
            LinkStatus::Active => "active",
            LinkStatus::Dead => "dead",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unchecked" => Ok(LinkStatus::Unchecked),
            "active" => Ok(LinkStatus::Active),
            "dead" => Ok(LinkStatus::Dead),
            other => Err(format!("unknown link status '{other}'")),
        }
    }
}

/// A row of the `companies` table. Slug is the natural key.
#[derive(Debug, Clone, FromRow)]
pub struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub url: String,
    /// Provider name the URL belongs to.
    pub source: String,
    pub status: String,
    pub visited: bool,
    pub link_status: String,
    pub created_at: DateTime<Utc>,
    pub checked_at: Option<DateTime<Utc>>,
}

impl CompanyRow {
    pub fn link_status(&self) -> Option<LinkStatus> {
        self.link_status.parse().ok()
    }
}

/// Fields for a single-row insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    pub name: String,
    pub slug: String,
    pub url: String,
    pub source: String,
    pub status: String,
    pub visited: bool,
    pub link_status: LinkStatus,
}

impl NewCompany {
    pub fn new(
        name: impl Into<String>,
        slug: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
        link_status: LinkStatus,
    ) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            url: url.into(),
            source: source.into(),
            status: UNVISITED.to_string(),
            visited: false,
            link_status,
        }
    }
}

/// Moves a record to a different board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub slug: String,
    pub url: String,
    pub source: String,
}

/// Update applied to an existing record, keyed by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkUpdate {
    pub link_status: LinkStatus,
    pub relocation: Option<Relocation>,
}

impl LinkUpdate {
    pub fn status(link_status: LinkStatus) -> Self {
        Self {
            link_status,
            relocation: None,
        }
    }

    pub fn relocate(relocation: Relocation) -> Self {
        Self {
            link_status: LinkStatus::Active,
            relocation: Some(relocation),
        }
    }
}
