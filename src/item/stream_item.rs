use serde::{Deserialize, Serialize};

/// Structured author block some feeds carry next to (or instead of) a plain
/// author string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorDetail {
    pub name: Option<String>,
    pub email: Option<String>,
    pub href: Option<String>,
}

/// Read-only view of one feed entry.
///
/// Every field is optional; a sparse entry is valid input everywhere in the
/// crate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamItem {
    pub id: Option<String>,
    pub guid: Option<String>,
    pub link: Option<String>,
    pub author: Option<String>,
    pub author_detail: Option<AuthorDetail>,
    pub dc_creator: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
}

impl StreamItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_author_detail_name(mut self, name: impl Into<String>) -> Self {
        self.author_detail = Some(AuthorDetail {
            name: Some(name.into()),
            ..AuthorDetail::default()
        });
        self
    }

    pub fn with_dc_creator(mut self, creator: impl Into<String>) -> Self {
        self.dc_creator = Some(creator.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Author string used for identity: `author`, then `author_detail.name`,
    /// then `dc_creator`. Empty strings are skipped.
    pub fn author_source(&self) -> Option<&str> {
        let detail_name = self
            .author_detail
            .as_ref()
            .and_then(|detail| detail.name.as_deref());

        [self.author.as_deref(), detail_name, self.dc_creator.as_deref()]
            .into_iter()
            .flatten()
            .find(|candidate| !candidate.is_empty())
    }

    /// Link if present and not blank.
    pub fn usable_link(&self) -> Option<&str> {
        self.link.as_deref().filter(|link| !link.trim().is_empty())
    }
}
