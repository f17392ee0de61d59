//! Resource collections managed from the dashboard.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A backend collection exposed as `BASE_URL/<path>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    /// Fundraising campaigns
    Campaigns,
    /// Projects
    Projects,
    /// Sponsorships
    Sponsorships,
    /// Documentation media (photo and video galleries)
    Documentation,
    /// Messages shown on the public site
    Messages,
    /// User accounts
    Users,
}

impl Resource {
    /// Returns the endpoint path of the collection.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Campaigns => "campaigns",
            Self::Projects => "projects",
            Self::Sponsorships => "sponsorships",
            Self::Documentation => "documentation",
            Self::Messages => "messages",
            Self::Users => "users",
        }
    }

    /// Returns all resources.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Campaigns,
            Self::Projects,
            Self::Sponsorships,
            Self::Documentation,
            Self::Messages,
            Self::Users,
        ]
    }

    /// Whether entries of this resource usually carry image or video uploads.
    #[must_use]
    pub const fn accepts_media(&self) -> bool {
        !matches!(self, Self::Messages | Self::Users)
    }
}

impl FromStr for Resource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().trim_matches('/').to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|resource| resource.path() == wanted)
            .ok_or_else(|| Error::InvalidEndpoint(format!("Unknown resource: {s}")))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl AsRef<str> for Resource {
    fn as_ref(&self) -> &str {
        self.path()
    }
}
