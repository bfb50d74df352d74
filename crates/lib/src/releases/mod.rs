//! Chrome release lookup via the version history API.
//!
//! Used to decide which versions need packaging: the latest release on each
//! channel, filtered to those that started serving recently, or a specific
//! version located across channels.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::consts::{TARGET_OS, VERSION_HISTORY_URL};

/// Filter that restricts a release listing to releases still being served.
const CURRENTLY_SERVING: &str = "endtime=1970-01-01T00:00:00Z";

#[derive(Debug, Error)]
pub enum ReleaseError {
  #[error("request to {url} failed: {source}")]
  Http {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("request to {url} returned HTTP {status}")]
  Status { url: String, status: u16 },

  #[error("no releases listed for the {0} channel")]
  NoReleases(Channel),

  #[error("version {0} not found on any channel")]
  VersionNotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
  Stable,
  Beta,
  Dev,
}

impl Channel {
  /// Search order when locating a version.
  pub const ALL: [Channel; 3] = [Channel::Stable, Channel::Beta, Channel::Dev];

  pub fn as_str(self) -> &'static str {
    match self {
      Channel::Stable => "stable",
      Channel::Beta => "beta",
      Channel::Dev => "dev",
    }
  }
}

impl fmt::Display for Channel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Channel {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "stable" => Ok(Channel::Stable),
      "beta" => Ok(Channel::Beta),
      "dev" => Ok(Channel::Dev),
      other => Err(format!("unknown channel '{}' (expected stable, beta or dev)", other)),
    }
  }
}

/// A release as seen on a particular channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
  pub version: String,
  pub channel: Channel,
  pub started_at: DateTime<Utc>,
}

impl Release {
  /// Human-readable serving start, e.g. `November 05, 2024 at 06:08 UTC`.
  pub fn started_at_display(&self) -> String {
    self.started_at.format("%B %d, %Y at %I:%M UTC").to_string()
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReleasesPage {
  #[serde(default)]
  releases: Vec<ApiRelease>,
  #[serde(default)]
  next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiRelease {
  version: String,
  serving: Serving,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Serving {
  start_time: DateTime<Utc>,
}

/// Client for `versionhistory.googleapis.com`.
#[derive(Debug, Clone)]
pub struct ReleaseClient {
  http: reqwest::Client,
  base_url: String,
  platform: String,
}

impl Default for ReleaseClient {
  fn default() -> Self {
    Self::new(VERSION_HISTORY_URL)
  }
}

impl ReleaseClient {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      http: reqwest::Client::new(),
      base_url: base_url.into().trim_end_matches('/').to_string(),
      platform: TARGET_OS.to_string(),
    }
  }

  fn releases_url(&self, channel: Channel) -> String {
    format!(
      "{}/{}/channels/{}/versions/all/releases",
      self.base_url, self.platform, channel
    )
  }

  async fn fetch_page(&self, url: &str, query: &[(&str, &str)]) -> Result<ReleasesPage, ReleaseError> {
    debug!(url, ?query, "fetching releases");
    let response = self
      .http
      .get(url)
      .query(query)
      .send()
      .await
      .map_err(|source| ReleaseError::Http {
        url: url.to_string(),
        source: source.without_url(),
      })?;

    if !response.status().is_success() {
      return Err(ReleaseError::Status {
        url: url.to_string(),
        status: response.status().as_u16(),
      });
    }

    response.json().await.map_err(|source| ReleaseError::Http {
      url: url.to_string(),
      source: source.without_url(),
    })
  }

  /// The newest release currently served on `channel`.
  pub async fn latest(&self, channel: Channel) -> Result<Release, ReleaseError> {
    let url = self.releases_url(channel);
    let page = self.fetch_page(&url, &[("filter", CURRENTLY_SERVING)]).await?;
    page
      .releases
      .into_iter()
      .next()
      .map(|r| Release {
        version: r.version,
        channel,
        started_at: r.serving.start_time,
      })
      .ok_or(ReleaseError::NoReleases(channel))
  }

  /// Every release ever published on `channel`, newest first.
  pub async fn history(&self, channel: Channel) -> Result<Vec<Release>, ReleaseError> {
    let url = self.releases_url(channel);
    let mut releases = Vec::new();
    let mut token: Option<String> = None;

    loop {
      let page = match &token {
        Some(t) => self.fetch_page(&url, &[("pageToken", t.as_str())]).await?,
        None => self.fetch_page(&url, &[]).await?,
      };
      releases.extend(page.releases.into_iter().map(|r| Release {
        version: r.version,
        channel,
        started_at: r.serving.start_time,
      }));

      match page.next_page_token.filter(|t| !t.is_empty()) {
        Some(next) => token = Some(next),
        None => break,
      }
    }

    Ok(releases)
  }

  /// Locate `version`, searching channels in [`Channel::ALL`] order.
  pub async fn find(&self, version: &str) -> Result<Release, ReleaseError> {
    for channel in Channel::ALL {
      if let Some(release) = self
        .history(channel)
        .await?
        .into_iter()
        .find(|r| r.version == version)
      {
        return Ok(release);
      }
    }
    Err(ReleaseError::VersionNotFound(version.to_string()))
  }

  /// [`ReleaseClient::recent`] measured from the current time.
  pub async fn recent_from_now(&self, channels: &[Channel], window: Duration) -> Result<Vec<Release>, ReleaseError> {
    self.recent(channels, window, Utc::now()).await
  }

  /// Latest release per channel that started serving within `window` of `now`.
  pub async fn recent(
    &self,
    channels: &[Channel],
    window: Duration,
    now: DateTime<Utc>,
  ) -> Result<Vec<Release>, ReleaseError> {
    let cutoff = chrono::Duration::from_std(window)
      .ok()
      .and_then(|w| now.checked_sub_signed(w))
      .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut recent = Vec::new();
    for &channel in channels {
      let release = self.latest(channel).await?;
      if release.started_at > cutoff {
        recent.push(release);
      } else {
        debug!(channel = %channel, version = %release.version, "release outside window");
      }
    }
    Ok(recent)
  }
}
