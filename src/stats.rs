//! Basic YouTube channel statistics, printed to the console.
//!
//! Needs a YouTube Data API key: create one under "Credentials" in the Google
//! developer console and enable the "YouTube Data API" in its library.

use std::fmt;
use std::io::{BufRead, Write};
use std::time::Duration;

use log::debug;
use reqwest::Url;
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

pub const CHANNELS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/channels";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Legacy YouTube user name.
    Username,
    /// Channel id, `UC...`.
    ChannelId,
}

impl Lookup {
    fn query_key(self) -> &'static str {
        match self {
            Lookup::Username => "forUsername",
            Lookup::ChannelId => "id",
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct StatsConfig {
    pub key: Option<String>,
    pub lookup: Lookup,
    pub show_comments: bool,
    pub timeout: Duration,
    pub endpoint: String,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            key: None,
            lookup: Lookup::Username,
            show_comments: false,
            timeout: Duration::from_secs(10),
            endpoint: CHANNELS_ENDPOINT.to_string(),
        }
    }
}

// Keeps the API key out of logs.
impl fmt::Debug for StatsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsConfig")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("lookup", &self.lookup)
            .field("show_comments", &self.show_comments)
            .field("timeout", &self.timeout)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ChannelStats {
    #[serde(rename = "subscriberCount", deserialize_with = "count")]
    pub subscribers: u64,
    #[serde(rename = "viewCount", deserialize_with = "count")]
    pub views: u64,
    #[serde(rename = "commentCount", deserialize_with = "count", default)]
    pub comments: u64,
    #[serde(rename = "videoCount", deserialize_with = "count")]
    pub videos: u64,
}

#[derive(Deserialize)]
struct ChannelList {
    #[serde(default)]
    items: Vec<Channel>,
}

#[derive(Deserialize)]
struct Channel {
    statistics: ChannelStats,
}

/// The API sends counters as decimal strings; accept plain numbers too.
fn count<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Text(String),
        Number(u64),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("{s:?} is not a counter"))),
    }
}

/// Extract `items[0].statistics` from a channel list response body.
pub fn parse_response(body: &str) -> Result<ChannelStats> {
    let list: ChannelList = serde_json::from_str(body)?;
    list.items
        .into_iter()
        .next()
        .map(|channel| channel.statistics)
        .ok_or_else(|| Error::data_format("no channel found, the response has no items"))
}

pub fn request_url(config: &StatsConfig, name: &str, key: &str) -> Result<Url> {
    Url::parse_with_params(
        &config.endpoint,
        [
            ("part", "statistics"),
            (config.lookup.query_key(), name),
            ("key", key),
        ],
    )
    .map_err(|err| Error::config(format!("bad endpoint {}: {err}", config.endpoint)))
}

/// One blocking GET, bounded by `config.timeout`.
pub fn fetch(config: &StatsConfig, name: &str) -> Result<ChannelStats> {
    let key = config
        .key
        .as_deref()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| Error::config("no API key given, pass --key or set YOUTUBE_API_KEY"))?;
    let url = request_url(config, name, key)?;
    debug!("GET {} ({} {name:?})", config.endpoint, config.lookup.query_key());

    let client = reqwest::blocking::Client::builder()
        .timeout(config.timeout)
        .build()?;
    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status(status));
    }
    parse_response(&response.text()?)
}

pub fn write_report<W: Write>(
    out: &mut W,
    stats: &ChannelStats,
    show_comments: bool,
) -> Result<()> {
    writeln!(out, "    subscribers: {}", stats.subscribers)?;
    writeln!(out, "    views: {}", stats.views)?;
    if show_comments {
        writeln!(out, "    comments: {}", stats.comments)?;
    }
    writeln!(out, "    videos: {}", stats.videos)?;
    writeln!(out)?;
    Ok(())
}

/// Prompt for a channel name on `input`, echoing the prompt to `out`.
pub fn read_name<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<String> {
    writeln!(out)?;
    write!(out, "Enter username : ")?;
    out.flush()?;
    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|err| Error::config(format!("could not read a channel name: {err}")))?;
    let name = line.trim();
    if name.is_empty() {
        return Err(Error::config("no channel name given"));
    }
    Ok(name.to_string())
}

pub fn run<R: BufRead, W: Write>(config: &StatsConfig, input: &mut R, out: &mut W) -> Result<()> {
    let name = read_name(input, out)?;
    let stats = fetch(config, &name)?;
    write_report(out, &stats, config.show_comments)
}
