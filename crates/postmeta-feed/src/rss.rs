//! Medium RSS 2.0 parser using quick-xml

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use quick_xml::events::Event;
use quick_xml::Reader;

/// One `<item>` of the feed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub guid: String,
    /// RFC 2822 as published.
    pub pub_date: String,
    pub author: String,
    pub categories: Vec<String>,
    /// `content:encoded` HTML.
    pub content: String,
}

impl FeedItem {
    pub fn published(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc2822(self.pub_date.trim()).ok()
    }
}

/// Parse all items of an RSS document.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"item" => {
                let item = parse_item(&mut reader)
                    .with_context(|| format!("feed item {}", items.len() + 1))?;
                items.push(item);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e).context("XML parse error"),
            _ => {}
        }
        buf.clear();
    }

    log::debug!("parsed {} feed items", items.len());
    Ok(items)
}

fn parse_item(reader: &mut Reader<&[u8]>) -> Result<FeedItem> {
    let mut item = FeedItem::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"title" => item.title = read_text(reader)?,
                b"link" => item.link = read_text(reader)?,
                b"guid" => item.guid = read_text(reader)?,
                b"pubDate" => item.pub_date = read_text(reader)?,
                b"dc:creator" => item.author = read_text(reader)?,
                b"category" => {
                    let category = read_text(reader)?;
                    if !category.is_empty() {
                        item.categories.push(category);
                    }
                }
                b"content:encoded" => item.content = read_text(reader)?,
                _ => {
                    // Skip unknown subtrees
                    read_text(reader)?;
                }
            },
            Event::End(e) if e.name().as_ref() == b"item" => break,
            Event::Eof => anyhow::bail!("unexpected end of feed inside <item>"),
            _ => {}
        }
        buf.clear();
    }

    Ok(item)
}

/// Read text and CDATA content until the matching end tag.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::End(_) => break,
            Event::Start(_) => {
                text.push_str(&read_text(reader)?);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text.trim().to_string())
}
