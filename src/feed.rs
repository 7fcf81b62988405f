use crate::models::ScrapedItem;
use chrono::{DateTime, Utc};
use rss::{Channel, Enclosure, Guid, Item};

/// Render scraped items as an RSS 2.0 document.
///
/// Items without a parsed date are stamped with the build time.
pub fn render_feed(items: &[ScrapedItem], feed_url: &str) -> String {
    let now = Utc::now();

    let mut channel = Channel::default();
    channel.set_title(format!("Feed: {}", feed_url));
    channel.set_link(feed_url.to_string());
    channel.set_description(format!("Custom RSS feed for {}", feed_url));
    channel.set_language(Some("en".to_string()));
    channel.set_last_build_date(Some(now.to_rfc2822()));
    channel.set_generator(Some(format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))));
    channel.set_items(items.iter().map(|item| to_rss_item(item, now)).collect::<Vec<_>>());

    channel.to_string()
}

fn to_rss_item(item: &ScrapedItem, now: DateTime<Utc>) -> Item {
    let mut entry = Item::default();
    entry.set_title(Some(item.title.clone()));
    entry.set_link(Some(item.link.clone()));

    let mut guid = Guid::default();
    guid.set_value(item.link.clone());
    guid.set_permalink(true);
    entry.set_guid(Some(guid));

    if let Some(description) = &item.description {
        entry.set_description(Some(description.clone()));
    }

    if let Some(image) = &item.image {
        let mut enclosure = Enclosure::default();
        enclosure.set_url(image.clone());
        enclosure.set_length("0".to_string());
        enclosure.set_mime_type(image_mime_type(image).to_string());
        entry.set_enclosure(Some(enclosure));
    }

    entry.set_pub_date(Some(item.published.unwrap_or(now).to_rfc2822()));
    entry
}

/// Guess an image MIME type from the URL path
fn image_mime_type(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
    match path.rsplit('.').next() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        _ => "image/jpeg",
    }
}
