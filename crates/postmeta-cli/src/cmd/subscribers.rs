//! Subscribers subcommand - print the resolved newsletter subscriber count

use anyhow::Result;
use postmeta_feed::SubscriberConfig;

use crate::config::Config;

pub fn run(config: &Config) -> Result<()> {
    let sub_config = SubscriberConfig {
        page_url: config.subscribers.page_url.clone(),
        session_cookie: config.subscribers.session_cookie.clone(),
        cache_file: config.subscribers.cache_file.clone(),
        default: config.subscribers.default,
    };
    let resolved = postmeta_feed::resolve_subscriber_count(&sub_config)?;

    // stdout carries only the number so scripts can capture it
    println!("{}", resolved.value);
    eprintln!("(from {})", resolved.strategy);
    Ok(())
}
