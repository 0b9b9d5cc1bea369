mod rss_fetcher;

pub use rss_fetcher::RssFeedFetcher;
