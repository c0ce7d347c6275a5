mod extractor;
mod headless;
mod page_scrape;
mod rest_lookup;

pub use extractor::ExtractorStrategy;
pub use headless::HeadlessStrategy;
pub use page_scrape::PageScrapeStrategy;
pub use rest_lookup::RestLookupStrategy;
