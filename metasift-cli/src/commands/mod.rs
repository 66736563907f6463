pub(crate) mod config;
pub(crate) mod scrape;
pub(crate) mod sources;
