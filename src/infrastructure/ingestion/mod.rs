//! Document acquisition and clause segmentation implementations

mod fetcher;
mod segmenter;

pub use fetcher::HttpFetcher;
pub use segmenter::RegexSegmenter;
