pub mod types;
pub mod traits;
pub mod utils;
pub mod config;
pub mod fetcher;
pub mod parser;
pub mod images;
pub mod summarizer;
pub mod aggregator;
pub mod template;
pub mod renderer;
pub mod writer;
pub mod pipeline;

pub use types::*;
pub use traits::FetchFeed;
pub use config::SiteInputs;
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use summarizer::Summarizer;
pub use aggregator::Aggregator;
pub use template::{Fragment, Slots, Template};
pub use renderer::{PageRenderer, RenderedPage, TemplateSet};
pub use writer::SiteWriter;
pub use pipeline::BuildPipeline;
