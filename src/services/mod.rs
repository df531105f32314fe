pub mod aggregator;
pub mod enhancement;
pub mod identifiers;
pub mod prompts;
pub mod providers;
pub mod reducer;
pub mod resolver;
pub mod scoring;
pub mod title_search;

pub use aggregator::{AggregatorConfig, RevealGranularity, StreamAggregator};
pub use enhancement::EnhancementService;
pub use identifiers::IdentifierLookup;
pub use resolver::{CandidateResolver, ResolverConfig};
