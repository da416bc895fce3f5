pub mod decoder;
pub mod images;
pub mod pipeline;
pub mod presentation;
pub mod providers;
pub mod ranking;

pub use decoder::decode_envelope;
pub use images::{ensure_public_host, fetch_image, fetch_image_bytes, FetchedImage};
pub use pipeline::FetchPipeline;
pub use presentation::{PresentationContext, PresentationHandle, RecommendationsConsumer};
pub use providers::{HttpSource, RecommendationSource};
pub use ranking::{rank_and_filter, DEFAULT_LIMIT};
