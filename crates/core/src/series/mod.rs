pub mod aggregate;
pub mod downsample;

pub use aggregate::{AggregateError, aggregate, clip_series, peak, window_series};
pub use downsample::{DEFAULT_DOWNSAMPLE_FACTOR, DownsampleError, downsample, downsample_with_factor};
