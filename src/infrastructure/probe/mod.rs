pub mod http;

pub use http::{AssetProbe, HttpAssetProbe, ProbeError};
