pub mod etl;
pub mod geodesic;
pub mod input;
pub mod output;
pub mod pairs;
pub mod pipeline;
pub mod reference;
pub mod resolver;

pub use crate::domain::model::{ExtractedData, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
