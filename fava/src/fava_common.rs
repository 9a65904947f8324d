pub use log::{info, warn};

pub type Mat = ndarray::Array2<f32>;

pub use candle_util::{candle_core, candle_nn};
