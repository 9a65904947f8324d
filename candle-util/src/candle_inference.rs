/// Training configuration for `Vae`
pub struct TrainConfig {
    pub learning_rate: f32,
    pub clip_norm: Option<f32>,
    pub batch_size: usize,
    pub num_epochs: usize,
    pub device: candle_core::Device,
    pub verbose: bool,
    pub show_progress: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            clip_norm: Some(1e-3),
            batch_size: 32,
            num_epochs: 50,
            device: candle_core::Device::Cpu,
            verbose: false,
            show_progress: true,
        }
    }
}
