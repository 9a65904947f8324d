pub mod candle_aux_layers;
pub mod candle_data_loader;
pub mod candle_decoder_sigmoid;
pub mod candle_encoder_gaussian;
pub mod candle_inference;
pub mod candle_loss_functions;
pub mod candle_model_traits;
pub mod candle_optim;
pub mod candle_random;
pub mod candle_vae_inference;

pub use candle_core;
pub use candle_nn;
