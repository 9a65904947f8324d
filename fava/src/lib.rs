pub mod fava_common;
pub mod fava_input;
pub mod fava_output;
pub mod fit_fava;
pub mod fit_vae;
pub mod latent_dims;
pub mod pair_filter;
pub mod pair_similarity;
pub mod routines_pre_process;
