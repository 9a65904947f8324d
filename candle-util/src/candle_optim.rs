use candle_core::{Result, Tensor, Var};
use candle_nn::{AdamW, Optimizer, ParamsAdamW};

/// Adam with per-parameter gradient norm clipping: each gradient
/// `g` is rescaled to `g * clip / max(|g|, clip)` before the update.
pub struct ClippedAdam {
    adam: AdamW,
    vars: Vec<Var>,
    clip_norm: Option<f64>,
}

impl ClippedAdam {
    /// * `vars` - trainable variables
    /// * `learning_rate` - step size
    /// * `clip_norm` - maximum L2 norm of each variable's gradient
    pub fn new(vars: Vec<Var>, learning_rate: f64, clip_norm: Option<f64>) -> Result<Self> {
        let params = ParamsAdamW {
            lr: learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-7,
            weight_decay: 0.0,
        };
        let adam = AdamW::new(vars.clone(), params)?;
        Ok(Self {
            adam,
            vars,
            clip_norm,
        })
    }

    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        let mut grads = loss.backward()?;

        if let Some(clip) = self.clip_norm {
            for var in self.vars.iter() {
                let clipped = match grads.get(var.as_tensor()) {
                    Some(g) => {
                        let norm = g.sqr()?.sum_all()?.to_scalar::<f32>()?.sqrt() as f64;
                        if norm > clip {
                            Some(g.affine(clip / norm, 0.)?)
                        } else {
                            None
                        }
                    }
                    None => None,
                };
                if let Some(g) = clipped {
                    grads.insert(var.as_tensor(), g);
                }
            }
        }

        self.adam.step(&grads)
    }
}
