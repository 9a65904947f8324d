use candle_core::{Result, Tensor};
use candle_nn::{Activation, Linear, Module, VarBuilder};

/// build a stack of alternating `M` and `A` layers
pub struct StackLayers<M>
where
    M: Module,
{
    module_layers: Vec<M>,
    activation_layers: Vec<Option<Activation>>,
    out_dim: Option<usize>,
}

impl<M> Module for StackLayers<M>
where
    M: Module,
{
    fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let mut x = input.clone();
        for (module, activation) in self.module_layers.iter().zip(self.activation_layers.iter()) {
            x = module.forward(&x)?;
            if let Some(activation) = activation {
                x = activation.forward(&x)?;
            }
        }
        Ok(x)
    }
}

impl<M> StackLayers<M>
where
    M: Module,
{
    pub fn new() -> Self {
        Self {
            module_layers: Vec::new(),
            activation_layers: Vec::new(),
            out_dim: None,
        }
    }

    /// Appends a layer after all the current layers.
    pub fn push_with_act(&mut self, layer: M, activation: Activation, out_dim: usize) {
        self.module_layers.push(layer);
        self.activation_layers.push(Some(activation));
        self.out_dim = Some(out_dim);
    }

    /// output dimension of the last layer, if any
    pub fn out_dim(&self) -> Option<usize> {
        self.out_dim
    }
}

impl<M> Default for StackLayers<M>
where
    M: Module,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Fully connected `Linear` + ReLU layers
///
/// * `in_dim` - input dimension
/// * `layers` - output dimension of each layer
/// * `vs` - variable builder; layer `j` lives under `{prefix}.{j}`
///
pub fn relu_stack(
    in_dim: usize,
    layers: &[usize],
    prefix: &str,
    vs: &VarBuilder,
) -> Result<StackLayers<Linear>> {
    let mut fc = StackLayers::<Linear>::new();
    let mut prev_dim = in_dim;
    for (j, &next_dim) in layers.iter().enumerate() {
        let name = format!("{}.{}", prefix, j);
        fc.push_with_act(
            candle_nn::linear(prev_dim, next_dim, vs.pp(name))?,
            Activation::Relu,
            next_dim,
        );
        prev_dim = next_dim;
    }
    Ok(fc)
}
