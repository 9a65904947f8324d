use crate::traits::{ConvertMatOps, MatOps};
use candle_util::candle_core::{DType, Device, Tensor};
use ndarray::parallel::prelude::*;
use ndarray::prelude::*;

impl ConvertMatOps for Array2<f32> {
    type Mat = Self;
    type Scalar = f32;

    fn from_tensor(tensor: &Tensor) -> anyhow::Result<Self::Mat> {
        let (nrow, ncol) = tensor.dims2()?;
        let data = tensor
            .to_device(&Device::Cpu)?
            .to_dtype(DType::F32)?
            .flatten_all()?
            .to_vec1::<f32>()?;
        Ok(Array2::from_shape_vec((nrow, ncol), data)?)
    }

    fn to_tensor(&self, dev: &Device) -> anyhow::Result<Tensor> {
        let (nrow, ncol) = self.dim();
        let data: Vec<f32> = self.iter().copied().collect();
        Ok(Tensor::from_vec(data, (nrow, ncol), dev)?)
    }
}

impl MatOps for Array2<f32> {
    type Mat = Self;
    type Scalar = f32;

    fn any_negative(&self) -> bool {
        self.iter().any(|&x| x < 0.)
    }

    fn all_finite(&self) -> bool {
        self.iter().all(|x| x.is_finite())
    }

    fn log2_1p_inplace(&mut self) {
        self.par_mapv_inplace(|x| (1. + x).log2());
    }

    fn minmax_rows_inplace(&mut self, eps: f32) {
        self.axis_iter_mut(Axis(0))
            .into_par_iter()
            .for_each(|mut row| {
                let lb = row.iter().copied().fold(f32::INFINITY, f32::min);
                let ub = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                let denom = ub - lb + eps;
                row.mapv_inplace(|x| (x - lb) / denom);
            });
    }

    fn finite_or_zero_inplace(&mut self) -> usize {
        let mut nreplaced = 0;
        self.iter_mut().filter(|x| !x.is_finite()).for_each(|x| {
            *x = 0.;
            nreplaced += 1;
        });
        nreplaced
    }

    fn concatenate_columns(mats: &[&Self::Mat]) -> anyhow::Result<Self::Mat> {
        let views: Vec<ArrayView2<f32>> = mats.iter().map(|m| m.view()).collect();
        Ok(ndarray::concatenate(Axis(1), &views)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tensor_round_trip_keeps_layout() -> anyhow::Result<()> {
        let x = array![[1f32, 2., 3.], [4., 5., 6.]];
        let xt = x.t().to_owned();
        let t = xt.to_tensor(&Device::Cpu)?;
        assert_eq!(t.dims(), &[3, 2]);
        let back = Array2::<f32>::from_tensor(&t)?;
        assert_eq!(back, xt);
        Ok(())
    }

    #[test]
    fn concatenate_side_by_side() -> anyhow::Result<()> {
        let a = array![[1f32], [2.]];
        let b = array![[3f32, 4.], [5., 6.]];
        let ab = Array2::<f32>::concatenate_columns(&[&a, &b])?;
        assert_eq!(ab, array![[1f32, 3., 4.], [2., 5., 6.]]);
        assert!(Array2::<f32>::concatenate_columns(&[&a, &array![[1f32]]]).is_err());
        Ok(())
    }
}
