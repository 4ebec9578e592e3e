// ============================================================
// Layer 5 — Adadelta Optimizer
// ============================================================
// Burn ships SGD, Adam, AdamW, AdaGrad and RMSProp but not
// Adadelta, so it is provided here as a SimpleOptimizer and
// wrapped in Burn's OptimizerAdaptor like the built-in ones.
//
// Per parameter, with decay ρ and stability term ε:
//   E[g²]  = ρ·E[g²]  + (1-ρ)·g²
//   Δ      = g · √(E[Δ²] + ε) / √(E[g²] + ε)
//   θ      = θ - lr·Δ
//   E[Δ²]  = ρ·E[Δ²]  + (1-ρ)·Δ²
//
// Zeiler (2012), ADADELTA: An Adaptive Learning Rate Method.

use burn::{
    module::AutodiffModule,
    optim::{adaptor::OptimizerAdaptor, SimpleOptimizer},
    prelude::*,
    record::Record,
    tensor::backend::AutodiffBackend,
};

/// Adadelta is usually run with a learning rate of 1.0.
pub const ADADELTA_LEARNING_RATE: f64 = 1.0;

#[derive(Config, Debug)]
pub struct AdadeltaConfig {
    /// Decay of the running averages
    #[config(default = 0.95)]
    pub rho: f32,
    /// Added under both square roots
    #[config(default = 1e-8)]
    pub epsilon: f32,
}

#[derive(Clone, Debug)]
pub struct Adadelta {
    rho:     f32,
    epsilon: f32,
}

/// Running averages kept for one parameter tensor.
#[derive(Record, Clone)]
pub struct AdadeltaState<B: Backend, const D: usize> {
    /// E[g²]
    pub square_avg: Tensor<B, D>,
    /// E[Δ²]
    pub acc_delta: Tensor<B, D>,
}

impl<B: Backend> SimpleOptimizer<B> for Adadelta {
    type State<const D: usize> = AdadeltaState<B, D>;

    fn step<const D: usize>(
        &self,
        lr: f64,
        tensor: Tensor<B, D>,
        grad: Tensor<B, D>,
        state: Option<Self::State<D>>,
    ) -> (Tensor<B, D>, Option<Self::State<D>>) {
        let (square_avg, acc_delta) = match state {
            Some(state) => (state.square_avg, state.acc_delta),
            None => (grad.zeros_like(), grad.zeros_like()),
        };
        let decay = 1.0 - self.rho;

        let square_avg = square_avg
            .mul_scalar(self.rho)
            .add(grad.clone().powi_scalar(2).mul_scalar(decay));

        let delta = acc_delta
            .clone()
            .add_scalar(self.epsilon)
            .sqrt()
            .div(square_avg.clone().add_scalar(self.epsilon).sqrt())
            .mul(grad);

        let acc_delta = acc_delta
            .mul_scalar(self.rho)
            .add(delta.clone().powi_scalar(2).mul_scalar(decay));

        let tensor = tensor.sub(delta.mul_scalar(lr));

        (tensor, Some(AdadeltaState { square_avg, acc_delta }))
    }

    fn to_device<const D: usize>(mut state: Self::State<D>, device: &B::Device) -> Self::State<D> {
        state.square_avg = state.square_avg.to_device(device);
        state.acc_delta  = state.acc_delta.to_device(device);
        state
    }
}

impl AdadeltaConfig {
    /// Build an optimizer usable with `Optimizer::step` on module `M`.
    pub fn init<B: AutodiffBackend, M: AutodiffModule<B>>(&self) -> OptimizerAdaptor<Adadelta, M, B> {
        OptimizerAdaptor::from(Adadelta {
            rho:     self.rho,
            epsilon: self.epsilon,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::nn::{Linear, LinearConfig};
    use burn::optim::{GradientsParams, Optimizer};

    type TestBackend = NdArray<f32>;

    fn values(t: Tensor<TestBackend, 1>) -> Vec<f32> {
        t.into_data().to_vec::<f32>().unwrap()
    }

    /// Plain-float version of the update, for one scalar parameter
    fn reference_step(theta: f32, g: f32, sq: f32, acc: f32, rho: f32, eps: f32) -> (f32, f32, f32) {
        let sq    = rho * sq + (1.0 - rho) * g * g;
        let delta = ((acc + eps).sqrt() / (sq + eps).sqrt()) * g;
        let acc   = rho * acc + (1.0 - rho) * delta * delta;
        (theta - delta, sq, acc)
    }

    #[test]
    fn test_two_steps_match_reference() {
        let device = Default::default();
        let optim  = Adadelta { rho: 0.9, epsilon: 1e-3 };

        let theta = [1.0f32, -2.0, 0.5];
        let grad  = [0.5f32, -1.0, 0.0];

        let tensor = Tensor::<TestBackend, 1>::from_floats(theta, &device);
        let g      = Tensor::<TestBackend, 1>::from_floats(grad, &device);

        let (tensor, state) = optim.step(1.0, tensor, g.clone(), None);
        let (tensor, state) = optim.step(1.0, tensor, g, state);
        assert!(state.is_some());

        let got = values(tensor);
        for i in 0..3 {
            let (t1, sq, acc) = reference_step(theta[i], grad[i], 0.0, 0.0, 0.9, 1e-3);
            let (t2, _, _)    = reference_step(t1, grad[i], sq, acc, 0.9, 1e-3);
            assert!((got[i] - t2).abs() < 1e-5, "index {i}: {} vs {}", got[i], t2);
        }
    }

    #[test]
    fn test_zero_gradient_leaves_parameter() {
        let device = Default::default();
        let optim  = Adadelta { rho: 0.95, epsilon: 1e-8 };
        let tensor = Tensor::<TestBackend, 1>::from_floats([3.0f32], &device);
        let zero   = Tensor::<TestBackend, 1>::zeros([1], &device);

        let (tensor, _) = optim.step(1.0, tensor, zero, None);
        assert_eq!(values(tensor), vec![3.0]);
    }

    #[test]
    fn test_adaptor_updates_module() {
        type AdBackend = Autodiff<TestBackend>;
        let device = Default::default();

        let linear: Linear<AdBackend> = LinearConfig::new(4, 2).init(&device);
        let before = linear.weight.val().into_data().to_vec::<f32>().unwrap();

        let x     = Tensor::<AdBackend, 2>::ones([3, 4], &device);
        let loss  = linear.forward(x).sum();
        let grads = GradientsParams::from_grads(loss.backward(), &linear);

        let mut optim = AdadeltaConfig::new().init();
        let linear    = optim.step(ADADELTA_LEARNING_RATE, linear, grads);

        let after = linear.weight.val().into_data().to_vec::<f32>().unwrap();
        assert_ne!(before, after);
        // First Adadelta steps are tiny: ~sqrt(eps) / sqrt((1-rho) g²) * g
        for (b, a) in before.iter().zip(&after) {
            assert!((b - a).abs() < 1e-2);
        }
    }

    #[test]
    fn test_steps_reduce_loss() {
        type AdBackend = Autodiff<TestBackend>;
        let device = Default::default();

        let mut linear: Linear<AdBackend> = LinearConfig::new(4, 1).init(&device);
        let mut optim = AdadeltaConfig::new().init();

        let x = Tensor::<AdBackend, 2>::from_floats(
            [[1.0, 0.5, -0.5, 2.0], [0.0, 1.0, 1.5, -1.0], [2.0, -1.0, 0.5, 0.5]],
            &device,
        );
        // Squared distance of every output from 3.0
        let loss_of = |linear: &Linear<AdBackend>| {
            linear.forward(x.clone()).sub_scalar(3.0).powf_scalar(2.0).mean()
        };

        let initial = loss_of(&linear).into_scalar();
        for _ in 0..200 {
            let loss  = loss_of(&linear);
            let grads = GradientsParams::from_grads(loss.backward(), &linear);
            linear    = optim.step(ADADELTA_LEARNING_RATE, linear, grads);
        }
        let last = loss_of(&linear).into_scalar();

        assert!(last < initial, "loss went from {initial} to {last}");
    }
}
