//! Interfaces of neural networks used in the agent.
use candle_nn::VarBuilder;

/// Neural network model with one input and one output.
///
/// The type of the input is `Self::Input`, while that of the output is
/// `Self::Output`. The actor of [`Ddpg`](crate::ddpg::Ddpg) uses this trait
/// to map observations to actions.
pub trait SubModel1 {
    /// Configuration from which the model is constructed.
    type Config;

    /// Input of the model.
    type Input;

    /// Output of the model.
    type Output;

    /// Builds the model with [`VarBuilder`] and [`Self::Config`].
    fn build(vb: VarBuilder, config: Self::Config) -> Self;

    /// A generalized forward function.
    fn forward(&self, input: &Self::Input) -> Self::Output;
}

/// Neural network model with two inputs and one output.
///
/// The critic of [`Ddpg`](crate::ddpg::Ddpg) uses this trait to map
/// observation-action pairs to action values.
pub trait SubModel2 {
    /// Configuration from which the model is constructed.
    type Config;

    /// The first input of the model.
    type Input1;

    /// The second input of the model.
    type Input2;

    /// Output of the model.
    type Output;

    /// Builds the model with [`VarBuilder`] and [`Self::Config`].
    fn build(vb: VarBuilder, config: Self::Config) -> Self;

    /// A generalized forward function.
    fn forward(&self, input1: &Self::Input1, input2: &Self::Input2) -> Self::Output;
}
