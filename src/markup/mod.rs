pub mod fragment;
pub mod normalize;
