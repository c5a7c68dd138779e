pub mod geodesy;
pub mod kalman;
