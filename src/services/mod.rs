pub mod image_decode;
pub mod pose_estimator;
