pub mod codec;
pub mod controller;
pub mod detector;
pub mod middleware;
pub mod normalization;
pub mod profile;
pub mod rumble;
pub mod source;
pub mod state;
pub mod target;

#[cfg(test)]
pub mod codec_test;
#[cfg(test)]
pub mod detector_test;
