pub mod dualsense;
pub mod lego;
