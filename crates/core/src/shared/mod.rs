pub mod bench_config;
pub mod constants;
pub mod detection;
pub mod frame;
pub mod opencv_image;
pub mod video_metadata;
