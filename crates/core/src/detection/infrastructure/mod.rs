pub mod backend_factory;
pub mod caffe_ssd_network;
pub mod cascade_detector;
pub mod deep_detector;
pub mod model_assets;
pub mod model_fetcher;
pub mod opencv_cascade;
