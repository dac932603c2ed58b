pub const CAFFE_TOPOLOGY_NAME: &str = "deploy.prototxt";
pub const CAFFE_TOPOLOGY_URL: &str =
    "https://raw.githubusercontent.com/opencv/opencv/master/samples/dnn/face_detector/deploy.prototxt";

pub const CAFFE_WEIGHTS_NAME: &str = "res10_300x300_ssd_iter_140000.caffemodel";
pub const CAFFE_WEIGHTS_URL: &str =
    "https://raw.githubusercontent.com/opencv/opencv_3rdparty/dnn_samples_face_detector_20170830/res10_300x300_ssd_iter_140000.caffemodel";

pub const HAAR_CASCADE_NAME: &str = "haarcascade_frontalface_default.xml";
pub const HAAR_CASCADE_URL: &str =
    "https://raw.githubusercontent.com/opencv/opencv/master/data/haarcascades/haarcascade_frontalface_default.xml";

/// Square working resolution of the SSD network.
pub const DEEP_INPUT_SIZE: u32 = 300;

/// Per-channel means subtracted from the blob, in B, G, R order.
pub const DEEP_CHANNEL_MEANS_BGR: [f32; 3] = [104.0, 177.0, 123.0];

/// Candidates must score strictly above this to be kept.
pub const DEEP_CONFIDENCE_THRESHOLD: f32 = 0.5;

pub const CASCADE_SCALE_FACTOR: f64 = 1.1;
pub const CASCADE_MIN_NEIGHBORS: i32 = 5;
pub const CASCADE_MIN_SIZE: i32 = 30;

/// Confidence reported for every cascade window (the method has no score).
pub const CASCADE_CONFIDENCE: f32 = 1.0;

pub const LOG_EXTENSION: &str = "csv";
pub const LOG_COLUMNS: [&str; 2] = ["frame", "confidence"];

pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &["mp4"];
