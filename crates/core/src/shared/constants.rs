pub const FACE_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const FACE_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

/// Side length of the square grayscale sample fed to identity classifiers.
pub const SAMPLE_SIDE: u32 = 50;

/// Flattened sample length (`SAMPLE_SIDE`²).
pub const SAMPLE_LEN: usize = (SAMPLE_SIDE * SAMPLE_SIDE) as usize;

pub const DEFAULT_AUTHORIZED_IDENTITY: &str = "Gopal";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_LOCK_TIME_SECS: u64 = 10;
pub const DEFAULT_INITIAL_BALANCE: i64 = 5000;

/// Audit user recorded for any face that is not the authorized identity.
pub const UNKNOWN_USER: &str = "Unknown";

/// Firestore collection the cloud audit sink writes to.
pub const AUDIT_COLLECTION: &str = "login_logs";

/// Timestamp layout of audit events (local time).
pub const AUDIT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Face crops captured per enrollment run.
pub const DEFAULT_ENROLL_COUNT: usize = 50;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
