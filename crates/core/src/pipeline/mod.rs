pub mod authenticate_frame_use_case;
pub mod enroll_faces_use_case;
pub mod frame_display;
pub mod infrastructure;
pub mod kiosk;
pub mod operator_console;
pub mod pipeline_logger;
