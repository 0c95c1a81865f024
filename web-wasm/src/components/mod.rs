pub mod header;
pub mod upload_area;
pub mod camera_view;
pub mod result_panel;
pub mod detection_overlay;
