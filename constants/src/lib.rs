pub mod archive;
pub mod artwork_layout;
pub mod device;
pub mod placement;
pub mod render_settings;
