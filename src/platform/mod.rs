pub mod epd2in13_v3;
pub mod gt1151;

#[cfg(target_os = "linux")]
pub mod linux;
