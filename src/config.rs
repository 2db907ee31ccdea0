use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use gesture_core::warning::{DEFAULT_WARNING_CONSEC_FRAMES, DEFAULT_WARNING_EAR_THRESHOLD};
use gesture_core::WarningConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub cors_origin: String,
    pub max_sse_connections: usize,
    pub max_video_connections: usize,
    pub frame: FrameConfig,
    pub pointer_backend: PointerBackend,
    pub warning: WarningConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    pub jpeg_quality: u8,
    pub default_width: u32,
    pub default_height: u32,
}

/// Where pointer actions produced by the gesture controller end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerBackend {
    Noop,
    Log,
    Os,
}

impl PointerBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            PointerBackend::Noop => "noop",
            PointerBackend::Log => "log",
            PointerBackend::Os => "os",
        }
    }
}

impl fmt::Display for PointerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PointerBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "noop" | "none" => Ok(PointerBackend::Noop),
            "log" => Ok(PointerBackend::Log),
            "os" | "enigo" => Ok(PointerBackend::Os),
            other => Err(format!("unknown pointer backend: {other}")),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 5000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5000"),
            max_sse_connections: env_or_parse("MAX_SSE_CONNECTIONS", 64_usize),
            max_video_connections: env_or_parse("MAX_VIDEO_CONNECTIONS", 16_usize),
            frame: FrameConfig {
                jpeg_quality: env_or_parse("JPEG_QUALITY", 80_u8).clamp(1, 100),
                default_width: env_or_parse("DEFAULT_FRAME_WIDTH", 640_u32).max(1),
                default_height: env_or_parse("DEFAULT_FRAME_HEIGHT", 480_u32).max(1),
            },
            pointer_backend: env_or_parse("POINTER_BACKEND", PointerBackend::Log),
            warning: WarningConfig {
                ear_threshold: env_or_parse("WARNING_EAR_THRESHOLD", DEFAULT_WARNING_EAR_THRESHOLD),
                consec_frames: env_or_parse("WARNING_CONSEC_FRAMES", DEFAULT_WARNING_CONSEC_FRAMES)
                    .max(1),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
