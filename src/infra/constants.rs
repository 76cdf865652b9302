// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Bearer credential for the chat endpoint (required)
pub const ENV_API_KEY: &str = "API_KEY";

/// Full chat-completions URL (required)
pub const ENV_URL: &str = "URL";

/// Model id sent in every request
pub const ENV_MODEL: &str = "MODEL";

/// Upper bound on one request in seconds
pub const ENV_REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT_SECS";

/// Directory for the rolling log file
pub const ENV_LOG_DIR: &str = "THINKCHAT_LOG_DIR";

/// `EnvFilter` directive for the log file
pub const ENV_LOG_FILTER: &str = "THINKCHAT_LOG";

pub const DEFAULT_MODEL: &str = "deepseek-reasoner";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 600;

pub const DEFAULT_LOG_DIR: &str = ".thinkchat/logs";

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Log file prefix; the appender adds the date
pub const LOG_FILE_NAME: &str = "thinkchat.log";

// =============================================================================
// SCROLLING
// =============================================================================

/// Scroll amount for PageUp/PageDown
pub const SCROLL_PAGE_AMOUNT: f32 = 10.0;

/// Scroll acceleration increment per scroll event
pub const SCROLL_ACCEL_INCREMENT: f32 = 0.3;

/// Maximum scroll acceleration multiplier
pub const SCROLL_ACCEL_MAX: f32 = 2.5;

// =============================================================================
// SLIDERS
// =============================================================================

/// Steps per Shift+Left/Right press
pub const SLIDER_COARSE_STEPS: i32 = 10;

// =============================================================================
// UI LAYOUT
// =============================================================================

pub const SIDEBAR_WIDTH: u16 = 36;

/// Height of the help hints section in sidebar
pub const SIDEBAR_HELP_HEIGHT: u16 = 8;

/// Rows of the instruction editor in the sidebar
pub const INSTRUCTION_HEIGHT: u16 = 7;

/// Width of the slider bars in cells
pub const SLIDER_BAR_WIDTH: usize = 20;

// =============================================================================
// TIMING
// =============================================================================

/// Poll interval while a request is running
pub const EVENT_POLL_MS: u64 = 8;

/// Poll interval when idle
pub const IDLE_POLL_MS: u64 = 50;

/// Minimum time between renders (ms) - caps at ~28fps
pub const RENDER_THROTTLE_MS: u64 = 36;

/// Spinner frame interval
pub const SPINNER_FRAME_MS: u64 = 80;
