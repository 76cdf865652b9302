pub const HORIZONTAL: &str = "─";
pub const VERTICAL_LIGHT: &str = "│";
pub const BLOCK_FULL: &str = "█";
pub const BLOCK_LIGHT: &str = "░";
pub const ARROW_LEFT: &str = "◀";
pub const ARROW_RIGHT: &str = "▶";
pub const POINTER: &str = "▸";
pub const DOT: &str = "●";

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn spinner(frame: u64) -> &'static str {
    SPINNER_FRAMES[(frame % SPINNER_FRAMES.len() as u64) as usize]
}
