//! Output formatting options

/// Where the opening brace of a body goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BraceStyle {
    /// `void f() {`
    SameLine,
    /// Brace on its own line, aligned with the header
    #[default]
    NextLine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    /// Spaces per nesting level
    pub indent_width: usize,
    pub brace_style: BraceStyle,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            indent_width: 2,
            brace_style: BraceStyle::default(),
        }
    }
}
