// Default indentation size
pub const INDENT: isize = 4;

// Symbols

pub const ARROW: &str = "→";
pub const COLON: &str = ":";
pub const COMMA: &str = ",";
pub const DOT: &str = ".";
pub const HOOK_ARROW: &str = "↪";
pub const LAMBDA: &str = "λ";
pub const PI: &str = "Π";
pub const QUESTION_MARK: &str = "?";
pub const UNDERSCORE: &str = "_";

// Keywords

pub const DEF: &str = "def";
pub const KIND: &str = "Kind";
pub const TYPE: &str = "Type";
