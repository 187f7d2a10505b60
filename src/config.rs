// ABOUTME: Version and REPL banner constants

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WELCOME_MESSAGE: &str = "Lox Interpreter";
pub const WELCOME_SUBTITLE: &str = "A tree-walking interpreter for the Lox scripting language";
