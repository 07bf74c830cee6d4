#![forbid(unsafe_code)]

use std::path::Path;

pub mod codegen;
pub mod driver;
pub mod error;
pub mod insn;
pub mod parser;
pub mod segment;
pub mod symbol;

pub use codegen::CodeWriter;
pub use driver::{plan, translate, Mode, Plan, Unit};
pub use error::TranslateError;
pub use insn::*;
pub use segment::*;

pub fn is_vm_file<P: AsRef<Path>>(p: P) -> bool {
    let path = p.as_ref();
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("vm"))
}

/// A source unit's base name must begin with an uppercase letter  it's used
/// verbatim as the scope prefix for that unit's `static` variables.
pub fn is_valid_base_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_uppercase_base_names() {
        assert!(is_valid_base_name("Foo"));
        assert!(is_valid_base_name("Main"));
    }

    #[test]
    fn rejects_lowercase_or_empty_base_names() {
        assert!(!is_valid_base_name("foo"));
        assert!(!is_valid_base_name(""));
        assert!(!is_valid_base_name("123"));
    }
}
