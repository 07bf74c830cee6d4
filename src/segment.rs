use std::fmt;

use anyhow::bail;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    // base address of `local` segment in the a function
    // RAM[1]
    Local,
    // base address of `argument` segment in the a function
    // RAM[2]
    Argument,
    Static,
    // no-mapping
    Constant,
    // RAM[3]
    This,
    // RAM[4]
    That,
    // RAM[3, 4]
    Pointer,
    // RAM[5 - 12]
    Temp,
}

impl TryFrom<&str> for Segment {
    type Error = anyhow::Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        use Segment::*;

        let segment = match s {
            "local" => Local,
            "argument" => Argument,
            "static" => Static,
            "constant" => Constant,
            "this" => This,
            "that" => That,
            "pointer" => Pointer,
            "temp" => Temp,
            _ => bail!("Unknown segment: {s}"),
        };

        Ok(segment)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Segment::*;

        let seg = match self {
            Local => "local",
            Argument => "argument",
            Static => "static",
            Constant => "constant",
            This => "this",
            That => "that",
            Pointer => "pointer",
            Temp => "temp",
        };

        write!(f, "{seg}")
    }
}

impl Segment {
    /// `pointer` only ever addresses index 0 (`THIS`) or 1 (`THAT`).
    pub fn validate_index(&self, index: u16) -> anyhow::Result<()> {
        if *self == Segment::Pointer && index > 1 {
            bail!("pointer segment only admits index 0 or 1, got {index}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_segment_names() {
        for name in [
            "local", "argument", "static", "constant", "this", "that", "pointer", "temp",
        ] {
            assert!(Segment::try_from(name).is_ok());
        }
    }

    #[test]
    fn rejects_unknown_segment() {
        assert!(Segment::try_from("bogus").is_err());
    }

    #[test]
    fn pointer_rejects_out_of_range_index() {
        assert!(Segment::Pointer.validate_index(0).is_ok());
        assert!(Segment::Pointer.validate_index(1).is_ok());
        assert!(Segment::Pointer.validate_index(2).is_err());
    }

    #[test]
    fn non_pointer_segments_accept_any_index() {
        assert!(Segment::Local.validate_index(9999).is_ok());
    }
}
