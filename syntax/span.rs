use std::fmt;
use std::ops::Range;

/// Byte range within the source buffer being read
#[derive(PartialEq, Eq, Hash, Clone, PartialOrd, Ord, Copy)]
pub struct Span {
    start: u32,
    end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Span {
        Span { start, end }
    }

    pub fn start(self) -> u32 {
        self.start
    }

    pub fn end(self) -> u32 {
        self.end
    }

    pub fn with_start(self, start: u32) -> Span {
        Span {
            start,
            end: self.end,
        }
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn contains(self, other: Span) -> bool {
        (other.start >= self.start) && (other.end <= self.end)
    }

    pub fn byte_range(self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "Span[]")
        } else {
            write!(f, "Span[{}:{}]", self.start, self.end)
        }
    }
}

pub const EMPTY_SPAN: Span = Span { start: 0, end: 0 };

/// Human-facing location of the reader's cursor
///
/// Both fields are 1-based. The column counts bytes, not characters.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct Position {
    line: u32,
    column: u32,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };

    pub fn new(line: u32, column: u32) -> Position {
        Position { line, column }
    }

    pub fn line(self) -> u32 {
        self.line
    }

    pub fn column(self) -> u32 {
        self.column
    }

    pub(crate) fn advance(self, byte: u8) -> Position {
        if byte == b'\n' {
            Position {
                line: self.line + 1,
                column: 1,
            }
        } else {
            Position {
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// This isn't #[cfg(test)] because it's used in other crates
pub fn t2s(v: &str) -> Span {
    if let Some(zero_size_off) = v.find('>') {
        let byte_pos = (zero_size_off + 1) as u32;

        return Span::new(byte_pos, byte_pos);
    }

    let start = v.find('^').expect("Positioning character not found") as u32;
    let end = v.rfind('^').map(|i| i + 1).unwrap() as u32;

    Span::new(start, end)
}
