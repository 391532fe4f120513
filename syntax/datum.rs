use std::sync::Arc;

use crate::span::Span;

pub type DataStr = Arc<str>;

/// Parsed external representation before it's placed on the runtime heap
#[derive(PartialEq, Debug, Clone)]
pub enum Datum {
    Bool(Span, bool),
    Char(Span, u8),
    Int(Span, i32),
    Str(Span, Box<[u8]>),
    Sym(Span, DataStr),
    List(Span, Box<[Datum]>),
    /// List whose final `rest` is the trailing datum instead of the empty list
    DottedList(Span, Box<[Datum]>, Box<Datum>),
}

impl Datum {
    pub fn span(&self) -> Span {
        match self {
            Datum::Bool(span, _)
            | Datum::Char(span, _)
            | Datum::Int(span, _)
            | Datum::Str(span, _)
            | Datum::Sym(span, _)
            | Datum::List(span, _)
            | Datum::DottedList(span, _, _) => *span,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Datum::Bool(_, true) => "boolean true",
            Datum::Bool(_, false) => "boolean false",
            Datum::Char(_, _) => "character",
            Datum::Int(_, _) => "integer",
            Datum::Str(_, _) => "string",
            Datum::Sym(_, _) => "symbol",
            Datum::List(_, vs) if vs.is_empty() => "empty list",
            Datum::List(_, _) => "list",
            Datum::DottedList(_, _, _) => "dotted list",
        }
    }
}
