use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// Delimiter and quote characters for the import format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: char,
    pub quote: char,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvLineError {
    /// A quoted field is still open at the end of the input.
    UnclosedQuote,
    /// Something other than a delimiter follows a closing quote.
    TrailingAfterQuote,
}

impl fmt::Display for CsvLineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvLineError::UnclosedQuote => write!(f, "unclosed quoted field"),
            CsvLineError::TrailingAfterQuote => {
                write!(f, "unexpected character after closing quote")
            }
        }
    }
}

impl std::error::Error for CsvLineError {}

/// Split one logical CSV record into fields.
///
/// Quoted fields may contain delimiters, doubled quotes and newlines. Blanks
/// around a quoted field are dropped; unquoted fields keep theirs. An
/// `UnclosedQuote` result means the caller should append the next physical
/// line and try again.
pub fn parse_csv_line(line: &str, opts: &CsvOptions) -> Result<Vec<String>, CsvLineError> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();
    let q = opts.quote;
    let d = opts.delimiter;

    loop {
        let mut ahead = chars.clone();
        skip_blanks(&mut ahead, d);
        if ahead.peek() == Some(&q) {
            chars = ahead;
            chars.next();
            let mut field = String::new();
            let mut closed = false;
            while let Some(c) = chars.next() {
                if c == q {
                    if chars.peek() == Some(&q) {
                        chars.next();
                        field.push(q);
                    } else {
                        closed = true;
                        break;
                    }
                } else {
                    field.push(c);
                }
            }
            if !closed {
                return Err(CsvLineError::UnclosedQuote);
            }
            fields.push(field);
            skip_blanks(&mut chars, d);
            match chars.next() {
                Some(c) if c == d => {}
                None => return Ok(fields),
                Some(_) => return Err(CsvLineError::TrailingAfterQuote),
            }
        } else {
            let mut field = String::new();
            loop {
                match chars.next() {
                    Some(c) if c == d => break,
                    Some(c) => field.push(c),
                    None => {
                        fields.push(field);
                        return Ok(fields);
                    }
                }
            }
            fields.push(field);
        }
    }
}

fn skip_blanks(chars: &mut Peekable<Chars<'_>>, delimiter: char) {
    while let Some(&c) = chars.peek() {
        if c == delimiter || !matches!(c, ' ' | '\t') {
            break;
        }
        chars.next();
    }
}
