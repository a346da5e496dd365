pub mod helper;
pub mod model;
pub mod xmlchar;

use nom::error::{ErrorKind, ParseError};
use nom::{Err, IResult};

// -----------------------------------------------------------------------------------------------

/// NameStartChar (NameChar)*
///
/// [\[5\] Name](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-Name)
pub fn name(input: &str) -> IResult<&str, &str> {
    take_name(input, xmlchar::is_name_start_char, xmlchar::is_name_char)
}

/// Name - (Char* ':' Char*)
///
/// [\[4\] NCName](https://www.w3.org/TR/2009/REC-xml-names-20091208/#NT-NCName)
pub fn ncname(input: &str) -> IResult<&str, &str> {
    take_name(input, xmlchar::is_ncname_start_char, xmlchar::is_ncname_char)
}

/// PrefixedName | UnprefixedName
///
/// [\[7\] QName](https://www.w3.org/TR/2009/REC-xml-names-20091208/#NT-QName)
pub fn qname(input: &str) -> IResult<&str, model::QName<'_>> {
    let (rest, first) = ncname(input)?;
    if let Some(tail) = rest.strip_prefix(':') {
        if let Ok((rest, second)) = ncname(tail) {
            return Ok((rest, model::QName::prefixed(first, second)));
        }
    }
    Ok((rest, model::QName::unprefixed(first)))
}

// -----------------------------------------------------------------------------------------------

/// Whether `value` matches the Name production in full.
pub fn is_name(value: &str) -> bool {
    matches!(name(value), Ok(("", _)))
}

/// Whether `value` matches the NCName production in full.
pub fn is_ncname(value: &str) -> bool {
    matches!(ncname(value), Ok(("", _)))
}

/// Splits `value` into (prefix, local part) when it matches the QName
/// production in full.
pub fn split_qname(value: &str) -> Option<(Option<&str>, &str)> {
    match qname(value) {
        Ok(("", q)) => Some((q.prefix, q.local)),
        _ => None,
    }
}

// -----------------------------------------------------------------------------------------------

fn take_name(
    input: &str,
    start: impl Fn(char) -> bool,
    rest: impl Fn(char) -> bool,
) -> IResult<&str, &str> {
    let mut chars = input.char_indices();
    match chars.next() {
        Some((_, c)) if start(c) => {}
        _ => {
            return Err(Err::Error(nom::error::Error::from_error_kind(
                input,
                ErrorKind::Char,
            )))
        }
    }

    let end = chars
        .find(|(_, c)| !rest(*c))
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    Ok((&input[end..], &input[..end]))
}

// -----------------------------------------------------------------------------------------------


// -----------------------------------------------------------------------------------------------
