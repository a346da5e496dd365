use nom::error::{ErrorKind, ParseError};
use nom::{Err, IResult};

// -----------------------------------------------------------------------------------------------

/// #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
///
/// [\[2\] Char](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-Char)
pub fn is_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// ":" | \[A-Z] | "_" | \[a-z] | \[#xC0-#xD6] | \[#xD8-#xF6] | \[#xF8-#x2FF] | \[#x370-#x37D] |
/// \[#x37F-#x1FFF] | \[#x200C-#x200D] | \[#x2070-#x218F] | \[#x2C00-#x2FEF] | \[#x3001-#xD7FF] |
/// \[#xF900-#xFDCF] | \[#xFDF0-#xFFFD] | \[#x10000-#xEFFFF]
///
/// [\[4\] NameStartChar](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-NameStartChar)
pub fn is_name_start_char(c: char) -> bool {
    c == ':' || is_ncname_start_char(c)
}

/// NameStartChar | "-" | "." | \[0-9] | #xB7 | \[#x0300-#x036F] | \[#x203F-#x2040]
///
/// [\[4a\] NameChar](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-NameChar)
pub fn is_name_char(c: char) -> bool {
    c == ':' || is_ncname_char(c)
}

/// NameStartChar without ":".
///
/// [\[4\] NCName](https://www.w3.org/TR/2009/REC-xml-names-20091208/#NT-NCName)
pub fn is_ncname_start_char(c: char) -> bool {
    matches!(c,
        'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

/// NameChar without ":".
pub fn is_ncname_char(c: char) -> bool {
    is_ncname_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

/// #x20 | #xD | #xA | [a-zA-Z0-9] | [-'()+,./:=?;!*#@$_%]
///
/// [\[13\] PubidChar](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-PubidChar)
pub fn is_pubid_char(c: char) -> bool {
    matches!(c,
        '\u{20}' | '\u{D}' | '\u{A}'
        | 'a'..='z' | 'A'..='Z' | '0'..='9')
        || "-'()+,./:=?;!*#@$_%".contains(c)
}

/// \[A-Za-z0-9._] | '-'
///
/// [\[81\] EncName](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-EncName)
pub fn is_enc_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

// -----------------------------------------------------------------------------------------------

/// Recognizes zero or more XML characters not listed in `except`.
pub fn char_except0(except: &str) -> impl FnMut(&str) -> IResult<&str, &str> + '_ {
    move |input| {
        let end = input
            .char_indices()
            .find(|(_, c)| !is_char(*c) || except.contains(*c))
            .map(|(i, _)| i)
            .unwrap_or(input.len());
        Ok((&input[end..], &input[..end]))
    }
}

/// Recognizes one or more XML characters not listed in `except`.
pub fn char_except1(except: &str) -> impl FnMut(&str) -> IResult<&str, &str> + '_ {
    move |input| {
        let (rest, value) = char_except0(except)(input)?;
        if value.is_empty() {
            Err(Err::Error(nom::error::Error::from_error_kind(
                input,
                ErrorKind::Char,
            )))
        } else {
            Ok((rest, value))
        }
    }
}

/// Recognizes zero or more public identifier characters not listed in `except`.
pub fn pubid_char_except0(except: &str) -> impl FnMut(&str) -> IResult<&str, &str> + '_ {
    move |input| {
        let end = input
            .char_indices()
            .find(|(_, c)| !is_pubid_char(*c) || except.contains(*c))
            .map(|(i, _)| i)
            .unwrap_or(input.len());
        Ok((&input[end..], &input[..end]))
    }
}

/// Recognizes zero or more encoding name characters.
pub fn enc_name0(input: &str) -> IResult<&str, &str> {
    let end = input
        .char_indices()
        .find(|(_, c)| !is_enc_name_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    Ok((&input[end..], &input[..end]))
}

// -----------------------------------------------------------------------------------------------


// -----------------------------------------------------------------------------------------------
