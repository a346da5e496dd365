use nom::error::{ErrorKind, ParseError};
use nom::{Err, IResult};

// -----------------------------------------------------------------------------------------------

/// Runs `parser` and truncates its match at the first occurrence of `stop`.
///
/// Fails if the match begins with `stop`.
pub fn take_until_stop<'a, F>(
    mut parser: F,
    stop: &'a str,
) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str>
where
    F: FnMut(&'a str) -> IResult<&'a str, &'a str>,
{
    move |input| {
        let (rest, value) = parser(input)?;
        match value.find(stop) {
            Some(0) => Err(Err::Error(nom::error::Error::from_error_kind(
                input,
                ErrorKind::TakeUntil,
            ))),
            Some(index) => Ok((&input[index..], &input[..index])),
            None => Ok((rest, value)),
        }
    }
}

/// Runs `parser` and rejects a match that equals `word` ASCII-case-insensitively.
pub fn take_unless<'a, F>(
    mut parser: F,
    word: &'a str,
) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str>
where
    F: FnMut(&'a str) -> IResult<&'a str, &'a str>,
{
    move |input| {
        let (rest, value) = parser(input)?;
        if value.eq_ignore_ascii_case(word) {
            Err(Err::Error(nom::error::Error::from_error_kind(
                input,
                ErrorKind::Tag,
            )))
        } else {
            Ok((rest, value))
        }
    }
}

// -----------------------------------------------------------------------------------------------


// -----------------------------------------------------------------------------------------------
