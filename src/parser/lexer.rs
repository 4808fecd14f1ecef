// Shared lexical helpers for the selection parser

use nom::{
    bytes::complete::take_while1,
    character::complete::multispace0,
    combinator::verify,
    sequence::delimited,
    IResult,
};

/// Wrap a parser so it ignores surrounding whitespace
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parse a column-style identifier: letters, digits and underscores, not starting with a digit
pub fn identifier(input: &str) -> IResult<&str, String> {
    let (input, ident) = verify(
        take_while1(|c: char| c.is_alphanumeric() || c == '_'),
        |s: &str| !s.starts_with(|c: char| c.is_ascii_digit()),
    )(input)?;
    Ok((input, ident.to_string()))
}
