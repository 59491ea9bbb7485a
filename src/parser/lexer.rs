// Token-level parsers shared by the chart spec grammar

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag},
    character::complete::{alpha1, alphanumeric1, char, multispace0},
    combinator::{map, opt, recognize, value},
    multi::many0_count,
    number::complete::double,
    sequence::{delimited, pair},
    IResult,
};

/// Wrap a parser so it tolerates surrounding whitespace
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Bare column name: letters, digits and underscores, not starting with a digit
pub fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0_count(alt((alphanumeric1, tag("_")))),
        )),
        |s: &str| s.to_string(),
    )(input)
}

/// Double-quoted string with `\"`, `\\` and `\n` escapes
pub fn string_literal(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(
                is_not("\\\""),
                '\\',
                alt((
                    value("\\", tag("\\")),
                    value("\"", tag("\"")),
                    value("\n", tag("n")),
                )),
            )),
            Option::unwrap_or_default,
        ),
        char('"'),
    )(input)
}

pub fn number_literal(input: &str) -> IResult<&str, f64> {
    double(input)
}

pub fn bool_literal(input: &str) -> IResult<&str, bool> {
    alt((value(true, tag("true")), value(false, tag("false"))))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier() {
        assert_eq!(identifier("Make)"), Ok((")", "Make".to_string())));
        assert_eq!(identifier("_col2 "), Ok((" ", "_col2".to_string())));
        assert!(identifier("2col").is_err());
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(
            string_literal(r#""Model Year" rest"#),
            Ok((" rest", "Model Year".to_string()))
        );
        assert_eq!(
            string_literal(r#""say \"hi\"""#),
            Ok(("", "say \"hi\"".to_string()))
        );
        assert_eq!(string_literal(r#""""#), Ok(("", String::new())));
        assert!(string_literal("unquoted").is_err());
    }

    #[test]
    fn test_number_and_bool_literals() {
        assert_eq!(number_literal("0.75)"), Ok((")", 0.75)));
        assert_eq!(number_literal("-3"), Ok(("", -3.0)));
        assert_eq!(bool_literal("true,"), Ok((",", true)));
        assert_eq!(bool_literal("false"), Ok(("", false)));
    }

    #[test]
    fn test_ws() {
        let mut p = ws(tag("bar"));
        assert_eq!(p("  bar  ("), Ok(("(", "bar")));
    }
}
