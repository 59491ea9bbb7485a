use nom::{
    bytes::complete::tag,
    character::complete::char,
    combinator::map_res,
    multi::separated_list0,
    sequence::{delimited, separated_pair},
    IResult,
};
use crate::parser::ast::Labels;
use crate::parser::lexer::{identifier, string_literal, ws};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelKey {
    Title,
    X,
    Y,
}

impl std::str::FromStr for LabelKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(LabelKey::Title),
            "x" => Ok(LabelKey::X),
            "y" => Ok(LabelKey::Y),
            other => Err(format!("unknown label '{}'", other)),
        }
    }
}

fn label_arg(input: &str) -> IResult<&str, (LabelKey, String)> {
    separated_pair(
        ws(map_res(identifier, |key: String| key.parse::<LabelKey>())),
        ws(char(':')),
        ws(string_literal),
    )(input)
}

/// `labs(title: "...", x: "...", y: "...")`. Later keys override earlier ones.
pub fn parse_labs(input: &str) -> IResult<&str, Labels> {
    let (input, _) = ws(tag("labs"))(input)?;
    let (input, args) = delimited(
        ws(char('(')),
        separated_list0(ws(char(',')), label_arg),
        ws(char(')')),
    )(input)?;

    let labels = args
        .into_iter()
        .fold(Labels::default(), |mut labels, (key, text)| {
            let slot = match key {
                LabelKey::Title => &mut labels.title,
                LabelKey::X => &mut labels.x,
                LabelKey::Y => &mut labels.y,
            };
            *slot = Some(text);
            labels
        });

    Ok((input, labels))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labs() {
        let (rest, labels) =
            parse_labs(r#"labs(title: "Fuel Type Distribution", y: "Vehicles")"#).unwrap();
        assert!(rest.is_empty());
        assert_eq!(labels.title.as_deref(), Some("Fuel Type Distribution"));
        assert_eq!(labels.x, None);
        assert_eq!(labels.y.as_deref(), Some("Vehicles"));
    }

    #[test]
    fn test_parse_labs_last_key_wins() {
        let (_, labels) = parse_labs(r#"labs(x: "a", x: "b")"#).unwrap();
        assert_eq!(labels.x.as_deref(), Some("b"));
    }

    #[test]
    fn test_parse_labs_rejects_bad_args() {
        assert!(parse_labs("labs(title: Fuel)").is_err());
        assert!(parse_labs(r#"labs(caption: "c")"#).is_err());
    }
}
