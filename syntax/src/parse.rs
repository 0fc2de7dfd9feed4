use combine::easy;
use combine::{eof, EasyParser, Parser};

#[derive(Debug, thiserror::Error)]
#[error("can't parse {what} \"{input}\" (at char {pos}): {msg}")]
pub struct Error {
    what: &'static str,
    input: String,
    pos: usize,
    msg: String,
}

/// A unit or disease selection as written by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Options<'a> {
    /// `all` or `*`
    All,
    /// A single value or a comma-separated list, in the order given.
    Listed(Vec<&'a str>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanUnit {
    Days,
    Weeks,
}

/// A backwards-looking time span such as `8w` or `-1d`.
/// The sign is ignored: spans are always applied towards the past.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub count: u32,
    pub unit: SpanUnit,
}

impl Span {
    /// Length of the span in days.
    pub fn days(&self) -> u64 {
        match self.unit {
            SpanUnit::Days => u64::from(self.count),
            SpanUnit::Weeks => u64::from(self.count) * 7,
        }
    }
}

/// Parse `unit:disease` pairs separated by commas, e.g. `NY:COVID-19,WA:Influenza`.
pub fn pairs(text: &str) -> Result<Vec<(&str, &str)>, Error> {
    let result = grammar::pair_list().skip(eof()).easy_parse(text);
    finish("unit:disease pairs", text, result)
}

/// Parse `all`, `*`, a single value, or a comma-separated list of values.
pub fn options(text: &str) -> Result<Options<'_>, Error> {
    let result = grammar::item_list().skip(eof()).easy_parse(text);
    let items = finish("option list", text, result)?;
    if matches!(items[..], ["all"] | ["*"]) {
        Ok(Options::All)
    } else {
        Ok(Options::Listed(items))
    }
}

/// Parse a plain comma-separated list of values.
pub fn list(text: &str) -> Result<Vec<&str>, Error> {
    let result = grammar::item_list().skip(eof()).easy_parse(text);
    finish("list", text, result)
}

/// Split `az://<container>/<blob>` into `(container, blob)`.
pub fn blob_path(text: &str) -> Result<(&str, &str), Error> {
    let result = grammar::blob_path_parts().skip(eof()).easy_parse(text);
    finish("blob path", text, result)
}

/// Parse a span like `8w`, `-8w`, or `1d`.
pub fn span(text: &str) -> Result<Span, Error> {
    let result = grammar::span_parts().skip(eof()).easy_parse(text);
    let (count, unit) = finish("time span", text, result)?;
    let unit = if unit == 'w' {
        SpanUnit::Weeks
    } else {
        SpanUnit::Days
    };
    Ok(Span { count, unit })
}

/// Parse an edit such as `sampler_opts.cores=8` into its key path and raw value.
pub fn assignment(text: &str) -> Result<(Vec<&str>, &str), Error> {
    let result = grammar::assignment_parts().skip(eof()).easy_parse(text);
    finish("assignment", text, result)
}

fn finish<'a, T>(
    what: &'static str,
    text: &'a str,
    result: Result<(T, &'a str), easy::ParseError<&'a str>>,
) -> Result<T, Error> {
    result.map(|(parsed, _remainder)| parsed).map_err(|e| {
        // combine's errors borrow the input, so we stringify them here.
        Error {
            what,
            input: text.to_owned(),
            pos: e.position.translate_position(text),
            msg: format!("{}", e).replace('\n', " "),
        }
    })
}

mod prelude {
    pub use combine::parser::char::{char, digit, string};
    pub use combine::parser::range::recognize;
    pub use combine::*;
}

mod grammar {
    use super::prelude::*;

    p! {
        inline_whitespace() -> (), {
            skip_many1(satisfy(|c: char| c.is_whitespace()))
        }
    }

    wrapper! {
        lex(parser), {
            optional(inline_whitespace()).with(parser).skip(optional(inline_whitespace()))
        }
    }

    // anything up to the next comma
    p! {
        item() -> &'a str, {
            recognize(skip_many1(satisfy(|c: char| !c.is_whitespace() && c != ',')))
        }
    }

    // anything up to the next comma or colon
    p! {
        pair_part() -> &'a str, {
            recognize(skip_many1(satisfy(|c: char| !c.is_whitespace() && c != ',' && c != ':')))
        }
    }

    p! {
        item_list() -> Vec<&'a str>, {
            sep_by1(lex(item()), char(','))
        }
    }

    p! {
        pair() -> (&'a str, &'a str), {
            lex(pair_part()).skip(char(':')).and(lex(pair_part()))
        }
    }

    p! {
        pair_list() -> Vec<(&'a str, &'a str)>, {
            sep_by1(pair(), char(','))
        }
    }

    p! {
        blob_path_parts() -> (&'a str, &'a str), {
            string("az://")
                .with(recognize(skip_many1(none_of("/".chars()))))
                .skip(char('/'))
                .and(recognize(none_of("/".chars()).and(skip_many(any()))))
        }
    }

    p! {
        span_parts() -> (u32, char), {
            lex(
                optional(char('-'))
                    .with(many1::<String, _, _>(digit()).and_then(|digits: String| digits.parse::<u32>()))
                    .and(one_of("dw".chars()))
            )
        }
    }

    p! {
        key() -> &'a str, {
            recognize(skip_many1(satisfy(|c: char| c.is_alphanumeric() || c == '_')))
        }
    }

    // dotted key path, '=', then everything else is the value
    p! {
        assignment_parts() -> (Vec<&'a str>, &'a str), {
            lex(sep_by1::<Vec<&'a str>, _, _, _>(key(), char('.')))
                .skip(char('='))
                .skip(optional(inline_whitespace()))
                .and(recognize(skip_many(any())))
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs() {
        assert_eq!(
            vec![("ID", "COVID-19"), ("WA", "Influenza")],
            pairs("ID:COVID-19,WA:Influenza").unwrap()
        );
        assert!(pairs("NY").is_err());
        assert!(pairs("NY:COVID-19:extra").is_err());
        assert!(pairs("NY:COVID-19,").is_err());
        assert!(pairs("").is_err());
    }

    #[test]
    fn test_options() {
        assert_eq!(Options::All, options("all").unwrap());
        assert_eq!(Options::All, options(" * ").unwrap());
        assert_eq!(Options::Listed(vec!["CA"]), options("CA").unwrap());
        assert_eq!(
            Options::Listed(vec!["COVID-19", "Influenza"]),
            options("COVID-19, Influenza").unwrap()
        );
        // "all" only acts as a wildcard on its own:
        assert_eq!(Options::Listed(vec!["NY", "all"]), options("NY,all").unwrap());
        assert!(options("").is_err());
    }

    #[test]
    fn test_list() {
        assert_eq!(
            vec!["2024-10-22", "2024-12-16"],
            list("2024-10-22, 2024-12-16").unwrap()
        );
    }

    #[test]
    fn test_blob_path() {
        assert_eq!(("my_container", "my_blob.csv"), blob_path("az://my_container/my_blob.csv").unwrap());
        assert!(blob_path("my_container/my_blob.csv").is_err());
        assert!(blob_path("az://").is_err());
        assert!(blob_path("az://container_only").is_err());
    }

    #[test]
    fn test_span() {
        assert_eq!(56, span("8w").unwrap().days());
        assert_eq!(56, span("-8w").unwrap().days());
        assert_eq!(1, span("1d").unwrap().days());
        assert!(span("8m").is_err());
        assert!(span("w").is_err());
    }

    #[test]
    fn test_assignment() {
        assert_eq!((vec!["seed"], "7"), assignment("seed=7").unwrap());
        assert_eq!(
            (vec!["sampler_opts", "cores"], "8"),
            assignment("sampler_opts.cores = 8").unwrap()
        );
        assert_eq!(
            (vec!["quantile_width"], "[0.5, 0.9]"),
            assignment("quantile_width=[0.5, 0.9]").unwrap()
        );
        assert!(assignment("seed").is_err());
        assert!(assignment("=7").is_err());
        assert!(assignment("priors..rt=1").is_err());
    }
}
