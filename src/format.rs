//! printf-style rendering of single values.
//!
//! A [`FormatSpec`] is literal text around exactly one value directive of the
//! form `%[flags][width][.precision]verb`. Specs are parsed once when a
//! column is registered and rendered once per value. Malformed directives
//! are kept in the parsed form and reported when rendering, so a bad spec
//! shows up as a field format error attributed to its column.

use std::fmt::Write as _;

use thiserror::Error;

const KNOWN_VERBS: &str = "vdboxXcqUeEfFgGst";
const DEFAULT_FLOAT_PRECISION: usize = 6;
/// Widths and precisions above this are malformed.
const MAX_WIDTH: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("format '{0}' has no value directive")]
    NoDirective(String),
    #[error("format '{0}' consumes more than one value")]
    TooManyDirectives(String),
    #[error("malformed directive '{0}'")]
    Malformed(String),
    #[error("verb '%{verb}' does not apply to {kind}")]
    BadVerb { verb: char, kind: &'static str },
}

/// A value handed to the formatter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormatArg<'a> {
    Signed(i128),
    Unsigned(u128),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    Char(char),
    Str(&'a str),
}

impl FormatArg<'_> {
    fn kind(&self) -> &'static str {
        match self {
            FormatArg::Signed(_) | FormatArg::Unsigned(_) => "integer",
            FormatArg::Float32(_) | FormatArg::Float64(_) => "float",
            FormatArg::Bool(_) => "boolean",
            FormatArg::Char(_) => "char",
            FormatArg::Str(_) => "string",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Flags {
    minus: bool,
    plus: bool,
    space: bool,
    zero: bool,
    sharp: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Directive {
    flags: Flags,
    width: Option<usize>,
    precision: Option<usize>,
    verb: char,
}

impl Directive {
    const NATURAL: Directive = Directive {
        flags: Flags {
            minus: false,
            plus: false,
            space: false,
            zero: false,
            sharp: false,
        },
        width: None,
        precision: None,
        verb: 'v',
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Directive(Directive),
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    source: String,
    segments: Vec<Segment>,
}

impl FormatSpec {
    pub fn parse(spec: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = spec.char_indices().peekable();

        while let Some((start, c)) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            let mut flags = Flags::default();
            while let Some(&(_, flag)) = chars.peek() {
                match flag {
                    '-' => flags.minus = true,
                    '+' => flags.plus = true,
                    ' ' => flags.space = true,
                    '0' => flags.zero = true,
                    '#' => flags.sharp = true,
                    _ => break,
                }
                chars.next();
            }
            let width = take_number(&mut chars);
            let precision = match chars.peek() {
                Some(&(_, '.')) => {
                    chars.next();
                    Some(take_number(&mut chars).unwrap_or(0))
                }
                _ => None,
            };
            let oversized = width.max(precision).is_some_and(|n| n > MAX_WIDTH);
            match chars.next() {
                Some((_, '%')) if flags == Flags::default() && width.is_none() && precision.is_none() => {
                    literal.push('%');
                }
                Some((_, verb)) if KNOWN_VERBS.contains(verb) && !oversized => {
                    flush_literal(&mut literal, &mut segments);
                    segments.push(Segment::Directive(Directive {
                        flags,
                        width,
                        precision,
                        verb,
                    }));
                }
                Some((end, verb)) => {
                    flush_literal(&mut literal, &mut segments);
                    let stop = end + verb.len_utf8();
                    segments.push(Segment::Malformed(spec[start..stop].to_string()));
                }
                None => {
                    flush_literal(&mut literal, &mut segments);
                    segments.push(Segment::Malformed(spec[start..].to_string()));
                }
            }
        }
        flush_literal(&mut literal, &mut segments);

        FormatSpec {
            source: spec.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Renders `arg` through the spec.
    pub fn render(&self, arg: FormatArg<'_>) -> Result<String, FormatError> {
        let mut directives = 0;
        for segment in &self.segments {
            match segment {
                Segment::Directive(_) => directives += 1,
                Segment::Malformed(text) => return Err(FormatError::Malformed(text.clone())),
                Segment::Literal(_) => {}
            }
        }
        match directives {
            0 => return Err(FormatError::NoDirective(self.source.clone())),
            1 => {}
            _ => return Err(FormatError::TooManyDirectives(self.source.clone())),
        }

        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Directive(directive) => out.push_str(&render_directive(directive, arg)?),
                Segment::Malformed(_) => {}
            }
        }
        Ok(out)
    }
}

/// Renders `arg` in its natural form, equivalent to the spec `%v`.
pub fn render_natural(arg: FormatArg<'_>) -> Result<String, FormatError> {
    render_directive(&Directive::NATURAL, arg)
}

fn take_number<I>(chars: &mut std::iter::Peekable<I>) -> Option<usize>
where
    I: Iterator<Item = (usize, char)>,
{
    let mut value: Option<usize> = None;
    while let Some(&(_, c)) = chars.peek() {
        let Some(digit) = c.to_digit(10) else { break };
        value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(digit as usize));
        chars.next();
    }
    value
}

fn flush_literal(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

fn render_directive(directive: &Directive, arg: FormatArg<'_>) -> Result<String, FormatError> {
    let bad_verb = || FormatError::BadVerb {
        verb: directive.verb,
        kind: arg.kind(),
    };
    match arg {
        FormatArg::Signed(value) => {
            render_integer(directive, value < 0, value.unsigned_abs()).ok_or_else(bad_verb)
        }
        FormatArg::Unsigned(value) => render_integer(directive, false, value).ok_or_else(bad_verb),
        FormatArg::Float32(value) => render_float(directive, Float::Single(value)).ok_or_else(bad_verb),
        FormatArg::Float64(value) => render_float(directive, Float::Double(value)).ok_or_else(bad_verb),
        FormatArg::Bool(value) => match directive.verb {
            'v' | 't' => Ok(pad(directive, value.to_string())),
            _ => Err(bad_verb()),
        },
        FormatArg::Char(value) => match directive.verb {
            'v' | 's' | 'c' => Ok(pad_text(directive, value.to_string())),
            'q' => Ok(pad(directive, format!("{value:?}"))),
            _ => render_integer(directive, false, u128::from(u32::from(value))).ok_or_else(bad_verb),
        },
        FormatArg::Str(value) => render_str(directive, value).ok_or_else(bad_verb),
    }
}

fn render_integer(directive: &Directive, negative: bool, magnitude: u128) -> Option<String> {
    let flags = directive.flags;
    let (prefix, digits) = match directive.verb {
        'v' | 'd' => ("", magnitude.to_string()),
        'b' => (if flags.sharp { "0b" } else { "" }, format!("{magnitude:b}")),
        'o' => (if flags.sharp { "0" } else { "" }, format!("{magnitude:o}")),
        'x' => (if flags.sharp { "0x" } else { "" }, format!("{magnitude:x}")),
        'X' => (if flags.sharp { "0X" } else { "" }, format!("{magnitude:X}")),
        'c' => {
            let c = u32::try_from(magnitude).ok().and_then(char::from_u32)?;
            return (!negative).then(|| pad(directive, c.to_string()));
        }
        'q' => {
            let c = u32::try_from(magnitude).ok().and_then(char::from_u32)?;
            return (!negative).then(|| pad(directive, format!("{c:?}")));
        }
        'U' => {
            let body = format!("U+{magnitude:04X}");
            return (!negative).then(|| pad(directive, body));
        }
        _ => return None,
    };

    let digits = match directive.precision {
        Some(0) if magnitude == 0 => String::new(),
        Some(precision) if digits.len() < precision => {
            format!("{}{digits}", "0".repeat(precision - digits.len()))
        }
        _ => digits,
    };
    let lead = format!("{}{prefix}", sign(negative, flags));
    let zero_fill = flags.zero && !flags.minus && directive.precision.is_none();
    Some(finish_number(directive, lead, digits, zero_fill))
}

#[derive(Clone, Copy)]
enum Float {
    Single(f32),
    Double(f64),
}

impl Float {
    fn wide(self) -> f64 {
        match self {
            Float::Single(v) => f64::from(v),
            Float::Double(v) => v,
        }
    }

    fn abs(self) -> Float {
        match self {
            Float::Single(v) => Float::Single(v.abs()),
            Float::Double(v) => Float::Double(v.abs()),
        }
    }

    /// Shortest round-trip digits in Rust's exponent notation, e.g. `1.5e-7`.
    fn shortest_exp(self) -> String {
        match self {
            Float::Single(v) => format!("{v:e}"),
            Float::Double(v) => format!("{v:e}"),
        }
    }

    fn shortest_plain(self) -> String {
        match self {
            Float::Single(v) => v.to_string(),
            Float::Double(v) => v.to_string(),
        }
    }
}

fn render_float(directive: &Directive, value: Float) -> Option<String> {
    let flags = directive.flags;
    let wide = value.wide();
    if !"veEfFgG".contains(directive.verb) {
        return None;
    }
    if wide.is_nan() {
        return Some(pad(directive, "NaN".to_string()));
    }
    if wide.is_infinite() {
        let body = if wide < 0.0 { "-Inf" } else { "+Inf" };
        return Some(pad(directive, body.to_string()));
    }

    let negative = wide.is_sign_negative();
    let magnitude = value.abs();
    let upper = directive.verb.is_ascii_uppercase();
    let body = match (directive.verb, directive.precision) {
        ('f' | 'F', precision) => {
            format!("{:.*}", precision.unwrap_or(DEFAULT_FLOAT_PRECISION), magnitude.wide())
        }
        ('e' | 'E', precision) => {
            let rust = format!("{:.*e}", precision.unwrap_or(DEFAULT_FLOAT_PRECISION), magnitude.wide());
            exponent_form(&rust, upper)
        }
        ('v' | 'g' | 'G', None) => shortest(magnitude, DEFAULT_FLOAT_PRECISION as i32, upper),
        (_, precision) => general(
            magnitude.wide(),
            precision.unwrap_or(DEFAULT_FLOAT_PRECISION).max(1),
            flags.sharp,
            upper,
        ),
    };
    let lead = sign(negative, flags).to_string();
    Some(finish_number(directive, lead, body, flags.zero && !flags.minus))
}

fn shortest(value: Float, limit: i32, upper: bool) -> String {
    let exp_form = value.shortest_exp();
    let exponent = decimal_exponent(&exp_form);
    if value.wide() != 0.0 && (exponent < -4 || exponent >= limit) {
        exponent_form(&exp_form, upper)
    } else {
        value.shortest_plain()
    }
}

fn general(value: f64, precision: usize, keep_zeros: bool, upper: bool) -> String {
    let rust = format!("{:.*e}", precision - 1, value);
    let exponent = decimal_exponent(&rust);
    let (mantissa, _) = rust.split_once('e').unwrap_or((rust.as_str(), "0"));
    let mantissa = if keep_zeros || !mantissa.contains('.') {
        mantissa.to_string()
    } else {
        mantissa.trim_end_matches('0').trim_end_matches('.').to_string()
    };
    let significant = mantissa.chars().filter(char::is_ascii_digit).count() as i32;

    let mut limit = precision as i32;
    if limit > significant && significant >= exponent + 1 {
        limit = significant;
    }
    if exponent < -4 || exponent >= limit {
        exponent_form(&format!("{mantissa}e{exponent}"), upper)
    } else {
        let decimals = (significant - (exponent + 1)).max(0) as usize;
        format!("{value:.decimals$}")
    }
}

fn decimal_exponent(rust_exp: &str) -> i32 {
    rust_exp
        .split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0)
}

/// Rewrites Rust's `1.5e-7` into the conventional `1.5e-07`.
fn exponent_form(rust_exp: &str, upper: bool) -> String {
    let (mantissa, exp) = rust_exp.split_once('e').unwrap_or((rust_exp, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let marker = if upper { 'E' } else { 'e' };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}{marker}{sign}{:02}", exp.unsigned_abs())
}

fn render_str(directive: &Directive, value: &str) -> Option<String> {
    let truncated: String = match directive.precision {
        Some(precision) => value.chars().take(precision).collect(),
        None => value.to_string(),
    };
    match directive.verb {
        'v' | 's' => Some(pad_text(directive, truncated)),
        'q' => Some(pad(directive, format!("{truncated:?}"))),
        'x' | 'X' => {
            let mut hex = String::with_capacity(truncated.len() * 2);
            for byte in truncated.bytes() {
                if directive.verb == 'x' {
                    let _ = write!(hex, "{byte:02x}");
                } else {
                    let _ = write!(hex, "{byte:02X}");
                }
            }
            Some(pad(directive, hex))
        }
        _ => None,
    }
}

fn sign(negative: bool, flags: Flags) -> &'static str {
    if negative {
        "-"
    } else if flags.plus {
        "+"
    } else if flags.space {
        " "
    } else {
        ""
    }
}

fn finish_number(directive: &Directive, lead: String, body: String, zero_fill: bool) -> String {
    let width = directive.width.unwrap_or(0);
    let len = lead.chars().count() + body.chars().count();
    if zero_fill && len < width {
        format!("{lead}{}{body}", "0".repeat(width - len))
    } else {
        pad(directive, format!("{lead}{body}"))
    }
}

fn pad_text(directive: &Directive, body: String) -> String {
    let width = directive.width.unwrap_or(0);
    let len = body.chars().count();
    if directive.flags.zero && !directive.flags.minus && len < width {
        format!("{}{body}", "0".repeat(width - len))
    } else {
        pad(directive, body)
    }
}

fn pad(directive: &Directive, body: String) -> String {
    let width = directive.width.unwrap_or(0);
    let len = body.chars().count();
    if len >= width {
        body
    } else if directive.flags.minus {
        format!("{body}{}", " ".repeat(width - len))
    } else {
        format!("{}{body}", " ".repeat(width - len))
    }
}
