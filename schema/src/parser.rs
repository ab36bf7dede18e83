//! GraphQL SDL parser
//!
//! Accepts the type-system half of GraphQL (type, interface, input, enum,
//! union, scalar, schema and directive definitions plus their `extend` forms)
//! and keeps only what collection extraction needs: type names, kinds and
//! applied directives. Field definitions are parsed for validity and then
//! dropped.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, one_of, satisfy},
    combinator::{all_consuming, cut, map, opt, recognize, value, verify},
    error::{context, convert_error, ContextError, ErrorKind, ParseError, VerboseError},
    multi::{many0, many1, separated_list1},
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

use crate::ast::{Argument, Definition, Directive, Document, TypeDefinition, TypeKind, Value};
use crate::error::{Error, Result};

type Res<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

/// Parse SDL source text into a [`Document`]
pub fn parse_document(input: &str) -> Result<Document> {
    match all_consuming(terminated(many0(definition), ignored))(input) {
        Ok((_, definitions)) => Ok(Document::from_definitions(definitions)),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(Error::Parse(convert_error(input, e)))
        }
        Err(nom::Err::Incomplete(_)) => Err(Error::Parse("incomplete input".to_string())),
    }
}

// ============================================================================
// Lexical
// ============================================================================

/// Whitespace, commas, byte order marks and `#` comments
fn ignored(input: &str) -> Res<()> {
    value(
        (),
        many0(alt((
            value(
                (),
                take_while1(|c: char| c.is_whitespace() || c == ',' || c == '\u{feff}'),
            ),
            value((), pair(char('#'), take_while(|c| c != '\n' && c != '\r'))),
        ))),
    )(input)
}

fn ws<'a, O>(inner: impl FnMut(&'a str) -> Res<'a, O>) -> impl FnMut(&'a str) -> Res<'a, O> {
    preceded(ignored, inner)
}

fn punct<'a>(c: char) -> impl FnMut(&'a str) -> Res<'a, char> {
    ws(char(c))
}

fn name(input: &str) -> Res<&str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> Res<'a, &'a str> {
    ws(verify(name, move |n: &str| n == kw))
}

fn fail<'a, T>(input: &'a str, ctx: &'static str) -> Res<'a, T> {
    Err(nom::Err::Failure(VerboseError::add_context(
        input,
        ctx,
        VerboseError::from_error_kind(input, ErrorKind::Char),
    )))
}

fn string_value(input: &str) -> Res<String> {
    let (mut rest, _) = char('"')(input)?;
    let mut out = String::new();

    loop {
        let mut chars = rest.chars();
        match chars.next() {
            None | Some('\n') | Some('\r') => return fail(rest, "unterminated string"),
            Some('"') => return Ok((chars.as_str(), out)),
            Some('\\') => {
                let escaped = match chars.next() {
                    Some('"') => '"',
                    Some('\\') => '\\',
                    Some('/') => '/',
                    Some('b') => '\u{0008}',
                    Some('f') => '\u{000c}',
                    Some('n') => '\n',
                    Some('r') => '\r',
                    Some('t') => '\t',
                    Some('u') => {
                        let after = chars.as_str();
                        let decoded = after
                            .get(..4)
                            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
                            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                            .and_then(char::from_u32);
                        match decoded {
                            Some(c) => {
                                chars = after[4..].chars();
                                c
                            }
                            None => return fail(rest, "invalid unicode escape"),
                        }
                    }
                    _ => return fail(rest, "invalid escape sequence"),
                };
                out.push(escaped);
            }
            Some(c) => out.push(c),
        }
        rest = chars.as_str();
    }
}

/// `"""` block string, `\"""` is the only escape
fn block_string(input: &str) -> Res<String> {
    let (body, _) = tag("\"\"\"")(input)?;
    let mut raw = String::new();
    let mut rest = body;

    loop {
        if let Some(after) = rest.strip_prefix("\\\"\"\"") {
            raw.push_str("\"\"\"");
            rest = after;
        } else if let Some(after) = rest.strip_prefix("\"\"\"") {
            return Ok((after, block_string_value(&raw)));
        } else {
            let mut chars = rest.chars();
            match chars.next() {
                Some(c) => raw.push(c),
                None => return fail(body, "unterminated block string"),
            }
            rest = chars.as_str();
        }
    }
}

/// Leading spaces and tabs, the only indentation GraphQL knows
fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

fn is_blank(line: &str) -> bool {
    indent_of(line) == line.len()
}

/// Strip the common indentation and surrounding blank lines of a block string
fn block_string_value(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().collect();
    let common_indent = lines
        .iter()
        .skip(1)
        .filter(|l| !is_blank(l))
        .map(|l| indent_of(l))
        .min()
        .unwrap_or(0);

    // the indent is ASCII, so cutting at it or at the line's own indent stays
    // on a char boundary
    let lines: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, l)| {
            if i == 0 {
                *l
            } else {
                &l[common_indent.min(indent_of(l))..]
            }
        })
        .collect();

    let start = lines.iter().position(|l| !is_blank(l));
    let end = lines.iter().rposition(|l| !is_blank(l));
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

fn description(input: &str) -> Res<Option<String>> {
    opt(ws(alt((block_string, string_value))))(input)
}

fn number(input: &str) -> Res<Value> {
    let (rest, raw) = recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)?;

    let parsed = if raw.contains(|c: char| matches!(c, '.' | 'e' | 'E')) {
        raw.parse::<f64>().ok().map(Value::Float)
    } else {
        raw.parse::<i64>().ok().map(Value::Int)
    };

    match parsed {
        Some(v) => Ok((rest, v)),
        None => fail(input, "number out of range"),
    }
}

// ============================================================================
// Values and directives
// ============================================================================

fn value_literal(input: &str) -> Res<Value> {
    ws(alt((
        number,
        map(block_string, Value::String),
        map(string_value, Value::String),
        list_value,
        object_value,
        map(name, |n| match n {
            "true" => Value::Boolean(true),
            "false" => Value::Boolean(false),
            "null" => Value::Null,
            other => Value::Enum(other.to_string()),
        }),
    )))(input)
}

fn list_value(input: &str) -> Res<Value> {
    map(
        preceded(char('['), cut(terminated(many0(value_literal), punct(']')))),
        Value::List,
    )(input)
}

fn object_value(input: &str) -> Res<Value> {
    map(
        preceded(char('{'), cut(terminated(many0(argument), punct('}')))),
        Value::Object,
    )(input)
}

fn argument(input: &str) -> Res<Argument> {
    let (input, name) = ws(name)(input)?;
    let (input, value) = cut(context("argument value", preceded(punct(':'), value_literal)))(input)?;
    Ok((
        input,
        Argument {
            name: name.to_string(),
            value,
        },
    ))
}

fn directive(input: &str) -> Res<Directive> {
    let (input, _) = punct('@')(input)?;
    let (input, name) = cut(context("directive name", name))(input)?;
    let (input, arguments) = opt(preceded(
        punct('('),
        cut(terminated(many1(argument), punct(')'))),
    ))(input)?;

    Ok((
        input,
        Directive {
            name: name.to_string(),
            arguments: arguments.unwrap_or_default(),
        },
    ))
}

fn directives(input: &str) -> Res<Vec<Directive>> {
    many0(directive)(input)
}

// ============================================================================
// Fields and type references
// ============================================================================

fn type_ref(input: &str) -> Res<()> {
    let (input, _) = ws(alt((
        value((), name),
        value(
            (),
            preceded(char('['), cut(terminated(type_ref, punct(']')))),
        ),
    )))(input)?;
    let (input, _) = opt(punct('!'))(input)?;
    Ok((input, ()))
}

fn input_value_definition(input: &str) -> Res<()> {
    let (input, _) = description(input)?;
    let (input, _) = ws(name)(input)?;
    let (input, _) = cut(context(
        "input value definition",
        tuple((
            punct(':'),
            type_ref,
            opt(preceded(punct('='), value_literal)),
            directives,
        )),
    ))(input)?;
    Ok((input, ()))
}

fn arguments_definition(input: &str) -> Res<()> {
    value(
        (),
        preceded(
            punct('('),
            cut(terminated(many1(input_value_definition), punct(')'))),
        ),
    )(input)
}

fn field_definition(input: &str) -> Res<()> {
    let (input, _) = description(input)?;
    let (input, _) = ws(name)(input)?;
    let (input, _) = cut(context(
        "field definition",
        tuple((opt(arguments_definition), punct(':'), type_ref, directives)),
    ))(input)?;
    Ok((input, ()))
}

fn fields_definition(input: &str) -> Res<()> {
    value(
        (),
        preceded(
            punct('{'),
            cut(terminated(many0(field_definition), punct('}'))),
        ),
    )(input)
}

fn input_fields_definition(input: &str) -> Res<()> {
    value(
        (),
        preceded(
            punct('{'),
            cut(terminated(many0(input_value_definition), punct('}'))),
        ),
    )(input)
}

fn enum_values_definition(input: &str) -> Res<()> {
    let enum_value = tuple((description, ws(name), directives));
    value(
        (),
        preceded(punct('{'), cut(terminated(many0(enum_value), punct('}')))),
    )(input)
}

fn implements_interfaces(input: &str) -> Res<()> {
    value(
        (),
        preceded(
            keyword("implements"),
            cut(pair(opt(punct('&')), separated_list1(punct('&'), ws(name)))),
        ),
    )(input)
}

fn union_members(input: &str) -> Res<()> {
    value(
        (),
        preceded(
            punct('='),
            cut(pair(opt(punct('|')), separated_list1(punct('|'), ws(name)))),
        ),
    )(input)
}

// ============================================================================
// Definitions
// ============================================================================

fn type_definition(kind: TypeKind, name: &str, directives: Vec<Directive>) -> TypeDefinition {
    TypeDefinition {
        name: name.to_string(),
        kind,
        directives,
    }
}

/// Everything after the definition keyword: `Name ... @directives ...body`
fn type_system_definition(input: &str) -> Res<TypeDefinition> {
    alt((
        preceded(
            keyword("scalar"),
            cut(context(
                "scalar definition",
                map(pair(ws(name), directives), |(n, d)| {
                    type_definition(TypeKind::Scalar, n, d)
                }),
            )),
        ),
        preceded(
            keyword("type"),
            cut(context(
                "object type definition",
                map(
                    tuple((
                        ws(name),
                        opt(implements_interfaces),
                        directives,
                        opt(fields_definition),
                    )),
                    |(n, _, d, _)| type_definition(TypeKind::Object, n, d),
                ),
            )),
        ),
        preceded(
            keyword("interface"),
            cut(context(
                "interface definition",
                map(
                    tuple((
                        ws(name),
                        opt(implements_interfaces),
                        directives,
                        opt(fields_definition),
                    )),
                    |(n, _, d, _)| type_definition(TypeKind::Interface, n, d),
                ),
            )),
        ),
        preceded(
            keyword("union"),
            cut(context(
                "union definition",
                map(
                    tuple((ws(name), directives, opt(union_members))),
                    |(n, d, _)| type_definition(TypeKind::Union, n, d),
                ),
            )),
        ),
        preceded(
            keyword("enum"),
            cut(context(
                "enum definition",
                map(
                    tuple((ws(name), directives, opt(enum_values_definition))),
                    |(n, d, _)| type_definition(TypeKind::Enum, n, d),
                ),
            )),
        ),
        preceded(
            keyword("input"),
            cut(context(
                "input object definition",
                map(
                    tuple((ws(name), directives, opt(input_fields_definition))),
                    |(n, d, _)| type_definition(TypeKind::InputObject, n, d),
                ),
            )),
        ),
    ))(input)
}

fn schema_definition(input: &str) -> Res<()> {
    let root_operation = tuple((ws(name), punct(':'), ws(name)));
    value(
        (),
        preceded(
            keyword("schema"),
            cut(context(
                "schema definition",
                pair(
                    directives,
                    opt(preceded(
                        punct('{'),
                        cut(terminated(many1(root_operation), punct('}'))),
                    )),
                ),
            )),
        ),
    )(input)
}

fn directive_definition(input: &str) -> Res<()> {
    value(
        (),
        preceded(
            keyword("directive"),
            cut(context(
                "directive definition",
                tuple((
                    punct('@'),
                    name,
                    opt(arguments_definition),
                    opt(keyword("repeatable")),
                    keyword("on"),
                    opt(punct('|')),
                    separated_list1(punct('|'), ws(name)),
                )),
            )),
        ),
    )(input)
}

fn definition(input: &str) -> Res<Definition> {
    let (input, _) = description(input)?;
    alt((
        map(type_system_definition, Definition::Type),
        value(Definition::Other, schema_definition),
        value(Definition::Other, directive_definition),
        preceded(
            keyword("extend"),
            cut(context(
                "type extension",
                alt((
                    map(type_system_definition, Definition::TypeExtension),
                    value(Definition::Other, schema_definition),
                )),
            )),
        ),
    ))(input)
}
