//! Scene File Parser

use gonio::common::*;
use gonio::error::*;
use gonio::geometry::*;
use gonio::light::*;
use gonio::paramset::*;
use gonio::validation::*;
use lights::*;
use pest::iterators::*;
use pest::Parser;
use std::fs;
use std::path::Path;

/// The `pest` parser generated from a grammar.
#[derive(Parser)]
#[grammar = "parser/grammar.pest"]
struct SceneParser;

/// Scene inventory read from a scene file.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneDescription {
    /// Rendering backend name.
    pub renderer: String,

    /// Unit system.
    pub units: UnitSystem,

    /// Fixture name, if the scene names one.
    pub fixture_name: Option<String>,

    /// Fixture origin in world coordinates.
    pub fixture_origin: Point3f,

    /// Lights in statement order.
    pub lights: Vec<LightDescriptor>,
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self {
            renderer: String::from("analytic"),
            units: UnitSystem::Metric,
            fixture_name: None,
            fixture_origin: Point3f::ZERO,
            lights: vec![],
        }
    }
}

impl SceneDescription {
    /// Reads and parses a scene file.
    ///
    /// * `path` - Path to the scene file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            GonioError::validation(
                "parser",
                format!("cannot read scene file '{}'", path.display()),
                vec![e.to_string()],
            )
        })?;
        debug!("Parsing scene '{}'", path.display());
        Self::parse_str(&text)
    }

    /// Parses scene text.
    ///
    /// * `text` - Scene description.
    pub fn parse_str(text: &str) -> Result<Self> {
        let scene = SceneParser::parse(Rule::scene, text)
            .map_err(|e| syntax_error(e.to_string()))?
            .next()
            .ok_or_else(|| syntax_error(String::from("empty scene")))?;

        let mut desc = Self::default();
        for pair in scene.into_inner() {
            let rule = pair.as_rule();
            let line = pair.line_col().0;
            let mut inner_rules = pair.into_inner();
            match rule {
                Rule::renderer_stmt => desc.renderer = parse_quoted_str(&mut inner_rules)?,
                Rule::units_stmt => {
                    desc.units = UnitSystem::from_name(&parse_quoted_str(&mut inner_rules)?)
                }
                Rule::fixture_name_stmt => {
                    desc.fixture_name = Some(parse_quoted_str(&mut inner_rules)?)
                }
                Rule::fixture_origin_stmt => {
                    let list = parse_float_list(next_pair(&mut inner_rules)?.into_inner())?;
                    if list.len() != 3 {
                        return Err(syntax_error(format!(
                            "line {line}: FixtureOrigin needs 3 values, found {}",
                            list.len()
                        )));
                    }
                    desc.fixture_origin = Point3f::new(list[0], list[1], list[2]);
                }
                Rule::light_source_stmt => {
                    let kind = parse_quoted_str(&mut inner_rules)?;
                    let params = parse_param_list(inner_rules)?;
                    debug!("LightSource '{kind}'{params}");
                    let index = desc.lights.len();
                    desc.lights.push(make_light_descriptor(&kind, &params, index));
                }
                Rule::EOI => (),
                other => return Err(syntax_error(format!("line {line}: unexpected {other:?}"))),
            }
        }

        Ok(desc)
    }
}

fn syntax_error(message: String) -> GonioError {
    GonioError::validation("parser", "scene syntax error", vec![message])
}

/// Returns the next pair or an error if the grammar produced fewer pairs than
/// expected.
fn next_pair<'a>(pairs: &mut Pairs<'a, Rule>) -> Result<Pair<'a, Rule>> {
    pairs
        .next()
        .ok_or_else(|| syntax_error(String::from("unexpected end of statement")))
}

/// Parse a `param` list and return a `ParamSet`.
///
/// * `pairs` - The remaining pairs of a statement.
fn parse_param_list(pairs: Pairs<Rule>) -> Result<ParamSet> {
    let mut params = ParamSet::new();
    for pair in pairs {
        match pair.as_rule() {
            Rule::param => {
                let mut inner_rules = pair.into_inner();
                parse_param(next_pair(&mut inner_rules)?, &mut params)?;
            }
            other => return Err(syntax_error(format!("unexpected {other:?} in parameter list"))),
        }
    }
    Ok(params)
}

/// Parse one typed parameter and add it to a `ParamSet`.
///
/// * `pair`   - The typed parameter pair.
/// * `params` - The `ParamSet` to update.
fn parse_param(pair: Pair<Rule>, params: &mut ParamSet) -> Result<()> {
    let rule = pair.as_rule();
    let line = pair.line_col().0;
    let mut inner_rules = pair.into_inner();
    let ident = next_pair(&mut inner_rules)?.as_str().to_string();
    let value = next_pair(&mut inner_rules)?;

    match rule {
        Rule::point3_param => {
            let list = triples(parse_float_list(value.into_inner())?, &ident, line)?;
            let points: Vec<Point3f> = list.iter().map(|v| Point3f::from(*v)).collect();
            params.add_point3f(&ident, &points);
        }
        Rule::vector3_param | Rule::normal_param => {
            let list = triples(parse_float_list(value.into_inner())?, &ident, line)?;
            let vectors: Vec<Vector3f> = list.iter().map(|v| Vector3f::new(v[0], v[1], v[2])).collect();
            params.add_vector3f(&ident, &vectors);
        }
        Rule::float_param => params.add_float(&ident, &parse_float_list(value.into_inner())?),
        Rule::int_param => params.add_int(&ident, &parse_int_list(value.into_inner())?),
        Rule::bool_param => params.add_bool(&ident, &parse_bool_list(value.into_inner())?),
        Rule::string_param => params.add_string(&ident, &parse_str_list(value.into_inner())?),
        Rule::rgb_param => {
            let list = parse_float_list(value.into_inner())?;
            if list.len() != 3 {
                return Err(syntax_error(format!(
                    "line {line}: rgb '{ident}' needs 3 values, found {}",
                    list.len()
                )));
            }
            params.add_rgb(&ident, &list);
        }
        other => return Err(syntax_error(format!("line {line}: unexpected {other:?}"))),
    }
    Ok(())
}

/// Groups a flat list into triples.
fn triples(list: Vec<Float>, ident: &str, line: usize) -> Result<Vec<[Float; 3]>> {
    if list.len() % 3 != 0 {
        return Err(syntax_error(format!(
            "line {line}: '{ident}' length {} is not divisible by 3",
            list.len()
        )));
    }
    Ok(list.chunks(3).map(|c| [c[0], c[1], c[2]]).collect())
}

/// Parse a `float_list_expr` and return a `Vec<Float>`.
///
/// * `pairs` - The inner pairs of the list.
fn parse_float_list(pairs: Pairs<Rule>) -> Result<Vec<Float>> {
    pairs
        .map(|pair| {
            pair.as_str()
                .parse::<Float>()
                .map_err(|e| syntax_error(format!("invalid float '{}': {e}", pair.as_str())))
        })
        .collect()
}

/// Parse an `int_list_expr` and return a `Vec<i64>`.
///
/// * `pairs` - The inner pairs of the list.
fn parse_int_list(pairs: Pairs<Rule>) -> Result<Vec<i64>> {
    pairs
        .map(|pair| {
            pair.as_str()
                .parse::<i64>()
                .map_err(|e| syntax_error(format!("invalid integer '{}': {e}", pair.as_str())))
        })
        .collect()
}

/// Parse a `bool_list_expr` and return a `Vec<bool>`.
///
/// * `pairs` - The inner pairs of the list.
fn parse_bool_list(pairs: Pairs<Rule>) -> Result<Vec<bool>> {
    pairs
        .map(|pair| {
            let s = pair.into_inner().as_str();
            s.parse::<bool>()
                .map_err(|e| syntax_error(format!("invalid bool '{s}': {e}")))
        })
        .collect()
}

/// Parse a `quoted_str_list_expr` and return a `Vec<String>`.
///
/// * `pairs` - The inner pairs of the list.
fn parse_str_list(pairs: Pairs<Rule>) -> Result<Vec<String>> {
    Ok(pairs.map(|pair| pair.into_inner().as_str().to_string()).collect())
}

/// Parse a `quoted_str` and return the unquoted value.
///
/// * `pairs` - Pairs positioned at a `quoted_str`.
fn parse_quoted_str(pairs: &mut Pairs<Rule>) -> Result<String> {
    let pair = next_pair(pairs)?;
    match pair.as_rule() {
        Rule::quoted_str => Ok(pair.into_inner().as_str().to_string()),
        other => Err(syntax_error(format!("expected a quoted string, found {other:?}"))),
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
