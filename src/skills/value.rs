//! Turns configuration nodes into [`Value`]s and level/sub-level grids.

use std::collections::HashMap;

use super::expr;
use super::grid::{Grid, WILDCARD};
use super::stat_set::{StatSet, Value};
use super::SkillDataError;
use crate::document::Node;

/// Named variable grids of one definition, keyed by `@name`.
pub type Variables = HashMap<String, Grid<Value>>;

/// Synthetic numeric bindings available to `{...}` expressions.
pub type Bindings = HashMap<String, f64>;

/// Parse a scalar. `{expr}` is evaluated against `bindings`; anything else
/// is kept verbatim.
pub fn parse_node_value(raw: &str, bindings: &Bindings) -> Result<Value, SkillDataError> {
    if raw.len() >= 2 && raw.starts_with('{') && raw.ends_with('}') {
        let inner = &raw[1..raw.len() - 1];
        return expr::evaluate(inner, bindings)
            .map(Value::Number)
            .map_err(|source| SkillDataError::Expression {
                expr: inner.to_string(),
                source,
            });
    }
    Ok(Value::String(raw.to_string()))
}

/// Copy `node`'s attributes into `set` as `{prefix}.{name}` keys.
pub fn parse_attributes(
    node: &Node,
    prefix: &str,
    set: &mut StatSet,
    bindings: &Bindings,
) -> Result<(), SkillDataError> {
    for (name, raw) in &node.attributes {
        set.set(format!("{prefix}.{name}"), parse_node_value(raw, bindings)?);
    }
    Ok(())
}

/// Parse a node into a value.
///
/// - text only → scalar
/// - `item` children → list
/// - other children (or attributes, when `with_attributes`) → nested set,
///   with a text or list body stored under the `.` key
/// - nothing meaningful → `None`
///
/// With `block_value` set, `value` children are skipped: they belong to the
/// per-level declarations handled by [`parse_values`].
pub fn parse_value(
    node: &Node,
    block_value: bool,
    with_attributes: bool,
    bindings: &Bindings,
) -> Result<Option<Value>, SkillDataError> {
    let mut set: Option<StatSet> = None;
    let mut list: Option<Vec<Value>> = None;

    if with_attributes && (node.name != "value" || !block_value) && node.has_attributes() {
        let mut attrs = StatSet::new();
        parse_attributes(node, "", &mut attrs, bindings)?;
        set = Some(attrs);
    }

    let text = match &node.text {
        Some(raw) => Some(parse_node_value(raw, bindings)?),
        None => None,
    };

    for child in &node.children {
        match child.name.as_str() {
            "item" => {
                let items = list.get_or_insert_with(Vec::new);
                if let Some(v) = parse_value(child, false, true, bindings)? {
                    items.push(v);
                }
            }
            "value" if block_value => {}
            _ => {
                if let Some(v) = parse_value(child, false, true, bindings)? {
                    set.get_or_insert_with(StatSet::new).set(child.name.clone(), v);
                }
            }
        }
    }

    if list.is_some() && text.is_some() {
        return Err(SkillDataError::MixedListAndText {
            node: node.name.clone(),
        });
    }

    let body = list.map(Value::List).or(text);
    Ok(match (set, body) {
        (Some(mut set), Some(body)) => {
            set.set(".", body);
            Some(Value::Set(set))
        }
        (Some(set), None) => Some(Value::Set(set)),
        (None, body) => body,
    })
}

pub(crate) fn int_attr(
    node: &Node,
    attribute: &'static str,
) -> Result<Option<i32>, SkillDataError> {
    match node.attr(attribute) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SkillDataError::InvalidAttribute {
                node: node.name.clone(),
                attribute,
                value: raw.to_string(),
            }),
    }
}

fn required_int_attr(node: &Node, attribute: &'static str) -> Result<i32, SkillDataError> {
    int_attr(node, attribute)?.ok_or_else(|| SkillDataError::MissingAttribute {
        node: node.name.clone(),
        attribute,
    })
}

/// Parse every value declared by `node` into a level/sub-level grid.
///
/// An inline value lands on `(-1, -1)`. Otherwise each `value` child is
/// either pinned to `level` (and optionally `subLevel`), or spans
/// `fromLevel..=toLevel` × `fromSubLevel..=toSubLevel`, evaluated once per
/// pair with `index`, `subIndex` and (when the level already has a numeric
/// sub-level-wildcard value) `base` bound.
pub fn parse_values(node: &Node) -> Result<Grid<Value>, SkillDataError> {
    let mut values = Grid::new();
    let empty = Bindings::new();

    if let Some(v) = parse_value(node, true, false, &empty)? {
        values.insert(WILDCARD, WILDCARD, v);
        return Ok(values);
    }

    for child in node.children.iter().filter(|c| c.name.eq_ignore_ascii_case("value")) {
        let level = int_attr(child, "level")?.unwrap_or(WILDCARD);
        if level >= 0 {
            if let Some(v) = parse_value(child, false, false, &empty)? {
                let sub_level = int_attr(child, "subLevel")?.unwrap_or(WILDCARD);
                values.insert(level, sub_level, v);
            }
            continue;
        }

        let from_level = required_int_attr(child, "fromLevel")?;
        let to_level = required_int_attr(child, "toLevel")?;
        let from_sub = int_attr(child, "fromSubLevel")?.unwrap_or(WILDCARD);
        let to_sub = int_attr(child, "toSubLevel")?.unwrap_or(WILDCARD);

        for i in from_level..=to_level {
            for j in from_sub..=to_sub {
                let mut bindings = Bindings::new();
                bindings.insert("index".to_string(), f64::from(i - from_level + 1));
                bindings.insert("subIndex".to_string(), f64::from(j - from_sub + 1));
                if let Some(base) = values.get(i, WILDCARD) {
                    if !base.is_boolean_like() {
                        if let Some(n) = base.as_f64() {
                            bindings.insert("base".to_string(), n);
                        }
                    }
                }
                if let Some(v) = parse_value(child, false, false, &bindings)? {
                    values.insert(i, j, v);
                }
            }
        }
    }
    Ok(values)
}

/// Parse `node`'s values and store them under the node's name in `info`.
///
/// A general value of the form `@name` is replaced by the grid of the
/// matching variable; an unknown variable aborts the definition.
pub fn parse_info(
    node: &Node,
    variables: &Variables,
    info: &mut Grid<StatSet>,
) -> Result<(), SkillDataError> {
    let mut values = parse_values(node)?;
    let reference = match values.get(WILDCARD, WILDCARD) {
        Some(Value::String(general)) if general.starts_with('@') => Some(general.clone()),
        _ => None,
    };
    if let Some(name) = reference {
        values = variables
            .get(&name)
            .cloned()
            .ok_or(SkillDataError::UndefinedVariable(name))?;
    }

    for (level, sub_level, value) in values.iter() {
        info.entry(level, sub_level).set(node.name.clone(), value.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(xml: &str) -> Node {
        Node::parse_xml(xml).unwrap()
    }

    fn num(v: Option<&Value>) -> f64 {
        v.and_then(Value::as_f64).unwrap()
    }

    #[test]
    fn test_scalar_and_empty() {
        let empty = Bindings::new();
        assert_eq!(
            parse_value(&node("<power>100</power>"), true, false, &empty).unwrap(),
            Some(Value::String("100".into()))
        );
        assert_eq!(parse_value(&node("<power/>"), true, false, &empty).unwrap(), None);
        assert_eq!(parse_value(&node("<power>  </power>"), true, false, &empty).unwrap(), None);
    }

    #[test]
    fn test_item_list() {
        let n = node("<abnormals><item>STUN</item><item>ROOT</item></abnormals>");
        let v = parse_value(&n, true, false, &Bindings::new()).unwrap();
        assert_eq!(v, Some(Value::List(vec!["STUN".into(), "ROOT".into()])));
    }

    #[test]
    fn test_list_and_text_conflict() {
        let n = node("<abnormals>STUN<item>ROOT</item></abnormals>");
        let err = parse_value(&n, true, false, &Bindings::new()).unwrap_err();
        assert!(matches!(err, SkillDataError::MixedListAndText { .. }));
    }

    #[test]
    fn test_nested_set_with_attributes() {
        let n = node(r#"<item id="57" count="10"><enchant>3</enchant></item>"#);
        let v = parse_value(&n, false, true, &Bindings::new()).unwrap();
        let Some(Value::Set(set)) = v else { panic!("expected set") };
        assert_eq!(set.get_int(".id").unwrap(), 57);
        assert_eq!(set.get_int(".count").unwrap(), 10);
        assert_eq!(set.get_int("enchant").unwrap(), 3);
    }

    #[test]
    fn test_attributes_with_text_body() {
        let n = node(r#"<stat type="pAtk">15</stat>"#);
        let v = parse_value(&n, false, true, &Bindings::new()).unwrap();
        let Some(Value::Set(set)) = v else { panic!("expected set") };
        assert_eq!(set.get_string(".type").unwrap(), "pAtk");
        assert_eq!(set.get_int(".").unwrap(), 15);
    }

    #[test]
    fn test_per_level_values() {
        let grid = parse_values(&node(
            r#"<power>
                <value level="1">10</value>
                <value level="2">20</value>
                <value level="2" subLevel="1001">25</value>
            </power>"#,
        ))
        .unwrap();
        assert_eq!(num(grid.get(1, WILDCARD)), 10.0);
        assert_eq!(num(grid.get(2, WILDCARD)), 20.0);
        assert_eq!(num(grid.get(2, 1001)), 25.0);
        assert!(grid.get(WILDCARD, WILDCARD).is_none());
    }

    #[test]
    fn test_range_with_base_and_index() {
        let grid = parse_values(&node(
            r#"<power>
                <value level="1">10</value>
                <value level="2">10</value>
                <value level="3">10</value>
                <value fromLevel="1" toLevel="3" fromSubLevel="1001" toSubLevel="1002">
                    {base * index + subIndex}
                </value>
            </power>"#,
        ))
        .unwrap();
        assert_eq!(num(grid.get(1, 1001)), 11.0);
        assert_eq!(num(grid.get(2, 1001)), 21.0);
        assert_eq!(num(grid.get(3, 1002)), 32.0);
    }

    #[test]
    fn test_range_without_sublevels_uses_index() {
        let grid = parse_values(&node(
            r#"<mpConsume><value fromLevel="1" toLevel="3">{10 * index}</value></mpConsume>"#,
        ))
        .unwrap();
        assert_eq!(num(grid.get(1, WILDCARD)), 10.0);
        assert_eq!(num(grid.get(2, WILDCARD)), 20.0);
        assert_eq!(num(grid.get(3, WILDCARD)), 30.0);
    }

    #[test]
    fn test_range_requires_bounds() {
        let missing = node(r#"<power><value fromLevel="1">5</value></power>"#);
        let err = parse_values(&missing).unwrap_err();
        assert!(matches!(
            err,
            SkillDataError::MissingAttribute {
                attribute: "toLevel",
                ..
            }
        ));

        let invalid = node(r#"<power><value level="x">5</value></power>"#);
        let err = parse_values(&invalid).unwrap_err();
        assert!(matches!(
            err,
            SkillDataError::InvalidAttribute {
                attribute: "level",
                ..
            }
        ));
    }

    #[test]
    fn test_variable_reference() {
        let mut variables = Variables::new();
        let mut dmg = Grid::new();
        dmg.insert(1, WILDCARD, Value::from("100"));
        dmg.insert(2, WILDCARD, Value::from("200"));
        variables.insert("@dmg".into(), dmg);

        let mut info = Grid::new();
        parse_info(&node("<power>@dmg</power>"), &variables, &mut info).unwrap();
        assert_eq!(info.get(1, WILDCARD).unwrap().get_int("power").unwrap(), 100);
        assert_eq!(info.get(2, WILDCARD).unwrap().get_int("power").unwrap(), 200);
        assert!(info.get(WILDCARD, WILDCARD).is_none());
    }

    #[test]
    fn test_undefined_variable() {
        let mut info = Grid::new();
        let err =
            parse_info(&node("<power>@nope</power>"), &Variables::new(), &mut info).unwrap_err();
        assert!(matches!(err, SkillDataError::UndefinedVariable(ref v) if v == "@nope"));
    }

    #[test]
    fn test_expression_error_reported() {
        let err = parse_node_value("{base * 2}", &Bindings::new()).unwrap_err();
        assert!(matches!(err, SkillDataError::Expression { .. }));
    }
}
