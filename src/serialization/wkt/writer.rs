use super::token::WktToken;
use crate::core::{GeomResult, GeometryError};
use crate::positions::{DimensionalFlag, PositionSequence};
use std::fmt::Write;

/// Render a token stream as WKT text.
///
/// Produces `<TAG> [Z|M|ZM] (<coords>)` or `<TAG> EMPTY`, with ordinates separated
/// by spaces and positions by `", "`. Fails on unbalanced lists or tokens after `End`.
///
/// Ordinates use the `f64` display form, so NaN and infinities come out as `NaN`,
/// `inf` and `-inf`. `parse_wkt` does not accept those back.
pub fn render(tokens: &[WktToken]) -> GeomResult<String> {
    let mut out = String::new();
    let mut depth: usize = 0;
    let mut needs_space = false;
    let mut ended = false;

    for token in tokens {
        if ended {
            return Err(GeometryError::Parsing(format!(
                "Token after end of WKT document: {token:?}"
            )));
        }
        match token {
            WktToken::GeometryTag { geometry_type, .. } => {
                out.push_str(geometry_type.wkt_tag());
                needs_space = true;
            }
            WktToken::DimensionMarker(flag) => {
                out.push_str(dimension_suffix(*flag));
                needs_space = true;
            }
            WktToken::StartList => {
                if needs_space {
                    out.push(' ');
                }
                out.push('(');
                depth += 1;
                needs_space = false;
            }
            WktToken::EndList => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    GeometryError::Parsing(String::from("Unbalanced end of list"))
                })?;
                out.push(')');
                needs_space = false;
            }
            WktToken::Empty => {
                if needs_space {
                    out.push(' ');
                }
                out.push_str("EMPTY");
                needs_space = false;
            }
            WktToken::ElementSeparator => {
                if depth == 0 {
                    return Err(GeometryError::Parsing(String::from(
                        "Element separator outside of a list",
                    )));
                }
                out.push_str(", ");
                needs_space = false;
            }
            WktToken::PointSequence(seq) => {
                write_positions(&mut out, seq);
                needs_space = true;
            }
            WktToken::Text(txt) => {
                if needs_space {
                    out.push(' ');
                }
                out.push_str(txt);
                needs_space = true;
            }
            WktToken::Number(value) => {
                if needs_space {
                    out.push(' ');
                }
                // Writing to a String cannot fail
                let _ = write!(out, "{value}");
                needs_space = true;
            }
            WktToken::End => ended = true,
        }
    }

    if depth != 0 {
        return Err(GeometryError::Parsing(format!(
            "{depth} list(s) left open at end of WKT document"
        )));
    }
    Ok(out)
}

fn dimension_suffix(flag: DimensionalFlag) -> &'static str {
    match flag {
        DimensionalFlag::Xy => "",
        DimensionalFlag::Xyz => " Z",
        DimensionalFlag::Xym => " M",
        DimensionalFlag::Xyzm => " ZM",
    }
}

fn write_positions(out: &mut String, seq: &PositionSequence) {
    for (i, pos) in seq.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        for (j, ordinate) in pos.ordinates().iter().enumerate() {
            if j > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{ordinate}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryType;
    use crate::positions::Position;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_leaf_tokens() {
        let tokens = vec![
            WktToken::text("SRID"),
            WktToken::number(4326.0),
            WktToken::start_list(),
            WktToken::number(1.5),
            WktToken::number(-2.0),
            WktToken::end_list(),
            WktToken::end(),
        ];
        assert_eq!(render(&tokens).unwrap(), "SRID 4326 (1.5 -2)");
    }

    #[test]
    fn test_render_dimension_suffix() {
        let seq = PositionSequence::single(Position::xyzm(1.0, 2.0, 3.0, 4.0));
        let tokens = vec![
            WktToken::geometry_tag(GeometryType::Point, true),
            WktToken::dimension_marker(DimensionalFlag::Xyzm),
            WktToken::start_list(),
            WktToken::point_sequence(&seq),
            WktToken::end_list(),
            WktToken::end(),
        ];
        assert_eq!(render(&tokens).unwrap(), "POINT ZM (1 2 3 4)");
    }

    #[test]
    fn test_render_empty() {
        let tokens = vec![
            WktToken::geometry_tag(GeometryType::MultiPolygon, false),
            WktToken::dimension_marker(DimensionalFlag::Xyz),
            WktToken::empty(),
            WktToken::end(),
        ];
        assert_eq!(render(&tokens).unwrap(), "MULTIPOLYGON Z EMPTY");
    }

    #[test]
    fn test_render_non_finite_ordinates() {
        let seq = PositionSequence::single(Position::new(f64::NAN, f64::NEG_INFINITY));
        let tokens = vec![
            WktToken::geometry_tag(GeometryType::Point, false),
            WktToken::dimension_marker(DimensionalFlag::Xy),
            WktToken::start_list(),
            WktToken::point_sequence(&seq),
            WktToken::end_list(),
            WktToken::end(),
        ];
        let txt = render(&tokens).unwrap();
        assert_eq!(txt, "POINT (NaN -inf)");
        assert!(crate::serialization::parse_wkt(&txt).is_err());
    }

    #[test]
    fn test_render_invalid_streams() {
        let unbalanced = vec![WktToken::start_list(), WktToken::end()];
        if let Ok(txt) = render(&unbalanced) {
            panic!("Rendered unbalanced stream: {txt}");
        }

        let closing = vec![WktToken::end_list()];
        if let Ok(txt) = render(&closing) {
            panic!("Rendered stream closing an unopened list: {txt}");
        }

        let trailing = vec![WktToken::end(), WktToken::empty()];
        if let Ok(txt) = render(&trailing) {
            panic!("Rendered token after end: {txt}");
        }

        let separator = vec![WktToken::element_separator()];
        if let Ok(txt) = render(&separator) {
            panic!("Rendered separator outside list: {txt}");
        }
    }
}
