// Copyright 2025 Cornell University
// released under MIT License

use crate::errors::{CompileError, CompileResult};
use crate::ir::PropositionTable;

/// Reads a stimulus: one valuation per line, one `0` or `1` per canonical
/// proposition separated by whitespace or commas. `#` starts a comment.
pub fn parse_valuations(text: &str, props: &PropositionTable) -> CompileResult<Vec<Vec<bool>>> {
    let mut valuations = vec![];
    for (lineno, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let valuation = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|v| !v.is_empty())
            .map(|v| match v {
                "0" => Ok(false),
                "1" => Ok(true),
                other => Err(CompileError::parse(format!(
                    "stimulus line {}: `{other}` is neither 0 nor 1",
                    lineno + 1
                ))),
            })
            .collect::<CompileResult<Vec<bool>>>()?;
        if valuation.len() != props.len() {
            return Err(CompileError::parse(format!(
                "stimulus line {}: expected {} values ({}), found {}",
                lineno + 1,
                props.len(),
                props.names().collect::<Vec<_>>().join(", "),
                valuation.len()
            )));
        }
        valuations.push(valuation);
    }
    Ok(valuations)
}

pub fn read_valuations(
    filename: impl AsRef<std::path::Path>,
    props: &PropositionTable,
) -> CompileResult<Vec<Vec<bool>>> {
    let text = std::fs::read_to_string(filename)?;
    parse_valuations(&text, props)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::tests::props;

    #[test]
    fn reads_lines_and_comments() {
        let table = props(&["a", "b", "c"]);
        let text = "# a b c\n1 0 1\n\n0,1,0   # second step\n 1, 1 ,1\n";
        assert_eq!(
            parse_valuations(text, &table).unwrap(),
            vec![
                vec![true, false, true],
                vec![false, true, false],
                vec![true, true, true],
            ]
        );
    }

    #[test]
    fn rejects_bad_lines() {
        let table = props(&["a", "b"]);
        let err = parse_valuations("1 0\n1 2\n", &table).unwrap_err();
        assert!(err.to_string().contains("stimulus line 2"));
        let err = parse_valuations("1 0 1\n", &table).unwrap_err();
        assert!(err.to_string().contains("expected 2 values (a, b), found 3"));
    }
}
