//! Harness program construction.
//!
//! The harness is a pure function from (preamble, source) to program text:
//! the combined source becomes the body of a zero-argument function, and a
//! driver invokes it and reports the outcome as a single tag line on stdout,
//! preceded by one blank framing line. No state is shared with execution.

use serde_json::Value;

/// Substitution point for the combined preamble + user source.
pub(crate) const SOURCE_MARKER: &str = "#{source}";

/// Driver skeleton. On a normal return the tag line is `["ok"]` when the
/// result is undefined or unserializable, `["ok", <result>]` otherwise; a
/// thrown value produces `["err", <stringified>]`.
const RUNNER: &str = r#"(function(program, report) { report(program) })(function() { #{source}
}, function(program) {
  var result;
  var print = function(string) {
    process.stdout.write('' + string + '\n');
  };
  try {
    result = program();
    print('');
    if (typeof result == 'undefined' && result !== null) {
      print('["ok"]');
    } else {
      try {
        print(JSON.stringify(['ok', result]));
      } catch (err) {
        print('["ok"]');
      }
    }
  } catch (err) {
    print('');
    print(JSON.stringify(['err', '' + err]));
  }
});"#;

/// Build the full harness program for one invocation.
///
/// The preamble, when present, is concatenated before the request source so
/// names it defines are visible to the request. Substitution runs exactly
/// once over the template, so marker text arriving as part of the user
/// source is never rescanned.
pub(crate) fn build_program(preamble: Option<&str>, source: &str) -> String {
    let combined = match preamble {
        Some(p) => format!("{p}\n{source}"),
        None => source.to_owned(),
    };
    RUNNER.replacen(SOURCE_MARKER, &combined, 1)
}

/// Turn expression source into statement source for the function body.
///
/// The expression is embedded as a JSON string literal and evaluated with
/// parentheses around it, so object literals and other statement-ambiguous
/// forms evaluate as expressions. Whitespace-only source evaluates to
/// undefined.
pub(crate) fn eval_expression(source: &str) -> String {
    if source.trim().is_empty() {
        return "return eval('')".to_owned();
    }
    let quoted = Value::String(source.to_owned()).to_string();
    format!("return eval('('+{quoted}+')')")
}

/// Build an expression applying a dotted function reference to a
/// JSON-encoded argument array.
pub(crate) fn call_expression(function: &str, args: &[Value]) -> String {
    let encoded = Value::Array(args.to_vec()).to_string();
    format!("{function}.apply(this, {encoded})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_program_inserts_source() {
        let program = build_program(None, "return 1");
        assert!(program.contains("return 1"));
        assert!(!program.contains(SOURCE_MARKER));
    }

    #[test]
    fn test_build_program_prepends_preamble() {
        let program = build_program(Some("var x = 1;"), "return x");
        let body_at = program.find("var x = 1;\nreturn x").expect("combined body");
        assert!(body_at > 0);
    }

    #[test]
    fn test_build_program_single_substitution() {
        // Marker text inside user source must survive verbatim.
        let source = "return \"#{source}\"";
        let program = build_program(None, source);
        assert!(program.contains(source));
        assert_eq!(program.matches(SOURCE_MARKER).count(), 1);
    }

    #[test]
    fn test_build_program_marker_in_preamble() {
        let program = build_program(Some("var m = '#{source}';"), "return m");
        assert!(program.contains("var m = '#{source}';"));
    }

    #[test]
    fn test_eval_expression_empty() {
        assert_eq!(eval_expression(""), "return eval('')");
        assert_eq!(eval_expression("  "), "return eval('')");
    }

    #[test]
    fn test_eval_expression_quotes_source() {
        assert_eq!(
            eval_expression("2 + 2"),
            r#"return eval('('+"2 + 2"+')')"#
        );
    }

    #[test]
    fn test_eval_expression_escapes_quotes() {
        assert_eq!(
            eval_expression(r#""hello""#),
            r#"return eval('('+"\"hello\""+')')"#
        );
    }

    #[test]
    fn test_call_expression_plain() {
        assert_eq!(
            call_expression("id", &[json!("bar")]),
            r#"id.apply(this, ["bar"])"#
        );
    }

    #[test]
    fn test_call_expression_dotted_path() {
        assert_eq!(
            call_expression("a.b.id", &[json!(1), json!([2, 3])]),
            "a.b.id.apply(this, [1,[2,3]])"
        );
    }

    #[test]
    fn test_call_expression_no_args() {
        assert_eq!(call_expression("foo", &[]), "foo.apply(this, [])");
    }
}
