//! End-to-end tests for the JavaScript front end.

use codemask_core::{Anonymize, FrontEndConfig};
use codemask_js::{anonymize, anonymize_with, JsAnonymizer, Parser};

const COMPONENT: &str = r#"
import React, { useState } from 'react';

// Renders the signed-in customer's balance.
export default function Balance({ customer, currency = 'EUR' }) {
  const [visible, setVisible] = useState(false);
  const label = `Balance for ${customer.name}`;
  function toggle() {
    setVisible(!visible);
  }
  return (
    <section className="balance">
      <h2>{label}</h2>
      {visible && <span>{customer.balance} {currency}</span>}
      <button onClick={toggle}>Show balance</button>
    </section>
  );
}
"#;

#[test]
fn test_deterministic_output() {
    assert_eq!(anonymize(COMPONENT), anonymize(COMPONENT));
}

#[test]
fn test_output_reparses() {
    let output = anonymize(COMPONENT);
    assert!(!output.starts_with("//"), "unexpected diagnostic: {output}");
    assert!(Parser::new(&output).parse().is_ok(), "output does not parse:\n{output}");
}

#[test]
fn test_sensitive_text_removed() {
    let output = anonymize(COMPONENT);
    for secret in ["EUR", "Balance for", "Show balance", "toggle", "visible", "label"] {
        assert!(!output.contains(secret), "{secret} leaked into:\n{output}");
    }
    // Comments never survive code generation.
    assert!(!output.contains("Renders"));
    // Destructured prop keys are the component's interface.
    assert!(output.contains("customer: Alpha"));
}

#[test]
fn test_imports_and_reserved_survive() {
    let output = anonymize(COMPONENT);
    assert!(output.contains("import React, { useState }"));
    assert!(output.contains("useState(false)"));
    assert!(output.contains("<section className="));
}

#[test]
fn test_anonymizing_twice_is_stable() {
    let once = anonymize("let total = price * quantity;\nreport(total, 'sum');");
    let twice = anonymize(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_closure_sees_later_declaration() {
    let output = anonymize("function outer() { const read = () => value; let value = 1; return read; }");
    assert_eq!(
        output,
        "function Function1() {\n  const Alpha = () => Bravo;\n  let Bravo = 1;\n  return Alpha;\n}"
    );
}

#[test]
fn test_parameter_names_are_allocated_per_run() {
    let output = anonymize("function a(x) { return x; }\nfunction b(y) { return y; }");
    assert!(output.contains("function Function1(Alpha)"));
    assert!(output.contains("function Function2(Bravo)"));
}

#[test]
fn test_distinct_literals_get_distinct_phrases() {
    let output = anonymize("const a = 'alice@example.com';\nconst b = 'bob@example.com';\nconst c = 'alice@example.com';");
    assert_eq!(
        output,
        "const Alpha = \"Lorem Ipsum\";\nconst Bravo = \"Dolor sit amet\";\nconst Charlie = \"Lorem Ipsum\";"
    );
}

#[test]
fn test_custom_configuration() {
    let config = FrontEndConfig::javascript()
        .with_alphabet(vec!["One".to_string(), "Two".to_string()])
        .with_phrases(vec!["redacted".to_string()]);
    let front = JsAnonymizer::new(config);
    assert_eq!(front.anonymize("let a = 'x', b, c;"), "let One = \"redacted\", Two, One;");
}

#[test]
fn test_unbalanced_input_yields_diagnostic() {
    let output = anonymize("function broken( {\n  return 1;\n}");
    assert!(output.starts_with("// Syntax Error:"), "{output}");
}

#[test]
fn test_object_keys_untouched_and_methods_renamed() {
    let output = anonymize(
        "class Store { load() { return { items: [], total: 0 }; } }\nconst store = new Store();\nstore.load();",
    );
    assert!(output.contains("items: []"));
    assert!(output.contains("total: 0"));
    assert!(output.contains(".Function1();"));
}
