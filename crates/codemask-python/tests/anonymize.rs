//! End-to-end tests for the Python front end.

use codemask_core::{Anonymize, FrontEndConfig};
use codemask_python::{anonymize, anonymize_with, PyAnonymizer};

const SERVICE: &str = r#"import logging
from dataclasses import dataclass

logger = logging.getLogger(__name__)


@dataclass
class LineItem:
    sku: str
    quantity: int = 1


class InvoiceService:
    """Creates invoices against the billing API."""

    def __init__(self, client, retries=3):
        self._client = client
        self.retries = retries

    @property
    def endpoint(self):
        return f"https://billing.example.com/{self._client}"

    def submit(self, invoice_id, amount):
        # Amount is in cents.
        payload = {"invoice": invoice_id, "amount": amount}
        response = self._client.post(self.endpoint, json=payload, timeout=30)
        if response.status_code != 200:
            logger.warning("Submission failed for %s", invoice_id)
            raise ValueError("Invoice rejected by billing")
        return response.json()
"#;

#[test]
fn test_deterministic_output() {
    assert_eq!(anonymize(SERVICE), anonymize(SERVICE));
}

#[test]
fn test_sensitive_text_removed() {
    let output = anonymize(SERVICE);
    for leaked in [
        "nvoice",
        "billing",
        "example.com",
        "Submission failed",
        "cents",
        "_client",
        "amount",
        "payload",
        "LineItem",
    ] {
        assert!(!output.contains(leaked), "{leaked:?} leaked:\n{output}");
    }
}

#[test]
fn test_imports_and_builtins_survive() {
    let output = anonymize(SERVICE);
    assert!(output.starts_with("import logging\nfrom dataclasses import dataclass\n"));
    assert!(output.contains("logging.getLogger(__name__)"));
    assert!(output.contains("@dataclass\nclass Class1:"));
    assert!(output.contains("    def __init__(self, "));
    assert!(output.contains("    @property\n    def "));
    assert!(output.contains("raise ValueError("));
}

#[test]
fn test_keyword_arguments_survive() {
    let output = anonymize(SERVICE);
    assert!(output.contains(", json="));
    assert!(output.contains(", timeout=30)"));
}

#[test]
fn test_comments_and_docstrings_removed() {
    let output = anonymize(SERVICE);
    assert!(!output.contains('#'));
    assert!(!output.contains("\"\"\""));
    assert!(output.contains("class Class2:\n\n    def __init__"));
}

#[test]
fn test_self_fields_keep_privacy_marker() {
    let output = anonymize(SERVICE);
    assert!(output.contains("        self._"));
    assert!(!output.contains("retries"));
}

#[test]
fn test_methods_and_fields_share_names_across_the_class() {
    let source = "class Cart:\n    def add(self, item):\n        self.items.append(item)\n        return self.total()\n\n    def total(self):\n        return len(self.items)\n\ncart = Cart()\ncart.add(1)\n";
    let expected = "class Class1:\n    def Function1(self, Alpha):\n        self.Bravo.append(Alpha)\n        return self.Function2()\n\n    def Function2(self):\n        return len(self.Bravo)\n\nCharlie = Class1()\nCharlie.Function1(1)\n";
    assert_eq!(anonymize(source), expected);
}

#[test]
fn test_nested_definitions_see_enclosing_names() {
    let source = "def outer(a):\n    def inner(b):\n        return a + b\n    return inner(a)\n";
    let expected = "def Function1(Alpha):\n    def Function2(Bravo):\n        return Alpha + Bravo\n    return Function2(Alpha)\n";
    assert_eq!(anonymize(source), expected);
}

#[test]
fn test_custom_config() {
    let config = FrontEndConfig {
        alphabet: vec!["One".to_string(), "Two".to_string()],
        phrases: vec!["redacted".to_string()],
        ..FrontEndConfig::python()
    };
    let source = "a = 'x'\nb = a\nc = 'y'\n";
    assert_eq!(
        anonymize_with(source, &config),
        "One = 'redacted'\nTwo = One\nVar3 = 'redacted 2'\n"
    );
}

#[test]
fn test_malformed_input_still_produces_output() {
    for source in ["def (:\n  '''unterminated", "x = 'open\ny = (", "@\n@@\nclass", "f'{", "\\"] {
        let _ = anonymize(source);
    }
    assert_eq!(anonymize("def (:"), "def (:");
}

#[test]
fn test_trait_object_matches_function() {
    let front: Box<dyn Anonymize> = Box::new(PyAnonymizer::default());
    assert_eq!(front.anonymize(SERVICE), anonymize(SERVICE));
}
